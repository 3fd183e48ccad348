//! strobebus command-line interface
//!
//! Three modes:
//! - `replay <path>`: decode a saved capture file and exit
//! - `save <path>`: persist live samples verbatim for later replay
//! - default: live interactive session (read/write/readbyte/writebyte/
//!   stop/exit)
//!
//! Live acquisition runs against the bundled simulated device; samples
//! travel over a bounded channel to a single worker thread that owns the
//! decoder (or the capture writer, in save mode).

use std::io::{self, BufRead, Write as _};
use std::path::PathBuf;
use std::thread::JoinHandle;

use clap::{Parser, Subcommand};
use tracing::{error, info};

use strobebus::{
    decode_stream, replay_file, AnalyzerError, CaptureWriter, ChannelSource, Decoder,
    DecoderConfig, OutputEncoder, OutputMode, Result, SimulatedDevice, StreamMessage,
    StreamingDevice, DEFAULT_SAMPLE_RATE_HZ,
};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    mode: Option<Mode>,

    /// Print words as signed decimals grouped per frame instead of raw
    /// little-endian bytes
    #[arg(long)]
    ascii: bool,

    /// Channel words finalized per frame
    #[arg(long, default_value_t = 1)]
    channels: usize,

    /// Acquisition sample rate in Hz
    #[arg(long, default_value_t = DEFAULT_SAMPLE_RATE_HZ)]
    sample_rate: u32,
}

#[derive(Subcommand, Debug)]
enum Mode {
    /// Decode a saved capture file
    Replay { path: PathBuf },
    /// Persist live samples verbatim to a capture file
    Save { path: PathBuf },
}

/// What the live sample stream feeds.
enum LiveSink {
    Decode,
    Save(PathBuf),
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let output_mode = if args.ascii {
        OutputMode::Ascii
    } else {
        OutputMode::Binary
    };
    let config = DecoderConfig {
        channels_per_frame: args.channels,
    };

    match args.mode {
        Some(Mode::Replay { path }) => {
            let mut decoder = Decoder::with_config(config)?;
            let mut encoder = OutputEncoder::new(io::stdout().lock(), output_mode);
            let words = replay_file(&path, &mut decoder, &mut encoder)?;
            info!("replayed {}: {} word(s)", path.display(), words);
            Ok(())
        }
        Some(Mode::Save { path }) => {
            interactive(config, output_mode, args.sample_rate, LiveSink::Save(path))
        }
        None => interactive(config, output_mode, args.sample_rate, LiveSink::Decode),
    }
}

/// Spawn the worker that drains a live sample stream.
fn spawn_sink_worker(
    sink: &LiveSink,
    config: DecoderConfig,
    output_mode: OutputMode,
    rx: crossbeam_channel::Receiver<StreamMessage>,
) -> Result<JoinHandle<()>> {
    let handle = match sink {
        LiveSink::Decode => std::thread::Builder::new()
            .name("decode".to_string())
            .spawn(move || {
                let mut source = ChannelSource::new(rx);
                let mut decoder = match Decoder::with_config(config) {
                    Ok(d) => d,
                    Err(e) => {
                        error!("decoder configuration rejected: {e}");
                        return;
                    }
                };
                let mut encoder = OutputEncoder::new(io::stdout(), output_mode);
                if let Err(e) = decode_stream(&mut source, &mut decoder, &mut encoder) {
                    error!("decode stream failed: {e}");
                }
            }),
        LiveSink::Save(path) => {
            let path = path.clone();
            std::thread::Builder::new()
                .name("capture".to_string())
                .spawn(move || {
                    let mut writer = match CaptureWriter::create(&path) {
                        Ok(w) => w,
                        Err(e) => {
                            error!("cannot create capture file: {e}");
                            return;
                        }
                    };
                    loop {
                        match rx.recv() {
                            Ok(StreamMessage::Samples(chunk)) => {
                                if let Err(e) = writer.append(&chunk) {
                                    error!("capture write failed: {e}");
                                    return;
                                }
                            }
                            Ok(StreamMessage::EndOfStream) | Err(_) => break,
                        }
                    }
                    info!("capture closed: {} byte(s)", writer.bytes_written());
                })
        }
    };
    handle.map_err(|e| AnalyzerError::Device(format!("failed to spawn sink worker: {e}")))
}

fn interactive(
    config: DecoderConfig,
    output_mode: OutputMode,
    sample_rate: u32,
    sink: LiveSink,
) -> Result<()> {
    let mut device = SimulatedDevice::new(0x2711, config.channels_per_frame);
    device.set_sample_rate_hz(sample_rate)?;
    println!(
        "Device 0x{:x} connected, reading and writing at {} Hz.",
        device.device_id(),
        device.sample_rate_hz()
    );

    let mut worker: Option<JoinHandle<()>> = None;
    let mut next_write_value: u8 = 0;
    let stdin = io::stdin();

    loop {
        println!();
        println!("Commands: read, write, readbyte, writebyte, stop, exit");
        println!("(r, w, rb, wb, s, and e for short)");
        print!("> ");
        io::stdout().flush()?;

        let mut command = String::new();
        if stdin.lock().read_line(&mut command)? == 0 {
            break;
        }
        let command = command.trim();

        match command {
            "" => continue,
            "exit" | "e" => break,
            "stop" | "s" => {
                if let Err(e) = device.stop() {
                    println!("Sorry, {e}.");
                    continue;
                }
                if let Some(handle) = worker.take() {
                    let _ = handle.join();
                }
            }
            "read" | "r" => {
                if device.is_streaming() {
                    println!("Sorry, the device is already streaming.");
                    continue;
                }
                let (tx, rx) = crossbeam_channel::bounded(1024);
                worker = Some(spawn_sink_worker(&sink, config, output_mode, rx)?);
                device.start_read(tx)?;
            }
            "write" | "w" => {
                if device.is_streaming() {
                    println!("Sorry, the device is already streaming.");
                    continue;
                }
                device.start_write()?;
            }
            "readbyte" | "rb" => {
                println!("Got value 0x{:02x}", device.input_value()?);
            }
            "writebyte" | "wb" => {
                device.set_output_value(next_write_value)?;
                println!("Device is now outputting 0x{next_write_value:02x}");
                next_write_value = next_write_value.wrapping_add(1);
            }
            other => {
                println!("Unknown command: {other}");
            }
        }
    }

    if device.is_streaming() {
        device.stop()?;
    }
    if let Some(handle) = worker.take() {
        let _ = handle.join();
    }
    Ok(())
}
