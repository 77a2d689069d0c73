use anyhow::{Context, Result};
use clap::Parser;
use stewart_runtime::encoder::{ByteOrder, PayloadEncoder, MAX_EXTENSION, MIN_EXTENSION};
use stewart_runtime::geometry::PlatformGeometry;
use stewart_runtime::limiter::FRAME_RATE;
use stewart_runtime::listener::{Listener, SessionStats};
use stewart_runtime::sensor::{self, SensorEvent};
use stewart_runtime::transport::{self, SerialTransport, Transport, DEFAULT_BAUDRATE, DEFAULT_PORT};
use std::io::BufRead;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tracing::{error, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

/// How long the loop waits for a sensor event before rechecking shutdown
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Interval between session statistics reports
const REPORT_INTERVAL: Duration = Duration::from_secs(5);

/// Stewart Platform Hand-Tracking Runtime
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Serial port for the platform microcontroller
    #[arg(short, long, default_value = DEFAULT_PORT)]
    port: String,

    /// Serial baudrate
    #[arg(short, long, default_value_t = DEFAULT_BAUDRATE)]
    baudrate: u32,

    /// Valid frames to skip before each payload is sent
    #[arg(short, long, default_value_t = FRAME_RATE)]
    frame_rate: u32,

    /// Do not open the serial port; print payloads instead
    #[arg(short, long)]
    no_serial: bool,

    /// Recorded sensor events (JSON lines), or "-" for stdin
    #[arg(short, long, default_value = "-")]
    input: String,

    /// Replay frames at this rate in Hz (default: as fast as they are read)
    #[arg(long)]
    replay_hz: Option<f64>,

    /// JSON file overriding the platform geometry
    #[arg(short, long)]
    geometry: Option<PathBuf>,

    /// Lowest extension sent to the platform
    #[arg(long, default_value_t = MIN_EXTENSION)]
    min_extension: i64,

    /// Highest extension sent to the platform
    #[arg(long, default_value_t = MAX_EXTENSION)]
    max_extension: i64,

    /// Byte order of each actuator value on the wire
    #[arg(long, value_enum, default_value_t = ByteOrder::LowFirst)]
    byte_order: ByteOrder,

    /// Log level: trace, debug, info, warn, error
    #[arg(long, default_value = "info")]
    log_level: String,

    /// List available serial ports and exit
    #[arg(long)]
    list_ports: bool,
}

/// Main platform runtime
struct Runtime {
    geometry: PlatformGeometry,
    encoder: PayloadEncoder,
    frame_rate: u32,
    transport: Option<Box<dyn Transport>>,
    input: String,
    replay_hz: Option<f64>,
    stats: Option<SessionStats>,
}

impl Runtime {
    /// Create a new runtime instance
    fn new(args: &Args) -> Result<Self> {
        println!("Initializing Stewart platform runtime...");

        let geometry = match args.geometry {
            Some(ref path) => {
                let geometry = PlatformGeometry::from_json_file(path)
                    .context(format!("Failed to load geometry from {}", path.display()))?;
                println!("✓ Platform geometry loaded from {}", path.display());
                geometry
            }
            None => {
                println!("✓ Using built-in platform geometry");
                PlatformGeometry::default()
            }
        };

        let encoder = PayloadEncoder::new(args.min_extension, args.max_extension, args.byte_order)
            .context("Invalid extension bounds")?;
        println!(
            "✓ Extensions clamped to [{}, {}], {:?} byte order",
            args.min_extension, args.max_extension, args.byte_order
        );

        let transport = transport::open_transport(args.no_serial, &args.port, args.baudrate)
            .context("Failed to initialize platform transport")?;
        println!("✓ Transport ready: {}", transport.describe());

        println!("✓ Sending one payload every {} valid frames", u64::from(args.frame_rate) + 2);

        Ok(Self {
            geometry,
            encoder,
            frame_rate: args.frame_rate,
            transport: Some(transport),
            input: args.input.clone(),
            replay_hz: args.replay_hz,
            stats: None,
        })
    }

    /// Spawn the sensor reader thread
    /// Events are forwarded until the stream ends or the receiver is dropped
    fn spawn_source(&self) -> Result<mpsc::Receiver<stewart_runtime::error::Result<SensorEvent>>> {
        let mut source = sensor::open_replay(&self.input, self.replay_hz)
            .context(format!("Failed to open sensor input {}", self.input))?;
        let (tx, rx) = mpsc::channel(64);

        thread::Builder::new()
            .name("sensor".to_string())
            .spawn(move || loop {
                match source.next_event() {
                    Ok(Some(event)) => {
                        if tx.blocking_send(Ok(event)).is_err() {
                            break;
                        }
                    }
                    Ok(None) => break,
                    Err(e) => {
                        let _ = tx.blocking_send(Err(e));
                        break;
                    }
                }
            })
            .context("Failed to spawn sensor thread")?;

        Ok(rx)
    }

    /// Run the session until shutdown or end of the sensor stream
    async fn run(&mut self, shutdown_flag: Arc<AtomicBool>) -> Result<()> {
        let transport = self.transport.take().context("Runtime already ran")?;
        let mut events = self.spawn_source()?;
        let mut listener = Listener::on_init(&self.geometry, self.encoder, self.frame_rate, transport);

        let start = Instant::now();
        let mut last_report = Instant::now();

        let result = loop {
            if shutdown_flag.load(Ordering::SeqCst) {
                break Ok(());
            }

            match tokio::time::timeout(POLL_INTERVAL, events.recv()).await {
                Err(_) => {}
                Ok(None) => {
                    info!("sensor stream ended");
                    break Ok(());
                }
                Ok(Some(Err(e))) => {
                    error!("sensor input error: {}", e);
                    break Err(anyhow::Error::new(e).context("Sensor input failed"));
                }
                Ok(Some(Ok(event))) => {
                    if let Err(e) = listener.handle(&event) {
                        error!("{:#}", e);
                        break Err(e);
                    }
                }
            }

            if last_report.elapsed() >= REPORT_INTERVAL {
                let stats = listener.stats();
                let elapsed = start.elapsed().as_secs_f64();
                info!(
                    "Runtime: {:.1}s | Frames: {} ({:.1}/s) | Skipped: {} | Sent: {}",
                    elapsed,
                    stats.frames,
                    stats.frames as f64 / elapsed,
                    stats.skipped,
                    stats.emitted
                );
                last_report = Instant::now();
            }
        };

        self.stats = Some(listener.on_exit());
        result
    }

    /// Report the session and confirm the transport is released
    fn shutdown(&mut self) -> Result<()> {
        println!("Shutting down runtime...");

        if let Some(stats) = self.stats {
            println!(
                "✓ Frames: {} | Skipped: {} | Solved: {} | Payloads sent: {}",
                stats.frames, stats.skipped, stats.solved, stats.emitted
            );
        }

        println!("✓ Transport released");
        Ok(())
    }
}

/// Watch stdin for Enter when it is not carrying sensor input
fn spawn_enter_to_exit(shutdown_flag: Arc<AtomicBool>) {
    let spawned = thread::Builder::new().name("console".to_string()).spawn(move || {
        let mut line = String::new();
        if let Ok(n) = std::io::stdin().lock().read_line(&mut line) {
            if n > 0 {
                shutdown_flag.store(true, Ordering::SeqCst);
            }
        }
    });
    if let Err(e) = spawned {
        warn!("Enter-to-exit unavailable: {}", e);
    }
}

fn init_logging(level: &str) -> Result<()> {
    let log_level = match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber).context("Failed to set up logging")?;
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    println!("=== Stewart Platform Runtime ===\n");

    let args = Args::parse();
    init_logging(&args.log_level)?;

    if args.list_ports {
        for port in SerialTransport::list_ports() {
            println!("{}", port);
        }
        return Ok(());
    }

    let mut runtime = Runtime::new(&args)?;

    // Set up Ctrl+C handler for graceful shutdown
    let shutdown_flag = Arc::new(AtomicBool::new(false));
    let shutdown_flag_clone = shutdown_flag.clone();

    ctrlc::set_handler(move || {
        println!("\nReceived Ctrl+C, shutting down...");
        shutdown_flag_clone.store(true, Ordering::SeqCst);
    })
    .context("Failed to set Ctrl+C handler")?;

    if args.input == "-" {
        println!("Reading sensor events from stdin, press Ctrl+C to exit...");
    } else {
        println!("Press Enter or Ctrl+C to exit...");
        spawn_enter_to_exit(shutdown_flag.clone());
    }

    let result = runtime.run(shutdown_flag).await;
    runtime.shutdown()?;
    result
}
