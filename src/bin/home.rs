use anyhow::{Context, Result};
use clap::Parser;
use stewart_runtime::encoder::PayloadEncoder;
use stewart_runtime::geometry::PlatformGeometry;
use stewart_runtime::kinematics;
use stewart_runtime::pose::HandPose;
use stewart_runtime::transport::{SerialTransport, Transport, DEFAULT_BAUDRATE, DEFAULT_PORT};
use std::time::Duration;

/// Drive the platform to its home pose
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Serial port for the platform microcontroller
    #[arg(short, long, default_value = DEFAULT_PORT)]
    port: String,

    /// Serial baudrate
    #[arg(short, long, default_value_t = DEFAULT_BAUDRATE)]
    baudrate: u32,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut transport = SerialTransport::open(&args.port, args.baudrate)
        .context("Failed to initialize platform transport")?;

    let geometry = PlatformGeometry::default();
    let lengths = kinematics::solve(&HandPose::default(), &geometry);
    let payload = PayloadEncoder::default().encode(&lengths);

    transport.send(&payload)
        .context("Failed to send home payload")?;

    println!("Platform sent to home pose: {}", payload);
    std::thread::sleep(Duration::from_secs(1));

    Ok(())
}
