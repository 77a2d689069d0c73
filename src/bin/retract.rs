use anyhow::{Context, Result};
use stewart_runtime::encoder::{PayloadEncoder, MIN_EXTENSION};
use stewart_runtime::geometry::NUM_ACTUATORS;
use stewart_runtime::transport::{SerialTransport, Transport, DEFAULT_BAUDRATE, DEFAULT_PORT};
use std::time::Duration;

fn main() -> Result<()> {
    let port = std::env::args().nth(1).unwrap_or_else(|| DEFAULT_PORT.to_string());

    let mut transport = SerialTransport::open(&port, DEFAULT_BAUDRATE)
        .context("Failed to initialize platform transport")?;

    let payload = PayloadEncoder::default().encode(&[MIN_EXTENSION as f64; NUM_ACTUATORS]);
    transport.send(&payload)
        .context("Failed to send retract payload")?;

    println!("All actuators retracted.");
    std::thread::sleep(Duration::from_secs(2));

    Ok(())
}
