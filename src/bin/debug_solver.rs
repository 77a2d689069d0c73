use anyhow::{Context, Result};
use clap::Parser;
use stewart_runtime::encoder::{ByteOrder, PayloadEncoder, MAX_EXTENSION, MIN_EXTENSION};
use stewart_runtime::geometry::{PlatformGeometry, NUM_ACTUATORS};
use stewart_runtime::kinematics;
use stewart_runtime::pose::HandPose;
use std::path::PathBuf;

/// Solver Debug Tool: prints actuator lengths and the payload for one pose
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Palm X in sensor coordinates (mm)
    #[arg(short, long, default_value_t = 0.0, allow_hyphen_values = true)]
    x: f64,

    /// Palm Y in sensor coordinates (mm)
    #[arg(short, long, default_value_t = 0.0, allow_hyphen_values = true)]
    y: f64,

    /// Palm Z in sensor coordinates (mm)
    #[arg(short, long, default_value_t = 0.0, allow_hyphen_values = true)]
    z: f64,

    /// Pitch in degrees
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    pitch: f64,

    /// Yaw in degrees
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    yaw: f64,

    /// Roll in degrees
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    roll: f64,

    /// JSON file overriding the platform geometry
    #[arg(short, long)]
    geometry: Option<PathBuf>,

    /// Byte order of each actuator value on the wire
    #[arg(long, value_enum, default_value_t = ByteOrder::LowFirst)]
    byte_order: ByteOrder,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let geometry = match args.geometry {
        Some(ref path) => PlatformGeometry::from_json_file(path)
            .context(format!("Failed to load geometry from {}", path.display()))?,
        None => PlatformGeometry::default(),
    };
    let encoder = PayloadEncoder::new(MIN_EXTENSION, MAX_EXTENSION, args.byte_order)?;

    let pose = HandPose {
        position: [args.x, args.y, args.z],
        pitch: args.pitch.to_radians(),
        yaw: args.yaw.to_radians(),
        roll: args.roll.to_radians(),
    };

    let lengths = kinematics::solve(&pose, &geometry);
    let payload = encoder.encode(&lengths);
    let extensions = encoder.decode(&payload);

    println!("Pose: x={:.1} y={:.1} z={:.1} pitch={:.1}° yaw={:.1}° roll={:.1}°",
             args.x, args.y, args.z, args.pitch, args.yaw, args.roll);
    println!();
    println!("{:<10} {:>12}  {:>9}", "Actuator", "Length (mm)", "Extension");
    println!("{}", "-".repeat(34));
    for i in 0..NUM_ACTUATORS {
        let flag = if extensions[i] as f64 != lengths[i].trunc() { " (clamped)" } else { "" };
        println!("{:<10} {:>12.3}  {:>9}{}", i, lengths[i], extensions[i], flag);
    }
    println!();
    println!("Payload: {}", payload);

    Ok(())
}
