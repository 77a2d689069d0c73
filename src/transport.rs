use crate::encoder::Payload;
use anyhow::{Context, Result};
use serialport::SerialPort;
use std::io::Write;
use std::time::Duration;
use tracing::debug;

/// Default serial port for the platform microcontroller
pub const DEFAULT_PORT: &str = "/dev/ttyUSB0";

/// Default serial baudrate
pub const DEFAULT_BAUDRATE: u32 = 115_200;

/// Sink for encoded payloads
pub trait Transport {
    /// Blocking write of one payload
    fn send(&mut self, payload: &Payload) -> Result<()>;

    /// Short description for logs
    fn describe(&self) -> String;
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn send(&mut self, payload: &Payload) -> Result<()> {
        (**self).send(payload)
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

/// Serial link to the platform microcontroller
/// The port is closed when this value is dropped
pub struct SerialTransport {
    port: Box<dyn SerialPort>,
    port_name: String,
    baudrate: u32,
}

impl SerialTransport {
    /// Open the serial port
    pub fn open(port_name: &str, baudrate: u32) -> Result<Self> {
        let port = serialport::new(port_name, baudrate)
            .timeout(Duration::from_millis(100))
            .open()
            .context(format!("Failed to open serial port {}", port_name))?;

        Ok(Self {
            port,
            port_name: port_name.to_string(),
            baudrate,
        })
    }

    /// List serial ports visible to the system
    pub fn list_ports() -> Vec<String> {
        serialport::available_ports()
            .map(|ports| ports.into_iter().map(|p| p.port_name).collect())
            .unwrap_or_default()
    }
}

impl Transport for SerialTransport {
    fn send(&mut self, payload: &Payload) -> Result<()> {
        self.port
            .write_all(payload.as_bytes())
            .context(format!("Failed to write payload to {}", self.port_name))?;
        self.port.flush().context("Failed to flush serial port")?;
        debug!(port = %self.port_name, payload = %payload, "payload sent");
        Ok(())
    }

    fn describe(&self) -> String {
        format!("serial {} at {} baud", self.port_name, self.baudrate)
    }
}

/// Debug transport: nothing is written, payloads are shown on the console
#[derive(Debug, Default)]
pub struct NullTransport {
    sent: u64,
}

impl NullTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> u64 {
        self.sent
    }

    /// Console form of the latest payload, shown regardless of log level
    fn console_line(&self, payload: &Payload) -> String {
        format!("Payload #{}: {}", self.sent, payload)
    }
}

impl Transport for NullTransport {
    fn send(&mut self, payload: &Payload) -> Result<()> {
        self.sent += 1;
        println!("{}", self.console_line(payload));
        Ok(())
    }

    fn describe(&self) -> String {
        "no-serial debug output".to_string()
    }
}

/// Pick the transport at startup
pub fn open_transport(no_serial: bool, port: &str, baudrate: u32) -> Result<Box<dyn Transport>> {
    if no_serial {
        return Ok(Box::new(NullTransport::new()));
    }
    let serial = SerialTransport::open(port, baudrate)?;
    Ok(Box::new(serial))
}
