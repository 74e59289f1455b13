// Serial link to the servo controller

use serialport::{self, SerialPort};
use std::io::{ErrorKind, Read, Write};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, warn};

use super::protocol::ServoCommand;
use super::TeleopError;
use crate::config::SERIAL_READ_TIMEOUT;

/// Write side of the servo UART
pub struct ServoLink {
    port: Box<dyn SerialPort>,
}

impl ServoLink {
    pub fn open(port_name: &str, baudrate: u32) -> Result<Self, TeleopError> {
        let port = serialport::new(port_name, baudrate)
            .timeout(SERIAL_READ_TIMEOUT)
            .open()?;
        Ok(Self { port })
    }

    /// Independent handle for the echo reader
    pub fn reader(&self) -> Result<Box<dyn SerialPort>, TeleopError> {
        Ok(self.port.try_clone()?)
    }

    pub fn send(&mut self, cmd: &ServoCommand) -> Result<(), TeleopError> {
        let bytes = cmd.encode();
        debug!("Sending {:?} as {:02X?}", cmd, bytes);
        self.port.write_all(&bytes)?;
        self.port.flush()?;
        Ok(())
    }
}

/// Longest run without `\n` kept before it is flushed as a line
pub const MAX_LINE_BYTES: usize = 1024;

/// Splits received bytes into text lines
#[derive(Debug, Default)]
pub struct LineBuffer {
    pending: Vec<u8>,
}

impl LineBuffer {
    /// Append bytes, returning every line completed by them (without `\r\n`)
    pub fn push(&mut self, bytes: &[u8]) -> Vec<String> {
        self.pending.extend_from_slice(bytes);
        let mut lines = Vec::new();
        while let Some(pos) = self.pending.iter().position(|&b| b == b'\n') {
            let raw: Vec<u8> = self.pending.drain(..=pos).collect();
            let text = String::from_utf8_lossy(&raw[..raw.len() - 1]);
            lines.push(text.trim_end_matches('\r').to_string());
        }
        while self.pending.len() >= MAX_LINE_BYTES {
            let raw: Vec<u8> = self.pending.drain(..MAX_LINE_BYTES).collect();
            lines.push(String::from_utf8_lossy(&raw).into_owned());
        }
        lines
    }
}

/// Blocking loop: forward device lines until the port fails or the receiver is gone
pub fn forward_lines(mut port: Box<dyn SerialPort>, tx: UnboundedSender<String>) {
    let mut buffer = LineBuffer::default();
    let mut chunk = [0u8; 256];

    while !tx.is_closed() {
        match port.read(&mut chunk) {
            Ok(0) => {}
            Ok(n) => {
                for line in buffer.push(&chunk[..n]) {
                    if tx.send(line).is_err() {
                        return;
                    }
                }
            }
            Err(e) if e.kind() == ErrorKind::TimedOut => {}
            Err(e) => {
                warn!("Serial read failed: {}", e);
                return;
            }
        }
    }
    debug!("Echo reader stopped");
}
