// Servo controller wire format
//
// Single-axis firmware reads a decimal position string (no terminator).
// Three-axis firmware reads exactly three raw bytes, one angle per servo.

/// One command for the servo controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServoCommand {
    /// Position in servo steps, sent as UTF-8 decimal text
    Single(i32),
    /// Angles in degrees for servos 0..3, sent as raw bytes
    Position([u8; 3]),
}

impl ServoCommand {
    /// Bytes written to the serial port
    pub fn encode(&self) -> Vec<u8> {
        match self {
            ServoCommand::Single(pos) => pos.to_string().into_bytes(),
            ServoCommand::Position(angles) => angles.to_vec(),
        }
    }
}
