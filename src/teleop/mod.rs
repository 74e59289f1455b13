// Keyboard teleoperation of the servo controller
//
// Key presses are mapped to servo commands and written to the UART; any
// line the controller prints back is echoed to the terminal.

pub mod keys;
pub mod link;
pub mod protocol;

use crossterm::event::{self, Event};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use std::io::Write;
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tokio::time::interval;
use tracing::{debug, info};

use crate::config::LOOP_HZ;
pub use keys::{KeyAction, TeleopMode, TeleopState};
pub use link::{LineBuffer, ServoLink};
pub use protocol::ServoCommand;

/// Error types for the teleop session
#[derive(Debug, thiserror::Error)]
pub enum TeleopError {
    #[error("Serial port error: {0}")]
    Serial(#[from] serialport::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone)]
pub struct TeleopConfig {
    pub port: String,
    pub baudrate: u32,
    pub mode: TeleopMode,
    pub vel_mult: i32,
}

pub async fn run(config: TeleopConfig) -> Result<(), TeleopError> {
    info!("Opening servo link on {} @ {}", config.port, config.baudrate);
    let mut servo = ServoLink::open(&config.port, config.baudrate)?;

    let (tx, mut rx) = mpsc::unbounded_channel();
    let reader = servo.reader()?;
    let reader_task = tokio::task::spawn_blocking(move || link::forward_lines(reader, tx));

    let mut state = TeleopState::new(config.mode, config.vel_mult);
    servo.send(&state.current_command())?;

    match config.mode {
        TeleopMode::Single => info!("Controls: Up/Down=move, Q/Esc=quit"),
        TeleopMode::Triple => {
            info!("Controls: Up/Down=servo 0, Left/Right=servo 1, PgUp/PgDn=servo 2, Q/Esc=quit")
        }
    }

    enable_raw_mode()?;
    let result = teleop_loop(&mut servo, &mut state, &mut rx).await;
    disable_raw_mode()?;

    // Reader notices the closed channel on its next read timeout
    drop(rx);
    if let Err(e) = reader_task.await {
        debug!("Echo reader join failed: {}", e);
    }
    info!("Exiting...");
    result
}

async fn teleop_loop(
    servo: &mut ServoLink,
    state: &mut TeleopState,
    rx: &mut UnboundedReceiver<String>,
) -> Result<(), TeleopError> {
    let mut tick = interval(Duration::from_millis(1000 / LOOP_HZ));
    let mut stdout = std::io::stdout();

    loop {
        tick.tick().await;

        // 1. Echo everything the controller printed since last tick
        while let Ok(line) = rx.try_recv() {
            // Raw mode: explicit carriage return
            write!(stdout, "{}\r\n", line)?;
        }
        stdout.flush()?;

        // 2. Drain pending key events (non-blocking)
        while event::poll(Duration::ZERO)? {
            if let Event::Key(key) = event::read()? {
                match state.on_key(&key) {
                    KeyAction::Send(cmd) => servo.send(&cmd)?,
                    KeyAction::Quit => return Ok(()),
                    KeyAction::Ignore => {}
                }
            }
        }
    }
}
