// Defaults for serial link, teleop loop, log format and output naming
use std::time::Duration;

// Serial port for the servo controller (Arduino UNO over USB)
pub const SERVO_PORT: &str = "/dev/ttyACM0";

// UART baud rate expected by the servo firmware
pub const SERVO_BAUDRATE: u32 = 115_200;

// Read timeout for the serial echo reader
pub const SERIAL_READ_TIMEOUT: Duration = Duration::from_millis(50);

// Teleop loop frequency (key poll + echo drain)
pub const LOOP_HZ: u64 = 50;

// Step multiplier applied to each key press (1 is slow)
pub const VEL_MULT: i32 = 2;

// Servo angle limits for the three-axis position protocol (degrees)
pub const SERVO_MIN_DEG: u8 = 0;
pub const SERVO_MAX_DEG: u8 = 180;
pub const SERVO_CENTER_DEG: u8 = 90;

// Metadata lines at the top of every tracker log
pub const HEADER_LINES: usize = 2;

// Trial log file names: {surface}__{direction}_{gait}_{speed}_{trial}.txt
pub const TRIAL_FILE_PATTERN: &str =
    r"^([A-Za-z0-9]+)__([A-Za-z0-9]+)_([A-Za-z0-9]+)_(\d+)_(\d+)\.txt$";

// Output plot prefix, one file per surface/direction/gait group
pub const GROUP_PLOT_PREFIX: &str = "Gait_";

// Plot canvas size in pixels
pub const PLOT_SIZE: (u32, u32) = (1000, 600);
