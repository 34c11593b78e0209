pub mod logger;
pub mod time;

pub use logger::{init_logger, Logger, Timer};
pub use time::{epoch, unix_midnight};
