//! The device's dynamic and upgrade resources.

pub mod echo;
pub mod led;
pub mod session;
pub mod uptime;

pub use echo::Echo;
pub use led::{LedBank, LedCommand, LedControl, LedDriver};
pub use session::EchoSession;
pub use uptime::Uptime;
