//! LED control over a JSON command.
//!
//! `POST /led` with `{"led_num": 1, "led_state": true}` switches one LED.
//! The body is accumulated, decoded on `Final` and applied once through a
//! [`LedDriver`].

use std::sync::{Arc, Mutex};

use serde::Deserialize;
use thiserror::Error;
use tracing::info;

use crate::error::ResourceError;
use crate::resource::dynamic::{Command, PayloadDecoder, ResponseContext, SideEffect};

/// Buffer size for LED commands.
pub const LED_PAYLOAD_CAPACITY: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct LedCommand {
    pub led_num: i32,
    pub led_state: bool,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DriverError {
    #[error("no LED {led} (device has {count})")]
    NoSuchLed { led: i32, count: usize },
    #[error("LED device unavailable")]
    Unavailable,
}

/// The LED device the command acts on.
pub trait LedDriver: Send + Sync {
    fn led_on(&self, led: i32) -> Result<(), DriverError>;
    fn led_off(&self, led: i32) -> Result<(), DriverError>;
}

/// In-memory LED bank.
#[derive(Debug)]
pub struct LedBank {
    states: Mutex<Vec<bool>>,
}

impl LedBank {
    pub fn new(count: u32) -> Self {
        Self {
            states: Mutex::new(vec![false; count as usize]),
        }
    }

    /// Current state of every LED, `None` if the bank is poisoned.
    pub fn snapshot(&self) -> Option<Vec<bool>> {
        self.states.lock().ok().map(|s| s.clone())
    }

    fn set(&self, led: i32, on: bool) -> Result<(), DriverError> {
        let mut states = self.states.lock().map_err(|_| DriverError::Unavailable)?;
        let count = states.len();
        let index = usize::try_from(led).map_err(|_| DriverError::NoSuchLed { led, count })?;
        let slot = states
            .get_mut(index)
            .ok_or(DriverError::NoSuchLed { led, count })?;
        *slot = on;
        Ok(())
    }
}

impl LedDriver for LedBank {
    fn led_on(&self, led: i32) -> Result<(), DriverError> {
        self.set(led, true)
    }

    fn led_off(&self, led: i32) -> Result<(), DriverError> {
        self.set(led, false)
    }
}

/// Decodes an [`LedCommand`] from JSON. Both fields are required.
#[derive(Debug, Default, Clone, Copy)]
pub struct LedCommandDecoder;

impl PayloadDecoder for LedCommandDecoder {
    type Output = LedCommand;

    fn decode(&self, payload: &[u8]) -> Result<LedCommand, ResourceError> {
        serde_json::from_slice(payload).map_err(|e| ResourceError::DecodeFailure(e.to_string()))
    }
}

/// Applies decoded commands to a driver.
pub struct LedSwitch {
    driver: Arc<dyn LedDriver>,
}

impl LedSwitch {
    pub fn new(driver: Arc<dyn LedDriver>) -> Self {
        Self { driver }
    }
}

impl SideEffect<LedCommand> for LedSwitch {
    fn apply(&self, cmd: LedCommand) -> Result<ResponseContext, ResourceError> {
        info!(
            led = cmd.led_num,
            state = cmd.led_state,
            "POST request setting LED"
        );

        let result = if cmd.led_state {
            self.driver.led_on(cmd.led_num)
        } else {
            self.driver.led_off(cmd.led_num)
        };

        result
            .map(|()| ResponseContext::empty_final())
            .map_err(|e| ResourceError::SideEffectFailure(e.to_string()))
    }
}

pub type LedControl = Command<LedCommandDecoder, LedSwitch>;

impl LedControl {
    pub fn with_driver(driver: Arc<dyn LedDriver>) -> Self {
        Command::new(LedCommandDecoder, LedSwitch::new(driver))
    }
}
