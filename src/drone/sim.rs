//! In-process stand-in for a real drone.
//!
//! Accepts every command the way a healthy Tello would, keeps a log of calls
//! for inspection, and mirrors the drone's own refusals: taking off while
//! flying or landing while on the ground is rejected. Useful for bench runs
//! with `--simulate` and for tests.

use tracing::info;

use super::{DroneControl, FlipDirection};
use crate::error::{PilotError, Result};

/// One recorded call on a [`SimulatedDrone`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DroneCall {
    Connect,
    Battery,
    StreamOn,
    StreamOff,
    Takeoff,
    Land,
    MoveUp(u32),
    Flip(FlipDirection),
    End,
}

/// Simulated drone with a call log.
#[derive(Debug, Clone)]
pub struct SimulatedDrone {
    battery: u8,
    flying: bool,
    streaming: bool,
    connected: bool,
    calls: Vec<DroneCall>,
    fail_on: Option<DroneCall>,
}

impl SimulatedDrone {
    pub fn new(battery: u8) -> Self {
        Self {
            battery,
            flying: false,
            streaming: false,
            connected: false,
            calls: Vec::new(),
            fail_on: None,
        }
    }

    /// Make every occurrence of `call` fail with a rejection.
    pub fn fail_on(mut self, call: DroneCall) -> Self {
        self.fail_on = Some(call);
        self
    }

    /// Calls received so far, oldest first.
    pub fn calls(&self) -> &[DroneCall] {
        &self.calls
    }

    pub fn is_flying(&self) -> bool {
        self.flying
    }

    pub fn is_streaming(&self) -> bool {
        self.streaming
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    fn record(&mut self, call: DroneCall) -> Result<()> {
        self.calls.push(call);
        if self.fail_on == Some(call) {
            return Err(reject(call, "error"));
        }
        if call != DroneCall::Connect && !self.connected {
            return Err(PilotError::DroneProtocol(format!(
                "{call:?} before connect"
            )));
        }
        Ok(())
    }
}

impl Default for SimulatedDrone {
    fn default() -> Self {
        Self::new(100)
    }
}

fn reject(call: DroneCall, response: &str) -> PilotError {
    PilotError::DroneRejected {
        command: format!("{call:?}"),
        response: response.to_string(),
    }
}

impl DroneControl for SimulatedDrone {
    fn kind(&self) -> &'static str {
        "sim"
    }

    fn connect(&mut self) -> Result<()> {
        self.record(DroneCall::Connect)?;
        self.connected = true;
        info!("Simulated drone connected");
        Ok(())
    }

    fn battery(&mut self) -> Result<u8> {
        self.record(DroneCall::Battery)?;
        Ok(self.battery)
    }

    fn stream_on(&mut self) -> Result<()> {
        self.record(DroneCall::StreamOn)?;
        self.streaming = true;
        Ok(())
    }

    fn stream_off(&mut self) -> Result<()> {
        self.record(DroneCall::StreamOff)?;
        self.streaming = false;
        Ok(())
    }

    fn takeoff(&mut self) -> Result<()> {
        self.record(DroneCall::Takeoff)?;
        if self.flying {
            return Err(reject(DroneCall::Takeoff, "error already flying"));
        }
        self.flying = true;
        info!("Simulated drone took off");
        Ok(())
    }

    fn land(&mut self) -> Result<()> {
        self.record(DroneCall::Land)?;
        if !self.flying {
            return Err(reject(DroneCall::Land, "error not flying"));
        }
        self.flying = false;
        info!("Simulated drone landed");
        Ok(())
    }

    fn move_up(&mut self, cm: u32) -> Result<()> {
        self.record(DroneCall::MoveUp(cm))?;
        if !self.flying {
            return Err(reject(DroneCall::MoveUp(cm), "error not flying"));
        }
        Ok(())
    }

    fn flip(&mut self, direction: FlipDirection) -> Result<()> {
        self.record(DroneCall::Flip(direction))?;
        info!("Simulated drone flipped {direction:?}");
        Ok(())
    }

    fn end(&mut self) -> Result<()> {
        self.record(DroneCall::End)?;
        self.connected = false;
        Ok(())
    }
}
