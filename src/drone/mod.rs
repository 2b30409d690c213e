//! Drone control collaborators.
//!
//! [`DroneControl`] is the seam between the gesture loop and the aircraft.
//! [`TelloLink`] talks to real hardware over the Tello text SDK;
//! [`SimulatedDrone`] stands in for it on the bench and in tests.

pub mod sim;
pub mod tello;

pub use gesture_pilot_core::FlipDirection;
pub use sim::{DroneCall, SimulatedDrone};
pub use tello::{TelloConfig, TelloLink};

use crate::error::Result;

/// Synchronous drone command interface.
///
/// Every call blocks until the drone acknowledges or the link gives up.
/// Nothing here retries.
pub trait DroneControl {
    /// Short identifier for logs (e.g., "tello", "sim").
    fn kind(&self) -> &'static str;

    /// Enter command mode.
    fn connect(&mut self) -> Result<()>;

    /// Remaining battery in percent.
    fn battery(&mut self) -> Result<u8>;

    /// Start the onboard video stream.
    fn stream_on(&mut self) -> Result<()>;

    /// Stop the onboard video stream.
    fn stream_off(&mut self) -> Result<()>;

    fn takeoff(&mut self) -> Result<()>;

    fn land(&mut self) -> Result<()>;

    /// Climb by `cm` centimeters.
    fn move_up(&mut self, cm: u32) -> Result<()>;

    fn flip(&mut self, direction: FlipDirection) -> Result<()>;

    /// Release the link. The drone must not be commanded afterwards.
    fn end(&mut self) -> Result<()>;
}

impl<D: DroneControl + ?Sized> DroneControl for Box<D> {
    fn kind(&self) -> &'static str {
        (**self).kind()
    }

    fn connect(&mut self) -> Result<()> {
        (**self).connect()
    }

    fn battery(&mut self) -> Result<u8> {
        (**self).battery()
    }

    fn stream_on(&mut self) -> Result<()> {
        (**self).stream_on()
    }

    fn stream_off(&mut self) -> Result<()> {
        (**self).stream_off()
    }

    fn takeoff(&mut self) -> Result<()> {
        (**self).takeoff()
    }

    fn land(&mut self) -> Result<()> {
        (**self).land()
    }

    fn move_up(&mut self, cm: u32) -> Result<()> {
        (**self).move_up(cm)
    }

    fn flip(&mut self, direction: FlipDirection) -> Result<()> {
        (**self).flip(direction)
    }

    fn end(&mut self) -> Result<()> {
        (**self).end()
    }
}
