//! Scoped drone session.
//!
//! Opening a session connects, reads the battery and starts the video
//! stream. Closing it runs land, stream off and end, in that order, exactly
//! once. Dropping an open session closes it, so the drone is released on
//! every exit path including errors and panics that unwind.

use tracing::{info, warn};

use crate::drone::DroneControl;
use crate::error::Result;

/// Connected drone with guaranteed shutdown.
pub struct DroneSession<D: DroneControl> {
    drone: D,
    battery: u8,
    closed: bool,
}

impl<D: DroneControl> DroneSession<D> {
    /// Connect, log the battery level and start the video stream.
    pub fn open(mut drone: D) -> Result<Self> {
        drone.connect()?;
        let battery = drone.battery()?;
        info!("Battery: {battery}%");
        drone.stream_on()?;
        Ok(Self {
            drone,
            battery,
            closed: false,
        })
    }

    /// Battery level read when the session opened.
    pub fn battery(&self) -> u8 {
        self.battery
    }

    pub fn drone(&mut self) -> &mut D {
        &mut self.drone
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Land, stop the stream and end the link.
    ///
    /// Each step is attempted even if an earlier one fails; failures are
    /// logged. Landing is attempted unconditionally, so a drone that is
    /// already down may refuse it. Calling this again does nothing.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        info!("Shutting down {} session", self.drone.kind());

        if let Err(e) = self.drone.land() {
            warn!("Land during shutdown failed: {e}");
        }
        if let Err(e) = self.drone.stream_off() {
            warn!("Stream off during shutdown failed: {e}");
        }
        if let Err(e) = self.drone.end() {
            warn!("End during shutdown failed: {e}");
        }
    }
}

impl<D: DroneControl> Drop for DroneSession<D> {
    fn drop(&mut self) {
        self.close();
    }
}
