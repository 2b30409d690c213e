//! gesture_pilot - fly a Tello quadcopter with hand gestures
//!
//! Frames come from the drone's video stream, hands from an external
//! landmark detector, and gestures held long enough become flight commands.
//! Classification, debouncing and dispatch live in the `gesture_pilot_core`
//! crate; this crate provides the collaborators around them.

pub mod config;
pub mod display;
pub mod drone;
pub mod error;
pub mod logging;
pub mod pilot;
pub mod session;
pub mod snapshot;
pub mod vision;

pub use error::{PilotError, Result};
pub use gesture_pilot_core::{
    classify, Decision, Dispatcher, FlightCommand, FlightState, Gesture, HandLandmarks, Point2,
};
pub use pilot::{LoopControl, Pilot, PilotConfig, StopReason};
pub use session::DroneSession;
