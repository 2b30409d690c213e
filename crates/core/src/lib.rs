//! gesture_pilot_core - Pure no_std gesture logic for gesture_pilot
//!
//! This crate contains the frame-by-frame decision logic that turns hand
//! landmarks into flight commands. It performs no I/O and can be tested on
//! host without any feature flags.
//!
//! Every type here is plain data: a frame's classification, the run-length
//! counters and the grounded/airborne flag are all owned by the caller, so
//! replaying a recorded landmark sequence reproduces the same commands.
//!
//! # Modules
//!
//! - [`landmarks`]: 21-point hand landmark set and joint indices
//! - [`gesture`]: Geometric gesture classifier
//! - [`debounce`]: Per-gesture consecutive-frame counters
//! - [`dispatch`]: Gesture to command mapping and flight-state guards

#![cfg_attr(not(test), no_std)]

pub mod debounce;
pub mod dispatch;
pub mod gesture;
pub mod landmarks;

pub use debounce::{Debouncer, DEFAULT_THRESHOLD};
pub use dispatch::{Decision, Dispatcher, FlightCommand, FlightState, FlipDirection};
pub use gesture::{classify, Gesture};
pub use landmarks::{HandLandmarks, Point2, LANDMARK_COUNT};
