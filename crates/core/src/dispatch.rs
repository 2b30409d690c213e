//! Gesture to flight-command dispatch
//!
//! Wraps a [`Debouncer`] with the gesture → command mapping and the single
//! piece of flight state: grounded or airborne. The dispatcher only decides;
//! executing the command is the caller's job, and the caller reports success
//! back through [`Dispatcher::complete`] so the flight state changes only
//! after the drone accepted the command.

use core::fmt;

use crate::debounce::{Debouncer, DEFAULT_THRESHOLD};
use crate::gesture::Gesture;

/// Whether the drone is on the ground or flying.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlightState {
    #[default]
    Grounded,
    Airborne,
}

impl FlightState {
    pub fn is_airborne(self) -> bool {
        self == FlightState::Airborne
    }
}

impl fmt::Display for FlightState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlightState::Grounded => f.write_str("grounded"),
            FlightState::Airborne => f.write_str("airborne"),
        }
    }
}

/// Flip direction, from the drone's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlipDirection {
    Left,
    Right,
    Forward,
    Back,
}

impl FlipDirection {
    /// Single-letter code used by the drone's text SDK.
    pub fn code(self) -> char {
        match self {
            FlipDirection::Left => 'l',
            FlipDirection::Right => 'r',
            FlipDirection::Forward => 'f',
            FlipDirection::Back => 'b',
        }
    }
}

/// Command issued once a gesture is confirmed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlightCommand {
    Takeoff,
    Land,
    Flip(FlipDirection),
    Snapshot,
}

impl FlightCommand {
    /// Command bound to a confirmed gesture.
    ///
    /// The camera image is mirrored, so a screen-right index points to the
    /// drone's left and flips that way.
    pub fn for_gesture(gesture: Gesture) -> Self {
        match gesture {
            Gesture::FingersOpen => FlightCommand::Takeoff,
            Gesture::ThumbUp => FlightCommand::Flip(FlipDirection::Back),
            Gesture::ThumbDown => FlightCommand::Land,
            Gesture::IndexRight => FlightCommand::Flip(FlipDirection::Left),
            Gesture::IndexLeft => FlightCommand::Flip(FlipDirection::Right),
            Gesture::FingersClosed => FlightCommand::Snapshot,
        }
    }

    /// Whether the command may run in `state`.
    pub fn permitted(self, state: FlightState) -> bool {
        match self {
            FlightCommand::Takeoff => state == FlightState::Grounded,
            FlightCommand::Land => state == FlightState::Airborne,
            FlightCommand::Flip(_) | FlightCommand::Snapshot => true,
        }
    }
}

impl fmt::Display for FlightCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlightCommand::Takeoff => f.write_str("takeoff"),
            FlightCommand::Land => f.write_str("land"),
            FlightCommand::Flip(dir) => write!(f, "flip {}", dir.code()),
            FlightCommand::Snapshot => f.write_str("snapshot"),
        }
    }
}

/// Outcome of one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// No gesture confirmed this frame.
    Hold,
    /// Gesture confirmed and its command is allowed: execute it.
    Fire {
        gesture: Gesture,
        command: FlightCommand,
    },
    /// Gesture confirmed but the flight state forbids its command.
    Blocked {
        gesture: Gesture,
        command: FlightCommand,
    },
}

/// Debounced gesture dispatcher with flight-state guards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dispatcher {
    debouncer: Debouncer,
    flight: FlightState,
}

impl Dispatcher {
    /// New dispatcher, grounded, with the given confirmation threshold.
    pub fn new(threshold: u32) -> Self {
        Self {
            debouncer: Debouncer::new(threshold),
            flight: FlightState::Grounded,
        }
    }

    /// Feed one frame's classification and decide what to do.
    pub fn decide(&mut self, gesture: Option<Gesture>) -> Decision {
        let Some(gesture) = self.debouncer.observe(gesture) else {
            return Decision::Hold;
        };
        let command = FlightCommand::for_gesture(gesture);
        if command.permitted(self.flight) {
            Decision::Fire { gesture, command }
        } else {
            Decision::Blocked { gesture, command }
        }
    }

    /// Record that `command` was executed successfully.
    pub fn complete(&mut self, command: FlightCommand) {
        match command {
            FlightCommand::Takeoff => self.flight = FlightState::Airborne,
            FlightCommand::Land => self.flight = FlightState::Grounded,
            FlightCommand::Flip(_) | FlightCommand::Snapshot => {}
        }
    }

    pub fn flight_state(&self) -> FlightState {
        self.flight
    }

    pub fn debouncer(&self) -> &Debouncer {
        &self.debouncer
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed(d: &mut Dispatcher, gesture: Option<Gesture>, frames: u32) -> [u32; 3] {
        // [hold, fire, blocked]
        let mut tally = [0; 3];
        for _ in 0..frames {
            match d.decide(gesture) {
                Decision::Hold => tally[0] += 1,
                Decision::Fire { command, .. } => {
                    tally[1] += 1;
                    d.complete(command);
                }
                Decision::Blocked { .. } => tally[2] += 1,
            }
        }
        tally
    }

    #[test]
    fn test_gesture_mapping() {
        use FlightCommand::*;
        assert_eq!(FlightCommand::for_gesture(Gesture::FingersOpen), Takeoff);
        assert_eq!(
            FlightCommand::for_gesture(Gesture::ThumbUp),
            Flip(FlipDirection::Back)
        );
        assert_eq!(FlightCommand::for_gesture(Gesture::ThumbDown), Land);
        assert_eq!(
            FlightCommand::for_gesture(Gesture::IndexRight),
            Flip(FlipDirection::Left)
        );
        assert_eq!(
            FlightCommand::for_gesture(Gesture::IndexLeft),
            Flip(FlipDirection::Right)
        );
        assert_eq!(FlightCommand::for_gesture(Gesture::FingersClosed), Snapshot);
    }

    #[test]
    fn test_starts_grounded() {
        assert_eq!(Dispatcher::default().flight_state(), FlightState::Grounded);
    }

    #[test]
    fn test_takeoff_fires_on_frame_30() {
        let mut d = Dispatcher::default();
        assert_eq!(feed(&mut d, Some(Gesture::FingersOpen), 29), [29, 0, 0]);
        assert_eq!(
            d.decide(Some(Gesture::FingersOpen)),
            Decision::Fire {
                gesture: Gesture::FingersOpen,
                command: FlightCommand::Takeoff,
            }
        );
        // Not airborne until the caller confirms.
        assert_eq!(d.flight_state(), FlightState::Grounded);
        d.complete(FlightCommand::Takeoff);
        assert_eq!(d.flight_state(), FlightState::Airborne);
    }

    #[test]
    fn test_takeoff_blocked_while_airborne() {
        let mut d = Dispatcher::default();
        d.complete(FlightCommand::Takeoff);
        assert_eq!(feed(&mut d, Some(Gesture::FingersOpen), 30), [29, 0, 1]);
        assert_eq!(d.flight_state(), FlightState::Airborne);
        assert_eq!(d.debouncer().count(Gesture::FingersOpen), 0);
    }

    #[test]
    fn test_land_blocked_while_grounded() {
        let mut d = Dispatcher::default();
        assert_eq!(feed(&mut d, Some(Gesture::ThumbDown), 30), [29, 0, 1]);
        assert_eq!(d.flight_state(), FlightState::Grounded);
    }

    #[test]
    fn test_takeoff_then_land() {
        let mut d = Dispatcher::default();
        assert_eq!(feed(&mut d, Some(Gesture::FingersOpen), 30)[1], 1);
        assert_eq!(feed(&mut d, Some(Gesture::ThumbDown), 30)[1], 1);
        assert_eq!(d.flight_state(), FlightState::Grounded);
    }

    #[test]
    fn test_flips_and_snapshot_unguarded() {
        for gesture in [
            Gesture::ThumbUp,
            Gesture::IndexLeft,
            Gesture::IndexRight,
            Gesture::FingersClosed,
        ] {
            let mut grounded = Dispatcher::default();
            assert_eq!(feed(&mut grounded, Some(gesture), 30)[1], 1);

            let mut airborne = Dispatcher::default();
            airborne.complete(FlightCommand::Takeoff);
            assert_eq!(feed(&mut airborne, Some(gesture), 30)[1], 1);
        }
    }

    #[test]
    fn test_none_frame_cancels_pending_snapshot() {
        let mut d = Dispatcher::default();
        feed(&mut d, Some(Gesture::FingersClosed), 29);
        assert_eq!(d.decide(None), Decision::Hold);
        assert_eq!(d.debouncer().count(Gesture::FingersClosed), 0);
        assert_eq!(feed(&mut d, Some(Gesture::FingersClosed), 29)[1], 0);
    }

    #[test]
    fn test_command_display() {
        extern crate std;
        use std::string::ToString;
        assert_eq!(FlightCommand::Takeoff.to_string(), "takeoff");
        assert_eq!(
            FlightCommand::Flip(FlipDirection::Back).to_string(),
            "flip b"
        );
    }
}
