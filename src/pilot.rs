//! Gesture pilot loop.
//!
//! One [`Pilot::tick`] is one frame: capture, mirror, detect, classify,
//! debounce, dispatch, caption, display, poll keys. The caller decides how
//! ticks are scheduled and when to stop; the pilot never spawns threads.

use std::path::PathBuf;
use std::time::Duration;

use gesture_pilot_core::{
    classify, Decision, Dispatcher, FlightCommand, FlightState, Gesture, DEFAULT_THRESHOLD,
};
use tracing::{debug, info, warn};

use crate::display::{AnnotatedFrame, Display, KeyAction};
use crate::drone::DroneControl;
use crate::error::{PilotError, Result};
use crate::session::DroneSession;
use crate::snapshot::SnapshotStore;
use crate::vision::overlay::{draw_caption, draw_hand};
use crate::vision::{mirror, primary_hand, DetectedHand, Frame, FrameSource, HandDetector};

/// Gesture loop configuration.
#[derive(Debug, Clone)]
pub struct PilotConfig {
    /// Consecutive frames needed to confirm a gesture.
    pub threshold: u32,
    /// Hands below this detection confidence are ignored.
    pub min_detection_confidence: f32,
    /// Existing directory for snapshot images.
    pub snapshot_dir: PathBuf,
    /// How long each frame waits for a keypress.
    pub key_poll: Duration,
    /// Take off and climb before the loop starts.
    pub auto_takeoff: bool,
    /// Climb after auto-takeoff, in centimeters.
    pub climb_cm: u32,
}

impl Default for PilotConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            min_detection_confidence: 0.5,
            snapshot_dir: PathBuf::from("Drone_images"),
            key_poll: Duration::from_millis(1),
            auto_takeoff: false,
            climb_cm: 50,
        }
    }
}

impl PilotConfig {
    pub fn validate(&self) -> Result<()> {
        if self.threshold == 0 {
            return Err(PilotError::InvalidConfig(
                "threshold must be at least 1".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.min_detection_confidence) {
            return Err(PilotError::InvalidConfig(format!(
                "min detection confidence {} outside 0..=1",
                self.min_detection_confidence
            )));
        }
        Ok(())
    }
}

/// Why the loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    QuitKey,
    Interrupt,
}

/// What the caller should do after a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopControl {
    Continue,
    Stop(StopReason),
}

/// Caption overlaid on the frame that dispatched `gesture`'s command.
pub fn caption_for(gesture: Gesture) -> &'static str {
    match gesture {
        Gesture::FingersOpen => "All Fingers Open Command Executed!",
        Gesture::ThumbUp => "Thumbs Up Command Executed!",
        Gesture::ThumbDown => "Thumbs Down Command Executed!",
        Gesture::IndexRight => "Index Right Command Executed!",
        Gesture::IndexLeft => "Index Left Command Executed!",
        Gesture::FingersClosed => "Image saved",
    }
}

/// Gesture-driven drone pilot.
///
/// Field order is drop order: the drone session closes (land, stream off,
/// end) before the camera and detector processes are released.
pub struct Pilot<D: DroneControl, S, H, V> {
    session: DroneSession<D>,
    source: S,
    detector: H,
    display: V,
    dispatcher: Dispatcher,
    snapshots: SnapshotStore,
    config: PilotConfig,
    frame_index: u64,
    last_gesture: Option<Gesture>,
}

impl<D, S, H, V> Pilot<D, S, H, V>
where
    D: DroneControl,
    S: FrameSource,
    H: HandDetector,
    V: Display,
{
    pub fn new(
        session: DroneSession<D>,
        source: S,
        detector: H,
        display: V,
        config: PilotConfig,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            session,
            source,
            detector,
            display,
            dispatcher: Dispatcher::new(config.threshold),
            snapshots: SnapshotStore::new(config.snapshot_dir.clone()),
            config,
            frame_index: 0,
            last_gesture: None,
        })
    }

    /// Take off and climb `climb_cm`, leaving the pilot airborne.
    pub fn take_off_and_climb(&mut self) -> Result<()> {
        self.session.drone().takeoff()?;
        self.dispatcher.complete(FlightCommand::Takeoff);
        info!("Took off, climbing {} cm", self.config.climb_cm);
        if self.config.climb_cm > 0 {
            self.session.drone().move_up(self.config.climb_cm)?;
        }
        Ok(())
    }

    /// Run the optional start-up sequence from the configuration.
    pub fn start(&mut self) -> Result<()> {
        if self.config.auto_takeoff {
            self.take_off_and_climb()?;
        }
        Ok(())
    }

    /// Process one frame end to end.
    pub fn tick(&mut self) -> Result<LoopControl> {
        let mut frame = self.source.next_frame()?;
        mirror(&mut frame);
        let hands = self.detector.detect(&frame)?;
        let annotated = self.process(frame, &hands)?;
        self.display.show(&annotated)?;

        match self.display.poll_key(self.config.key_poll)? {
            Some(KeyAction::Quit) => {
                info!("Quit key pressed");
                Ok(LoopControl::Stop(StopReason::QuitKey))
            }
            Some(KeyAction::Interrupt) => {
                info!("Interrupted from keyboard");
                Ok(LoopControl::Stop(StopReason::Interrupt))
            }
            None => Ok(LoopControl::Continue),
        }
    }

    /// Classify, dispatch and annotate an already mirrored frame.
    pub fn process(&mut self, mut frame: Frame, hands: &[DetectedHand]) -> Result<AnnotatedFrame> {
        self.frame_index += 1;

        let hand = primary_hand(hands, self.config.min_detection_confidence);
        if let Some(hand) = hand {
            draw_hand(&mut frame, &hand.landmarks);
        }
        let gesture = hand.and_then(|h| classify(&h.landmarks));
        if gesture != self.last_gesture {
            debug!(
                "frame {}: gesture {}",
                self.frame_index,
                gesture.map_or("none", |g| g.as_str())
            );
            self.last_gesture = gesture;
        }

        let caption = match self.dispatcher.decide(gesture) {
            Decision::Hold => None,
            Decision::Blocked { gesture, command } => {
                warn!(
                    "{gesture} confirmed but {command} not allowed while {}",
                    self.dispatcher.flight_state()
                );
                None
            }
            Decision::Fire { gesture, command } => {
                Some(self.execute(gesture, command, &frame)?)
            }
        };
        // Snapshots are written first, so they never carry the caption.
        if let Some(caption) = &caption {
            draw_caption(&mut frame, caption);
        }

        let count = gesture.map_or(0, |g| self.dispatcher.debouncer().count(g));
        Ok(AnnotatedFrame {
            frame,
            index: self.frame_index,
            gesture,
            count,
            threshold: self.dispatcher.debouncer().threshold(),
            flight: self.dispatcher.flight_state(),
            caption,
        })
    }

    fn execute(&mut self, gesture: Gesture, command: FlightCommand, frame: &Frame) -> Result<String> {
        info!("{gesture} confirmed, executing {command}");
        let caption = match command {
            FlightCommand::Takeoff => {
                self.session.drone().takeoff()?;
                caption_for(gesture).to_string()
            }
            FlightCommand::Land => {
                self.session.drone().land()?;
                caption_for(gesture).to_string()
            }
            FlightCommand::Flip(direction) => {
                self.session.drone().flip(direction)?;
                caption_for(gesture).to_string()
            }
            FlightCommand::Snapshot => {
                let path = self.snapshots.save(frame)?;
                format!("{}: {}", caption_for(gesture), path.display())
            }
        };
        self.dispatcher.complete(command);
        Ok(caption)
    }

    /// Land, stop the stream and end the drone link. Safe to call twice.
    pub fn shutdown(&mut self) {
        self.session.close();
    }

    pub fn flight_state(&self) -> FlightState {
        self.dispatcher.flight_state()
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn session_mut(&mut self) -> &mut DroneSession<D> {
        &mut self.session
    }

    pub fn display(&self) -> &V {
        &self.display
    }

    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = PilotConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.threshold, 30);
        assert_eq!(config.snapshot_dir, PathBuf::from("Drone_images"));
    }

    #[test]
    fn test_zero_threshold_rejected() {
        let config = PilotConfig {
            threshold: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(PilotError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_confidence_out_of_range_rejected() {
        let config = PilotConfig {
            min_detection_confidence: -0.1,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_captions() {
        assert_eq!(
            caption_for(Gesture::FingersOpen),
            "All Fingers Open Command Executed!"
        );
        assert_eq!(
            caption_for(Gesture::IndexRight),
            "Index Right Command Executed!"
        );
    }
}
