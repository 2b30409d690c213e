//! Camera frames and hand detection.

pub mod overlay;
pub mod sidecar;
pub mod stream;

pub use sidecar::{DetectorConfig, SidecarDetector};
pub use stream::{FfmpegStream, StreamConfig};

use std::process::Command;

use gesture_pilot_core::HandLandmarks;
use image::RgbImage;

use crate::error::Result;

/// One decoded camera frame, 8-bit RGB.
pub type Frame = RgbImage;

/// A hand reported by the detector for a single frame.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectedHand {
    pub landmarks: HandLandmarks,
    /// Detection confidence in 0.0..=1.0.
    pub score: f32,
    /// "Left" or "Right" as reported by the model, if any.
    pub handedness: Option<String>,
}

/// Source of camera frames.
pub trait FrameSource {
    /// Block until the next frame is available.
    fn next_frame(&mut self) -> Result<Frame>;
}

/// Hand-landmark detector.
pub trait HandDetector {
    /// Detect hands in `frame`. An empty vector means no hand was found.
    fn detect(&mut self, frame: &Frame) -> Result<Vec<DetectedHand>>;
}

impl<S: FrameSource + ?Sized> FrameSource for Box<S> {
    fn next_frame(&mut self) -> Result<Frame> {
        (**self).next_frame()
    }
}

impl<H: HandDetector + ?Sized> HandDetector for Box<H> {
    fn detect(&mut self, frame: &Frame) -> Result<Vec<DetectedHand>> {
        (**self).detect(frame)
    }
}

/// Mirror a frame left-to-right so the operator sees it like a mirror.
pub fn mirror(frame: &mut Frame) {
    image::imageops::flip_horizontal_in_place(frame);
}

/// First hand at or above `min_score`, in detector order.
pub fn primary_hand(hands: &[DetectedHand], min_score: f32) -> Option<&DetectedHand> {
    hands.iter().find(|h| h.score >= min_score)
}

/// Command for a helper process (decoder, detector).
///
/// On Unix the helper gets its own process group, so a terminal Ctrl-C
/// reaches only the pilot; the helper is stopped when its owner drops.
pub(crate) fn helper_command(program: &str) -> Command {
    let mut command = Command::new(program);
    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        command.process_group(0);
    }
    command
}

#[cfg(test)]
mod tests {
    use super::*;
    use gesture_pilot_core::{Point2, LANDMARK_COUNT};
    use image::Rgb;

    fn hand(score: f32) -> DetectedHand {
        DetectedHand {
            landmarks: HandLandmarks::new([Point2::new(0.5, 0.5); LANDMARK_COUNT]),
            score,
            handedness: None,
        }
    }

    #[test]
    fn test_primary_hand_skips_low_confidence() {
        let hands = vec![hand(0.2), hand(0.7), hand(0.9)];
        assert_eq!(primary_hand(&hands, 0.5).unwrap().score, 0.7);
    }

    #[test]
    fn test_primary_hand_none_when_all_below() {
        let hands = vec![hand(0.1), hand(0.3)];
        assert!(primary_hand(&hands, 0.5).is_none());
        assert!(primary_hand(&[], 0.0).is_none());
    }

    #[test]
    fn test_mirror_swaps_columns() {
        let mut frame = Frame::new(2, 1);
        frame.put_pixel(0, 0, Rgb([255, 0, 0]));
        frame.put_pixel(1, 0, Rgb([0, 0, 255]));
        mirror(&mut frame);
        assert_eq!(frame.get_pixel(0, 0), &Rgb([0, 0, 255]));
        assert_eq!(frame.get_pixel(1, 0), &Rgb([255, 0, 0]));
    }

    /// Process group of `pid`, from `/proc/<pid>/stat`.
    #[cfg(target_os = "linux")]
    fn process_group(pid: &str) -> u32 {
        let stat = std::fs::read_to_string(format!("/proc/{pid}/stat")).unwrap();
        // Fields after the parenthesized command name: state, ppid, pgrp.
        let after_comm = &stat[stat.rfind(')').unwrap() + 1..];
        after_comm.split_whitespace().nth(2).unwrap().parse().unwrap()
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_helper_runs_in_own_process_group() {
        let mut child = helper_command("sleep")
            .arg("5")
            .stdin(std::process::Stdio::null())
            .spawn()
            .unwrap();
        let child_group = process_group(&child.id().to_string());
        let own_group = process_group("self");
        let _ = child.kill();
        let _ = child.wait();

        assert_eq!(child_group, child.id());
        assert_ne!(child_group, own_group);
    }
}
