//! Command line and environment configuration.
//!
//! Every flag can also be set through a `GESTURE_PILOT_*` environment
//! variable. [`Cli`] is parsed once and split into the per-component config
//! structs.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::drone::TelloConfig;
use crate::error::{PilotError, Result};
use crate::pilot::PilotConfig;
use crate::vision::{DetectorConfig, StreamConfig};

#[derive(Parser, Debug, Clone)]
#[command(
    name = "gesture_pilot",
    version,
    about = "Fly a Tello quadcopter with hand gestures"
)]
pub struct Cli {
    /// Drone command address
    #[arg(long, env = "GESTURE_PILOT_DRONE_ADDR", default_value = "192.168.10.1:8889")]
    pub drone_addr: SocketAddr,

    /// Local UDP port for drone commands
    #[arg(long, env = "GESTURE_PILOT_LOCAL_PORT", default_value_t = 8889)]
    pub local_port: u16,

    /// Default command response timeout in milliseconds
    #[arg(long, env = "GESTURE_PILOT_RESPONSE_TIMEOUT_MS", default_value_t = 7000)]
    pub response_timeout_ms: u64,

    /// Takeoff response timeout in milliseconds
    #[arg(long, env = "GESTURE_PILOT_TAKEOFF_TIMEOUT_MS", default_value_t = 20000)]
    pub takeoff_timeout_ms: u64,

    /// Video input passed to ffmpeg
    #[arg(long, env = "GESTURE_PILOT_VIDEO_SOURCE", default_value = "udp://0.0.0.0:11111")]
    pub video_source: String,

    #[arg(long, env = "GESTURE_PILOT_FRAME_WIDTH", default_value_t = 960)]
    pub frame_width: u32,

    #[arg(long, env = "GESTURE_PILOT_FRAME_HEIGHT", default_value_t = 720)]
    pub frame_height: u32,

    /// ffmpeg executable
    #[arg(long, env = "GESTURE_PILOT_FFMPEG", default_value = "ffmpeg")]
    pub ffmpeg: String,

    /// Hand landmark detector executable
    #[arg(long, env = "GESTURE_PILOT_DETECTOR", default_value = "hand-landmarks")]
    pub detector: String,

    /// Extra detector argument (repeatable)
    #[arg(long = "detector-arg", allow_hyphen_values = true)]
    pub detector_args: Vec<String>,

    /// Ignore hands below this confidence
    #[arg(long, env = "GESTURE_PILOT_MIN_CONFIDENCE", default_value_t = 0.5)]
    pub min_detection_confidence: f32,

    /// Consecutive frames needed to confirm a gesture
    #[arg(long, env = "GESTURE_PILOT_THRESHOLD", default_value_t = 30)]
    pub threshold: u32,

    /// Existing directory for snapshots
    #[arg(long, env = "GESTURE_PILOT_SNAPSHOT_DIR", default_value = "Drone_images")]
    pub snapshot_dir: PathBuf,

    /// Take off and climb before reading gestures
    #[arg(long, env = "GESTURE_PILOT_AUTO_TAKEOFF")]
    pub auto_takeoff: bool,

    /// Climb after auto-takeoff, in centimeters
    #[arg(long, env = "GESTURE_PILOT_CLIMB_CM", default_value_t = 50)]
    pub climb_cm: u32,

    /// Fly a simulated drone instead of a real one
    #[arg(long, env = "GESTURE_PILOT_SIMULATE")]
    pub simulate: bool,

    /// Show status in the terminal instead of a video window
    #[arg(long, env = "GESTURE_PILOT_NO_WINDOW")]
    pub no_window: bool,

    /// Keyboard poll per frame in milliseconds
    #[arg(long, env = "GESTURE_PILOT_KEY_POLL_MS", default_value_t = 1)]
    pub key_poll_ms: u64,

    /// Log filter, e.g. `debug` or `gesture_pilot=trace`
    #[arg(long, env = "GESTURE_PILOT_LOG")]
    pub log_level: Option<String>,
}

impl Cli {
    pub fn tello(&self) -> TelloConfig {
        TelloConfig {
            drone_addr: self.drone_addr,
            local_port: self.local_port,
            response_timeout: Duration::from_millis(self.response_timeout_ms),
            takeoff_timeout: Duration::from_millis(self.takeoff_timeout_ms),
            ..Default::default()
        }
    }

    pub fn stream(&self) -> StreamConfig {
        StreamConfig {
            ffmpeg: self.ffmpeg.clone(),
            source: self.video_source.clone(),
            width: self.frame_width,
            height: self.frame_height,
        }
    }

    pub fn detector(&self) -> DetectorConfig {
        DetectorConfig {
            program: self.detector.clone(),
            args: self.detector_args.clone(),
            min_confidence: self.min_detection_confidence,
            ..Default::default()
        }
    }

    pub fn pilot(&self) -> PilotConfig {
        PilotConfig {
            threshold: self.threshold,
            min_detection_confidence: self.min_detection_confidence,
            snapshot_dir: self.snapshot_dir.clone(),
            key_poll: Duration::from_millis(self.key_poll_ms),
            auto_takeoff: self.auto_takeoff,
            climb_cm: self.climb_cm,
        }
    }

    /// Reject values no component can run with.
    pub fn validate(&self) -> Result<()> {
        if self.frame_width == 0 || self.frame_height == 0 {
            return Err(PilotError::InvalidConfig(format!(
                "frame size {}x{} is empty",
                self.frame_width, self.frame_height
            )));
        }
        self.pilot().validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        let mut argv = vec!["gesture_pilot"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_defaults() {
        let cli = parse(&[]);
        let tello = cli.tello();
        assert_eq!(tello.drone_addr, "192.168.10.1:8889".parse().unwrap());
        assert_eq!(tello.local_port, 8889);
        assert_eq!(tello.response_timeout, Duration::from_secs(7));
        assert_eq!(tello.takeoff_timeout, Duration::from_secs(20));

        let stream = cli.stream();
        assert_eq!(stream.source, "udp://0.0.0.0:11111");
        assert_eq!((stream.width, stream.height), (960, 720));

        let pilot = cli.pilot();
        assert_eq!(pilot.threshold, 30);
        assert_eq!(pilot.snapshot_dir, PathBuf::from("Drone_images"));
        assert!(!pilot.auto_takeoff);
        assert!(!cli.simulate);
        assert!(!cli.no_window);
        assert!(cli.validate().is_ok());
    }

    #[test]
    fn test_overrides() {
        let cli = parse(&[
            "--threshold",
            "5",
            "--auto-takeoff",
            "--climb-cm",
            "80",
            "--detector-arg",
            "--model",
            "--detector-arg",
            "hand.task",
            "--simulate",
            "--no-window",
        ]);
        assert_eq!(cli.pilot().threshold, 5);
        assert!(cli.pilot().auto_takeoff);
        assert_eq!(cli.pilot().climb_cm, 80);
        assert_eq!(cli.detector().args, vec!["--model", "hand.task"]);
        assert!(cli.simulate);
        assert!(cli.no_window);
    }

    #[test]
    fn test_zero_threshold_invalid() {
        let cli = parse(&["--threshold", "0"]);
        assert!(matches!(cli.validate(), Err(PilotError::InvalidConfig(_))));
    }

    #[test]
    fn test_empty_frame_invalid() {
        let cli = parse(&["--frame-width", "0"]);
        assert!(cli.validate().is_err());
    }

    #[test]
    fn test_bad_address_rejected_by_parser() {
        assert!(Cli::try_parse_from(["gesture_pilot", "--drone-addr", "nowhere"]).is_err());
    }
}
