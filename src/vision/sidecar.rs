//! Hand-landmark detection through a sidecar process.
//!
//! The landmark model runs in a separate program. For every frame this side
//! writes to the program's stdin:
//!
//! ```text
//! {"width":960,"height":720}\n
//! <width * height * 3 bytes of RGB24>
//! ```
//!
//! and reads exactly one JSON line back:
//!
//! ```text
//! {"hands":[{"score":0.93,"handedness":"Right","landmarks":[[0.51,0.72,0.0], ...]}]}
//! ```
//!
//! Each hand carries 21 landmarks of normalized `[x, y]` or `[x, y, z]`; the
//! depth component is ignored. The program is started in single-hand video
//! mode through the `GESTURE_PILOT_MAX_HANDS` and
//! `GESTURE_PILOT_MIN_CONFIDENCE` environment variables.

use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::process::{Child, ChildStdin, ChildStdout, Stdio};

use gesture_pilot_core::{HandLandmarks, Point2};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::{helper_command, DetectedHand, Frame, HandDetector};
use crate::error::{PilotError, Result};

/// Detector process configuration.
#[derive(Debug, Clone)]
pub struct DetectorConfig {
    /// Detector executable.
    pub program: String,
    /// Extra arguments for the executable.
    pub args: Vec<String>,
    /// Minimum per-hand detection confidence.
    pub min_confidence: f32,
    /// Maximum hands the model should report.
    pub max_hands: u32,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            program: "hand-landmarks".to_string(),
            args: Vec::new(),
            min_confidence: 0.5,
            max_hands: 1,
        }
    }
}

#[derive(Debug, Serialize)]
struct FrameHeader {
    width: u32,
    height: u32,
}

#[derive(Debug, Deserialize)]
struct DetectionJson {
    #[serde(default)]
    hands: Vec<HandJson>,
}

#[derive(Debug, Deserialize)]
struct HandJson {
    score: f32,
    #[serde(default)]
    handedness: Option<String>,
    landmarks: Vec<Vec<f32>>,
}

impl HandJson {
    fn into_hand(self) -> Result<DetectedHand> {
        let points = self
            .landmarks
            .iter()
            .map(|lm| match lm.as_slice() {
                [x, y, ..] => Ok(Point2::new(*x, *y)),
                _ => Err(PilotError::DetectorProtocol(format!(
                    "landmark with {} components",
                    lm.len()
                ))),
            })
            .collect::<Result<Vec<_>>>()?;
        let landmarks = HandLandmarks::from_slice(&points)
            .map_err(|e| PilotError::DetectorProtocol(e.to_string()))?;
        Ok(DetectedHand {
            landmarks,
            score: self.score,
            handedness: self.handedness,
        })
    }
}

/// Request/response framing over any writer/reader pair.
pub struct DetectorPipe<W, R> {
    writer: W,
    reader: R,
    line: String,
}

impl<W: Write, R: BufRead> DetectorPipe<W, R> {
    pub fn new(writer: W, reader: R) -> Self {
        Self {
            writer,
            reader,
            line: String::new(),
        }
    }

    /// Send one frame and parse the reply.
    pub fn exchange(&mut self, frame: &Frame) -> Result<Vec<DetectedHand>> {
        let header = FrameHeader {
            width: frame.width(),
            height: frame.height(),
        };
        serde_json::to_writer(&mut self.writer, &header)
            .map_err(|e| PilotError::DetectorProtocol(format!("header encode: {e}")))?;
        self.writer.write_all(b"\n")?;
        self.writer.write_all(frame.as_raw())?;
        self.writer.flush()?;

        self.line.clear();
        if self.reader.read_line(&mut self.line)? == 0 {
            return Err(PilotError::DetectorExited);
        }

        let parsed: DetectionJson = serde_json::from_str(self.line.trim())
            .map_err(|e| PilotError::DetectorProtocol(format!("JSON parse error: {e}")))?;
        parsed.hands.into_iter().map(HandJson::into_hand).collect()
    }
}

/// Detector backed by a child process speaking the line protocol above.
pub struct SidecarDetector {
    child: Child,
    pipe: DetectorPipe<BufWriter<ChildStdin>, BufReader<ChildStdout>>,
}

impl SidecarDetector {
    pub fn spawn(config: &DetectorConfig) -> Result<Self> {
        if !(0.0..=1.0).contains(&config.min_confidence) {
            return Err(PilotError::InvalidConfig(format!(
                "detector confidence {} outside 0..=1",
                config.min_confidence
            )));
        }

        let mut child = helper_command(&config.program)
            .args(&config.args)
            .env("GESTURE_PILOT_MAX_HANDS", config.max_hands.to_string())
            .env(
                "GESTURE_PILOT_MIN_CONFIDENCE",
                config.min_confidence.to_string(),
            )
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| io::Error::other("detector stdin not captured"))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| io::Error::other("detector stdout not captured"))?;

        info!("Hand detector started: {}", config.program);
        Ok(Self {
            child,
            pipe: DetectorPipe::new(BufWriter::new(stdin), BufReader::new(stdout)),
        })
    }
}

impl HandDetector for SidecarDetector {
    fn detect(&mut self, frame: &Frame) -> Result<Vec<DetectedHand>> {
        let result = self.pipe.exchange(frame);
        if matches!(result, Err(PilotError::DetectorExited)) {
            if let Ok(Some(status)) = self.child.try_wait() {
                warn!("Hand detector exited: {status}");
            }
        }
        result
    }
}

impl Drop for SidecarDetector {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}
