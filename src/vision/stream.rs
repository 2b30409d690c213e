//! Camera frames decoded by an ffmpeg subprocess.
//!
//! ffmpeg reads the drone's H.264 video (or any input it understands), scales
//! it to a fixed size and writes raw RGB24 frames back to back on stdout. Each
//! frame is exactly `width * height * 3` bytes.

use std::io::{self, BufReader, Read};
use std::process::{Child, ChildStdout, Stdio};

use tracing::{info, warn};

use super::{helper_command, Frame, FrameSource};
use crate::error::{PilotError, Result};

/// Video decoding configuration.
#[derive(Debug, Clone)]
pub struct StreamConfig {
    /// ffmpeg executable.
    pub ffmpeg: String,
    /// ffmpeg input (URL, device or file).
    pub source: String,
    /// Output frame width in pixels.
    pub width: u32,
    /// Output frame height in pixels.
    pub height: u32,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            ffmpeg: "ffmpeg".to_string(),
            // Tello video stream after `streamon`
            source: "udp://0.0.0.0:11111".to_string(),
            width: 960,
            height: 720,
        }
    }
}

impl StreamConfig {
    /// Arguments passed to ffmpeg.
    pub fn ffmpeg_args(&self) -> Vec<String> {
        let mut args: Vec<String> = ["-loglevel", "error", "-fflags", "nobuffer", "-flags", "low_delay"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        args.push("-i".to_string());
        args.push(self.source.clone());
        args.push("-vf".to_string());
        args.push(format!("scale={}:{}", self.width, self.height));
        args.extend(
            ["-f", "rawvideo", "-pix_fmt", "rgb24", "pipe:1"]
                .iter()
                .map(|s| s.to_string()),
        );
        args
    }
}

/// Splits a byte stream into fixed-size RGB24 frames.
pub struct RawFrameReader<R> {
    reader: R,
    width: u32,
    height: u32,
}

impl<R: Read> RawFrameReader<R> {
    pub fn new(reader: R, width: u32, height: u32) -> Self {
        Self {
            reader,
            width,
            height,
        }
    }

    fn frame_len(&self) -> usize {
        self.width as usize * self.height as usize * 3
    }

    /// Read one whole frame. A short read at end of stream is
    /// [`PilotError::StreamEnded`].
    pub fn read_frame(&mut self) -> Result<Frame> {
        let mut buf = vec![0u8; self.frame_len()];
        match self.reader.read_exact(&mut buf) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
                return Err(PilotError::StreamEnded)
            }
            Err(e) => return Err(e.into()),
        }
        Frame::from_raw(self.width, self.height, buf).ok_or_else(|| {
            PilotError::InvalidConfig(format!(
                "frame buffer does not fit {}x{}",
                self.width, self.height
            ))
        })
    }
}

/// Frame source backed by an ffmpeg child process.
pub struct FfmpegStream {
    child: Child,
    frames: RawFrameReader<BufReader<ChildStdout>>,
    frame_count: u64,
}

impl FfmpegStream {
    /// Start ffmpeg. Fails if the executable cannot be spawned.
    pub fn spawn(config: &StreamConfig) -> Result<Self> {
        if config.width == 0 || config.height == 0 {
            return Err(PilotError::InvalidConfig(format!(
                "frame size {}x{}",
                config.width, config.height
            )));
        }

        let mut child = helper_command(&config.ffmpeg)
            .args(config.ffmpeg_args())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()?;

        let stdout = child.stdout.take().ok_or_else(|| {
            PilotError::Io(io::Error::other("ffmpeg stdout not captured"))
        })?;

        info!(
            "Video stream from {} at {}x{}",
            config.source, config.width, config.height
        );

        let frame_len = config.width as usize * config.height as usize * 3;
        Ok(Self {
            child,
            frames: RawFrameReader::new(
                BufReader::with_capacity(frame_len, stdout),
                config.width,
                config.height,
            ),
            frame_count: 0,
        })
    }

    /// Frames delivered so far.
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }
}

impl FrameSource for FfmpegStream {
    fn next_frame(&mut self) -> Result<Frame> {
        match self.frames.read_frame() {
            Ok(frame) => {
                self.frame_count += 1;
                Ok(frame)
            }
            Err(PilotError::StreamEnded) => {
                if let Ok(Some(status)) = self.child.try_wait() {
                    warn!("ffmpeg exited: {status}");
                }
                Err(PilotError::StreamEnded)
            }
            Err(e) => Err(e),
        }
    }
}

impl Drop for FfmpegStream {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}
