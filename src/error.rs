/// Result type for gesture_pilot operations.
pub type Result<T> = std::result::Result<T, PilotError>;

/// Errors that can occur while flying.
#[derive(Debug, thiserror::Error)]
pub enum PilotError {
    #[error("Drone rejected `{command}`: {response}")]
    DroneRejected { command: String, response: String },

    #[error("Timeout waiting for response to `{0}`")]
    DroneTimeout(String),

    #[error("Drone protocol error: {0}")]
    DroneProtocol(String),

    #[error("Video stream ended")]
    StreamEnded,

    #[error("Detector protocol error: {0}")]
    DetectorProtocol(String),

    #[error("Detector exited")]
    DetectorExited,

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Display window error: {0}")]
    Window(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
