//! Hand landmark set
//!
//! A detected hand is 21 joints in normalized image coordinates: x grows to
//! the right, y grows downward, both nominally in 0.0..=1.0. Joint ids follow
//! the usual hand-landmark model numbering (wrist first, then four joints per
//! digit from thumb to pinky).

use core::fmt;

/// Number of joints in one hand landmark set.
pub const LANDMARK_COUNT: usize = 21;

/// Joint indices into a [`HandLandmarks`] set.
pub mod joint {
    pub const WRIST: usize = 0;
    pub const THUMB_CMC: usize = 1;
    pub const THUMB_MCP: usize = 2;
    pub const THUMB_IP: usize = 3;
    pub const THUMB_TIP: usize = 4;
    pub const INDEX_MCP: usize = 5;
    pub const INDEX_PIP: usize = 6;
    pub const INDEX_DIP: usize = 7;
    pub const INDEX_TIP: usize = 8;
    pub const MIDDLE_MCP: usize = 9;
    pub const MIDDLE_PIP: usize = 10;
    pub const MIDDLE_DIP: usize = 11;
    pub const MIDDLE_TIP: usize = 12;
    pub const RING_MCP: usize = 13;
    pub const RING_PIP: usize = 14;
    pub const RING_DIP: usize = 15;
    pub const RING_TIP: usize = 16;
    pub const PINKY_MCP: usize = 17;
    pub const PINKY_PIP: usize = 18;
    pub const PINKY_DIP: usize = 19;
    pub const PINKY_TIP: usize = 20;

    /// (tip, proximal joint) pairs for the four non-thumb fingers.
    pub const FINGERS: [(usize, usize); 4] = [
        (INDEX_TIP, INDEX_PIP),
        (MIDDLE_TIP, MIDDLE_PIP),
        (RING_TIP, RING_PIP),
        (PINKY_TIP, PINKY_PIP),
    ];
}

/// Bones drawn between joints when overlaying a hand on a frame.
pub const HAND_CONNECTIONS: [(usize, usize); 21] = {
    use joint::*;
    [
        (WRIST, THUMB_CMC),
        (THUMB_CMC, THUMB_MCP),
        (THUMB_MCP, THUMB_IP),
        (THUMB_IP, THUMB_TIP),
        (WRIST, INDEX_MCP),
        (INDEX_MCP, INDEX_PIP),
        (INDEX_PIP, INDEX_DIP),
        (INDEX_DIP, INDEX_TIP),
        (INDEX_MCP, MIDDLE_MCP),
        (MIDDLE_MCP, MIDDLE_PIP),
        (MIDDLE_PIP, MIDDLE_DIP),
        (MIDDLE_DIP, MIDDLE_TIP),
        (MIDDLE_MCP, RING_MCP),
        (RING_MCP, RING_PIP),
        (RING_PIP, RING_DIP),
        (RING_DIP, RING_TIP),
        (RING_MCP, PINKY_MCP),
        (WRIST, PINKY_MCP),
        (PINKY_MCP, PINKY_PIP),
        (PINKY_PIP, PINKY_DIP),
        (PINKY_DIP, PINKY_TIP),
    ]
};

/// Normalized 2D joint position.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point2 {
    pub x: f32,
    pub y: f32,
}

impl Point2 {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Error returned when a landmark slice does not hold exactly 21 points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LandmarkCountError {
    /// Number of points actually supplied
    pub found: usize,
}

impl fmt::Display for LandmarkCountError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "expected {} hand landmarks, found {}",
            LANDMARK_COUNT, self.found
        )
    }
}

/// The 21 joints of one detected hand, valid for a single frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HandLandmarks {
    points: [Point2; LANDMARK_COUNT],
}

impl HandLandmarks {
    pub const fn new(points: [Point2; LANDMARK_COUNT]) -> Self {
        Self { points }
    }

    /// Build a landmark set from a slice, rejecting any other length.
    pub fn from_slice(points: &[Point2]) -> Result<Self, LandmarkCountError> {
        let points: [Point2; LANDMARK_COUNT] = points
            .try_into()
            .map_err(|_| LandmarkCountError {
                found: points.len(),
            })?;
        Ok(Self { points })
    }

    /// Position of joint `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id >= LANDMARK_COUNT`.
    pub fn get(&self, id: usize) -> Point2 {
        self.points[id]
    }

    pub fn points(&self) -> &[Point2; LANDMARK_COUNT] {
        &self.points
    }

    /// Iterate over every joint except `id`.
    pub fn others(&self, id: usize) -> impl Iterator<Item = &Point2> + '_ {
        self.points
            .iter()
            .enumerate()
            .filter(move |(i, _)| *i != id)
            .map(|(_, p)| p)
    }
}
