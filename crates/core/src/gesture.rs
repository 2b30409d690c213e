//! Geometric gesture classifier
//!
//! Classification is stateless: each frame's landmark set maps to at most one
//! gesture using strict coordinate comparisons. Temporal filtering is the
//! debouncer's job.
//!
//! Coordinates are expected after the camera mirror flip, so "left" and
//! "right" are relative to the screen, not to the hand.

use core::cmp::Ordering;
use core::fmt;

use crate::landmarks::{joint, HandLandmarks, Point2};

/// Actionable gestures, in classification priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Gesture {
    /// All four fingers extended (tips above their proximal joints).
    FingersOpen,
    /// Thumb tip above every other joint.
    ThumbUp,
    /// Thumb tip below every other joint.
    ThumbDown,
    /// Index tip right of every other joint (screen-relative).
    IndexRight,
    /// Index tip left of every other joint (screen-relative).
    IndexLeft,
    /// All four fingers curled (tips below their proximal joints).
    FingersClosed,
}

impl Gesture {
    /// Number of actionable gestures.
    pub const COUNT: usize = 6;

    /// All gestures in priority order.
    pub const ALL: [Gesture; Gesture::COUNT] = [
        Gesture::FingersOpen,
        Gesture::ThumbUp,
        Gesture::ThumbDown,
        Gesture::IndexRight,
        Gesture::IndexLeft,
        Gesture::FingersClosed,
    ];

    /// Stable slot index, used for per-gesture counters.
    pub const fn index(self) -> usize {
        match self {
            Gesture::FingersOpen => 0,
            Gesture::ThumbUp => 1,
            Gesture::ThumbDown => 2,
            Gesture::IndexRight => 3,
            Gesture::IndexLeft => 4,
            Gesture::FingersClosed => 5,
        }
    }

    /// Short name for logs and status lines.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FingersOpen => "fingers-open",
            Self::ThumbUp => "thumb-up",
            Self::ThumbDown => "thumb-down",
            Self::IndexRight => "index-right",
            Self::IndexLeft => "index-left",
            Self::FingersClosed => "fingers-closed",
        }
    }

    fn matches(self, hand: &HandLandmarks) -> bool {
        match self {
            Gesture::FingersOpen => fingers_all(hand, Ordering::Less),
            Gesture::ThumbUp => tip_extreme(hand, joint::THUMB_TIP, |p| p.y, Ordering::Less),
            Gesture::ThumbDown => tip_extreme(hand, joint::THUMB_TIP, |p| p.y, Ordering::Greater),
            Gesture::IndexRight => {
                tip_extreme(hand, joint::INDEX_TIP, |p| p.x, Ordering::Greater)
            }
            Gesture::IndexLeft => tip_extreme(hand, joint::INDEX_TIP, |p| p.x, Ordering::Less),
            Gesture::FingersClosed => fingers_all(hand, Ordering::Greater),
        }
    }
}

impl fmt::Display for Gesture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify one hand. Returns `None` when no rule matches.
///
/// Rules are tried in [`Gesture::ALL`] order and the first match wins.
pub fn classify(hand: &HandLandmarks) -> Option<Gesture> {
    Gesture::ALL.into_iter().find(|g| g.matches(hand))
}

/// `true` if joint `tip` compares strictly `ordering` against every other
/// joint along the chosen axis. NaN never satisfies a strict comparison.
fn tip_extreme(
    hand: &HandLandmarks,
    tip: usize,
    axis: impl Fn(&Point2) -> f32,
    ordering: Ordering,
) -> bool {
    let value = axis(&hand.get(tip));
    hand.others(tip)
        .all(|other| value.partial_cmp(&axis(other)) == Some(ordering))
}

/// `true` if every finger tip's y compares strictly `ordering` against its
/// proximal joint's y.
fn fingers_all(hand: &HandLandmarks, ordering: Ordering) -> bool {
    joint::FINGERS.iter().all(|&(tip, pip)| {
        hand.get(tip).y.partial_cmp(&hand.get(pip).y) == Some(ordering)
    })
}
