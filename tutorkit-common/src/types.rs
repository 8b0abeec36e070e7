//! Video segment types and session lifecycle phases

use serde::{Deserialize, Serialize};

/// Category name used by segments covering the video's opening.
///
/// Advancing past an Introduction segment never requires backend confirmation.
pub const INTRODUCTION: &str = "Introduction";

/// Synthetic category for the window after the last indexed segment, where
/// the learner works without a video anchor.
pub const SELF_EXPLORATION: &str = "Self-exploration";

/// Synthetic category for everything after the self-exploration window.
pub const CONCLUSION: &str = "Conclusion";

/// A time-bounded slice of the instructional video with its pedagogical
/// category, as returned by the backend segmentation service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// Start of the slice in seconds from the beginning of the video
    pub start: f64,
    /// End of the slice in seconds
    pub end: f64,
    /// Pedagogical category label (e.g. "Introduction", "EDA")
    pub category: String,
}

/// Playback window of the video a turn points at.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoWindow {
    pub video_id: String,
    pub start: f64,
    pub end: f64,
}

/// Segment metadata carried by a conversation turn.
///
/// Turns carrying a `SegmentRef` partition the conversation log into
/// chapters. Indexed segments have a playback window; the synthetic
/// self-exploration and conclusion chapters carry a category only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentRef {
    pub category: String,
    pub video: Option<VideoWindow>,
}

impl SegmentRef {
    /// Reference to an indexed segment of a given video.
    pub fn indexed(video_id: impl Into<String>, segment: &Segment) -> Self {
        Self {
            category: segment.category.clone(),
            video: Some(VideoWindow {
                video_id: video_id.into(),
                start: segment.start,
                end: segment.end,
            }),
        }
    }

    /// Reference to a synthetic chapter without a playback window.
    pub fn synthetic(category: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            video: None,
        }
    }
}

/// Session lifecycle phase.
///
/// The first learner input is a video selector, not a chat question; the
/// named transitions make that explicit instead of keying off an empty
/// video id scattered through the send path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionPhase {
    /// No video chosen yet; the next non-empty learner send selects one
    SelectingVideo,
    /// Segmentation fetch in flight for the freshly selected video
    FetchingSegments,
    /// Normal tutoring flow
    InSession,
}
