//! Segment progression policy
//!
//! Pure decision functions over the segment index and the fetched
//! segmentation. The last indexed segment is followed by a two-step
//! self-exploration window, then the conclusion; the category drives both
//! the chat context and whether advancing needs backend confirmation.

use tutorkit_common::types::{Segment, CONCLUSION, INTRODUCTION, SELF_EXPLORATION};

/// Resolve the active category for a segment index.
///
/// Indexed categories apply while `index + 1 < len`; the window from the
/// last indexed segment up to `len + 2` is self-exploration; everything
/// after is the conclusion.
pub fn resolve_category(index: usize, segments: &[Segment]) -> String {
    if index + 1 < segments.len() {
        segments[index].category.clone()
    } else if index < segments.len() + 2 {
        SELF_EXPLORATION.to_string()
    } else {
        CONCLUSION.to_string()
    }
}

/// Whether advancing past a segment of the given category needs backend
/// confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvanceRule {
    /// Gate opens unconditionally (Introduction)
    Always,
    /// Gate stays closed (Self-exploration)
    Never,
    /// Ask the backend's advance-gate check
    AskBackend,
}

pub fn advance_rule(category: &str) -> AdvanceRule {
    if category == INTRODUCTION {
        AdvanceRule::Always
    } else if category == SELF_EXPLORATION {
        AdvanceRule::Never
    } else {
        AdvanceRule::AskBackend
    }
}

/// What a user-initiated "go on" does from a given position.
#[derive(Debug, Clone, PartialEq)]
pub enum GoOnOutcome {
    /// Advance to the next indexed segment
    NextSegment { index: usize, segment: Segment },
    /// Still inside the self-exploration window; advance the index and
    /// prompt for learner-invented tasks
    SelfExploration { index: usize },
    /// Past the window; prompt for a wrap-up, index unchanged
    Conclusion,
}

pub fn go_on_outcome(index: usize, segments: &[Segment]) -> GoOnOutcome {
    if index + 1 < segments.len() {
        GoOnOutcome::NextSegment {
            index: index + 1,
            segment: segments[index + 1].clone(),
        }
    } else if index < segments.len() + 2 {
        GoOnOutcome::SelfExploration { index: index + 1 }
    } else {
        GoOnOutcome::Conclusion
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segments(categories: &[&str]) -> Vec<Segment> {
        categories
            .iter()
            .enumerate()
            .map(|(i, c)| Segment {
                start: (i * 30) as f64,
                end: ((i + 1) * 30) as f64,
                category: c.to_string(),
            })
            .collect()
    }

    #[test]
    fn category_resolution_covers_all_windows() {
        let segs = segments(&["Introduction", "EDA", "Visualization"]);
        // index < N-1: the indexed category
        assert_eq!(resolve_category(0, &segs), "Introduction");
        assert_eq!(resolve_category(1, &segs), "EDA");
        // N-1 <= index < N+2: self-exploration
        assert_eq!(resolve_category(2, &segs), SELF_EXPLORATION);
        assert_eq!(resolve_category(3, &segs), SELF_EXPLORATION);
        assert_eq!(resolve_category(4, &segs), SELF_EXPLORATION);
        // index >= N+2: conclusion
        assert_eq!(resolve_category(5, &segs), CONCLUSION);
        assert_eq!(resolve_category(50, &segs), CONCLUSION);
    }

    #[test]
    fn empty_segmentation_resolves_without_underflow() {
        assert_eq!(resolve_category(0, &[]), SELF_EXPLORATION);
        assert_eq!(resolve_category(1, &[]), SELF_EXPLORATION);
        assert_eq!(resolve_category(2, &[]), CONCLUSION);
    }

    #[test]
    fn advance_rules_by_category() {
        assert_eq!(advance_rule(INTRODUCTION), AdvanceRule::Always);
        assert_eq!(advance_rule(SELF_EXPLORATION), AdvanceRule::Never);
        assert_eq!(advance_rule("EDA"), AdvanceRule::AskBackend);
        assert_eq!(advance_rule(CONCLUSION), AdvanceRule::AskBackend);
    }

    #[test]
    fn go_on_walks_segments_then_window_then_conclusion() {
        let segs = segments(&["Introduction", "EDA"]);

        match go_on_outcome(0, &segs) {
            GoOnOutcome::NextSegment { index, segment } => {
                assert_eq!(index, 1);
                assert_eq!(segment.category, "EDA");
            }
            other => panic!("unexpected outcome: {other:?}"),
        }

        assert_eq!(
            go_on_outcome(1, &segs),
            GoOnOutcome::SelfExploration { index: 2 }
        );
        assert_eq!(
            go_on_outcome(3, &segs),
            GoOnOutcome::SelfExploration { index: 4 }
        );
        assert_eq!(go_on_outcome(4, &segs), GoOnOutcome::Conclusion);
    }
}
