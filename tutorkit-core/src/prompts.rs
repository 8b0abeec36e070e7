//! Scripted tutor texts
//!
//! Fixed messages the orchestrator authors itself, as opposed to the
//! generated replies that come back from the backend.

/// Display name of the tutor on incoming turns.
pub const TUTOR_NAME: &str = "Tutorly";

/// Display name of the learner on outgoing turns.
pub const LEARNER_NAME: &str = "user";

/// Opening message shown before any video is selected.
pub const WELCOME: &str = "Welcome to today's Tidy Tuesday project! \
Please select a video you want to watch by entering its video ID \
(e.g., nx5yhXAQLxw):";

/// Orientation message appended once segmentation arrives, anchored to the
/// first segment.
pub const ORIENTATION: &str = "The video is segmented into several video clips. \
While you can navigate through the parts you like, I recommend following the \
video progress to learn and imitate his Exploratory Data Analysis process and \
do the task on your own.\n\nWhile watching the video, keep asking yourself \
these three questions: what is he doing, why is he doing it, and how will \
success in what he is doing help him find a solution to the problem? \
Now let's get started!";

/// Message accompanying an advance to the next indexed segment.
pub const NEXT_SEGMENT: &str = "Now let us watch the next video segment!";

/// Prompt for the self-exploration window past the indexed segments.
pub const SELF_EXPLORATION_PROMPT: &str =
    "Can you think of more tasks that are not in the video to do?";

/// Prompt once the self-exploration window is exhausted.
pub const CONCLUSION_PROMPT: &str = "Could you conclude what you have learned today?";

/// Prefix for the "explain more" affordance on a tutor turn.
pub const EXPLAIN_MORE_PREFIX: &str = "explain this in more detail: ";
