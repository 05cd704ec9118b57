//! Per-stage state machine and the run snapshot observers read.
//!
//! [`StageState`] replaces loose loading/error flags with one tagged value per
//! stage, so "succeeded and still loading" cannot be represented.
//!
//! [`PipelineRun`] groups the three stage states for one submission.  The
//! coordinator owns the live copy; everyone else sees cloned snapshots.

use std::fmt;

// ---------------------------------------------------------------------------
// Stage
// ---------------------------------------------------------------------------

/// The three nodes of the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Content analysis of the video.
    Analyze,
    /// Transcript split into readable sentences and paragraphs.
    Format,
    /// Chinese translation of the formatted transcript.
    Translate,
}

impl Stage {
    /// Every stage, in display order.
    pub const ALL: [Stage; 3] = [Stage::Analyze, Stage::Format, Stage::Translate];

    pub(crate) fn index(self) -> usize {
        match self {
            Stage::Analyze => 0,
            Stage::Format => 1,
            Stage::Translate => 2,
        }
    }

    /// Lower-case name used in logs and console commands.
    pub fn name(self) -> &'static str {
        match self {
            Stage::Analyze => "analyze",
            Stage::Format => "format",
            Stage::Translate => "translate",
        }
    }

    /// Parse a console command argument (`"analyze"`, `"format"`, ...).
    pub fn from_name(name: &str) -> Option<Self> {
        Stage::ALL
            .into_iter()
            .find(|stage| stage.name().eq_ignore_ascii_case(name.trim()))
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// StageState
// ---------------------------------------------------------------------------

/// State of one stage within a run.
///
/// ```text
/// Idle ──start──▶ Running ──ok──▶ Succeeded(value)
///                         ──err─▶ Failed(message)
/// any ──retry──▶ Running          (this stage only)
/// any ──upstream retried──▶ Idle  (dependents only)
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum StageState<T> {
    /// Not started in this run, or invalidated by an upstream retry.
    #[default]
    Idle,
    /// A remote call for this stage is in flight.
    Running,
    /// The latest accepted call succeeded.
    Succeeded(T),
    /// The latest accepted call failed with this message.
    Failed(String),
}

impl<T> StageState<T> {
    /// ```
    /// use video_digest::pipeline::StageState;
    ///
    /// assert!(StageState::<String>::Running.is_running());
    /// assert!(!StageState::Succeeded("x".to_string()).is_running());
    /// ```
    pub fn is_running(&self) -> bool {
        matches!(self, StageState::Running)
    }

    pub fn is_succeeded(&self) -> bool {
        matches!(self, StageState::Succeeded(_))
    }

    /// The successful value, if any.
    pub fn value(&self) -> Option<&T> {
        match self {
            StageState::Succeeded(value) => Some(value),
            _ => None,
        }
    }

    /// The failure message, if any.
    pub fn error(&self) -> Option<&str> {
        match self {
            StageState::Failed(message) => Some(message),
            _ => None,
        }
    }

    /// A short human-readable label for status lines.
    pub fn label(&self) -> &'static str {
        match self {
            StageState::Idle => "idle",
            StageState::Running => "running",
            StageState::Succeeded(_) => "done",
            StageState::Failed(_) => "failed",
        }
    }
}

// ---------------------------------------------------------------------------
// RunId
// ---------------------------------------------------------------------------

/// Identity of one submission.  Bumped on every `submit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct RunId(pub u64);

impl RunId {
    /// The placeholder run that exists before the first submission.
    pub const NONE: RunId = RunId(0);

    pub(crate) fn next(self) -> RunId {
        RunId(self.0 + 1)
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "run#{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// PipelineRun
// ---------------------------------------------------------------------------

/// All stage states for one submission.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PipelineRun {
    /// [`RunId::NONE`] until something has been submitted.
    pub id: RunId,
    /// The trimmed video reference this run was started with.
    pub input: String,
    /// Analysis text.
    pub analyze: StageState<String>,
    /// Formatted transcript text.
    pub format: StageState<String>,
    /// Chinese translation of the formatted transcript.
    pub translate: StageState<String>,
}

impl PipelineRun {
    /// A fresh run with every stage `Idle`.
    pub fn new(id: RunId, input: impl Into<String>) -> Self {
        Self {
            id,
            input: input.into(),
            ..Self::default()
        }
    }

    /// `true` once something has been submitted.
    pub fn is_active(&self) -> bool {
        self.id != RunId::NONE
    }

    pub fn stage(&self, stage: Stage) -> &StageState<String> {
        match stage {
            Stage::Analyze => &self.analyze,
            Stage::Format => &self.format,
            Stage::Translate => &self.translate,
        }
    }

    pub(crate) fn stage_mut(&mut self, stage: Stage) -> &mut StageState<String> {
        match stage {
            Stage::Analyze => &mut self.analyze,
            Stage::Format => &mut self.format,
            Stage::Translate => &mut self.translate,
        }
    }

    /// Aggregate "all done": no stage is in flight.  A stage that was never
    /// started because its dependency failed counts as terminally `Idle`.
    pub fn is_complete(&self) -> bool {
        Stage::ALL.iter().all(|stage| !self.stage(*stage).is_running())
    }

    /// Stages that ended in `Failed`, with their messages.
    pub fn failures(&self) -> Vec<(Stage, &str)> {
        Stage::ALL
            .into_iter()
            .filter_map(|stage| self.stage(stage).error().map(|msg| (stage, msg)))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_stage_state_is_idle() {
        assert_eq!(StageState::<String>::default(), StageState::Idle);
    }

    #[test]
    fn value_and_error_accessors() {
        let ok: StageState<String> = StageState::Succeeded("text".into());
        let failed: StageState<String> = StageState::Failed("boom".into());

        assert_eq!(ok.value().map(String::as_str), Some("text"));
        assert!(ok.error().is_none());
        assert_eq!(failed.error(), Some("boom"));
        assert!(failed.value().is_none());
    }

    #[test]
    fn labels() {
        assert_eq!(StageState::<()>::Idle.label(), "idle");
        assert_eq!(StageState::<()>::Running.label(), "running");
        assert_eq!(StageState::Succeeded(()).label(), "done");
        assert_eq!(StageState::<()>::Failed(String::new()).label(), "failed");
    }

    #[test]
    fn stage_names_round_trip() {
        for stage in Stage::ALL {
            assert_eq!(Stage::from_name(stage.name()), Some(stage));
        }
        assert_eq!(Stage::from_name(" Translate "), Some(Stage::Translate));
        assert_eq!(Stage::from_name("summarize"), None);
    }

    #[test]
    fn new_run_is_idle_and_complete() {
        let run = PipelineRun::new(RunId(3), "https://youtu.be/abc");
        assert!(run.is_active());
        assert!(run.is_complete());
        assert!(Stage::ALL.iter().all(|s| *run.stage(*s) == StageState::Idle));
    }

    #[test]
    fn default_run_is_inactive() {
        assert!(!PipelineRun::default().is_active());
    }

    #[test]
    fn running_stage_blocks_completion() {
        let mut run = PipelineRun::new(RunId(1), "x");
        run.analyze = StageState::Succeeded("a".into());
        run.format = StageState::Running;
        assert!(!run.is_complete());

        run.format = StageState::Failed("rate limited".into());
        assert!(run.is_complete());
        assert_eq!(run.failures(), vec![(Stage::Format, "rate limited")]);
    }
}
