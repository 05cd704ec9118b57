//! Text rendering of the three result panes.
//!
//! | Stage     | Idle hint                            | Running                  |
//! |-----------|--------------------------------------|--------------------------|
//! | Analyze   | paste a video link to start          | analyzing video...       |
//! | Format    | waiting for a video link             | formatting transcript... |
//! | Translate | waiting for the formatted transcript | translating...           |

use crate::pipeline::{PipelineRun, Stage, StageState};

pub fn pane_title(stage: Stage) -> &'static str {
    match stage {
        Stage::Analyze => "Content analysis",
        Stage::Format => "Formatted transcript",
        Stage::Translate => "Chinese translation",
    }
}

fn idle_hint(stage: Stage) -> &'static str {
    match stage {
        Stage::Analyze => "paste a video link to start",
        Stage::Format => "waiting for a video link",
        Stage::Translate => "waiting for the formatted transcript",
    }
}

fn running_hint(stage: Stage) -> &'static str {
    match stage {
        Stage::Analyze => "analyzing video...",
        Stage::Format => "formatting transcript...",
        Stage::Translate => "translating...",
    }
}

/// Cut `text` to at most `max_chars` characters; `0` means no limit.
pub fn truncate(text: &str, max_chars: usize) -> String {
    if max_chars == 0 {
        return text.to_string();
    }
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!(
            "{}\n... ({} more characters)",
            &text[..cut],
            text[cut..].chars().count()
        ),
        None => text.to_string(),
    }
}

/// Render one pane.
pub fn render_pane(stage: Stage, state: &StageState<String>, preview_chars: usize) -> String {
    let title = pane_title(stage);
    match state {
        StageState::Idle => format!("[{title}] {}", idle_hint(stage)),
        StageState::Running => format!("[{title}] {}", running_hint(stage)),
        StageState::Succeeded(text) => format!("[{title}]\n{}", truncate(text, preview_chars)),
        StageState::Failed(message) => {
            format!("[{title}] failed: {message} (type `retry {stage}` to try again)")
        }
    }
}

/// Render every pane of `run`, separated by blank lines.
pub fn render_run(run: &PipelineRun, preview_chars: usize) -> String {
    if !run.is_active() {
        return format!("[{}] {}", pane_title(Stage::Analyze), idle_hint(Stage::Analyze));
    }
    let mut out = format!("{} {}\n", run.id, run.input);
    let panes: Vec<String> = Stage::ALL
        .into_iter()
        .map(|stage| render_pane(stage, run.stage(stage), preview_chars))
        .collect();
    out.push_str(&panes.join("\n\n"));
    out
}

/// Remembers the last rendered run so only changed panes are reprinted.
#[derive(Debug, Default)]
pub struct PaneTracker {
    last: Option<PipelineRun>,
}

impl PaneTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stages whose state differs from the previous call.  A new run id
    /// reports every stage.
    pub fn changed(&mut self, run: &PipelineRun) -> Vec<Stage> {
        let changed = match &self.last {
            Some(last) if last.id == run.id => Stage::ALL
                .into_iter()
                .filter(|stage| last.stage(*stage) != run.stage(*stage))
                .collect(),
            _ => Stage::ALL.to_vec(),
        };
        self.last = Some(run.clone());
        changed
    }
}
