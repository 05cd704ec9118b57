//! Static dependency graph between stages.
//!
//! ```text
//! Analyze    : []
//! Format     : []
//! Translate  : [Format]
//! ```
//!
//! The coordinator asks the graph which stages start on submit, which stages
//! follow a success, and what input a stage is fed.  Nothing here knows about
//! tasks or channels.

use super::state::{PipelineRun, Stage};

impl Stage {
    /// Stages whose success this stage needs.
    pub fn dependencies(self) -> &'static [Stage] {
        match self {
            Stage::Analyze | Stage::Format => &[],
            Stage::Translate => &[Stage::Format],
        }
    }

    /// Stages that directly depend on this one.
    pub fn dependents(self) -> impl Iterator<Item = Stage> {
        Stage::ALL
            .into_iter()
            .filter(move |stage| stage.dependencies().contains(&self))
    }

    /// Direct and indirect dependents, nearest first.
    pub fn downstream(self) -> Vec<Stage> {
        let mut out: Vec<Stage> = Vec::new();
        let mut frontier: Vec<Stage> = self.dependents().collect();
        while let Some(stage) = frontier.pop() {
            if !out.contains(&stage) {
                out.push(stage);
                frontier.extend(stage.dependents());
            }
        }
        out
    }

    pub fn is_root(self) -> bool {
        self.dependencies().is_empty()
    }
}

/// Stages started directly by a submission.
pub fn roots() -> impl Iterator<Item = Stage> {
    Stage::ALL.into_iter().filter(|stage| stage.is_root())
}

/// Input `stage` would be called with in `run`.
///
/// Roots get the submitted video reference; a dependent stage gets the value
/// of its dependency.  `Err` names the first dependency that has not
/// succeeded.
pub fn input_for(stage: Stage, run: &PipelineRun) -> Result<String, Stage> {
    let mut input = run.input.clone();
    for dependency in stage.dependencies() {
        match run.stage(*dependency).value() {
            Some(value) => input = value.clone(),
            None => return Err(*dependency),
        }
    }
    Ok(input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::state::{RunId, StageState};

    #[test]
    fn analyze_and_format_are_roots() {
        let roots: Vec<Stage> = roots().collect();
        assert_eq!(roots, vec![Stage::Analyze, Stage::Format]);
    }

    #[test]
    fn translate_follows_format() {
        assert_eq!(Stage::Format.dependents().collect::<Vec<_>>(), vec![Stage::Translate]);
        assert_eq!(Stage::Format.downstream(), vec![Stage::Translate]);
        assert!(Stage::Analyze.downstream().is_empty());
        assert!(Stage::Translate.downstream().is_empty());
    }

    #[test]
    fn roots_are_fed_the_submission() {
        let run = PipelineRun::new(RunId(1), "https://youtu.be/abc");
        assert_eq!(input_for(Stage::Analyze, &run), Ok("https://youtu.be/abc".into()));
        assert_eq!(input_for(Stage::Format, &run), Ok("https://youtu.be/abc".into()));
    }

    #[test]
    fn translate_is_fed_formatted_text() {
        let mut run = PipelineRun::new(RunId(1), "https://youtu.be/abc");
        assert_eq!(input_for(Stage::Translate, &run), Err(Stage::Format));

        run.format = StageState::Running;
        assert_eq!(input_for(Stage::Translate, &run), Err(Stage::Format));

        run.format = StageState::Succeeded("L1\nL2".into());
        assert_eq!(input_for(Stage::Translate, &run), Ok("L1\nL2".into()));
    }
}
