//! Terminal front end.
//!
//! Two tasks cooperate:
//!
//! * [`Console::run`] reads [`ConsoleCommand`]s from a line channel and
//!   drives the [`PipelineCoordinator`].
//! * [`render_updates`] watches the coordinator and reprints each pane when
//!   its state changes.
//!
//! ```text
//! stdin lines ─▶ mpsc ─▶ Console::run ─▶ PipelineCoordinator
//!                                              │ watch
//!                                              ▼
//!                                       render_updates ─▶ stdout
//! ```

pub mod command;
pub mod render;

use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use crate::config::UiConfig;
use crate::pipeline::{PipelineCoordinator, PipelineRun};
use crate::service::VideoService;

pub use command::{parse_command, ConsoleCommand};
pub use render::{render_pane, render_run, PaneTracker};

const HELP: &str = "\
commands:
  <video link>                     analyze, format and translate a video
  submit <video link>              same as above
  retry analyze|format|translate   re-run one stage of the current video
  transcript                       print the raw transcript
  status                           print every pane
  quit                             exit";

/// Output of one command.
#[derive(Debug, Default)]
pub struct Reply {
    pub lines: Vec<String>,
    pub quit: bool,
    /// Output of work still running in the background, printed when it
    /// lands.  The command loop never awaits it.
    pub pending: Option<JoinHandle<Vec<String>>>,
}

impl Reply {
    fn line(text: impl Into<String>) -> Self {
        Self {
            lines: vec![text.into()],
            ..Self::default()
        }
    }
}

/// Command dispatcher bound to one coordinator.
pub struct Console {
    coordinator: PipelineCoordinator,
    service: Arc<dyn VideoService>,
    ui: UiConfig,
}

impl Console {
    /// `service` is the same gateway the coordinator uses; it is called
    /// directly only for the `transcript` command.
    pub fn new(
        coordinator: PipelineCoordinator,
        service: Arc<dyn VideoService>,
        ui: UiConfig,
    ) -> Self {
        Self {
            coordinator,
            service,
            ui,
        }
    }

    /// Execute one command.
    pub async fn execute(&self, command: ConsoleCommand) -> Reply {
        match command {
            ConsoleCommand::Submit(input) => match self.coordinator.submit(&input) {
                Ok(id) => Reply::line(format!("{id} started")),
                Err(e) => Reply::line(e.to_string()),
            },
            ConsoleCommand::Retry(stage) => match self.coordinator.retry(stage) {
                Ok(()) => Reply::line(format!("retrying {stage}")),
                Err(e) => Reply::line(e.to_string()),
            },
            ConsoleCommand::Transcript => self.transcript(),
            ConsoleCommand::Status => {
                Reply::line(render_run(&self.coordinator.snapshot(), self.ui.preview_chars))
            }
            ConsoleCommand::Help => Reply::line(HELP),
            ConsoleCommand::Quit => Reply {
                quit: true,
                ..Reply::default()
            },
        }
    }

    fn transcript(&self) -> Reply {
        let run = self.coordinator.snapshot();
        if !run.is_active() {
            return Reply::line("nothing has been submitted yet");
        }
        let service = Arc::clone(&self.service);
        let preview_chars = self.ui.preview_chars;
        let input = run.input.clone();
        let pending = tokio::spawn(async move {
            match service.fetch_transcript(&input).await {
                Ok(raw) => vec![
                    format!("[Transcript {}]", raw.video_id),
                    render::truncate(&raw.transcript, preview_chars),
                ],
                Err(e) => vec![format!("transcript failed: {e}")],
            }
        });
        Reply {
            lines: vec![format!("fetching transcript for {}...", run.input)],
            pending: Some(pending),
            ..Reply::default()
        }
    }

    /// Process lines until `quit` or the channel closes.
    pub async fn run(self, mut lines: mpsc::Receiver<String>) {
        println!("{HELP}");
        while let Some(line) = lines.recv().await {
            let command = match parse_command(&line) {
                Ok(Some(command)) => command,
                Ok(None) => continue,
                Err(message) => {
                    println!("{message}");
                    continue;
                }
            };

            let reply = self.execute(command).await;
            for line in &reply.lines {
                println!("{line}");
            }
            if let Some(pending) = reply.pending {
                tokio::spawn(async move {
                    match pending.await {
                        Ok(lines) => lines.iter().for_each(|line| println!("{line}")),
                        Err(e) => log::warn!("console: background command failed: {e}"),
                    }
                });
            }
            if reply.quit {
                break;
            }
        }
        log::info!("console: input closed, shutting down");
    }
}

/// Print panes as they change until the coordinator goes away.
pub async fn render_updates(mut updates: watch::Receiver<PipelineRun>, ui: UiConfig) {
    let mut tracker = PaneTracker::new();
    while updates.changed().await.is_ok() {
        let run = updates.borrow_and_update().clone();
        if !run.is_active() {
            continue;
        }
        for stage in tracker.changed(&run) {
            println!("{}", render_pane(stage, run.stage(stage), ui.preview_chars));
        }
        if ui.announce_completion && run.is_complete() {
            match run.failures().len() {
                0 => println!("{} all stages finished", run.id),
                n => println!("{} finished with {n} failed stage(s)", run.id),
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
