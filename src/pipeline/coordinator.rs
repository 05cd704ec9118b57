//! Pipeline coordinator — drives Analyze, Format and Translate for one
//! submission at a time.
//!
//! # Flow
//!
//! ```text
//! submit(url)
//!   ├─▶ spawn analyze_video(url)                [Analyze  = Running]
//!   └─▶ spawn fetch_formatted_transcript(url)   [Format   = Running]
//!         ├─ Ok(text) → Format = Succeeded
//!         │            └─▶ spawn translate_text(text)  [Translate = Running]
//!         └─ Err      → Format = Failed, Translate stays Idle
//!
//! retry(stage)
//!   └─▶ dependents reset to Idle, stage re-spawned alone (no chaining)
//! ```
//!
//! Every spawned call carries the run id and the stage's generation at the
//! time it started.  When it resolves, the result is applied only if both
//! still match; anything else is a superseded call and is dropped.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use thiserror::Error;
use tokio::sync::watch;

use crate::service::{ServiceError, VideoService};

use super::graph;
use super::state::{PipelineRun, RunId, Stage, StageState};

// ---------------------------------------------------------------------------
// CoordinatorError
// ---------------------------------------------------------------------------

/// Synchronous rejections from [`PipelineCoordinator`].  Remote failures are
/// never returned here; they land in the stage's `Failed` state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoordinatorError {
    /// The submitted video reference was blank.
    #[error("enter a video link first")]
    Validation,

    /// The stage cannot run yet.
    #[error("{0}")]
    Precondition(String),
}

// ---------------------------------------------------------------------------
// Internal bookkeeping
// ---------------------------------------------------------------------------

/// A call that has been marked `Running` and still needs spawning.
#[derive(Debug)]
struct Launch {
    stage: Stage,
    run: RunId,
    generation: u64,
    input: String,
    /// Start dependents on success.  Set for submissions, cleared for retries.
    chain: bool,
}

#[derive(Default)]
struct Inner {
    run: PipelineRun,
    generations: [u64; 3],
}

impl Inner {
    fn begin(&mut self, stage: Stage, input: String, chain: bool) -> Launch {
        let generation = self.bump(stage);
        *self.run.stage_mut(stage) = StageState::Running;
        log::debug!(
            "pipeline: {} {stage} started (generation {generation})",
            self.run.id
        );
        Launch {
            stage,
            run: self.run.id,
            generation,
            input,
            chain,
        }
    }

    /// Reset `stage` to `Idle` and orphan any call in flight for it.
    fn invalidate(&mut self, stage: Stage) {
        self.bump(stage);
        *self.run.stage_mut(stage) = StageState::Idle;
    }

    fn bump(&mut self, stage: Stage) -> u64 {
        let slot = &mut self.generations[stage.index()];
        *slot += 1;
        *slot
    }

    fn is_current(&self, launch: &Launch) -> bool {
        self.run.id == launch.run && self.generations[launch.stage.index()] == launch.generation
    }
}

struct Shared {
    service: Arc<dyn VideoService>,
    state: Mutex<Inner>,
    updates: watch::Sender<PipelineRun>,
}

impl Shared {
    /// Lock the run state.  Critical sections never span an `.await`, so a
    /// poisoned lock still holds a consistent run.
    fn state(&self) -> MutexGuard<'_, Inner> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, inner: &Inner) {
        self.updates.send_replace(inner.run.clone());
    }

    fn spawn(self: &Arc<Self>, launch: Launch) {
        let shared = Arc::clone(self);
        tokio::spawn(async move {
            let outcome = shared.invoke(launch.stage, &launch.input).await;
            shared.complete(launch, outcome);
        });
    }

    async fn invoke(&self, stage: Stage, input: &str) -> Result<String, ServiceError> {
        match stage {
            Stage::Analyze => self.service.analyze_video(input).await,
            Stage::Format => self
                .service
                .fetch_formatted_transcript(input)
                .await
                .map(|formatted| formatted.formatted_transcript),
            Stage::Translate => self.service.translate_text(input).await,
        }
    }

    fn complete(self: &Arc<Self>, launch: Launch, outcome: Result<String, ServiceError>) {
        let follow_ups = {
            let mut inner = self.state();
            if !inner.is_current(&launch) {
                log::debug!(
                    "pipeline: dropping superseded {} result from {} (generation {})",
                    launch.stage,
                    launch.run,
                    launch.generation
                );
                return;
            }

            let stage = launch.stage;
            let succeeded = match outcome {
                Ok(value) => {
                    log::info!(
                        "pipeline: {} {stage} succeeded ({} chars)",
                        launch.run,
                        value.len()
                    );
                    *inner.run.stage_mut(stage) = StageState::Succeeded(value);
                    true
                }
                Err(e) => {
                    log::warn!("pipeline: {} {stage} failed: {e}", launch.run);
                    *inner.run.stage_mut(stage) = StageState::Failed(e.to_string());
                    false
                }
            };

            let mut follow_ups = Vec::new();
            if succeeded && launch.chain {
                for dependent in stage.dependents() {
                    if let Ok(input) = graph::input_for(dependent, &inner.run) {
                        follow_ups.push(inner.begin(dependent, input, true));
                    }
                }
            }

            self.publish(&inner);
            follow_ups
        };

        for launch in follow_ups {
            self.spawn(launch);
        }
    }
}

// ---------------------------------------------------------------------------
// PipelineCoordinator
// ---------------------------------------------------------------------------

/// Owns the current [`PipelineRun`] and the only code allowed to change it.
///
/// Cheap to clone; clones share the same run.  Must be used from within a
/// tokio runtime because calls are spawned as tasks.
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use video_digest::config::AppConfig;
/// use video_digest::pipeline::PipelineCoordinator;
/// use video_digest::service::ApiClient;
///
/// # async fn example() {
/// let config = AppConfig::load();
/// let coordinator = PipelineCoordinator::new(Arc::new(ApiClient::from_config(&config.service)));
///
/// coordinator.submit("https://youtu.be/dQw4w9WgXcQ").unwrap();
/// let run = coordinator.wait_until_complete().await;
/// println!("{:?}", run.translate);
/// # }
/// ```
#[derive(Clone)]
pub struct PipelineCoordinator {
    shared: Arc<Shared>,
}

impl PipelineCoordinator {
    pub fn new(service: Arc<dyn VideoService>) -> Self {
        let (updates, _) = watch::channel(PipelineRun::default());
        Self {
            shared: Arc::new(Shared {
                service,
                state: Mutex::new(Inner::default()),
                updates,
            }),
        }
    }

    /// Start a new run for `input`, superseding the current one.
    ///
    /// Analyze and Format are both `Running` when this returns; Translate
    /// starts once Format succeeds.  Blank input is rejected with
    /// [`CoordinatorError::Validation`] and changes nothing.
    pub fn submit(&self, input: &str) -> Result<RunId, CoordinatorError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(CoordinatorError::Validation);
        }

        let (id, launches) = {
            let mut inner = self.shared.state();
            let id = inner.run.id.next();
            inner.run = PipelineRun::new(id, input);
            log::info!("pipeline: {id} submitted for {input}");

            let launches: Vec<Launch> = graph::roots()
                .map(|stage| inner.begin(stage, input.to_string(), true))
                .collect();

            self.shared.publish(&inner);
            (id, launches)
        };

        for launch in launches {
            self.shared.spawn(launch);
        }
        Ok(id)
    }

    /// Re-run a single stage of the current run.
    ///
    /// Stages downstream of `stage` are reset to `Idle` and are not started
    /// again automatically.  Fails with [`CoordinatorError::Precondition`],
    /// without any network call, when nothing has been submitted or a
    /// dependency has not succeeded.
    pub fn retry(&self, stage: Stage) -> Result<(), CoordinatorError> {
        let launch = {
            let mut inner = self.shared.state();
            if !inner.run.is_active() {
                return Err(CoordinatorError::Precondition(
                    "nothing has been submitted yet".into(),
                ));
            }

            let input = graph::input_for(stage, &inner.run).map_err(|missing| {
                CoordinatorError::Precondition(format!(
                    "{stage} needs a successful {missing} result first"
                ))
            })?;

            for dependent in stage.downstream() {
                inner.invalidate(dependent);
            }
            log::info!("pipeline: {} retrying {stage}", inner.run.id);
            let launch = inner.begin(stage, input, false);
            self.shared.publish(&inner);
            launch
        };

        self.shared.spawn(launch);
        Ok(())
    }

    pub fn retry_analyze(&self) -> Result<(), CoordinatorError> {
        self.retry(Stage::Analyze)
    }

    /// Re-run Format.  Any Translate result is discarded; call
    /// [`retry_translate`](Self::retry_translate) afterwards to rebuild it.
    pub fn retry_format(&self) -> Result<(), CoordinatorError> {
        self.retry(Stage::Format)
    }

    /// Re-run Translate on the stored Format output.
    pub fn retry_translate(&self) -> Result<(), CoordinatorError> {
        self.retry(Stage::Translate)
    }

    /// Copy of the current run.
    pub fn snapshot(&self) -> PipelineRun {
        self.shared.state().run.clone()
    }

    /// Receiver that observes every state transition.
    pub fn subscribe(&self) -> watch::Receiver<PipelineRun> {
        self.shared.updates.subscribe()
    }

    /// Wait until no stage of the current run is in flight.
    pub async fn wait_until_complete(&self) -> PipelineRun {
        let mut rx = self.subscribe();
        let run = match rx.wait_for(PipelineRun::is_complete).await {
            Ok(run) => run.clone(),
            // The sender lives in `self`, so this cannot close underneath us.
            Err(_) => self.snapshot(),
        };
        run
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
