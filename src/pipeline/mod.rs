//! Pipeline coordinator module for video-digest.
//!
//! Drives the three remote stages for one submitted video and exposes their
//! state to whatever renders it.
//!
//! # Architecture
//!
//! ```text
//! submit(url) ─▶ PipelineCoordinator
//!                  │
//!                  ├─ tokio::spawn(Analyze)  ─┐
//!                  ├─ tokio::spawn(Format)   ─┤  results checked against
//!                  │     └─ ok ─▶ spawn(Translate)  run id + generation
//!                  │                          │
//!                  └─ Mutex<PipelineRun> ◀────┘
//!                        │
//!                        └─ watch::Sender<PipelineRun> ─▶ console renderer
//! ```
//!
//! # Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use video_digest::config::AppConfig;
//! use video_digest::pipeline::{PipelineCoordinator, Stage};
//! use video_digest::service::ApiClient;
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = AppConfig::load();
//!     let coordinator =
//!         PipelineCoordinator::new(Arc::new(ApiClient::from_config(&config.service)));
//!
//!     coordinator.submit("https://youtu.be/dQw4w9WgXcQ").unwrap();
//!     let run = coordinator.wait_until_complete().await;
//!
//!     for (stage, message) in run.failures() {
//!         eprintln!("{stage} failed: {message}");
//!     }
//!     if run.stage(Stage::Format).is_succeeded() && !run.translate.is_succeeded() {
//!         coordinator.retry_translate().unwrap();
//!     }
//! }
//! ```

pub mod coordinator;
pub mod graph;
pub mod state;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use coordinator::{CoordinatorError, PipelineCoordinator};
pub use state::{PipelineRun, RunId, Stage, StageState};
