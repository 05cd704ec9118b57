//! Configuration module for video-digest.
//!
//! Provides `AppConfig` (top-level settings), the `ServiceConfig` holding the
//! remote endpoint, `AppPaths` for the platform config directory, and TOML
//! persistence via `AppConfig::load` / `AppConfig::save`.

pub mod paths;
pub mod settings;

pub use paths::AppPaths;
pub use settings::{AppConfig, ServiceConfig, UiConfig, API_URL_ENV};
