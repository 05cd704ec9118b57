//! Video digest — analysis, formatted transcript and Chinese translation for
//! a video reference, driven against a remote analysis service.
//!
//! * [`config`]   — `settings.toml` persistence and the service endpoint.
//! * [`service`]  — typed HTTP gateway to the remote service.
//! * [`pipeline`] — three-stage coordinator (Analyze, Format, Translate).
//! * [`console`]  — line-oriented terminal front end.

pub mod config;
pub mod console;
pub mod pipeline;
pub mod service;
