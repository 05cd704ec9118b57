//! Remote analysis service gateway.
//!
//! * [`VideoService`] — async trait implemented by every backend (the HTTP
//!   client and test doubles).
//! * [`ApiClient`] — JSON-over-HTTP implementation built from
//!   [`ServiceConfig`](crate::config::ServiceConfig).
//! * [`ServiceError`] — the single normalized failure shape.
//! * [`Operation`] — the endpoints, their paths and error-message rules.
//!
//! ```rust,no_run
//! use video_digest::config::AppConfig;
//! use video_digest::service::{ApiClient, VideoService};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = AppConfig::load();
//!     let client = ApiClient::from_config(&config.service);
//!     let analysis = client.analyze_video("https://youtu.be/dQw4w9WgXcQ").await;
//!     println!("{analysis:?}");
//! }
//! ```

pub mod client;
pub mod types;

pub use client::{check_health, ApiClient, Operation, ServiceError, VideoService};
pub use types::{FormattedTranscript, RawTranscript};
