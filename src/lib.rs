//! crammer - Daily Exam Study Packet Generator
//!
//! An automation pipeline that produces one study packet per day (exam topic,
//! explanatory text, a small question set) from a generative-text service and
//! pushes a notification linking to it into one or more chat groups.
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - [`config`] - Configuration management and settings
//! - [`scheduler`] - Non-repeating topic rotation with persisted state
//! - [`generator`] - Generative-text service client and prompt templates
//! - [`decode`] - Self-healing decoder for free-form model output
//! - [`dispatch`] - Multi-target webhook dispatcher with per-target outcomes
//! - [`storage`] - Packet artifact persistence and study-link building
//! - [`pipeline`] - One-shot run orchestration
//!
//! # Example
//!
//! ```no_run
//! use crammer::config::Config;
//! use crammer::pipeline;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     let today = chrono::Utc::now().date_naive();
//!     let report = pipeline::run(&config, today, false).await?;
//!     println!("{}", report.summary());
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod decode;
pub mod dispatch;
pub mod error;
pub mod generator;
pub mod models;
pub mod pipeline;
pub mod scheduler;
pub mod storage;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::decode::{decode, DecodeError};
    pub use crate::dispatch::{DispatchResult, Dispatcher};
    pub use crate::error::{Error, ErrorCategory, Result};
    pub use crate::generator::{GeneratorClient, UpstreamError};
    pub use crate::models::{PacketArtifact, Question, StudyPacket};
    pub use crate::scheduler::TopicScheduler;
    pub use crate::storage::PacketStore;
}

// Direct re-exports for convenience
pub use models::{PacketArtifact, Question, StudyPacket};
