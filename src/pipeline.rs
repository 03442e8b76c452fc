//! One-shot run orchestration
//!
//! A run is strictly sequential: select topic, request content, decode,
//! persist, dispatch. Everything upstream of dispatch is fail-fast (there is
//! no point notifying about a packet that was never produced); dispatch
//! itself is fail-soft per target and only fails the run when no target
//! accepted the notification.

use chrono::NaiveDate;

use crate::config::Config;
use crate::decode;
use crate::dispatch::{summarize, Dispatcher};
use crate::error::{Error, Result};
use crate::generator::{build_prompt, GeneratorClient};
use crate::models::{PacketArtifact, StudyPacket};
use crate::scheduler::TopicScheduler;
use crate::storage::{self, PacketStore};

/// Offline preview produced by a dry run
#[derive(Debug, Clone)]
pub struct RunPreview {
    /// The prompt that would be sent to the generative service
    pub prompt: String,

    /// The notification payload that would be posted to each target
    pub payload: serde_json::Value,
}

/// Outcome of one pipeline run
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Topic selected for the run
    pub topic: String,

    /// Identifier of the persisted packet (absent on dry runs)
    pub packet_id: Option<String>,

    /// Targets that accepted the notification
    pub delivered: usize,

    /// Targets attempted
    pub attempted: usize,

    /// Whether this was an offline preview
    pub dry_run: bool,

    /// Preview material (dry runs only)
    pub preview: Option<RunPreview>,
}

impl RunReport {
    /// One-line human summary for the end of a run
    pub fn summary(&self) -> String {
        if self.dry_run {
            format!("dry run: topic '{}', nothing sent", self.topic)
        } else {
            format!(
                "topic '{}', packet {}, delivered to {}/{} target(s)",
                self.topic,
                self.packet_id.as_deref().unwrap_or("-"),
                self.delivered,
                self.attempted,
            )
        }
    }
}

/// Execute one pipeline run for the given date
pub async fn run(config: &Config, today: NaiveDate, dry_run: bool) -> Result<RunReport> {
    config
        .validate()
        .map_err(|e| Error::config(e.to_string()))?;

    // Missing secrets abort before any network call
    if !dry_run {
        if config.generator.api_key.trim().is_empty() {
            return Err(Error::config(
                "generator API key not configured (set GOOGLE_API_KEY)",
            ));
        }
        if config.dispatch.webhooks.is_empty() {
            return Err(Error::config(
                "no notification targets configured (set DINGTALK_WEBHOOK)",
            ));
        }
    }

    let scheduler = TopicScheduler::from_config(&config.schedule)?;

    if dry_run {
        return preview(config, &scheduler, today);
    }

    let topic = scheduler.select_topic(today)?;
    tracing::info!(stage = "select", topic = %topic, "Stage complete");

    let client = GeneratorClient::new(config.generator.clone())?;
    let prompt = build_prompt(&topic, config.generator.question_count);
    let raw = client.generate(&prompt).await?;
    tracing::info!(stage = "generate", response_chars = raw.len(), "Stage complete");

    let packet = decode::decode(&raw)?;
    tracing::info!(stage = "decode", questions = packet.questions.len(), "Stage complete");

    let artifact = PacketArtifact::new(today, packet);
    let store = PacketStore::new(&config.schedule.packet_dir);
    store.save(&artifact)?;
    tracing::info!(stage = "persist", id = %artifact.id, "Stage complete");

    let link = storage::study_link(&config.dispatch.page_url, &artifact.packet)?;
    let dispatcher = Dispatcher::new(config.dispatch.clone())?;
    let results = dispatcher.dispatch(&artifact.packet, &link, today).await;
    let (delivered, failed) = summarize(&results);
    tracing::info!(stage = "dispatch", delivered, failed, "Stage complete");

    if delivered == 0 {
        return Err(Error::AllTargetsFailed {
            attempted: results.len(),
        });
    }

    Ok(RunReport {
        topic: artifact.packet.topic,
        packet_id: Some(artifact.id),
        delivered,
        attempted: results.len(),
        dry_run: false,
        preview: None,
    })
}

/// Offline preview: no state write, no HTTP
fn preview(config: &Config, scheduler: &TopicScheduler, today: NaiveDate) -> Result<RunReport> {
    let topic = scheduler.preview_topic(today)?;
    let prompt = build_prompt(&topic, config.generator.question_count);

    // The packet does not exist yet; format the payload around a stub so the
    // operator sees the message shape and countdown.
    let stub = StudyPacket {
        topic: topic.clone(),
        overview: String::new(),
        questions: Vec::new(),
    };
    let dispatcher = Dispatcher::new(config.dispatch.clone())?;
    let payload = dispatcher.build_payload(&stub, &config.dispatch.page_url, today);

    tracing::info!(stage = "preview", topic = %topic, "Dry run, nothing sent");

    Ok(RunReport {
        topic,
        packet_id: None,
        delivered: 0,
        attempted: 0,
        dry_run: true,
        preview: Some(RunPreview { prompt, payload }),
    })
}
