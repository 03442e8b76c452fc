//! Multi-target notification dispatch
//!
//! One shared markdown message is built per run and sent to every
//! configured chat-group webhook independently. Each target is its own
//! failure domain: a refused or timed-out send is captured in that target's
//! [`DispatchResult`] and the loop moves on. The run as a whole counts as
//! delivered when at least one target accepted the message.
//!
//! A target has accepted only when the transport succeeded AND the service
//! acknowledged the payload: the notification backend returns 200 with an
//! application-level `errcode` in the body and a non-zero code there means
//! the message was rejected even though the HTTP request went through.

use chrono::{Datelike, NaiveDate};
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;

use crate::config::DispatchConfig;
use crate::models::StudyPacket;

/// Per-target delivery errors; recovered locally, never aborts the loop
#[derive(Error, Debug)]
pub enum DispatchError {
    /// Transport failure or timeout
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success transport status
    #[error("Webhook returned {status}: {body}")]
    Status { status: u16, body: String },

    /// Transport succeeded but the service rejected the payload
    #[error("Webhook rejected payload: errcode {errcode} ({errmsg})")]
    Rejected { errcode: i64, errmsg: String },
}

/// Per-target outcome of one dispatch run
#[derive(Debug, Clone)]
pub struct DispatchResult {
    /// The webhook endpoint this outcome belongs to
    pub target: String,

    /// Whether the target accepted the message
    pub success: bool,

    /// Delivery detail or captured error text
    pub detail: String,
}

/// Application-level acknowledgement embedded in the webhook response body
#[derive(Debug, Deserialize)]
struct Ack {
    errcode: i64,
    #[serde(default)]
    errmsg: String,
}

/// Webhook dispatcher over the configured targets
pub struct Dispatcher {
    client: Client,
    config: DispatchConfig,
}

impl Dispatcher {
    /// Create a dispatcher with a bounded per-send timeout
    pub fn new(config: DispatchConfig) -> Result<Self, DispatchError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { client, config })
    }

    /// The configured targets
    pub fn targets(&self) -> &[String] {
        &self.config.webhooks
    }

    /// Build the shared message payload for a run
    pub fn build_payload(
        &self,
        packet: &StudyPacket,
        link: &str,
        today: NaiveDate,
    ) -> serde_json::Value {
        let days = days_until_exam(today, self.config.exam_month, self.config.exam_day);
        let title = format!("Exam countdown: {days} days");

        let teaser = packet
            .questions
            .first()
            .map(|q| format!("\n**Warm-up question:**\n{}\n", q.prompt))
            .unwrap_or_default();

        let text = format!(
            r#"### ⏳ {title}

**{date}**

**Today's topic: {topic}**
{teaser}
---
👇 Open today's study packet
[👉 Start studying]({link})
"#,
            date = today.format("%Y-%m-%d"),
            topic = packet.topic,
        );

        serde_json::json!({
            "msgtype": "markdown",
            "markdown": {
                "title": title,
                "text": text,
            }
        })
    }

    /// Send the packet notification to every target independently
    pub async fn dispatch(
        &self,
        packet: &StudyPacket,
        link: &str,
        today: NaiveDate,
    ) -> Vec<DispatchResult> {
        let payload = self.build_payload(packet, link, today);
        let mut results = Vec::with_capacity(self.config.webhooks.len());

        for (idx, target) in self.config.webhooks.iter().enumerate() {
            match self.send_one(target, &payload).await {
                Ok(()) => {
                    tracing::info!(target_index = idx + 1, "Notification delivered");
                    results.push(DispatchResult {
                        target: target.clone(),
                        success: true,
                        detail: "delivered (errcode 0)".to_string(),
                    });
                }
                Err(e) => {
                    tracing::error!(target_index = idx + 1, error = %e, "Notification failed");
                    results.push(DispatchResult {
                        target: target.clone(),
                        success: false,
                        detail: e.to_string(),
                    });
                }
            }
        }

        results
    }

    async fn send_one(
        &self,
        target: &str,
        payload: &serde_json::Value,
    ) -> Result<(), DispatchError> {
        let response = self.client.post(target).json(payload).send().await?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if !status.is_success() {
            return Err(DispatchError::Status {
                status: status.as_u16(),
                body,
            });
        }

        match serde_json::from_str::<Ack>(&body) {
            Ok(ack) if ack.errcode == 0 => Ok(()),
            Ok(ack) => Err(DispatchError::Rejected {
                errcode: ack.errcode,
                errmsg: ack.errmsg,
            }),
            Err(_) => Err(DispatchError::Rejected {
                errcode: -1,
                errmsg: format!("unrecognized acknowledgement: {body}"),
            }),
        }
    }
}

/// Count successes and failures over a result set
pub fn summarize(results: &[DispatchResult]) -> (usize, usize) {
    let ok = results.iter().filter(|r| r.success).count();
    (ok, results.len() - ok)
}

/// Days remaining until the exam reference date, inclusive of exam day
///
/// A reference date already behind us rolls forward to the next year it
/// exists in (a Feb 29 reference skips non-leap years).
pub fn days_until_exam(today: NaiveDate, exam_month: u32, exam_day: u32) -> i64 {
    let mut year = today.year();

    while year <= today.year() + 8 {
        if let Some(exam) = NaiveDate::from_ymd_opt(year, exam_month, exam_day) {
            if exam >= today {
                return ((exam - today).num_days() + 1).max(0);
            }
        }
        year += 1;
    }

    0
}
