use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{json, Value};

use crate::config::NotifierConfig;
use crate::error::NotifyError;

pub const APP_NAME: &str = "Workout-Planner-App";

/// Posts planner events to an outbound webhook.
///
/// Planner state never depends on delivery: with `fail_silently` set, errors are
/// logged and dropped.
#[derive(Clone, Debug)]
pub struct Notifier {
    client: reqwest::blocking::Client,
    webhook_url: Option<String>,
    fail_silently: bool,
}

impl Notifier {
    pub fn new(config: &NotifierConfig) -> Result<Self, NotifyError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()?;
        Ok(Self {
            client,
            webhook_url: config.webhook_url.clone(),
            fail_silently: config.fail_silently,
        })
    }

    pub fn is_enabled(&self) -> bool {
        self.webhook_url.is_some()
    }

    pub fn track(&self, event: &str, payload: Value) -> Result<(), NotifyError> {
        let Some(url) = &self.webhook_url else {
            return Ok(());
        };

        let body = build_payload(event, payload, Utc::now());
        let result = self
            .client
            .post(url)
            .json(&body)
            .send()
            .and_then(|response| response.error_for_status());

        match result {
            Ok(_) => {
                tracing::debug!(event, "webhook event delivered");
                Ok(())
            }
            Err(e) if self.fail_silently => {
                tracing::debug!(event, "webhook event dropped: {}", e);
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// Event envelope; object payload fields are merged in and win over the envelope.
pub fn build_payload(event: &str, payload: Value, ts: DateTime<Utc>) -> Value {
    let mut body = json!({
        "event": event,
        "ts": ts.to_rfc3339_opts(SecondsFormat::Millis, true),
        "app": APP_NAME,
    });
    if let Value::Object(envelope) = &mut body {
        match payload {
            Value::Object(fields) => envelope.extend(fields),
            Value::Null => {}
            other => {
                envelope.insert("payload".to_string(), other);
            }
        }
    }
    body
}
