//! Alert notifiers.

use quality_core::{Alert, Notifier, QualityError, Result};
use reqwest::blocking::Client;
use serde_json::{Value, json};
use std::time::Duration;
use tracing::{debug, error};

/// Webhook request timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Writes alerts to the log as structured error events.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, alert: &Alert) -> Result<()> {
        error!(
            suite = %alert.suite_name,
            run = %alert.run_name,
            environment = %alert.environment,
            asset = %alert.asset_identifier,
            failed = ?alert.failed_rules,
            result = %alert.result_location,
            "{}",
            alert.summary
        );
        Ok(())
    }
}

/// Posts alerts to a Slack-compatible incoming webhook.
#[derive(Debug, Clone)]
pub struct WebhookNotifier {
    client: Client,
    url: String,
}

impl WebhookNotifier {
    /// Creates a notifier for a webhook URL.
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| QualityError::notification(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

impl Notifier for WebhookNotifier {
    fn notify(&self, alert: &Alert) -> Result<()> {
        let response = self
            .client
            .post(&self.url)
            .json(&slack_payload(alert))
            .send()
            .map_err(|e| QualityError::notification(format!("webhook request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(QualityError::notification(format!(
                "webhook returned {status}"
            )));
        }

        debug!(%status, "Webhook accepted alert");
        Ok(())
    }
}

/// Renders an alert as a Slack message.
pub fn slack_payload(alert: &Alert) -> Value {
    let failures = if alert.failed_rules.is_empty() {
        "_no rule detail available_".to_string()
    } else {
        alert
            .failed_rules
            .iter()
            .map(|rule| format!("• {rule}"))
            .collect::<Vec<_>>()
            .join("\n")
    };

    let title = format!(
        ":x: Validation failed: `{}` ({})",
        alert.suite_name, alert.environment
    );

    json!({
        "text": format!("{title} - {}", alert.summary),
        "blocks": [
            {
                "type": "section",
                "text": { "type": "mrkdwn", "text": format!("*{title}*\n{}", alert.summary) }
            },
            {
                "type": "section",
                "fields": [
                    { "type": "mrkdwn", "text": format!("*Run*\n{}", alert.run_name) },
                    { "type": "mrkdwn", "text": format!("*Asset*\n{}", alert.asset_identifier) }
                ]
            },
            {
                "type": "section",
                "text": { "type": "mrkdwn", "text": failures }
            },
            {
                "type": "context",
                "elements": [
                    { "type": "mrkdwn", "text": format!("Result: {}", alert.result_location) }
                ]
            }
        ]
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use quality_core::{DataAssetName, Environment};

    fn alert() -> Alert {
        Alert {
            suite_name: "custom_table_validation_suite".into(),
            run_name: "custom_table_2022-06-05".into(),
            environment: Environment::Production,
            asset_identifier: DataAssetName::new("custom_table", "2022-06-05"),
            summary: "Validation failed: 1 of 2 expectations succeeded (50.0%)".into(),
            failed_rules: vec!["RowCountBetween: Row count 5 is outside [10000, 50000]".into()],
            result_location: "file:///tmp/dq/result.json".into(),
        }
    }

    #[test]
    fn test_payload_carries_required_fields() {
        let payload = slack_payload(&alert()).to_string();

        for expected in [
            "custom_table_validation_suite",
            "custom_table_2022-06-05",
            "production",
            "Row count 5 is outside",
            "file:///tmp/dq/result.json",
            "1 of 2 expectations",
        ] {
            assert!(payload.contains(expected), "payload lacks {expected}: {payload}");
        }
    }

    #[test]
    fn test_log_notifier_never_fails() {
        assert!(LogNotifier.notify(&alert()).is_ok());
    }

    #[test]
    fn test_unreachable_webhook_is_a_notification_error() {
        let notifier = WebhookNotifier::new("http://127.0.0.1:9/hook").unwrap();
        assert!(matches!(
            notifier.notify(&alert()),
            Err(QualityError::Notification(_))
        ));
    }
}
