use reqwest::Client;
use serde_json::json;

/// FCM push client. Best-effort: a failed or unconfigured send is logged
/// and never surfaced to the request that triggered it.
#[derive(Clone)]
pub struct PushNotifier {
    client: Client,
    server_key: String,
    endpoint: String,
}

impl PushNotifier {
    pub fn new(server_key: String) -> Self {
        Self {
            client: Client::new(),
            server_key,
            endpoint: "https://fcm.googleapis.com/fcm/send".to_string(),
        }
    }

    #[cfg(test)]
    pub fn with_endpoint(server_key: String, endpoint: String) -> Self {
        Self {
            client: Client::new(),
            server_key,
            endpoint,
        }
    }

    /// Notify subscribers about a freshly created event in their area.
    pub async fn send_new_event(
        &self,
        tokens: &[String],
        event_id: &str,
        category: &str,
        event_name: &str,
    ) {
        if tokens.is_empty() {
            return;
        }
        if self.server_key.is_empty() {
            tracing::info!(event_id, category, "push no-op: {} recipients", tokens.len());
            return;
        }

        let body = format!("New {} event - check it out now", category);
        let payload = json!({
            "priority": "high",
            "notification": {
                "title": event_name,
                "body": body,
            },
            "data": {
                "click_action": "FLUTTER_NOTIFICATION_CLICK",
                "status": "done",
                "event": event_id,
                "body": body,
                "title": event_name,
            },
            "registration_ids": tokens,
        });

        let result = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("key={}", self.server_key))
            .json(&payload)
            .send()
            .await;

        match result {
            Ok(response) if !response.status().is_success() => {
                tracing::error!("push rejected with status {}", response.status());
            }
            Ok(_) => {}
            Err(e) => tracing::error!("push dispatch failed: {}", e),
        }
    }
}
