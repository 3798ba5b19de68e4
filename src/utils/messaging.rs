use serde_json::json;
use tracing::{info, warn};

use crate::config::Config;
use crate::db::models::stock_request::StockRequestView;

/// Outbound WhatsApp-style messaging.
///
/// Messages are always logged. When a webhook is configured the payload is
/// also POSTed to it in the background; delivery is not confirmed.
#[derive(Clone)]
pub struct Messenger {
    client: reqwest::Client,
    webhook_url: Option<String>,
    default_recipient: String,
}

impl Messenger {
    pub fn new(config: &Config) -> Self {
        Self {
            client: reqwest::Client::new(),
            webhook_url: config.messaging_webhook_url.clone(),
            default_recipient: config.messaging_default_recipient.clone(),
        }
    }

    pub fn default_recipient(&self) -> &str {
        &self.default_recipient
    }

    /// Fire-and-forget send.
    pub fn dispatch(&self, recipient: &str, content: &str) {
        info!(recipient, content, "📨 outbound message");

        let Some(url) = self.webhook_url.clone() else {
            return;
        };
        let client = self.client.clone();
        let payload = json!({ "to": recipient, "message": content });
        tokio::spawn(async move {
            match client.post(&url).json(&payload).send().await {
                Ok(resp) if resp.status().is_success() => {}
                Ok(resp) => warn!(status = %resp.status(), "messaging webhook refused message"),
                Err(e) => warn!(error = %e, "messaging webhook unreachable"),
            }
        });
    }
}

/// Human-readable summary of a request for outbound messages.
pub fn request_summary(view: &StockRequestView) -> String {
    let request = &view.request;
    format!(
        "Stock request {}: {} x {} ({}) by {} is {}. Reason: {}",
        request.id,
        request.quantity,
        view.item_name,
        request.request_type.as_str().replace('_', " "),
        view.requester_name,
        request.status,
        request.reason
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::stock_request::{NewStockRequest, StockRequest, StockRequestType};
    use chrono::Utc;
    use uuid::Uuid;

    #[test]
    fn summary_names_item_requester_and_status() {
        let request = StockRequest::pending(
            NewStockRequest {
                item_id: Uuid::new_v4(),
                quantity: 50,
                request_type: StockRequestType::AddStock,
                reason: "restock".into(),
            },
            Uuid::new_v4(),
            Utc::now(),
        );
        let id = request.id;
        let view = StockRequestView {
            request,
            item_name: "Microscope Slides".into(),
            requester_name: "Mary Wanjiku".into(),
        };

        assert_eq!(
            request_summary(&view),
            format!(
                "Stock request {id}: 50 x Microscope Slides (add stock) by Mary Wanjiku is pending. Reason: restock"
            )
        );
    }

    #[test]
    fn dispatch_without_webhook_only_logs() {
        let messenger = Messenger::new(&Config::new("secret"));
        assert_eq!(messenger.default_recipient(), "store-admin");
        // No runtime is needed when there is nothing to spawn.
        messenger.dispatch("+254700000000", "hello");
    }
}
