//! Requests relayed between extension surfaces.
//!
//! Answers come from the persisted overlay, never a live recomputation, so
//! callers must tolerate stale data.

use crate::adapters::overlay::OverlayStore;
use crate::config::cli::LocalStorage;
use crate::core::ConfigProvider;
use crate::domain::model::GradeDelta;
use crate::domain::ports::Storage;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MessageRequest {
    CalculateCgpa,
    ClearWhatIf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub success: bool,
    #[serde(default)]
    pub data: Option<Vec<GradeDelta>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl MessageResponse {
    fn ok(data: Option<Vec<GradeDelta>>) -> Self {
        Self {
            success: true,
            data,
            error: None,
        }
    }

    fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
        }
    }
}

pub async fn handle_message<S: Storage>(
    request: &MessageRequest,
    store: &OverlayStore<'_, S>,
) -> MessageResponse {
    tracing::debug!("📨 Handling {:?}", request);
    match request {
        MessageRequest::CalculateCgpa => match store.load().await {
            Ok(data) => MessageResponse::ok(data),
            Err(e) => {
                tracing::warn!("Could not read saved overlay: {}", e);
                MessageResponse::failed(e.user_friendly_message())
            }
        },
        MessageRequest::ClearWhatIf => match store.clear().await {
            Ok(()) => MessageResponse::ok(None),
            Err(e) => MessageResponse::failed(e.user_friendly_message()),
        },
    }
}

/// JSON in, JSON out. Unknown message types get a failed response.
pub async fn handle_raw_message<S: Storage>(raw: &str, store: &OverlayStore<'_, S>) -> String {
    let response = match serde_json::from_str::<MessageRequest>(raw) {
        Ok(request) => handle_message(&request, store).await,
        Err(e) => MessageResponse::failed(format!("Unsupported message: {}", e)),
    };
    serde_json::to_string(&response)
        .unwrap_or_else(|_| r#"{"success":false,"data":null}"#.to_string())
}

/// 依目前使用的配置（TOML 或 CLI）找到 overlay 再回覆
pub async fn handle_configured_message<C: ConfigProvider>(raw: &str, config: &C) -> String {
    let storage = LocalStorage::new(config.output_path().to_string());
    let store = OverlayStore::new(&storage, config.overlay_key());
    tracing::debug!("Answering from overlay '{}' in {}", store.key(), config.output_path());
    handle_raw_message(raw, &store).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_wire_format() {
        let request: MessageRequest = serde_json::from_str(r#"{"type":"CALCULATE_CGPA"}"#).unwrap();
        assert_eq!(request, MessageRequest::CalculateCgpa);

        let request: MessageRequest = serde_json::from_str(r#"{"type":"CLEAR_WHAT_IF"}"#).unwrap();
        assert_eq!(request, MessageRequest::ClearWhatIf);

        assert!(serde_json::from_str::<MessageRequest>(r#"{"type":"SOMETHING_ELSE"}"#).is_err());
    }

    #[test]
    fn test_response_wire_format() {
        let response = MessageResponse::ok(Some(vec![GradeDelta::grade("CSE115", "A")]));
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["data"][0]["code"], "CSE115");
        assert_eq!(json["data"][0]["grade"], "A");
        assert!(json.get("error").is_none());

        let empty = serde_json::to_value(MessageResponse::ok(None)).unwrap();
        assert!(empty["data"].is_null());
    }
}
