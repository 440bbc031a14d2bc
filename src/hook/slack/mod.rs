//! Slack outgoing webhook provider.
//!
//! Slack posts `trigger_word` and `text` as form-urlencoded fields. The text
//! after the trigger word carries pipe separated build parameters, e.g.
//! `bitrise: branch: master | tag: v1.0`. Responses are sent back as a JSON
//! `{"text": ...}` body, always with 200 so Slack displays it.

pub mod params;
pub mod response;

use axum::http::{HeaderMap, StatusCode, header};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

use crate::error::{HookError, Result};
use crate::hook::{
    HookProvider, HookRequest, TransformOutcome, TransformResponse, TransformResponseInput,
};

pub use params::{
    MessageModel, collect_params_from_pipe_separated_text, transform_outgoing_webhook_message,
};

pub const FORM_URL_ENCODED: &str = "application/x-www-form-urlencoded";

/// Body returned to Slack
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutgoingWebhookResponse {
    pub text: String,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SlackHookProvider;

/// Returns the raw Content-Type header value.
pub fn detect_content_type(headers: &HeaderMap) -> Result<String> {
    let value = headers
        .get(header::CONTENT_TYPE)
        .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
        .unwrap_or_default();

    if value.is_empty() {
        return Err(HookError::MissingHeader("Content-Type".to_string()));
    }
    Ok(value)
}

/// Reads `trigger_word` and `text` from the posted form, `trigger_word` first.
pub fn create_message_model_from_form(form: &HashMap<String, String>) -> Result<MessageModel> {
    let required = |key: &str| -> Result<String> {
        form.get(key)
            .filter(|v| !v.is_empty())
            .cloned()
            .ok_or_else(|| HookError::MissingParameter(key.to_string()))
    };

    let trigger_text = required("trigger_word")?;
    let text = required("text")?;

    Ok(MessageModel { trigger_text, text })
}

fn ok_response(text: String) -> TransformResponse<OutgoingWebhookResponse> {
    TransformResponse {
        data: OutgoingWebhookResponse { text },
        http_status_code: StatusCode::OK,
    }
}

impl HookProvider for SlackHookProvider {
    type Response = OutgoingWebhookResponse;

    fn transform_request(&self, request: &HookRequest) -> TransformOutcome {
        let content_type = match detect_content_type(&request.headers) {
            Ok(ct) => ct,
            Err(e) => return TransformOutcome::Failed(e),
        };
        if content_type != FORM_URL_ENCODED {
            return TransformOutcome::Failed(HookError::UnsupportedContentType(content_type));
        }

        let message = match create_message_model_from_form(&request.form) {
            Ok(msg) => msg,
            Err(e) => return TransformOutcome::Failed(HookError::message_parse(e)),
        };
        debug!("Slack message: {:?}", message);

        match transform_outgoing_webhook_message(&message) {
            Ok(params) => TransformOutcome::Triggers(params),
            Err(e) => TransformOutcome::Failed(e),
        }
    }

    fn transform_response(
        &self,
        input: &TransformResponseInput,
    ) -> TransformResponse<OutgoingWebhookResponse> {
        ok_response(response::format_results(input))
    }

    fn transform_error_message_response(
        &self,
        message: &str,
    ) -> TransformResponse<OutgoingWebhookResponse> {
        ok_response(response::format_error_message(message))
    }

    fn transform_success_message_response(
        &self,
        message: &str,
    ) -> TransformResponse<OutgoingWebhookResponse> {
        ok_response(message.to_string())
    }
}
