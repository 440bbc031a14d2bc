//! Hook provider contract
//!
//! A hook provider turns an inbound webhook request into build trigger
//! parameters, and renders the build-trigger API results back into the
//! response body the calling service expects.

pub mod slack;

use axum::http::{HeaderMap, StatusCode};
use serde::Serialize;
use std::collections::HashMap;
use tracing::warn;

use crate::error::HookError;
use crate::trigger::{TriggerApiParams, TriggerApiResponse};

pub use slack::SlackHookProvider;

/// Inbound request as seen by a hook provider: headers plus decoded form fields.
#[derive(Debug, Clone, Default)]
pub struct HookRequest {
    pub headers: HeaderMap,
    pub form: HashMap<String, String>,
}

impl HookRequest {
    pub fn new(headers: HeaderMap, form: HashMap<String, String>) -> Self {
        Self { headers, form }
    }

    /// Build a request from raw parts, decoding the body as form-urlencoded.
    /// A body that does not decode yields an empty form.
    pub fn from_parts(headers: HeaderMap, body: &[u8]) -> Self {
        let form = match serde_urlencoded::from_bytes::<HashMap<String, String>>(body) {
            Ok(form) => form,
            Err(e) => {
                warn!("Could not decode form body: {}", e);
                HashMap::new()
            }
        };
        Self { headers, form }
    }
}

/// Outcome of transforming a request. Exactly one of the three states holds.
#[derive(Debug)]
pub enum TransformOutcome {
    Triggers(Vec<TriggerApiParams>),
    Skip { reason: String },
    Failed(HookError),
}

impl TransformOutcome {
    pub fn should_skip(&self) -> bool {
        matches!(self, TransformOutcome::Skip { .. })
    }

    pub fn error(&self) -> Option<&HookError> {
        match self {
            TransformOutcome::Failed(e) => Some(e),
            _ => None,
        }
    }
}

/// Results of the trigger attempts made for one request
#[derive(Debug, Clone, Default)]
pub struct TransformResponseInput {
    pub success_trigger_responses: Vec<TriggerApiResponse>,
    pub failed_trigger_responses: Vec<TriggerApiResponse>,
    pub errors: Vec<String>,
}

impl TransformResponseInput {
    /// Sort a trigger API response into the success or failed bucket.
    pub fn push_response(&mut self, response: TriggerApiResponse) {
        if response.is_success() {
            self.success_trigger_responses.push(response);
        } else {
            self.failed_trigger_responses.push(response);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.success_trigger_responses.is_empty()
            && self.failed_trigger_responses.is_empty()
            && self.errors.is_empty()
    }
}

/// Provider-specific response payload plus the HTTP status to deliver it with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformResponse<T> {
    pub data: T,
    pub http_status_code: StatusCode,
}

pub trait HookProvider: Send + Sync {
    type Response: Serialize + Send;

    /// Convert the inbound request into trigger parameters.
    fn transform_request(&self, request: &HookRequest) -> TransformOutcome;

    /// Render the combined trigger results.
    fn transform_response(&self, input: &TransformResponseInput)
        -> TransformResponse<Self::Response>;

    fn transform_error_message_response(&self, message: &str) -> TransformResponse<Self::Response>;

    fn transform_success_message_response(
        &self,
        message: &str,
    ) -> TransformResponse<Self::Response>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_parts_decodes_form_body() {
        let request = HookRequest::from_parts(
            HeaderMap::new(),
            b"trigger_word=bitrise%3A&text=bitrise%3A+branch%3Amaster",
        );
        assert_eq!(request.form.get("trigger_word").map(String::as_str), Some("bitrise:"));
        assert_eq!(
            request.form.get("text").map(String::as_str),
            Some("bitrise: branch:master")
        );
    }

    #[test]
    fn from_parts_empty_body() {
        let request = HookRequest::from_parts(HeaderMap::new(), b"");
        assert!(request.form.is_empty());
    }

    #[test]
    fn push_response_partitions_by_status() {
        let mut input = TransformResponseInput::default();
        assert!(input.is_empty());
        input.push_response(TriggerApiResponse {
            status: "ok".to_string(),
            ..Default::default()
        });
        input.push_response(TriggerApiResponse {
            status: "error".to_string(),
            ..Default::default()
        });
        assert_eq!(input.success_trigger_responses.len(), 1);
        assert_eq!(input.failed_trigger_responses.len(), 1);
        assert!(!input.is_empty());
    }

    #[test]
    fn outcome_accessors() {
        let skip = TransformOutcome::Skip {
            reason: "not a trigger".to_string(),
        };
        assert!(skip.should_skip());
        assert!(skip.error().is_none());

        let failed = TransformOutcome::Failed(HookError::MissingBranch);
        assert!(!failed.should_skip());
        assert!(failed.error().is_some());
    }
}
