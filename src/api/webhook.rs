//! Webhook handler for chat service trigger requests

use axum::{
    Json,
    body::Bytes,
    extract::State as AxumState,
    extract::{Path, Query},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use chrono::Utc;
use serde_json::json;
use std::collections::HashMap;
use std::sync::atomic::Ordering;
use tracing::{Instrument, debug, error, info, info_span, warn};
use uuid::Uuid;

use crate::hook::{
    HookProvider, HookRequest, SlackHookProvider, TransformOutcome, TransformResponse,
    TransformResponseInput,
};
use crate::utils::verify_slack_signature;
use crate::{AppState, SharedState};

const NO_TRIGGER_MESSAGE: &str = "After processing the webhook we failed to detect any event in it which could be turned into a build.";

fn into_http_response<T: serde::Serialize>(resp: TransformResponse<T>) -> Response {
    (resp.http_status_code, Json(resp.data)).into_response()
}

/// Handles POST /h/{service}/{app_slug}/{api_token}
pub async fn handle_webhook(
    AxumState(state): AxumState<SharedState>,
    Path((service, app_slug, api_token)): Path<(String, String, String)>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    state.stats.requests.fetch_add(1, Ordering::Relaxed);

    // Check for dry run mode
    let dry_run = params.get("dry_run").map(|v| v == "true").unwrap_or(false)
        || headers.get("X-Dry-Run").is_some();

    let request_id = Uuid::now_v7();
    let span = info_span!("webhook", %request_id, %service, %app_slug);

    async move {
        match service.as_str() {
            "slack" => {
                if let Some(secret) = state.config.slack.signing_secret() {
                    let timestamp = headers
                        .get("X-Slack-Request-Timestamp")
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or("");
                    let signature = headers
                        .get("X-Slack-Signature")
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or("");
                    if !verify_slack_signature(
                        secret,
                        timestamp,
                        &body,
                        signature,
                        Utc::now().timestamp(),
                    ) {
                        error!("Slack signature verification failed for app '{}'", app_slug);
                        return StatusCode::UNAUTHORIZED.into_response();
                    }
                }

                let request = HookRequest::from_parts(headers, &body);
                let resp = process_hook(
                    &state,
                    &SlackHookProvider,
                    &request,
                    &app_slug,
                    &api_token,
                    dry_run,
                )
                .await;
                into_http_response(resp)
            }
            _ => {
                warn!("Unknown hook service: {}", service);
                (
                    StatusCode::NOT_FOUND,
                    Json(json!({ "error": format!("No service found with ID: {}", service) })),
                )
                    .into_response()
            }
        }
    }
    .instrument(span)
    .await
}

/// Runs a provider over the request and triggers the resulting builds.
pub async fn process_hook<P: HookProvider>(
    state: &AppState,
    provider: &P,
    request: &HookRequest,
    app_slug: &str,
    api_token: &str,
    dry_run: bool,
) -> TransformResponse<P::Response> {
    let trigger_params = match provider.transform_request(request) {
        TransformOutcome::Triggers(params) => params,
        TransformOutcome::Skip { reason } => {
            info!("Skipping webhook: {}", reason);
            return provider.transform_success_message_response(&format!(
                "Acknowledged, but skipping. Reason: {}",
                reason
            ));
        }
        TransformOutcome::Failed(e) => {
            warn!("Failed to transform webhook request: {}", e);
            return provider.transform_error_message_response(&e.to_string());
        }
    };

    if trigger_params.is_empty() {
        warn!("{}", NO_TRIGGER_MESSAGE);
        return provider.transform_error_message_response(NO_TRIGGER_MESSAGE);
    }

    if dry_run {
        info!("[DRY_RUN] {} build(s) for app '{}'", trigger_params.len(), app_slug);
        let mut text = String::from("[DRY_RUN] Would trigger:");
        for params in &trigger_params {
            text.push_str(&format!("\n* {}", params.build_params));
        }
        return provider.transform_success_message_response(&text);
    }

    // check rate limits before calling the trigger API
    {
        let limits = &state.config.rate_limit;
        let mut rate_limiter = state.rate_limiter.lock().await;
        if rate_limiter.check_rate_limit(app_slug, limits.max_requests, limits.window_secs) {
            warn!(
                "Too many trigger requests for app {:?} - {:?} requests per {:?} seconds",
                app_slug, limits.max_requests, limits.window_secs
            );
            return provider.transform_error_message_response(&format!(
                "Too many trigger requests, at most {} per {} seconds are allowed.",
                limits.max_requests, limits.window_secs
            ));
        }
    }

    let mut results = TransformResponseInput::default();
    for params in &trigger_params {
        debug!("Triggering build: {}", params.build_params);
        match state
            .trigger_client
            .trigger_build(app_slug, api_token, params)
            .await
        {
            Ok(resp) => {
                if resp.is_success() {
                    state.stats.builds_triggered.fetch_add(1, Ordering::Relaxed);
                    info!("Triggered build {} for app '{}'", resp.build_slug, app_slug);
                } else {
                    state.stats.trigger_failures.fetch_add(1, Ordering::Relaxed);
                    warn!("Trigger failed for app '{}': {}", app_slug, resp.message);
                }
                results.push_response(resp);
            }
            Err(e) => {
                state.stats.trigger_failures.fetch_add(1, Ordering::Relaxed);
                error!("Failed to call trigger API for app '{}': {}", app_slug, e);
                results.errors.push(e.to_string());
            }
        }
    }

    provider.transform_response(&results)
}
