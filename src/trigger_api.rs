//! Client for the build-trigger API

use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::TriggerApiConfig;
use crate::error::{HookError, Result};
use crate::trigger::{BuildParams, TriggerApiParams, TriggerApiResponse};

const TRIGGERED_BY: &str = "webhook-slack";

/// Starts builds on the build service
#[async_trait]
pub trait BuildTrigger: Send + Sync {
    async fn trigger_build(
        &self,
        app_slug: &str,
        api_token: &str,
        params: &TriggerApiParams,
    ) -> Result<TriggerApiResponse>;
}

#[derive(Debug, Serialize)]
struct HookInfo<'a> {
    #[serde(rename = "type")]
    hook_type: &'a str,
    build_trigger_token: &'a str,
}

#[derive(Debug, Serialize)]
struct TriggerRequestBody<'a> {
    hook_info: HookInfo<'a>,
    build_params: &'a BuildParams,
    triggered_by: &'a str,
}

pub struct BuildTriggerClient {
    http: reqwest::Client,
    base_url: String,
}

impl BuildTriggerClient {
    pub fn new(config: &TriggerApiConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn start_url(&self, app_slug: &str) -> String {
        format!("{}/app/{}/build/start.json", self.base_url, app_slug)
    }
}

#[async_trait]
impl BuildTrigger for BuildTriggerClient {
    async fn trigger_build(
        &self,
        app_slug: &str,
        api_token: &str,
        params: &TriggerApiParams,
    ) -> Result<TriggerApiResponse> {
        let body = TriggerRequestBody {
            hook_info: HookInfo {
                hook_type: "bitrise",
                build_trigger_token: api_token,
            },
            build_params: &params.build_params,
            triggered_by: TRIGGERED_BY,
        };

        let url = self.start_url(app_slug);
        debug!("Triggering build at {} with {:?}", url, params.build_params);
        let resp = self.http.post(&url).json(&body).send().await?;
        let status = resp.status();
        let raw = resp.text().await?;

        match serde_json::from_str::<TriggerApiResponse>(&raw) {
            Ok(parsed) => {
                if status.is_success() {
                    info!(
                        "Trigger API responded for app '{}': {} - {}",
                        app_slug, parsed.status, parsed.message
                    );
                } else {
                    warn!(
                        "Trigger API returned {} for app '{}': {}",
                        status, app_slug, parsed.message
                    );
                }
                Ok(parsed)
            }
            Err(e) => Err(HookError::TriggerApi(format!(
                "Failed to parse response ({}): {} - body: {}",
                status, e, raw
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(base_url: &str) -> BuildTriggerClient {
        BuildTriggerClient::new(&TriggerApiConfig {
            base_url: format!("{}/", base_url),
            timeout_secs: 5,
        })
        .unwrap()
    }

    fn params() -> TriggerApiParams {
        BuildParams::new(
            "master".to_string(),
            Some("v1.0".to_string()),
            None,
            None,
        )
        .unwrap()
        .into()
    }

    #[tokio::test]
    async fn posts_build_params() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/app/app-slug/build/start.json"))
            .and(body_json(serde_json::json!({
                "hook_info": { "type": "bitrise", "build_trigger_token": "token" },
                "build_params": { "branch": "master", "tag": "v1.0" },
                "triggered_by": "webhook-slack"
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
                "status": "ok",
                "message": "webhook processed",
                "slug": "app-slug",
                "service": "bitrise",
                "build_slug": "build-slug",
                "build_number": 12
            })))
            .expect(1)
            .mount(&server)
            .await;

        let resp = client(&server.uri())
            .trigger_build("app-slug", "token", &params())
            .await
            .unwrap();
        assert!(resp.is_success());
        assert_eq!(resp.app_slug, "app-slug");
        assert_eq!(resp.build_slug, "build-slug");
    }

    #[tokio::test]
    async fn error_status_with_json_body_is_a_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "status": "error",
                "message": "trigger token is invalid",
                "service": "bitrise"
            })))
            .mount(&server)
            .await;

        let resp = client(&server.uri())
            .trigger_build("app-slug", "bad", &params())
            .await
            .unwrap();
        assert!(!resp.is_success());
        assert_eq!(resp.message, "trigger token is invalid");
    }

    #[tokio::test]
    async fn unparseable_body_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
            .mount(&server)
            .await;

        let err = client(&server.uri())
            .trigger_build("app-slug", "token", &params())
            .await
            .unwrap_err();
        assert!(matches!(err, HookError::TriggerApi(_)));
        assert!(err.to_string().contains("bad gateway"));
    }
}
