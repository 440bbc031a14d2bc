//! Build trigger structures exchanged with the build-trigger API

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{HookError, Result};

/// Parameters of a single build to start.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildParams {
    pub branch: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commit_hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commit_message: Option<String>,
}

impl BuildParams {
    /// Create build params, failing when no branch is given.
    /// Empty optional values are normalized to `None`.
    pub fn new(
        branch: String,
        tag: Option<String>,
        commit_hash: Option<String>,
        commit_message: Option<String>,
    ) -> Result<Self> {
        if branch.is_empty() {
            return Err(HookError::MissingBranch);
        }

        Ok(Self {
            branch,
            tag: tag.filter(|s| !s.is_empty()),
            commit_hash: commit_hash.filter(|s| !s.is_empty()),
            commit_message: commit_message.filter(|s| !s.is_empty()),
        })
    }

    /// Shorthand for a branch-only build
    pub fn for_branch(branch: impl Into<String>) -> Result<Self> {
        Self::new(branch.into(), None, None, None)
    }
}

/// Renders the params back in chat syntax, e.g. `branch: develop | tag: v1.1`
impl fmt::Display for BuildParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "branch: {}", self.branch)?;
        if let Some(tag) = &self.tag {
            write!(f, " | tag: {}", tag)?;
        }
        if let Some(commit) = &self.commit_hash {
            write!(f, " | commit: {}", commit)?;
        }
        if let Some(message) = &self.commit_message {
            write!(f, " | message: {}", message)?;
        }
        Ok(())
    }
}

/// One trigger request handed to the build-trigger API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerApiParams {
    pub build_params: BuildParams,
}

impl From<BuildParams> for TriggerApiParams {
    fn from(build_params: BuildParams) -> Self {
        Self { build_params }
    }
}

/// Result of a single trigger attempt as reported by the build-trigger API
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerApiResponse {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub service: String,
    #[serde(default, rename = "slug")]
    pub app_slug: String,
    #[serde(default)]
    pub build_slug: String,
}

impl TriggerApiResponse {
    pub fn is_success(&self) -> bool {
        self.status == "ok"
    }
}

/// Field dump used in chat responses, e.g.
/// `{Status:ok Message:triggered build Service:bitrise AppSlug:app-slug BuildSlug:build-slug}`
impl fmt::Display for TriggerApiResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{Status:{} Message:{} Service:{} AppSlug:{} BuildSlug:{}}}",
            self.status, self.message, self.service, self.app_slug, self.build_slug
        )
    }
}
