//! Pipe separated `key: value` parameter parsing for Slack trigger messages.
//!
//! A message like `bitrise: branch: develop | tag: v1.1 | message: fix: typo`
//! is turned into build params once the trigger word is stripped.

use std::collections::HashMap;
use tracing::debug;

use crate::error::{HookError, Result};
use crate::trigger::{BuildParams, TriggerApiParams};

const PARAM_SEPARATOR: char = '|';
const KEY_VALUE_SEPARATOR: char = ':';

/// Message fields posted by a Slack outgoing webhook
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageModel {
    pub trigger_text: String,
    pub text: String,
}

/// Collects `key: value` pairs from pipe separated text.
///
/// Only the first `:` of a segment separates key from value. Segments that
/// are empty, have no `:`, or have an empty key are dropped. For repeated
/// keys the last one wins.
pub fn collect_params_from_pipe_separated_text(text: &str) -> HashMap<String, String> {
    text.split(PARAM_SEPARATOR)
        .filter_map(|segment| {
            let segment = segment.trim();
            if segment.is_empty() {
                return None;
            }
            let (key, value) = segment.split_once(KEY_VALUE_SEPARATOR)?;
            let key = key.trim();
            if key.is_empty() {
                debug!("Dropping parameter segment without a key: {:?}", segment);
                return None;
            }
            Some((key.to_string(), value.trim().to_string()))
        })
        .collect()
}

/// Text following the first occurrence of the trigger word,
/// or the whole text if the trigger word does not appear in it.
fn params_text(message: &MessageModel) -> &str {
    match message.text.find(&message.trigger_text) {
        Some(idx) => &message.text[idx + message.trigger_text.len()..],
        None => &message.text,
    }
}

/// Maps the parameters of a Slack message onto build trigger params.
pub fn transform_outgoing_webhook_message(message: &MessageModel) -> Result<Vec<TriggerApiParams>> {
    let params = collect_params_from_pipe_separated_text(params_text(message));

    let mut branch = String::new();
    let mut tag = None;
    let mut commit_hash = None;
    let mut commit_message = None;

    for (key, value) in params {
        match key.as_str() {
            "branch" => branch = value,
            "tag" => tag = Some(value),
            "commit" => commit_hash = Some(value),
            "message" => commit_message = Some(value),
            _ => debug!("Ignoring unknown parameter: {}", key),
        }
    }

    if branch.is_empty() {
        return Err(HookError::MissingBranch);
    }

    let build_params = BuildParams::new(branch, tag, commit_hash, commit_message)?;
    Ok(vec![build_params.into()])
}
