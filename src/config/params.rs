use serde_json::Value;

use super::{ConfigSource, Key};
use crate::error::ConfigError;

/// Fields read from a structured plugin parameter blob.
///
/// The blob follows the Drone 0.4 plugin layout:
/// `{"repo": {..}, "build": {..}, "job": {..}, "system": {..}, "vargs": {..}}`
#[derive(Debug, Clone)]
pub struct ParamsSource {
    root: Value,
}

impl ParamsSource {
    pub fn parse(blob: &str) -> Result<Self, ConfigError> {
        let root: Value =
            serde_json::from_str(blob).map_err(|e| ConfigError::Params(e.to_string()))?;
        if !root.is_object() {
            return Err(ConfigError::Params(
                "expected a JSON object at the top level".to_string(),
            ));
        }
        Ok(Self { root })
    }

    /// JSON pointers for a key, in lookup order
    fn pointers(key: Key) -> &'static [&'static str] {
        match key {
            Key::WebhookUrl => &["/vargs/webhook_url", "/vargs/webhook"],
            Key::Channel => &["/vargs/channel"],
            Key::Recipient => &["/vargs/recipient"],
            Key::Username => &["/vargs/username"],
            Key::IconUrl => &["/vargs/icon_url"],
            Key::Timeout => &["/vargs/timeout"],
            Key::BuildNumber => &["/build/number"],
            Key::BuildStatus => &["/build/status"],
            Key::Started => &["/job/started_at", "/build/started_at"],
            Key::Finished => &["/build/finished_at", "/job/finished_at"],
            Key::CommitSha => &["/build/commit"],
            Key::Branch => &["/build/branch"],
            Key::Author => &["/build/author"],
            Key::CommitMessage => &["/build/message"],
            Key::CommitLink => &["/build/commit_link"],
            Key::BuildLink => &["/build/link_url"],
            Key::Repo => &["/repo/full_name"],
            Key::RepoOwner => &["/repo/owner"],
            Key::RepoName => &["/repo/name"],
            Key::RepoLink => &["/repo/link_url"],
            Key::SystemLink => &["/system/link_url"],
            Key::SystemHost => &["/system/host"],
            Key::SystemProto => &["/system/proto"],
        }
    }
}

fn scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

impl ConfigSource for ParamsSource {
    fn name(&self) -> &'static str {
        "parameters"
    }

    fn get(&self, key: Key) -> Option<String> {
        Self::pointers(key)
            .iter()
            .filter_map(|pointer| self.root.pointer(pointer))
            .find_map(scalar)
    }
}
