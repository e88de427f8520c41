use serde::Deserialize;
use std::fs;
use std::path::Path;

use super::{ConfigSource, Key};
use crate::error::ConfigError;

/// Plugin argument defaults kept in a TOML file next to the pipeline.
///
/// ```toml
/// webhook_url = "https://hooks.slack.com/services/..."
/// channel = "builds"
/// username = "CI"
/// timeout = 15
/// ```
///
/// Only plugin arguments may be set here; build metadata always comes from
/// the host.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileSource {
    webhook_url: Option<String>,
    channel: Option<String>,
    recipient: Option<String>,
    username: Option<String>,
    icon_url: Option<String>,
    timeout: Option<u64>,
}

impl FileSource {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::File {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::parse(&content).map_err(|message| ConfigError::File {
            path: path.to_path_buf(),
            message,
        })
    }

    fn parse(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| e.to_string())
    }
}

impl ConfigSource for FileSource {
    fn name(&self) -> &'static str {
        "defaults file"
    }

    fn get(&self, key: Key) -> Option<String> {
        let value = match key {
            Key::WebhookUrl => self.webhook_url.clone(),
            Key::Channel => self.channel.clone(),
            Key::Recipient => self.recipient.clone(),
            Key::Username => self.username.clone(),
            Key::IconUrl => self.icon_url.clone(),
            Key::Timeout => self.timeout.map(|t| t.to_string()),
            _ => None,
        };
        value.filter(|v| !v.is_empty())
    }
}
