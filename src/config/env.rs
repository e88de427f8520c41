use std::collections::HashMap;

use super::{ConfigSource, Key};

/// Fields read from `DRONE_*` / `PLUGIN_*` environment variables
#[derive(Debug, Clone, Default)]
pub struct EnvSource {
    vars: HashMap<String, String>,
}

impl EnvSource {
    /// Snapshot of the current process environment
    pub fn from_env() -> Self {
        Self::from_vars(std::env::vars())
    }

    pub fn from_vars(vars: impl IntoIterator<Item = (String, String)>) -> Self {
        Self {
            vars: vars.into_iter().collect(),
        }
    }

    /// Variable names for a key, in lookup order
    fn names(key: Key) -> &'static [&'static str] {
        match key {
            Key::WebhookUrl => &["PLUGIN_WEBHOOK_URL", "PLUGIN_WEBHOOK", "SLACK_WEBHOOK"],
            Key::Channel => &["PLUGIN_CHANNEL"],
            Key::Recipient => &["PLUGIN_RECIPIENT"],
            Key::Username => &["PLUGIN_USERNAME"],
            Key::IconUrl => &["PLUGIN_ICON_URL"],
            Key::Timeout => &["PLUGIN_TIMEOUT"],
            Key::BuildNumber => &["DRONE_BUILD_NUMBER"],
            Key::BuildStatus => &["DRONE_BUILD_STATUS"],
            Key::Started => &["DRONE_JOB_STARTED", "DRONE_BUILD_STARTED"],
            Key::Finished => &["DRONE_BUILD_FINISHED", "DRONE_JOB_FINISHED"],
            Key::CommitSha => &["DRONE_COMMIT_SHA", "DRONE_COMMIT"],
            Key::Branch => &["DRONE_COMMIT_BRANCH", "DRONE_BRANCH"],
            Key::Author => &["DRONE_COMMIT_AUTHOR"],
            Key::CommitMessage => &["DRONE_COMMIT_MESSAGE"],
            Key::CommitLink => &["DRONE_COMMIT_LINK"],
            Key::BuildLink => &["DRONE_BUILD_LINK"],
            Key::Repo => &["DRONE_REPO"],
            Key::RepoOwner => &["DRONE_REPO_OWNER"],
            Key::RepoName => &["DRONE_REPO_NAME"],
            Key::RepoLink => &["DRONE_REPO_LINK"],
            Key::SystemLink => &["DRONE_SYSTEM_LINK"],
            Key::SystemHost => &["DRONE_SYSTEM_HOST"],
            Key::SystemProto => &["DRONE_SYSTEM_PROTO"],
        }
    }
}

impl ConfigSource for EnvSource {
    fn name(&self) -> &'static str {
        "environment"
    }

    fn get(&self, key: Key) -> Option<String> {
        Self::names(key)
            .iter()
            .filter_map(|name| self.vars.get(*name))
            .find(|value| !value.is_empty())
            .cloned()
    }
}
