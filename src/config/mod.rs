//! Plugin configuration
//!
//! Every host integration (environment variables, a JSON parameter blob, a
//! TOML defaults file) is exposed as a [`ConfigSource`]. Type parsing,
//! defaults and link derivation happen once, in [`PluginConfig::load`].

mod env;
mod file;
mod params;

pub use env::EnvSource;
pub use file::FileSource;
pub use params::ParamsSource;

use reqwest::Url;
use std::fmt;
use std::time::Duration;
use tracing::debug;

use crate::build::{BuildContext, BuildStatus};
use crate::error::ConfigError;

pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_SYSTEM_PROTO: &str = "https";

/// Named input fields understood by the plugin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    WebhookUrl,
    Channel,
    Recipient,
    Username,
    IconUrl,
    Timeout,
    BuildNumber,
    BuildStatus,
    Started,
    Finished,
    CommitSha,
    Branch,
    Author,
    CommitMessage,
    CommitLink,
    BuildLink,
    Repo,
    RepoOwner,
    RepoName,
    RepoLink,
    SystemLink,
    SystemHost,
    SystemProto,
}

impl Key {
    pub fn as_str(&self) -> &'static str {
        match self {
            Key::WebhookUrl => "webhook_url",
            Key::Channel => "channel",
            Key::Recipient => "recipient",
            Key::Username => "username",
            Key::IconUrl => "icon_url",
            Key::Timeout => "timeout",
            Key::BuildNumber => "build_number",
            Key::BuildStatus => "build_status",
            Key::Started => "started",
            Key::Finished => "finished",
            Key::CommitSha => "commit_sha",
            Key::Branch => "branch",
            Key::Author => "author",
            Key::CommitMessage => "commit_message",
            Key::CommitLink => "commit_link",
            Key::BuildLink => "build_link",
            Key::Repo => "repo",
            Key::RepoOwner => "repo_owner",
            Key::RepoName => "repo_name",
            Key::RepoLink => "repo_link",
            Key::SystemLink => "system_link",
            Key::SystemHost => "system_host",
            Key::SystemProto => "system_proto",
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A channel through which the CI host hands us named fields.
///
/// Implementations return `None` for fields they do not carry. Empty values
/// must be reported as `None` so defaults apply uniformly across sources.
pub trait ConfigSource {
    /// Short label used in logs
    fn name(&self) -> &'static str;

    fn get(&self, key: Key) -> Option<String>;
}

impl<T: ConfigSource + ?Sized> ConfigSource for Box<T> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn get(&self, key: Key) -> Option<String> {
        (**self).get(key)
    }
}

/// Ordered stack of sources; the first one answering a key wins
#[derive(Default)]
pub struct Layered {
    layers: Vec<Box<dyn ConfigSource>>,
}

impl Layered {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, source: impl ConfigSource + 'static) -> Self {
        self.layers.push(Box::new(source));
        self
    }
}

impl ConfigSource for Layered {
    fn name(&self) -> &'static str {
        "layered"
    }

    fn get(&self, key: Key) -> Option<String> {
        self.layers.iter().find_map(|layer| layer.get(key))
    }
}

/// Fully validated configuration for one invocation
#[derive(Debug, Clone)]
pub struct PluginConfig {
    pub webhook_url: Url,
    pub timeout: Duration,
    pub context: BuildContext,
}

impl PluginConfig {
    /// Read, parse and validate every field. Either everything required
    /// loads or nothing does.
    pub fn load(source: &dyn ConfigSource) -> Result<Self, ConfigError> {
        debug!("Loading plugin configuration from {} source", source.name());

        let webhook_url = parse_webhook_url(required(source, Key::WebhookUrl)?)?;

        let timeout_secs =
            parse_int::<u64>(source, Key::Timeout)?.unwrap_or(DEFAULT_TIMEOUT_SECS);
        if timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                key: Key::Timeout,
                value: timeout_secs.to_string(),
                reason: "timeout must be at least one second".to_string(),
            });
        }

        let build_number = parse_int::<u64>(source, Key::BuildNumber)?.unwrap_or_default();
        // Drone reports unset timestamps as 0
        let started = parse_int::<i64>(source, Key::Started)?.filter(|t| *t > 0);
        let finished = parse_int::<i64>(source, Key::Finished)?.filter(|t| *t > 0);

        let commit_sha = source.get(Key::CommitSha).unwrap_or_default();
        let repo = resolve_repo(source);
        let repo_link = source.get(Key::RepoLink).unwrap_or_default();
        let system_link = resolve_system_link(source);

        let build_link = source.get(Key::BuildLink).unwrap_or_else(|| {
            if system_link.is_empty() {
                String::new()
            } else {
                format!("{}/{}/{}", system_link, repo, build_number)
            }
        });
        let commit_link = source.get(Key::CommitLink).unwrap_or_else(|| {
            if repo_link.is_empty() {
                String::new()
            } else {
                format!("{}/commit/{}", repo_link, commit_sha)
            }
        });

        let context = BuildContext {
            build_number,
            status: source
                .get(Key::BuildStatus)
                .map(BuildStatus::from)
                .unwrap_or_default(),
            started,
            finished,
            commit_sha,
            branch: source.get(Key::Branch).unwrap_or_default(),
            author: source.get(Key::Author).unwrap_or_default(),
            commit_message: source.get(Key::CommitMessage).unwrap_or_default(),
            repo,
            repo_link,
            build_link,
            commit_link,
            system_link,
            system_host: source.get(Key::SystemHost).unwrap_or_default(),
            channel: source.get(Key::Channel),
            recipient: source.get(Key::Recipient),
            username: source.get(Key::Username),
            icon_url: source.get(Key::IconUrl),
        };

        Ok(Self {
            webhook_url,
            timeout: Duration::from_secs(timeout_secs),
            context,
        })
    }
}

fn required(source: &dyn ConfigSource, key: Key) -> Result<String, ConfigError> {
    source.get(key).ok_or(ConfigError::Missing { key })
}

fn parse_int<T>(source: &dyn ConfigSource, key: Key) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    T::Err: fmt::Display,
{
    source
        .get(key)
        .map(|raw| {
            raw.trim().parse::<T>().map_err(|e| ConfigError::Invalid {
                key,
                value: raw.clone(),
                reason: e.to_string(),
            })
        })
        .transpose()
}

fn parse_webhook_url(raw: String) -> Result<Url, ConfigError> {
    let url = Url::parse(raw.trim()).map_err(|e| ConfigError::Invalid {
        key: Key::WebhookUrl,
        value: raw.clone(),
        reason: e.to_string(),
    })?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ConfigError::Invalid {
            key: Key::WebhookUrl,
            value: raw,
            reason: format!("unsupported scheme '{}'", other),
        }),
    }
}

/// `repo` if given, otherwise whatever of owner/name the host provided
fn resolve_repo(source: &dyn ConfigSource) -> String {
    if let Some(full_name) = source.get(Key::Repo) {
        return full_name;
    }
    match (source.get(Key::RepoOwner), source.get(Key::RepoName)) {
        (Some(owner), Some(name)) => format!("{}/{}", owner, name),
        (Some(part), None) | (None, Some(part)) => part,
        (None, None) => String::new(),
    }
}

fn resolve_system_link(source: &dyn ConfigSource) -> String {
    if let Some(link) = source.get(Key::SystemLink) {
        return link.trim_end_matches('/').to_string();
    }
    match source.get(Key::SystemHost) {
        Some(host) => {
            let proto = source
                .get(Key::SystemProto)
                .unwrap_or_else(|| DEFAULT_SYSTEM_PROTO.to_string());
            format!("{}://{}", proto, host)
        }
        None => String::new(),
    }
}
