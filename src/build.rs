//! Build metadata handed to the plugin by the CI host

use std::fmt;

/// Outcome of the build being reported
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildStatus {
    Success,
    Failure,
    Error,
    Killed,
    /// Anything the host reports that is not one of the above, including an empty status
    Other(String),
}

impl BuildStatus {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Success => "success",
            Self::Failure => "failure",
            Self::Error => "error",
            Self::Killed => "killed",
            Self::Other(raw) => raw,
        }
    }
}

impl From<&str> for BuildStatus {
    fn from(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "success" => Self::Success,
            "failure" => Self::Failure,
            "error" => Self::Error,
            "killed" => Self::Killed,
            _ => Self::Other(value.to_string()),
        }
    }
}

impl From<String> for BuildStatus {
    fn from(value: String) -> Self {
        Self::from(value.as_str())
    }
}

impl fmt::Display for BuildStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything the message builder needs, resolved once at startup.
///
/// Links are already resolved here: derived fallbacks (build link from the
/// system link, commit link from the repo link) are filled in by the loader,
/// so an empty string means the host gave us nothing to link to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildContext {
    pub build_number: u64,
    pub status: BuildStatus,
    /// Unix seconds; `None` when the host did not report it
    pub started: Option<i64>,
    pub finished: Option<i64>,
    pub commit_sha: String,
    pub branch: String,
    pub author: String,
    pub commit_message: String,
    /// Full repository name, `owner/name`
    pub repo: String,
    pub repo_link: String,
    pub build_link: String,
    pub commit_link: String,
    pub system_link: String,
    pub system_host: String,
    pub channel: Option<String>,
    pub recipient: Option<String>,
    pub username: Option<String>,
    pub icon_url: Option<String>,
}

impl Default for BuildStatus {
    fn default() -> Self {
        Self::Other(String::new())
    }
}
