//! Slack incoming-webhook message built from a [`BuildContext`]

use chrono::TimeDelta;
use serde::Serialize;
use std::fmt;

use crate::build::{BuildContext, BuildStatus};
use crate::utils::{format_duration, link, prepend, short_sha};

pub const DEFAULT_USERNAME: &str = "Drone CI";
pub const DEFAULT_CHANNEL: &str = "dev";

/// Attachment parts in which Slack should render markdown
const MRKDWN_IN: [&str; 3] = ["text", "fallback", "fields"];

/// Where the message is delivered
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Channel(String),
    Direct(String),
}

impl Target {
    /// A recipient takes priority over a channel; with neither set the
    /// message goes to the default channel.
    pub fn resolve(recipient: Option<&str>, channel: Option<&str>) -> Self {
        match recipient.filter(|r| !r.is_empty()) {
            Some(recipient) => Self::Direct(prepend("@", recipient)),
            None => {
                let channel = channel.filter(|c| !c.is_empty()).unwrap_or(DEFAULT_CHANNEL);
                Self::Channel(prepend("#", channel))
            }
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Channel(name) | Self::Direct(name) => f.write_str(name),
        }
    }
}

/// Attachment color bar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    Good,
    Danger,
    Warning,
}

impl From<&BuildStatus> for Color {
    fn from(status: &BuildStatus) -> Self {
        match status {
            BuildStatus::Success => Color::Good,
            BuildStatus::Failure | BuildStatus::Error | BuildStatus::Killed => Color::Danger,
            BuildStatus::Other(_) => Color::Warning,
        }
    }
}

/// Human label for a build status. Unrecognised statuses read as a failure.
pub fn status_label(status: &BuildStatus) -> &'static str {
    match status {
        BuildStatus::Success => "Passed",
        BuildStatus::Failure => "Failed",
        BuildStatus::Killed => "Aborted",
        BuildStatus::Error => "Errored",
        BuildStatus::Other(_) => "Failed",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Field {
    pub title: String,
    pub value: String,
    pub short: bool,
}

impl Field {
    fn new(title: &str, value: String, short: bool) -> Self {
        Self {
            title: title.to_string(),
            value,
            short,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Attachment {
    pub fallback: String,
    pub color: Color,
    pub title: String,
    pub title_link: String,
    pub fields: Vec<Field>,
    pub mrkdwn_in: Vec<&'static str>,
}

/// Payload posted to the webhook
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    pub username: String,
    pub channel: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,
    pub attachments: Vec<Attachment>,
}

impl ChatMessage {
    pub fn attachment(&self) -> Option<&Attachment> {
        self.attachments.first()
    }
}

/// Time the build took, in seconds, never negative.
///
/// The end is the reported finish time, falling back to `now` while the
/// build is still running. Without a start time the elapsed time is zero.
/// Spans beyond what `TimeDelta` can hold saturate at `TimeDelta::MAX`.
pub fn elapsed(ctx: &BuildContext, now: i64) -> TimeDelta {
    match ctx.started {
        Some(started) => {
            let end = ctx.finished.unwrap_or(now);
            TimeDelta::try_seconds(end.saturating_sub(started).max(0)).unwrap_or(TimeDelta::MAX)
        }
        None => TimeDelta::zero(),
    }
}

pub fn title(ctx: &BuildContext, now: i64) -> String {
    format!(
        "Build #{} {} in {}",
        ctx.build_number,
        status_label(&ctx.status),
        format_duration(elapsed(ctx, now))
    )
}

pub fn fallback(ctx: &BuildContext) -> String {
    format!(
        "{} {}#{} ({}) by {}",
        status_label(&ctx.status),
        ctx.repo,
        short_sha(&ctx.commit_sha),
        ctx.branch,
        ctx.author
    )
}

pub fn branch_link(ctx: &BuildContext) -> String {
    format!("{}/src/{}", ctx.repo_link, ctx.branch)
}

/// Build the message for `ctx`. `now` is the current unix time in seconds.
pub fn build_message(ctx: &BuildContext, now: i64) -> ChatMessage {
    let target = Target::resolve(ctx.recipient.as_deref(), ctx.channel.as_deref());

    let fields = vec![
        Field::new(
            "Commit",
            link(&ctx.commit_link, ctx.commit_message.trim()),
            false,
        ),
        Field::new("Repo", link(&ctx.repo_link, &ctx.repo), true),
        Field::new("Branch", link(&branch_link(ctx), &ctx.branch), true),
    ];

    let attachment = Attachment {
        fallback: fallback(ctx),
        color: Color::from(&ctx.status),
        title: title(ctx, now),
        title_link: ctx.build_link.clone(),
        fields,
        mrkdwn_in: MRKDWN_IN.to_vec(),
    };

    ChatMessage {
        username: ctx
            .username
            .clone()
            .filter(|u| !u.is_empty())
            .unwrap_or_else(|| DEFAULT_USERNAME.to_string()),
        channel: target.to_string(),
        icon_url: ctx.icon_url.clone(),
        attachments: vec![attachment],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: i64 = 1_700_000_500;

    fn context() -> BuildContext {
        BuildContext {
            build_number: 42,
            status: BuildStatus::Success,
            started: Some(1_700_000_000),
            finished: Some(1_700_000_092),
            commit_sha: "abcdef1234567".to_string(),
            branch: "main".to_string(),
            author: "alice".to_string(),
            commit_message: "  Fix flaky test\n".to_string(),
            repo: "org/repo".to_string(),
            repo_link: "https://git.example.com/org/repo".to_string(),
            build_link: "https://ci.example.com/org/repo/42".to_string(),
            commit_link: "https://git.example.com/org/repo/commit/abcdef1234567".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_target_recipient_wins() {
        assert_eq!(
            Target::resolve(Some("alice"), Some("builds")),
            Target::Direct("@alice".to_string())
        );
        assert_eq!(
            Target::resolve(Some("@alice"), None).to_string(),
            "@alice"
        );
    }

    #[test]
    fn test_target_channel_and_default() {
        assert_eq!(Target::resolve(None, Some("builds")).to_string(), "#builds");
        assert_eq!(Target::resolve(None, Some("#builds")).to_string(), "#builds");
        assert_eq!(Target::resolve(None, None).to_string(), "#dev");
        assert_eq!(Target::resolve(Some(""), Some("")).to_string(), "#dev");
    }

    #[test]
    fn test_status_labels() {
        assert_eq!(status_label(&BuildStatus::Success), "Passed");
        assert_eq!(status_label(&BuildStatus::Failure), "Failed");
        assert_eq!(status_label(&BuildStatus::Killed), "Aborted");
        assert_eq!(status_label(&BuildStatus::Error), "Errored");
        assert_eq!(status_label(&BuildStatus::from("pending")), "Failed");
        assert_eq!(status_label(&BuildStatus::default()), "Failed");
    }

    #[test]
    fn test_colors() {
        assert_eq!(Color::from(&BuildStatus::Success), Color::Good);
        assert_eq!(Color::from(&BuildStatus::Failure), Color::Danger);
        assert_eq!(Color::from(&BuildStatus::Error), Color::Danger);
        assert_eq!(Color::from(&BuildStatus::Killed), Color::Danger);
        assert_eq!(Color::from(&BuildStatus::from("running")), Color::Warning);
    }

    #[test]
    fn test_title_uses_finish_time() {
        assert_eq!(title(&context(), NOW), "Build #42 Passed in 1m32s");
    }

    #[test]
    fn test_elapsed_falls_back_to_now() {
        let ctx = BuildContext {
            finished: None,
            ..context()
        };
        assert_eq!(elapsed(&ctx, NOW), TimeDelta::seconds(500));
    }

    #[test]
    fn test_elapsed_is_clamped_and_defaults_to_zero() {
        let backwards = BuildContext {
            finished: Some(1_699_999_000),
            ..context()
        };
        assert_eq!(elapsed(&backwards, NOW), TimeDelta::zero());

        let unstarted = BuildContext {
            started: None,
            ..context()
        };
        assert_eq!(title(&unstarted, NOW), "Build #42 Passed in 0s");
    }

    #[test]
    fn test_elapsed_saturates_on_huge_timestamps() {
        let ctx = BuildContext {
            started: Some(1),
            finished: Some(i64::MAX),
            ..context()
        };
        assert_eq!(elapsed(&ctx, NOW), TimeDelta::MAX);

        let message = build_message(&ctx, NOW);
        let title = &message.attachment().unwrap().title;
        assert!(title.starts_with("Build #42 Passed in "));
        assert!(title.ends_with('s'));
    }

    #[test]
    fn test_fallback_text() {
        assert_eq!(
            fallback(&context()),
            "Passed org/repo#abcdef12 (main) by alice"
        );
    }

    #[test]
    fn test_fallback_with_short_sha() {
        let ctx = BuildContext {
            commit_sha: "abc".to_string(),
            status: BuildStatus::Killed,
            ..context()
        };
        assert_eq!(fallback(&ctx), "Aborted org/repo#abc (main) by alice");

        let empty = BuildContext {
            commit_sha: String::new(),
            ..context()
        };
        assert_eq!(fallback(&empty), "Passed org/repo# (main) by alice");
    }

    #[test]
    fn test_fields_are_ordered_and_linked() {
        let message = build_message(&context(), NOW);
        let fields = &message.attachment().unwrap().fields;

        assert_eq!(fields.len(), 3);
        assert_eq!(fields[0].title, "Commit");
        assert_eq!(
            fields[0].value,
            "<https://git.example.com/org/repo/commit/abcdef1234567|Fix flaky test>"
        );
        assert!(!fields[0].short);
        assert_eq!(fields[1].title, "Repo");
        assert_eq!(fields[1].value, "<https://git.example.com/org/repo|org/repo>");
        assert!(fields[1].short);
        assert_eq!(fields[2].title, "Branch");
        assert_eq!(
            fields[2].value,
            "<https://git.example.com/org/repo/src/main|main>"
        );
        assert!(fields[2].short);
    }

    #[test]
    fn test_envelope_defaults() {
        let message = build_message(&context(), NOW);
        assert_eq!(message.username, "Drone CI");
        assert_eq!(message.channel, "#dev");
        assert_eq!(message.attachments.len(), 1);
        assert_eq!(message.icon_url, None);

        let custom = BuildContext {
            username: Some("Builder".to_string()),
            recipient: Some("bob".to_string()),
            icon_url: Some("https://example.com/icon.png".to_string()),
            ..context()
        };
        let message = build_message(&custom, NOW);
        assert_eq!(message.username, "Builder");
        assert_eq!(message.channel, "@bob");
        assert_eq!(
            message.icon_url.as_deref(),
            Some("https://example.com/icon.png")
        );
    }

    #[test]
    fn test_wire_format() {
        let message = build_message(&context(), NOW);
        let value = serde_json::to_value(&message).unwrap();

        assert_eq!(value["username"], "Drone CI");
        assert_eq!(value["channel"], "#dev");
        assert!(value.get("icon_url").is_none());

        let attachment = &value["attachments"][0];
        assert_eq!(attachment["color"], "good");
        assert_eq!(attachment["title"], "Build #42 Passed in 1m32s");
        assert_eq!(attachment["title_link"], "https://ci.example.com/org/repo/42");
        assert_eq!(
            attachment["fallback"],
            "Passed org/repo#abcdef12 (main) by alice"
        );
        assert_eq!(
            attachment["mrkdwn_in"],
            serde_json::json!(["text", "fallback", "fields"])
        );
        assert_eq!(attachment["fields"][1]["short"], true);
    }
}
