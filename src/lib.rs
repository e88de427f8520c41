pub mod build;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod logging;
pub mod message;
pub mod utils;

use tracing::info;

use crate::config::PluginConfig;
use crate::dispatch::Dispatcher;
use crate::message::{ChatMessage, build_message};

/// Build the notification for `config` and post it. `now` is the current
/// unix time in seconds, used when the build has not reported a finish time.
pub async fn notify(config: &PluginConfig, now: i64) -> error::Result<ChatMessage> {
    let message = build_message(&config.context, now);
    info!(
        "Notifying {} about build #{} ({})",
        message.channel, config.context.build_number, config.context.status
    );

    let dispatcher = Dispatcher::new(config.webhook_url.clone(), config.timeout)?;
    dispatcher.send(&message).await?;
    Ok(message)
}
