//! Page template and placeholder resolution
//!
//! The chat page is a static HTML template with `{{NAME}}` tokens. Each token
//! has a small resolver that applies the config's fallback chain, and
//! [`Template::render`] substitutes the resolved values using an explicit
//! [`Replacement`] strategy.

use crate::config::{RenderConfig, Theme};
use crate::markup;
use chrono::{Local, NaiveTime};

/// The built-in chat page
pub const CHAT_TEMPLATE: &str = include_str!("../templates/chat.html");

const BOT_BADGE: &str = r#"<span class="bot-badge">BOT</span>"#;
const FALLBACK_AVATAR: &str = "🤖";
const FALLBACK_CHAT_NAME: &str = "Chat";
const FALLBACK_STATUS: &str = "online";

/// Named slots in the page template, in substitution order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placeholder {
    Theme,
    StatusTime,
    Avatar,
    ChatName,
    BotBadge,
    Status,
    Messages,
}

impl Placeholder {
    pub const ALL: [Placeholder; 7] = [
        Placeholder::Theme,
        Placeholder::StatusTime,
        Placeholder::Avatar,
        Placeholder::ChatName,
        Placeholder::BotBadge,
        Placeholder::Status,
        Placeholder::Messages,
    ];

    /// Literal token as it appears in the template
    pub fn token(self) -> &'static str {
        match self {
            Placeholder::Theme => "{{THEME}}",
            Placeholder::StatusTime => "{{STATUS_TIME}}",
            Placeholder::Avatar => "{{AVATAR}}",
            Placeholder::ChatName => "{{CHAT_NAME}}",
            Placeholder::BotBadge => "{{BOT_BADGE}}",
            Placeholder::Status => "{{STATUS}}",
            Placeholder::Messages => "{{MESSAGES}}",
        }
    }
}

/// How many occurrences of a token get replaced
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Replacement {
    /// Only the first occurrence; any repeat stays in the output verbatim
    #[default]
    First,
    /// Every occurrence
    All,
}

/// Source of the status-bar clock
pub trait Clock {
    fn now(&self) -> NaiveTime;
}

/// Local wall-clock time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveTime {
        Local::now().time()
    }
}

/// A clock that always reports the same time
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveTime {
        self.0
    }
}

/// A template string with `{{NAME}}` placeholders
#[derive(Debug, Clone)]
pub struct Template {
    source: String,
}

impl Default for Template {
    fn default() -> Self {
        Self::new(CHAT_TEMPLATE)
    }
}

impl Template {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
        }
    }

    /// Substitute `values` in the order given.
    ///
    /// Values are inserted verbatim. A value that itself contains a token
    /// later in the list will be substituted too.
    pub fn render(&self, values: &[(Placeholder, String)], strategy: Replacement) -> String {
        values
            .iter()
            .fold(self.source.clone(), |html, (slot, value)| match strategy {
                Replacement::First => html.replacen(slot.token(), value, 1),
                Replacement::All => html.replace(slot.token(), value),
            })
    }
}

pub fn resolve_theme(config: &RenderConfig) -> &'static str {
    match config.theme {
        Theme::Light => "light",
        Theme::Dark => "",
    }
}

/// Explicit override, else the clock as `H:MM` (24-hour, no leading zero)
pub fn resolve_status_time(config: &RenderConfig, clock: &dyn Clock) -> String {
    match config.status_time() {
        Some(time) => time.to_string(),
        None => clock.now().format("%-H:%M").to_string(),
    }
}

/// Image URL, else emoji, else the chat name's first character, else a robot.
pub fn resolve_avatar(config: &RenderConfig) -> String {
    if let Some(url) = config.avatar_url() {
        return format!(r#"<img src="{}" alt="avatar">"#, url);
    }
    if let Some(emoji) = config.avatar_emoji() {
        return emoji.to_string();
    }
    config
        .chat_name()
        .and_then(|name| name.chars().next())
        .map(String::from)
        .unwrap_or_else(|| FALLBACK_AVATAR.to_string())
}

pub fn resolve_chat_name(config: &RenderConfig) -> &str {
    config.chat_name().unwrap_or(FALLBACK_CHAT_NAME)
}

pub fn resolve_bot_badge(config: &RenderConfig) -> &'static str {
    if config.is_bot {
        BOT_BADGE
    } else {
        ""
    }
}

pub fn resolve_status(config: &RenderConfig) -> &str {
    config.status().unwrap_or(FALLBACK_STATUS)
}

/// Resolve every placeholder for `config`, in substitution order.
pub fn resolve_all(config: &RenderConfig, clock: &dyn Clock) -> Vec<(Placeholder, String)> {
    Placeholder::ALL
        .iter()
        .map(|&slot| {
            let value = match slot {
                Placeholder::Theme => resolve_theme(config).to_string(),
                Placeholder::StatusTime => resolve_status_time(config, clock),
                Placeholder::Avatar => resolve_avatar(config),
                Placeholder::ChatName => resolve_chat_name(config).to_string(),
                Placeholder::BotBadge => resolve_bot_badge(config).to_string(),
                Placeholder::Status => resolve_status(config).to_string(),
                Placeholder::Messages => markup::render_messages(&config.messages),
            };
            (slot, value)
        })
        .collect()
}

/// Build the complete chat page for `config` from the built-in template.
pub fn compose_document(config: &RenderConfig, clock: &dyn Clock) -> String {
    Template::default().render(&resolve_all(config, clock), Replacement::First)
}
