//! Conversation description loaded from JSON
//!
//! `RenderConfig` mirrors the JSON object accepted on the command line. Keys
//! are camelCase, unknown keys are ignored and every field except the message
//! text has a fallback. Empty strings and zero numbers are treated the same as
//! a missing key, so `"chatName": ""` falls back to `Chat` exactly like an
//! absent `chatName` does.

use crate::Result;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use std::io::Read;
use std::path::Path;

/// A single chat message, in display order
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Message body; escaped before it reaches the page
    pub text: String,
    /// `true` for the other party (left side), `false` for the user (right side)
    #[serde(default, deserialize_with = "null_as_default")]
    pub incoming: bool,
    /// Display label, copied verbatim
    #[serde(default, deserialize_with = "null_as_default")]
    pub time: String,
    /// Sender name shown above incoming bubbles
    #[serde(default)]
    pub sender: Option<String>,
    /// Read state for outgoing bubbles
    #[serde(default)]
    pub read: Option<bool>,
}

impl Message {
    pub fn incoming(text: &str, time: &str) -> Self {
        Self {
            text: text.to_string(),
            incoming: true,
            time: time.to_string(),
            ..Default::default()
        }
    }

    pub fn outgoing(text: &str, time: &str, read: bool) -> Self {
        Self {
            text: text.to_string(),
            incoming: false,
            time: time.to_string(),
            read: Some(read),
            ..Default::default()
        }
    }

    /// Sender label, if one is set and non-empty
    pub fn sender(&self) -> Option<&str> {
        non_empty(&self.sender)
    }

    pub fn is_read(&self) -> bool {
        self.read.unwrap_or(false)
    }
}

/// Colour scheme of the rendered conversation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    /// Only the exact string `light` selects the light theme.
    pub fn from_name(name: &str) -> Self {
        if name == "light" {
            Theme::Light
        } else {
            Theme::Dark
        }
    }
}

fn theme_from_str<'de, D>(deserializer: D) -> std::result::Result<Theme, D::Error>
where
    D: Deserializer<'de>,
{
    let name: Option<serde_json::Value> = Option::deserialize(deserializer)?;
    Ok(match name {
        Some(serde_json::Value::String(s)) => Theme::from_name(&s),
        _ => Theme::Dark,
    })
}

// `null` reads the same as a missing key.
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// Pixel sizes may arrive as `300` or `300.0`; fractions and negatives are rejected.
fn pixels<'de, D>(deserializer: D) -> std::result::Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<f64>::deserialize(deserializer)? {
        None => Ok(None),
        Some(px) if px.fract() == 0.0 && (0.0..=u32::MAX as f64).contains(&px) => {
            Ok(Some(px as u32))
        }
        Some(px) => Err(D::Error::custom(format!(
            "expected a whole number of pixels, found {}",
            px
        ))),
    }
}

/// Display options plus the conversation itself
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderConfig {
    #[serde(default)]
    pub chat_name: Option<String>,
    /// Presence line under the chat name
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_bot: bool,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub avatar_emoji: Option<String>,
    #[serde(default, deserialize_with = "theme_from_str")]
    pub theme: Theme,
    #[serde(default, deserialize_with = "pixels")]
    pub width: Option<u32>,
    /// Absent or zero enables the auto-height pass
    #[serde(default, deserialize_with = "pixels")]
    pub height: Option<u32>,
    /// Device scale factor
    #[serde(default)]
    pub scale: Option<f64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub full_page: bool,
    /// Overrides the clock shown in the status bar
    #[serde(default)]
    pub status_time: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub messages: Vec<Message>,
}

impl RenderConfig {
    /// Parse a config from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parse a config from any reader, consuming it to the end
    pub fn from_reader<R: Read>(mut reader: R) -> Result<Self> {
        let mut buf = String::new();
        reader.read_to_string(&mut buf)?;
        Self::from_json(&buf)
    }

    /// Read and parse a config file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn chat_name(&self) -> Option<&str> {
        non_empty(&self.chat_name)
    }

    pub fn status(&self) -> Option<&str> {
        non_empty(&self.status)
    }

    pub fn avatar_url(&self) -> Option<&str> {
        non_empty(&self.avatar_url)
    }

    pub fn avatar_emoji(&self) -> Option<&str> {
        non_empty(&self.avatar_emoji)
    }

    pub fn status_time(&self) -> Option<&str> {
        non_empty(&self.status_time)
    }

    pub fn width(&self) -> Option<u32> {
        self.width.filter(|w| *w > 0)
    }

    pub fn height(&self) -> Option<u32> {
        self.height.filter(|h| *h > 0)
    }

    pub fn scale(&self) -> Option<f64> {
        self.scale.filter(|s| *s > 0.0)
    }

    /// The built-in conversation rendered by `--demo`
    pub fn demo() -> Self {
        Self {
            chat_name: Some("Jarvis".to_string()),
            status: Some("online".to_string()),
            is_bot: true,
            avatar_emoji: Some("🤖".to_string()),
            theme: Theme::Dark,
            messages: vec![
                Message::incoming("Good morning! Here's your briefing:", "07:01"),
                Message::incoming(
                    "📧 Email: 3 urgent, 12 can wait\n📅 Today: 2 meetings (10am, 3pm)\n📈 BTC: $102,450 (+2.3%)\n🌤 Weather: 24°C, sunny",
                    "07:01",
                ),
                Message::incoming("Want me to draft replies to the urgent emails?", "07:01"),
                Message::outgoing("Yes please", "07:03", true),
                Message::incoming("Done! Drafts ready in Gmail. ✓", "07:04"),
                Message::outgoing("🔥", "07:04", true),
            ],
            ..Default::default()
        }
    }
}

fn non_empty(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|s| !s.is_empty())
}
