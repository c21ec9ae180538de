//! Chat bubble markup generation
//!
//! Turns an ordered list of [`Message`]s into the HTML fragment that is
//! substituted for `{{MESSAGES}}` in the page template. Each message becomes
//! one `message-row` element; consecutive messages in the same direction form
//! a run whose last bubble carries the `has-tail` class.

use crate::config::Message;
use regex::Regex;
use std::sync::OnceLock;

/// Longest text (in chars) still eligible for the enlarged emoji style
pub const EMOJI_ONLY_MAX_CHARS: usize = 8;

const RECEIPT_READ: &str = r#"<span class="read-receipt"><span class="check read">✓✓</span></span>"#;
const RECEIPT_SENT: &str = r#"<span class="read-receipt"><span class="check">✓</span></span>"#;

static EMOJI_ONLY: OnceLock<Regex> = OnceLock::new();

fn emoji_only_regex() -> &'static Regex {
    EMOJI_ONLY.get_or_init(|| Regex::new(r"^[\p{Emoji}\s]+$").expect("static emoji regex"))
}

/// Render every message as a bubble, in order, one fragment per message.
pub fn render_messages(messages: &[Message]) -> String {
    messages
        .iter()
        .enumerate()
        .map(|(idx, msg)| render_bubble(msg, has_tail(messages, idx)))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Whether the bubble at `idx` closes a same-direction run.
///
/// Only the `incoming` flag is compared; two incoming messages from different
/// senders still belong to one run.
pub fn has_tail(messages: &[Message], idx: usize) -> bool {
    match (messages.get(idx), messages.get(idx + 1)) {
        (Some(current), Some(next)) => next.incoming != current.incoming,
        _ => true,
    }
}

/// Whether the text consists only of emoji and whitespace and is short
/// enough to be drawn without a bubble.
///
/// Length is counted in Unicode scalar values, so a ZWJ family or a flag
/// counts as several characters toward the limit.
pub fn is_emoji_only(text: &str) -> bool {
    emoji_only_regex().is_match(text) && text.chars().count() <= EMOJI_ONLY_MAX_CHARS
}

/// Escape message text for insertion into an element body.
///
/// `&` goes first so the entities produced by later steps stay intact.
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\n', "<br>")
}

fn render_bubble(msg: &Message, tail: bool) -> String {
    let direction = if msg.incoming { "incoming" } else { "outgoing" };
    let tail_class = if tail { "has-tail" } else { "" };
    let emoji_class = if is_emoji_only(&msg.text) { "emoji-only" } else { "" };

    let sender = match msg.sender() {
        Some(name) if msg.incoming => format!(r#"<div class="sender-name">{}</div>"#, name),
        _ => String::new(),
    };

    let receipt = match (msg.incoming, msg.is_read()) {
        (true, _) => "",
        (false, true) => RECEIPT_READ,
        (false, false) => RECEIPT_SENT,
    };

    format!(
        r#"
      <div class="message-row {direction}">
        <div class="message {direction} {tail_class} {emoji_class}">
          {sender}
          <span class="message-content">{content}</span>
          <span class="message-footer">
            <span class="message-time">{time}</span>
            {receipt}
          </span>
        </div>
      </div>
    "#,
        content = escape_html(&msg.text),
        time = msg.time,
    )
}
