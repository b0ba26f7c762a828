//! Transcript widget for displaying the conversation

use crate::theme::Theme;
use confab_core::{Author, Message};
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

/// Fraction of the available width a message may occupy, mirroring the
/// classic chat-bubble layout (user on the right, replies on the left).
const BUBBLE_WIDTH_PERCENT: usize = 80;

/// Whether a model message is a synthesized error line
fn is_error_reply(message: &Message) -> bool {
    message.author == Author::Model && message.text.starts_with("Error:")
}

/// Widget for displaying the transcript
pub struct MessageList<'a> {
    messages: &'a [Message],
    theme: &'a Theme,
    scroll: usize,
}

impl<'a> MessageList<'a> {
    /// Create a new message list
    pub fn new(messages: &'a [Message], theme: &'a Theme) -> Self {
        Self {
            messages,
            theme,
            scroll: 0,
        }
    }

    /// Set scroll offset (in lines)
    pub fn scroll(mut self, scroll: usize) -> Self {
        self.scroll = scroll;
        self
    }

    fn render_message(&self, message: &Message, width: usize) -> Vec<Line<'static>> {
        let mut lines = Vec::new();

        let (label, label_style, alignment) = match message.author {
            Author::User => ("You ▶", self.theme.accent_bold(), Alignment::Right),
            Author::Model => ("◀ Reply", self.theme.reply_bold(), Alignment::Left),
        };

        lines.push(Line::from(Span::styled(label.to_string(), label_style)).alignment(alignment));

        let content_style = if is_error_reply(message) {
            self.theme.error_style()
        } else {
            self.theme.base_style()
        };

        for wrapped in textwrap::wrap(&message.text, bubble_width(width)) {
            lines.push(
                Line::from(Span::styled(wrapped.into_owned(), content_style))
                    .alignment(alignment),
            );
        }

        // Blank separator between messages
        lines.push(Line::from(""));

        lines
    }
}

impl Widget for MessageList<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }

        let width = area.width as usize;
        let mut all_lines: Vec<Line> = Vec::new();
        for message in self.messages {
            all_lines.extend(self.render_message(message, width));
        }

        let visible: Vec<Line> = all_lines
            .into_iter()
            .skip(self.scroll)
            .take(area.height as usize)
            .collect();

        Paragraph::new(visible).render(area, buf);
    }
}

/// Width available for message text at the given area width
fn bubble_width(width: usize) -> usize {
    (width * BUBBLE_WIDTH_PERCENT / 100).max(1)
}

/// Total rendered height of the transcript at the given width.
///
/// Must match `render_message` line for line; the chat screen uses it
/// to keep the view pinned to the newest message.
pub fn transcript_height(messages: &[Message], width: usize) -> usize {
    let mut total = 0;
    for message in messages {
        // Label line plus separator
        total += 2;
        total += textwrap::wrap(&message.text, bubble_width(width)).len();
    }
    total
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_reply_detection() {
        assert!(is_error_reply(&Message::model(
            "Error: An issue occurred. request timed out"
        )));
        assert!(!is_error_reply(&Message::model("All fine here")));
        // A user message starting with "Error:" is not a reply
        assert!(!is_error_reply(&Message::user("Error: my own text")));
    }

    #[test]
    fn test_height_of_short_messages() {
        let messages = vec![Message::user("hi"), Message::model("hello")];
        // Each message: label + one content line + separator
        assert_eq!(transcript_height(&messages, 40), 6);
    }

    #[test]
    fn test_height_accounts_for_wrapping() {
        let messages = vec![Message::user(
            "a fairly long line of text that will not fit in a narrow bubble",
        )];
        let narrow = transcript_height(&messages, 20);
        let wide = transcript_height(&messages, 200);
        assert!(narrow > wide);
        assert_eq!(wide, 3);
    }

    #[test]
    fn test_height_of_empty_transcript() {
        assert_eq!(transcript_height(&[], 80), 0);
    }
}
