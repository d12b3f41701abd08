use std::collections::VecDeque;
use std::sync::Arc;
use chatbox_core::{BackendClient, ChatSession, Message, Transcript};
use ratatui::widgets::{Paragraph, Wrap};
use tokio::sync::{mpsc, oneshot};
use crate::bridge::{ChannelPrompter, ChannelView, Session};
use crate::tui::AppEvent;

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

/// Single-line text field with a character-based cursor
#[derive(Debug, Clone, Default)]
pub struct InputLine {
    pub text: String,
    pub cursor: usize,
}

impl InputLine {
    pub fn insert(&mut self, c: char) {
        let byte_pos = char_to_byte_index(&self.text, self.cursor);
        self.text.insert(byte_pos, c);
        self.cursor += 1;
    }

    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let byte_pos = char_to_byte_index(&self.text, self.cursor);
            self.text.remove(byte_pos);
        }
    }

    pub fn delete(&mut self) {
        if self.cursor < self.text.chars().count() {
            let byte_pos = char_to_byte_index(&self.text, self.cursor);
            self.text.remove(byte_pos);
        }
    }

    pub fn left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.text.chars().count());
    }

    pub fn home(&mut self) {
        self.cursor = 0;
    }

    pub fn end(&mut self) {
        self.cursor = self.text.chars().count();
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.cursor = 0;
    }

    /// Visible slice and cursor column for a field `width` characters wide
    pub fn visible(&self, width: usize) -> (String, usize) {
        // Scroll horizontally to keep cursor visible
        let offset = if width == 0 || self.cursor < width {
            0
        } else {
            self.cursor - width + 1
        };
        let text = self.text.chars().skip(offset).take(width).collect();
        (text, self.cursor - offset)
    }
}

/// A pending question from a running operation
#[derive(Debug)]
pub struct Dialog {
    pub question: String,
    pub input: InputLine,
    reply: oneshot::Sender<Option<String>>,
}

impl Dialog {
    pub fn new(question: String, reply: oneshot::Sender<Option<String>>) -> Self {
        Self {
            question,
            input: InputLine::default(),
            reply,
        }
    }

    pub fn submit(self) {
        let _ = self.reply.send(Some(self.input.text));
    }

    pub fn cancel(self) {
        let _ = self.reply.send(None);
    }
}

pub struct App {
    pub should_quit: bool,
    pub backend_url: String,

    // Conversation
    pub transcript: Transcript,
    pub input: InputLine,

    // Questions waiting for an answer, front one is shown
    pub dialogs: VecDeque<Dialog>,

    // Operations in flight
    pub pending: usize,
    pub animation_frame: u8, // 0-2 for ellipsis animation

    // Transcript scrolling
    pub scroll: u16,
    pub follow: bool, // stick to newest message
    pub chat_height: u16,
    pub chat_width: u16,

    pub session: Session,
    pub events: mpsc::UnboundedSender<AppEvent>,
}

impl App {
    pub fn new(backend: BackendClient, events: mpsc::UnboundedSender<AppEvent>) -> Self {
        let backend_url = backend.base_url().to_string();
        let session = ChatSession::new(
            backend,
            Arc::new(ChannelView::new(events.clone())),
            Arc::new(ChannelPrompter::new(events.clone())),
        );

        Self {
            should_quit: false,
            backend_url,
            transcript: Transcript::new(),
            input: InputLine::default(),
            dialogs: VecDeque::new(),
            pending: 0,
            animation_frame: 0,
            scroll: 0,
            follow: true,
            chat_height: 0,
            chat_width: 0,
            session,
            events,
        }
    }

    pub fn append(&mut self, message: Message) {
        self.transcript.push(message);
        self.scroll_to_bottom();
    }

    pub fn active_dialog(&self) -> Option<&Dialog> {
        self.dialogs.front()
    }

    pub fn active_dialog_mut(&mut self) -> Option<&mut Dialog> {
        self.dialogs.front_mut()
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if self.pending > 0 {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    /// Number of rows the transcript occupies once ratatui wraps it
    pub fn transcript_lines(&self) -> u16 {
        // Use actual chat width for wrap calculation, default to 50 if not set
        let wrap_width = if self.chat_width > 0 { self.chat_width } else { 50 };

        Paragraph::new(crate::ui::transcript_text(self))
            .wrap(Wrap { trim: false })
            .line_count(wrap_width)
            .min(u16::MAX as usize) as u16
    }

    fn max_scroll(&self) -> u16 {
        let visible_height = if self.chat_height > 0 {
            self.chat_height
        } else {
            20
        };
        self.transcript_lines().saturating_sub(visible_height)
    }

    pub fn scroll_to_bottom(&mut self) {
        self.follow = true;
        self.scroll = self.max_scroll();
    }

    pub fn scroll_up(&mut self, lines: u16) {
        self.follow = false;
        self.scroll = self.scroll.saturating_sub(lines);
    }

    pub fn scroll_down(&mut self, lines: u16) {
        let max = self.max_scroll();
        self.scroll = (self.scroll + lines).min(max);
        self.follow = self.scroll == max;
    }

    /// Re-pin to the bottom after a resize when following
    pub fn refresh_scroll(&mut self) {
        if self.follow {
            self.scroll = self.max_scroll();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_app() -> (App, mpsc::UnboundedReceiver<AppEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (App::new(BackendClient::new("http://127.0.0.1:5000"), tx), rx)
    }

    #[test]
    fn test_input_line_editing_is_utf8_safe() {
        let mut input = InputLine::default();
        for c in "héllo".chars() {
            input.insert(c);
        }
        input.left();
        input.left();
        input.backspace();
        assert_eq!(input.text, "hélo");
        assert_eq!(input.cursor, 2);

        input.home();
        input.delete();
        assert_eq!(input.text, "élo");

        input.end();
        input.right();
        assert_eq!(input.cursor, 3);

        input.clear();
        assert!(input.text.is_empty());
        assert_eq!(input.cursor, 0);
    }

    #[test]
    fn test_visible_scrolls_with_cursor() {
        let input = InputLine {
            text: "abcdefghij".to_string(),
            cursor: 10,
        };
        let (text, col) = input.visible(4);
        assert_eq!(text, "hij");
        assert_eq!(col, 3);

        let input = InputLine {
            text: "abcdefghij".to_string(),
            cursor: 2,
        };
        assert_eq!(input.visible(4), ("abcd".to_string(), 2));
    }

    #[test]
    fn test_dialog_submit_and_cancel() {
        let (tx, mut rx) = oneshot::channel();
        let mut dialog = Dialog::new("Where?".to_string(), tx);
        dialog.input.insert('X');
        dialog.submit();
        assert_eq!(rx.try_recv().unwrap(), Some("X".to_string()));

        let (tx, mut rx) = oneshot::channel();
        Dialog::new("Where?".to_string(), tx).cancel();
        assert_eq!(rx.try_recv().unwrap(), None);
    }

    #[test]
    fn test_append_follows_newest() {
        let (mut app, _rx) = test_app();
        app.chat_height = 4;
        app.chat_width = 20;

        for i in 0..5 {
            app.append(Message::bot(&format!("reply {}", i)));
        }

        // 5 messages, one line each plus a blank separator
        assert_eq!(app.transcript_lines(), 10);
        assert_eq!(app.scroll, 6);
        assert!(app.follow);

        app.scroll_up(3);
        assert_eq!(app.scroll, 3);
        assert!(!app.follow);

        app.scroll_down(10);
        assert_eq!(app.scroll, 6);
        assert!(app.follow);
    }

    #[test]
    fn test_long_lines_wrap() {
        let (mut app, _rx) = test_app();
        app.chat_width = 10;
        app.transcript.push(Message::new("x".repeat(25), chatbox_core::Sender::Bot));

        // 3 wrapped lines plus separator
        assert_eq!(app.transcript_lines(), 4);
    }

    #[test]
    fn test_wrapping_follows_words_and_display_width() {
        let (mut app, _rx) = test_app();
        app.chat_width = 10;

        // "Bot: aaaaaa bbbbbbb" is 19 characters but wraps word by word into 3 rows
        app.transcript.push(Message::bot("aaaaaa bbbbbbb"));
        assert_eq!(app.transcript_lines(), 4);

        // Six wide characters take 12 columns: 2 rows
        let (mut app, _rx) = test_app();
        app.chat_width = 10;
        app.transcript.push(Message::new("天気天気天気", chatbox_core::Sender::Bot));
        assert_eq!(app.transcript_lines(), 3);
    }
}
