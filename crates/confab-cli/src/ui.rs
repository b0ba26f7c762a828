//! The chat screen: a projection of conversation state onto the terminal

use std::sync::Arc;
use std::time::Instant;

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};
use tokio::sync::broadcast;

use confab_client::GenerationClient;
use confab_core::{Conversation, ConversationStore, StoreEvent};
use confab_tui::{
    App, AppState, Theme,
    input::Action,
    widgets::{InputBox, MessageList, Spinner, message_list::transcript_height},
};

/// Sticky scroll marker: clamped to the bottom of the transcript on render
const STICK_TO_BOTTOM: usize = usize::MAX;

/// Chat screen state
pub struct ChatState {
    /// Store handle (the screen never mutates conversation state itself)
    store: ConversationStore,
    /// Store event subscription, drained on each tick
    events: broadcast::Receiver<StoreEvent>,
    /// Latest snapshot of the conversation
    conversation: Conversation,
    /// Input box
    input: InputBox,
    /// Transcript scroll position in lines
    scroll: usize,
    /// Theme
    theme: Theme,
    /// Spinner start time for animation
    spinner_start: Instant,
    /// Input area width from the last render, for cursor math
    input_width: u16,
}

impl ChatState {
    pub fn new(store: ConversationStore, theme: Theme) -> Self {
        let events = store.subscribe();
        let conversation = store.snapshot();
        Self {
            store,
            events,
            conversation,
            input: InputBox::new().with_placeholder("Ask about cars..."),
            scroll: STICK_TO_BOTTOM,
            theme,
            spinner_start: Instant::now(),
            input_width: 80,
        }
    }

    /// Re-read the snapshot and sync the input affordance to the busy flag
    fn refresh(&mut self) {
        self.conversation = self.store.snapshot();
        self.input.set_enabled(!self.conversation.busy);
    }

    /// Handle a user input action. Returns false to quit.
    pub fn handle_action(&mut self, action: Action) -> bool {
        match action {
            Action::Interrupt | Action::Eof | Action::Quit => false,
            Action::Submit => {
                if self.store.submit(self.input.content()).is_accepted() {
                    self.input.clear();
                    self.spinner_start = Instant::now();
                    self.scroll = STICK_TO_BOTTOM;
                    self.refresh();
                }
                true
            }
            Action::Up => {
                self.scroll = self.scroll.saturating_sub(1);
                true
            }
            Action::Down => {
                self.scroll = self.scroll.saturating_add(1);
                true
            }
            Action::PageUp => {
                self.scroll = self.scroll.saturating_sub(10);
                true
            }
            Action::PageDown => {
                self.scroll = self.scroll.saturating_add(10);
                true
            }
            Action::Escape => {
                self.input.clear();
                true
            }
            other => {
                self.input.handle_action(&other, self.input_width);
                true
            }
        }
    }

    fn render_transcript(&mut self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(self.theme.border_style())
            .title(" confab ");

        let inner = block.inner(area);
        frame.render_widget(block, area);

        if inner.width == 0 || inner.height == 0 {
            return;
        }

        if self.conversation.messages.is_empty() {
            let welcome = Paragraph::new(vec![
                Line::from(""),
                Line::from(vec![
                    Span::styled(
                        "  confab",
                        Style::default()
                            .fg(Color::Cyan)
                            .add_modifier(Modifier::BOLD),
                    ),
                    Span::styled(" - chat with the model", Style::default().fg(Color::DarkGray)),
                ]),
                Line::from(""),
                Line::from(vec![
                    Span::styled("    Enter     ", Style::default().fg(Color::Cyan)),
                    Span::styled("Send message", Style::default().fg(Color::White)),
                ]),
                Line::from(vec![
                    Span::styled("    PgUp/Dn   ", Style::default().fg(Color::Cyan)),
                    Span::styled("Scroll transcript", Style::default().fg(Color::White)),
                ]),
                Line::from(vec![
                    Span::styled("    Ctrl+C    ", Style::default().fg(Color::Cyan)),
                    Span::styled("Quit", Style::default().fg(Color::White)),
                ]),
                Line::from(""),
                Line::from(Span::styled(
                    "  Type a message to get started...",
                    Style::default().fg(Color::DarkGray),
                )),
            ]);
            frame.render_widget(welcome, inner);
            return;
        }

        let content_height =
            transcript_height(&self.conversation.messages, inner.width as usize);
        let max_scroll = content_height.saturating_sub(inner.height as usize);
        self.scroll = self.scroll.min(max_scroll);

        let list = MessageList::new(&self.conversation.messages, &self.theme).scroll(self.scroll);
        frame.render_widget(list, inner);
    }

    fn render_status(&self, frame: &mut Frame, area: Rect) {
        if self.conversation.busy {
            let spinner = Spinner::new("Waiting for reply...", &self.theme)
                .with_start_time(self.spinner_start);
            frame.render_widget(spinner, area);
        } else {
            let hint = Paragraph::new(Span::styled(
                "Enter to send · Ctrl+C to quit",
                self.theme.dim_style(),
            ));
            frame.render_widget(hint, area);
        }
    }
}

impl AppState for ChatState {
    fn render(&mut self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(1),    // Transcript
                Constraint::Length(1), // Status line
                Constraint::Length(3), // Input box
            ])
            .split(frame.area());

        self.render_transcript(frame, chunks[0]);
        self.render_status(frame, chunks[1]);

        self.input_width = chunks[2].width;
        self.input
            .render(chunks[2], frame.buffer_mut(), &self.theme);
    }

    fn tick(&mut self) {
        // Drain store events; any of them means the snapshot is stale.
        let mut changed = false;
        loop {
            match self.events.try_recv() {
                Ok(event) => {
                    changed = true;
                    if event.message().is_some() {
                        self.scroll = STICK_TO_BOTTOM;
                    }
                }
                Err(broadcast::error::TryRecvError::Lagged(_)) => {
                    changed = true;
                }
                Err(_) => break,
            }
        }
        if changed {
            self.refresh();
        }
    }
}

/// Run the chat screen until the user quits.
///
/// Closes the store on exit so an in-flight request is cancelled and
/// its completion discarded.
pub async fn run_tui(client: Arc<dyn GenerationClient>, theme: Theme) -> anyhow::Result<()> {
    let store = ConversationStore::new(client);
    let mut state = ChatState::new(store.clone(), theme.clone());

    let mut app = App::new()?.with_theme(theme);
    let result = app
        .run_async(&mut state, |state, action| {
            let cont = state.handle_action(action);
            async move { cont }
        })
        .await;

    store.close();
    drop(app); // restore the terminal before printing anything

    result.map_err(Into::into)
}
