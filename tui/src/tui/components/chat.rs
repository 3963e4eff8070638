use crate::tui::{
    keybindings::{
        KeyBindings,
        Keymap,
    },
    layout::{
        chat_sections,
        room_and_chat_areas,
    },
    Action,
    ActivateAction,
    Component,
    Event,
    FocusedTopLevelComponent,
    Theme,
};
use chrono::{
    DateTime,
    Local,
};
use color_eyre::Result;
use crossterm::event::{
    KeyCode,
    KeyEvent,
    KeyModifiers,
};
use derive_more::Debug;
use eyre::OptionExt as _;
use ratatui::{
    layout::Rect,
    style::Style,
    text::{
        Line,
        Span,
    },
    widgets::{
        Block,
        Borders,
        List,
        ListItem,
        ListState,
    },
    Frame,
};
use room_client_config::Config;
use room_client_session::{
    DisplayedMessage,
    RoomState,
};
use tokio::sync::watch;
use tui_textarea::TextArea;

/// Message list and the input line. Submitting only asks for the message to
/// be sent; the input clears once the session reports the send succeeded.
#[derive(Debug)]
pub struct Chat {
    focused: bool,
    visible: bool,
    state: watch::Receiver<RoomState>,
    #[debug(skip)]
    input: TextArea<'static>,
    sent_messages: u64,
    keymap: Keymap,
}

impl Chat {
    pub fn new(state: watch::Receiver<RoomState>) -> Self {
        let sent_messages = state.borrow().sent_messages;
        Self {
            focused: false,
            visible: true,
            state,
            input: new_input(),
            sent_messages,
            keymap: Keymap::default(),
        }
    }

    fn input_text(&self) -> String {
        self.input.lines().join("\n")
    }

    /// Clear the input after each successful send.
    fn sync_sent(&mut self) {
        let sent_messages = self.state.borrow().sent_messages;
        if sent_messages != self.sent_messages {
            self.sent_messages = sent_messages;
            self.input = new_input();
        }
    }
}

fn new_input() -> TextArea<'static> {
    let mut input = TextArea::default();
    input.set_cursor_line_style(Style::default());
    input.set_placeholder_text("Digite uma mensagem…");
    input
}

impl Component for Chat {
    fn is_visible(&self) -> bool {
        self.visible
    }

    fn is_focused(&self) -> bool {
        self.focused
    }

    fn register_config_handler(&mut self, _config: Config, keybindings: KeyBindings) -> Result<()> {
        self.keymap = keybindings
            .get(&FocusedTopLevelComponent::Chat)
            .cloned()
            .ok_or_eyre("No keymap found for Chat")?;
        Ok(())
    }

    fn update(&mut self, action: Action) -> Result<Option<Action>> {
        match action {
            Action::Activate(ActivateAction::Chat) => {
                self.focused = true;
                self.visible = true;
                return Ok(Some(Action::UpdateGlobalKeybindings(self.keymap.clone())));
            }
            Action::Activate(ActivateAction::Controls) => {
                self.focused = false;
                self.visible = true;
            }
            Action::Activate(ActivateAction::Logs) => {
                self.focused = false;
                self.visible = false;
            }
            Action::Tick | Action::Render => self.sync_sent(),
            _ => {}
        }
        Ok(None)
    }

    fn handle_events(&mut self, event: Option<Event>) -> Result<Option<Action>> {
        match event {
            Some(Event::Key(key)) => self.handle_key_event(key),
            Some(Event::Paste(text)) => {
                // The input is a single line; Enter sends.
                self.input.insert_str(text.replace(['\r', '\n'], " "));
                Ok(None)
            }
            _ => Ok(None),
        }
    }

    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        match key.code {
            // Bound globally while typing.
            KeyCode::Tab | KeyCode::Esc => return Ok(None),
            KeyCode::Char('c' | 'z') if key.modifiers.contains(KeyModifiers::CONTROL) => return Ok(None),
            KeyCode::Enter => {
                let text = self.input_text();
                if text.trim().is_empty() {
                    return Ok(None);
                }
                return Ok(Some(Action::SendChat(text)));
            }
            _ => {}
        }
        self.input.input(key);
        Ok(None)
    }

    fn draw(&mut self, frame: &mut Frame<'_>, area: Rect) -> Result<()> {
        let theme = Theme::default();
        let [_room, area] = room_and_chat_areas(area)?;
        let [messages_area, input_area] = chat_sections(area)?;

        let items = self
            .state
            .borrow()
            .messages
            .iter()
            .map(|message| message_item(message, &theme))
            .collect::<Vec<_>>();
        let count = items.len();
        let list = List::new(items).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.border(self.focused))
                .title("Chat"),
        );
        // Keep the newest message in view.
        let mut list_state = ListState::default().with_offset(count.saturating_sub(messages_area.height.saturating_sub(2).into()));
        frame.render_stateful_widget(list, messages_area, &mut list_state);

        self.input.set_block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.border(self.focused))
                .title_bottom(if self.focused { "[Enter] enviar [Esc] voltar" } else { "[Tab] escrever" }),
        );
        frame.render_widget(&self.input, input_area);

        Ok(())
    }
}

fn message_item(displayed: &DisplayedMessage, theme: &Theme) -> ListItem<'static> {
    let time = DateTime::from_timestamp_millis(displayed.message.ts)
        .map(|ts| ts.with_timezone(&Local).format("%H:%M").to_string())
        .unwrap_or_default();

    ListItem::new(Line::from(vec![
        Span::styled(format!("{time} "), theme.text_muted),
        Span::styled(format!("{}: ", displayed.sender_label()), theme.sender(displayed.is_me)),
        Span::raw(displayed.message.text.clone()),
    ]))
}
