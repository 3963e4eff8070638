use crate::tui::{
    keybindings::{
        KeyBindings,
        Keymap,
    },
    layout::{
        room_and_chat_areas,
        room_sections,
    },
    widgets,
    Action,
    ActivateAction,
    Component,
    FocusedTopLevelComponent,
    Theme,
};
use color_eyre::Result;
use crossterm::event::{
    KeyCode,
    KeyEvent,
};
use eyre::OptionExt as _;
use ratatui::{
    layout::{
        Constraint,
        Direction,
        Layout,
        Rect,
    },
    text::{
        Line,
        Span,
    },
    widgets::{
        Block,
        Borders,
        Paragraph,
        Wrap,
    },
    Frame,
};
use room_client_config::Config;
use room_client_session::{
    backend::TrackInfo,
    MediaElement,
    RoomState,
};
use strum::{
    Display,
    EnumIter,
    IntoEnumIterator as _,
};
use tokio::sync::watch;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Display, EnumIter)]
enum Button {
    #[default]
    Mute,
    Camera,
    Leave,
}

impl Button {
    fn action(self) -> Action {
        match self {
            Button::Mute => Action::ToggleMicrophone,
            Button::Camera => Action::ToggleCamera,
            Button::Leave => Action::Leave,
        }
    }

    fn hotkey(self) -> char {
        match self {
            Button::Mute => 'm',
            Button::Camera => 'c',
            Button::Leave => 'l',
        }
    }

    fn label(self, state: &RoomState) -> String {
        match self {
            Button::Mute => state.mute_label.clone(),
            Button::Camera => state.camera_label.clone(),
            Button::Leave => "Sair".to_string(),
        }
    }

    fn next(self) -> Self {
        Self::iter().cycle().skip_while(|button| *button != self).nth(1).unwrap_or(self)
    }

    fn prev(self) -> Self {
        Self::iter().rev().cycle().skip_while(|button| *button != self).nth(1).unwrap_or(self)
    }
}

/// Status line, local and remote media, and the call controls.
#[derive(Debug)]
pub struct Room {
    focused: bool,
    visible: bool,
    state: watch::Receiver<RoomState>,
    selected: Button,
    keymap: Keymap,
}

impl Room {
    pub fn new(state: watch::Receiver<RoomState>) -> Self {
        Self {
            focused: true,
            visible: true,
            state,
            selected: Button::default(),
            keymap: Keymap::default(),
        }
    }
}

impl Component for Room {
    fn is_visible(&self) -> bool {
        self.visible
    }

    fn is_focused(&self) -> bool {
        self.focused
    }

    fn register_config_handler(&mut self, _config: Config, keybindings: KeyBindings) -> Result<()> {
        self.keymap = keybindings
            .get(&FocusedTopLevelComponent::Controls)
            .cloned()
            .ok_or_eyre("No keymap found for the room controls")?;
        Ok(())
    }

    fn update(&mut self, action: Action) -> Result<Option<Action>> {
        match action {
            Action::Activate(ActivateAction::Controls) => {
                self.focused = true;
                self.visible = true;
                return Ok(Some(Action::UpdateGlobalKeybindings(self.keymap.clone())));
            }
            Action::Activate(ActivateAction::Chat) => {
                self.focused = false;
                self.visible = true;
            }
            Action::Activate(ActivateAction::Logs) => {
                self.focused = false;
                self.visible = false;
            }
            _ => {}
        }
        Ok(None)
    }

    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        let action = match key.code {
            KeyCode::Left => {
                self.selected = self.selected.prev();
                None
            }
            KeyCode::Right => {
                self.selected = self.selected.next();
                None
            }
            KeyCode::Enter => Some(self.selected.action()),
            _ => None,
        };
        Ok(action)
    }

    fn draw(&mut self, frame: &mut Frame<'_>, area: Rect) -> Result<()> {
        let theme = Theme::default();
        let [area, _chat] = room_and_chat_areas(area)?;
        let [status_area, local_area, remote_area, controls_area] = room_sections(area)?;
        let state = self.state.borrow();

        let status_style = if state.status.starts_with("Erro:") {
            theme.status_error
        } else {
            theme.status_ok
        };
        let status = Paragraph::new(Span::styled(state.status.clone(), status_style))
            .wrap(Wrap { trim: true })
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(theme.border(self.focused))
                    .title("Status"),
            );
        frame.render_widget(status, status_area);

        let local = media_panel("Você", &state.local_media, !state.cam_on, &theme, self.focused);
        frame.render_widget(local, local_area);
        let remote = media_panel("Remoto", &state.remote_media, false, &theme, self.focused);
        frame.render_widget(remote, remote_area);

        let buttons = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(Button::iter().map(|_| Constraint::Ratio(1, Button::iter().len() as u32)))
            .split(controls_area);
        for (button, button_area) in Button::iter().zip(buttons.iter()) {
            let widget = widgets::button(
                button.label(&state),
                button.hotkey(),
                self.focused && button == self.selected,
                &theme,
            );
            frame.render_widget(widget, *button_area);
        }

        Ok(())
    }
}

fn media_panel<'a>(title: &'a str, element: &MediaElement, camera_off: bool, theme: &Theme, focused: bool) -> Paragraph<'a> {
    let slot = |label: &'static str, track: &Option<TrackInfo>| match track {
        Some(track) => Line::from(vec![
            Span::raw(format!("{label:7}")),
            Span::styled(track_text(track), theme.text_default),
        ]),
        None => Line::from(vec![
            Span::raw(format!("{label:7}")),
            Span::styled("-", theme.text_muted),
        ]),
    };

    let mut lines = vec![slot("vídeo:", &element.video), slot("áudio:", &element.audio)];
    if camera_off {
        lines.push(Line::styled("câmera desligada", theme.text_muted));
    }

    Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(theme.border(focused))
            .title(title),
    )
}

fn track_text(track: &TrackInfo) -> String {
    let mut text = track.sid.clone();
    if !track.label.is_empty() {
        text = format!("{} ({text})", track.label);
    }
    if !track.participant.is_empty() {
        text = format!("{text} de {}", track.participant);
    }
    text
}
