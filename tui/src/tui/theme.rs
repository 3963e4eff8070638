use ratatui::style::{
    Color,
    Modifier,
    Style,
};

#[derive(Clone, Copy, Debug)]
pub(super) struct Theme {
    pub(super) default: Style,
    pub(super) text_default: Style,
    pub(super) text_selected: Style,
    pub(super) text_muted: Style,
    pub(super) sender_me: Style,
    pub(super) sender_other: Style,
    pub(super) status_ok: Style,
    pub(super) status_error: Style,
    pub(super) border_focused: Style,
    pub(super) border_unfocused: Style,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            default: Style::default().bg(Color::Black).fg(Color::Gray),
            text_default: Style::default(),
            text_selected: Style::default().fg(Color::Yellow),
            text_muted: Style::default().fg(Color::DarkGray),
            sender_me: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            sender_other: Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
            status_ok: Style::default().fg(Color::White),
            status_error: Style::default().fg(Color::Red),
            border_focused: Style::default().fg(Color::White),
            border_unfocused: Style::default().fg(Color::DarkGray),
        }
    }
}

impl Theme {
    pub(super) fn border(&self, focused: bool) -> Style {
        if focused {
            self.border_focused
        } else {
            self.border_unfocused
        }
    }

    pub(super) fn sender(&self, is_me: bool) -> Style {
        if is_me {
            self.sender_me
        } else {
            self.sender_other
        }
    }
}
