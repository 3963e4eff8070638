use crate::tui::theme::Theme;
use ratatui::{
    layout::Alignment,
    widgets::*,
};

/// Rounded button; `selected` highlights it as the one Enter presses.
pub(crate) fn button<'a>(label: impl ToString, hotkey: char, selected: bool, theme: &Theme) -> Paragraph<'a> {
    let style = if selected {
        theme.text_selected
    } else {
        theme.border_unfocused
    };

    Paragraph::new(label.to_string())
        .alignment(Alignment::Center)
        .style(style)
        .block(
            Block::new()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(style)
                .title_bottom(format!("[{hotkey}]"))
                .padding(Padding::horizontal(1)),
        )
}
