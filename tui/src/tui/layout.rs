use eyre::{
    bail,
    Result,
};
use ratatui::{
    layout::{
        Constraint,
        Direction,
        Layout,
    },
    prelude::Rect,
};

/// Split the screen: nav header and main content
pub(crate) fn header_and_main_area(area: Rect) -> Result<[Rect; 2]> {
    let constraints = vec![
        Constraint::Max(2), // Header
        Constraint::Min(0), // Main area
    ];

    let [header_area, area] = *Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area)
    else {
        bail!("Failed to split the area");
    };

    Ok([header_area, area])
}

/// Main area of the room tab: the room on the left, chat on the right.
pub(crate) fn room_and_chat_areas(area: Rect) -> Result<[Rect; 2]> {
    let [_header, area] = header_and_main_area(area)?;
    let [room, chat] = *Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area)
    else {
        bail!("Failed to split the area");
    };
    Ok([room, chat])
}

/// Room panel: status line, local and remote media side by side, buttons.
pub(crate) fn room_sections(area: Rect) -> Result<[Rect; 4]> {
    let [status, media, controls] = *Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Status
            Constraint::Min(4),    // Media
            Constraint::Length(3), // Buttons
        ])
        .split(area)
    else {
        bail!("Failed to split the area");
    };
    let [local, remote] = *Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(media)
    else {
        bail!("Failed to split the area");
    };
    Ok([status, local, remote, controls])
}

/// Chat panel: message list above a single line input.
pub(crate) fn chat_sections(area: Rect) -> Result<[Rect; 2]> {
    let [messages, input] = *Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(3)])
        .split(area)
    else {
        bail!("Failed to split the area");
    };
    Ok([messages, input])
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn room_tab_layout_keeps_fixed_rows() {
        let screen = Rect::new(0, 0, 100, 30);
        let [room, chat] = room_and_chat_areas(screen).unwrap();
        assert_eq!(room.y, 2);
        assert_eq!(room.width + chat.width, 100);

        let [status, local, remote, controls] = room_sections(room).unwrap();
        assert_eq!(status.height, 3);
        assert_eq!(controls.height, 3);
        assert_eq!(local.y, remote.y);
        assert_eq!(controls.bottom(), room.bottom());

        let [messages, input] = chat_sections(chat).unwrap();
        assert_eq!(input.height, 3);
        assert_eq!(messages.height + input.height, chat.height);
    }
}
