use crate::tui::{
    layout,
    Action,
    ActivateAction,
    Component,
};
use eyre::Result;
use room_client_session::RoomState;
use ratatui::{
    style::{
        Color,
        Modifier,
        Style,
    },
    widgets::{
        Block,
        Borders,
        Tabs,
    },
};
use tokio::sync::watch;

#[derive(Debug)]
pub struct NavTabs {
    screen: Screen,
    room: watch::Receiver<RoomState>,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
enum Screen {
    #[default]
    Room,
    Logs,
}

impl NavTabs {
    pub fn new(room: watch::Receiver<RoomState>) -> Self {
        Self {
            screen: Screen::Room,
            room,
        }
    }

    fn titles(&self) -> Vec<String> {
        let room = match &self.room.borrow().room_name {
            Some(name) => format!("Sala: {name} [1]"),
            None => "Sala [1]".to_string(),
        };
        vec![room, "Logs [2]".to_string()]
    }
}

impl Component for NavTabs {
    fn update(&mut self, action: Action) -> Result<Option<Action>> {
        match action {
            Action::Activate(ActivateAction::Controls | ActivateAction::Chat) => {
                self.screen = Screen::Room;
            }
            Action::Activate(ActivateAction::Logs) => {
                self.screen = Screen::Logs;
            }
            _ => {}
        }
        Ok(None)
    }

    fn draw(&mut self, frame: &mut ratatui::Frame, area: ratatui::prelude::Rect) -> Result<()> {
        let [header_area, _main_area] = layout::header_and_main_area(area)?;

        let selected_tab = match self.screen {
            Screen::Room => 0,
            Screen::Logs => 1,
        };

        let tabs = Tabs::new(self.titles())
            .select(selected_tab)
            .style(Style::default().fg(Color::Gray))
            .highlight_style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
            .block(Block::new().borders(Borders::BOTTOM))
            .divider(" | ");

        frame.render_widget(tabs, header_area);

        Ok(())
    }
}
