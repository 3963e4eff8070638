use crate::tui::{
    keybindings::{
        parse_key_sequence,
        KeyBindings,
        Keymap,
    },
    layout::header_and_main_area,
    Action,
    ActivateAction,
    Component,
    FocusedTopLevelComponent,
};
use color_eyre::Result;
use crossterm::event::KeyEvent;
use derive_more::Debug;
use eyre::OptionExt as _;
use ratatui::{
    layout::{
        Constraint,
        Layout,
        Rect,
    },
    style::{
        Color,
        Style,
    },
    text::Line,
    widgets::Widget as _,
    Frame,
};
use room_client_config::Config;
use tui_logger::{
    LevelFilter,
    TuiLoggerLevelOutput,
    TuiLoggerSmartWidget,
    TuiWidgetEvent,
    TuiWidgetState,
};

/// Targets shown with their own level instead of the default one. Targets
/// are matched exactly, so the session modules are listed one by one.
const TARGET_LEVELS: &[(&str, LevelFilter)] = &[
    ("room_client_session::room", LevelFilter::Debug),
    ("room_client_session::room::inner", LevelFilter::Debug),
    ("room_client_session::backend::livekit", LevelFilter::Debug),
    ("livekit", LevelFilter::Warn),
    ("libwebrtc", LevelFilter::Warn),
];

/// Keys of the log view, in the same notation as the global key bindings.
const LOG_KEYS: &[(&str, &str, TuiWidgetEvent)] = &[
    ("<PageUp>", "scroll up", TuiWidgetEvent::PrevPageKey),
    ("<PageDown>", "scroll down", TuiWidgetEvent::NextPageKey),
    ("<Esc>", "follow", TuiWidgetEvent::EscapeKey),
    ("<Up>", "prev target", TuiWidgetEvent::UpKey),
    ("<Down>", "next target", TuiWidgetEvent::DownKey),
    ("<+>", "more", TuiWidgetEvent::PlusKey),
    ("<->", "less", TuiWidgetEvent::MinusKey),
    ("<h>", "targets", TuiWidgetEvent::HideKey),
];

/// Log viewer tab backed by `tui_logger`.
#[derive(Debug)]
pub struct Logs {
    active: bool,
    #[debug(skip)]
    state: TuiWidgetState,
    keymap: Keymap,
    #[debug(skip)]
    log_keys: Vec<(Vec<KeyEvent>, TuiWidgetEvent)>,
}

impl Logs {
    pub fn new() -> Result<Self> {
        let state = TARGET_LEVELS.iter().fold(
            TuiWidgetState::new().set_default_display_level(LevelFilter::Info),
            |state, (target, level)| state.set_level_for_target(target, *level),
        );
        let log_keys = LOG_KEYS
            .iter()
            .map(|(keys, _, event)| Ok((parse_key_sequence(keys)?, *event)))
            .collect::<Result<_>>()?;

        Ok(Self {
            active: false,
            state,
            keymap: Keymap::default(),
            log_keys,
        })
    }

    fn widget_event(&self, key: KeyEvent) -> Option<TuiWidgetEvent> {
        self.log_keys
            .iter()
            .find(|(keys, _)| matches!(keys.as_slice(), [bound] if bound.code == key.code))
            .map(|(_, event)| *event)
    }
}

fn help_line() -> String {
    LOG_KEYS
        .iter()
        .map(|(keys, help, _)| format!("{keys} {help}"))
        .collect::<Vec<_>>()
        .join("  ")
}

impl Component for Logs {
    fn is_visible(&self) -> bool {
        self.active
    }

    fn is_focused(&self) -> bool {
        self.active
    }

    fn register_config_handler(&mut self, _config: Config, keybindings: KeyBindings) -> Result<()> {
        self.keymap = keybindings
            .get(&FocusedTopLevelComponent::Logs)
            .cloned()
            .ok_or_eyre("No keymap found for Logs")?;
        Ok(())
    }

    fn update(&mut self, action: Action) -> Result<Option<Action>> {
        match action {
            Action::Activate(ActivateAction::Logs) => {
                self.active = true;
                return Ok(Some(Action::UpdateGlobalKeybindings(self.keymap.clone())));
            }
            Action::Activate(ActivateAction::Controls | ActivateAction::Chat) => {
                self.active = false;
            }
            _ => {}
        }
        Ok(None)
    }

    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if let Some(event) = self.widget_event(key) {
            self.state.transition(event);
        }
        Ok(None)
    }

    fn draw(&mut self, frame: &mut Frame<'_>, area: Rect) -> Result<()> {
        let [_header_area, area] = header_and_main_area(area)?;
        let [log_area, help_area] = Layout::vertical([Constraint::Min(0), Constraint::Length(1)]).areas(area);

        TuiLoggerSmartWidget::default()
            .style_error(Style::default().fg(Color::Red))
            .style_warn(Style::default().fg(Color::Yellow))
            .style_info(Style::default().fg(Color::Cyan))
            .style_debug(Style::default().fg(Color::Green))
            .output_separator(' ')
            .output_timestamp(Some("%H:%M:%S".to_string()))
            .output_level(Some(TuiLoggerLevelOutput::Abbreviated))
            .output_target(true)
            .output_file(false)
            .output_line(false)
            .title_log("Registro da sala")
            .title_target("Origens")
            .state(&self.state)
            .render(log_area, frame.buffer_mut());

        frame.render_widget(Line::from(help_line()).style(Style::default().fg(Color::DarkGray)), help_area);

        Ok(())
    }
}
