use crate::tui::keybindings::Keymap;
use strum::Display;

#[derive(Display, Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Tick,
    Render,
    Resize(u16, u16),
    Suspend,
    Resume,
    Quit,
    ClearScreen,
    UpdateGlobalKeybindings(Keymap),

    Activate(ActivateAction),

    // Room controls
    ToggleMicrophone,
    ToggleCamera,
    Leave,
    SendChat(String),
}

#[derive(Display, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivateAction {
    Controls,
    Chat,
    Logs,
}
