//! Global key bindings, one keymap per focused top level component.
//!
//! Keys are written the way they appear in the help line, e.g. `<q>`,
//! `<Ctrl-c>`, `<Tab>` or `<g><g>` for a sequence.

use super::{
    Action,
    ActivateAction,
    FocusedTopLevelComponent,
};
use crossterm::event::{
    KeyCode,
    KeyEvent,
    KeyModifiers,
};
use derive_more::{
    Deref,
    DerefMut,
};
use eyre::{
    bail,
    OptionExt as _,
    Result,
};
use std::collections::HashMap;

pub(crate) type Keymap = HashMap<Vec<KeyEvent>, Action>;

#[derive(Debug, Clone, Default, Deref, DerefMut)]
pub(crate) struct KeyBindings(HashMap<FocusedTopLevelComponent, Keymap>);

impl KeyBindings {
    pub(crate) fn new() -> Result<Self> {
        let quit = [("<Ctrl-c>", Action::Quit), ("<Ctrl-z>", Action::Suspend)];
        let tabs = [
            ("<1>", Action::Activate(ActivateAction::Controls)),
            ("<2>", Action::Activate(ActivateAction::Logs)),
            ("<q>", Action::Quit),
        ];

        let controls = keymap(quit.iter().chain(&tabs).chain(&[
            ("<Tab>", Action::Activate(ActivateAction::Chat)),
            ("<m>", Action::ToggleMicrophone),
            ("<c>", Action::ToggleCamera),
            ("<l>", Action::Leave),
        ]))?;

        // Everything else goes to the chat input.
        let chat = keymap(quit.iter().chain(&[
            ("<Tab>", Action::Activate(ActivateAction::Controls)),
            ("<Esc>", Action::Activate(ActivateAction::Controls)),
        ]))?;

        let logs = keymap(quit.iter().chain(&tabs).chain(&[(
            "<Tab>",
            Action::Activate(ActivateAction::Controls),
        )]))?;

        Ok(Self(HashMap::from([
            (FocusedTopLevelComponent::Controls, controls),
            (FocusedTopLevelComponent::Chat, chat),
            (FocusedTopLevelComponent::Logs, logs),
        ])))
    }
}

fn keymap<'a>(bindings: impl Iterator<Item = &'a (&'static str, Action)>) -> Result<Keymap> {
    bindings
        .map(|(keys, action)| Ok((parse_key_sequence(keys)?, action.clone())))
        .collect()
}

pub(crate) fn parse_key_sequence(raw: &str) -> Result<Vec<KeyEvent>> {
    let Some(inner) = raw.strip_prefix('<').and_then(|raw| raw.strip_suffix('>')) else {
        bail!("Key sequence must be wrapped in <...>: {raw}");
    };
    inner.split("><").map(parse_key_event).collect()
}

pub(crate) fn parse_key_event(raw: &str) -> Result<KeyEvent> {
    let mut modifiers = KeyModifiers::empty();
    let mut rest = raw;
    loop {
        let lower = rest.to_ascii_lowercase();
        let (modifier, len) = if lower.starts_with("ctrl-") {
            (KeyModifiers::CONTROL, 5)
        } else if lower.starts_with("alt-") {
            (KeyModifiers::ALT, 4)
        } else if lower.starts_with("shift-") {
            (KeyModifiers::SHIFT, 6)
        } else {
            break;
        };
        modifiers.insert(modifier);
        rest = &rest[len..];
    }

    let code = match rest.to_ascii_lowercase().as_str() {
        "esc" => KeyCode::Esc,
        "enter" => KeyCode::Enter,
        "left" => KeyCode::Left,
        "right" => KeyCode::Right,
        "up" => KeyCode::Up,
        "down" => KeyCode::Down,
        "home" => KeyCode::Home,
        "end" => KeyCode::End,
        "pageup" => KeyCode::PageUp,
        "pagedown" => KeyCode::PageDown,
        "backtab" => {
            modifiers.insert(KeyModifiers::SHIFT);
            KeyCode::BackTab
        }
        "backspace" => KeyCode::Backspace,
        "delete" => KeyCode::Delete,
        "tab" => KeyCode::Tab,
        "space" => KeyCode::Char(' '),
        _ => {
            let mut chars = rest.chars();
            let c = chars.next().ok_or_eyre("Empty key")?;
            if chars.next().is_some() {
                bail!("Unknown key: {raw}");
            }
            let c = if modifiers.contains(KeyModifiers::SHIFT) {
                c.to_ascii_uppercase()
            } else {
                c
            };
            KeyCode::Char(c)
        }
    };

    Ok(KeyEvent::new(code, modifiers))
}
