//! Texts shown in the status area.

use std::fmt::Display;

pub const MISSING_TOKEN: &str = "Token ausente na URL (?token=...)";
pub const CONNECTING: &str = "Conectando à sala…";
pub const DISCONNECTED: &str = "Desconectado.";

pub fn connected(room_name: &str) -> String {
    format!("Conectado: {room_name}")
}

pub fn failed(err: impl Display) -> String {
    format!("Erro: {err}")
}
