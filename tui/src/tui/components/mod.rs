pub mod chat;
#[allow(clippy::module_inception)]
mod component;
pub mod logs;
pub mod nav_tabs;
pub mod room;

pub use component::Component;
