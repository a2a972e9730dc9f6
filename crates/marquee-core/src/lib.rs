pub mod macros;

pub mod autoplay;
pub mod deeplink;
pub mod events;
pub mod gesture;
pub mod index;
pub mod page;
pub mod selector;
pub mod settings;
pub mod transition;
pub mod widget;
