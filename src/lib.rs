pub mod blocks;
pub mod cache;
pub mod cli;
pub mod config;
pub mod diff;
pub mod events;
pub mod export;
pub mod tui;
pub mod watcher;

pub use blocks::*;
pub use cache::*;
pub use diff::*;
pub use events::*;
pub use export::*;
pub use tui::*;
pub use watcher::*;
