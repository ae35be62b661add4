//! Ratatui widgets for the feedtest TUI.

pub mod command_bar;
pub mod feed_list;
pub mod feed_panel;
pub mod header;
pub mod help;
pub mod notification_item;
pub mod poster;
pub mod text_input;
