pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod notification_center;
#[cfg(feature = "gui")]
pub mod ui;
