pub mod widget_config;

pub use widget_config::{ConfigError, TaskWidgetConfig};
