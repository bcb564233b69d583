pub mod battery;
pub mod datetime;
pub mod widget_window;
