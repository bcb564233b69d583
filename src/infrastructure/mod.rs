pub mod hourly_timeline;
pub mod system_battery;
pub mod system_datetime;
