pub mod models;
pub mod battery_service;
pub mod battery_observer;
pub mod datetime_service;
pub mod timeline_service;
