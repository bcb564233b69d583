use chrono::{DateTime, Datelike, FixedOffset, Locale};
use crate::domain::datetime_service::DateFormatter;

/// Дни недели, начиная с воскресенья
const WEEKDAYS: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

pub struct ChronoDateFormatter {
    locale: Locale,
}

impl ChronoDateFormatter {
    pub fn new(locale: Locale) -> Self {
        Self { locale }
    }

    /// Разбирает имя локали вида "en_US" / "ru_RU.UTF-8"
    pub fn parse_locale(name: &str) -> Option<Locale> {
        let base = name.split(['.', '@']).next().unwrap_or(name);
        Locale::try_from(base).ok()
    }
}

impl Default for ChronoDateFormatter {
    fn default() -> Self {
        Self::new(Locale::en_US)
    }
}

impl DateFormatter for ChronoDateFormatter {
    fn weekday_name(&self, date: &DateTime<FixedOffset>) -> String {
        // Таблица вместо локали: одно и то же имя на любой машине
        let index = date.weekday().num_days_from_sunday() as usize;
        WEEKDAYS[index].to_string()
    }

    fn month_name(&self, date: &DateTime<FixedOffset>) -> String {
        date.format_localized("%B", self.locale).to_string()
    }

    fn time_text(&self, date: &DateTime<FixedOffset>, show_seconds: bool) -> String {
        if show_seconds {
            date.format("%H:%M:%S").to_string()
        } else {
            date.format("%H:%M").to_string()
        }
    }

    fn day_text(&self, date: &DateTime<FixedOffset>) -> String {
        date.day().to_string()
    }
}
