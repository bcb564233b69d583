use chrono::{DateTime, FixedOffset};

/// Trait для форматирования даты виджета.
///
/// Часовой пояс передаётся вместе с датой, поэтому результат не зависит от
/// настроек хоста.
pub trait DateFormatter {
    /// Полное английское название дня недели
    fn weekday_name(&self, date: &DateTime<FixedOffset>) -> String;

    /// Полное название месяца в локали форматтера
    fn month_name(&self, date: &DateTime<FixedOffset>) -> String;

    /// Время в 24-часовом формате
    fn time_text(&self, date: &DateTime<FixedOffset>, show_seconds: bool) -> String;

    /// Число месяца
    fn day_text(&self, date: &DateTime<FixedOffset>) -> String;
}

/// Тексты всех подписей виджета для одного момента времени
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateLabels {
    pub time: String,
    pub weekday: String,
    pub date: String,
}

impl DateLabels {
    /// Время, день недели и дата считаются от одного и того же `date`,
    /// поэтому после полуночи они не расходятся
    pub fn at(formatter: &dyn DateFormatter, date: &DateTime<FixedOffset>, show_seconds: bool) -> Self {
        Self {
            time: formatter.time_text(date, show_seconds),
            weekday: formatter.weekday_name(date),
            date: format!("{} {}", formatter.day_text(date), formatter.month_name(date)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::system_datetime::ChronoDateFormatter;
    use chrono::{Duration, TimeZone};

    #[test]
    fn labels_switch_day_together_with_time() {
        let formatter = ChronoDateFormatter::default();
        let offset = FixedOffset::east_opt(0).unwrap();
        // Понедельник 25 января 2021, 23:42
        let evening = offset.with_ymd_and_hms(2021, 1, 25, 23, 42, 0).unwrap();

        let before = DateLabels::at(&formatter, &evening, false);
        assert_eq!(before.time, "23:42");
        assert_eq!(before.weekday, "Monday");
        assert_eq!(before.date, "25 January");

        let after = DateLabels::at(&formatter, &(evening + Duration::minutes(33)), false);
        assert_eq!(after.time, "00:15");
        assert_eq!(after.weekday, "Tuesday");
        assert_eq!(after.date, "26 January");
    }
}
