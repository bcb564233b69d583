use chrono::{DateTime, Local};
use crate::domain::models::{Timeline, TimelineEntry, WidgetIntent};

/// Trait для генерации записей, по которым хост перерисовывает виджет
pub trait TimelineProvider {
    /// Запись-заглушка до того, как известна конфигурация
    fn placeholder(&self, now: DateTime<Local>) -> TimelineEntry;

    /// Одна запись для быстрого показа
    fn snapshot(&self, intent: &WidgetIntent, now: DateTime<Local>) -> TimelineEntry;

    /// Конечный таймлайн начиная с `now`
    fn timeline(&self, intent: &WidgetIntent, now: DateTime<Local>) -> Timeline;
}
