use chrono::{DateTime, Duration, Local};
use crate::domain::models::{ReloadPolicy, Timeline, TimelineEntry, WidgetIntent};
use crate::domain::timeline_service::TimelineProvider;

/// Количество записей в одном таймлайне
pub const ENTRY_COUNT: i64 = 5;

/// Таймлайн из пяти записей с шагом в час, новый запрашивается после последней
pub struct HourlyTimeline;

impl HourlyTimeline {
    pub fn new() -> Self {
        Self
    }
}

impl Default for HourlyTimeline {
    fn default() -> Self {
        Self::new()
    }
}

impl TimelineProvider for HourlyTimeline {
    fn placeholder(&self, now: DateTime<Local>) -> TimelineEntry {
        TimelineEntry {
            date: now,
            configuration: WidgetIntent::default(),
        }
    }

    fn snapshot(&self, intent: &WidgetIntent, now: DateTime<Local>) -> TimelineEntry {
        TimelineEntry {
            date: now,
            configuration: intent.clone(),
        }
    }

    fn timeline(&self, intent: &WidgetIntent, now: DateTime<Local>) -> Timeline {
        let entries = (0..ENTRY_COUNT)
            .map(|hour_offset| TimelineEntry {
                date: now + Duration::hours(hour_offset),
                configuration: intent.clone(),
            })
            .collect();

        Timeline {
            entries,
            policy: ReloadPolicy::AtEnd,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::path::PathBuf;

    fn now() -> DateTime<Local> {
        Local.with_ymd_and_hms(2021, 1, 27, 18, 42, 7).unwrap()
    }

    #[test]
    fn timeline_has_five_hourly_entries_from_now() {
        let provider = HourlyTimeline::new();
        let timeline = provider.timeline(&WidgetIntent::default(), now());

        let dates: Vec<_> = timeline.entries.iter().map(|e| e.date).collect();
        let expected: Vec<_> = (0..5).map(|h| now() + Duration::hours(h)).collect();
        assert_eq!(dates, expected);
        assert_eq!(timeline.policy, ReloadPolicy::AtEnd);
        assert_eq!(timeline.next_reload(), Some(now() + Duration::hours(4)));
    }

    #[test]
    fn entries_carry_the_intent() {
        let provider = HourlyTimeline::new();
        let intent = WidgetIntent {
            background: Some(PathBuf::from("/tmp/bg.png")),
        };
        let timeline = provider.timeline(&intent, now());
        assert!(timeline.entries.iter().all(|e| e.configuration == intent));
        assert_eq!(provider.snapshot(&intent, now()).configuration, intent);
    }

    #[test]
    fn placeholder_uses_default_intent() {
        let entry = HourlyTimeline::new().placeholder(now());
        assert_eq!(entry.date, now());
        assert_eq!(entry.configuration, WidgetIntent::default());
    }
}
