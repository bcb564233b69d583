use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

// Battery models
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BatteryState {
    #[default]
    Unknown,
    Unplugged,
    Charging,
    Full,
}

impl BatteryState {
    pub fn label(&self) -> &'static str {
        match self {
            BatteryState::Unknown => "Unknown",
            BatteryState::Unplugged => "Unplugged",
            BatteryState::Charging => "Charging",
            BatteryState::Full => "Full",
        }
    }
}

impl fmt::Display for BatteryState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Снимок состояния батареи, который видит UI
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BatteryStatus {
    /// Процент заряда с одним знаком после запятой ("82.7"), пусто если уровень неизвестен
    pub level: String,
    pub state: BatteryState,
}

impl BatteryStatus {
    pub fn new(level: Option<f32>, state: BatteryState) -> Self {
        Self {
            level: format_level(level),
            state,
        }
    }
}

/// Форматирует долю заряда (0.0..1.0) в проценты с одним десятичным знаком
pub fn format_level(level: Option<f32>) -> String {
    level
        .map(|fraction| format!("{:.1}", fraction * 100.0))
        .unwrap_or_default()
}

/// Типы системных уведомлений о батарее
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BatteryNotification {
    LevelChanged,
    StateChanged,
}

// Timeline models
/// Пользовательская конфигурация, которая передаётся в каждую запись таймлайна
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WidgetIntent {
    /// Картинка под временем
    #[serde(default)]
    pub background: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TimelineEntry {
    pub date: DateTime<Local>,
    pub configuration: WidgetIntent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadPolicy {
    /// Запросить новый таймлайн, когда закончатся записи
    AtEnd,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Timeline {
    pub entries: Vec<TimelineEntry>,
    pub policy: ReloadPolicy,
}

impl Timeline {
    /// Момент, после которого хост должен запросить новый таймлайн
    pub fn next_reload(&self) -> Option<DateTime<Local>> {
        match self.policy {
            ReloadPolicy::AtEnd => self.entries.last().map(|entry| entry.date),
        }
    }
}

// Presentation models
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WidgetFamily {
    #[default]
    Small,
    Medium,
    Large,
}

/// Размеры и отступы для одного размера виджета
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FamilyLayout {
    pub width: i32,
    pub height: i32,
    pub time_font_size: u32,
    pub caption_font_size: u32,
    pub padding: u32,
}

impl WidgetFamily {
    pub fn layout(&self) -> FamilyLayout {
        match self {
            WidgetFamily::Small => FamilyLayout {
                width: 170,
                height: 170,
                time_font_size: 36,
                caption_font_size: 13,
                padding: 12,
            },
            WidgetFamily::Medium => FamilyLayout {
                width: 364,
                height: 170,
                time_font_size: 48,
                caption_font_size: 16,
                padding: 16,
            },
            WidgetFamily::Large => FamilyLayout {
                width: 364,
                height: 382,
                time_font_size: 72,
                caption_font_size: 22,
                padding: 24,
            },
        }
    }

    pub fn all() -> Vec<WidgetFamily> {
        vec![WidgetFamily::Small, WidgetFamily::Medium, WidgetFamily::Large]
    }
}

impl FamilyLayout {
    /// CSS с размерами шрифтов и отступами для окна виджета
    pub fn css(&self) -> String {
        format!(
            ".widget-root {{ padding: {pad}px; }}\n\
             .widget-time {{ font-size: {time}px; font-weight: bold; }}\n\
             .widget-caption {{ font-size: {caption}px; }}\n\
             .widget-battery {{ font-size: {caption}px; }}\n",
            pad = self.padding,
            time = self.time_font_size,
            caption = self.caption_font_size,
        )
    }
}
