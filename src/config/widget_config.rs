use crate::domain::models::{WidgetFamily, WidgetIntent};
use crate::infrastructure::system_datetime::ChronoDateFormatter;
use chrono::Locale;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to write {path:?}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("unknown locale {0:?}")]
    UnknownLocale(String),
}

/// Конфигурация виджета
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskWidgetConfig {
    /// Размер виджета
    pub family: WidgetFamily,
    /// Локаль для названия месяца, например "en_US"
    pub locale: String,
    pub show_seconds: bool,
    /// Пользовательская часть, попадает в каждую запись таймлайна
    pub intent: WidgetIntent,
}

impl Default for TaskWidgetConfig {
    fn default() -> Self {
        Self {
            family: WidgetFamily::Small,
            locale: "en_US".to_string(),
            show_seconds: false,
            intent: WidgetIntent::default(),
        }
    }
}

impl TaskWidgetConfig {
    /// Путь к файлу конфигурации
    pub fn config_path() -> PathBuf {
        let config_dir = std::env::var("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| {
                let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
                PathBuf::from(home).join(".config")
            });

        config_dir.join("task-widget/config.json")
    }

    /// Загрузить конфигурацию; при любой ошибке используются значения по умолчанию
    pub fn load() -> Self {
        Self::load_or_default(&Self::config_path())
    }

    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            tracing::info!("no config at {:?}, using defaults", path);
            return Self::default();
        }

        match Self::load_from(path) {
            Ok(config) => {
                tracing::info!("loaded config from {:?}", path);
                config
            }
            Err(e) => {
                tracing::warn!("{e}; using defaults");
                Self::default()
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Сохранить конфигурацию в файл
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let write_err = |source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        };

        // Создаём директорию, если не существует
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(write_err)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content).map_err(write_err)?;

        tracing::debug!("saved config to {:?}", path);
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.date_locale().map(|_| ())
    }

    pub fn date_locale(&self) -> Result<Locale, ConfigError> {
        ChronoDateFormatter::parse_locale(&self.locale)
            .ok_or_else(|| ConfigError::UnknownLocale(self.locale.clone()))
    }
}
