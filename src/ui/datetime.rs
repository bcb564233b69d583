use gtk4::prelude::*;
use chrono::{DateTime, Local};
use std::sync::Arc;
use crate::domain::datetime_service::{DateFormatter, DateLabels};

/// Время, день недели и дата
pub struct DateTimeWidget {
    container: gtk4::Box,
    time_label: gtk4::Label,
    weekday_label: gtk4::Label,
    date_label: gtk4::Label,
    formatter: Arc<dyn DateFormatter + Send + Sync>,
    show_seconds: bool,
}

impl DateTimeWidget {
    pub fn new(formatter: Arc<dyn DateFormatter + Send + Sync>, show_seconds: bool) -> Self {
        let container = gtk4::Box::new(gtk4::Orientation::Vertical, 2);

        let time_label = gtk4::Label::new(None);
        time_label.add_css_class("widget-time");
        time_label.set_halign(gtk4::Align::Start);

        let weekday_label = gtk4::Label::new(None);
        weekday_label.add_css_class("widget-caption");
        weekday_label.set_halign(gtk4::Align::Start);

        let date_label = gtk4::Label::new(None);
        date_label.add_css_class("widget-caption");
        date_label.set_halign(gtk4::Align::Start);

        container.append(&time_label);
        container.append(&weekday_label);
        container.append(&date_label);

        Self {
            container,
            time_label,
            weekday_label,
            date_label,
            formatter,
            show_seconds,
        }
    }

    pub fn widget(&self) -> &gtk4::Box {
        &self.container
    }

    /// Все три подписи обновляются от одного момента времени
    pub fn render(&self, now: DateTime<Local>) {
        let labels = DateLabels::at(&*self.formatter, &now.fixed_offset(), self.show_seconds);
        self.time_label.set_text(&labels.time);
        self.weekday_label.set_text(&labels.weekday);
        self.date_label.set_text(&labels.date);
    }
}
