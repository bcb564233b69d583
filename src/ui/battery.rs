use gtk4::prelude::*;
use crate::domain::models::{BatteryState, BatteryStatus};

pub struct BatteryWidget {
    container: gtk4::Box,
    icon: gtk4::Label,
    label: gtk4::Label,
}

impl BatteryWidget {
    pub fn new() -> Self {
        let container = gtk4::Box::new(gtk4::Orientation::Horizontal, 4);
        container.add_css_class("widget-battery");

        let icon = gtk4::Label::new(None);
        icon.add_css_class("battery-icon");
        container.append(&icon);

        let label = gtk4::Label::new(None);
        label.add_css_class("battery-percentage");
        container.append(&label);

        let widget = Self { container, icon, label };
        widget.update(&BatteryStatus::default());
        widget
    }

    pub fn widget(&self) -> &gtk4::Box {
        &self.container
    }

    pub fn update(&self, status: &BatteryStatus) {
        self.icon.set_text(battery_icon(status));

        if status.level.is_empty() {
            // Хост не сообщил уровень
            self.label.set_text("--");
        } else {
            self.label.set_text(&format!("{}%", status.level));
        }

        self.container.set_tooltip_text(Some(&format!("Battery: {}", status.state)));

        self.container.remove_css_class("battery-charging");
        self.container.remove_css_class("battery-full");
        match status.state {
            BatteryState::Charging => self.container.add_css_class("battery-charging"),
            BatteryState::Full => self.container.add_css_class("battery-full"),
            BatteryState::Unplugged | BatteryState::Unknown => {}
        }
    }
}

/// Иконка батареи в зависимости от состояния и уровня заряда
fn battery_icon(status: &BatteryStatus) -> &'static str {
    match status.state {
        BatteryState::Charging => "󰂄", // Nerd Font: battery charging
        BatteryState::Full => "󰁹",     // Nerd Font: battery full
        BatteryState::Unknown if status.level.is_empty() => "󰂑", // battery unknown
        _ => {
            let percent = status.level.parse::<f32>().unwrap_or(0.0);
            match percent as u32 {
                90..=100 => "󰁹",
                70..=89 => "󰂂",
                50..=69 => "󰂀",
                30..=49 => "󰁾",
                10..=29 => "󰁼",
                _ => "󰁺",
            }
        }
    }
}
