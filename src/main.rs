use task_widget::config::TaskWidgetConfig;
use task_widget::domain::battery_observer::BatteryObserver;
use task_widget::domain::battery_service::BatteryDevice;
use task_widget::domain::datetime_service::DateFormatter;
use task_widget::domain::timeline_service::TimelineProvider;
use task_widget::infrastructure::hourly_timeline::HourlyTimeline;
use task_widget::infrastructure::system_battery::UPowerBattery;
use task_widget::infrastructure::system_datetime::ChronoDateFormatter;
use task_widget::notification_center;
use task_widget::ui::widget_window::WidgetWindow;

use chrono::{Local, Locale};
use gtk4::glib;
use gtk4::prelude::*;
use std::rc::Rc;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

fn main() -> glib::ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let app = gtk4::Application::builder()
        .application_id("dev.taskwidget.TaskWidget")
        .build();

    app.connect_activate(build_ui);

    app.run()
}

fn build_ui(app: &gtk4::Application) {
    let config = TaskWidgetConfig::load();
    let locale = config.date_locale().unwrap_or(Locale::en_US);

    let formatter: Arc<dyn DateFormatter + Send + Sync> = Arc::new(ChronoDateFormatter::new(locale));
    let provider: Rc<dyn TimelineProvider> = Rc::new(HourlyTimeline::new());

    // Батарея: UPower -> центр уведомлений -> наблюдатель -> окно
    let center = notification_center::default_center();
    let device: Arc<dyn BatteryDevice + Send + Sync> = Arc::new(UPowerBattery::new(center.clone()));
    let observer = Rc::new(BatteryObserver::new(device, center));

    let window = WidgetWindow::new(app, &config, formatter);
    window.attach_battery(&observer);
    observer.start();

    window.show_entry(&provider.snapshot(&config.intent, Local::now()));
    window.start_clock();
    window.run_timeline(provider, config.intent.clone());
    window.present();

    app.connect_shutdown(move |_| {
        observer.stop();
    });

    tracing::info!(family = ?config.family, locale = %config.locale, "task widget started");
}
