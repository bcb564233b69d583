use crate::config::TaskWidgetConfig;
use crate::domain::battery_observer::BatteryObserver;
use crate::domain::datetime_service::DateFormatter;
use crate::domain::models::{BatteryStatus, TimelineEntry, WidgetIntent};
use crate::domain::timeline_service::TimelineProvider;
use crate::ui::{battery::BatteryWidget, datetime::DateTimeWidget};
use chrono::Local;
use gtk4::prelude::*;
use gtk4::{gdk, glib};
use gtk4_layer_shell::{Edge, KeyboardMode, Layer, LayerShell};
use std::path::Path;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

/// Отступ окна от края экрана
const SCREEN_MARGIN: i32 = 24;

pub struct WidgetWindow {
    window: gtk4::ApplicationWindow,
    background: gtk4::Picture,
    datetime_widget: DateTimeWidget,
    battery_widget: BatteryWidget,
}

impl WidgetWindow {
    pub fn new(
        app: &gtk4::Application,
        config: &TaskWidgetConfig,
        formatter: Arc<dyn DateFormatter + Send + Sync>,
    ) -> Rc<Self> {
        let layout = config.family.layout();

        let window = gtk4::ApplicationWindow::new(app);
        window.init_layer_shell();
        window.set_title(Some("Task Widget"));
        // Нижний слой: виджет лежит на рабочем столе под окнами
        window.set_layer(Layer::Bottom);
        window.set_keyboard_mode(KeyboardMode::None);
        window.set_anchor(Edge::Top, true);
        window.set_anchor(Edge::Right, true);
        window.set_margin(Edge::Top, SCREEN_MARGIN);
        window.set_margin(Edge::Right, SCREEN_MARGIN);
        window.set_default_size(layout.width, layout.height);
        window.add_css_class("task-widget");

        let provider = gtk4::CssProvider::new();
        provider.load_from_string(&format!("{}\n{}", include_str!("style.css"), layout.css()));
        if let Some(display) = gdk::Display::default() {
            gtk4::style_context_add_provider_for_display(
                &display,
                &provider,
                gtk4::STYLE_PROVIDER_PRIORITY_APPLICATION,
            );
        } else {
            tracing::warn!("no default display, widget styles not applied");
        }

        let background = gtk4::Picture::new();
        background.set_content_fit(gtk4::ContentFit::Cover);
        background.set_can_shrink(true);

        let datetime_widget = DateTimeWidget::new(formatter, config.show_seconds);
        let battery_widget = BatteryWidget::new();

        let content = gtk4::Box::new(gtk4::Orientation::Vertical, 0);
        content.add_css_class("widget-root");
        content.set_size_request(layout.width, layout.height);
        content.append(datetime_widget.widget());

        let spacer = gtk4::Box::new(gtk4::Orientation::Vertical, 0);
        spacer.set_vexpand(true);
        content.append(&spacer);

        battery_widget.widget().set_halign(gtk4::Align::End);
        content.append(battery_widget.widget());

        let overlay = gtk4::Overlay::new();
        overlay.set_child(Some(&background));
        overlay.add_overlay(&content);
        window.set_child(Some(&overlay));

        Rc::new(Self {
            window,
            background,
            datetime_widget,
            battery_widget,
        })
    }

    pub fn present(&self) {
        self.window.present();
    }

    pub fn show_entry(&self, entry: &TimelineEntry) {
        tracing::debug!(date = %entry.date, "rendering timeline entry");
        self.set_background(entry.configuration.background.as_deref());
        self.datetime_widget.render(Local::now());
    }

    pub fn show_battery(&self, status: &BatteryStatus) {
        self.battery_widget.update(status);
    }

    fn set_background(&self, path: Option<&Path>) {
        match path {
            Some(path) if path.exists() => self.background.set_filename(Some(path)),
            Some(path) => {
                tracing::warn!("background {:?} not found", path);
                self.background.set_filename(None::<&Path>);
            }
            None => self.background.set_filename(None::<&Path>),
        }
    }

    /// Обновление времени и даты каждую секунду
    pub fn start_clock(self: &Rc<Self>) {
        let this = self.clone();
        glib::timeout_add_local(Duration::from_secs(1), move || {
            this.datetime_widget.render(Local::now());
            glib::ControlFlow::Continue
        });
    }

    /// Подписывает окно на изменения батареи.
    ///
    /// Наблюдатель вызывает подписчиков в потоке UPower, поэтому статус
    /// передаётся в главный цикл GTK через канал.
    pub fn attach_battery(self: &Rc<Self>, observer: &BatteryObserver) {
        let (tx, rx) = async_channel::unbounded::<BatteryStatus>();

        observer.subscribe(move |status| {
            if let Err(e) = tx.try_send(status.clone()) {
                tracing::debug!("battery update dropped: {e}");
            }
        });

        let this = self.clone();
        glib::spawn_future_local(async move {
            while let Ok(status) = rx.recv().await {
                this.show_battery(&status);
            }
        });

        self.show_battery(&observer.status());
    }

    /// Показывает записи таймлайна по расписанию и запрашивает новый,
    /// когда текущий закончился.
    pub fn run_timeline(
        self: &Rc<Self>,
        provider: Rc<dyn TimelineProvider>,
        intent: WidgetIntent,
    ) {
        let now = Local::now();
        let timeline = provider.timeline(&intent, now);
        tracing::info!(entries = timeline.entries.len(), "new timeline");

        for entry in timeline.entries.iter().cloned() {
            let delay = (entry.date - now).to_std().unwrap_or_default();
            let this = self.clone();
            glib::timeout_add_local_once(delay, move || this.show_entry(&entry));
        }

        let Some(reload_at) = timeline.next_reload() else {
            tracing::warn!("empty timeline, showing placeholder");
            self.show_entry(&provider.placeholder(now));
            return;
        };

        let delay = (reload_at - now).to_std().unwrap_or_default();
        let this = self.clone();
        glib::timeout_add_local_once(delay, move || {
            this.run_timeline(provider, intent);
        });
    }
}
