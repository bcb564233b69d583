use crate::domain::battery_service::BatteryDevice;
use crate::domain::models::{format_level, BatteryNotification, BatteryStatus};
use crate::notification_center::{NotificationCenter, ObserverToken};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};

/// Тип callback-функции подписчика на изменения батареи
type StatusCallback = Arc<dyn Fn(&BatteryStatus) + Send + Sync>;

/// Общая часть, которую захватывают обработчики уведомлений
struct ObserverState {
    device: Arc<dyn BatteryDevice + Send + Sync>,
    status: RwLock<BatteryStatus>,
    subscribers: Mutex<Vec<StatusCallback>>,
    /// Меняется только под write-lock статуса
    active: AtomicBool,
    /// Номер последнего изменения статуса, тоже только под write-lock
    version: AtomicU64,
}

impl ObserverState {
    // Устройство читается под lock-ом статуса, чтобы последнее записанное
    // значение было и самым свежим
    fn refresh_level(&self) {
        let update = self.mutate(|status, device| {
            status.level = format_level(device.current_level());
        });
        if let Some((snapshot, version)) = update {
            self.deliver(&snapshot, version);
        }
    }

    fn refresh_state(&self) {
        let update = self.mutate(|status, device| {
            status.state = device.current_state();
        });
        if let Some((snapshot, version)) = update {
            self.deliver(&snapshot, version);
        }
    }

    /// Меняет статус, если слежение активно; возвращает снимок и его номер
    fn mutate<F>(&self, change: F) -> Option<(BatteryStatus, u64)>
    where
        F: FnOnce(&mut BatteryStatus, &dyn BatteryDevice),
    {
        let mut status = self.status.write().unwrap();
        if !self.active.load(Ordering::Acquire) {
            return None;
        }
        change(&mut status, &*self.device);
        let version = self.version.fetch_add(1, Ordering::AcqRel) + 1;
        Some((status.clone(), version))
    }

    fn activate(&self) -> (BatteryStatus, u64) {
        let mut status = self.status.write().unwrap();
        self.active.store(true, Ordering::Release);
        *status = BatteryStatus::new(self.device.current_level(), self.device.current_state());
        let version = self.version.fetch_add(1, Ordering::AcqRel) + 1;
        (status.clone(), version)
    }

    /// Сбрасывает статус; уведомления, которые ещё в пути, его уже не изменят
    fn deactivate(&self) -> (BatteryStatus, u64) {
        let mut status = self.status.write().unwrap();
        self.active.store(false, Ordering::Release);
        *status = BatteryStatus::default();
        let version = self.version.fetch_add(1, Ordering::AcqRel) + 1;
        (status.clone(), version)
    }

    /// Рассылает снимок, пока он остаётся последним.
    ///
    /// Lock-и на время вызова не держатся: подписчик может вызвать
    /// `stop()` или `subscribe()`.
    fn deliver(&self, status: &BatteryStatus, version: u64) {
        let callbacks: Vec<StatusCallback> = self.subscribers.lock().unwrap().clone();
        for callback in callbacks {
            if self.version.load(Ordering::Acquire) != version {
                return;
            }
            callback(status);
        }
    }
}

/// Наблюдатель за батареей: слушает уведомления хоста и публикует
/// актуальный `BatteryStatus` подписчикам.
pub struct BatteryObserver {
    state: Arc<ObserverState>,
    center: Arc<NotificationCenter>,
    tokens: Mutex<Vec<ObserverToken>>,
}

impl BatteryObserver {
    pub fn new(device: Arc<dyn BatteryDevice + Send + Sync>, center: Arc<NotificationCenter>) -> Self {
        Self {
            state: Arc::new(ObserverState {
                device,
                status: RwLock::new(BatteryStatus::default()),
                subscribers: Mutex::new(Vec::new()),
                active: AtomicBool::new(false),
                version: AtomicU64::new(0),
            }),
            center,
            tokens: Mutex::new(Vec::new()),
        }
    }

    /// Включает слежение, читает текущее значение и подписывается на оба уведомления.
    /// Повторный вызов без `stop()` ничего не делает.
    pub fn start(&self) {
        let (initial, version) = {
            let mut tokens = self.tokens.lock().unwrap();
            if !tokens.is_empty() {
                tracing::debug!("battery observer already started");
                return;
            }

            // Подписываемся до включения: хост может прислать первое значение сразу
            let state = self.state.clone();
            tokens.push(self.center.add_observer(BatteryNotification::LevelChanged, move || {
                state.refresh_level();
            }));

            let state = self.state.clone();
            tokens.push(self.center.add_observer(BatteryNotification::StateChanged, move || {
                state.refresh_state();
            }));

            self.state.device.set_monitoring_enabled(true);
            self.state.activate()
        };

        tracing::info!(level = %initial.level, state = %initial.state, "battery monitoring started");
        self.state.deliver(&initial, version);
    }

    /// Выключает слежение и отписывается. Безопасно вызывать без `start()`, повторно
    /// и из callback-а подписчика.
    pub fn stop(&self) {
        let (reset, version) = {
            let mut tokens = self.tokens.lock().unwrap();
            if tokens.is_empty() {
                return;
            }

            self.state.device.set_monitoring_enabled(false);
            for token in tokens.drain(..) {
                self.center.remove_observer(token);
            }
            self.state.deactivate()
        };

        tracing::info!("battery monitoring stopped");
        self.state.deliver(&reset, version);
    }

    pub fn is_running(&self) -> bool {
        !self.tokens.lock().unwrap().is_empty()
    }

    pub fn status(&self) -> BatteryStatus {
        self.state.status.read().unwrap().clone()
    }

    /// Подписаться на изменения; callback вызывается в потоке, доставившем уведомление
    pub fn subscribe<F>(&self, callback: F)
    where
        F: Fn(&BatteryStatus) + Send + Sync + 'static,
    {
        self.state.subscribers.lock().unwrap().push(Arc::new(callback));
    }
}

impl Drop for BatteryObserver {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::BatteryState;

    /// Поддельная батарея, значения которой меняет тест
    struct FakeDevice {
        level: Mutex<Option<f32>>,
        state: Mutex<BatteryState>,
        monitoring: Mutex<bool>,
    }

    impl FakeDevice {
        fn new(level: Option<f32>, state: BatteryState) -> Arc<Self> {
            Arc::new(Self {
                level: Mutex::new(level),
                state: Mutex::new(state),
                monitoring: Mutex::new(false),
            })
        }

        fn set(&self, level: Option<f32>, state: BatteryState) {
            *self.level.lock().unwrap() = level;
            *self.state.lock().unwrap() = state;
        }
    }

    impl BatteryDevice for FakeDevice {
        fn current_level(&self) -> Option<f32> {
            *self.level.lock().unwrap()
        }

        fn current_state(&self) -> BatteryState {
            *self.state.lock().unwrap()
        }

        fn set_monitoring_enabled(&self, enabled: bool) {
            *self.monitoring.lock().unwrap() = enabled;
        }
    }

    fn observer_with(device: Arc<FakeDevice>) -> (BatteryObserver, Arc<NotificationCenter>) {
        let center = Arc::new(NotificationCenter::new());
        (BatteryObserver::new(device, center.clone()), center)
    }

    #[test]
    fn start_captures_current_level_and_state() {
        let device = FakeDevice::new(Some(0.827), BatteryState::Unplugged);
        let (observer, center) = observer_with(device.clone());

        observer.start();

        assert_eq!(observer.status().level, "82.7");
        assert_eq!(observer.status().state, BatteryState::Unplugged);
        assert!(*device.monitoring.lock().unwrap());
        assert_eq!(center.observer_count(BatteryNotification::LevelChanged), 1);
        assert_eq!(center.observer_count(BatteryNotification::StateChanged), 1);
    }

    #[test]
    fn notifications_update_the_matching_field() {
        let device = FakeDevice::new(Some(0.5), BatteryState::Unplugged);
        let (observer, center) = observer_with(device.clone());
        observer.start();

        device.set(Some(0.51), BatteryState::Charging);
        center.post(BatteryNotification::LevelChanged);
        assert_eq!(observer.status().level, "51.0");
        assert_eq!(observer.status().state, BatteryState::Unplugged);

        center.post(BatteryNotification::StateChanged);
        assert_eq!(observer.status().state, BatteryState::Charging);
    }

    #[test]
    fn unknown_state_is_passed_through() {
        let device = FakeDevice::new(None, BatteryState::Unknown);
        let (observer, _center) = observer_with(device);
        observer.start();

        assert_eq!(observer.status().level, "");
        assert_eq!(observer.status().state, BatteryState::Unknown);
    }

    #[test]
    fn notifications_after_stop_do_not_mutate_status() {
        let device = FakeDevice::new(Some(0.9), BatteryState::Full);
        let (observer, center) = observer_with(device.clone());
        observer.start();
        observer.stop();
        let stopped = observer.status();

        device.set(Some(0.1), BatteryState::Unplugged);
        center.post(BatteryNotification::LevelChanged);
        center.post(BatteryNotification::StateChanged);

        assert_eq!(observer.status(), stopped);
        assert_eq!(stopped, BatteryStatus::default());
        assert!(!*device.monitoring.lock().unwrap());
        assert_eq!(center.observer_count(BatteryNotification::LevelChanged), 0);
    }

    #[test]
    fn stop_without_start_and_double_stop_are_noops() {
        let device = FakeDevice::new(Some(0.3), BatteryState::Charging);
        let (observer, _center) = observer_with(device);

        observer.stop();
        observer.start();
        observer.stop();
        observer.stop();
        assert!(!observer.is_running());
    }

    #[test]
    fn start_twice_registers_once() {
        let device = FakeDevice::new(Some(0.3), BatteryState::Charging);
        let (observer, center) = observer_with(device);

        observer.start();
        observer.start();
        assert_eq!(center.observer_count(BatteryNotification::LevelChanged), 1);
    }

    #[test]
    fn subscribers_receive_each_change() {
        let device = FakeDevice::new(Some(0.2), BatteryState::Unplugged);
        let (observer, center) = observer_with(device.clone());
        let seen = Arc::new(Mutex::new(Vec::new()));

        let sink = seen.clone();
        observer.subscribe(move |status| sink.lock().unwrap().push(status.clone()));

        observer.start();
        device.set(Some(0.25), BatteryState::Unplugged);
        center.post(BatteryNotification::LevelChanged);

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].level, "20.0");
        assert_eq!(seen[1].level, "25.0");
    }

    #[test]
    fn drop_unsubscribes() {
        let device = FakeDevice::new(Some(0.2), BatteryState::Unplugged);
        let (observer, center) = observer_with(device);
        observer.start();
        drop(observer);

        assert_eq!(center.observer_count(BatteryNotification::StateChanged), 0);
    }

    #[test]
    fn subscriber_may_stop_the_observer() {
        let device = FakeDevice::new(Some(1.0), BatteryState::Full);
        let center = Arc::new(NotificationCenter::new());
        let observer = Arc::new(BatteryObserver::new(device, center));

        let weak = Arc::downgrade(&observer);
        observer.subscribe(move |status| {
            if status.state == BatteryState::Full {
                if let Some(observer) = weak.upgrade() {
                    observer.stop();
                }
            }
        });

        let (tx, rx) = std::sync::mpsc::channel();
        let worker = observer.clone();
        std::thread::spawn(move || {
            worker.start();
            let _ = tx.send(());
        });

        rx.recv_timeout(std::time::Duration::from_secs(3))
            .expect("start() with a stopping subscriber must return");
        assert!(!observer.is_running());
        assert_eq!(observer.status(), BatteryStatus::default());
    }

    #[test]
    fn subscriber_may_subscribe_from_callback() {
        let device = FakeDevice::new(Some(0.4), BatteryState::Unplugged);
        let center = Arc::new(NotificationCenter::new());
        let observer = Arc::new(BatteryObserver::new(device, center.clone()));
        let late_hits = Arc::new(Mutex::new(0));

        let weak = Arc::downgrade(&observer);
        let hits = late_hits.clone();
        let added = AtomicBool::new(false);
        observer.subscribe(move |_| {
            if added.swap(true, Ordering::SeqCst) {
                return;
            }
            if let Some(observer) = weak.upgrade() {
                let hits = hits.clone();
                observer.subscribe(move |_| *hits.lock().unwrap() += 1);
            }
        });

        observer.start();
        center.post(BatteryNotification::LevelChanged);
        assert_eq!(*late_hits.lock().unwrap(), 1);
    }

    #[test]
    fn stale_snapshot_is_not_delivered_after_stop() {
        let device = FakeDevice::new(Some(0.7), BatteryState::Unplugged);
        let (observer, _center) = observer_with(device);
        let seen = Arc::new(Mutex::new(Vec::new()));

        let sink = seen.clone();
        observer.subscribe(move |status: &BatteryStatus| sink.lock().unwrap().push(status.clone()));
        observer.start();

        // Снимок уведомления, которое обогнал stop()
        let in_flight = observer.state.mutate(|_, _| {}).unwrap();
        observer.stop();
        observer.state.deliver(&in_flight.0, in_flight.1);

        let seen = seen.lock().unwrap();
        assert_eq!(seen.last(), Some(&BatteryStatus::default()));
        assert_eq!(seen.len(), 2);
    }
}
