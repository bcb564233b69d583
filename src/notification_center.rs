use crate::domain::models::BatteryNotification;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, OnceLock};

/// Тип callback-функции наблюдателя
type ObserverCallback = Arc<dyn Fn() + Send + Sync>;

/// Идентификатор подписки, нужен для отписки
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverToken(u64);

/// Структура для хранения наблюдателей одного типа уведомления
struct Observers {
    entries: Vec<(ObserverToken, ObserverCallback)>,
}

impl Observers {
    fn new() -> Self {
        Self { entries: Vec::new() }
    }

    fn add(&mut self, token: ObserverToken, callback: ObserverCallback) {
        self.entries.push((token, callback));
    }

    fn remove(&mut self, token: ObserverToken) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(t, _)| *t != token);
        before != self.entries.len()
    }

    fn snapshot(&self) -> Vec<ObserverCallback> {
        self.entries.iter().map(|(_, cb)| cb.clone()).collect()
    }
}

/// Реестр системных уведомлений о батарее.
///
/// Callback-и вызываются синхронно в потоке, который вызвал `post`.
pub struct NotificationCenter {
    observers: Mutex<HashMap<BatteryNotification, Observers>>,
    next_token: AtomicU64,
}

impl NotificationCenter {
    pub fn new() -> Self {
        Self {
            observers: Mutex::new(HashMap::new()),
            next_token: AtomicU64::new(1),
        }
    }

    pub fn add_observer<F>(&self, kind: BatteryNotification, callback: F) -> ObserverToken
    where
        F: Fn() + Send + Sync + 'static,
    {
        let token = ObserverToken(self.next_token.fetch_add(1, Ordering::Relaxed));
        self.lock()
            .entry(kind)
            .or_insert_with(Observers::new)
            .add(token, Arc::new(callback));
        token
    }

    /// Отписка; неизвестный токен просто игнорируется
    pub fn remove_observer(&self, token: ObserverToken) {
        let mut observers = self.lock();
        for list in observers.values_mut() {
            if list.remove(token) {
                return;
            }
        }
    }

    pub fn post(&self, kind: BatteryNotification) {
        // Копируем список, чтобы не держать lock во время вызова callback-ов
        let callbacks = self
            .lock()
            .get(&kind)
            .map(Observers::snapshot)
            .unwrap_or_default();

        tracing::trace!(?kind, observers = callbacks.len(), "posting notification");

        for callback in callbacks {
            callback();
        }
    }

    pub fn observer_count(&self, kind: BatteryNotification) -> usize {
        self.lock().get(&kind).map_or(0, |list| list.entries.len())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<BatteryNotification, Observers>> {
        // Отравленный lock не мешает читать реестр
        self.observers.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for NotificationCenter {
    fn default() -> Self {
        Self::new()
    }
}

/// Глобальный центр уведомлений процесса
static DEFAULT_CENTER: OnceLock<Arc<NotificationCenter>> = OnceLock::new();

pub fn default_center() -> Arc<NotificationCenter> {
    DEFAULT_CENTER.get_or_init(|| Arc::new(NotificationCenter::new())).clone()
}
