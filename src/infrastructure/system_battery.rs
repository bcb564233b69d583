use crate::domain::battery_service::BatteryDevice;
use crate::domain::models::{BatteryNotification, BatteryState};
use crate::notification_center::NotificationCenter;
use anyhow::{anyhow, Context};
use async_channel::{Receiver, Sender};
use futures::stream::StreamExt;
use std::sync::{Arc, Mutex};
use zbus::fdo::PropertiesProxy;
use zbus::names::InterfaceName;
use zbus::zvariant::{ObjectPath, OwnedObjectPath};
use zbus::Connection;

const UPOWER_DEST: &str = "org.freedesktop.UPower";
const UPOWER_PATH: &str = "/org/freedesktop/UPower";
const DEVICE_IFACE: &str = "org.freedesktop.UPower.Device";
const DISPLAY_DEVICE: &str = "/org/freedesktop/UPower/devices/DisplayDevice";

/// Тип устройства UPower "Battery"
const UPOWER_TYPE_BATTERY: u32 = 2;

/// Значения, прочитанные из UPower
#[derive(Debug, Clone, Copy, PartialEq)]
struct Reading {
    level: f32,
    state: BatteryState,
}

/// Батарея через UPower D-Bus.
///
/// Пока слежение включено, фоновый поток держит кэш и шлёт уведомления
/// `LevelChanged` / `StateChanged` в центр уведомлений.
pub struct UPowerBattery {
    center: Arc<NotificationCenter>,
    cached: Arc<Mutex<Option<Reading>>>,
    stop_tx: Mutex<Option<Sender<()>>>,
}

impl UPowerBattery {
    pub fn new(center: Arc<NotificationCenter>) -> Self {
        Self {
            center,
            cached: Arc::new(Mutex::new(None)),
            stop_tx: Mutex::new(None),
        }
    }

    fn start_monitoring(&self) {
        let Some(rx) = claim_worker_slot(&mut self.stop_tx.lock().unwrap()) else {
            return;
        };

        let center = self.center.clone();
        let cached = self.cached.clone();

        std::thread::spawn(move || {
            // Закрытый канал означает, что потока больше нет и его можно запустить заново
            let worker_rx = rx.clone();

            match tokio::runtime::Builder::new_current_thread().enable_all().build() {
                Ok(runtime) => runtime.block_on(async {
                    if let Err(e) = Self::monitor_battery_events(center, cached, rx).await {
                        tracing::warn!("battery monitoring ended: {e:#}");
                    }
                }),
                Err(e) => tracing::error!("failed to build battery runtime: {e}"),
            }

            worker_rx.close();
        });
    }

    fn stop_monitoring(&self) {
        if let Some(tx) = self.stop_tx.lock().unwrap().take() {
            // Поток мог уже завершиться сам; закрытие канала тоже его остановит
            let _ = tx.try_send(());
            tx.close();
        }
        *self.cached.lock().unwrap() = None;
    }

    /// Мониторинг событий батареи через UPower D-Bus
    async fn monitor_battery_events(
        center: Arc<NotificationCenter>,
        cached: Arc<Mutex<Option<Reading>>>,
        stop_rx: Receiver<()>,
    ) -> anyhow::Result<()> {
        tracing::debug!("connecting to UPower");
        let conn = Connection::system().await.context("system bus unavailable")?;

        let battery_path = Self::find_battery_device(&conn).await?;
        tracing::info!(path = %battery_path.as_str(), "using battery device");

        if let Some(reading) = Self::fetch_reading(&conn, &battery_path).await {
            Self::apply_reading(&center, &cached, reading);
        }

        let properties = PropertiesProxy::builder(&conn)
            .destination(UPOWER_DEST)?
            .path(battery_path.clone())?
            .build()
            .await?;
        let mut stream = properties.receive_properties_changed().await?;

        loop {
            tokio::select! {
                signal = stream.next() => {
                    if signal.is_none() {
                        return Err(anyhow!("UPower property stream closed"));
                    }
                    tracing::trace!("battery property changed");
                    if let Some(reading) = Self::fetch_reading(&conn, &battery_path).await {
                        Self::apply_reading(&center, &cached, reading);
                    }
                }
                _ = stop_rx.recv() => {
                    tracing::debug!("battery monitoring stopped");
                    return Ok(());
                }
            }
        }
    }

    /// Обновляет кэш и шлёт уведомления только по изменившимся полям
    fn apply_reading(center: &NotificationCenter, cached: &Mutex<Option<Reading>>, reading: Reading) {
        let previous = cached.lock().unwrap().replace(reading);

        let level_changed = previous.map_or(true, |p| p.level != reading.level);
        let state_changed = previous.map_or(true, |p| p.state != reading.state);

        if level_changed {
            center.post(BatteryNotification::LevelChanged);
        }
        if state_changed {
            center.post(BatteryNotification::StateChanged);
        }
    }

    /// Поиск батареи через UPower; если её нет, берём составное DisplayDevice
    async fn find_battery_device(conn: &Connection) -> anyhow::Result<OwnedObjectPath> {
        let proxy = zbus::Proxy::new(conn, UPOWER_DEST, UPOWER_PATH, UPOWER_DEST).await?;
        let devices: Vec<OwnedObjectPath> = proxy.call("EnumerateDevices", &()).await?;

        for device in devices {
            let device_proxy = PropertiesProxy::builder(conn)
                .destination(UPOWER_DEST)?
                .path(device.clone())?
                .build()
                .await?;

            if let Ok(device_type) = device_proxy.get(Self::device_interface(), "Type").await {
                if let Ok(UPOWER_TYPE_BATTERY) = u32::try_from(device_type) {
                    return Ok(device);
                }
            }
        }

        tracing::debug!("no battery in EnumerateDevices, falling back to DisplayDevice");
        Ok(ObjectPath::try_from(DISPLAY_DEVICE)?.into())
    }

    async fn fetch_reading(conn: &Connection, battery_path: &OwnedObjectPath) -> Option<Reading> {
        let properties = PropertiesProxy::builder(conn)
            .destination(UPOWER_DEST)
            .ok()?
            .path(battery_path.clone())
            .ok()?
            .build()
            .await
            .ok()?;

        let percentage: f64 = properties
            .get(Self::device_interface(), "Percentage")
            .await
            .ok()?
            .try_into()
            .ok()?;

        let state: u32 = properties
            .get(Self::device_interface(), "State")
            .await
            .ok()?
            .try_into()
            .ok()?;

        Some(Reading {
            level: (percentage / 100.0).clamp(0.0, 1.0) as f32,
            state: map_upower_state(state),
        })
    }

    fn device_interface() -> InterfaceName<'static> {
        InterfaceName::from_static_str_unchecked(DEVICE_IFACE)
    }
}

impl BatteryDevice for UPowerBattery {
    fn current_level(&self) -> Option<f32> {
        self.cached.lock().unwrap().map(|r| r.level)
    }

    fn current_state(&self) -> BatteryState {
        self.cached
            .lock()
            .unwrap()
            .map_or(BatteryState::Unknown, |r| r.state)
    }

    fn set_monitoring_enabled(&self, enabled: bool) {
        if enabled {
            self.start_monitoring();
        } else {
            self.stop_monitoring();
        }
    }
}

impl Drop for UPowerBattery {
    fn drop(&mut self) {
        self.stop_monitoring();
    }
}

/// Занимает слот рабочего потока, если живого потока нет.
///
/// Возвращает приёмник сигнала остановки для нового потока.
fn claim_worker_slot(slot: &mut Option<Sender<()>>) -> Option<Receiver<()>> {
    if slot.as_ref().is_some_and(|tx| !tx.is_closed()) {
        return None;
    }

    let (tx, rx) = async_channel::bounded(1);
    *slot = Some(tx);
    Some(rx)
}

/// Состояние UPower Device.State в состояние виджета
pub fn map_upower_state(state: u32) -> BatteryState {
    match state {
        1 => BatteryState::Charging,     // Charging
        2 => BatteryState::Unplugged,    // Discharging
        3 => BatteryState::Unplugged,    // Empty
        4 => BatteryState::Full,         // FullyCharged
        5 => BatteryState::Charging,     // PendingCharge
        6 => BatteryState::Unplugged,    // PendingDischarge
        _ => BatteryState::Unknown,
    }
}
