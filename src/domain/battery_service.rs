use crate::domain::models::BatteryState;

/// Trait для доступа к батарее устройства
pub trait BatteryDevice {
    /// Текущий уровень заряда (0.0..1.0), None если хост его не сообщает
    fn current_level(&self) -> Option<f32>;

    /// Текущее состояние батареи
    fn current_state(&self) -> BatteryState;

    /// Включает или выключает слежение за батареей на стороне хоста
    fn set_monitoring_enabled(&self, enabled: bool);
}
