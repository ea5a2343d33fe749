use crate::levels::Levels;
use crate::results::State;
use crate::temperature::units::TempUnit;
use serde::{Deserialize, Serialize};

/// What a device reports alongside its temperature reading. Levels are in
/// the device unit (Celsius when `unit` is missing).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeviceReport {
    #[serde(default)]
    pub unit:         Option<TempUnit>,
    #[serde(default)]
    pub levels:       Option<Levels>,
    #[serde(default)]
    pub levels_lower: Option<Levels>,
    /// Device's own verdict, independent of the numeric levels.
    #[serde(default)]
    pub status:       Option<State>,
    #[serde(default)]
    pub status_name:  Option<String>,
}

/// One temperature sensor as handed over by a collector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorReading {
    pub id:     String,
    pub value:  f64,
    #[serde(flatten)]
    pub device: DeviceReport,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_flat_sensor_entries() {
        let s: SensorReading = serde_json::from_str(
            r#"{"id": "CPU", "value": 122.0, "unit": "f", "levels": [176.0, 194.0], "status": "warn", "status_name": "degraded"}"#,
        ).unwrap();
        assert_eq!(s.device.unit, Some(TempUnit::Fahrenheit));
        assert_eq!(s.device.levels, Some((176.0, 194.0)));
        assert_eq!(s.device.status, Some(State::Warn));

        let bare: SensorReading = serde_json::from_str(r#"{"id": "Ambient", "value": 21.5}"#).unwrap();
        assert_eq!(bare.device, DeviceReport::default());
    }
}
