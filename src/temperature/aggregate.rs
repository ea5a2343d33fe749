use super::units::render_temp;
use super::{trend_results, trend_wiring, TemperatureBundle, TemperatureConfig};
use crate::error::Result;
use crate::results::{CheckResult, Metric, Output, State};
use crate::store::ValueStore;

/// One sensor after its own check, ready to be summarised.
#[derive(Debug, Clone, PartialEq)]
pub struct SensorStatus {
    pub id:          String,
    /// Celsius.
    pub temperature: f64,
    pub result:      CheckResult,
}

impl SensorStatus {
    /// The text names every non-OK extra (device status, trend) so the
    /// summary shows why a sensor is in trouble.
    pub fn from_bundle(id: impl Into<String>, bundle: &TemperatureBundle) -> Self {
        let mut text = bundle.result.text.clone();
        for extra in bundle.extra.iter().filter(|r| r.state != State::Ok) {
            text.push_str(", ");
            text.push_str(&extra.text);
        }
        Self {
            id:          id.into(),
            temperature: bundle.temperature(),
            result:      CheckResult::summary(bundle.state(), text),
        }
    }
}

/// Summarise many sensors into one check: count, highest, average and
/// lowest temperature, every sensor that is not OK, and the trend of the
/// average when configured.
pub fn check_temperature_list(
    sensors:     &[SensorStatus],
    config:      &TemperatureConfig,
    unique_name: Option<&str>,
    store:       Option<&mut dyn ValueStore>,
    now:         f64,
) -> Result<Vec<Output>> {
    let trend_name = trend_wiring(unique_name, store.is_some(), config.trend_compute.as_ref())?;
    if sensors.is_empty() {
        return Ok(vec![CheckResult::summary(State::Unknown, "No sensors found").into()]);
    }

    let temps = sensors.iter().map(|s| s.temperature);
    let max = temps.clone().fold(f64::NEG_INFINITY, f64::max);
    let min = temps.clone().fold(f64::INFINITY, f64::min);
    let avg = temps.sum::<f64>() / sensors.len() as f64;
    let unit = config.output_unit;

    let mut out: Vec<Output> = vec![
        CheckResult::summary(State::Ok, format!("Sensors: {}", sensors.len())).into(),
        CheckResult::summary(State::Ok, format!("Highest: {}", render_temp(max, unit))).into(),
        Metric::new("temp", max).into(),
        CheckResult::summary(State::Ok, format!("Average: {}", render_temp(avg, unit))).into(),
        CheckResult::summary(State::Ok, format!("Lowest: {}", render_temp(min, unit))).into(),
    ];

    for sensor in sensors.iter().filter(|s| s.result.state != State::Ok) {
        out.push(CheckResult::summary(sensor.result.state, format!("{}: {}", sensor.id, sensor.result.text)).into());
    }

    if let (Some(store), Some(trend), Some(name)) = (store, &config.trend_compute, trend_name) {
        let user = config.user_levels();
        let results = trend_results(
            store,
            trend,
            name,
            avg,
            unit,
            user.upper.map(|l| l.1),
            user.lower.map(|l| l.1),
            now,
        )?;
        out.extend(results.into_iter().map(Output::from));
    }

    Ok(out)
}
