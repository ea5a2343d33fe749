//! Temperature checks with user and device levels.
//!
//! Both level sources are evaluated in full (numeric levels, device status,
//! trend) before the configured [`LevelPolicy`] picks the side to report.

pub mod aggregate;
pub mod trend;
pub mod units;

use crate::error::{CheckError, Result};
use crate::levels::{check_levels, Levels};
use crate::models::sensor::DeviceReport;
use crate::policy::{resolve, LevelPolicy, LevelSource, Side};
use crate::results::{CheckResult, Metric, Output, State};
use crate::store::ValueStore;
use serde::{Deserialize, Serialize};
use trend::{check_trend, TrendConfig};
use units::{levels_to_celsius, render_temp, to_celsius, TempUnit};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemperatureConfig {
    /// Unit of the reading; falls back to the device unit, then Celsius.
    pub input_unit:             Option<TempUnit>,
    pub output_unit:            TempUnit,
    /// Unit of `levels` and `levels_lower`.
    pub levels_unit:            TempUnit,
    pub levels:                 Option<Levels>,
    pub levels_lower:           Option<Levels>,
    pub device_levels_handling: LevelPolicy,
    pub trend_compute:          Option<TrendConfig>,
}

impl TemperatureConfig {
    fn user_levels(&self) -> SideLevels {
        SideLevels {
            upper: self.levels.map(|l| levels_to_celsius(l, self.levels_unit)),
            lower: self.levels_lower.map(|l| levels_to_celsius(l, self.levels_unit)),
        }
    }
}

/// Levels of one side, in Celsius.
#[derive(Debug, Clone, Copy, Default)]
struct SideLevels {
    upper: Option<Levels>,
    lower: Option<Levels>,
}

impl SideLevels {
    fn configured(&self) -> bool {
        self.upper.is_some() || self.lower.is_some()
    }
}

/// The surfaced result of a temperature check, always emitted in the order
/// metric, result, extra results, configuration note.
#[derive(Debug, Clone, PartialEq)]
pub struct TemperatureBundle {
    pub metric: Metric,
    pub result: CheckResult,
    /// Device status and trend results of the chosen side.
    pub extra:  Vec<CheckResult>,
    pub note:   CheckResult,
    pub source: LevelSource,
}

impl TemperatureBundle {
    pub fn state(&self) -> State {
        State::worst_of(std::iter::once(self.result.state).chain(self.extra.iter().map(|r| r.state)))
    }

    /// Reading in Celsius.
    pub fn temperature(&self) -> f64 {
        self.metric.value
    }

    pub fn outputs(self) -> Vec<Output> {
        let mut out: Vec<Output> = vec![self.metric.into(), self.result.into()];
        out.extend(self.extra.into_iter().map(Output::from));
        out.push(self.note.into());
        out
    }
}

struct Evaluation {
    metric: Metric,
    result: CheckResult,
    extra:  Vec<CheckResult>,
}

/// `unique_name` and `store` come as a pair; trend computation needs both.
pub(crate) fn trend_wiring<'a>(
    unique_name: Option<&'a str>,
    has_store:   bool,
    trend:       Option<&TrendConfig>,
) -> Result<Option<&'a str>> {
    match (unique_name, has_store) {
        (Some(name), true) => Ok(trend.map(|_| name)),
        (None, false) if trend.is_some() => Err(CheckError::config(
            "trend computation needs a unique name and a value store",
        )),
        (None, false) => Ok(None),
        _ => Err(CheckError::config("unique name and value store must be given together")),
    }
}

/// Run the trend sub-check, treating a primed counter as "no trend yet".
pub(crate) fn trend_results(
    store:       &mut dyn ValueStore,
    config:      &TrendConfig,
    name:        &str,
    temp:        f64,
    output_unit: TempUnit,
    crit:        Option<f64>,
    crit_lower:  Option<f64>,
    now:         f64,
) -> Result<Vec<CheckResult>> {
    match check_trend(store, temp, config, output_unit, crit, crit_lower, name, now) {
        Ok(results) => Ok(results),
        Err(e) if e.is_insufficient_data() => {
            tracing::debug!(name, error = %e, "temperature trend skipped");
            Ok(Vec::new())
        }
        Err(e) => Err(e),
    }
}

/// Check one temperature reading.
///
/// `unique_name` and `store` are needed together when `trend_compute` is
/// configured; each side keeps its own counters under
/// `<unique_name>.user` and `<unique_name>.dev`.
pub fn check_temperature(
    reading:     f64,
    config:      &TemperatureConfig,
    device:      &DeviceReport,
    unique_name: Option<&str>,
    mut store:   Option<&mut dyn ValueStore>,
    now:         f64,
) -> Result<TemperatureBundle> {
    let trend_name = trend_wiring(unique_name, store.is_some(), config.trend_compute.as_ref())?;

    let input_unit = config.input_unit.or(device.unit).unwrap_or_default();
    let temp = to_celsius(reading, input_unit);
    let device_unit = device.unit.unwrap_or_default();

    let user_levels = config.user_levels();
    let device_levels = SideLevels {
        upper: device.levels.map(|l| levels_to_celsius(l, device_unit)),
        lower: device.levels_lower.map(|l| levels_to_celsius(l, device_unit)),
    };

    let device_status = device.status.map(|state| {
        let name = device.status_name.as_deref().unwrap_or(state.label());
        let text = format!("State on device: {}", name);
        match state {
            State::Ok => CheckResult::notice(state, text),
            _         => CheckResult::summary(state, text),
        }
    });

    let mut evaluate = |levels: SideLevels, status: Option<CheckResult>, suffix: &str| -> Result<Side<Evaluation>> {
        let result = check_levels(temp, levels.upper, levels.lower, |c| render_temp(c, config.output_unit), "Temperature");
        let mut extra: Vec<CheckResult> = status.into_iter().collect();
        if let (Some(store), Some(trend), Some(name)) = (store.as_deref_mut(), &config.trend_compute, trend_name) {
            extra.extend(trend_results(
                store,
                trend,
                &format!("{}.{}", name, suffix),
                temp,
                config.output_unit,
                levels.upper.map(|l| l.1),
                levels.lower.map(|l| l.1),
                now,
            )?);
        }

        let state = State::worst_of(std::iter::once(result.state).chain(extra.iter().map(|r| r.state)));
        Ok(Side {
            configured: levels.configured(),
            state,
            payload: Evaluation {
                metric: Metric::new("temp", temp).with_levels(levels.upper),
                result,
                extra,
            },
        })
    };

    let user = evaluate(user_levels, None, "user")?;
    let dev = evaluate(device_levels, device_status, "dev")?;

    let resolved = resolve(config.device_levels_handling, user, dev);
    tracing::debug!(
        policy = %config.device_levels_handling,
        source = ?resolved.source,
        temp,
        "temperature levels resolved"
    );

    let Evaluation { metric, result, extra } = resolved.payload;
    Ok(TemperatureBundle {
        metric,
        result,
        extra,
        note: CheckResult::notice(State::Ok, format!("Configuration: {}", resolved.note)),
        source: resolved.source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use assert_matches::assert_matches;

    fn run(reading: f64, config: &TemperatureConfig, device: &DeviceReport) -> Vec<Output> {
        let mut store = MemoryStore::new();
        check_temperature(reading, config, device, Some("unique_name"), Some(&mut store), 0.0)
            .unwrap()
            .outputs()
    }

    fn user(levels: Option<Levels>, lower: Option<Levels>, policy: LevelPolicy) -> TemperatureConfig {
        TemperatureConfig { levels, levels_lower: lower, device_levels_handling: policy, ..Default::default() }
    }

    fn device(levels: Option<Levels>, lower: Option<Levels>) -> DeviceReport {
        DeviceReport { levels, levels_lower: lower, ..Default::default() }
    }

    fn ok(text: &str) -> Output { CheckResult::summary(State::Ok, text).into() }
    fn note(text: &str) -> Output { CheckResult::notice(State::Ok, format!("Configuration: {}", text)).into() }
    fn temp(value: f64, levels: Option<Levels>) -> Output { Metric::new("temp", value).with_levels(levels).into() }

    #[test]
    fn no_levels_anywhere() {
        assert_eq!(run(23.0, &TemperatureConfig::default(), &DeviceReport::default()), vec![
            temp(23.0, None),
            ok("Temperature: 23.0 °C"),
            note("prefer user levels over device levels (no levels found)"),
        ]);
    }

    #[test]
    fn user_levels_warn_and_crit() {
        let out = run(23.0, &user(Some((23.0, 30.0)), None, LevelPolicy::default()), &DeviceReport::default());
        assert_eq!(out[0], temp(23.0, Some((23.0, 30.0))));
        assert_eq!(out[1], CheckResult::summary(State::Warn, "Temperature: 23.0 °C (warn/crit at 23.0 °C/30.0 °C)").into());
        assert_eq!(out[2], note("prefer user levels over device levels (used user levels)"));

        let out = run(-16.0, &user(None, Some((0.0, -15.0)), LevelPolicy::default()), &DeviceReport::default());
        assert_eq!(out[1], CheckResult::summary(State::Crit, "Temperature: -16.0 °C (warn/crit below 0.0 °C/-15.0 °C)").into());
    }

    #[test]
    fn warn_between_user_levels() {
        let out = run(30.0, &user(Some((25.0, 35.0)), None, LevelPolicy::PreferUserThenDevice), &DeviceReport::default());
        assert_eq!(crate::results::overall_state(&out), State::Warn);
        assert_eq!(out.last().unwrap().as_result().unwrap().text, "Configuration: prefer user levels over device levels (used user levels)");
    }

    #[test]
    fn units_apply_to_reading_and_output() {
        let cfg = TemperatureConfig { output_unit: TempUnit::Fahrenheit, ..Default::default() };
        let out = run(10.0, &cfg, &DeviceReport::default());
        assert_eq!(out[0], temp(10.0, None));
        assert_eq!(out[1], ok("Temperature: 50.0 °F"));

        let cfg = TemperatureConfig { input_unit: Some(TempUnit::Fahrenheit), ..Default::default() };
        let out = run(50.0, &cfg, &DeviceReport::default());
        assert_eq!(out[0], temp(10.0, None));
        assert_eq!(out[1], ok("Temperature: 10.0 °C"));
    }

    #[test]
    fn device_levels_are_read_in_the_device_unit() {
        let dev = DeviceReport { unit: Some(TempUnit::Fahrenheit), levels: Some((50.0, 59.0)), ..Default::default() };
        let out = run(50.0, &TemperatureConfig::default(), &dev);
        assert_eq!(out[0], temp(10.0, Some((10.0, 15.0))));
        assert_eq!(out[1], CheckResult::summary(State::Warn, "Temperature: 10.0 °C (warn/crit at 10.0 °C/15.0 °C)").into());
        assert_eq!(out[2], note("prefer user levels over device levels (used device levels)"));
    }

    #[test]
    fn fixed_policies() {
        let dev = device(Some((10.0, 15.0)), Some((1.0, -15.0)));
        let out = run(-20.0, &user(Some((50.0, 75.0)), Some((-25.0, -30.0)), LevelPolicy::UseUser), &dev);
        assert_eq!(out, vec![temp(-20.0, Some((50.0, 75.0))), ok("Temperature: -20.0 °C"), note("only use user levels")]);

        let out = run(-20.0, &user(Some((50.0, 75.0)), Some((-25.0, -30.0)), LevelPolicy::UseDevice), &dev);
        assert_eq!(out, vec![
            temp(-20.0, Some((10.0, 15.0))),
            CheckResult::summary(State::Crit, "Temperature: -20.0 °C (warn/crit below 1.0 °C/-15.0 °C)").into(),
            note("only use device levels"),
        ]);
    }

    #[test]
    fn prefer_policies_fall_back() {
        let dev = device(None, Some((1.0, -15.0)));
        let out = run(-20.0, &user(None, None, LevelPolicy::PreferUserThenDevice), &dev);
        assert_eq!(out[2], note("prefer user levels over device levels (used device levels)"));

        let out = run(-20.0, &user(None, Some((-25.0, -30.0)), LevelPolicy::PreferUserThenDevice), &dev);
        assert_eq!(out, vec![
            temp(-20.0, None),
            ok("Temperature: -20.0 °C"),
            note("prefer user levels over device levels (used user levels)"),
        ]);

        let out = run(-20.0, &user(None, None, LevelPolicy::PreferDeviceThenUser), &DeviceReport::default());
        assert_eq!(out[2], note("prefer device levels over user levels (no levels found)"));
    }

    #[test]
    fn best_and_worst() {
        let dev = device(Some((10.0, 15.0)), Some((1.0, -15.0)));
        let out = run(-20.0, &user(Some((50.0, 75.0)), Some((-25.0, -30.0)), LevelPolicy::ShowWorst), &dev);
        assert_eq!(out[0], temp(-20.0, Some((10.0, 15.0))));
        assert_eq!(out[2], note("show most critical state"));

        let out = run(-20.0, &user(Some((50.0, 75.0)), Some((-25.0, -30.0)), LevelPolicy::ShowBest), &dev);
        assert_eq!(out, vec![temp(-20.0, Some((50.0, 75.0))), ok("Temperature: -20.0 °C"), note("show least critical state")]);
    }

    #[test]
    fn device_status_counts_for_the_device_side() {
        let dev = DeviceReport {
            levels:       Some((10.0, 15.0)),
            levels_lower: Some((-25.0, -30.0)),
            status:       Some(State::Warn),
            status_name:  Some("banana".into()),
            ..Default::default()
        };
        let out = run(-20.0, &user(Some((50.0, 75.0)), Some((0.0, -10.0)), LevelPolicy::ShowBest), &dev);
        assert_eq!(out, vec![
            temp(-20.0, Some((10.0, 15.0))),
            ok("Temperature: -20.0 °C"),
            CheckResult::summary(State::Warn, "State on device: banana").into(),
            note("show least critical state"),
        ]);

        let dev = DeviceReport {
            levels:       Some((20.0, 25.0)),
            levels_lower: Some((1.0, -15.0)),
            status:       Some(State::Ok),
            status_name:  Some("banana".into()),
            ..Default::default()
        };
        let out = run(5.0, &user(Some((5.0, 10.0)), Some((0.0, -10.0)), LevelPolicy::ShowBest), &dev);
        assert_eq!(out[0], temp(5.0, Some((20.0, 25.0))));
        assert_eq!(out[2], CheckResult::notice(State::Ok, "State on device: banana").into());
    }

    #[test]
    fn trend_appears_once_both_counters_are_primed() {
        let cfg = TemperatureConfig { trend_compute: Some(TrendConfig { period: 30, ..Default::default() }), ..Default::default() };
        let mut store = MemoryStore::new();
        let mut at = |reading: f64, now: f64| {
            check_temperature(reading, &cfg, &DeviceReport::default(), Some("unique_name"), Some(&mut store), now)
                .unwrap()
                .outputs()
        };
        assert_eq!(at(0.0, 0.0).len(), 3);
        at(10.0, 900.0);
        assert_eq!(at(20.0, 1800.0), vec![
            temp(20.0, None),
            ok("Temperature: 20.0 °C"),
            ok("Temperature trend: +20.0 °C per 30 min"),
            note("prefer user levels over device levels (no levels found)"),
        ]);
        assert!(store.get("temp.unique_name.user.delta").is_some());
        assert!(store.get("temp.unique_name.dev.delta").is_some());
    }

    #[test]
    fn repeated_timestamp_reuses_the_stored_samples() {
        let cfg = TemperatureConfig {
            levels: Some((25.0, 35.0)),
            trend_compute: Some(TrendConfig { period: 10, ..Default::default() }),
            ..Default::default()
        };
        let mut store = MemoryStore::new();
        let at = |store: &mut MemoryStore, reading: f64, now: f64| {
            check_temperature(reading, &cfg, &DeviceReport::default(), Some("cpu"), Some(store), now)
                .unwrap()
                .outputs()
        };

        let first = at(&mut store, 30.0, 100.0);
        let primed = store.clone();
        let second = at(&mut store, 30.0, 100.0);
        assert_eq!(first, second);
        assert_eq!(first.len(), 3);
        assert_eq!(store.get("temp.cpu.user.delta"), primed.get("temp.cpu.user.delta"));
        assert_eq!(store.get("temp.cpu.dev.delta"), primed.get("temp.cpu.dev.delta"));

        // once a trend exists, repeating its timestamp must not invent a new rate
        assert_eq!(at(&mut store, 36.0, 700.0).len(), 4);
        let after = store.clone();
        let repeat = at(&mut store, 50.0, 700.0);
        assert_eq!(repeat.len(), 3);
        assert_eq!(store, after);
    }

    #[test]
    fn partial_trend_wiring_is_a_configuration_error() {
        let mut store = MemoryStore::new();
        let r = check_temperature(20.0, &TemperatureConfig::default(), &DeviceReport::default(), None, Some(&mut store), 0.0);
        assert_matches!(r, Err(CheckError::Configuration(_)));

        let r = check_temperature(20.0, &TemperatureConfig::default(), &DeviceReport::default(), Some("x"), None, 0.0);
        assert_matches!(r, Err(CheckError::Configuration(_)));

        let cfg = TemperatureConfig { trend_compute: Some(TrendConfig::default()), ..Default::default() };
        let r = check_temperature(20.0, &cfg, &DeviceReport::default(), None, None, 0.0);
        assert_matches!(r, Err(CheckError::Configuration(msg)) if msg.contains("unique name"));

        let r = check_temperature(20.0, &TemperatureConfig::default(), &DeviceReport::default(), None, None, 0.0);
        assert!(r.is_ok());
    }
}
