use super::units::{render_temp_delta, TempUnit};
use crate::error::Result;
use crate::levels::{check_levels, Levels};
use crate::results::CheckResult;
use crate::store::{get_average, get_rate, ValueStore};
use crate::util::human::fmt_timespan;
use serde::{Deserialize, Serialize};

/// Trend settings. Levels are in °C per `period`; cooling levels are
/// entered as positive magnitudes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrendConfig {
    /// Minutes.
    pub period:             u32,
    #[serde(default)]
    pub trend_levels:       Option<Levels>,
    #[serde(default)]
    pub trend_levels_lower: Option<Levels>,
    /// Minutes left until the crit limit, lower levels.
    #[serde(default)]
    pub trend_timeleft:     Option<Levels>,
}

impl Default for TrendConfig {
    fn default() -> Self {
        Self { period: 30, trend_levels: None, trend_levels_lower: None, trend_timeleft: None }
    }
}

/// Temperature trend for `name` plus the time until `crit` (warming) or
/// `crit_lower` (cooling) is reached.
///
/// Fails with `InsufficientData` while the rate counter is being primed.
pub fn check_trend(
    store:       &mut dyn ValueStore,
    temp:        f64,
    config:      &TrendConfig,
    output_unit: TempUnit,
    crit:        Option<f64>,
    crit_lower:  Option<f64>,
    name:        &str,
    now:         f64,
) -> Result<Vec<CheckResult>> {
    let rate = get_rate(store, &format!("temp.{}.delta", name), now, temp)?;
    let period = f64::from(config.period.max(1));
    let rate_avg = get_average(store, &format!("temp.{}.trend", name), now, rate, period);
    let trend = rate_avg * period * 60.0;

    let lower = config.trend_levels_lower.map(|(w, c)| (-w.abs(), -c.abs()));
    let render = |delta: f64| format!("{} per {} min", render_temp_delta(delta, output_unit), config.period);
    let mut results = vec![check_levels(trend, config.trend_levels, lower, render, "Temperature trend")];

    if let Some((warn_min, crit_min)) = config.trend_timeleft {
        let limit = if trend > 0.0 { crit } else { crit_lower };
        match limit {
            Some(limit) if rate_avg != 0.0 => {
                let seconds = ((limit - temp) / rate_avg).max(0.0);
                if seconds.is_finite() {
                    results.push(check_levels(
                        seconds,
                        None,
                        Some((warn_min * 60.0, crit_min * 60.0)),
                        fmt_timespan,
                        "Time until temperature limit reached",
                    ));
                }
            }
            _ => tracing::debug!(name, trend, "no limit to project the trend onto"),
        }
    }

    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CheckError;
    use crate::results::State;
    use crate::store::MemoryStore;
    use assert_matches::assert_matches;

    fn primed(last: f64) -> MemoryStore {
        let mut store = MemoryStore::new();
        store.set("temp.my_test.delta", 0.0, last);
        store
    }

    fn timeleft(levels: Levels) -> TrendConfig {
        TrendConfig {
            period:             1,
            trend_levels:       Some((50.0, 55.0)),
            trend_levels_lower: Some((-50.0, -55.0)),
            trend_timeleft:     Some(levels),
        }
    }

    #[test]
    fn unprimed_counter_is_not_enough_data() {
        let mut store = MemoryStore::new();
        let cfg = TrendConfig { period: 2, ..Default::default() };
        let r = check_trend(&mut store, 23.0, &cfg, TempUnit::Celsius, None, None, "my_test", 60.0);
        assert_matches!(r, Err(CheckError::InsufficientData(_)));
    }

    #[test]
    fn trend_over_the_period() {
        let mut store = primed(17.0);
        let cfg = TrendConfig { period: 2, ..Default::default() };
        let r = check_trend(&mut store, 23.0, &cfg, TempUnit::Celsius, Some(0.0), Some(0.0), "my_test", 60.0).unwrap();
        assert_eq!(r, vec![CheckResult::summary(State::Ok, "Temperature trend: +12.0 °C per 2 min")]);
    }

    #[test]
    fn warming_trend_levels() {
        let mut store = primed(17.0);
        let cfg = TrendConfig { period: 2, trend_levels: Some((10.0, 15.0)), ..Default::default() };
        let r = check_trend(&mut store, 23.0, &cfg, TempUnit::Celsius, None, None, "my_test", 60.0).unwrap();
        assert_eq!(r[0].state, State::Warn);
        assert_eq!(
            r[0].text,
            "Temperature trend: +12.0 °C per 2 min (warn/crit at +10.0 °C per 2 min/+15.0 °C per 2 min)"
        );
    }

    #[test]
    fn cooling_levels_are_negated() {
        let mut store = primed(29.0);
        let cfg = TrendConfig { period: 2, trend_levels_lower: Some((5.0, 10.0)), ..Default::default() };
        let r = check_trend(&mut store, 23.0, &cfg, TempUnit::Celsius, None, None, "my_test", 60.0).unwrap();
        assert_eq!(r[0].state, State::Crit);
        assert_eq!(
            r[0].text,
            "Temperature trend: -12.0 °C per 2 min (warn/crit below -5.0 °C per 2 min/-10.0 °C per 2 min)"
        );
    }

    #[test]
    fn time_until_upper_limit() {
        let mut store = primed(5.0);
        let r = check_trend(&mut store, 10.0, &timeleft((5.0, 2.0)), TempUnit::Celsius, Some(40.0), Some(0.0), "my_test", 60.0).unwrap();
        assert_eq!(r, vec![
            CheckResult::summary(State::Ok, "Temperature trend: +5.0 °C per 1 min"),
            CheckResult::summary(State::Ok, "Time until temperature limit reached: 6 minutes 0 seconds"),
        ]);

        let mut store = primed(5.0);
        let r = check_trend(&mut store, 10.0, &timeleft((7.0, 2.0)), TempUnit::Celsius, Some(40.0), Some(0.0), "my_test", 60.0).unwrap();
        assert_eq!(r[1].state, State::Warn);
        assert_eq!(
            r[1].text,
            "Time until temperature limit reached: 6 minutes 0 seconds (warn/crit below 7 minutes 0 seconds/2 minutes 0 seconds)"
        );
    }

    #[test]
    fn limit_already_passed_is_zero_seconds() {
        let cfg = TrendConfig {
            period:             1,
            trend_levels:       Some((3.0, 5.0)),
            trend_levels_lower: Some((10.0, 15.0)),
            trend_timeleft:     Some((120.0, 60.0)),
        };
        let mut store = primed(10.0);
        let r = check_trend(&mut store, 67.0, &cfg, TempUnit::Celsius, Some(60.0), Some(0.0), "my_test", 60.0).unwrap();
        assert_eq!(r[0].state, State::Crit);
        assert_eq!(r[1], CheckResult::summary(
            State::Crit,
            "Time until temperature limit reached: 0 seconds (warn/crit below 2 hours 0 minutes/1 hour 0 minutes)",
        ));

        let mut store = primed(27.0);
        let r = check_trend(&mut store, 25.0, &cfg, TempUnit::Celsius, Some(60.0), Some(30.0), "my_test", 60.0).unwrap();
        assert_eq!(r[0], CheckResult::summary(State::Ok, "Temperature trend: -2.0 °C per 1 min"));
        assert_eq!(r[1].state, State::Crit);
    }

    #[test]
    fn steady_temperature_has_no_time_left() {
        let mut store = primed(20.0);
        let r = check_trend(&mut store, 20.0, &timeleft((5.0, 2.0)), TempUnit::Celsius, Some(40.0), Some(0.0), "my_test", 60.0).unwrap();
        assert_eq!(r.len(), 1);
    }
}
