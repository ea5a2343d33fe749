//! Filesystem growth trend and time left until full.

use super::FilesystemConfig;
use crate::levels::{check_levels, Levels};
use crate::results::{CheckResult, Metric, Output, State};
use crate::store::{get_average, get_rate, ValueStore};
use crate::util::human::{fmt_bytes_signed, fmt_timespan, MB};

// ── Level helpers ──────────────────────────────────────────────────────────

/// Both representations given: the stricter one wins.
fn stricter_upper(a: Option<Levels>, b: Option<Levels>) -> Option<Levels> {
    match (a, b) {
        (Some(a), Some(b)) => Some((a.0.min(b.0), a.1.min(b.1))),
        (a, b)             => a.or(b),
    }
}

fn stricter_lower(a: Option<Levels>, b: Option<Levels>) -> Option<Levels> {
    match (a, b) {
        (Some(a), Some(b)) => Some((a.0.max(b.0), a.1.max(b.1))),
        (a, b)             => a.or(b),
    }
}

fn percent_to_mb(levels: Option<Levels>, size_mb: f64) -> Option<Levels> {
    levels.map(|(w, c)| (w * size_mb / 100.0, c * size_mb / 100.0))
}

fn negated(levels: Option<Levels>) -> Option<Levels> {
    levels.map(|(w, c)| (-w.abs(), -c.abs()))
}

// ── Trend ──────────────────────────────────────────────────────────────────

/// Growth of `used_mb` per `range_hours`, averaged over the same range.
///
/// The first sample for `key` only primes the counters: nothing is reported.
pub fn size_trend(
    store:       &mut dyn ValueStore,
    key:         &str,
    config:      &FilesystemConfig,
    range_hours: f64,
    used_mb:     f64,
    size_mb:     f64,
    now:         f64,
) -> Vec<Output> {
    let rate = match get_rate(store, &format!("{}.delta", key), now, used_mb) {
        Ok(rate) => rate,
        Err(e) => {
            tracing::debug!(key, error = %e, "size trend skipped");
            return Vec::new();
        }
    };

    let range_secs = range_hours * 3600.0;
    let rate_avg = get_average(store, &format!("{}.trend", key), now, rate, range_secs / 60.0);
    let trend_mb = rate_avg * range_secs;
    let trend_perc = trend_mb / size_mb * 100.0;

    let upper = stricter_upper(config.trend_mb, percent_to_mb(config.trend_perc, size_mb));
    let lower = stricter_lower(
        negated(config.trend_shrinking_mb),
        negated(percent_to_mb(config.trend_shrinking_perc, size_mb)),
    );

    let mut out: Vec<Output> = Vec::new();
    if config.trend_perfdata {
        // graphs always show growth per day
        let per_day = 24.0 / range_hours;
        out.push(Metric::new("growth", rate * 86_400.0).into());
        out.push(
            Metric::new("trend", trend_mb * per_day)
                .with_levels(upper.map(|(w, c)| (w * per_day, c * per_day)))
                .into(),
        );
    }

    let label = format!("Trend per {}", fmt_timespan(range_secs));
    let mut trend = check_levels(trend_mb, upper, lower, |mb| fmt_bytes_signed(mb * MB), &label);
    trend.text = match trend.text.split_once(" (warn/crit") {
        Some((head, tail)) => format!("{} ({:+.2}%) (warn/crit{}", head, trend_perc, tail),
        None               => format!("{} ({:+.2}%)", trend.text, trend_perc),
    };
    out.push(trend.into());

    if trend_mb > 0.0 {
        let secs_left = (size_mb - used_mb).max(0.0) / rate_avg;
        if secs_left.is_finite() {
            if config.trend_perfdata {
                out.push(Metric::new("trend_hoursleft", secs_left / 3600.0).into());
            }
            match config.trend_timeleft {
                Some((w, c)) => {
                    let lower = Some((w * 3600.0, c * 3600.0));
                    out.push(check_levels(secs_left, None, lower, fmt_timespan, "Time left until disk full").into());
                }
                None if config.trend_showtimeleft => {
                    let text = format!("Time left until disk full: {}", fmt_timespan(secs_left));
                    out.push(CheckResult::summary(State::Ok, text).into());
                }
                None => {}
            }
        }
    } else if trend_mb < 0.0 && config.trend_showtimeleft {
        let secs_left = used_mb / -rate_avg;
        if secs_left.is_finite() {
            let text = format!("Time left until disk empty: {}", fmt_timespan(secs_left));
            out.push(CheckResult::notice(State::Ok, text).into());
        }
    }

    tracing::debug!(key, rate, rate_avg, trend_mb, "size trend");
    out
}
