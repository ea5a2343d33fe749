use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Monitoring state of a single result.
///
/// Ordering follows criticality as the monitoring core sees it:
/// OK < WARN < UNKNOWN < CRIT.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum State {
    #[default]
    Ok,
    Warn,
    Crit,
    Unknown,
}

impl State {
    pub fn label(&self) -> &'static str {
        match self {
            State::Ok      => "OK",
            State::Warn    => "WARN",
            State::Crit    => "CRIT",
            State::Unknown => "UNKNOWN",
        }
    }

    /// Plugin exit code (Nagios convention).
    pub fn exit_code(&self) -> i32 {
        match self {
            State::Ok      => 0,
            State::Warn    => 1,
            State::Crit    => 2,
            State::Unknown => 3,
        }
    }

    fn rank(&self) -> u8 {
        match self {
            State::Ok      => 0,
            State::Warn    => 1,
            State::Unknown => 2,
            State::Crit    => 3,
        }
    }

    pub fn worst(self, other: State) -> State {
        if other > self { other } else { self }
    }

    pub fn best(self, other: State) -> State {
        if other < self { other } else { self }
    }

    pub fn worst_of<I: IntoIterator<Item = State>>(states: I) -> State {
        states.into_iter().fold(State::Ok, State::worst)
    }
}

impl PartialOrd for State {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for State {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rank().cmp(&other.rank())
    }
}

/// One human-readable line of check output.
///
/// `notice_only` results go to the long output only; the summary line
/// skips them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckResult {
    pub state:       State,
    pub text:        String,
    #[serde(default)]
    pub notice_only: bool,
}

impl CheckResult {
    pub fn summary(state: State, text: impl Into<String>) -> Self {
        Self { state, text: text.into(), notice_only: false }
    }

    pub fn notice(state: State, text: impl Into<String>) -> Self {
        Self { state, text: text.into(), notice_only: true }
    }
}

/// A numeric value for graphing, with optional levels and boundaries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metric {
    pub name:       String,
    pub value:      f64,
    pub levels:     Option<(f64, f64)>,
    pub boundaries: Option<(f64, f64)>,
}

impl Metric {
    pub fn new(name: impl Into<String>, value: f64) -> Self {
        Self { name: name.into(), value, levels: None, boundaries: None }
    }

    pub fn with_levels(mut self, levels: Option<(f64, f64)>) -> Self {
        self.levels = levels;
        self
    }

    pub fn with_boundaries(mut self, min: f64, max: f64) -> Self {
        self.boundaries = Some((min, max));
        self
    }

    /// Perfdata token: `name=value;warn;crit;min;max`.
    pub fn perfdata(&self) -> String {
        let (warn, crit) = match self.levels {
            Some((w, c)) => (fmt_num(w), fmt_num(c)),
            None         => (String::new(), String::new()),
        };
        let (min, max) = match self.boundaries {
            Some((lo, hi)) => (fmt_num(lo), fmt_num(hi)),
            None           => (String::new(), String::new()),
        };
        let token = format!("{}={};{};{};{};{}", self.name, fmt_num(self.value), warn, crit, min, max);
        token.trim_end_matches(';').to_string()
    }
}

fn fmt_num(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 { format!("{}", v as i64) } else { format!("{}", v) }
}

/// Everything a check emits, in emission order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Output {
    Result(CheckResult),
    Metric(Metric),
}

impl From<CheckResult> for Output {
    fn from(r: CheckResult) -> Self { Output::Result(r) }
}

impl From<Metric> for Output {
    fn from(m: Metric) -> Self { Output::Metric(m) }
}

impl Output {
    pub fn as_result(&self) -> Option<&CheckResult> {
        match self {
            Output::Result(r) => Some(r),
            Output::Metric(_) => None,
        }
    }

    pub fn as_metric(&self) -> Option<&Metric> {
        match self {
            Output::Metric(m) => Some(m),
            Output::Result(_) => None,
        }
    }
}

pub fn results(outputs: &[Output]) -> impl Iterator<Item = &CheckResult> {
    outputs.iter().filter_map(Output::as_result)
}

pub fn metrics(outputs: &[Output]) -> impl Iterator<Item = &Metric> {
    outputs.iter().filter_map(Output::as_metric)
}

/// Overall state of a check: the worst of its results.
pub fn overall_state(outputs: &[Output]) -> State {
    State::worst_of(results(outputs).map(|r| r.state))
}

/// Render outputs as plugin text: summary line, perfdata, then long output.
///
/// Non-OK results are marked `(!)` / `(!!)` / `(?)` like the monitoring core does.
pub fn plugin_output(outputs: &[Output]) -> String {
    let marked = |r: &CheckResult| match r.state {
        State::Ok      => r.text.clone(),
        State::Warn    => format!("{} (!)", r.text),
        State::Crit    => format!("{} (!!)", r.text),
        State::Unknown => format!("{} (?)", r.text),
    };

    let summary: Vec<String> = results(outputs)
        .filter(|r| !r.notice_only && !r.text.is_empty())
        .map(marked)
        .collect();
    let perf: Vec<String> = metrics(outputs).map(Metric::perfdata).collect();

    let mut out = summary.join(", ");
    if !perf.is_empty() {
        out.push_str(" | ");
        out.push_str(&perf.join(" "));
    }
    for r in results(outputs).filter(|r| !r.text.is_empty()) {
        out.push('\n');
        out.push_str(&marked(r));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crit_outranks_unknown() {
        assert!(State::Crit > State::Unknown);
        assert!(State::Unknown > State::Warn);
        assert_eq!(State::worst_of([State::Ok, State::Unknown, State::Warn]), State::Unknown);
        assert_eq!(State::Crit.best(State::Warn), State::Warn);
    }

    #[test]
    fn empty_outputs_are_ok() {
        assert_eq!(overall_state(&[]), State::Ok);
    }

    #[test]
    fn perfdata_drops_trailing_separators() {
        assert_eq!(Metric::new("temp", 23.5).perfdata(), "temp=23.5");
        let m = Metric::new("fs_used", 800.0).with_levels(Some((800.0, 900.0))).with_boundaries(0.0, 1000.0);
        assert_eq!(m.perfdata(), "fs_used=800;800;900;0;1000");
    }

    #[test]
    fn plugin_output_hides_notices_from_summary() {
        let outputs = vec![
            Output::from(Metric::new("temp", 30.0)),
            Output::from(CheckResult::summary(State::Warn, "Temperature: 30.0 °C")),
            Output::from(CheckResult::notice(State::Ok, "Configuration: only use user levels")),
        ];
        let text = plugin_output(&outputs);
        let first = text.lines().next().unwrap();
        assert_eq!(first, "Temperature: 30.0 °C (!) | temp=30");
        assert!(text.contains("\nConfiguration: only use user levels"));
    }
}
