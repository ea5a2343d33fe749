//! Upper/lower level evaluation shared by both engines.

use crate::results::{CheckResult, State};

/// A `(warn, crit)` pair in the unit of the value it is compared against.
pub type Levels = (f64, f64);

/// `value >= crit` is CRIT, `value >= warn` is WARN.
pub fn upper_state(value: f64, levels: Option<Levels>) -> State {
    match levels {
        Some((_, crit)) if value >= crit => State::Crit,
        Some((warn, _)) if value >= warn => State::Warn,
        _                                => State::Ok,
    }
}

/// `value < crit` is CRIT, `value < warn` is WARN.
pub fn lower_state(value: f64, levels: Option<Levels>) -> State {
    match levels {
        Some((_, crit)) if value < crit => State::Crit,
        Some((warn, _)) if value < warn => State::Warn,
        _                               => State::Ok,
    }
}

/// Evaluate `value` against optional upper and lower levels.
///
/// The text is `"{label}: {value}"`, followed by the levels that fired when
/// the state is not OK. Upper levels win over lower levels when both fire.
pub fn check_levels<F>(
    value:  f64,
    upper:  Option<Levels>,
    lower:  Option<Levels>,
    render: F,
    label:  &str,
) -> CheckResult
where
    F: Fn(f64) -> String,
{
    let rendered = render(value);
    let mut text = if label.is_empty() { rendered } else { format!("{}: {}", label, rendered) };

    let up = upper_state(value, upper);
    let low = lower_state(value, lower);
    let state = if up != State::Ok {
        if let Some((w, c)) = upper {
            text.push_str(&format!(" (warn/crit at {}/{})", render(w), render(c)));
        }
        up
    } else if low != State::Ok {
        if let Some((w, c)) = lower {
            text.push_str(&format!(" (warn/crit below {}/{})", render(w), render(c)));
        }
        low
    } else {
        State::Ok
    };

    CheckResult::summary(state, text)
}
