use crate::levels::upper_state;
use crate::models::filesystem::InodeCounts;
use crate::results::{CheckResult, Metric, Output, State};
use crate::util::human::{fmt_count, fmt_pct};
use serde::{Deserialize, Serialize};

/// Floor on free inodes: `{ percent = 10.0 }` or `{ count = 5000 }`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InodeLevel {
    Percent(f64),
    Count(f64),
}

impl InodeLevel {
    fn free_floor(&self, total: f64) -> f64 {
        match self {
            InodeLevel::Percent(p) => p * total / 100.0,
            InodeLevel::Count(n)   => *n,
        }
    }

    fn render(&self) -> String {
        match self {
            InodeLevel::Percent(p) => fmt_pct(*p),
            InodeLevel::Count(n)   => fmt_count(*n),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InodeLevels {
    pub warn: InodeLevel,
    pub crit: InodeLevel,
}

impl Default for InodeLevels {
    fn default() -> Self {
        Self { warn: InodeLevel::Percent(10.0), crit: InodeLevel::Percent(5.0) }
    }
}

/// Config form of `Option<InodeLevels>`: a levels table, or a plain
/// `false` to switch the inode check off (`true` keeps the defaults).
pub(crate) mod toggle {
    use super::InodeLevels;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Enabled(bool),
        Levels(InodeLevels),
    }

    pub fn serialize<S: Serializer>(levels: &Option<InodeLevels>, s: S) -> Result<S::Ok, S::Error> {
        match levels {
            Some(levels) => levels.serialize(s),
            None         => s.serialize_bool(false),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<InodeLevels>, D::Error> {
        Ok(match Repr::deserialize(d)? {
            Repr::Enabled(true)  => Some(InodeLevels::default()),
            Repr::Enabled(false) => None,
            Repr::Levels(levels) => Some(levels),
        })
    }
}

/// When the inode line goes to the summary instead of the details.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShowInodes {
    Always,
    #[default]
    OnLow,
    OnProblem,
}

/// Inode usage against free-inode floors. Nothing is reported for
/// filesystems without inodes (total 0).
pub fn check_inodes(inodes: &InodeCounts, levels: &InodeLevels, show: ShowInodes) -> Vec<Output> {
    let total = inodes.total;
    if total <= 0.0 {
        return Vec::new();
    }

    let ceilings = (total - levels.warn.free_floor(total), total - levels.crit.free_floor(total));
    let used = inodes.used();
    let state = upper_state(used, Some(ceilings));
    let free_pct = inodes.avail / total * 100.0;

    let mut text = format!(
        "Inodes used: {} ({}), available: {} ({})",
        fmt_count(used),
        fmt_pct(100.0 - free_pct),
        fmt_count(inodes.avail),
        fmt_pct(free_pct),
    );
    if state != State::Ok {
        text.push_str(&format!(" (warn/crit below {}/{} free)", levels.warn.render(), levels.crit.render()));
    }

    let visible = match show {
        ShowInodes::Always    => true,
        ShowInodes::OnProblem => state != State::Ok,
        ShowInodes::OnLow     => state != State::Ok || free_pct < 50.0,
    };
    let result = if visible { CheckResult::summary(state, text) } else { CheckResult::notice(state, text) };

    vec![
        Metric::new("inodes_used", used)
            .with_levels(Some(ceilings))
            .with_boundaries(0.0, total)
            .into(),
        result.into(),
    ]
}
