//! Filesystem capacity checks.
//!
//! One pipeline per call: reject degenerate sizes, compute used space
//! against the allocatable size, resolve levels (tiers, free/used, magic
//! factor), classify, then append reserved space, size trend and inodes.

pub mod group;
pub mod inodes;
pub mod levels;
pub mod trend;

use crate::error::Result;
use crate::levels::Levels;
use crate::models::filesystem::{FilesystemBlock, InodeCounts};
use crate::results::{CheckResult, Metric, Output, State};
use crate::store::ValueStore;
use crate::util::human::{fmt_mb, fmt_pct};
use group::FilesystemGroup;
use inodes::{check_inodes, InodeLevels, ShowInodes};
use levels::{check_magic_factor, filesystem_levels, LevelPair, LevelsConfig, Magic};
use serde::{Deserialize, Serialize};

/// When the levels are appended to the "Used:" line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShowLevels {
    #[default]
    OnMagic,
    Always,
    OnProblem,
}

impl ShowLevels {
    fn shows(&self, state: State, magic_active: bool) -> bool {
        match self {
            ShowLevels::Always    => true,
            ShowLevels::OnProblem => state != State::Ok,
            ShowLevels::OnMagic   => state != State::Ok || magic_active,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilesystemConfig {
    pub levels:               LevelsConfig,
    /// Magic factor in (0, 1]; 1.0 or unset disables the adjustment.
    pub magic:                Option<f64>,
    /// Reference size in GB for the magic factor.
    pub magic_normsize:       f64,
    /// Lowest used-percent levels the magic factor may produce.
    pub levels_low:           Levels,
    pub subtract_reserved:    bool,
    pub show_reserved:        bool,
    pub show_levels:          ShowLevels,
    /// `false` in the config file disables the inode check.
    #[serde(with = "inodes::toggle")]
    pub inodes_levels:        Option<InodeLevels>,
    pub show_inodes:          ShowInodes,
    /// Hours; `None` disables the size trend.
    pub trend_range:          Option<f64>,
    pub trend_perfdata:       bool,
    /// Growth per trend range, MB.
    pub trend_mb:             Option<Levels>,
    /// Growth per trend range, percent of size.
    pub trend_perc:           Option<Levels>,
    pub trend_shrinking_mb:   Option<Levels>,
    pub trend_shrinking_perc: Option<Levels>,
    /// Hours left until full, lower levels.
    pub trend_timeleft:       Option<Levels>,
    pub trend_showtimeleft:   bool,
    pub groups:               Vec<FilesystemGroup>,
}

impl Default for FilesystemConfig {
    fn default() -> Self {
        Self {
            levels:               LevelsConfig::default(),
            magic:                None,
            magic_normsize:       20.0,
            levels_low:           (50.0, 60.0),
            subtract_reserved:    false,
            show_reserved:        false,
            show_levels:          ShowLevels::default(),
            inodes_levels:        Some(InodeLevels::default()),
            show_inodes:          ShowInodes::default(),
            trend_range:          Some(24.0),
            trend_perfdata:       true,
            trend_mb:             None,
            trend_perc:           None,
            trend_shrinking_mb:   None,
            trend_shrinking_perc: None,
            trend_timeleft:       None,
            trend_showtimeleft:   false,
            groups:               Vec::new(),
        }
    }
}

impl FilesystemConfig {
    /// Reject values that would only fail once a filesystem is checked.
    pub fn validate(&self) -> Result<()> {
        if let Some(factor) = self.magic {
            check_magic_factor(factor)?;
        }
        match &self.levels {
            LevelsConfig::Fixed(pair) => {
                pair.semantics()?;
            }
            LevelsConfig::Tiered(tiers) => {
                for tier in tiers {
                    LevelPair { warn: tier.warn, crit: tier.crit }.semantics()?;
                }
            }
        }
        Ok(())
    }

    fn magic(&self) -> Option<Magic> {
        self.magic.map(|factor| Magic {
            factor,
            normsize_gb: self.magic_normsize,
            levels_low:  self.levels_low,
        })
    }
}

/// Check one filesystem.
///
/// `key` identifies the filesystem in the value store (usually the
/// mountpoint). Only configuration mistakes are errors.
pub fn check_filesystem(
    key:    &str,
    block:  &FilesystemBlock,
    inodes: Option<&InodeCounts>,
    config: &FilesystemConfig,
    store:  &mut dyn ValueStore,
    now:    f64,
) -> Result<Vec<Output>> {
    let (Some(size_mb), Some(avail_mb), Some(reserved_mb)) = (block.size_mb, block.avail_mb, block.reserved_mb) else {
        tracing::debug!(key, ?block, "incomplete size information");
        return Ok(vec![CheckResult::summary(State::Ok, "no filesystem size information").into()]);
    };
    if size_mb == 0.0 {
        tracing::warn!(key, "filesystem reports a size of 0");
        return Ok(vec![CheckResult::summary(State::Warn, "Size of filesystem is 0 B").into()]);
    }

    let allocatable_mb = if config.subtract_reserved && reserved_mb > 0.0 {
        size_mb - reserved_mb
    } else {
        size_mb
    };
    if allocatable_mb <= 0.0 {
        tracing::warn!(key, size_mb, reserved_mb, "no space left after subtracting reserved blocks");
        return Ok(vec![CheckResult::summary(
            State::Warn,
            format!("No allocatable space: {} reserved for root of {}", fmt_mb(reserved_mb), fmt_mb(size_mb)),
        )
        .into()]);
    }
    let used_mb = allocatable_mb - avail_mb;

    let levels = filesystem_levels(&config.levels, allocatable_mb, config.magic().as_ref())?;
    let state = levels.classify(used_mb);
    let used_pct = used_mb / allocatable_mb * 100.0;

    let mut summary = format!("Used: {} - {} of {}", fmt_pct(used_pct), fmt_mb(used_mb), fmt_mb(allocatable_mb));
    if config.show_levels.shows(state, levels.magic_factor.is_some()) {
        summary.push(' ');
        summary.push_str(&levels.text());
    }

    let mut out: Vec<Output> = vec![
        Metric::new("fs_used", used_mb)
            .with_levels(Some(levels.used_ceilings_mb()))
            .with_boundaries(0.0, allocatable_mb)
            .into(),
        Metric::new("fs_free", avail_mb).with_boundaries(0.0, allocatable_mb).into(),
        Metric::new("fs_used_percent", used_pct)
            .with_levels(Some(levels.used_ceilings_percent()))
            .with_boundaries(0.0, 100.0)
            .into(),
        CheckResult::summary(state, summary).into(),
        Metric::new("fs_size", size_mb).with_boundaries(0.0, size_mb).into(),
    ];

    if config.show_reserved && reserved_mb > 0.0 {
        let text = if config.subtract_reserved {
            format!("Additionally reserved for root: {}", fmt_mb(reserved_mb))
        } else {
            format!("therein reserved for root: {} ({})", fmt_pct(reserved_mb / size_mb * 100.0), fmt_mb(reserved_mb))
        };
        out.push(CheckResult::summary(State::Ok, text).into());
        out.push(Metric::new("fs_reserved", reserved_mb).into());
    }

    if let Some(range_hours) = config.trend_range.filter(|h| *h > 0.0) {
        out.extend(trend::size_trend(store, key, config, range_hours, used_mb, allocatable_mb, now));
    }

    if let (Some(inodes), Some(inode_levels)) = (inodes, &config.inodes_levels) {
        out.extend(check_inodes(inodes, inode_levels, config.show_inodes));
    }

    tracing::debug!(key, used_mb, allocatable_mb, state = state.label(), "filesystem checked");
    Ok(out)
}
