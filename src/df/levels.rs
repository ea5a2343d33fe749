//! Filesystem level semantics: percent vs. absolute, free vs. used,
//! size tiers and the magic factor.

use crate::error::{CheckError, Result};
use crate::levels::upper_state;
use crate::results::State;
use crate::util::human::{fmt_mb, fmt_pct};
use serde::{Deserialize, Serialize};

/// One configured threshold. Negative values mean "free space below".
///
/// In TOML: `{ percent = 80.0 }` or `{ mb = 2048 }`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    Percent(f64),
    /// Megabytes.
    #[serde(rename = "mb")]
    Absolute(f64),
}

impl Level {
    pub fn value(&self) -> f64 {
        match self {
            Level::Percent(v) | Level::Absolute(v) => *v,
        }
    }

    fn same_kind(&self, other: &Level) -> bool {
        matches!(
            (self, other),
            (Level::Percent(_), Level::Percent(_)) | (Level::Absolute(_), Level::Absolute(_))
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LevelPair {
    pub warn: Level,
    pub crit: Level,
}

/// Used when no size tier matches.
pub const NEVER_ALERT: LevelPair = LevelPair::percent(100.0, 100.0);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpaceSemantics {
    /// warn/crit are floors on free space
    FreeSpace,
    /// warn/crit are ceilings on used space
    UsedSpace,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RenderAs {
    Percent,
    Bytes,
}

impl LevelPair {
    pub const fn percent(warn: f64, crit: f64) -> Self {
        Self { warn: Level::Percent(warn), crit: Level::Percent(crit) }
    }

    pub const fn absolute(warn_mb: f64, crit_mb: f64) -> Self {
        Self { warn: Level::Absolute(warn_mb), crit: Level::Absolute(crit_mb) }
    }

    /// Free-space semantics when both values are negative, used-space when
    /// both are non-negative. Anything else is a configuration error.
    pub fn semantics(&self) -> Result<SpaceSemantics> {
        if !self.warn.same_kind(&self.crit) {
            return Err(CheckError::config(format!(
                "filesystem levels mix percent and absolute values: {:?}", self
            )));
        }
        match (self.warn.value() < 0.0, self.crit.value() < 0.0) {
            (true, true)   => Ok(SpaceSemantics::FreeSpace),
            (false, false) => Ok(SpaceSemantics::UsedSpace),
            _ => Err(CheckError::config(format!(
                "filesystem levels must both be negative (free space) or both non-negative (used space): {:?}",
                self
            ))),
        }
    }

    fn render_as(&self) -> RenderAs {
        match self.warn {
            Level::Percent(_)  => RenderAs::Percent,
            Level::Absolute(_) => RenderAs::Bytes,
        }
    }
}

/// Levels that apply to filesystems larger than `size_gb`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SizeTier {
    pub size_gb: f64,
    pub warn:    Level,
    pub crit:    Level,
}

/// Either one pair for every filesystem or a list of size tiers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LevelsConfig {
    Fixed(LevelPair),
    Tiered(Vec<SizeTier>),
}

impl Default for LevelsConfig {
    fn default() -> Self {
        LevelsConfig::Fixed(LevelPair::percent(80.0, 90.0))
    }
}

impl LevelsConfig {
    /// The pair for a filesystem of `size_gb`: the tier with the largest
    /// threshold that the size strictly exceeds, or [`NEVER_ALERT`].
    pub fn select(&self, size_gb: f64) -> LevelPair {
        match self {
            LevelsConfig::Fixed(pair) => *pair,
            LevelsConfig::Tiered(tiers) => {
                let mut sorted: Vec<&SizeTier> = tiers.iter().collect();
                sorted.sort_by(|a, b| b.size_gb.total_cmp(&a.size_gb));
                sorted
                    .into_iter()
                    .find(|t| size_gb > t.size_gb)
                    .map(|t| LevelPair { warn: t.warn, crit: t.crit })
                    .unwrap_or_else(|| {
                        tracing::debug!(size_gb, "no size tier matched, levels disabled");
                        NEVER_ALERT
                    })
            }
        }
    }
}

/// Size-relative adjustment of percentage levels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Magic {
    pub factor:      f64,
    pub normsize_gb: f64,
    /// Lowest used-percent levels the adjustment may produce.
    pub levels_low:  (f64, f64),
}

/// The magic factor must lie in (0, 1].
pub fn check_magic_factor(factor: f64) -> Result<()> {
    if factor > 0.0 && factor <= 1.0 {
        Ok(())
    } else {
        Err(CheckError::config(format!("magic factor must be in (0, 1], got {}", factor)))
    }
}

/// Rescale a used-percent level for a filesystem of `size_gb`.
///
/// Filesystems larger than `normsize_gb` get more lenient levels, smaller
/// ones stricter levels; the result never drops below `minimum`.
pub fn magic_adjust(level_percent: f64, size_gb: f64, normsize_gb: f64, factor: f64, minimum: f64) -> f64 {
    let relative = size_gb / normsize_gb;
    let true_factor = relative.powf(factor) / relative;
    (100.0 - (100.0 - level_percent) * true_factor).max(minimum)
}

/// Effective levels for one filesystem, normalised to used-space ceilings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilesystemLevels {
    pub semantics:         SpaceSemantics,
    pub render_as:         RenderAs,
    pub warn_used_mb:      f64,
    pub crit_used_mb:      f64,
    pub warn_used_percent: f64,
    pub crit_used_percent: f64,
    pub size_mb:           f64,
    pub magic_factor:      Option<f64>,
}

impl FilesystemLevels {
    pub fn used_ceilings_mb(&self) -> (f64, f64) {
        (self.warn_used_mb, self.crit_used_mb)
    }

    pub fn used_ceilings_percent(&self) -> (f64, f64) {
        (self.warn_used_percent, self.crit_used_percent)
    }

    /// Free-space floors, the form free-space levels were configured in.
    pub fn free_floors_mb(&self) -> (f64, f64) {
        (self.size_mb - self.warn_used_mb, self.size_mb - self.crit_used_mb)
    }

    pub fn free_floors_percent(&self) -> (f64, f64) {
        (100.0 - self.warn_used_percent, 100.0 - self.crit_used_percent)
    }

    pub fn classify(&self, used_mb: f64) -> State {
        upper_state(used_mb, Some(self.used_ceilings_mb()))
    }

    /// "(warn/crit at 80.00%/90.00%)" and friends.
    pub fn text(&self) -> String {
        let (verb, suffix, (w_pct, c_pct), (w_mb, c_mb)) = match self.semantics {
            SpaceSemantics::UsedSpace => ("at", "", self.used_ceilings_percent(), self.used_ceilings_mb()),
            SpaceSemantics::FreeSpace => ("below", " free", self.free_floors_percent(), self.free_floors_mb()),
        };
        let (warn, crit) = match self.render_as {
            RenderAs::Percent => (fmt_pct(w_pct), fmt_pct(c_pct)),
            RenderAs::Bytes   => (fmt_mb(w_mb), fmt_mb(c_mb)),
        };
        match self.magic_factor {
            Some(f) => format!("(warn/crit {} {}/{}{}, magic factor {})", verb, warn, crit, suffix, f),
            None    => format!("(warn/crit {} {}/{}{})", verb, warn, crit, suffix),
        }
    }
}

/// Resolve the configured levels for a filesystem of `size_mb`.
pub fn filesystem_levels(levels: &LevelsConfig, size_mb: f64, magic: Option<&Magic>) -> Result<FilesystemLevels> {
    let size_gb = size_mb / 1024.0;
    let pair = levels.select(size_gb);
    let semantics = pair.semantics()?;
    if let Some(m) = magic {
        check_magic_factor(m.factor)?;
    }

    // used-space ceiling in MB, exact for absolute levels
    let used_mb = |level: Level| match level {
        Level::Percent(p) if p < 0.0 => (100.0 + p) * size_mb / 100.0,
        Level::Percent(p)            => p * size_mb / 100.0,
        Level::Absolute(mb) if mb < 0.0 => size_mb + mb,
        Level::Absolute(mb)             => mb,
    };
    let used_pct = |level: Level| match level {
        Level::Percent(p) if p < 0.0 => 100.0 + p,
        Level::Percent(p)            => p,
        Level::Absolute(_)           => used_mb(level) * 100.0 / size_mb,
    };

    let magic = magic.filter(|m| m.factor != 1.0);
    let (warn_pct, crit_pct, warn_mb, crit_mb) = match magic {
        Some(m) => {
            let warn = magic_adjust(used_pct(pair.warn), size_gb, m.normsize_gb, m.factor, m.levels_low.0);
            let crit = magic_adjust(used_pct(pair.crit), size_gb, m.normsize_gb, m.factor, m.levels_low.1);
            tracing::debug!(size_gb, factor = m.factor, warn, crit, "magic factor applied");
            (warn, crit, warn * size_mb / 100.0, crit * size_mb / 100.0)
        }
        None => (used_pct(pair.warn), used_pct(pair.crit), used_mb(pair.warn), used_mb(pair.crit)),
    };

    Ok(FilesystemLevels {
        semantics,
        render_as: pair.render_as(),
        warn_used_mb: warn_mb,
        crit_used_mb: crit_mb,
        warn_used_percent: warn_pct,
        crit_used_percent: crit_pct,
        size_mb,
        magic_factor: magic.map(|m| m.factor),
    })
}
