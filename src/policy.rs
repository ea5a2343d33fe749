//! Reconciliation of user-configured and device-reported levels.

use crate::error::{CheckError, Result};
use crate::results::State;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// How to choose between user levels and device levels.
///
/// Config names: `usr`, `dev`, `usrdefault`, `devdefault`, `best`, `worst`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(try_from = "String")]
pub enum LevelPolicy {
    UseUser,
    UseDevice,
    #[default]
    PreferUserThenDevice,
    PreferDeviceThenUser,
    ShowBest,
    ShowWorst,
}

impl LevelPolicy {
    pub const ALL: [LevelPolicy; 6] = [
        LevelPolicy::UseUser,
        LevelPolicy::UseDevice,
        LevelPolicy::PreferUserThenDevice,
        LevelPolicy::PreferDeviceThenUser,
        LevelPolicy::ShowBest,
        LevelPolicy::ShowWorst,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            LevelPolicy::UseUser              => "usr",
            LevelPolicy::UseDevice            => "dev",
            LevelPolicy::PreferUserThenDevice => "usrdefault",
            LevelPolicy::PreferDeviceThenUser => "devdefault",
            LevelPolicy::ShowBest             => "best",
            LevelPolicy::ShowWorst            => "worst",
        }
    }
}

impl fmt::Display for LevelPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for LevelPolicy {
    type Err = CheckError;

    fn from_str(s: &str) -> Result<Self> {
        LevelPolicy::ALL
            .into_iter()
            .find(|p| p.name() == s)
            .ok_or_else(|| CheckError::config(format!("unknown device levels handling {:?}", s)))
    }
}

impl TryFrom<String> for LevelPolicy {
    type Error = CheckError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl Serialize for LevelPolicy {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelSource {
    User,
    Device,
}

/// One fully evaluated side of the comparison.
///
/// `configured` tells whether any level was set on this side; `state` is the
/// side's overall state including every extra sub-result (trend, device
/// status) the caller already computed.
#[derive(Debug, Clone)]
pub struct Side<T> {
    pub configured: bool,
    pub state:      State,
    pub payload:    T,
}

#[derive(Debug, Clone)]
pub struct Resolved<T> {
    pub source:  LevelSource,
    pub payload: T,
    pub note:    String,
}

/// Pick the side to report. Pure and total: every policy and every
/// combination of present/absent levels yields a payload and a note.
///
/// Ties under `best` and `worst` go to the user side.
pub fn resolve<T>(policy: LevelPolicy, user: Side<T>, device: Side<T>) -> Resolved<T> {
    let pick = |source: LevelSource, user: Side<T>, device: Side<T>, note: String| {
        let payload = match source {
            LevelSource::User   => user.payload,
            LevelSource::Device => device.payload,
        };
        Resolved { source, payload, note }
    };

    match policy {
        LevelPolicy::UseUser => pick(LevelSource::User, user, device, "only use user levels".into()),
        LevelPolicy::UseDevice => pick(LevelSource::Device, user, device, "only use device levels".into()),
        LevelPolicy::PreferUserThenDevice => {
            let (source, outcome) = if user.configured {
                (LevelSource::User, "used user levels")
            } else if device.configured {
                (LevelSource::Device, "used device levels")
            } else {
                (LevelSource::User, "no levels found")
            };
            let note = format!("prefer user levels over device levels ({})", outcome);
            pick(source, user, device, note)
        }
        LevelPolicy::PreferDeviceThenUser => {
            let (source, outcome) = if device.configured {
                (LevelSource::Device, "used device levels")
            } else if user.configured {
                (LevelSource::User, "used user levels")
            } else {
                (LevelSource::Device, "no levels found")
            };
            let note = format!("prefer device levels over user levels ({})", outcome);
            pick(source, user, device, note)
        }
        LevelPolicy::ShowBest => {
            let source = if user.state <= device.state { LevelSource::User } else { LevelSource::Device };
            pick(source, user, device, "show least critical state".into())
        }
        LevelPolicy::ShowWorst => {
            let source = if user.state >= device.state { LevelSource::User } else { LevelSource::Device };
            pick(source, user, device, "show most critical state".into())
        }
    }
}
