//! Filesystem capacity and temperature level evaluation.
//!
//! Both engines take pre-parsed readings plus a typed configuration and
//! return an ordered list of results and metrics. The only state they touch
//! is the [`store::ValueStore`] passed in for rates and averages.

pub mod collectors;
pub mod config;
pub mod df;
pub mod error;
pub mod levels;
pub mod models;
pub mod policy;
pub mod results;
pub mod service;
pub mod snapshot;
pub mod store;
pub mod temperature;
pub mod util;

pub use df::check_filesystem;
pub use df::group::check_filesystem_group;
pub use error::{CheckError, Result};
pub use policy::LevelPolicy;
pub use results::{CheckResult, Metric, Output, State};
pub use store::{MemoryStore, ValueStore};
pub use temperature::aggregate::check_temperature_list;
pub use temperature::check_temperature;
