//! Turns a snapshot into monitoring services: one per filesystem, one per
//! filesystem group, and one per sensor (or a single sensor summary).

use crate::config::Config;
use crate::df::check_filesystem;
use crate::df::group::check_filesystem_group;
use crate::error::Result;
use crate::results::{overall_state, plugin_output, Output, State};
use crate::snapshot::Snapshot;
use crate::store::ValueStore;
use crate::temperature::aggregate::{check_temperature_list, SensorStatus};
use crate::temperature::check_temperature;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServiceReport {
    pub service: String,
    pub state:   State,
    pub outputs: Vec<Output>,
}

impl ServiceReport {
    fn new(service: String, outputs: Vec<Output>) -> Self {
        Self { state: overall_state(&outputs), service, outputs }
    }

    /// "WARN - Filesystem /: Used: 80.00% ..."
    pub fn render(&self) -> String {
        format!("{} - {}: {}", self.state.label(), self.service, plugin_output(&self.outputs))
    }
}

/// Run every check the snapshot and config call for.
///
/// Filesystems that belong to a group are only checked as part of it.
pub fn run_checks(snapshot: &Snapshot, config: &Config, store: &mut dyn ValueStore, now: f64) -> Result<Vec<ServiceReport>> {
    let fs_config = &config.filesystems;
    let mut reports = Vec::new();

    for fs in &snapshot.filesystems {
        if fs_config.groups.iter().any(|g| g.matches(&fs.mountpoint)) {
            continue;
        }
        let outputs = check_filesystem(&fs.mountpoint, &fs.block, fs.inodes.as_ref(), fs_config, store, now)?;
        reports.push(ServiceReport::new(format!("Filesystem {}", fs.mountpoint), outputs));
    }

    for group in &fs_config.groups {
        let outputs = check_filesystem_group(group, &snapshot.filesystems, fs_config, store, now)?;
        reports.push(ServiceReport::new(format!("Filesystem group {}", group.group_name), outputs));
    }

    let temp_config = &config.temperature;
    let mut summary = Vec::new();
    for sensor in &snapshot.sensors {
        let bundle = check_temperature(sensor.value, temp_config, &sensor.device, Some(&sensor.id), Some(&mut *store), now)?;
        if config.general.summarize_sensors {
            summary.push(SensorStatus::from_bundle(sensor.id.clone(), &bundle));
        } else {
            reports.push(ServiceReport::new(format!("Temperature {}", sensor.id), bundle.outputs()));
        }
    }
    if config.general.summarize_sensors {
        let outputs = check_temperature_list(&summary, temp_config, Some("summary"), Some(store), now)?;
        reports.push(ServiceReport::new("Temperature summary".to_string(), outputs));
    }

    tracing::debug!(services = reports.len(), "checks finished");
    Ok(reports)
}

/// Worst state over all services.
pub fn worst_state(reports: &[ServiceReport]) -> State {
    State::worst_of(reports.iter().map(|r| r.state))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::df::group::FilesystemGroup;
    use crate::store::MemoryStore;

    fn snapshot() -> Snapshot {
        Snapshot::from_json(
            r#"{
                "filesystems": [
                    { "mountpoint": "/",       "size_mb": 1000, "avail_mb": 200, "reserved_mb": 0 },
                    { "mountpoint": "/data/a", "size_mb": 500,  "avail_mb": 400, "reserved_mb": 0 },
                    { "mountpoint": "/data/b", "size_mb": 500,  "avail_mb": 400, "reserved_mb": 0 }
                ],
                "sensors": [
                    { "id": "CPU",     "value": 85.0, "levels": [70, 80] },
                    { "id": "Ambient", "value": 21.0 }
                ]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn one_service_per_item() {
        let mut store = MemoryStore::new();
        let reports = run_checks(&snapshot(), &Config::default(), &mut store, 0.0).unwrap();
        let names: Vec<_> = reports.iter().map(|r| r.service.as_str()).collect();
        assert_eq!(names, vec![
            "Filesystem /",
            "Filesystem /data/a",
            "Filesystem /data/b",
            "Temperature CPU",
            "Temperature Ambient",
        ]);
        assert_eq!(reports[0].state, State::Warn);
        assert_eq!(reports[3].state, State::Crit);
        assert_eq!(worst_state(&reports), State::Crit);
        assert!(reports[0].render().starts_with("WARN - Filesystem /: Used: 80.00%"), "{}", reports[0].render());
    }

    #[test]
    fn grouped_members_leave_the_individual_checks() {
        let mut config = Config::default();
        config.filesystems.groups.push(FilesystemGroup {
            group_name:       "data".into(),
            patterns_include: vec!["/data/*".into()],
            patterns_exclude: vec![],
        });
        config.general.summarize_sensors = true;

        let mut store = MemoryStore::new();
        let reports = run_checks(&snapshot(), &config, &mut store, 0.0).unwrap();
        let names: Vec<_> = reports.iter().map(|r| r.service.as_str()).collect();
        assert_eq!(names, vec!["Filesystem /", "Filesystem group data", "Temperature summary"]);
        assert!(reports[1].render().contains("2 filesystems"));
        assert_eq!(reports[2].state, State::Crit);
    }
}
