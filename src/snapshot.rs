use crate::collectors::filesystem::read_filesystems;
use crate::models::filesystem::MountedFilesystem;
use crate::models::sensor::SensorReading;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::Path;

/// Pre-parsed readings handed to the checks.
///
/// Example:
/// ```json
/// {
///   "filesystems": [{ "mountpoint": "/", "size_mb": 1000, "avail_mb": 200, "reserved_mb": 0 }],
///   "sensors":     [{ "id": "CPU", "value": 48.5, "levels": [70, 80] }]
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub filesystems: Vec<MountedFilesystem>,
    #[serde(default)]
    pub sensors:     Vec<SensorReading>,
}

impl Snapshot {
    /// Read a snapshot file; `-` reads stdin.
    pub fn from_path(path: &Path) -> Result<Self> {
        let text = if path.as_os_str() == "-" {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf).context("reading snapshot from stdin")?;
            buf
        } else {
            std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?
        };
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Mounted filesystems of this machine; no sensors.
    pub fn local(exclude: &[String]) -> Result<Self> {
        Ok(Self { filesystems: read_filesystems(exclude)?, sensors: Vec::new() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::filesystem::FilesystemBlock;

    #[test]
    fn reads_the_documented_shape() {
        let snap = Snapshot::from_json(
            r#"{
                "filesystems": [{ "mountpoint": "/", "size_mb": 1000, "avail_mb": 200, "reserved_mb": 0 }],
                "sensors":     [{ "id": "CPU", "value": 48.5, "levels": [70, 80] }]
            }"#,
        )
        .unwrap();
        assert_eq!(snap.filesystems[0].block, FilesystemBlock::new(1000.0, 200.0, 0.0));
        assert_eq!(snap.sensors[0].device.levels, Some((70.0, 80.0)));
    }

    #[test]
    fn missing_sections_are_empty() {
        assert_eq!(Snapshot::from_json("{}").unwrap(), Snapshot::default());
    }

    #[test]
    fn reads_from_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snap.json");
        std::fs::write(&path, r#"{"sensors": [{"id": "a", "value": 1.0}]}"#).unwrap();
        assert_eq!(Snapshot::from_path(&path).unwrap().sensors.len(), 1);
    }
}
