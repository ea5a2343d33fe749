use serde::{Deserialize, Serialize};

/// Capacity figures for one filesystem, all in megabytes.
///
/// Any field may be missing when the device did not report it; a size of
/// 0 marks an unusable filesystem.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FilesystemBlock {
    pub size_mb:     Option<f64>,
    pub avail_mb:    Option<f64>,
    pub reserved_mb: Option<f64>,
}

impl FilesystemBlock {
    pub fn new(size_mb: f64, avail_mb: f64, reserved_mb: f64) -> Self {
        Self { size_mb: Some(size_mb), avail_mb: Some(avail_mb), reserved_mb: Some(reserved_mb) }
    }

    /// Sum of several blocks; missing information anywhere makes that field missing.
    pub fn sum<'a, I: IntoIterator<Item = &'a FilesystemBlock>>(blocks: I) -> Self {
        let mut total = FilesystemBlock::new(0.0, 0.0, 0.0);
        for b in blocks {
            total.size_mb     = total.size_mb.zip(b.size_mb).map(|(a, b)| a + b);
            total.avail_mb    = total.avail_mb.zip(b.avail_mb).map(|(a, b)| a + b);
            total.reserved_mb = total.reserved_mb.zip(b.reserved_mb).map(|(a, b)| a + b);
        }
        total
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InodeCounts {
    pub total: f64,
    pub avail: f64,
}

impl InodeCounts {
    pub fn used(&self) -> f64 {
        self.total - self.avail
    }
}

/// One mounted filesystem as handed over by a collector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MountedFilesystem {
    pub mountpoint: String,
    #[serde(default)]
    pub device:     String,
    #[serde(default)]
    pub fs_type:    String,
    #[serde(flatten)]
    pub block:      FilesystemBlock,
    #[serde(default)]
    pub inodes:     Option<InodeCounts>,
}
