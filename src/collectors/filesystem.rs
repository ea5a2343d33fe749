use crate::df::group::glob_match;
use crate::models::filesystem::{FilesystemBlock, InodeCounts, MountedFilesystem};
use crate::util::human::MB;
use anyhow::Result;

/// Pseudo filesystems that never hold user data.
const SKIP_FS: &[&str] = &[
    "proc", "sysfs", "devpts", "tmpfs", "devtmpfs", "cgroup", "cgroup2",
    "pstore", "efivarfs", "securityfs", "debugfs", "tracefs", "bpf",
    "hugetlbfs", "mqueue", "fusectl", "configfs", "binfmt_misc",
    "overlay", "nsfs", "rpc_pipefs", "autofs", "squashfs",
];

/// Mounted filesystems of the local machine, sorted by mountpoint.
///
/// `exclude` holds mountpoint glob patterns to skip.
pub fn read_filesystems(exclude: &[String]) -> Result<Vec<MountedFilesystem>> {
    let content = std::fs::read_to_string("/proc/mounts")?;
    let mut out = Vec::new();

    for (device, mountpoint, fs_type) in parse_mounts(&content) {
        if SKIP_FS.contains(&fs_type.as_str()) || device.starts_with("/dev/loop") {
            continue;
        }
        if exclude.iter().any(|p| glob_match(p, &mountpoint)) {
            continue;
        }
        match statvfs_for(&device, &mountpoint, &fs_type) {
            Ok(fs) => out.push(fs),
            Err(e) => tracing::debug!(mountpoint = %mountpoint, error = %e, "statvfs failed"),
        }
    }

    out.sort_by(|a, b| a.mountpoint.cmp(&b.mountpoint));
    out.dedup_by(|a, b| a.mountpoint == b.mountpoint);
    Ok(out)
}

/// `(device, mountpoint, fs_type)` per line of a mounts table.
fn parse_mounts(content: &str) -> Vec<(String, String, String)> {
    content
        .lines()
        .filter_map(|line| {
            let mut fields = line.split_whitespace();
            let device = fields.next()?;
            let mountpoint = fields.next()?;
            let fs_type = fields.next()?;
            Some((unescape(device), unescape(mountpoint), fs_type.to_string()))
        })
        .collect()
}

/// Undo the octal escapes the kernel uses for blanks (`\040`, `\011`, ...).
fn unescape(field: &str) -> String {
    let bytes = field.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        let octal = i + 3 < bytes.len() && bytes[i + 1..i + 4].iter().all(|b| (b'0'..=b'7').contains(b));
        if bytes[i] == b'\\' && octal {
            let code = bytes[i + 1..i + 4].iter().fold(0u32, |acc, b| acc * 8 + u32::from(b - b'0'));
            out.push(code as u8);
            i += 4;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn statvfs_for(device: &str, mountpoint: &str, fs_type: &str) -> Result<MountedFilesystem> {
    use nix::sys::statvfs::statvfs;
    let stat = statvfs(mountpoint)?;

    let frsize = stat.fragment_size() as f64;
    let size_mb     = stat.blocks() as f64 * frsize / MB;
    let avail_mb    = stat.blocks_available() as f64 * frsize / MB;
    // blocks only root may use
    let reserved_mb = stat.blocks_free().saturating_sub(stat.blocks_available()) as f64 * frsize / MB;

    let inodes = match stat.files() {
        0     => None,
        total => Some(InodeCounts { total: total as f64, avail: stat.files_available() as f64 }),
    };

    Ok(MountedFilesystem {
        mountpoint: mountpoint.to_string(),
        device:     device.to_string(),
        fs_type:    fs_type.to_string(),
        block:      FilesystemBlock::new(size_mb, avail_mb, reserved_mb),
        inodes,
    })
}
