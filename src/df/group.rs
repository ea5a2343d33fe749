use super::{check_filesystem, FilesystemConfig};
use crate::error::Result;
use crate::models::filesystem::{FilesystemBlock, InodeCounts, MountedFilesystem};
use crate::results::{CheckResult, Output, State};
use crate::store::ValueStore;
use serde::{Deserialize, Serialize};

/// Several filesystems checked as one, selected by mountpoint patterns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilesystemGroup {
    pub group_name:       String,
    #[serde(default)]
    pub patterns_include: Vec<String>,
    #[serde(default)]
    pub patterns_exclude: Vec<String>,
}

impl FilesystemGroup {
    pub fn matches(&self, mountpoint: &str) -> bool {
        self.patterns_include.iter().any(|p| glob_match(p, mountpoint))
            && !self.patterns_exclude.iter().any(|p| glob_match(p, mountpoint))
    }

    pub fn members<'a>(&self, filesystems: &'a [MountedFilesystem]) -> Vec<&'a MountedFilesystem> {
        filesystems.iter().filter(|fs| self.matches(&fs.mountpoint)).collect()
    }
}

/// Shell-style matching: `*` is any run of characters, `?` exactly one.
pub fn glob_match(pattern: &str, name: &str) -> bool {
    let p: Vec<char> = pattern.chars().collect();
    let n: Vec<char> = name.chars().collect();
    let (mut pi, mut ni) = (0, 0);
    let mut backtrack: Option<(usize, usize)> = None;

    while ni < n.len() {
        match p.get(pi) {
            Some('*') => {
                backtrack = Some((pi, ni));
                pi += 1;
            }
            Some(&c) if c == '?' || c == n[ni] => {
                pi += 1;
                ni += 1;
            }
            _ => match backtrack {
                Some((star, matched)) => {
                    pi = star + 1;
                    ni = matched + 1;
                    backtrack = Some((star, matched + 1));
                }
                None => return false,
            },
        }
    }
    p[pi..].iter().all(|&c| c == '*')
}

/// Run the filesystem pipeline over the sum of all members of `group`.
///
/// Inodes are only summed when every member reports them.
pub fn check_filesystem_group(
    group:       &FilesystemGroup,
    filesystems: &[MountedFilesystem],
    config:      &FilesystemConfig,
    store:       &mut dyn ValueStore,
    now:         f64,
) -> Result<Vec<Output>> {
    let members = group.members(filesystems);
    if members.is_empty() {
        tracing::debug!(group = %group.group_name, "group matched no filesystems");
        return Ok(vec![CheckResult::summary(State::Unknown, "No filesystem matching the patterns").into()]);
    }

    let block = FilesystemBlock::sum(members.iter().map(|fs| &fs.block));
    let inodes = members
        .iter()
        .map(|fs| fs.inodes)
        .collect::<Option<Vec<InodeCounts>>>()
        .map(|all| InodeCounts {
            total: all.iter().map(|i| i.total).sum(),
            avail: all.iter().map(|i| i.avail).sum(),
        });

    let mut out = check_filesystem(&group.group_name, &block, inodes.as_ref(), config, store, now)?;
    let count = match members.len() {
        1 => "1 filesystem".to_string(),
        n => format!("{} filesystems", n),
    };
    out.push(CheckResult::summary(State::Ok, count).into());
    Ok(out)
}
