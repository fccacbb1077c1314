//! Post-extraction directory normalization.
//!
//! Some game archives unpack several folder levels deep. The installer runs an
//! ordered list of [`NormalizationStrategy`] values after extraction; the
//! first one that applies wins. Strategies are best-effort: a failure is
//! logged and the next strategy is tried, and nothing here aborts an install.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};
use walkdir::WalkDir;

use super::error::{ManagerError, ManagerResult};

/// A single layout fix-up.
pub trait NormalizationStrategy: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Try to normalize `target_dir`.
    ///
    /// Returns `Ok(true)` if the layout was recognized and rewritten,
    /// `Ok(false)` if it did not apply.
    fn apply(&self, target_dir: &Path) -> ManagerResult<bool>;
}

/// Run `strategies` in order until one applies.
///
/// Returns whether any strategy rewrote the layout. Errors are logged and
/// swallowed.
pub fn normalize(target_dir: &Path, strategies: &[Box<dyn NormalizationStrategy>]) -> bool {
    for strategy in strategies {
        match strategy.apply(target_dir) {
            Ok(true) => {
                info!(strategy = strategy.name(), dir = %target_dir.display(), "Normalized install layout");
                return true;
            }
            Ok(false) => debug!(strategy = strategy.name(), "Normalization did not apply"),
            Err(e) => warn!(strategy = strategy.name(), error = %e, "Normalization failed, continuing"),
        }
    }
    false
}

/// Collapses a known three-level nested chain.
///
/// Looks for a directory whose last three path segments match `segments`
/// (ASCII case-insensitive). Everything in the deepest folder is moved into
/// the nearest ancestor named like the first segment, falling back to the
/// target directory, and the emptied chain is removed.
#[derive(Debug, Clone)]
pub struct NestedChainStrategy {
    segments: [String; 3],
}

impl NestedChainStrategy {
    /// Create a strategy for the chain `shallow/middle/deep`.
    pub fn new(shallow: impl Into<String>, middle: impl Into<String>, deep: impl Into<String>) -> Self {
        Self {
            segments: [shallow.into(), middle.into(), deep.into()],
        }
    }

    /// The Season Two layout:
    /// `S2/Minecraft.Story.Mode.Season.Two/Minecraft Story Mode Season Two`.
    pub fn season_two() -> Self {
        Self::new(
            "S2",
            "Minecraft.Story.Mode.Season.Two",
            "Minecraft Story Mode Season Two",
        )
    }

    fn matches(&self, path: &Path) -> bool {
        let names: Vec<String> = path
            .components()
            .filter_map(|c| match c {
                std::path::Component::Normal(name) => Some(name.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect();

        names.len() >= 3
            && names[names.len() - 3..]
                .iter()
                .zip(&self.segments)
                .all(|(name, segment)| name.eq_ignore_ascii_case(segment))
    }

    /// Nearest ancestor of `deepest` named like the shallow marker.
    fn marker_ancestor(&self, deepest: &Path) -> Option<PathBuf> {
        deepest
            .ancestors()
            .skip(1)
            .find(|p| {
                p.file_name()
                    .map(|n| n.to_string_lossy().eq_ignore_ascii_case(&self.segments[0]))
                    .unwrap_or(false)
            })
            .map(Path::to_path_buf)
    }
}

impl NormalizationStrategy for NestedChainStrategy {
    fn name(&self) -> &str {
        "nested-chain"
    }

    fn apply(&self, target_dir: &Path) -> ManagerResult<bool> {
        let target_dir = absolute(target_dir)?;

        let deepest = WalkDir::new(&target_dir)
            .min_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_map(Result::ok)
            .filter(|e| e.file_type().is_dir())
            .map(|e| e.into_path())
            .find(|p| self.matches(p));

        let Some(deepest) = deepest else {
            return Ok(false);
        };

        let dest = self
            .marker_ancestor(&deepest)
            .filter(|p| p.starts_with(&target_dir))
            .unwrap_or_else(|| target_dir.clone());
        if dest == deepest {
            return Ok(false);
        }

        debug!(from = %deepest.display(), to = %dest.display(), "Collapsing nested chain");
        move_contents(&deepest, &dest)?;
        remove_dir_all_if_exists(&deepest)?;
        prune_empty_chain(&deepest, &dest);

        Ok(true)
    }
}

/// Promotes the deepest directory whose name contains a keyword group.
///
/// Groups are tried in order; the first group with any match wins. The
/// contents of the deepest match are moved directly under the target
/// directory and the match is removed.
#[derive(Debug, Clone)]
pub struct KeywordStrategy {
    groups: Vec<Vec<String>>,
}

impl KeywordStrategy {
    /// Create a strategy from keyword groups. Keywords are matched
    /// case-insensitively.
    pub fn new<G, K>(groups: G) -> Self
    where
        G: IntoIterator<Item = K>,
        K: IntoIterator,
        K::Item: Into<String>,
    {
        Self {
            groups: groups
                .into_iter()
                .map(|g| g.into_iter().map(|k| k.into().to_lowercase()).collect())
                .collect(),
        }
    }

    /// Keywords associated with the Season Two layout.
    pub fn season_two() -> Self {
        Self::new([vec!["season", "two", "story"], vec!["minecraft.st"]])
    }

    fn deepest_match(&self, target_dir: &Path, group: &[String]) -> Option<PathBuf> {
        WalkDir::new(target_dir)
            .min_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_map(Result::ok)
            .filter(|e| e.file_type().is_dir())
            .filter(|e| {
                let name = e.file_name().to_string_lossy().to_lowercase();
                group.iter().all(|k| name.contains(k.as_str()))
            })
            .max_by_key(|e| e.depth())
            .map(|e| e.into_path())
    }
}

impl NormalizationStrategy for KeywordStrategy {
    fn name(&self) -> &str {
        "keyword-search"
    }

    fn apply(&self, target_dir: &Path) -> ManagerResult<bool> {
        let target_dir = absolute(target_dir)?;

        let candidate = self
            .groups
            .iter()
            .filter(|g| !g.is_empty())
            .find_map(|g| self.deepest_match(&target_dir, g));

        let Some(candidate) = candidate else {
            return Ok(false);
        };

        debug!(from = %candidate.display(), to = %target_dir.display(), "Promoting keyword match");
        move_contents(&candidate, &target_dir)?;
        remove_dir_all_if_exists(&candidate)?;
        prune_empty_chain(&candidate, &target_dir);

        Ok(true)
    }
}

/// The strategies applied to Season Two installs, in order.
pub fn season_two_strategies() -> Vec<Box<dyn NormalizationStrategy>> {
    vec![
        Box::new(NestedChainStrategy::season_two()),
        Box::new(KeywordStrategy::season_two()),
    ]
}

/// Move every entry of `from` into `to`, replacing existing entries.
///
/// Entries that are ancestors of `from` itself are never replaced. A failure
/// on one entry is logged and the rest are still moved.
fn move_contents(from: &Path, to: &Path) -> ManagerResult<()> {
    let entries = fs::read_dir(from).map_err(|e| ManagerError::io(from, e))?;

    for entry in entries {
        let entry = entry.map_err(|e| ManagerError::io(from, e))?;
        let src = entry.path();
        let dst = to.join(entry.file_name());

        if from.starts_with(&dst) {
            warn!(path = %dst.display(), "Not replacing an ancestor of the source folder");
            continue;
        }

        if let Err(e) = replace_with(&src, &dst) {
            warn!(src = %src.display(), dst = %dst.display(), error = %e, "Failed to move entry");
        }
    }

    Ok(())
}

fn replace_with(src: &Path, dst: &Path) -> io::Result<()> {
    match fs::symlink_metadata(dst) {
        Ok(meta) if meta.is_dir() => fs::remove_dir_all(dst)?,
        Ok(_) => fs::remove_file(dst)?,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(e),
    }
    fs::rename(src, dst)
}

fn remove_dir_all_if_exists(path: &Path) -> ManagerResult<()> {
    match fs::remove_dir_all(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(ManagerError::io(path, e)),
    }
}

/// Remove now-empty folders between `removed` and `stop` (exclusive).
fn prune_empty_chain(removed: &Path, stop: &Path) {
    for dir in removed.ancestors().skip(1) {
        if dir == stop || !dir.starts_with(stop) {
            break;
        }
        if fs::remove_dir(dir).is_err() {
            break;
        }
    }
}

fn absolute(path: &Path) -> ManagerResult<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .map_err(|e| ManagerError::io(path, e))
    }
}
