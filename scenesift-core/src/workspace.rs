//! Per-video working directories.
//!
//! A [`Workspace`] is the directory `~<video stem>` that holds sampled frames,
//! checkpoints and extracted clips for one source video. It is removed when
//! the value is dropped unless it was marked to be kept, so every exit path of
//! the pipeline (success, early return, error) cleans up.
//!
//! Directories pending removal are also tracked in a process-wide registry.
//! An interrupt handler cannot unwind the stack, so it calls
//! [`cleanup_registered_workspaces`] instead.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{LazyLock, Mutex};

use tempfile::{Builder as TempFileBuilder, NamedTempFile};

use crate::error::{CoreError, CoreResult};
use crate::utils::{get_file_stem_safe, parent_dir};

static REGISTRY: LazyLock<Mutex<Vec<PathBuf>>> = LazyLock::new(|| Mutex::new(Vec::new()));

fn register(path: &Path) {
    if let Ok(mut registry) = REGISTRY.lock() {
        registry.push(path.to_path_buf());
    }
}

fn unregister(path: &Path) {
    if let Ok(mut registry) = REGISTRY.lock() {
        registry.retain(|p| p != path);
    }
}

/// Removes every workspace that is still pending removal. Returns how many
/// directories were removed.
pub fn cleanup_registered_workspaces() -> usize {
    let paths: Vec<PathBuf> = match REGISTRY.lock() {
        Ok(mut registry) => registry.drain(..).collect(),
        Err(_) => return 0,
    };

    paths
        .iter()
        .filter(|path| match fs::remove_dir_all(path) {
            Ok(()) => true,
            Err(e) => {
                log::warn!("Failed to remove working directory {}: {e}", path.display());
                false
            }
        })
        .count()
}

/// Scoped working directory of one source video.
#[derive(Debug)]
pub struct Workspace {
    path: PathBuf,
    keep: bool,
}

impl Workspace {
    /// Location of the working directory for `source`: `~<stem>` beside the
    /// source, or inside `temp_dir` when given.
    pub fn location(source: &Path, temp_dir: Option<&Path>) -> CoreResult<PathBuf> {
        let stem = get_file_stem_safe(source)?;
        let parent = temp_dir.unwrap_or_else(|| parent_dir(source));
        Ok(parent.join(format!("~{stem}")))
    }

    /// Creates a fresh directory at `path`. A directory already there belongs
    /// to an earlier run (or to the user) and is left untouched.
    pub fn create(path: PathBuf, keep: bool) -> CoreResult<Self> {
        if let Err(e) = fs::create_dir(&path) {
            if e.kind() == std::io::ErrorKind::AlreadyExists {
                return Err(CoreError::PathError(format!(
                    "working directory {} already exists; resume it with --from-stage or remove it",
                    path.display()
                )));
            }
            return Err(e.into());
        }
        Ok(Self::adopt(path, keep))
    }

    /// Opens a directory left by an earlier run, for stage re-entry.
    pub fn open_existing(path: PathBuf, keep: bool) -> CoreResult<Self> {
        if !path.is_dir() {
            return Err(CoreError::Checkpoint(
                path.display().to_string(),
                "working directory of an earlier run not found".to_string(),
            ));
        }
        Ok(Self::adopt(path, keep))
    }

    fn adopt(path: PathBuf, keep: bool) -> Self {
        log::debug!("Working directory: {}", path.display());
        if !keep {
            register(&path);
        }
        Self { path, keep }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path of a file inside the workspace.
    pub fn file(&self, name: impl AsRef<Path>) -> PathBuf {
        self.path.join(name)
    }

    /// Creates a uniquely named scratch file, deleted when the handle drops.
    pub fn scratch_file(&self, prefix: &str, extension: &str) -> CoreResult<NamedTempFile> {
        Ok(TempFileBuilder::new()
            .prefix(&format!("{prefix}_"))
            .suffix(&format!(".{extension}"))
            .tempfile_in(&self.path)?)
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        if self.keep {
            log::debug!("Keeping working directory {}", self.path.display());
            return;
        }
        unregister(&self.path);
        if let Err(e) = fs::remove_dir_all(&self.path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                log::warn!("Failed to remove working directory {}: {e}", self.path.display());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_location_beside_source_or_in_temp_dir() {
        let source = Path::new("/videos/show.mp4");
        assert_eq!(Workspace::location(source, None).unwrap(), PathBuf::from("/videos/~show"));
        assert_eq!(
            Workspace::location(source, Some(Path::new("/scratch"))).unwrap(),
            PathBuf::from("/scratch/~show")
        );
    }

    #[test]
    fn test_dropped_workspace_is_removed() {
        let root = tempdir().unwrap();
        let path = root.path().join("~clip");
        {
            let ws = Workspace::create(path.clone(), false).unwrap();
            fs::write(ws.file("samples.txt"), "1 frame.png\n").unwrap();
            assert!(path.is_dir());
        }
        assert!(!path.exists());
    }

    #[test]
    fn test_kept_workspace_survives() {
        let root = tempdir().unwrap();
        let path = root.path().join("~clip");
        {
            let _ws = Workspace::create(path.clone(), true).unwrap();
        }
        assert!(path.is_dir());
    }

    #[test]
    fn test_only_removable_workspaces_are_registered() {
        let root = tempdir().unwrap();
        let registered = |path: &Path| REGISTRY.lock().unwrap().iter().any(|p| p == path);

        let path = root.path().join("~pending");
        let ws = Workspace::create(path.clone(), false).unwrap();
        assert!(registered(&path));
        drop(ws);
        assert!(!registered(&path));

        let kept_path = root.path().join("~kept");
        let _kept = Workspace::create(kept_path.clone(), true).unwrap();
        assert!(!registered(&kept_path));
    }

    #[test]
    fn test_create_refuses_existing_directory() {
        let root = tempdir().unwrap();
        let path = root.path().join("~show");
        fs::create_dir(&path).unwrap();
        fs::write(path.join("notes.txt"), "mine").unwrap();

        let err = Workspace::create(path.clone(), false).unwrap_err();
        assert!(matches!(err, CoreError::PathError(_)));
        assert!(err.to_string().contains("--from-stage"));
        // Nothing was registered or removed.
        assert!(!REGISTRY.lock().unwrap().iter().any(|p| p == &path));
        assert_eq!(fs::read_to_string(path.join("notes.txt")).unwrap(), "mine");
    }

    #[test]
    fn test_open_existing_requires_directory() {
        let root = tempdir().unwrap();
        let err = Workspace::open_existing(root.path().join("~missing"), true).unwrap_err();
        assert!(matches!(err, CoreError::Checkpoint(..)));
    }
}
