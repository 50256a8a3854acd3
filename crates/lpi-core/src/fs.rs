//! Filesystem helpers shared by the portal and server installers

use crate::error::{Error, Result};
use std::fs;
use std::path::Path;
use tracing::debug;
use walkdir::WalkDir;

pub use crate::paths::to_slash;

/// Copy the content of `from` into `to`, recursively
///
/// A missing source is not an error; nothing is copied. Returns the number
/// of files copied.
pub fn copy_dir(from: &Path, to: &Path) -> Result<usize> {
    if !from.exists() {
        debug!("Nothing to copy, {} does not exist", from.display());
        return Ok(0);
    }

    let mut copied = 0;
    for entry in WalkDir::new(from).min_depth(1) {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(from).to_path_buf();
            Error::io(&path, e.into())
        })?;
        let relative = entry
            .path()
            .strip_prefix(from)
            .map_err(|e| Error::invalid_config(e.to_string()))?;
        let target = to.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target).map_err(|e| Error::io(&target, e))?;
        } else {
            copy_file(entry.path(), &target)?;
            copied += 1;
        }
    }

    Ok(copied)
}

/// Copy one file, creating the target's parent directories
pub fn copy_file(from: &Path, to: &Path) -> Result<()> {
    if let Some(parent) = to.parent() {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }
    fs::copy(from, to).map_err(|e| Error::io(from, e))?;
    Ok(())
}

/// Move a file, replacing the target
pub fn move_file(from: &Path, to: &Path) -> Result<()> {
    if to.exists() {
        fs::remove_file(to).map_err(|e| Error::io(to, e))?;
    }
    if let Some(parent) = to.parent() {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }
    if fs::rename(from, to).is_err() {
        // rename fails across devices
        fs::copy(from, to).map_err(|e| Error::io(from, e))?;
        fs::remove_file(from).map_err(|e| Error::io(from, e))?;
    }
    Ok(())
}

/// Remove a file, link or directory tree; a missing path is ignored
pub fn remove_path(path: &Path) -> Result<()> {
    let meta = match fs::symlink_metadata(path) {
        Ok(meta) => meta,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(Error::io(path, e)),
    };

    let result = if meta.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    };
    result.map_err(|e| Error::io(path, e))
}

/// Create a symbolic link at `link` pointing to `target`
///
/// Anything already at `link` is removed first.
pub fn link(target: &Path, link: &Path) -> Result<()> {
    remove_path(link)?;
    if let Some(parent) = link.parent() {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }

    #[cfg(unix)]
    let result = std::os::unix::fs::symlink(target, link);
    #[cfg(windows)]
    let result = if target.is_dir() {
        std::os::windows::fs::symlink_dir(target, link)
    } else {
        std::os::windows::fs::symlink_file(target, link)
    };

    result.map_err(|e| Error::io(link, e))?;
    debug!("Linked {} -> {}", link.display(), target.display());
    Ok(())
}

/// Mark a file executable for everyone (no-op off unix)
pub fn set_executable(path: &Path) -> Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = fs::metadata(path)
            .map_err(|e| Error::io(path, e))?
            .permissions();
        perms.set_mode(perms.mode() | 0o111);
        fs::set_permissions(path, perms).map_err(|e| Error::io(path, e))?;
    }
    #[cfg(not(unix))]
    let _ = path;
    Ok(())
}

/// Files directly inside `dir` whose name ends with one of `extensions`
pub fn files_with_extensions(dir: &Path, extensions: &[&str]) -> Result<Vec<std::path::PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| Error::io(dir, e))? {
        let path = entry.map_err(|e| Error::io(dir, e))?.path();
        let matches = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| extensions.iter().any(|x| x.eq_ignore_ascii_case(ext)));
        if path.is_file() && matches {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_copy_dir_recursive() {
        let temp = TempDir::new().unwrap();
        let from = temp.path().join("shared");
        fs::create_dir_all(from.join("nested")).unwrap();
        fs::write(from.join("a.jar"), "a").unwrap();
        fs::write(from.join("nested/b.jar"), "b").unwrap();

        let to = temp.path().join("tomcat/lib");
        assert_eq!(copy_dir(&from, &to).unwrap(), 2);
        assert_eq!(fs::read_to_string(to.join("nested/b.jar")).unwrap(), "b");
    }

    #[test]
    fn test_copy_dir_missing_source() {
        let temp = TempDir::new().unwrap();
        assert_eq!(
            copy_dir(&temp.path().join("missing"), &temp.path().join("to")).unwrap(),
            0
        );
    }

    #[test]
    fn test_remove_path_handles_dirs_and_missing() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("www");
        fs::create_dir_all(dir.join("WEB-INF")).unwrap();
        remove_path(&dir).unwrap();
        assert!(!dir.exists());
        remove_path(&dir).unwrap();
    }

    #[test]
    fn test_move_file_replaces_target() {
        let temp = TempDir::new().unwrap();
        let from = temp.path().join("xalan.jar");
        let to = temp.path().join("endorsed/xalan.jar");
        fs::create_dir_all(to.parent().unwrap()).unwrap();
        fs::write(&from, "new").unwrap();
        fs::write(&to, "old").unwrap();

        move_file(&from, &to).unwrap();
        assert!(!from.exists());
        assert_eq!(fs::read_to_string(&to).unwrap(), "new");
    }

    #[cfg(unix)]
    #[test]
    fn test_link_and_executable() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("www");
        fs::create_dir_all(&target).unwrap();
        let link_path = temp.path().join("deployments/ROOT.war");
        link(&target, &link_path).unwrap();
        assert!(fs::symlink_metadata(&link_path).unwrap().file_type().is_symlink());

        let script = temp.path().join("run.sh");
        fs::write(&script, "#!/bin/sh").unwrap();
        set_executable(&script).unwrap();
        use std::os::unix::fs::PermissionsExt;
        assert_ne!(fs::metadata(&script).unwrap().permissions().mode() & 0o111, 0);
    }

    #[test]
    fn test_files_with_extensions() {
        let temp = TempDir::new().unwrap();
        for name in ["a.sh", "b.CMD", "c.bat", "d.sql"] {
            fs::write(temp.path().join(name), "").unwrap();
        }
        let files = files_with_extensions(temp.path(), &["sh", "cmd", "bat"]).unwrap();
        assert_eq!(files.len(), 3);
    }
}
