//! Default locations for the shared database.
//!
//! Both binaries resolve the same path so that, without flags, the API
//! server and the MCP adapter open the same file.

use std::env;
use std::path::{Path, PathBuf};

/// Directory name under the XDG data home.
const APP_DIR: &str = "kanban";

/// Database file name inside the data directory.
const DB_FILE: &str = "kanban.db";

/// XDG data directory for kanban: `$XDG_DATA_HOME/kanban`, falling back to
/// `$HOME/.local/share/kanban`.
///
/// Returns `None` when neither variable is set.
pub fn data_dir() -> Option<PathBuf> {
    resolve_data_dir(
        env::var_os("XDG_DATA_HOME").map(PathBuf::from),
        env::var_os("HOME").map(PathBuf::from),
    )
}

/// Default database path, or `kanban.db` in the working directory when no
/// data directory can be determined.
pub fn default_db_path() -> PathBuf {
    data_dir()
        .map(|dir| dir.join(DB_FILE))
        .unwrap_or_else(|| PathBuf::from(DB_FILE))
}

/// Create the parent directory of `db_path` if it is missing.
pub fn ensure_parent_dir(db_path: &Path) -> std::io::Result<()> {
    match db_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => std::fs::create_dir_all(parent),
        _ => Ok(()),
    }
}

fn resolve_data_dir(xdg_data_home: Option<PathBuf>, home: Option<PathBuf>) -> Option<PathBuf> {
    xdg_data_home
        .filter(|p| p.is_absolute())
        .or_else(|| home.map(|h| h.join(".local/share")))
        .map(|base| base.join(APP_DIR))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_xdg_data_home_wins() {
        let dir = resolve_data_dir(Some("/xdg".into()), Some("/home/me".into()));
        assert_eq!(dir, Some(PathBuf::from("/xdg/kanban")));
    }

    #[test]
    fn test_relative_xdg_is_ignored() {
        let dir = resolve_data_dir(Some("relative".into()), Some("/home/me".into()));
        assert_eq!(dir, Some(PathBuf::from("/home/me/.local/share/kanban")));
    }

    #[test]
    fn test_no_home_gives_none() {
        assert_eq!(resolve_data_dir(None, None), None);
    }

    #[test]
    fn test_default_db_path_ends_with_db_file() {
        // env vars are unreliable in parallel tests
        assert!(default_db_path().ends_with(DB_FILE));
    }

    #[test]
    fn test_ensure_parent_dir_creates_missing_dirs() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("a/b/kanban.db");
        ensure_parent_dir(&path).unwrap();
        assert!(tmp.path().join("a/b").is_dir());
        ensure_parent_dir(Path::new("kanban.db")).unwrap();
    }
}
