//! Default location for local data files.

use std::fs;
use std::io;
use std::path::PathBuf;

/// The per-user data directory, `~/barvault_data`. Resolved, not created.
pub fn data_root() -> io::Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "home directory not resolved"))?;
    Ok(home.join("barvault_data"))
}

/// Join `~/barvault_data/` and the given segments, creating the directories
/// if absent.
pub fn default_path(segments: &[&str]) -> io::Result<PathBuf> {
    ensure_path(data_root()?, segments)
}

fn ensure_path(mut path: PathBuf, segments: &[&str]) -> io::Result<PathBuf> {
    for segment in segments {
        path.push(segment);
    }
    fs::create_dir_all(&path)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ensure_path_creates_nested_directories() {
        let base = tempfile::tempdir().unwrap();
        let path = ensure_path(base.path().join("barvault_data"), &["tmp", "TRADES"]).unwrap();
        assert!(path.ends_with("barvault_data/tmp/TRADES"));
        assert!(path.is_dir());
    }

    #[test]
    fn data_root_hangs_off_the_home_directory() {
        let root = data_root().unwrap();
        assert!(root.ends_with("barvault_data"));
        assert!(root.starts_with(dirs::home_dir().unwrap()));
    }
}
