//! php-info probe pages.

use crate::error::{ManagerError, Result};
use crate::host::fs::FileSystem;
use rand::Rng;
use rand::distributions::Alphanumeric;
use std::path::{Path, PathBuf};
use tracing::info;

pub const PROBE_CONTENT: &str = "<?php phpinfo(); ?>";

const PROBE_NAME_LEN: usize = 16;

fn random_name() -> String {
    let stem: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(PROBE_NAME_LEN)
        .map(char::from)
        .collect();
    format!("{}.php", stem.to_lowercase())
}

/// Write a probe page with a random name into `dir`.
pub fn create_probe_file(fs: &dyn FileSystem, dir: &Path) -> Result<PathBuf> {
    create_named_probe_file(fs, dir, &random_name())
}

/// Write a probe page named `file_name`. Never overwrites: an existing file
/// fails with `AlreadyExists`.
pub fn create_named_probe_file(
    fs: &dyn FileSystem,
    dir: &Path,
    file_name: &str,
) -> Result<PathBuf> {
    let path = dir.join(file_name);
    fs.create_new(&path, PROBE_CONTENT)
        .map_err(|e| ManagerError::io(&path, e))?;
    info!(path = %path.display(), "created php-info probe");
    Ok(path)
}

pub fn remove_probe_file(fs: &dyn FileSystem, path: &Path) -> Result<()> {
    fs.remove_file(path).map_err(|e| ManagerError::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::host::fs::LocalFileSystem;
    use tempfile::tempdir;

    #[test]
    fn test_probe_lifecycle() {
        let dir = tempdir().expect("temp dir");
        let path = create_probe_file(&LocalFileSystem, dir.path()).unwrap();
        assert_eq!(path.extension().and_then(|e| e.to_str()), Some("php"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), PROBE_CONTENT);

        remove_probe_file(&LocalFileSystem, &path).unwrap();
        assert!(!path.exists());
        let err = remove_probe_file(&LocalFileSystem, &path).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_probe_collision() {
        let dir = tempdir().expect("temp dir");
        std::fs::write(dir.path().join("taken.php"), "<?php echo 1;").unwrap();
        let err = create_named_probe_file(&LocalFileSystem, dir.path(), "taken.php").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AlreadyExists);
        assert_eq!(
            std::fs::read_to_string(dir.path().join("taken.php")).unwrap(),
            "<?php echo 1;"
        );
    }
}
