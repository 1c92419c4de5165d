use super::version;
use glob::{MatchOptions, Pattern};
use std::fs;
use std::io::{self, Write};
use std::path::Path;

/// Blocking local file access used by the document model and the registrar.
pub trait FileSystem {
    fn read_text(&self, path: &Path) -> io::Result<String>;

    fn write_text(&self, path: &Path, text: &str) -> io::Result<()>;

    /// Write a file that must not exist yet (`AlreadyExists` otherwise).
    fn create_new(&self, path: &Path, text: &str) -> io::Result<()>;

    fn remove_file(&self, path: &Path) -> io::Result<()>;

    /// Names of regular files in `dir` matching `pattern`, case-insensitively, sorted.
    fn list_files(&self, dir: &Path, pattern: &str) -> io::Result<Vec<String>>;

    fn file_exists(&self, path: &Path) -> bool;

    fn dir_exists(&self, path: &Path) -> bool;

    fn copy_file(&self, src: &Path, dst: &Path) -> io::Result<()>;

    /// Product version string from the binary's version resource, if any.
    fn read_version(&self, exe: &Path) -> io::Result<Option<String>>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFileSystem;

impl FileSystem for LocalFileSystem {
    fn read_text(&self, path: &Path) -> io::Result<String> {
        fs::read_to_string(path)
    }

    fn write_text(&self, path: &Path, text: &str) -> io::Result<()> {
        fs::write(path, text)
    }

    fn create_new(&self, path: &Path, text: &str) -> io::Result<()> {
        let mut file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)?;
        file.write_all(text.as_bytes())
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        fs::remove_file(path)
    }

    fn list_files(&self, dir: &Path, pattern: &str) -> io::Result<Vec<String>> {
        let pattern = Pattern::new(pattern)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e.to_string()))?;
        let options = MatchOptions {
            case_sensitive: false,
            ..MatchOptions::new()
        };

        let mut names = Vec::new();
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let Ok(name) = entry.file_name().into_string() else {
                continue;
            };
            if pattern.matches_with(&name, options) {
                names.push(name);
            }
        }
        names.sort_by_key(|name| name.to_lowercase());
        Ok(names)
    }

    fn file_exists(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn dir_exists(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn copy_file(&self, src: &Path, dst: &Path) -> io::Result<()> {
        fs::copy(src, dst).map(|_| ())
    }

    fn read_version(&self, exe: &Path) -> io::Result<Option<String>> {
        let bytes = fs::read(exe)?;
        Ok(version::product_version(&bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_list_files_matches_pattern_case_insensitively() {
        let dir = tempdir().expect("temp dir");
        for name in ["php_gd2.dll", "PHP_Curl.DLL", "readme.txt", "php_mysql.pdb"] {
            fs::write(dir.path().join(name), "x").expect("write");
        }
        fs::create_dir(dir.path().join("php_dir.dll")).expect("dir");

        let names = LocalFileSystem
            .list_files(dir.path(), "php*.dll")
            .expect("list");
        assert_eq!(names, vec!["PHP_Curl.DLL".to_string(), "php_gd2.dll".to_string()]);
    }

    #[test]
    fn test_create_new_refuses_existing_file() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("probe.php");
        LocalFileSystem.create_new(&path, "a").expect("first write");
        let err = LocalFileSystem.create_new(&path, "b").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::AlreadyExists);
        assert_eq!(fs::read_to_string(&path).unwrap(), "a");
    }

    #[test]
    fn test_read_version_from_binary() {
        let dir = tempdir().expect("temp dir");
        let exe = dir.path().join("php-cgi.exe");
        fs::write(&exe, version::version_resource("8.3.12")).expect("write");
        assert_eq!(
            LocalFileSystem.read_version(&exe).unwrap(),
            Some("8.3.12".to_string())
        );

        let missing = LocalFileSystem.read_version(&dir.path().join("php.exe"));
        assert_eq!(missing.unwrap_err().kind(), io::ErrorKind::NotFound);
    }
}
