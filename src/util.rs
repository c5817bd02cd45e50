//! Shared utility functions.

use std::path::{Component, Path, PathBuf};

/// Lexically clean a path: drop `.` components and fold `name/..` pairs.
///
/// Leading `..` components are kept, since there is nothing to fold them into.
/// "slides/./a/../b.md" -> "slides/b.md"
pub fn clean_path(path: &Path) -> PathBuf {
    let mut cleaned = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let can_pop = matches!(
                    cleaned.components().next_back(),
                    Some(Component::Normal(_))
                );
                if can_pop {
                    cleaned.pop();
                } else {
                    cleaned.push("..");
                }
            }
            other => cleaned.push(other.as_os_str()),
        }
    }
    cleaned
}

/// Render a path with forward slashes regardless of platform.
pub fn slash_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Recursively copy a directory, creating `dst` and any missing parents.
///
/// Existing files in `dst` are overwritten.
pub fn copy_dir_all(src: &Path, dst: &Path) -> std::io::Result<usize> {
    std::fs::create_dir_all(dst)?;
    let mut copied = 0;
    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        let target = dst.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copied += copy_dir_all(&entry.path(), &target)?;
        } else {
            std::fs::copy(entry.path(), &target)?;
            copied += 1;
        }
    }
    Ok(copied)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_path() {
        assert_eq!(clean_path(Path::new("./a.md")), PathBuf::from("a.md"));
        assert_eq!(
            clean_path(Path::new("slides/./a/../b.md")),
            PathBuf::from("slides/b.md")
        );
        assert_eq!(clean_path(Path::new("../x/y.md")), PathBuf::from("../x/y.md"));
        assert_eq!(clean_path(Path::new("a/../../b")), PathBuf::from("../b"));
    }

    #[test]
    fn test_copy_dir_all() {
        let src = tempfile::tempdir().unwrap();
        let dst = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(src.path().join("css/nested")).unwrap();
        std::fs::write(src.path().join("css/a.css"), "a").unwrap();
        std::fs::write(src.path().join("css/nested/b.css"), "b").unwrap();

        let copied = copy_dir_all(&src.path().join("css"), &dst.path().join("css")).unwrap();
        assert_eq!(copied, 2);
        assert_eq!(
            std::fs::read_to_string(dst.path().join("css/nested/b.css")).unwrap(),
            "b"
        );
    }
}
