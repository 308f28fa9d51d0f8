use std::path::{Path, PathBuf};

/// Total size of every regular file below `path`. Unreadable entries are skipped.
pub fn directory_size_bytes(path: &Path) -> u64 {
    let mut total_size = 0_u64;
    let mut stack = vec![path.to_path_buf()];

    while let Some(current) = stack.pop() {
        let read_dir = match std::fs::read_dir(&current) {
            Ok(read_dir) => read_dir,
            Err(_) => continue,
        };

        for entry in read_dir.flatten() {
            let entry_path = entry.path();
            if let Ok(metadata) = entry.metadata() {
                if metadata.is_file() {
                    total_size = total_size.saturating_add(metadata.len());
                } else if metadata.is_dir() {
                    stack.push(entry_path);
                }
            }
        }
    }

    total_size
}

/// Every file named `file_name` below `root`, sorted for a stable order.
pub fn find_files_named(root: &Path, file_name: &str) -> std::io::Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    if !root.exists() {
        return Ok(found);
    }

    let mut stack = vec![root.to_path_buf()];
    while let Some(current) = stack.pop() {
        for entry in std::fs::read_dir(&current)? {
            let entry = entry?;
            let file_type = entry.file_type()?;
            if file_type.is_dir() {
                stack.push(entry.path());
            } else if file_type.is_file() && entry.file_name() == file_name {
                found.push(entry.path());
            }
        }
    }

    found.sort();
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sums_nested_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("a/b")).unwrap();
        std::fs::write(dir.path().join("top.bin"), [0u8; 10]).unwrap();
        std::fs::write(dir.path().join("a/b/deep.bin"), [0u8; 32]).unwrap();

        assert_eq!(directory_size_bytes(dir.path()), 42);
        assert_eq!(directory_size_bytes(&dir.path().join("missing")), 0);
    }

    #[test]
    fn finds_files_at_any_depth() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("13.2.1/item")).unwrap();
        std::fs::create_dir_all(dir.path().join("13.1.1")).unwrap();
        std::fs::write(dir.path().join("13.2.1/bundle.json"), "{}").unwrap();
        std::fs::write(dir.path().join("13.1.1/bundle.json"), "{}").unwrap();
        std::fs::write(dir.path().join("13.2.1/item/en_US.data.json"), "[]").unwrap();

        let found = find_files_named(dir.path(), "bundle.json").unwrap();
        assert_eq!(
            found,
            vec![
                dir.path().join("13.1.1/bundle.json"),
                dir.path().join("13.2.1/bundle.json"),
            ]
        );
    }

    #[test]
    fn missing_root_finds_nothing() {
        let dir = tempfile::tempdir().unwrap();
        assert!(find_files_named(&dir.path().join("nope"), "bundle.json")
            .unwrap()
            .is_empty());
    }
}
