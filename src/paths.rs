//! Executable lookup across build trees.

use std::path::{Path, PathBuf};

/// Find an executable directly inside one of `trees`, searched in order.
///
/// The first tree holding a regular file (or a symlink to one) named
/// `binary` wins; later trees are never consulted for that name.
///
/// Returns `None` if the binary is not found in any tree.
#[must_use = "found binary path should be used"]
pub fn find_binary(trees: &[&Path], binary: &str) -> Option<PathBuf> {
    trees
        .iter()
        .map(|tree| tree.join(binary))
        .find(|p| p.is_file())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use tempfile::TempDir;

    fn create_mock_trees(root: &Path) -> (PathBuf, PathBuf) {
        let frontend = root.join("frontend");
        let runtime = root.join("runtime");
        fs::create_dir_all(&frontend).unwrap();
        fs::create_dir_all(&runtime).unwrap();
        (frontend, runtime)
    }

    fn create_mock_binary(path: &Path) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, "#!/bin/sh\necho mock\n").unwrap();
        let mut perms = fs::metadata(path).unwrap().permissions();
        perms.set_mode(0o755);
        fs::set_permissions(path, perms).unwrap();
    }

    #[test]
    fn test_find_binary_in_frontend() {
        let temp = TempDir::new().unwrap();
        let (frontend, runtime) = create_mock_trees(temp.path());

        let binary_path = frontend.join("es2abc");
        create_mock_binary(&binary_path);

        let found = find_binary(&[&frontend, &runtime], "es2abc");
        assert_eq!(found, Some(binary_path));
    }

    #[test]
    fn test_find_binary_falls_back_to_runtime() {
        let temp = TempDir::new().unwrap();
        let (frontend, runtime) = create_mock_trees(temp.path());

        let binary_path = runtime.join("ark_js_vm");
        create_mock_binary(&binary_path);

        let found = find_binary(&[&frontend, &runtime], "ark_js_vm");
        assert_eq!(found, Some(binary_path));
    }

    #[test]
    fn test_find_binary_not_found() {
        let temp = TempDir::new().unwrap();
        let (frontend, runtime) = create_mock_trees(temp.path());

        let found = find_binary(&[&frontend, &runtime], "nonexistent");
        assert!(found.is_none());
    }

    #[test]
    fn test_find_binary_search_order() {
        let temp = TempDir::new().unwrap();
        let (frontend, runtime) = create_mock_trees(temp.path());

        // Present in both trees
        create_mock_binary(&frontend.join("dupbin"));
        create_mock_binary(&runtime.join("dupbin"));

        // Should prefer frontend
        let found = find_binary(&[&frontend, &runtime], "dupbin");
        assert_eq!(found, Some(frontend.join("dupbin")));
    }

    #[test]
    fn test_find_binary_skips_directories() {
        let temp = TempDir::new().unwrap();
        let (frontend, runtime) = create_mock_trees(temp.path());

        fs::create_dir_all(frontend.join("tool")).unwrap();
        create_mock_binary(&runtime.join("tool"));

        let found = find_binary(&[&frontend, &runtime], "tool");
        assert_eq!(found, Some(runtime.join("tool")));
    }
}
