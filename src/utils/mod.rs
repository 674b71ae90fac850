//! Process-level helpers shared by the tools.

pub mod parallel;

pub use parallel::{ParallelConfig, ParallelExecutor};

use crate::error::{ToolError, ToolResult};
use std::env;
use std::path::{Path, PathBuf};

/// Locates an executable by absolute path or on `PATH`.
pub fn find_executable(name: &str) -> ToolResult<PathBuf> {
    let path = Path::new(name);
    if path.is_absolute() && path.is_file() {
        return Ok(path.to_path_buf());
    }
    if let Some(paths) = env::var_os("PATH") {
        for dir in env::split_paths(&paths) {
            let full_path = dir.join(name);
            if full_path.is_file() {
                return Ok(full_path);
            }
        }
    }
    Err(ToolError::not_found(name, "PATH"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_executable() {
        let err = find_executable("surely-not-an-installed-binary").unwrap_err();
        assert_eq!(
            err.to_string(),
            "'surely-not-an-installed-binary' not found in PATH"
        );
    }

    #[test]
    fn test_absolute_executable() {
        let dir = tempfile::tempdir().unwrap();
        let exe = dir.path().join("tool");
        std::fs::write(&exe, "#!/bin/sh\n").unwrap();
        assert_eq!(find_executable(exe.to_str().unwrap()).unwrap(), exe);
    }
}
