use std::{
    fs,
    path::{Path, PathBuf},
    process::Command,
};

use anyhow::{Context, Result};

/// Validates that a path points to an existing file with the expected name
#[inline]
fn is_valid_binary(path: &Path, name: &str) -> bool {
    path.exists() && path.is_file() && path.ends_with(name)
}

/// Retrieves the path to an external tool binary.
///
/// Resolution order: explicit custom path, then the given environment
/// variable, then a `which` lookup on the ambient PATH.
///
/// # Errors
/// * If the binary could not be found by any of the three lookups
pub fn find_binary_in_path<P>(name: &str, env_var: &str, custom_path: Option<P>) -> Result<PathBuf>
where
    P: Into<PathBuf>,
{
    // Check custom path
    if let Some(path) = custom_path
        .map(Into::into)
        .filter(|p: &PathBuf| is_valid_binary(p, name))
    {
        return Ok(path);
    }

    // Check the environment variable override
    if let Some(path) = std::env::var(env_var)
        .map(PathBuf::from)
        .ok()
        .filter(|p: &PathBuf| is_valid_binary(p, name))
    {
        return Ok(path);
    }

    // Try to find using 'which'
    let path = Command::new("which")
        .arg(name)
        .output()
        .context("Failed to execute 'which'")?;

    if path.status.success() {
        let path_str = String::from_utf8_lossy(&path.stdout).trim().to_string();
        let path_buf = PathBuf::from(path_str);

        if is_valid_binary(&path_buf, name) {
            return Ok(path_buf);
        }
    }

    anyhow::bail!("Could not find {name} binary")
}

/// Creates the parent directory of `path` if it does not exist yet
///
/// # Errors
/// * If the directory could not be created
pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.exists() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create output directory: {}", parent.display())
            })?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::fs::File;
    use tempfile::tempdir;

    #[test]
    fn test_find_binary_custom_path() {
        let dir = tempdir().unwrap();
        let bin_path = dir.path().join("grcov");
        File::create(&bin_path).unwrap();

        let result = find_binary_in_path("grcov", "GRCOV_PATH", Some(bin_path.clone()));
        assert!(result.is_ok());
        assert_eq!(result.unwrap(), bin_path);
    }

    #[test]
    fn test_find_binary_env_var() {
        let dir = tempdir().unwrap();
        let bin_path = dir.path().join("grcov");
        File::create(&bin_path).unwrap();

        env::set_var("GRCOV_PATH_TEST", bin_path.to_str().unwrap());
        let result = find_binary_in_path::<PathBuf>("grcov", "GRCOV_PATH_TEST", None);
        assert!(result.is_ok());
        env::remove_var("GRCOV_PATH_TEST");
    }

    #[test]
    fn test_find_binary_rejects_wrong_name() {
        let dir = tempdir().unwrap();
        let bin_path = dir.path().join("not-grcov");
        File::create(&bin_path).unwrap();

        let result = find_binary_in_path("definitely-missing-tool", "COVOR_UNSET", Some(bin_path));
        assert!(result.is_err());
    }

    #[test]
    fn test_ensure_parent_dir() -> Result<()> {
        let dir = tempdir()?;
        let report = dir.path().join("coverage/nested/lcov.info");

        ensure_parent_dir(&report)?;
        assert!(report.parent().unwrap().is_dir());

        // Existing parent is fine too
        ensure_parent_dir(&report)?;
        Ok(())
    }
}
