//! Config directory resolution.

use std::path::{Path, PathBuf};

/// Environment variable overriding the config directory.
pub const CONFIG_DIR_ENV: &str = "AZKABAN_CONFIG_DIR";

/// Application name for XDG directory resolution.
const APP_NAME: &str = "azkaban";

/// Directory holding the client config file.
///
/// `$AZKABAN_CONFIG_DIR` wins when set and non-empty, otherwise the platform
/// config directory joined with `azkaban`.
pub fn config_dir() -> Option<PathBuf> {
    if let Ok(dir) = std::env::var(CONFIG_DIR_ENV)
        && !dir.is_empty()
    {
        return Some(PathBuf::from(dir));
    }
    dirs::config_dir().map(|d| d.join(APP_NAME))
}

/// Expand ~ to home directory in paths.
pub(crate) fn expand_path(path: &Path) -> PathBuf {
    if let Some(s) = path.to_str()
        && let Some(rest) = s.strip_prefix("~/")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(rest);
    }
    path.to_path_buf()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_path() {
        let path = PathBuf::from("~/secrets/azkaban.pass");
        let expanded = expand_path(&path);
        if dirs::home_dir().is_some() {
            assert!(!expanded.to_str().unwrap().starts_with("~/"));
            assert!(expanded.ends_with("secrets/azkaban.pass"));
        }

        let absolute = PathBuf::from("/etc/azkaban/pass");
        assert_eq!(expand_path(&absolute), absolute);
    }
}
