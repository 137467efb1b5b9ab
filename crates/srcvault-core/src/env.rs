//! Environment variable handling.

use std::env;
use std::path::PathBuf;

/// Get an environment variable, returning None if not set or empty.
pub fn get_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable as a path.
pub fn get_path(name: &str) -> Option<PathBuf> {
    get_var(name).map(|v| crate::paths::expand_tilde(v.trim()))
}

/// Common environment variable names.
pub mod vars {
    /// Override for the vault home directory (default `~/.srcvault`).
    pub const SRCVAULT_HOME: &str = "SRCVAULT_HOME";

    /// Override for the protected fragment file.
    pub const SRCVAULT_FRAGMENT_FILE: &str = "SRCVAULT_FRAGMENT_FILE";

    /// Override for the project config file.
    pub const SRCVAULT_CONFIG: &str = "SRCVAULT_CONFIG";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_var_ignores_blank() {
        env::set_var("SRCVAULT_TEST_BLANK", "   ");
        assert!(get_var("SRCVAULT_TEST_BLANK").is_none());
        env::remove_var("SRCVAULT_TEST_BLANK");
    }

    #[test]
    fn test_get_path_expands_tilde() {
        env::set_var("SRCVAULT_TEST_PATH", "~/vault/fragment.env");
        let path = get_path("SRCVAULT_TEST_PATH").unwrap();
        assert!(path.ends_with("vault/fragment.env"));
        assert!(!path.to_string_lossy().starts_with('~'));
        env::remove_var("SRCVAULT_TEST_PATH");
    }
}
