use std::path::PathBuf;

use dirs_next::home_dir;

/// Expand a leading `~` (or `~/`, `~\`) to the user's home directory.
///
/// Paths without a tilde prefix are returned trimmed but otherwise untouched.
pub fn expand_tilde(path: &str) -> PathBuf {
    let trimmed = path.trim();
    let home = || home_dir().unwrap_or_else(|| PathBuf::from("~"));
    if trimmed == "~" {
        return home();
    }
    match trimmed.strip_prefix("~/").or_else(|| trimmed.strip_prefix("~\\")) {
        Some(rest) => home().join(rest),
        None => PathBuf::from(trimmed),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absolute_paths_are_unchanged() {
        assert_eq!(expand_tilde(" /etc/strata/settings.json "), PathBuf::from("/etc/strata/settings.json"));
    }

    #[test]
    fn tilde_prefix_resolves_under_home() {
        let expanded = expand_tilde("~/strata/settings.json");
        assert!(expanded.ends_with("strata/settings.json"));
        if let Some(home) = home_dir() {
            assert!(expanded.starts_with(home));
        }
    }
}
