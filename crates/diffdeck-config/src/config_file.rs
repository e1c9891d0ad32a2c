use std::path::{Path, PathBuf};
use std::{env, fs};

const CONFIG_FILE: &str = ".diffdeck.toml";

/// Load config file content from CWD first, then home directory
///
/// Searches for `.diffdeck.toml` in:
/// 1. Current working directory
/// 2. Home directory
///
/// Returns the file content if found, None otherwise.
pub fn load_config_file() -> Option<String> {
    let home = env::var_os("HOME").map(PathBuf::from);
    load_config_from(Path::new("."), home.as_deref())
}

fn load_config_from(cwd: &Path, home: Option<&Path>) -> Option<String> {
    let local = cwd.join(CONFIG_FILE);
    if let Ok(content) = fs::read_to_string(&local) {
        log::debug!("Loaded config from {}", local.display());
        return Some(content);
    }

    let home_config = home?.join(CONFIG_FILE);
    match fs::read_to_string(&home_config) {
        Ok(content) => {
            log::debug!("Loaded config from {}", home_config.display());
            Some(content)
        }
        Err(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_file_wins() {
        let cwd = tempfile::tempdir().unwrap();
        let home = tempfile::tempdir().unwrap();
        fs::write(cwd.path().join(CONFIG_FILE), "ide_command = \"zed\"").unwrap();
        fs::write(home.path().join(CONFIG_FILE), "ide_command = \"vim\"").unwrap();

        let content = load_config_from(cwd.path(), Some(home.path())).unwrap();
        assert!(content.contains("zed"));
    }

    #[test]
    fn test_home_fallback_and_missing() {
        let cwd = tempfile::tempdir().unwrap();
        let home = tempfile::tempdir().unwrap();
        assert!(load_config_from(cwd.path(), Some(home.path())).is_none());
        assert!(load_config_from(cwd.path(), None).is_none());

        fs::write(home.path().join(CONFIG_FILE), "undo_capacity = 5").unwrap();
        let content = load_config_from(cwd.path(), Some(home.path())).unwrap();
        assert!(content.contains("undo_capacity"));
    }
}
