use directories::ProjectDirs;
use std::path::PathBuf;

const APP_NAME: &str = "breathlog";

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    /// `$HOME/.local/state/breathlog/breath.db`, falling back to the
    /// platform data-local directory
    pub fn db_path() -> Option<PathBuf> {
        if let Ok(home) = std::env::var("HOME") {
            let state_dir = PathBuf::from(home)
                .join(".local")
                .join("state")
                .join(APP_NAME);
            Some(state_dir.join("breath.db"))
        } else {
            ProjectDirs::from("", "", APP_NAME)
                .map(|proj_dirs| proj_dirs.data_local_dir().join("breath.db"))
        }
    }

    pub fn config_path() -> PathBuf {
        ProjectDirs::from("", "", APP_NAME)
            .map(|pd| pd.config_dir().join("config.json"))
            .unwrap_or_else(|| PathBuf::from("breathlog_config.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn db_path_ends_with_database_file() {
        if let Some(path) = AppDirs::db_path() {
            assert!(path.ends_with("breath.db"));
        }
    }

    #[test]
    fn config_path_ends_with_json_file() {
        assert!(AppDirs::config_path().ends_with("config.json"));
    }
}
