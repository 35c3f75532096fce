use directories::ProjectDirs;
use std::path::PathBuf;

const APP_NAME: &str = "typespeed";

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    pub fn config_path() -> PathBuf {
        ProjectDirs::from("", "", APP_NAME)
            .map(|proj_dirs| proj_dirs.config_dir().join("config.json"))
            .unwrap_or_else(|| PathBuf::from(format!("{APP_NAME}_config.json")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_path_is_json_file() {
        let path = AppDirs::config_path();
        let name = path.file_name().and_then(|name| name.to_str()).unwrap();
        assert!(name.ends_with("config.json"));
    }
}
