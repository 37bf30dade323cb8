use std::path::PathBuf;

/// Directories owned by the application on this machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppDirs {
    pub app_data_root: PathBuf,
    pub app_cache_root: PathBuf,
    /// Per-user location for lock and socket files.
    pub runtime_root: PathBuf,
}

impl AppDirs {
    pub fn logs_dir(&self) -> PathBuf {
        self.app_data_root.join("logs")
    }

    pub fn config_file(&self) -> PathBuf {
        self.app_data_root.join("config.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn derived_paths_live_under_data_root() {
        let dirs = AppDirs {
            app_data_root: PathBuf::from("/tmp/appbridge"),
            app_cache_root: PathBuf::from("/tmp/cache/appbridge"),
            runtime_root: PathBuf::from("/run/user/1000/appbridge"),
        };
        assert_eq!(dirs.logs_dir(), PathBuf::from("/tmp/appbridge/logs"));
        assert_eq!(
            dirs.config_file(),
            PathBuf::from("/tmp/appbridge/config.toml")
        );
    }
}
