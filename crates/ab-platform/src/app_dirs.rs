use std::path::PathBuf;

use ab_core::{
    app_dirs::AppDirs,
    ports::{AppDirsError, AppDirsPort},
};

const APP_DIR_NAME: &str = "appbridge";
const PROFILE_ENV: &str = "APPBRIDGE_PROFILE";

fn resolved_app_dir_name() -> String {
    match std::env::var(PROFILE_ENV) {
        Ok(profile) if !profile.is_empty() => format!("{APP_DIR_NAME}-{profile}"),
        _ => APP_DIR_NAME.to_string(),
    }
}

/// Per-user directory layout backed by the `dirs` crate.
///
/// Lock and socket files go under the XDG runtime directory where the
/// platform has one, and under the cache directory everywhere else.
#[derive(Debug, Default)]
pub struct DirsAppDirsAdapter {
    base_dir_override: Option<PathBuf>,
}

impl DirsAppDirsAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve every root under `base` instead of the system directories.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::path::PathBuf;
    /// use ab_platform::app_dirs::DirsAppDirsAdapter;
    ///
    /// let adapter = DirsAppDirsAdapter::with_base_dir(PathBuf::from("/tmp"));
    /// ```
    pub fn with_base_dir(base: PathBuf) -> Self {
        Self {
            base_dir_override: Some(base),
        }
    }

    fn base_data_local_dir(&self) -> Option<PathBuf> {
        match &self.base_dir_override {
            Some(base) => Some(base.clone()),
            None => dirs::data_local_dir(),
        }
    }

    fn base_cache_dir(&self) -> Option<PathBuf> {
        match &self.base_dir_override {
            Some(base) => Some(base.join("cache")),
            None => dirs::cache_dir(),
        }
    }

    fn base_runtime_dir(&self) -> Option<PathBuf> {
        match &self.base_dir_override {
            Some(base) => Some(base.join("run")),
            None => dirs::runtime_dir().or_else(dirs::cache_dir),
        }
    }
}

impl AppDirsPort for DirsAppDirsAdapter {
    fn get_app_dirs(&self) -> Result<AppDirs, AppDirsError> {
        let base_data = self
            .base_data_local_dir()
            .ok_or(AppDirsError::DataLocalDirUnavailable)?;
        let base_cache = self
            .base_cache_dir()
            .ok_or(AppDirsError::CacheDirUnavailable)?;
        let base_runtime = self
            .base_runtime_dir()
            .ok_or(AppDirsError::CacheDirUnavailable)?;
        let app_dir_name = resolved_app_dir_name();

        Ok(AppDirs {
            app_data_root: base_data.join(&app_dir_name),
            app_cache_root: base_cache.join(&app_dir_name),
            runtime_root: base_runtime.join(&app_dir_name),
        })
    }
}
