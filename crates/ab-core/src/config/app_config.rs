use std::path::PathBuf;

/// Application configuration DTO (pure data, no logic)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Application name reported by `getName` and used to derive the instance identity
    pub app_name: String,

    /// Application version reported by `getVersion`
    pub app_version: String,

    pub single_instance: SingleInstanceConfig,

    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SingleInstanceConfig {
    pub enabled: bool,

    /// Explicit identity override (empty: derive from app name + user)
    pub identity: String,

    /// Directory for lock and socket files (empty: platform runtime dir)
    pub runtime_dir: PathBuf,

    /// How often a secondary retries connecting while the primary binds (0: adapter default)
    pub connect_attempts: u32,

    /// Delay between connect attempts in milliseconds (0: adapter default)
    pub connect_backoff_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Write a log file next to stdout output
    pub file: bool,
}

impl AppConfig {
    /// Create AppConfig from TOML value
    ///
    /// **Prohibited**: This method must NOT contain any validation.
    /// Empty strings are valid "facts".
    pub fn from_toml(toml_value: &toml::Value) -> anyhow::Result<Self> {
        Self::empty().merge_toml(toml_value)
    }

    /// Overwrite the fields the TOML document sets and keep the rest.
    ///
    /// Integers outside the target type's range count as missing.
    pub fn merge_toml(mut self, toml_value: &toml::Value) -> anyhow::Result<Self> {
        let section = |name: &str, key: &str| toml_value.get(name).and_then(|s| s.get(key));
        let string = |name: &str, key: &str| {
            section(name, key)
                .and_then(|v| v.as_str())
                .map(str::to_string)
        };
        let boolean = |name: &str, key: &str| section(name, key).and_then(|v| v.as_bool());
        let integer = |name: &str, key: &str| section(name, key).and_then(|v| v.as_integer());

        if let Some(name) = string("app", "name") {
            self.app_name = name;
        }
        if let Some(version) = string("app", "version") {
            self.app_version = version;
        }

        let single_instance = &mut self.single_instance;
        if let Some(enabled) = boolean("single_instance", "enabled") {
            single_instance.enabled = enabled;
        }
        if let Some(identity) = string("single_instance", "identity") {
            single_instance.identity = identity;
        }
        if let Some(runtime_dir) = string("single_instance", "runtime_dir") {
            single_instance.runtime_dir = PathBuf::from(runtime_dir);
        }
        if let Some(attempts) =
            integer("single_instance", "connect_attempts").and_then(|v| u32::try_from(v).ok())
        {
            single_instance.connect_attempts = attempts;
        }
        if let Some(backoff) =
            integer("single_instance", "connect_backoff_ms").and_then(|v| u64::try_from(v).ok())
        {
            single_instance.connect_backoff_ms = backoff;
        }

        if let Some(file) = boolean("logging", "file") {
            self.logging.file = file;
        }

        Ok(self)
    }

    /// Create empty AppConfig (all empty/default values)
    pub fn empty() -> Self {
        Self {
            app_name: String::new(),
            app_version: String::new(),
            single_instance: SingleInstanceConfig {
                enabled: false,
                identity: String::new(),
                runtime_dir: PathBuf::new(),
                connect_attempts: 0,
                connect_backoff_ms: 0,
            },
            logging: LoggingConfig { file: false },
        }
    }

    /// Configuration used when no config file exists.
    ///
    /// Single-instance enforcement and file logging are on; everything else
    /// stays empty so adapters pick their own defaults.
    pub fn with_system_defaults(app_name: &str, app_version: &str) -> Self {
        let mut config = Self::empty();
        config.app_name = app_name.to_string();
        config.app_version = app_version.to_string();
        config.single_instance.enabled = true;
        config.logging.file = true;
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use toml::Value;

    #[test]
    fn test_from_toml_reads_all_sections() {
        let toml_str = r#"
            [app]
            name = "demo"
            version = "1.2.3"

            [single_instance]
            enabled = true
            identity = "demo-shared"
            runtime_dir = "/run/demo"
            connect_attempts = 5
            connect_backoff_ms = 20

            [logging]
            file = true
        "#;
        let toml_value: Value = toml::from_str(toml_str).unwrap();

        let config = AppConfig::from_toml(&toml_value).unwrap();

        assert_eq!(config.app_name, "demo");
        assert_eq!(config.app_version, "1.2.3");
        assert!(config.single_instance.enabled);
        assert_eq!(config.single_instance.identity, "demo-shared");
        assert_eq!(config.single_instance.runtime_dir, PathBuf::from("/run/demo"));
        assert_eq!(config.single_instance.connect_attempts, 5);
        assert_eq!(config.single_instance.connect_backoff_ms, 20);
        assert!(config.logging.file);
    }

    #[test]
    fn test_from_toml_returns_empty_values_when_missing() {
        let toml_value: Value = toml::from_str("[app]\n").unwrap();

        let config = AppConfig::from_toml(&toml_value).unwrap();

        // Empty is a fact, not an error
        assert_eq!(config, AppConfig::empty());
    }

    #[test]
    fn test_out_of_range_integers_count_as_missing() {
        let toml_value: Value = toml::from_str(
            "[single_instance]\nconnect_attempts = -1\nconnect_backoff_ms = -5\n",
        )
        .unwrap();

        let config = AppConfig::from_toml(&toml_value).unwrap();

        assert_eq!(config.single_instance.connect_attempts, 0);
        assert_eq!(config.single_instance.connect_backoff_ms, 0);

        let toml_value: Value =
            toml::from_str("[single_instance]\nconnect_attempts = 4294967296\n").unwrap();
        let config = AppConfig::from_toml(&toml_value).unwrap();
        assert_eq!(config.single_instance.connect_attempts, 0);
    }

    #[test]
    fn test_merge_keeps_base_values_the_file_omits() {
        let toml_value: Value =
            toml::from_str("[app]\nname = \"demo\"\n[single_instance]\nconnect_attempts = 3\n")
                .unwrap();

        let config = AppConfig::with_system_defaults("appbridge", "0.1.0")
            .merge_toml(&toml_value)
            .unwrap();

        assert_eq!(config.app_name, "demo");
        assert_eq!(config.app_version, "0.1.0");
        assert!(config.single_instance.enabled);
        assert_eq!(config.single_instance.connect_attempts, 3);
        assert!(config.logging.file);
    }

    #[test]
    fn test_merge_honours_explicit_disable() {
        let toml_value: Value =
            toml::from_str("[single_instance]\nenabled = false\n[logging]\nfile = false\n")
                .unwrap();

        let config = AppConfig::with_system_defaults("appbridge", "0.1.0")
            .merge_toml(&toml_value)
            .unwrap();

        assert!(!config.single_instance.enabled);
        assert!(!config.logging.file);
    }

    #[test]
    fn test_system_defaults_enable_single_instance() {
        let config = AppConfig::with_system_defaults("demo", "0.1.0");
        assert_eq!(config.app_name, "demo");
        assert!(config.single_instance.enabled);
        assert!(config.single_instance.identity.is_empty());
        assert!(config.logging.file);
    }
}
