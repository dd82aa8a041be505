//! Environment variable configuration
//!
//! Provides environment variable overrides for configuration.

use std::env;

use super::{AppConfig, DrainOrder};

/// Environment variable prefix
const ENV_PREFIX: &str = "AIRTEST_FLEET";

/// Environment configuration from environment variables
#[derive(Clone, Debug, Default)]
pub struct EnvConfig {
    /// Runner executable from AIRTEST_FLEET_RUNNER
    pub runner: Option<String>,
    /// Device bridge executable from AIRTEST_FLEET_ADB
    pub adb: Option<String>,
    /// Report language from AIRTEST_FLEET_LANG
    pub lang: Option<String>,
    /// Progress file from AIRTEST_FLEET_PROGRESS
    pub progress_file: Option<String>,
    /// Suppress browser from AIRTEST_FLEET_NO_OPEN
    pub no_open: Option<bool>,
    /// Drain order from AIRTEST_FLEET_DRAIN
    pub drain: Option<DrainOrder>,
    /// Browser command from AIRTEST_FLEET_BROWSER
    pub browser: Option<String>,
}

impl EnvConfig {
    /// Load configuration from environment variables
    pub fn load() -> Self {
        Self {
            runner: get_env("RUNNER"),
            adb: get_env("ADB"),
            lang: get_env("LANG"),
            progress_file: get_env("PROGRESS"),
            no_open: get_env_bool("NO_OPEN"),
            drain: get_env("DRAIN").and_then(|v| DrainOrder::from_str(&v)),
            browser: get_env("BROWSER"),
        }
    }

    /// Override fields of `config` that are set in the environment
    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(runner) = &self.runner {
            config.runner = runner.clone();
        }
        if let Some(adb) = &self.adb {
            config.adb = adb.clone();
        }
        if let Some(lang) = &self.lang {
            config.report_lang = lang.clone();
        }
        if let Some(progress_file) = &self.progress_file {
            config.progress_file = progress_file.clone();
        }
        if let Some(no_open) = self.no_open {
            config.open_browser = !no_open;
        }
        if let Some(drain) = self.drain {
            config.drain = drain;
        }
        if let Some(browser) = &self.browser {
            config.browser = Some(browser.clone());
        }
    }

    /// Print current environment configuration
    pub fn print_summary(&self) {
        println!("Environment Configuration:");
        println!("  {}_RUNNER:    {:?}", ENV_PREFIX, self.runner);
        println!("  {}_ADB:       {:?}", ENV_PREFIX, self.adb);
        println!("  {}_LANG:      {:?}", ENV_PREFIX, self.lang);
        println!("  {}_PROGRESS:  {:?}", ENV_PREFIX, self.progress_file);
        println!("  {}_NO_OPEN:   {:?}", ENV_PREFIX, self.no_open);
        println!("  {}_DRAIN:     {:?}", ENV_PREFIX, self.drain);
        println!("  {}_BROWSER:   {:?}", ENV_PREFIX, self.browser);
    }
}

/// Get environment variable with prefix
fn get_env(name: &str) -> Option<String> {
    env::var(format!("{ENV_PREFIX}_{name}")).ok()
}

/// Get environment variable as boolean
fn get_env_bool(name: &str) -> Option<bool> {
    get_env(name).map(|v| parse_bool(&v))
}

fn parse_bool(value: &str) -> bool {
    matches!(
        value.to_lowercase().as_str(),
        "1" | "true" | "yes" | "on" | "enabled"
    )
}

/// Print all AIRTEST_FLEET environment variables
pub fn print_env_help() {
    println!("Environment Variables:");
    println!();
    println!("  {ENV_PREFIX}_RUNNER     Test runner executable (default: airtest)");
    println!("  {ENV_PREFIX}_ADB        Device bridge executable (default: adb)");
    println!("  {ENV_PREFIX}_LANG       Language of per-device reports (default: zh)");
    println!("  {ENV_PREFIX}_PROGRESS   Progress file name (default: data.json)");
    println!("  {ENV_PREFIX}_NO_OPEN    Do not open the summary report (true/false)");
    println!("  {ENV_PREFIX}_DRAIN      Task drain order (launch, completion)");
    println!("  {ENV_PREFIX}_BROWSER    Command used to open the summary report");
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Restores an environment variable on drop
    struct EnvGuard {
        key: String,
        previous: Option<String>,
    }

    impl EnvGuard {
        fn set(name: &str, value: &str) -> Self {
            let key = format!("{ENV_PREFIX}_{name}");
            let previous = env::var(&key).ok();
            env::set_var(&key, value);
            Self { key, previous }
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            match &self.previous {
                Some(v) => env::set_var(&self.key, v),
                None => env::remove_var(&self.key),
            }
        }
    }

    #[test]
    fn test_env_config_default() {
        let config = EnvConfig::default();
        assert!(config.runner.is_none());
        assert!(config.drain.is_none());
    }

    #[test]
    fn test_env_overrides_runner_and_drain() {
        let _runner = EnvGuard::set("RUNNER", "/opt/airtest");
        let _drain = EnvGuard::set("DRAIN", "completion");

        let env_config = EnvConfig::load();
        assert_eq!(env_config.runner.as_deref(), Some("/opt/airtest"));
        assert_eq!(env_config.drain, Some(DrainOrder::Completion));

        let mut config = AppConfig::default();
        env_config.apply(&mut config);
        assert_eq!(config.runner, "/opt/airtest");
        assert_eq!(config.drain, DrainOrder::Completion);
    }

    #[test]
    fn test_apply_no_open() {
        let env_config = EnvConfig {
            no_open: Some(true),
            lang: Some("en".to_string()),
            ..Default::default()
        };

        let mut config = AppConfig::default();
        env_config.apply(&mut config);
        assert!(!config.open_browser);
        assert_eq!(config.report_lang, "en");
        assert_eq!(config.adb, "adb");
    }

    #[test]
    fn test_parse_bool() {
        assert!(parse_bool("1"));
        assert!(parse_bool("TRUE"));
        assert!(parse_bool("on"));
        assert!(!parse_bool("0"));
        assert!(!parse_bool("nope"));
    }
}
