use std::path::PathBuf;
use std::time::Duration;

use crate::constants::{
    CXX_PROGRAM, GO_PROGRAM, JAVA_PROGRAM, JAVAC_PROGRAM, JEST_PATH, JUNIT_JAR_PATH,
    NODE_PROGRAM, PYTHON_PROGRAM,
};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {key}: {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HarnessConfig {
    pub python: PathBuf,
    pub javac: PathBuf,
    pub java: PathBuf,
    pub node: PathBuf,
    pub cxx: PathBuf,
    pub go: PathBuf,
    pub junit_jar: PathBuf,
    pub jest: PathBuf,
    pub compile_timeout: Option<Duration>,
    pub run_timeout: Option<Duration>,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            python: PYTHON_PROGRAM.into(),
            javac: JAVAC_PROGRAM.into(),
            java: JAVA_PROGRAM.into(),
            node: NODE_PROGRAM.into(),
            cxx: CXX_PROGRAM.into(),
            go: GO_PROGRAM.into(),
            junit_jar: JUNIT_JAR_PATH.into(),
            jest: JEST_PATH.into(),
            compile_timeout: None,
            run_timeout: None,
        }
    }
}

impl HarnessConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overlaid with `POLYRUNNER_*` values from `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        let paths = [
            ("POLYRUNNER_PYTHON", &mut config.python),
            ("POLYRUNNER_JAVAC", &mut config.javac),
            ("POLYRUNNER_JAVA", &mut config.java),
            ("POLYRUNNER_NODE", &mut config.node),
            ("POLYRUNNER_CXX", &mut config.cxx),
            ("POLYRUNNER_GO", &mut config.go),
            ("POLYRUNNER_JUNIT_JAR", &mut config.junit_jar),
            ("POLYRUNNER_JEST", &mut config.jest),
        ];
        for (key, slot) in paths {
            if let Some(value) = lookup(key).filter(|v| !v.trim().is_empty()) {
                *slot = PathBuf::from(value.trim());
            }
        }

        if let Some(value) = lookup("POLYRUNNER_COMPILE_TIMEOUT_SECS") {
            config.compile_timeout = parse_timeout("POLYRUNNER_COMPILE_TIMEOUT_SECS", &value)?;
        }
        if let Some(value) = lookup("POLYRUNNER_RUN_TIMEOUT_SECS") {
            config.run_timeout = parse_timeout("POLYRUNNER_RUN_TIMEOUT_SECS", &value)?;
        }

        Ok(config)
    }
}

/// Seconds; `0` disables the deadline.
pub fn parse_timeout(key: &str, value: &str) -> Result<Option<Duration>, ConfigError> {
    let secs: u64 = value
        .trim()
        .parse()
        .map_err(|e: std::num::ParseIntError| ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
            reason: e.to_string(),
        })?;
    Ok((secs > 0).then(|| Duration::from_secs(secs)))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_without_overrides() {
        let config = HarnessConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, HarnessConfig::default());
        assert_eq!(config.python, PathBuf::from("python3"));
        assert!(config.run_timeout.is_none());
    }

    #[test]
    fn test_overrides_programs_and_timeouts() {
        let config = HarnessConfig::from_lookup(lookup(&[
            ("POLYRUNNER_CXX", "/usr/bin/clang++"),
            ("POLYRUNNER_JUNIT_JAR", "/opt/junit.jar"),
            ("POLYRUNNER_RUN_TIMEOUT_SECS", "10"),
            ("POLYRUNNER_COMPILE_TIMEOUT_SECS", "0"),
        ]))
        .unwrap();
        assert_eq!(config.cxx, PathBuf::from("/usr/bin/clang++"));
        assert_eq!(config.junit_jar, PathBuf::from("/opt/junit.jar"));
        assert_eq!(config.run_timeout, Some(Duration::from_secs(10)));
        assert_eq!(config.compile_timeout, None);
    }

    #[test]
    fn test_blank_override_keeps_default() {
        let config = HarnessConfig::from_lookup(lookup(&[("POLYRUNNER_GO", "  ")])).unwrap();
        assert_eq!(config.go, PathBuf::from("go"));
    }

    #[test]
    fn test_invalid_timeout() {
        let err = HarnessConfig::from_lookup(lookup(&[("POLYRUNNER_RUN_TIMEOUT_SECS", "soon")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "POLYRUNNER_RUN_TIMEOUT_SECS"));
    }
}
