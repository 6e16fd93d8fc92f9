use crate::breakpoints::ReconcilePolicy;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::Level;

/// Adapter-level settings read from the environment at startup. Connection
/// settings live in the core crate's `JsdbgConfig`.
#[derive(Debug, Clone)]
pub struct AdapterSettings {
    pub log_level: Level,
    /// Append every frontend message, both directions, to this file.
    pub trace_file: Option<PathBuf>,
    pub breakpoint_policy: ReconcilePolicy,
    /// How long launch and attach wait for `configurationDone`.
    pub configuration_done_timeout: Duration,
}

impl Default for AdapterSettings {
    fn default() -> Self {
        Self {
            log_level: Level::INFO,
            trace_file: None,
            breakpoint_policy: ReconcilePolicy::default(),
            configuration_done_timeout: Duration::from_secs(1),
        }
    }
}

impl AdapterSettings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let log_level = lookup("JSDBG_LOG")
            .and_then(|v| Level::from_str(v.trim()).ok())
            .unwrap_or(defaults.log_level);
        let trace_file = lookup("JSDBG_TRACE_FILE")
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from);
        let breakpoint_policy = lookup("JSDBG_BREAKPOINT_POLICY")
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.breakpoint_policy);
        let configuration_done_timeout = lookup("JSDBG_CONFIG_DONE_TIMEOUT_MS")
            .and_then(|v| v.parse::<u64>().ok())
            .map(Duration::from_millis)
            .unwrap_or(defaults.configuration_done_timeout);

        Self {
            log_level,
            trace_file,
            breakpoint_policy,
            configuration_done_timeout,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings(pairs: &[(&str, &str)]) -> AdapterSettings {
        let env: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        AdapterSettings::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn defaults_apply_without_environment() {
        let s = settings(&[]);
        assert_eq!(s.log_level, Level::INFO);
        assert!(s.trace_file.is_none());
        assert_eq!(s.breakpoint_policy, ReconcilePolicy::Optimistic);
        assert_eq!(s.configuration_done_timeout, Duration::from_secs(1));
    }

    #[test]
    fn environment_overrides_defaults() {
        let s = settings(&[
            ("JSDBG_LOG", "debug"),
            ("JSDBG_TRACE_FILE", "/tmp/jsdbg-trace.jsonl"),
            ("JSDBG_BREAKPOINT_POLICY", "strict"),
            ("JSDBG_CONFIG_DONE_TIMEOUT_MS", "250"),
        ]);
        assert_eq!(s.log_level, Level::DEBUG);
        assert_eq!(s.trace_file, Some(PathBuf::from("/tmp/jsdbg-trace.jsonl")));
        assert_eq!(s.breakpoint_policy, ReconcilePolicy::Strict);
        assert_eq!(s.configuration_done_timeout, Duration::from_millis(250));
    }

    #[test]
    fn invalid_values_fall_back() {
        let s = settings(&[
            ("JSDBG_LOG", "chatty"),
            ("JSDBG_TRACE_FILE", "  "),
            ("JSDBG_BREAKPOINT_POLICY", "sometimes"),
            ("JSDBG_CONFIG_DONE_TIMEOUT_MS", "soon"),
        ]);
        assert_eq!(s.log_level, Level::INFO);
        assert!(s.trace_file.is_none());
        assert_eq!(s.breakpoint_policy, ReconcilePolicy::Optimistic);
        assert_eq!(s.configuration_done_timeout, Duration::from_secs(1));
    }
}
