// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! CLI configuration loaded from environment variables.

use df_radiance::DEFAULT_TOLERANCE;

/// CLI configuration. Command line flags take precedence over these values.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Log filter directive (`DF_RADIANCE_LOG`, then `RUST_LOG`).
    pub log_filter: String,
    /// Geometric tolerance for translation (`DF_RADIANCE_TOLERANCE`).
    pub tolerance: f64,
    /// Pretty-print JSON outputs (`DF_RADIANCE_PRETTY`).
    pub pretty: bool,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from any key/value source. Unparsable values fall
    /// back to the defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            log_filter: lookup("DF_RADIANCE_LOG")
                .or_else(|| lookup("RUST_LOG"))
                .unwrap_or_else(|| "info".into()),
            tolerance: lookup("DF_RADIANCE_TOLERANCE")
                .and_then(|v| v.trim().parse().ok())
                .filter(|t: &f64| t.is_finite() && *t > 0.0)
                .unwrap_or(DEFAULT_TOLERANCE),
            pretty: lookup("DF_RADIANCE_PRETTY")
                .and_then(|v| parse_flag(&v))
                .unwrap_or(true),
        }
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(vars: &[(&str, &str)]) -> Config {
        Config::from_lookup(|key| {
            vars.iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.to_string())
        })
    }

    #[test]
    fn defaults_without_variables() {
        let c = config(&[]);
        assert_eq!(c.log_filter, "info");
        assert_eq!(c.tolerance, DEFAULT_TOLERANCE);
        assert!(c.pretty);
    }

    #[test]
    fn own_log_variable_wins_over_rust_log() {
        let c = config(&[("RUST_LOG", "warn"), ("DF_RADIANCE_LOG", "df_radiance=trace")]);
        assert_eq!(c.log_filter, "df_radiance=trace");
        assert_eq!(config(&[("RUST_LOG", "warn")]).log_filter, "warn");
    }

    #[test]
    fn bad_values_fall_back() {
        let c = config(&[
            ("DF_RADIANCE_TOLERANCE", "-1"),
            ("DF_RADIANCE_PRETTY", "maybe"),
        ]);
        assert_eq!(c.tolerance, DEFAULT_TOLERANCE);
        assert!(c.pretty);

        let c = config(&[
            ("DF_RADIANCE_TOLERANCE", " 0.001 "),
            ("DF_RADIANCE_PRETTY", "off"),
        ]);
        assert_eq!(c.tolerance, 0.001);
        assert!(!c.pretty);
    }
}
