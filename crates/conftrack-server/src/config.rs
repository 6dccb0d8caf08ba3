//! Runtime configuration
//!
//! Loaded from a TOML file. Every key has a runnable default, so a
//! missing or partial file still yields a working service.
//!
//! ```toml
//! [server]
//! host = "0.0.0.0"
//! port = 8080
//!
//! [dedup]
//! edition_label = "2026"
//! edition_opens = "2026-01-15T00:00:00Z"
//!
//! [review]
//! enforce_transitions = true
//!
//! [analytics]
//! top_pages_limit = 10
//!
//! [storage]
//! document_dir = "./data/documents"
//! ```

use anyhow::Context;
use chrono::{DateTime, Utc};
use conftrack_analytics::AnalyticsConfig;
use conftrack_core::{CycleWindow, ReviewConfig};
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr};
use std::path::{Path, PathBuf};

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: HttpSettings,
    pub dedup: DedupSettings,
    pub review: ReviewSettings,
    pub analytics: AnalyticsSettings,
    pub storage: StorageSettings,
}

/// Listen address for the HTTP surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpSettings {
    pub host: IpAddr,
    pub port: u16,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 3000,
        }
    }
}

/// Duplicate-check window for registrations.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DedupSettings {
    /// Cycle label used in logs
    pub edition_label: Option<String>,
    /// When the current cycle opened, RFC 3339. Records older than
    /// this never count as duplicates.
    pub edition_opens: Option<DateTime<Utc>>,
}

impl DedupSettings {
    /// The window to guard against: the configured edition when both
    /// keys are set, otherwise a rolling window anchored at the
    /// previous New Year.
    #[must_use]
    pub fn window(&self, now: DateTime<Utc>) -> CycleWindow {
        match (&self.edition_label, self.edition_opens) {
            (Some(label), Some(opens)) => CycleWindow::configured(label.clone(), opens),
            _ => CycleWindow::rolling(now),
        }
    }
}

/// Review workflow tuning.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReviewSettings {
    /// Reject non-canonical status jumps instead of logging them
    pub enforce_transitions: bool,
}

/// Dashboard tuning.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsSettings {
    pub top_pages_limit: usize,
}

impl Default for AnalyticsSettings {
    fn default() -> Self {
        Self { top_pages_limit: 10 }
    }
}

/// Where uploaded identity documents land.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    pub document_dir: PathBuf,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            document_dir: PathBuf::from("./data/documents"),
        }
    }
}

impl AppConfig {
    /// Read a TOML file. A missing file yields the defaults.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            tracing::info!(path = %path.display(), "no configuration file, using defaults");
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading configuration at {}", path.display()))?;
        let config = toml::from_str(&raw)
            .with_context(|| format!("parsing configuration at {}", path.display()))?;
        Ok(config)
    }

    /// Review workflow configuration for the core services.
    #[inline]
    #[must_use]
    pub fn review_config(&self) -> ReviewConfig {
        ReviewConfig {
            enforce_transitions: self.review.enforce_transitions,
        }
    }

    /// Aggregator configuration for the analytics services.
    #[inline]
    #[must_use]
    pub fn analytics_config(&self) -> AnalyticsConfig {
        AnalyticsConfig {
            top_pages_limit: self.analytics.top_pages_limit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    #[test]
    fn full_file_parses() {
        let config: AppConfig = toml::from_str(
            r#"
            [server]
            host = "0.0.0.0"
            port = 8080

            [dedup]
            edition_label = "2026"
            edition_opens = "2026-01-15T00:00:00Z"

            [review]
            enforce_transitions = true

            [analytics]
            top_pages_limit = 5

            [storage]
            document_dir = "/var/lib/conftrack/documents"
            "#,
        )
        .unwrap();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.dedup.edition_label.as_deref(), Some("2026"));
        assert!(config.review.enforce_transitions);
        assert_eq!(config.analytics.top_pages_limit, 5);
        assert_eq!(
            config.storage.document_dir,
            PathBuf::from("/var/lib/conftrack/documents")
        );
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let config: AppConfig = toml::from_str("[server]\nport = 9000\n").unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, IpAddr::V4(Ipv4Addr::LOCALHOST));
        assert!(!config.review.enforce_transitions);
        assert_eq!(config.analytics.top_pages_limit, 10);
    }

    #[test]
    fn configured_edition_beats_rolling_window() {
        let now = Utc.with_ymd_and_hms(2026, 6, 1, 0, 0, 0).unwrap();
        let opens = Utc.with_ymd_and_hms(2026, 1, 15, 0, 0, 0).unwrap();

        let configured = DedupSettings {
            edition_label: Some("2026".to_string()),
            edition_opens: Some(opens),
        };
        assert_eq!(configured.window(now).opens_at(), opens);

        let fallback = DedupSettings::default();
        let window = fallback.window(now);
        assert!(window.opens_at() < now);
    }

    #[test]
    fn missing_file_yields_defaults() {
        let config = AppConfig::load(Path::new("/nonexistent/conftrack.toml")).unwrap();
        assert_eq!(config.server.port, 3000);
    }
}
