use hdbridge_image::Metric;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Tolerance used by `assert_close` when the caller gives none.
pub const DEFAULT_TOLERANCE: f64 = 0.01;

/// Where references live and how frames are judged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotConfig {
    /// Root directory; references are stored at `<root>/<case>/<name>`.
    pub root: PathBuf,
    pub default_tolerance: f64,
    pub metric: Metric,
    /// Write captured frames as new references instead of comparing.
    pub record: bool,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("snapshots"),
            default_tolerance: DEFAULT_TOLERANCE,
            metric: Metric::default(),
            record: false,
        }
    }
}

impl SnapshotConfig {
    /// Defaults overridden by `HDBRIDGE_SNAPSHOT_DIR` and `HDBRIDGE_UPDATE_SNAPSHOTS`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`SnapshotConfig::from_env`] with an explicit variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(dir) = lookup("HDBRIDGE_SNAPSHOT_DIR").filter(|d| !d.is_empty()) {
            config.root = PathBuf::from(dir);
        }
        if let Some(flag) = lookup("HDBRIDGE_UPDATE_SNAPSHOTS") {
            config.record = matches!(flag.trim(), "1" | "true" | "yes" | "on");
        }
        config
    }

    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = root.into();
        self
    }

    pub fn with_record(mut self, record: bool) -> Self {
        self.record = record;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = SnapshotConfig::default();
        assert_eq!(config.default_tolerance, DEFAULT_TOLERANCE);
        assert_eq!(config.metric, Metric::MeanAbsolute);
        assert!(!config.record);
    }

    #[test]
    fn lookup_overrides_root_and_record() {
        let config = SnapshotConfig::from_lookup(|key| match key {
            "HDBRIDGE_SNAPSHOT_DIR" => Some("/tmp/refs".into()),
            "HDBRIDGE_UPDATE_SNAPSHOTS" => Some("1".into()),
            _ => None,
        });
        assert_eq!(config.root, PathBuf::from("/tmp/refs"));
        assert!(config.record);
    }

    #[test]
    fn unknown_record_value_stays_off() {
        let config = SnapshotConfig::from_lookup(|key| {
            (key == "HDBRIDGE_UPDATE_SNAPSHOTS").then(|| "maybe".to_string())
        });
        assert!(!config.record);
        assert_eq!(config.root, PathBuf::from("snapshots"));
    }
}
