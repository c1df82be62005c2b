//! Engine settings
//!
//! Manages the persisted configuration for automatic backups: schedule,
//! retention, and which data categories an automatic run covers.

use chrono::{DateTime, Duration, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use super::paths::AppPaths;
use crate::error::BackupError;

/// How often automatic backups should run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BackupFrequency {
    /// Once per day (default)
    #[default]
    Daily,
    /// Once per week
    Weekly,
    /// Once per month
    Monthly,
}

impl BackupFrequency {
    /// Minimum interval between two automatic runs
    pub fn interval(&self) -> Duration {
        match self {
            Self::Daily => Duration::days(1),
            Self::Weekly => Duration::weeks(1),
            Self::Monthly => Duration::days(30),
        }
    }
}

impl std::fmt::Display for BackupFrequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Daily => write!(f, "daily"),
            Self::Weekly => write!(f, "weekly"),
            Self::Monthly => write!(f, "monthly"),
        }
    }
}

/// Automatic backup configuration
///
/// The `encryption` and `cloud_sync` flags are reserved for future use:
/// they round-trip through the config file but no code path acts on them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutoBackupSettings {
    /// Whether automatic backups are enabled
    #[serde(default)]
    pub enabled: bool,

    /// How often automatic backups run
    #[serde(default)]
    pub frequency: BackupFrequency,

    /// Preferred time of day for automatic runs ("HH:MM", 24h)
    #[serde(default = "default_time_of_day")]
    pub time_of_day: String,

    /// How many days backup artifacts are kept before pruning
    #[serde(default = "default_retention_days")]
    pub retention_days: u32,

    /// Include sales and cash-flow collections in automatic runs
    #[serde(default = "default_true")]
    pub include_sales: bool,

    /// Include product and category collections in automatic runs
    #[serde(default = "default_true")]
    pub include_products: bool,

    /// Include user and permission collections in automatic runs
    #[serde(default = "default_true")]
    pub include_users: bool,

    /// Include configuration and preference slots in automatic runs
    #[serde(default = "default_true")]
    pub include_settings: bool,

    /// Reserved: artifact encryption is not implemented
    #[serde(default)]
    pub encryption: bool,

    /// Reserved: cloud synchronization is not implemented
    #[serde(default)]
    pub cloud_sync: bool,
}

fn default_time_of_day() -> String {
    "03:00".to_string()
}

fn default_retention_days() -> u32 {
    30
}

fn default_true() -> bool {
    true
}

impl Default for AutoBackupSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            frequency: BackupFrequency::default(),
            time_of_day: default_time_of_day(),
            retention_days: default_retention_days(),
            include_sales: true,
            include_products: true,
            include_users: true,
            include_settings: true,
            encryption: false,
            cloud_sync: false,
        }
    }
}

impl AutoBackupSettings {
    /// Parse the configured time of day, falling back to 03:00 on bad input
    pub fn scheduled_time(&self) -> NaiveTime {
        NaiveTime::parse_from_str(&self.time_of_day, "%H:%M")
            .unwrap_or_else(|_| NaiveTime::from_hms_opt(3, 0, 0).unwrap())
    }

    /// Decide whether an automatic backup is due
    ///
    /// The actual scheduling trigger is owned by the host application;
    /// this only answers "should a run happen now, given the last one".
    pub fn is_due(&self, last_run: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
        if !self.enabled {
            return false;
        }

        let last_run = match last_run {
            Some(t) => t,
            // Never ran: due as soon as the scheduled time has passed today
            None => return now.time() >= self.scheduled_time(),
        };

        let next = last_run + self.frequency.interval();
        now >= next && now.time() >= self.scheduled_time()
    }
}

/// Persisted engine settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Automatic backup configuration
    #[serde(default)]
    pub auto_backup: AutoBackupSettings,
}

fn default_schema_version() -> u32 {
    1
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            auto_backup: AutoBackupSettings::default(),
        }
    }
}

impl Settings {
    /// Load settings from disk, or create default settings if file doesn't exist
    pub fn load_or_create(paths: &AppPaths) -> Result<Self, BackupError> {
        let settings_path = paths.settings_file();

        if settings_path.exists() {
            let contents = std::fs::read_to_string(&settings_path)
                .map_err(|e| BackupError::Io(format!("Failed to read settings file: {}", e)))?;

            let settings: Settings = serde_json::from_str(&contents)
                .map_err(|e| BackupError::Config(format!("Failed to parse settings file: {}", e)))?;

            Ok(settings)
        } else {
            // Don't save yet - let caller decide when to persist
            Ok(Settings::default())
        }
    }

    /// Save settings to disk
    pub fn save(&self, paths: &AppPaths) -> Result<(), BackupError> {
        paths.ensure_directories()?;

        let settings_path = paths.settings_file();
        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| BackupError::Config(format!("Failed to serialize settings: {}", e)))?;

        std::fs::write(&settings_path, contents)
            .map_err(|e| BackupError::Io(format!("Failed to write settings file: {}", e)))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert!(!settings.auto_backup.enabled);
        assert_eq!(settings.auto_backup.frequency, BackupFrequency::Daily);
        assert_eq!(settings.auto_backup.retention_days, 30);
        assert!(settings.auto_backup.include_sales);
        assert!(!settings.auto_backup.encryption);
        assert!(!settings.auto_backup.cloud_sync);
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let paths = AppPaths::with_base_dir(temp_dir.path().to_path_buf());

        let mut settings = Settings::default();
        settings.auto_backup.enabled = true;
        settings.auto_backup.frequency = BackupFrequency::Weekly;
        settings.auto_backup.retention_days = 14;

        settings.save(&paths).unwrap();

        let loaded = Settings::load_or_create(&paths).unwrap();
        assert!(loaded.auto_backup.enabled);
        assert_eq!(loaded.auto_backup.frequency, BackupFrequency::Weekly);
        assert_eq!(loaded.auto_backup.retention_days, 14);
    }

    #[test]
    fn test_serde_round_trip() {
        let settings = Settings::default();
        let json = serde_json::to_string(&settings).unwrap();
        let deserialized: Settings = serde_json::from_str(&json).unwrap();
        assert_eq!(
            settings.auto_backup.frequency,
            deserialized.auto_backup.frequency
        );
    }

    #[test]
    fn test_reserved_flags_round_trip() {
        let mut settings = Settings::default();
        settings.auto_backup.encryption = true;
        settings.auto_backup.cloud_sync = true;

        let json = serde_json::to_string(&settings).unwrap();
        let loaded: Settings = serde_json::from_str(&json).unwrap();

        assert!(loaded.auto_backup.encryption);
        assert!(loaded.auto_backup.cloud_sync);
    }

    #[test]
    fn test_is_due_disabled() {
        let settings = AutoBackupSettings::default();
        let now = Utc.with_ymd_and_hms(2025, 6, 10, 12, 0, 0).unwrap();
        assert!(!settings.is_due(None, now));
    }

    #[test]
    fn test_is_due_daily() {
        let mut settings = AutoBackupSettings::default();
        settings.enabled = true;
        settings.time_of_day = "03:00".to_string();

        let last = Utc.with_ymd_and_hms(2025, 6, 9, 3, 0, 0).unwrap();

        // Next morning after the scheduled time
        let now = Utc.with_ymd_and_hms(2025, 6, 10, 4, 0, 0).unwrap();
        assert!(settings.is_due(Some(last), now));

        // Same day, interval not elapsed
        let too_soon = Utc.with_ymd_and_hms(2025, 6, 9, 23, 0, 0).unwrap();
        assert!(!settings.is_due(Some(last), too_soon));
    }

    #[test]
    fn test_is_due_never_ran() {
        let mut settings = AutoBackupSettings::default();
        settings.enabled = true;
        settings.time_of_day = "03:00".to_string();

        let before = Utc.with_ymd_and_hms(2025, 6, 10, 2, 0, 0).unwrap();
        let after = Utc.with_ymd_and_hms(2025, 6, 10, 8, 0, 0).unwrap();

        assert!(!settings.is_due(None, before));
        assert!(settings.is_due(None, after));
    }

    #[test]
    fn test_bad_time_of_day_falls_back() {
        let mut settings = AutoBackupSettings::default();
        settings.time_of_day = "not a time".to_string();
        assert_eq!(
            settings.scheduled_time(),
            NaiveTime::from_hms_opt(3, 0, 0).unwrap()
        );
    }
}
