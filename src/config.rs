// ABOUTME: Configuration for the database connection and the spreadsheet layout
// ABOUTME: Database settings come from CLI/env, sheet layout optionally from a TOML file

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::Path;

/// Connection settings for the PostgreSQL store.
///
/// Either a full `url` or the individual parts are used; the URL wins when
/// both are present.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    pub host: String,
    pub port: u16,
    pub dbname: String,
    pub user: Option<String>,
    pub password: Option<String>,
    /// Maximum number of pooled connections
    pub pool_size: usize,
    /// Accept self-signed / invalid TLS certificates
    pub allow_self_signed_certs: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            host: "localhost".to_string(),
            port: 5432,
            dbname: "problem_tracker".to_string(),
            user: None,
            password: None,
            pool_size: 10,
            allow_self_signed_certs: false,
        }
    }
}

impl DatabaseConfig {
    /// Build the driver configuration.
    pub fn to_pg_config(&self) -> Result<tokio_postgres::Config> {
        let mut config = if let Some(url) = &self.url {
            crate::utils::validate_connection_string(url)?;
            url.parse::<tokio_postgres::Config>()
                .context("Failed to parse database URL")?
        } else {
            let mut config = tokio_postgres::Config::new();
            config.host(&self.host).port(self.port).dbname(&self.dbname);
            if let Some(user) = &self.user {
                config.user(user);
            }
            if let Some(password) = &self.password {
                config.password(password);
            }
            config
        };
        config.application_name("problem-sync");
        Ok(config)
    }

    /// A description of the target that is safe to log.
    pub fn display_target(&self) -> String {
        match &self.url {
            Some(url) => crate::utils::strip_password_from_url(url)
                .unwrap_or_else(|_| "<unparseable database url>".to_string()),
            None => format!(
                "{}@{}:{}/{}",
                self.user.as_deref().unwrap_or("(default user)"),
                self.host,
                self.port,
                self.dbname
            ),
        }
    }
}

/// Layout of the spreadsheet the sync job reads.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SyncSettings {
    /// Google spreadsheet id (the long token in the sheet URL)
    pub spreadsheet_id: String,
    /// Worksheet holding the problem rows
    pub problems_sheet: String,
    /// Worksheet whose first column lists edited row numbers
    pub tracker_sheet: String,
    pub first_column: String,
    pub last_column: String,
    /// Row holding column titles in both worksheets
    pub header_row: u32,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            spreadsheet_id: String::new(),
            problems_sheet: "problems".to_string(),
            tracker_sheet: "change_tracker".to_string(),
            first_column: "A".to_string(),
            last_column: "K".to_string(),
            header_row: 1,
        }
    }
}

impl SyncSettings {
    /// Load settings from a TOML file; missing keys take their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read sync config {}", path.display()))?;
        let settings: SyncSettings = toml::from_str(&raw)
            .with_context(|| format!("Failed to parse sync config {}", path.display()))?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if self.spreadsheet_id.trim().is_empty() {
            bail!("spreadsheet_id is required (set --spreadsheet-id, SPREADSHEET_ID or the config file)");
        }
        if self.problems_sheet.is_empty() || self.tracker_sheet.is_empty() {
            bail!("worksheet names cannot be empty");
        }
        for column in [&self.first_column, &self.last_column] {
            if column.is_empty() || !column.chars().all(|c| c.is_ascii_uppercase()) {
                bail!("invalid column {:?}: expected upper-case letters such as \"A\"", column);
            }
        }
        if self.header_row == 0 || i32::try_from(self.header_row).is_err() {
            bail!("header_row must be between 1 and {}", i32::MAX);
        }
        Ok(())
    }

    /// A1 range of the tracker's data cells, below the header.
    pub fn tracker_data_range(&self) -> String {
        format!("A{}:A", self.header_row.saturating_add(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_sync_settings_defaults() {
        let settings = SyncSettings::default();
        assert_eq!(settings.problems_sheet, "problems");
        assert_eq!(settings.tracker_sheet, "change_tracker");
        assert_eq!(settings.tracker_data_range(), "A2:A");
        // Spreadsheet id has no sensible default.
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_sync_settings_load_partial_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            "spreadsheet_id = \"1AbCdEf\"\ntracker_sheet = \"edits\"\nheader_row = 2"
        )
        .unwrap();

        let settings = SyncSettings::load(file.path()).unwrap();
        assert_eq!(settings.spreadsheet_id, "1AbCdEf");
        assert_eq!(settings.tracker_sheet, "edits");
        assert_eq!(settings.problems_sheet, "problems");
        assert_eq!(settings.tracker_data_range(), "A3:A");
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_sync_settings_rejects_unknown_keys() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "spreadsheet = \"typo\"").unwrap();
        assert!(SyncSettings::load(file.path()).is_err());
    }

    #[test]
    fn test_sync_settings_rejects_bad_columns() {
        let settings = SyncSettings {
            spreadsheet_id: "abc".to_string(),
            last_column: "k1".to_string(),
            ..SyncSettings::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_sync_settings_bounds_header_row() {
        let settings = SyncSettings {
            spreadsheet_id: "abc".to_string(),
            header_row: u32::MAX,
            ..SyncSettings::default()
        };
        assert!(settings.validate().is_err());
        assert_eq!(settings.tracker_data_range(), format!("A{}:A", u32::MAX));
    }

    #[test]
    fn test_database_config_from_parts() {
        let config = DatabaseConfig {
            user: Some("tracker".to_string()),
            password: Some("hunter2".to_string()),
            ..DatabaseConfig::default()
        };
        let pg = config.to_pg_config().unwrap();
        assert_eq!(pg.get_dbname(), Some("problem_tracker"));
        assert_eq!(pg.get_user(), Some("tracker"));
        assert_eq!(config.display_target(), "tracker@localhost:5432/problem_tracker");
    }

    #[test]
    fn test_database_config_display_hides_password() {
        let config = DatabaseConfig {
            url: Some("postgresql://tracker:hunter2@db:5432/problems".to_string()),
            ..DatabaseConfig::default()
        };
        assert!(config.to_pg_config().is_ok());
        assert!(!config.display_target().contains("hunter2"));
    }
}
