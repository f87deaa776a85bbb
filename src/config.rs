use std::path::{Path, PathBuf};

use clap::Parser;
use serde::Deserialize;
use thiserror::Error;

use crate::data::loader::LoadOptions;
use crate::data::model::ColumnNames;

/// Config file picked up from the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "dashboard.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("reading config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parsing config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("delimiter must be a single ASCII character, got {0:?}")]
    Delimiter(char),
}

// ---------------------------------------------------------------------------
// Command line
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Parser)]
#[command(name = "sales-dashboard")]
#[command(about = "Interactive supermarket sales dashboard")]
#[command(after_help = "Environment:\n  RUST_LOG   Log verbosity (error, warn, info, debug)")]
pub struct Cli {
    /// JSON config file (defaults to ./dashboard.json when present)
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Sales data file (.csv, .tsv, .json or .parquet)
    #[arg(long)]
    pub data: Option<PathBuf>,
    /// Field delimiter for delimited text input
    #[arg(long)]
    pub delimiter: Option<char>,
}

// ---------------------------------------------------------------------------
// Resolved configuration
// ---------------------------------------------------------------------------

/// Everything the dashboard needs to start. Every field has a default, so a
/// config file only lists what it overrides.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub data_path: PathBuf,
    pub delimiter: char,
    pub columns: ColumnNames,
    /// File name stem for downloads, without extension.
    pub export_stem: String,
    pub currency_symbol: String,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("data/sales_data.csv"),
            delimiter: ',',
            columns: ColumnNames::default(),
            export_stem: "filtrelenmis_satislar".to_string(),
            currency_symbol: "₺".to_string(),
        }
    }
}

impl DashboardConfig {
    /// Defaults, then the config file, then command-line flags.
    pub fn resolve(cli: &Cli) -> Result<Self, ConfigError> {
        let mut config = match &cli.config {
            Some(path) => Self::from_file(path)?,
            None => {
                let fallback = Path::new(DEFAULT_CONFIG_FILE);
                if fallback.is_file() {
                    Self::from_file(fallback)?
                } else {
                    Self::default()
                }
            }
        };

        if let Some(data) = &cli.data {
            config.data_path = data.clone();
        }
        if let Some(delimiter) = cli.delimiter {
            config.delimiter = delimiter;
        }

        config.delimiter_byte()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        log::info!("using config file {}", path.display());
        Ok(config)
    }

    fn delimiter_byte(&self) -> Result<u8, ConfigError> {
        u8::try_from(self.delimiter)
            .ok()
            .filter(u8::is_ascii)
            .ok_or(ConfigError::Delimiter(self.delimiter))
    }

    pub fn load_options(&self) -> Result<LoadOptions, ConfigError> {
        Ok(LoadOptions {
            columns: self.columns.clone(),
            delimiter: self.delimiter_byte()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn defaults_match_the_sales_file() {
        let config = DashboardConfig::default();
        assert_eq!(config.data_path, PathBuf::from("data/sales_data.csv"));
        assert_eq!(config.columns.city, "Şehir");
        assert_eq!(config.load_options().unwrap().delimiter, b',');
    }

    #[test]
    fn file_overrides_only_listed_fields() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{ "delimiter": ";", "columns": {{ "city": "City" }}, "export_stem": "report" }}"#
        )
        .unwrap();

        let config = DashboardConfig::from_file(file.path()).unwrap();
        assert_eq!(config.delimiter, ';');
        assert_eq!(config.columns.city, "City");
        assert_eq!(config.columns.date, "Tarih");
        assert_eq!(config.export_stem, "report");
        assert_eq!(config.currency_symbol, "₺");
    }

    #[test]
    fn cli_flags_win_over_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "data_path": "from_file.csv" }}"#).unwrap();

        let cli = Cli {
            config: Some(file.path().to_path_buf()),
            data: Some(PathBuf::from("from_cli.csv")),
            delimiter: Some('\t'),
        };
        let config = DashboardConfig::resolve(&cli).unwrap();
        assert_eq!(config.data_path, PathBuf::from("from_cli.csv"));
        assert_eq!(config.load_options().unwrap().delimiter, b'\t');
    }

    #[test]
    fn rejects_non_ascii_delimiter() {
        let cli = Cli {
            config: None,
            data: None,
            delimiter: Some('ş'),
        };
        assert!(matches!(
            DashboardConfig::resolve(&cli),
            Err(ConfigError::Delimiter('ş'))
        ));
    }

    #[test]
    fn broken_config_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();
        assert!(matches!(
            DashboardConfig::from_file(file.path()),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn cli_parses_flags() {
        let cli = Cli::try_parse_from(["sales-dashboard", "--data", "x.parquet", "--delimiter", ";"]).unwrap();
        assert_eq!(cli.data, Some(PathBuf::from("x.parquet")));
        assert_eq!(cli.delimiter, Some(';'));
        assert_eq!(cli.config, None);
    }
}
