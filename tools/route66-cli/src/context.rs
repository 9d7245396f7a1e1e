//! CLI execution context.

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use route66_commerce::catalog::{load_catalog, Product};
use route66_commerce::checkout::TransactionLog;
use route66_observability::{init_logging, LogConfig, LogLevel, LogWriter};
use route66_storage::FileStore;

use crate::config::{CliConfig, CONFIG_FILE_NAMES};
use crate::output::Output;

/// Execution context for CLI commands.
pub struct Context {
    /// CLI configuration.
    pub config: CliConfig,
    /// Where the config came from, if a file was found.
    pub config_path: Option<PathBuf>,
    /// Output handler.
    pub output: Output,
    /// Working directory.
    pub cwd: PathBuf,
}

impl Context {
    /// Load context from config file.
    pub fn load(config_path: Option<&str>, output: Output) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current directory")?;

        let (config, config_path) = match config_path {
            Some(path) => (CliConfig::load(path)?, Some(PathBuf::from(path))),
            None => match find_config(&cwd) {
                Some(path) => {
                    let config = CliConfig::load(&path.to_string_lossy())?;
                    (config, Some(path))
                }
                None => (CliConfig::default(), None),
            },
        };

        Ok(Self {
            config,
            config_path,
            output,
            cwd,
        })
    }

    /// Install the tracing subscriber.
    pub fn init_logging(&self) -> Result<()> {
        init_logging(&self.log_config()).context("Failed to initialise logging")
    }

    /// Logging settings for this run. Logs go to stderr so stdout carries
    /// only command output; `--verbose` raises the level to debug and
    /// `--json` logs warnings only.
    pub fn log_config(&self) -> LogConfig {
        let mut logging = self.config.logging.clone().with_writer(LogWriter::Stderr);
        if self.output.is_verbose() {
            logging.level = LogLevel::Debug;
        } else if self.output.is_json() {
            logging.level = logging.level.max(LogLevel::Warn);
        }
        logging
    }

    /// Resolve a path relative to the working directory.
    pub fn resolve_path(&self, path: &str) -> PathBuf {
        if Path::new(path).is_absolute() {
            PathBuf::from(path)
        } else {
            self.cwd.join(path)
        }
    }

    /// Catalog path, from the flag or the config.
    pub fn catalog_path(&self, flag: Option<&str>) -> PathBuf {
        self.resolve_path(flag.unwrap_or(&self.config.catalog.path))
    }

    /// Load and validate the catalog.
    pub fn load_catalog(&self, flag: Option<&str>) -> Result<Vec<Product>> {
        let path = self.catalog_path(flag);
        self.output
            .debug(&format!("Loading catalog from {}", path.display()));
        load_catalog(&path).with_context(|| format!("Invalid catalog: {}", path.display()))
    }

    /// Directory-backed store for the local cart.
    pub fn cart_store(&self, flag: Option<&str>) -> Result<FileStore> {
        let dir = self.resolve_path(flag.unwrap_or(&self.config.cart.store_dir));
        FileStore::open(&dir)
            .with_context(|| format!("Failed to open cart storage: {}", dir.display()))
    }

    /// Transaction log named in the config.
    pub fn transaction_log(&self) -> TransactionLog {
        TransactionLog::new(self.resolve_path(&self.config.server.transaction_log))
    }
}

/// Find a config file in the directory tree, starting at `start`.
pub fn find_config(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();
    loop {
        for name in &CONFIG_FILE_NAMES {
            let candidate = current.join(name);
            if candidate.is_file() {
                return Some(candidate);
            }
        }

        if !current.pop() {
            break;
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_config_walks_up() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(dir.path().join("route66.toml"), "").unwrap();

        let found = find_config(&nested).unwrap();
        assert_eq!(found, dir.path().join("route66.toml"));
    }

    #[test]
    fn test_find_config_prefers_nearest() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("shop");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(dir.path().join("route66.toml"), "").unwrap();
        std::fs::write(nested.join("route66.json"), "{}").unwrap();

        assert_eq!(find_config(&nested).unwrap(), nested.join("route66.json"));
    }

    #[test]
    fn test_resolve_path() {
        let ctx = Context {
            config: CliConfig::default(),
            config_path: None,
            output: Output::new(false, true),
            cwd: PathBuf::from("/srv/shop"),
        };
        assert_eq!(
            ctx.catalog_path(None),
            PathBuf::from("/srv/shop/data/products.json")
        );
        assert_eq!(
            ctx.catalog_path(Some("/tmp/catalog.json")),
            PathBuf::from("/tmp/catalog.json")
        );
    }

    #[test]
    fn test_log_config_keeps_stdout_clean() {
        let ctx = |verbose, json| Context {
            config: CliConfig::default(),
            config_path: None,
            output: Output::new(verbose, json),
            cwd: PathBuf::from("/srv/shop"),
        };

        let json = ctx(false, true).log_config();
        assert_eq!(json.writer, LogWriter::Stderr);
        assert_eq!(json.level, LogLevel::Warn);

        let verbose = ctx(true, false).log_config();
        assert_eq!(verbose.writer, LogWriter::Stderr);
        assert_eq!(verbose.level, LogLevel::Debug);
    }
}
