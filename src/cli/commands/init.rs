//! Implementation of the `sportcache init` command.

use anyhow::{Context, Result};
use clap::Args;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::adapters::sqlite::{initialize_database, PoolConfig};
use crate::cli::output::{output, CommandOutput};
use crate::domain::models::Config;
use crate::infrastructure::config::CONFIG_DIR;

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Overwrite an existing config.yaml
    #[arg(long, short)]
    pub force: bool,

    /// Target directory (defaults to current directory)
    #[arg(default_value = ".")]
    pub path: PathBuf,
}

#[derive(Debug, serde::Serialize)]
pub struct InitOutput {
    pub success: bool,
    pub message: String,
    pub initialized_path: PathBuf,
    pub config_written: bool,
    pub database_path: PathBuf,
}

impl CommandOutput for InitOutput {
    fn to_human(&self) -> String {
        let mut lines = vec![self.message.clone()];
        if self.config_written {
            lines.push(format!("\nWrote {CONFIG_DIR}/config.yaml"));
        }
        if self.success {
            lines.push(format!("Database ready at {}", self.database_path.display()));
        }
        lines.join("\n")
    }
}

pub async fn execute(args: InitArgs, config: &Config, json_mode: bool) -> Result<()> {
    let target_path = if args.path.is_absolute() {
        args.path.clone()
    } else {
        std::env::current_dir()
            .context("Failed to get current directory")?
            .join(&args.path)
    };

    let config_dir = target_path.join(CONFIG_DIR);
    let config_file = config_dir.join("config.yaml");
    let database_path = resolve_database_path(&target_path, &config.database.path);

    if config_file.exists() && !args.force {
        let output_data = InitOutput {
            success: false,
            message: "Project already initialized. Use --force to rewrite the config.".to_string(),
            initialized_path: target_path,
            config_written: false,
            database_path,
        };
        output(&output_data, json_mode);
        return Ok(());
    }

    fs::create_dir_all(&config_dir)
        .await
        .with_context(|| format!("Failed to create {}", config_dir.display()))?;

    let yaml = serde_yaml::to_string(&Config::default()).context("Failed to render default config")?;
    fs::write(&config_file, yaml)
        .await
        .with_context(|| format!("Failed to write {}", config_file.display()))?;

    // An existing database is kept; migrations are idempotent.
    let db_url = format!("sqlite:{}", database_path.display());
    initialize_database(&db_url, Some(PoolConfig::from(&config.database)))
        .await
        .context("Failed to initialize database")?;

    let output_data = InitOutput {
        success: true,
        message: if args.force {
            "Project reinitialized successfully.".to_string()
        } else {
            "Project initialized successfully.".to_string()
        },
        initialized_path: target_path,
        config_written: true,
        database_path,
    };

    output(&output_data, json_mode);
    Ok(())
}

fn resolve_database_path(target: &Path, configured: &str) -> PathBuf {
    let configured = Path::new(configured);
    if configured.is_absolute() {
        configured.to_path_buf()
    } else {
        target.join(configured)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::config::ConfigLoader;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_init_creates_config_and_database() {
        let dir = TempDir::new().unwrap();
        let args = InitArgs {
            force: false,
            path: dir.path().to_path_buf(),
        };

        execute(args, &Config::default(), true).await.unwrap();

        assert!(dir.path().join(".sportcache/config.yaml").exists());
        assert!(dir.path().join(".sportcache/cache.db").exists());

        let written = std::fs::read_to_string(dir.path().join(".sportcache/config.yaml")).unwrap();
        let parsed: Config = serde_yaml::from_str(&written).unwrap();
        ConfigLoader::validate(&parsed).unwrap();
    }

    #[tokio::test]
    async fn test_init_keeps_existing_config_without_force() {
        let dir = TempDir::new().unwrap();
        let config_dir = dir.path().join(".sportcache");
        std::fs::create_dir_all(&config_dir).unwrap();
        std::fs::write(config_dir.join("config.yaml"), "logging:\n  level: warn\n").unwrap();

        let args = InitArgs {
            force: false,
            path: dir.path().to_path_buf(),
        };
        execute(args, &Config::default(), true).await.unwrap();

        let content = std::fs::read_to_string(config_dir.join("config.yaml")).unwrap();
        assert_eq!(content, "logging:\n  level: warn\n");
    }

    #[test]
    fn test_resolve_database_path() {
        let target = Path::new("/srv/dashboard");
        assert_eq!(
            resolve_database_path(target, ".sportcache/cache.db"),
            PathBuf::from("/srv/dashboard/.sportcache/cache.db")
        );
        assert_eq!(
            resolve_database_path(target, "/var/lib/cache.db"),
            PathBuf::from("/var/lib/cache.db")
        );
    }
}
