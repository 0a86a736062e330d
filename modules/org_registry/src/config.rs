//! Configuration for the organization registry module

use figment::{
    providers::{Env, Format, Serialized, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable prefix, e.g. `ORG_REGISTRY_DATABASE_URL`
pub const ENV_PREFIX: &str = "ORG_REGISTRY_";

/// Organization registry configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// SeaORM connection string (`postgres://...` or `sqlite://...`)
    #[serde(default = "default_database_url")]
    pub database_url: String,

    /// Connection pool size
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Organizations per normalization batch
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Apply schema migrations on startup
    #[serde(default = "default_true")]
    pub run_schema_migrations: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: default_database_url(),
            max_connections: default_max_connections(),
            batch_size: default_batch_size(),
            run_schema_migrations: true,
        }
    }
}

impl Config {
    /// Defaults, then the optional YAML file, then `ORG_REGISTRY_*` variables
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        if let Some(path) = path {
            figment = figment.merge(Yaml::file(path));
        }
        let config: Config = figment.merge(Env::prefixed(ENV_PREFIX)).extract()?;
        Ok(config)
    }
}

fn default_database_url() -> String {
    "sqlite://org_registry.db?mode=rwc".to_string()
}

fn default_max_connections() -> u32 {
    10
}

fn default_batch_size() -> usize {
    crate::contract::DEFAULT_BATCH_SIZE
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_sources() {
        figment::Jail::expect_with(|_jail| {
            let config = Config::load(None).map_err(|e| e.to_string())?;
            assert_eq!(config, Config::default());
            assert_eq!(config.batch_size, 10);
            Ok(())
        });
    }

    #[test]
    fn test_yaml_file_then_env_override() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "registry.yaml",
                "database_url: postgres://registry@localhost/orgs\nbatch_size: 25\n",
            )?;
            jail.set_env("ORG_REGISTRY_BATCH_SIZE", "50");

            let config =
                Config::load(Some(Path::new("registry.yaml"))).map_err(|e| e.to_string())?;
            assert_eq!(config.database_url, "postgres://registry@localhost/orgs");
            assert_eq!(config.batch_size, 50);
            assert!(config.run_schema_migrations);
            Ok(())
        });
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("registry.yaml");
        std::fs::write(&path, "batch_size: 5\nretention_days: 30\n").expect("write config");

        assert!(Config::load(Some(&path)).is_err());
    }
}
