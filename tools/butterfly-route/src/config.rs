//! Prune configuration file
//!
//! ```toml
//! min_network_size = 200
//! min_oneway_network_size = 20
//!
//! [[profiles]]
//! name = "car"
//! traversal = "edge-based"
//!
//! [[profiles]]
//! name = "foot"
//! ```
//!
//! Command-line flags override values from the file.

use std::path::Path;

use anyhow::{bail, Context, Result};
use butterfly_routing::{PrepareJob, PruneConfig, TraversalMode};
use serde::Deserialize;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToolConfig {
    pub min_network_size: Option<usize>,
    pub min_oneway_network_size: Option<usize>,
    pub profiles: Vec<ProfileEntry>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProfileEntry {
    pub name: String,
    #[serde(default)]
    pub traversal: TraversalMode,
}

impl ToolConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("Invalid config {}", path.display()))
    }

    /// Thresholds with `min_network_size` / `min_oneway_network_size` from the
    /// command line taking precedence
    pub fn prune_config(
        &self,
        min_network_size: Option<usize>,
        min_oneway_network_size: Option<usize>,
    ) -> PruneConfig {
        let defaults = PruneConfig::default();
        PruneConfig {
            min_network_size: min_network_size
                .or(self.min_network_size)
                .unwrap_or(defaults.min_network_size),
            min_oneway_network_size: min_oneway_network_size
                .or(self.min_oneway_network_size)
                .unwrap_or(defaults.min_oneway_network_size),
        }
    }

    /// Jobs from `--profile` arguments if any, else from the file
    pub fn jobs(&self, profile_args: &[String]) -> Result<Vec<PrepareJob>> {
        if !profile_args.is_empty() {
            return profile_args.iter().map(|arg| parse_job(arg)).collect();
        }
        Ok(self
            .profiles
            .iter()
            .map(|entry| PrepareJob {
                name: entry.name.clone(),
                traversal: entry.traversal,
            })
            .collect())
    }
}

/// `car` or `car:edge-based` / `car:node-based`
pub fn parse_job(arg: &str) -> Result<PrepareJob> {
    let (name, traversal) = match arg.split_once(':') {
        None => (arg, TraversalMode::NodeBased),
        Some((name, "node-based")) => (name, TraversalMode::NodeBased),
        Some((name, "edge-based")) => (name, TraversalMode::EdgeBased),
        Some((_, other)) => bail!(
            "unknown traversal '{}' in '{}', expected node-based or edge-based",
            other,
            arg
        ),
    };
    if name.is_empty() {
        bail!("empty profile name in '{}'", arg);
    }
    Ok(PrepareJob {
        name: name.to_string(),
        traversal,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let config: ToolConfig = toml::from_str(
            r#"
            min_network_size = 50

            [[profiles]]
            name = "car"
            traversal = "edge-based"

            [[profiles]]
            name = "foot"
            "#,
        )
        .unwrap();
        assert_eq!(config.min_network_size, Some(50));
        assert_eq!(config.min_oneway_network_size, None);

        let jobs = config.jobs(&[]).unwrap();
        assert_eq!(jobs, vec![PrepareJob::edge_based("car"), PrepareJob::node_based("foot")]);

        let prune = config.prune_config(None, Some(3));
        assert_eq!(prune.min_network_size, 50);
        assert_eq!(prune.min_oneway_network_size, 3);
    }

    #[test]
    fn test_flags_override_file() {
        let config = ToolConfig {
            min_network_size: Some(50),
            ..Default::default()
        };
        assert_eq!(config.prune_config(Some(0), None).min_network_size, 0);
        assert_eq!(ToolConfig::default().prune_config(None, None), PruneConfig::default());

        let jobs = config.jobs(&["bike:edge-based".to_string()]).unwrap();
        assert_eq!(jobs[0].traversal, TraversalMode::EdgeBased);
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        let err = toml::from_str::<ToolConfig>("min_size = 3").unwrap_err();
        assert!(err.to_string().contains("min_size"));
    }

    #[test]
    fn test_parse_job() {
        assert_eq!(parse_job("car").unwrap(), PrepareJob::node_based("car"));
        assert_eq!(parse_job("car:node-based").unwrap(), PrepareJob::node_based("car"));
        assert!(parse_job("car:cch").is_err());
        assert!(parse_job(":edge-based").is_err());
    }
}
