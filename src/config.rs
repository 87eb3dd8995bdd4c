//! Growth configuration
//!
//! All numeric knobs for a generation session in one serde-friendly
//! struct, so a run can be recreated from saved parameters together with
//! its seed.

use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::policy::GrowthPolicy;

/// Strategy selector, decoupled from the per-strategy parameters so it
/// can live in config files and CLI flags.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyKind {
    WeightedRandom,
    Marching,
    Directional,
    Cluster,
    PerlinLike,
}

impl PolicyKind {
    pub fn name(&self) -> &'static str {
        match self {
            PolicyKind::WeightedRandom => "weighted_random",
            PolicyKind::Marching => "marching",
            PolicyKind::Directional => "directional",
            PolicyKind::Cluster => "cluster",
            PolicyKind::PerlinLike => "perlin_like",
        }
    }

    pub fn all() -> &'static [PolicyKind] {
        &[
            PolicyKind::WeightedRandom,
            PolicyKind::Marching,
            PolicyKind::Directional,
            PolicyKind::Cluster,
            PolicyKind::PerlinLike,
        ]
    }
}

impl std::str::FromStr for PolicyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PolicyKind::all()
            .iter()
            .copied()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| {
                format!(
                    "unknown policy '{}' (expected one of: {})",
                    s,
                    PolicyKind::all()
                        .iter()
                        .map(|k| k.name())
                        .collect::<Vec<_>>()
                        .join(", ")
                )
            })
    }
}

/// Parameters for one growth run.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct GrowthConfig {
    /// Which growth strategy drives the run.
    pub policy: PolicyKind,
    /// Number of growth passes over the island list.
    pub iterations: usize,
    /// Minimum Euclidean separation between islands' frontiers.
    pub min_distance: f64,
    /// Cells claimed per island per iteration (marching).
    pub pixels_per_iteration: usize,
    /// Frontier connectivity threshold in cells (cluster).
    pub cluster_radius: i32,
    /// Top fraction of scored cells kept before the random draw
    /// (weighted random).
    pub weighted_keep_fraction: f32,
    /// Top fraction of direction-aligned cells claimed (directional).
    pub directional_claim_fraction: f32,
    /// Fraction of each cluster claimed around its centroid (cluster).
    pub cluster_claim_fraction: f32,
    /// Top fraction of density-scored cells claimed (perlin-like).
    pub perlin_claim_fraction: f32,
}

impl Default for GrowthConfig {
    fn default() -> Self {
        Self {
            policy: PolicyKind::Marching,
            iterations: 30,
            min_distance: 4.0,
            pixels_per_iteration: 8,
            cluster_radius: 3,
            weighted_keep_fraction: 0.30,
            directional_claim_fraction: 0.15,
            cluster_claim_fraction: 0.5,
            perlin_claim_fraction: 0.20,
        }
    }
}

impl GrowthConfig {
    /// Assemble the parameterized policy for the selected kind.
    pub fn policy(&self) -> GrowthPolicy {
        match self.policy {
            PolicyKind::WeightedRandom => GrowthPolicy::WeightedRandom {
                keep_fraction: self.weighted_keep_fraction,
            },
            PolicyKind::Marching => GrowthPolicy::Marching {
                pixels_per_iteration: self.pixels_per_iteration,
            },
            PolicyKind::Directional => GrowthPolicy::Directional {
                claim_fraction: self.directional_claim_fraction,
            },
            PolicyKind::Cluster => GrowthPolicy::Cluster {
                cluster_radius: self.cluster_radius,
                claim_fraction: self.cluster_claim_fraction,
            },
            PolicyKind::PerlinLike => GrowthPolicy::PerlinLike {
                claim_fraction: self.perlin_claim_fraction,
            },
        }
    }

    /// Load a config from a JSON file.
    pub fn load(path: &Path) -> io::Result<GrowthConfig> {
        let bytes = fs::read(path)?;
        serde_json::from_slice(&bytes).map_err(|e| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("Config parse failed: {}", e),
            )
        })
    }

    /// Save the config as pretty-printed JSON.
    pub fn save(&self, path: &Path) -> io::Result<()> {
        let json = serde_json::to_string_pretty(self).map_err(|e| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("Config serialization failed: {}", e),
            )
        })?;
        fs::write(path, json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_matches_policy_defaults() {
        let config = GrowthConfig::default();
        assert_eq!(config.policy(), GrowthPolicy::marching());

        let config = GrowthConfig {
            policy: PolicyKind::Cluster,
            ..GrowthConfig::default()
        };
        assert_eq!(config.policy(), GrowthPolicy::cluster());
    }

    #[test]
    fn test_policy_kind_from_str() {
        assert_eq!(
            "weighted_random".parse::<PolicyKind>().unwrap(),
            PolicyKind::WeightedRandom
        );
        assert_eq!("marching".parse::<PolicyKind>().unwrap(), PolicyKind::Marching);
        assert!("nearest_neighbor".parse::<PolicyKind>().is_err());
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config: GrowthConfig =
            serde_json::from_str(r#"{"policy": "cluster", "iterations": 5}"#).unwrap();
        assert_eq!(config.policy, PolicyKind::Cluster);
        assert_eq!(config.iterations, 5);
        assert_eq!(config.pixels_per_iteration, 8);
        assert_eq!(config.cluster_radius, 3);
    }
}
