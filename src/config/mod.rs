use miette::{IntoDiagnostic, Result, WrapErr};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Configuration for a cleaning pass.
///
/// Each `remove_unused_*` flag opts one declaration kind into removal; the
/// exclusion lists name members that must survive regardless of usage.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CleanConfig {
    pub remove_unused_imports: bool,

    pub remove_unused_variables: bool,

    pub remove_unused_classes: bool,

    pub remove_unused_interfaces: bool,

    pub remove_unused_annotation_types: bool,

    pub remove_unused_enumerations: bool,

    pub remove_unused_methods: bool,

    pub remove_unused_fields: bool,

    /// Skip the serialization-hook protections entirely, so hook-shaped
    /// methods are treated like any other member.
    pub ignore_serialization_contract_methods: bool,

    /// Also delete statements that are structurally empty (an `if` with
    /// empty branches, a loop with an empty body, a bare `;`).
    pub prune_empty_statements: bool,

    /// Method signatures to always preserve: `Owner#name(param, param)`.
    pub excluded_methods: Vec<String>,

    /// Field signatures to always preserve: `Owner#name`.
    pub excluded_fields: Vec<String>,
}

impl Default for CleanConfig {
    fn default() -> Self {
        Self {
            remove_unused_imports: true,
            remove_unused_variables: true,
            remove_unused_classes: true,
            remove_unused_interfaces: true,
            remove_unused_annotation_types: true,
            remove_unused_enumerations: true,
            remove_unused_methods: true,
            remove_unused_fields: true,
            ignore_serialization_contract_methods: false,
            prune_empty_statements: false,
            excluded_methods: vec![],
            excluded_fields: vec![],
        }
    }
}

impl CleanConfig {
    /// Load configuration from a file (YAML, TOML or JSON)
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .into_diagnostic()
            .wrap_err_with(|| format!("Failed to read config file: {}", path.display()))?;

        let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");

        match extension {
            "yml" | "yaml" => serde_yaml::from_str(&contents)
                .into_diagnostic()
                .wrap_err("Failed to parse YAML config"),
            "toml" => toml::from_str(&contents)
                .into_diagnostic()
                .wrap_err("Failed to parse TOML config"),
            "json" => serde_json::from_str(&contents)
                .into_diagnostic()
                .wrap_err("Failed to parse JSON config"),
            _ => {
                // Try YAML first, then TOML
                if let Ok(config) = serde_yaml::from_str(&contents) {
                    Ok(config)
                } else {
                    toml::from_str(&contents)
                        .into_diagnostic()
                        .wrap_err("Failed to parse config file")
                }
            }
        }
    }

    /// Try to load configuration from default locations
    pub fn from_default_locations(project_root: &Path) -> Result<Self> {
        let default_names = [
            ".deadsweep.yml",
            ".deadsweep.yaml",
            ".deadsweep.toml",
            ".deadsweep.json",
            "deadsweep.yml",
            "deadsweep.yaml",
            "deadsweep.toml",
        ];

        for name in &default_names {
            let path = project_root.join(name);
            if path.exists() {
                return Self::from_file(&path);
            }
        }

        // No config file found, use defaults
        Ok(Self::default())
    }
}

/// A configuration entry the cleaner cannot act on. Surfaced when the
/// cleaner is constructed, never from inside the traversal.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid method exclusion `{entry}`: {reason}")]
    InvalidMethodExclusion { entry: String, reason: &'static str },

    #[error("invalid field exclusion `{entry}`: {reason}")]
    InvalidFieldExclusion { entry: String, reason: &'static str },
}
