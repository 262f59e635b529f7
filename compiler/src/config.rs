// Copyright (C) 2024 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

use serde::Deserialize;

use crate::{Architecture, StroomResult};

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
#[serde(rename_all = "kebab-case")]
pub struct CompilerConfig {
    pub target: ConfigSectionTarget,
    pub liveness: ConfigSectionLiveness,
    pub bounds: ConfigSectionBounds,
}

impl CompilerConfig {
    pub fn from_toml_str(input: &str) -> StroomResult<Self> {
        Ok(toml::from_str(input)?)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
#[serde(rename_all = "kebab-case")]
pub struct ConfigSectionTarget {
    pub architecture: Architecture,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
#[serde(rename_all = "kebab-case")]
pub struct ConfigSectionLiveness {
    /// Allocate registers across exception regions instead of marking escaping lifetimes
    /// as unallocatable.
    pub optimize_try_catch: bool,

    /// Track cold (helper) code separately.
    pub helper_block_tracking: bool,

    /// Rewrite parameter slots to the registers they arrive in.
    pub register_parameters: bool,

    /// Keep stores to user-visible locals alive for the debugger.
    pub debug_mode: bool,
}

impl Default for ConfigSectionLiveness {
    fn default() -> Self {
        Self {
            optimize_try_catch: false,
            helper_block_tracking: true,
            register_parameters: false,
            debug_mode: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
#[serde(rename_all = "kebab-case")]
pub struct ConfigSectionBounds {
    pub track_relative_bounds: bool,
    pub path_dependent_values: bool,
}

impl Default for ConfigSectionBounds {
    fn default() -> Self {
        Self {
            track_relative_bounds: true,
            path_dependent_values: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_config_uses_defaults() {
        let config = CompilerConfig::from_toml_str("").unwrap();
        assert_eq!(config, CompilerConfig::default());
        assert!(config.liveness.helper_block_tracking);
        assert!(config.bounds.track_relative_bounds);
    }

    #[test]
    fn sections_are_kebab_case() {
        let config = CompilerConfig::from_toml_str(r#"
            [target]
            architecture = "arm"

            [liveness]
            optimize-try-catch = true
            register-parameters = true

            [bounds]
            path-dependent-values = false
        "#).unwrap();

        assert_eq!(config.target.architecture, Architecture::Arm);
        assert!(config.liveness.optimize_try_catch);
        assert!(config.liveness.register_parameters);
        assert!(config.liveness.helper_block_tracking);
        assert!(!config.bounds.path_dependent_values);
    }

    #[test]
    fn unknown_architecture_is_an_error() {
        let result = CompilerConfig::from_toml_str("[target]\narchitecture = \"mips\"\n");
        assert!(matches!(result, Err(crate::StroomError::InvalidConfig(..))));
    }
}
