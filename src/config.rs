use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::advisor::AdvisorSettings;
use crate::aeration::{DEFAULT_K, DEFAULT_PH_CEILING};
use crate::chemistry::{
    Agent, ChemistryModel, EffectModel, ModelError, NameError, Parameter, ParameterSpec,
    TargetTable,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(transparent)]
    Name(#[from] NameError),
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error("aeration.{field} must be a positive finite number, got {value}")]
    InvalidAeration { field: &'static str, value: f64 },
}

/// On-disk configuration.
///
/// `targets` and `effects` are layered over the built-in tables: a listed
/// parameter replaces its spec, a listed agent replaces its whole effect vector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub targets: BTreeMap<String, ParameterSpec>,
    #[serde(default)]
    pub effects: BTreeMap<String, BTreeMap<String, f64>>,
    #[serde(default)]
    pub aeration: AerationConfig,
    #[serde(default)]
    pub advisor: AdvisorConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AerationConfig {
    #[serde(default = "default_k")]
    pub default_k: f64,
    /// Last calibrated coefficient; wins over `default_k` when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calibrated_k: Option<f64>,
    #[serde(default = "default_ph_ceiling")]
    pub ph_ceiling: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdvisorConfig {
    #[serde(default = "default_ta_trigger_margin")]
    pub ta_trigger_margin: f64,
}

#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub k: Option<f64>,
}

impl Config {
    pub fn default_path() -> PathBuf {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        home.join(".config/dosing-oracle/config.toml")
    }

    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = path
            .map(|p| p.to_path_buf())
            .unwrap_or_else(Self::default_path);
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = fs::read_to_string(&path)
            .with_context(|| format!("failed reading config: {}", path.display()))?;
        let parsed: Self = toml::from_str(&data)
            .with_context(|| format!("failed parsing TOML config: {}", path.display()))?;
        Ok(parsed)
    }

    pub fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(k) = overrides.k {
            self.aeration.calibrated_k = Some(k);
        }
    }

    /// Validated, immutable model built from the built-in tables plus this file.
    pub fn build_model(&self) -> Result<ChemistryModel, ConfigError> {
        let mut targets = TargetTable::standard();
        for (name, spec) in &self.targets {
            let parameter: Parameter = name.parse()?;
            targets.set(parameter, *spec);
        }

        let mut effects = EffectModel::standard();
        for (name, vector) in &self.effects {
            let agent: Agent = name.parse()?;
            let parsed = vector
                .iter()
                .map(|(p, v)| p.parse::<Parameter>().map(|parameter| (parameter, *v)))
                .collect::<Result<BTreeMap<_, _>, NameError>>()?;
            effects.replace_agent(agent, &parsed);
        }

        self.validate_aeration()?;
        Ok(ChemistryModel::new(effects, targets)?)
    }

    fn validate_aeration(&self) -> Result<(), ConfigError> {
        let fields = [
            ("default_k", Some(self.aeration.default_k)),
            ("calibrated_k", self.aeration.calibrated_k),
            ("ph_ceiling", Some(self.aeration.ph_ceiling)),
        ];
        for (field, value) in fields {
            if let Some(value) = value {
                if !value.is_finite() || value <= 0.0 {
                    return Err(ConfigError::InvalidAeration { field, value });
                }
            }
        }
        Ok(())
    }

    pub fn effective_k(&self) -> f64 {
        self.aeration.calibrated_k.unwrap_or(self.aeration.default_k)
    }

    pub fn advisor_settings(&self) -> AdvisorSettings {
        AdvisorSettings {
            ta_trigger_margin: self.advisor.ta_trigger_margin,
            aeration_k: self.effective_k(),
        }
    }

    pub fn write_template(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("failed creating config directory: {}", parent.display())
            })?;
        }
        fs::write(path, Self::default_template())
            .with_context(|| format!("failed writing config template: {}", path.display()))
    }

    pub fn default_template() -> String {
        let template = r#"# Operational target and acceptable range per parameter.
# Listing a parameter replaces its built-in spec.
[targets.ph]
target = 7.2
min = 7.2
max = 7.8

[targets.ta]
target = 80.0
min = 40.0
max = 120.0

[targets.fac]
target = 3.0
min = 1.0
max = 5.0

[targets.cya]
target = 0.0
min = 0.0
max = 50.0
hard_ceiling = 100.0

[targets.salt]
target = 1750.0
min = 1500.0
max = 2000.0

# Change per unit of agent. Listing an agent replaces its whole vector;
# parameters left out are treated as 0.
[effects.bisulfate]
ph = -0.15
ta = -5.0

[effects.carbonate]
ph = 0.10
ta = 8.0

[effects.bicarbonate]
ta = 7.0

[effects.dichlor]
fac = 1.2
cya = 0.9

[effects.salt]
salt = 228.0

[aeration]
default_k = 0.10
# calibrated_k = 0.12
ph_ceiling = 8.4

[advisor]
ta_trigger_margin = 5.0
"#;
        template.to_string()
    }
}

impl Default for Config {
    fn default() -> Self {
        let targets = TargetTable::standard()
            .iter()
            .map(|(parameter, spec)| (parameter.as_slug().to_string(), *spec))
            .collect();
        let standard = EffectModel::standard();
        let effects = Agent::ALL
            .iter()
            .map(|agent| {
                let vector = standard
                    .effect_vector(*agent)
                    .into_iter()
                    .map(|(parameter, value)| (parameter.as_slug().to_string(), value))
                    .collect();
                (agent.as_slug().to_string(), vector)
            })
            .collect();
        Self {
            targets,
            effects,
            aeration: AerationConfig::default(),
            advisor: AdvisorConfig::default(),
        }
    }
}

impl Default for AerationConfig {
    fn default() -> Self {
        Self {
            default_k: default_k(),
            calibrated_k: None,
            ph_ceiling: default_ph_ceiling(),
        }
    }
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self {
            ta_trigger_margin: default_ta_trigger_margin(),
        }
    }
}

fn default_k() -> f64 {
    DEFAULT_K
}

fn default_ph_ceiling() -> f64 {
    DEFAULT_PH_CEILING
}

fn default_ta_trigger_margin() -> f64 {
    5.0
}
