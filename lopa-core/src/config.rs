//! Configuration file support for LOPA calculations
//!
//! Loads site-specific thresholds from JSON files.
//!
//! Search order:
//! 1. Explicit path (--config CLI flag)
//! 2. `.lopa.json` in the working directory
//! 3. `lopa.config.json` in the working directory
//!
//! All fields are optional. Missing values fall back to the built-in defaults.

use crate::rrf::{GapThresholds, ADEQUATE_GAP_THRESHOLD, MARGINAL_GAP_THRESHOLD};
use crate::standards::StandardsCatalog;
use crate::trigger::{RiskLevel, SeverityTargets, TriggerThresholds, MAX_SEVERITY, MIN_SEVERITY};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// LOPA configuration loaded from a JSON config file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LopaConfig {
    /// Custom gap status thresholds
    #[serde(default)]
    pub gap_thresholds: Option<GapThresholdConfig>,

    /// Custom LOPA trigger rules
    #[serde(default)]
    pub trigger: Option<TriggerConfig>,

    /// Target frequency overrides keyed by severity rank
    #[serde(default)]
    pub severity_targets: Option<BTreeMap<u8, f64>>,

    /// Path to a standards catalog JSON file (default: built-in catalog)
    #[serde(default)]
    pub standards_catalog: Option<PathBuf>,
}

/// Custom gap status thresholds
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GapThresholdConfig {
    /// Gap ratio below which the gap is inadequate (default: 0.5)
    pub marginal: Option<f64>,
    /// Gap ratio at or above which protection is adequate (default: 1.0)
    pub adequate: Option<f64>,
}

/// Custom LOPA trigger rules
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TriggerConfig {
    /// Severity that always triggers LOPA (default: 4)
    pub always_severity: Option<u8>,
    /// Severity paired with likelihood (default: 3)
    pub combined_severity: Option<u8>,
    /// Likelihood paired with severity (default: 4)
    pub combined_likelihood: Option<u8>,
    /// Risk levels that trigger LOPA (default: high, extreme)
    pub risk_levels: Option<Vec<RiskLevel>>,
    /// Risk score that triggers LOPA (default: 15)
    pub risk_score: Option<f64>,
}

/// Resolved configuration with defaults applied
#[derive(Debug)]
pub struct ResolvedConfig {
    pub gap_thresholds: GapThresholds,
    pub trigger: TriggerThresholds,
    pub severity_targets: SeverityTargets,
    pub standards: StandardsCatalog,
    /// Path the config was loaded from (None if defaults)
    pub config_path: Option<PathBuf>,
}

fn check_rank(name: &str, value: Option<u8>) -> Result<()> {
    if let Some(v) = value {
        if !(MIN_SEVERITY..=MAX_SEVERITY).contains(&v) {
            anyhow::bail!(
                "{} must be between {} and {} (got {})",
                name,
                MIN_SEVERITY,
                MAX_SEVERITY,
                v
            );
        }
    }
    Ok(())
}

impl LopaConfig {
    /// Validate the configuration for logical errors
    pub fn validate(&self) -> Result<()> {
        if let Some(ref g) = self.gap_thresholds {
            let marginal = g.marginal.unwrap_or(MARGINAL_GAP_THRESHOLD);
            let adequate = g.adequate.unwrap_or(ADEQUATE_GAP_THRESHOLD);

            if !(marginal > 0.0 && marginal.is_finite()) {
                anyhow::bail!("gap_thresholds.marginal must be positive (got {})", marginal);
            }
            if !(adequate > 0.0 && adequate.is_finite()) {
                anyhow::bail!("gap_thresholds.adequate must be positive (got {})", adequate);
            }
            if marginal >= adequate {
                anyhow::bail!(
                    "gap_thresholds.marginal ({}) must be less than gap_thresholds.adequate ({})",
                    marginal,
                    adequate
                );
            }
        }

        if let Some(ref t) = self.trigger {
            check_rank("trigger.always_severity", t.always_severity)?;
            check_rank("trigger.combined_severity", t.combined_severity)?;
            check_rank("trigger.combined_likelihood", t.combined_likelihood)?;
            if let Some(score) = t.risk_score {
                if !(score > 0.0 && score.is_finite()) {
                    anyhow::bail!("trigger.risk_score must be positive (got {})", score);
                }
            }
        }

        if let Some(ref targets) = self.severity_targets {
            for (&severity, &frequency) in targets {
                check_rank("severity_targets key", Some(severity))?;
                if !(frequency > 0.0 && frequency <= 1.0) {
                    anyhow::bail!(
                        "severity_targets.{} must be in (0, 1] per year (got {})",
                        severity,
                        frequency
                    );
                }
            }
        }

        Ok(())
    }

    /// Resolve config into the values the calculations use
    ///
    /// A relative `standards_catalog` path is resolved against `base_dir`.
    pub fn resolve(&self, base_dir: &Path) -> Result<ResolvedConfig> {
        self.validate()?;

        let gap_thresholds = match &self.gap_thresholds {
            Some(g) => GapThresholds {
                marginal: g.marginal.unwrap_or(MARGINAL_GAP_THRESHOLD),
                adequate: g.adequate.unwrap_or(ADEQUATE_GAP_THRESHOLD),
            },
            None => GapThresholds::default(),
        };

        let defaults = TriggerThresholds::default();
        let trigger = match &self.trigger {
            Some(t) => TriggerThresholds {
                always_severity: t.always_severity.unwrap_or(defaults.always_severity),
                combined_severity: t.combined_severity.unwrap_or(defaults.combined_severity),
                combined_likelihood: t
                    .combined_likelihood
                    .unwrap_or(defaults.combined_likelihood),
                risk_levels: t.risk_levels.clone().unwrap_or(defaults.risk_levels),
                risk_score: t.risk_score.unwrap_or(defaults.risk_score),
            },
            None => defaults,
        };

        let severity_targets = match &self.severity_targets {
            Some(overrides) => SeverityTargets::with_overrides(overrides),
            None => SeverityTargets::default(),
        };

        let standards = match &self.standards_catalog {
            Some(path) => StandardsCatalog::load(&base_dir.join(path))?,
            None => StandardsCatalog::builtin(),
        };

        Ok(ResolvedConfig {
            gap_thresholds,
            trigger,
            severity_targets,
            standards,
            config_path: None,
        })
    }
}

impl ResolvedConfig {
    /// Build a ResolvedConfig with all defaults (no config file)
    pub fn defaults() -> Result<Self> {
        LopaConfig::default().resolve(Path::new("."))
    }
}

/// Discover and load a config file from a directory
///
/// Returns `None` if no config file is found (use defaults).
pub fn discover_config(root: &Path) -> Result<Option<(LopaConfig, PathBuf)>> {
    for name in [".lopa.json", "lopa.config.json"] {
        let path = root.join(name);
        if path.exists() {
            let config = load_config_file(&path)?;
            return Ok(Some((config, path)));
        }
    }
    Ok(None)
}

/// Load config from an explicit file path
pub fn load_config_file(path: &Path) -> Result<LopaConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file: {}", path.display()))?;

    let config: LopaConfig = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse config file: {}", path.display()))?;

    config
        .validate()
        .with_context(|| format!("invalid config in: {}", path.display()))?;

    Ok(config)
}

/// Load and resolve config
///
/// If `config_path` is provided, loads from that file.
/// Otherwise, discovers config in `root`.
/// Returns default config if nothing is found.
pub fn load_and_resolve(root: &Path, config_path: Option<&Path>) -> Result<ResolvedConfig> {
    let (config, source_path) = if let Some(path) = config_path {
        let config = load_config_file(path)?;
        (config, Some(path.to_path_buf()))
    } else {
        match discover_config(root)? {
            Some((config, path)) => (config, Some(path)),
            None => (LopaConfig::default(), None),
        }
    };

    let base_dir = source_path
        .as_deref()
        .and_then(Path::parent)
        .unwrap_or(root)
        .to_path_buf();

    let mut resolved = config.resolve(&base_dir)?;
    resolved.config_path = source_path;
    Ok(resolved)
}
