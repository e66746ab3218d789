use crate::errors::ConfigError;
use crate::scoring::{FormulaRegistry, FormulaSet};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// On-disk shape of additional formula bound sets.
///
/// ```yaml
/// formulas:
///   v2:
///     max_lumens: { kind: higher_log, floor: 150, cap: 6000 }
///     ...
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FormulaFile {
    #[serde(default)]
    pub formulas: BTreeMap<String, FormulaSet>,
}

pub fn load_formula_file(path: &Path, strict: bool) -> Result<FormulaFile, ConfigError> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| ConfigError(format!("failed to read formula file {}: {}", path.display(), e)))?;
    parse_formula_file(&raw, strict)
        .map_err(|e| ConfigError(format!("{} (file: {})", e.0, path.display())))
}

pub fn parse_formula_file(raw: &str, strict: bool) -> Result<FormulaFile, ConfigError> {
    let mut ignored = Vec::new();
    let deserializer = serde_yaml::Deserializer::from_str(raw);
    let file: FormulaFile = serde_ignored::deserialize(deserializer, |path| {
        ignored.push(path.to_string());
    })
    .map_err(|e| ConfigError(format!("failed to parse YAML: {}", e)))?;

    let meaningful: Vec<_> = ignored
        .into_iter()
        .filter(|k| !k.starts_with('_') && !k.starts_with("x-"))
        .collect();
    if !meaningful.is_empty() {
        if strict {
            return Err(ConfigError(format!(
                "Unknown fields detected in strict mode: {:?}",
                meaningful
            )));
        }
        tracing::warn!(
            event = "formula_file.ignored_fields",
            fields = ?meaningful,
            "ignored unknown formula file fields"
        );
    }
    Ok(file)
}

/// Built-in sets plus every set from `path`. Built-in versions cannot be redefined.
pub fn load_formula_registry(path: Option<&Path>, strict: bool) -> Result<FormulaRegistry, ConfigError> {
    let mut registry = FormulaRegistry::builtin();
    let Some(path) = path else {
        return Ok(registry);
    };
    let file = load_formula_file(path, strict)?;
    for (version, set) in file.formulas {
        if registry.get(version.trim()).is_some() {
            return Err(ConfigError(format!(
                "formula {} is built in and cannot be redefined (file: {})",
                version,
                path.display()
            )));
        }
        registry.insert(&version, set)?;
    }
    Ok(registry)
}
