//! Canonical naming of `(equipment, variable)` pairs.
//!
//! A [`Normalizer`] is immutable once built, so `normalize` is a pure
//! function of its arguments: every scenario that reports the same pair
//! lands in the same table column.

use std::collections::BTreeMap;

use hx_core::Unit;
use serde::{Deserialize, Serialize};

/// Substring that marks a canonical name as a heat transfer coefficient.
pub const HEAT_TRANSFER_COEFFICIENT: &str = "heat_transfer_coefficient";

/// Known source naming defects: `(equipment, raw_name) -> canonical_name`.
const BUILTIN_ALIASES: &[(&str, &str, &str)] = &[("Fuel", "Fuel - temperature", "temperature")];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AliasRule {
    pub equipment: String,
    pub raw_name: String,
    pub canonical: String,
}

/// Result of normalizing one variable sample name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NormalizedVariable {
    /// `"{equipment}.{canonical_name}"`
    pub key: String,
    pub equipment: String,
    pub canonical_name: String,
    pub unit: Unit,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Normalizer {
    aliases: BTreeMap<(String, String), String>,
    unit_overrides: BTreeMap<String, Unit>,
}

impl Normalizer {
    /// Normalizer with only the built-in alias table.
    pub fn builtin() -> Self {
        Self::default()
    }

    /// Add alias rules on top of the built-in table. Later rules replace
    /// earlier ones for the same `(equipment, raw_name)`.
    pub fn with_aliases(mut self, rules: impl IntoIterator<Item = AliasRule>) -> Self {
        for rule in rules {
            self.aliases
                .insert((rule.equipment, rule.raw_name), rule.canonical);
        }
        self
    }

    /// Pin the unit of a canonical name, bypassing substring inference.
    pub fn with_unit_override(mut self, canonical_name: impl Into<String>, unit: Unit) -> Self {
        self.unit_overrides.insert(canonical_name.into(), unit);
        self
    }

    pub fn canonical_name<'a>(&'a self, equipment: &str, raw_name: &'a str) -> &'a str {
        if let Some(canonical) = self
            .aliases
            .get(&(equipment.to_string(), raw_name.to_string()))
        {
            return canonical;
        }
        match BUILTIN_ALIASES
            .iter()
            .find(|(e, r, _)| *e == equipment && *r == raw_name)
        {
            Some(&(_, _, canonical)) => canonical,
            None => raw_name,
        }
    }

    pub fn infer_unit(&self, canonical_name: &str) -> Unit {
        if let Some(unit) = self.unit_overrides.get(canonical_name) {
            return *unit;
        }
        infer_unit(canonical_name)
    }

    pub fn normalize(&self, equipment: &str, raw_name: &str) -> NormalizedVariable {
        let canonical_name = self.canonical_name(equipment, raw_name).to_string();
        NormalizedVariable {
            key: variable_key(equipment, &canonical_name),
            equipment: equipment.to_string(),
            unit: self.infer_unit(&canonical_name),
            canonical_name,
        }
    }
}

pub fn variable_key(equipment: &str, canonical_name: &str) -> String {
    format!("{equipment}.{canonical_name}")
}

/// `W/m²·K` for heat transfer coefficients (case-insensitive), `K` otherwise.
pub fn infer_unit(canonical_name: &str) -> Unit {
    if canonical_name
        .to_ascii_lowercase()
        .contains(HEAT_TRANSFER_COEFFICIENT)
    {
        Unit::HeatTransferCoefficient
    } else {
        Unit::Kelvin
    }
}

/// Normalize with the built-in alias table: `(key, unit)`.
pub fn normalize(equipment: &str, raw_name: &str) -> (String, Unit) {
    let normalized = Normalizer::builtin().normalize(equipment, raw_name);
    (normalized.key, normalized.unit)
}
