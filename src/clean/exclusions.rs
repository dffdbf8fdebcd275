use std::collections::HashMap;

use crate::config::{CleanConfig, ConfigError};
use crate::tree::{Marker, MarkerValue};

/// Annotation recognized as the suppression carrier.
pub const SUPPRESSION_MARKER: &str = "SuppressWarnings";

/// Sentinel string argument meaning "keep even if unused".
pub const UNUSED_SENTINEL: &str = "unused";

/// A method the user wants preserved: owner type, name, and the exact
/// ordered parameter-type sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodExclusion {
    pub owner: String,
    pub name: String,
    pub params: Vec<String>,
}

/// A field the user wants preserved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldExclusion {
    pub owner: String,
    pub name: String,
}

/// User-supplied always-preserve lists, parsed once at setup. Entries are
/// keyed by member name so a lookup touches only same-named candidates.
#[derive(Debug, Default)]
pub struct ExclusionRegistry {
    methods: HashMap<String, Vec<MethodExclusion>>,
    fields: HashMap<String, Vec<FieldExclusion>>,
}

impl ExclusionRegistry {
    /// Parse the exclusion lists out of the configuration. A malformed
    /// entry is a setup-time error, never deferred into the traversal.
    pub fn from_config(config: &CleanConfig) -> Result<Self, ConfigError> {
        let mut registry = Self::default();
        for entry in &config.excluded_methods {
            let exclusion = parse_method_exclusion(entry)?;
            registry
                .methods
                .entry(exclusion.name.clone())
                .or_default()
                .push(exclusion);
        }
        for entry in &config.excluded_fields {
            let exclusion = parse_field_exclusion(entry)?;
            registry
                .fields
                .entry(exclusion.name.clone())
                .or_default()
                .push(exclusion);
        }
        Ok(registry)
    }

    pub fn method_excluded(&self, owner: &str, name: &str, params: &[String]) -> bool {
        self.methods.get(name).is_some_and(|candidates| {
            candidates
                .iter()
                .any(|c| c.owner == owner && c.params.as_slice() == params)
        })
    }

    pub fn field_excluded(&self, owner: &str, name: &str) -> bool {
        self.fields
            .get(name)
            .is_some_and(|candidates| candidates.iter().any(|c| c.owner == owner))
    }
}

/// Parse a javadoc-link style method signature: `Owner#name(param, param)`.
/// A missing parameter list means a zero-parameter method.
fn parse_method_exclusion(entry: &str) -> Result<MethodExclusion, ConfigError> {
    let invalid = |reason| ConfigError::InvalidMethodExclusion {
        entry: entry.to_string(),
        reason,
    };

    let (owner, rest) = entry.split_once('#').ok_or(invalid("missing `#` separator"))?;
    if owner.is_empty() {
        return Err(invalid("empty owner type"));
    }

    let (name, params) = match rest.split_once('(') {
        Some((name, args)) => {
            let args = args
                .strip_suffix(')')
                .ok_or(invalid("unterminated parameter list"))?;
            let params = if args.trim().is_empty() {
                vec![]
            } else {
                let params: Vec<String> =
                    args.split(',').map(|p| p.trim().to_string()).collect();
                if params.iter().any(String::is_empty) {
                    return Err(invalid("empty parameter type"));
                }
                params
            };
            (name, params)
        }
        None => (rest, vec![]),
    };
    if name.is_empty() {
        return Err(invalid("empty method name"));
    }

    Ok(MethodExclusion {
        owner: owner.to_string(),
        name: name.to_string(),
        params,
    })
}

/// Parse a field signature: `Owner#name`.
fn parse_field_exclusion(entry: &str) -> Result<FieldExclusion, ConfigError> {
    let invalid = |reason| ConfigError::InvalidFieldExclusion {
        entry: entry.to_string(),
        reason,
    };

    let (owner, name) = entry.split_once('#').ok_or(invalid("missing `#` separator"))?;
    if owner.is_empty() {
        return Err(invalid("empty owner type"));
    }
    if name.is_empty() {
        return Err(invalid("empty field name"));
    }
    if name.contains('(') {
        return Err(invalid("field signatures take no parameter list"));
    }

    Ok(FieldExclusion {
        owner: owner.to_string(),
        name: name.to_string(),
    })
}

/// True when any attached marker pins this declaration regardless of usage:
/// a suppression marker whose string arguments, directly or nested inside
/// array values, contain the `unused` sentinel.
pub fn keeps_unused(markers: &[Marker]) -> bool {
    markers
        .iter()
        .any(|m| m.name == SUPPRESSION_MARKER && m.values.iter().any(value_names_unused))
}

fn value_names_unused(value: &MarkerValue) -> bool {
    match value {
        MarkerValue::Str(s) => s == UNUSED_SENTINEL,
        MarkerValue::Array(items) => items.iter().any(value_names_unused),
        MarkerValue::Other => false,
    }
}
