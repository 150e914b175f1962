//! NF-004: `{{ ... }}` placeholder substitution.
//!
//! Resolves `{{ context.name }}`, `{{ context.version }}`, `{{ arch }}`
//! and `{{ local.<variable> }}` references in directive string fields
//! before rendering. Unknown references are errors.

use super::types::{yaml_value_to_string, Architecture};
use indexmap::IndexMap;

/// Values available to placeholder substitution during generation.
#[derive(Debug, Clone)]
pub struct BuildContext {
    pub name: String,
    pub version: String,
    pub arch: Architecture,
    pub variables: IndexMap<String, serde_yaml_ng::Value>,
}

impl BuildContext {
    pub fn new(name: &str, version: &str, arch: Architecture) -> Self {
        Self {
            name: name.to_string(),
            version: version.to_string(),
            arch,
            variables: IndexMap::new(),
        }
    }

    fn resolve_key(&self, key: &str) -> Result<String, String> {
        match key {
            "context.name" => Ok(self.name.clone()),
            "context.version" => Ok(self.version.clone()),
            "arch" => Ok(self.arch.to_string()),
            other => {
                if let Some(var) = other.strip_prefix("local.") {
                    return self
                        .variables
                        .get(var)
                        .map(yaml_value_to_string)
                        .ok_or_else(|| format!("unknown variable: {}", var));
                }
                Err(format!("unknown placeholder: {}", other))
            }
        }
    }
}

/// Resolve all `{{ ... }}` placeholders in a string.
pub fn resolve_placeholders(input: &str, ctx: &BuildContext) -> Result<String, String> {
    let mut result = input.to_string();
    let mut start = 0;

    while let Some(open) = result[start..].find("{{") {
        let open = start + open;
        let close = result[open..]
            .find("}}")
            .ok_or_else(|| format!("unclosed placeholder at position {}", open))?;
        let close = open + close + 2;
        let key = result[open + 2..close - 2].trim().to_string();

        let value = ctx.resolve_key(&key)?;
        result.replace_range(open..close, &value);
        start = open + value.len();
    }

    Ok(result)
}
