//! NF-008: Group macros — typed parameter sets that expand into
//! directive lists.
//!
//! A group macro turns one high-level control (install Java, create a
//! conda environment from a YAML file, …) into several primitive
//! directives. Expansion is a pure function of the typed params, so a
//! group produced by `update_group` can always be re-derived from its
//! stored `customParams` alone.

pub mod java;
pub mod miniconda;
pub mod pip;
pub mod shell;

use crate::core::types::{Directive, GroupDirective};
use indexmap::IndexMap;
use serde::de::DeserializeOwned;

/// Registered macro names.
pub const KNOWN: [&str; 4] = ["java", "minicondaYaml", "pipRequirements", "shellScript"];

pub fn is_known(name: &str) -> bool {
    KNOWN.contains(&name)
}

fn typed_params<T: DeserializeOwned>(
    name: &str,
    params: &IndexMap<String, serde_yaml_ng::Value>,
) -> Result<T, String> {
    let value = serde_yaml_ng::to_value(params)
        .map_err(|e| format!("macro '{}': cannot read params: {}", name, e))?;
    serde_yaml_ng::from_value(value).map_err(|e| format!("macro '{}': {}", name, e))
}

/// Check params against the macro's typed schema without expanding.
pub fn validate_params(
    name: &str,
    params: &IndexMap<String, serde_yaml_ng::Value>,
) -> Result<(), String> {
    expand(name, params).map(|_| ())
}

/// Expand a macro into its directive list.
pub fn expand(
    name: &str,
    params: &IndexMap<String, serde_yaml_ng::Value>,
) -> Result<Vec<Directive>, String> {
    match name {
        "java" => Ok(java::expand(&typed_params::<java::JavaParams>(name, params)?)),
        "minicondaYaml" => Ok(miniconda::expand(&typed_params::<
            miniconda::MinicondaYamlParams,
        >(name, params)?)),
        "pipRequirements" => Ok(pip::expand(&typed_params::<pip::PipRequirementsParams>(
            name, params,
        )?)),
        "shellScript" => Ok(shell::expand(&typed_params::<shell::ShellScriptParams>(
            name, params,
        )?)),
        other => Err(format!("unknown group macro '{}'", other)),
    }
}

/// Build the group directive a macro editor stores: the expansion plus
/// the originating macro name and params, so edits can re-expand.
pub fn update_group(
    name: &str,
    params: &IndexMap<String, serde_yaml_ng::Value>,
) -> Result<GroupDirective, String> {
    let group = expand(name, params)?;
    Ok(GroupDirective {
        group,
        custom: Some(name.to_string()),
        custom_params: Some(params.clone()),
        condition: None,
    })
}
