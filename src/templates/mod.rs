//! NF-009: Template installer registry.
//!
//! Templates are parameterized installers for external neuroimaging
//! tools. Each declares typed arguments — dropdown, text, array or
//! boolean — with defaults and an advanced/basic grouping, and is
//! validated before rendering. The registry is immutable once built;
//! `standard()` is the production set.

use crate::core::types::TemplateCall;
use indexmap::IndexMap;

/// Argument shape.
#[derive(Debug, Clone, PartialEq)]
pub enum ArgKind {
    Dropdown { options: Vec<&'static str> },
    Text,
    Array,
    Boolean,
}

/// A typed template argument declaration.
#[derive(Debug, Clone)]
pub struct TemplateArgument {
    pub name: &'static str,
    pub kind: ArgKind,
    pub required: bool,
    /// Hidden behind the "advanced" toggle in authoring UIs.
    pub advanced: bool,
    pub default: Option<&'static str>,
    pub description: &'static str,
}

impl TemplateArgument {
    fn default_value(&self) -> Option<serde_yaml_ng::Value> {
        match &self.kind {
            ArgKind::Boolean => Some(serde_yaml_ng::Value::Bool(self.default == Some("true"))),
            ArgKind::Array => Some(serde_yaml_ng::Value::Sequence(Vec::new())),
            _ => self
                .default
                .map(|d| serde_yaml_ng::Value::String(d.to_string())),
        }
    }
}

/// An installer schema for one external tool.
#[derive(Debug, Clone)]
pub struct TemplateSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub url: &'static str,
    pub arguments: Vec<TemplateArgument>,
}

impl TemplateSpec {
    pub fn argument(&self, name: &str) -> Option<&TemplateArgument> {
        self.arguments.iter().find(|a| a.name == name)
    }
}

/// Immutable registry of template installers.
#[derive(Debug, Clone, Default)]
pub struct TemplateRegistry {
    entries: IndexMap<&'static str, TemplateSpec>,
}

impl TemplateRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a spec. Duplicate names are errors.
    pub fn register(&mut self, spec: TemplateSpec) -> Result<(), String> {
        if self.entries.contains_key(spec.name) {
            return Err(format!("template '{}' is already registered", spec.name));
        }
        self.entries.insert(spec.name, spec);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&TemplateSpec> {
        self.entries.get(name)
    }

    pub fn all(&self) -> impl Iterator<Item = &TemplateSpec> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Check a call against its schema. Returns error strings (empty = ok).
    pub fn validate_call(&self, call: &TemplateCall) -> Vec<String> {
        let Some(spec) = self.get(&call.name) else {
            return vec![format!("unknown template '{}'", call.name)];
        };

        let mut errors = Vec::new();

        for (key, value) in &call.params {
            let Some(arg) = spec.argument(key) else {
                errors.push(format!(
                    "unknown argument '{}' for template '{}'",
                    key, call.name
                ));
                continue;
            };
            if let Err(e) = check_value(arg, value) {
                errors.push(format!("template '{}': {}", call.name, e));
            }
        }

        for arg in &spec.arguments {
            if arg.required && arg.default.is_none() && !call.params.contains_key(arg.name) {
                errors.push(format!(
                    "template '{}' requires argument '{}'",
                    call.name, arg.name
                ));
            }
        }

        errors
    }

    /// Apply defaults over the provided params, validating first.
    pub fn resolve_args(
        &self,
        call: &TemplateCall,
    ) -> Result<IndexMap<String, serde_yaml_ng::Value>, String> {
        let errors = self.validate_call(call);
        if !errors.is_empty() {
            return Err(errors.join("; "));
        }

        let spec = self
            .get(&call.name)
            .ok_or_else(|| format!("unknown template '{}'", call.name))?;

        let mut resolved = IndexMap::new();
        for arg in &spec.arguments {
            if let Some(value) = call.params.get(arg.name) {
                resolved.insert(arg.name.to_string(), value.clone());
            } else if let Some(default) = arg.default_value() {
                resolved.insert(arg.name.to_string(), default);
            }
        }
        Ok(resolved)
    }

    /// The production template set.
    pub fn standard() -> Self {
        let mut registry = Self::new();
        for spec in standard_specs() {
            // Names are compile-time constants; collisions are caught by tests.
            let _ = registry.register(spec);
        }
        registry
    }
}

fn check_value(arg: &TemplateArgument, value: &serde_yaml_ng::Value) -> Result<(), String> {
    match &arg.kind {
        ArgKind::Dropdown { options } => {
            let s = value
                .as_str()
                .ok_or_else(|| format!("argument '{}' must be a string", arg.name))?;
            if !options.contains(&s) {
                return Err(format!(
                    "argument '{}' must be one of: {}",
                    arg.name,
                    options.join(", ")
                ));
            }
            Ok(())
        }
        ArgKind::Text => match value {
            serde_yaml_ng::Value::String(_)
            | serde_yaml_ng::Value::Number(_)
            | serde_yaml_ng::Value::Bool(_) => Ok(()),
            _ => Err(format!("argument '{}' must be a scalar", arg.name)),
        },
        ArgKind::Array => {
            let seq = value
                .as_sequence()
                .ok_or_else(|| format!("argument '{}' must be a list", arg.name))?;
            if seq.iter().any(|v| v.as_str().is_none()) {
                return Err(format!("argument '{}' must be a list of strings", arg.name));
            }
            Ok(())
        }
        ArgKind::Boolean => match value {
            serde_yaml_ng::Value::Bool(_) => Ok(()),
            serde_yaml_ng::Value::String(s) if s == "true" || s == "false" => Ok(()),
            _ => Err(format!("argument '{}' must be a boolean", arg.name)),
        },
    }
}

fn version_arg(options: Vec<&'static str>, default: &'static str) -> TemplateArgument {
    TemplateArgument {
        name: "version",
        kind: ArgKind::Dropdown { options },
        required: true,
        advanced: false,
        default: Some(default),
        description: "Tool version to install",
    }
}

fn method_arg() -> TemplateArgument {
    TemplateArgument {
        name: "method",
        kind: ArgKind::Dropdown {
            options: vec!["binaries", "source"],
        },
        required: false,
        advanced: true,
        default: Some("binaries"),
        description: "Install from prebuilt binaries or build from source",
    }
}

fn standard_specs() -> Vec<TemplateSpec> {
    vec![
        TemplateSpec {
            name: "afni",
            label: "AFNI",
            url: "https://afni.nimh.nih.gov",
            arguments: vec![
                version_arg(vec!["latest", "23.1.10", "22.3.07"], "latest"),
                method_arg(),
                TemplateArgument {
                    name: "install_r_pkgs",
                    kind: ArgKind::Boolean,
                    required: false,
                    advanced: true,
                    default: Some("false"),
                    description: "Install R and AFNI's R packages",
                },
                TemplateArgument {
                    name: "install_python3",
                    kind: ArgKind::Boolean,
                    required: false,
                    advanced: true,
                    default: Some("false"),
                    description: "Install Python 3 bindings",
                },
            ],
        },
        TemplateSpec {
            name: "ants",
            label: "ANTs",
            url: "https://github.com/ANTsX/ANTs",
            arguments: vec![
                version_arg(vec!["2.4.3", "2.3.4", "2.2.0"], "2.4.3"),
                method_arg(),
            ],
        },
        TemplateSpec {
            name: "bids_validator",
            label: "BIDS Validator",
            url: "https://github.com/bids-standard/bids-validator",
            arguments: vec![TemplateArgument {
                name: "version",
                kind: ArgKind::Text,
                required: true,
                advanced: false,
                default: Some("1.14.0"),
                description: "Validator version (npm release)",
            }],
        },
        TemplateSpec {
            name: "freesurfer",
            label: "FreeSurfer",
            url: "https://surfer.nmr.mgh.harvard.edu",
            arguments: vec![
                version_arg(vec!["7.4.1", "7.3.2", "6.0.1"], "7.4.1"),
                TemplateArgument {
                    name: "exclude_paths",
                    kind: ArgKind::Array,
                    required: false,
                    advanced: true,
                    default: None,
                    description: "Subtrees to delete from the installation",
                },
            ],
        },
        TemplateSpec {
            name: "fsl",
            label: "FSL",
            url: "https://fsl.fmrib.ox.ac.uk",
            arguments: vec![
                version_arg(vec!["6.0.7.1", "6.0.5.1", "6.0.4"], "6.0.7.1"),
                TemplateArgument {
                    name: "exclude_paths",
                    kind: ArgKind::Array,
                    required: false,
                    advanced: true,
                    default: None,
                    description: "Subtrees to delete from the installation",
                },
            ],
        },
        TemplateSpec {
            name: "matlabmcr",
            label: "MATLAB Compiler Runtime",
            url: "https://www.mathworks.com/products/compiler/matlab-runtime.html",
            arguments: vec![
                version_arg(vec!["2023b", "2022b", "2019b", "2017b"], "2022b"),
                TemplateArgument {
                    name: "install_path",
                    kind: ArgKind::Text,
                    required: false,
                    advanced: true,
                    default: Some("/opt/mcr"),
                    description: "Runtime install prefix",
                },
            ],
        },
        TemplateSpec {
            name: "miniconda",
            label: "Miniconda",
            url: "https://docs.conda.io/en/latest/miniconda.html",
            arguments: vec![
                TemplateArgument {
                    name: "version",
                    kind: ArgKind::Text,
                    required: true,
                    advanced: false,
                    default: Some("latest"),
                    description: "Miniconda release",
                },
                TemplateArgument {
                    name: "env_name",
                    kind: ArgKind::Text,
                    required: false,
                    advanced: false,
                    default: Some("base"),
                    description: "Conda environment to create or install into",
                },
                TemplateArgument {
                    name: "yaml_file",
                    kind: ArgKind::Text,
                    required: false,
                    advanced: true,
                    default: None,
                    description: "Environment file (a recipe file directive) to create from",
                },
                TemplateArgument {
                    name: "conda_install",
                    kind: ArgKind::Array,
                    required: false,
                    advanced: false,
                    default: None,
                    description: "Packages to conda install",
                },
                TemplateArgument {
                    name: "pip_install",
                    kind: ArgKind::Array,
                    required: false,
                    advanced: false,
                    default: None,
                    description: "Packages to pip install",
                },
            ],
        },
        TemplateSpec {
            name: "spm12",
            label: "SPM12 (standalone)",
            url: "https://www.fil.ion.ucl.ac.uk/spm",
            arguments: vec![
                version_arg(vec!["r7771", "r7487", "r7219"], "r7771"),
                TemplateArgument {
                    name: "matlab_install_path",
                    kind: ArgKind::Text,
                    required: false,
                    advanced: true,
                    default: Some("/opt/mcr"),
                    description: "MATLAB runtime prefix SPM links against",
                },
            ],
        },
    ]
}
