//! NF-002: Recipe parsing and validation.
//!
//! Parses build.yaml and validates structural constraints:
//! - name, version, base-image and architectures present
//! - SPDX identifiers resolve; custom copyright entries carry a URL
//! - readme and readme_url are mutually exclusive
//! - every directive map carries exactly one discriminator key
//! - template calls, group macros, conditions, file/test one-of rules
//!
//! Validation collects all errors instead of stopping at the first.

use super::condition;
use super::types::*;
use crate::licenses;
use crate::macros;
use crate::templates::TemplateRegistry;
use std::path::Path;

/// Validation error.
#[derive(Debug, Clone)]
pub struct ValidationError {
    pub message: String,
}

impl ValidationError {
    fn new(message: String) -> Self {
        Self { message }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Parse a recipe from disk.
pub fn parse_recipe_file(path: &Path) -> Result<ContainerRecipe, String> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("failed to read {}: {}", path.display(), e))?;
    parse_recipe(&content)
}

/// Parse a recipe from a YAML string.
pub fn parse_recipe(yaml: &str) -> Result<ContainerRecipe, String> {
    serde_yaml_ng::from_str(yaml).map_err(|e| format!("YAML parse error: {}", e))
}

/// Check the discriminator-uniqueness invariant on the raw document:
/// every directive map must carry exactly one known directive key.
/// Operates on the untyped YAML so that maps the typed parse would
/// silently first-match (or reject without naming the key) get a
/// precise error. Returns Err only when the YAML itself is unparseable.
pub fn check_discriminators(yaml: &str) -> Result<Vec<ValidationError>, String> {
    let doc: serde_yaml_ng::Value =
        serde_yaml_ng::from_str(yaml).map_err(|e| format!("YAML parse error: {}", e))?;

    let mut errors = Vec::new();
    if let Some(directives) = doc
        .get("build")
        .and_then(|b| b.get("directives"))
        .and_then(|d| d.as_sequence())
    {
        walk_directive_seq(directives, "directives", &mut errors);
    }
    Ok(errors)
}

fn walk_directive_seq(
    seq: &[serde_yaml_ng::Value],
    label: &str,
    errors: &mut Vec<ValidationError>,
) {
    for (i, item) in seq.iter().enumerate() {
        let here = format!("{}[{}]", label, i);
        let Some(map) = item.as_mapping() else {
            errors.push(ValidationError::new(format!(
                "{}: directive must be a map",
                here
            )));
            continue;
        };

        let found: Vec<&str> = Directive::KEYS
            .iter()
            .copied()
            .filter(|key| map.iter().any(|(k, _)| k.as_str() == Some(*key)))
            .collect();

        match found.len() {
            0 => {
                let keys: Vec<String> = map
                    .keys()
                    .filter_map(|k| k.as_str().map(str::to_string))
                    .collect();
                errors.push(ValidationError::new(format!(
                    "{}: no recognized directive key (found: {})",
                    here,
                    keys.join(", ")
                )));
            }
            1 => {}
            _ => {
                errors.push(ValidationError::new(format!(
                    "{}: ambiguous directive — multiple keys present: {}",
                    here,
                    found.join(", ")
                )));
            }
        }

        let nested = map
            .iter()
            .find(|(k, _)| k.as_str() == Some("group"))
            .and_then(|(_, v)| v.as_sequence());
        if let Some(nested) = nested {
            walk_directive_seq(nested, &format!("{}.group", here), errors);
        }
    }
}

/// Validate a parsed recipe. Returns a list of errors (empty = valid).
pub fn validate_recipe(
    recipe: &ContainerRecipe,
    templates: &TemplateRegistry,
) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if recipe.name.trim().is_empty() {
        errors.push(ValidationError::new("name must not be empty".to_string()));
    }
    if recipe.version.trim().is_empty() {
        errors.push(ValidationError::new(
            "version must not be empty".to_string(),
        ));
    }
    if recipe.architectures.is_empty() {
        errors.push(ValidationError::new(
            "at least one architecture is required".to_string(),
        ));
    }

    if let Some(copyright) = &recipe.copyright {
        for (i, entry) in copyright.iter().enumerate() {
            match entry {
                CopyrightInfo::Spdx { license, .. } => {
                    if licenses::find(license).is_none() {
                        errors.push(ValidationError::new(format!(
                            "copyright[{}]: unknown SPDX identifier '{}'",
                            i, license
                        )));
                    }
                }
                CopyrightInfo::Custom { name, url } => {
                    if url.trim().is_empty() {
                        errors.push(ValidationError::new(format!(
                            "copyright[{}]: custom license '{}' needs a url",
                            i, name
                        )));
                    }
                }
            }
        }
    }

    if recipe.readme.is_some() && recipe.readme_url.is_some() {
        errors.push(ValidationError::new(
            "readme and readme_url are mutually exclusive".to_string(),
        ));
    }

    let build = recipe.build.neurodocker();
    if build.base_image.is_empty() {
        errors.push(ValidationError::new(
            "build base-image must not be empty".to_string(),
        ));
    }

    for (i, directive) in build.directives.iter().enumerate() {
        validate_directive(directive, &format!("directives[{}]", i), templates, &mut errors);
    }

    errors
}

fn validate_directive(
    directive: &Directive,
    label: &str,
    templates: &TemplateRegistry,
    errors: &mut Vec<ValidationError>,
) {
    if let Some(cond) = directive.condition() {
        if let Err(e) = condition::check(cond) {
            errors.push(ValidationError::new(format!(
                "{}: invalid condition: {}",
                label, e
            )));
        }
    }

    match directive {
        Directive::Group(g) => {
            if let Some(name) = &g.custom {
                if !macros::is_known(name) {
                    errors.push(ValidationError::new(format!(
                        "{}: unknown group macro '{}'",
                        label, name
                    )));
                } else if let Some(params) = &g.custom_params {
                    if let Err(e) = macros::validate_params(name, params) {
                        errors.push(ValidationError::new(format!("{}: {}", label, e)));
                    }
                }
            }
            for (i, nested) in g.group.iter().enumerate() {
                validate_directive(nested, &format!("{}.group[{}]", label, i), templates, errors);
            }
        }
        Directive::Environment(e) => {
            if e.environment.keys().any(|k| k.trim().is_empty()) {
                errors.push(ValidationError::new(format!(
                    "{}: environment key must not be empty",
                    label
                )));
            }
        }
        Directive::Install(i) => {
            if i.install.items().is_empty() {
                errors.push(ValidationError::new(format!(
                    "{}: install has no packages",
                    label
                )));
            }
        }
        Directive::Workdir(w) => {
            if w.workdir.trim().is_empty() {
                errors.push(ValidationError::new(format!(
                    "{}: workdir must not be empty",
                    label
                )));
            }
        }
        Directive::Run(r) => {
            if r.run.is_empty() {
                errors.push(ValidationError::new(format!(
                    "{}: run has no commands",
                    label
                )));
            }
        }
        Directive::Variables(_) => {}
        Directive::Template(t) => match templates.get(&t.template.name) {
            Some(_) => {
                for e in templates.validate_call(&t.template) {
                    errors.push(ValidationError::new(format!("{}: {}", label, e)));
                }
            }
            None => {
                errors.push(ValidationError::new(format!(
                    "{}: unknown template '{}'",
                    label, t.template.name
                )));
            }
        },
        Directive::Deploy(d) => {
            if d.deploy.bins.is_empty() && d.deploy.path.is_empty() {
                errors.push(ValidationError::new(format!(
                    "{}: deploy has neither bins nor path",
                    label
                )));
            }
        }
        Directive::User(u) => {
            if u.user.trim().is_empty() {
                errors.push(ValidationError::new(format!(
                    "{}: user must not be empty",
                    label
                )));
            }
        }
        Directive::Copy(c) => {
            if c.copy.items().len() < 2 {
                errors.push(ValidationError::new(format!(
                    "{}: copy needs at least a source and a destination",
                    label
                )));
            }
        }
        Directive::File(f) => {
            if f.file.name.trim().is_empty() {
                errors.push(ValidationError::new(format!(
                    "{}: file name must not be empty",
                    label
                )));
            }
            let sources = [
                f.file.contents.is_some(),
                f.file.filename.is_some(),
                f.file.url.is_some(),
            ]
            .iter()
            .filter(|present| **present)
            .count();
            if sources != 1 {
                errors.push(ValidationError::new(format!(
                    "{}: file '{}' needs exactly one of contents, filename or url",
                    label, f.file.name
                )));
            }
        }
        Directive::Test(t) => {
            if t.test.name.trim().is_empty() {
                errors.push(ValidationError::new(format!(
                    "{}: test name must not be empty",
                    label
                )));
            }
            let bodies = [t.test.script.is_some(), t.test.builtin.is_some()]
                .iter()
                .filter(|present| **present)
                .count();
            if bodies != 1 {
                errors.push(ValidationError::new(format!(
                    "{}: test '{}' needs exactly one of script or builtin",
                    label, t.test.name
                )));
            }
        }
        Directive::Include(inc) => {
            if inc.include.trim().is_empty() {
                errors.push(ValidationError::new(format!(
                    "{}: include path must not be empty",
                    label
                )));
            } else if inc.include.starts_with('/')
                || inc.include.split('/').any(|part| part == "..")
            {
                errors.push(ValidationError::new(format!(
                    "{}: include path '{}' must stay inside the recipe directory",
                    label, inc.include
                )));
            }
        }
    }
}
