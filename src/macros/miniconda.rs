//! Conda-environment-from-YAML macro — writes the environment file and
//! hands it to the miniconda template.

use crate::core::types::{Directive, FileDirective, FileSpec, TemplateCall, TemplateDirective};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MinicondaYamlParams {
    /// Name of the environment file written into the build directory
    #[serde(default = "default_environment_file")]
    pub environment_file: String,

    /// Contents of the environment file
    pub content: String,

    /// Environment name passed to conda
    #[serde(default = "default_env_name")]
    pub env_name: String,
}

fn default_environment_file() -> String {
    "environment.yml".to_string()
}

fn default_env_name() -> String {
    "base".to_string()
}

pub fn expand(params: &MinicondaYamlParams) -> Vec<Directive> {
    let mut template_params: IndexMap<String, serde_yaml_ng::Value> = IndexMap::new();
    template_params.insert(
        "version".to_string(),
        serde_yaml_ng::Value::String("latest".to_string()),
    );
    template_params.insert(
        "env_name".to_string(),
        serde_yaml_ng::Value::String(params.env_name.clone()),
    );
    template_params.insert(
        "yaml_file".to_string(),
        serde_yaml_ng::Value::String(params.environment_file.clone()),
    );

    vec![
        Directive::File(FileDirective {
            file: FileSpec {
                name: params.environment_file.clone(),
                contents: Some(params.content.clone()),
                filename: None,
                url: None,
                executable: false,
            },
            condition: None,
        }),
        Directive::Template(TemplateDirective {
            template: TemplateCall {
                name: "miniconda".to_string(),
                params: template_params,
            },
            condition: None,
        }),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nf008_miniconda_defaults() {
        let p: MinicondaYamlParams =
            serde_yaml_ng::from_str("content: \"dependencies: [numpy]\"").unwrap();
        assert_eq!(p.environment_file, "environment.yml");
        assert_eq!(p.env_name, "base");
    }

    #[test]
    fn test_nf008_miniconda_expansion_shape() {
        let directives = expand(&MinicondaYamlParams {
            environment_file: "qsmxt.yml".to_string(),
            content: "dependencies:\n  - numpy\n".to_string(),
            env_name: "qsmxt".to_string(),
        });
        assert_eq!(directives.len(), 2);

        let Directive::File(f) = &directives[0] else {
            panic!("expected file first");
        };
        assert_eq!(f.file.name, "qsmxt.yml");
        assert!(f.file.contents.as_ref().unwrap().contains("numpy"));

        let Directive::Template(t) = &directives[1] else {
            panic!("expected template second");
        };
        assert_eq!(t.template.name, "miniconda");
        assert_eq!(
            t.template.params.get("yaml_file"),
            Some(&serde_yaml_ng::Value::String("qsmxt.yml".to_string()))
        );
        assert_eq!(
            t.template.params.get("env_name"),
            Some(&serde_yaml_ng::Value::String("qsmxt".to_string()))
        );
    }

    #[test]
    fn test_nf008_miniconda_requires_content() {
        let r: Result<MinicondaYamlParams, _> = serde_yaml_ng::from_str("env_name: x");
        assert!(r.is_err());
    }
}
