//! Pip-requirements macro — writes requirements.txt and installs it.

use crate::core::types::{Directive, FileDirective, FileSpec, RunDirective};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PipRequirementsParams {
    /// Packages, one requirement specifier each
    pub packages: Vec<String>,

    /// Name of the requirements file written into the build directory
    #[serde(default = "default_requirements_file")]
    pub requirements_file: String,
}

fn default_requirements_file() -> String {
    "requirements.txt".to_string()
}

pub fn expand(params: &PipRequirementsParams) -> Vec<Directive> {
    let mut contents = params.packages.join("\n");
    contents.push('\n');

    vec![
        Directive::File(FileDirective {
            file: FileSpec {
                name: params.requirements_file.clone(),
                contents: Some(contents),
                filename: None,
                url: None,
                executable: false,
            },
            condition: None,
        }),
        Directive::Run(RunDirective {
            run: vec![format!(
                "pip install --no-cache-dir -r /opt/{}",
                params.requirements_file
            )],
            condition: None,
        }),
    ]
}
