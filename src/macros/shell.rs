//! Shell-script macro — injects a script file and runs it.

use crate::core::types::{Directive, FileDirective, FileSpec, RunDirective};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ShellScriptParams {
    /// Script filename inside the build directory
    #[serde(default = "default_name")]
    pub name: String,

    /// Script body; a shebang is prepended when absent
    pub script: String,

    #[serde(default = "default_true")]
    pub executable: bool,
}

fn default_name() -> String {
    "script.sh".to_string()
}

fn default_true() -> bool {
    true
}

pub fn expand(params: &ShellScriptParams) -> Vec<Directive> {
    let contents = if params.script.starts_with("#!") {
        params.script.clone()
    } else {
        format!("#!/bin/bash\nset -e\n{}\n", params.script.trim_end())
    };

    vec![
        Directive::File(FileDirective {
            file: FileSpec {
                name: params.name.clone(),
                contents: Some(contents),
                filename: None,
                url: None,
                executable: params.executable,
            },
            condition: None,
        }),
        Directive::Run(RunDirective {
            run: vec![format!("/opt/{}", params.name)],
            condition: None,
        }),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nf008_shell_adds_shebang() {
        let directives = expand(&ShellScriptParams {
            name: "setup.sh".to_string(),
            script: "echo installing".to_string(),
            executable: true,
        });

        let Directive::File(f) = &directives[0] else {
            panic!("expected file first");
        };
        assert_eq!(
            f.file.contents.as_deref(),
            Some("#!/bin/bash\nset -e\necho installing\n")
        );
        assert!(f.file.executable);

        let Directive::Run(r) = &directives[1] else {
            panic!("expected run second");
        };
        assert_eq!(r.run, vec!["/opt/setup.sh"]);
    }

    #[test]
    fn test_nf008_shell_keeps_existing_shebang() {
        let directives = expand(&ShellScriptParams {
            name: "setup.sh".to_string(),
            script: "#!/bin/sh\necho hi\n".to_string(),
            executable: true,
        });
        let Directive::File(f) = &directives[0] else {
            panic!("expected file first");
        };
        assert_eq!(f.file.contents.as_deref(), Some("#!/bin/sh\necho hi\n"));
    }

    #[test]
    fn test_nf008_shell_requires_script() {
        let r: Result<ShellScriptParams, _> = serde_yaml_ng::from_str("name: a.sh");
        assert!(r.is_err());
    }
}
