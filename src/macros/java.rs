//! Java runtime macro — OpenJDK install plus JAVA_HOME.

use crate::core::types::{Directive, EnvironmentDirective, InstallDirective, StringOrList};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JavaParams {
    /// OpenJDK major version
    #[serde(default = "default_version")]
    pub version: String,
}

fn default_version() -> String {
    "11".to_string()
}

pub fn expand(params: &JavaParams) -> Vec<Directive> {
    let mut environment = IndexMap::new();
    environment.insert(
        "JAVA_HOME".to_string(),
        format!("/usr/lib/jvm/java-{}-openjdk-amd64", params.version),
    );

    vec![
        Directive::Install(InstallDirective {
            install: StringOrList::One(format!("openjdk-{}-jre-headless", params.version)),
            condition: None,
        }),
        Directive::Environment(EnvironmentDirective {
            environment,
            condition: None,
        }),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nf008_java_default_version() {
        let p: JavaParams = serde_yaml_ng::from_str("{}").unwrap();
        assert_eq!(p.version, "11");
    }

    #[test]
    fn test_nf008_java_expansion_shape() {
        let directives = expand(&JavaParams {
            version: "17".to_string(),
        });
        assert_eq!(directives.len(), 2);

        let Directive::Install(install) = &directives[0] else {
            panic!("expected install first");
        };
        assert_eq!(install.install.items(), vec!["openjdk-17-jre-headless"]);

        let Directive::Environment(env) = &directives[1] else {
            panic!("expected environment second");
        };
        assert_eq!(
            env.environment.get("JAVA_HOME").unwrap(),
            "/usr/lib/jvm/java-17-openjdk-amd64"
        );
    }
}
