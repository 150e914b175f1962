//! NF-007: Directive registry.
//!
//! Maps a directive key to its authoring metadata: label, one-line
//! description, and a factory for the default value an editor starts
//! from. Built once by an explicit constructor and passed by reference —
//! no global state, no import-order registration. Duplicate keys are
//! errors.

use crate::core::types::*;
use indexmap::IndexMap;

/// Authoring metadata for one directive kind.
#[derive(Debug, Clone)]
pub struct DirectiveInfo {
    pub key: &'static str,
    pub label: &'static str,
    pub description: &'static str,
    /// The value a fresh editor for this kind starts from.
    pub default_value: fn() -> Directive,
}

/// Immutable key -> metadata map.
#[derive(Debug, Clone, Default)]
pub struct DirectiveRegistry {
    entries: IndexMap<&'static str, DirectiveInfo>,
}

impl DirectiveRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert metadata. Duplicate keys are errors.
    pub fn register(&mut self, info: DirectiveInfo) -> Result<(), String> {
        if self.entries.contains_key(info.key) {
            return Err(format!("directive '{}' is already registered", info.key));
        }
        self.entries.insert(info.key, info);
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&DirectiveInfo> {
        self.entries.get(key)
    }

    /// Entries in registration order.
    pub fn all(&self) -> impl Iterator<Item = &DirectiveInfo> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The production set — one entry per directive kind, in dispatch
    /// order.
    pub fn standard() -> Self {
        let mut registry = Self::new();
        for info in standard_infos() {
            // Keys are compile-time constants; collisions are caught by tests.
            let _ = registry.register(info);
        }
        registry
    }
}

fn standard_infos() -> Vec<DirectiveInfo> {
    vec![
        DirectiveInfo {
            key: "group",
            label: "Group",
            description: "Nested list of directives, optionally produced by a macro",
            default_value: || {
                Directive::Group(GroupDirective {
                    group: Vec::new(),
                    custom: None,
                    custom_params: None,
                    condition: None,
                })
            },
        },
        DirectiveInfo {
            key: "environment",
            label: "Environment",
            description: "Environment variables exported into the image",
            default_value: || {
                Directive::Environment(EnvironmentDirective {
                    environment: IndexMap::new(),
                    condition: None,
                })
            },
        },
        DirectiveInfo {
            key: "install",
            label: "Install",
            description: "System packages installed with the recipe's package manager",
            default_value: || {
                Directive::Install(InstallDirective {
                    install: StringOrList::Many(Vec::new()),
                    condition: None,
                })
            },
        },
        DirectiveInfo {
            key: "workdir",
            label: "Working Directory",
            description: "Working directory for subsequent build steps",
            default_value: || {
                Directive::Workdir(WorkdirDirective {
                    workdir: String::new(),
                    condition: None,
                })
            },
        },
        DirectiveInfo {
            key: "run",
            label: "Run",
            description: "Shell commands executed as one image layer",
            default_value: || {
                Directive::Run(RunDirective {
                    run: Vec::new(),
                    condition: None,
                })
            },
        },
        DirectiveInfo {
            key: "variables",
            label: "Variables",
            description: "Named values for substitutions and conditions",
            default_value: || {
                Directive::Variables(VariablesDirective {
                    variables: IndexMap::new(),
                    condition: None,
                })
            },
        },
        DirectiveInfo {
            key: "template",
            label: "Template",
            description: "Parameterized installer for an external tool",
            default_value: || {
                Directive::Template(TemplateDirective {
                    template: TemplateCall {
                        name: String::new(),
                        params: IndexMap::new(),
                    },
                    condition: None,
                })
            },
        },
        DirectiveInfo {
            key: "deploy",
            label: "Deploy",
            description: "Binaries and paths exported at deployment",
            default_value: || {
                Directive::Deploy(DeployDirective {
                    deploy: DeploySpec::default(),
                    condition: None,
                })
            },
        },
        DirectiveInfo {
            key: "user",
            label: "User",
            description: "User for subsequent build steps",
            default_value: || {
                Directive::User(UserDirective {
                    user: String::new(),
                    condition: None,
                })
            },
        },
        DirectiveInfo {
            key: "copy",
            label: "Copy",
            description: "Copy files into the image",
            default_value: || {
                Directive::Copy(CopyDirective {
                    copy: StringOrList::Many(Vec::new()),
                    condition: None,
                })
            },
        },
        DirectiveInfo {
            key: "file",
            label: "File",
            description: "A file injected into the build directory and image",
            default_value: || {
                Directive::File(FileDirective {
                    file: FileSpec {
                        name: String::new(),
                        contents: Some(String::new()),
                        filename: None,
                        url: None,
                        executable: false,
                    },
                    condition: None,
                })
            },
        },
        DirectiveInfo {
            key: "test",
            label: "Test",
            description: "A container test script or builtin",
            default_value: || {
                Directive::Test(TestDirective {
                    test: TestSpec {
                        name: String::new(),
                        script: Some(String::new()),
                        builtin: None,
                    },
                    condition: None,
                })
            },
        },
        DirectiveInfo {
            key: "include",
            label: "Include",
            description: "Splice a directive-list file into the recipe",
            default_value: || {
                Directive::Include(IncludeDirective {
                    include: String::new(),
                    condition: None,
                })
            },
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nf007_standard_covers_every_key() {
        let registry = DirectiveRegistry::standard();
        assert_eq!(registry.len(), Directive::KEYS.len());
        for key in Directive::KEYS {
            assert!(registry.get(key).is_some(), "missing entry for '{}'", key);
        }
    }

    #[test]
    fn test_nf007_registration_order_is_dispatch_order() {
        let registry = DirectiveRegistry::standard();
        let keys: Vec<&str> = registry.all().map(|info| info.key).collect();
        assert_eq!(keys, Directive::KEYS.to_vec());
    }

    #[test]
    fn test_nf007_default_values_match_their_key() {
        let registry = DirectiveRegistry::standard();
        for info in registry.all() {
            let value = (info.default_value)();
            assert_eq!(value.key(), info.key);
            assert!(value.condition().is_none());
        }
    }

    #[test]
    fn test_nf007_duplicate_registration_is_error() {
        let mut registry = DirectiveRegistry::new();
        let info = standard_infos().remove(0);
        registry.register(info.clone()).unwrap();
        let err = registry.register(info).unwrap_err();
        assert!(err.contains("already registered"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_nf007_lookup_unknown_key() {
        let registry = DirectiveRegistry::standard();
        assert!(registry.get("boutique").is_none());
    }
}
