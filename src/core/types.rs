//! NF-001: Recipe schema types.
//!
//! Defines the YAML schema for container recipes: the root document, the
//! neurodocker build section, and the directive sum type. All types derive
//! Serialize/Deserialize for YAML roundtripping. The directive wire format
//! is "which key is present" — the enum is untagged, and variant order is
//! the deserialization order for maps that would match more than one shape.
//! Documents that actually carry more than one directive key per map are
//! rejected by validation (see parser.rs).

use indexmap::IndexMap;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Top-level recipe document
// ============================================================================

/// Root document — one container recipe (`build.yaml`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ContainerRecipe {
    /// Container name (lowercase, used in the exported filename)
    pub name: String,

    /// Container version
    pub version: String,

    /// CPU architectures this recipe builds for
    #[serde(default)]
    pub architectures: Vec<Architecture>,

    /// License information — SPDX identifiers or custom entries
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub copyright: Option<Vec<CopyrightInfo>>,

    /// Inline documentation (mutually exclusive with readme_url)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub readme: Option<String>,

    /// Pointer to external documentation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub readme_url: Option<String>,

    /// Structured documentation, rendered to markdown at build time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub structured_readme: Option<StructuredReadme>,

    /// Build section
    pub build: BuildRecipe,

    /// Extra files, merged into the directive list before generation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub files: Option<Vec<FileSpec>>,

    /// Deployment exports, merged into the directive list before generation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deploy: Option<DeploySpec>,

    /// Container tests, merged into the directive list before generation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tests: Option<Vec<TestSpec>>,
}

impl ContainerRecipe {
    /// The starter recipe new projects begin from.
    pub fn starter() -> Self {
        Self {
            name: "new-container".to_string(),
            version: "1.0.0".to_string(),
            architectures: vec![Architecture::X86_64],
            copyright: None,
            readme: None,
            readme_url: None,
            structured_readme: None,
            build: BuildRecipe::Neurodocker(NeuroDockerBuild {
                base_image: "ubuntu:24.04".to_string(),
                pkg_manager: PkgManager::Apt,
                directives: Vec::new(),
            }),
            files: None,
            deploy: None,
            tests: None,
        }
    }

    /// Fold the auxiliary top-level collections (`files`, `deploy`, `tests`)
    /// into the directive list, preserving directive order. Idempotent once
    /// the auxiliary fields are drained.
    pub fn merge_auxiliary(&mut self) {
        let files = self.files.take();
        let deploy = self.deploy.take();
        let tests = self.tests.take();

        let BuildRecipe::Neurodocker(build) = &mut self.build;

        if let Some(files) = files {
            for file in files {
                build.directives.push(Directive::File(FileDirective {
                    file,
                    condition: None,
                }));
            }
        }
        if let Some(deploy) = deploy {
            build.directives.push(Directive::Deploy(DeployDirective {
                deploy,
                condition: None,
            }));
        }
        if let Some(tests) = tests {
            for test in tests {
                build.directives.push(Directive::Test(TestDirective {
                    test,
                    condition: None,
                }));
            }
        }
    }
}

/// Supported CPU architectures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum Architecture {
    #[serde(rename = "x86_64")]
    X86_64,
    #[serde(rename = "aarch64")]
    Aarch64,
}

impl Architecture {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::X86_64 => "x86_64",
            Self::Aarch64 => "aarch64",
        }
    }

    pub fn parse(s: &str) -> Result<Self, String> {
        match s {
            "x86_64" => Ok(Self::X86_64),
            "aarch64" => Ok(Self::Aarch64),
            other => Err(format!(
                "unknown architecture '{}' (expected x86_64 or aarch64)",
                other
            )),
        }
    }
}

impl fmt::Display for Architecture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// License entry — an SPDX identifier or a custom name, each with a URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum CopyrightInfo {
    Spdx {
        license: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        url: Option<String>,
    },
    Custom {
        name: String,
        url: String,
    },
}

/// Structured documentation form.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
pub struct StructuredReadme {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub example: String,
    #[serde(default)]
    pub documentation: String,
    #[serde(default)]
    pub citation: String,
}

// ============================================================================
// Build section
// ============================================================================

/// Build section, discriminated by `kind`. One variant today.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum BuildRecipe {
    Neurodocker(NeuroDockerBuild),
}

impl BuildRecipe {
    pub fn neurodocker(&self) -> &NeuroDockerBuild {
        let Self::Neurodocker(build) = self;
        build
    }

    pub fn neurodocker_mut(&mut self) -> &mut NeuroDockerBuild {
        let Self::Neurodocker(build) = self;
        build
    }
}

/// The neurodocker-style build description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct NeuroDockerBuild {
    /// Base container image (e.g. `ubuntu:24.04`)
    #[serde(rename = "base-image")]
    pub base_image: String,

    /// System package manager of the base image
    #[serde(rename = "pkg-manager", default)]
    pub pkg_manager: PkgManager,

    /// Ordered build directives
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub directives: Vec<Directive>,
}

/// System package manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum PkgManager {
    #[default]
    Apt,
    Yum,
}

impl fmt::Display for PkgManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Apt => write!(f, "apt"),
            Self::Yum => write!(f, "yum"),
        }
    }
}

// ============================================================================
// Directives
// ============================================================================

/// A build directive. The wire format is a single-key YAML map plus an
/// optional `condition`; the variant here is the key. Variant order below
/// is load-bearing: untagged deserialization tries variants top to bottom.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum Directive {
    Group(GroupDirective),
    Environment(EnvironmentDirective),
    Install(InstallDirective),
    Workdir(WorkdirDirective),
    Run(RunDirective),
    Variables(VariablesDirective),
    Template(TemplateDirective),
    Deploy(DeployDirective),
    User(UserDirective),
    Copy(CopyDirective),
    File(FileDirective),
    Test(TestDirective),
    Include(IncludeDirective),
}

impl Directive {
    /// Every discriminator key, in dispatch order.
    pub const KEYS: [&'static str; 13] = [
        "group",
        "environment",
        "install",
        "workdir",
        "run",
        "variables",
        "template",
        "deploy",
        "user",
        "copy",
        "file",
        "test",
        "include",
    ];

    /// The discriminator key this directive serializes under.
    pub fn key(&self) -> &'static str {
        match self {
            Self::Group(_) => "group",
            Self::Environment(_) => "environment",
            Self::Install(_) => "install",
            Self::Workdir(_) => "workdir",
            Self::Run(_) => "run",
            Self::Variables(_) => "variables",
            Self::Template(_) => "template",
            Self::Deploy(_) => "deploy",
            Self::User(_) => "user",
            Self::Copy(_) => "copy",
            Self::File(_) => "file",
            Self::Test(_) => "test",
            Self::Include(_) => "include",
        }
    }

    /// The build-time condition, if any.
    pub fn condition(&self) -> Option<&str> {
        match self {
            Self::Group(d) => d.condition.as_deref(),
            Self::Environment(d) => d.condition.as_deref(),
            Self::Install(d) => d.condition.as_deref(),
            Self::Workdir(d) => d.condition.as_deref(),
            Self::Run(d) => d.condition.as_deref(),
            Self::Variables(d) => d.condition.as_deref(),
            Self::Template(d) => d.condition.as_deref(),
            Self::Deploy(d) => d.condition.as_deref(),
            Self::User(d) => d.condition.as_deref(),
            Self::Copy(d) => d.condition.as_deref(),
            Self::File(d) => d.condition.as_deref(),
            Self::Test(d) => d.condition.as_deref(),
            Self::Include(d) => d.condition.as_deref(),
        }
    }

    pub fn set_condition(&mut self, condition: Option<String>) {
        match self {
            Self::Group(d) => d.condition = condition,
            Self::Environment(d) => d.condition = condition,
            Self::Install(d) => d.condition = condition,
            Self::Workdir(d) => d.condition = condition,
            Self::Run(d) => d.condition = condition,
            Self::Variables(d) => d.condition = condition,
            Self::Template(d) => d.condition = condition,
            Self::Deploy(d) => d.condition = condition,
            Self::User(d) => d.condition = condition,
            Self::Copy(d) => d.condition = condition,
            Self::File(d) => d.condition = condition,
            Self::Test(d) => d.condition = condition,
            Self::Include(d) => d.condition = condition,
        }
    }
}

/// A string or a list of strings. The single-string form is split on
/// whitespace when expanded to items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum StringOrList {
    One(String),
    Many(Vec<String>),
}

impl StringOrList {
    pub fn items(&self) -> Vec<String> {
        match self {
            Self::One(s) => s.split_whitespace().map(str::to_string).collect(),
            Self::Many(v) => v.clone(),
        }
    }
}

/// Nested directive list, optionally tagged with the group macro that
/// produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct GroupDirective {
    pub group: Vec<Directive>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom: Option<String>,
    #[serde(
        rename = "customParams",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    #[schemars(schema_with = "freeform_schema")]
    pub custom_params: Option<IndexMap<String, serde_yaml_ng::Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
}

impl GroupDirective {
    /// Drop the macro provenance, keeping the last expansion as a plain
    /// group. One-way: the params cannot be recovered afterwards.
    pub fn freeze(&mut self) {
        self.custom = None;
        self.custom_params = None;
    }
}

/// Environment variables exported into the image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct EnvironmentDirective {
    pub environment: IndexMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
}

/// Prefix marking an environment entry as a deployment export.
pub const DEPLOY_ENV_PREFIX: &str = "DEPLOY_ENV_";

impl EnvironmentDirective {
    /// Insert a deployment-environment entry (`DEPLOY_ENV_{name}`).
    pub fn set_deploy_env(&mut self, name: &str, value: &str) {
        self.environment
            .insert(format!("{}{}", DEPLOY_ENV_PREFIX, name), value.to_string());
    }

    /// Promote a standard entry to a deployment export, preserving its
    /// value and position. Returns false if the key is absent, already
    /// prefixed, or the prefixed key exists.
    pub fn to_deploy_env(&mut self, key: &str) -> bool {
        if key.starts_with(DEPLOY_ENV_PREFIX) {
            return false;
        }
        let target = format!("{}{}", DEPLOY_ENV_PREFIX, key);
        self.rename_key(key, &target)
    }

    /// Demote a deployment export back to a standard entry, preserving its
    /// value and position.
    pub fn to_standard(&mut self, key: &str) -> bool {
        let Some(stripped) = key.strip_prefix(DEPLOY_ENV_PREFIX) else {
            return false;
        };
        let target = stripped.to_string();
        self.rename_key(key, &target)
    }

    /// Deployment exports with the prefix stripped.
    pub fn deploy_envs(&self) -> Vec<(String, String)> {
        self.environment
            .iter()
            .filter_map(|(k, v)| {
                k.strip_prefix(DEPLOY_ENV_PREFIX)
                    .map(|name| (name.to_string(), v.clone()))
            })
            .collect()
    }

    fn rename_key(&mut self, from: &str, to: &str) -> bool {
        if !self.environment.contains_key(from) || self.environment.contains_key(to) {
            return false;
        }
        let entries: Vec<(String, String)> = self.environment.drain(..).collect();
        for (k, v) in entries {
            if k == from {
                self.environment.insert(to.to_string(), v);
            } else {
                self.environment.insert(k, v);
            }
        }
        true
    }
}

/// System packages to install via the recipe's package manager.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct InstallDirective {
    pub install: StringOrList,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct WorkdirDirective {
    pub workdir: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
}

/// Shell commands, rendered as a single image layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RunDirective {
    pub run: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
}

/// Named values usable in `{{ local.* }}` substitutions and conditions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct VariablesDirective {
    #[schemars(schema_with = "freeform_schema")]
    pub variables: IndexMap<String, serde_yaml_ng::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
}

/// A call to a registered template installer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TemplateDirective {
    pub template: TemplateCall,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
}

/// Template name plus its arguments, flattened in the wire format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TemplateCall {
    pub name: String,
    #[serde(flatten)]
    #[schemars(schema_with = "freeform_schema")]
    pub params: IndexMap<String, serde_yaml_ng::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DeployDirective {
    pub deploy: DeploySpec,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
}

/// Binaries and paths exported to the host at deployment.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
pub struct DeploySpec {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub path: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bins: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct UserDirective {
    pub user: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
}

/// Copy sources into the image; the last item is the destination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CopyDirective {
    pub copy: StringOrList,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FileDirective {
    pub file: FileSpec,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
}

/// A file injected into the image. Exactly one of `contents`, `filename`
/// or `url` supplies the content (enforced by validation).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FileSpec {
    /// Name of the file inside the build directory and the image
    pub name: String,

    /// Inline content
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contents: Option<String>,

    /// Local file the content is read from at generation time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,

    /// Remote source, downloaded during the image build
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(default, skip_serializing_if = "is_false")]
    pub executable: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TestDirective {
    pub test: TestSpec,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
}

/// A container test — a script body or the name of a builtin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TestSpec {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub builtin: Option<String>,
}

/// Splice a directive-list file into the recipe at generation time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct IncludeDirective {
    pub include: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
}

fn is_false(b: &bool) -> bool {
    !*b
}

fn freeform_schema(_: &mut schemars::gen::SchemaGenerator) -> schemars::schema::Schema {
    schemars::schema::Schema::Bool(true)
}

// ============================================================================
// Value helper
// ============================================================================

/// Convert a YAML value to a string for substitution and conditions.
pub fn yaml_value_to_string(val: &serde_yaml_ng::Value) -> String {
    match val {
        serde_yaml_ng::Value::String(s) => s.clone(),
        serde_yaml_ng::Value::Number(n) => n.to_string(),
        serde_yaml_ng::Value::Bool(b) => b.to_string(),
        serde_yaml_ng::Value::Null => String::new(),
        other => format!("{:?}", other),
    }
}

// ============================================================================
// Tests
// ============================================================================
