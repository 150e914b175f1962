//! NF-010: Dockerfile generation.
//!
//! Walks the directive list in order, filtering each directive by its
//! condition against the target architecture, and renders the
//! Dockerfile, the build-directory files, the deployment exports and
//! the merged test list. Variables become visible to conditions and
//! placeholders from the directive that declares them onward.

use crate::core::condition::{self, ConditionContext};
use crate::core::context::{resolve_placeholders, BuildContext};
use crate::core::types::*;
use crate::templates::TemplateRegistry;
use indexmap::IndexMap;
use std::path::{Path, PathBuf};

/// Includes may nest; a recipe deeper than this is assumed cyclic.
const MAX_INCLUDE_DEPTH: usize = 8;

/// Where injected files land inside the image.
const FILE_DEST_DIR: &str = "/opt";

#[derive(Debug, Clone)]
pub struct GenerateOptions {
    /// Target architecture; must be one the recipe declares.
    pub architecture: Architecture,
    /// Directory the recipe was loaded from; required for `include` and
    /// `file.filename` directives.
    pub base_dir: Option<PathBuf>,
}

impl GenerateOptions {
    pub fn for_arch(architecture: Architecture) -> Self {
        Self {
            architecture,
            base_dir: None,
        }
    }
}

/// A file to place in the build directory next to the Dockerfile.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildFile {
    pub name: String,
    pub contents: String,
    pub executable: bool,
}

/// Everything generation produces.
#[derive(Debug, Clone)]
pub struct BuildOutput {
    pub dockerfile: String,
    pub readme: String,
    pub build_files: Vec<BuildFile>,
    pub deploy_bins: Vec<String>,
    pub deploy_path: Vec<String>,
    pub tests: Vec<TestSpec>,
}

#[derive(Debug, Default)]
struct Emitter {
    lines: Vec<String>,
    build_files: Vec<BuildFile>,
    deploy_bins: Vec<String>,
    deploy_path: Vec<String>,
    tests: Vec<TestSpec>,
}

/// Generate the build artifacts for one architecture.
pub fn generate(
    recipe: &ContainerRecipe,
    templates: &TemplateRegistry,
    opts: &GenerateOptions,
) -> Result<BuildOutput, String> {
    if !recipe.architectures.contains(&opts.architecture) {
        return Err(format!(
            "recipe does not declare architecture {} (declares: {})",
            opts.architecture,
            recipe
                .architectures
                .iter()
                .map(|a| a.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        ));
    }

    let mut merged = recipe.clone();
    merged.merge_auxiliary();
    let build = merged.build.neurodocker();

    if build.base_image.is_empty() {
        return Err("build base-image must not be empty".to_string());
    }

    let mut ctx = BuildContext::new(&merged.name, &merged.version, opts.architecture);
    let mut em = Emitter::default();

    em.lines.push(format!(
        "# Generated by neuroforge {}",
        env!("CARGO_PKG_VERSION")
    ));
    em.lines.push(format!(
        "# {} {} ({})",
        merged.name, merged.version, opts.architecture
    ));
    em.lines.push(String::new());
    em.lines.push(format!("FROM {}", build.base_image));

    for directive in &build.directives {
        emit_directive(directive, build.pkg_manager, templates, opts, &mut ctx, &mut em, 0)?;
    }

    if !em.deploy_bins.is_empty() || !em.deploy_path.is_empty() {
        em.lines.push(String::new());
        let mut pairs = Vec::new();
        if !em.deploy_bins.is_empty() {
            pairs.push(("DEPLOY_BINS", em.deploy_bins.join(":")));
        }
        if !em.deploy_path.is_empty() {
            pairs.push(("DEPLOY_PATH", em.deploy_path.join(":")));
        }
        let rendered: Vec<(String, String)> = pairs
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();
        em.lines.push(env_block(&rendered));
    }

    let mut dockerfile = em.lines.join("\n");
    dockerfile.push('\n');

    let readme = super::readme::render(&merged, &em.tests);

    Ok(BuildOutput {
        dockerfile,
        readme,
        build_files: em.build_files,
        deploy_bins: em.deploy_bins,
        deploy_path: em.deploy_path,
        tests: em.tests,
    })
}

fn emit_directive(
    directive: &Directive,
    pkg_manager: PkgManager,
    templates: &TemplateRegistry,
    opts: &GenerateOptions,
    ctx: &mut BuildContext,
    em: &mut Emitter,
    depth: usize,
) -> Result<(), String> {
    if let Some(cond) = directive.condition() {
        let cond_ctx = ConditionContext {
            arch: ctx.arch.to_string(),
            variables: ctx.variables.clone(),
        };
        if !condition::evaluate(cond, &cond_ctx)? {
            return Ok(());
        }
    }

    match directive {
        Directive::Variables(v) => {
            for (key, value) in &v.variables {
                ctx.variables.insert(key.clone(), value.clone());
            }
        }
        Directive::Install(install) => {
            let mut packages = Vec::new();
            for pkg in install.install.items() {
                packages.push(resolve_placeholders(&pkg, ctx)?);
            }
            if packages.is_empty() {
                return Err("install directive has no packages".to_string());
            }
            em.lines.push(String::new());
            em.lines.push(install_block(pkg_manager, &packages));
        }
        Directive::Environment(env) => {
            let mut pairs = Vec::new();
            for (key, value) in &env.environment {
                pairs.push((key.clone(), resolve_placeholders(value, ctx)?));
            }
            if !pairs.is_empty() {
                em.lines.push(String::new());
                em.lines.push(env_block(&pairs));
            }
        }
        Directive::Run(run) => {
            let mut commands = Vec::new();
            for cmd in &run.run {
                commands.push(resolve_placeholders(cmd, ctx)?);
            }
            if commands.is_empty() {
                return Err("run directive has no commands".to_string());
            }
            em.lines.push(String::new());
            em.lines.push(run_block(&commands));
        }
        Directive::Workdir(w) => {
            em.lines.push(String::new());
            em.lines
                .push(format!("WORKDIR {}", resolve_placeholders(&w.workdir, ctx)?));
        }
        Directive::User(u) => {
            em.lines.push(String::new());
            em.lines
                .push(format!("USER {}", resolve_placeholders(&u.user, ctx)?));
        }
        Directive::Copy(copy) => {
            let mut items = Vec::new();
            for item in copy.copy.items() {
                items.push(resolve_placeholders(&item, ctx)?);
            }
            if items.len() < 2 {
                return Err("copy directive needs a source and a destination".to_string());
            }
            em.lines.push(String::new());
            em.lines.push(format!("COPY {}", items.join(" ")));
        }
        Directive::File(f) => emit_file(&f.file, opts, ctx, em)?,
        Directive::Template(t) => {
            let args = templates.resolve_args(&t.template)?;
            let render = template_render(&t.template.name, &args, pkg_manager)?;
            em.lines.push(String::new());
            em.lines.push(format!("# {}", render.comment));
            em.lines.push(run_block(&render.run));
            if !render.env.is_empty() {
                em.lines.push(env_block(&render.env));
            }
        }
        Directive::Group(g) => {
            for nested in &g.group {
                emit_directive(nested, pkg_manager, templates, opts, ctx, em, depth)?;
            }
        }
        Directive::Include(inc) => {
            emit_include(&inc.include, pkg_manager, templates, opts, ctx, em, depth)?;
        }
        Directive::Deploy(d) => {
            em.deploy_bins.extend(d.deploy.bins.iter().cloned());
            em.deploy_path.extend(d.deploy.path.iter().cloned());
        }
        Directive::Test(t) => {
            let mut test = t.test.clone();
            if let Some(script) = &test.script {
                test.script = Some(resolve_placeholders(script, ctx)?);
            }
            em.tests.push(test);
        }
    }

    Ok(())
}

fn emit_file(
    file: &FileSpec,
    opts: &GenerateOptions,
    ctx: &BuildContext,
    em: &mut Emitter,
) -> Result<(), String> {
    let dest = format!("{}/{}", FILE_DEST_DIR, file.name);

    if let Some(url) = &file.url {
        let url = resolve_placeholders(url, ctx)?;
        em.lines.push(String::new());
        em.lines.push(format!("ADD {} {}", url, dest));
        if file.executable {
            em.lines.push(format!("RUN chmod +x {}", dest));
        }
        return Ok(());
    }

    let contents = if let Some(contents) = &file.contents {
        resolve_placeholders(contents, ctx)?
    } else if let Some(filename) = &file.filename {
        let base_dir = opts.base_dir.as_ref().ok_or_else(|| {
            format!(
                "file '{}' reads from '{}' but no recipe directory is available",
                file.name, filename
            )
        })?;
        let path = resolve_relative(base_dir, filename)?;
        std::fs::read_to_string(&path)
            .map_err(|e| format!("cannot read {}: {}", path.display(), e))?
    } else {
        return Err(format!("file '{}' has no content source", file.name));
    };

    em.build_files.push(BuildFile {
        name: file.name.clone(),
        contents,
        executable: file.executable,
    });

    em.lines.push(String::new());
    em.lines.push(format!("COPY {} {}", file.name, dest));
    if file.executable {
        em.lines.push(format!("RUN chmod +x {}", dest));
    }

    Ok(())
}

fn emit_include(
    include: &str,
    pkg_manager: PkgManager,
    templates: &TemplateRegistry,
    opts: &GenerateOptions,
    ctx: &mut BuildContext,
    em: &mut Emitter,
    depth: usize,
) -> Result<(), String> {
    if depth >= MAX_INCLUDE_DEPTH {
        return Err(format!(
            "include depth exceeds {} at '{}' (cycle?)",
            MAX_INCLUDE_DEPTH, include
        ));
    }

    let base_dir = opts
        .base_dir
        .as_ref()
        .ok_or_else(|| format!("include '{}' needs a recipe directory", include))?;
    let path = resolve_relative(base_dir, include)?;
    let content = std::fs::read_to_string(&path)
        .map_err(|e| format!("cannot read include {}: {}", path.display(), e))?;
    let directives: Vec<Directive> = serde_yaml_ng::from_str(&content)
        .map_err(|e| format!("include {}: {}", path.display(), e))?;

    for directive in &directives {
        emit_directive(directive, pkg_manager, templates, opts, ctx, em, depth + 1)?;
    }

    Ok(())
}

fn resolve_relative(base_dir: &Path, relative: &str) -> Result<PathBuf, String> {
    if relative.starts_with('/') || relative.split('/').any(|part| part == "..") {
        return Err(format!(
            "path '{}' must stay inside the recipe directory",
            relative
        ));
    }
    Ok(base_dir.join(relative))
}

fn install_block(pkg_manager: PkgManager, packages: &[String]) -> String {
    let list = packages
        .iter()
        .map(|p| format!("           {}", p))
        .collect::<Vec<_>>()
        .join(" \\\n");

    match pkg_manager {
        PkgManager::Apt => format!(
            "RUN apt-get update -qq \\\n    \
             && DEBIAN_FRONTEND=noninteractive apt-get install -y --no-install-recommends \\\n\
             {} \\\n    \
             && rm -rf /var/lib/apt/lists/*",
            list
        ),
        PkgManager::Yum => format!(
            "RUN yum install -y \\\n\
             {} \\\n    \
             && yum clean all \\\n    \
             && rm -rf /var/cache/yum",
            list
        ),
    }
}

fn run_block(commands: &[String]) -> String {
    let mut out = String::from("RUN ");
    for (i, cmd) in commands.iter().enumerate() {
        if i > 0 {
            out.push_str(" \\\n    && ");
        }
        out.push_str(cmd);
    }
    out
}

fn env_block(pairs: &[(String, String)]) -> String {
    let mut out = String::from("ENV ");
    for (i, (key, value)) in pairs.iter().enumerate() {
        if i > 0 {
            out.push_str(" \\\n    ");
        }
        out.push_str(&format!("{}=\"{}\"", key, value.replace('"', "\\\"")));
    }
    out
}

// ============================================================================
// Template rendering
// ============================================================================

struct TemplateRender {
    comment: String,
    run: Vec<String>,
    env: Vec<(String, String)>,
}

fn arg_str(args: &IndexMap<String, serde_yaml_ng::Value>, key: &str) -> String {
    args.get(key).map(yaml_value_to_string).unwrap_or_default()
}

fn arg_bool(args: &IndexMap<String, serde_yaml_ng::Value>, key: &str) -> bool {
    match args.get(key) {
        Some(serde_yaml_ng::Value::Bool(b)) => *b,
        Some(serde_yaml_ng::Value::String(s)) => s == "true",
        _ => false,
    }
}

fn arg_list(args: &IndexMap<String, serde_yaml_ng::Value>, key: &str) -> Vec<String> {
    match args.get(key) {
        Some(serde_yaml_ng::Value::Sequence(seq)) => seq
            .iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect(),
        _ => Vec::new(),
    }
}

/// One-command package install, for template dependencies.
fn install_deps_cmd(pkg_manager: PkgManager, packages: &[&str]) -> String {
    let list = packages.join(" ");
    match pkg_manager {
        PkgManager::Apt => format!(
            "apt-get update -qq && DEBIAN_FRONTEND=noninteractive apt-get install -y --no-install-recommends {} && rm -rf /var/lib/apt/lists/*",
            list
        ),
        PkgManager::Yum => format!("yum install -y {} && yum clean all", list),
    }
}

fn template_render(
    name: &str,
    args: &IndexMap<String, serde_yaml_ng::Value>,
    pkg_manager: PkgManager,
) -> Result<TemplateRender, String> {
    match name {
        "afni" => {
            let version = arg_str(args, "version");
            let dir = format!("/opt/afni-{}", version);
            let mut run = vec![
                install_deps_cmd(pkg_manager, &["curl", "tcsh", "ca-certificates"]),
                format!("mkdir -p {}", dir),
                "curl -fsSL -o /tmp/afni.tgz https://afni.nimh.nih.gov/pub/dist/tgz/linux_ubuntu_16_64.tgz".to_string(),
                format!("tar -xzf /tmp/afni.tgz -C {} --strip-components 1", dir),
                "rm -f /tmp/afni.tgz".to_string(),
            ];
            if arg_bool(args, "install_python3") {
                run.push(install_deps_cmd(pkg_manager, &["python3", "python3-pip"]));
            }
            if arg_bool(args, "install_r_pkgs") {
                run.push(install_deps_cmd(pkg_manager, &["r-base", "r-base-dev"]));
                run.push(format!("{}/rPkgsInstall -pkgs ALL", dir));
            }
            Ok(TemplateRender {
                comment: format!("AFNI {}", version),
                run,
                env: vec![
                    ("AFNI_PLUGINPATH".to_string(), dir.clone()),
                    ("PATH".to_string(), format!("{}:$PATH", dir)),
                ],
            })
        }
        "ants" => {
            let version = arg_str(args, "version");
            let method = arg_str(args, "method");
            let dir = format!("/opt/ants-{}", version);
            let run = if method == "source" {
                vec![
                    install_deps_cmd(pkg_manager, &["git", "cmake", "g++", "make", "zlib1g-dev"]),
                    format!(
                        "git clone --depth 1 --branch v{} https://github.com/ANTsX/ANTs /tmp/ants-src",
                        version
                    ),
                    format!(
                        "cmake -S /tmp/ants-src -B /tmp/ants-build -DCMAKE_INSTALL_PREFIX={}",
                        dir
                    ),
                    "cmake --build /tmp/ants-build --target install -j 4".to_string(),
                    "rm -rf /tmp/ants-src /tmp/ants-build".to_string(),
                ]
            } else {
                vec![
                    install_deps_cmd(pkg_manager, &["curl", "unzip", "ca-certificates"]),
                    format!("mkdir -p {}", dir),
                    format!(
                        "curl -fsSL -o /tmp/ants.zip https://github.com/ANTsX/ANTs/releases/download/v{}/ants-{}-ubuntu-22.04-X64-gcc.zip",
                        version, version
                    ),
                    format!("unzip -q /tmp/ants.zip -d {}", dir),
                    "rm -f /tmp/ants.zip".to_string(),
                ]
            };
            Ok(TemplateRender {
                comment: format!("ANTs {} ({})", version, method),
                run,
                env: vec![
                    ("ANTSPATH".to_string(), format!("{}/bin", dir)),
                    ("PATH".to_string(), format!("{}/bin:$PATH", dir)),
                ],
            })
        }
        "bids_validator" => {
            let version = arg_str(args, "version");
            Ok(TemplateRender {
                comment: format!("BIDS Validator {}", version),
                run: vec![
                    install_deps_cmd(pkg_manager, &["nodejs", "npm"]),
                    format!("npm install -g bids-validator@{}", version),
                ],
                env: Vec::new(),
            })
        }
        "freesurfer" => {
            let version = arg_str(args, "version");
            let mut run = vec![
                install_deps_cmd(pkg_manager, &["curl", "ca-certificates"]),
                format!(
                    "curl -fsSL -o /tmp/freesurfer.tgz https://surfer.nmr.mgh.harvard.edu/pub/dist/freesurfer/{}/freesurfer-linux-ubuntu22_amd64-{}.tar.gz",
                    version, version
                ),
                "tar -xzf /tmp/freesurfer.tgz -C /opt".to_string(),
                "rm -f /tmp/freesurfer.tgz".to_string(),
            ];
            for path in arg_list(args, "exclude_paths") {
                run.push(format!("rm -rf /opt/freesurfer/{}", path));
            }
            Ok(TemplateRender {
                comment: format!("FreeSurfer {}", version),
                run,
                env: vec![
                    ("FREESURFER_HOME".to_string(), "/opt/freesurfer".to_string()),
                    ("PATH".to_string(), "/opt/freesurfer/bin:$PATH".to_string()),
                ],
            })
        }
        "fsl" => {
            let version = arg_str(args, "version");
            let dir = format!("/opt/fsl-{}", version);
            let mut run = vec![
                install_deps_cmd(pkg_manager, &["curl", "python3", "ca-certificates"]),
                "curl -fsSL -o /tmp/fslinstaller.py https://fsl.fmrib.ox.ac.uk/fsldownloads/fslconda/releases/fslinstaller.py".to_string(),
                format!("python3 /tmp/fslinstaller.py -d {} -V {}", dir, version),
                "rm -f /tmp/fslinstaller.py".to_string(),
            ];
            for path in arg_list(args, "exclude_paths") {
                run.push(format!("rm -rf {}/{}", dir, path));
            }
            Ok(TemplateRender {
                comment: format!("FSL {}", version),
                run,
                env: vec![
                    ("FSLDIR".to_string(), dir.clone()),
                    ("FSLOUTPUTTYPE".to_string(), "NIFTI_GZ".to_string()),
                    ("PATH".to_string(), format!("{}/bin:$PATH", dir)),
                ],
            })
        }
        "matlabmcr" => {
            let version = arg_str(args, "version");
            let install_path = arg_str(args, "install_path");
            Ok(TemplateRender {
                comment: format!("MATLAB Compiler Runtime {}", version),
                run: vec![
                    install_deps_cmd(pkg_manager, &["curl", "unzip", "ca-certificates"]),
                    format!(
                        "curl -fsSL -o /tmp/mcr.zip https://ssd.mathworks.com/supportfiles/downloads/R{}/Release/0/deployment_files/installer/complete/glnxa64/MATLAB_Runtime_R{}_glnxa64.zip",
                        version, version
                    ),
                    "unzip -q /tmp/mcr.zip -d /tmp/mcr-installer".to_string(),
                    format!(
                        "/tmp/mcr-installer/install -mode silent -agreeToLicense yes -destinationFolder {}",
                        install_path
                    ),
                    "rm -rf /tmp/mcr.zip /tmp/mcr-installer".to_string(),
                ],
                env: vec![("MCR_HOME".to_string(), install_path)],
            })
        }
        "miniconda" => {
            let version = arg_str(args, "version");
            let env_name = arg_str(args, "env_name");
            let dir = format!("/opt/miniconda-{}", version);
            let mut run = vec![
                install_deps_cmd(pkg_manager, &["curl", "ca-certificates"]),
                format!(
                    "curl -fsSL -o /tmp/miniconda.sh https://repo.anaconda.com/miniconda/Miniconda3-{}-Linux-x86_64.sh",
                    version
                ),
                format!("bash /tmp/miniconda.sh -b -p {}", dir),
                "rm -f /tmp/miniconda.sh".to_string(),
            ];
            let yaml_file = arg_str(args, "yaml_file");
            if !yaml_file.is_empty() {
                run.push(format!(
                    "{}/bin/conda env create -n {} -f {}/{}",
                    dir, env_name, FILE_DEST_DIR, yaml_file
                ));
            }
            let conda_install = arg_list(args, "conda_install");
            if !conda_install.is_empty() {
                run.push(format!(
                    "{}/bin/conda install -y -n {} {}",
                    dir,
                    env_name,
                    conda_install.join(" ")
                ));
            }
            let pip_install = arg_list(args, "pip_install");
            if !pip_install.is_empty() {
                run.push(format!(
                    "{}/bin/conda run -n {} pip install --no-cache-dir {}",
                    dir,
                    env_name,
                    pip_install.join(" ")
                ));
            }
            run.push(format!("{}/bin/conda clean -afy", dir));
            Ok(TemplateRender {
                comment: format!("Miniconda {}", version),
                run,
                env: vec![("PATH".to_string(), format!("{}/bin:$PATH", dir))],
            })
        }
        "spm12" => {
            let version = arg_str(args, "version");
            let mcr = arg_str(args, "matlab_install_path");
            Ok(TemplateRender {
                comment: format!("SPM12 {}", version),
                run: vec![
                    install_deps_cmd(pkg_manager, &["curl", "unzip", "ca-certificates"]),
                    format!(
                        "curl -fsSL -o /tmp/spm12.zip https://www.fil.ion.ucl.ac.uk/spm/download/restricted/utopia/spm12/spm12_{}_Linux_R2022b.zip",
                        version
                    ),
                    "unzip -q /tmp/spm12.zip -d /opt".to_string(),
                    "rm -f /tmp/spm12.zip".to_string(),
                    format!("/opt/spm12/run_spm12.sh {} function exit", mcr),
                ],
                env: vec![
                    (
                        "SPMMCRCMD".to_string(),
                        format!("/opt/spm12/run_spm12.sh {} script", mcr),
                    ),
                    ("FORCE_SPMMCR".to_string(), "1".to_string()),
                ],
            })
        }
        other => Err(format!("no renderer for template '{}'", other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::parser::parse_recipe;
    use crate::templates::TemplateRegistry;

    fn registry() -> TemplateRegistry {
        TemplateRegistry::standard()
    }

    fn opts() -> GenerateOptions {
        GenerateOptions::for_arch(Architecture::X86_64)
    }

    #[test]
    fn test_nf010_starter_generates() {
        let recipe = ContainerRecipe::starter();
        let out = generate(&recipe, &registry(), &opts()).unwrap();
        assert!(out.dockerfile.contains("FROM ubuntu:24.04"));
        assert!(out.dockerfile.ends_with('\n'));
        assert!(out.build_files.is_empty());
    }

    #[test]
    fn test_nf010_undeclared_architecture_is_error() {
        let recipe = ContainerRecipe::starter();
        let err = generate(
            &recipe,
            &registry(),
            &GenerateOptions::for_arch(Architecture::Aarch64),
        )
        .unwrap_err();
        assert!(err.contains("does not declare"));
    }

    #[test]
    fn test_nf010_install_apt_block() {
        let recipe = parse_recipe(
            r#"
name: t
version: "1"
architectures: [x86_64]
build:
  kind: neurodocker
  base-image: ubuntu:24.04
  pkg-manager: apt
  directives:
    - install: git curl
"#,
        )
        .unwrap();
        let out = generate(&recipe, &registry(), &opts()).unwrap();
        assert!(out.dockerfile.contains("apt-get update -qq"));
        assert!(out.dockerfile.contains("--no-install-recommends"));
        assert!(out.dockerfile.contains("           git"));
        assert!(out.dockerfile.contains("rm -rf /var/lib/apt/lists/*"));
    }

    #[test]
    fn test_nf010_install_yum_block() {
        let recipe = parse_recipe(
            r#"
name: t
version: "1"
architectures: [x86_64]
build:
  kind: neurodocker
  base-image: fedora:40
  pkg-manager: yum
  directives:
    - install: [git]
"#,
        )
        .unwrap();
        let out = generate(&recipe, &registry(), &opts()).unwrap();
        assert!(out.dockerfile.contains("yum install -y"));
        assert!(out.dockerfile.contains("yum clean all"));
    }

    #[test]
    fn test_nf010_run_and_env_blocks() {
        let recipe = parse_recipe(
            r#"
name: t
version: "2.1"
architectures: [x86_64]
build:
  kind: neurodocker
  base-image: ubuntu:24.04
  directives:
    - run:
        - echo one
        - echo two
    - environment:
        LANG: C.UTF-8
        TOOL: "{{ context.name }}-{{ context.version }}"
"#,
        )
        .unwrap();
        let out = generate(&recipe, &registry(), &opts()).unwrap();
        assert!(out.dockerfile.contains("RUN echo one \\\n    && echo two"));
        assert!(out.dockerfile.contains("ENV LANG=\"C.UTF-8\" \\\n    TOOL=\"t-2.1\""));
    }

    #[test]
    fn test_nf010_condition_filters_by_arch() {
        let yaml = r#"
name: t
version: "1"
architectures: [x86_64, aarch64]
build:
  kind: neurodocker
  base-image: ubuntu:24.04
  directives:
    - run: [echo amd]
      condition: arch=="x86_64"
    - run: [echo arm]
      condition: arch=="aarch64"
"#;
        let recipe = parse_recipe(yaml).unwrap();
        let amd = generate(&recipe, &registry(), &opts()).unwrap();
        assert!(amd.dockerfile.contains("echo amd"));
        assert!(!amd.dockerfile.contains("echo arm"));

        let arm = generate(
            &recipe,
            &registry(),
            &GenerateOptions::for_arch(Architecture::Aarch64),
        )
        .unwrap();
        assert!(arm.dockerfile.contains("echo arm"));
        assert!(!arm.dockerfile.contains("echo amd"));
    }

    #[test]
    fn test_nf010_variables_visible_downstream() {
        let recipe = parse_recipe(
            r#"
name: t
version: "1"
architectures: [x86_64]
build:
  kind: neurodocker
  base-image: ubuntu:24.04
  directives:
    - variables:
        flavor: full
    - run: ["echo {{ local.flavor }}"]
      condition: flavor=="full"
    - run: [echo skipped]
      condition: flavor=="minimal"
"#,
        )
        .unwrap();
        let out = generate(&recipe, &registry(), &opts()).unwrap();
        assert!(out.dockerfile.contains("echo full"));
        assert!(!out.dockerfile.contains("echo skipped"));
    }

    #[test]
    fn test_nf010_file_inline_contents() {
        let recipe = parse_recipe(
            r#"
name: t
version: "1"
architectures: [x86_64]
build:
  kind: neurodocker
  base-image: ubuntu:24.04
  directives:
    - file:
        name: startup.sh
        contents: "echo {{ context.name }}"
        executable: true
"#,
        )
        .unwrap();
        let out = generate(&recipe, &registry(), &opts()).unwrap();
        assert_eq!(out.build_files.len(), 1);
        assert_eq!(out.build_files[0].name, "startup.sh");
        assert_eq!(out.build_files[0].contents, "echo t");
        assert!(out.build_files[0].executable);
        assert!(out.dockerfile.contains("COPY startup.sh /opt/startup.sh"));
        assert!(out.dockerfile.contains("RUN chmod +x /opt/startup.sh"));
    }

    #[test]
    fn test_nf010_file_from_url_uses_add() {
        let recipe = parse_recipe(
            r#"
name: t
version: "1"
architectures: [x86_64]
build:
  kind: neurodocker
  base-image: ubuntu:24.04
  directives:
    - file:
        name: model.bin
        url: https://example.org/model.bin
"#,
        )
        .unwrap();
        let out = generate(&recipe, &registry(), &opts()).unwrap();
        assert!(out
            .dockerfile
            .contains("ADD https://example.org/model.bin /opt/model.bin"));
        assert!(out.build_files.is_empty());
    }

    #[test]
    fn test_nf010_file_from_disk_needs_base_dir() {
        let recipe = parse_recipe(
            r#"
name: t
version: "1"
architectures: [x86_64]
build:
  kind: neurodocker
  base-image: ubuntu:24.04
  directives:
    - file:
        name: conf.txt
        filename: conf.txt
"#,
        )
        .unwrap();
        let err = generate(&recipe, &registry(), &opts()).unwrap_err();
        assert!(err.contains("no recipe directory"));

        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("conf.txt"), "key=value\n").unwrap();
        let with_dir = GenerateOptions {
            architecture: Architecture::X86_64,
            base_dir: Some(dir.path().to_path_buf()),
        };
        let out = generate(&recipe, &registry(), &with_dir).unwrap();
        assert_eq!(out.build_files[0].contents, "key=value\n");
    }

    #[test]
    fn test_nf010_template_rendering() {
        let recipe = parse_recipe(
            r#"
name: t
version: "1"
architectures: [x86_64]
build:
  kind: neurodocker
  base-image: ubuntu:24.04
  directives:
    - template:
        name: ants
        version: "2.4.3"
"#,
        )
        .unwrap();
        let out = generate(&recipe, &registry(), &opts()).unwrap();
        assert!(out.dockerfile.contains("# ANTs 2.4.3 (binaries)"));
        assert!(out.dockerfile.contains("ants-2.4.3-ubuntu-22.04-X64-gcc.zip"));
        assert!(out.dockerfile.contains("ANTSPATH=\"/opt/ants-2.4.3/bin\""));
    }

    #[test]
    fn test_nf010_template_invalid_args_is_error() {
        let recipe = parse_recipe(
            r#"
name: t
version: "1"
architectures: [x86_64]
build:
  kind: neurodocker
  base-image: ubuntu:24.04
  directives:
    - template:
        name: ants
        version: "99"
"#,
        )
        .unwrap();
        let err = generate(&recipe, &registry(), &opts()).unwrap_err();
        assert!(err.contains("must be one of"));
    }

    #[test]
    fn test_nf010_group_recurses_and_macro_group_renders() {
        let recipe = parse_recipe(
            r#"
name: t
version: "1"
architectures: [x86_64]
build:
  kind: neurodocker
  base-image: ubuntu:24.04
  directives:
    - group:
        - install: openjdk-11-jre-headless
        - environment:
            JAVA_HOME: /usr/lib/jvm/java-11-openjdk-amd64
      custom: java
      customParams:
        version: "11"
"#,
        )
        .unwrap();
        let out = generate(&recipe, &registry(), &opts()).unwrap();
        assert!(out.dockerfile.contains("openjdk-11-jre-headless"));
        assert!(out.dockerfile.contains("JAVA_HOME"));
    }

    #[test]
    fn test_nf010_deploy_accumulates_into_env() {
        let recipe = parse_recipe(
            r#"
name: t
version: "1"
architectures: [x86_64]
build:
  kind: neurodocker
  base-image: ubuntu:24.04
  directives:
    - deploy:
        bins: [tool-a, tool-b]
        path: [/opt/bin]
deploy:
  bins: [tool-c]
"#,
        )
        .unwrap();
        let out = generate(&recipe, &registry(), &opts()).unwrap();
        assert_eq!(out.deploy_bins, vec!["tool-a", "tool-b", "tool-c"]);
        assert_eq!(out.deploy_path, vec!["/opt/bin"]);
        assert!(out
            .dockerfile
            .contains("ENV DEPLOY_BINS=\"tool-a:tool-b:tool-c\" \\\n    DEPLOY_PATH=\"/opt/bin\""));
    }

    #[test]
    fn test_nf010_tests_collected_not_rendered() {
        let recipe = parse_recipe(
            r#"
name: t
version: "1"
architectures: [x86_64]
build:
  kind: neurodocker
  base-image: ubuntu:24.04
  directives:
    - test:
        name: smoke
        script: "{{ context.name }} --version"
"#,
        )
        .unwrap();
        let out = generate(&recipe, &registry(), &opts()).unwrap();
        assert_eq!(out.tests.len(), 1);
        assert_eq!(out.tests[0].script.as_deref(), Some("t --version"));
        assert!(!out.dockerfile.contains("--version"));
        assert!(out.readme.contains("smoke"));
    }

    #[test]
    fn test_nf010_include_splices_directives() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("common.yaml"),
            "- run:\n    - echo included\n",
        )
        .unwrap();
        let recipe = parse_recipe(
            r#"
name: t
version: "1"
architectures: [x86_64]
build:
  kind: neurodocker
  base-image: ubuntu:24.04
  directives:
    - include: common.yaml
"#,
        )
        .unwrap();
        let with_dir = GenerateOptions {
            architecture: Architecture::X86_64,
            base_dir: Some(dir.path().to_path_buf()),
        };
        let out = generate(&recipe, &registry(), &with_dir).unwrap();
        assert!(out.dockerfile.contains("echo included"));
    }

    #[test]
    fn test_nf010_include_cycle_hits_depth_limit() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("self.yaml"), "- include: self.yaml\n").unwrap();
        let recipe = parse_recipe(
            r#"
name: t
version: "1"
architectures: [x86_64]
build:
  kind: neurodocker
  base-image: ubuntu:24.04
  directives:
    - include: self.yaml
"#,
        )
        .unwrap();
        let with_dir = GenerateOptions {
            architecture: Architecture::X86_64,
            base_dir: Some(dir.path().to_path_buf()),
        };
        let err = generate(&recipe, &registry(), &with_dir).unwrap_err();
        assert!(err.contains("depth"));
    }

    #[test]
    fn test_nf010_include_escape_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let recipe = parse_recipe(
            r#"
name: t
version: "1"
architectures: [x86_64]
build:
  kind: neurodocker
  base-image: ubuntu:24.04
  directives:
    - include: ../outside.yaml
"#,
        )
        .unwrap();
        let with_dir = GenerateOptions {
            architecture: Architecture::X86_64,
            base_dir: Some(dir.path().to_path_buf()),
        };
        let err = generate(&recipe, &registry(), &with_dir).unwrap_err();
        assert!(err.contains("stay inside"));
    }

    #[test]
    fn test_nf010_workdir_user_copy() {
        let recipe = parse_recipe(
            r#"
name: t
version: "1"
architectures: [x86_64]
build:
  kind: neurodocker
  base-image: ubuntu:24.04
  directives:
    - workdir: /opt/tool
    - user: neuro
    - copy: [entry.sh, /opt/entry.sh]
"#,
        )
        .unwrap();
        let out = generate(&recipe, &registry(), &opts()).unwrap();
        assert!(out.dockerfile.contains("WORKDIR /opt/tool"));
        assert!(out.dockerfile.contains("USER neuro"));
        assert!(out.dockerfile.contains("COPY entry.sh /opt/entry.sh"));
    }

    #[test]
    fn test_nf010_header_names_recipe() {
        let recipe = ContainerRecipe::starter();
        let out = generate(&recipe, &registry(), &opts()).unwrap();
        assert!(out.dockerfile.contains("# new-container 1.0.0 (x86_64)"));
    }
}
