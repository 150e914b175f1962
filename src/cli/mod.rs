//! NF-016: CLI subcommands — init, validate, generate, wizard, templates,
//! license-search, schema, list, fetch, publish, completions.

use crate::build::{self, GenerateOptions};
use crate::core::types::{Architecture, ContainerRecipe, Directive, InstallDirective, PkgManager, StringOrList};
use crate::core::{export, parser, wizard};
use crate::github::cache::{self, CachedListing};
use crate::github::{api, publish};
use crate::licenses;
use crate::macros;
use crate::templates::{ArgKind, TemplateRegistry};
use clap::{CommandFactory, Parser, Subcommand};
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(
    name = "neuroforge",
    version,
    about = "Container recipes for neuroimaging software — wizard, validation, Dockerfile generation, publishing"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a starter recipe
    Init {
        /// Directory to initialize (default: current)
        #[arg(default_value = ".")]
        path: PathBuf,
    },

    /// Validate a recipe without building anything
    Validate {
        /// Path to the recipe
        #[arg(short, long, default_value = "build.yaml")]
        file: PathBuf,
    },

    /// Generate the Dockerfile, README and build files
    Generate {
        /// Path to the recipe
        #[arg(short, long, default_value = "build.yaml")]
        file: PathBuf,

        /// Output directory
        #[arg(short, long, default_value = "build")]
        output: PathBuf,

        /// Target architecture (default: first the recipe declares)
        #[arg(long)]
        arch: Option<String>,
    },

    /// Author a recipe interactively
    Wizard {
        /// Directory the final YAML is written into
        #[arg(short, long, default_value = ".")]
        output: PathBuf,
    },

    /// List template installers and group macros
    Templates,

    /// Fuzzy-search the SPDX license list
    LicenseSearch {
        query: String,

        /// Maximum number of results
        #[arg(short, long, default_value_t = 10)]
        limit: usize,
    },

    /// Print the recipe JSON schema
    Schema,

    /// List recipes in the GitHub repository
    List {
        #[arg(long, default_value = api::DEFAULT_OWNER)]
        owner: String,

        #[arg(long, default_value = api::DEFAULT_REPO)]
        repo: String,

        #[arg(long, default_value = api::DEFAULT_BRANCH)]
        branch: String,

        /// Skip the cache and fetch fresh
        #[arg(long)]
        no_cache: bool,

        /// Drop the cached listing and exit
        #[arg(long)]
        clear_cache: bool,

        /// Also fetch last-commit metadata (one request per recipe)
        #[arg(long)]
        with_commits: bool,

        /// Cache directory
        #[arg(long, default_value = ".neuroforge-cache")]
        cache_dir: PathBuf,

        /// GitHub token for rate-limited environments
        #[arg(long)]
        token: Option<String>,
    },

    /// Download a recipe from the GitHub repository
    Fetch {
        /// Recipe name (directory under recipes/)
        name: String,

        #[arg(long, default_value = api::DEFAULT_OWNER)]
        owner: String,

        #[arg(long, default_value = api::DEFAULT_REPO)]
        repo: String,

        #[arg(long, default_value = api::DEFAULT_BRANCH)]
        branch: String,

        /// Write here instead of ./{name}.yaml
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// GitHub token for rate-limited environments
        #[arg(long)]
        token: Option<String>,
    },

    /// Build the issue URL that contributes a recipe
    Publish {
        /// Path to the recipe
        #[arg(short, long, default_value = "build.yaml")]
        file: PathBuf,

        #[arg(long, default_value = api::DEFAULT_OWNER)]
        owner: String,

        #[arg(long, default_value = api::DEFAULT_REPO)]
        repo: String,
    },

    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Dispatch a CLI command.
pub fn dispatch(cmd: Commands) -> Result<(), String> {
    match cmd {
        Commands::Init { path } => cmd_init(&path),
        Commands::Validate { file } => cmd_validate(&file),
        Commands::Generate { file, output, arch } => {
            cmd_generate(&file, &output, arch.as_deref())
        }
        Commands::Wizard { output } => {
            let stdin = std::io::stdin();
            let mut input = stdin.lock();
            let mut out = std::io::stdout();
            let recipe = run_wizard(&mut input, &mut out)?;
            let path = export::write_recipe(&output, &recipe)?;
            println!("Wrote {}", path.display());
            Ok(())
        }
        Commands::Templates => cmd_templates(),
        Commands::LicenseSearch { query, limit } => cmd_license_search(&query, limit),
        Commands::Schema => cmd_schema(),
        Commands::List {
            owner,
            repo,
            branch,
            no_cache,
            clear_cache,
            with_commits,
            cache_dir,
            token,
        } => cmd_list(
            &owner,
            &repo,
            &branch,
            no_cache,
            clear_cache,
            with_commits,
            &cache_dir,
            token.as_deref(),
        ),
        Commands::Fetch {
            name,
            owner,
            repo,
            branch,
            output,
            token,
        } => cmd_fetch(&name, &owner, &repo, &branch, output.as_deref(), token.as_deref()),
        Commands::Publish { file, owner, repo } => cmd_publish(&file, &owner, &repo),
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "neuroforge", &mut std::io::stdout());
            Ok(())
        }
    }
}

fn cmd_init(path: &Path) -> Result<(), String> {
    let recipe_path = path.join("build.yaml");
    if recipe_path.exists() {
        return Err(format!("{} already exists", recipe_path.display()));
    }
    std::fs::create_dir_all(path)
        .map_err(|e| format!("cannot create dir {}: {}", path.display(), e))?;

    export::write_recipe_to(&recipe_path, &ContainerRecipe::starter())?;

    println!("Initialized recipe at {}", recipe_path.display());
    println!("  Next: edit it, or run `neuroforge wizard`");
    Ok(())
}

fn cmd_validate(file: &Path) -> Result<(), String> {
    let content = std::fs::read_to_string(file)
        .map_err(|e| format!("failed to read {}: {}", file.display(), e))?;

    let mut errors = parser::check_discriminators(&content)?;
    let templates = TemplateRegistry::standard();

    match parser::parse_recipe(&content) {
        Ok(recipe) => {
            errors.extend(parser::validate_recipe(&recipe, &templates));
            if errors.is_empty() {
                println!(
                    "OK: {} {} ({} directives, {} architectures)",
                    recipe.name,
                    recipe.version,
                    recipe.build.neurodocker().directives.len(),
                    recipe.architectures.len()
                );
                return Ok(());
            }
        }
        Err(e) => {
            if errors.is_empty() {
                return Err(e);
            }
        }
    }

    for e in &errors {
        eprintln!("  ERROR: {}", e);
    }
    Err(format!("{} validation error(s)", errors.len()))
}

/// Parse and validate, returning errors if invalid.
fn parse_and_validate(file: &Path) -> Result<ContainerRecipe, String> {
    let content = std::fs::read_to_string(file)
        .map_err(|e| format!("failed to read {}: {}", file.display(), e))?;

    let mut errors = parser::check_discriminators(&content)?;
    let recipe = parser::parse_recipe(&content)?;
    errors.extend(parser::validate_recipe(&recipe, &TemplateRegistry::standard()));

    if errors.is_empty() {
        return Ok(recipe);
    }
    for e in &errors {
        eprintln!("  ERROR: {}", e);
    }
    Err("validation failed".to_string())
}

fn cmd_generate(file: &Path, output: &Path, arch: Option<&str>) -> Result<(), String> {
    let recipe = parse_and_validate(file)?;

    let architecture = match arch {
        Some(a) => Architecture::parse(a)?,
        None => *recipe
            .architectures
            .first()
            .ok_or_else(|| "recipe declares no architectures".to_string())?,
    };

    let opts = GenerateOptions {
        architecture,
        base_dir: file.parent().map(Path::to_path_buf),
    };
    let templates = TemplateRegistry::standard();
    let result = build::generate(&recipe, &templates, &opts)?;

    std::fs::create_dir_all(output)
        .map_err(|e| format!("cannot create dir {}: {}", output.display(), e))?;

    let dockerfile_path = output.join("Dockerfile");
    std::fs::write(&dockerfile_path, &result.dockerfile)
        .map_err(|e| format!("cannot write {}: {}", dockerfile_path.display(), e))?;

    let readme_path = output.join("README.md");
    std::fs::write(&readme_path, &result.readme)
        .map_err(|e| format!("cannot write {}: {}", readme_path.display(), e))?;

    for file in &result.build_files {
        let path = output.join(&file.name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| format!("cannot create dir {}: {}", parent.display(), e))?;
        }
        std::fs::write(&path, &file.contents)
            .map_err(|e| format!("cannot write {}: {}", path.display(), e))?;
        if file.executable {
            make_executable(&path)?;
        }
    }

    println!(
        "Generated {} ({} {}, {})",
        dockerfile_path.display(),
        recipe.name,
        recipe.version,
        architecture
    );
    println!(
        "  {} build file(s), {} test(s), {} deploy bin(s)",
        result.build_files.len(),
        result.tests.len(),
        result.deploy_bins.len()
    );
    Ok(())
}

#[cfg(unix)]
fn make_executable(path: &Path) -> Result<(), String> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755))
        .map_err(|e| format!("cannot chmod {}: {}", path.display(), e))
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> Result<(), String> {
    Ok(())
}

fn io_err(e: std::io::Error) -> String {
    format!("I/O error: {}", e)
}

fn prompt<R: BufRead, W: Write>(
    input: &mut R,
    out: &mut W,
    label: &str,
    default: &str,
) -> Result<String, String> {
    if default.is_empty() {
        write!(out, "{}: ", label).map_err(io_err)?;
    } else {
        write!(out, "{} [{}]: ", label, default).map_err(io_err)?;
    }
    out.flush().map_err(io_err)?;

    let mut line = String::new();
    let read = input.read_line(&mut line).map_err(io_err)?;
    if read == 0 {
        return Err("input closed".to_string());
    }
    let trimmed = line.trim();
    Ok(if trimmed.is_empty() {
        default.to_string()
    } else {
        trimmed.to_string()
    })
}

/// Drive the wizard over a line-based input. Returns the finished recipe;
/// the caller performs the terminal export.
pub fn run_wizard<R: BufRead, W: Write>(
    input: &mut R,
    out: &mut W,
) -> Result<ContainerRecipe, String> {
    let mut wiz = wizard::Wizard::new(ContainerRecipe::starter());
    let templates = TemplateRegistry::standard();

    loop {
        let step = wiz.step();
        writeln!(out, "\nStep {}/3 — {}", step.index() + 1, step.title()).map_err(io_err)?;

        match step {
            wizard::WizardStep::BasicInfo => {
                let name = prompt(input, out, "Name", &wiz.recipe().name)?;
                let version = prompt(input, out, "Version", &wiz.recipe().version)?;
                wiz.recipe_mut().name = name;
                wiz.recipe_mut().version = version;
            }
            wizard::WizardStep::BuildRecipe => {
                let current = wiz.recipe().build.neurodocker().base_image.clone();
                let base_image = prompt(input, out, "Base image", &current)?;

                let current_pm = wiz.recipe().build.neurodocker().pkg_manager;
                let pm = prompt(
                    input,
                    out,
                    "Package manager (apt/yum)",
                    &current_pm.to_string(),
                )?;
                let pkg_manager = match pm.as_str() {
                    "apt" => PkgManager::Apt,
                    "yum" => PkgManager::Yum,
                    other => {
                        writeln!(out, "  unknown package manager '{}', keeping {}", other, current_pm)
                            .map_err(io_err)?;
                        current_pm
                    }
                };

                let packages = prompt(
                    input,
                    out,
                    "System packages (space-separated, blank for none)",
                    "",
                )?;

                let build = wiz.recipe_mut().build.neurodocker_mut();
                build.base_image = base_image;
                build.pkg_manager = pkg_manager;
                if !packages.trim().is_empty() {
                    build.directives.push(Directive::Install(InstallDirective {
                        install: StringOrList::One(packages),
                        condition: None,
                    }));
                }
            }
            wizard::WizardStep::ValidateRecipe => {
                let errors = parser::validate_recipe(wiz.recipe(), &templates);
                if errors.is_empty() {
                    writeln!(out, "Validation passed.").map_err(io_err)?;
                } else {
                    for e in &errors {
                        writeln!(out, "  ERROR: {}", e).map_err(io_err)?;
                    }
                }
                writeln!(out, "Exporting {}", wiz.export_filename()).map_err(io_err)?;
                return Ok(wiz.into_recipe());
            }
        }

        if let Err(e) = wiz.next() {
            writeln!(out, "  {}", e).map_err(io_err)?;
        }
    }
}

fn cmd_templates() -> Result<(), String> {
    let templates = TemplateRegistry::standard();

    println!("Templates ({}):", templates.len());
    for spec in templates.all() {
        println!("  {} — {} ({})", spec.name, spec.label, spec.url);
        for arg in &spec.arguments {
            let kind = match &arg.kind {
                ArgKind::Dropdown { options } => format!("one of: {}", options.join(", ")),
                ArgKind::Text => "text".to_string(),
                ArgKind::Array => "list".to_string(),
                ArgKind::Boolean => "boolean".to_string(),
            };
            let default = arg
                .default
                .map(|d| format!(" [default: {}]", d))
                .unwrap_or_default();
            let advanced = if arg.advanced { " (advanced)" } else { "" };
            println!("      {} — {}{}{}", arg.name, kind, default, advanced);
        }
    }

    println!();
    println!("Group macros ({}):", macros::KNOWN.len());
    for name in macros::KNOWN {
        println!("  {}", name);
    }
    Ok(())
}

fn cmd_license_search(query: &str, limit: usize) -> Result<(), String> {
    let results = licenses::search(query, limit);
    if results.is_empty() {
        println!("No matches for '{}'.", query);
        return Ok(());
    }
    for license in results {
        println!("{:<20} {}", license.id, license.name);
    }
    Ok(())
}

fn cmd_schema() -> Result<(), String> {
    let schema = schemars::schema_for!(ContainerRecipe);
    let json =
        serde_json::to_string_pretty(&schema).map_err(|e| format!("serialize error: {}", e))?;
    println!("{}", json);
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn cmd_list(
    owner: &str,
    repo: &str,
    branch: &str,
    no_cache: bool,
    clear_cache: bool,
    with_commits: bool,
    cache_dir: &Path,
    token: Option<&str>,
) -> Result<(), String> {
    if clear_cache {
        let removed = cache::clear(cache_dir, owner, repo, branch)?;
        println!(
            "{}",
            if removed {
                "Cache cleared."
            } else {
                "No cache to clear."
            }
        );
        return Ok(());
    }

    let now = cache::now_epoch();

    if !no_cache {
        if let Some(cached) = cache::load(cache_dir, owner, repo, branch)? {
            let info = cached.info(now);
            if info.is_valid {
                print_listing(&cached.recipes);
                println!(
                    "(cached {}s ago, expires in {}s — --no-cache to refresh)",
                    info.age_seconds,
                    info.expires_at.saturating_sub(now)
                );
                return Ok(());
            }
        }
    }

    let mut client = api::GitHubClient::new(owner, repo, branch)?;
    if let Some(token) = token {
        client = client.with_token(token);
    }

    match client.list_recipes(with_commits) {
        Ok(recipes) => {
            cache::save(
                cache_dir,
                owner,
                repo,
                branch,
                &CachedListing::new(recipes.clone(), now),
            )?;
            print_listing(&recipes);
            Ok(())
        }
        Err(e) => {
            // Fall back to a stale cache rather than nothing.
            if let Some(stale) = cache::load(cache_dir, owner, repo, branch)? {
                eprintln!("warning: {} — showing stale cache", e);
                print_listing(&stale.recipes);
                Ok(())
            } else {
                Err(e)
            }
        }
    }
}

fn print_listing(recipes: &[api::RecipeListing]) {
    println!("{} recipe(s):", recipes.len());
    for recipe in recipes {
        match &recipe.commit {
            Some(commit) => println!(
                "  {:<24} {} — {} ({})",
                recipe.name, commit.date, commit.message, commit.author
            ),
            None => println!("  {}", recipe.name),
        }
    }
}

fn cmd_fetch(
    name: &str,
    owner: &str,
    repo: &str,
    branch: &str,
    output: Option<&Path>,
    token: Option<&str>,
) -> Result<(), String> {
    let mut client = api::GitHubClient::new(owner, repo, branch)?;
    if let Some(token) = token {
        client = client.with_token(token);
    }

    let yaml = client.fetch_recipe_yaml(name)?;
    let recipe = parser::parse_recipe(&yaml)?;

    let default_path = PathBuf::from(format!("{}.yaml", name));
    let path = output.unwrap_or(&default_path);
    std::fs::write(path, &yaml).map_err(|e| format!("cannot write {}: {}", path.display(), e))?;

    println!(
        "Fetched {} {} -> {}",
        recipe.name,
        recipe.version,
        path.display()
    );
    Ok(())
}

fn cmd_publish(file: &Path, owner: &str, repo: &str) -> Result<(), String> {
    let recipe = parse_and_validate(file)?;

    match publish::publish_action(owner, repo, &recipe)? {
        publish::PublishAction::OpenUrl(url) => {
            println!("Open this URL to file the contribution:");
            println!();
            println!("{}", url);
        }
        publish::PublishAction::ManualPaste { issue_url, body } => {
            println!("Recipe too large for a prefilled URL.");
            println!("Open {} and paste the following body:", issue_url);
            println!();
            println!("{}", body);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const VALID: &str = r#"
name: clitest
version: "0.2.0"
architectures: [x86_64]
build:
  kind: neurodocker
  base-image: ubuntu:24.04
  pkg-manager: apt
  directives:
    - install: git
    - file:
        name: hello.sh
        contents: "echo hello"
        executable: true
"#;

    #[test]
    fn test_nf016_init_creates_recipe() {
        let dir = tempfile::tempdir().unwrap();
        let sub = dir.path().join("project");
        cmd_init(&sub).unwrap();
        let recipe = parser::parse_recipe_file(&sub.join("build.yaml")).unwrap();
        assert_eq!(recipe.name, "new-container");
    }

    #[test]
    fn test_nf016_init_refuses_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("build.yaml"), "exists").unwrap();
        assert!(cmd_init(dir.path()).is_err());
    }

    #[test]
    fn test_nf016_validate_valid() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("build.yaml");
        std::fs::write(&file, VALID).unwrap();
        cmd_validate(&file).unwrap();
    }

    #[test]
    fn test_nf016_validate_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("build.yaml");
        std::fs::write(
            &file,
            r#"
name: ""
version: ""
architectures: []
build:
  kind: neurodocker
  base-image: ""
"#,
        )
        .unwrap();
        let err = cmd_validate(&file).unwrap_err();
        assert!(err.contains("validation error"));
    }

    #[test]
    fn test_nf016_validate_ambiguous_directive() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("build.yaml");
        std::fs::write(
            &file,
            r#"
name: x
version: "1"
architectures: [x86_64]
build:
  kind: neurodocker
  base-image: ubuntu:24.04
  directives:
    - install: git
      run: [echo]
"#,
        )
        .unwrap();
        assert!(cmd_validate(&file).is_err());
    }

    #[test]
    fn test_nf016_generate_writes_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("build.yaml");
        std::fs::write(&file, VALID).unwrap();
        let output = dir.path().join("out");

        cmd_generate(&file, &output, None).unwrap();

        let dockerfile = std::fs::read_to_string(output.join("Dockerfile")).unwrap();
        assert!(dockerfile.contains("FROM ubuntu:24.04"));
        assert!(output.join("README.md").exists());

        let script = output.join("hello.sh");
        assert_eq!(std::fs::read_to_string(&script).unwrap(), "echo hello");
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(&script).unwrap().permissions().mode();
            assert_eq!(mode & 0o111, 0o111);
        }
    }

    #[test]
    fn test_nf016_generate_rejects_undeclared_arch() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("build.yaml");
        std::fs::write(&file, VALID).unwrap();
        let err = cmd_generate(&file, &dir.path().join("out"), Some("aarch64")).unwrap_err();
        assert!(err.contains("does not declare"));
    }

    #[test]
    fn test_nf016_generate_rejects_invalid_recipe() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("build.yaml");
        std::fs::write(&file, "name: \"\"\nversion: \"\"\nbuild:\n  kind: neurodocker\n  base-image: x\n").unwrap();
        assert!(cmd_generate(&file, &dir.path().join("out"), None).is_err());
    }

    #[test]
    fn test_nf016_wizard_accepts_defaults() {
        let mut input = Cursor::new("\n\n\n\n\n");
        let mut out = Vec::new();
        let recipe = run_wizard(&mut input, &mut out).unwrap();
        assert_eq!(recipe.name, "new-container");
        assert_eq!(recipe.version, "1.0.0");

        let transcript = String::from_utf8(out).unwrap();
        assert!(transcript.contains("Step 1/3"));
        assert!(transcript.contains("Step 3/3"));
        assert!(transcript.contains("Validation passed."));
        assert!(transcript.contains("Exporting new-container-1.0.0.yaml"));
    }

    #[test]
    fn test_nf016_wizard_custom_values() {
        let mut input = Cursor::new("qsmxt\n8.0.3\ndebian:12\napt\ngit curl\n");
        let mut out = Vec::new();
        let recipe = run_wizard(&mut input, &mut out).unwrap();
        assert_eq!(recipe.name, "qsmxt");
        assert_eq!(recipe.version, "8.0.3");
        let build = recipe.build.neurodocker();
        assert_eq!(build.base_image, "debian:12");
        assert_eq!(build.directives.len(), 1);
        let Directive::Install(install) = &build.directives[0] else {
            panic!("expected install directive");
        };
        assert_eq!(install.install.items(), vec!["git", "curl"]);
    }

    #[test]
    fn test_nf016_wizard_unknown_pkg_manager_kept() {
        let mut input = Cursor::new("\n\n\npacman\n\n");
        let mut out = Vec::new();
        let recipe = run_wizard(&mut input, &mut out).unwrap();
        assert_eq!(recipe.build.neurodocker().pkg_manager, PkgManager::Apt);
        let transcript = String::from_utf8(out).unwrap();
        assert!(transcript.contains("unknown package manager 'pacman'"));
    }

    #[test]
    fn test_nf016_wizard_input_closed_is_error() {
        let mut input = Cursor::new("");
        let mut out = Vec::new();
        let err = run_wizard(&mut input, &mut out).unwrap_err();
        assert!(err.contains("input closed"));
    }

    #[test]
    fn test_nf016_templates_listing() {
        cmd_templates().unwrap();
    }

    #[test]
    fn test_nf016_license_search() {
        cmd_license_search("mit", 5).unwrap();
        cmd_license_search("zzzznothing", 5).unwrap();
    }

    #[test]
    fn test_nf016_schema_prints() {
        cmd_schema().unwrap();
    }

    #[test]
    fn test_nf016_list_uses_fresh_cache_without_network() {
        let dir = tempfile::tempdir().unwrap();
        let recipes = vec![api::RecipeListing {
            name: "qsmxt".to_string(),
            path: "recipes/qsmxt".to_string(),
            sha: "abc".to_string(),
            commit: None,
        }];
        cache::save(
            dir.path(),
            "o",
            "r",
            "b",
            &CachedListing::new(recipes, cache::now_epoch()),
        )
        .unwrap();

        cmd_list("o", "r", "b", false, false, false, dir.path(), None).unwrap();
    }

    #[test]
    fn test_nf016_list_clear_cache() {
        let dir = tempfile::tempdir().unwrap();
        cache::save(
            dir.path(),
            "o",
            "r",
            "b",
            &CachedListing::new(vec![], cache::now_epoch()),
        )
        .unwrap();

        cmd_list("o", "r", "b", false, true, false, dir.path(), None).unwrap();
        assert!(cache::load(dir.path(), "o", "r", "b").unwrap().is_none());
    }

    #[test]
    fn test_nf016_publish_prints_url() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("build.yaml");
        std::fs::write(&file, VALID).unwrap();
        cmd_publish(&file, "neurodesk", "neurocontainers").unwrap();
    }

    #[test]
    fn test_nf016_publish_rejects_invalid_recipe() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("build.yaml");
        std::fs::write(&file, "name: \"\"\nversion: \"\"\nbuild:\n  kind: neurodocker\n  base-image: \"\"\n").unwrap();
        assert!(cmd_publish(&file, "o", "r").is_err());
    }

    #[test]
    fn test_nf016_dispatch_init_and_validate() {
        let dir = tempfile::tempdir().unwrap();
        let sub = dir.path().join("d");
        dispatch(Commands::Init { path: sub.clone() }).unwrap();
        dispatch(Commands::Validate {
            file: sub.join("build.yaml"),
        })
        .unwrap();
    }

    #[test]
    fn test_nf016_dispatch_generate() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("build.yaml");
        std::fs::write(&file, VALID).unwrap();
        dispatch(Commands::Generate {
            file,
            output: dir.path().join("out"),
            arch: None,
        })
        .unwrap();
    }

    #[test]
    fn test_nf016_dispatch_completions() {
        dispatch(Commands::Completions {
            shell: clap_complete::Shell::Bash,
        })
        .unwrap();
    }
}
