//! NF-006: Recipe export — serialization, filename derivation, atomic write.

use super::types::ContainerRecipe;
use std::path::{Path, PathBuf};

/// Serialize a recipe to YAML.
pub fn to_yaml(recipe: &ContainerRecipe) -> Result<String, String> {
    serde_yaml_ng::to_string(recipe).map_err(|e| format!("serialize error: {}", e))
}

/// Derive the export filename: `{name}-{version}.yaml`.
pub fn export_filename(recipe: &ContainerRecipe) -> String {
    format!("{}-{}.yaml", recipe.name, recipe.version)
}

/// Write a recipe into a directory under its export filename.
/// Atomic: temp file + rename.
pub fn write_recipe(dir: &Path, recipe: &ContainerRecipe) -> Result<PathBuf, String> {
    let path = dir.join(export_filename(recipe));
    write_recipe_to(&path, recipe)?;
    Ok(path)
}

/// Write a recipe to an explicit path. Atomic: temp file + rename.
pub fn write_recipe_to(path: &Path, recipe: &ContainerRecipe) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .map_err(|e| format!("cannot create dir {}: {}", parent.display(), e))?;
        }
    }

    let yaml = to_yaml(recipe)?;

    let tmp_path = path.with_extension("yaml.tmp");
    std::fs::write(&tmp_path, &yaml)
        .map_err(|e| format!("cannot write {}: {}", tmp_path.display(), e))?;
    std::fs::rename(&tmp_path, path).map_err(|e| {
        format!(
            "cannot rename {} -> {}: {}",
            tmp_path.display(),
            path.display(),
            e
        )
    })?;

    Ok(())
}
