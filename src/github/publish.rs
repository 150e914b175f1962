//! NF-014: Publish flow — issue-creation URLs with a compressed payload.
//!
//! The recipe YAML is zlib-compressed and base64-encoded into the issue
//! body. When the body would exceed the size GitHub reliably accepts in
//! a URL, the flow falls back to a manual paste of the plain YAML.

use crate::core::export;
use crate::core::types::ContainerRecipe;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use std::io::{Read, Write};

/// Issue bodies beyond this are delivered by manual paste instead of URL.
pub const MAX_ISSUE_BODY_BYTES: usize = 6 * 1024;

const PAYLOAD_HEADER: &str = "<!-- neuroforge-recipe-v1 -->";

/// How to publish: open a prefilled issue URL, or paste the body by hand.
#[derive(Debug, Clone, PartialEq)]
pub enum PublishAction {
    OpenUrl(String),
    ManualPaste { issue_url: String, body: String },
}

/// Compress a recipe YAML into the transport payload (zlib + base64).
pub fn compress_payload(yaml: &str) -> Result<String, String> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(yaml.as_bytes())
        .map_err(|e| format!("compression error: {}", e))?;
    let bytes = encoder
        .finish()
        .map_err(|e| format!("compression error: {}", e))?;
    Ok(STANDARD.encode(bytes))
}

/// Invert `compress_payload`.
pub fn decompress_payload(payload: &str) -> Result<String, String> {
    let bytes = STANDARD
        .decode(payload.trim())
        .map_err(|e| format!("invalid payload encoding: {}", e))?;
    let mut decoder = ZlibDecoder::new(&bytes[..]);
    let mut yaml = String::new();
    decoder
        .read_to_string(&mut yaml)
        .map_err(|e| format!("invalid payload: {}", e))?;
    Ok(yaml)
}

fn issue_title(recipe: &ContainerRecipe) -> String {
    format!("Add recipe: {} {}", recipe.name, recipe.version)
}

fn issue_body(recipe: &ContainerRecipe, payload: &str) -> String {
    format!(
        "{}\n\nContributed container recipe `{}` version `{}`.\n\n\
         Compressed recipe (zlib+base64):\n\n```\n{}\n```\n",
        PAYLOAD_HEADER, recipe.name, recipe.version, payload
    )
}

fn manual_body(recipe: &ContainerRecipe, yaml: &str) -> String {
    format!(
        "{}\n\nContributed container recipe `{}` version `{}`.\n\n```yaml\n{}```\n",
        PAYLOAD_HEADER, recipe.name, recipe.version, yaml
    )
}

/// Build the publish action for a recipe against `owner/repo`.
pub fn publish_action(
    owner: &str,
    repo: &str,
    recipe: &ContainerRecipe,
) -> Result<PublishAction, String> {
    let yaml = export::to_yaml(recipe)?;
    let payload = compress_payload(&yaml)?;
    let body = issue_body(recipe, &payload);
    let issue_url = format!("https://github.com/{}/{}/issues/new", owner, repo);

    if body.len() <= MAX_ISSUE_BODY_BYTES {
        let url = format!(
            "{}?title={}&body={}",
            issue_url,
            urlencoding::encode(&issue_title(recipe)),
            urlencoding::encode(&body)
        );
        Ok(PublishAction::OpenUrl(url))
    } else {
        Ok(PublishAction::ManualPaste {
            issue_url,
            body: manual_body(recipe, &yaml),
        })
    }
}
