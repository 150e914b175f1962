//! NF-011: README generation.
//!
//! Renders recipe metadata plus whichever documentation source the
//! recipe carries: the structured form, the inline readme, or a pointer
//! to an external URL.

use crate::core::types::{ContainerRecipe, CopyrightInfo, StructuredReadme, TestSpec};

/// Render the README for a recipe. `tests` is the merged test list so
/// the document covers tests declared at the top level too.
pub fn render(recipe: &ContainerRecipe, tests: &[TestSpec]) -> String {
    let mut out = String::new();

    out.push_str(&format!("# {} {}\n\n", recipe.name, recipe.version));

    let archs: Vec<&str> = recipe.architectures.iter().map(|a| a.as_str()).collect();
    if !archs.is_empty() {
        out.push_str(&format!("Architectures: {}\n\n", archs.join(", ")));
    }

    if let Some(copyright) = &recipe.copyright {
        let entries: Vec<String> = copyright
            .iter()
            .map(|entry| match entry {
                CopyrightInfo::Spdx { license, url } => match url {
                    Some(url) => format!("[{}]({})", license, url),
                    None => license.clone(),
                },
                CopyrightInfo::Custom { name, url } => format!("[{}]({})", name, url),
            })
            .collect();
        out.push_str(&format!("License: {}\n\n", entries.join(", ")));
    }

    if let Some(structured) = &recipe.structured_readme {
        out.push_str(&structured_to_markdown(structured));
    } else if let Some(readme) = &recipe.readme {
        out.push_str(readme.trim_end());
        out.push_str("\n\n");
    } else if let Some(url) = &recipe.readme_url {
        out.push_str(&format!("Documentation: {}\n\n", url));
    }

    if !tests.is_empty() {
        out.push_str("## Tests\n\n");
        for test in tests {
            let body = test
                .builtin
                .as_deref()
                .map(|b| format!("builtin `{}`", b))
                .unwrap_or_else(|| "script".to_string());
            out.push_str(&format!("- {} ({})\n", test.name, body));
        }
        out.push('\n');
    }

    out
}

/// Convert the structured readme to markdown sections.
pub fn structured_to_markdown(readme: &StructuredReadme) -> String {
    let mut out = String::new();

    if !readme.description.trim().is_empty() {
        out.push_str("## Description\n\n");
        out.push_str(readme.description.trim());
        out.push_str("\n\n");
    }
    if !readme.example.trim().is_empty() {
        out.push_str("## Example\n\n```\n");
        out.push_str(readme.example.trim());
        out.push_str("\n```\n\n");
    }
    if !readme.documentation.trim().is_empty() {
        out.push_str("## Documentation\n\n");
        out.push_str(readme.documentation.trim());
        out.push_str("\n\n");
    }
    if !readme.citation.trim().is_empty() {
        out.push_str("## Citation\n\n");
        out.push_str(readme.citation.trim());
        out.push_str("\n\n");
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::ContainerRecipe;

    #[test]
    fn test_nf011_minimal_recipe() {
        let recipe = ContainerRecipe::starter();
        let out = render(&recipe, &[]);
        assert!(out.starts_with("# new-container 1.0.0\n"));
        assert!(out.contains("Architectures: x86_64"));
    }

    #[test]
    fn test_nf011_structured_sections() {
        let structured = StructuredReadme {
            description: "A tool.".to_string(),
            example: "tool input/ output/".to_string(),
            documentation: "https://docs.example".to_string(),
            citation: "Someone et al. 2024".to_string(),
        };
        let md = structured_to_markdown(&structured);
        assert!(md.contains("## Description"));
        assert!(md.contains("## Example"));
        assert!(md.contains("```\ntool input/ output/\n```"));
        assert!(md.contains("## Documentation"));
        assert!(md.contains("## Citation"));
    }

    #[test]
    fn test_nf011_structured_skips_empty_sections() {
        let structured = StructuredReadme {
            description: "Only this.".to_string(),
            ..Default::default()
        };
        let md = structured_to_markdown(&structured);
        assert!(md.contains("## Description"));
        assert!(!md.contains("## Example"));
        assert!(!md.contains("## Citation"));
    }

    #[test]
    fn test_nf011_plain_readme_and_url_forms() {
        let mut recipe = ContainerRecipe::starter();
        recipe.readme = Some("Plain docs here.\n".to_string());
        let out = render(&recipe, &[]);
        assert!(out.contains("Plain docs here."));

        let mut recipe = ContainerRecipe::starter();
        recipe.readme_url = Some("https://example.org/readme".to_string());
        let out = render(&recipe, &[]);
        assert!(out.contains("Documentation: https://example.org/readme"));
    }

    #[test]
    fn test_nf011_license_links() {
        let mut recipe = ContainerRecipe::starter();
        recipe.copyright = Some(vec![
            CopyrightInfo::Spdx {
                license: "MIT".to_string(),
                url: Some("https://mit.example".to_string()),
            },
            CopyrightInfo::Custom {
                name: "In-house".to_string(),
                url: "https://example.org".to_string(),
            },
        ]);
        let out = render(&recipe, &[]);
        assert!(out.contains("[MIT](https://mit.example)"));
        assert!(out.contains("[In-house](https://example.org)"));
    }

    #[test]
    fn test_nf011_tests_section() {
        let recipe = ContainerRecipe::starter();
        let tests = vec![
            TestSpec {
                name: "smoke".to_string(),
                script: Some("tool --version".to_string()),
                builtin: None,
            },
            TestSpec {
                name: "gpu".to_string(),
                script: None,
                builtin: Some("nvidia-smi".to_string()),
            },
        ];
        let out = render(&recipe, &tests);
        assert!(out.contains("## Tests"));
        assert!(out.contains("- smoke (script)"));
        assert!(out.contains("- gpu (builtin `nvidia-smi`)"));
    }
}
