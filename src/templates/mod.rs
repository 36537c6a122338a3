//! HTML templates for the web UI, rendered with minijinja
//!
//! The built-in templates are compiled into the binary. A templates directory
//! may override any of them by file name.

use minijinja::Environment;
use serde::Serialize;
use std::path::Path;
use tracing::info;

pub const INDEX: &str = "index.html";
pub const PATHWAY: &str = "pathway.html";

const BUILTIN: &[(&str, &str)] = &[
    (INDEX, include_str!("../../templates/index.html")),
    (PATHWAY, include_str!("../../templates/pathway.html")),
];

/// Template renderer for the web UI
pub struct TemplateEngine {
    env: Environment<'static>,
}

impl TemplateEngine {
    /// Engine with only the built-in templates
    pub fn new() -> Result<Self, minijinja::Error> {
        Self::with_overrides(None)
    }

    /// Engine whose built-in templates are replaced by same-named files in `dir`
    pub fn with_overrides(dir: Option<&Path>) -> Result<Self, minijinja::Error> {
        let mut env = Environment::new();

        for &(name, source) in BUILTIN {
            let custom = dir
                .map(|d| d.join(name))
                .and_then(|path| std::fs::read_to_string(&path).ok().map(|s| (path, s)));

            match custom {
                Some((path, custom_source)) => {
                    info!("Using template override {}", path.display());
                    env.add_template_owned(name.to_string(), custom_source)?;
                }
                None => env.add_template(name, source)?,
            }
        }

        Ok(Self { env })
    }

    /// Render a named template with a serializable context
    pub fn render<S: Serialize>(&self, name: &str, context: S) -> Result<String, minijinja::Error> {
        self.env.get_template(name)?.render(context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use minijinja::context;
    use std::io::Write;

    #[test]
    fn test_index_renders() {
        let engine = TemplateEngine::new().unwrap();
        let html = engine
            .render(INDEX, context! { server_name => "weather", organism => "hsa" })
            .unwrap();
        assert!(html.contains("<form"));
        assert!(html.contains("hsa"));
    }

    #[test]
    fn test_pathway_escapes_input() {
        let engine = TemplateEngine::new().unwrap();
        let html = engine
            .render(
                PATHWAY,
                context! {
                    query => "<script>",
                    organism => "hsa",
                    message => "No pathway found",
                },
            )
            .unwrap();
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn test_directory_override() {
        let dir = tempfile::tempdir().unwrap();
        let mut file = std::fs::File::create(dir.path().join(INDEX)).unwrap();
        file.write_all(b"custom {{ organism }}").unwrap();

        let engine = TemplateEngine::with_overrides(Some(dir.path())).unwrap();
        assert_eq!(
            engine.render(INDEX, context! { organism => "mmu" }).unwrap(),
            "custom mmu"
        );
        // Not overridden: still the built-in
        assert!(engine
            .render(PATHWAY, context! { query => "x", organism => "mmu" })
            .unwrap()
            .contains("KEGG"));
    }

    #[test]
    fn test_unknown_template() {
        let engine = TemplateEngine::new().unwrap();
        assert!(engine.render("missing.html", context! {}).is_err());
    }
}
