use handlebars::Handlebars;
use serde::Serialize;

use std::{io, path::PathBuf};

pub const TEMPLATE_EXTENSION: &str = "hbs";

#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    #[error("Template '{0}' not found")]
    NotFound(String),

    #[error("Failed to read template '{name}': {source}")]
    Io {
        name: String,
        #[source]
        source: io::Error,
    },

    #[error("Syntax error in template '{name}': {source}")]
    Syntax {
        name: String,
        #[source]
        source: Box<handlebars::TemplateError>,
    },

    #[error("Failed to render template '{name}': {source}")]
    Render {
        name: String,
        #[source]
        source: handlebars::RenderError,
    },
}

/// Variables bound into the password-reset template.
#[derive(Debug, Clone, Serialize)]
pub struct TemplateContext {
    pub name: String,
    #[serde(rename = "resetLink")]
    pub reset_link: String,
    pub year: i32,
}

/// Loads `<dir>/<name>.hbs` on every call and renders it as a Handlebars
/// template. `{{value}}` interpolations are HTML-escaped.
#[derive(Debug, Clone)]
pub struct TemplateRenderer {
    dir: PathBuf,
}

impl TemplateRenderer {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn template_path(&self, name: &str) -> Result<PathBuf, TemplateError> {
        if name.is_empty() || name.contains(['/', '\\']) || name.contains("..") {
            return Err(TemplateError::NotFound(name.to_string()));
        }
        Ok(self.dir.join(format!("{name}.{TEMPLATE_EXTENSION}")))
    }

    pub fn render<S: Serialize>(&self, name: &str, context: &S) -> Result<String, TemplateError> {
        let path = self.template_path(name)?;
        let source = std::fs::read_to_string(&path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => TemplateError::NotFound(name.to_string()),
            _ => TemplateError::Io {
                name: name.to_string(),
                source: e,
            },
        })?;

        let mut registry = Handlebars::new();
        registry
            .register_template_string(name, source)
            .map_err(|e| TemplateError::Syntax {
                name: name.to_string(),
                source: Box::new(e),
            })?;

        registry
            .render(name, context)
            .map_err(|e| TemplateError::Render {
                name: name.to_string(),
                source: e,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(reset_link: &str) -> TemplateContext {
        TemplateContext {
            name: "Icaro".to_string(),
            reset_link: reset_link.to_string(),
            year: 2026,
        }
    }

    fn renderer_with(name: &str, source: &str) -> (tempfile::TempDir, TemplateRenderer) {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(format!("{name}.hbs")), source).unwrap();
        let renderer = TemplateRenderer::new(dir.path());
        (dir, renderer)
    }

    #[test]
    fn renders_context_variables() {
        let (_dir, renderer) = renderer_with(
            "greeting",
            "<p>Hi {{name}}</p><a href=\"{{resetLink}}\">reset</a><small>{{year}}</small>",
        );

        let html = renderer
            .render("greeting", &context("https://app/reset"))
            .unwrap();

        assert_eq!(
            html,
            "<p>Hi Icaro</p><a href=\"https://app/reset\">reset</a><small>2026</small>"
        );
    }

    #[test]
    fn escapes_interpolated_values() {
        let (_dir, renderer) = renderer_with("link", "{{resetLink}}");

        let html = renderer
            .render("link", &context("<script>alert(1)</script>&x"))
            .unwrap();

        assert_eq!(html, "&lt;script&gt;alert(1)&lt;/script&gt;&amp;x");
    }

    #[test]
    fn renders_block_helpers_and_comments() {
        let (_dir, renderer) = renderer_with(
            "blocks",
            "{{!-- greeting --}}{{#if name}}Hi {{name}}{{else}}Hi there{{/if}}",
        );

        let html = renderer.render("blocks", &context("x")).unwrap();
        assert_eq!(html, "Hi Icaro");
    }

    #[test]
    fn rendering_is_idempotent() {
        let (_dir, renderer) = renderer_with("greeting", "Hello {{name}}, {{year}}");
        let ctx = context("https://app/reset");

        let first = renderer.render("greeting", &ctx).unwrap();
        let second = renderer.render("greeting", &ctx).unwrap();
        assert_eq!(first.as_bytes(), second.as_bytes());
    }

    #[test]
    fn missing_template_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = TemplateRenderer::new(dir.path());

        let err = renderer
            .render("password-reset", &context("x"))
            .unwrap_err();
        assert!(matches!(err, TemplateError::NotFound(name) if name == "password-reset"));
    }

    #[test]
    fn path_like_names_are_rejected() {
        let (_dir, renderer) = renderer_with("ok", "fine");

        for name in ["", "../ok", "nested/ok", "a\\b"] {
            let err = renderer.render(name, &context("x")).unwrap_err();
            assert!(matches!(err, TemplateError::NotFound(_)), "{name:?}");
        }
    }

    #[test]
    fn malformed_template_is_a_syntax_error() {
        for source in ["Hello {{name", "{{#if name}}unclosed"] {
            let (_dir, renderer) = renderer_with("broken", source);

            let err = renderer.render("broken", &context("x")).unwrap_err();
            assert!(matches!(err, TemplateError::Syntax { .. }), "{source:?}");
        }
    }

    #[test]
    fn bundled_password_reset_template_renders() {
        let renderer =
            TemplateRenderer::new(std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("templates"));

        let html = renderer
            .render("password-reset", &context("https://app/reset"))
            .unwrap();

        assert!(html.contains("Icaro"));
        assert!(html.contains("href=\"https://app/reset\""));
        assert!(html.contains("2026"));
    }
}
