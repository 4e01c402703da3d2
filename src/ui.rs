//! Static Swagger UI bundle.
//!
//! Writes an `index.html` that loads Swagger UI from a CDN next to the generated
//! `swagger.json`, so the output directory can be served by any static file server.

use crate::openapi_builder::SwaggerDocument;
use crate::serializer::{serialize_json, write_to_file};
use anyhow::Result;
use log::info;
use std::path::Path;

pub const SPEC_FILE_NAME: &str = "swagger.json";
pub const INDEX_FILE_NAME: &str = "index.html";

/// Swagger UI page pointing at a spec URL.
///
/// ```
/// use swagger_from_routes::ui::SwaggerUi;
///
/// let html = SwaggerUi::new("swagger.json").title("Cigar API").render();
/// assert!(html.contains("<title>Cigar API</title>"));
/// ```
pub struct SwaggerUi {
    spec_url: String,
    title: String,
}

impl SwaggerUi {
    pub fn new(spec_url: impl Into<String>) -> Self {
        Self {
            spec_url: spec_url.into(),
            title: "API Documentation".to_string(),
        }
    }

    /// Sets the page title.
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn render(&self) -> String {
        format!(
            r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <link rel="stylesheet" href="https://unpkg.com/swagger-ui-dist@5/swagger-ui.css">
</head>
<body>
    <div id="swagger-ui"></div>
    <script src="https://unpkg.com/swagger-ui-dist@5/swagger-ui-bundle.js"></script>
    <script>
        window.onload = () => {{
            SwaggerUIBundle({{
                url: "{spec_url}",
                dom_id: '#swagger-ui',
                presets: [
                    SwaggerUIBundle.presets.apis,
                    SwaggerUIBundle.SwaggerUIStandalonePreset
                ],
                layout: "StandaloneLayout"
            }});
        }};
    </script>
</body>
</html>
"#,
            title = escape_html(&self.title),
            spec_url = escape_html(&self.spec_url)
        )
    }
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Write `swagger.json` and a Swagger UI `index.html` into `dir`.
pub fn write_bundle(dir: &Path, doc: &SwaggerDocument) -> Result<()> {
    write_to_file(&serialize_json(doc)?, &dir.join(SPEC_FILE_NAME))?;

    let page = SwaggerUi::new(SPEC_FILE_NAME).title(doc.info.title.clone());
    write_to_file(&page.render(), &dir.join(INDEX_FILE_NAME))?;

    info!("Wrote Swagger UI bundle to {}", dir.display());
    Ok(())
}
