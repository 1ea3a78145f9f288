//! Content negotiation for spec documents.
//!
//! The `Accept` header is matched by substring, first match wins, in a fixed
//! order: JSON, then HTML, then YAML (which `*/*` also selects). A header
//! matching none of them is refused with 501.

use std::path::Path;

use axum::http::header::CONTENT_TYPE;
use axum::response::{IntoResponse, Response};
use minijinja::{AutoEscape, Environment};
use serde::Serialize;

use crate::error::ApiError;

const PAGE_TEMPLATE: &str = "spec-page";

/// How a spec document is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rendering {
    /// Pretty-printed JSON.
    Json,
    /// An HTML page from the configured template.
    Html,
    /// YAML.
    Yaml,
}

impl Rendering {
    /// Pick the rendering for an `Accept` header value.
    pub fn select(accept: &str) -> Result<Self, ApiError> {
        if accept.contains("application/json") {
            Ok(Self::Json)
        } else if accept.contains("text/html") {
            Ok(Self::Html)
        } else if accept.contains("application/yaml") || accept.contains("*/*") {
            Ok(Self::Yaml)
        } else {
            Err(ApiError::UnsupportedMediaType {
                accept: accept.to_owned(),
            })
        }
    }

    /// `Content-Type` of the rendered body.
    pub const fn content_type(self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::Html => "text/html; charset=utf-8",
            Self::Yaml => "application/yaml",
        }
    }
}

/// Values available to the HTML page template.
#[derive(Debug, Clone, Serialize)]
pub struct PageData<'a> {
    /// The request path, without its leading `/`.
    pub request_path: &'a str,
    /// Page description.
    pub description: &'a str,
}

/// Pretty-printed JSON.
pub fn to_json<T: Serialize>(document: &T) -> Result<String, ApiError> {
    Ok(serde_json::to_string_pretty(document)?)
}

/// YAML, transcoded from the document's JSON form so both renderings
/// carry the same structure.
pub fn to_yaml<T: Serialize>(document: &T) -> Result<String, ApiError> {
    let json = serde_json::to_vec(document)?;
    let yaml: serde_yml::Value = serde_json::from_slice(&json)?;
    serde_yml::to_string(&yaml).map_err(|e| ApiError::Internal(format!("yaml encoding: {e}")))
}

/// Render the page template at `template_path`, read from disk on every
/// call.
pub async fn to_html(template_path: &Path, page: &PageData<'_>) -> Result<String, ApiError> {
    let source = tokio::fs::read_to_string(template_path)
        .await
        .map_err(|e| {
            ApiError::Template(format!(
                "unable to load template {}: {e}",
                template_path.display()
            ))
        })?;

    let mut env = Environment::new();
    env.set_auto_escape_callback(|_| AutoEscape::Html);
    env.add_template_owned(PAGE_TEMPLATE, source)
        .map_err(|e| ApiError::Template(format!("error parsing template: {e}")))?;
    let template = env
        .get_template(PAGE_TEMPLATE)
        .map_err(|e| ApiError::Template(e.to_string()))?;
    template
        .render(page)
        .map_err(|e| ApiError::Template(format!("error rendering template: {e}")))
}

/// Render `document` as selected by `accept`.
pub async fn render<T: Serialize>(
    document: &T,
    accept: &str,
    template_path: &Path,
    page: &PageData<'_>,
) -> Result<Response, ApiError> {
    let rendering = Rendering::select(accept)?;
    let body = match rendering {
        Rendering::Json => to_json(document)?,
        Rendering::Html => to_html(template_path, page).await?,
        Rendering::Yaml => to_yaml(document)?,
    };
    Ok(([(CONTENT_TYPE, rendering.content_type())], body).into_response())
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::{Value, json};

    use super::*;

    fn sample() -> Value {
        json!({
            "openapi": "3.0.0",
            "info": {"title": "Aether", "version": "2.1.0"},
            "paths": {"/targets": {"get": {"responses": {"200": {"description": "ok"}}}}},
            "tags": ["a", "b"],
            "x-count": 3,
            "x-null": null,
        })
    }

    #[test]
    fn selection_order() {
        assert_eq!(Rendering::select("application/json").ok(), Some(Rendering::Json));
        assert_eq!(Rendering::select("text/html").ok(), Some(Rendering::Html));
        assert_eq!(Rendering::select("application/yaml").ok(), Some(Rendering::Yaml));
        assert_eq!(Rendering::select("*/*").ok(), Some(Rendering::Yaml));
        // JSON beats HTML even when listed later.
        assert_eq!(
            Rendering::select("text/html, application/json").ok(),
            Some(Rendering::Json)
        );
        // HTML beats the wildcard.
        assert_eq!(Rendering::select("*/*, text/html").ok(), Some(Rendering::Html));
    }

    #[test]
    fn unsupported_and_empty_accept() {
        for accept in ["application/xml", ""] {
            let Err(err) = Rendering::select(accept) else {
                panic!("{accept:?} must be refused");
            };
            assert_eq!(err.status_code(), StatusCode::NOT_IMPLEMENTED);
        }
    }

    #[test]
    fn json_is_pretty() {
        let Ok(text) = to_json(&sample()) else {
            panic!("json render");
        };
        assert!(text.contains("\n  \"info\""));
        assert_eq!(serde_json::from_str::<Value>(&text).ok(), Some(sample()));
    }

    #[test]
    fn yaml_matches_json_structure() {
        let Ok(text) = to_yaml(&sample()) else {
            panic!("yaml render");
        };
        let parsed: Result<Value, _> = serde_yml::from_str(&text);
        assert_eq!(parsed.ok(), Some(sample()));
    }

    #[tokio::test]
    async fn html_uses_template_and_escapes() {
        let path = std::env::temp_dir().join(format!("roc_page_{}.tpl", std::process::id()));
        std::fs::write(&path, "<title>{{ description }}</title><a href=\"/{{ request_path }}\">").ok();

        let page = PageData {
            request_path: "spec?x=<b>",
            description: "Aether ROC API",
        };
        let result = to_html(&path, &page).await;
        std::fs::remove_file(&path).ok();

        let Ok(html) = result else {
            panic!("html render");
        };
        assert!(html.contains("<title>Aether ROC API</title>"));
        assert!(html.contains("spec?x=&lt;b&gt;"));
    }

    #[tokio::test]
    async fn missing_template_is_server_error() {
        let page = PageData {
            request_path: "spec",
            description: "d",
        };
        let Err(err) = to_html(Path::new("/nonexistent/page.tpl"), &page).await else {
            panic!("missing template must fail");
        };
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(err.to_string().contains("unable to load template"));
    }

    #[tokio::test]
    async fn malformed_template_is_server_error() {
        let path = std::env::temp_dir().join(format!("roc_bad_{}.tpl", std::process::id()));
        std::fs::write(&path, "{% if %}").ok();
        let page = PageData {
            request_path: "spec",
            description: "d",
        };
        let result = to_html(&path, &page).await;
        std::fs::remove_file(&path).ok();
        assert!(matches!(result, Err(ApiError::Template(_))));
    }
}
