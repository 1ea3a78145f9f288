//! OpenAPI documents served by the gateway.
//!
//! Each API surface has one [`SpecDocument`], parsed once at startup and
//! shared read-only by every request. The gateway's own document is
//! compiled into the binary; further surfaces are loaded from a directory
//! where each `*.yaml`, `*.yml` or `*.json` file becomes a surface named
//! after its file stem.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::info;

/// The gateway's own OpenAPI document.
const GATEWAY_SPEC: &str = include_str!("../openapi/roc-gateway.yaml");

/// Errors that can occur when loading spec documents.
#[derive(Debug, thiserror::Error)]
pub enum SpecError {
    /// A spec directory or file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// The path being read.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// A document is not valid YAML or JSON.
    #[error("failed to parse spec {name}: {message}")]
    Parse {
        /// Surface name.
        name: String,
        /// Parser message.
        message: String,
    },
}

/// One immutable OpenAPI document.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecDocument {
    name: String,
    document: serde_json::Value,
}

impl SpecDocument {
    /// Parse a document from YAML (JSON is accepted as well).
    ///
    /// Non-string mapping keys, such as bare `200:` response codes, are
    /// turned into strings.
    pub fn parse(name: &str, text: &str) -> Result<Self, SpecError> {
        let parse_error = |message: String| SpecError::Parse {
            name: name.to_owned(),
            message,
        };
        let yaml: serde_yml::Value =
            serde_yml::from_str(text).map_err(|e| parse_error(e.to_string()))?;
        let document = serde_json::to_value(&yaml).map_err(|e| parse_error(e.to_string()))?;
        if !document.is_object() {
            return Err(parse_error("document root is not a mapping".to_owned()));
        }
        Ok(Self {
            name: name.to_owned(),
            document,
        })
    }

    /// Surface name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The canonical in-memory representation.
    pub const fn document(&self) -> &serde_json::Value {
        &self.document
    }
}

/// All spec documents known to the gateway.
#[derive(Debug, Clone)]
pub struct SpecRegistry {
    gateway: Arc<SpecDocument>,
    surfaces: BTreeMap<String, Arc<SpecDocument>>,
}

impl SpecRegistry {
    /// Registry holding only the embedded gateway document.
    pub fn embedded() -> Result<Self, SpecError> {
        Ok(Self {
            gateway: Arc::new(SpecDocument::parse("roc-gateway", GATEWAY_SPEC)?),
            surfaces: BTreeMap::new(),
        })
    }

    /// Embedded gateway document plus every surface found in `dir`.
    pub fn load(dir: Option<&Path>) -> Result<Self, SpecError> {
        let mut registry = Self::embedded()?;
        if let Some(dir) = dir {
            for doc in load_dir(dir)? {
                info!(surface = doc.name(), "spec surface loaded");
                registry = registry.with_surface(doc);
            }
        }
        Ok(registry)
    }

    /// Add (or replace) a surface.
    #[must_use]
    pub fn with_surface(mut self, doc: SpecDocument) -> Self {
        self.surfaces.insert(doc.name.clone(), Arc::new(doc));
        self
    }

    /// The gateway's own document.
    pub fn gateway(&self) -> Arc<SpecDocument> {
        Arc::clone(&self.gateway)
    }

    /// Look up a surface by name.
    pub fn surface(&self, name: &str) -> Option<Arc<SpecDocument>> {
        self.surfaces.get(name).cloned()
    }

    /// Names of the loaded surfaces, sorted.
    pub fn surface_names(&self) -> impl Iterator<Item = &str> {
        self.surfaces.keys().map(String::as_str)
    }
}

fn load_dir(dir: &Path) -> Result<Vec<SpecDocument>, SpecError> {
    let io_error = |path: &Path, source| SpecError::Io {
        path: path.to_path_buf(),
        source,
    };
    let mut paths = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(|e| io_error(dir, e))? {
        let path = entry.map_err(|e| io_error(dir, e))?.path();
        let is_spec = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| matches!(ext, "yaml" | "yml" | "json"));
        if is_spec && path.is_file() {
            paths.push(path);
        }
    }
    paths.sort();

    paths
        .iter()
        .map(|path| {
            let name = path
                .file_stem()
                .and_then(|stem| stem.to_str())
                .unwrap_or_default();
            let text = std::fs::read_to_string(path).map_err(|e| io_error(path, e))?;
            SpecDocument::parse(name, &text)
        })
        .collect()
}
