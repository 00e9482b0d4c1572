use std::path::{Path, PathBuf};

use serde::Serialize;
use tera::{Context, Tera};

use crate::error::RenderError;

// Single-template engines register under one fixed name. The .html suffix
// keeps the engine's HTML escaping active for interpolated values.
const TEMPLATE_NAME: &str = "page.html";

/// Data context for a single render call. Entries become addressable by
/// name inside the template (`{{ title }}`); the context is not retained
/// after the render.
#[derive(Debug, Clone)]
pub struct PageData {
    context: Context,
}

impl PageData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a named value, replacing any existing entry with the same name
    pub fn with_value(mut self, name: &str, value: impl Serialize) -> Self {
        self.context.insert(name, &value);
        self
    }
}

impl Default for PageData {
    fn default() -> Self {
        Self {
            context: Context::new(),
        }
    }
}

/// Renders one HTML template file against a [`PageData`] context.
///
/// The template file is read and compiled at construction; a missing file
/// is a startup failure surfaced to the caller, never a silent empty
/// render. Templates are trusted, developer-authored files — only the
/// context values vary per call.
pub struct Page {
    path: PathBuf,
    engine: Tera,
}

impl Page {
    /// Bind and compile the template file at `template`.
    pub fn new(template: impl AsRef<Path>) -> Result<Self, RenderError> {
        let path = template.as_ref().to_path_buf();
        if !path.is_file() {
            return Err(RenderError::TemplateMissing { path });
        }
        let mut engine = Tera::default();
        engine
            .add_template_file(&path, Some(TEMPLATE_NAME))
            .map_err(|source| RenderError::Template {
                path: path.clone(),
                source,
            })?;
        Ok(Self { path, engine })
    }

    /// Evaluate the template against `data` and return the produced text.
    ///
    /// The renderer does not write anywhere itself; emitting the result is
    /// the caller's decision.
    pub fn render(&self, data: &PageData) -> Result<String, RenderError> {
        self.engine
            .render(TEMPLATE_NAME, &data.context)
            .map_err(|source| RenderError::Render {
                path: self.path.clone(),
                source,
            })
    }

    /// Path of the bound template file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}
