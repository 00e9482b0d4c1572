use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Store accessor errors.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("failed to open database at {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    #[error("invalid identifier `{name}`")]
    InvalidIdentifier { name: String },

    #[error("empty field mapping for table `{table}`")]
    EmptyFields { table: String },

    #[error("statement failed: {source}")]
    Statement {
        sql: String,
        #[source]
        source: rusqlite::Error,
    },
}

/// Template renderer errors.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("template not found: {}", .path.display())]
    TemplateMissing { path: PathBuf },

    #[error("failed to load template {}: {source}", .path.display())]
    Template {
        path: PathBuf,
        #[source]
        source: tera::Error,
    },

    #[error("failed to render template {}: {source}", .path.display())]
    Render {
        path: PathBuf,
        #[source]
        source: tera::Error,
    },
}

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    ReadFile(#[source] io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),
}
