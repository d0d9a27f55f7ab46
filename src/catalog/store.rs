//! JSON persistence for the catalog tree.
//!
//! The catalog is stored as a single pretty-printed JSON file whose shape is
//! exactly the [`Catalog`] field layout. Serialization is struct-ordered and
//! therefore deterministic, so saved files diff cleanly between scrapes.
//!
//! Loading reconstructs the full tree recursively; a `poemas` or
//! `subcategorias` key absent from a category is treated as an empty list,
//! while a file missing the top-level `categorias` key is a structural parse
//! error rather than an empty catalog.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{info, instrument};

use super::Catalog;

/// Default location of the persisted catalog file.
pub const DEFAULT_STRUCTURE_FILE: &str = "output/categorias_estrutura.json";

/// Errors from saving or loading the persisted catalog.
#[derive(Debug, Error)]
pub enum StructureError {
    /// The catalog file does not exist. The caller should run the
    /// scrape-and-save path first.
    #[error("catalog file not found: {path}")]
    NotFound {
        /// The path that was looked up.
        path: PathBuf,
    },

    /// The file exists but does not deserialize to a catalog.
    #[error("malformed catalog file {path}: {source}")]
    Parse {
        /// The file that failed to parse.
        path: PathBuf,
        /// The underlying deserialization error.
        #[source]
        source: serde_json::Error,
    },

    /// Reading or writing the file failed.
    #[error("IO error on catalog file {path}: {source}")]
    Io {
        /// The file being read or written.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

impl StructureError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Serializes the catalog to `filepath`, creating parent directories as
/// needed.
///
/// # Errors
///
/// Returns [`StructureError::Io`] if directories cannot be created or the
/// file cannot be written.
#[instrument(skip(catalog), fields(path = %filepath.display()))]
pub fn save(catalog: &Catalog, filepath: &Path) -> Result<(), StructureError> {
    if let Some(parent) = filepath.parent() {
        fs::create_dir_all(parent).map_err(|e| StructureError::io(filepath, e))?;
    }

    // Serialization of an in-memory tree cannot fail; map it through the
    // same error kind anyway rather than panicking.
    let json = serde_json::to_string_pretty(catalog).map_err(|e| StructureError::Parse {
        path: filepath.to_path_buf(),
        source: e,
    })?;
    fs::write(filepath, json).map_err(|e| StructureError::io(filepath, e))?;

    info!(
        categories = catalog.total_categories,
        poems = catalog.total_poems,
        "catalog saved"
    );
    Ok(())
}

/// Loads a catalog from `filepath`, reconstructing every category and poem
/// node recursively.
///
/// # Errors
///
/// - [`StructureError::NotFound`] if the file does not exist
/// - [`StructureError::Parse`] if the contents are not a valid catalog
/// - [`StructureError::Io`] if the file cannot be read
#[instrument(fields(path = %filepath.display()))]
pub fn load(filepath: &Path) -> Result<Catalog, StructureError> {
    if !filepath.exists() {
        return Err(StructureError::NotFound {
            path: filepath.to_path_buf(),
        });
    }

    let contents = fs::read_to_string(filepath).map_err(|e| StructureError::io(filepath, e))?;
    let catalog: Catalog =
        serde_json::from_str(&contents).map_err(|e| StructureError::Parse {
            path: filepath.to_path_buf(),
            source: e,
        })?;

    info!(categories = catalog.total_categories, "catalog loaded");
    Ok(catalog)
}
