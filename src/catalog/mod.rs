//! Catalog tree model: categories, poems, and derived on-disk paths.
//!
//! The model mirrors the persisted JSON layout of the Arquivo Pessoa index:
//! a forest of [`Category`] nodes, each holding its own poems and
//! subcategories, wrapped in a [`Catalog`] with summary counts. Wire field
//! names are the original Portuguese keys; the Rust field names are English.
//!
//! A poem's on-disk location is fully derived from the model
//! (`{base}/{category.path}/{id:04} - {titulo}.pdf`) and that derivation is
//! the resume contract: changing it invalidates resumability for everything
//! already downloaded.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod store;

/// A single poem: a leaf in the category tree.
///
/// Identity is the numeric `id` assigned by the origin site. Poems are
/// immutable values once parsed; `category_path` must match the `path` of
/// the [`Category`] that owns the poem (checked by [`Catalog::validate`],
/// not enforced by construction).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Poem {
    /// Numeric id from the origin's `/textos/{id}` URL.
    pub id: u32,
    /// Poem title as shown in the index.
    #[serde(rename = "titulo")]
    pub title: String,
    /// Slash-joined path of the owning category.
    #[serde(rename = "categoria_path")]
    pub category_path: String,
}

impl Poem {
    /// Creates a new poem value.
    pub fn new(id: u32, title: impl Into<String>, category_path: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            category_path: category_path.into(),
        }
    }

    /// Returns the deterministic PDF filename for this poem.
    ///
    /// Format is fixed bit-for-bit: zero-padded 4-digit id, `" - "`, the
    /// literal title, `.pdf`. File existence under this name is what marks
    /// a poem as downloaded, so the format must never drift.
    #[must_use]
    pub fn pdf_filename(&self) -> String {
        format!("{:04} - {}.pdf", self.id, self.title)
    }
}

/// A node in the category tree.
///
/// Categories own an ordered list of poems and an ordered list of
/// subcategories; the owned child collections are what make the type
/// recursive (no cycles are possible by construction). The tree is mutable
/// while the parser appends to it and treated as read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Display name of the category.
    #[serde(rename = "nome")]
    pub name: String,
    /// Slash-joined chain of ancestor names, used verbatim as the on-disk
    /// directory key. Unique along any root-to-node walk.
    pub path: String,
    /// Poems directly under this category.
    ///
    /// A wholly absent key in the serialized form means an empty list.
    #[serde(rename = "poemas", default)]
    pub poems: Vec<Poem>,
    /// Child categories, in index order.
    #[serde(rename = "subcategorias", default)]
    pub subcategories: Vec<Category>,
}

impl Category {
    /// Creates an empty category with the given name and path.
    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            poems: Vec::new(),
            subcategories: Vec::new(),
        }
    }

    /// Counts poems in this category and all subcategories, transitively.
    #[must_use]
    pub fn count_poems(&self) -> usize {
        self.poems.len()
            + self
                .subcategories
                .iter()
                .map(Category::count_poems)
                .sum::<usize>()
    }

    /// Counts category nodes in this subtree, including this one.
    ///
    /// Note that [`Catalog::from_categories`] does NOT use this for
    /// `total_categories`; the stored field counts top-level entries only.
    #[must_use]
    pub fn count_categories(&self) -> usize {
        1 + self
            .subcategories
            .iter()
            .map(Category::count_categories)
            .sum::<usize>()
    }

    /// Returns this category's directory under `base_path`.
    #[must_use]
    pub fn dir_path(&self, base_path: &Path) -> PathBuf {
        base_path.join(&self.path)
    }

    /// Returns the expected on-disk location for a poem owned by this
    /// category. This is the sole join key between the catalog and the
    /// file store.
    #[must_use]
    pub fn poem_path(&self, base_path: &Path, poem: &Poem) -> PathBuf {
        self.dir_path(base_path).join(poem.pdf_filename())
    }
}

/// A poem whose `categoria_path` does not match the path of the category
/// that owns it.
#[derive(Debug, Error)]
#[error("poem {poem_id} carries category path {listed:?} but is owned by {owner:?}")]
pub struct PathMismatch {
    /// Id of the offending poem.
    pub poem_id: u32,
    /// The `categoria_path` the poem carries.
    pub listed: String,
    /// The `path` of the owning category.
    pub owner: String,
}

/// The full captured tree plus summary counts, as persisted between runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    /// Number of top-level categories.
    ///
    /// Deliberately NOT the transitive node count — the persisted format is
    /// the cross-run resume contract and older catalogs were written with
    /// this meaning. Use [`Category::count_categories`] for the node count.
    #[serde(rename = "total_categorias")]
    pub total_categories: usize,
    /// Number of poems reachable from `categories`, transitively.
    #[serde(rename = "total_poemas")]
    pub total_poems: usize,
    /// Forest of top-level categories.
    #[serde(rename = "categorias")]
    pub categories: Vec<Category>,
}

impl Catalog {
    /// Builds a catalog from a forest of top-level categories, computing
    /// both summary counts.
    #[must_use]
    pub fn from_categories(categories: Vec<Category>) -> Self {
        let total_poems = categories.iter().map(Category::count_poems).sum();
        Self {
            total_categories: categories.len(),
            total_poems,
            categories,
        }
    }

    /// Checks that every poem's `categoria_path` matches the path of the
    /// category that owns it.
    ///
    /// # Errors
    ///
    /// Returns the first [`PathMismatch`] found, in tree order.
    pub fn validate(&self) -> Result<(), PathMismatch> {
        fn check(category: &Category) -> Result<(), PathMismatch> {
            for poem in &category.poems {
                if poem.category_path != category.path {
                    return Err(PathMismatch {
                        poem_id: poem.id,
                        listed: poem.category_path.clone(),
                        owner: category.path.clone(),
                    });
                }
            }
            for sub in &category.subcategories {
                check(sub)?;
            }
            Ok(())
        }

        for category in &self.categories {
            check(category)?;
        }
        Ok(())
    }
}
