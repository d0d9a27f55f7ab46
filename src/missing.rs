//! Missing-set resolver: diffs a category tree against the file store.
//!
//! A poem is "present" exactly when a file exists at its derived path.
//! [`reduce_category`] returns a new tree containing only the poems that are
//! not on disk, pruning categories whose whole subtree is already
//! downloaded. The resolver only performs read-only existence checks, so
//! reducing twice against an unchanged store yields identical trees.

use std::path::Path;

use tracing::{debug, instrument};

use crate::catalog::Category;

/// Reduces a category to its missing poems and non-empty reduced
/// subcategories.
///
/// Returns `None` when every poem in the subtree already exists on disk —
/// the pruning rule that keeps the reduced tree minimal. The input tree is
/// never mutated.
#[must_use]
#[instrument(skip(category), fields(category = %category.path))]
pub fn reduce_category(category: &Category, base_path: &Path) -> Option<Category> {
    let missing_poems: Vec<_> = category
        .poems
        .iter()
        .filter(|poem| !category.poem_path(base_path, poem).exists())
        .cloned()
        .collect();

    let reduced_subcategories: Vec<_> = category
        .subcategories
        .iter()
        .filter_map(|sub| reduce_category(sub, base_path))
        .collect();

    if missing_poems.is_empty() && reduced_subcategories.is_empty() {
        return None;
    }

    debug!(
        missing = missing_poems.len(),
        subcategories = reduced_subcategories.len(),
        "category has missing poems"
    );

    Some(Category {
        name: category.name.clone(),
        path: category.path.clone(),
        poems: missing_poems,
        subcategories: reduced_subcategories,
    })
}

/// Reduces a forest of top-level categories, keeping only non-empty
/// reductions.
#[must_use]
pub fn reduce_categories(categories: &[Category], base_path: &Path) -> Vec<Category> {
    categories
        .iter()
        .filter_map(|category| reduce_category(category, base_path))
        .collect()
}

/// Counts missing poems in a category subtree without building the reduced
/// tree.
///
/// Agrees with `reduce_category(c, p).map_or(0, |r| r.count_poems())` for
/// any category and store state.
#[must_use]
pub fn count_missing(category: &Category, base_path: &Path) -> usize {
    let own = category
        .poems
        .iter()
        .filter(|poem| !category.poem_path(base_path, poem).exists())
        .count();

    own + category
        .subcategories
        .iter()
        .map(|sub| count_missing(sub, base_path))
        .sum::<usize>()
}
