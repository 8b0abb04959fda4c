//! Ordered view over the catalog's result list.
//!
//! The list is rebuilt after every detail visit, so entries are positional
//! handles resolved against whatever the list currently renders. Nothing here
//! caches element identity between cycles.

use crate::error::SurfaceResult;
use crate::traits::surface::{Locator, Surface};
use crate::types::config::CatalogSelectors;

/// Positional handle to one row of the current list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub index: usize,
    pub locator: Locator,
}

/// The result list as currently rendered on a surface.
pub struct CatalogView<'a, S: Surface + ?Sized> {
    surface: &'a S,
    selectors: &'a CatalogSelectors,
}

impl<'a, S: Surface + ?Sized> CatalogView<'a, S> {
    pub fn new(surface: &'a S, selectors: &'a CatalogSelectors) -> Self {
        Self { surface, selectors }
    }

    /// Number of entries rendered right now.
    pub async fn count(&self) -> SurfaceResult<usize> {
        self.surface.count(&self.selectors.list_entries()).await
    }

    /// Handle for the entry at `index` in the present list.
    pub fn entry_at(&self, index: usize) -> CatalogEntry {
        CatalogEntry {
            index,
            locator: self.selectors.list_entries().nth(index),
        }
    }
}
