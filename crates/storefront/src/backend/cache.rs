//! Cache types for backend catalog responses.

use emporium_core::{Category, CategoryId, Locale};

/// Cache key. Category names are localized, so the locale is part of the key.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum CacheKey {
    Categories(Locale),
    Category(CategoryId, Locale),
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Categories(Vec<Category>),
    Category(Box<Category>),
}
