//! Wishlist state.
//!
//! Works like [`crate::cart`]: mutations return the [`WishlistChange`] to send
//! to the backend, or `None` when local state already matches the request.

use serde::{Deserialize, Serialize};

use crate::catalog::Product;
use crate::types::ProductId;

/// A mutation to send to the remote wishlist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum WishlistChange {
    Add { product_id: ProductId },
    Remove { product_id: ProductId },
}

/// A saved product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WishlistItem {
    pub product: Product,
}

/// Saved-for-later products, at most one entry per product.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Wishlist {
    items: Vec<WishlistItem>,
}

impl Wishlist {
    /// An empty wishlist.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Build from a backend snapshot, keeping the first entry per product.
    #[must_use]
    pub fn from_items(items: impl IntoIterator<Item = WishlistItem>) -> Self {
        let mut wishlist = Self::new();
        for item in items {
            if !wishlist.contains(&item.product.id) {
                wishlist.items.push(item);
            }
        }
        wishlist
    }

    #[must_use]
    pub fn items(&self) -> &[WishlistItem] {
        &self.items
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Whether the product is saved.
    #[must_use]
    pub fn contains(&self, product_id: &ProductId) -> bool {
        self.items.iter().any(|i| &i.product.id == product_id)
    }

    /// IDs of every saved product.
    #[must_use]
    pub fn product_ids(&self) -> Vec<ProductId> {
        self.items.iter().map(|i| i.product.id.clone()).collect()
    }

    /// Save a product. Returns `None` if it was already saved.
    pub fn add(&mut self, product: Product) -> Option<WishlistChange> {
        if self.contains(&product.id) {
            return None;
        }
        let product_id = product.id.clone();
        self.items.push(WishlistItem { product });
        Some(WishlistChange::Add { product_id })
    }

    /// Unsave a product. Returns `None` if it was not saved.
    pub fn remove(&mut self, product_id: &ProductId) -> Option<WishlistChange> {
        let idx = self.items.iter().position(|i| &i.product.id == product_id)?;
        self.items.remove(idx);
        Some(WishlistChange::Remove {
            product_id: product_id.clone(),
        })
    }

    /// Save the product if absent, otherwise unsave it.
    pub fn toggle(&mut self, product: Product) -> WishlistChange {
        let product_id = product.id.clone();
        self.remove(&product_id)
            .or_else(|| self.add(product))
            .unwrap_or(WishlistChange::Remove { product_id })
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    fn product(id: &str) -> Product {
        Product {
            id: ProductId::new(id),
            title: id.to_string(),
            description: String::new(),
            price: Decimal::ONE,
            sale_price: None,
            discount_percentage: None,
            stock: 1,
            rating: 0.0,
            category: None,
            images: vec![],
        }
    }

    #[test]
    fn test_add_is_idempotent() {
        let mut wishlist = Wishlist::new();
        assert!(wishlist.add(product("a")).is_some());
        assert!(wishlist.add(product("a")).is_none());
        assert_eq!(wishlist.len(), 1);
    }

    #[test]
    fn test_remove_missing_is_noop() {
        let mut wishlist = Wishlist::new();
        assert!(wishlist.remove(&ProductId::new("a")).is_none());
    }

    #[test]
    fn test_toggle() {
        let mut wishlist = Wishlist::new();
        assert_eq!(
            wishlist.toggle(product("a")),
            WishlistChange::Add {
                product_id: ProductId::new("a")
            }
        );
        assert!(wishlist.contains(&ProductId::new("a")));
        assert_eq!(
            wishlist.toggle(product("a")),
            WishlistChange::Remove {
                product_id: ProductId::new("a")
            }
        );
        assert!(wishlist.is_empty());
    }

    #[test]
    fn test_from_items_dedupes() {
        let wishlist = Wishlist::from_items(vec![
            WishlistItem {
                product: product("a"),
            },
            WishlistItem {
                product: product("b"),
            },
            WishlistItem {
                product: product("a"),
            },
        ]);
        assert_eq!(
            wishlist.product_ids(),
            vec![ProductId::new("a"), ProductId::new("b")]
        );
    }
}
