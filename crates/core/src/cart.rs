//! Cart state and its reconciliation with the remote cart.
//!
//! Each mutating method validates the request against local state, applies
//! it, and returns the [`CartChange`] the backend must receive. Callers keep
//! a clone of the cart from before the mutation so they can roll back when
//! the backend rejects the change, and replace local state with the
//! backend's snapshot (via [`Cart::from_lines`]) when it accepts.
//!
//! Invariants held by every `Cart`:
//! - each product appears in at most one line
//! - every line has `quantity >= 1`

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::Product;
use crate::types::ProductId;

/// Reasons a cart operation is refused locally.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartError {
    /// Quantity must be at least one.
    #[error("quantity must be at least 1")]
    InvalidQuantity,
    /// Decrementing would take the line below one unit.
    #[error("quantity cannot go below 1; remove the item instead")]
    BelowMinimum,
    /// Not enough stock for the requested quantity.
    #[error("only {available} in stock")]
    OutOfStock { available: u32 },
    /// The product has no line in this cart.
    #[error("product {0} is not in the cart")]
    NotInCart(ProductId),
}

/// A mutation to send to the remote cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CartChange {
    /// A product that was not in the cart.
    Insert { product_id: ProductId, quantity: u32 },
    /// New absolute quantity for an existing line.
    SetQuantity { product_id: ProductId, quantity: u32 },
    /// Drop a line.
    Remove { product_id: ProductId },
    /// Drop every line.
    Clear,
}

/// One product in the cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    pub product: Product,
    pub quantity: u32,
}

impl CartLine {
    /// Price per unit after sales and discounts.
    #[must_use]
    pub fn unit_price(&self) -> Decimal {
        self.product.unit_price()
    }

    /// Unit price times quantity, saturating at `Decimal::MAX`.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.unit_price().saturating_mul(Decimal::from(self.quantity))
    }
}

/// Aggregates shown in the cart summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CartTotals {
    /// Sum of quantities.
    pub item_count: u32,
    /// Sum of line totals at effective prices.
    pub subtotal: Decimal,
    /// Sum of list-price minus effective-price over all units.
    pub savings: Decimal,
}

/// Shopping cart.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// An empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { lines: Vec::new() }
    }

    /// Build a cart from a backend snapshot.
    ///
    /// Lines for the same product are merged by summing quantities (the
    /// later product record wins) and zero-quantity lines are dropped, so the
    /// result always satisfies the cart invariants.
    #[must_use]
    pub fn from_lines(lines: impl IntoIterator<Item = CartLine>) -> Self {
        let mut cart = Self::new();
        for line in lines.into_iter().filter(|l| l.quantity > 0) {
            match cart.position(&line.product.id) {
                Some(idx) => {
                    if let Some(existing) = cart.lines.get_mut(idx) {
                        existing.quantity = existing.quantity.saturating_add(line.quantity);
                        existing.product = line.product;
                    }
                }
                None => cart.lines.push(line),
            }
        }
        cart
    }

    /// Lines in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Line for a product, if present.
    #[must_use]
    pub fn line(&self, product_id: &ProductId) -> Option<&CartLine> {
        self.lines.iter().find(|l| &l.product.id == product_id)
    }

    /// Quantity of a product, zero if absent.
    #[must_use]
    pub fn quantity_of(&self, product_id: &ProductId) -> u32 {
        self.line(product_id).map_or(0, |l| l.quantity)
    }

    /// Sum of quantities.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.lines
            .iter()
            .fold(0u32, |acc, l| acc.saturating_add(l.quantity))
    }

    /// Summary totals.
    #[must_use]
    pub fn totals(&self) -> CartTotals {
        self.lines.iter().fold(CartTotals::default(), |acc, line| {
            let quantity = Decimal::from(line.quantity);
            CartTotals {
                item_count: acc.item_count.saturating_add(line.quantity),
                subtotal: acc.subtotal.saturating_add(line.line_total()),
                savings: acc
                    .savings
                    .saturating_add(line.product.savings_per_unit().saturating_mul(quantity)),
            }
        })
    }

    /// Add `quantity` units of `product`.
    ///
    /// Merges into the existing line when the product is already present.
    ///
    /// # Errors
    ///
    /// [`CartError::InvalidQuantity`] for zero, [`CartError::OutOfStock`]
    /// when the combined quantity exceeds stock.
    pub fn add(&mut self, product: Product, quantity: u32) -> Result<CartChange, CartError> {
        if quantity == 0 {
            return Err(CartError::InvalidQuantity);
        }

        let product_id = product.id.clone();
        match self.position(&product_id) {
            Some(idx) => {
                let line = self
                    .lines
                    .get_mut(idx)
                    .ok_or_else(|| CartError::NotInCart(product_id.clone()))?;
                let wanted = line.quantity.saturating_add(quantity);
                check_stock(&product, wanted)?;
                line.quantity = wanted;
                line.product = product;
                Ok(CartChange::SetQuantity {
                    product_id,
                    quantity: wanted,
                })
            }
            None => {
                check_stock(&product, quantity)?;
                self.lines.push(CartLine { product, quantity });
                Ok(CartChange::Insert {
                    product_id,
                    quantity,
                })
            }
        }
    }

    /// Add one unit to an existing line.
    ///
    /// # Errors
    ///
    /// [`CartError::NotInCart`] or [`CartError::OutOfStock`].
    pub fn increment(&mut self, product_id: &ProductId) -> Result<CartChange, CartError> {
        let current = self.require(product_id)?.quantity;
        self.set_quantity(product_id, current.saturating_add(1))
    }

    /// Remove one unit from an existing line.
    ///
    /// # Errors
    ///
    /// [`CartError::NotInCart`], or [`CartError::BelowMinimum`] when the line
    /// holds a single unit.
    pub fn decrement(&mut self, product_id: &ProductId) -> Result<CartChange, CartError> {
        let current = self.require(product_id)?.quantity;
        if current <= 1 {
            return Err(CartError::BelowMinimum);
        }
        self.set_quantity(product_id, current - 1)
    }

    /// Set an absolute quantity on an existing line.
    ///
    /// Stock is only checked when the quantity grows, so a snapshot holding
    /// more than is now in stock can still be reduced.
    ///
    /// # Errors
    ///
    /// [`CartError::InvalidQuantity`] for zero (use [`Cart::remove`]),
    /// [`CartError::NotInCart`], or [`CartError::OutOfStock`].
    pub fn set_quantity(
        &mut self,
        product_id: &ProductId,
        quantity: u32,
    ) -> Result<CartChange, CartError> {
        if quantity == 0 {
            return Err(CartError::InvalidQuantity);
        }
        let line = self
            .lines
            .iter_mut()
            .find(|l| &l.product.id == product_id)
            .ok_or_else(|| CartError::NotInCart(product_id.clone()))?;
        if quantity > line.quantity {
            check_stock(&line.product, quantity)?;
        }
        line.quantity = quantity;
        Ok(CartChange::SetQuantity {
            product_id: product_id.clone(),
            quantity,
        })
    }

    /// Remove a line.
    ///
    /// # Errors
    ///
    /// [`CartError::NotInCart`] when the product has no line.
    pub fn remove(&mut self, product_id: &ProductId) -> Result<CartChange, CartError> {
        let idx = self
            .position(product_id)
            .ok_or_else(|| CartError::NotInCart(product_id.clone()))?;
        self.lines.remove(idx);
        Ok(CartChange::Remove {
            product_id: product_id.clone(),
        })
    }

    /// Remove every line.
    pub fn clear(&mut self) -> CartChange {
        self.lines.clear();
        CartChange::Clear
    }

    /// Fold another cart (typically a guest cart) into this one.
    ///
    /// Quantities are added onto existing lines and capped at stock; lines
    /// that cannot take even one more unit are skipped. Returns the changes
    /// to replay remotely.
    pub fn merge(&mut self, other: Self) -> Vec<CartChange> {
        other
            .lines
            .into_iter()
            .filter_map(|line| {
                let room = line
                    .product
                    .stock
                    .saturating_sub(self.quantity_of(&line.product.id));
                let quantity = line.quantity.min(room);
                if quantity == 0 {
                    return None;
                }
                self.add(line.product, quantity).ok()
            })
            .collect()
    }

    fn position(&self, product_id: &ProductId) -> Option<usize> {
        self.lines.iter().position(|l| &l.product.id == product_id)
    }

    fn require(&self, product_id: &ProductId) -> Result<&CartLine, CartError> {
        self.line(product_id)
            .ok_or_else(|| CartError::NotInCart(product_id.clone()))
    }
}

fn check_stock(product: &Product, wanted: u32) -> Result<(), CartError> {
    if wanted > product.stock {
        Err(CartError::OutOfStock {
            available: product.stock,
        })
    } else {
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn product(id: &str, cents: i64, stock: u32) -> Product {
        Product {
            id: ProductId::new(id),
            title: format!("Product {id}"),
            description: String::new(),
            price: Decimal::new(cents, 2),
            sale_price: None,
            discount_percentage: None,
            stock,
            rating: 0.0,
            category: None,
            images: vec![],
        }
    }

    #[test]
    fn test_add_new_product_inserts_line() {
        let mut cart = Cart::new();
        let change = cart.add(product("a", 500, 10), 2).unwrap();
        assert_eq!(
            change,
            CartChange::Insert {
                product_id: ProductId::new("a"),
                quantity: 2
            }
        );
        assert_eq!(cart.lines().len(), 1);
    }

    #[test]
    fn test_add_existing_product_merges_into_one_line() {
        let mut cart = Cart::new();
        cart.add(product("a", 500, 10), 2).unwrap();
        let change = cart.add(product("a", 500, 10), 3).unwrap();

        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.quantity_of(&ProductId::new("a")), 5);
        assert_eq!(
            change,
            CartChange::SetQuantity {
                product_id: ProductId::new("a"),
                quantity: 5
            }
        );
    }

    #[test]
    fn test_add_rejects_zero_and_over_stock() {
        let mut cart = Cart::new();
        assert_eq!(
            cart.add(product("a", 500, 2), 0),
            Err(CartError::InvalidQuantity)
        );
        cart.add(product("a", 500, 2), 2).unwrap();
        assert_eq!(
            cart.add(product("a", 500, 2), 1),
            Err(CartError::OutOfStock { available: 2 })
        );
        assert_eq!(cart.quantity_of(&ProductId::new("a")), 2);
    }

    #[test]
    fn test_decrement_stops_at_one() {
        let mut cart = Cart::new();
        let id = ProductId::new("a");
        cart.add(product("a", 500, 10), 2).unwrap();

        cart.decrement(&id).unwrap();
        assert_eq!(cart.quantity_of(&id), 1);
        assert_eq!(cart.decrement(&id), Err(CartError::BelowMinimum));
        assert_eq!(cart.quantity_of(&id), 1);
    }

    #[test]
    fn test_decrement_below_stock_shortfall() {
        let id = ProductId::new("a");
        let mut cart = Cart::from_lines([CartLine {
            product: product("a", 500, 2),
            quantity: 5,
        }]);

        cart.decrement(&id).unwrap();
        assert_eq!(cart.quantity_of(&id), 4);
        assert!(cart.set_quantity(&id, 3).is_ok());
        assert_eq!(
            cart.set_quantity(&id, 4),
            Err(CartError::OutOfStock { available: 2 })
        );
        assert_eq!(cart.quantity_of(&id), 3);
    }

    #[test]
    fn test_increment_respects_stock() {
        let mut cart = Cart::new();
        let id = ProductId::new("a");
        cart.add(product("a", 500, 2), 1).unwrap();

        cart.increment(&id).unwrap();
        assert_eq!(
            cart.increment(&id),
            Err(CartError::OutOfStock { available: 2 })
        );
    }

    #[test]
    fn test_operations_on_missing_product() {
        let mut cart = Cart::new();
        let id = ProductId::new("ghost");
        assert_eq!(cart.increment(&id), Err(CartError::NotInCart(id.clone())));
        assert_eq!(cart.decrement(&id), Err(CartError::NotInCart(id.clone())));
        assert_eq!(cart.remove(&id), Err(CartError::NotInCart(id)));
    }

    #[test]
    fn test_set_quantity_zero_is_rejected() {
        let mut cart = Cart::new();
        let id = ProductId::new("a");
        cart.add(product("a", 500, 5), 1).unwrap();
        assert_eq!(cart.set_quantity(&id, 0), Err(CartError::InvalidQuantity));
        assert!(cart.set_quantity(&id, 4).is_ok());
        assert_eq!(cart.quantity_of(&id), 4);
    }

    #[test]
    fn test_totals_use_effective_prices() {
        let mut cart = Cart::new();
        let mut discounted = product("a", 2000, 10);
        discounted.discount_percentage = Some(Decimal::new(25, 0));
        cart.add(discounted, 2).unwrap();
        cart.add(product("b", 350, 10), 3).unwrap();

        let totals = cart.totals();
        assert_eq!(totals.item_count, 5);
        // 2 x 15.00 + 3 x 3.50
        assert_eq!(totals.subtotal, Decimal::new(4050, 2));
        assert_eq!(totals.savings, Decimal::new(1000, 2));
    }

    #[test]
    fn test_totals_saturate_on_extreme_prices() {
        let mut pricey = product("a", 0, 10);
        pricey.price = Decimal::MAX;
        let mut cart = Cart::new();
        cart.add(pricey, 2).unwrap();
        cart.add(product("b", 100, 10), 1).unwrap();

        assert_eq!(cart.lines().first().unwrap().line_total(), Decimal::MAX);
        let totals = cart.totals();
        assert_eq!(totals.subtotal, Decimal::MAX);
        assert_eq!(totals.item_count, 3);
    }

    #[test]
    fn test_from_lines_merges_duplicates_and_drops_empty() {
        let cart = Cart::from_lines(vec![
            CartLine {
                product: product("a", 100, 10),
                quantity: 1,
            },
            CartLine {
                product: product("b", 100, 10),
                quantity: 0,
            },
            CartLine {
                product: product("a", 120, 10),
                quantity: 2,
            },
        ]);

        assert_eq!(cart.lines().len(), 1);
        let line = cart.line(&ProductId::new("a")).unwrap();
        assert_eq!(line.quantity, 3);
        assert_eq!(line.product.price, Decimal::new(120, 2));
    }

    #[test]
    fn test_rollback_by_clone() {
        let mut cart = Cart::new();
        cart.add(product("a", 100, 10), 1).unwrap();
        let before = cart.clone();

        cart.increment(&ProductId::new("a")).unwrap();
        assert_ne!(cart, before);

        cart = before;
        assert_eq!(cart.quantity_of(&ProductId::new("a")), 1);
    }

    #[test]
    fn test_merge_guest_cart() {
        let mut account = Cart::new();
        account.add(product("a", 100, 3), 2).unwrap();

        let mut guest = Cart::new();
        guest.add(product("a", 100, 3), 3).unwrap();
        guest.add(product("b", 100, 5), 1).unwrap();
        guest.add(product("c", 100, 1), 1).unwrap();
        account.add(product("c", 100, 1), 1).unwrap();

        let changes = account.merge(guest);

        assert_eq!(account.quantity_of(&ProductId::new("a")), 3);
        assert_eq!(account.quantity_of(&ProductId::new("b")), 1);
        assert_eq!(account.quantity_of(&ProductId::new("c")), 1);
        assert_eq!(changes.len(), 2);
    }

    #[test]
    fn test_clear() {
        let mut cart = Cart::new();
        cart.add(product("a", 100, 3), 1).unwrap();
        assert_eq!(cart.clear(), CartChange::Clear);
        assert!(cart.is_empty());
        assert_eq!(cart.totals(), CartTotals::default());
    }
}
