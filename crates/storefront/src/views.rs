//! Display data for templates.
//!
//! Templates get pre-formatted strings so prices and dates render the same
//! everywhere.

use emporium_core::{
    Cart, CartLine, Category, CurrencyCode, Order, OrderItem, Price, Product, ProductPage, Review,
    Wishlist,
};
use rust_decimal::Decimal;

fn money(amount: Decimal, currency: CurrencyCode) -> String {
    Price::new(amount, currency).display()
}

// =============================================================================
// Catalog
// =============================================================================

/// Product card and detail data.
#[derive(Debug, Clone)]
pub struct ProductView {
    pub id: String,
    pub title: String,
    pub description: String,
    pub price: String,
    /// Original price when on sale.
    pub compare_at_price: Option<String>,
    pub discount_label: Option<String>,
    pub image: Option<String>,
    pub images: Vec<String>,
    pub category: Option<CategoryLink>,
    pub rating: String,
    pub stock: u32,
    pub in_stock: bool,
    pub saved: bool,
}

/// Category reference for breadcrumbs and cards.
#[derive(Debug, Clone)]
pub struct CategoryLink {
    pub id: String,
    pub name: String,
}

impl ProductView {
    #[must_use]
    pub fn new(product: &Product, currency: CurrencyCode, wishlist: &Wishlist) -> Self {
        let on_sale = product.is_on_sale();
        Self {
            id: product.id.to_string(),
            title: product.title.clone(),
            description: product.description.clone(),
            price: money(product.unit_price(), currency),
            compare_at_price: on_sale.then(|| money(product.price, currency)),
            discount_label: product
                .discount_percentage
                .filter(|_| on_sale)
                .map(|pct| format!("-{}%", pct.normalize())),
            image: product.primary_image().map(String::from),
            images: product.images.clone(),
            category: product.category.as_ref().map(|c| CategoryLink {
                id: c.id.to_string(),
                name: c.name.clone(),
            }),
            rating: format!("{:.1}", product.rating),
            stock: product.stock,
            in_stock: product.in_stock(),
            saved: wishlist.contains(&product.id),
        }
    }

    #[must_use]
    pub fn list(products: &[Product], currency: CurrencyCode, wishlist: &Wishlist) -> Vec<Self> {
        products
            .iter()
            .map(|p| Self::new(p, currency, wishlist))
            .collect()
    }
}

/// Pagination links for a listing.
#[derive(Debug, Clone)]
pub struct Pagination {
    pub page: u32,
    pub pages: u32,
    pub total: u64,
    pub prev_url: Option<String>,
    pub next_url: Option<String>,
}

impl Pagination {
    /// Build links by substituting the page into `base`, a URL whose query
    /// string (possibly empty) lacks the `page` parameter.
    #[must_use]
    pub fn new(page: &ProductPage, base: &str) -> Self {
        let sep = if base.contains('?') { '&' } else { '?' };
        let link = |n: u32| format!("{base}{sep}page={n}");
        Self {
            page: page.page,
            pages: page.pages,
            total: page.total,
            prev_url: page.has_prev().then(|| link(page.page - 1)),
            next_url: page.has_next().then(|| link(page.page + 1)),
        }
    }
}

/// Category card data.
#[derive(Debug, Clone)]
pub struct CategoryView {
    pub id: String,
    pub name: String,
    pub description: String,
    pub image: Option<String>,
}

impl From<&Category> for CategoryView {
    fn from(category: &Category) -> Self {
        Self {
            id: category.id.to_string(),
            name: category.name.clone(),
            description: category.description.clone().unwrap_or_default(),
            image: category.image.clone(),
        }
    }
}

/// Review display data.
#[derive(Debug, Clone)]
pub struct ReviewView {
    pub user_name: String,
    pub stars: String,
    pub comment: String,
    pub date: String,
}

impl From<&Review> for ReviewView {
    fn from(review: &Review) -> Self {
        let filled = usize::from(review.rating.value());
        Self {
            user_name: review.user_name.clone(),
            stars: format!("{}{}", "★".repeat(filled), "☆".repeat(5 - filled)),
            comment: review.comment.clone(),
            date: review.created_at.format("%Y-%m-%d").to_string(),
        }
    }
}

// =============================================================================
// Cart
// =============================================================================

/// Cart line display data.
#[derive(Debug, Clone)]
pub struct CartLineView {
    pub product_id: String,
    pub title: String,
    pub image: Option<String>,
    pub unit_price: String,
    pub line_total: String,
    pub quantity: u32,
    pub can_decrement: bool,
    pub can_increment: bool,
}

impl CartLineView {
    fn new(line: &CartLine, currency: CurrencyCode) -> Self {
        Self {
            product_id: line.product.id.to_string(),
            title: line.product.title.clone(),
            image: line.product.primary_image().map(String::from),
            unit_price: money(line.unit_price(), currency),
            line_total: money(line.line_total(), currency),
            quantity: line.quantity,
            can_decrement: line.quantity > 1,
            can_increment: line.quantity < line.product.stock,
        }
    }
}

/// Cart display data.
#[derive(Debug, Clone)]
pub struct CartView {
    pub lines: Vec<CartLineView>,
    pub item_count: u32,
    pub subtotal: String,
    pub savings: Option<String>,
}

impl CartView {
    #[must_use]
    pub fn new(cart: &Cart, currency: CurrencyCode) -> Self {
        let totals = cart.totals();
        Self {
            lines: cart
                .lines()
                .iter()
                .map(|l| CartLineView::new(l, currency))
                .collect(),
            item_count: totals.item_count,
            subtotal: money(totals.subtotal, currency),
            savings: (totals.savings > Decimal::ZERO).then(|| money(totals.savings, currency)),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

// =============================================================================
// Orders
// =============================================================================

/// Order line display data.
#[derive(Debug, Clone)]
pub struct OrderItemView {
    pub product_id: String,
    pub title: String,
    pub quantity: u32,
    pub unit_price: String,
    pub line_total: String,
}

impl OrderItemView {
    fn new(item: &OrderItem, currency: CurrencyCode) -> Self {
        Self {
            product_id: item.product_id.to_string(),
            title: item.title.clone(),
            quantity: item.quantity,
            unit_price: money(item.unit_price, currency),
            line_total: money(item.line_total(), currency),
        }
    }
}

/// Order display data.
#[derive(Debug, Clone)]
pub struct OrderView {
    pub id: String,
    pub date: String,
    pub status: &'static str,
    pub payment_method: &'static str,
    pub item_count: u32,
    pub items: Vec<OrderItemView>,
    pub subtotal: String,
    pub shipping: String,
    pub total: String,
    pub ship_to: String,
    pub phone: String,
}

impl OrderView {
    #[must_use]
    pub fn new(order: &Order, currency: CurrencyCode) -> Self {
        let address = &order.shipping_address;
        Self {
            id: order.id.to_string(),
            date: order.created_at.format("%Y-%m-%d").to_string(),
            status: order.status.label(),
            payment_method: order.payment_method.label(),
            item_count: order.item_count(),
            items: order
                .items
                .iter()
                .map(|i| OrderItemView::new(i, currency))
                .collect(),
            subtotal: money(order.subtotal, currency),
            shipping: money(order.shipping, currency),
            total: money(order.total, currency),
            ship_to: format!("{}, {}, {}", address.full_name, address.street, address.city),
            phone: address.phone.clone(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use emporium_core::{ProductId, Rating, ReviewId};

    use super::*;

    fn product(cents: i64, sale_cents: Option<i64>) -> Product {
        Product {
            id: ProductId::new("p1"),
            title: "Lamp".to_string(),
            description: String::new(),
            price: Decimal::new(cents, 2),
            sale_price: sale_cents.map(|c| Decimal::new(c, 2)),
            discount_percentage: None,
            stock: 3,
            rating: 4.26,
            category: None,
            images: vec!["https://img.test/lamp.jpg".to_string()],
        }
    }

    #[test]
    fn test_product_view_shows_compare_price_on_sale() {
        let view = ProductView::new(&product(2000, Some(1500)), CurrencyCode::USD, &Wishlist::new());
        assert_eq!(view.price, "$15.00");
        assert_eq!(view.compare_at_price.as_deref(), Some("$20.00"));
        assert_eq!(view.rating, "4.3");
        assert!(!view.saved);
    }

    #[test]
    fn test_cart_view_flags_quantity_bounds() {
        let cart = Cart::from_lines([CartLine {
            product: product(1000, None),
            quantity: 1,
        }]);
        let view = CartView::new(&cart, CurrencyCode::USD);
        let line = view.lines.first().unwrap();
        assert!(!line.can_decrement);
        assert!(line.can_increment);
        assert_eq!(view.subtotal, "$10.00");
        assert!(view.savings.is_none());
    }

    #[test]
    fn test_pagination_links() {
        let page = ProductPage {
            items: Vec::new(),
            page: 2,
            pages: 3,
            total: 30,
        };
        let links = Pagination::new(&page, "/products?sort=price_asc");
        assert_eq!(links.prev_url.as_deref(), Some("/products?sort=price_asc&page=1"));
        assert_eq!(links.next_url.as_deref(), Some("/products?sort=price_asc&page=3"));

        let links = Pagination::new(&page, "/products");
        assert_eq!(links.next_url.as_deref(), Some("/products?page=3"));
    }

    #[test]
    fn test_review_stars() {
        let review = Review {
            id: ReviewId::new("r1"),
            product_id: ProductId::new("p1"),
            user_name: "sam".to_string(),
            rating: Rating::new(3).unwrap(),
            comment: "ok".to_string(),
            created_at: chrono::Utc::now(),
        };
        assert_eq!(ReviewView::from(&review).stars, "★★★☆☆");
    }
}
