//! Catalog types: products, categories, reviews and the admin drafts that
//! create or edit them.
//!
//! Wire types use camelCase field names to match the backend.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::price::{
    MAX_UNIT_PRICE, deserialize_optional_unit_price, deserialize_unit_price, round_money,
};
use crate::types::{CategoryId, ProductId, Rating, ReviewId, SortOrder};

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

// =============================================================================
// Products
// =============================================================================

/// Lightweight category reference embedded in a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRef {
    pub id: CategoryId,
    pub name: String,
}

/// A catalog product as returned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// List price before any sale or discount.
    #[serde(deserialize_with = "deserialize_unit_price")]
    pub price: Decimal,
    #[serde(default, deserialize_with = "deserialize_optional_unit_price")]
    pub sale_price: Option<Decimal>,
    /// Percentage off the list price, 0-100 exclusive.
    #[serde(default)]
    pub discount_percentage: Option<Decimal>,
    #[serde(default)]
    pub stock: u32,
    /// Average review rating (0.0 when unrated).
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub category: Option<CategoryRef>,
    #[serde(default)]
    pub images: Vec<String>,
}

impl Product {
    /// The price a shopper actually pays for one unit.
    ///
    /// A sale price wins when it is below the list price. Otherwise a
    /// discount percentage strictly between 0 and 100 is applied and the
    /// result rounded to cents. Anything else falls back to the list price.
    #[must_use]
    pub fn unit_price(&self) -> Decimal {
        if let Some(sale) = self.sale_price
            && sale >= Decimal::ZERO
            && sale < self.price
        {
            return sale;
        }

        if let Some(pct) = self.discount_percentage
            && pct > Decimal::ZERO
            && pct < HUNDRED
        {
            let kept = HUNDRED - pct;
            let discounted = self
                .price
                .checked_mul(kept)
                .map_or_else(|| self.price / HUNDRED * kept, |scaled| scaled / HUNDRED);
            return round_money(discounted);
        }

        self.price
    }

    /// Difference between list price and unit price.
    #[must_use]
    pub fn savings_per_unit(&self) -> Decimal {
        self.price.saturating_sub(self.unit_price())
    }

    /// Whether the shopper pays less than the list price.
    #[must_use]
    pub fn is_on_sale(&self) -> bool {
        self.unit_price() < self.price
    }

    /// Whether at least one unit can be ordered.
    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.stock > 0
    }

    /// First image, used for thumbnails.
    #[must_use]
    pub fn primary_image(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }
}

/// One page of a product listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductPage {
    pub items: Vec<Product>,
    pub page: u32,
    pub pages: u32,
    pub total: u64,
}

impl ProductPage {
    /// Whether a following page exists.
    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.page < self.pages
    }

    /// Whether a preceding page exists.
    #[must_use]
    pub const fn has_prev(&self) -> bool {
        self.page > 1
    }
}

/// Filters for a product listing request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductQuery {
    pub page: u32,
    pub limit: u32,
    pub category: Option<CategoryId>,
    pub search: Option<String>,
    pub sort: SortOrder,
}

impl Default for ProductQuery {
    fn default() -> Self {
        Self {
            page: 1,
            limit: 12,
            category: None,
            search: None,
            sort: SortOrder::default(),
        }
    }
}

impl ProductQuery {
    /// Query-string pairs for the backend `/products` endpoint.
    ///
    /// Blank searches are dropped and the page is clamped to at least 1.
    #[must_use]
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("page", self.page.max(1).to_string()),
            ("limit", self.limit.to_string()),
            ("sort", self.sort.as_query_value().to_string()),
        ];
        if let Some(category) = &self.category {
            pairs.push(("category", category.to_string()));
        }
        if let Some(search) = self.search.as_deref().map(str::trim)
            && !search.is_empty()
        {
            pairs.push(("search", search.to_string()));
        }
        pairs
    }
}

// =============================================================================
// Categories
// =============================================================================

/// A product category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

// =============================================================================
// Reviews
// =============================================================================

/// A product review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: ReviewId,
    pub product_id: ProductId,
    pub user_name: String,
    pub rating: Rating,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

/// Body of a review submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewInput {
    pub product_id: ProductId,
    pub rating: Rating,
    pub comment: String,
}

/// Raw review form input.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReviewDraft {
    pub rating: String,
    pub comment: String,
}

impl ReviewDraft {
    /// Maximum comment length accepted.
    pub const MAX_COMMENT: usize = 2000;

    /// Validate the draft into a submission for `product_id`.
    ///
    /// # Errors
    ///
    /// Returns a [`DraftError`] for a missing/invalid rating or a blank or
    /// overlong comment.
    pub fn validate(&self, product_id: ProductId) -> Result<ReviewInput, DraftError> {
        let rating = self
            .rating
            .trim()
            .parse::<u8>()
            .map_err(|_| DraftError::invalid("rating", "choose between 1 and 5 stars"))
            .and_then(|value| Rating::new(value).map_err(|e| DraftError::invalid("rating", e)))?;

        let comment = required(&self.comment, "comment")?;
        if comment.chars().count() > Self::MAX_COMMENT {
            return Err(DraftError::invalid(
                "comment",
                format!("must be at most {} characters", Self::MAX_COMMENT),
            ));
        }

        Ok(ReviewInput {
            product_id,
            rating,
            comment,
        })
    }
}

// =============================================================================
// Admin drafts
// =============================================================================

/// Validation failure for a form draft.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DraftError {
    /// A required field was blank.
    #[error("{0} is required")]
    Missing(&'static str),
    /// A field failed validation.
    #[error("{field} {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl DraftError {
    fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

/// Product body sent to the backend on create or update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductInput {
    pub title: String,
    pub description: String,
    pub price: Decimal,
    pub sale_price: Option<Decimal>,
    pub discount_percentage: Option<Decimal>,
    pub stock: u32,
    pub category: Option<CategoryId>,
    pub images: Vec<String>,
}

/// Raw admin product form input. Every field arrives as text.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductDraft {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub price: String,
    #[serde(default)]
    pub sale_price: String,
    #[serde(default)]
    pub discount_percentage: String,
    #[serde(default)]
    pub stock: String,
    #[serde(default)]
    pub category_id: String,
    /// Image URLs separated by newlines or commas.
    #[serde(default)]
    pub images: String,
}

impl ProductDraft {
    /// Prefill a draft from an existing product for the edit form.
    #[must_use]
    pub fn from_product(product: &Product) -> Self {
        Self {
            title: product.title.clone(),
            description: product.description.clone(),
            price: product.price.to_string(),
            sale_price: product.sale_price.map(|p| p.to_string()).unwrap_or_default(),
            discount_percentage: product
                .discount_percentage
                .map(|p| p.to_string())
                .unwrap_or_default(),
            stock: product.stock.to_string(),
            category_id: product
                .category
                .as_ref()
                .map(|c| c.id.to_string())
                .unwrap_or_default(),
            images: product.images.join("\n"),
        }
    }

    /// Validate the draft.
    ///
    /// # Errors
    ///
    /// Returns the first [`DraftError`] found: blank title, non-positive
    /// price, sale price not below price, discount outside 0-100, negative
    /// or non-numeric stock, or an image entry that is not a URL.
    pub fn validate(&self) -> Result<ProductInput, DraftError> {
        let title = required(&self.title, "title")?;

        let price = parse_decimal(&self.price, "price")?
            .ok_or(DraftError::Missing("price"))?;
        if price <= Decimal::ZERO {
            return Err(DraftError::invalid("price", "must be greater than zero"));
        }
        if price > MAX_UNIT_PRICE {
            return Err(DraftError::invalid(
                "price",
                format!("must not exceed {MAX_UNIT_PRICE}"),
            ));
        }

        let sale_price = parse_decimal(&self.sale_price, "sale price")?;
        if let Some(sale) = sale_price
            && (sale < Decimal::ZERO || sale >= price)
        {
            return Err(DraftError::invalid(
                "sale price",
                "must be below the regular price",
            ));
        }

        let discount_percentage = parse_decimal(&self.discount_percentage, "discount")?;
        if let Some(pct) = discount_percentage
            && (pct < Decimal::ZERO || pct >= HUNDRED)
        {
            return Err(DraftError::invalid("discount", "must be between 0 and 100"));
        }

        let stock = match self.stock.trim() {
            "" => 0,
            raw => raw
                .parse::<u32>()
                .map_err(|_| DraftError::invalid("stock", "must be a whole number of 0 or more"))?,
        };

        let category = Some(self.category_id.trim())
            .filter(|id| !id.is_empty())
            .map(CategoryId::from);

        let images = self
            .images
            .split(['\n', ','])
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .map(|url| {
                if url.starts_with("https://") || url.starts_with("http://") || url.starts_with('/')
                {
                    Ok(url.to_string())
                } else {
                    Err(DraftError::invalid("images", format!("'{url}' is not a URL")))
                }
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ProductInput {
            title,
            description: self.description.trim().to_string(),
            price: round_money(price),
            sale_price: sale_price.map(round_money),
            discount_percentage,
            stock,
            category,
            images,
        })
    }
}

/// Category body sent to the backend on create or update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryInput {
    pub name: String,
    pub description: Option<String>,
    pub image: Option<String>,
}

/// Raw admin category form input.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CategoryDraft {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image: String,
}

impl CategoryDraft {
    /// Prefill a draft from an existing category.
    #[must_use]
    pub fn from_category(category: &Category) -> Self {
        Self {
            name: category.name.clone(),
            description: category.description.clone().unwrap_or_default(),
            image: category.image.clone().unwrap_or_default(),
        }
    }

    /// Validate the draft.
    ///
    /// # Errors
    ///
    /// Returns [`DraftError::Missing`] when the name is blank.
    pub fn validate(&self) -> Result<CategoryInput, DraftError> {
        let optional = |s: &str| Some(s.trim().to_string()).filter(|s| !s.is_empty());
        Ok(CategoryInput {
            name: required(&self.name, "name")?,
            description: optional(&self.description),
            image: optional(&self.image),
        })
    }
}

fn required(value: &str, field: &'static str) -> Result<String, DraftError> {
    let value = value.trim();
    if value.is_empty() {
        Err(DraftError::Missing(field))
    } else {
        Ok(value.to_string())
    }
}

fn parse_decimal(value: &str, field: &'static str) -> Result<Option<Decimal>, DraftError> {
    match value.trim() {
        "" => Ok(None),
        raw => raw
            .parse::<Decimal>()
            .map(Some)
            .map_err(|_| DraftError::invalid(field, "must be a number")),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn product(price: i64, sale: Option<i64>, pct: Option<i64>) -> Product {
        Product {
            id: ProductId::new("p1"),
            title: "Lamp".to_string(),
            description: String::new(),
            price: Decimal::new(price, 2),
            sale_price: sale.map(|s| Decimal::new(s, 2)),
            discount_percentage: pct.map(|p| Decimal::new(p, 0)),
            stock: 3,
            rating: 0.0,
            category: None,
            images: vec![],
        }
    }

    #[test]
    fn test_unit_price_prefers_lower_sale_price() {
        let p = product(2000, Some(1500), Some(50));
        assert_eq!(p.unit_price(), Decimal::new(1500, 2));
        assert_eq!(p.savings_per_unit(), Decimal::new(500, 2));
        assert!(p.is_on_sale());
    }

    #[test]
    fn test_unit_price_ignores_sale_price_above_list() {
        let p = product(2000, Some(2500), None);
        assert_eq!(p.unit_price(), Decimal::new(2000, 2));
        assert!(!p.is_on_sale());
    }

    #[test]
    fn test_unit_price_applies_discount_percentage() {
        // 19.99 * 0.85 = 16.9915 -> 16.99
        let p = product(1999, None, Some(15));
        assert_eq!(p.unit_price(), Decimal::new(1699, 2));
    }

    #[test]
    fn test_unit_price_ignores_out_of_range_discount() {
        assert_eq!(product(1000, None, Some(100)).unit_price(), Decimal::new(1000, 2));
        assert_eq!(product(1000, None, Some(0)).unit_price(), Decimal::new(1000, 2));
    }

    #[test]
    fn test_product_deserializes_backend_shape() {
        let json = r#"{
            "id": "abc",
            "title": "Mug",
            "price": "12.50",
            "salePrice": 10,
            "stock": 4,
            "rating": 4.5,
            "category": {"id": "c1", "name": "Kitchen"},
            "images": ["https://cdn.example.com/mug.jpg"]
        }"#;
        let p: Product = serde_json::from_str(json).unwrap();
        assert_eq!(p.unit_price(), Decimal::new(10, 0));
        assert_eq!(p.category.unwrap().name, "Kitchen");
        assert_eq!(p.discount_percentage, None);
    }

    #[test]
    fn test_product_rejects_prices_above_cap() {
        let listing = |price: &str, sale: &str| {
            format!(r#"{{"id": "x", "title": "Vase", "price": {price}, "salePrice": {sale}}}"#)
        };
        assert!(serde_json::from_str::<Product>(&listing(r#""1000000000""#, "null")).is_ok());
        assert!(serde_json::from_str::<Product>(&listing(r#""1000000000.01""#, "null")).is_err());
        assert!(serde_json::from_str::<Product>(&listing("5", r#""79228162514264337593543950335""#)).is_err());
    }

    #[test]
    fn test_discount_on_extreme_price_does_not_overflow() {
        let mut p = product(0, None, Some(15));
        p.price = Decimal::MAX;
        assert!(p.unit_price() < Decimal::MAX);
        assert!(p.savings_per_unit() > Decimal::ZERO);
    }

    #[test]
    fn test_query_pairs_skip_blank_search() {
        let query = ProductQuery {
            page: 0,
            search: Some("   ".to_string()),
            category: Some(CategoryId::new("c1")),
            ..ProductQuery::default()
        };
        let pairs = query.to_query_pairs();
        assert!(pairs.contains(&("page", "1".to_string())));
        assert!(pairs.contains(&("category", "c1".to_string())));
        assert!(!pairs.iter().any(|(k, _)| *k == "search"));
    }

    #[test]
    fn test_product_draft_validates() {
        let draft = ProductDraft {
            title: " Desk ".to_string(),
            price: "120".to_string(),
            sale_price: "99.999".to_string(),
            stock: "7".to_string(),
            category_id: "c2".to_string(),
            images: "https://a.example/1.jpg,\n /img/2.jpg".to_string(),
            ..ProductDraft::default()
        };
        let input = draft.validate().unwrap();
        assert_eq!(input.title, "Desk");
        assert_eq!(input.sale_price, Some(Decimal::new(10000, 2)));
        assert_eq!(input.stock, 7);
        assert_eq!(input.category, Some(CategoryId::new("c2")));
        assert_eq!(input.images.len(), 2);
    }

    #[test]
    fn test_product_draft_rejects_bad_input() {
        let base = ProductDraft {
            title: "Desk".to_string(),
            price: "10".to_string(),
            ..ProductDraft::default()
        };

        let missing_title = ProductDraft {
            title: "  ".to_string(),
            ..base.clone()
        };
        assert_eq!(missing_title.validate(), Err(DraftError::Missing("title")));

        let zero_price = ProductDraft {
            price: "0".to_string(),
            ..base.clone()
        };
        assert!(zero_price.validate().is_err());

        let at_cap = ProductDraft {
            price: "1000000000".to_string(),
            ..base.clone()
        };
        assert!(at_cap.validate().is_ok());

        let over_cap = ProductDraft {
            price: "1000000000.01".to_string(),
            ..base.clone()
        };
        assert!(matches!(
            over_cap.validate(),
            Err(DraftError::Invalid { field: "price", .. })
        ));

        let sale_too_high = ProductDraft {
            sale_price: "10".to_string(),
            ..base.clone()
        };
        assert!(sale_too_high.validate().is_err());

        let bad_stock = ProductDraft {
            stock: "-1".to_string(),
            ..base.clone()
        };
        assert!(bad_stock.validate().is_err());

        let bad_image = ProductDraft {
            images: "not a url".to_string(),
            ..base
        };
        assert!(bad_image.validate().is_err());
    }

    #[test]
    fn test_draft_round_trips_existing_product() {
        let p = product(2000, Some(1500), None);
        let input = ProductDraft::from_product(&p).validate().unwrap();
        assert_eq!(input.price, p.price);
        assert_eq!(input.sale_price, p.sale_price);
    }

    #[test]
    fn test_review_draft() {
        let ok = ReviewDraft {
            rating: "4".to_string(),
            comment: " Great ".to_string(),
        };
        let input = ok.validate(ProductId::new("p1")).unwrap();
        assert_eq!(input.rating.value(), 4);
        assert_eq!(input.comment, "Great");

        let bad = ReviewDraft {
            rating: "7".to_string(),
            comment: "x".to_string(),
        };
        assert!(bad.validate(ProductId::new("p1")).is_err());
    }

    #[test]
    fn test_category_draft_requires_name() {
        assert_eq!(
            CategoryDraft::default().validate(),
            Err(DraftError::Missing("name"))
        );
        let input = CategoryDraft {
            name: "Garden".to_string(),
            ..CategoryDraft::default()
        }
        .validate()
        .unwrap();
        assert_eq!(input.description, None);
    }
}
