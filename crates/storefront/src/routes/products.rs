//! Product route handlers.

use std::str::FromStr;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
};
use emporium_core::{CategoryId, ProductId, ProductQuery, Review, ReviewDraft, SortOrder};
use serde::Deserialize;
use tracing::instrument;

use super::toast_and_redirect;
use crate::error::Result;
use crate::filters;
use crate::middleware::{PageContext, RequireAuth, Shopper};
use crate::models::Toast;
use crate::services::{CartService, ServiceError, WishlistService};
use crate::state::AppState;
use crate::views::{CategoryView, Pagination, ProductView, ReviewView};

// =============================================================================
// Query Types
// =============================================================================

/// Listing filters from the query string.
#[derive(Debug, Default, Deserialize)]
pub struct ListingQuery {
    pub page: Option<u32>,
    pub category: Option<String>,
    pub q: Option<String>,
    pub sort: Option<String>,
}

impl ListingQuery {
    fn category_id(&self) -> Option<CategoryId> {
        self.category
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(CategoryId::from)
    }

    fn search(&self) -> Option<String> {
        self.q
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(String::from)
    }

    fn sort(&self) -> SortOrder {
        self.sort
            .as_deref()
            .and_then(|s| SortOrder::from_str(s).ok())
            .unwrap_or_default()
    }

    /// Backend query for this listing.
    pub fn to_product_query(&self, limit: u32, category: Option<CategoryId>) -> ProductQuery {
        ProductQuery {
            page: self.page.unwrap_or(1).max(1),
            limit,
            category: category.or_else(|| self.category_id()),
            search: self.search(),
            sort: self.sort(),
        }
    }
}

/// Listing URL without the page parameter, for pagination links.
pub fn listing_base_url(path: &str, query: &ProductQuery, keep_category: bool) -> String {
    let mut params = Vec::new();
    if keep_category && let Some(category) = &query.category {
        params.push(format!("category={}", urlencoding::encode(category.as_str())));
    }
    if let Some(search) = &query.search {
        params.push(format!("q={}", urlencoding::encode(search)));
    }
    if query.sort != SortOrder::default() {
        params.push(format!("sort={}", query.sort.as_str()));
    }
    if params.is_empty() {
        path.to_string()
    } else {
        format!("{path}?{}", params.join("&"))
    }
}

/// Sort dropdown option.
pub struct SortOption {
    pub value: &'static str,
    pub label: &'static str,
    pub selected: bool,
}

/// Sort dropdown options with `current` selected.
#[must_use]
pub fn sort_options(current: SortOrder) -> Vec<SortOption> {
    SortOrder::ALL
        .iter()
        .map(|s| SortOption {
            value: s.as_str(),
            label: s.label(),
            selected: *s == current,
        })
        .collect()
}

// =============================================================================
// Templates
// =============================================================================

/// Product listing page template (also used for category pages).
#[derive(Template, WebTemplate)]
#[template(path = "products/index.html")]
pub struct ProductsIndexTemplate {
    pub page: PageContext,
    pub heading: String,
    pub subheading: String,
    pub action: String,
    pub products: Vec<ProductView>,
    pub categories: Vec<CategoryView>,
    pub selected_category: String,
    pub show_category_filter: bool,
    pub search: String,
    pub sort_options: Vec<SortOption>,
    pub pagination: Pagination,
    pub return_to: String,
}

/// Product detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/show.html")]
pub struct ProductShowTemplate {
    pub page: PageContext,
    pub product: ProductView,
    pub in_cart: u32,
    pub reviews: Vec<ReviewView>,
    pub can_review: bool,
    pub return_to: String,
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the product listing.
#[instrument(skip(state, shopper))]
pub async fn index(
    State(state): State<AppState>,
    shopper: Shopper,
    Query(query): Query<ListingQuery>,
) -> Result<impl IntoResponse> {
    let limit = state.config().display.products_per_page;
    let product_query = query.to_product_query(limit, None);
    let ctx = shopper.call_context();

    let listing = state.backend().list_products(&ctx, &product_query).await?;
    let categories = state
        .backend()
        .list_categories(&ctx)
        .await
        .unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Failed to load categories for filter");
            Vec::new()
        });
    let wishlist = WishlistService::new(state.backend(), &shopper)
        .current()
        .await?;

    let base = listing_base_url("/products", &product_query, true);
    let heading = product_query
        .search
        .as_ref()
        .map_or_else(|| "All products".to_string(), |q| format!("Results for \"{q}\""));

    Ok(ProductsIndexTemplate {
        page: shopper.page().await?,
        subheading: format!("{} products", listing.total),
        heading,
        action: "/products".to_string(),
        products: ProductView::list(&listing.items, shopper.currency, &wishlist),
        categories: categories.iter().map(CategoryView::from).collect(),
        selected_category: product_query
            .category
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_default(),
        show_category_filter: true,
        search: product_query.search.clone().unwrap_or_default(),
        sort_options: sort_options(product_query.sort),
        pagination: Pagination::new(&listing, &base),
        return_to: with_page(&base, listing.page),
    })
}

/// Display a product with its reviews.
#[instrument(skip(state, shopper), fields(product_id = %id))]
pub async fn show(
    State(state): State<AppState>,
    shopper: Shopper,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let id = ProductId::from(id);
    let ctx = shopper.call_context();

    let product = state.backend().get_product(&ctx, &id).await?;
    let reviews = state
        .backend()
        .list_reviews(&ctx, &id)
        .await
        .unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Failed to load reviews");
            Vec::new()
        });

    let wishlist = WishlistService::new(state.backend(), &shopper)
        .current()
        .await?;
    let cart = CartService::new(state.backend(), &shopper).current().await?;

    Ok(ProductShowTemplate {
        page: shopper.page().await?,
        in_cart: cart.quantity_of(&id),
        product: ProductView::new(&product, shopper.currency, &wishlist),
        reviews: reviews.iter().map(ReviewView::from).collect(),
        can_review: shopper.is_signed_in(),
        return_to: format!("/products/{}", urlencoding::encode(id.as_str())),
    })
}

/// Post a review.
#[instrument(skip(state, shopper, draft), fields(product_id = %id))]
pub async fn create_review(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
    shopper: Shopper,
    Path(id): Path<String>,
    Form(draft): Form<ReviewDraft>,
) -> Result<Response> {
    let id = ProductId::from(id);
    let back = format!("/products/{}", urlencoding::encode(id.as_str()));

    let result = post_review(&state, &shopper, id, &draft).await;

    toast_and_redirect(
        &shopper,
        result,
        Some(Toast::success("Thanks for your review")),
        &back,
    )
    .await
}

async fn post_review(
    state: &AppState,
    shopper: &Shopper,
    id: ProductId,
    draft: &ReviewDraft,
) -> std::result::Result<Review, ServiceError> {
    let input = draft.validate(id)?;
    Ok(state
        .backend()
        .create_review(&shopper.call_context(), &input)
        .await?)
}

fn with_page(base: &str, page: u32) -> String {
    if page <= 1 {
        return base.to_string();
    }
    let sep = if base.contains('?') { '&' } else { '?' };
    format!("{base}{sep}page={page}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listing_query_defaults() {
        let query = ListingQuery::default().to_product_query(12, None);
        assert_eq!(query.page, 1);
        assert_eq!(query.sort, SortOrder::Newest);
        assert!(query.search.is_none());
    }

    #[test]
    fn test_listing_query_ignores_blank_and_unknown_values() {
        let query = ListingQuery {
            page: Some(0),
            category: Some("  ".to_string()),
            q: Some(" lamp ".to_string()),
            sort: Some("bogus".to_string()),
        }
        .to_product_query(12, None);
        assert_eq!(query.page, 1);
        assert!(query.category.is_none());
        assert_eq!(query.search.as_deref(), Some("lamp"));
        assert_eq!(query.sort, SortOrder::Newest);
    }

    #[test]
    fn test_listing_base_url_keeps_filters() {
        let query = ProductQuery {
            category: Some(CategoryId::new("c 1")),
            search: Some("red lamp".to_string()),
            sort: SortOrder::PriceAsc,
            ..ProductQuery::default()
        };
        assert_eq!(
            listing_base_url("/products", &query, true),
            "/products?category=c%201&q=red%20lamp&sort=price_asc"
        );
        assert_eq!(
            listing_base_url("/categories/c1", &query, false),
            "/categories/c1?q=red%20lamp&sort=price_asc"
        );
        assert_eq!(
            listing_base_url("/products", &ProductQuery::default(), true),
            "/products"
        );
    }

    #[test]
    fn test_sort_options_mark_selection() {
        let options = sort_options(SortOrder::Rating);
        assert_eq!(options.iter().filter(|o| o.selected).count(), 1);
        assert!(options.iter().any(|o| o.selected && o.value == "rating"));
    }
}
