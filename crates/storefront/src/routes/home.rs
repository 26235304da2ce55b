//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use emporium_core::{ProductQuery, SortOrder};
use tracing::instrument;

use crate::error::Result;
use crate::filters;
use crate::middleware::{PageContext, Shopper};
use crate::services::WishlistService;
use crate::state::AppState;
use crate::views::{CategoryView, ProductView};

/// Number of top-rated products on the home page.
const FEATURED_COUNT: u32 = 8;

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub page: PageContext,
    pub featured: Vec<ProductView>,
    pub categories: Vec<CategoryView>,
}

/// Display the home page.
///
/// Either section may come back empty when the backend is unavailable; the
/// page still renders.
#[instrument(skip(state, shopper))]
pub async fn home(State(state): State<AppState>, shopper: Shopper) -> Result<impl IntoResponse> {
    let ctx = shopper.call_context();
    let query = ProductQuery {
        limit: FEATURED_COUNT,
        sort: SortOrder::Rating,
        ..ProductQuery::default()
    };

    let (products, categories) = tokio::join!(
        state.backend().list_products(&ctx, &query),
        state.backend().list_categories(&ctx),
    );
    let wishlist = WishlistService::new(state.backend(), &shopper)
        .current()
        .await?;

    let featured = products.map_or_else(
        |e| {
            tracing::warn!(error = %e, "Failed to load featured products");
            Vec::new()
        },
        |page| ProductView::list(&page.items, shopper.currency, &wishlist),
    );
    let categories = categories.map_or_else(
        |e| {
            tracing::warn!(error = %e, "Failed to load categories");
            Vec::new()
        },
        |list| list.iter().map(CategoryView::from).collect(),
    );

    Ok(HomeTemplate {
        page: shopper.page().await?,
        featured,
        categories,
    })
}
