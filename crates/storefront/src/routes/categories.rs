//! Category route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
};
use emporium_core::CategoryId;
use tracing::instrument;

use super::products::{ListingQuery, ProductsIndexTemplate, listing_base_url, sort_options};
use crate::error::Result;
use crate::filters;
use crate::middleware::{PageContext, Shopper};
use crate::services::WishlistService;
use crate::state::AppState;
use crate::views::{CategoryView, Pagination, ProductView};

/// Category listing template.
#[derive(Template, WebTemplate)]
#[template(path = "categories/index.html")]
pub struct CategoriesIndexTemplate {
    pub page: PageContext,
    pub categories: Vec<CategoryView>,
}

/// Display every category.
#[instrument(skip(state, shopper))]
pub async fn index(State(state): State<AppState>, shopper: Shopper) -> Result<impl IntoResponse> {
    let categories = state
        .backend()
        .list_categories(&shopper.call_context())
        .await?;

    Ok(CategoriesIndexTemplate {
        page: shopper.page().await?,
        categories: categories.iter().map(CategoryView::from).collect(),
    })
}

/// Display the products of one category.
#[instrument(skip(state, shopper), fields(category_id = %id))]
pub async fn show(
    State(state): State<AppState>,
    shopper: Shopper,
    Path(id): Path<String>,
    Query(query): Query<ListingQuery>,
) -> Result<impl IntoResponse> {
    let id = CategoryId::from(id);
    let ctx = shopper.call_context();
    let category = state.backend().get_category(&ctx, &id).await?;

    let limit = state.config().display.products_per_page;
    let product_query = query.to_product_query(limit, Some(id.clone()));
    let listing = state.backend().list_products(&ctx, &product_query).await?;
    let wishlist = WishlistService::new(state.backend(), &shopper)
        .current()
        .await?;

    let path = format!("/categories/{}", urlencoding::encode(id.as_str()));
    let base = listing_base_url(&path, &product_query, false);

    Ok(ProductsIndexTemplate {
        page: shopper.page().await?,
        heading: category.name.clone(),
        subheading: category.description.clone().unwrap_or_default(),
        action: path,
        products: ProductView::list(&listing.items, shopper.currency, &wishlist),
        categories: Vec::new(),
        selected_category: id.to_string(),
        show_category_filter: false,
        search: product_query.search.clone().unwrap_or_default(),
        sort_options: sort_options(product_query.sort),
        pagination: Pagination::new(&listing, &base),
        return_to: base,
    })
}
