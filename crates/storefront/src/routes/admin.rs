//! Catalog administration (admin role only).
//!
//! Forms that fail validation or are refused by the backend render again
//! with the submitted values and an error banner. Deletes report through a
//! toast.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use emporium_core::{
    CategoryDraft, CategoryId, CurrencyCode, Price, Product, ProductDraft, ProductId,
    ProductQuery, SortOrder,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::instrument;

use super::toast_and_redirect;
use crate::error::{Result, add_breadcrumb};
use crate::filters;
use crate::middleware::{PageContext, RequireAdmin, Shopper};
use crate::models::Toast;
use crate::services::ServiceError;
use crate::state::AppState;
use crate::views::{CategoryView, Pagination};

/// Rows per admin product page.
const ADMIN_PAGE_SIZE: u32 = 20;

// =============================================================================
// Views
// =============================================================================

/// Product table row.
#[derive(Debug, Clone)]
pub struct ProductRow {
    pub id: String,
    pub title: String,
    pub price: String,
    pub sale_price: Option<String>,
    pub stock: u32,
    pub category: String,
}

impl ProductRow {
    fn new(product: &Product, currency: CurrencyCode) -> Self {
        let money = |amount: Decimal| Price::new(amount, currency).display();
        Self {
            id: product.id.to_string(),
            title: product.title.clone(),
            price: money(product.price),
            sale_price: product.sale_price.map(money),
            stock: product.stock,
            category: product
                .category
                .as_ref()
                .map(|c| c.name.clone())
                .unwrap_or_default(),
        }
    }
}

/// Page query for the product table.
#[derive(Debug, Deserialize)]
pub struct AdminPageQuery {
    pub page: Option<u32>,
}

// =============================================================================
// Templates
// =============================================================================

/// Product table template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/products.html")]
pub struct AdminProductsTemplate {
    pub page: PageContext,
    pub products: Vec<ProductRow>,
    pub pagination: Pagination,
}

/// Product create/edit form template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/product_form.html")]
pub struct ProductFormTemplate {
    pub page: PageContext,
    pub heading: &'static str,
    pub action: String,
    pub draft: ProductDraft,
    pub categories: Vec<CategoryView>,
    pub error: Option<String>,
}

/// Category table and new-category form template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/categories.html")]
pub struct AdminCategoriesTemplate {
    pub page: PageContext,
    pub categories: Vec<CategoryView>,
    pub draft: CategoryDraft,
    pub error: Option<String>,
}

/// Category edit form template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/category_form.html")]
pub struct CategoryFormTemplate {
    pub page: PageContext,
    pub action: String,
    pub draft: CategoryDraft,
    pub error: Option<String>,
}

// =============================================================================
// Helpers
// =============================================================================

/// Message for a failed form submission, or the error to propagate when
/// the admin's token was refused.
fn form_error(err: ServiceError) -> Result<String> {
    if err.is_unauthorized() {
        return Err(err.into());
    }
    if let ServiceError::Backend(backend) = &err
        && backend.is_server_side()
    {
        let event_id = sentry::capture_error(&err);
        tracing::error!(error = %err, sentry_event_id = %event_id, "Admin backend call failed");
    }
    Ok(err.user_message())
}

async fn category_options(state: &AppState, shopper: &Shopper) -> Vec<CategoryView> {
    match state
        .backend()
        .list_categories(&shopper.call_context())
        .await
    {
        Ok(categories) => categories.iter().map(CategoryView::from).collect(),
        Err(err) => {
            tracing::warn!(error = %err, "Category options unavailable");
            Vec::new()
        }
    }
}

async fn render_product_form(
    state: &AppState,
    shopper: &Shopper,
    heading: &'static str,
    action: String,
    draft: ProductDraft,
    error: Option<String>,
) -> Result<Response> {
    let status = if error.is_some() {
        StatusCode::UNPROCESSABLE_ENTITY
    } else {
        StatusCode::OK
    };
    let template = ProductFormTemplate {
        page: shopper.page().await?,
        heading,
        action,
        draft,
        categories: category_options(state, shopper).await,
        error,
    };
    Ok((status, template).into_response())
}

// =============================================================================
// Products
// =============================================================================

/// Send `/admin` to the product table.
pub async fn index(RequireAdmin(_admin): RequireAdmin) -> Redirect {
    Redirect::to("/admin/products")
}

/// Display the product table.
#[instrument(skip(state, shopper))]
pub async fn products(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    shopper: Shopper,
    Query(query): Query<AdminPageQuery>,
) -> Result<impl IntoResponse> {
    let listing = state
        .backend()
        .list_products(
            &shopper.call_context(),
            &ProductQuery {
                page: query.page.unwrap_or(1).max(1),
                limit: ADMIN_PAGE_SIZE,
                sort: SortOrder::Newest,
                ..ProductQuery::default()
            },
        )
        .await?;

    Ok(AdminProductsTemplate {
        page: shopper.page().await?,
        products: listing
            .items
            .iter()
            .map(|p| ProductRow::new(p, shopper.currency))
            .collect(),
        pagination: Pagination::new(&listing, "/admin/products"),
    })
}

/// Display an empty product form.
#[instrument(skip(state, shopper))]
pub async fn new_product(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    shopper: Shopper,
) -> Result<Response> {
    render_product_form(
        &state,
        &shopper,
        "New product",
        "/admin/products".to_string(),
        ProductDraft::default(),
        None,
    )
    .await
}

/// Create a product.
#[instrument(skip(state, shopper, draft))]
pub async fn create_product(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    shopper: Shopper,
    Form(draft): Form<ProductDraft>,
) -> Result<Response> {
    let created = match draft.validate() {
        Ok(input) => state
            .backend()
            .create_product(&shopper.call_context(), &input)
            .await
            .map_err(ServiceError::from),
        Err(err) => Err(err.into()),
    };

    match created {
        Ok(product) => {
            add_breadcrumb("admin", "Product created", &[("product_id", product.id.as_str())]);
            tracing::info!(product_id = %product.id, admin_id = %admin.id, "Product created");
            Toast::success(format!("Created {}", product.title))
                .push(&shopper.session)
                .await?;
            Ok(Redirect::to("/admin/products").into_response())
        }
        Err(err) => {
            let message = form_error(err)?;
            render_product_form(
                &state,
                &shopper,
                "New product",
                "/admin/products".to_string(),
                draft,
                Some(message),
            )
            .await
        }
    }
}

/// Display the edit form for a product.
#[instrument(skip(state, shopper), fields(product_id = %id))]
pub async fn edit_product(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    shopper: Shopper,
    Path(id): Path<String>,
) -> Result<Response> {
    let product = state
        .backend()
        .get_product(&shopper.call_context(), &ProductId::from(id.as_str()))
        .await?;

    render_product_form(
        &state,
        &shopper,
        "Edit product",
        format!("/admin/products/{}", urlencoding::encode(&id)),
        ProductDraft::from_product(&product),
        None,
    )
    .await
}

/// Update a product.
#[instrument(skip(state, shopper, draft), fields(product_id = %id))]
pub async fn update_product(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    shopper: Shopper,
    Path(id): Path<String>,
    Form(draft): Form<ProductDraft>,
) -> Result<Response> {
    let product_id = ProductId::from(id.as_str());
    let updated = match draft.validate() {
        Ok(input) => state
            .backend()
            .update_product(&shopper.call_context(), &product_id, &input)
            .await
            .map_err(ServiceError::from),
        Err(err) => Err(err.into()),
    };

    match updated {
        Ok(product) => {
            tracing::info!(product_id = %product.id, admin_id = %admin.id, "Product updated");
            Toast::success(format!("Saved {}", product.title))
                .push(&shopper.session)
                .await?;
            Ok(Redirect::to("/admin/products").into_response())
        }
        Err(err) => {
            let message = form_error(err)?;
            render_product_form(
                &state,
                &shopper,
                "Edit product",
                format!("/admin/products/{}", urlencoding::encode(&id)),
                draft,
                Some(message),
            )
            .await
        }
    }
}

/// Delete a product.
#[instrument(skip(state, shopper), fields(product_id = %id))]
pub async fn delete_product(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    shopper: Shopper,
    Path(id): Path<String>,
) -> Result<Response> {
    let result = state
        .backend()
        .delete_product(&shopper.call_context(), &ProductId::from(id.as_str()))
        .await
        .map_err(ServiceError::from);
    if result.is_ok() {
        tracing::info!(product_id = %id, admin_id = %admin.id, "Product deleted");
    }
    toast_and_redirect(
        &shopper,
        result,
        Some(Toast::success("Product deleted")),
        "/admin/products",
    )
    .await
}

// =============================================================================
// Categories
// =============================================================================

/// Display the category table with a blank create form.
#[instrument(skip(state, shopper))]
pub async fn categories(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    shopper: Shopper,
) -> Result<impl IntoResponse> {
    let categories = state
        .backend()
        .list_categories(&shopper.call_context())
        .await?;

    Ok(AdminCategoriesTemplate {
        page: shopper.page().await?,
        categories: categories.iter().map(CategoryView::from).collect(),
        draft: CategoryDraft::default(),
        error: None,
    })
}

/// Create a category.
#[instrument(skip(state, shopper, draft))]
pub async fn create_category(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    shopper: Shopper,
    Form(draft): Form<CategoryDraft>,
) -> Result<Response> {
    let created = match draft.validate() {
        Ok(input) => state
            .backend()
            .create_category(&shopper.call_context(), &input)
            .await
            .map_err(ServiceError::from),
        Err(err) => Err(err.into()),
    };

    match created {
        Ok(category) => {
            tracing::info!(category_id = %category.id, admin_id = %admin.id, "Category created");
            Toast::success(format!("Created {}", category.name))
                .push(&shopper.session)
                .await?;
            Ok(Redirect::to("/admin/categories").into_response())
        }
        Err(err) => {
            let message = form_error(err)?;
            let categories = category_options(&state, &shopper).await;
            let template = AdminCategoriesTemplate {
                page: shopper.page().await?,
                categories,
                draft,
                error: Some(message),
            };
            Ok((StatusCode::UNPROCESSABLE_ENTITY, template).into_response())
        }
    }
}

/// Display the edit form for a category.
#[instrument(skip(state, shopper), fields(category_id = %id))]
pub async fn edit_category(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    shopper: Shopper,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let category = state
        .backend()
        .get_category(&shopper.call_context(), &CategoryId::from(id.as_str()))
        .await?;

    Ok(CategoryFormTemplate {
        page: shopper.page().await?,
        action: format!("/admin/categories/{}", urlencoding::encode(&id)),
        draft: CategoryDraft::from_category(&category),
        error: None,
    })
}

/// Update a category.
#[instrument(skip(state, shopper, draft), fields(category_id = %id))]
pub async fn update_category(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    shopper: Shopper,
    Path(id): Path<String>,
    Form(draft): Form<CategoryDraft>,
) -> Result<Response> {
    let category_id = CategoryId::from(id.as_str());
    let updated = match draft.validate() {
        Ok(input) => state
            .backend()
            .update_category(&shopper.call_context(), &category_id, &input)
            .await
            .map_err(ServiceError::from),
        Err(err) => Err(err.into()),
    };

    match updated {
        Ok(category) => {
            tracing::info!(category_id = %category.id, admin_id = %admin.id, "Category updated");
            Toast::success(format!("Saved {}", category.name))
                .push(&shopper.session)
                .await?;
            Ok(Redirect::to("/admin/categories").into_response())
        }
        Err(err) => {
            let message = form_error(err)?;
            let template = CategoryFormTemplate {
                page: shopper.page().await?,
                action: format!("/admin/categories/{}", urlencoding::encode(&id)),
                draft,
                error: Some(message),
            };
            Ok((StatusCode::UNPROCESSABLE_ENTITY, template).into_response())
        }
    }
}

/// Delete a category.
#[instrument(skip(state, shopper), fields(category_id = %id))]
pub async fn delete_category(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    shopper: Shopper,
    Path(id): Path<String>,
) -> Result<Response> {
    let result = state
        .backend()
        .delete_category(&shopper.call_context(), &CategoryId::from(id.as_str()))
        .await
        .map_err(ServiceError::from);
    if result.is_ok() {
        tracing::info!(category_id = %id, admin_id = %admin.id, "Category deleted");
    }
    toast_and_redirect(
        &shopper,
        result,
        Some(Toast::success("Category deleted")),
        "/admin/categories",
    )
    .await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use emporium_core::CategoryRef;

    use super::*;
    use crate::error::AppError;

    #[test]
    fn test_product_row_formats_prices() {
        let product = Product {
            id: ProductId::new("p1"),
            title: "Desk".to_string(),
            description: String::new(),
            price: Decimal::new(12000, 2),
            sale_price: Some(Decimal::new(9900, 2)),
            discount_percentage: None,
            stock: 4,
            rating: 0.0,
            category: Some(CategoryRef {
                id: CategoryId::new("c1"),
                name: "Office".to_string(),
            }),
            images: Vec::new(),
        };
        let row = ProductRow::new(&product, CurrencyCode::USD);
        assert_eq!(row.price, "$120.00");
        assert_eq!(row.sale_price.as_deref(), Some("$99.00"));
        assert_eq!(row.category, "Office");
    }

    #[test]
    fn test_form_error_propagates_refused_token() {
        let err = ServiceError::Backend(crate::backend::BackendError::Unauthorized);
        assert!(matches!(form_error(err), Err(AppError::SessionExpired)));

        let err = ServiceError::Invalid("Name is required".to_string());
        assert_eq!(form_error(err).unwrap(), "Name is required");
    }
}
