//! Account route handlers (require authentication).

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, State},
    response::IntoResponse,
};
use emporium_core::OrderId;
use tracing::instrument;

use crate::error::Result;
use crate::filters;
use crate::middleware::{PageContext, RequireAuth, Shopper};
use crate::models::CurrentUser;
use crate::state::AppState;
use crate::views::OrderView;

/// Orders shown on the account overview.
const RECENT_ORDERS: usize = 3;

/// Account overview template.
#[derive(Template, WebTemplate)]
#[template(path = "account/index.html")]
pub struct AccountIndexTemplate {
    pub page: PageContext,
    pub user: CurrentUser,
    pub recent_orders: Vec<OrderView>,
}

/// Order history template.
#[derive(Template, WebTemplate)]
#[template(path = "account/orders.html")]
pub struct OrdersTemplate {
    pub page: PageContext,
    pub orders: Vec<OrderView>,
}

/// Order detail template.
#[derive(Template, WebTemplate)]
#[template(path = "account/order.html")]
pub struct OrderTemplate {
    pub page: PageContext,
    pub order: OrderView,
}

/// Display the account overview.
#[instrument(skip(state, user, shopper))]
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    shopper: Shopper,
) -> Result<impl IntoResponse> {
    let orders = state
        .backend()
        .list_orders(&shopper.call_context())
        .await?;

    Ok(AccountIndexTemplate {
        page: shopper.page().await?,
        user,
        recent_orders: orders
            .iter()
            .take(RECENT_ORDERS)
            .map(|o| OrderView::new(o, shopper.currency))
            .collect(),
    })
}

/// Display the order history.
#[instrument(skip(state, shopper))]
pub async fn orders(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
    shopper: Shopper,
) -> Result<impl IntoResponse> {
    let orders = state
        .backend()
        .list_orders(&shopper.call_context())
        .await?;

    Ok(OrdersTemplate {
        page: shopper.page().await?,
        orders: orders
            .iter()
            .map(|o| OrderView::new(o, shopper.currency))
            .collect(),
    })
}

/// Display one order.
#[instrument(skip(state, shopper), fields(order_id = %id))]
pub async fn order(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
    shopper: Shopper,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let order = state
        .backend()
        .get_order(&shopper.call_context(), &OrderId::from(id))
        .await?;

    Ok(OrderTemplate {
        page: shopper.page().await?,
        order: OrderView::new(&order, shopper.currency),
    })
}
