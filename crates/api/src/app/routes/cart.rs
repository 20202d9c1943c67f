use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
};
use chrono::Utc;

use quantii_core::{DomainError, DomainResult, ItemId};
use quantii_sales::{Cart, Checkout};

use crate::app::dto::{AddToCartRequest, CartView, CheckoutResponse, SetQuantityRequest};
use crate::app::errors::{ApiError, ApiResult};
use crate::app::extract::JsonBody;
use crate::app::services::AppServices;
use crate::context::SessionContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(get_cart).delete(clear_cart))
        .route("/items", post(add_item))
        .route("/items/:id", put(set_quantity).delete(remove_item))
        .route("/checkout", post(checkout))
}

pub async fn get_cart(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(session): Extension<SessionContext>,
) -> Json<CartView> {
    Json(CartView::from(&services.carts().snapshot(session.session_id())))
}

pub async fn clear_cart(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(session): Extension<SessionContext>,
) -> Json<CartView> {
    services.carts().update(session.session_id(), Cart::clear);
    Json(CartView::from(&Cart::new()))
}

/// POST /cart/items
///
/// Ring up one unit of an in-stock item.
pub async fn add_item(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(session): Extension<SessionContext>,
    JsonBody(body): JsonBody<AddToCartRequest>,
) -> ApiResult<Json<CartView>> {
    let item = services
        .inventory
        .get(body.item_id)
        .await?
        .ok_or(ApiError::NotFound("item"))?;

    let view = services.carts().with_cart(&session, |cart| -> DomainResult<CartView> {
        cart.add_item(&item)?;
        Ok(CartView::from(&*cart))
    })?;
    Ok(Json(view))
}

pub async fn set_quantity(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(session): Extension<SessionContext>,
    Path(id): Path<String>,
    JsonBody(body): JsonBody<SetQuantityRequest>,
) -> ApiResult<Json<CartView>> {
    let id: ItemId = id.parse()?;
    let view = services
        .carts()
        .update(session.session_id(), |cart| {
            cart.update_quantity(id, body.quantity).map(|()| CartView::from(&*cart))
        })
        .unwrap_or(Err(DomainError::NotFound))
        .map_err(|e| match e {
            DomainError::NotFound => ApiError::NotFound("cart line"),
            other => other.into(),
        })?;
    Ok(Json(view))
}

pub async fn remove_item(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(session): Extension<SessionContext>,
    Path(id): Path<String>,
) -> ApiResult<Json<CartView>> {
    let id: ItemId = id.parse()?;
    let view = services
        .carts()
        .update(session.session_id(), |cart| {
            cart.remove(id);
            CartView::from(&*cart)
        })
        .unwrap_or_else(|| CartView::from(&Cart::new()));
    Ok(Json(view))
}

/// POST /cart/checkout
///
/// Take the cart, record the sale, then take the sold units off stock.
pub async fn checkout(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(session): Extension<SessionContext>,
) -> ApiResult<impl IntoResponse> {
    // Until `complete`, any early return hands the cart back to the session.
    let pending = services.carts().begin_checkout(session.session_id())?;
    let inventory = services.inventory.get_all().await?;

    let checkout = Checkout::from_cart(pending.cart(), &inventory, Utc::now())?;
    let sold: Vec<(ItemId, u32)> = checkout
        .adjustments
        .iter()
        .map(|adjustment| (adjustment.item_id, units_sold(pending.cart(), adjustment.item_id)))
        .collect();

    let transaction = services.transactions.add(checkout.transaction).await?;
    pending.complete();

    for (item_id, sold) in sold {
        let Some(adjustment) = services.inventory.decrement_stock(item_id, sold).await? else {
            continue;
        };
        if adjustment.was_clamped(sold) {
            tracing::warn!(
                item_id = %item_id,
                on_hand = adjustment.previous_stock,
                sold,
                "sold more than on hand; stock clamped to zero"
            );
        }
    }

    let total = transaction.total;
    Ok((StatusCode::CREATED, Json(CheckoutResponse { transaction, total })))
}

fn units_sold(cart: &Cart, item_id: ItemId) -> u32 {
    cart.lines()
        .iter()
        .filter(|l| l.item_id == item_id)
        .map(|l| l.quantity)
        .sum()
}
