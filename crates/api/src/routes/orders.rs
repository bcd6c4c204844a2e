//! Order creation and read-only order queries.

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use common::OrderId;
use domain::{CreateOrderRequest, OrderReceipt, OrderStatus};
use mediator::{NotificationGateway, OrderMediator};
use order_store::OrderRepository;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;

/// Shared application state accessible from all handlers.
pub struct AppState<R, N>
where
    R: OrderRepository,
    N: NotificationGateway,
{
    pub mediator: Arc<OrderMediator<R, N>>,
}

#[derive(Debug, Deserialize)]
pub struct CountQuery {
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct OrderStatusResponse {
    pub order_id: OrderId,
    pub status: OrderStatus,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct CountResponse {
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub total_orders: u64,
}

/// POST /orders: runs the order pipeline and waits for its single outcome.
///
/// Bodies that do not decode are answered as validation failures without
/// reaching the pipeline.
#[tracing::instrument(
    skip(state, payload),
    fields(order_id = tracing::field::Empty, request_id = %Uuid::new_v4())
)]
pub async fn create<R, N>(
    State(state): State<Arc<AppState<R, N>>>,
    payload: Result<Json<CreateOrderRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<OrderReceipt>), ApiError>
where
    R: OrderRepository + 'static,
    N: NotificationGateway + 'static,
{
    metrics::counter!("orders_received_total").increment(1);

    let req = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => {
            tracing::warn!(error = %rejection.body_text(), "undecodable order request");
            metrics::counter!("orders_failed_total", "kind" => "validation").increment(1);
            return Err(rejection.into());
        }
    };
    tracing::Span::current().record("order_id", req.order_id.as_str());

    let receipt = state.mediator.submit(req).wait().await?;
    Ok((StatusCode::CREATED, Json(receipt)))
}

/// GET /orders/{order_id}/status
#[tracing::instrument(skip(state))]
pub async fn status<R, N>(
    State(state): State<Arc<AppState<R, N>>>,
    Path(order_id): Path<String>,
) -> Result<Json<OrderStatusResponse>, ApiError>
where
    R: OrderRepository + 'static,
    N: NotificationGateway + 'static,
{
    let order_id = OrderId::new(order_id);
    let order = state
        .mediator
        .repository()
        .find_by_id(&order_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Order {order_id} not found")))?;

    Ok(Json(OrderStatusResponse {
        order_id: order.order_id().clone(),
        status: order.status(),
        timestamp: order.created_at(),
    }))
}

/// GET /orders/count?start_date=..&end_date=.. (inclusive, RFC 3339)
#[tracing::instrument(skip(state, query))]
pub async fn count<R, N>(
    State(state): State<Arc<AppState<R, N>>>,
    query: Result<Query<CountQuery>, QueryRejection>,
) -> Result<Json<CountResponse>, ApiError>
where
    R: OrderRepository + 'static,
    N: NotificationGateway + 'static,
{
    let Query(range) = query?;
    if range.start_date > range.end_date {
        return Err(ApiError::BadRequest(
            "start_date must not be after end_date".to_string(),
        ));
    }

    let total_orders = state
        .mediator
        .repository()
        .count_between(range.start_date, range.end_date)
        .await?;

    Ok(Json(CountResponse {
        start_date: range.start_date,
        end_date: range.end_date,
        total_orders,
    }))
}
