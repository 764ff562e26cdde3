use crate::auth::CurrentUser;
use crate::error::ApiError;
use crate::extract::Path;
use crate::schemas::{AppState, MessageResponse};
use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
};
use model::entities::order::{self, OrderStatus, PizzaSize};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, ModelTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, trace, warn};
use utoipa::ToSchema;
use validator::Validate;

/// Request body for placing or editing an order
#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
#[schema(example = json!({"quantity": 9, "pizza_size": "SMALL"}))]
pub struct OrderRequest {
    /// Number of pizzas (at least 1)
    #[validate(range(min = 1, message = "quantity must be at least 1"))]
    pub quantity: i32,
    /// Pizza size (default: SMALL)
    #[serde(default)]
    pub pizza_size: PizzaSize,
}

/// Request body for moving an order to another status
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[schema(example = json!({"order_status": "IN_TRANSIT"}))]
pub struct OrderStatusRequest {
    /// New status (default: PENDING)
    #[serde(default)]
    pub order_status: OrderStatus,
}

/// Order response model
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OrderResponse {
    pub id: i32,
    pub quantity: i32,
    pub pizza_size: PizzaSize,
    pub order_status: OrderStatus,
    /// Owner of the order
    pub user_id: i32,
}

impl From<order::Model> for OrderResponse {
    fn from(model: order::Model) -> Self {
        Self {
            id: model.id,
            quantity: model.quantity,
            pizza_size: model.pizza_size,
            order_status: model.order_status,
            user_id: model.user_id,
        }
    }
}

/// Look up an order by ID among those owned by `user_id`
async fn find_own_order<C: ConnectionTrait>(
    conn: &C,
    user_id: i32,
    order_id: i32,
) -> Result<Option<order::Model>, DbErr> {
    order::Entity::find_by_id(order_id)
        .filter(order::Column::UserId.eq(user_id))
        .one(conn)
        .await
}

/// Place a new order
#[utoipa::path(
    post,
    path = "/orders/order",
    tag = "orders",
    security(("bearer_auth" = [])),
    request_body = OrderRequest,
    responses(
        (status = 201, description = "Order placed", body = OrderResponse),
        (status = 400, description = "Invalid quantity", body = ErrorResponse),
        (status = 401, description = "Invalid token", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, actor), fields(user_id = actor.id))]
pub async fn place_order(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Json(request): Json<OrderRequest>,
) -> Result<(StatusCode, Json<OrderResponse>), ApiError> {
    trace!("Entering place_order function");
    request.validate()?;

    let new_order = order::ActiveModel {
        quantity: Set(request.quantity),
        pizza_size: Set(request.pizza_size),
        order_status: Set(OrderStatus::Pending),
        user_id: Set(actor.id),
        ..Default::default()
    };

    trace!("Attempting to insert new order into database");
    let order_model = new_order.insert(&state.db).await?;

    info!(
        "Order {} placed by '{}': {} x {:?}",
        order_model.id, actor.username, order_model.quantity, order_model.pizza_size
    );
    Ok((StatusCode::CREATED, Json(OrderResponse::from(order_model))))
}

/// List every order in the system (staff only)
#[utoipa::path(
    get,
    path = "/orders/orders",
    tag = "orders",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All orders", body = Vec<OrderResponse>),
        (status = 401, description = "Invalid token", body = ErrorResponse),
        (status = 403, description = "Caller is not staff", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, actor), fields(user_id = actor.id))]
pub async fn list_all_orders(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
) -> Result<Json<Vec<OrderResponse>>, ApiError> {
    trace!("Entering list_all_orders function");

    if !actor.is_staff {
        warn!("User '{}' is not staff, refusing to list all orders", actor.username);
        return Err(ApiError::Forbidden("You are not a superuser".to_string()));
    }

    let orders = order::Entity::find()
        .order_by_asc(order::Column::Id)
        .all(&state.db)
        .await?;

    debug!("Retrieved {} orders from database", orders.len());
    Ok(Json(orders.into_iter().map(OrderResponse::from).collect()))
}

/// List the caller's own orders
#[utoipa::path(
    get,
    path = "/orders/user/orders",
    tag = "orders",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Orders placed by the caller", body = Vec<OrderResponse>),
        (status = 401, description = "Invalid token", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, actor), fields(user_id = actor.id))]
pub async fn list_own_orders(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
) -> Result<Json<Vec<OrderResponse>>, ApiError> {
    trace!("Entering list_own_orders function");

    let orders = actor
        .find_related(order::Entity)
        .order_by_asc(order::Column::Id)
        .all(&state.db)
        .await?;

    debug!("User '{}' has {} orders", actor.username, orders.len());
    Ok(Json(orders.into_iter().map(OrderResponse::from).collect()))
}

/// Get one of the caller's orders by ID
#[utoipa::path(
    get,
    path = "/orders/user/order/{id}",
    tag = "orders",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Order ID"),
    ),
    responses(
        (status = 200, description = "The order", body = OrderResponse),
        (status = 401, description = "Invalid token", body = ErrorResponse),
        (status = 404, description = "No such order among the caller's orders", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, actor), fields(user_id = actor.id))]
pub async fn get_own_order(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Path(id): Path<i32>,
) -> Result<Json<OrderResponse>, ApiError> {
    trace!("Entering get_own_order function for order_id: {}", id);

    match find_own_order(&state.db, actor.id, id).await? {
        Some(order_model) => Ok(Json(OrderResponse::from(order_model))),
        None => {
            warn!("Order {} not found among orders of '{}'", id, actor.username);
            Err(ApiError::NotFound("Order not found".to_string()))
        }
    }
}

/// Change quantity and size of one of the caller's pending orders
#[utoipa::path(
    put,
    path = "/orders/order/update/{id}",
    tag = "orders",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Order ID"),
    ),
    request_body = OrderRequest,
    responses(
        (status = 200, description = "Order updated", body = OrderResponse),
        (status = 400, description = "Invalid quantity", body = ErrorResponse),
        (status = 401, description = "Invalid token", body = ErrorResponse),
        (status = 403, description = "Order is no longer pending", body = ErrorResponse),
        (status = 404, description = "No such order among the caller's orders", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, actor), fields(user_id = actor.id))]
pub async fn update_order(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Path(id): Path<i32>,
    Json(request): Json<OrderRequest>,
) -> Result<Json<OrderResponse>, ApiError> {
    trace!("Entering update_order function for order_id: {}", id);

    let txn = state.db.begin().await?;

    let existing_order = find_own_order(&txn, actor.id, id).await?.ok_or_else(|| {
        warn!("Order {} not found among orders of '{}' for update", id, actor.username);
        ApiError::NotFound("Order with such id is not found".to_string())
    })?;

    if !existing_order.is_pending() {
        warn!(
            "Order {} is {:?}, refusing owner update",
            id, existing_order.order_status
        );
        return Err(ApiError::Forbidden(
            "Order details cannot be changed once the order is no longer pending".to_string(),
        ));
    }

    request.validate()?;

    let mut order_active: order::ActiveModel = existing_order.into();
    order_active.quantity = Set(request.quantity);
    order_active.pizza_size = Set(request.pizza_size);

    trace!("Attempting to update order in database");
    let updated_order = order_active.update(&txn).await?;
    txn.commit().await?;

    info!(
        "Order {} updated: {} x {:?}",
        updated_order.id, updated_order.quantity, updated_order.pizza_size
    );
    Ok(Json(OrderResponse::from(updated_order)))
}

/// Move an order to another status (staff only)
#[utoipa::path(
    patch,
    path = "/orders/order/update/{id}",
    tag = "orders",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Order ID"),
    ),
    request_body = OrderStatusRequest,
    responses(
        (status = 200, description = "Order status updated", body = OrderResponse),
        (status = 401, description = "Invalid token", body = ErrorResponse),
        (status = 403, description = "Caller is not staff", body = ErrorResponse),
        (status = 404, description = "Order not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, actor), fields(user_id = actor.id))]
pub async fn update_order_status(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Path(id): Path<i32>,
    Json(request): Json<OrderStatusRequest>,
) -> Result<Json<OrderResponse>, ApiError> {
    trace!("Entering update_order_status function for order_id: {}", id);

    if !actor.is_staff {
        warn!("User '{}' is not staff, refusing status change", actor.username);
        return Err(ApiError::Forbidden("Not super user".to_string()));
    }

    let txn = state.db.begin().await?;

    let existing_order = order::Entity::find_by_id(id).one(&txn).await?.ok_or_else(|| {
        warn!("Order {} not found for status change", id);
        ApiError::NotFound("Order not found".to_string())
    })?;

    let previous_status = existing_order.order_status;
    let mut order_active: order::ActiveModel = existing_order.into();
    order_active.order_status = Set(request.order_status);

    let updated_order = order_active.update(&txn).await?;
    txn.commit().await?;

    info!(
        "Order {} moved from {:?} to {:?} by '{}'",
        updated_order.id, previous_status, updated_order.order_status, actor.username
    );
    Ok(Json(OrderResponse::from(updated_order)))
}

/// Cancel one of the caller's pending orders
#[utoipa::path(
    delete,
    path = "/orders/order/delete/{id}",
    tag = "orders",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Order ID"),
    ),
    responses(
        (status = 200, description = "Order deleted", body = MessageResponse),
        (status = 401, description = "Invalid token", body = ErrorResponse),
        (status = 403, description = "Order is no longer pending", body = ErrorResponse),
        (status = 404, description = "No such order among the caller's orders", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, actor), fields(user_id = actor.id))]
pub async fn delete_order(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Path(id): Path<i32>,
) -> Result<Json<MessageResponse>, ApiError> {
    trace!("Entering delete_order function for order_id: {}", id);

    let txn = state.db.begin().await?;

    let existing_order = find_own_order(&txn, actor.id, id).await?.ok_or_else(|| {
        warn!("Order {} not found among orders of '{}' for deletion", id, actor.username);
        ApiError::NotFound("Order not found".to_string())
    })?;

    if !existing_order.is_pending() {
        warn!("Order {} is {:?}, refusing deletion", id, existing_order.order_status);
        return Err(ApiError::Forbidden("Order cannot be deleted".to_string()));
    }

    let delete_result = order::Entity::delete_by_id(id).exec(&txn).await?;
    txn.commit().await?;

    debug!("Delete operation completed. Rows affected: {}", delete_result.rows_affected);
    info!("Order {} deleted by '{}'", id, actor.username);
    Ok(Json(MessageResponse {
        message: "Order deleted successfully".to_string(),
    }))
}
