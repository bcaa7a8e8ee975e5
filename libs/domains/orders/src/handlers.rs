//! HTTP handlers for the orders API; every route needs a signed-in caller

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use axum_helpers::{
    AppError, AuthUser, UuidPath,
    errors::responses::{
        BadRequestUuidResponse, BadRequestValidationResponse, ForbiddenResponse,
        InternalServerErrorResponse, NotFoundResponse, UnauthorizedResponse,
    },
};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::error::OrderResult;
use crate::models::{
    CreateOrder, Customer, Order, OrderDetails, OrderItem, OrderStatus, ShippingAddress,
};
use crate::repository::OrderRepository;
use crate::service::OrderService;

#[derive(OpenApi)]
#[openapi(
    paths(create_order, list_my_orders, get_order),
    components(
        schemas(
            CreateOrder,
            Customer,
            Order,
            OrderDetails,
            OrderItem,
            OrderStatus,
            ShippingAddress
        ),
        responses(
            BadRequestValidationResponse,
            BadRequestUuidResponse,
            UnauthorizedResponse,
            ForbiddenResponse,
            NotFoundResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = "Orders", description = "Checkout and order history")
    )
)]
pub struct ApiDoc;

pub fn router<R: OrderRepository + 'static>(service: OrderService<R>) -> Router {
    let shared_service = Arc::new(service);

    Router::new()
        .route("/", post(create_order))
        .route("/myorders", get(list_my_orders))
        .route("/{id}", get(get_order))
        .with_state(shared_service)
}

/// Place an order
///
/// The body is read leniently so the checkout rules decide which message
/// an incomplete order gets.
#[utoipa::path(
    post,
    path = "",
    tag = "Orders",
    request_body = CreateOrder,
    responses(
        (status = 201, description = "Order placed", body = Order),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 500, response = InternalServerErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
async fn create_order<R: OrderRepository>(
    State(service): State<Arc<OrderService<R>>>,
    user: AuthUser,
    payload: Result<Json<CreateOrder>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(input) = payload?;
    let order = service.create_order(input, user.id).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// Caller's orders, newest first
#[utoipa::path(
    get,
    path = "/myorders",
    tag = "Orders",
    responses(
        (status = 200, description = "Caller's orders", body = Vec<Order>),
        (status = 401, response = UnauthorizedResponse),
        (status = 500, response = InternalServerErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
async fn list_my_orders<R: OrderRepository>(
    State(service): State<Arc<OrderService<R>>>,
    user: AuthUser,
) -> OrderResult<Json<Vec<Order>>> {
    Ok(Json(service.list_my_orders(user.id).await?))
}

/// Get one order; owner or admin only
#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Orders",
    params(
        ("id" = Uuid, Path, description = "Order ID")
    ),
    responses(
        (status = 200, description = "Order with its owner's name and email", body = OrderDetails),
        (status = 400, response = BadRequestUuidResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
async fn get_order<R: OrderRepository>(
    State(service): State<Arc<OrderService<R>>>,
    user: AuthUser,
    UuidPath(id): UuidPath,
) -> OrderResult<Json<OrderDetails>> {
    Ok(Json(service.get_order(id, &user).await?))
}
