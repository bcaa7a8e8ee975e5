//! HTTP handlers for Products API

use axum::{
    body::Body,
    extract::{rejection::JsonRejection, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use axum_helpers::{
    errors::responses::{
        BadRequestUuidResponse, BadRequestValidationResponse, InternalServerErrorResponse,
        NotFoundResponse, UnauthorizedResponse,
    },
    AppError, AuthUser, UuidPath, ValidatedJson,
};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::error::ProductResult;
use crate::export::CSV_FILENAME;
use crate::models::{
    CreateProduct, CreateReview, MessageResponse, Product, ProductPage, ProductQuery, Review,
    UpdateProduct,
};
use crate::repository::ProductRepository;
use crate::service::ProductService;

/// OpenAPI documentation for Products API
#[derive(OpenApi)]
#[openapi(
    paths(
        list_products,
        create_product,
        list_my_products,
        export_products,
        get_product,
        update_product,
        delete_product,
        create_review,
    ),
    components(
        schemas(
            Product, Review, CreateProduct, UpdateProduct, CreateReview,
            ProductPage, MessageResponse
        ),
        responses(
            NotFoundResponse,
            BadRequestValidationResponse,
            BadRequestUuidResponse,
            UnauthorizedResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = "Products", description = "Catalog, reviews and export")
    )
)]
pub struct ApiDoc;

/// Create the products router with all HTTP endpoints
pub fn router<R: ProductRepository + 'static>(service: ProductService<R>) -> Router {
    let shared_service = Arc::new(service);

    Router::new()
        .route("/", get(list_products).post(create_product))
        .route("/myproducts", get(list_my_products))
        .route("/export", get(export_products))
        .route("/export/csv", get(export_products))
        .route(
            "/{id}",
            get(get_product).put(update_product).delete(delete_product),
        )
        .route("/{id}/reviews", post(create_review))
        .with_state(shared_service)
}

/// One page of the catalog, optionally filtered
#[utoipa::path(
    get,
    path = "",
    tag = "Products",
    params(ProductQuery),
    responses(
        (status = 200, description = "Page of products", body = ProductPage),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_products<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    Query(query): Query<ProductQuery>,
) -> ProductResult<Json<ProductPage>> {
    let page = service.list_products(query).await?;
    Ok(Json(page))
}

/// Create a new product owned by the caller
#[utoipa::path(
    post,
    path = "",
    tag = "Products",
    request_body = CreateProduct,
    responses(
        (status = 201, description = "Product created successfully", body = Product),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 500, response = InternalServerErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
async fn create_product<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    user: AuthUser,
    ValidatedJson(input): ValidatedJson<CreateProduct>,
) -> ProductResult<impl IntoResponse> {
    let product = service.create_product(input, user.id).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// Products owned by the caller
#[utoipa::path(
    get,
    path = "/myproducts",
    tag = "Products",
    responses(
        (status = 200, description = "Caller's products", body = Vec<Product>),
        (status = 401, response = UnauthorizedResponse),
        (status = 500, response = InternalServerErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
async fn list_my_products<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    user: AuthUser,
) -> ProductResult<Json<Vec<Product>>> {
    Ok(Json(service.list_my_products(user.id).await?))
}

/// Whole catalog as a CSV attachment
///
/// Also served at `/export/csv`.
#[utoipa::path(
    get,
    path = "/export",
    tag = "Products",
    responses(
        (status = 200, description = "CSV file", content_type = "text/csv", body = String),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn export_products<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
) -> ProductResult<impl IntoResponse> {
    let lines = service.export_csv().await?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename={CSV_FILENAME}"),
            ),
        ],
        Body::from_stream(lines),
    ))
}

/// Get a product by ID
#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Products",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Product found", body = Product),
        (status = 400, response = BadRequestUuidResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_product<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    UuidPath(id): UuidPath,
) -> ProductResult<Json<Product>> {
    let product = service.get_product(id).await?;
    Ok(Json(product))
}

/// Update a product; fields left out of the body are unchanged
#[utoipa::path(
    put,
    path = "/{id}",
    tag = "Products",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    request_body = UpdateProduct,
    responses(
        (status = 200, description = "Product updated successfully", body = Product),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
async fn update_product<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    _user: AuthUser,
    UuidPath(id): UuidPath,
    ValidatedJson(input): ValidatedJson<UpdateProduct>,
) -> ProductResult<Json<Product>> {
    let product = service.update_product(id, input).await?;
    Ok(Json(product))
}

/// Delete a product
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Products",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Product removed", body = MessageResponse),
        (status = 400, response = BadRequestUuidResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
async fn delete_product<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    _user: AuthUser,
    UuidPath(id): UuidPath,
) -> ProductResult<Json<MessageResponse>> {
    service.delete_product(id).await?;
    Ok(Json(MessageResponse {
        message: "Product removed".to_string(),
    }))
}

/// Review a product, once per user
///
/// The body is read leniently so an unknown product is reported as 404
/// before the rating and comment are checked.
#[utoipa::path(
    post,
    path = "/{id}/reviews",
    tag = "Products",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    request_body = CreateReview,
    responses(
        (status = 201, description = "Review added", body = MessageResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
async fn create_review<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    user: AuthUser,
    UuidPath(id): UuidPath,
    payload: Result<Json<CreateReview>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(input) = payload?;
    service.add_review(id, &user, input).await?;
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: "Review added".to_string(),
        }),
    ))
}
