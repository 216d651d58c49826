//! Product catalogue endpoints, bearer token required

use actix_web::{http::header, web, HttpResponse};
use sf_core::DomainError;
use validator::Validate;

use crate::app::AppState;
use crate::dto::ProductRequest;
use crate::handlers::ApiResult;
use crate::middleware::JwtAuth;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/products")
            .wrap(JwtAuth)
            .route("", web::get().to(list_active))
            .route("", web::post().to(create))
            .route("/category/{category_id}", web::get().to(by_category))
            .route("/search/{term}", web::get().to(search))
            .route("/sku/{sku}", web::get().to(by_sku))
            .route("/{id}", web::get().to(get))
            .route("/{id}", web::put().to(update))
            .route("/{id}", web::delete().to(delete)),
    );
}

fn product_not_found(id: i64) -> DomainError {
    DomainError::not_found(format!("Product {}", id))
}

/// Handler for GET /api/products
pub async fn list_active(state: web::Data<AppState>) -> ApiResult<HttpResponse> {
    let mut uow = state.unit().await?;
    let products = uow.products().get_active_products().await?;
    Ok(HttpResponse::Ok().json(products))
}

/// Handler for GET /api/products/{id}
pub async fn get(state: web::Data<AppState>, path: web::Path<i64>) -> ApiResult<HttpResponse> {
    let id = path.into_inner();
    let mut uow = state.unit().await?;
    let product = uow
        .products()
        .get_by_id(id)
        .await?
        .ok_or_else(|| product_not_found(id))?;
    Ok(HttpResponse::Ok().json(product))
}

/// Handler for GET /api/products/category/{category_id}
pub async fn by_category(
    state: web::Data<AppState>,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    let mut uow = state.unit().await?;
    let products = uow.products().get_by_category(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(products))
}

/// Handler for GET /api/products/search/{term}
///
/// Case-insensitive substring match on name, description or SKU.
pub async fn search(state: web::Data<AppState>, path: web::Path<String>) -> ApiResult<HttpResponse> {
    let mut uow = state.unit().await?;
    let products = uow.products().search(&path).await?;
    Ok(HttpResponse::Ok().json(products))
}

/// Handler for GET /api/products/sku/{sku}
pub async fn by_sku(state: web::Data<AppState>, path: web::Path<String>) -> ApiResult<HttpResponse> {
    let sku = path.into_inner();
    let mut uow = state.unit().await?;
    let product = uow
        .products()
        .get_by_sku(&sku)
        .await?
        .ok_or_else(|| DomainError::not_found(format!("Product with SKU {}", sku)))?;
    Ok(HttpResponse::Ok().json(product))
}

/// Handler for POST /api/products
///
/// ## Errors
/// - 400 Bad Request: invalid fields
/// - 409 Conflict: duplicate SKU or unknown category
pub async fn create(
    state: web::Data<AppState>,
    request: web::Json<ProductRequest>,
) -> ApiResult<HttpResponse> {
    let request = request.into_inner();
    request.validate()?;

    let mut uow = state.unit().await?;
    let staged = uow.products().add(request.into_product())?;
    uow.save_changes().await?;

    let product = uow
        .persisted(&staged)
        .ok_or_else(|| DomainError::Internal {
            message: "Saved product has no id".to_string(),
        })?;
    uow.dispose().await?;

    log::info!("Created product {} ({})", product.id, product.name);
    Ok(HttpResponse::Created()
        .insert_header((header::LOCATION, format!("/api/products/{}", product.id)))
        .json(product))
}

/// Handler for PUT /api/products/{id}
pub async fn update(
    state: web::Data<AppState>,
    path: web::Path<i64>,
    request: web::Json<ProductRequest>,
) -> ApiResult<HttpResponse> {
    let id = path.into_inner();
    let request = request.into_inner();
    request.validate()?;

    let mut uow = state.unit().await?;
    let mut product = uow
        .products()
        .get_by_id(id)
        .await?
        .ok_or_else(|| product_not_found(id))?
        .product;
    request.apply_to(&mut product);
    uow.products().update(product)?;
    uow.save_changes().await?;
    uow.dispose().await?;

    Ok(HttpResponse::NoContent().finish())
}

/// Handler for DELETE /api/products/{id}
pub async fn delete(state: web::Data<AppState>, path: web::Path<i64>) -> ApiResult<HttpResponse> {
    let id = path.into_inner();
    let mut uow = state.unit().await?;
    if !uow.products().delete(id).await? {
        return Err(product_not_found(id).into());
    }
    uow.save_changes().await?;
    uow.dispose().await?;

    Ok(HttpResponse::NoContent().finish())
}
