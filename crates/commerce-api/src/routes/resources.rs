//! 상품/주문/평점 CRUD endpoint.
//!
//! 세 리소스는 같은 형태의 라우트를 가지므로 [`Resource`] 트레이트로 묶어
//! 하나의 제네릭 라우터로 제공합니다. 주문과 평점의 `user_id`는 요청 본문이 아니라
//! 인증된 주체에서 가져옵니다.

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use commerce_core::{Document, Order, Product, Rating};
use rust_decimal::Decimal;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use super::{parse_id, MessageResponse};
use crate::auth::{Authenticated, AuthenticatedIdentity};
use crate::error::{ApiResult, AppError};
use crate::extract::{AppJson, AppPath};
use crate::repository::DocumentRepository;
use crate::state::AppState;

/// 제네릭 CRUD 라우터로 노출되는 문서.
pub trait Resource: Document + Serialize {
    /// 생성 요청
    type Create: DeserializeOwned + Validate + Send + 'static;
    /// 부분 수정 요청
    type Update: DeserializeOwned + Validate + Send + 'static;

    /// 컬렉션 경로 (예: "/products")
    const PATH: &'static str;
    /// 메시지용 이름 (예: "Product")
    const LABEL: &'static str;

    fn repository(state: &AppState) -> &DocumentRepository<Self>;

    fn create(
        input: Self::Create,
        identity: &AuthenticatedIdentity,
        now: DateTime<Utc>,
    ) -> ApiResult<Self>;

    /// 수정 요청 적용 전 추가 검증.
    fn check_update(_update: &Self::Update) -> ApiResult<()> {
        Ok(())
    }

    fn apply(&mut self, update: Self::Update);

    fn not_found() -> AppError {
        AppError::NotFound(format!("No {} found", Self::KIND))
    }
}

fn ensure_price(price: Decimal) -> ApiResult<()> {
    if price.is_sign_negative() {
        return Err(AppError::validation("price must not be negative"));
    }
    Ok(())
}

// ==================== Product ====================

#[derive(Debug, Deserialize, Validate)]
pub struct CreateProductRequest {
    #[validate(length(min = 1, message = "name should not be empty"))]
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    #[validate(length(min = 1, message = "category should not be empty"))]
    pub category: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProductRequest {
    #[validate(length(min = 1, message = "name should not be empty"))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    #[validate(length(min = 1, message = "category should not be empty"))]
    pub category: Option<String>,
}

impl Resource for Product {
    type Create = CreateProductRequest;
    type Update = UpdateProductRequest;

    const PATH: &'static str = "/products";
    const LABEL: &'static str = "Product";

    fn repository(state: &AppState) -> &DocumentRepository<Self> {
        &state.products
    }

    fn create(
        input: CreateProductRequest,
        _identity: &AuthenticatedIdentity,
        now: DateTime<Utc>,
    ) -> ApiResult<Self> {
        ensure_price(input.price)?;
        Ok(Product {
            id: Uuid::new_v4(),
            name: input.name,
            description: input.description,
            price: input.price,
            category: input.category,
            created_at: now,
            updated_at: now,
        })
    }

    fn check_update(update: &UpdateProductRequest) -> ApiResult<()> {
        update.price.map_or(Ok(()), ensure_price)
    }

    fn apply(&mut self, update: UpdateProductRequest) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(description) = update.description {
            self.description = Some(description);
        }
        if let Some(price) = update.price {
            self.price = price;
        }
        if let Some(category) = update.category {
            self.category = category;
        }
    }
}

// ==================== Order ====================

#[derive(Debug, Deserialize, Validate)]
pub struct CreateOrderRequest {
    pub product_id: Uuid,
    #[validate(range(min = 1, message = "quantity must be at least 1"))]
    pub quantity: u32,
    #[validate(length(min = 1, message = "status should not be empty"))]
    pub status: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateOrderRequest {
    pub product_id: Option<Uuid>,
    #[validate(range(min = 1, message = "quantity must be at least 1"))]
    pub quantity: Option<u32>,
    #[validate(length(min = 1, message = "status should not be empty"))]
    pub status: Option<String>,
}

impl Resource for Order {
    type Create = CreateOrderRequest;
    type Update = UpdateOrderRequest;

    const PATH: &'static str = "/orders";
    const LABEL: &'static str = "Order";

    fn repository(state: &AppState) -> &DocumentRepository<Self> {
        &state.orders
    }

    fn create(
        input: CreateOrderRequest,
        identity: &AuthenticatedIdentity,
        now: DateTime<Utc>,
    ) -> ApiResult<Self> {
        Ok(Order {
            id: Uuid::new_v4(),
            user_id: identity.subject_id,
            product_id: input.product_id,
            quantity: input.quantity,
            status: input.status,
            created_at: now,
            updated_at: now,
        })
    }

    fn apply(&mut self, update: UpdateOrderRequest) {
        if let Some(product_id) = update.product_id {
            self.product_id = product_id;
        }
        if let Some(quantity) = update.quantity {
            self.quantity = quantity;
        }
        if let Some(status) = update.status {
            self.status = status;
        }
    }
}

// ==================== Rating ====================

#[derive(Debug, Deserialize, Validate)]
pub struct CreateRatingRequest {
    pub product_id: Uuid,
    #[validate(range(min = 1, max = 5, message = "rating must be between 1 and 5"))]
    pub rating: u8,
    pub comment: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateRatingRequest {
    #[validate(range(min = 1, max = 5, message = "rating must be between 1 and 5"))]
    pub rating: Option<u8>,
    pub comment: Option<String>,
}

impl Resource for Rating {
    type Create = CreateRatingRequest;
    type Update = UpdateRatingRequest;

    const PATH: &'static str = "/ratings";
    const LABEL: &'static str = "Rating";

    fn repository(state: &AppState) -> &DocumentRepository<Self> {
        &state.ratings
    }

    fn create(
        input: CreateRatingRequest,
        identity: &AuthenticatedIdentity,
        now: DateTime<Utc>,
    ) -> ApiResult<Self> {
        Ok(Rating {
            id: Uuid::new_v4(),
            user_id: identity.subject_id,
            product_id: input.product_id,
            rating: input.rating,
            comment: input.comment,
            created_at: now,
            updated_at: now,
        })
    }

    fn apply(&mut self, update: UpdateRatingRequest) {
        if let Some(rating) = update.rating {
            self.rating = rating;
        }
        if let Some(comment) = update.comment {
            self.comment = Some(comment);
        }
    }
}

// ==================== Handlers ====================

async fn create_resource<T: Resource>(
    State(state): State<Arc<AppState>>,
    Authenticated(identity): Authenticated,
    AppJson(input): AppJson<T::Create>,
) -> ApiResult<(StatusCode, Json<T>)> {
    input.validate()?;
    let item = T::create(input, &identity, Utc::now())?;
    let item = T::repository(&state).insert(item).await;
    Ok((StatusCode::CREATED, Json(item)))
}

async fn list_resources<T: Resource>(State(state): State<Arc<AppState>>) -> Json<Vec<T>> {
    Json(T::repository(&state).list().await)
}

async fn get_resource<T: Resource>(
    State(state): State<Arc<AppState>>,
    AppPath(id): AppPath<String>,
) -> ApiResult<Json<T>> {
    let id = parse_id(&id, T::KIND)?;
    T::repository(&state)
        .get(id)
        .await
        .map(Json)
        .ok_or_else(T::not_found)
}

async fn update_resource<T: Resource>(
    State(state): State<Arc<AppState>>,
    AppPath(id): AppPath<String>,
    AppJson(update): AppJson<T::Update>,
) -> ApiResult<Json<T>> {
    let id = parse_id(&id, T::KIND)?;
    update.validate()?;
    T::check_update(&update)?;

    T::repository(&state)
        .update(id, |item| item.apply(update))
        .await
        .map(Json)
        .ok_or_else(T::not_found)
}

async fn delete_resource<T: Resource>(
    State(state): State<Arc<AppState>>,
    AppPath(id): AppPath<String>,
) -> ApiResult<Json<MessageResponse>> {
    let id = parse_id(&id, T::KIND)?;
    if !T::repository(&state).delete(id).await {
        return Err(T::not_found());
    }
    Ok(Json(MessageResponse::new(format!(
        "{} deleted successfully",
        T::LABEL
    ))))
}

/// 리소스 CRUD 라우터 생성.
pub fn resource_router<T: Resource>() -> Router<Arc<AppState>> {
    let item_path = format!("{}/{{id}}", T::PATH);

    Router::new()
        .route(T::PATH, post(create_resource::<T>).get(list_resources::<T>))
        .route(
            &item_path,
            get(get_resource::<T>)
                .patch(update_resource::<T>)
                .delete(delete_resource::<T>),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn identity() -> AuthenticatedIdentity {
        AuthenticatedIdentity {
            subject_id: Uuid::new_v4(),
            username: "johndoe".to_string(),
            role: None,
        }
    }

    #[test]
    fn test_order_owner_comes_from_identity() {
        let identity = identity();
        let order = Order::create(
            CreateOrderRequest {
                product_id: Uuid::new_v4(),
                quantity: 2,
                status: "Pending".to_string(),
            },
            &identity,
            Utc::now(),
        )
        .unwrap();

        assert_eq!(order.user_id, identity.subject_id);
    }

    #[test]
    fn test_rating_range_validation() {
        let valid = CreateRatingRequest {
            product_id: Uuid::new_v4(),
            rating: 5,
            comment: None,
        };
        assert!(valid.validate().is_ok());

        let too_high = CreateRatingRequest {
            product_id: Uuid::new_v4(),
            rating: 6,
            comment: None,
        };
        assert!(too_high.validate().is_err());

        let zero = UpdateRatingRequest {
            rating: Some(0),
            comment: None,
        };
        assert!(zero.validate().is_err());
    }

    #[test]
    fn test_negative_price_rejected() {
        let result = Product::create(
            CreateProductRequest {
                name: "Keyboard".to_string(),
                description: None,
                price: dec!(-1),
                category: "peripherals".to_string(),
            },
            &identity(),
            Utc::now(),
        );
        assert!(matches!(result, Err(AppError::Validation { .. })));

        let update = UpdateProductRequest {
            name: None,
            description: None,
            price: Some(dec!(-0.01)),
            category: None,
        };
        assert!(Product::check_update(&update).is_err());
    }

    #[test]
    fn test_not_found_message() {
        assert_eq!(Product::not_found().to_string(), "No product found");
        assert_eq!(Rating::not_found().to_string(), "No rating found");
    }
}
