//! 상품, 주문, 평점 문서.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::store::Document;

/// 상품.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub price: Decimal,
    pub category: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 주문.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    /// 주문한 사용자 (인증된 주체)
    pub user_id: Uuid,
    pub product_id: Uuid,
    pub quantity: u32,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 상품 평점.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rating {
    pub id: Uuid,
    /// 평점을 남긴 사용자 (인증된 주체)
    pub user_id: Uuid,
    pub product_id: Uuid,
    /// 1 ~ 5
    pub rating: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Document for Product {
    const KIND: &'static str = "product";

    fn id(&self) -> Uuid {
        self.id
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }
}

impl Document for Order {
    const KIND: &'static str = "order";

    fn id(&self) -> Uuid {
        self.id
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }
}

impl Document for Rating {
    const KIND: &'static str = "rating";

    fn id(&self) -> Uuid {
        self.id
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_product_serialization() {
        let now = Utc::now();
        let product = Product {
            id: Uuid::new_v4(),
            name: "Keyboard".to_string(),
            description: None,
            price: dec!(49.90),
            category: "peripherals".to_string(),
            created_at: now,
            updated_at: now,
        };

        let json = serde_json::to_value(&product).unwrap();
        assert_eq!(json["name"], "Keyboard");
        assert!(json.get("description").is_none());

        let back: Product = serde_json::from_value(json).unwrap();
        assert_eq!(back.price, dec!(49.90));
    }

    #[test]
    fn test_touch_updates_timestamp() {
        let now = Utc::now();
        let mut rating = Rating {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            product_id: Uuid::new_v4(),
            rating: 4,
            comment: Some("good".to_string()),
            created_at: now,
            updated_at: now,
        };
        let later = now + chrono::Duration::minutes(1);
        rating.touch(later);

        assert_eq!(rating.updated_at, later);
        assert_eq!(rating.created_at, now);
        assert_eq!(Rating::KIND, "rating");
    }
}
