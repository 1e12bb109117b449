//! 인메모리 문서 리포지토리 (상품, 주문, 평점).

use std::sync::Arc;

use chrono::Utc;
use commerce_core::Document;
use tokio::sync::RwLock;
use uuid::Uuid;

/// ID 기반 CRUD 리포지토리.
///
/// 삽입 순서를 유지합니다.
pub struct DocumentRepository<T: Document> {
    items: Arc<RwLock<Vec<T>>>,
}

impl<T: Document> Clone for DocumentRepository<T> {
    fn clone(&self) -> Self {
        Self {
            items: Arc::clone(&self.items),
        }
    }
}

impl<T: Document> Default for DocumentRepository<T> {
    fn default() -> Self {
        Self {
            items: Arc::new(RwLock::new(Vec::new())),
        }
    }
}

impl<T: Document> DocumentRepository<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, item: T) -> T {
        self.items.write().await.push(item.clone());
        tracing::debug!(kind = T::KIND, id = %item.id(), "Document created");
        item
    }

    pub async fn list(&self) -> Vec<T> {
        self.items.read().await.clone()
    }

    pub async fn get(&self, id: Uuid) -> Option<T> {
        self.items
            .read()
            .await
            .iter()
            .find(|item| item.id() == id)
            .cloned()
    }

    /// 문서 수정. 대상이 없으면 `None`.
    pub async fn update<F>(&self, id: Uuid, apply: F) -> Option<T>
    where
        F: FnOnce(&mut T),
    {
        let mut items = self.items.write().await;
        let item = items.iter_mut().find(|item| item.id() == id)?;
        apply(item);
        item.touch(Utc::now());
        Some(item.clone())
    }

    pub async fn delete(&self, id: Uuid) -> bool {
        let mut items = self.items.write().await;
        let before = items.len();
        items.retain(|item| item.id() != id);
        before != items.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use commerce_core::Product;
    use rust_decimal_macros::dec;

    fn product(name: &str) -> Product {
        let now = Utc::now();
        Product {
            id: Uuid::new_v4(),
            name: name.to_string(),
            description: None,
            price: dec!(10),
            category: "misc".to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_crud_cycle() {
        let repo = DocumentRepository::<Product>::new();
        let first = repo.insert(product("first")).await;
        repo.insert(product("second")).await;

        let names: Vec<_> = repo.list().await.into_iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["first", "second"]);

        let updated = repo
            .update(first.id, |p| p.price = dec!(12.5))
            .await
            .unwrap();
        assert_eq!(updated.price, dec!(12.5));
        assert!(updated.updated_at >= first.updated_at);

        assert!(repo.delete(first.id).await);
        assert!(repo.get(first.id).await.is_none());
        assert!(!repo.delete(first.id).await);
        assert!(repo.update(first.id, |_| {}).await.is_none());
    }
}
