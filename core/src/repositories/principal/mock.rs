//! Mock implementation of PrincipalRepository for testing

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::entities::principal::Principal;
use crate::errors::PersistenceError;

use super::r#trait::PrincipalRepository;

/// In-memory principal repository for tests and local composition
#[derive(Default)]
pub struct MockPrincipalRepository {
    principals: Arc<RwLock<HashMap<Uuid, Principal>>>,
}

impl MockPrincipalRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a principal
    pub async fn insert(&self, principal: Principal) {
        let mut principals = self.principals.write().await;
        principals.insert(principal.id, principal);
    }

    /// Remove a principal, simulating account deletion
    pub async fn remove(&self, id: Uuid) -> bool {
        let mut principals = self.principals.write().await;
        principals.remove(&id).is_some()
    }
}

#[async_trait]
impl PrincipalRepository for MockPrincipalRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Principal>, PersistenceError> {
        let principals = self.principals.read().await;
        Ok(principals.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Principal>, PersistenceError> {
        let principals = self.principals.read().await;
        Ok(principals.values().find(|p| p.email == email).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::principal::Role;

    #[tokio::test]
    async fn test_insert_and_find() {
        let repo = MockPrincipalRepository::new();
        let principal = Principal::new("a@example.com".to_string(), Role::User, "h".to_string());
        let id = principal.id;

        repo.insert(principal.clone()).await;

        assert_eq!(repo.find_by_id(id).await.unwrap(), Some(principal.clone()));
        assert_eq!(
            repo.find_by_email("a@example.com").await.unwrap(),
            Some(principal)
        );
    }

    #[tokio::test]
    async fn test_removed_principal_not_found() {
        let repo = MockPrincipalRepository::new();
        let principal = Principal::new("b@example.com".to_string(), Role::Admin, "h".to_string());
        let id = principal.id;

        repo.insert(principal).await;
        assert!(repo.remove(id).await);
        assert_eq!(repo.find_by_id(id).await.unwrap(), None);
    }
}
