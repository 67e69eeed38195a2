use crate::model::role::Role;
use crate::store::{PtoStore, StoreResult};
use moka::future::Cache;
use std::sync::Arc;
use std::time::Duration;

const PRIVILEGED_KEY: &str = "hr_and_admin";

/// Keeps the HR/admin user ids that every new PTO request is sent to, so
/// request creation does not query the users table each time.
#[derive(Clone)]
pub struct RecipientCache {
    cache: Cache<&'static str, Arc<Vec<u64>>>,
}

impl RecipientCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            cache: Cache::builder().max_capacity(1).time_to_live(ttl).build(),
        }
    }

    pub async fn privileged_users(&self, store: &dyn PtoStore) -> StoreResult<Arc<Vec<u64>>> {
        if let Some(ids) = self.cache.get(PRIVILEGED_KEY).await {
            return Ok(ids);
        }

        let roles: Vec<u8> = [Role::Admin, Role::Hr, Role::Employee, Role::Manager]
            .into_iter()
            .filter(|role| role.receives_pto_requests())
            .map(Role::id)
            .collect();

        let ids: Vec<u64> = store
            .find_users_with_roles(&roles)
            .await?
            .into_iter()
            .map(|user| user.id)
            .collect();

        let ids = Arc::new(ids);
        self.cache.insert(PRIVILEGED_KEY, ids.clone()).await;

        tracing::debug!(count = ids.len(), "Refreshed privileged recipient cache");
        Ok(ids)
    }

    #[cfg(test)]
    pub async fn invalidate(&self) {
        self.cache.invalidate(PRIVILEGED_KEY).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::user::User;
    use crate::store::memory::MemoryStore;

    fn user(id: u64, role: Role, employee_id: Option<u64>) -> User {
        User {
            id,
            username: format!("user{id}"),
            role_id: role.id(),
            employee_id,
        }
    }

    #[actix_web::test]
    async fn serves_cached_ids_until_invalidated() {
        let store = MemoryStore::new();
        store.add_user(user(1, Role::Admin, Some(10)));
        store.add_user(user(2, Role::Hr, Some(11)));
        store.add_user(user(3, Role::Employee, Some(12)));
        store.add_user(user(4, Role::Hr, None));

        let cache = RecipientCache::new(Duration::from_secs(60));
        assert_eq!(*cache.privileged_users(&store).await.unwrap(), vec![1, 2]);

        store.add_user(user(5, Role::Hr, Some(13)));
        assert_eq!(*cache.privileged_users(&store).await.unwrap(), vec![1, 2]);

        cache.invalidate().await;
        assert_eq!(*cache.privileged_users(&store).await.unwrap(), vec![1, 2, 5]);
    }
}
