//! Cache-aside repository over the durable user store.
//!
//! Reads go through the cache; writes go to the durable store first and
//! invalidate the affected entries on success. Cache keys are namespaced
//! `<category>:<id>` so a whole category can be dropped without touching
//! unrelated entries.

use tracing::debug;

use crate::cache::{CacheRepository, CacheTtl};
use crate::db::{NewUser, NotificationPref, User, UserStore};

/// Per-user record cache, keyed `user_profile:<id>`.
pub const USER_PROFILE: &str = "user_profile";

/// Aggregate of all users eligible for the email digest.
pub const NOTIFICATION_ROSTER: &str = "user_email_notifications";

/// TTL policy for user records; they change rarely.
const USER_CACHE_TTL: CacheTtl = CacheTtl::StaticTwelveHours;

#[derive(Clone)]
pub struct UserRepository {
    store: UserStore,
    cache: CacheRepository,
}

impl UserRepository {
    pub fn new(store: UserStore, cache: CacheRepository) -> Self {
        Self { store, cache }
    }

    /// Look up a user by id, populating the cache on a durable-store hit.
    ///
    /// Absence is never cached: repeated lookups of a nonexistent id always
    /// reach the durable store.
    pub async fn get_by_id(&self, id: &str) -> Result<Option<User>, sqlx::Error> {
        let key = profile_key(id);

        if let Some(user) = self.cache.get::<User>(&key).await {
            debug!(id = %id, "User served from cache");
            return Ok(Some(user));
        }

        let Some(user) = self.store.get_by_id(id).await? else {
            return Ok(None);
        };

        self.cache.set(&key, &user, USER_CACHE_TTL).await;
        Ok(Some(user))
    }

    /// Look up a user by email. Uncached: this is the login path, and a
    /// stale credential hash is not an acceptable read.
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, sqlx::Error> {
        self.store.find_by_email(email).await
    }

    /// Create a user. The durable insert commits first; the digest roster
    /// aggregate is then invalidated, since the new user may belong in it.
    pub async fn create(&self, new_user: NewUser) -> Result<User, sqlx::Error> {
        let user = self.store.insert(new_user).await?;
        self.cache.invalidate(NOTIFICATION_ROSTER).await;
        Ok(user)
    }

    /// Update a user's notification preference. Invalidates the per-id
    /// entry and the roster aggregate in the same logical operation.
    pub async fn set_notifications(
        &self,
        id: &str,
        pref: NotificationPref,
    ) -> Result<bool, sqlx::Error> {
        let updated = self.store.set_notifications(id, pref).await?;
        if updated {
            self.cache.invalidate(&profile_key(id)).await;
            self.cache.invalidate(NOTIFICATION_ROSTER).await;
        }
        Ok(updated)
    }

    /// Delete a user. Invalidation of the per-id entry is what makes a
    /// still-valid token for this account stop resolving immediately.
    pub async fn delete(&self, id: &str) -> Result<bool, sqlx::Error> {
        let deleted = self.store.delete(id).await?;
        if deleted {
            self.cache.invalidate(&profile_key(id)).await;
            self.cache.invalidate(NOTIFICATION_ROSTER).await;
        }
        Ok(deleted)
    }

    /// All users who opted into the email digest, cached for twelve hours.
    ///
    /// An empty roster is never cached, matching the per-id rule that
    /// absence always re-reads the durable store.
    pub async fn users_to_notify(&self) -> Result<Vec<User>, sqlx::Error> {
        if let Some(users) = self.cache.get::<Vec<User>>(NOTIFICATION_ROSTER).await {
            debug!(count = users.len(), "Notification roster served from cache");
            return Ok(users);
        }

        let users = self.store.notifiable().await?;

        if !users.is_empty() {
            self.cache.set(NOTIFICATION_ROSTER, &users, USER_CACHE_TTL).await;
        }

        Ok(users)
    }

    /// Drop every cached user profile.
    pub async fn invalidate_profiles(&self) {
        self.cache.invalidate_prefix(USER_PROFILE).await;
    }
}

fn profile_key(id: &str) -> String {
    format!("{}:{}", USER_PROFILE, id)
}
