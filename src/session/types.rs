//! Session identity types.

use serde::Serialize;

use crate::db::{NotificationPref, User, UserRole};

/// The authenticated identity handed to request handlers, and the only
/// representation of a user exposed upward. Built per request from a
/// verified token plus a live user-store lookup; never persisted.
#[derive(Debug, Clone, Serialize)]
pub struct SessionPrincipal {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone_number: String,
    pub role: UserRole,
    pub notifications: NotificationPref,
    pub created_at: String,
    pub updated_at: String,
}

impl From<User> for SessionPrincipal {
    /// Strips the credential hash; everything else carries over.
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            phone_number: user.phone_number,
            role: user.role,
            notifications: user.notifications,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}
