//! Authentication state traits and macro.

use super::cookie::CookieConfig;
use crate::token::TokenCodec;
use crate::users::UserRepository;

/// Trait for state types that provide what authentication needs: the token
/// codec, the cache-fronted user repository, and the cookie attributes.
pub trait HasAuthBackend {
    fn tokens(&self) -> &TokenCodec;
    fn users(&self) -> &UserRepository;
    fn cookies(&self) -> &CookieConfig;
}

/// Macro to implement `HasAuthBackend` for state structs with the standard
/// fields.
///
/// The struct must have these fields:
/// - `tokens: Arc<TokenCodec>`
/// - `users: UserRepository`
/// - `cookies: CookieConfig`
///
/// # Example
/// ```ignore
/// use crate::impl_has_auth_backend;
///
/// #[derive(Clone)]
/// pub struct MyState {
///     pub users: UserRepository,
///     pub tokens: Arc<TokenCodec>,
///     pub cookies: CookieConfig,
///     // ... other fields
/// }
///
/// impl_has_auth_backend!(MyState);
/// ```
#[macro_export]
macro_rules! impl_has_auth_backend {
    ($state_type:ty) => {
        impl $crate::session::HasAuthBackend for $state_type {
            fn tokens(&self) -> &$crate::token::TokenCodec {
                &self.tokens
            }
            fn users(&self) -> &$crate::users::UserRepository {
                &self.users
            }
            fn cookies(&self) -> &$crate::session::CookieConfig {
                &self.cookies
            }
        }
    };
}
