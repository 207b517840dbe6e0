//! Explicit session context.
//!
//! Identity travels as a value handed to the resolver, aggregator and view
//! rather than as ambient global state. A context is created when the
//! external session provider signs a user in, replaced wholesale when the
//! session changes, and dropped on sign-out.

use waza_client::UserType;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionContext {
    /// Opaque id issued by the external session provider; identifies one
    /// sign-in, not one user.
    pub session_id: String,
    pub user_id: String,
    pub user_type: UserType,
    /// Set by the session provider for accounts that have not completed a
    /// domain profile yet.
    pub is_new_user: bool,
}

impl SessionContext {
    pub fn new(
        session_id: impl Into<String>,
        user_id: impl Into<String>,
        user_type: UserType,
        is_new_user: bool,
    ) -> Self {
        Self {
            session_id: session_id.into(),
            user_id: user_id.into(),
            user_type,
            is_new_user,
        }
    }
}
