//! Identity hook for validating who a player is.
//!
//! Cardroom doesn't store accounts itself — identity lives in an external
//! service. This module defines the [`IdentityService`] trait: a single
//! async method that takes a login token and returns the [`Identity`] the
//! service has on file for it. The login handler calls it, then checks
//! that the returned ID matches the one the client claimed.
//!
//! # Why a trait?
//!
//! A trait is like an interface in other languages — it defines WHAT
//! something can do without specifying HOW. This lets us:
//! - Call the real identity service over HTTP in production
//! - Use an in-memory token table in development
//! - Use a deliberately failing service in tests
//!
//! All without changing any server code.

use std::collections::HashMap;

use cardroom_protocol::PlayerId;

use crate::SessionError;

/// The profile an identity service has on file for a login token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// The player ID the service vouches for.
    pub id: PlayerId,
}

/// Resolves a login token to the identity that owns it.
///
/// # Trait bounds
///
/// - `Send + Sync` → the service handle is shared across connection
///   tasks (Tokio may call it from different threads simultaneously).
/// - `'static` → it doesn't borrow temporary data; it lives as long as
///   the server.
///
/// # Example
///
/// ```rust
/// use cardroom_protocol::PlayerId;
/// use cardroom_session::{Identity, IdentityService, SessionError};
///
/// /// Accepts any token and uses it verbatim as the player ID.
/// /// Only for development — never use this in production!
/// struct TokenIsId;
///
/// impl IdentityService for TokenIsId {
///     async fn retrieve_profile(
///         &self,
///         token: &str,
///     ) -> Result<Identity, SessionError> {
///         Ok(Identity {
///             id: PlayerId::from(token),
///         })
///     }
/// }
/// ```
pub trait IdentityService: Send + Sync + 'static {
    /// Resolves the given token to a profile.
    ///
    /// # Returns
    /// - `Ok(Identity)` — the service recognizes the token; here's who
    ///   it belongs to
    /// - `Err(SessionError::AuthFailed)` — token is invalid, expired,
    ///   or the service couldn't be reached
    fn retrieve_profile(
        &self,
        token: &str,
    ) -> impl std::future::Future<Output = Result<Identity, SessionError>> + Send;
}

// ---------------------------------------------------------------------------
// StaticProfiles
// ---------------------------------------------------------------------------

/// An in-memory [`IdentityService`] backed by a fixed token table.
///
/// Used by the demo binary and the integration tests, where standing up
/// a real identity service would be overkill. Tokens not in the table
/// are rejected, so failure paths are testable too.
///
/// ```rust
/// use cardroom_session::StaticProfiles;
///
/// let profiles = StaticProfiles::new()
///     .grant("token-alice", "id-alice")
///     .grant("token-bob", "id-bob");
/// ```
#[derive(Debug, Clone, Default)]
pub struct StaticProfiles {
    profiles: HashMap<String, Identity>,
}

impl StaticProfiles {
    /// Creates an empty table; every lookup fails until tokens are
    /// granted.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a token → player ID mapping, builder style.
    pub fn grant(mut self, token: &str, id: &str) -> Self {
        self.profiles.insert(
            token.to_string(),
            Identity {
                id: PlayerId::from(id),
            },
        );
        self
    }
}

impl IdentityService for StaticProfiles {
    async fn retrieve_profile(
        &self,
        token: &str,
    ) -> Result<Identity, SessionError> {
        self.profiles
            .get(token)
            .cloned()
            .ok_or_else(|| SessionError::AuthFailed("unknown token".into()))
    }
}

// =========================================================================
// Tests
// =========================================================================
