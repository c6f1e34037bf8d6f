//! Repository trait for short link data access.

use crate::domain::entities::{Link, NewLink};
use crate::error::AppError;
use async_trait::async_trait;

/// Repository interface for managing short links.
///
/// Short codes are unique across all links; implementations must enforce this
/// with a storage-level constraint so concurrent claims of the same code
/// cannot both succeed.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgLinkRepository`] - PostgreSQL implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LinkRepository: Send + Sync {
    /// Creates a new short link.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] carrying the `links_code_key` constraint
    /// name if the code is already taken.
    /// Returns [`AppError::Internal`] on database errors.
    async fn create(&self, new_link: NewLink) -> Result<Link, AppError>;

    /// Finds a link by its short code, expired or not.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn find_by_code(&self, code: &str) -> Result<Option<Link>, AppError>;

    /// Finds a link by id, restricted to the given owner.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn find_by_id_for_owner(&self, id: i64, user_id: i64)
    -> Result<Option<Link>, AppError>;

    /// Finds an owner's existing link for the same destination.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn find_by_long_url_for_owner(
        &self,
        long_url: &str,
        user_id: i64,
    ) -> Result<Option<Link>, AppError>;

    /// Returns true if any link already uses `code`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn exists_code(&self, code: &str) -> Result<bool, AppError>;

    /// Lists an owner's links, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn list_for_owner(
        &self,
        user_id: i64,
        active_only: bool,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Link>, AppError>;

    /// Counts an owner's links.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn count_for_owner(&self, user_id: i64, active_only: bool) -> Result<i64, AppError>;

    /// Permanently deactivates a link.
    ///
    /// Returns `Ok(true)` if the link flipped to expired, `Ok(false)` if it was
    /// already expired.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn mark_expired(&self, id: i64) -> Result<bool, AppError>;

    /// Round-trips to the store. Used by the health check.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] if the store is unreachable.
    async fn ping(&self) -> Result<(), AppError>;
}
