//! Link creation, resolution and lifecycle service.

use std::sync::Arc;

use serde_json::json;
use tokio_retry::RetryIf;
use tokio_retry::strategy::{ExponentialBackoff, jitter};
use tracing::{debug, info, warn};

use crate::domain::entities::{Link, NewLink};
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;
use crate::infrastructure::cache::CacheService;
use crate::utils::code_generator::{generate_unique_code, validate_custom_code};
use crate::utils::url_normalizer::normalize_url;

/// Retries after a generated code lost the race for the unique constraint.
const CODE_CLAIM_RETRIES: usize = 3;

/// A page of an owner's links.
#[derive(Debug, Clone)]
pub struct LinkPage {
    pub items: Vec<Link>,
    pub total: i64,
}

/// Service for creating, resolving and expiring short links.
///
/// Handles URL normalization, code generation/validation and per-owner
/// deduplication. Redirect lookups go through the cache first.
pub struct LinkService {
    repository: Arc<dyn LinkRepository>,
    cache: Arc<dyn CacheService>,
    base_url: String,
}

impl LinkService {
    /// Creates a new link service.
    ///
    /// `base_url` is the public prefix of issued short links, for example
    /// `https://s.example.com`.
    pub fn new(
        repository: Arc<dyn LinkRepository>,
        cache: Arc<dyn CacheService>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            repository,
            cache,
            base_url: base_url.into(),
        }
    }

    /// Creates a short link owned by `user_id`.
    ///
    /// # Deduplication
    ///
    /// If the owner already has an active link for the same normalized URL,
    /// that link is returned and `custom_code` is ignored.
    ///
    /// # Code Generation
    ///
    /// - A `custom_code` is validated and claimed as-is
    /// - Otherwise a random code is generated; if the insert still hits the
    ///   `links_code_key` constraint, a fresh code is generated and the insert
    ///   retried with jittered backoff
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if the URL or custom code is invalid.
    /// Returns [`AppError::Conflict`] if the custom code is already taken.
    pub async fn shorten(
        &self,
        user_id: i64,
        title: String,
        long_url: String,
        custom_code: Option<String>,
    ) -> Result<Link, AppError> {
        let normalized_url = normalize_url(&long_url).map_err(|e| {
            AppError::bad_request("Invalid URL format", json!({ "reason": e.to_string() }))
        })?;

        if let Some(existing) = self
            .repository
            .find_by_long_url_for_owner(&normalized_url, user_id)
            .await?
            .filter(Link::is_active)
        {
            debug!(link_id = existing.id, "Reusing existing link for destination");
            return Ok(existing);
        }

        let link = match custom_code {
            Some(code) => {
                self.create_with_custom_code(user_id, code, normalized_url, title)
                    .await?
            }
            None => {
                let strategy = ExponentialBackoff::from_millis(10)
                    .map(jitter)
                    .take(CODE_CLAIM_RETRIES);

                RetryIf::spawn(
                    strategy,
                    || self.create_with_generated_code(user_id, &normalized_url, &title),
                    AppError::is_code_conflict,
                )
                .await?
            }
        };

        info!(link_id = link.id, code = %link.code, user_id, "Short link created");
        Ok(link)
    }

    async fn create_with_custom_code(
        &self,
        user_id: i64,
        code: String,
        long_url: String,
        title: String,
    ) -> Result<Link, AppError> {
        validate_custom_code(&code)?;

        let taken = || {
            AppError::conflict(
                "Custom back-half is already taken",
                json!({ "code": code }),
            )
        };

        if self.repository.exists_code(&code).await? {
            return Err(taken());
        }

        let new_link = NewLink {
            user_id,
            code: code.clone(),
            long_url,
            title,
        };

        self.repository.create(new_link).await.map_err(|e| {
            if e.is_code_conflict() {
                taken()
            } else {
                e
            }
        })
    }

    async fn create_with_generated_code(
        &self,
        user_id: i64,
        long_url: &str,
        title: &str,
    ) -> Result<Link, AppError> {
        let repository = self.repository.clone();
        let code = generate_unique_code(move |candidate| {
            let repository = repository.clone();
            async move { repository.exists_code(&candidate).await }
        })
        .await?;

        let result = self
            .repository
            .create(NewLink {
                user_id,
                code,
                long_url: long_url.to_string(),
                title: title.to_string(),
            })
            .await;

        if let Err(e) = &result {
            if e.is_code_conflict() {
                warn!("Generated code collided on insert, retrying");
            }
        }

        result
    }

    /// Resolves a short code to its active link.
    ///
    /// Expired links are indistinguishable from unknown codes here.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the code is unknown or expired.
    pub async fn resolve(&self, code: &str) -> Result<Link, AppError> {
        match self.resolve_for_redirect(code).await {
            Err(AppError::Gone { .. }) => Err(Self::code_not_found(code)),
            other => other,
        }
    }

    /// Resolves a short code for the redirect endpoint.
    ///
    /// Active links are served from the cache when possible; misses are
    /// loaded from the repository and cached. After caching, the link is read
    /// once more so that an expiry racing with the miss cannot leave an
    /// expired link in the cache.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the code is unknown.
    /// Returns [`AppError::Gone`] if the link has been expired.
    pub async fn resolve_for_redirect(&self, code: &str) -> Result<Link, AppError> {
        if let Ok(Some(link)) = self.cache.get_link(code).await {
            return Ok(link);
        }

        let link = self
            .repository
            .find_by_code(code)
            .await?
            .ok_or_else(|| Self::code_not_found(code))?;

        if !link.is_active() {
            return Err(Self::code_gone(code));
        }

        if self.cache.is_enabled() && self.cache.set_link(&link, None).await.is_ok() {
            let still_active = self
                .repository
                .find_by_code(code)
                .await?
                .is_some_and(|current| current.is_active());

            if !still_active {
                let _ = self.cache.invalidate(code).await;
                return Err(Self::code_gone(code));
            }
        }

        Ok(link)
    }

    /// Returns a link owned by `user_id`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the link does not exist or belongs to
    /// another user.
    pub async fn get_owned_link(&self, id: i64, user_id: i64) -> Result<Link, AppError> {
        self.repository
            .find_by_id_for_owner(id, user_id)
            .await?
            .ok_or_else(|| AppError::not_found("Link not found", json!({ "id": id })))
    }

    /// Lists an owner's links, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    pub async fn list_links(
        &self,
        user_id: i64,
        active_only: bool,
        offset: i64,
        limit: i64,
    ) -> Result<LinkPage, AppError> {
        let items = self
            .repository
            .list_for_owner(user_id, active_only, offset, limit)
            .await?;
        let total = self.repository.count_for_owner(user_id, active_only).await?;

        Ok(LinkPage { items, total })
    }

    /// Marks an owned link expired and evicts it from the redirect cache.
    ///
    /// Expiring an already expired link succeeds. The database flag is set
    /// before the cache entry is dropped; [`Self::resolve_for_redirect`]
    /// re-reads the flag after caching, so a concurrent miss cannot re-cache
    /// the link once this returns.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the link does not exist or belongs to
    /// another user.
    pub async fn expire_link(&self, id: i64, user_id: i64) -> Result<Link, AppError> {
        let mut link = self.get_owned_link(id, user_id).await?;

        if self.repository.mark_expired(link.id).await? {
            info!(link_id = link.id, code = %link.code, "Link expired");
        }
        link.expired = true;

        let _ = self.cache.invalidate(&link.code).await;

        Ok(link)
    }

    /// Builds the public short URL for a code.
    pub fn short_url(&self, code: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), code)
    }

    /// Checks that the link store is reachable.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] if it is not.
    pub async fn ping(&self) -> Result<(), AppError> {
        self.repository.ping().await
    }

    fn code_gone(code: &str) -> AppError {
        AppError::gone("Short link has expired", json!({ "code": code }))
    }

    fn code_not_found(code: &str) -> AppError {
        AppError::not_found("Short link not found", json!({ "code": code }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::MockLinkRepository;
    use crate::error::LINKS_CODE_CONSTRAINT;
    use crate::infrastructure::cache::{MockCacheService, NullCache};
    use chrono::Utc;

    fn create_test_link(id: i64, code: &str, url: &str, expired: bool) -> Link {
        Link::new(
            id,
            1,
            code.to_string(),
            url.to_string(),
            "Title".to_string(),
            Utc::now(),
            expired,
        )
    }

    fn service(repo: MockLinkRepository) -> LinkService {
        LinkService::new(Arc::new(repo), Arc::new(NullCache), "https://s.example.com/")
    }

    fn code_conflict() -> AppError {
        AppError::conflict(
            "Unique constraint violation",
            json!({ "constraint": LINKS_CODE_CONSTRAINT }),
        )
    }

    #[tokio::test]
    async fn test_shorten_generates_seven_char_code() {
        let mut repo = MockLinkRepository::new();
        repo.expect_find_by_long_url_for_owner()
            .times(1)
            .returning(|_, _| Ok(None));
        repo.expect_exists_code().times(1).returning(|_| Ok(false));
        repo.expect_create()
            .withf(|new| new.code.len() == 7 && new.long_url == "https://example.com/")
            .times(1)
            .returning(|new| Ok(create_test_link(10, &new.code, &new.long_url, false)));

        let link = service(repo)
            .shorten(1, "Title".into(), "https://example.com".into(), None)
            .await
            .unwrap();

        assert_eq!(link.id, 10);
        assert_eq!(link.code.len(), 7);
    }

    #[tokio::test]
    async fn test_shorten_prepends_scheme() {
        let mut repo = MockLinkRepository::new();
        repo.expect_find_by_long_url_for_owner()
            .withf(|url, user_id| url == "http://example.com/page" && *user_id == 1)
            .times(1)
            .returning(|_, _| Ok(None));
        repo.expect_exists_code().returning(|_| Ok(false));
        repo.expect_create()
            .times(1)
            .returning(|new| Ok(create_test_link(10, &new.code, &new.long_url, false)));

        let link = service(repo)
            .shorten(1, "Title".into(), "example.com/page".into(), None)
            .await
            .unwrap();

        assert_eq!(link.long_url, "http://example.com/page");
    }

    #[tokio::test]
    async fn test_shorten_returns_existing_link() {
        let mut repo = MockLinkRepository::new();
        repo.expect_find_by_long_url_for_owner()
            .times(1)
            .returning(|_, _| Ok(Some(create_test_link(5, "exist12", "https://example.com/", false))));
        repo.expect_create().never();

        let link = service(repo)
            .shorten(
                1,
                "Title".into(),
                "https://example.com/".into(),
                Some("mine".into()),
            )
            .await
            .unwrap();

        assert_eq!(link.id, 5);
    }

    #[tokio::test]
    async fn test_shorten_ignores_expired_duplicate() {
        let mut repo = MockLinkRepository::new();
        repo.expect_find_by_long_url_for_owner()
            .returning(|_, _| Ok(Some(create_test_link(5, "old1234", "https://example.com/", true))));
        repo.expect_exists_code().returning(|_| Ok(false));
        repo.expect_create()
            .times(1)
            .returning(|new| Ok(create_test_link(6, &new.code, &new.long_url, false)));

        let link = service(repo)
            .shorten(1, "Title".into(), "https://example.com/".into(), None)
            .await
            .unwrap();

        assert_eq!(link.id, 6);
    }

    #[tokio::test]
    async fn test_shorten_custom_code_taken() {
        let mut repo = MockLinkRepository::new();
        repo.expect_find_by_long_url_for_owner()
            .returning(|_, _| Ok(None));
        repo.expect_exists_code()
            .withf(|code| code == "promo")
            .times(1)
            .returning(|_| Ok(true));
        repo.expect_create().never();

        let result = service(repo)
            .shorten(1, "Title".into(), "https://example.com".into(), Some("promo".into()))
            .await;

        assert!(matches!(result, Err(AppError::Conflict { .. })));
    }

    #[tokio::test]
    async fn test_shorten_custom_code_race_is_conflict() {
        let mut repo = MockLinkRepository::new();
        repo.expect_find_by_long_url_for_owner()
            .returning(|_, _| Ok(None));
        repo.expect_exists_code().returning(|_| Ok(false));
        repo.expect_create()
            .times(1)
            .returning(|_| Err(code_conflict()));

        let err = service(repo)
            .shorten(1, "Title".into(), "https://example.com".into(), Some("promo".into()))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Conflict { .. }));
        assert!(!err.is_code_conflict());
    }

    #[tokio::test]
    async fn test_shorten_invalid_custom_code() {
        let mut repo = MockLinkRepository::new();
        repo.expect_find_by_long_url_for_owner()
            .returning(|_, _| Ok(None));

        let result = service(repo)
            .shorten(1, "Title".into(), "https://example.com".into(), Some("a b".into()))
            .await;

        assert!(matches!(result, Err(AppError::Validation { .. })));
    }

    #[tokio::test]
    async fn test_shorten_retries_generated_code_conflict() {
        let mut repo = MockLinkRepository::new();
        repo.expect_find_by_long_url_for_owner()
            .returning(|_, _| Ok(None));
        repo.expect_exists_code().returning(|_| Ok(false));

        let mut seq = mockall::Sequence::new();
        repo.expect_create()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Err(code_conflict()));
        repo.expect_create()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|new| Ok(create_test_link(11, &new.code, &new.long_url, false)));

        let link = service(repo)
            .shorten(1, "Title".into(), "https://example.com".into(), None)
            .await
            .unwrap();

        assert_eq!(link.id, 11);
    }

    #[tokio::test]
    async fn test_shorten_invalid_url() {
        let repo = MockLinkRepository::new();

        let result = service(repo)
            .shorten(1, "Title".into(), "ftp://example.com".into(), None)
            .await;

        assert!(matches!(result, Err(AppError::Validation { .. })));
    }

    #[tokio::test]
    async fn test_resolve_active() {
        let mut repo = MockLinkRepository::new();
        repo.expect_find_by_code()
            .withf(|code| code == "abc1234")
            .times(1)
            .returning(|_| Ok(Some(create_test_link(1, "abc1234", "https://example.com/", false))));

        let link = service(repo).resolve("abc1234").await.unwrap();
        assert_eq!(link.long_url, "https://example.com/");
    }

    #[tokio::test]
    async fn test_expired_resolves_like_absent() {
        let mut repo = MockLinkRepository::new();
        repo.expect_find_by_code()
            .withf(|code| code == "gone123")
            .returning(|_| Ok(Some(create_test_link(1, "gone123", "https://example.com/", true))));
        repo.expect_find_by_code()
            .withf(|code| code == "none123")
            .returning(|_| Ok(None));
        let service = service(repo);

        assert!(matches!(
            service.resolve("gone123").await,
            Err(AppError::NotFound { .. })
        ));
        assert!(matches!(
            service.resolve("none123").await,
            Err(AppError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_resolve_for_redirect_distinguishes_expired() {
        let mut repo = MockLinkRepository::new();
        repo.expect_find_by_code()
            .returning(|_| Ok(Some(create_test_link(1, "gone123", "https://example.com/", true))));

        let result = service(repo).resolve_for_redirect("gone123").await;
        assert!(matches!(result, Err(AppError::Gone { .. })));
    }

    #[tokio::test]
    async fn test_resolve_for_redirect_uses_cache_hit() {
        let mut repo = MockLinkRepository::new();
        repo.expect_find_by_code().never();

        let mut cache = MockCacheService::new();
        cache
            .expect_get_link()
            .withf(|code| code == "hot1234")
            .returning(|_| Ok(Some(create_test_link(1, "hot1234", "https://example.com/", false))));

        let service = LinkService::new(Arc::new(repo), Arc::new(cache), "https://s.example.com");
        let link = service.resolve_for_redirect("hot1234").await.unwrap();
        assert_eq!(link.long_url, "https://example.com/");
    }

    #[tokio::test]
    async fn test_resolve_for_redirect_caches_active_miss() {
        let mut repo = MockLinkRepository::new();
        repo.expect_find_by_code()
            .times(2)
            .returning(|_| Ok(Some(create_test_link(1, "abc1234", "https://example.com/", false))));

        let mut cache = MockCacheService::new();
        cache.expect_is_enabled().return_const(true);
        cache.expect_get_link().returning(|_| Ok(None));
        cache
            .expect_set_link()
            .withf(|link, ttl| link.code == "abc1234" && ttl.is_none())
            .times(1)
            .returning(|_, _| Ok(()));
        cache.expect_invalidate().never();

        let service = LinkService::new(Arc::new(repo), Arc::new(cache), "https://s.example.com");
        assert!(service.resolve_for_redirect("abc1234").await.is_ok());
    }

    #[tokio::test]
    async fn test_resolve_for_redirect_evicts_link_expired_during_miss() {
        let mut seq = mockall::Sequence::new();
        let mut repo = MockLinkRepository::new();
        repo.expect_find_by_code()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(Some(create_test_link(1, "race123", "https://example.com/", false))));
        repo.expect_find_by_code()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(Some(create_test_link(1, "race123", "https://example.com/", true))));

        let mut cache = MockCacheService::new();
        cache.expect_is_enabled().return_const(true);
        cache.expect_get_link().returning(|_| Ok(None));
        cache.expect_set_link().times(1).returning(|_, _| Ok(()));
        cache
            .expect_invalidate()
            .withf(|code| code == "race123")
            .times(1)
            .returning(|_| Ok(()));

        let service = LinkService::new(Arc::new(repo), Arc::new(cache), "https://s.example.com");
        let result = service.resolve_for_redirect("race123").await;
        assert!(matches!(result, Err(AppError::Gone { .. })));
    }

    #[tokio::test]
    async fn test_get_owned_link_other_user() {
        let mut repo = MockLinkRepository::new();
        repo.expect_find_by_id_for_owner()
            .withf(|id, user_id| *id == 3 && *user_id == 2)
            .returning(|_, _| Ok(None));

        let result = service(repo).get_owned_link(3, 2).await;
        assert!(matches!(result, Err(AppError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_list_links() {
        let mut repo = MockLinkRepository::new();
        repo.expect_list_for_owner()
            .withf(|user_id, active, offset, limit| {
                *user_id == 1 && *active && *offset == 0 && *limit == 2
            })
            .returning(|_, _, _, _| {
                Ok(vec![
                    create_test_link(2, "bbbbbbb", "https://b.example/", false),
                    create_test_link(1, "aaaaaaa", "https://a.example/", false),
                ])
            });
        repo.expect_count_for_owner().returning(|_, _| Ok(5));

        let page = service(repo).list_links(1, true, 0, 2).await.unwrap();
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.total, 5);
    }

    #[tokio::test]
    async fn test_expire_link() {
        let mut repo = MockLinkRepository::new();
        repo.expect_find_by_id_for_owner()
            .returning(|_, _| Ok(Some(create_test_link(4, "abc1234", "https://example.com/", false))));
        repo.expect_mark_expired()
            .withf(|id| *id == 4)
            .times(1)
            .returning(|_| Ok(true));

        let link = service(repo).expire_link(4, 1).await.unwrap();
        assert!(link.expired);
    }

    #[test]
    fn test_short_url() {
        let service = service(MockLinkRepository::new());
        assert_eq!(service.short_url("abc1234"), "https://s.example.com/abc1234");
    }
}
