#![allow(dead_code)]

use async_trait::async_trait;
use axum::extract::ConnectInfo;
use axum_test::TestServer;
use chrono::{DateTime, Utc};
use serde_json::json;
use sqlx::PgPool;
use std::collections::{BTreeMap, HashMap};
use std::net::{IpAddr, SocketAddr};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tower::Layer;

use link_analytics::application::services::auth_service::hash_token;
use link_analytics::application::services::{
    AnalyticsService, AuthService, ClickService, LinkService,
};
use link_analytics::domain::analytics::{BucketCount, Granularity};
use link_analytics::domain::entities::{
    Click, ClickWithGeo, GeoInfo, GeoLookupResult, Link, NewClick, NewGeoInfo, NewLink, User,
};
use link_analytics::domain::geo_job::GeoJob;
use link_analytics::domain::geo_lookup::GeoLookup;
use link_analytics::domain::repositories::{
    ApiToken, ClickRepository, GeoRepository, LinkRepository, TokenRepository, UserRepository,
};
use link_analytics::error::{AppError, LINKS_CODE_CONSTRAINT};
use link_analytics::infrastructure::cache::NullCache;
use link_analytics::routes::router;
use link_analytics::state::AppState;

pub const SIGNING_SECRET: &str = "test-signing-secret";
pub const BASE_URL: &str = "https://s.example.com";

pub const ALICE_ID: i64 = 1;
pub const ALICE_TOKEN: &str = "alice-token";
pub const BOB_ID: i64 = 2;
pub const BOB_TOKEN: &str = "bob-token";

/// In-memory stand-in for every PostgreSQL repository.
#[derive(Default)]
pub struct MemoryStore {
    links: Mutex<Vec<Link>>,
    clicks: Mutex<Vec<Click>>,
    geo: Mutex<HashMap<i64, GeoInfo>>,
    users: Mutex<Vec<User>>,
    tokens: Mutex<Vec<ApiToken>>,
}

impl MemoryStore {
    pub fn seeded() -> Arc<Self> {
        let store = Arc::new(Self::default());
        store.add_user(ALICE_ID, "alice", ALICE_TOKEN);
        store.add_user(BOB_ID, "bob", BOB_TOKEN);
        store
    }

    fn add_user(&self, id: i64, username: &str, token: &str) {
        self.users.lock().unwrap().push(User {
            id,
            username: username.to_string(),
            external_api_token: None,
            created_at: Utc::now(),
        });
        self.tokens.lock().unwrap().push(ApiToken {
            id,
            user_id: id,
            name: format!("{username} token"),
            token_hash: hash_token(SIGNING_SECRET, token).unwrap(),
            created_at: Utc::now(),
            last_used_at: None,
            revoked_at: None,
        });
    }

    pub fn add_link(&self, user_id: i64, code: &str, long_url: &str, expired: bool) -> Link {
        let mut links = self.links.lock().unwrap();
        let link = Link::new(
            links.len() as i64 + 1,
            user_id,
            code.to_string(),
            long_url.to_string(),
            format!("Link {code}"),
            Utc::now(),
            expired,
        );
        links.push(link.clone());
        link
    }

    pub fn add_click(&self, link_id: i64, ip: &str, user_agent: &str, at: DateTime<Utc>) -> Click {
        let mut clicks = self.clicks.lock().unwrap();
        let click = Click::new(
            clicks.len() as i64 + 1,
            link_id,
            ip.to_string(),
            user_agent.to_string(),
            at,
        );
        clicks.push(click.clone());
        click
    }

    pub fn add_geo(&self, click_id: i64, country: &str) {
        self.geo.lock().unwrap().insert(
            click_id,
            GeoInfo {
                click_id,
                country: Some(country.to_string()),
                ..GeoInfo::default()
            },
        );
    }

    pub fn clicks(&self) -> Vec<Click> {
        self.clicks.lock().unwrap().clone()
    }

    pub fn link(&self, id: i64) -> Option<Link> {
        self.links.lock().unwrap().iter().find(|l| l.id == id).cloned()
    }
}

#[async_trait]
impl LinkRepository for MemoryStore {
    async fn create(&self, new_link: NewLink) -> Result<Link, AppError> {
        let mut links = self.links.lock().unwrap();
        if links.iter().any(|l| l.code == new_link.code) {
            return Err(AppError::conflict(
                "Unique constraint violation",
                json!({ "constraint": LINKS_CODE_CONSTRAINT }),
            ));
        }

        let link = Link::new(
            links.len() as i64 + 1,
            new_link.user_id,
            new_link.code,
            new_link.long_url,
            new_link.title,
            Utc::now(),
            false,
        );
        links.push(link.clone());
        Ok(link)
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<Link>, AppError> {
        Ok(self.links.lock().unwrap().iter().find(|l| l.code == code).cloned())
    }

    async fn find_by_id_for_owner(&self, id: i64, user_id: i64) -> Result<Option<Link>, AppError> {
        Ok(self
            .links
            .lock()
            .unwrap()
            .iter()
            .find(|l| l.id == id && l.user_id == user_id)
            .cloned())
    }

    async fn find_by_long_url_for_owner(
        &self,
        long_url: &str,
        user_id: i64,
    ) -> Result<Option<Link>, AppError> {
        let links = self.links.lock().unwrap();
        let mut matching: Vec<&Link> = links
            .iter()
            .filter(|l| l.long_url == long_url && l.user_id == user_id)
            .collect();
        matching.sort_by_key(|l| (l.expired, std::cmp::Reverse(l.id)));
        Ok(matching.first().map(|l| (*l).clone()))
    }

    async fn exists_code(&self, code: &str) -> Result<bool, AppError> {
        Ok(self.links.lock().unwrap().iter().any(|l| l.code == code))
    }

    async fn list_for_owner(
        &self,
        user_id: i64,
        active_only: bool,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Link>, AppError> {
        let links = self.links.lock().unwrap();
        Ok(links
            .iter()
            .rev()
            .filter(|l| l.user_id == user_id && (!active_only || !l.expired))
            .skip(offset as usize)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn count_for_owner(&self, user_id: i64, active_only: bool) -> Result<i64, AppError> {
        let links = self.links.lock().unwrap();
        Ok(links
            .iter()
            .filter(|l| l.user_id == user_id && (!active_only || !l.expired))
            .count() as i64)
    }

    async fn mark_expired(&self, id: i64) -> Result<bool, AppError> {
        let mut links = self.links.lock().unwrap();
        match links.iter_mut().find(|l| l.id == id && !l.expired) {
            Some(link) => {
                link.expired = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }
}

#[async_trait]
impl ClickRepository for MemoryStore {
    async fn insert(&self, new_click: NewClick) -> Result<Click, AppError> {
        Ok(self.add_click(
            new_click.link_id,
            &new_click.ip,
            &new_click.user_agent,
            Utc::now(),
        ))
    }

    async fn query_range(
        &self,
        link_id: i64,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        granularity: Granularity,
    ) -> Result<Vec<BucketCount>, AppError> {
        let mut buckets: BTreeMap<DateTime<Utc>, i64> = BTreeMap::new();
        for click in self.clicks.lock().unwrap().iter() {
            if click.link_id == link_id && click.clicked_at >= start && click.clicked_at <= end {
                *buckets.entry(granularity.truncate(click.clicked_at)).or_default() += 1;
            }
        }

        Ok(buckets
            .into_iter()
            .map(|(bucket, clicks)| BucketCount { bucket, clicks })
            .collect())
    }

    async fn all_for_link(&self, link_id: i64) -> Result<Vec<Click>, AppError> {
        Ok(self
            .clicks
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.link_id == link_id)
            .cloned()
            .collect())
    }

    async fn all_with_geo(&self, link_id: i64) -> Result<Vec<ClickWithGeo>, AppError> {
        let geo = self.geo.lock().unwrap();
        Ok(self
            .clicks
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.link_id == link_id)
            .map(|c| ClickWithGeo {
                click: c.clone(),
                geo: geo.get(&c.id).cloned(),
            })
            .collect())
    }

    async fn count_for_link(&self, link_id: i64) -> Result<i64, AppError> {
        Ok(self
            .clicks
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.link_id == link_id)
            .count() as i64)
    }
}

#[async_trait]
impl GeoRepository for MemoryStore {
    async fn save(&self, new_geo: NewGeoInfo) -> Result<GeoInfo, AppError> {
        let location = new_geo.location;
        let info = GeoInfo {
            click_id: new_geo.click_id,
            ip: new_geo.ip,
            city: location.city,
            region: location.region,
            country: location.country,
            loc: location.loc,
            org: location.org,
            postal: location.postal,
            timezone: location.timezone,
            created_at: Utc::now(),
        };
        self.geo.lock().unwrap().insert(info.click_id, info.clone());
        Ok(info)
    }

    async fn find_by_click(&self, click_id: i64) -> Result<Option<GeoInfo>, AppError> {
        Ok(self.geo.lock().unwrap().get(&click_id).cloned())
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn create(&self, username: &str) -> Result<User, AppError> {
        let mut users = self.users.lock().unwrap();
        let user = User {
            id: users.len() as i64 + 1,
            username: username.to_string(),
            external_api_token: None,
            created_at: Utc::now(),
        };
        users.push(user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, AppError> {
        Ok(self.users.lock().unwrap().iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn list(&self) -> Result<Vec<User>, AppError> {
        Ok(self.users.lock().unwrap().clone())
    }
}

#[async_trait]
impl TokenRepository for MemoryStore {
    async fn find_user_id(&self, token_hash: &str) -> Result<Option<i64>, AppError> {
        Ok(self
            .tokens
            .lock()
            .unwrap()
            .iter()
            .find(|t| t.token_hash == token_hash && t.revoked_at.is_none())
            .map(|t| t.user_id))
    }

    async fn update_last_used(&self, token_hash: &str) -> Result<(), AppError> {
        if let Some(token) = self
            .tokens
            .lock()
            .unwrap()
            .iter_mut()
            .find(|t| t.token_hash == token_hash)
        {
            token.last_used_at = Some(Utc::now());
        }
        Ok(())
    }

    async fn create_token(
        &self,
        user_id: i64,
        name: &str,
        token_hash: &str,
    ) -> Result<ApiToken, AppError> {
        let mut tokens = self.tokens.lock().unwrap();
        let token = ApiToken {
            id: tokens.len() as i64 + 1,
            user_id,
            name: name.to_string(),
            token_hash: token_hash.to_string(),
            created_at: Utc::now(),
            last_used_at: None,
            revoked_at: None,
        };
        tokens.push(token.clone());
        Ok(token)
    }

    async fn list_tokens(&self) -> Result<Vec<ApiToken>, AppError> {
        Ok(self.tokens.lock().unwrap().clone())
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<ApiToken>, AppError> {
        Ok(self
            .tokens
            .lock()
            .unwrap()
            .iter()
            .find(|t| t.name == name)
            .cloned())
    }

    async fn revoke_token(&self, id: i64) -> Result<(), AppError> {
        let mut tokens = self.tokens.lock().unwrap();
        match tokens.iter_mut().find(|t| t.id == id) {
            Some(token) => {
                token.revoked_at = Some(Utc::now());
                Ok(())
            }
            None => Err(AppError::not_found("Token not found", json!({ "id": id }))),
        }
    }
}

/// Geolocation provider answering from a fixed IP → country table.
pub struct FixedGeoLookup(pub HashMap<String, String>);

#[async_trait]
impl GeoLookup for FixedGeoLookup {
    async fn lookup(&self, ip: IpAddr) -> Result<GeoLookupResult, AppError> {
        match self.0.get(&ip.to_string()) {
            Some(country) => Ok(GeoLookupResult {
                country: Some(country.clone()),
                ..GeoLookupResult::default()
            }),
            None => Err(AppError::upstream("Lookup failed", json!({ "ip": ip.to_string() }))),
        }
    }
}

pub struct TestContext {
    pub state: AppState,
    pub store: Arc<MemoryStore>,
    pub geo_rx: mpsc::Receiver<GeoJob>,
}

pub fn create_test_state() -> TestContext {
    let store = MemoryStore::seeded();
    let (tx, rx) = mpsc::channel(100);

    let link_service = Arc::new(LinkService::new(
        store.clone(),
        Arc::new(NullCache),
        BASE_URL,
    ));
    let click_service = Arc::new(ClickService::new(store.clone(), tx));
    let analytics_service = Arc::new(AnalyticsService::new(store.clone()));
    let auth_service = Arc::new(AuthService::new(
        store.clone(),
        store.clone(),
        SIGNING_SECRET.to_string(),
    ));

    let state = AppState {
        link_service,
        click_service,
        analytics_service,
        auth_service,
        cache: Arc::new(NullCache),
        behind_proxy: false,
    };

    TestContext {
        state,
        store,
        geo_rx: rx,
    }
}

/// Serves the full router with a fixed peer address.
pub fn test_server(state: AppState) -> TestServer {
    TestServer::new(router(state).layer(MockConnectInfoLayer)).unwrap()
}

pub fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}

#[derive(Clone)]
pub struct MockConnectInfoLayer;

impl<S> Layer<S> for MockConnectInfoLayer {
    type Service = MockConnectInfoService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        MockConnectInfoService { inner }
    }
}

#[derive(Clone)]
pub struct MockConnectInfoService<S> {
    inner: S,
}

impl<S, B> tower::Service<axum::http::Request<B>> for MockConnectInfoService<S>
where
    S: tower::Service<axum::http::Request<B>> + Clone + Send + 'static,
    S::Future: Send + 'static,
    B: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: axum::http::Request<B>) -> Self::Future {
        let addr: SocketAddr = "127.0.0.1:12345".parse().unwrap();
        req.extensions_mut().insert(ConnectInfo(addr));
        self.inner.call(req)
    }
}

pub async fn create_test_user(pool: &PgPool, username: &str) -> i64 {
    sqlx::query_scalar("INSERT INTO users (username) VALUES ($1) RETURNING id")
        .bind(username)
        .fetch_one(pool)
        .await
        .unwrap()
}

pub async fn create_test_link(pool: &PgPool, user_id: i64, code: &str, url: &str) -> i64 {
    sqlx::query_scalar(
        "INSERT INTO links (user_id, code, long_url, title) VALUES ($1, $2, $3, $2) RETURNING id",
    )
    .bind(user_id)
    .bind(code)
    .bind(url)
    .fetch_one(pool)
    .await
    .unwrap()
}

pub async fn create_test_click_at(
    pool: &PgPool,
    link_id: i64,
    ip: &str,
    clicked_at: DateTime<Utc>,
) -> i64 {
    sqlx::query_scalar(
        "INSERT INTO clicks (link_id, ip, user_agent, clicked_at) VALUES ($1, $2, 'test-agent', $3) RETURNING id",
    )
    .bind(link_id)
    .bind(ip)
    .bind(clicked_at)
    .fetch_one(pool)
    .await
    .unwrap()
}
