//! In-memory fakes for the ports, shared by the unit tests.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::json;
use sgdis_domain::{
    ACCESS_TOKEN_KEY, AccessToken, ApiRequest, ApiResponse, Cookie, CookieJar, CountdownStyle,
    SessionConfig,
};

use crate::auth::{Credentials, SessionManager, SessionTerminator};
use crate::ports::{
    AlertError, AlertSound, Clock, CookieStore, HttpClient, HttpClientError, KeyValueStore,
    ManualClock, Navigator, Notice, Notifier, RefreshError, RefreshedToken, StorageError,
    TokenRefresher, WarningView, WarningViewError,
};

pub fn token_expiring_in(now: DateTime<Utc>, secs: i64) -> String {
    AccessToken::unsigned(&json!({ "sub": "7", "exp": now.timestamp() + secs }))
}

#[derive(Default)]
pub struct MemoryStore(Mutex<HashMap<String, String>>);

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.0.lock().unwrap().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.0
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.0.lock().unwrap().remove(key);
        Ok(())
    }
}

pub struct MemoryCookies {
    jar: Mutex<CookieJar>,
    clock: Arc<dyn Clock>,
}

impl MemoryCookies {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            jar: Mutex::new(CookieJar::new()),
            clock,
        }
    }

    pub fn cookie(&self, name: &str) -> Option<Cookie> {
        self.jar
            .lock()
            .unwrap()
            .get(name, self.clock.now())
            .cloned()
    }
}

impl CookieStore for MemoryCookies {
    fn get(&self, name: &str) -> Option<String> {
        self.cookie(name).map(|c| c.value)
    }

    fn set(&self, cookie: Cookie) {
        self.jar.lock().unwrap().add(cookie, self.clock.now());
    }

    fn remove(&self, name: &str) {
        self.jar.lock().unwrap().remove(name);
    }

    fn apply_set_cookies(&self, headers: &[String]) {
        self.jar
            .lock()
            .unwrap()
            .process_set_cookies(headers.iter().map(String::as_str), self.clock.now());
    }
}

/// Refresher answering from a script, one outcome per call.
pub struct ScriptedRefresher {
    outcomes: Mutex<VecDeque<Result<RefreshedToken, RefreshError>>>,
    delay: Duration,
    calls: AtomicUsize,
    seen: Mutex<Vec<String>>,
}

impl ScriptedRefresher {
    pub fn new(outcomes: Vec<Result<RefreshedToken, RefreshError>>) -> Self {
        Self {
            outcomes: Mutex::new(outcomes.into()),
            delay: Duration::from_millis(20),
            calls: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn issuing(token: &str) -> Self {
        Self::new(vec![Ok(RefreshedToken {
            access_token: token.to_string(),
            set_cookies: Vec::new(),
        })])
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn seen(&self) -> Vec<String> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl TokenRefresher for ScriptedRefresher {
    async fn refresh(&self, refresh_token: &str) -> Result<RefreshedToken, RefreshError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().unwrap().push(refresh_token.to_string());
        tokio::time::sleep(self.delay).await;
        self.outcomes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(RefreshError::Network("script exhausted".to_string())))
    }
}

/// HTTP client answering from a script and recording every request.
#[derive(Default)]
pub struct ScriptedHttp {
    statuses: Mutex<VecDeque<u16>>,
    requests: Mutex<Vec<ApiRequest>>,
}

impl ScriptedHttp {
    pub fn with_statuses(statuses: &[u16]) -> Self {
        Self {
            statuses: Mutex::new(statuses.iter().copied().collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl HttpClient for ScriptedHttp {
    async fn execute(&self, request: &ApiRequest) -> Result<ApiResponse, HttpClientError> {
        self.requests.lock().unwrap().push(request.clone());
        let status = self.statuses.lock().unwrap().pop_front().unwrap_or(200);
        Ok(ApiResponse::new(
            status,
            vec![("content-type".to_string(), "application/json".to_string())],
            br#"{"id":7,"username":"ana"}"#.to_vec(),
        ))
    }
}

#[derive(Default)]
pub struct RecordingNotifier(Mutex<Vec<Notice>>);

impl RecordingNotifier {
    pub fn notices(&self) -> Vec<Notice> {
        self.0.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        self.0.lock().unwrap().push(notice);
    }
}

#[derive(Default)]
pub struct RecordingNavigator(Mutex<Vec<String>>);

impl RecordingNavigator {
    pub fn visits(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn redirect(&self, path: &str) {
        self.0.lock().unwrap().push(path.to_string());
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewCall {
    Show(u64),
    Update(u64),
    Hide,
}

#[derive(Default)]
pub struct RecordingView {
    calls: Mutex<Vec<ViewCall>>,
    broken: bool,
}

impl RecordingView {
    pub fn broken() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            broken: true,
        }
    }

    pub fn calls(&self) -> Vec<ViewCall> {
        self.calls.lock().unwrap().clone()
    }
}

impl WarningView for RecordingView {
    fn show(&self, remaining: u64, _style: CountdownStyle) -> Result<(), WarningViewError> {
        if self.broken {
            return Err(WarningViewError("no modal in this page".to_string()));
        }
        self.calls.lock().unwrap().push(ViewCall::Show(remaining));
        Ok(())
    }

    fn update(&self, remaining: u64, _style: CountdownStyle) {
        self.calls.lock().unwrap().push(ViewCall::Update(remaining));
    }

    fn hide(&self) {
        self.calls.lock().unwrap().push(ViewCall::Hide);
    }
}

pub struct MutedAlert;

impl AlertSound for MutedAlert {
    fn play(&self) -> Result<(), AlertError> {
        Err(AlertError("audio blocked".to_string()))
    }
}

/// Every collaborator of a session, kept around for assertions.
pub struct Harness {
    pub clock: Arc<ManualClock>,
    pub store: Arc<MemoryStore>,
    pub cookies: Arc<MemoryCookies>,
    pub refresher: Arc<ScriptedRefresher>,
    pub notifier: Arc<RecordingNotifier>,
    pub navigator: Arc<RecordingNavigator>,
    pub credentials: Credentials,
    pub terminator: Arc<SessionTerminator>,
    pub session: SessionManager,
}

impl Harness {
    pub fn new(refresher: ScriptedRefresher) -> Self {
        let config = SessionConfig::default();
        let clock = Arc::new(ManualClock::default());
        let store = Arc::new(MemoryStore::default());
        let cookies = Arc::new(MemoryCookies::new(clock.clone()));
        let refresher = Arc::new(refresher);
        let notifier = Arc::new(RecordingNotifier::default());
        let navigator = Arc::new(RecordingNavigator::default());

        let credentials = Credentials::new(
            store.clone(),
            cookies.clone(),
            clock.clone(),
            config.jwt_cookie_max_age(),
        );
        let terminator = Arc::new(SessionTerminator::new(
            credentials.clone(),
            notifier.clone(),
            navigator.clone(),
            &config,
        ));
        let session = SessionManager::new(
            config,
            credentials.clone(),
            refresher.clone(),
            clock.clone(),
            terminator.clone(),
        );

        Self {
            clock,
            store,
            cookies,
            refresher,
            notifier,
            navigator,
            credentials,
            terminator,
            session,
        }
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn with_access_token(self, token: &str) -> Self {
        self.store.set(ACCESS_TOKEN_KEY, token).unwrap();
        self
    }

    pub fn with_refresh_cookie(self, value: &str) -> Self {
        self.cookies
            .set(Cookie::new(sgdis_domain::REFRESH_TOKEN_COOKIE, value).with_path("/"));
        self
    }

    pub fn stored_token(&self) -> Option<String> {
        self.store.get(ACCESS_TOKEN_KEY)
    }
}
