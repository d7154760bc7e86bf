#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use axum::{
    Router,
    body::{Body, Bytes},
    http::{Method, Request, StatusCode, header},
};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use sealnote_api::token::issue_token;
use sealnote_api::{AppStateInner, Settings, router};
use sealnote_crypto::EnvelopeKey;
use sealnote_db::{Database, NoteRow, Store, UserRow};
use sealnote_types::api::SealedBody;

pub const ENVELOPE_KEY: &str = "12345678901234567890123456789012";
pub const JWT_SECRET: &str = "integration-test-secret";

/// Delegates to a real database and counts every call, so tests can prove a
/// rejected request never reached persistence.
pub struct CountingStore {
    inner: Database,
    calls: Arc<AtomicUsize>,
    /// Username lookups report no user, as if another registration landed
    /// between the lookup and the insert.
    stale_user_lookups: bool,
}

impl CountingStore {
    fn tick(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

impl Store for CountingStore {
    fn create_user(&self, username: &str, password_hash: &str) -> anyhow::Result<Option<i64>> {
        self.tick();
        self.inner.create_user(username, password_hash)
    }

    fn get_user_by_username(&self, username: &str) -> anyhow::Result<Option<UserRow>> {
        self.tick();
        if self.stale_user_lookups {
            return Ok(None);
        }
        self.inner.get_user_by_username(username)
    }

    fn insert_note(&self, owner_id: i64, title: &str, content: &str) -> anyhow::Result<NoteRow> {
        self.tick();
        self.inner.insert_note(owner_id, title, content)
    }

    fn list_notes(&self, owner_id: i64) -> anyhow::Result<Vec<NoteRow>> {
        self.tick();
        self.inner.list_notes(owner_id)
    }

    fn get_note(&self, id: i64) -> anyhow::Result<Option<NoteRow>> {
        self.tick();
        self.inner.get_note(id)
    }

    fn note_owner(&self, id: i64) -> anyhow::Result<Option<i64>> {
        self.tick();
        self.inner.note_owner(id)
    }

    fn update_note(&self, id: i64, title: &str, content: &str) -> anyhow::Result<Option<NoteRow>> {
        self.tick();
        self.inner.update_note(id, title, content)
    }

    fn delete_note(&self, id: i64) -> anyhow::Result<Option<NoteRow>> {
        self.tick();
        self.inner.delete_note(id)
    }
}

/// Sample data: a victim with two notes and an attacker with one, plus
/// tokens signed directly rather than through /login.
pub struct Fixture {
    pub victim_id: i64,
    pub attacker_id: i64,
    pub victim_notes: Vec<i64>,
    pub attacker_note: i64,
    pub victim_token: String,
    pub attacker_token: String,
}

pub fn seed_sample_data(db: &Database) -> Fixture {
    let victim_id = db.create_user("victim", "victim_hash").unwrap().unwrap();
    let attacker_id = db.create_user("attacker", "attacker_hash").unwrap().unwrap();

    let victim_notes = vec![
        db.insert_note(victim_id, "Victim Secret 1", "Secret info of victim 1")
            .unwrap()
            .id,
        db.insert_note(victim_id, "Victim Secret 2", "Secret info of victim 2")
            .unwrap()
            .id,
    ];
    let attacker_note = db
        .insert_note(attacker_id, "Attacker Note", "This is attacker's note")
        .unwrap()
        .id;

    let ttl = Duration::from_secs(3600);
    Fixture {
        victim_id,
        attacker_id,
        victim_notes,
        attacker_note,
        victim_token: issue_token(JWT_SECRET, victim_id, ttl).unwrap(),
        attacker_token: issue_token(JWT_SECRET, attacker_id, ttl).unwrap(),
    }
}

pub struct TestApp {
    pub router: Router,
    pub key: EnvelopeKey,
    pub store_calls: Arc<AtomicUsize>,
    pub fixture: Fixture,
}

pub struct Reply {
    pub status: StatusCode,
    /// Raw wire body.
    pub raw: Bytes,
    /// Opened plaintext JSON, `Null` when the body was empty.
    pub json: Value,
}

pub fn settings(allow_idor: bool) -> Settings {
    let allow = if allow_idor { "true" } else { "false" };
    Settings::from_lookup(|name| match name {
        "SEALNOTE_ENVELOPE_KEY" => Some(ENVELOPE_KEY.to_string()),
        "SEALNOTE_JWT_SECRET" => Some(JWT_SECRET.to_string()),
        "SEALNOTE_ALLOW_IDOR" => Some(allow.to_string()),
        _ => None,
    })
    .unwrap()
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_idor(false)
    }

    pub fn with_idor(allow_idor: bool) -> Self {
        Self::build(allow_idor, false)
    }

    pub fn with_stale_user_lookups() -> Self {
        Self::build(false, true)
    }

    fn build(allow_idor: bool, stale_user_lookups: bool) -> Self {
        let db = Database::open_in_memory().unwrap();
        let fixture = seed_sample_data(&db);

        let store_calls = Arc::new(AtomicUsize::new(0));
        let store = CountingStore {
            inner: db,
            calls: store_calls.clone(),
            stale_user_lookups,
        };

        let settings = settings(allow_idor);
        let state = AppStateInner::new(&settings, Box::new(store));

        Self {
            router: router(state),
            key: settings.envelope_key,
            store_calls,
            fixture,
        }
    }

    pub fn store_calls(&self) -> usize {
        self.store_calls.load(Ordering::SeqCst)
    }

    pub fn seal(&self, value: &Value) -> Value {
        let plaintext = serde_json::to_vec(value).unwrap();
        let data = sealnote_crypto::seal_base64(&self.key, &plaintext).unwrap();
        serde_json::json!({ "data": data })
    }

    /// Send `body` exactly as given.
    pub async fn raw(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Vec<u8>>,
    ) -> (StatusCode, Bytes) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, token);
        }
        let body = match body {
            Some(bytes) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(bytes)
            }
            None => Body::empty(),
        };

        let response = self
            .router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, bytes)
    }

    /// Seal `body`, send it, and open the sealed reply.
    pub async fn call(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> Reply {
        let body = body.map(|v| serde_json::to_vec(&self.seal(&v)).unwrap());
        let (status, raw) = self.raw(method, uri, token, body).await;
        let json = self.open_reply(&raw);
        Reply { status, raw, json }
    }

    pub fn open_reply(&self, raw: &[u8]) -> Value {
        if raw.is_empty() {
            return Value::Null;
        }
        let sealed: SealedBody = serde_json::from_slice(raw).expect("reply is not a sealed envelope");
        let plaintext = sealnote_crypto::open_base64(&self.key, &sealed.data).unwrap();
        serde_json::from_slice(&plaintext).unwrap()
    }
}
