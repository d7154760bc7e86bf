//! Client for the sealed-notes API.
//!
//! Mirrors what the mobile app does on every call: serialize the body, seal
//! it under the shared envelope key, send `{"data": ...}` with the raw
//! session token in `Authorization`, then open the sealed reply.

pub mod error;

use reqwest::{Method, header};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use sealnote_crypto::EnvelopeKey;
use sealnote_types::api::{
    ErrorBody, LoginRequest, LoginResponse, NoteMutationResponse, NoteRequest, RegisterRequest,
    RegisterResponse, SealedBody, TestEncryptionResponse,
};
use sealnote_types::models::Note;

pub use error::{ClientError, Result};

pub struct Client {
    http: reqwest::Client,
    base_url: String,
    key: EnvelopeKey,
    token: Option<String>,
}

impl Client {
    /// `base_url` includes the API prefix, e.g. `http://localhost:3000/api`.
    pub fn new(base_url: impl Into<String>, key: EnvelopeKey) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            key,
            token: None,
        }
    }

    pub fn set_token(&mut self, token: impl Into<String>) {
        self.token = Some(token.into());
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub async fn register(&self, username: &str, password: &str) -> Result<RegisterResponse> {
        let body = RegisterRequest {
            username: username.into(),
            password: password.into(),
        };
        self.send(Method::POST, "/register", Some(&body), false).await
    }

    /// Log in and keep the returned token for later calls.
    pub async fn login(&mut self, username: &str, password: &str) -> Result<LoginResponse> {
        let body = LoginRequest {
            username: username.into(),
            password: password.into(),
        };
        let response: LoginResponse = self.send(Method::POST, "/login", Some(&body), false).await?;
        self.token = Some(response.token.clone());
        Ok(response)
    }

    pub async fn create_note(&self, title: &str, content: &str) -> Result<Note> {
        let body = NoteRequest {
            title: title.into(),
            content: content.into(),
        };
        self.send(Method::POST, "/notes", Some(&body), true).await
    }

    pub async fn list_notes(&self) -> Result<Vec<Note>> {
        self.send(Method::GET, "/notes", None::<&()>, true).await
    }

    pub async fn get_note(&self, id: i64) -> Result<Note> {
        self.send(Method::GET, &format!("/notes/{}", id), None::<&()>, true)
            .await
    }

    pub async fn update_note(&self, id: i64, title: &str, content: &str) -> Result<NoteMutationResponse> {
        let body = NoteRequest {
            title: title.into(),
            content: content.into(),
        };
        self.send(Method::PUT, &format!("/notes/{}", id), Some(&body), true)
            .await
    }

    pub async fn delete_note(&self, id: i64) -> Result<NoteMutationResponse> {
        self.send(Method::DELETE, &format!("/notes/{}", id), None::<&()>, true)
            .await
    }

    /// Ask the server to open `message` with its key and echo it back.
    /// A mismatch means the two sides hold different keys.
    pub async fn test_encryption(&self, message: &str) -> Result<bool> {
        let data = sealnote_crypto::seal_base64(&self.key, message.as_bytes())?;
        let response = self
            .http
            .post(self.url("/test-encryption"))
            .json(&SealedBody { data })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let bytes = response.bytes().await?;
            let message = serde_json::from_slice::<ErrorBody>(&bytes)
                .map(|b| b.error)
                .unwrap_or_else(|_| String::from_utf8_lossy(&bytes).into_owned());
            return Err(ClientError::Status { status, message });
        }

        let reply: TestEncryptionResponse = response.json().await?;
        Ok(reply.success && reply.decrypted == message)
    }

    async fn send<B, T>(&self, method: Method, path: &str, body: Option<&B>, auth: bool) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let mut request = self.http.request(method.clone(), self.url(path));

        if auth {
            let token = self.token.as_deref().ok_or(ClientError::NoToken)?;
            request = request.header(header::AUTHORIZATION, token);
        }

        if let Some(body) = body {
            let plaintext = serde_json::to_vec(body)?;
            let data = sealnote_crypto::seal_base64(&self.key, &plaintext)?;
            request = request.json(&SealedBody { data });
        }

        let response = request.send().await?;
        let status = response.status();
        debug!("{} {} -> {}", method, path, status);

        if !status.is_success() {
            let bytes = response.bytes().await?;
            let message = serde_json::from_slice::<SealedBody>(&bytes)
                .map_err(ClientError::from)
                .and_then(|sealed| self.open::<ErrorBody>(&sealed))
                .map(|b| b.error)
                .unwrap_or_else(|_| String::from_utf8_lossy(&bytes).into_owned());
            return Err(ClientError::Status { status, message });
        }

        let sealed: SealedBody = response.json().await?;
        self.open(&sealed)
    }

    fn open<T: DeserializeOwned>(&self, sealed: &SealedBody) -> Result<T> {
        let plaintext = sealnote_crypto::open_base64(&self.key, &sealed.data)?;
        Ok(serde_json::from_slice(&plaintext)?)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}
