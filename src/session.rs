//! Cookie-backed sessions.
//!
//! The whole session lives client-side in one cookie holding an HS256 token
//! signed with the app's secret key. A handler takes [`Session`] as an
//! extractor, mutates it, and hands it back as part of the response so the
//! cookie is re-issued (or cleared once the session is empty).

use std::sync::Arc;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::request::Parts,
    response::{IntoResponseParts, ResponseParts},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{error::AppError, state::AppState};

pub const SESSION_COOKIE: &str = "session";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashCategory {
    Primary,
    Success,
    Info,
    Warning,
    Danger,
}

/// One-shot message shown on the next rendered page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub category: FlashCategory,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    username: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    flashes: Vec<Flash>,
    exp: usize,
}

#[derive(Clone)]
pub struct SessionKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: chrono::Duration,
}

impl SessionKeys {
    pub fn new(secret: &str, ttl: chrono::Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }

    fn sign(&self, username: Option<&str>, flashes: &[Flash]) -> Result<String, jsonwebtoken::errors::Error> {
        let claims = Claims {
            username: username.map(str::to_owned),
            flashes: flashes.to_vec(),
            exp: (Utc::now() + self.ttl).timestamp() as usize,
        };
        encode(&Header::default(), &claims, &self.encoding)
    }

    fn verify(&self, token: &str) -> Option<Claims> {
        decode::<Claims>(token, &self.decoding, &Validation::default())
            .map(|data| data.claims)
            .map_err(|e| debug!("Discarding session cookie: {}", e))
            .ok()
    }
}

pub struct Session {
    jar: CookieJar,
    keys: SessionKeys,
    username: Option<String>,
    flashes: Vec<Flash>,
}

impl Session {
    fn load(jar: CookieJar, keys: SessionKeys) -> Self {
        let claims = jar
            .get(SESSION_COOKIE)
            .and_then(|cookie| keys.verify(cookie.value()));
        let (username, flashes) = match claims {
            Some(claims) => (claims.username, claims.flashes),
            None => (None, Vec::new()),
        };

        Self {
            jar,
            keys,
            username,
            flashes,
        }
    }

    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    pub fn log_in(&mut self, username: impl Into<String>) {
        self.username = Some(username.into());
    }

    /// Returns the username that was logged in, if any.
    pub fn log_out(&mut self) -> Option<String> {
        self.username.take()
    }

    pub fn flash(&mut self, category: FlashCategory, message: impl Into<String>) {
        self.flashes.push(Flash {
            category,
            message: message.into(),
        });
    }

    pub fn take_flashes(&mut self) -> Vec<Flash> {
        std::mem::take(&mut self.flashes)
    }

    fn is_empty(&self) -> bool {
        self.username.is_none() && self.flashes.is_empty()
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let app_state = parts
            .extensions
            .get::<Arc<AppState>>()
            .ok_or(AppError::MissingState)?;
        let jar = CookieJar::from_headers(&parts.headers);
        Ok(Session::load(jar, app_state.sessions.clone()))
    }
}

impl IntoResponseParts for Session {
    type Error = AppError;

    fn into_response_parts(self, res: ResponseParts) -> Result<ResponseParts, Self::Error> {
        let jar = if self.is_empty() {
            if self.jar.get(SESSION_COOKIE).is_some() {
                self.jar.remove(Cookie::build((SESSION_COOKIE, "")).path("/"))
            } else {
                self.jar
            }
        } else {
            let token = self.keys.sign(self.username.as_deref(), &self.flashes)?;
            self.jar.add(
                Cookie::build((SESSION_COOKIE, token))
                    .path("/")
                    .http_only(true)
                    .same_site(SameSite::Lax),
            )
        };

        match jar.into_response_parts(res) {
            Ok(parts) => Ok(parts),
            Err(never) => match never {},
        }
    }
}
