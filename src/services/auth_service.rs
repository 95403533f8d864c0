//! Session cookies identifying a signed-up player.
//!
//! The cookie value is the URL-safe base64 encoding of `{"u": name, "p": password}`.
//! A browser may hold several `session_id` cookies (stale paths, old signups):
//! the first one naming a known player with the right password wins.

use std::time::Duration;

use axum::http::{HeaderMap, header::COOKIE};
use base64::{Engine, engine::general_purpose::URL_SAFE};
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::{
    error::ServiceError,
    state::{SharedState, game::PlayerName},
};

/// Name of the cookie carrying the session token.
pub const SESSION_COOKIE: &str = "session_id";
const SESSION_MAX_AGE: Duration = Duration::from_secs(30 * 24 * 60 * 60);
const PASSWORD_BYTES: usize = 10;

/// Credentials stored in the session cookie.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionToken {
    /// Player name.
    #[serde(rename = "u")]
    pub user: PlayerName,
    /// Password generated at signup.
    #[serde(rename = "p")]
    pub password: String,
}

/// Reasons a cookie value is not a session token.
#[derive(Debug, Error)]
pub enum TokenError {
    /// Not URL-safe base64.
    #[error("decoding session ID: {0}")]
    Base64(#[from] base64::DecodeError),
    /// Not the expected JSON object.
    #[error("parsing session ID: {0}")]
    Json(#[from] serde_json::Error),
}

impl SessionToken {
    /// Cookie value for this token.
    pub fn encode(&self) -> Result<String, serde_json::Error> {
        Ok(URL_SAFE.encode(serde_json::to_vec(self)?))
    }

    /// Parse a cookie value.
    pub fn decode(value: &str) -> Result<Self, TokenError> {
        let bytes = URL_SAFE.decode(value)?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

/// Fresh random password, URL-safe base64 of 10 random bytes.
pub fn generate_password() -> String {
    let mut bytes = [0_u8; PASSWORD_BYTES];
    rand::rng().fill(&mut bytes);
    URL_SAFE.encode(bytes)
}

/// `Set-Cookie` header value installing `value` as the session for every
/// route under `base_path`.
pub fn session_cookie(value: &str, base_path: &str) -> String {
    let path = if base_path.is_empty() { "/" } else { base_path };
    format!(
        "{SESSION_COOKIE}={value}; HttpOnly; Secure; SameSite=Strict; Path={path}; Max-Age={}",
        SESSION_MAX_AGE.as_secs()
    )
}

/// Every `session_id` value across all `Cookie` headers, in order.
fn session_values(headers: &HeaderMap) -> impl Iterator<Item = &str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|header| header.to_str().ok())
        .flat_map(|header| header.split(';'))
        .filter_map(|pair| {
            let (name, value) = pair.trim().split_once('=')?;
            (name == SESSION_COOKIE).then_some(value)
        })
}

/// Resolve the player a request belongs to.
pub async fn authenticate(
    state: &SharedState,
    headers: &HeaderMap,
) -> Result<PlayerName, ServiceError> {
    let mut failures = Vec::new();

    for (index, value) in session_values(headers).enumerate() {
        let token = match SessionToken::decode(value) {
            Ok(token) => token,
            Err(err) => {
                failures.push(format!("cookie {index}: {err}"));
                continue;
            }
        };

        let user = &token.user;
        let checked = state
            .game()
            .read(|game| match game.players.get(user) {
                None => Err(format!("cookie {index}: unknown user name `{user}`")),
                Some(player) if player.password != token.password => {
                    Err(format!("cookie {index}: invalid password"))
                }
                Some(_) => Ok(()),
            })
            .await;

        match checked {
            Ok(()) => return Ok(token.user),
            Err(reason) => failures.push(reason),
        }
    }

    if failures.is_empty() {
        return Err(ServiceError::Unauthorized("not signed up".into()));
    }
    debug!(?failures, "rejected session cookies");
    Err(ServiceError::Unauthorized(failures.join("; ")))
}
