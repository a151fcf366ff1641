//! Per-request session carried in a signed cookie.
//!
//! Handlers take a [`Session`] as an extractor, mutate it, and return it as
//! part of the response so the updated state is written back. The flash
//! message is read-once: [`Session::take_flash`] clears it, and because the
//! session is returned with that same response the cleared state sticks.

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::response::{IntoResponseParts, ResponseParts};
use axum_extra::extract::cookie::{Cookie, Key, SameSite, SignedCookieJar};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::AppState;

pub const SESSION_COOKIE_NAME: &str = "cms_session";

/// Session contents as stored in the cookie.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_to: Option<String>,
}

impl SessionData {
    fn encode(&self) -> String {
        // Serializing a struct of optional strings cannot fail
        let json = serde_json::to_vec(self).unwrap_or_default();
        URL_SAFE_NO_PAD.encode(json)
    }

    fn decode(value: &str) -> Option<Self> {
        let json = URL_SAFE_NO_PAD.decode(value).ok()?;
        serde_json::from_slice(&json).ok()
    }
}

/// Cookie attributes copied from the session config at extraction time.
#[derive(Debug, Clone, Copy)]
struct CookieSettings {
    lifetime_secs: u64,
    secure: bool,
}

pub struct Session {
    jar: SignedCookieJar<Key>,
    data: SessionData,
    settings: CookieSettings,
}

impl Session {
    pub fn username(&self) -> Option<&str> {
        self.data.username.as_deref()
    }

    pub fn is_signed_in(&self) -> bool {
        self.data.username.is_some()
    }

    pub fn sign_in(&mut self, username: impl Into<String>) {
        self.data.username = Some(username.into());
    }

    pub fn sign_out(&mut self) {
        self.data.username = None;
    }

    /// Set the message shown on the next rendered page.
    pub fn flash(&mut self, message: impl Into<String>) {
        self.data.flash = Some(message.into());
    }

    /// Take the pending flash message, clearing it.
    pub fn take_flash(&mut self) -> Option<String> {
        self.data.flash.take()
    }

    pub fn set_return_to(&mut self, path: impl Into<String>) {
        self.data.return_to = Some(path.into());
    }

    pub fn take_return_to(&mut self) -> Option<String> {
        self.data.return_to.take()
    }

    fn cookie(&self) -> Cookie<'static> {
        let lifetime = i64::try_from(self.settings.lifetime_secs).unwrap_or(i64::MAX);
        Cookie::build((SESSION_COOKIE_NAME, self.data.encode()))
            .path("/")
            .http_only(true)
            .secure(self.settings.secure)
            .same_site(SameSite::Lax)
            .max_age(time::Duration::seconds(lifetime))
            .build()
    }
}

impl FromRequestParts<AppState> for Session {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar = SignedCookieJar::<Key>::from_request_parts(parts, state).await?;

        // A missing, forged, or undecodable cookie starts a fresh session
        let data = jar
            .get(SESSION_COOKIE_NAME)
            .and_then(|cookie| SessionData::decode(cookie.value()))
            .unwrap_or_default();

        Ok(Self {
            jar,
            data,
            settings: CookieSettings {
                lifetime_secs: state.config.session.session_lifetime_secs,
                secure: state.config.session.secure_cookie,
            },
        })
    }
}

impl IntoResponseParts for Session {
    type Error = Infallible;

    fn into_response_parts(self, res: ResponseParts) -> Result<ResponseParts, Self::Error> {
        let cookie = self.cookie();
        self.jar.add(cookie).into_response_parts(res)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_data_encoding_round_trips() {
        let data = SessionData {
            username: Some("admin".to_string()),
            flash: Some("Welcome!".to_string()),
            return_to: Some("/about.md".to_string()),
        };

        let encoded = data.encode();
        assert!(!encoded.contains(['"', ',', ';', ' ']));
        assert_eq!(SessionData::decode(&encoded), Some(data));
    }

    #[test]
    fn test_garbage_cookie_does_not_decode() {
        assert_eq!(SessionData::decode("%%%"), None);
        assert_eq!(SessionData::decode(&URL_SAFE_NO_PAD.encode("[1,2]")), None);
    }

    #[test]
    fn test_empty_session_encodes_compactly() {
        let encoded = SessionData::default().encode();
        assert_eq!(URL_SAFE_NO_PAD.decode(encoded).unwrap(), b"{}");
    }
}
