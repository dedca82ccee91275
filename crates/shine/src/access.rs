//! Caller identity for the two-tier access rule: anonymous callers may read public
//! content and submit bookings, everything else needs a known account.

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::config::{AccountConfig, AuthConfig};
use crate::envelope::Envelope;

/// A staff identity able to call protected endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Account {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

impl Account {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            email: String::new(),
            first_name: String::new(),
            last_name: String::new(),
        }
    }

    /// "First Last" when either is set, otherwise the username.
    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.first_name, self.last_name);
        let full = full.trim();
        if full.is_empty() {
            self.username.clone()
        } else {
            full.to_string()
        }
    }
}

impl From<&AccountConfig> for Account {
    fn from(value: &AccountConfig) -> Self {
        Self {
            username: value.username.clone(),
            email: value.email.clone(),
            first_name: value.first_name.clone(),
            last_name: value.last_name.clone(),
        }
    }
}

/// Who is making the current request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Caller {
    Anonymous,
    Authenticated(Account),
}

impl Caller {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Caller::Authenticated(_))
    }

    pub fn account(&self) -> Option<&Account> {
        match self {
            Caller::Anonymous => None,
            Caller::Authenticated(account) => Some(account),
        }
    }

    pub fn require(&self) -> Result<&Account, AccessError> {
        self.account().ok_or(AccessError::Unauthenticated)
    }
}

/// Token and username lookups for configured accounts.
#[derive(Debug, Default, Clone)]
pub struct AccountDirectory {
    by_token: HashMap<String, Account>,
    by_username: HashMap<String, Account>,
}

impl AccountDirectory {
    pub fn from_config(config: &AuthConfig) -> Self {
        config
            .all_accounts()
            .fold(Self::default(), |directory, account| {
                directory.with_account(Account::from(account), account.token.clone())
            })
    }

    pub fn with_account(mut self, account: Account, token: impl Into<String>) -> Self {
        self.by_username
            .insert(account.username.clone(), account.clone());
        self.by_token.insert(token.into(), account);
        self
    }

    pub fn resolve_token(&self, token: &str) -> Option<&Account> {
        self.by_token.get(token)
    }

    pub fn find(&self, username: &str) -> Option<&Account> {
        self.by_username.get(username)
    }

    pub fn len(&self) -> usize {
        self.by_username.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_username.is_empty()
    }

    /// Resolve an `Authorization` header value (`Bearer <token>` or `Token <token>`).
    pub fn caller_for(&self, authorization: Option<&str>) -> Result<Caller, AccessError> {
        let Some(raw) = authorization else {
            return Ok(Caller::Anonymous);
        };

        let token = raw
            .split_once(' ')
            .filter(|(scheme, _)| {
                scheme.eq_ignore_ascii_case("bearer") || scheme.eq_ignore_ascii_case("token")
            })
            .map(|(_, token)| token.trim())
            .ok_or(AccessError::InvalidToken)?;

        self.resolve_token(token)
            .cloned()
            .map(Caller::Authenticated)
            .ok_or(AccessError::InvalidToken)
    }
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = AccessError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let authorization = match parts.headers.get(header::AUTHORIZATION) {
            Some(value) => Some(value.to_str().map_err(|_| AccessError::InvalidToken)?),
            None => None,
        };

        match parts.extensions.get::<Arc<AccountDirectory>>() {
            Some(directory) => directory.caller_for(authorization),
            None if authorization.is_none() => Ok(Caller::Anonymous),
            None => Err(AccessError::InvalidToken),
        }
    }
}

/// Rejections for protected endpoints.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AccessError {
    #[error("Authentication credentials were not provided.")]
    Unauthenticated,
    #[error("Invalid token.")]
    InvalidToken,
}

impl IntoResponse for AccessError {
    fn into_response(self) -> Response {
        Envelope::failure("Authentication required", self.to_string())
            .with_status(StatusCode::UNAUTHORIZED)
    }
}
