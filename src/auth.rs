use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use serde::Serialize;

use crate::config::AppConfig;
use crate::errors::AppError;
use crate::models::Booking;
use crate::state::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Clerk,
    Customer,
    Anonymous,
}

/// Who is calling, as reported by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub role: Role,
    pub account_id: Option<String>,
}

impl Caller {
    pub fn anonymous() -> Self {
        Self {
            role: Role::Anonymous,
            account_id: None,
        }
    }

    pub fn admin() -> Self {
        Self {
            role: Role::Admin,
            account_id: None,
        }
    }

    pub fn clerk() -> Self {
        Self {
            role: Role::Clerk,
            account_id: None,
        }
    }

    pub fn customer(account_id: impl Into<String>) -> Self {
        Self {
            role: Role::Customer,
            account_id: Some(account_id.into()),
        }
    }

    pub fn is_staff(&self) -> bool {
        matches!(self.role, Role::Admin | Role::Clerk)
    }

    pub fn require_authenticated(&self) -> Result<(), AppError> {
        match self.role {
            Role::Anonymous => Err(AppError::Unauthorized),
            _ => Ok(()),
        }
    }

    pub fn require_staff(&self) -> Result<(), AppError> {
        self.require_authenticated()?;
        if self.is_staff() {
            Ok(())
        } else {
            Err(AppError::Forbidden("staff role required".to_string()))
        }
    }

    pub fn require_admin(&self) -> Result<(), AppError> {
        self.require_authenticated()?;
        if self.role == Role::Admin {
            Ok(())
        } else {
            Err(AppError::Forbidden("admin role required".to_string()))
        }
    }

    /// Staff see every booking; customers only their own.
    pub fn can_access(&self, booking: &Booking) -> bool {
        match self.role {
            Role::Admin | Role::Clerk => true,
            Role::Customer => {
                self.account_id.is_some() && booking.user_id.as_deref() == self.account_id.as_deref()
            }
            Role::Anonymous => false,
        }
    }
}

pub trait IdentityProvider: Send + Sync {
    fn identify(&self, token: &str) -> Option<Caller>;
}

/// Maps fixed bearer tokens from configuration to callers.
pub struct StaticTokenIdentity {
    tokens: HashMap<String, Caller>,
}

impl StaticTokenIdentity {
    pub fn from_config(config: &AppConfig) -> Self {
        let mut tokens = HashMap::new();
        for (token, account) in &config.customer_tokens {
            tokens.insert(token.clone(), Caller::customer(account.clone()));
        }
        if !config.clerk_token.is_empty() {
            tokens.insert(config.clerk_token.clone(), Caller::clerk());
        }
        if !config.admin_token.is_empty() {
            tokens.insert(config.admin_token.clone(), Caller::admin());
        }
        Self { tokens }
    }
}

impl IdentityProvider for StaticTokenIdentity {
    fn identify(&self, token: &str) -> Option<Caller> {
        self.tokens.get(token).cloned()
    }
}

pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for Caller {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        Ok(bearer_token(&parts.headers)
            .and_then(|token| state.identity.identify(token))
            .unwrap_or_else(Caller::anonymous))
    }
}
