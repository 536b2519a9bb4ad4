use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use chrono::{Duration as ChronoDuration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use sea_orm::{ColumnTrait, EntityTrait, ModelTrait, QueryFilter};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::DbPool;
use crate::entities::{company, company_user, rep_account, user};
use crate::errors::ServiceError;

/// Claim structure for JWT tokens
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub jti: String,
    pub iat: i64,
    pub exp: i64,
}

/// Authentication configuration
#[derive(Clone, Debug)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub token_expiration: std::time::Duration,
}

impl AuthConfig {
    pub fn new(jwt_secret: String, token_expiration: std::time::Duration) -> Self {
        Self {
            jwt_secret,
            token_expiration,
        }
    }
}

/// Issues and validates bearer tokens.
#[derive(Clone, Debug)]
pub struct AuthService {
    config: AuthConfig,
}

impl AuthService {
    pub fn new(config: AuthConfig) -> Self {
        Self { config }
    }

    /// Generate a JWT token for a user
    pub fn generate_token(&self, user: &user::Model) -> Result<String, ServiceError> {
        let now = Utc::now();
        let exp = now
            + ChronoDuration::from_std(self.config.token_expiration)
                .map_err(|_| ServiceError::InternalError("invalid token duration".to_string()))?;

        let claims = Claims {
            sub: user.id.to_string(),
            name: Some(user.name.clone()),
            email: Some(user.email.clone()),
            jti: Uuid::new_v4().to_string(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.config.jwt_secret.as_bytes()),
        )
        .map_err(|e| ServiceError::InternalError(format!("token creation failed: {}", e)))
    }

    /// Validate a JWT token and extract the claims
    pub fn validate_token(&self, token: &str) -> Result<Claims, ServiceError> {
        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.config.jwt_secret.as_bytes()),
            &Validation::new(Algorithm::HS256),
        )
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                ServiceError::Unauthorized("token expired".to_string())
            }
            _ => ServiceError::Unauthorized("invalid token".to_string()),
        })
    }
}

/// Authenticated principal extracted from the bearer token.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
}

#[async_trait]
impl FromRequestParts<crate::AppState> for AuthUser {
    type Rejection = ServiceError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &crate::AppState,
    ) -> Result<Self, Self::Rejection> {
        let header_value = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ServiceError::Unauthorized("missing bearer token".to_string()))?;

        let token = header_value
            .strip_prefix("Bearer ")
            .ok_or_else(|| ServiceError::Unauthorized("missing bearer token".to_string()))?
            .trim();

        let claims = state.auth_service.validate_token(token)?;
        let user_id = Uuid::parse_str(&claims.sub)
            .map_err(|_| ServiceError::Unauthorized("invalid token subject".to_string()))?;

        Ok(AuthUser { user_id })
    }
}

/// The requester plus everything scope checks need: company memberships and,
/// for sales reps, represented accounts.
#[derive(Debug, Clone)]
pub struct Identity {
    pub user: user::Model,
    pub companies: Vec<company::Model>,
    pub rep_company_ids: Vec<Uuid>,
}

impl Identity {
    pub fn user_id(&self) -> Uuid {
        self.user.id
    }

    pub fn company_ids(&self) -> Vec<Uuid> {
        self.companies.iter().map(|c| c.id).collect()
    }

    /// True when the user ships for this company.
    pub fn is_member(&self, company_id: Uuid) -> bool {
        self.companies.iter().any(|c| c.id == company_id)
    }

    /// Listing/lookup scope: memberships, widened by rep accounts for sales
    /// reps. Writes never use this; they require membership.
    pub fn can_view_company(&self, company_id: Uuid) -> bool {
        if self.is_member(company_id) {
            return true;
        }
        self.user.user_type == user::UserType::SalesRep
            && self.rep_company_ids.contains(&company_id)
    }

    pub fn viewable_company_ids(&self) -> Vec<Uuid> {
        let mut ids = self.company_ids();
        if self.user.user_type == user::UserType::SalesRep {
            for id in &self.rep_company_ids {
                if !ids.contains(id) {
                    ids.push(*id);
                }
            }
        }
        ids
    }

    pub fn membership(&self, company_id: Uuid) -> Option<&company::Model> {
        self.companies.iter().find(|c| c.id == company_id)
    }

    pub fn primary_company(&self) -> Option<&company::Model> {
        self.companies
            .iter()
            .find(|c| c.is_primary)
            .or_else(|| self.companies.first())
    }

    /// Shipping clerks are locked out of the waybill workflows.
    pub fn forbid_shipping_clerks(&self) -> Result<(), ServiceError> {
        if self.user.user_type == user::UserType::ShippingClerk {
            return Err(ServiceError::Forbidden(
                "shipping clerks cannot access waybills".to_string(),
            ));
        }
        Ok(())
    }
}

/// Load the requester's profile and company scope in one go.
pub async fn load_identity(db: &DbPool, user_id: Uuid) -> Result<Identity, ServiceError> {
    let user = user::Entity::find_by_id(user_id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::Unauthorized("unknown user".to_string()))?;

    let companies = user
        .find_related(company::Entity)
        .all(db)
        .await
        .map_err(ServiceError::DatabaseError)?;

    let rep_company_ids = if user.user_type == user::UserType::SalesRep {
        rep_account::Entity::find()
            .filter(rep_account::Column::UserId.eq(user_id))
            .all(db)
            .await?
            .into_iter()
            .map(|r| r.company_id)
            .collect()
    } else {
        Vec::new()
    };

    Ok(Identity {
        user,
        companies,
        rep_company_ids,
    })
}

/// Membership rows for seeding and tests.
pub async fn add_membership(
    db: &DbPool,
    company_id: Uuid,
    user_id: Uuid,
) -> Result<(), ServiceError> {
    use sea_orm::{ActiveModelTrait, Set};
    company_user::ActiveModel {
        company_id: Set(company_id),
        user_id: Set(user_id),
    }
    .insert(db)
    .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn make_user(user_type: user::UserType) -> user::Model {
        user::Model {
            id: Uuid::new_v4(),
            name: "Taylor".to_string(),
            email: "taylor@example.com".to_string(),
            phone: None,
            user_type,
            created_at: Utc::now(),
        }
    }

    fn make_company(is_primary: bool) -> company::Model {
        company::Model {
            id: Uuid::new_v4(),
            name: "Acme Freight".to_string(),
            address_line_1: None,
            address_line_2: None,
            address_line_3: None,
            phone: None,
            is_primary,
            sales_rep_id: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn token_round_trip() {
        let service = AuthService::new(AuthConfig::new(
            "a_sufficiently_long_test_secret_for_signing_tokens".to_string(),
            std::time::Duration::from_secs(3600),
        ));
        let user = make_user(user::UserType::User);
        let token = service.generate_token(&user).expect("token");
        let claims = service.validate_token(&token).expect("claims");
        assert_eq!(claims.sub, user.id.to_string());
    }

    #[test]
    fn rep_accounts_widen_view_scope_but_not_membership() {
        let rep_company = make_company(false);
        let identity = Identity {
            user: make_user(user::UserType::SalesRep),
            companies: vec![make_company(true)],
            rep_company_ids: vec![rep_company.id],
        };

        assert!(identity.can_view_company(rep_company.id));
        assert!(!identity.is_member(rep_company.id));
        assert_eq!(identity.viewable_company_ids().len(), 2);
    }

    #[test]
    fn plain_users_do_not_get_rep_scope() {
        let other = Uuid::new_v4();
        let identity = Identity {
            user: make_user(user::UserType::User),
            companies: vec![],
            rep_company_ids: vec![other],
        };
        assert!(!identity.can_view_company(other));
    }

    #[test]
    fn shipping_clerks_are_rejected() {
        let identity = Identity {
            user: make_user(user::UserType::ShippingClerk),
            companies: vec![],
            rep_company_ids: vec![],
        };
        assert!(identity.forbid_shipping_clerks().is_err());
    }
}
