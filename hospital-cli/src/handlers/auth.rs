// hospital-cli/src/handlers/auth.rs
// ============================================================================
// Module: Auth Handlers
// Description: Registration, login (with lockout), refresh, and the current-
// user lookup.
// Dependencies: axum, hospital-core, hospital-events, hospital-identity,
// hospital-token
// ============================================================================

use std::sync::Arc;

use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use hospital_core::ids::{TenantId, UserId};
use hospital_core::{EventEnvelope, EventType, HospitalError};
use hospital_events::Publisher;
use hospital_identity::{hash_password, validate_password_policy, verify_password, IdentityStore, User};
use hospital_token::MintRequest;
use serde::{Deserialize, Serialize};

use crate::context::AuthContext;
use crate::state::DomainState;

/// Role every self-registered user is granted by default. There is no HTTP
/// surface for role administration; escalation to doctor/nurse/admin
/// happens out of band (operator tooling, not this API).
const PATIENT_ROLE_ID: &str = "patient";

fn tenant_from_headers(headers: &HeaderMap, default_tenant_id: &str) -> TenantId {
    headers
        .get("x-tenant-id")
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(TenantId::new)
        .unwrap_or_else(|| TenantId::new(default_tenant_id))
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub phone: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub token_type: &'static str,
    pub expires_in: i64,
    pub refresh_token: String,
    pub user: User,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub token: String,
    pub token_type: &'static str,
    pub expires_in: i64,
}

async fn publish_user_registered(state: &DomainState, tenant_id: &TenantId, user: &User) {
    let payload = serde_json::json!({
        "userId": user.id,
        "email": user.email,
        "name": user.name,
    });
    let envelope = EventEnvelope::new(EventType::UserRegistered, state.clock.now(), tenant_id.clone(), payload);
    if let Err(error) = state.publisher.publish(envelope).await {
        tracing::warn!(%error, "failed to publish user.registered");
    }
}

/// `POST /api/auth/register`, public.
///
/// # Errors
///
/// Returns [`HospitalError::ValidationFields`] on a password policy
/// violation and [`HospitalError::Conflict`] when the `(tenant, email)` pair
/// is already registered.
pub async fn register(
    State(state): State<Arc<DomainState>>,
    headers: HeaderMap,
    Json(request): Json<RegisterRequest>,
) -> Result<(axum::http::StatusCode, Json<User>), HospitalError> {
    let tenant_id = tenant_from_headers(&headers, &state.default_tenant_id);
    let email = request.email.trim().to_lowercase();
    if request.name.trim().is_empty() {
        return Err(HospitalError::Validation("name must not be blank".to_string()));
    }
    if email.is_empty() {
        return Err(HospitalError::Validation("email must not be blank".to_string()));
    }
    validate_password_policy(&request.password)
        .map_err(|error| HospitalError::Validation(error.to_string()))?;

    let password_hash = hash_password(&request.password).map_err(HospitalError::Unexpected)?;
    let now = state.clock.now();
    let user = User {
        id: UserId::generate(),
        tenant_id: tenant_id.clone(),
        name: request.name.trim().to_string(),
        email,
        password_hash,
        phone: request.phone,
        active: true,
        email_verified: false,
        failed_attempts: 0,
        locked_until: None,
        last_login_at: None,
        password_changed_at: now,
        created_at: now,
        updated_at: now,
    };

    let registered = state.identity.register(user).await?;
    state.roles.assign_role(hospital_rbac::UserRole {
        id: uuid::Uuid::new_v4().to_string(),
        user_id: registered.id.as_str().to_string(),
        role_id: PATIENT_ROLE_ID.to_string(),
        tenant_id: tenant_id.clone(),
        department: None,
        assigned_by: "self-registration".to_string(),
        valid_from: None,
        valid_until: None,
        active: true,
    });
    publish_user_registered(&state, &tenant_id, &registered).await;
    Ok((axum::http::StatusCode::CREATED, Json(registered)))
}

/// `POST /api/auth/login`, public. Locks the account after
/// `lockout_threshold` consecutive failures for `lockout_duration_minutes`.
///
/// # Errors
///
/// Returns [`HospitalError::Unauthorized`] on a bad credential and
/// [`HospitalError::Forbidden`] while the account is locked or inactive.
pub async fn login(
    State(state): State<Arc<DomainState>>,
    headers: HeaderMap,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, HospitalError> {
    let tenant_id = tenant_from_headers(&headers, &state.default_tenant_id);
    let email = request.email.trim().to_lowercase();

    let mut user = state
        .identity
        .find_by_email(&tenant_id, &email)
        .await?
        .ok_or_else(|| HospitalError::Unauthorized("invalid email or password".to_string()))?;

    if !user.active {
        return Err(HospitalError::Forbidden("account is deactivated".to_string()));
    }
    if user.is_locked(state.clock.as_ref()) {
        return Err(HospitalError::Forbidden("account is locked, try again later".to_string()));
    }

    if !verify_password(&request.password, &user.password_hash) {
        user.record_failed_login(state.clock.as_ref(), state.lockout_threshold, state.lockout_duration_minutes);
        state.identity.save(user).await?;
        return Err(HospitalError::Unauthorized("invalid email or password".to_string()));
    }

    user.record_successful_login(state.clock.as_ref());
    let user = state.identity.save(user).await?;

    let grants = state.effective_grants(&tenant_id, user.id.as_str()).await?;
    let mut roles: Vec<String> = grants.roles.into_iter().collect();
    let mut permissions: Vec<String> = grants.permissions.into_iter().collect();
    roles.sort();
    permissions.sort();

    let access_token = state
        .tokens
        .mint_access_token(
            state.clock.as_ref(),
            &MintRequest {
                user_id: user.id.as_str().to_string(),
                tenant_id: tenant_id.as_str().to_string(),
                email: user.email.clone(),
                name: user.name.clone(),
                roles,
                permissions,
                department: None,
            },
        )
        .map_err(HospitalError::from)?;
    let refresh_token = state
        .tokens
        .mint_refresh_token(state.clock.as_ref(), user.id.as_str(), &user.email, tenant_id.as_str())
        .map_err(HospitalError::from)?;

    Ok(Json(LoginResponse {
        token: access_token,
        token_type: "Bearer",
        expires_in: state.token_expiration_seconds,
        refresh_token,
        user,
    }))
}

/// `POST /api/auth/refresh`, public (the access token behind it may already
/// be expired).
///
/// # Errors
///
/// Returns [`HospitalError::Unauthorized`] when the refresh token does not
/// verify, and [`HospitalError::NotFound`] if the user no longer exists.
pub async fn refresh(
    State(state): State<Arc<DomainState>>,
    Json(request): Json<RefreshRequest>,
) -> Result<Json<RefreshResponse>, HospitalError> {
    let claims = state.tokens.verify_refresh_token(&request.refresh_token).map_err(HospitalError::from)?;
    let tenant_id = TenantId::new(claims.tenant_id.clone());
    let user_id = UserId::new(claims.sub.clone());

    let user = state
        .identity
        .find_by_id_in_tenant(&tenant_id, &user_id)
        .await?
        .ok_or_else(|| HospitalError::NotFound("user no longer exists".to_string()))?;
    if !user.active {
        return Err(HospitalError::Forbidden("account is deactivated".to_string()));
    }

    let grants = state.effective_grants(&tenant_id, user.id.as_str()).await?;
    let mut roles: Vec<String> = grants.roles.into_iter().collect();
    let mut permissions: Vec<String> = grants.permissions.into_iter().collect();
    roles.sort();
    permissions.sort();

    let access_token = state
        .tokens
        .mint_access_token(
            state.clock.as_ref(),
            &MintRequest {
                user_id: user.id.as_str().to_string(),
                tenant_id: tenant_id.as_str().to_string(),
                email: user.email.clone(),
                name: user.name.clone(),
                roles,
                permissions,
                department: None,
            },
        )
        .map_err(HospitalError::from)?;

    Ok(Json(RefreshResponse {
        token: access_token,
        token_type: "Bearer",
        expires_in: state.token_expiration_seconds,
    }))
}

/// `GET /api/auth/me`, authenticated.
///
/// # Errors
///
/// Returns [`HospitalError::NotFound`] if the user has since been deleted.
pub async fn me(State(state): State<Arc<DomainState>>, auth: AuthContext) -> Result<Json<User>, HospitalError> {
    let user = state
        .identity
        .find_by_id_in_tenant(&auth.tenant_id, &UserId::new(auth.user_id))
        .await?
        .ok_or_else(|| HospitalError::NotFound("user not found".to_string()))?;
    Ok(Json(user))
}
