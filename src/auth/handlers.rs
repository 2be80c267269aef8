use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::CookieJar;
use time::OffsetDateTime;
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        cookie::{clear_session_cookie, set_session_cookie},
        dto::{AuthResponse, LoginRequest, PublicUser, RefreshRequest, RegisterRequest},
        extractors::AuthUser,
        repo_types::{UpsertUser, User},
        services::{
            apply_owner_role, hash_password, is_valid_email, normalize_email, verify_password,
            JwtKeys, MIN_PASSWORD_LEN, PASSWORD_LOGIN_METHOD,
        },
    },
    error::{ApiError, ApiResult},
    response::MutationResponse,
    state::AppState,
    store::{StoreError, UserStore},
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh))
        .route("/auth/logout", post(logout))
}

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/auth/me", get(get_me))
}

/// Signs a token pair for `user` and stores the access token in the session cookie.
fn start_session(
    state: &AppState,
    jar: CookieJar,
    user: User,
) -> ApiResult<(CookieJar, AuthResponse)> {
    let keys = JwtKeys::from(&state.config.jwt);
    let access_token = keys.sign_access(user.id)?;
    let refresh_token = keys.sign_refresh(user.id)?;
    let jar = set_session_cookie(
        jar,
        access_token.clone(),
        keys.access_ttl,
        state.config.cookie_secure,
    );
    Ok((
        jar,
        AuthResponse {
            access_token,
            refresh_token,
            user: PublicUser::from(user),
        },
    ))
}

#[instrument(skip(state, jar, payload))]
pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, CookieJar, Json<AuthResponse>)> {
    let email = normalize_email(&payload.email);

    if !is_valid_email(&email) {
        warn!(%email, "invalid email");
        return Err(ApiError::validation("Invalid email"));
    }

    if payload.password.len() < MIN_PASSWORD_LEN {
        warn!("password too short");
        return Err(ApiError::validation("Password too short"));
    }

    if state.store.get_user_by_open_id(&email).await?.is_some() {
        warn!(%email, "email already registered");
        return Err(ApiError::Conflict("Email already registered".into()));
    }

    let hash = hash_password(&payload.password)?;
    let name = payload
        .name
        .map(|n| n.trim().to_owned())
        .filter(|n| !n.is_empty());

    let upsert = apply_owner_role(
        UpsertUser {
            open_id: email.clone(),
            name,
            email: Some(email),
            login_method: Some(PASSWORD_LOGIN_METHOD.into()),
            password_hash: Some(hash),
            role: None,
            last_signed_in: Some(OffsetDateTime::now_utc()),
        },
        state.config.owner_open_id.as_deref(),
    );
    let user = state.store.create_user(upsert).await.map_err(|e| match e {
        StoreError::Conflict(_) => {
            warn!("email registered concurrently");
            ApiError::Conflict("Email already registered".into())
        }
        other => other.into(),
    })?;

    info!(user_id = user.id, open_id = %user.open_id, "user registered");
    let (jar, body) = start_session(&state, jar, user)?;
    Ok((StatusCode::CREATED, jar, Json(body)))
}

#[instrument(skip(state, jar, payload))]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<LoginRequest>,
) -> ApiResult<(CookieJar, Json<AuthResponse>)> {
    let email = normalize_email(&payload.email);

    if !is_valid_email(&email) {
        warn!(%email, "invalid email");
        return Err(ApiError::validation("Invalid email"));
    }

    let invalid = || ApiError::Unauthorized("Invalid credentials".into());

    let Some(user) = state.store.get_user_by_open_id(&email).await? else {
        warn!(%email, "login unknown email");
        return Err(invalid());
    };

    let Some(hash) = user.password_hash.as_deref() else {
        warn!(user_id = user.id, "login for account without password");
        return Err(invalid());
    };

    if !verify_password(&payload.password, hash)? {
        warn!(user_id = user.id, "login invalid password");
        return Err(invalid());
    }

    let upsert = apply_owner_role(
        UpsertUser {
            open_id: user.open_id,
            last_signed_in: Some(OffsetDateTime::now_utc()),
            ..Default::default()
        },
        state.config.owner_open_id.as_deref(),
    );
    let user = state.store.upsert_user(upsert).await?;

    info!(user_id = user.id, "user logged in");
    let (jar, body) = start_session(&state, jar, user)?;
    Ok((jar, Json(body)))
}

#[instrument(skip(state, keys, jar, payload))]
pub async fn refresh(
    State(state): State<AppState>,
    State(keys): State<JwtKeys>,
    jar: CookieJar,
    Json(payload): Json<RefreshRequest>,
) -> ApiResult<(CookieJar, Json<AuthResponse>)> {
    let claims = keys.verify_refresh(&payload.refresh_token).map_err(|e| {
        warn!(error = %e, "refresh rejected");
        ApiError::Unauthorized(e.to_string())
    })?;

    let user = state
        .store
        .get_user_by_id(claims.sub)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("User not found".into()))?;

    let (jar, body) = start_session(&state, jar, user)?;
    Ok((jar, Json(body)))
}

/// Public procedure: `null` when the caller is not signed in.
#[instrument(skip(state, auth))]
pub async fn get_me(
    State(state): State<AppState>,
    auth: Option<AuthUser>,
) -> ApiResult<Json<Option<PublicUser>>> {
    let Some(AuthUser(user_id)) = auth else {
        return Ok(Json(None));
    };
    let user = state.store.get_user_by_id(user_id).await?;
    Ok(Json(user.map(PublicUser::from)))
}

#[instrument(skip(state, jar))]
pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
) -> (CookieJar, Json<MutationResponse>) {
    let jar = clear_session_cookie(jar, state.config.cookie_secure);
    (jar, Json(MutationResponse::ok()))
}
