//! Account handlers.

use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;

use super::AppState;
use crate::auth::{self, RegistrationRequest};
use crate::db::AccountRepository;
use crate::web::dto::{
    AccountResponse, ApiResponse, LoginRequest, LoginResponse, RegisterRequest, RegisterResponse,
    UpdatePictureRequest, ValidatedJson,
};
use crate::web::error::ApiError;
use crate::web::middleware::AuthUser;
use crate::MailroomError;

/// POST /api/account/register - Create an account.
pub async fn register(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<RegisterResponse>>), ApiError> {
    let mut request =
        RegistrationRequest::new(req.email, req.password, req.first_name, req.last_name);
    if let Some(middle) = req.middle_name {
        request = request.with_middle_name(middle);
    }

    let repo = AccountRepository::new(state.db.pool());
    let account = auth::register(&repo, request)
        .await
        .map_err(MailroomError::from)?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(RegisterResponse {
            id: account.id,
            email: account.email,
        })),
    ))
}

/// POST /api/account/login - Exchange credentials for an access token.
pub async fn login(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> Result<Json<ApiResponse<LoginResponse>>, ApiError> {
    if req.email.trim().is_empty() || req.password.is_empty() {
        return Err(ApiError::bad_request("Email and password are required"));
    }

    let repo = AccountRepository::new(state.db.pool());
    let account = auth::authenticate(&repo, &req.email, &req.password).await?;

    let access_token = state.generate_access_token(account.id, &account.email)?;

    Ok(Json(ApiResponse::new(LoginResponse {
        access_token,
        token_type: "Bearer",
        expires_in: state.access_token_expiry,
    })))
}

/// GET /api/account - Profile of the authenticated account.
pub async fn get_account(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<Json<ApiResponse<AccountResponse>>, ApiError> {
    let repo = AccountRepository::new(state.db.pool());
    let profile = auth::get_profile(&repo, user.account_id()).await?;

    Ok(Json(ApiResponse::new(profile.into())))
}

/// PUT /api/account/picture - Replace the profile picture.
pub async fn update_picture(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    ValidatedJson(req): ValidatedJson<UpdatePictureRequest>,
) -> Result<Json<ApiResponse<AccountResponse>>, ApiError> {
    let repo = AccountRepository::new(state.db.pool());
    let profile = auth::update_profile_picture(&repo, user.account_id(), &req.picture).await?;

    Ok(Json(ApiResponse::new(profile.into())))
}
