use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::headers::{authorization::Bearer, Authorization};
use axum_extra::TypedHeader;

use crate::error::AppError;
use crate::state::AppState;

/// Guard for the admin surface: a single static bearer token compared by
/// exact match. An absent token and a wrong token are distinct outcomes.
pub async fn admin_auth_middleware(
    State(state): State<AppState>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let TypedHeader(Authorization(bearer)) =
        bearer.ok_or_else(|| AppError::Unauthorized("missing admin token".to_string()))?;

    if bearer.token() != state.admin_token {
        return Err(AppError::Forbidden("admin token rejected".to_string()));
    }

    Ok(next.run(req).await)
}
