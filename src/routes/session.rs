use axum::extract::State;
use axum::Json;

use crate::app::AppState;
use crate::errors::AppResult;
use crate::jwt::MaybeAuthUser;
use crate::session::{augment_session, SessionIdentity, SessionState};

/// Materialize session state
///
/// Anonymous requests get an empty session. Authenticated principals get
/// their identity; those with assigned roles additionally get the role set
/// and the derived permission table.
#[utoipa::path(
    get,
    path = "/session",
    tag = "Session",
    responses(
        (status = 200, description = "Session state", body = SessionState),
    )
)]
pub async fn get_session(
    State(state): State<AppState>,
    MaybeAuthUser(principal): MaybeAuthUser,
) -> AppResult<Json<SessionState>> {
    let mut session = SessionState::default();
    if let Some(ref user) = principal {
        session.identity = Some(SessionIdentity::new(user.user_id));
    }

    augment_session(state.store.as_ref(), principal.as_ref(), &mut session).await?;

    Ok(Json(session))
}
