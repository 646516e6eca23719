use std::sync::Arc;

use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{PathRejection, QueryRejection},
    },
    response::Redirect,
};
use mergington::data::{Catalog, MessageResponse};
use mergington::log;
use mergington::serde::Deserialize;

use crate::error::ApiError;
use crate::services::ActivityService;

/// Landing page the root path redirects to.
pub const LANDING_PAGE: &str = "/static/index.html";

#[derive(Debug, Deserialize)]
#[serde(crate = "mergington::serde")]
pub struct EmailQuery {
    pub email: Option<String>,
}

impl EmailQuery {
    fn required(self) -> Result<String, ApiError> {
        self.email.ok_or(ApiError::MissingQuery("email"))
    }
}

/// Handler for `GET /`
pub async fn root() -> Redirect {
    Redirect::temporary(LANDING_PAGE)
}

/// Handler to list every activity with its roster
pub async fn list(State(state): State<Arc<crate::AppState>>) -> Json<Catalog> {
    Json(state.activities.list().await)
}

/// Handler to sign a student up for an activity
pub async fn signup(
    State(state): State<Arc<crate::AppState>>,
    path: Result<Path<String>, PathRejection>,
    query: Result<Query<EmailQuery>, QueryRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let Path(activity) = path?;
    let email = query?.0.required()?;
    match state.activities.enroll(&activity, &email).await {
        Ok(response) => {
            log::info!("Signed up {} for {}", email, activity);
            Ok(Json(response))
        }
        Err(err) => {
            log::warn!("Signup of {} for {} rejected: {}", email, err.activity(), err);
            Err(err.into())
        }
    }
}

/// Handler to remove a student from an activity
pub async fn unregister(
    State(state): State<Arc<crate::AppState>>,
    path: Result<Path<String>, PathRejection>,
    query: Result<Query<EmailQuery>, QueryRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let Path(activity) = path?;
    let email = query?.0.required()?;
    match state.activities.withdraw(&activity, &email).await {
        Ok(response) => {
            log::info!("Unregistered {} from {}", email, activity);
            Ok(Json(response))
        }
        Err(err) => {
            log::warn!(
                "Unregister of {} from {} rejected: {}",
                email,
                err.activity(),
                err
            );
            Err(err.into())
        }
    }
}
