//! Routes for the attribute catalog.

use axum::extract::State;
use axum::{Json, Router, routing::get};
use crisis_core::model::Attribute;
use crisis_scoring::application::query_handlers;

use crate::error::ApiError;
use crate::state::AppState;

/// GET /
async fn list_attributes(State(state): State<AppState>) -> Result<Json<Vec<Attribute>>, ApiError> {
    Ok(Json(query_handlers::list_attributes(&*state.attributes).await?))
}

/// Returns the router for attributes.
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(list_attributes))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use super::router;
    use crate::routes::testing::{fixture_state, send};

    #[tokio::test]
    async fn test_list_attributes_is_sorted_by_name() {
        let (state, _) = fixture_state();
        let app = router().with_state(state);

        let (status, json) = send(app, "GET", "/", None).await;

        assert_eq!(status, StatusCode::OK);
        let names: Vec<&str> = json
            .as_array()
            .unwrap()
            .iter()
            .map(|a| a["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["lojal", "moralisk", "taktisk"]);
    }
}
