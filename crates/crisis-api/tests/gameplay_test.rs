//! End-to-end gameplay against PostgreSQL: import, register, play, score.

mod common;

use axum::http::StatusCode;
use serde_json::{Value, json};
use sqlx::PgPool;

async fn start_first_level(state: &crisis_api::state::AppState, player_id: &str) -> (String, Value) {
    let (status, levels) = common::get_json(common::build_test_app(state.clone()), "/api/v1/levels").await;
    assert_eq!(status, StatusCode::OK);
    let level_id = levels[0]["id"].as_str().unwrap();

    let (status, view) = common::post_json(
        common::build_test_app(state.clone()),
        "/api/v1/sessions",
        &json!({ "player_id": player_id, "level_id": level_id }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    (view["session_id"].as_str().unwrap().to_owned(), view)
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_full_level_walkthrough_scores_player(pool: PgPool) {
    // Arrange
    let state = common::build_test_state(pool.clone());
    let player_id = common::seed(&state, 34).await;
    let (session_id, mut view) = start_first_level(&state, &player_id).await;

    // Act: pick the first option of every scenario.
    while !view["finished"].as_bool().unwrap() {
        let choice_id = view["scenario"]["choices"][0]["choice_id"].as_str().unwrap().to_owned();
        let (status, outcome) = common::post_json(
            common::build_test_app(state.clone()),
            &format!("/api/v1/sessions/{session_id}/choices"),
            &json!({ "choice_id": choice_id }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(outcome["is_correct"], true);

        let (status, next) = common::post_json(
            common::build_test_app(state.clone()),
            &format!("/api/v1/sessions/{session_id}/advance"),
            &Value::Null,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        view = next;
    }

    // Assert
    assert_eq!(view["current_index"], 3);
    assert!(state.sessions.is_empty());

    let (status, totals) = common::get_json(
        common::build_test_app(state.clone()),
        &format!("/api/v1/players/{player_id}/attributes"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let summary: Vec<(&str, i64)> = totals
        .as_array()
        .unwrap()
        .iter()
        .map(|t| (t["name"].as_str().unwrap(), t["score"].as_i64().unwrap()))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("försiktig", 2),
            ("logisk", 2),
            ("lojal", 2),
            ("moralisk", 2),
            ("omtänksam", 2),
            ("pragmatisk", 1),
            ("taktisk", 1),
            ("riskbenägen", 0),
        ]
    );

    let records: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM player_choice_records")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(records.0, 3);
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_choice_from_another_scenario_is_rejected_without_writes(pool: PgPool) {
    // Arrange
    let state = common::build_test_state(pool.clone());
    let player_id = common::seed(&state, 22).await;
    let (session_id, _) = start_first_level(&state, &player_id).await;
    let foreign: (uuid::Uuid,) = sqlx::query_as(
        "SELECT c.id FROM choices c JOIN scenarios s ON s.id = c.scenario_id WHERE s.ordinal_position = 2 LIMIT 1",
    )
    .fetch_one(&pool)
    .await
    .unwrap();

    // Act
    let (status, json) = common::post_json(
        common::build_test_app(state.clone()),
        &format!("/api/v1/sessions/{session_id}/choices"),
        &json!({ "choice_id": foreign.0 }),
    )
    .await;

    // Assert
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json["error"], "invalid_choice");
    let records: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM player_choice_records")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(records.0, 0);
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_statistics_reflect_submitted_choices(pool: PgPool) {
    // Arrange
    let state = common::build_test_state(pool);
    let player_id = common::seed(&state, 34).await;
    let (session_id, view) = start_first_level(&state, &player_id).await;
    let wrong = view["scenario"]["choices"][1]["choice_id"].as_str().unwrap().to_owned();

    // Act
    let (status, outcome) = common::post_json(
        common::build_test_app(state.clone()),
        &format!("/api/v1/sessions/{session_id}/choices"),
        &json!({ "choice_id": wrong }),
    )
    .await;

    // Assert
    assert_eq!(status, StatusCode::OK);
    assert_eq!(outcome["is_correct"], false);
    assert!(outcome["feedback_media"].as_str().unwrap().ends_with("_wrong.mp4"));

    let (_, overview) =
        common::get_json(common::build_test_app(state.clone()), "/api/v1/stats/choices").await;
    assert_eq!(overview[0]["bad"], 1);
    assert_eq!(overview[0]["good"], 0);

    let (_, bands) =
        common::get_json(common::build_test_app(state.clone()), "/api/v1/stats/age-bands").await;
    assert_eq!(bands, json!([{ "age_band": 30, "correctness": "bad", "count": 1 }]));

    let (_, impacts) =
        common::get_json(common::build_test_app(state), "/api/v1/stats/attributes").await;
    assert_eq!(impacts[0]["name"], "riskbenägen");
    assert_eq!(impacts[0]["total"], 2);
}
