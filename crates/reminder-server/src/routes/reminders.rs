//! Reminder routes.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::Utc;
use database::{reminder, CreatedReminder, NewReminder, Reminder};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{ApiError, Result};
use crate::state::AppState;

/// Response for a created reminder.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub reminder: Reminder,
    /// Set when the time phrase could not be read and 09:00 was used.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub time_defaulted: bool,
}

/// Response for a single reminder.
#[derive(Debug, Serialize)]
pub struct ReminderResponse {
    pub success: bool,
    pub reminder: Reminder,
}

/// Response for a reminder listing.
#[derive(Debug, Serialize)]
pub struct ListResponse {
    pub success: bool,
    pub reminders: Vec<Reminder>,
}

/// Response carrying only a message.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

/// Query for listing reminders.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub phone_number: Option<String>,
}

/// Query for cancelling a reminder.
#[derive(Debug, Deserialize)]
pub struct CancelQuery {
    pub id: Option<String>,
}

/// Tool hook for the voice agent: create a reminder and describe it.
pub async fn webhook(
    State(state): State<AppState>,
    body: std::result::Result<Json<NewReminder>, JsonRejection>,
) -> Result<Json<CreateResponse>> {
    let created = insert(&state, body).await?;
    let message = confirmation(&created);

    Ok(Json(CreateResponse {
        success: true,
        message: Some(message),
        time_defaulted: created.resolved_time.is_default(),
        reminder: created.reminder,
    }))
}

/// Create a reminder.
pub async fn create(
    State(state): State<AppState>,
    body: std::result::Result<Json<NewReminder>, JsonRejection>,
) -> Result<Json<CreateResponse>> {
    let created = insert(&state, body).await?;

    Ok(Json(CreateResponse {
        success: true,
        message: None,
        time_defaulted: created.resolved_time.is_default(),
        reminder: created.reminder,
    }))
}

/// List active reminders, optionally for one phone number.
pub async fn list(
    State(state): State<AppState>,
    query: std::result::Result<Query<ListQuery>, QueryRejection>,
) -> Result<Json<ListResponse>> {
    let Query(query) = query.map_err(|e| ApiError::Validation(e.body_text()))?;
    let pool = state.db.pool();

    let reminders = match query.phone_number.as_deref().map(str::trim) {
        Some(phone) if !phone.is_empty() => reminder::list_by_phone(pool, phone).await?,
        _ => reminder::list_active(pool).await?,
    };

    Ok(Json(ListResponse {
        success: true,
        reminders,
    }))
}

/// Fetch one reminder by id.
pub async fn get_one(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ReminderResponse>> {
    let reminder = reminder::get_reminder(state.db.pool(), &id).await?;
    Ok(Json(ReminderResponse {
        success: true,
        reminder,
    }))
}

/// Cancel a reminder.
pub async fn cancel(
    State(state): State<AppState>,
    query: std::result::Result<Query<CancelQuery>, QueryRejection>,
) -> Result<Json<MessageResponse>> {
    let Query(query) = query.map_err(|e| ApiError::Validation(e.body_text()))?;
    let id = query
        .id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| ApiError::Validation("reminder id is required".to_string()))?;

    if !reminder::cancel_reminder(state.db.pool(), &id).await? {
        return Err(ApiError::NotFound(format!(
            "No active reminder with id {}",
            id
        )));
    }

    info!(id = %id, "Reminder cancelled via API");
    Ok(Json(MessageResponse {
        success: true,
        message: format!("Reminder {} cancelled", id),
    }))
}

async fn insert(
    state: &AppState,
    body: std::result::Result<Json<NewReminder>, JsonRejection>,
) -> Result<CreatedReminder> {
    let Json(new) = body.map_err(|e| match e {
        JsonRejection::JsonDataError(err) if err.body_text().contains("missing field") => {
            ApiError::Validation("phoneNumber, what, and time are required".to_string())
        }
        other => ApiError::Validation(other.body_text()),
    })?;
    let created = reminder::create_reminder(state.db.pool(), &new, &state.zone, Utc::now()).await?;
    Ok(created)
}

fn confirmation(created: &CreatedReminder) -> String {
    let r = &created.reminder;
    let mut message = format!(
        "Reminder set: \"{}\" at {} ({})",
        r.what, created.resolved_time, r.frequency
    );

    if created.resolved_time.is_default() {
        message.push_str(". I couldn't understand the time, so I used 09:00");
    }
    if !r.is_scheduled() {
        message.push_str(". That time has already passed today, so no call is scheduled");
    }
    message
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum::Router;
    use chrono::FixedOffset;
    use database::Database;
    use http_body_util::BodyExt;
    use recurrence::{Zone, DAY_MS};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::routes::router;
    use crate::state::AppState;

    async fn test_app() -> (Router, Database) {
        let db = Database::connect_with_pool_size("sqlite::memory:", 1)
            .await
            .unwrap();
        db.migrate().await.unwrap();
        let zone = Zone::Fixed(FixedOffset::east_opt(0).unwrap());
        let app = router().with_state(AppState::new(db.clone(), zone));
        (app, db)
    }

    fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn empty_request(method: &str, uri: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    fn medicine(phone: &str) -> Value {
        json!({
            "what": "Take medicine",
            "time": "9:00 AM",
            "frequency": "daily",
            "phoneNumber": phone
        })
    }

    #[tokio::test]
    async fn test_health() {
        let (app, _db) = test_app().await;
        let (status, body) = send(&app, empty_request("GET", "/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_webhook_creates_reminder() {
        let (app, _db) = test_app().await;
        let now = chrono::Utc::now().timestamp_millis();

        let (status, body) = send(
            &app,
            json_request("POST", "/api/reminders/webhook", medicine("+14155550001")),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert!(body["message"].as_str().unwrap().contains("Take medicine"));
        assert!(body.get("timeDefaulted").is_none());

        let reminder = &body["reminder"];
        assert!(reminder["id"].as_str().unwrap().starts_with("reminder_"));
        assert_eq!(reminder["phoneNumber"], "+14155550001");
        assert_eq!(reminder["frequency"], "daily");
        assert_eq!(reminder["kind"], "medication");
        assert_eq!(reminder["active"], true);
        assert_eq!(reminder["callCount"], 0);

        let next = reminder["nextCallTime"].as_i64().unwrap();
        assert!(next > now && next <= now + DAY_MS);
    }

    #[tokio::test]
    async fn test_webhook_rejects_bad_phone() {
        let (app, db) = test_app().await;

        let (status, body) = send(
            &app,
            json_request("POST", "/api/reminders/webhook", medicine("7018224197")),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert!(body["error"].as_str().unwrap().contains("E.164"));
        assert_eq!(database::reminder::count_active(db.pool()).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_create_rejects_missing_fields() {
        let (app, _db) = test_app().await;

        let (status, body) = send(
            &app,
            json_request("POST", "/api/reminders", json!({ "what": "Take medicine" })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "phoneNumber, what, and time are required");
    }

    #[tokio::test]
    async fn test_webhook_accepts_null_optionals() {
        let (app, _db) = test_app().await;

        let (status, body) = send(
            &app,
            json_request(
                "POST",
                "/api/reminders/webhook",
                json!({
                    "what": "Take medicine",
                    "time": "9:00 PM",
                    "frequency": null,
                    "phoneNumber": "+14155550001",
                    "userId": null
                }),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["reminder"]["frequency"], "once");
        assert!(body["reminder"]["userId"].is_null());
    }

    #[tokio::test]
    async fn test_webhook_reports_wrong_field_type() {
        let (app, _db) = test_app().await;

        let (status, body) = send(
            &app,
            json_request(
                "POST",
                "/api/reminders/webhook",
                json!({
                    "what": "Take medicine",
                    "time": "9:00 PM",
                    "frequency": 2,
                    "phoneNumber": "+14155550001"
                }),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        let error = body["error"].as_str().unwrap();
        assert_ne!(error, "phoneNumber, what, and time are required");
        assert!(error.contains("frequency"));
    }

    #[tokio::test]
    async fn test_create_reports_defaulted_time() {
        let (app, _db) = test_app().await;

        let (status, body) = send(
            &app,
            json_request(
                "POST",
                "/api/reminders",
                json!({
                    "what": "Call the pharmacy",
                    "time": "whenever",
                    "frequency": "daily",
                    "phoneNumber": "+14155550001"
                }),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["timeDefaulted"], true);
        assert!(body.get("message").is_none());
        assert_eq!(body["reminder"]["time"], "whenever");
    }

    #[tokio::test]
    async fn test_list_get_and_cancel() {
        let (app, _db) = test_app().await;

        let (_, first) = send(
            &app,
            json_request("POST", "/api/reminders", medicine("+14155550001")),
        )
        .await;
        send(
            &app,
            json_request("POST", "/api/reminders", medicine("+14155550002")),
        )
        .await;
        let id = first["reminder"]["id"].as_str().unwrap().to_string();

        let (status, body) = send(&app, empty_request("GET", "/api/reminders")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["reminders"].as_array().unwrap().len(), 2);

        let (_, body) = send(
            &app,
            empty_request("GET", "/api/reminders?phoneNumber=%2B14155550001"),
        )
        .await;
        let by_phone = body["reminders"].as_array().unwrap();
        assert_eq!(by_phone.len(), 1);
        assert_eq!(by_phone[0]["id"], id.as_str());

        let (status, body) =
            send(&app, empty_request("GET", &format!("/api/reminders/{}", id))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["reminder"]["what"], "Take medicine");

        let (status, body) = send(
            &app,
            empty_request("DELETE", &format!("/api/reminders?id={}", id)),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);

        // Already cancelled
        let (status, body) = send(
            &app,
            empty_request("DELETE", &format!("/api/reminders?id={}", id)),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["success"], false);

        let (_, body) = send(&app, empty_request("GET", "/api/reminders")).await;
        assert_eq!(body["reminders"].as_array().unwrap().len(), 1);

        // Cancelled reminders stay readable by id
        let (status, body) =
            send(&app, empty_request("GET", &format!("/api/reminders/{}", id))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["reminder"]["active"], false);
    }

    #[tokio::test]
    async fn test_get_missing_reminder() {
        let (app, _db) = test_app().await;
        let (status, body) =
            send(&app, empty_request("GET", "/api/reminders/reminder_missing")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn test_cancel_requires_id() {
        let (app, _db) = test_app().await;
        let (status, body) = send(&app, empty_request("DELETE", "/api/reminders")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "reminder id is required");
    }
}
