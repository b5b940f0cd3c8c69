//! Axum route handlers: translate HTTP requests into session transitions.
//!
//! The session lock is never held across extraction or the completion call.

use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::extraction::{extract_text_blocking, UploadedDocument};
use crate::interview::catalog::{exam_families, sub_categories_for, CatalogError, ExamFamily};
use crate::interview::generator::generate_questions;
use crate::interview::session::{Session, SessionError, SessionStore, SessionView};
use crate::interview::validation::looks_like_resume;
use crate::state::AppState;

/// Multipart field carrying the resume file.
pub const RESUME_FIELD: &str = "resume";

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct CatalogResponse {
    pub exams: &'static [ExamFamily],
}

#[derive(Debug, Deserialize)]
pub struct SubCategoryQuery {
    pub exam: String,
}

#[derive(Debug, Serialize)]
pub struct SubCategoryResponse {
    pub exam: String,
    pub sub_categories: &'static [&'static str],
}

#[derive(Debug, Deserialize)]
pub struct SelectionRequest {
    pub exam: String,
    pub sub_category: Option<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Catalog
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/catalog
pub async fn handle_get_catalog() -> Json<CatalogResponse> {
    Json(CatalogResponse {
        exams: exam_families(),
    })
}

/// GET /api/v1/catalog/sub-categories?exam=<label>
pub async fn handle_get_sub_categories(
    Query(query): Query<SubCategoryQuery>,
) -> Result<Json<SubCategoryResponse>, AppError> {
    let sub_categories = sub_categories_for(&query.exam)
        .ok_or_else(|| CatalogError::UnknownExam(query.exam.clone()))?;
    Ok(Json(SubCategoryResponse {
        exam: query.exam,
        sub_categories,
    }))
}

// ────────────────────────────────────────────────────────────────────────────
// Sessions
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/sessions
pub async fn handle_create_session(
    State(state): State<AppState>,
) -> (StatusCode, Json<SessionView>) {
    let session = Session::new();
    let view = session.view();
    state.sessions.write().await.insert(session.id, session);
    info!("Created session {}", view.session_id);
    (StatusCode::CREATED, Json(view))
}

/// GET /api/v1/sessions/:id
pub async fn handle_get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, AppError> {
    let sessions = state.sessions.read().await;
    let session = sessions.get(&id).ok_or(SessionError::NotFound(id))?;
    Ok(Json(session.view()))
}

/// DELETE /api/v1/sessions/:id
pub async fn handle_delete_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state
        .sessions
        .write()
        .await
        .remove(&id)
        .ok_or(SessionError::NotFound(id))?;
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /api/v1/sessions/:id/resume
///
/// Upload → extract → validate. Any earlier text, selection and result in the
/// session are discarded as soon as the file arrives.
pub async fn handle_upload_resume(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> Result<Json<SessionView>, AppError> {
    let document = read_resume_field(multipart).await?;
    info!(
        "Session {id}: received '{}' ({} bytes)",
        document.file_name,
        document.bytes.len()
    );

    let ticket =
        with_session(&state.sessions, id, |s| Ok(s.begin_upload(&document.file_name)?)).await?;

    match check_resume(document).await {
        Ok(text) => {
            with_session(&state.sessions, id, |s| {
                s.accept_resume(ticket, text)?;
                Ok(s.view())
            })
            .await
            .map(Json)
        }
        Err(err) => {
            warn!("Session {id}: upload rejected: {err}");
            with_session(&state.sessions, id, |s| Ok(s.reject_upload(ticket, &err)?)).await?;
            Err(err)
        }
    }
}

/// PUT /api/v1/sessions/:id/selection
pub async fn handle_select(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<SelectionRequest>,
) -> Result<Json<SessionView>, AppError> {
    with_session(&state.sessions, id, |s| {
        s.select(&request.exam, request.sub_category.as_deref())?;
        Ok(s.view())
    })
    .await
    .map(Json)
}

/// POST /api/v1/sessions/:id/questions
///
/// Explicit trigger. A failed call leaves the resume and selection in place so
/// the trigger can be repeated.
pub async fn handle_generate(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, AppError> {
    let (resume_text, selection) =
        with_session(&state.sessions, id, |s| Ok(s.start_generation()?)).await?;

    let outcome = generate_questions(state.llm.as_ref(), &resume_text, &selection).await;

    let view = with_session(&state.sessions, id, |s| {
        s.finish_generation(&outcome)?;
        Ok(s.view())
    })
    .await?;

    outcome.map(|_| Json(view))
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

/// Extraction followed by the keyword heuristic.
async fn check_resume(document: UploadedDocument) -> Result<String, AppError> {
    let text = extract_text_blocking(document).await?;
    if looks_like_resume(&text) {
        Ok(text)
    } else {
        Err(AppError::NotAResume)
    }
}

async fn read_resume_field(mut multipart: Multipart) -> Result<UploadedDocument, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
    {
        if field.name() != Some(RESUME_FIELD) {
            continue;
        }
        let file_name = field
            .file_name()
            .map(str::to_string)
            .ok_or_else(|| AppError::Validation("Uploaded file has no file name".to_string()))?;
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Invalid file: {e}")))?;
        return Ok(UploadedDocument::new(file_name, bytes));
    }

    Err(AppError::Validation(format!(
        "Missing '{RESUME_FIELD}' file field"
    )))
}

/// Runs a transition on one session under the write lock.
async fn with_session<T>(
    sessions: &SessionStore,
    id: Uuid,
    apply: impl FnOnce(&mut Session) -> Result<T, AppError>,
) -> Result<T, AppError> {
    let mut sessions = sessions.write().await;
    let session = sessions.get_mut(&id).ok_or(SessionError::NotFound(id))?;
    apply(session)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{header, Method, Request},
        Router,
    };
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;
    use crate::config::Config;
    use crate::extraction::docx::tests::build_docx;
    use crate::extraction::pdf::tests::build_pdf;
    use crate::interview::generator::tests::FakeCompletion;
    use crate::interview::session::new_session_store;
    use crate::routes::build_router;

    const BOUNDARY: &str = "X-RESUME-BOUNDARY";

    fn app(llm: Arc<FakeCompletion>) -> Router {
        build_router(AppState {
            llm,
            sessions: new_session_store(),
            config: Config::for_tests(),
        })
    }

    fn multipart_body(file_name: &str, bytes: &[u8]) -> Vec<u8> {
        let mut body = format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{RESUME_FIELD}\"; filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
        )
        .into_bytes();
        body.extend_from_slice(bytes);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    async fn create_session(app: &Router) -> String {
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/v1/sessions")
            .body(Body::empty())
            .unwrap();
        let (status, json) = send(app, request).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(json["state"], "idle");
        json["session_id"].as_str().unwrap().to_string()
    }

    async fn upload(app: &Router, id: &str, file_name: &str, bytes: &[u8]) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(Method::PUT)
            .uri(format!("/api/v1/sessions/{id}/resume"))
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(multipart_body(file_name, bytes)))
            .unwrap();
        send(app, request).await
    }

    async fn select(app: &Router, id: &str, body: Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(Method::PUT)
            .uri(format!("/api/v1/sessions/{id}/selection"))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        send(app, request).await
    }

    async fn generate(app: &Router, id: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(Method::POST)
            .uri(format!("/api/v1/sessions/{id}/questions"))
            .body(Body::empty())
            .unwrap();
        send(app, request).await
    }

    async fn get_session(app: &Router, id: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .uri(format!("/api/v1/sessions/{id}"))
            .body(Body::empty())
            .unwrap();
        send(app, request).await
    }

    #[tokio::test]
    async fn test_end_to_end_docx_flow() {
        let llm = Arc::new(FakeCompletion::replying("\n 1. How did your projects prepare you for JEE?\n"));
        let app = app(llm.clone());
        let id = create_session(&app).await;

        let docx = build_docx(&["Jane Doe", "Education: Delhi Public School"]);
        let (status, json) = upload(&app, &id, "jane.docx", &docx).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["state"], "validated");
        assert_eq!(
            json["notice"]["message"],
            "Successfully uploaded and validated resume: jane.docx"
        );
        assert_eq!(json["notice"]["level"], "success");

        let (status, json) = select(&app, &id, serde_json::json!({"exam": "Engineering Roles"})).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["state"], "category_selected");
        assert_eq!(
            json["sub_category_options"],
            serde_json::json!(["JEE Aspirant", "GATE Aspirant"])
        );
        assert_eq!(json["selection"]["sub_category"], "JEE Aspirant");

        let (status, json) = generate(&app, &id).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["state"], "result_shown");
        assert_eq!(json["questions"]["heading"], "Generated Questions");
        assert_eq!(
            json["questions"]["text"],
            "1. How did your projects prepare you for JEE?"
        );

        let prompt = llm.last_prompt().unwrap();
        assert!(prompt.contains("Engineering & Science"));
        assert!(prompt.contains("JEE Aspirant"));
        assert!(prompt.contains("Jane Doe\nEducation: Delhi Public School\n"));
    }

    #[tokio::test]
    async fn test_unsupported_extension_is_a_hard_error() {
        let app = app(Arc::new(FakeCompletion::replying("unused")));
        let id = create_session(&app).await;

        let (status, json) = upload(&app, &id, "resume.txt", b"Skills: Rust").await;
        assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert_eq!(json["error"]["code"], "UNSUPPORTED_FORMAT");
        assert_eq!(json["error"]["severity"], "error");

        let (_, json) = get_session(&app, &id).await;
        assert_eq!(json["state"], "error_shown");
        assert_eq!(json["notice"]["kind"], "unsupported_format");
    }

    #[tokio::test]
    async fn test_not_a_resume_is_a_warning() {
        let app = app(Arc::new(FakeCompletion::replying("unused")));
        let id = create_session(&app).await;

        let docx = build_docx(&["Grocery list: milk, eggs, bread"]);
        let (status, json) = upload(&app, &id, "list.docx", &docx).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(json["error"]["code"], "NOT_A_RESUME");
        assert_eq!(json["error"]["severity"], "warning");

        let (status, _) = generate(&app, &id).await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_corrupt_docx_is_an_extraction_failure() {
        let app = app(Arc::new(FakeCompletion::replying("unused")));
        let id = create_session(&app).await;

        let (status, json) = upload(&app, &id, "resume.docx", b"not a zip archive").await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(json["error"]["code"], "EXTRACTION_FAILED");
        assert!(json["error"]["message"]
            .as_str()
            .unwrap()
            .starts_with("Error reading DOCX file: "));
    }

    #[tokio::test]
    async fn test_generation_failure_keeps_state_for_retry() {
        let app = app(Arc::new(FakeCompletion::failing("invalid api key")));
        let id = create_session(&app).await;
        upload(&app, &id, "cv.docx", &build_docx(&["Skills: Python"])).await;
        select(
            &app,
            &id,
            serde_json::json!({"exam": "Medical", "sub_category": "NEET Aspirant"}),
        )
        .await;

        let (status, json) = generate(&app, &id).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(json["error"]["code"], "GENERATION_FAILED");
        assert!(json["error"]["message"]
            .as_str()
            .unwrap()
            .contains("invalid api key"));

        let (_, json) = get_session(&app, &id).await;
        assert_eq!(json["state"], "error_shown");
        assert_eq!(json["file_name"], "cv.docx");
        assert_eq!(json["selection"]["exam"], "Medical");
        assert_eq!(json["selection"]["sub_category"], "NEET Aspirant");

        // Retrying needs no re-upload; it fails the same way.
        let (status, _) = generate(&app, &id).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn test_successful_retry_replaces_generation_error() {
        let app = app(Arc::new(FakeCompletion::failing_then_replying(
            "boom",
            "1. Why NEET?",
        )));
        let id = create_session(&app).await;
        upload(&app, &id, "cv.docx", &build_docx(&["Skills: Biology"])).await;

        let (status, _) = generate(&app, &id).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        let (_, json) = get_session(&app, &id).await;
        assert_eq!(json["notice"]["message"], "Error generating questions: boom");

        let (status, json) = generate(&app, &id).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["state"], "result_shown");
        assert_eq!(json["questions"]["text"], "1. Why NEET?");
        assert!(json["notice"].is_null());
    }

    #[tokio::test]
    async fn test_two_page_pdf_upload() {
        let llm = Arc::new(FakeCompletion::replying("1. Q"));
        let app = app(llm.clone());
        let id = create_session(&app).await;

        let pdf = build_pdf(&["Education", "Skills"]);
        let (status, json) = upload(&app, &id, "Jane.PDF", &pdf).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["state"], "validated");

        generate(&app, &id).await;
        let prompt = llm.last_prompt().unwrap();
        assert!(prompt.contains("Education\n\nSkills\n--- RESUME END ---"));
    }

    #[tokio::test]
    async fn test_mismatched_selection_is_rejected() {
        let app = app(Arc::new(FakeCompletion::replying("unused")));
        let id = create_session(&app).await;
        upload(&app, &id, "cv.docx", &build_docx(&["Resume"])).await;

        let (status, json) = select(
            &app,
            &id,
            serde_json::json!({"exam": "Medical", "sub_category": "JEE Aspirant"}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_unknown_session() {
        let app = app(Arc::new(FakeCompletion::replying("unused")));
        let (status, json) = get_session(&app, &Uuid::new_v4().to_string()).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_delete_session() {
        let app = app(Arc::new(FakeCompletion::replying("unused")));
        let id = create_session(&app).await;

        let request = Request::builder()
            .method(Method::DELETE)
            .uri(format!("/api/v1/sessions/{id}"))
            .body(Body::empty())
            .unwrap();
        let (status, _) = send(&app, request).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, _) = get_session(&app, &id).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_catalog_endpoints() {
        let app = app(Arc::new(FakeCompletion::replying("unused")));

        let request = Request::builder()
            .uri("/api/v1/catalog")
            .body(Body::empty())
            .unwrap();
        let (status, json) = send(&app, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["exams"].as_array().unwrap().len(), 7);
        assert!(json["exams"][0].get("value").is_none());

        let request = Request::builder()
            .uri("/api/v1/catalog/sub-categories?exam=Engineering%20Roles")
            .body(Body::empty())
            .unwrap();
        let (status, json) = send(&app, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            json["sub_categories"],
            serde_json::json!(["JEE Aspirant", "GATE Aspirant"])
        );

        let request = Request::builder()
            .uri("/api/v1/catalog/sub-categories?exam=Astronaut")
            .body(Body::empty())
            .unwrap();
        let (status, _) = send(&app, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
