//! HTTP endpoint handlers. These are thin wrappers that forward to core logic.
//! Each handler is instrumented and logs parameters and basic result info.

use std::sync::Arc;

use axum::extract::{Json, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::docx::DocumentMeta;
use crate::logic::{build_document, generate_record, today_long, today_stamp};
use crate::protocol::*;
use crate::state::AppState;
use crate::util::filename_component;

#[instrument(level = "info")]
pub async fn http_health() -> impl IntoResponse {
  Json(HealthOut { ok: true })
}

#[instrument(level = "info", skip(state, body), fields(subject = %body.subject, grade = %body.grade, quarter = %body.quarter))]
pub async fn http_post_lesson(
  State(state): State<Arc<AppState>>,
  Json(body): Json<LessonIn>,
) -> impl IntoResponse {
  let req = body.into_request();
  let (record, origin) = generate_record(&state, &req).await;
  info!(target: "lesson", subject = %req.subject, %origin, "Lesson record served");
  Json(LessonOut { record, origin })
}

#[instrument(level = "info", skip(state, body), fields(subject = %body.subject, has_image = body.image_base64.is_some()))]
pub async fn http_post_document(
  State(state): State<Arc<AppState>>,
  Json(body): Json<DocumentIn>,
) -> impl IntoResponse {
  let doc_id = Uuid::new_v4();

  // A broken upload degrades to the fetched/placeholder visual rather than
  // failing the document.
  let uploaded = match &body.image_base64 {
    Some(b64) => match BASE64.decode(b64.trim()) {
      Ok(bytes) => Some(bytes),
      Err(e) => {
        warn!(target: "lesson", %doc_id, error = %e, "Uploaded image is not valid base64; ignoring");
        None
      }
    },
    None => None,
  };

  let meta = DocumentMeta {
    school: state.school.clone(),
    teacher: or_default(&body.teacher, &state.school.teacher),
    principal: or_default(&body.principal, &state.school.principal),
    subject: body.subject.clone(),
    grade: body.grade.clone(),
    quarter: body.quarter.clone(),
    date: today_long(),
    content_standard: body.content_standard.clone(),
    performance_standard: body.performance_standard.clone(),
    competency: body.competency.clone(),
  };

  match build_document(&state, &body.record, &meta, uploaded).await {
    Ok(bytes) => {
      let filename = format!(
        "DLP_{}_G{}_Q{}_{}.docx",
        filename_component(&body.subject),
        filename_component(&body.grade),
        filename_component(&body.quarter),
        today_stamp(),
      );
      info!(target: "lesson", %doc_id, %filename, size = bytes.len(), "Document assembled");
      (
        [
          (
            header::CONTENT_TYPE,
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document".to_string(),
          ),
          (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", filename),
          ),
        ],
        bytes,
      )
        .into_response()
    }
    Err(e) => {
      warn!(target: "lesson", %doc_id, error = %e, "Document assembly failed");
      (StatusCode::INTERNAL_SERVER_ERROR, format!("document assembly failed: {e}")).into_response()
    }
  }
}

fn or_default(value: &str, fallback: &str) -> String {
  if value.trim().is_empty() { fallback.to_string() } else { value.to_string() }
}
