//! HTTP request/response DTOs (serde ready).
//! Keep this small and stable so the form frontend can evolve independently.

use serde::{Deserialize, Serialize};

use crate::domain::{LessonPlanRecord, LessonRequest};

/// Body for POST /api/v1/lesson — the form fields of one generation attempt.
#[derive(Debug, Deserialize)]
pub struct LessonIn {
    pub subject: String,
    pub grade: String,
    pub quarter: String,
    #[serde(default, rename = "contentStandard")]
    pub content_standard: String,
    #[serde(default, rename = "performanceStandard")]
    pub performance_standard: String,
    #[serde(default)]
    pub competency: String,
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(default, rename = "objCognitive")]
    pub obj_cognitive: Option<String>,
    #[serde(default, rename = "objPsychomotor")]
    pub obj_psychomotor: Option<String>,
    #[serde(default, rename = "objAffective")]
    pub obj_affective: Option<String>,
}

impl LessonIn {
    pub fn into_request(self) -> LessonRequest {
        LessonRequest {
            subject: self.subject,
            grade: self.grade,
            quarter: self.quarter,
            content_standard: self.content_standard,
            performance_standard: self.performance_standard,
            competency: self.competency,
            topic: self.topic,
            obj_cognitive: self.obj_cognitive,
            obj_psychomotor: self.obj_psychomotor,
            obj_affective: self.obj_affective,
        }
    }
}

#[derive(Serialize)]
pub struct LessonOut {
    pub record: LessonPlanRecord,
    /// "model" or one of the "fallback_*" tags; see `logic::generate_record`.
    pub origin: &'static str,
}

/// Body for POST /api/v1/document — a record (typically the one just
/// returned by /lesson, possibly user-edited) plus rendering metadata.
#[derive(Debug, Deserialize)]
pub struct DocumentIn {
    pub record: LessonPlanRecord,
    pub subject: String,
    pub grade: String,
    pub quarter: String,
    #[serde(default)]
    pub teacher: String,
    #[serde(default)]
    pub principal: String,
    #[serde(default, rename = "contentStandard")]
    pub content_standard: String,
    #[serde(default, rename = "performanceStandard")]
    pub performance_standard: String,
    #[serde(default)]
    pub competency: String,
    /// Uploaded picture for the motivation visual, standard base64.
    #[serde(default, rename = "imageBase64")]
    pub image_base64: Option<String>,
}

#[derive(Serialize)]
pub struct HealthOut {
    pub ok: bool,
}
