use chrono::{DateTime, Utc};
use database::{entities::submissions, services::assignment::AssignmentOverview};
use models::{
    submission::{SubmissionKind, SubmissionStatus},
    validation::AssignmentDraft,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AssignmentRequest {
    pub title: String,
    pub description: Option<String>,
    pub points: i32,
    pub due_date: DateTime<Utc>,
    /// "File Upload" or "Text Entry"
    #[schema(value_type = String)]
    pub submission_type: SubmissionKind,
}

impl From<AssignmentRequest> for AssignmentDraft {
    fn from(request: AssignmentRequest) -> Self {
        Self {
            title: request.title,
            description: request.description,
            points: request.points,
            due_date: request.due_date,
            submission_kind: request.submission_type,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AssignmentResponse {
    pub id: Uuid,
    pub course_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub points: i32,
    pub due_date: DateTime<Utc>,
    #[schema(value_type = Option<String>)]
    pub submission_type: Option<SubmissionKind>,
    /// The caller's own submission, for students
    pub my_submission: Option<SubmissionResponse>,
    /// Submissions received, for the instructor
    pub submission_count: Option<u64>,
}

impl From<database::entities::assignments::Model> for AssignmentResponse {
    fn from(assignment: database::entities::assignments::Model) -> Self {
        Self {
            submission_type: SubmissionKind::from_id(assignment.submission_type_id),
            id: assignment.id,
            course_id: assignment.course_id,
            title: assignment.title,
            description: assignment.description,
            points: assignment.points,
            due_date: assignment.due_date,
            my_submission: None,
            submission_count: None,
        }
    }
}

impl From<AssignmentOverview> for AssignmentResponse {
    fn from(overview: AssignmentOverview) -> Self {
        Self {
            submission_type: Some(overview.submission_kind),
            my_submission: overview.my_submission.map(SubmissionResponse::from),
            submission_count: overview.submission_count,
            ..overview.assignment.into()
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SubmissionResponse {
    pub id: Uuid,
    pub assignment_id: Uuid,
    pub student_id: String,
    #[schema(value_type = Option<String>)]
    pub submission_type: Option<SubmissionKind>,
    pub has_file: bool,
    pub text_body: Option<String>,
    pub submitted_at: DateTime<Utc>,
    pub grade: Option<i32>,
    pub graded_at: Option<DateTime<Utc>>,
    #[schema(value_type = String)]
    pub status: SubmissionStatus,
}

impl From<submissions::Model> for SubmissionResponse {
    fn from(submission: submissions::Model) -> Self {
        Self {
            status: submission.status(),
            submission_type: SubmissionKind::from_id(submission.submission_type_id),
            has_file: submission.file_path.is_some(),
            id: submission.id,
            assignment_id: submission.assignment_id,
            student_id: submission.student_id,
            text_body: submission.text_body,
            submitted_at: submission.submitted_at,
            grade: submission.grade,
            graded_at: submission.graded_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SubmitResponse {
    /// False when the student had already submitted and nothing was stored
    pub stored: bool,
    pub message: String,
    pub submission: Option<SubmissionResponse>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct GradeRequest {
    pub grade: i32,
}
