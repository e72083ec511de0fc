use crate::{
    access::Principal,
    entities::submissions,
    error::{ServiceError, ServiceResult, is_unique_violation},
    services::{assignment::AssignmentService, registration::RegistrationService},
    storage::{FileStore, UploadedFile},
};
use chrono::Utc;
use log::{info, warn};
use models::{role::Role, submission::SubmissionKind, validation::validate_grade};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, DatabaseConnection,
    EntityTrait, QueryFilter, QueryOrder,
};
use uuid::Uuid;

/// What a student handed in. Which half is required depends on the assignment.
#[derive(Debug, Clone, Default)]
pub struct SubmissionPayload {
    pub file: Option<UploadedFile>,
    pub text: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    Submitted(submissions::Model),
    /// Nothing was written; the student had already submitted
    AlreadySubmitted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionContent {
    File { file_name: String, bytes: Vec<u8> },
    Text(String),
}

pub struct SubmissionService;

impl SubmissionService {
    pub async fn submit(
        db: &DatabaseConnection,
        files: &FileStore,
        principal: &Principal,
        assignment_id: Uuid,
        payload: SubmissionPayload,
    ) -> ServiceResult<SubmitOutcome> {
        principal.require(Role::Student)?;
        let assignment = AssignmentService::find_assignment(db, assignment_id).await?;
        let student_id = principal.user_id.as_str();

        if !RegistrationService::is_registered(db, student_id, assignment.course_id).await? {
            return Err(ServiceError::forbidden(
                "You are not registered in this course",
            ));
        }

        if Self::find_for_student(db, assignment_id, student_id)
            .await?
            .is_some()
        {
            info!("{student_id} already submitted assignment {assignment_id}");
            return Ok(SubmitOutcome::AlreadySubmitted);
        }

        let kind = assignment.submission_kind()?;
        let now = Utc::now();
        let mut submission = submissions::ActiveModel {
            id: Set(Uuid::new_v4()),
            assignment_id: Set(assignment_id),
            student_id: Set(student_id.to_string()),
            submission_type_id: Set(kind.id()),
            file_path: Set(None),
            text_body: Set(None),
            submitted_at: Set(now),
            grade: Set(None),
            graded_at: Set(None),
        };

        let stored_file = match kind {
            SubmissionKind::FileUpload => {
                let file = payload
                    .file
                    .filter(|file| !file.is_empty())
                    .ok_or_else(|| {
                        ServiceError::validation("file", "Please select a file to upload.")
                    })?;
                let path = files
                    .save_submission(assignment_id, student_id, &file, now)
                    .await?;
                submission.file_path = Set(Some(path.clone()));
                Some(path)
            }
            SubmissionKind::TextEntry => {
                let text = payload
                    .text
                    .filter(|text| !text.trim().is_empty())
                    .ok_or_else(|| {
                        ServiceError::validation("text", "Please enter your submission.")
                    })?;
                submission.text_body = Set(Some(text));
                None
            }
        };

        match submission.insert(db).await {
            Ok(submission) => {
                info!("{student_id} submitted assignment {assignment_id}");
                Ok(SubmitOutcome::Submitted(submission))
            }
            Err(err) => {
                if let Some(path) = &stored_file {
                    files.remove_quietly(path).await;
                }
                if is_unique_violation(&err) {
                    info!("{student_id} already submitted assignment {assignment_id}");
                    Ok(SubmitOutcome::AlreadySubmitted)
                } else {
                    Err(err.into())
                }
            }
        }
    }

    /// Sets the grade of a submission, bounded by the assignment's points
    pub async fn grade(
        db: &DatabaseConnection,
        principal: &Principal,
        submission_id: Uuid,
        grade: i32,
    ) -> ServiceResult<submissions::Model> {
        let submission = Self::find_submission(db, submission_id).await?;
        let (assignment, _) =
            AssignmentService::owned_assignment(db, principal, submission.assignment_id).await?;
        validate_grade(grade, assignment.points)?;

        let mut submission: submissions::ActiveModel = submission.into();
        submission.grade = Set(Some(grade));
        submission.graded_at = Set(Some(Utc::now()));

        let submission = submission.update(db).await?;
        info!(
            "{} graded submission {} with {}/{}",
            principal.email, submission.id, grade, assignment.points
        );
        Ok(submission)
    }

    pub async fn list_submissions(
        db: &DatabaseConnection,
        principal: &Principal,
        assignment_id: Uuid,
    ) -> ServiceResult<Vec<submissions::Model>> {
        AssignmentService::owned_assignment(db, principal, assignment_id).await?;

        Ok(submissions::Entity::find()
            .filter(submissions::Column::AssignmentId.eq(assignment_id))
            .order_by_asc(submissions::Column::SubmittedAt)
            .all(db)
            .await?)
    }

    /// Submitted content, for the submitting student or the course's instructor
    pub async fn download(
        db: &DatabaseConnection,
        files: &FileStore,
        principal: &Principal,
        submission_id: Uuid,
    ) -> ServiceResult<SubmissionContent> {
        let submission = Self::find_submission(db, submission_id).await?;

        let is_author = principal.is_student() && principal.user_id == submission.student_id;
        if !is_author {
            AssignmentService::owned_assignment(db, principal, submission.assignment_id).await?;
        }

        if let Some(path) = submission.file_path {
            let bytes = files.read(&path).await.map_err(|err| {
                warn!("Stored file {path} for submission {submission_id} unreadable: {err}");
                err
            })?;
            let file_name = path.rsplit('/').next().unwrap_or(&path).to_string();
            return Ok(SubmissionContent::File { file_name, bytes });
        }

        Ok(SubmissionContent::Text(
            submission.text_body.unwrap_or_default(),
        ))
    }

    pub async fn find_submission<C: ConnectionTrait>(
        db: &C,
        submission_id: Uuid,
    ) -> ServiceResult<submissions::Model> {
        submissions::Entity::find_by_id(submission_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Submission not found"))
    }

    pub async fn find_for_student<C: ConnectionTrait>(
        db: &C,
        assignment_id: Uuid,
        student_id: &str,
    ) -> ServiceResult<Option<submissions::Model>> {
        Ok(submissions::Entity::find()
            .filter(submissions::Column::AssignmentId.eq(assignment_id))
            .filter(submissions::Column::StudentId.eq(student_id))
            .one(db)
            .await?)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        entities::{assignments, courses},
        services::course::CourseService,
        test_utils::{
            assignment_draft, course_draft, create_course, instructor, setup_db, student,
        },
    };
    use models::submission::SubmissionStatus;
    use sea_orm::PaginatorTrait;
    use tempfile::TempDir;

    struct Fixture {
        db: DatabaseConnection,
        files: FileStore,
        _dir: TempDir,
        course: courses::Model,
    }

    async fn fixture() -> Fixture {
        let db = setup_db().await;
        let dir = tempfile::tempdir().unwrap();
        let files = FileStore::new(dir.path());
        let course = create_course(&db, course_draft("HIST", 101, "World History")).await;
        RegistrationService::toggle(&db, &student(1), course.id)
            .await
            .unwrap();

        Fixture {
            db,
            files,
            _dir: dir,
            course,
        }
    }

    async fn assignment(f: &Fixture, kind: SubmissionKind) -> assignments::Model {
        AssignmentService::create_assignment(
            &f.db,
            &instructor(),
            f.course.id,
            assignment_draft("Homework", kind),
        )
        .await
        .unwrap()
    }

    fn text(body: &str) -> SubmissionPayload {
        SubmissionPayload {
            file: None,
            text: Some(body.to_string()),
        }
    }

    #[tokio::test]
    async fn test_second_submission_is_a_no_op() {
        let f = fixture().await;
        let homework = assignment(&f, SubmissionKind::TextEntry).await;

        let first =
            SubmissionService::submit(&f.db, &f.files, &student(1), homework.id, text("First"))
                .await
                .unwrap();
        let SubmitOutcome::Submitted(first) = first else {
            panic!("expected a stored submission");
        };
        assert_eq!(first.text_body.as_deref(), Some("First"));
        assert_eq!(first.status(), SubmissionStatus::Submitted);

        let second =
            SubmissionService::submit(&f.db, &f.files, &student(1), homework.id, text("Again"))
                .await
                .unwrap();
        assert_eq!(second, SubmitOutcome::AlreadySubmitted);
        assert_eq!(submissions::Entity::find().count(&f.db).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_empty_file_upload_rejected() {
        let f = fixture().await;
        let homework = assignment(&f, SubmissionKind::FileUpload).await;
        let payload = SubmissionPayload {
            file: Some(UploadedFile {
                file_name: "essay.pdf".to_string(),
                content_type: Some("application/pdf".to_string()),
                bytes: Vec::new(),
            }),
            text: None,
        };

        let err = SubmissionService::submit(&f.db, &f.files, &student(1), homework.id, payload)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(field) if field.field == "file"));
        assert_eq!(submissions::Entity::find().count(&f.db).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_file_upload_is_stored_and_downloadable() {
        let f = fixture().await;
        let homework = assignment(&f, SubmissionKind::FileUpload).await;
        let payload = SubmissionPayload {
            file: Some(UploadedFile {
                file_name: "essay.pdf".to_string(),
                content_type: None,
                bytes: b"%PDF".to_vec(),
            }),
            text: None,
        };

        let SubmitOutcome::Submitted(stored) =
            SubmissionService::submit(&f.db, &f.files, &student(1), homework.id, payload)
                .await
                .unwrap()
        else {
            panic!("expected a stored submission");
        };
        let path = stored.file_path.clone().unwrap();
        assert!(path.starts_with(&format!("submissions/{}/student-1_{}_", homework.id, homework.id)));
        assert!(path.ends_with(".pdf"));

        let by_owner = SubmissionService::download(&f.db, &f.files, &instructor(), stored.id)
            .await
            .unwrap();
        assert!(matches!(by_owner, SubmissionContent::File { bytes, .. } if bytes == b"%PDF"));

        let err = SubmissionService::download(&f.db, &f.files, &student(2), stored.id)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_blank_text_entry_rejected() {
        let f = fixture().await;
        let homework = assignment(&f, SubmissionKind::TextEntry).await;

        for payload in [text(""), text("  \n\t "), SubmissionPayload::default()] {
            let err = SubmissionService::submit(&f.db, &f.files, &student(1), homework.id, payload)
                .await
                .unwrap_err();
            assert!(matches!(err, ServiceError::Validation(field) if field.field == "text"));
        }
        assert_eq!(submissions::Entity::find().count(&f.db).await.unwrap(), 0);
    }

    async fn submit_file(f: &Fixture, assignment_id: Uuid) -> String {
        let payload = SubmissionPayload {
            file: Some(UploadedFile {
                file_name: "essay.pdf".to_string(),
                content_type: None,
                bytes: b"%PDF".to_vec(),
            }),
            text: None,
        };
        let SubmitOutcome::Submitted(stored) =
            SubmissionService::submit(&f.db, &f.files, &student(1), assignment_id, payload)
                .await
                .unwrap()
        else {
            panic!("expected a stored submission");
        };
        let path = stored.file_path.unwrap();
        assert!(f.files.root().join(&path).is_file());
        path
    }

    #[tokio::test]
    async fn test_deleting_assignment_removes_submissions_and_files() {
        let f = fixture().await;
        let homework = assignment(&f, SubmissionKind::FileUpload).await;
        let kept = assignment(&f, SubmissionKind::FileUpload).await;
        let path = submit_file(&f, homework.id).await;
        let kept_path = submit_file(&f, kept.id).await;

        AssignmentService::delete_assignment(&f.db, &f.files, &instructor(), homework.id)
            .await
            .unwrap();

        let remaining = submissions::Entity::find().all(&f.db).await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].assignment_id, kept.id);
        assert!(!f.files.root().join(&path).exists());
        assert!(
            !f.files
                .root()
                .join(FileStore::SUBMISSIONS_DIR)
                .join(homework.id.to_string())
                .exists()
        );
        assert!(f.files.root().join(&kept_path).is_file());
    }

    #[tokio::test]
    async fn test_deleting_course_removes_submissions_and_files() {
        let f = fixture().await;
        let homework = assignment(&f, SubmissionKind::FileUpload).await;
        let path = submit_file(&f, homework.id).await;

        CourseService::delete_course(&f.db, &f.files, &instructor(), f.course.id)
            .await
            .unwrap();

        assert_eq!(submissions::Entity::find().count(&f.db).await.unwrap(), 0);
        assert_eq!(assignments::Entity::find().count(&f.db).await.unwrap(), 0);
        assert!(!f.files.root().join(&path).exists());
    }

    #[tokio::test]
    async fn test_unregistered_student_cannot_submit() {
        let f = fixture().await;
        let homework = assignment(&f, SubmissionKind::TextEntry).await;
        let err = SubmissionService::submit(&f.db, &f.files, &student(2), homework.id, text("Hi"))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_grade_bounds() {
        let f = fixture().await;
        let homework = assignment(&f, SubmissionKind::TextEntry).await;
        let SubmitOutcome::Submitted(submission) =
            SubmissionService::submit(&f.db, &f.files, &student(1), homework.id, text("Answer"))
                .await
                .unwrap()
        else {
            panic!("expected a stored submission");
        };

        let err = SubmissionService::grade(&f.db, &instructor(), submission.id, 11)
            .await
            .unwrap_err();
        match err {
            ServiceError::Validation(field) => {
                assert_eq!(field.field, "grade");
                assert_eq!(field.message, "Grade cannot exceed 10 points");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        let unchanged = SubmissionService::find_submission(&f.db, submission.id)
            .await
            .unwrap();
        assert_eq!(unchanged.grade, None);

        let graded = SubmissionService::grade(&f.db, &instructor(), submission.id, 0)
            .await
            .unwrap();
        assert_eq!(graded.grade, Some(0));
        assert_eq!(graded.status(), SubmissionStatus::Graded);

        let err = SubmissionService::grade(&f.db, &student(1), submission.id, 5)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)));

        let listed = SubmissionService::list_submissions(&f.db, &instructor(), homework.id)
            .await
            .unwrap();
        assert_eq!(listed.len(), 1);
    }
}
