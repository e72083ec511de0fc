use crate::{
    access::Principal,
    entities::{assignments, courses, submissions},
    error::{ServiceError, ServiceResult},
    services::{course::CourseService, registration::RegistrationService},
    storage::FileStore,
};
use chrono::Utc;
use log::info;
use models::{role::Role, submission::SubmissionKind, validation::AssignmentDraft};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, DatabaseConnection,
    EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, TransactionTrait,
};
use serde::Serialize;
use std::collections::HashMap;
use uuid::Uuid;

/// An assignment as listed on a course page
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssignmentOverview {
    pub assignment: assignments::Model,
    pub submission_kind: SubmissionKind,
    /// The calling student's own submission, if any
    pub my_submission: Option<submissions::Model>,
    /// Number of submissions received, for the owning instructor
    pub submission_count: Option<u64>,
}

pub struct AssignmentService;

impl AssignmentService {
    pub async fn create_assignment(
        db: &DatabaseConnection,
        principal: &Principal,
        course_id: Uuid,
        draft: AssignmentDraft,
    ) -> ServiceResult<assignments::Model> {
        let course = CourseService::find_course(db, course_id).await?;
        principal.require_owner(&course)?;
        draft.validate()?;

        let now = Utc::now();
        let assignment = assignments::ActiveModel {
            id: Set(Uuid::new_v4()),
            course_id: Set(course.id),
            created_at: Set(now),
            updated_at: Set(now),
            ..Self::draft_model(draft)
        };

        let assignment = assignment.insert(db).await?;
        info!(
            "{} created assignment {} in course {}",
            principal.email, assignment.id, course.id
        );
        Ok(assignment)
    }

    /// Edits an assignment in place. The owning course is checked against the
    /// stored row and is never changed.
    pub async fn update_assignment(
        db: &DatabaseConnection,
        principal: &Principal,
        assignment_id: Uuid,
        draft: AssignmentDraft,
    ) -> ServiceResult<assignments::Model> {
        let (assignment, _) = Self::owned_assignment(db, principal, assignment_id).await?;
        draft.validate()?;

        let mut assignment: assignments::ActiveModel = assignment.into();
        let changes = Self::draft_model(draft);
        assignment.title = changes.title;
        assignment.description = changes.description;
        assignment.points = changes.points;
        assignment.due_date = changes.due_date;
        assignment.submission_type_id = changes.submission_type_id;
        assignment.updated_at = Set(Utc::now());

        let assignment = assignment.update(db).await?;
        info!("{} updated assignment {}", principal.email, assignment.id);
        Ok(assignment)
    }

    /// Deletes an assignment with its submissions and their stored files
    pub async fn delete_assignment(
        db: &DatabaseConnection,
        files: &FileStore,
        principal: &Principal,
        assignment_id: Uuid,
    ) -> ServiceResult<()> {
        Self::owned_assignment(db, principal, assignment_id).await?;

        let txn = db.begin().await?;
        let removed = submissions::Entity::delete_many()
            .filter(submissions::Column::AssignmentId.eq(assignment_id))
            .exec(&txn)
            .await?
            .rows_affected;
        assignments::Entity::delete_by_id(assignment_id)
            .exec(&txn)
            .await?;
        txn.commit().await?;

        files.remove_assignment_dir(assignment_id).await;
        info!(
            "{} deleted assignment {} and {} submissions",
            principal.email, assignment_id, removed
        );
        Ok(())
    }

    pub async fn find_assignment<C: ConnectionTrait>(
        db: &C,
        assignment_id: Uuid,
    ) -> ServiceResult<assignments::Model> {
        assignments::Entity::find_by_id(assignment_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Assignment not found"))
    }

    /// Loads an assignment and its course, requiring the caller to teach that course
    pub async fn owned_assignment<C: ConnectionTrait>(
        db: &C,
        principal: &Principal,
        assignment_id: Uuid,
    ) -> ServiceResult<(assignments::Model, courses::Model)> {
        let assignment = Self::find_assignment(db, assignment_id).await?;
        let course = CourseService::find_course(db, assignment.course_id).await?;
        principal.require_owner(&course)?;
        Ok((assignment, course))
    }

    /// Assignments of a course ordered by due date. Instructors must own the
    /// course; students must be registered in it.
    pub async fn list_for_course(
        db: &DatabaseConnection,
        principal: &Principal,
        course_id: Uuid,
    ) -> ServiceResult<Vec<AssignmentOverview>> {
        let course = CourseService::find_course(db, course_id).await?;
        match principal.role {
            Role::Instructor => principal.require_owner(&course)?,
            Role::Student => {
                if !RegistrationService::is_registered(db, &principal.user_id, course_id).await? {
                    return Err(ServiceError::forbidden(
                        "You are not registered in this course",
                    ));
                }
            }
        }

        let assignments = assignments::Entity::find()
            .filter(assignments::Column::CourseId.eq(course_id))
            .order_by_asc(assignments::Column::DueDate)
            .all(db)
            .await?;
        let ids: Vec<Uuid> = assignments.iter().map(|a| a.id).collect();

        let mut own_submissions: HashMap<Uuid, submissions::Model> = HashMap::new();
        let mut counts: HashMap<Uuid, u64> = HashMap::new();

        match principal.role {
            Role::Student => {
                own_submissions = submissions::Entity::find()
                    .filter(submissions::Column::AssignmentId.is_in(ids))
                    .filter(submissions::Column::StudentId.eq(principal.user_id.as_str()))
                    .all(db)
                    .await?
                    .into_iter()
                    .map(|submission| (submission.assignment_id, submission))
                    .collect();
            }
            Role::Instructor => {
                for id in ids {
                    let count = submissions::Entity::find()
                        .filter(submissions::Column::AssignmentId.eq(id))
                        .count(db)
                        .await?;
                    counts.insert(id, count);
                }
            }
        }

        assignments
            .into_iter()
            .map(|assignment| -> ServiceResult<AssignmentOverview> {
                Ok(AssignmentOverview {
                    submission_kind: assignment.submission_kind()?,
                    my_submission: own_submissions.remove(&assignment.id),
                    submission_count: counts.get(&assignment.id).copied(),
                    assignment,
                })
            })
            .collect()
    }

    fn draft_model(draft: AssignmentDraft) -> assignments::ActiveModel {
        assignments::ActiveModel {
            submission_type_id: Set(draft.submission_kind.id()),
            title: Set(draft.title.trim().to_string()),
            description: Set(draft.description.filter(|d| !d.trim().is_empty())),
            points: Set(draft.points),
            due_date: Set(draft.due_date),
            ..Default::default()
        }
    }
}
