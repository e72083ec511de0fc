use crate::{
    access::Principal,
    entities::{assignments, courses, registrations, submissions},
    error::{ServiceError, ServiceResult},
    storage::FileStore,
};
use chrono::Utc;
use futures::future::join_all;
use log::info;
use models::{role::Role, validation::CourseDraft};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, Condition, ConnectionTrait,
    DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder, QuerySelect,
    TransactionTrait,
    sea_query::{Alias, Expr, ExprTrait, Func, LikeExpr},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Optional, conjunctive catalog filters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseFilter {
    /// Substring of the title, department or course number
    pub term: Option<String>,
    pub department: Option<String>,
    pub credit_hours: Option<i32>,
}

/// Values offered by the catalog's filter dropdowns
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterOptions {
    pub departments: Vec<String>,
    pub credit_hours: Vec<i32>,
}

const LIKE_ESCAPE: char = '\\';

/// `%term%` with the term's own wildcards matched literally
fn contains_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | LIKE_ESCAPE) {
            pattern.push(LIKE_ESCAPE);
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

pub struct CourseService;

impl CourseService {
    pub async fn create_course(
        db: &DatabaseConnection,
        principal: &Principal,
        draft: CourseDraft,
    ) -> ServiceResult<courses::Model> {
        principal.require(Role::Instructor)?;
        draft.validate()?;

        let now = Utc::now();
        let mut course = courses::ActiveModel {
            id: Set(Uuid::new_v4()),
            instructor_email: Set(principal.email.clone()),
            created_at: Set(now),
            ..Default::default()
        };
        Self::apply_draft(&mut course, draft);
        course.updated_at = Set(now);

        let course = course.insert(db).await?;
        info!("{} created course {} ({})", principal.email, course.id, course.header());
        Ok(course)
    }

    /// Updates the editable fields; the instructor never changes
    pub async fn update_course(
        db: &DatabaseConnection,
        principal: &Principal,
        course_id: Uuid,
        draft: CourseDraft,
    ) -> ServiceResult<courses::Model> {
        let course = Self::find_course(db, course_id).await?;
        principal.require_owner(&course)?;
        draft.validate()?;

        let mut course: courses::ActiveModel = course.into();
        Self::apply_draft(&mut course, draft);
        course.updated_at = Set(Utc::now());

        let course = course.update(db).await?;
        info!("{} updated course {}", principal.email, course.id);
        Ok(course)
    }

    /// Deletes a course together with its registrations, assignments and submissions
    pub async fn delete_course(
        db: &DatabaseConnection,
        files: &FileStore,
        principal: &Principal,
        course_id: Uuid,
    ) -> ServiceResult<()> {
        let course = Self::find_course(db, course_id).await?;
        principal.require_owner(&course)?;

        let txn = db.begin().await?;

        let assignment_ids: Vec<Uuid> = assignments::Entity::find()
            .select_only()
            .column(assignments::Column::Id)
            .filter(assignments::Column::CourseId.eq(course_id))
            .into_tuple()
            .all(&txn)
            .await?;

        let removed_submissions = submissions::Entity::delete_many()
            .filter(submissions::Column::AssignmentId.is_in(assignment_ids.clone()))
            .exec(&txn)
            .await?
            .rows_affected;
        assignments::Entity::delete_many()
            .filter(assignments::Column::CourseId.eq(course_id))
            .exec(&txn)
            .await?;
        let removed_registrations = registrations::Entity::delete_many()
            .filter(registrations::Column::CourseId.eq(course_id))
            .exec(&txn)
            .await?
            .rows_affected;
        courses::Entity::delete_by_id(course_id).exec(&txn).await?;

        txn.commit().await?;

        join_all(
            assignment_ids
                .iter()
                .map(|id| files.remove_assignment_dir(*id)),
        )
        .await;

        info!(
            "{} deleted course {} ({} assignments, {} submissions, {} registrations)",
            principal.email,
            course_id,
            assignment_ids.len(),
            removed_submissions,
            removed_registrations
        );
        Ok(())
    }

    pub async fn find_course<C: ConnectionTrait>(
        db: &C,
        course_id: Uuid,
    ) -> ServiceResult<courses::Model> {
        courses::Entity::find_by_id(course_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Course not found"))
    }

    /// Catalog search ordered by department, then course number
    pub async fn search(
        db: &DatabaseConnection,
        filter: &CourseFilter,
    ) -> Result<Vec<courses::Model>, DbErr> {
        let mut condition = Condition::all();

        if let Some(term) = filter.term.as_deref().map(str::trim)
            && !term.is_empty()
        {
            let pattern = || LikeExpr::new(contains_pattern(term)).escape(LIKE_ESCAPE);
            condition = condition.add(
                Condition::any()
                    .add(courses::Column::Title.like(pattern()))
                    .add(courses::Column::Department.like(pattern()))
                    .add(
                        Expr::col((courses::Entity, courses::Column::Number))
                            .cast_as(Alias::new("TEXT"))
                            .like(pattern()),
                    ),
            );
        }

        if let Some(department) = filter.department.as_deref().map(str::trim)
            && !department.is_empty()
        {
            condition = condition.add(courses::Column::Department.eq(department));
        }

        if let Some(credit_hours) = filter.credit_hours {
            condition = condition.add(courses::Column::CreditHours.eq(credit_hours));
        }

        courses::Entity::find()
            .filter(condition)
            .order_by_asc(courses::Column::Department)
            .order_by_asc(courses::Column::Number)
            .all(db)
            .await
    }

    pub async fn filter_options(db: &DatabaseConnection) -> Result<FilterOptions, DbErr> {
        let departments: Vec<String> = courses::Entity::find()
            .select_only()
            .column(courses::Column::Department)
            .distinct()
            .order_by_asc(courses::Column::Department)
            .into_tuple()
            .all(db)
            .await?;

        let credit_hours: Vec<i32> = courses::Entity::find()
            .select_only()
            .column(courses::Column::CreditHours)
            .distinct()
            .order_by_asc(courses::Column::CreditHours)
            .into_tuple()
            .all(db)
            .await?;

        Ok(FilterOptions {
            departments,
            credit_hours,
        })
    }

    /// Registered courses for a student, taught courses for an instructor
    pub async fn courses_for(
        db: &DatabaseConnection,
        principal: &Principal,
    ) -> Result<Vec<courses::Model>, DbErr> {
        let query = match principal.role {
            Role::Student => courses::Entity::find()
                .inner_join(registrations::Entity)
                .filter(registrations::Column::StudentId.eq(principal.user_id.as_str())),
            Role::Instructor => courses::Entity::find().filter(
                Expr::expr(Func::lower(Expr::col((
                    courses::Entity,
                    courses::Column::InstructorEmail,
                ))))
                .eq(principal.email.to_lowercase()),
            ),
        };

        query
            .order_by_asc(courses::Column::Department)
            .order_by_asc(courses::Column::Number)
            .all(db)
            .await
    }

    fn apply_draft(course: &mut courses::ActiveModel, draft: CourseDraft) {
        course.department = Set(draft.department.trim().to_string());
        course.number = Set(draft.number);
        course.title = Set(draft.title.trim().to_string());
        course.credit_hours = Set(draft.credit_hours);
        course.capacity = Set(draft.capacity);
        course.location = Set(draft
            .location
            .map(|location| location.trim().to_string())
            .filter(|location| !location.is_empty()));
        course.meet_days = Set(draft.meet_days);
        course.start_time = Set(draft.start_time);
        course.end_time = Set(draft.end_time);
    }
}
