use crate::{
    access::Principal,
    entities::{courses, registrations},
    error::{ServiceError, ServiceResult, is_unique_violation},
    services::course::CourseService,
};
use chrono::Utc;
use log::info;
use models::role::Role;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr,
    EntityTrait, PaginatorTrait, QueryFilter,
};
use serde::Serialize;
use uuid::Uuid;

/// What a toggle did to the student's registration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RegistrationChange {
    Added,
    Dropped,
}

pub struct RegistrationService;

impl RegistrationService {
    /// Adds the caller to the course if absent, drops them if present
    pub async fn toggle(
        db: &DatabaseConnection,
        principal: &Principal,
        course_id: Uuid,
    ) -> ServiceResult<RegistrationChange> {
        principal.require(Role::Student)?;
        let course = CourseService::find_course(db, course_id).await?;
        let student_id = principal.user_id.as_str();

        let dropped = registrations::Entity::delete_many()
            .filter(registrations::Column::StudentId.eq(student_id))
            .filter(registrations::Column::CourseId.eq(course_id))
            .exec(db)
            .await?
            .rows_affected;

        if dropped > 0 {
            info!("{student_id} dropped course {course_id}");
            return Ok(RegistrationChange::Dropped);
        }

        if Self::enrollment(db, course_id).await? >= course.capacity as u64 {
            return Err(ServiceError::conflict("Course is full"));
        }

        let registration = registrations::ActiveModel {
            id: Set(Uuid::new_v4()),
            student_id: Set(student_id.to_string()),
            course_id: Set(course_id),
            registered_at: Set(Utc::now()),
        };

        match registration.insert(db).await {
            Ok(_) => info!("{student_id} registered for course {course_id}"),
            // A concurrent request registered the same pair first
            Err(err) if is_unique_violation(&err) => {
                info!("{student_id} already registered for course {course_id}")
            }
            Err(err) => return Err(err.into()),
        }

        Ok(RegistrationChange::Added)
    }

    pub async fn is_registered<C: ConnectionTrait>(
        db: &C,
        student_id: &str,
        course_id: Uuid,
    ) -> Result<bool, DbErr> {
        let count = registrations::Entity::find()
            .filter(registrations::Column::StudentId.eq(student_id))
            .filter(registrations::Column::CourseId.eq(course_id))
            .count(db)
            .await?;
        Ok(count > 0)
    }

    /// Number of active registrations in a course
    pub async fn enrollment<C: ConnectionTrait>(db: &C, course_id: Uuid) -> Result<u64, DbErr> {
        registrations::Entity::find()
            .filter(registrations::Column::CourseId.eq(course_id))
            .count(db)
            .await
    }

    pub async fn registered_courses<C: ConnectionTrait>(
        db: &C,
        student_id: &str,
    ) -> Result<Vec<courses::Model>, DbErr> {
        courses::Entity::find()
            .inner_join(registrations::Entity)
            .filter(registrations::Column::StudentId.eq(student_id))
            .all(db)
            .await
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::test_utils::{course_draft, create_course, instructor, setup_db, student};
    use models::validation::CourseDraft;

    #[tokio::test]
    async fn test_toggle_twice_restores_state() {
        let db = setup_db().await;
        let course = create_course(&db, course_draft("HIST", 101, "World History")).await;
        let alice = student(1);

        for round in 0..2 {
            let added = RegistrationService::toggle(&db, &alice, course.id)
                .await
                .unwrap();
            assert_eq!(added, RegistrationChange::Added, "round {round}");
            assert!(
                RegistrationService::is_registered(&db, &alice.user_id, course.id)
                    .await
                    .unwrap()
            );

            let dropped = RegistrationService::toggle(&db, &alice, course.id)
                .await
                .unwrap();
            assert_eq!(dropped, RegistrationChange::Dropped);
            assert!(
                !RegistrationService::is_registered(&db, &alice.user_id, course.id)
                    .await
                    .unwrap()
            );
        }
    }

    #[tokio::test]
    async fn test_toggle_unknown_course() {
        let db = setup_db().await;
        let err = RegistrationService::toggle(&db, &student(1), Uuid::new_v4())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
        assert_eq!(registrations::Entity::find().count(&db).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_instructors_cannot_register() {
        let db = setup_db().await;
        let course = create_course(&db, course_draft("HIST", 101, "World History")).await;
        let err = RegistrationService::toggle(&db, &instructor(), course.id)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_capacity_is_enforced() {
        let db = setup_db().await;
        let course = create_course(
            &db,
            CourseDraft {
                capacity: 1,
                ..course_draft("ART", 110, "Drawing")
            },
        )
        .await;

        RegistrationService::toggle(&db, &student(1), course.id)
            .await
            .unwrap();
        let err = RegistrationService::toggle(&db, &student(2), course.id)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(message) if message == "Course is full"));

        // Dropping frees the seat
        RegistrationService::toggle(&db, &student(1), course.id)
            .await
            .unwrap();
        assert_eq!(
            RegistrationService::toggle(&db, &student(2), course.id)
                .await
                .unwrap(),
            RegistrationChange::Added
        );
    }

    #[tokio::test]
    async fn test_duplicate_pair_is_rejected_by_index() {
        let db = setup_db().await;
        let course = create_course(&db, course_draft("HIST", 101, "World History")).await;
        let row = || registrations::ActiveModel {
            id: Set(Uuid::new_v4()),
            student_id: Set("student-1".to_string()),
            course_id: Set(course.id),
            registered_at: Set(Utc::now()),
        };

        row().insert(&db).await.unwrap();
        let err = row().insert(&db).await.unwrap_err();
        assert!(is_unique_violation(&err));
    }
}
