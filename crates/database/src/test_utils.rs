use crate::{access::Principal, entities::courses, services::course::CourseService};
use chrono::{Duration, NaiveTime, Utc};
use migration::{Migrator, MigratorTrait};
use models::{
    days::MeetDays,
    submission::SubmissionKind,
    validation::{AssignmentDraft, CourseDraft},
};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};

/// Fresh in-memory database with every migration applied
pub async fn setup_db() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:");
    // A single connection keeps every query on the same in-memory database
    options.max_connections(1).sqlx_logging(false);

    let db = Database::connect(options).await.unwrap();
    Migrator::up(&db, None).await.unwrap();
    db
}

pub fn instructor() -> Principal {
    Principal::instructor("instructor-1", "prof@school.edu")
}

pub fn student(n: u32) -> Principal {
    Principal::student(format!("student-{n}"), format!("student{n}@school.edu"))
}

pub fn course_draft(department: &str, number: i32, title: &str) -> CourseDraft {
    CourseDraft {
        department: department.to_string(),
        number,
        title: title.to_string(),
        credit_hours: 3,
        capacity: 30,
        location: Some("Room 12".to_string()),
        meet_days: MeetDays::MONDAY | MeetDays::WEDNESDAY,
        start_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
        end_time: NaiveTime::from_hms_opt(10, 15, 0).unwrap(),
    }
}

pub async fn create_course(db: &DatabaseConnection, draft: CourseDraft) -> courses::Model {
    CourseService::create_course(db, &instructor(), draft)
        .await
        .unwrap()
}

pub fn assignment_draft(title: &str, kind: SubmissionKind) -> AssignmentDraft {
    AssignmentDraft {
        title: title.to_string(),
        description: Some("Read chapter 1".to_string()),
        points: 10,
        due_date: Utc::now() + Duration::days(7),
        submission_kind: kind,
    }
}
