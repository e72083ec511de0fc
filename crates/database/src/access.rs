//! Caller identity and the ownership rules every mutation goes through.

use crate::{
    entities::courses,
    error::{ServiceError, ServiceResult},
};
use log::warn;
use models::role::Role;
use serde::{Deserialize, Serialize};

/// The authenticated caller as seen by the service layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// Stable subject identifier from the identity provider
    pub user_id: String,
    pub email: String,
    pub role: Role,
}

impl Principal {
    pub fn new(user_id: impl Into<String>, email: impl Into<String>, role: Role) -> Self {
        Self {
            user_id: user_id.into(),
            email: email.into(),
            role,
        }
    }

    pub fn student(user_id: impl Into<String>, email: impl Into<String>) -> Self {
        Self::new(user_id, email, Role::Student)
    }

    pub fn instructor(user_id: impl Into<String>, email: impl Into<String>) -> Self {
        Self::new(user_id, email, Role::Instructor)
    }

    pub fn is_instructor(&self) -> bool {
        self.role == Role::Instructor
    }

    pub fn is_student(&self) -> bool {
        self.role == Role::Student
    }

    pub fn require(&self, role: Role) -> ServiceResult<()> {
        if self.role == role {
            Ok(())
        } else {
            warn!("{} ({}) attempted a {role}-only action", self.user_id, self.role);
            Err(ServiceError::forbidden(format!("Only a {role} can do this")))
        }
    }

    /// Instructor whose email matches the course's instructor
    pub fn owns(&self, course: &courses::Model) -> bool {
        self.is_instructor() && self.email.eq_ignore_ascii_case(&course.instructor_email)
    }

    pub fn require_owner(&self, course: &courses::Model) -> ServiceResult<()> {
        if self.owns(course) {
            Ok(())
        } else {
            warn!(
                "{} denied access to course {} owned by {}",
                self.email, course.id, course.instructor_email
            );
            Err(ServiceError::forbidden("You do not teach this course"))
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::{NaiveTime, Utc};
    use models::days::MeetDays;
    use uuid::Uuid;

    fn course(instructor_email: &str) -> courses::Model {
        courses::Model {
            id: Uuid::new_v4(),
            instructor_email: instructor_email.to_string(),
            department: "HIST".to_string(),
            number: 101,
            title: "World History".to_string(),
            credit_hours: 3,
            capacity: 30,
            location: None,
            meet_days: MeetDays::MONDAY,
            start_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_owner_match_ignores_case() {
        let course = course("Prof@School.edu");
        let prof = Principal::instructor("p1", "prof@school.edu");
        assert!(prof.owns(&course));
        assert!(prof.require_owner(&course).is_ok());
    }

    #[test]
    fn test_other_instructor_and_student_are_not_owners() {
        let course = course("prof@school.edu");
        let other = Principal::instructor("p2", "other@school.edu");
        let student = Principal::student("s1", "prof@school.edu");

        assert!(matches!(
            other.require_owner(&course),
            Err(ServiceError::Forbidden(_))
        ));
        assert!(!student.owns(&course));
    }

    #[test]
    fn test_require_role() {
        let student = Principal::student("s1", "s1@school.edu");
        assert!(student.require(Role::Student).is_ok());
        assert!(matches!(
            student.require(Role::Instructor),
            Err(ServiceError::Forbidden(_))
        ));
    }
}
