//! Input rules shared by the service layer and the HTTP layer.
//!
//! Each validator reports the first offending field so callers can redisplay
//! the input with a message next to that field.

use crate::{days::MeetDays, submission::SubmissionKind};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// A validation failure attached to a single input field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[error("{field}: {message}")]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

fn check(ok: bool, field: &str, message: &str) -> Result<(), FieldError> {
    if ok {
        Ok(())
    } else {
        Err(FieldError::new(field, message))
    }
}

/// Editable fields of a course. The instructor is never part of the draft.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseDraft {
    pub department: String,
    pub number: i32,
    pub title: String,
    pub credit_hours: i32,
    pub capacity: i32,
    pub location: Option<String>,
    pub meet_days: MeetDays,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

impl CourseDraft {
    pub const MAX_DEPARTMENT_LEN: usize = 5;
    pub const MAX_TITLE_LEN: usize = 50;
    pub const MAX_LOCATION_LEN: usize = 100;

    pub fn validate(&self) -> Result<(), FieldError> {
        check(
            !self.meet_days.is_empty(),
            "meet_days",
            "At least one day needs to be selected.",
        )?;

        let department = self.department.trim();
        check(!department.is_empty(), "department", "Department is required")?;
        check(
            department.chars().count() <= Self::MAX_DEPARTMENT_LEN,
            "department",
            "Department must be at most 5 characters",
        )?;

        check(
            (0..=9999).contains(&self.number),
            "number",
            "Course number must be between 0 and 9999",
        )?;

        let title = self.title.trim();
        check(!title.is_empty(), "title", "Course title is required")?;
        check(
            title.chars().count() <= Self::MAX_TITLE_LEN,
            "title",
            "Course title must be at most 50 characters",
        )?;

        check(
            (0..=20).contains(&self.credit_hours),
            "credit_hours",
            "Credit hours must be between 0 and 20",
        )?;
        check(
            (1..=100).contains(&self.capacity),
            "capacity",
            "Capacity must be between 1 and 100",
        )?;

        if let Some(location) = &self.location {
            check(
                location.chars().count() <= Self::MAX_LOCATION_LEN,
                "location",
                "Location must be at most 100 characters",
            )?;
        }

        check(
            self.start_time < self.end_time,
            "end_time",
            "End time must be after start time",
        )
    }
}

/// Instructor-editable fields of an assignment. The owning course is never part of the draft.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignmentDraft {
    pub title: String,
    pub description: Option<String>,
    pub points: i32,
    pub due_date: DateTime<Utc>,
    pub submission_kind: SubmissionKind,
}

impl AssignmentDraft {
    pub fn validate(&self) -> Result<(), FieldError> {
        check(!self.title.trim().is_empty(), "title", "Title is required")?;
        check(self.points >= 0, "points", "Points must be zero or greater.")
    }
}

/// Checks `0 <= grade <= points`
pub fn validate_grade(grade: i32, points: i32) -> Result<(), FieldError> {
    check(grade >= 0, "grade", "Grade must be zero or greater")?;
    if grade > points {
        return Err(FieldError::new(
            "grade",
            format!("Grade cannot exceed {points} points"),
        ));
    }
    Ok(())
}

/// Contact and personal details of a user profile
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileDraft {
    pub first_name: String,
    pub last_name: String,
    pub description: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub address_line1: Option<String>,
    pub address_line2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub phone: Option<String>,
    pub link1: Option<String>,
    pub link2: Option<String>,
    pub link3: Option<String>,
}

impl ProfileDraft {
    pub const MAX_NAME_LEN: usize = 50;
    pub const MAX_DESCRIPTION_LEN: usize = 500;

    pub fn validate(&self) -> Result<(), FieldError> {
        check(
            !self.first_name.trim().is_empty(),
            "first_name",
            "First Name is required",
        )?;
        check(
            self.first_name.chars().count() <= Self::MAX_NAME_LEN,
            "first_name",
            "First Name must be at most 50 characters",
        )?;
        check(
            !self.last_name.trim().is_empty(),
            "last_name",
            "Last Name is required",
        )?;
        check(
            self.last_name.chars().count() <= Self::MAX_NAME_LEN,
            "last_name",
            "Last Name must be at most 50 characters",
        )?;

        if let Some(description) = &self.description {
            check(
                description.chars().count() <= Self::MAX_DESCRIPTION_LEN,
                "description",
                "Description must be at most 500 characters",
            )?;
        }

        if let Some(phone) = self.phone.as_deref().filter(|p| !p.trim().is_empty()) {
            check(is_phone_number(phone), "phone", "Invalid phone number")?;
        }

        Ok(())
    }
}

fn is_phone_number(phone: &str) -> bool {
    let allowed = |c: char| c.is_ascii_digit() || " +-().".contains(c);
    let digits = phone.chars().filter(char::is_ascii_digit).count();

    phone.chars().all(allowed) && (7..=15).contains(&digits)
}

/// Largest accepted profile picture, in bytes
pub const MAX_PICTURE_BYTES: usize = 5 * 1024 * 1024;

const PICTURE_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "gif"];

/// Checks a profile picture upload and returns its lowercased extension with the leading dot
pub fn validate_picture(file_name: &str, len: usize) -> Result<String, FieldError> {
    let extension = Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .filter(|ext| PICTURE_EXTENSIONS.contains(&ext.as_str()))
        .ok_or_else(|| FieldError::new("picture", "Only JPG, PNG, GIF files allowed."))?;

    check(len > 0, "picture", "Please select a file to upload.")?;
    check(
        len <= MAX_PICTURE_BYTES,
        "picture",
        "File must be less than 5MB.",
    )?;

    Ok(format!(".{extension}"))
}

#[cfg(test)]
mod test {
    use super::*;

    fn course() -> CourseDraft {
        CourseDraft {
            department: "HIST".to_string(),
            number: 101,
            title: "World History".to_string(),
            credit_hours: 3,
            capacity: 30,
            location: Some("Room 12".to_string()),
            meet_days: MeetDays::from([true, false, true, false, false]),
            start_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_valid_course() {
        assert_eq!(course().validate(), Ok(()));
    }

    #[test]
    fn test_course_without_meet_days() {
        let draft = CourseDraft {
            meet_days: MeetDays::from([false; 5]),
            ..course()
        };
        let err = draft.validate().unwrap_err();
        assert_eq!(err.field, "meet_days");
        assert_eq!(err.message, "At least one day needs to be selected.");
    }

    #[test]
    fn test_course_bounds() {
        let too_many_credits = CourseDraft {
            credit_hours: 21,
            ..course()
        };
        assert_eq!(too_many_credits.validate().unwrap_err().field, "credit_hours");

        let empty_capacity = CourseDraft {
            capacity: 0,
            ..course()
        };
        assert_eq!(empty_capacity.validate().unwrap_err().field, "capacity");

        let long_department = CourseDraft {
            department: "ABCDEF".to_string(),
            ..course()
        };
        assert_eq!(long_department.validate().unwrap_err().field, "department");

        let backwards = CourseDraft {
            start_time: NaiveTime::from_hms_opt(11, 0, 0).unwrap(),
            ..course()
        };
        assert_eq!(backwards.validate().unwrap_err().field, "end_time");
    }

    #[test]
    fn test_grade_bounds() {
        assert!(validate_grade(0, 10).is_ok());
        assert!(validate_grade(10, 10).is_ok());
        assert_eq!(
            validate_grade(11, 10).unwrap_err().message,
            "Grade cannot exceed 10 points"
        );
        assert_eq!(validate_grade(-1, 10).unwrap_err().field, "grade");
    }

    #[test]
    fn test_assignment_rules() {
        let draft = AssignmentDraft {
            title: "  ".to_string(),
            description: None,
            points: 10,
            due_date: Utc::now(),
            submission_kind: SubmissionKind::TextEntry,
        };
        assert_eq!(draft.validate().unwrap_err().field, "title");

        let negative = AssignmentDraft {
            title: "Essay".to_string(),
            points: -5,
            ..draft
        };
        assert_eq!(negative.validate().unwrap_err().field, "points");
    }

    #[test]
    fn test_profile_rules() {
        let mut draft = ProfileDraft {
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            phone: Some("(555) 123-4567".to_string()),
            ..Default::default()
        };
        assert_eq!(draft.validate(), Ok(()));

        draft.phone = Some("call me".to_string());
        assert_eq!(draft.validate().unwrap_err().field, "phone");

        draft.phone = None;
        draft.last_name = String::new();
        assert_eq!(draft.validate().unwrap_err().message, "Last Name is required");
    }

    #[test]
    fn test_picture_rules() {
        assert_eq!(validate_picture("me.PNG", 1024), Ok(".png".to_string()));
        assert_eq!(
            validate_picture("me.bmp", 1024).unwrap_err().message,
            "Only JPG, PNG, GIF files allowed."
        );
        assert_eq!(
            validate_picture("me.jpg", MAX_PICTURE_BYTES + 1)
                .unwrap_err()
                .message,
            "File must be less than 5MB."
        );
    }
}
