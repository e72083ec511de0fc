use chrono::NaiveTime;
use database::{
    entities::courses,
    services::{
        course::{CourseFilter, FilterOptions},
        registration::RegistrationChange,
    },
};
use models::{days::MeetDays, validation::CourseDraft};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CourseResponse {
    pub id: Uuid,
    pub instructor_email: String,
    pub department: String,
    pub number: i32,
    pub title: String,
    pub credit_hours: i32,
    pub capacity: i32,
    pub location: Option<String>,
    /// Monday through Friday
    #[schema(value_type = Vec<bool>)]
    pub meet_days: [bool; 5],
    /// Day pattern such as "MWF"
    pub days_pattern: String,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

impl From<courses::Model> for CourseResponse {
    fn from(course: courses::Model) -> Self {
        Self {
            id: course.id,
            instructor_email: course.instructor_email,
            department: course.department,
            number: course.number,
            title: course.title,
            credit_hours: course.credit_hours,
            capacity: course.capacity,
            location: course.location,
            meet_days: course.meet_days.into(),
            days_pattern: course.meet_days.to_string(),
            start_time: course.start_time,
            end_time: course.end_time,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CourseRequest {
    pub department: String,
    pub number: i32,
    pub title: String,
    pub credit_hours: i32,
    pub capacity: i32,
    pub location: Option<String>,
    /// Monday through Friday
    #[schema(value_type = Vec<bool>)]
    pub meet_days: [bool; 5],
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

impl From<CourseRequest> for CourseDraft {
    fn from(request: CourseRequest) -> Self {
        Self {
            department: request.department,
            number: request.number,
            title: request.title,
            credit_hours: request.credit_hours,
            capacity: request.capacity,
            location: request.location,
            meet_days: MeetDays::from(request.meet_days),
            start_time: request.start_time,
            end_time: request.end_time,
        }
    }
}

#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
pub struct CourseQueryParams {
    /// Substring of the title, department or course number
    pub term: Option<String>,
    /// Exact department code
    pub department: Option<String>,
    /// Exact number of credit hours
    pub credits: Option<i32>,
}

impl From<CourseQueryParams> for CourseFilter {
    fn from(params: CourseQueryParams) -> Self {
        Self {
            term: params.term,
            department: params.department,
            credit_hours: params.credits,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct FilterOptionsResponse {
    pub departments: Vec<String>,
    pub credit_hours: Vec<i32>,
}

impl From<FilterOptions> for FilterOptionsResponse {
    fn from(options: FilterOptions) -> Self {
        Self {
            departments: options.departments,
            credit_hours: options.credit_hours,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RegistrationResponse {
    pub course_id: Uuid,
    /// Whether the caller is registered after the toggle
    pub registered: bool,
    pub message: String,
}

impl RegistrationResponse {
    pub fn new(course: &courses::Model, change: RegistrationChange) -> Self {
        let (registered, verb) = match change {
            RegistrationChange::Added => (true, "Registered for"),
            RegistrationChange::Dropped => (false, "Dropped"),
        };

        Self {
            course_id: course.id,
            registered,
            message: format!("{verb} {}", course.header()),
        }
    }
}
