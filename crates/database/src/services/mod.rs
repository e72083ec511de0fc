pub mod assignment;
pub mod billing;
pub mod course;
pub mod profile;
pub mod registration;
pub mod submission;
