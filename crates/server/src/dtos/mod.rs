pub mod assignment;
pub mod billing;
pub mod course;
pub mod profile;
