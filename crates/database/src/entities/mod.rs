pub mod assignments;
pub mod courses;
pub mod payments;
pub mod registrations;
pub mod submission_types;
pub mod submissions;
pub mod user_profiles;
