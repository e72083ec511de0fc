pub mod multipart;
pub mod shutdown;
