#[cfg(feature = "database")]
#[macro_use]
mod db_value;

pub mod days;
pub mod payment;
pub mod role;
pub mod submission;
pub mod tuition;
pub mod validation;
