use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Role claim carried by an authenticated principal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum Role {
    Student,
    Instructor,
}
