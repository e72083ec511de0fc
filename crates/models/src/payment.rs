use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Settlement state of a payment row. Only `Completed` counts toward the balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
pub enum PaymentStatus {
    Completed,
    Pending,
    Failed,
}

/// Whether the student paid off the whole balance or part of it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PaymentType {
    Full,
    Partial,
}

#[cfg(feature = "database")]
impl_string_value!(PaymentStatus);

#[cfg(feature = "database")]
impl_string_value!(PaymentType);
