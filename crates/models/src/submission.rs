use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// How a student hands in an assignment.
///
/// The `submission_types` table is seeded with exactly these rows; `id()` is
/// the seeded primary key.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
pub enum SubmissionKind {
    #[strum(serialize = "File Upload")]
    #[serde(rename = "File Upload")]
    FileUpload,
    #[strum(serialize = "Text Entry")]
    #[serde(rename = "Text Entry")]
    TextEntry,
}

impl SubmissionKind {
    pub fn id(self) -> i32 {
        match self {
            Self::FileUpload => 1,
            Self::TextEntry => 2,
        }
    }

    pub fn from_id(id: i32) -> Option<Self> {
        match id {
            1 => Some(Self::FileUpload),
            2 => Some(Self::TextEntry),
            _ => None,
        }
    }
}

/// Grading state of a submission, derived from whether a grade is present
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
pub enum SubmissionStatus {
    Submitted,
    Graded,
}

impl SubmissionStatus {
    pub fn from_grade(grade: Option<i32>) -> Self {
        match grade {
            Some(_) => Self::Graded,
            None => Self::Submitted,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn test_kind_names_match_seeded_rows() {
        assert_eq!(SubmissionKind::FileUpload.to_string(), "File Upload");
        assert_eq!(
            SubmissionKind::from_str("Text Entry"),
            Ok(SubmissionKind::TextEntry)
        );
    }

    #[test]
    fn test_kind_id_roundtrip() {
        for kind in SubmissionKind::iter() {
            assert_eq!(SubmissionKind::from_id(kind.id()), Some(kind));
        }
        assert_eq!(SubmissionKind::from_id(3), None);
    }

    #[test]
    fn test_zero_grade_is_graded() {
        assert_eq!(SubmissionStatus::from_grade(Some(0)), SubmissionStatus::Graded);
        assert_eq!(SubmissionStatus::from_grade(None), SubmissionStatus::Submitted);
    }
}
