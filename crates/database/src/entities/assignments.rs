use models::submission::SubmissionKind;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "assignments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub course_id: Uuid,
    pub submission_type_id: i32,
    pub title: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    pub points: i32,
    pub due_date: DateTimeUtc,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::courses::Entity",
        from = "Column::CourseId",
        to = "super::courses::Column::Id"
    )]
    Course,
    #[sea_orm(
        belongs_to = "super::submission_types::Entity",
        from = "Column::SubmissionTypeId",
        to = "super::submission_types::Column::Id"
    )]
    SubmissionType,
    #[sea_orm(has_many = "super::submissions::Entity")]
    Submissions,
}

impl Related<super::courses::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Course.def()
    }
}

impl Related<super::submission_types::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SubmissionType.def()
    }
}

impl Related<super::submissions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Submissions.def()
    }
}

impl Model {
    pub fn submission_kind(&self) -> Result<SubmissionKind, DbErr> {
        SubmissionKind::from_id(self.submission_type_id).ok_or_else(|| {
            DbErr::Type(format!(
                "Unknown submission type {} on assignment {}",
                self.submission_type_id, self.id
            ))
        })
    }
}

impl ActiveModelBehavior for ActiveModel {}
