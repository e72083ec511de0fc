use models::days::MeetDays;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "courses")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// Set from the creating instructor's identity; never changed afterwards
    pub instructor_email: String,
    pub department: String, // e.g. "HIST"
    pub number: i32,
    pub title: String,
    pub credit_hours: i32,
    pub capacity: i32,
    pub location: Option<String>,
    #[sea_orm(column_type = "Text")]
    pub meet_days: MeetDays, // stored as e.g. "MWF"
    pub start_time: Time,
    pub end_time: Time,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::registrations::Entity")]
    Registrations,
    #[sea_orm(has_many = "super::assignments::Entity")]
    Assignments,
}

impl Related<super::registrations::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Registrations.def()
    }
}

impl Related<super::assignments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Assignments.def()
    }
}

impl Model {
    /// Short header such as "HIST 101 - World History"
    pub fn header(&self) -> String {
        format!("{} {} - {}", self.department, self.number, self.title)
    }
}

impl ActiveModelBehavior for ActiveModel {}
