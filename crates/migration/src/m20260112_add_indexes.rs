use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // One registration per (student, course); concurrent adds fail on this index
        manager
            .create_index(
                Index::create()
                    .name("idx_registrations_student_course")
                    .table(Registrations::Table)
                    .col(Registrations::StudentId)
                    .col(Registrations::CourseId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Capacity checks count registrations per course
        manager
            .create_index(
                Index::create()
                    .name("idx_registrations_course_id")
                    .table(Registrations::Table)
                    .col(Registrations::CourseId)
                    .to_owned(),
            )
            .await?;

        // One submission per (assignment, student)
        manager
            .create_index(
                Index::create()
                    .name("idx_submissions_assignment_student")
                    .table(Submissions::Table)
                    .col(Submissions::AssignmentId)
                    .col(Submissions::StudentId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_assignments_course_id")
                    .table(Assignments::Table)
                    .col(Assignments::CourseId)
                    .to_owned(),
            )
            .await?;

        // Catalog filters and dashboards
        manager
            .create_index(
                Index::create()
                    .name("idx_courses_department_number")
                    .table(Courses::Table)
                    .col(Courses::Department)
                    .col(Courses::Number)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_courses_instructor_email")
                    .table(Courses::Table)
                    .col(Courses::InstructorEmail)
                    .to_owned(),
            )
            .await?;

        // Balance lookups, and webhook redelivery must not record a session twice
        manager
            .create_index(
                Index::create()
                    .name("idx_payments_student_id")
                    .table(Payments::Table)
                    .col(Payments::StudentId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_payments_external_session_id")
                    .table(Payments::Table)
                    .col(Payments::ExternalSessionId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // One profile per user
        manager
            .create_index(
                Index::create()
                    .name("idx_user_profiles_user_id")
                    .table(UserProfiles::Table)
                    .col(UserProfiles::UserId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let indexes = [
            ("idx_registrations_student_course", Registrations::Table.into_iden()),
            ("idx_registrations_course_id", Registrations::Table.into_iden()),
            ("idx_submissions_assignment_student", Submissions::Table.into_iden()),
            ("idx_assignments_course_id", Assignments::Table.into_iden()),
            ("idx_courses_department_number", Courses::Table.into_iden()),
            ("idx_courses_instructor_email", Courses::Table.into_iden()),
            ("idx_payments_student_id", Payments::Table.into_iden()),
            ("idx_payments_external_session_id", Payments::Table.into_iden()),
            ("idx_user_profiles_user_id", UserProfiles::Table.into_iden()),
        ];

        for (name, table) in indexes {
            manager
                .drop_index(Index::drop().name(name).table(table).to_owned())
                .await?;
        }

        Ok(())
    }
}

#[derive(Iden)]
enum Courses {
    Table,
    Department,
    Number,
    InstructorEmail,
}

#[derive(Iden)]
enum Registrations {
    Table,
    StudentId,
    CourseId,
}

#[derive(Iden)]
enum Assignments {
    Table,
    CourseId,
}

#[derive(Iden)]
enum Submissions {
    Table,
    AssignmentId,
    StudentId,
}

#[derive(Iden)]
enum Payments {
    Table,
    StudentId,
    ExternalSessionId,
}

#[derive(Iden)]
enum UserProfiles {
    Table,
    UserId,
}
