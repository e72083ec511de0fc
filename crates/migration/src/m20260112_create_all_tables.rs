use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create courses table
        manager
            .create_table(
                Table::create()
                    .table(Courses::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Courses::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Courses::InstructorEmail).string().not_null())
                    .col(ColumnDef::new(Courses::Department).string_len(5).not_null())
                    .col(ColumnDef::new(Courses::Number).integer().not_null())
                    .col(ColumnDef::new(Courses::Title).string_len(50).not_null())
                    .col(ColumnDef::new(Courses::CreditHours).integer().not_null())
                    .col(ColumnDef::new(Courses::Capacity).integer().not_null())
                    .col(ColumnDef::new(Courses::Location).string_len(100))
                    .col(ColumnDef::new(Courses::MeetDays).text().not_null())
                    .col(ColumnDef::new(Courses::StartTime).time().not_null())
                    .col(ColumnDef::new(Courses::EndTime).time().not_null())
                    .col(
                        ColumnDef::new(Courses::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Courses::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // Create registrations table (student <-> course association)
        manager
            .create_table(
                Table::create()
                    .table(Registrations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Registrations::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Registrations::StudentId).string().not_null())
                    .col(ColumnDef::new(Registrations::CourseId).uuid().not_null())
                    .col(
                        ColumnDef::new(Registrations::RegisteredAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-registrations-course_id")
                            .from(Registrations::Table, Registrations::CourseId)
                            .to(Courses::Table, Courses::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create submission_types lookup table
        manager
            .create_table(
                Table::create()
                    .table(SubmissionTypes::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SubmissionTypes::Id)
                            .integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(SubmissionTypes::Name)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .to_owned(),
            )
            .await?;

        // Create assignments table
        manager
            .create_table(
                Table::create()
                    .table(Assignments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Assignments::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Assignments::CourseId).uuid().not_null())
                    .col(
                        ColumnDef::new(Assignments::SubmissionTypeId)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Assignments::Title).string().not_null())
                    .col(ColumnDef::new(Assignments::Description).text())
                    .col(ColumnDef::new(Assignments::Points).integer().not_null())
                    .col(
                        ColumnDef::new(Assignments::DueDate)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Assignments::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Assignments::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-assignments-course_id")
                            .from(Assignments::Table, Assignments::CourseId)
                            .to(Courses::Table, Courses::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-assignments-submission_type_id")
                            .from(Assignments::Table, Assignments::SubmissionTypeId)
                            .to(SubmissionTypes::Table, SubmissionTypes::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // Create submissions table
        manager
            .create_table(
                Table::create()
                    .table(Submissions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Submissions::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Submissions::AssignmentId).uuid().not_null())
                    .col(ColumnDef::new(Submissions::StudentId).string().not_null())
                    .col(
                        ColumnDef::new(Submissions::SubmissionTypeId)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Submissions::FilePath).string())
                    .col(ColumnDef::new(Submissions::TextBody).text())
                    .col(
                        ColumnDef::new(Submissions::SubmittedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Submissions::Grade).integer())
                    .col(ColumnDef::new(Submissions::GradedAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-submissions-assignment_id")
                            .from(Submissions::Table, Submissions::AssignmentId)
                            .to(Assignments::Table, Assignments::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-submissions-submission_type_id")
                            .from(Submissions::Table, Submissions::SubmissionTypeId)
                            .to(SubmissionTypes::Table, SubmissionTypes::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // Create payments table
        manager
            .create_table(
                Table::create()
                    .table(Payments::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Payments::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Payments::StudentId).string().not_null())
                    .col(ColumnDef::new(Payments::AmountCents).big_integer().not_null())
                    .col(ColumnDef::new(Payments::PaymentType).text().not_null())
                    .col(ColumnDef::new(Payments::ExternalSessionId).string())
                    .col(ColumnDef::new(Payments::Status).text().not_null())
                    .col(ColumnDef::new(Payments::Notes).text())
                    .col(
                        ColumnDef::new(Payments::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Payments::CompletedAt).timestamp_with_time_zone())
                    .to_owned(),
            )
            .await?;

        // Create user_profiles table
        manager
            .create_table(
                Table::create()
                    .table(UserProfiles::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(UserProfiles::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(UserProfiles::UserId).string().not_null())
                    .col(ColumnDef::new(UserProfiles::FirstName).string().not_null())
                    .col(ColumnDef::new(UserProfiles::LastName).string().not_null())
                    .col(ColumnDef::new(UserProfiles::Description).text())
                    .col(ColumnDef::new(UserProfiles::BirthDate).date())
                    .col(ColumnDef::new(UserProfiles::AddressLine1).string())
                    .col(ColumnDef::new(UserProfiles::AddressLine2).string())
                    .col(ColumnDef::new(UserProfiles::City).string())
                    .col(ColumnDef::new(UserProfiles::State).string())
                    .col(ColumnDef::new(UserProfiles::ZipCode).string())
                    .col(ColumnDef::new(UserProfiles::Phone).string())
                    .col(ColumnDef::new(UserProfiles::Link1).string())
                    .col(ColumnDef::new(UserProfiles::Link2).string())
                    .col(ColumnDef::new(UserProfiles::Link3).string())
                    .col(ColumnDef::new(UserProfiles::PictureFileName).string())
                    .col(ColumnDef::new(UserProfiles::PictureData).blob())
                    .col(ColumnDef::new(UserProfiles::PictureContentType).string())
                    .col(
                        ColumnDef::new(UserProfiles::PictureUploadedAt)
                            .timestamp_with_time_zone(),
                    )
                    .col(
                        ColumnDef::new(UserProfiles::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(UserProfiles::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop tables in reverse order due to foreign key constraints
        manager
            .drop_table(Table::drop().table(UserProfiles::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Payments::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Submissions::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Assignments::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(SubmissionTypes::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Registrations::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Courses::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(Iden)]
enum Courses {
    Table,
    Id,
    InstructorEmail,
    Department,
    Number,
    Title,
    CreditHours,
    Capacity,
    Location,
    MeetDays,
    StartTime,
    EndTime,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Registrations {
    Table,
    Id,
    StudentId,
    CourseId,
    RegisteredAt,
}

#[derive(Iden)]
enum SubmissionTypes {
    Table,
    Id,
    Name,
}

#[derive(Iden)]
enum Assignments {
    Table,
    Id,
    CourseId,
    SubmissionTypeId,
    Title,
    Description,
    Points,
    DueDate,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Submissions {
    Table,
    Id,
    AssignmentId,
    StudentId,
    SubmissionTypeId,
    FilePath,
    TextBody,
    SubmittedAt,
    Grade,
    GradedAt,
}

#[derive(Iden)]
enum Payments {
    Table,
    Id,
    StudentId,
    AmountCents,
    PaymentType,
    ExternalSessionId,
    Status,
    Notes,
    CreatedAt,
    CompletedAt,
}

#[derive(Iden)]
enum UserProfiles {
    Table,
    Id,
    UserId,
    FirstName,
    LastName,
    Description,
    BirthDate,
    AddressLine1,
    AddressLine2,
    City,
    State,
    ZipCode,
    Phone,
    Link1,
    Link2,
    Link3,
    PictureFileName,
    PictureData,
    PictureContentType,
    PictureUploadedAt,
    CreatedAt,
    UpdatedAt,
}
