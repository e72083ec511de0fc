use models::submission::SubmissionKind;
use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

const KINDS: [SubmissionKind; 2] = [SubmissionKind::FileUpload, SubmissionKind::TextEntry];

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let mut insert = Query::insert()
            .into_table(SubmissionTypes::Table)
            .columns([SubmissionTypes::Id, SubmissionTypes::Name])
            .to_owned();

        for kind in KINDS {
            insert.values_panic([kind.id().into(), kind.to_string().into()]);
        }

        manager.exec_stmt(insert).await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let ids: Vec<i32> = KINDS.iter().map(|kind| kind.id()).collect();

        let delete = Query::delete()
            .from_table(SubmissionTypes::Table)
            .and_where(Expr::col(SubmissionTypes::Id).is_in(ids))
            .to_owned();

        manager.exec_stmt(delete).await
    }
}

#[derive(Iden)]
enum SubmissionTypes {
    Table,
    Id,
    Name,
}
