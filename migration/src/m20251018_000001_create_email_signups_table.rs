use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(
            "
                CREATE TABLE email_signups(
                    id uuid NOT NULL DEFAULT gen_random_uuid(),
                    PRIMARY KEY (id),
                    email TEXT NOT NULL UNIQUE,
                    created_at timestamptz NOT NULL DEFAULT now()
                )
            ",
        )
        .await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared("DROP TABLE email_signups")
            .await?;
        Ok(())
    }
}
