use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240301_000001_create_users_table::Migration),
            Box::new(m20240301_000002_create_packages_table::Migration),
            Box::new(m20240301_000003_create_requests_table::Migration),
            Box::new(m20240301_000004_create_reviews_table::Migration),
        ]
    }
}

mod m20240301_000001_create_users_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000001_create_users_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Users::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Users::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Users::Name).string().not_null())
                        .col(
                            ColumnDef::new(Users::Email)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Users::Picture).text().null())
                        .col(
                            ColumnDef::new(Users::Role)
                                .string_len(16)
                                .not_null()
                                .default("customer")
                                .check(Expr::col(Users::Role).is_in([
                                    "partner", "manager", "customer",
                                ])),
                        )
                        .col(
                            ColumnDef::new(Users::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null()
                                .default(Expr::current_timestamp()),
                        )
                        .col(
                            ColumnDef::new(Users::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null()
                                .default(Expr::current_timestamp()),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Users::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Users {
        Table,
        Id,
        Name,
        Email,
        Picture,
        Role,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240301_000002_create_packages_table {
    use super::m20240301_000001_create_users_table::Users;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000002_create_packages_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Packages::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Packages::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Packages::OwnerId).uuid().null())
                        .col(ColumnDef::new(Packages::Title).string().not_null())
                        .col(ColumnDef::new(Packages::PickupAddress).text().not_null())
                        .col(ColumnDef::new(Packages::DropoffAddress).text().not_null())
                        .col(ColumnDef::new(Packages::WeightGrams).integer().null())
                        .col(
                            ColumnDef::new(Packages::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null()
                                .default(Expr::current_timestamp()),
                        )
                        .col(
                            ColumnDef::new(Packages::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null()
                                .default(Expr::current_timestamp()),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_packages_owner_id")
                                .from(Packages::Table, Packages::OwnerId)
                                .to(Users::Table, Users::Id),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_packages_owner_id")
                        .table(Packages::Table)
                        .col(Packages::OwnerId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Packages::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Packages {
        Table,
        Id,
        OwnerId,
        Title,
        PickupAddress,
        DropoffAddress,
        WeightGrams,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240301_000003_create_requests_table {
    use super::m20240301_000001_create_users_table::Users;
    use super::m20240301_000002_create_packages_table::Packages;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000003_create_requests_table"
        }
    }

    const STATUSES: [&str; 6] = [
        "requested",
        "confirmed",
        "pickedup",
        "delivered",
        "cancelled",
        "rejected",
    ];

    fn milestone(column: Requests) -> ColumnDef {
        ColumnDef::new(column)
            .timestamp_with_time_zone()
            .null()
            .to_owned()
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Requests::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Requests::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Requests::PackageId).uuid().not_null())
                        .col(ColumnDef::new(Requests::PartnerId).uuid().null())
                        .col(
                            ColumnDef::new(Requests::TrackingNumber)
                                .string_len(50)
                                .not_null(),
                        )
                        .col(ColumnDef::new(Requests::FranchiseTrackingId).text().null())
                        .col(ColumnDef::new(Requests::FranchiseReceiptUrl).text().null())
                        .col(ColumnDef::new(Requests::OneTimeCode).string().null())
                        .col(
                            ColumnDef::new(Requests::IsVerified)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(
                            ColumnDef::new(Requests::CurrentStatus)
                                .string_len(16)
                                .not_null()
                                .default("requested")
                                .check(Expr::col(Requests::CurrentStatus).is_in(STATUSES)),
                        )
                        .col(
                            ColumnDef::new(Requests::RequestedAt)
                                .timestamp_with_time_zone()
                                .null()
                                .default(Expr::current_timestamp()),
                        )
                        .col(&mut milestone(Requests::ConfirmedAt))
                        .col(&mut milestone(Requests::PickedAt))
                        .col(&mut milestone(Requests::DeliveredAt))
                        .col(&mut milestone(Requests::CancelledAt))
                        .col(&mut milestone(Requests::RejectedAt))
                        .col(
                            ColumnDef::new(Requests::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null()
                                .default(Expr::current_timestamp()),
                        )
                        .col(
                            ColumnDef::new(Requests::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null()
                                .default(Expr::current_timestamp()),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_requests_package_id")
                                .from(Requests::Table, Requests::PackageId)
                                .to(Packages::Table, Packages::Id)
                                .on_delete(ForeignKeyAction::Cascade)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_requests_partner_id")
                                .from(Requests::Table, Requests::PartnerId)
                                .to(Users::Table, Users::Id),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_requests_partner_id")
                        .table(Requests::Table)
                        .col(Requests::PartnerId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_requests_current_status")
                        .table(Requests::Table)
                        .col(Requests::CurrentStatus)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_requests_tracking_number")
                        .table(Requests::Table)
                        .col(Requests::TrackingNumber)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Requests::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden, Clone, Copy)]
    pub(super) enum Requests {
        Table,
        Id,
        PackageId,
        PartnerId,
        TrackingNumber,
        FranchiseTrackingId,
        FranchiseReceiptUrl,
        OneTimeCode,
        IsVerified,
        CurrentStatus,
        RequestedAt,
        ConfirmedAt,
        PickedAt,
        DeliveredAt,
        CancelledAt,
        RejectedAt,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240301_000004_create_reviews_table {
    use super::m20240301_000001_create_users_table::Users;
    use super::m20240301_000003_create_requests_table::Requests;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000004_create_reviews_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Reviews::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Reviews::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Reviews::RequestId).uuid().not_null())
                        .col(ColumnDef::new(Reviews::PartnerId).uuid().not_null())
                        .col(
                            ColumnDef::new(Reviews::Rating)
                                .integer()
                                .not_null()
                                .check(Expr::col(Reviews::Rating).between(1, 5)),
                        )
                        .col(ColumnDef::new(Reviews::Comment).text().null())
                        .col(
                            ColumnDef::new(Reviews::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null()
                                .default(Expr::current_timestamp()),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_reviews_request_id")
                                .from(Reviews::Table, Reviews::RequestId)
                                .to(Requests::Table, Requests::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_reviews_partner_id")
                                .from(Reviews::Table, Reviews::PartnerId)
                                .to(Users::Table, Users::Id),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .unique()
                        .name("idx_reviews_request_id")
                        .table(Reviews::Table)
                        .col(Reviews::RequestId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_reviews_partner_id")
                        .table(Reviews::Table)
                        .col(Reviews::PartnerId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Reviews::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Reviews {
        Table,
        Id,
        RequestId,
        PartnerId,
        Rating,
        Comment,
        CreatedAt,
    }
}
