use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260101_000001_create_enquiries_table::Migration),
            Box::new(m20260101_000002_create_enquiry_events_table::Migration),
            Box::new(m20260101_000003_create_orders_table::Migration),
            Box::new(m20260101_000004_create_order_logistics_table::Migration),
        ]
    }
}

// Migration implementations

mod m20260101_000001_create_enquiries_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20260101_000001_create_enquiries_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Enquiries::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Enquiries::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Enquiries::Code)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Enquiries::ProductName).string().not_null())
                        .col(ColumnDef::new(Enquiries::VariantName).string().null())
                        .col(ColumnDef::new(Enquiries::VariantRateId).uuid().null())
                        .col(ColumnDef::new(Enquiries::QuantityTons).decimal().not_null())
                        .col(
                            ColumnDef::new(Enquiries::Rate)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Enquiries::AdminCommission)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Enquiries::MediatorCommission)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(Enquiries::BuyerId).uuid().null())
                        .col(ColumnDef::new(Enquiries::BuyerName).string().null())
                        .col(ColumnDef::new(Enquiries::BuyerCompany).string().null())
                        .col(ColumnDef::new(Enquiries::BuyerPhone).string().null())
                        .col(ColumnDef::new(Enquiries::SellerId).uuid().null())
                        .col(ColumnDef::new(Enquiries::SellerName).string().null())
                        .col(ColumnDef::new(Enquiries::SellerCompany).string().null())
                        .col(ColumnDef::new(Enquiries::SellerPhone).string().null())
                        .col(ColumnDef::new(Enquiries::MediatorId).uuid().null())
                        .col(ColumnDef::new(Enquiries::MediatorName).string().null())
                        .col(ColumnDef::new(Enquiries::MediatorCompany).string().null())
                        .col(ColumnDef::new(Enquiries::MediatorPhone).string().null())
                        .col(ColumnDef::new(Enquiries::AssignedEmployeeId).uuid().null())
                        .col(
                            ColumnDef::new(Enquiries::AssignedEmployeeName)
                                .string()
                                .null(),
                        )
                        .col(ColumnDef::new(Enquiries::Status).string().not_null())
                        .col(ColumnDef::new(Enquiries::Specifications).string().null())
                        .col(
                            ColumnDef::new(Enquiries::SellerAcceptedAt)
                                .timestamp()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(Enquiries::BuyerConfirmedAt)
                                .timestamp()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(Enquiries::SupplierCommitUntil)
                                .timestamp()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(Enquiries::ProcurementBy)
                                .string()
                                .not_null()
                                .default(""),
                        )
                        .col(
                            ColumnDef::new(Enquiries::CertificateBy)
                                .string()
                                .not_null()
                                .default(""),
                        )
                        .col(
                            ColumnDef::new(Enquiries::TransportBy)
                                .string()
                                .not_null()
                                .default(""),
                        )
                        .col(
                            ColumnDef::new(Enquiries::ShippingBy)
                                .string()
                                .not_null()
                                .default(""),
                        )
                        .col(
                            ColumnDef::new(Enquiries::PackagingBy)
                                .string()
                                .not_null()
                                .default(""),
                        )
                        .col(
                            ColumnDef::new(Enquiries::QualityTestingBy)
                                .string()
                                .not_null()
                                .default(""),
                        )
                        .col(ColumnDef::new(Enquiries::OrderId).uuid().null())
                        .col(ColumnDef::new(Enquiries::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(Enquiries::UpdatedAt).timestamp().null())
                        .col(
                            ColumnDef::new(Enquiries::Version)
                                .integer()
                                .not_null()
                                .default(1),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_enquiries_status")
                        .table(Enquiries::Table)
                        .col(Enquiries::Status)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_enquiries_buyer_id")
                        .table(Enquiries::Table)
                        .col(Enquiries::BuyerId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_enquiries_seller_id")
                        .table(Enquiries::Table)
                        .col(Enquiries::SellerId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_enquiries_created_at")
                        .table(Enquiries::Table)
                        .col(Enquiries::CreatedAt)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Enquiries::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Enquiries {
        Table,
        Id,
        Code,
        ProductName,
        VariantName,
        VariantRateId,
        QuantityTons,
        Rate,
        AdminCommission,
        MediatorCommission,
        BuyerId,
        BuyerName,
        BuyerCompany,
        BuyerPhone,
        SellerId,
        SellerName,
        SellerCompany,
        SellerPhone,
        MediatorId,
        MediatorName,
        MediatorCompany,
        MediatorPhone,
        AssignedEmployeeId,
        AssignedEmployeeName,
        Status,
        Specifications,
        SellerAcceptedAt,
        BuyerConfirmedAt,
        SupplierCommitUntil,
        ProcurementBy,
        CertificateBy,
        TransportBy,
        ShippingBy,
        PackagingBy,
        QualityTestingBy,
        OrderId,
        CreatedAt,
        UpdatedAt,
        Version,
    }
}

mod m20260101_000002_create_enquiry_events_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20260101_000002_create_enquiry_events_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(EnquiryEvents::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(EnquiryEvents::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(EnquiryEvents::EnquiryId).uuid().not_null())
                        .col(ColumnDef::new(EnquiryEvents::Action).string().not_null())
                        .col(ColumnDef::new(EnquiryEvents::Note).string().null())
                        .col(ColumnDef::new(EnquiryEvents::ActorId).uuid().null())
                        .col(ColumnDef::new(EnquiryEvents::ActorRole).string().not_null())
                        .col(
                            ColumnDef::new(EnquiryEvents::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_enquiry_events_enquiry_id")
                        .table(EnquiryEvents::Table)
                        .col(EnquiryEvents::EnquiryId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_enquiry_events_created_at")
                        .table(EnquiryEvents::Table)
                        .col(EnquiryEvents::CreatedAt)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(EnquiryEvents::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum EnquiryEvents {
        Table,
        Id,
        EnquiryId,
        Action,
        Note,
        ActorId,
        ActorRole,
        CreatedAt,
    }
}

mod m20260101_000003_create_orders_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20260101_000003_create_orders_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Orders::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Orders::Id).uuid().primary_key().not_null())
                        .col(
                            ColumnDef::new(Orders::Code)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Orders::EnquiryId).uuid().not_null())
                        .col(ColumnDef::new(Orders::ProductName).string().not_null())
                        .col(ColumnDef::new(Orders::VariantName).string().null())
                        .col(ColumnDef::new(Orders::QuantityTons).decimal().not_null())
                        .col(
                            ColumnDef::new(Orders::Rate)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Orders::AdminCommission)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Orders::MediatorCommission)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(Orders::BuyerId).uuid().null())
                        .col(ColumnDef::new(Orders::SellerId).uuid().null())
                        .col(ColumnDef::new(Orders::MediatorId).uuid().null())
                        .col(ColumnDef::new(Orders::Status).string().not_null())
                        .col(ColumnDef::new(Orders::TrackingId).string().null())
                        .col(ColumnDef::new(Orders::Notes).string().null())
                        .col(ColumnDef::new(Orders::ProcurementBy).string().not_null())
                        .col(ColumnDef::new(Orders::CertificateBy).string().not_null())
                        .col(ColumnDef::new(Orders::TransportBy).string().not_null())
                        .col(ColumnDef::new(Orders::ShippingBy).string().not_null())
                        .col(ColumnDef::new(Orders::PackagingBy).string().not_null())
                        .col(
                            ColumnDef::new(Orders::QualityTestingBy)
                                .string()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Orders::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(Orders::UpdatedAt).timestamp().null())
                        .col(
                            ColumnDef::new(Orders::Version)
                                .integer()
                                .not_null()
                                .default(1),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_orders_enquiry_id")
                        .table(Orders::Table)
                        .col(Orders::EnquiryId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_orders_status")
                        .table(Orders::Table)
                        .col(Orders::Status)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Orders::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Orders {
        Table,
        Id,
        Code,
        EnquiryId,
        ProductName,
        VariantName,
        QuantityTons,
        Rate,
        AdminCommission,
        MediatorCommission,
        BuyerId,
        SellerId,
        MediatorId,
        Status,
        TrackingId,
        Notes,
        ProcurementBy,
        CertificateBy,
        TransportBy,
        ShippingBy,
        PackagingBy,
        QualityTestingBy,
        CreatedAt,
        UpdatedAt,
        Version,
    }
}

mod m20260101_000004_create_order_logistics_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20260101_000004_create_order_logistics_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(OrderLogistics::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(OrderLogistics::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(OrderLogistics::OrderId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(OrderLogistics::VehicleNumber)
                                .string()
                                .null(),
                        )
                        .col(ColumnDef::new(OrderLogistics::DriverName).string().null())
                        .col(ColumnDef::new(OrderLogistics::DriverPhone).string().null())
                        .col(
                            ColumnDef::new(OrderLogistics::TransportCompany)
                                .string()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(OrderLogistics::CurrentLocation)
                                .string()
                                .null(),
                        )
                        .col(ColumnDef::new(OrderLogistics::Eta).timestamp().null())
                        .col(ColumnDef::new(OrderLogistics::Notes).string().null())
                        .col(
                            ColumnDef::new(OrderLogistics::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .col(ColumnDef::new(OrderLogistics::UpdatedAt).timestamp().null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_order_logistics_order_id")
                        .table(OrderLogistics::Table)
                        .col(OrderLogistics::OrderId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(OrderLogistics::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum OrderLogistics {
        Table,
        Id,
        OrderId,
        VehicleNumber,
        DriverName,
        DriverPhone,
        TransportCompany,
        CurrentLocation,
        Eta,
        Notes,
        CreatedAt,
        UpdatedAt,
    }
}
