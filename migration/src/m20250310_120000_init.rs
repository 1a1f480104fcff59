use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(User::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(User::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(User::GoogleId).string_len(255).null())
                    .col(ColumnDef::new(User::Email).string_len(255).not_null())
                    .col(ColumnDef::new(User::Password).string_len(255).null())
                    .col(ColumnDef::new(User::DisplayName).string_len(255).not_null())
                    .col(ColumnDef::new(User::FirstName).string_len(255).not_null())
                    .col(ColumnDef::new(User::LastName).string_len(255).not_null())
                    .col(ColumnDef::new(User::ProfilePhoto).string_len(512).null())
                    .col(ColumnDef::new(User::Role).string_len(16).not_null())
                    .col(ColumnDef::new(User::PhoneNumber).string_len(64).null())
                    .col(ColumnDef::new(User::DateOfBirth).date().null())
                    .col(ColumnDef::new(User::Language).string_len(64).not_null())
                    .col(ColumnDef::new(User::CarPreferences).json().not_null())
                    .col(
                        ColumnDef::new(User::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(User::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("user_email_unique")
                    .table(User::Table)
                    .col(User::Email)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("user_google_id_unique")
                    .table(User::Table)
                    .col(User::GoogleId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Session::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Session::SessionToken)
                            .binary()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Session::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Session::ExpiresAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Session::UserAgent).string_len(255).not_null())
                    .col(ColumnDef::new(Session::Ip).string_len(64).not_null())
                    .col(ColumnDef::new(Session::UserId).integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("session_user_id_foreign")
                            .from(Session::Table, Session::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Car::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Car::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Car::Brand).string_len(255).not_null())
                    .col(ColumnDef::new(Car::Model).string_len(255).not_null())
                    .col(ColumnDef::new(Car::Year).integer().not_null())
                    .col(ColumnDef::new(Car::Price).double().not_null())
                    .col(ColumnDef::new(Car::Mileage).integer().not_null())
                    .col(ColumnDef::new(Car::CarType).string_len(16).null())
                    .col(ColumnDef::new(Car::Fuel).string_len(16).not_null())
                    .col(ColumnDef::new(Car::Transmission).string_len(16).not_null())
                    .col(ColumnDef::new(Car::DriveTrain).string_len(16).null())
                    .col(ColumnDef::new(Car::Status).string_len(16).not_null())
                    .col(ColumnDef::new(Car::Condition).string_len(16).not_null())
                    .col(ColumnDef::new(Car::Color).string_len(64).not_null())
                    .col(ColumnDef::new(Car::Description).text().not_null())
                    .col(ColumnDef::new(Car::EngineSize).string_len(32).null())
                    .col(ColumnDef::new(Car::EngineCylinders).integer().null())
                    .col(ColumnDef::new(Car::EngineHorsepower).integer().null())
                    .col(ColumnDef::new(Car::Rating).double().null())
                    .col(ColumnDef::new(Car::Features).json().not_null())
                    .col(ColumnDef::new(Car::Images).json().not_null())
                    .col(
                        ColumnDef::new(Car::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Car::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("car_brand_model_idx")
                    .table(Car::Table)
                    .col(Car::Brand)
                    .col(Car::Model)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("car_status_idx")
                    .table(Car::Table)
                    .col(Car::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Booking::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Booking::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Booking::Name).string_len(255).not_null())
                    .col(ColumnDef::new(Booking::Email).string_len(255).not_null())
                    .col(ColumnDef::new(Booking::Phone).string_len(64).not_null())
                    .col(ColumnDef::new(Booking::Date).string_len(32).not_null())
                    .col(ColumnDef::new(Booking::Time).string_len(32).not_null())
                    .col(ColumnDef::new(Booking::CarModel).string_len(255).not_null())
                    .col(ColumnDef::new(Booking::Notes).text().null())
                    .col(ColumnDef::new(Booking::Status).string_len(16).not_null())
                    .col(
                        ColumnDef::new(Booking::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // not unique, a rejected booking frees the slot
        manager
            .create_index(
                Index::create()
                    .name("booking_slot_idx")
                    .table(Booking::Table)
                    .col(Booking::CarModel)
                    .col(Booking::Date)
                    .col(Booking::Time)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Message::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Message::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Message::FullName).string_len(255).not_null())
                    .col(ColumnDef::new(Message::Email).string_len(255).not_null())
                    .col(ColumnDef::new(Message::Phone).string_len(64).null())
                    .col(ColumnDef::new(Message::CarModel).string_len(255).null())
                    .col(ColumnDef::new(Message::PreferredDate).string_len(64).null())
                    .col(ColumnDef::new(Message::Topic).string_len(255).not_null())
                    .col(ColumnDef::new(Message::Message).text().not_null())
                    .col(
                        ColumnDef::new(Message::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Message::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Booking::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Car::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Session::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(User::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum User {
    Table,
    Id,
    GoogleId,
    Email,
    Password,
    DisplayName,
    FirstName,
    LastName,
    ProfilePhoto,
    Role,
    PhoneNumber,
    DateOfBirth,
    Language,
    CarPreferences,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Session {
    Table,
    SessionToken,
    CreatedAt,
    ExpiresAt,
    UserAgent,
    Ip,
    UserId,
}

#[derive(DeriveIden)]
pub enum Car {
    Table,
    Id,
    Brand,
    Model,
    Year,
    Price,
    Mileage,
    CarType,
    Fuel,
    Transmission,
    DriveTrain,
    Status,
    Condition,
    Color,
    Description,
    EngineSize,
    EngineCylinders,
    EngineHorsepower,
    Rating,
    Features,
    Images,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Booking {
    Table,
    Id,
    Name,
    Email,
    Phone,
    Date,
    Time,
    CarModel,
    Notes,
    Status,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Message {
    Table,
    Id,
    FullName,
    Email,
    Phone,
    CarModel,
    PreferredDate,
    Topic,
    Message,
    CreatedAt,
}
