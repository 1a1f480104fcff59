use sea_orm_migration::prelude::*;

use super::m20250310_120000_init::{Car, User};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ChatMessage::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ChatMessage::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ChatMessage::Sender).string_len(16).not_null())
                    .col(ColumnDef::new(ChatMessage::SenderId).integer().not_null())
                    .col(ColumnDef::new(ChatMessage::ReceiverId).integer().not_null())
                    .col(ColumnDef::new(ChatMessage::Message).text().not_null())
                    .col(ColumnDef::new(ChatMessage::Status).string_len(16).not_null())
                    .col(
                        ColumnDef::new(ChatMessage::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("chat_message_sender_id_foreign")
                            .from(ChatMessage::Table, ChatMessage::SenderId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("chat_message_receiver_id_foreign")
                            .from(ChatMessage::Table, ChatMessage::ReceiverId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("chat_message_participants_idx")
                    .table(ChatMessage::Table)
                    .col(ChatMessage::SenderId)
                    .col(ChatMessage::ReceiverId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ChatLog::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ChatLog::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ChatLog::User).string_len(255).not_null())
                    .col(ColumnDef::new(ChatLog::Message).text().not_null())
                    .col(ColumnDef::new(ChatLog::Response).text().not_null())
                    .col(
                        ColumnDef::new(ChatLog::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(AiPrediction::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AiPrediction::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(AiPrediction::CarId).integer().not_null())
                    .col(ColumnDef::new(AiPrediction::Model).string_len(255).not_null())
                    .col(ColumnDef::new(AiPrediction::Confidence).integer().not_null())
                    .col(ColumnDef::new(AiPrediction::Status).string_len(16).not_null())
                    .col(ColumnDef::new(AiPrediction::ImageUrl).string_len(1024).not_null())
                    .col(ColumnDef::new(AiPrediction::Defects).json().not_null())
                    .col(
                        ColumnDef::new(AiPrediction::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AiPrediction::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("ai_prediction_car_id_foreign")
                            .from(AiPrediction::Table, AiPrediction::CarId)
                            .to(Car::Table, Car::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Footer::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Footer::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Footer::CompanyName).string_len(255).not_null())
                    .col(ColumnDef::new(Footer::SocialLinks).json().not_null())
                    .col(
                        ColumnDef::new(Footer::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Footer::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(AiPrediction::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(ChatLog::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(ChatMessage::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum ChatMessage {
    Table,
    Id,
    Sender,
    SenderId,
    ReceiverId,
    Message,
    Status,
    CreatedAt,
}

#[derive(DeriveIden)]
enum ChatLog {
    Table,
    Id,
    User,
    Message,
    Response,
    CreatedAt,
}

#[derive(DeriveIden)]
enum AiPrediction {
    Table,
    Id,
    CarId,
    Model,
    Confidence,
    Status,
    ImageUrl,
    Defects,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Footer {
    Table,
    Id,
    CompanyName,
    SocialLinks,
    UpdatedAt,
}
