//! 查询历史表迁移
//!
//! 创建 search_histories 表，每次带 IP 的成功查询写入一行：
//! - 所属用户 (user_id)
//! - 查询的 IP 地址
//! - Provider 返回的原始地理位置 JSON

use sea_orm_migration::prelude::*;

use super::m20260301_000001_users::Users;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(SearchHistories::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SearchHistories::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(SearchHistories::UserId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SearchHistories::IpAddress)
                            .string_len(45)
                            .not_null(),
                    )
                    .col(ColumnDef::new(SearchHistories::GeoData).text().not_null())
                    .col(
                        ColumnDef::new(SearchHistories::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SearchHistories::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_search_histories_user_id")
                            .from(SearchHistories::Table, SearchHistories::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 复合索引（按用户查询并按时间倒序）
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_search_histories_user_time")
                    .table(SearchHistories::Table)
                    .col(SearchHistories::UserId)
                    .col(SearchHistories::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_search_histories_user_time")
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(Table::drop().table(SearchHistories::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum SearchHistories {
    Table,
    Id,
    UserId,
    IpAddress,
    GeoData,
    CreatedAt,
    UpdatedAt,
}
