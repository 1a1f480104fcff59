use super::dto::MonthlySales;
use crate::{database::error::DbError, modules::common::responses::SimpleError};
use chrono::Datelike;
use entity::{car, sea_orm_active_enums::CarStatus};
use http::StatusCode;
use sea_orm::{
    prelude::DateTimeWithTimeZone,
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, FromQueryResult, QueryFilter,
    QueryOrder, QuerySelect,
};
use entity::car::CarImages;
use std::collections::{BTreeMap, HashSet};

/// max amount of months on the monthly sales report
const MONTHLY_SALES_MONTHS: usize = 12;

pub async fn find_car_or_404(
    db: &DatabaseConnection,
    id: i32,
) -> Result<car::Model, (StatusCode, SimpleError)> {
    car::Entity::find_by_id(id)
        .one(db)
        .await
        .map_err(DbError::from)?
        .ok_or((StatusCode::NOT_FOUND, SimpleError::from("Car not found")))
}

pub async fn find_sold_cars(db: &DatabaseConnection) -> Result<Vec<car::Model>, DbErr> {
    car::Entity::find()
        .filter(car::Column::Status.eq(CarStatus::Sold))
        .order_by_desc(car::Column::UpdatedAt)
        .all(db)
        .await
}

#[derive(FromQueryResult)]
struct SoldCarRow {
    price: f64,
    updated_at: DateTimeWithTimeZone,
}

/// groups sold cars by the year and month they were last updated, newest month first
pub async fn monthly_sales(db: &DatabaseConnection) -> Result<Vec<MonthlySales>, DbErr> {
    let rows = car::Entity::find()
        .select_only()
        .column(car::Column::Price)
        .column(car::Column::UpdatedAt)
        .filter(car::Column::Status.eq(CarStatus::Sold))
        .into_model::<SoldCarRow>()
        .all(db)
        .await?;

    Ok(group_sales_by_month(
        rows.into_iter()
            .map(|row| (row.updated_at.year(), row.updated_at.month(), row.price)),
    ))
}

fn group_sales_by_month(sales: impl Iterator<Item = (i32, u32, f64)>) -> Vec<MonthlySales> {
    let mut months: BTreeMap<(i32, u32), (f64, u64)> = BTreeMap::new();

    for (year, month, price) in sales {
        let entry = months.entry((year, month)).or_insert((0.0, 0));
        entry.0 += price;
        entry.1 += 1;
    }

    months
        .into_iter()
        .rev()
        .take(MONTHLY_SALES_MONTHS)
        .map(|((year, month), (total_sales, count))| MonthlySales {
            year,
            month,
            total_sales,
            count,
        })
        .collect()
}

pub async fn delete_cars(db: &DatabaseConnection, ids: Vec<i32>) -> Result<u64, DbErr> {
    let res = car::Entity::delete_many()
        .filter(car::Column::Id.is_in(ids))
        .exec(db)
        .await?;

    Ok(res.rows_affected)
}

/// urls of every image referenced by a car
pub async fn referenced_image_urls(db: &DatabaseConnection) -> Result<HashSet<String>, DbErr> {
    let images = car::Entity::find()
        .select_only()
        .column(car::Column::Images)
        .into_tuple::<CarImages>()
        .all(db)
        .await?;

    Ok(images
        .into_iter()
        .flat_map(|images| images.0.into_iter().map(|image| image.url))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_sales_newest_month_first() {
        let sales = vec![
            (2024, 1, 10_000.0),
            (2024, 3, 20_000.0),
            (2024, 1, 5_000.0),
            (2023, 12, 1_000.0),
        ];

        let grouped = group_sales_by_month(sales.into_iter());

        assert_eq!(
            grouped,
            vec![
                MonthlySales {
                    year: 2024,
                    month: 3,
                    total_sales: 20_000.0,
                    count: 1
                },
                MonthlySales {
                    year: 2024,
                    month: 1,
                    total_sales: 15_000.0,
                    count: 2
                },
                MonthlySales {
                    year: 2023,
                    month: 12,
                    total_sales: 1_000.0,
                    count: 1
                },
            ]
        );
    }

    #[test]
    fn keeps_at_most_twelve_months() {
        let sales = (1..=24).map(|i| (2000 + i / 12, (i % 12) as u32 + 1, 1.0));

        let grouped = group_sales_by_month(sales);

        assert_eq!(grouped.len(), 12);
        assert_eq!(grouped[0].year, 2002);
    }
}
