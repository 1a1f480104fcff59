use super::dto::ListCarsDto;
use crate::modules::common::dto::AscOrDescOrder;
use entity::{car, sea_orm_active_enums::DriveTrain};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Select};
use std::str::FromStr;

/// Columns the car listing can be sorted by
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CarSortField {
    Price,
    Year,
    Mileage,
    CreatedAt,
}

impl CarSortField {
    /// parses a sort field from the allow list, unknown fields give `None`
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "price" => Some(CarSortField::Price),
            "year" => Some(CarSortField::Year),
            "mileage" => Some(CarSortField::Mileage),
            "createdAt" => Some(CarSortField::CreatedAt),
            _ => None,
        }
    }

    fn column(&self) -> car::Column {
        match self {
            CarSortField::Price => car::Column::Price,
            CarSortField::Year => car::Column::Year,
            CarSortField::Mileage => car::Column::Mileage,
            CarSortField::CreatedAt => car::Column::CreatedAt,
        }
    }
}

/// Parsed filters of the car listing
#[derive(Debug, Default, PartialEq)]
pub struct CarFilter {
    pub drive_train: Option<DriveTrain>,
    pub min_mileage: Option<i32>,
    pub max_mileage: Option<i32>,
    pub sort: Option<(CarSortField, AscOrDescOrder)>,
}

impl TryFrom<ListCarsDto> for CarFilter {
    type Error = String;

    fn try_from(dto: ListCarsDto) -> Result<Self, Self::Error> {
        let drive_train = match dto.drive_train.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(
                DriveTrain::from_str(&raw.to_uppercase())
                    .map_err(|_| format!("invalid driveTrain: {}", raw))?,
            ),
        };

        let sort = dto.sort_by.as_deref().and_then(CarSortField::parse).map(|field| {
            let order = dto
                .sort_order
                .as_deref()
                .map(AscOrDescOrder::parse_lenient)
                .unwrap_or_default();

            (field, order)
        });

        Ok(CarFilter {
            drive_train,
            min_mileage: dto.min_mileage,
            max_mileage: dto.max_mileage,
            sort,
        })
    }
}

impl CarFilter {
    pub fn into_select(self) -> Select<car::Entity> {
        let mut query = car::Entity::find();

        if let Some(drive_train) = self.drive_train {
            query = query.filter(car::Column::DriveTrain.eq(drive_train));
        }

        if let Some(min) = self.min_mileage {
            query = query.filter(car::Column::Mileage.gte(min));
        }

        if let Some(max) = self.max_mileage {
            query = query.filter(car::Column::Mileage.lte(max));
        }

        match self.sort {
            Some((field, order)) => query
                .order_by(field.column(), order.into())
                .order_by_asc(car::Column::Id),
            None => query.order_by_asc(car::Column::Id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dto() -> ListCarsDto {
        ListCarsDto::default()
    }

    #[test]
    fn empty_query_gives_empty_filter() {
        assert_eq!(CarFilter::try_from(dto()), Ok(CarFilter::default()));
    }

    #[test]
    fn drive_train_is_case_insensitive() {
        for raw in ["awd", "AWD", "Awd", " awd "] {
            let filter = CarFilter::try_from(ListCarsDto {
                drive_train: Some(String::from(raw)),
                ..dto()
            });

            assert_eq!(filter.map(|f| f.drive_train), Ok(Some(DriveTrain::Awd)));
        }

        let four_wd = CarFilter::try_from(ListCarsDto {
            drive_train: Some(String::from("4wd")),
            ..dto()
        });

        assert_eq!(four_wd.map(|f| f.drive_train), Ok(Some(DriveTrain::FourWd)));
    }

    #[test]
    fn unknown_drive_train_is_rejected() {
        let filter = CarFilter::try_from(ListCarsDto {
            drive_train: Some(String::from("6x6")),
            ..dto()
        });

        assert!(filter.is_err());
    }

    #[test]
    fn sort_field_must_be_allowed() {
        let filter = CarFilter::try_from(ListCarsDto {
            sort_by: Some(String::from("password")),
            sort_order: Some(String::from("desc")),
            ..dto()
        });

        assert_eq!(filter.map(|f| f.sort), Ok(None));
    }

    #[test]
    fn sort_order_defaults_to_asc_and_is_lenient() {
        let asc = CarFilter::try_from(ListCarsDto {
            sort_by: Some(String::from("price")),
            ..dto()
        });

        assert_eq!(
            asc.map(|f| f.sort),
            Ok(Some((CarSortField::Price, AscOrDescOrder::Asc)))
        );

        let desc = CarFilter::try_from(ListCarsDto {
            sort_by: Some(String::from("createdAt")),
            sort_order: Some(String::from("whatever")),
            ..dto()
        });

        assert_eq!(
            desc.map(|f| f.sort),
            Ok(Some((CarSortField::CreatedAt, AscOrDescOrder::Desc)))
        );
    }
}
