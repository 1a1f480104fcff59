use axum::body::Bytes;
use axum_typed_multipart::{FieldData, TryFromMultipart};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// max amount of images a car can receive in a single request
pub const MAX_IMAGES_PER_REQUEST: usize = 3;

#[derive(Deserialize, IntoParams, Validate, Default)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ListCarsDto {
    /// drive train of the car, case insensitive, eg: `awd`
    pub drive_train: Option<String>,

    #[validate(range(min = 0))]
    pub min_mileage: Option<i32>,

    #[validate(range(min = 0))]
    pub max_mileage: Option<i32>,

    /// one of: `price`, `year`, `mileage`, `createdAt`, other values are ignored
    pub sort_by: Option<String>,

    /// `asc` (default) or `desc`
    pub sort_order: Option<String>,
}

#[derive(TryFromMultipart, ToSchema, Validate)]
#[try_from_multipart(rename_all = "camelCase")]
pub struct CreateCarDto {
    #[validate(length(min = 1, max = 128))]
    pub brand: String,

    #[validate(length(min = 1, max = 128))]
    pub model: String,

    #[validate(range(min = 1886, max = 2100))]
    pub year: i32,

    #[validate(range(min = 0.0))]
    pub price: f64,

    #[validate(range(min = 0))]
    pub mileage: i32,

    /// Petrol, Gasoline, Diesel, Electric or Hybrid
    pub fuel: String,

    /// Automatic or Manual
    pub transmission: String,

    pub description: String,

    #[validate(length(min = 1, max = 64))]
    pub color: String,

    /// New or Used
    pub condition: String,

    /// Sedan, SUV, Coupe, Convertible, Hatchback, Wagon, Truck or Van
    pub car_type: Option<String>,

    /// AWD, FWD, RWD or 4WD, case insensitive
    pub drive_train: Option<String>,

    /// available (default), sold, reserved or maintenance
    pub status: Option<String>,

    pub engine_size: Option<String>,

    #[validate(range(min = 0))]
    pub engine_cylinders: Option<i32>,

    #[validate(range(min = 0))]
    pub engine_horsepower: Option<i32>,

    #[validate(range(min = 0.0, max = 5.0))]
    pub rating: Option<f64>,

    /// JSON array of strings or a comma separated list
    pub features: Option<String>,

    #[schema(value_type = Vec<String>, format = Binary)]
    pub images: Vec<FieldData<Bytes>>,
}

#[derive(TryFromMultipart, ToSchema, Validate)]
#[try_from_multipart(rename_all = "camelCase")]
pub struct UpdateCarDto {
    #[validate(length(min = 1, max = 128))]
    pub brand: Option<String>,

    #[validate(length(min = 1, max = 128))]
    pub model: Option<String>,

    #[validate(range(min = 1886, max = 2100))]
    pub year: Option<i32>,

    #[validate(range(min = 0.0))]
    pub price: Option<f64>,

    #[validate(range(min = 0))]
    pub mileage: Option<i32>,

    pub fuel: Option<String>,

    pub transmission: Option<String>,

    pub description: Option<String>,

    #[validate(length(min = 1, max = 64))]
    pub color: Option<String>,

    pub condition: Option<String>,

    pub car_type: Option<String>,

    pub drive_train: Option<String>,

    pub status: Option<String>,

    pub engine_size: Option<String>,

    #[validate(range(min = 0))]
    pub engine_cylinders: Option<i32>,

    #[validate(range(min = 0))]
    pub engine_horsepower: Option<i32>,

    #[validate(range(min = 0.0, max = 5.0))]
    pub rating: Option<f64>,

    pub features: Option<String>,

    /// JSON array with the urls of the current images to keep, when absent every
    /// current image is kept
    pub retained_images: Option<String>,

    #[schema(value_type = Vec<String>, format = Binary)]
    pub images: Vec<FieldData<Bytes>>,
}

#[derive(Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct BulkDeleteCarsDto {
    /// ids of the cars to delete, numbers or numeric strings
    #[schema(value_type = Vec<Object>)]
    pub car_ids: Option<Vec<Value>>,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BulkDeleteCarsResponse {
    pub success: bool,
    pub message: String,
    pub deleted_count: u64,
}

#[derive(Serialize, ToSchema, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MonthlySales {
    pub year: i32,
    pub month: u32,
    pub total_sales: f64,
    pub count: u64,
}

/// parses the features of a car, sent either as a JSON array or a comma separated list
pub fn parse_features(raw: &str) -> Vec<String> {
    if let Ok(features) = serde_json::from_str::<Vec<String>>(raw) {
        return features
            .into_iter()
            .map(|f| f.trim().to_string())
            .filter(|f| !f.is_empty())
            .collect();
    }

    raw.split(',')
        .map(|f| f.trim().to_string())
        .filter(|f| !f.is_empty())
        .collect()
}

/// validates a list of car ids, returning the offending values if any is not
/// a positive integer or a string of one
pub fn parse_car_ids(values: &[Value]) -> Result<Vec<i32>, Vec<String>> {
    let mut ids = Vec::with_capacity(values.len());
    let mut invalid = Vec::new();

    for value in values {
        let parsed = match value {
            Value::Number(n) => n.as_i64().and_then(|n| i32::try_from(n).ok()),
            Value::String(s) => s.trim().parse::<i32>().ok(),
            _ => None,
        };

        match parsed {
            Some(id) if id > 0 => ids.push(id),
            _ => invalid.push(match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            }),
        }
    }

    if invalid.is_empty() {
        Ok(ids)
    } else {
        Err(invalid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_json_features() {
        assert_eq!(
            parse_features(r#"["Sunroof", " Heated Seats ", ""]"#),
            vec!["Sunroof", "Heated Seats"]
        );
    }

    #[test]
    fn parses_comma_separated_features() {
        assert_eq!(
            parse_features("Sunroof, Heated Seats,,Navigation "),
            vec!["Sunroof", "Heated Seats", "Navigation"]
        );
        assert!(parse_features("").is_empty());
    }

    #[test]
    fn accepts_numeric_ids_and_numeric_strings() {
        let ids = vec![json!(1), json!("22"), json!(" 3 ")];
        assert_eq!(parse_car_ids(&ids), Ok(vec![1, 22, 3]));
    }

    #[test]
    fn rejects_invalid_ids() {
        let ids = vec![json!(1), json!("abc"), json!(-4), json!(1.5), json!(null)];

        assert_eq!(
            parse_car_ids(&ids),
            Err(vec![
                String::from("abc"),
                String::from("-4"),
                String::from("1.5"),
                String::from("null"),
            ])
        );
    }
}
