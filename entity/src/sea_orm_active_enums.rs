//! String backed enums shared by the entities and the API DTOs.
//!
//! every enum parses case insensitively from its string value (`FromStr`), this is
//! needed for values that arrive as plain text, such as `multipart/form-data` fields
//! or query strings.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use utoipa::ToSchema;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    ToSchema,
    EnumString,
    Display,
)]
#[sea_orm(rs_type = "String", db_type = "String(Some(16))")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum CarStatus {
    #[sea_orm(string_value = "available")]
    Available,
    #[sea_orm(string_value = "sold")]
    Sold,
    #[sea_orm(string_value = "reserved")]
    Reserved,
    #[sea_orm(string_value = "maintenance")]
    Maintenance,
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    ToSchema,
    EnumString,
    Display,
)]
#[sea_orm(rs_type = "String", db_type = "String(Some(16))")]
#[strum(ascii_case_insensitive)]
pub enum Fuel {
    #[sea_orm(string_value = "Petrol")]
    Petrol,
    #[sea_orm(string_value = "Gasoline")]
    Gasoline,
    #[sea_orm(string_value = "Diesel")]
    Diesel,
    #[sea_orm(string_value = "Electric")]
    Electric,
    #[sea_orm(string_value = "Hybrid")]
    Hybrid,
}

/// Body type of a car
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    ToSchema,
    EnumString,
    Display,
)]
#[sea_orm(rs_type = "String", db_type = "String(Some(16))")]
#[strum(ascii_case_insensitive)]
pub enum CarType {
    #[sea_orm(string_value = "Sedan")]
    Sedan,
    #[sea_orm(string_value = "SUV")]
    #[serde(rename = "SUV")]
    #[strum(serialize = "SUV")]
    Suv,
    #[sea_orm(string_value = "Coupe")]
    Coupe,
    #[sea_orm(string_value = "Convertible")]
    Convertible,
    #[sea_orm(string_value = "Hatchback")]
    Hatchback,
    #[sea_orm(string_value = "Wagon")]
    Wagon,
    #[sea_orm(string_value = "Truck")]
    Truck,
    #[sea_orm(string_value = "Van")]
    Van,
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    ToSchema,
    EnumString,
    Display,
)]
#[sea_orm(rs_type = "String", db_type = "String(Some(16))")]
#[strum(ascii_case_insensitive)]
pub enum Transmission {
    #[sea_orm(string_value = "Automatic")]
    Automatic,
    #[sea_orm(string_value = "Manual")]
    Manual,
}

/// Drive train of a car, always stored in uppercase
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    ToSchema,
    EnumString,
    Display,
)]
#[sea_orm(rs_type = "String", db_type = "String(Some(16))")]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum DriveTrain {
    #[sea_orm(string_value = "AWD")]
    Awd,
    #[sea_orm(string_value = "FWD")]
    Fwd,
    #[sea_orm(string_value = "RWD")]
    Rwd,
    #[sea_orm(string_value = "4WD")]
    #[serde(rename = "4WD")]
    #[strum(serialize = "4WD")]
    FourWd,
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    ToSchema,
    EnumString,
    Display,
)]
#[sea_orm(rs_type = "String", db_type = "String(Some(16))")]
#[strum(ascii_case_insensitive)]
pub enum CarCondition {
    #[sea_orm(string_value = "New")]
    New,
    #[sea_orm(string_value = "Used")]
    Used,
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    ToSchema,
    EnumString,
    Display,
)]
#[sea_orm(rs_type = "String", db_type = "String(Some(16))")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum UserRole {
    #[sea_orm(string_value = "user")]
    User,
    #[sea_orm(string_value = "admin")]
    Admin,
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    ToSchema,
    EnumString,
    Display,
)]
#[sea_orm(rs_type = "String", db_type = "String(Some(16))")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum BookingStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "approved")]
    Approved,
    #[sea_orm(string_value = "rejected")]
    Rejected,
}

/// Who sent a chat message
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    ToSchema,
    EnumString,
    Display,
)]
#[sea_orm(rs_type = "String", db_type = "String(Some(16))")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ChatSender {
    #[sea_orm(string_value = "user")]
    User,
    #[sea_orm(string_value = "admin")]
    Admin,
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    ToSchema,
    EnumString,
    Display,
)]
#[sea_orm(rs_type = "String", db_type = "String(Some(16))")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ChatMessageStatus {
    #[sea_orm(string_value = "sent")]
    Sent,
    #[sea_orm(string_value = "delivered")]
    Delivered,
    #[sea_orm(string_value = "read")]
    Read,
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    ToSchema,
    EnumString,
    Display,
)]
#[sea_orm(rs_type = "String", db_type = "String(Some(16))")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum PredictionStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "verified")]
    Verified,
    #[sea_orm(string_value = "rejected")]
    Rejected,
}
