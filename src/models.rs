use serde::Deserialize;

use crate::error::AppError;

/// Entry-ticket price, identical for every visitor.
pub const TICKET_AMOUNT: i64 = 20;
pub const TICKET_STATUS_PAID: &str = "PAID";
pub const BOOKING_VEHICLE_TYPE: &str = "Rental";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub mobile: String,
    pub gender: String,
    pub aadhaar: String,
    pub license: String,
    pub location: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub name: String,
    pub mobile: String,
    pub gender: String,
    pub aadhaar: String,
    pub license: String,
    pub location: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    pub id: i64,
    pub user_id: i64,
    pub amount: i64,
    pub payment_mode: String,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Booking {
    pub id: i64,
    pub user_id: i64,
    pub vehicle_type: String,
    pub vehicle_name: String,
    pub duration: String,
    pub cost: i64,
    pub payment_mode: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBooking {
    pub user_id: i64,
    pub vehicle_name: String,
    pub duration: String,
    pub cost: i64,
    pub payment_mode: String,
}

/// Login form. Every field defaults to empty so a missing field reaches
/// validation instead of failing extraction.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    pub name: String,
    pub mobile: String,
    pub gender: String,
    pub aadhaar: String,
    pub license: String,
    pub location: String,
}

impl LoginForm {
    pub fn validate(self) -> Result<NewUser, AppError> {
        Ok(NewUser {
            name: required(self.name, "name")?,
            mobile: required(self.mobile, "mobile")?,
            gender: required(self.gender, "gender")?,
            aadhaar: required(self.aadhaar, "aadhaar")?,
            license: required(self.license, "license")?,
            location: required(self.location, "location")?,
        })
    }
}

/// Shared by the ticket and payment steps.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PaymentForm {
    pub payment: String,
}

impl PaymentForm {
    pub fn validate(self) -> Result<String, AppError> {
        required(self.payment, "payment")
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct VehicleForm {
    pub vehicle: String,
    pub duration: String,
    pub cost: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VehicleChoice {
    pub vehicle: String,
    pub duration: String,
    pub cost: i64,
}

impl VehicleForm {
    pub fn validate(self) -> Result<VehicleChoice, AppError> {
        let vehicle = path_segment(self.vehicle, "vehicle")?;
        let duration = path_segment(self.duration, "duration")?;
        let cost = required(self.cost, "cost")?
            .parse::<i64>()
            .ok()
            .filter(|cost| *cost >= 0)
            .ok_or(AppError::InvalidField("cost"))?;

        Ok(VehicleChoice {
            vehicle,
            duration,
            cost,
        })
    }
}

/// Values carried forward in the URL. All-dot values would be collapsed by
/// URL normalisation, so they are refused.
fn path_segment(value: String, field: &'static str) -> Result<String, AppError> {
    let value = required(value, field)?;
    if value.chars().all(|c| c == '.') {
        return Err(AppError::InvalidField(field));
    }
    Ok(value)
}

fn required(value: String, field: &'static str) -> Result<String, AppError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(AppError::MissingField(field))
    } else {
        Ok(trimmed.to_string())
    }
}
