use chrono::Duration;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed catalog of bookable services. Each variant carries its canonical
/// duration and price basis; the engine computes `end_at` and the stored
/// price from this table and never trusts client input for either.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServiceType {
    TattooSmall,
    TattooMedium,
    TattooLarge,
    PiercingBasic,
    PiercingDermal,
}

impl ServiceType {
    pub const ALL: [ServiceType; 5] = [
        ServiceType::TattooSmall,
        ServiceType::TattooMedium,
        ServiceType::TattooLarge,
        ServiceType::PiercingBasic,
        ServiceType::PiercingDermal,
    ];

    pub fn parse(raw: &str) -> Option<ServiceType> {
        match raw {
            "TATTOO_SMALL" => Some(ServiceType::TattooSmall),
            "TATTOO_MEDIUM" => Some(ServiceType::TattooMedium),
            "TATTOO_LARGE" => Some(ServiceType::TattooLarge),
            "PIERCING_BASIC" => Some(ServiceType::PiercingBasic),
            "PIERCING_DERMAL" => Some(ServiceType::PiercingDermal),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceType::TattooSmall => "TATTOO_SMALL",
            ServiceType::TattooMedium => "TATTOO_MEDIUM",
            ServiceType::TattooLarge => "TATTOO_LARGE",
            ServiceType::PiercingBasic => "PIERCING_BASIC",
            ServiceType::PiercingDermal => "PIERCING_DERMAL",
        }
    }

    pub fn duration_minutes(&self) -> i64 {
        match self {
            ServiceType::TattooSmall => 60,
            ServiceType::TattooMedium => 120,
            ServiceType::TattooLarge => 240,
            ServiceType::PiercingBasic => 30,
            ServiceType::PiercingDermal => 45,
        }
    }

    pub fn duration(&self) -> Duration {
        Duration::minutes(self.duration_minutes())
    }

    pub fn base_price(&self) -> Decimal {
        match self {
            ServiceType::TattooSmall => dec!(80.00),
            ServiceType::TattooMedium => dec!(160.00),
            ServiceType::TattooLarge => dec!(320.00),
            ServiceType::PiercingBasic => dec!(45.00),
            ServiceType::PiercingDermal => dec!(70.00),
        }
    }
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
