use serde::{Deserialize, Serialize};

/// The vehicle attributes sent to the prediction service. Wire names match
/// the model's training columns exactly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleSpec {
    #[serde(rename = "PriceEuro")]
    pub price_euro: f64,
    #[serde(rename = "Range_Km")]
    pub range_km: f64,
    #[serde(rename = "AccelSec")]
    pub accel_sec: f64,
    #[serde(rename = "BodyStyle")]
    pub body_style: String,
    #[serde(rename = "TopSpeed_KmH")]
    pub top_speed_kmh: f64,
    #[serde(rename = "Efficiency_WhKm")]
    pub efficiency_whkm: f64,
    #[serde(rename = "FastCharge_KmH")]
    pub fast_charge_kmh: f64,
    #[serde(rename = "Seats")]
    pub seats: u32,
    #[serde(rename = "PowerTrain")]
    pub power_train: String,
    #[serde(rename = "PlugType")]
    pub plug_type: String,
    #[serde(rename = "RapidCharge")]
    pub rapid_charge: String,
}

impl VehicleSpec {
    /// Spec for the chat flow: the two collected answers plus the defaults
    /// the prediction model expects for everything the chat never asks.
    pub fn from_chat_answers(price_euro: f64, range_km: f64) -> Self {
        Self {
            price_euro,
            range_km,
            accel_sec: 7.0,
            body_style: "SUV".to_string(),
            top_speed_kmh: 180.0,
            efficiency_whkm: 170.0,
            fast_charge_kmh: 500.0,
            seats: 5,
            power_train: "AWD".to_string(),
            plug_type: "Type 2 CCS".to_string(),
            rapid_charge: "Yes".to_string(),
        }
    }
}

/// One ranked vehicle returned by the prediction service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    #[serde(rename = "Brand")]
    pub brand: String,
    #[serde(rename = "Model")]
    pub model: String,
    #[serde(rename = "PriceEuro")]
    pub price_euro: f64,
    #[serde(rename = "Range_Km")]
    pub range_km: f64,
    #[serde(rename = "AccelSec")]
    pub accel_sec: f64,
    #[serde(rename = "BodyStyle", default, skip_serializing_if = "Option::is_none")]
    pub body_style: Option<String>,
}

/// Parsed result of a successful prediction call. Lives only long enough
/// to be rendered.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionOutcome {
    pub predicted_segment: String,
    pub recommendations: Vec<Recommendation>,
}

pub mod session_keys {
    pub const PRICE_EURO: &str = "price_euro";
    pub const RANGE_KM: &str = "range_km";
}
