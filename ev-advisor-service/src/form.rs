use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::types::VehicleSpec;

/// The eleven form controls, in the order the page lays them out.
pub const INPUT_FIELDS: [&str; 11] = [
    "PriceEuro",
    "Range_Km",
    "AccelSec",
    "BodyStyle",
    "TopSpeed_KmH",
    "Efficiency_WhKm",
    "FastCharge_KmH",
    "Seats",
    "PowerTrain",
    "PlugType",
    "RapidCharge",
];

/// Raw form values as submitted by the page, one optional string per control.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FormSubmission {
    #[serde(rename = "PriceEuro")]
    pub price_euro: Option<String>,
    #[serde(rename = "Range_Km")]
    pub range_km: Option<String>,
    #[serde(rename = "AccelSec")]
    pub accel_sec: Option<String>,
    #[serde(rename = "BodyStyle")]
    pub body_style: Option<String>,
    #[serde(rename = "TopSpeed_KmH")]
    pub top_speed_kmh: Option<String>,
    #[serde(rename = "Efficiency_WhKm")]
    pub efficiency_whkm: Option<String>,
    #[serde(rename = "FastCharge_KmH")]
    pub fast_charge_kmh: Option<String>,
    #[serde(rename = "Seats")]
    pub seats: Option<String>,
    #[serde(rename = "PowerTrain")]
    pub power_train: Option<String>,
    #[serde(rename = "PlugType")]
    pub plug_type: Option<String>,
    #[serde(rename = "RapidCharge")]
    pub rapid_charge: Option<String>,
}

/// Why a submission was rejected before any prediction call
#[derive(Debug, Error)]
pub enum FormError {
    #[error("missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<String>),

    #[error("field {field} is not a valid number: {value:?}")]
    InvalidNumber { field: &'static str, value: String },
}

/// Numeric controls: the identifier pattern the page uses, plus Seats,
/// which is a numeric input without a matching name.
fn is_numeric_field(id: &str) -> bool {
    id.contains("Sec") || id.contains("Km") || id.contains("Euro") || id == "Seats"
}

fn parse_number(field: &'static str, value: &str) -> Result<f64, FormError> {
    value.trim().parse::<f64>().map_err(|_| FormError::InvalidNumber {
        field,
        value: value.to_string(),
    })
}

impl FormSubmission {
    fn raw(&self, field: &str) -> Option<&String> {
        match field {
            "PriceEuro" => self.price_euro.as_ref(),
            "Range_Km" => self.range_km.as_ref(),
            "AccelSec" => self.accel_sec.as_ref(),
            "BodyStyle" => self.body_style.as_ref(),
            "TopSpeed_KmH" => self.top_speed_kmh.as_ref(),
            "Efficiency_WhKm" => self.efficiency_whkm.as_ref(),
            "FastCharge_KmH" => self.fast_charge_kmh.as_ref(),
            "Seats" => self.seats.as_ref(),
            "PowerTrain" => self.power_train.as_ref(),
            "PlugType" => self.plug_type.as_ref(),
            "RapidCharge" => self.rapid_charge.as_ref(),
            _ => None,
        }
    }

    /// Validate presence of every control, then coerce the numeric ones.
    /// A failed validation never reaches the prediction client.
    pub fn assemble(&self) -> Result<VehicleSpec, FormError> {
        let missing: Vec<String> = INPUT_FIELDS
            .iter()
            .filter(|field| {
                self.raw(field)
                    .map(|value| value.trim().is_empty())
                    .unwrap_or(true)
            })
            .map(|field| field.to_string())
            .collect();

        if !missing.is_empty() {
            debug!(missing = ?missing, "form submission incomplete");
            return Err(FormError::MissingFields(missing));
        }

        // All fields are present past this point
        let field = |id: &str| -> &str { self.raw(id).map(|s| s.as_str()).unwrap_or_default() };

        let seats = parse_number("Seats", field("Seats"))?;

        Ok(VehicleSpec {
            price_euro: parse_number("PriceEuro", field("PriceEuro"))?,
            range_km: parse_number("Range_Km", field("Range_Km"))?,
            accel_sec: parse_number("AccelSec", field("AccelSec"))?,
            body_style: field("BodyStyle").trim().to_string(),
            top_speed_kmh: parse_number("TopSpeed_KmH", field("TopSpeed_KmH"))?,
            efficiency_whkm: parse_number("Efficiency_WhKm", field("Efficiency_WhKm"))?,
            fast_charge_kmh: parse_number("FastCharge_KmH", field("FastCharge_KmH"))?,
            seats: seats as u32,
            power_train: field("PowerTrain").trim().to_string(),
            plug_type: field("PlugType").trim().to_string(),
            rapid_charge: field("RapidCharge").trim().to_string(),
        })
    }
}
