// hx-core/src/units.rs

use core::fmt;
use core::str::FromStr;

use uom::si::f64::ThermodynamicTemperature as UomThermodynamicTemperature;

use crate::HxError;

pub type Temperature = UomThermodynamicTemperature;

pub const KELVIN_SYMBOL: &str = "K";
pub const HEAT_TRANSFER_COEFFICIENT_SYMBOL: &str = "W/m²·K";

/// Unit attached to a simulated variable.
///
/// The simulation domain is temperature dominated, so `Kelvin` is the
/// default for anything not recognised as a heat transfer coefficient.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "String"))]
pub enum Unit {
    #[default]
    #[cfg_attr(feature = "serde", serde(rename = "K"))]
    Kelvin,
    #[cfg_attr(feature = "serde", serde(rename = "W/m²·K"))]
    HeatTransferCoefficient,
}

impl Unit {
    pub fn symbol(self) -> &'static str {
        match self {
            Unit::Kelvin => KELVIN_SYMBOL,
            Unit::HeatTransferCoefficient => HEAT_TRANSFER_COEFFICIENT_SYMBOL,
        }
    }

    /// Render a value the way reports display it: `300K`, `45.5 W/m²·K`.
    pub fn format_value(self, value: f64) -> String {
        match self {
            Unit::Kelvin => format!("{value}{KELVIN_SYMBOL}"),
            Unit::HeatTransferCoefficient => format!("{value} {HEAT_TRANSFER_COEFFICIENT_SYMBOL}"),
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for Unit {
    type Err = HxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "K" | "kelvin" => Ok(Unit::Kelvin),
            "W/m²·K" | "W/m2K" | "W/m^2K" | "W/(m2.K)" => Ok(Unit::HeatTransferCoefficient),
            other => Err(HxError::UnknownUnit {
                symbol: other.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for Unit {
    type Error = HxError;

    fn try_from(symbol: String) -> Result<Self, Self::Error> {
        symbol.parse()
    }
}

#[inline]
pub fn k(v: f64) -> Temperature {
    use uom::si::thermodynamic_temperature::kelvin;
    Temperature::new::<kelvin>(v)
}

#[inline]
pub fn kelvin_to_celsius(v: f64) -> f64 {
    use uom::si::thermodynamic_temperature::degree_celsius;
    k(v).get::<degree_celsius>()
}
