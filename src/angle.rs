use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use skyangle::Conversion;

/// Sky angle units of the PSF pixel scale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScaleUnit {
    Radian,
    Degree,
    Arcminute,
    #[default]
    Arcsecond,
    MilliArcsecond,
}
impl ScaleUnit {
    /// Converts an angle in radians into this unit
    pub fn from_radians(self, value: f64) -> f64 {
        match self {
            ScaleUnit::Radian => value,
            ScaleUnit::Degree => value.to_degrees(),
            ScaleUnit::Arcminute => value.to_arcmin(),
            ScaleUnit::Arcsecond => value.to_arcsec(),
            ScaleUnit::MilliArcsecond => value.to_mas(),
        }
    }
    /// Unit symbol
    pub fn symbol(&self) -> &'static str {
        match self {
            ScaleUnit::Radian => "rd",
            ScaleUnit::Degree => "deg",
            ScaleUnit::Arcminute => "arcmin",
            ScaleUnit::Arcsecond => "arcsec",
            ScaleUnit::MilliArcsecond => "mas",
        }
    }
}
impl fmt::Display for ScaleUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("unknown angle unit: {0} (expected one of rd, deg, arcmin, arcsec or mas)")]
pub struct ParseScaleUnitError(String);

impl FromStr for ScaleUnit {
    type Err = ParseScaleUnitError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "rd" | "rad" | "radian" | "radians" => Ok(ScaleUnit::Radian),
            "deg" | "degree" | "degrees" => Ok(ScaleUnit::Degree),
            "arcmin" | "arcminute" | "arcminutes" => Ok(ScaleUnit::Arcminute),
            "arcsec" | "arcsecond" | "arcseconds" => Ok(ScaleUnit::Arcsecond),
            "mas" | "milliarcsecond" | "milliarcseconds" => Ok(ScaleUnit::MilliArcsecond),
            _ => Err(ParseScaleUnitError(s.to_string())),
        }
    }
}
