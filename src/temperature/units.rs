use crate::error::{CheckError, Result};
use crate::levels::Levels;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Temperature unit: `c`, `f` or `k` in configuration and readings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(try_from = "String")]
pub enum TempUnit {
    #[default]
    Celsius,
    Fahrenheit,
    Kelvin,
}

impl TempUnit {
    pub fn letter(&self) -> &'static str {
        match self {
            TempUnit::Celsius    => "c",
            TempUnit::Fahrenheit => "f",
            TempUnit::Kelvin     => "k",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            TempUnit::Celsius    => "°C",
            TempUnit::Fahrenheit => "°F",
            TempUnit::Kelvin     => "K",
        }
    }
}

impl fmt::Display for TempUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for TempUnit {
    type Err = CheckError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "c" => Ok(TempUnit::Celsius),
            "f" => Ok(TempUnit::Fahrenheit),
            "k" => Ok(TempUnit::Kelvin),
            _   => Err(CheckError::config(format!("unknown temperature unit {:?}", s))),
        }
    }
}

impl TryFrom<String> for TempUnit {
    type Error = CheckError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl Serialize for TempUnit {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.letter())
    }
}

// ── Conversions ────────────────────────────────────────────────────────────

pub fn fahrenheit_to_celsius(f: f64) -> f64 { (f - 32.0) * 5.0 / 9.0 }
pub fn celsius_to_fahrenheit(c: f64) -> f64 { c * 9.0 / 5.0 + 32.0 }
pub fn kelvin_to_celsius(k: f64) -> f64 { k - 273.15 }
pub fn celsius_to_kelvin(c: f64) -> f64 { c + 273.15 }

pub fn to_celsius(value: f64, unit: TempUnit) -> f64 {
    match unit {
        TempUnit::Celsius    => value,
        TempUnit::Fahrenheit => fahrenheit_to_celsius(value),
        TempUnit::Kelvin     => kelvin_to_celsius(value),
    }
}

pub fn from_celsius(celsius: f64, unit: TempUnit) -> f64 {
    match unit {
        TempUnit::Celsius    => celsius,
        TempUnit::Fahrenheit => celsius_to_fahrenheit(celsius),
        TempUnit::Kelvin     => celsius_to_kelvin(celsius),
    }
}

/// Convert a temperature difference; offsets do not apply.
pub fn delta_from_celsius(delta: f64, unit: TempUnit) -> f64 {
    match unit {
        TempUnit::Fahrenheit => delta * 9.0 / 5.0,
        TempUnit::Celsius | TempUnit::Kelvin => delta,
    }
}

pub fn levels_to_celsius(levels: Levels, unit: TempUnit) -> Levels {
    (to_celsius(levels.0, unit), to_celsius(levels.1, unit))
}

// ── Rendering ──────────────────────────────────────────────────────────────

/// "23.0 °C"
pub fn render_temp(celsius: f64, unit: TempUnit) -> String {
    format!("{:.1} {}", from_celsius(celsius, unit), unit.symbol())
}

/// "+12.0 °C"
pub fn render_temp_delta(delta: f64, unit: TempUnit) -> String {
    format!("{:+.1} {}", delta_from_celsius(delta, unit), unit.symbol())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_letters_case_insensitively() {
        assert_eq!("F".parse::<TempUnit>().unwrap(), TempUnit::Fahrenheit);
        assert_eq!("k".parse::<TempUnit>().unwrap(), TempUnit::Kelvin);
        assert!(matches!("x".parse::<TempUnit>(), Err(CheckError::Configuration(msg)) if msg.contains("\"x\"")));
    }

    #[test]
    fn round_trips_stay_within_rounding() {
        for x in [-459.67, -40.0, 0.0, 23.4, 98.6, 1e6] {
            assert!((celsius_to_fahrenheit(fahrenheit_to_celsius(x)) - x).abs() < 1e-9 * x.abs().max(1.0));
            assert!((celsius_to_kelvin(kelvin_to_celsius(x)) - x).abs() < 1e-9 * x.abs().max(1.0));
        }
    }

    #[test]
    fn renders_in_the_output_unit() {
        assert_eq!(render_temp(10.0, TempUnit::Fahrenheit), "50.0 °F");
        assert_eq!(render_temp(23.0, TempUnit::Celsius), "23.0 °C");
        assert_eq!(render_temp(0.0, TempUnit::Kelvin), "273.1 K");
        assert_eq!(render_temp_delta(12.0, TempUnit::Celsius), "+12.0 °C");
        assert_eq!(render_temp_delta(-5.0, TempUnit::Fahrenheit), "-9.0 °F");
    }

    #[test]
    fn fahrenheit_levels_become_celsius() {
        assert_eq!(levels_to_celsius((50.0, 212.0), TempUnit::Fahrenheit), (10.0, 100.0));
    }
}
