//! Weather derivations from predicted physical variables
//!
//! The model predicts land-surface quantities (air temperature in kelvin,
//! precipitation rate, albedo, ...). Everything a person reads on the
//! dashboard is derived here from a handful of them.

use serde::{Deserialize, Serialize};

use crate::types::Location;

pub const KELVIN_OFFSET: f64 = 273.15;

/// Precipitation rate that counts as 100% rain probability
const RAIN_SATURATION_RATE: f64 = 0.01;
/// Snowfall rate that counts as 100% snow probability
const SNOW_SATURATION_RATE: f64 = 0.009;
/// Rate above which rain or snow counts as falling
const PRECIPITATION_THRESHOLD: f64 = 0.001;
const STORM_WIND_SPEED: f64 = 10.0;
const GUST_FACTOR: f64 = 1.5;

/// Summary inputs picked from a model output
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeatherInputs {
    pub air_temperature_k: f64,
    pub wind_speed: f64,
    pub precipitation_rate: f64,
    pub albedo: f64,
    pub snowfall_rate: Option<f64>,
    pub specific_humidity: Option<f64>,
    pub surface_pressure_pa: Option<f64>,
}

/// Weather quantities derived from [`WeatherInputs`], unrounded
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DerivedWeather {
    pub temperature_c: f64,
    pub feels_like_c: f64,
    pub heat_index_c: f64,
    pub wind_chill_c: f64,
    pub relative_humidity: f64,
    pub wind_speed: f64,
    pub wind_gusts: f64,
    pub precipitation_rate: f64,
    pub snowfall_rate: f64,
    pub pressure_hpa: Option<f64>,
    pub rain_probability: f64,
    pub snow_probability: f64,
    pub storm_probability: f64,
    pub sunshine_index: f64,
    pub condition: WeatherCondition,
}

fn percent(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, 100.0)
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

pub fn kelvin_to_celsius(kelvin: f64) -> f64 {
    kelvin - KELVIN_OFFSET
}

/// Relative humidity (%) from specific humidity (kg/kg), pressure (hPa) and
/// temperature (K)
pub fn relative_humidity(specific_humidity: f64, pressure_hpa: f64, temperature_k: f64) -> f64 {
    let q = specific_humidity;
    let vapour_pressure = q * pressure_hpa / (0.622 + 0.378 * q);
    // Clausius-Clapeyron approximation in atmospheres, converted to hPa
    let saturation = (13.7 - 5120.0 / temperature_k).exp() * 1013.25;
    if saturation <= 0.0 || !saturation.is_finite() {
        return 0.0;
    }
    percent(100.0 * vapour_pressure / saturation)
}

/// Rothfusz heat index (°C). Only defined from 27 °C up; below that the air
/// temperature is returned.
pub fn heat_index(temperature_c: f64, relative_humidity: f64) -> f64 {
    if temperature_c < 27.0 {
        return temperature_c;
    }
    let t = temperature_c * 9.0 / 5.0 + 32.0;
    let rh = relative_humidity;
    let hi_f = -42.379 + 2.04901523 * t + 10.14333127 * rh
        - 0.22475541 * t * rh
        - 0.00683783 * t * t
        - 0.05481717 * rh * rh
        + 0.00122874 * t * t * rh
        + 0.00085282 * t * rh * rh
        - 0.00000199 * t * t * rh * rh;
    (hi_f - 32.0) * 5.0 / 9.0
}

/// Wind chill (°C) for wind speed in m/s. Defined at or below 10 °C with at
/// least 4.8 km/h of wind; otherwise the air temperature is returned.
pub fn wind_chill(temperature_c: f64, wind_speed: f64) -> f64 {
    let wind_kmh = wind_speed * 3.6;
    if temperature_c > 10.0 || wind_kmh < 4.8 {
        return temperature_c;
    }
    let v = wind_kmh.powf(0.16);
    13.12 + 0.6215 * temperature_c - 11.37 * v + 0.3965 * temperature_c * v
}

/// Dominant weather condition, first matching rule wins
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum WeatherCondition {
    Snowy,
    Rainy,
    Stormy,
    Freezing,
    Hot,
    Warm,
    Cool,
    Sunny,
    #[serde(rename = "Partly Cloudy")]
    PartlyCloudy,
    Cloudy,
}

impl std::fmt::Display for WeatherCondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WeatherCondition::Snowy => write!(f, "Snowy"),
            WeatherCondition::Rainy => write!(f, "Rainy"),
            WeatherCondition::Stormy => write!(f, "Stormy"),
            WeatherCondition::Freezing => write!(f, "Freezing"),
            WeatherCondition::Hot => write!(f, "Hot"),
            WeatherCondition::Warm => write!(f, "Warm"),
            WeatherCondition::Cool => write!(f, "Cool"),
            WeatherCondition::Sunny => write!(f, "Sunny"),
            WeatherCondition::PartlyCloudy => write!(f, "Partly Cloudy"),
            WeatherCondition::Cloudy => write!(f, "Cloudy"),
        }
    }
}

/// Priority-ordered decision list:
/// snow, rain, storm, freezing, hot, warm, cool, sunny, partly cloudy, cloudy.
pub fn classify_condition(
    temperature_c: f64,
    precipitation_rate: f64,
    snowfall_rate: f64,
    wind_speed: f64,
    sunshine_index: f64,
) -> WeatherCondition {
    if temperature_c < 0.0 && snowfall_rate > PRECIPITATION_THRESHOLD {
        WeatherCondition::Snowy
    } else if precipitation_rate > PRECIPITATION_THRESHOLD {
        WeatherCondition::Rainy
    } else if wind_speed > STORM_WIND_SPEED {
        WeatherCondition::Stormy
    } else if temperature_c < 0.0 {
        WeatherCondition::Freezing
    } else if temperature_c > 30.0 {
        WeatherCondition::Hot
    } else if temperature_c > 25.0 {
        WeatherCondition::Warm
    } else if temperature_c < 10.0 {
        WeatherCondition::Cool
    } else if sunshine_index > 70.0 {
        WeatherCondition::Sunny
    } else if sunshine_index > 40.0 {
        WeatherCondition::PartlyCloudy
    } else {
        WeatherCondition::Cloudy
    }
}

impl DerivedWeather {
    pub fn derive(inputs: &WeatherInputs) -> Self {
        let temperature_c = kelvin_to_celsius(inputs.air_temperature_k);
        let wind_speed = inputs.wind_speed.max(0.0);
        let precipitation_rate = inputs.precipitation_rate.max(0.0);
        let pressure_hpa = inputs.surface_pressure_pa.map(|pa| pa / 100.0);

        let relative_humidity = match (inputs.specific_humidity, pressure_hpa) {
            (Some(q), Some(p)) => relative_humidity(q, p, inputs.air_temperature_k),
            _ => percent(50.0 + precipitation_rate * 1000.0),
        };

        let freezing = temperature_c < 0.0;
        let snowfall_rate = match inputs.snowfall_rate {
            Some(rate) => rate.max(0.0),
            None if freezing => precipitation_rate,
            None => 0.0,
        };

        let heat_index_c = heat_index(temperature_c, relative_humidity);
        let wind_chill_c = wind_chill(temperature_c, wind_speed);
        let feels_like_c = if temperature_c >= 27.0 {
            heat_index_c
        } else {
            wind_chill_c
        };

        let sunshine_index = percent(100.0 - inputs.albedo);
        let rain_probability = percent(precipitation_rate / RAIN_SATURATION_RATE * 100.0);
        let snow_probability = percent(snowfall_rate / SNOW_SATURATION_RATE * 100.0);
        let storm_probability = percent(
            30.0 * (wind_speed / STORM_WIND_SPEED)
                + 40.0 * (precipitation_rate / RAIN_SATURATION_RATE),
        );

        let condition = classify_condition(
            temperature_c,
            precipitation_rate,
            snowfall_rate,
            wind_speed,
            sunshine_index,
        );

        Self {
            temperature_c,
            feels_like_c,
            heat_index_c,
            wind_chill_c,
            relative_humidity,
            wind_speed,
            wind_gusts: wind_speed * GUST_FACTOR,
            precipitation_rate,
            snowfall_rate,
            pressure_hpa,
            rain_probability,
            snow_probability,
            storm_probability,
            sunshine_index,
            condition,
        }
    }

    pub fn summary(&self) -> WeatherSummary {
        WeatherSummary {
            temperature: round1(self.temperature_c),
            feels_like: round1(self.feels_like_c),
            rain_probability: round1(self.rain_probability),
            snow_probability: round1(self.snow_probability),
            storm_probability: round1(self.storm_probability),
            sunshine_index: round1(self.sunshine_index),
            humidity_index: round1(self.relative_humidity),
            wind_speed: round1(self.wind_speed),
            condition: self.condition,
        }
    }

    pub fn report(&self, location: Option<Location>) -> WeatherReport {
        WeatherReport {
            location: location.map(|l| ReportLocation {
                latitude: l.latitude,
                longitude: l.longitude,
                coordinates: l.coordinates_label(),
            }),
            temperature: TemperatureSection {
                air_temperature: round1(self.temperature_c),
                feels_like: round1(self.feels_like_c),
                wind_chill: round1(self.wind_chill_c),
                unit: "°C".to_string(),
            },
            precipitation: PrecipitationSection {
                rain_probability: round1(self.rain_probability),
                snow_probability: round1(self.snow_probability),
                rain_rate: (self.precipitation_rate * 1000.0).round() / 1000.0,
                snow_rate: (self.snowfall_rate * 1000.0).round() / 1000.0,
            },
            wind: WindSection {
                speed: round1(self.wind_speed),
                gusts: round1(self.wind_gusts),
                unit: "m/s".to_string(),
                description: wind_description(self.wind_speed).to_string(),
            },
            humidity: HumiditySection {
                percentage: round1(self.relative_humidity),
                description: humidity_description(self.relative_humidity).to_string(),
            },
            pressure: self.pressure_hpa.map(|hpa| PressureSection {
                value: round1(hpa),
                unit: "hPa".to_string(),
                description: pressure_description(hpa).to_string(),
            }),
            weather_conditions: ConditionsSection {
                primary: self.condition,
                storm_probability: round1(self.storm_probability),
                sunny_probability: round1(self.sunshine_index),
                visibility: visibility_description(
                    self.relative_humidity,
                    self.precipitation_rate,
                )
                .to_string(),
            },
            comfort_index: ComfortSection {
                heat_index: round1(self.heat_index_c),
                wind_chill: round1(self.wind_chill_c),
                comfort_level: comfort_level(self.temperature_c, self.relative_humidity)
                    .to_string(),
            },
        }
    }
}

/// Human-readable summary shown at the top of the dashboard
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WeatherSummary {
    /// °C
    pub temperature: f64,
    /// °C
    pub feels_like: f64,
    /// Percentages in [0, 100]
    pub rain_probability: f64,
    pub snow_probability: f64,
    pub storm_probability: f64,
    pub sunshine_index: f64,
    pub humidity_index: f64,
    /// m/s
    pub wind_speed: f64,
    pub condition: WeatherCondition,
}

/// Sectioned conditions report
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WeatherReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<ReportLocation>,
    pub temperature: TemperatureSection,
    pub precipitation: PrecipitationSection,
    pub wind: WindSection,
    pub humidity: HumiditySection,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pressure: Option<PressureSection>,
    pub weather_conditions: ConditionsSection,
    pub comfort_index: ComfortSection,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReportLocation {
    pub latitude: f64,
    pub longitude: f64,
    pub coordinates: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TemperatureSection {
    pub air_temperature: f64,
    pub feels_like: f64,
    pub wind_chill: f64,
    pub unit: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PrecipitationSection {
    pub rain_probability: f64,
    pub snow_probability: f64,
    pub rain_rate: f64,
    pub snow_rate: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WindSection {
    pub speed: f64,
    pub gusts: f64,
    pub unit: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HumiditySection {
    pub percentage: f64,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PressureSection {
    pub value: f64,
    pub unit: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConditionsSection {
    pub primary: WeatherCondition,
    pub storm_probability: f64,
    pub sunny_probability: f64,
    pub visibility: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ComfortSection {
    pub heat_index: f64,
    pub wind_chill: f64,
    pub comfort_level: String,
}

/// Label for readings that are not finite numbers
pub const UNKNOWN_DESCRIPTION: &str = "Unknown";

/// Beaufort-style wind label for a speed in m/s
pub fn wind_description(speed: f64) -> &'static str {
    if !speed.is_finite() {
        return UNKNOWN_DESCRIPTION;
    }
    match speed {
        s if s < 0.5 => "Calm",
        s if s < 3.3 => "Light breeze",
        s if s < 5.5 => "Gentle breeze",
        s if s < 7.9 => "Moderate breeze",
        s if s < 10.7 => "Fresh breeze",
        s if s < 13.8 => "Strong breeze",
        _ => "High winds",
    }
}

pub fn humidity_description(humidity: f64) -> &'static str {
    if !humidity.is_finite() {
        return UNKNOWN_DESCRIPTION;
    }
    match humidity {
        h if h < 30.0 => "Very dry",
        h if h < 50.0 => "Dry",
        h if h < 70.0 => "Comfortable",
        h if h < 90.0 => "Humid",
        _ => "Very humid",
    }
}

pub fn pressure_description(pressure_hpa: f64) -> &'static str {
    if !pressure_hpa.is_finite() {
        UNKNOWN_DESCRIPTION
    } else if pressure_hpa < 1000.0 {
        "Low pressure"
    } else if pressure_hpa < 1020.0 {
        "Normal pressure"
    } else {
        "High pressure"
    }
}

pub fn visibility_description(humidity: f64, rain_rate: f64) -> &'static str {
    if !humidity.is_finite() || !rain_rate.is_finite() {
        UNKNOWN_DESCRIPTION
    } else if rain_rate > 0.01 {
        "Poor (rain)"
    } else if humidity > 90.0 {
        "Poor (fog)"
    } else if humidity > 80.0 {
        "Fair"
    } else {
        "Good"
    }
}

pub fn comfort_level(temperature_c: f64, humidity: f64) -> &'static str {
    if !temperature_c.is_finite() || !humidity.is_finite() {
        UNKNOWN_DESCRIPTION
    } else if temperature_c < 0.0 {
        "Very cold"
    } else if temperature_c < 10.0 {
        "Cold"
    } else if temperature_c < 20.0 {
        if humidity > 80.0 {
            "Cool and humid"
        } else {
            "Cool"
        }
    } else if temperature_c < 25.0 {
        if humidity > 80.0 {
            "Warm and humid"
        } else {
            "Pleasant"
        }
    } else if temperature_c < 30.0 {
        if humidity > 70.0 {
            "Hot and humid"
        } else {
            "Warm"
        }
    } else {
        "Very hot"
    }
}
