//! Feature encoding for the regression models
//!
//! Turns a request date (and optionally a location) into the numeric vector
//! a trained model expects. The feature list comes from the model artifact,
//! so the encoder's width always matches what the model was fitted on.
//!
//! Periodic calendar indices are emitted as `sin(2π·i/P)` and `cos(2π·i/P)`
//! pairs so the end of a period sits next to its start in feature space.

use std::collections::HashSet;
use std::f64::consts::PI;

use chrono::{Datelike, NaiveDateTime, Timelike, Weekday};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::Location;
use crate::validation::InputError;

/// Day-of-year period used by the `sin_day`/`cos_day` pair
pub const DAY_PERIOD_COMMON: f64 = 365.0;
/// Day-of-year period used by the `sin_day_of_year`/`cos_day_of_year` pair
pub const DAY_PERIOD_LEAP: f64 = 366.0;

/// One named model input
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    Year,
    Month,
    Day,
    DayOfYear,
    /// Monday = 0
    DayOfWeek,
    IsWeekend,
    Hour,
    /// Day of year over a 365-day period
    SinDay,
    CosDay,
    /// Day of year over a 366-day period
    SinDayOfYear,
    CosDayOfYear,
    SinMonth,
    CosMonth,
    SinDayOfWeek,
    CosDayOfWeek,
    SinHour,
    CosHour,
    Latitude,
    Longitude,
}

impl Feature {
    pub fn needs_location(&self) -> bool {
        matches!(self, Feature::Latitude | Feature::Longitude)
    }

    fn value(&self, at: &NaiveDateTime, location: Option<&Location>) -> Option<f64> {
        let doy = f64::from(at.ordinal());
        let month = f64::from(at.month());
        let weekday = f64::from(at.weekday().num_days_from_monday());
        let hour = f64::from(at.hour());

        let value = match self {
            Feature::Year => f64::from(at.year()),
            Feature::Month => month,
            Feature::Day => f64::from(at.day()),
            Feature::DayOfYear => doy,
            Feature::DayOfWeek => weekday,
            Feature::IsWeekend => {
                if matches!(at.weekday(), Weekday::Sat | Weekday::Sun) {
                    1.0
                } else {
                    0.0
                }
            }
            Feature::Hour => hour,
            Feature::SinDay => cyclical(doy, DAY_PERIOD_COMMON).0,
            Feature::CosDay => cyclical(doy, DAY_PERIOD_COMMON).1,
            Feature::SinDayOfYear => cyclical(doy, DAY_PERIOD_LEAP).0,
            Feature::CosDayOfYear => cyclical(doy, DAY_PERIOD_LEAP).1,
            Feature::SinMonth => cyclical(month, 12.0).0,
            Feature::CosMonth => cyclical(month, 12.0).1,
            Feature::SinDayOfWeek => cyclical(weekday, 7.0).0,
            Feature::CosDayOfWeek => cyclical(weekday, 7.0).1,
            Feature::SinHour => cyclical(hour, 24.0).0,
            Feature::CosHour => cyclical(hour, 24.0).1,
            Feature::Latitude => location?.latitude,
            Feature::Longitude => location?.longitude,
        };
        Some(value)
    }
}

/// `(sin(2π·index/period), cos(2π·index/period))`
pub fn cyclical(index: f64, period: f64) -> (f64, f64) {
    let angle = 2.0 * PI * index / period;
    (angle.sin(), angle.cos())
}

/// Errors in the feature list itself. These are configuration problems.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FeatureError {
    #[error("feature list is empty")]
    Empty,

    #[error("feature '{0:?}' appears more than once")]
    Duplicate(Feature),
}

/// Encoded model input
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector(Vec<f64>);

impl FeatureVector {
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_inner(self) -> Vec<f64> {
        self.0
    }
}

/// Encoder for a fixed, ordered feature list
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureEncoder {
    features: Vec<Feature>,
}

impl FeatureEncoder {
    pub fn new(features: Vec<Feature>) -> Result<Self, FeatureError> {
        if features.is_empty() {
            return Err(FeatureError::Empty);
        }
        let mut seen = HashSet::new();
        for feature in &features {
            if !seen.insert(*feature) {
                return Err(FeatureError::Duplicate(*feature));
            }
        }
        Ok(Self { features })
    }

    /// Number of values every encoded vector has
    pub fn width(&self) -> usize {
        self.features.len()
    }

    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    pub fn requires_location(&self) -> bool {
        self.features.iter().any(Feature::needs_location)
    }

    /// Encode one request. Location is ignored unless a feature uses it.
    pub fn encode(
        &self,
        at: &NaiveDateTime,
        location: Option<&Location>,
    ) -> Result<FeatureVector, InputError> {
        self.features
            .iter()
            .map(|feature| {
                feature.value(at, location).ok_or_else(|| {
                    InputError::new("location", "latitude and longitude are required")
                })
            })
            .collect::<Result<Vec<_>, _>>()
            .map(FeatureVector)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use proptest::prelude::*;

    fn at(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    fn daily_encoder() -> FeatureEncoder {
        FeatureEncoder::new(vec![Feature::Year, Feature::SinDay, Feature::CosDay]).unwrap()
    }

    fn hourly_encoder() -> FeatureEncoder {
        FeatureEncoder::new(vec![
            Feature::DayOfYear,
            Feature::Month,
            Feature::Year,
            Feature::DayOfWeek,
            Feature::IsWeekend,
            Feature::Hour,
            Feature::SinDayOfYear,
            Feature::CosDayOfYear,
            Feature::SinMonth,
            Feature::CosMonth,
            Feature::SinDayOfWeek,
            Feature::CosDayOfWeek,
            Feature::SinHour,
            Feature::CosHour,
            Feature::Latitude,
            Feature::Longitude,
        ])
        .unwrap()
    }

    fn distance(a: &FeatureVector, b: &FeatureVector) -> f64 {
        a.as_slice()
            .iter()
            .zip(b.as_slice())
            .map(|(x, y)| (x - y).powi(2))
            .sum::<f64>()
            .sqrt()
    }

    #[test]
    fn test_daily_encoding_values() {
        let encoded = daily_encoder().encode(&at(2023, 1, 1, 0), None).unwrap();
        let (sin, cos) = cyclical(1.0, 365.0);
        assert_eq!(encoded.as_slice(), &[2023.0, sin, cos]);
    }

    #[test]
    fn test_hourly_encoding_calendar_fields() {
        // 2023-07-15 was a Saturday
        let nyc = Location::new(40.7, -74.0);
        let encoded = hourly_encoder()
            .encode(&at(2023, 7, 15, 18), Some(&nyc))
            .unwrap();
        let values = encoded.as_slice();
        assert_eq!(values.len(), 16);
        assert_eq!(values[0], 196.0);
        assert_eq!(values[1], 7.0);
        assert_eq!(values[2], 2023.0);
        assert_eq!(values[3], 5.0);
        assert_eq!(values[4], 1.0);
        assert_eq!(values[5], 18.0);
        assert_eq!(values[14], 40.7);
        assert_eq!(values[15], -74.0);
    }

    #[test]
    fn test_location_feature_without_location_fails() {
        let err = hourly_encoder().encode(&at(2023, 7, 15, 0), None).unwrap_err();
        assert_eq!(err.field, "location");
    }

    #[test]
    fn test_location_ignored_when_unused() {
        let encoder = daily_encoder();
        let nyc = Location::new(40.7, -74.0);
        let with = encoder.encode(&at(2023, 3, 1, 0), Some(&nyc)).unwrap();
        let without = encoder.encode(&at(2023, 3, 1, 0), None).unwrap();
        assert_eq!(with, without);
        assert!(!encoder.requires_location());
        assert!(hourly_encoder().requires_location());
    }

    #[test]
    fn test_encoder_rejects_bad_feature_lists() {
        assert_eq!(FeatureEncoder::new(vec![]), Err(FeatureError::Empty));
        assert_eq!(
            FeatureEncoder::new(vec![Feature::Year, Feature::Year]),
            Err(FeatureError::Duplicate(Feature::Year))
        );
    }

    #[test]
    fn test_feature_names_deserialize() {
        let features: Vec<Feature> =
            serde_json::from_str(r#"["year", "sin_day_of_year", "cos_hour", "is_weekend"]"#)
                .unwrap();
        assert_eq!(
            features,
            vec![
                Feature::Year,
                Feature::SinDayOfYear,
                Feature::CosHour,
                Feature::IsWeekend
            ]
        );
        assert!(serde_json::from_str::<Feature>(r#""moon_phase""#).is_err());
    }

    #[test]
    fn test_year_boundary_continuity() {
        let cyclic = FeatureEncoder::new(vec![Feature::SinDay, Feature::CosDay]).unwrap();
        let dec31 = cyclic.encode(&at(2022, 12, 31, 0), None).unwrap();
        let jan1 = cyclic.encode(&at(2023, 1, 1, 0), None).unwrap();
        let mid = cyclic.encode(&at(2023, 7, 2, 0), None).unwrap();

        // Adjacent days across the boundary are as close as any other adjacent pair
        assert!(distance(&dec31, &jan1) < 0.02);
        assert!(distance(&dec31, &mid) > 1.9);

        // A linear day index jumps by 364 at the same boundary
        let linear = FeatureEncoder::new(vec![Feature::DayOfYear]).unwrap();
        let dec31 = linear.encode(&at(2022, 12, 31, 0), None).unwrap();
        let jan1 = linear.encode(&at(2023, 1, 1, 0), None).unwrap();
        assert!(distance(&dec31, &jan1) > 300.0);
    }

    #[test]
    fn test_hour_boundary_continuity() {
        let encoder = FeatureEncoder::new(vec![Feature::SinHour, Feature::CosHour]).unwrap();
        let late = encoder.encode(&at(2023, 5, 1, 23), None).unwrap();
        let midnight = encoder.encode(&at(2023, 5, 2, 0), None).unwrap();
        assert!(distance(&late, &midnight) < 0.3);
    }

    proptest! {
        #[test]
        fn prop_width_is_fixed(doy in 1u32..=365, hour in 0u32..24) {
            let date = NaiveDate::from_yo_opt(2023, doy).unwrap().and_hms_opt(hour, 0, 0).unwrap();
            let location = Location::new(10.0, 20.0);
            let daily = daily_encoder();
            let hourly = hourly_encoder();
            prop_assert_eq!(daily.encode(&date, None).unwrap().len(), daily.width());
            prop_assert_eq!(hourly.encode(&date, Some(&location)).unwrap().len(), hourly.width());
        }

        #[test]
        fn prop_cyclical_pairs_lie_on_unit_circle(index in 0.0f64..400.0, period in 1.0f64..400.0) {
            let (sin, cos) = cyclical(index, period);
            prop_assert!((sin * sin + cos * cos - 1.0).abs() < 1e-9);
        }
    }
}
