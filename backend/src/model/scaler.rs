//! Standard scaling around a backend

use serde::Deserialize;

use super::{Model, ModelError, RawPrediction};

/// `(x - mean) / scale`. A zero scale behaves like 1.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct StandardScaler {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

impl StandardScaler {
    fn validate(&self, width: usize, which: &'static str) -> Result<(), ModelError> {
        let invalid = |reason: String| ModelError::InvalidScaler { which, reason };
        if self.mean.len() != width || self.scale.len() != width {
            return Err(invalid(format!(
                "has {} means and {} scales, model width is {width}",
                self.mean.len(),
                self.scale.len()
            )));
        }
        if self
            .mean
            .iter()
            .chain(self.scale.iter())
            .any(|v| !v.is_finite())
        {
            return Err(invalid("contains a non-finite value".to_string()));
        }
        Ok(())
    }

    fn effective_scale(&self, index: usize) -> f64 {
        match self.scale[index] {
            s if s == 0.0 => 1.0,
            s => s,
        }
    }

    pub fn transform(&self, x: &[f64]) -> Vec<f64> {
        x.iter()
            .enumerate()
            .map(|(i, v)| (v - self.mean[i]) / self.effective_scale(i))
            .collect()
    }

    pub fn inverse_transform(&self, y: &mut [f64]) {
        for (i, v) in y.iter_mut().enumerate() {
            *v = *v * self.effective_scale(i) + self.mean[i];
        }
    }

    /// Spread is a deviation, so only the scale applies
    pub fn inverse_spread(&self, spread: &mut [f64]) {
        for (i, s) in spread.iter_mut().enumerate() {
            *s *= self.effective_scale(i).abs();
        }
    }
}

/// Backend wrapped in optional input and output scalers
#[derive(Debug)]
pub struct ScaledModel {
    inner: Box<dyn Model>,
    input: Option<StandardScaler>,
    output: Option<StandardScaler>,
}

impl ScaledModel {
    pub fn new(
        inner: Box<dyn Model>,
        input: Option<StandardScaler>,
        output: Option<StandardScaler>,
    ) -> Result<Self, ModelError> {
        if let Some(scaler) = &input {
            scaler.validate(inner.expected_input_width(), "input")?;
        }
        if let Some(scaler) = &output {
            scaler.validate(inner.output_width(), "output")?;
        }
        Ok(Self {
            inner,
            input,
            output,
        })
    }
}

impl Model for ScaledModel {
    fn kind(&self) -> &'static str {
        self.inner.kind()
    }

    fn expected_input_width(&self) -> usize {
        self.inner.expected_input_width()
    }

    fn output_width(&self) -> usize {
        self.inner.output_width()
    }

    fn predict(&self, features: &[f64]) -> Result<RawPrediction, ModelError> {
        if features.len() != self.expected_input_width() {
            return Err(ModelError::FeatureArityMismatch {
                expected: self.expected_input_width(),
                actual: features.len(),
            });
        }

        let mut prediction = match &self.input {
            Some(scaler) => self.inner.predict(&scaler.transform(features))?,
            None => self.inner.predict(features)?,
        };

        if let Some(scaler) = &self.output {
            scaler.inverse_transform(&mut prediction.values);
            if let Some(spread) = prediction.spread.as_mut() {
                scaler.inverse_spread(spread);
            }
        }
        Ok(prediction)
    }
}
