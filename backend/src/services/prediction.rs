//! Prediction service: validate, encode, predict, interpret

use std::fmt;
use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime, Utc};
use shared::{
    parse_request_date, ConditionsResponse, Location, PredictionRequest, PredictionResponse,
};
use uuid::Uuid;

use super::interpreter::Interpretation;
use crate::error::{AppError, AppResult};
use crate::model::{Deployment, ModelSlot};

/// Where a request is in the pipeline. Logged so a failure can be traced to
/// the step that raised it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PredictionStage {
    Received,
    Validating,
    Encoding,
    Predicting,
    Interpreting,
    Responded,
}

impl fmt::Display for PredictionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PredictionStage::Received => "received",
            PredictionStage::Validating => "validating",
            PredictionStage::Encoding => "encoding",
            PredictionStage::Predicting => "predicting",
            PredictionStage::Interpreting => "interpreting",
            PredictionStage::Responded => "responded",
        };
        f.write_str(name)
    }
}

/// A completed prediction, before it is shaped into a response
#[derive(Debug, Clone)]
pub struct Prediction {
    pub id: Uuid,
    pub date: NaiveDateTime,
    pub location: Option<Location>,
    pub schema_version: String,
    pub interpretation: Interpretation,
}

impl Prediction {
    pub fn into_response(self) -> PredictionResponse {
        let Interpretation {
            summary,
            variables,
            confidence,
            top_confidence,
            method,
            ..
        } = self.interpretation;

        PredictionResponse {
            prediction_id: self.id.to_string(),
            date: self.date.format("%Y-%m-%dT%H:%M:%S").to_string(),
            location: self.location,
            schema_version: self.schema_version,
            summary,
            variables,
            confidence,
            top_confidence,
            confidence_method: method,
        }
    }

    pub fn into_report(self) -> ConditionsResponse {
        ConditionsResponse {
            success: true,
            data: self.interpretation.weather.report(self.location),
        }
    }
}

/// Runs requests against the process-wide deployment
#[derive(Clone)]
pub struct PredictionService {
    slot: Arc<ModelSlot>,
}

impl PredictionService {
    pub fn new(slot: Arc<ModelSlot>) -> Self {
        Self { slot }
    }

    /// Predict with today's UTC date as the horizon reference
    pub fn predict(&self, request: &PredictionRequest) -> AppResult<Prediction> {
        self.predict_on(request, Utc::now().date_naive())
    }

    /// Predict with an explicit "today"
    pub fn predict_on(&self, request: &PredictionRequest, today: NaiveDate) -> AppResult<Prediction> {
        let id = Uuid::new_v4();
        let span = tracing::info_span!("prediction", prediction_id = %id);
        let _entered = span.enter();

        let mut stage = PredictionStage::Received;
        tracing::debug!(%stage, "prediction request");

        match self.run(id, request, today, &mut stage) {
            Ok(prediction) => {
                stage = PredictionStage::Responded;
                tracing::debug!(
                    %stage,
                    condition = %prediction.interpretation.summary.condition,
                    "prediction complete"
                );
                Ok(prediction)
            }
            Err(err) => {
                tracing::warn!(%stage, error = %err, "prediction failed");
                Err(err)
            }
        }
    }

    fn run(
        &self,
        id: Uuid,
        request: &PredictionRequest,
        today: NaiveDate,
        stage: &mut PredictionStage,
    ) -> AppResult<Prediction> {
        let mut advance = |next: PredictionStage| {
            *stage = next;
            tracing::debug!(stage = %next, "stage");
        };

        // Syntax first: a malformed request never reaches the model
        advance(PredictionStage::Validating);
        let date = parse_request_date(request.date.as_deref())?;
        let location = request.location()?;

        let deployment: Arc<Deployment> = self.slot.get().ok_or(AppError::ModelNotLoaded)?;
        deployment
            .policy()
            .check(date.date(), location.as_ref(), today)?;

        advance(PredictionStage::Encoding);
        let features = deployment
            .encoder()
            .encode(&date, location.as_ref())?;
        let model = deployment.model();
        if features.len() != model.expected_input_width() {
            return Err(AppError::FeatureArityMismatch {
                expected: model.expected_input_width(),
                actual: features.len(),
            });
        }

        advance(PredictionStage::Predicting);
        let raw = model.predict(features.as_slice())?;

        advance(PredictionStage::Interpreting);
        let interpretation = deployment.interpreter().interpret(&raw)?;

        Ok(Prediction {
            id,
            date,
            location,
            schema_version: deployment.schema_version().to_string(),
            interpretation,
        })
    }
}
