//! A validated model together with the encoder, interpreter and request
//! policy it was trained with

use shared::{
    DateWindow, FeatureEncoder, LocationPolicy, OutputSchema, RequestPolicy, MAX_HORIZON_DAYS,
};

use super::{Model, ModelError};
use crate::services::OutputInterpreter;

#[derive(Debug)]
pub struct Deployment {
    model: Box<dyn Model>,
    encoder: FeatureEncoder,
    interpreter: OutputInterpreter,
    policy: RequestPolicy,
}

impl Deployment {
    /// Cross-check the parts. Any inconsistency is a load failure, so a
    /// deployment that exists can serve every well-formed request.
    pub fn new(
        model: Box<dyn Model>,
        encoder: FeatureEncoder,
        schema: OutputSchema,
        policy: RequestPolicy,
    ) -> Result<Self, ModelError> {
        if encoder.width() != model.expected_input_width() {
            return Err(ModelError::FeatureArityMismatch {
                expected: model.expected_input_width(),
                actual: encoder.width(),
            });
        }
        if schema.len() != model.output_width() {
            return Err(ModelError::OutputArityMismatch {
                model: model.output_width(),
                schema: schema.len(),
            });
        }
        if encoder.requires_location() && policy.location != LocationPolicy::Required {
            return Err(ModelError::LocationPolicy);
        }
        if let DateWindow::Horizon { days } = policy.window {
            if days > MAX_HORIZON_DAYS {
                return Err(ModelError::HorizonTooLong {
                    days,
                    max: MAX_HORIZON_DAYS,
                });
            }
        }

        let interpreter = OutputInterpreter::new(schema)?;

        Ok(Self {
            model,
            encoder,
            interpreter,
            policy,
        })
    }

    pub fn model(&self) -> &dyn Model {
        self.model.as_ref()
    }

    pub fn encoder(&self) -> &FeatureEncoder {
        &self.encoder
    }

    pub fn interpreter(&self) -> &OutputInterpreter {
        &self.interpreter
    }

    pub fn policy(&self) -> &RequestPolicy {
        &self.policy
    }

    pub fn schema_version(&self) -> &str {
        &self.interpreter.schema().version
    }
}
