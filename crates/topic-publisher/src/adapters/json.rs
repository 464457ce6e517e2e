//! JSON payload encoder.

use crate::ports::PayloadEncoder;
use serde::Serialize;

/// Encodes payloads as compact JSON, preserving field names.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonEncoder;

impl PayloadEncoder for JsonEncoder {
    fn content_type(&self) -> &str {
        "application/json"
    }

    fn encode<T: Serialize + ?Sized>(
        &self,
        payload: &T,
    ) -> Result<Vec<u8>, Box<dyn std::error::Error + Send + Sync>> {
        Ok(serde_json::to_vec(payload)?)
    }
}
