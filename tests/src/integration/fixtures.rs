//! Payload types shared by the integration tests and benchmarks.

use serde::{Deserialize, Serialize};
use topic_publisher::{Payload, PropertyValue};

/// Order placed by a customer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct OrderPlaced {
    #[serde(rename = "CustomerID")]
    pub customer_id: String,
    pub order_number: u64,
    pub region: Option<String>,
    pub total_cents: u64,
}

impl OrderPlaced {
    pub fn new(customer_id: &str, order_number: u64) -> Self {
        Self {
            customer_id: customer_id.to_string(),
            order_number,
            region: None,
            total_cents: 4_999,
        }
    }

    pub fn in_region(mut self, region: &str) -> Self {
        self.region = Some(region.to_string());
        self
    }
}

impl Payload for OrderPlaced {
    fn field(&self, key: &str) -> Option<PropertyValue> {
        match key {
            "CustomerID" => Some(self.customer_id.clone().into()),
            "OrderNumber" => Some(self.order_number.into()),
            "Region" => self.region.clone().map(Into::into),
            "TotalCents" => Some(self.total_cents.into()),
            _ => None,
        }
    }
}

/// Payload relying entirely on the trait defaults.
#[derive(Debug, Clone, Serialize)]
pub struct Heartbeat {
    pub sequence: u32,
}

impl Payload for Heartbeat {}
