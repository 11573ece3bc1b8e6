use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// How a guest intends to settle the bill. `CardGateway` covers any
/// gateway-backed card flow; ambiguous requests default to it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    #[default]
    CardGateway,
    Cash,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CardGateway => "card_gateway",
            Self::Cash => "cash",
        }
    }
}

/// Best-effort extraction from a free-text payment request. Fields the
/// text does not mention are left absent; extraction never fails.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentExtraction {
    pub amount: Option<Decimal>,
    pub method: PaymentMethod,
    pub table_reference: Option<String>,
    pub description: Option<String>,
}
