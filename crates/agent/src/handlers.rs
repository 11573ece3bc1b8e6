use maitred_core::domain::payment::{PaymentExtraction, PaymentMethod};

use crate::llm::{GenerationError, LlmClient};

/// Persona prefix for recipe questions.
pub const RECIPE_PERSONA: &str = "You are an expert culinary assistant. Help cooks with recipes, \
     techniques, and practical advice. Answer clearly and professionally.";

/// Persona prefix for everything that is neither payment nor recipe.
pub const GENERAL_PERSONA: &str = "You are an AI assistant for a restaurant. You help with \
     payments, recipes, and general questions. Answer in a friendly and professional manner.";

/// Asked when a payment request arrives without an amount. This is a
/// terminal "need more info" reply, not an error.
pub const PAYMENT_CLARIFICATION: &str = "I can help with the payment. Could you tell me the \
     amount and your preferred payment method?";

/// Rendered in place of a table reference the guest never gave.
pub const TABLE_PLACEHOLDER: &str = "N/A";

/// Draft the payment reply from the extraction alone. Pure: this never
/// touches the gateway; actual payment creation happens elsewhere.
pub fn payment_reply(extraction: &PaymentExtraction) -> String {
    let Some(amount) = extraction.amount else {
        return PAYMENT_CLARIFICATION.to_string();
    };

    let table = extraction.table_reference.as_deref().unwrap_or(TABLE_PLACEHOLDER);
    match extraction.method {
        PaymentMethod::CardGateway => format!(
            "Perfect! I will set up a card payment of {amount} DZD through the payment \
             gateway. A payment link will be generated for table {table}."
        ),
        PaymentMethod::Cash => {
            format!("Cash payment of {amount} DZD recorded for table {table}.")
        }
    }
}

/// Delegate a recipe question to the model under the culinary persona
/// and return its output verbatim.
pub async fn recipe_reply(
    llm: &dyn LlmClient,
    user_text: &str,
) -> Result<String, GenerationError> {
    llm.generate(RECIPE_PERSONA, user_text).await
}

/// Delegate general conversation to the model under the restaurant
/// assistant persona.
pub async fn general_reply(
    llm: &dyn LlmClient,
    user_text: &str,
) -> Result<String, GenerationError> {
    llm.generate(GENERAL_PERSONA, user_text).await
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use rust_decimal::Decimal;

    use maitred_core::domain::payment::{PaymentExtraction, PaymentMethod};

    use super::{
        general_reply, payment_reply, recipe_reply, GENERAL_PERSONA, PAYMENT_CLARIFICATION,
        RECIPE_PERSONA,
    };
    use crate::llm::{GenerationError, LlmClient};

    struct EchoLlm;

    #[async_trait]
    impl LlmClient for EchoLlm {
        async fn generate(
            &self,
            system_prompt: &str,
            user_text: &str,
        ) -> Result<String, GenerationError> {
            Ok(format!("{system_prompt}|{user_text}"))
        }
    }

    #[test]
    fn missing_amount_yields_clarification_prompt() {
        let extraction = PaymentExtraction::default();
        assert_eq!(payment_reply(&extraction), PAYMENT_CLARIFICATION);
    }

    #[test]
    fn card_confirmation_interpolates_amount_and_table() {
        let extraction = PaymentExtraction {
            amount: Some(Decimal::from(1000)),
            method: PaymentMethod::CardGateway,
            table_reference: Some("T-5".to_string()),
            description: None,
        };

        let reply = payment_reply(&extraction);
        assert!(reply.contains("1000 DZD"));
        assert!(reply.contains("table T-5"));
        assert!(reply.contains("payment link"));
    }

    #[test]
    fn cash_confirmation_uses_placeholder_for_missing_table() {
        let extraction = PaymentExtraction {
            amount: Some(Decimal::new(50050, 2)),
            method: PaymentMethod::Cash,
            table_reference: None,
            description: None,
        };

        let reply = payment_reply(&extraction);
        assert!(reply.contains("500.50 DZD"));
        assert!(reply.contains("table N/A"));
        assert!(!reply.contains("payment link"));
    }

    #[tokio::test]
    async fn recipe_reply_sends_culinary_persona() {
        let reply = recipe_reply(&EchoLlm, "how long to braise lamb?").await.expect("reply");
        assert_eq!(reply, format!("{RECIPE_PERSONA}|how long to braise lamb?"));
    }

    #[tokio::test]
    async fn general_reply_sends_restaurant_persona() {
        let reply = general_reply(&EchoLlm, "do you have a terrace?").await.expect("reply");
        assert_eq!(reply, format!("{GENERAL_PERSONA}|do you have a terrace?"));
    }
}
