use rust_decimal::Decimal;

use maitred_core::domain::payment::{PaymentExtraction, PaymentMethod};

/// Gateway-backed method terms, checked before the cash terms.
pub const CARD_KEYWORDS: &[&str] = &["card", "carte", "chargily"];
/// Cash synonyms, including the French ones guests actually type.
pub const CASH_KEYWORDS: &[&str] = &["cash", "espèces", "liquide"];

/// Punctuation stripped from token edges before numeric parsing.
const TOKEN_TRIM: &[char] = &[',', ';', ':', '!', '?', '(', ')', '"', '\''];

const TABLE_WORD: &str = "table";
const TABLE_PREFIX: &str = "T-";

/// Best-effort extraction of payment fields from free text.
///
/// Each rule is applied independently and none can fail; a field the
/// text does not mention stays absent. The amount is the first numeric
/// token (integer or two-decimal number) that is not a table number,
/// the method defaults to the card gateway when ambiguous, and a table
/// reference is derived from `table <digits>`.
pub fn extract_payment(text: &str) -> PaymentExtraction {
    let normalized = text.to_lowercase();

    PaymentExtraction {
        amount: extract_amount(&normalized),
        method: extract_method(&normalized),
        table_reference: extract_table_reference(&normalized),
        description: None,
    }
}

fn extract_amount(normalized: &str) -> Option<Decimal> {
    let mut previous: Option<&str> = None;
    for raw in normalized.split_whitespace() {
        let token = raw.trim_matches(TOKEN_TRIM);
        let follows_table = previous == Some(TABLE_WORD);
        previous = Some(token);

        // A number right after "table" is a table id, never the amount.
        if follows_table && token.chars().all(|ch| ch.is_ascii_digit()) {
            continue;
        }

        if let Some(amount) = parse_money_token(token) {
            return Some(amount);
        }
    }
    None
}

fn extract_method(normalized: &str) -> PaymentMethod {
    if CARD_KEYWORDS.iter().any(|keyword| normalized.contains(keyword)) {
        PaymentMethod::CardGateway
    } else if CASH_KEYWORDS.iter().any(|keyword| normalized.contains(keyword)) {
        PaymentMethod::Cash
    } else {
        PaymentMethod::CardGateway
    }
}

fn extract_table_reference(normalized: &str) -> Option<String> {
    let mut previous: Option<&str> = None;
    for raw in normalized.split_whitespace() {
        let token = raw.trim_matches(TOKEN_TRIM);
        if previous == Some(TABLE_WORD) && !token.is_empty() {
            if token.chars().all(|ch| ch.is_ascii_digit()) {
                return Some(format!("{TABLE_PREFIX}{token}"));
            }
        }
        previous = Some(token);
    }
    None
}

/// Parse the leading numeric portion of a token: a digit run with an
/// optional two-decimal fraction (`1000`, `500.50`). A longer fraction
/// keeps only the integer part, mirroring the extraction contract.
fn parse_money_token(token: &str) -> Option<Decimal> {
    let bytes = token.as_bytes();
    let integer_end =
        bytes.iter().position(|byte| !byte.is_ascii_digit()).unwrap_or(bytes.len());
    if integer_end == 0 {
        return None;
    }

    let rest = &bytes[integer_end..];
    let end = if rest.len() >= 3
        && rest[0] == b'.'
        && rest[1].is_ascii_digit()
        && rest[2].is_ascii_digit()
        && rest.get(3).map(|byte| !byte.is_ascii_digit()).unwrap_or(true)
    {
        integer_end + 3
    } else {
        integer_end
    };

    token[..end].parse::<Decimal>().ok()
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use maitred_core::domain::payment::PaymentMethod;

    use super::{extract_payment, parse_money_token};

    #[test]
    fn extracts_amount_method_and_table_from_card_request() {
        let extraction = extract_payment("card payment table 12, 500.50");

        assert_eq!(extraction.amount, Some(Decimal::new(50050, 2)));
        assert_eq!(extraction.method, PaymentMethod::CardGateway);
        assert_eq!(extraction.table_reference.as_deref(), Some("T-12"));
    }

    #[test]
    fn cash_without_amount_leaves_amount_and_table_absent() {
        let extraction = extract_payment("cash, no amount mentioned");

        assert_eq!(extraction.amount, None);
        assert_eq!(extraction.method, PaymentMethod::Cash);
        assert_eq!(extraction.table_reference, None);
    }

    #[test]
    fn integer_amount_with_table_and_card() {
        let extraction = extract_payment("I want to pay 1000 for table 5 by card");

        assert_eq!(extraction.amount, Some(Decimal::from(1000)));
        assert_eq!(extraction.method, PaymentMethod::CardGateway);
        assert_eq!(extraction.table_reference.as_deref(), Some("T-5"));
    }

    #[test]
    fn ambiguous_method_defaults_to_card_gateway() {
        let extraction = extract_payment("settle 250 for table 3 please");
        assert_eq!(extraction.method, PaymentMethod::CardGateway);
    }

    #[test]
    fn card_keyword_wins_when_both_method_sets_match() {
        let extraction = extract_payment("card or cash, whichever");
        assert_eq!(extraction.method, PaymentMethod::CardGateway);
    }

    #[test]
    fn french_cash_synonyms_are_recognized() {
        assert_eq!(extract_payment("en espèces svp").method, PaymentMethod::Cash);
        assert_eq!(extract_payment("paiement en liquide").method, PaymentMethod::Cash);
    }

    #[test]
    fn extraction_is_idempotent_on_the_same_string() {
        let text = "card payment table 12, 500.50";
        assert_eq!(extract_payment(text), extract_payment(text));
    }

    #[test]
    fn table_number_alone_is_not_an_amount() {
        let extraction = extract_payment("the bill for table 7");
        assert_eq!(extraction.amount, None);
        assert_eq!(extraction.table_reference.as_deref(), Some("T-7"));
    }

    #[test]
    fn no_table_pattern_leaves_reference_absent() {
        let extraction = extract_payment("pay 40 by card at the counter");
        assert_eq!(extraction.amount, Some(Decimal::from(40)));
        assert_eq!(extraction.table_reference, None);
    }

    #[test]
    fn money_token_parsing_handles_fractions() {
        assert_eq!(parse_money_token("1000"), Some(Decimal::from(1000)));
        assert_eq!(parse_money_token("500.50"), Some(Decimal::new(50050, 2)));
        // One- and three-decimal fractions keep the integer part only.
        assert_eq!(parse_money_token("500.5"), Some(Decimal::from(500)));
        assert_eq!(parse_money_token("500.505"), Some(Decimal::from(500)));
        assert_eq!(parse_money_token("dz500"), None);
        assert_eq!(parse_money_token(""), None);
    }
}
