use serde::{Deserialize, Serialize};

/// Task category assigned to one user utterance. Exactly one handler
/// runs per invocation; this is single-label routing, not multi-label.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    Payment,
    Recipe,
    General,
}

impl TaskKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Payment => "payment",
            Self::Recipe => "recipe",
            Self::General => "general",
        }
    }
}

/// Ordered routing table. First matching entry wins, so payment terms
/// take precedence over recipe terms by construction.
const ROUTES: &[(TaskKind, &[&str])] = &[
    (TaskKind::Payment, &["payment", "paiement", "pay", "chargily", "card", "cash"]),
    (TaskKind::Recipe, &["recipe", "recette", "cook", "cuisiner", "ingredient", "step"]),
];

/// Assign a task label to the latest user utterance.
///
/// Total over all inputs: case-insensitive substring match against the
/// routing table, empty or unmatched text falls through to `General`.
/// Deterministic for a given input.
pub fn classify(text: &str) -> TaskKind {
    let normalized = text.to_lowercase();
    if normalized.trim().is_empty() {
        return TaskKind::General;
    }

    for (task, keywords) in ROUTES {
        if keywords.iter().any(|keyword| normalized.contains(keyword)) {
            return *task;
        }
    }

    TaskKind::General
}

#[cfg(test)]
mod tests {
    use super::{classify, TaskKind};

    #[test]
    fn payment_keywords_route_to_payment() {
        assert_eq!(classify("I want to pay the bill"), TaskKind::Payment);
        assert_eq!(classify("Paiement par carte"), TaskKind::Payment);
        assert_eq!(classify("can we use chargily?"), TaskKind::Payment);
        assert_eq!(classify("CASH for table 3"), TaskKind::Payment);
    }

    #[test]
    fn recipe_keywords_route_to_recipe() {
        assert_eq!(classify("share the recipe for couscous"), TaskKind::Recipe);
        assert_eq!(classify("how do I cook this"), TaskKind::Recipe);
        assert_eq!(classify("quelle recette pour ce plat"), TaskKind::Recipe);
        assert_eq!(classify("what ingredient goes first"), TaskKind::Recipe);
    }

    #[test]
    fn payment_takes_precedence_over_recipe() {
        assert_eq!(classify("pay for the recipe book"), TaskKind::Payment);
        assert_eq!(classify("card or cash for the cooking class"), TaskKind::Payment);
    }

    #[test]
    fn unmatched_text_routes_to_general() {
        assert_eq!(classify("what are your opening hours?"), TaskKind::General);
        assert_eq!(classify("bonjour"), TaskKind::General);
    }

    #[test]
    fn empty_and_blank_text_route_to_general() {
        assert_eq!(classify(""), TaskKind::General);
        assert_eq!(classify("   "), TaskKind::General);
    }

    #[test]
    fn classification_is_case_insensitive_and_deterministic() {
        let text = "PAYMENT please";
        assert_eq!(classify(text), classify(text));
        assert_eq!(classify(text), TaskKind::Payment);
    }
}
