//! Keyword-based intent classification
//!
//! An [`IntentTable`] is an explicit, ordered list of [`IntentDefinition`]s
//! evaluated top to bottom. Keyword sets may overlap ("balance" is both an
//! `account_balance` keyword and part of "minimum balance" in
//! `account_services`), so declaration order is the dispatch priority: the
//! first intent with a matching keyword wins.
//!
//! # Example
//!
//! ```rust
//! use ocean::intents::IntentTable;
//!
//! let table = IntentTable::banking();
//! assert_eq!(table.detect_intent("What's my account balance?"), "account_balance");
//! assert_eq!(table.detect_intent("Tell me a joke"), "general_inquiry");
//! ```

use crate::types::{AppError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Id of the intent used when nothing else matches in the built-in table.
pub const DEFAULT_FALLBACK_INTENT: &str = "general_inquiry";

/// A single intent: trigger keywords plus the instructions that steer generation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IntentDefinition {
    pub id: String,

    /// Trigger keywords, matched case-insensitively as substrings, in order.
    pub keywords: Vec<String>,

    /// Instruction block placed at the top of the generation prompt.
    pub instructions: String,

    #[serde(default)]
    pub example_questions: Vec<String>,

    #[serde(default)]
    pub expected_output: String,
}

impl IntentDefinition {
    fn matches(&self, question_lower: &str) -> bool {
        self.keywords
            .iter()
            .any(|keyword| question_lower.contains(keyword.as_str()))
    }
}

/// Ordered, immutable intent table with a designated fallback intent.
#[derive(Debug, Clone)]
pub struct IntentTable {
    intents: Vec<IntentDefinition>,
    fallback_index: usize,
}

impl IntentTable {
    /// Build a table from intents in priority order.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Configuration` if the table is empty, an id is empty
    /// or duplicated, a keyword is blank, or `fallback` names no intent.
    pub fn new(intents: Vec<IntentDefinition>, fallback: &str) -> Result<Self> {
        if intents.is_empty() {
            return Err(AppError::Configuration(
                "Intent table must declare at least one intent".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        let mut normalized = Vec::with_capacity(intents.len());
        for mut intent in intents {
            if intent.id.trim().is_empty() {
                return Err(AppError::Configuration(
                    "Intent id must not be empty".to_string(),
                ));
            }
            if !seen.insert(intent.id.clone()) {
                return Err(AppError::Configuration(format!(
                    "Intent '{}' is declared more than once",
                    intent.id
                )));
            }
            if intent.keywords.iter().any(|k| k.trim().is_empty()) {
                // An empty keyword would match every question.
                return Err(AppError::Configuration(format!(
                    "Intent '{}' has an empty keyword",
                    intent.id
                )));
            }
            intent.keywords = intent.keywords.iter().map(|k| k.to_lowercase()).collect();
            normalized.push(intent);
        }

        let fallback_index = normalized
            .iter()
            .position(|intent| intent.id == fallback)
            .ok_or_else(|| {
                AppError::Configuration(format!(
                    "Fallback intent '{}' is not declared in the intent table",
                    fallback
                ))
            })?;

        Ok(Self {
            intents: normalized,
            fallback_index,
        })
    }

    /// The six built-in Ocean Bank intents, `general_inquiry` as fallback.
    pub fn banking() -> Self {
        Self {
            intents: banking_intents(),
            fallback_index: 5,
        }
    }

    /// Classify a question. Total: unmatched questions get the fallback id.
    pub fn detect_intent(&self, question: &str) -> &str {
        let question_lower = question.to_lowercase();

        self.intents
            .iter()
            .find(|intent| intent.matches(&question_lower))
            .map(|intent| intent.id.as_str())
            .unwrap_or_else(|| self.fallback().id.as_str())
    }

    /// Instruction template for an intent; unknown ids get the fallback's.
    pub fn get_intent_prompt(&self, intent_id: &str) -> &str {
        &self.resolve(intent_id).instructions
    }

    /// Example questions for an intent; unknown ids get the fallback's.
    pub fn get_intent_examples(&self, intent_id: &str) -> &[String] {
        &self.resolve(intent_id).example_questions
    }

    pub fn get(&self, intent_id: &str) -> Option<&IntentDefinition> {
        self.intents.iter().find(|intent| intent.id == intent_id)
    }

    pub fn fallback(&self) -> &IntentDefinition {
        &self.intents[self.fallback_index]
    }

    /// Intents in declaration (priority) order.
    pub fn iter(&self) -> impl Iterator<Item = &IntentDefinition> {
        self.intents.iter()
    }

    pub fn len(&self) -> usize {
        self.intents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intents.is_empty()
    }

    fn resolve(&self, intent_id: &str) -> &IntentDefinition {
        self.get(intent_id).unwrap_or_else(|| self.fallback())
    }
}

impl Default for IntentTable {
    fn default() -> Self {
        Self::banking()
    }
}

fn intent(
    id: &str,
    keywords: &[&str],
    instructions: &str,
    example_questions: &[&str],
    expected_output: &str,
) -> IntentDefinition {
    IntentDefinition {
        id: id.to_string(),
        keywords: keywords.iter().map(|k| k.to_lowercase()).collect(),
        instructions: instructions.to_string(),
        example_questions: example_questions.iter().map(|q| q.to_string()).collect(),
        expected_output: expected_output.to_string(),
    }
}

/// Declaration order matters; keep `general_inquiry` last.
fn banking_intents() -> Vec<IntentDefinition> {
    vec![
        intent(
            "account_balance",
            &[
                "balance",
                "account balance",
                "checking balance",
                "savings balance",
                "how much",
                "current balance",
            ],
            r#"You are a helpful banking assistant for Ocean Bank. When asked about account balances:
- Provide clear, accurate information from the provided context
- Include account type, current balance, and any relevant fees or minimums
- Be polite and professional
- Ensure customer data privacy
- If information is not available, suggest contacting customer service"#,
            &[
                "What's my account balance?",
                "How much money do I have in my savings account?",
                "Check my checking balance",
            ],
            "Clear statement of account balance with account type and any relevant details",
        ),
        intent(
            "transaction_history",
            &[
                "transactions",
                "history",
                "recent transactions",
                "last transactions",
                "transaction history",
                "activity",
                "deposits",
                "withdrawals",
            ],
            r#"You are a helpful banking assistant for Ocean Bank. When asked about transaction history:
- Provide summary of recent transactions from the provided context
- Include dates, amounts, and descriptions where available
- Group transactions by type if helpful
- Be concise but informative
- Respect privacy and security
- Suggest viewing full history online if needed"#,
            &[
                "Show my recent transactions",
                "What are my last 5 transactions?",
                "Transaction history for this month",
            ],
            "List of recent transactions with dates, amounts, and descriptions",
        ),
        intent(
            "loan_details",
            &[
                "loan",
                "loans",
                "interest rate",
                "loan amount",
                "monthly payment",
                "loan terms",
                "credit",
                "borrow",
            ],
            r#"You are a helpful banking assistant for Ocean Bank. When asked about loans:
- Provide accurate loan information from the provided context
- Include interest rates, terms, eligibility, and application process
- Explain benefits and requirements clearly
- Be encouraging but realistic about approval
- Suggest speaking with loan officer for personalized advice"#,
            &[
                "What are the interest rates for personal loans?",
                "How do I apply for a mortgage?",
                "What loans do you offer?",
            ],
            "Detailed loan information including rates, terms, and requirements",
        ),
        intent(
            "account_services",
            &[
                "open account",
                "close account",
                "transfer",
                "online banking",
                "mobile app",
                "fees",
                "minimum balance",
                "services",
            ],
            r#"You are a helpful banking assistant for Ocean Bank. When asked about account services:
- Explain available services and features clearly
- Include fees, requirements, and benefits
- Provide step-by-step guidance for common tasks
- Highlight digital banking capabilities
- Direct to appropriate channels for complex requests"#,
            &[
                "How do I open a new account?",
                "What are the fees for online banking?",
                "How to transfer money between accounts?",
            ],
            "Clear explanation of services, fees, and how-to instructions",
        ),
        intent(
            "security_privacy",
            &[
                "security", "privacy", "safe", "protect", "fraud", "scam", "password", "login",
                "secure",
            ],
            r#"You are a helpful banking assistant for Ocean Bank. When asked about security and privacy:
- Emphasize the bank's commitment to security
- Provide tips for safe banking practices
- Explain encryption and protection measures
- Guide on reporting suspicious activity
- Be reassuring while being realistic about risks"#,
            &[
                "Is my money safe?",
                "How do you protect my information?",
                "What should I do if I suspect fraud?",
            ],
            "Security information, protection measures, and safety tips",
        ),
        intent(
            DEFAULT_FALLBACK_INTENT,
            &[
                "hours", "location", "contact", "branch", "atm", "help", "support", "general",
            ],
            r#"You are a helpful banking assistant for Ocean Bank. For general inquiries:
- Provide accurate information about bank operations
- Include contact information and locations
- Direct to appropriate resources or departments
- Be friendly and welcoming
- Offer additional assistance"#,
            &[
                "What are your branch hours?",
                "How can I contact customer service?",
                "Where is the nearest ATM?",
            ],
            "General bank information, contact details, and helpful resources",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn custom(id: &str, keywords: &[&str]) -> IntentDefinition {
        intent(id, keywords, &format!("{} instructions", id), &[], "")
    }

    #[test]
    fn test_banking_table_order() {
        let table = IntentTable::banking();
        let ids: Vec<&str> = table.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(
            ids,
            vec![
                "account_balance",
                "transaction_history",
                "loan_details",
                "account_services",
                "security_privacy",
                "general_inquiry",
            ]
        );
        assert_eq!(table.fallback().id, DEFAULT_FALLBACK_INTENT);
    }

    #[test]
    fn test_detect_is_case_insensitive() {
        let table = IntentTable::banking();
        assert_eq!(table.detect_intent("SHOW MY RECENT TRANSACTIONS"), "transaction_history");
        assert_eq!(table.detect_intent("Is there a Fraud alert?"), "security_privacy");
    }

    #[test]
    fn test_overlap_resolves_to_first_declared() {
        // "minimum balance" is an account_services keyword, but "balance"
        // belongs to account_balance which is declared first.
        let table = IntentTable::banking();
        assert_eq!(
            table.detect_intent("What is the minimum balance?"),
            "account_balance"
        );
    }

    #[test]
    fn test_custom_table_order_is_respected() {
        let table = IntentTable::new(
            vec![
                custom("first", &["account"]),
                custom("second", &["account", "card"]),
                custom("other", &["zzz"]),
            ],
            "other",
        )
        .unwrap();

        assert_eq!(table.detect_intent("my account card"), "first");
        assert_eq!(table.detect_intent("my card"), "second");
        assert_eq!(table.detect_intent("nothing here"), "other");
    }

    #[test]
    fn test_keywords_are_lowercased_at_construction() {
        let table = IntentTable::new(vec![custom("atm", &["ATM"])], "atm").unwrap();
        assert_eq!(table.get("atm").unwrap().keywords, vec!["atm".to_string()]);
    }

    #[test]
    fn test_unknown_intent_prompt_falls_back() {
        let table = IntentTable::banking();
        assert_eq!(
            table.get_intent_prompt("does_not_exist"),
            table.get_intent_prompt(DEFAULT_FALLBACK_INTENT)
        );
        assert_eq!(
            table.get_intent_examples("does_not_exist"),
            table.get_intent_examples(DEFAULT_FALLBACK_INTENT)
        );
    }

    #[test]
    fn test_new_rejects_missing_fallback() {
        let result = IntentTable::new(vec![custom("a", &["x"])], "b");
        assert!(matches!(result, Err(AppError::Configuration(_))));
    }

    #[test]
    fn test_new_rejects_duplicates_and_blank_keywords() {
        let dup = IntentTable::new(vec![custom("a", &["x"]), custom("a", &["y"])], "a");
        assert!(dup.is_err());

        let blank = IntentTable::new(vec![custom("a", &["  "])], "a");
        assert!(blank.is_err());

        let empty = IntentTable::new(vec![], "a");
        assert!(empty.is_err());
    }
}
