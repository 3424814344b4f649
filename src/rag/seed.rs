//! Sample knowledge base for local development and demos.

use crate::rag::index::DocumentIndex;
use crate::types::{Document, Result};

const SAMPLE_BODIES: [&str; 8] = [
    "The Platinum Savings Account offers a competitive 2.5% annual interest rate on balances exceeding $10,000. A minimum balance of $1,000 is required to avoid a monthly maintenance fee of $10.",
    "Our Basic Checking Account is completely free, with no monthly fees or minimum balance requirements. It also includes complimentary online bill pay and a debit card.",
    "Ocean Bank offers personal loans with interest rates starting as low as 5.99% APR. Repayment terms are flexible, ranging from 24 to 60 months, depending on your creditworthiness.",
    "Applying for a mortgage is simple. We offer both fixed-rate and variable-rate options. A minimum credit score of 620 is typically required to qualify for our best rates.",
    "Our customer service center is available to help you 24/7. You can reach us by calling 1-800-5642-4541, emailing support@oceanbank.com, or using the live chat feature in our mobile app.",
    "Your security is our top priority. We utilize multi-factor authentication and state-of-the-art encryption to safeguard your personal and financial information.",
    "The Ocean Bank mobile app provides secure access to your accounts using fingerprint or face recognition. You can check balances, deposit checks, and transfer funds with just a few taps.",
    "You can easily view your transaction history for the last 24 months through our online banking portal or directly in the mobile app. Statements are generated monthly.",
];

/// The sample banking documents, with ids `doc_1` through `doc_8`.
pub fn sample_documents() -> Vec<Document> {
    SAMPLE_BODIES
        .iter()
        .enumerate()
        .map(|(i, body)| Document::new(format!("doc_{}", i + 1), *body))
        .collect()
}

/// Load the sample documents into `index`. Re-seeding replaces them in place.
pub async fn seed_sample_documents(index: &DocumentIndex) -> Result<usize> {
    let added = index.add_documents(sample_documents()).await?;
    tracing::info!(
        "Seeded {} sample documents into '{}'",
        added,
        index.collection()
    );
    Ok(added)
}
