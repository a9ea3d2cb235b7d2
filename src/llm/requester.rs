//! Recommendation requesters, one invocation per product category.
//!
//! Each invocation serializes a bounded excerpt of the user's context into a
//! fixed instruction, calls the text-generation service exactly once, and
//! decodes the returned text. Any failure on that path degrades to the
//! category's documented defaults; it is never surfaced as an error.

use log::{debug, warn};

use crate::defaults;
use crate::error::Result;
use crate::llm::generate::TextGenerator;
use crate::llm::parsing::decode_response;
use crate::llm::prompts::recommendation_system_prompt;
use crate::schema::{
    Product, ProductCategory, RecommendationResponse, RecommendationResult, Transaction, UserInfo,
};

/// Payload bounds keeping the serialized context within a sane token budget.
const TRANSACTION_PAYLOAD_LIMIT: usize = 10;
const PRODUCT_PAYLOAD_LIMIT: usize = 5;

/// Inputs to one category requester invocation.
#[derive(Debug, Clone)]
pub struct RecommendationRequest<'a> {
    pub category: ProductCategory,
    pub user: &'a UserInfo,
    pub transactions: &'a [Transaction],
    pub products: Vec<Product>,
}

/// Assembles the per-call user instruction: serialized JSON excerpts of the
/// three inputs, bounded to the first 10 transactions and 5 catalog entries.
pub fn build_user_context(request: &RecommendationRequest<'_>) -> Result<String> {
    let transactions = &request.transactions[..request.transactions.len().min(TRANSACTION_PAYLOAD_LIMIT)];
    let products = &request.products[..request.products.len().min(PRODUCT_PAYLOAD_LIMIT)];

    Ok(format!(
        "User Information: {}\n\
         Transaction Data: {}\n\
         Available Products: {}\n\n\
         Please analyze the user's financial behavior and recommend suitable products.",
        serde_json::to_string_pretty(request.user)?,
        serde_json::to_string_pretty(transactions)?,
        serde_json::to_string_pretty(products)?,
    ))
}

/// Decodes one requester response, truncating the identifier list to 3.
/// Decode failure or missing keys yield the category defaults.
pub fn parse_recommendation_response(
    category: ProductCategory,
    response: &str,
) -> RecommendationResult {
    match decode_response::<RecommendationResponse>(response) {
        Ok(decoded) => {
            let mut recommendations = decoded.recommendations;
            recommendations.truncate(3);
            let email_subject = if decoded.email_subject.is_empty() {
                defaults::for_category(category).email_subject.to_string()
            } else {
                decoded.email_subject
            };
            RecommendationResult {
                category,
                recommendations,
                email_subject,
            }
        }
        Err(e) => {
            warn!(
                "Falling back to default {} recommendations: {}",
                category.label(),
                e
            );
            default_result(category)
        }
    }
}

/// The category's degraded-mode result.
pub fn default_result(category: ProductCategory) -> RecommendationResult {
    let defaults = defaults::for_category(category);
    RecommendationResult {
        category,
        recommendations: defaults.recommendation_ids(),
        email_subject: defaults.email_subject.to_string(),
    }
}

/// Runs one category requester: a single synchronous call to the service,
/// then parse-or-default. Transport errors degrade like decode errors.
pub async fn request_recommendations(
    generator: &dyn TextGenerator,
    request: &RecommendationRequest<'_>,
) -> RecommendationResult {
    let context = match build_user_context(request) {
        Ok(context) => context,
        Err(e) => {
            warn!(
                "Could not serialize {} request context: {}",
                request.category.label(),
                e
            );
            return default_result(request.category);
        }
    };

    debug!(
        "Requesting {} recommendations ({} transactions, {} products in payload)",
        request.category.label(),
        request.transactions.len().min(TRANSACTION_PAYLOAD_LIMIT),
        request.products.len().min(PRODUCT_PAYLOAD_LIMIT)
    );

    match generator
        .generate(recommendation_system_prompt(request.category), &context)
        .await
    {
        Ok(response) => parse_recommendation_response(request.category, &response),
        Err(e) => {
            warn!(
                "{} recommendation call failed, using defaults: {}",
                request.category.label(),
                e
            );
            default_result(request.category)
        }
    }
}
