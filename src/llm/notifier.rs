//! Email subject synthesis: one service call combining the top
//! recommendation per category, resolved product details, spending insights
//! and the user's financial persona into five marketing subject lines.

use log::warn;
use serde_json::{json, Map, Value};

use crate::error::Result;
use crate::llm::generate::TextGenerator;
use crate::llm::parsing::decode_response;
use crate::llm::prompts::EMAIL_NOTIFICATION_SYSTEM_PROMPT;
use crate::profile::{create_financial_profile, extract_spending_insights};
use crate::schema::{
    EmailSubjects, MonthlySummary, Product, ProductCatalog, ProductCategory, RecommendationResult,
    UserInfo,
};

/// Full catalog record for a top recommendation, annotated with the
/// category-specific key-feature string the subject lines quote.
fn enhanced_product_details(product: &Product) -> Value {
    let mut details = match serde_json::to_value(product) {
        Ok(Value::Object(map)) => map,
        _ => Map::new(),
    };
    details.insert("key_feature".to_string(), json!(product.key_feature()));

    match product {
        Product::Coupon(c) => {
            details.insert("urgency".to_string(), json!(c.expiry_date));
        }
        Product::Loan(l) => {
            details.insert(
                "loan_range".to_string(),
                json!(format!("${}-${}", l.minimum_amount, l.maximum_amount)),
            );
        }
        _ => {}
    }

    Value::Object(details)
}

fn detail_key(category: ProductCategory) -> &'static str {
    match category {
        ProductCategory::Coupons => "top_coupon",
        ProductCategory::Loans => "top_loan",
        ProductCategory::CreditCards => "top_credit_card",
        ProductCategory::Savings => "top_savings",
    }
}

/// Assembles the structured context for the subject-line call. Categories
/// with an empty recommendation list are omitted from the top-recommendation
/// map; identifiers the catalog does not know contribute an empty detail
/// object.
pub fn build_notification_context(
    user: &UserInfo,
    results: &[RecommendationResult],
    summaries: &[MonthlySummary],
    catalog: &ProductCatalog,
) -> Result<String> {
    let mut top_recommendations = Map::new();
    let mut product_details = Map::new();

    for result in results {
        let Some(top_id) = result.recommendations.first() else {
            continue;
        };
        top_recommendations.insert(result.category.report_key().to_string(), json!(top_id));

        let details = catalog
            .find(result.category, top_id)
            .map(|product| enhanced_product_details(&product))
            .unwrap_or_else(|| Value::Object(Map::new()));
        product_details.insert(detail_key(result.category).to_string(), details);
    }

    let insights = extract_spending_insights(summaries)
        .map(|i| json!(i))
        .unwrap_or_else(|| Value::Object(Map::new()));
    let profile = create_financial_profile(user, summaries);
    let first_name = user.user_name.split(' ').next().unwrap_or("").to_string();

    let context = json!({
        "user_info": user,
        "user_financial_profile": profile,
        "spending_insights": insights,
        "top_recommendations": top_recommendations,
        "monthly_summaries": summaries,
        "product_details": product_details,
        "personalization_context": {
            "first_name": first_name,
            "credit_score": user.credit_score,
            "financial_goals": user.financial_goals,
            "age": user.age,
        },
    });

    Ok(format!(
        "Context: {}\n\n\
         Generate the five email subject lines for this user.",
        serde_json::to_string_pretty(&context)?
    ))
}

/// The fallback subject set: the per-category subjects already produced by
/// the requesters (themselves defaulted when that call degraded) plus the
/// fixed spending-summary subject.
pub fn fallback_subjects(results: &[RecommendationResult]) -> EmailSubjects {
    let mut subjects = EmailSubjects::default();
    for result in results {
        match result.category {
            ProductCategory::Coupons => subjects.coupons_email = result.email_subject.clone(),
            ProductCategory::Loans => subjects.loans_email = result.email_subject.clone(),
            ProductCategory::CreditCards => {
                subjects.credit_cards_email = result.email_subject.clone()
            }
            ProductCategory::Savings => subjects.savings_email = result.email_subject.clone(),
        }
    }
    subjects
}

/// Decodes the five-field response. Each field falls back independently:
/// a response missing one key keeps the other four; an undecodable response
/// falls back wholesale.
pub fn parse_subjects_response(response: &str, fallback: &EmailSubjects) -> EmailSubjects {
    let decoded = match decode_response::<Value>(response) {
        Ok(value) => value,
        Err(e) => {
            warn!("Email subject response did not decode, using fallbacks: {}", e);
            return fallback.clone();
        }
    };

    let field = |key: &str, fallback_value: &str| -> String {
        decoded
            .get(key)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| fallback_value.to_string())
    };

    EmailSubjects {
        spending_summary_email: field("spending_summary_email", &fallback.spending_summary_email),
        coupons_email: field("coupons_email", &fallback.coupons_email),
        loans_email: field("loans_email", &fallback.loans_email),
        credit_cards_email: field("credit_cards_email", &fallback.credit_cards_email),
        savings_email: field("savings_email", &fallback.savings_email),
    }
}

/// Runs the synthesizer: one service call, parse-or-fallback.
pub async fn generate_email_subjects(
    generator: &dyn TextGenerator,
    user: &UserInfo,
    results: &[RecommendationResult],
    summaries: &[MonthlySummary],
    catalog: &ProductCatalog,
) -> EmailSubjects {
    let fallback = fallback_subjects(results);

    let context = match build_notification_context(user, results, summaries, catalog) {
        Ok(context) => context,
        Err(e) => {
            warn!("Could not serialize notification context: {}", e);
            return fallback;
        }
    };

    match generator
        .generate(EMAIL_NOTIFICATION_SYSTEM_PROMPT, &context)
        .await
    {
        Ok(response) => parse_subjects_response(&response, &fallback),
        Err(e) => {
            warn!("Email subject call failed, using fallbacks: {}", e);
            fallback
        }
    }
}
