//! Final report assembly: dominant behavioral tags, optional resolution of
//! recommended identifiers to full catalog records, and the merged report
//! structure. Pure and deterministic; running it twice on the same inputs
//! yields byte-identical output.

use serde_json::{json, Value};

use crate::schema::{
    CategoryRecommendations, EmailSubjects, FinalReport, MonthlySummary, ProductCatalog,
    ProductCategory, RecommendationResult, UserInfo,
};

/// The two most frequent behavioral tags across all monthly summaries.
/// Ties break toward the first-encountered tag (stable sort). When fewer
/// than two distinct tags exist, the most recent month's tags backfill the
/// remaining slots, skipping duplicates; the result may hold 0, 1 or 2 tags.
pub fn dominant_tags(summaries: &[MonthlySummary]) -> Vec<String> {
    let mut counts: Vec<(String, usize)> = Vec::new();
    for summary in summaries {
        for tag in &summary.tags {
            match counts.iter_mut().find(|(known, _)| known == tag) {
                Some(entry) => entry.1 += 1,
                None => counts.push((tag.clone(), 1)),
            }
        }
    }

    counts.sort_by_key(|(_, count)| std::cmp::Reverse(*count));

    let mut tags: Vec<String> = counts.into_iter().take(2).map(|(tag, _)| tag).collect();

    if tags.len() < 2 {
        if let Some(latest) = summaries.last() {
            for tag in &latest.tags {
                if tags.len() == 2 {
                    break;
                }
                if !tags.contains(tag) {
                    tags.push(tag.clone());
                }
            }
        }
    }

    tags
}

/// Single-field stand-in for an identifier the catalog does not know.
/// Keeps the recommendation list's positions and length intact.
fn placeholder(category: ProductCategory, identifier: &str) -> Value {
    json!({ category.placeholder_key(): identifier })
}

/// Resolves recommended identifiers to full catalog records, degrading
/// unmatched identifiers to placeholders rather than dropping them.
pub fn resolve_recommendations(
    category: ProductCategory,
    identifiers: &[String],
    catalog: &ProductCatalog,
) -> Vec<Value> {
    identifiers
        .iter()
        .map(|id| match catalog.find(category, id) {
            Some(product) => {
                serde_json::to_value(&product).unwrap_or_else(|_| placeholder(category, id))
            }
            None => placeholder(category, id),
        })
        .collect()
}

/// Recommendation identifiers carried through as bare strings.
pub fn bare_recommendations(identifiers: &[String]) -> Vec<Value> {
    identifiers.iter().map(|id| json!(id)).collect()
}

/// Merges everything into the final per-user report. When a catalog lookup
/// is supplied, recommendation lists carry resolved records; otherwise bare
/// identifiers.
pub fn build_final_report(
    user: &UserInfo,
    results: &[RecommendationResult],
    summaries: &[MonthlySummary],
    email_notifications: EmailSubjects,
    catalog: Option<&ProductCatalog>,
) -> FinalReport {
    let list_for = |category: ProductCategory| -> Vec<Value> {
        let identifiers = results
            .iter()
            .find(|r| r.category == category)
            .map(|r| r.recommendations.as_slice())
            .unwrap_or(&[]);
        match catalog {
            Some(catalog) => resolve_recommendations(category, identifiers, catalog),
            None => bare_recommendations(identifiers),
        }
    };

    FinalReport {
        userinfo: user.clone(),
        tags: dominant_tags(summaries),
        recommendations: CategoryRecommendations {
            coupons: list_for(ProductCategory::Coupons),
            loans: list_for(ProductCategory::Loans),
            credit_cards: list_for(ProductCategory::CreditCards),
            high_yield_savings: list_for(ProductCategory::Savings),
        },
        monthly_spend_analysis_data: summaries.to_vec(),
        email_notifications,
    }
}
