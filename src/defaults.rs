//! Degraded-mode defaults, collected in one place instead of being scattered
//! across the call sites that need them. Whenever a model response cannot be
//! decoded, the pipeline substitutes these values and keeps going.

use crate::schema::ProductCategory;

/// Fallback identifier triple and subject line for one category.
#[derive(Debug, Clone, Copy)]
pub struct CategoryDefaults {
    pub recommendations: [&'static str; 3],
    pub email_subject: &'static str,
}

/// The documented default triple and subject for a category.
pub fn for_category(category: ProductCategory) -> CategoryDefaults {
    match category {
        ProductCategory::Coupons => CategoryDefaults {
            recommendations: ["CO1", "CO2", "CO3"],
            email_subject: "Great Savings Await You!",
        },
        ProductCategory::Loans => CategoryDefaults {
            recommendations: ["LN1", "LN2", "LN3"],
            email_subject: "Perfect Loan Options For You!",
        },
        ProductCategory::CreditCards => CategoryDefaults {
            recommendations: ["CC1", "CC2", "CC3"],
            email_subject: "Amazing Credit Card Benefits!",
        },
        ProductCategory::Savings => CategoryDefaults {
            recommendations: ["HY1", "HY2", "HY3"],
            email_subject: "Grow Your Money Faster!",
        },
    }
}

impl CategoryDefaults {
    pub fn recommendation_ids(&self) -> Vec<String> {
        self.recommendations.iter().map(|s| s.to_string()).collect()
    }
}

pub fn spending_summary_subject() -> String {
    "Your Monthly Financial Insights Are Ready!".to_string()
}

pub fn coupons_subject() -> String {
    for_category(ProductCategory::Coupons).email_subject.to_string()
}

pub fn loans_subject() -> String {
    for_category(ProductCategory::Loans).email_subject.to_string()
}

pub fn credit_cards_subject() -> String {
    for_category(ProductCategory::CreditCards)
        .email_subject
        .to_string()
}

pub fn savings_subject() -> String {
    for_category(ProductCategory::Savings).email_subject.to_string()
}
