//! Secondary context derived before email subject synthesis: spending
//! insights from the latest monthly summary and a coarse financial persona
//! for the user.

use regex::Regex;
use serde::Serialize;
use serde_json::Value;

use crate::schema::{MonthlySummary, UserInfo};

/// Lenient numeric parse for breakdown values, which arrive as model output
/// in shapes like `"$1,234.50"`, `"59.94%"` or plain numbers.
pub fn safe_float(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => {
            let cleaned: String = s
                .chars()
                .filter(|c| !matches!(c, '$' | ',' | '"' | '%' | ' '))
                .collect();
            cleaned.parse().unwrap_or(0.0)
        }
        _ => 0.0,
    }
}

/// Key spending figures pulled from the most recent monthly summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpendingInsights {
    pub latest_month_year: String,
    pub total_spending: f64,
    pub total_income: f64,
    pub spending_ratio: f64,
    /// Top expense categories by dollar amount, descending, at most 3.
    pub top_categories: Vec<(String, f64)>,
    /// Income minus spending for the latest month.
    pub savings_potential: f64,
    pub key_highlights: Vec<String>,
}

pub fn extract_spending_insights(summaries: &[MonthlySummary]) -> Option<SpendingInsights> {
    let latest = summaries.last()?;
    let breakdown = &latest.categories_expenses;

    let total_spending = breakdown.get("total_spending").map(safe_float).unwrap_or(0.0);
    let total_income = breakdown
        .get("total_income")
        .map(safe_float)
        .unwrap_or(0.0)
        .abs();
    let spending_ratio = breakdown
        .get("total_spending_%")
        .map(safe_float)
        .unwrap_or(0.0);

    let mut category_amounts: Vec<(String, f64)> = breakdown
        .iter()
        .filter(|(key, _)| !key.ends_with("_%") && !key.starts_with("total_"))
        .map(|(key, value)| (key.clone(), safe_float(value)))
        .filter(|(_, amount)| *amount > 0.0)
        .collect();
    category_amounts.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    category_amounts.truncate(3);

    Some(SpendingInsights {
        latest_month_year: format!("{}/{}", latest.month, latest.year),
        total_spending,
        total_income,
        spending_ratio,
        top_categories: category_amounts,
        savings_potential: total_income - total_spending,
        key_highlights: extract_highlights(&latest.ai_summary),
    })
}

/// Pulls the first percentage and dollar figure out of the narrative so the
/// subject generator can quote concrete numbers.
fn extract_highlights(narrative: &str) -> Vec<String> {
    let mut highlights = Vec::new();
    if narrative.is_empty() {
        return highlights;
    }

    if let Ok(re) = Regex::new(r"(\d+\.?\d*)%") {
        if let Some(cap) = re.captures(narrative) {
            highlights.push(format!("spending at {}% of income", &cap[1]));
        }
    }
    if let Ok(re) = Regex::new(r"\$(\d+[,\d]*\.?\d*)") {
        if let Some(cap) = re.captures(narrative) {
            highlights.push(format!("${} in expenses", &cap[1]));
        }
    }
    highlights
}

/// Coarse persona classification combining credit tier, life stage, goal
/// keywords and the latest month's spending-to-income ratio.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FinancialProfile {
    pub credit_tier: &'static str,
    pub life_stage: &'static str,
    pub spending_style: &'static str,
    pub savings_priority: &'static str,
    pub risk_tolerance: &'static str,
}

pub fn create_financial_profile(
    user: &UserInfo,
    summaries: &[MonthlySummary],
) -> FinancialProfile {
    let credit_tier = match user.credit_score {
        s if s >= 750 => "excellent",
        s if s >= 700 => "good",
        s if s >= 650 => "fair",
        _ => "poor",
    };

    let life_stage = match user.age {
        a if a < 30 => "young_professional",
        a if a < 45 => "working_professional",
        a if a < 65 => "pre_retirement",
        _ => "retirement",
    };

    let goals = user.financial_goals.to_lowercase();
    let mut savings_priority = "medium";
    let mut risk_tolerance = "moderate";
    if goals.contains("emergency") || goals.contains("save") {
        savings_priority = "high";
    } else if goals.contains("investment") || goals.contains("retirement") {
        risk_tolerance = "aggressive";
    } else if goals.contains("debt") || goals.contains("pay") {
        savings_priority = "debt_focused";
    }

    let spending_style = match summaries.last() {
        Some(latest) => {
            let ratio = latest
                .categories_expenses
                .get("total_spending_%")
                .map(safe_float)
                .unwrap_or(0.0);
            if ratio > 80.0 {
                "high_spender"
            } else if ratio < 50.0 {
                "saver"
            } else {
                "balanced"
            }
        }
        None => "balanced",
    };

    FinancialProfile {
        credit_tier,
        life_stage,
        spending_style,
        savings_priority,
        risk_tolerance,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::BTreeMap;

    fn summary_with_breakdown(pairs: &[(&str, Value)]) -> MonthlySummary {
        let mut breakdown = BTreeMap::new();
        for (key, value) in pairs {
            breakdown.insert(key.to_string(), value.clone());
        }
        MonthlySummary {
            month: "06".into(),
            year: "2023".into(),
            ai_summary: "You spent 62.5% of your income, about $2,480 in expenses.".into(),
            tags: vec!["Foodie".into(), "Saver".into()],
            categories_expenses: breakdown,
        }
    }

    fn user(credit_score: u32, age: u32, goals: &str) -> UserInfo {
        UserInfo {
            user_id: "U1".into(),
            user_name: "Avery Quinn".into(),
            age,
            credit_score,
            financial_goals: goals.into(),
            email: "avery@example.com".into(),
        }
    }

    #[test]
    fn test_safe_float_strips_currency_noise() {
        assert_eq!(safe_float(&json!("$1,234.50")), 1234.5);
        assert_eq!(safe_float(&json!("59.94%")), 59.94);
        assert_eq!(safe_float(&json!(42)), 42.0);
        assert_eq!(safe_float(&json!("garbage")), 0.0);
        assert_eq!(safe_float(&json!(null)), 0.0);
    }

    #[test]
    fn test_insights_from_latest_month() {
        let summaries = vec![summary_with_breakdown(&[
            ("total_income", json!("-4000")),
            ("total_spending", json!("2500")),
            ("total_spending_%", json!("62.5%")),
            ("food", json!("900")),
            ("food_%", json!("22.5%")),
            ("transportation", json!("400")),
            ("entertainment", json!("1200")),
        ])];

        let insights = extract_spending_insights(&summaries).unwrap();
        assert_eq!(insights.latest_month_year, "06/2023");
        assert_eq!(insights.total_income, 4000.0);
        assert_eq!(insights.total_spending, 2500.0);
        assert_eq!(insights.savings_potential, 1500.0);
        assert_eq!(
            insights.top_categories,
            vec![
                ("entertainment".to_string(), 1200.0),
                ("food".to_string(), 900.0),
                ("transportation".to_string(), 400.0)
            ]
        );
        assert_eq!(
            insights.key_highlights,
            vec![
                "spending at 62.5% of income".to_string(),
                "$2,480 in expenses".to_string()
            ]
        );
    }

    #[test]
    fn test_insights_empty_summaries() {
        assert!(extract_spending_insights(&[]).is_none());
    }

    #[test]
    fn test_credit_tiers_and_life_stages() {
        let profile = create_financial_profile(&user(780, 27, ""), &[]);
        assert_eq!(profile.credit_tier, "excellent");
        assert_eq!(profile.life_stage, "young_professional");

        let profile = create_financial_profile(&user(710, 40, ""), &[]);
        assert_eq!(profile.credit_tier, "good");
        assert_eq!(profile.life_stage, "working_professional");

        let profile = create_financial_profile(&user(660, 50, ""), &[]);
        assert_eq!(profile.credit_tier, "fair");
        assert_eq!(profile.life_stage, "pre_retirement");

        let profile = create_financial_profile(&user(600, 70, ""), &[]);
        assert_eq!(profile.credit_tier, "poor");
        assert_eq!(profile.life_stage, "retirement");
    }

    #[test]
    fn test_goal_keywords() {
        let profile = create_financial_profile(&user(700, 35, "Build an emergency fund"), &[]);
        assert_eq!(profile.savings_priority, "high");

        let profile = create_financial_profile(&user(700, 35, "Retirement investing"), &[]);
        assert_eq!(profile.risk_tolerance, "aggressive");
        assert_eq!(profile.savings_priority, "medium");

        let profile = create_financial_profile(&user(700, 35, "Pay down student debt"), &[]);
        assert_eq!(profile.savings_priority, "debt_focused");
    }

    #[test]
    fn test_spending_style_bands() {
        let high = vec![summary_with_breakdown(&[("total_spending_%", json!("85%"))])];
        assert_eq!(
            create_financial_profile(&user(700, 35, ""), &high).spending_style,
            "high_spender"
        );

        let saver = vec![summary_with_breakdown(&[("total_spending_%", json!("40%"))])];
        assert_eq!(
            create_financial_profile(&user(700, 35, ""), &saver).spending_style,
            "saver"
        );

        let balanced = vec![summary_with_breakdown(&[("total_spending_%", json!("65%"))])];
        assert_eq!(
            create_financial_profile(&user(700, 35, ""), &balanced).spending_style,
            "balanced"
        );
    }
}
