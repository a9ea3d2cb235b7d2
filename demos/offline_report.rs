//! Runs the whole pipeline against canned model responses, so the report
//! shape can be inspected without credentials or network access.

use std::time::Duration;

use async_trait::async_trait;
use finance_recommender::*;

struct ReplayGenerator;

#[async_trait]
impl TextGenerator for ReplayGenerator {
    async fn generate(&self, system_prompt: &str, user_prompt: &str) -> Result<String> {
        if system_prompt.contains("coupon recommendation agent") {
            return Ok(r#"{"recommendations": ["CO2", "CO1"], "email_subject": "Kroger runs, 10% cheaper"}"#.to_string());
        }
        if system_prompt.contains("loan recommendation agent") {
            return Ok(r#"{"recommendations": ["LN1"], "email_subject": "A 5.2% APR with your name on it"}"#.to_string());
        }
        if system_prompt.contains("credit card recommendation agent") {
            return Ok(r#"{"recommendations": ["CC1"], "email_subject": "That $200 bonus is waiting"}"#.to_string());
        }
        if system_prompt.contains("savings account recommendation agent") {
            return Ok(r#"{"recommendations": ["HY1"], "email_subject": "4.25% APY beats your mattress"}"#.to_string());
        }
        if system_prompt.contains("financial summary agent") {
            let month = if user_prompt.contains("2023-02") { "02" } else { "01" };
            return Ok(format!(
                r#"{{
                    "month": "{}", "year": "2023",
                    "ai_summary": "You spent about 62% of your income. Dining out is your biggest lever.",
                    "tags": ["Foodie", "Saver"],
                    "categories_expenses": {{
                        "total_income": "-4000", "food": "900", "food_%": "22.5%",
                        "total_spending": "2480", "total_spending_%": "62%"
                    }}
                }}"#,
                month
            ));
        }
        // email marketing agent
        Ok(r#"{
            "spending_summary_email": "Avery, January went 62% fast",
            "coupons_email": "Kroger called. It wants 10% less of your money",
            "loans_email": "5.2% APR says hi",
            "credit_cards_email": "One swipe from a $200 bonus",
            "savings_email": "Your money could earn 4.25%"
        }"#
        .to_string())
    }
}

fn sample_rows() -> Vec<RawTransaction> {
    [
        ("T1", -4000.0, "2023-01-01", "INCOME_WAGES", "ACH", "Acme Corp"),
        ("T2", 900.0, "2023-01-08", "FOOD_AND_DRINK_GROCERIES", "Debit Card", "Kroger"),
        ("T3", 60.0, "2023-01-15", "ENTERTAINMENT_TV_AND_MOVIES", "Credit Card", "Netflix"),
        ("T4", -4000.0, "2023-02-01", "INCOME_WAGES", "ACH", "Acme Corp"),
        ("T5", 340.0, "2023-02-12", "FOOD_AND_DRINK_RESTAURANT", "Credit Card", "Nobu"),
    ]
    .iter()
    .map(|(id, amount, date, category, mode, merchant)| RawTransaction {
        txn_id: id.to_string(),
        user_id: "U1".into(),
        amount: *amount,
        date: date.to_string(),
        category: category.to_string(),
        mode: mode.to_string(),
        merchant: merchant.to_string(),
    })
    .collect()
}

fn sample_catalog() -> ProductCatalog {
    ProductCatalog {
        coupons: vec![
            Coupon {
                coupon_id: "CO1".into(),
                merchant_name: "Target".into(),
                category: "shopping".into(),
                discount_percentage: "20%".into(),
                expiry_date: "2023-12-31".into(),
                description: String::new(),
            },
            Coupon {
                coupon_id: "CO2".into(),
                merchant_name: "Kroger".into(),
                category: "groceries".into(),
                discount_percentage: "10%".into(),
                expiry_date: "2023-09-30".into(),
                description: String::new(),
            },
        ],
        loans: vec![Loan {
            loan_id: "LN1".into(),
            bank_name: "First National".into(),
            loan_type: "personal".into(),
            interest_rate_range: "5.2%-8.9%".into(),
            minimum_amount: "1000".into(),
            maximum_amount: "25000".into(),
        }],
        credit_cards: vec![CreditCard {
            card_id: "CC1".into(),
            card_name: "Everyday Cash".into(),
            issuer: "Chase".into(),
            rewards_rate: "1.5% on everything".into(),
            welcome_bonus: "$200 after $500 spend".into(),
            annual_fee: "$0".into(),
        }],
        savings: vec![SavingsAccount {
            id: "HY1".into(),
            bank_name: "Ally".into(),
            account_name: "Online Savings".into(),
            apy: "4.25%".into(),
            minimum_balance: "$0".into(),
        }],
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let user = UserInfo {
        user_id: "U1".into(),
        user_name: "Avery Quinn".into(),
        age: 29,
        credit_score: 760,
        financial_goals: "Build an emergency fund".into(),
        email: "avery@example.com".into(),
    };

    let generator = ReplayGenerator;
    let pipeline =
        RecommendationPipeline::new(&generator, Duration::from_secs(5)).with_resolved_products();

    let report = pipeline
        .run_user(&user, &sample_rows(), &sample_catalog(), &[])
        .await;

    println!("{}", serde_json::to_string_pretty(&report)?);

    println!("\nKey-value item (nested, floats as decimals):");
    let item = kv_item(&user.user_id, &report, false)?;
    println!("{}", serde_json::to_string_pretty(&item)?);

    Ok(())
}
