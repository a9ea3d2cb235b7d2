use std::collections::BTreeMap;
use std::fmt;

use chrono::{Datelike, NaiveDate};
use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::defaults;

/// Transaction category whose amounts are negative by convention (income).
/// Every other category carries non-negative amounts; downstream income and
/// expense totals rely on this sign split.
pub const INCOME_CATEGORY: &str = "INCOME_WAGES";

/// Demographic and financial attributes for one user, read from the
/// `user.csv` table. Field names at the serde boundary match the source feed
/// so the assembled report carries the record through unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserInfo {
    #[serde(rename = "User_id", alias = "User Id")]
    pub user_id: String,

    #[serde(rename = "User_name", alias = "Name", default)]
    pub user_name: String,

    #[serde(rename = "Age", default)]
    pub age: u32,

    #[serde(rename = "Credit_score", default)]
    pub credit_score: u32,

    #[serde(rename = "Financial_goals", default)]
    pub financial_goals: String,

    #[serde(rename = "Email", default)]
    pub email: String,
}

/// One row of the raw transaction feed. The aliases form the rename map for
/// feeds that use spaced or long-form column headers.
#[derive(Debug, Clone, Deserialize)]
pub struct RawTransaction {
    #[serde(rename = "Txn ID", alias = "Txn Id", alias = "Transaction ID", default)]
    pub txn_id: String,

    #[serde(rename = "User_id", alias = "User Id")]
    pub user_id: String,

    #[serde(rename = "Txn Amount", alias = "Amount")]
    pub amount: f64,

    #[serde(rename = "Txn Date", alias = "Transaction Date", alias = "Date")]
    pub date: String,

    #[serde(rename = "Txn Category", alias = "Category")]
    pub category: String,

    #[serde(rename = "Txn Mode", alias = "Mode", default)]
    pub mode: String,

    #[serde(rename = "Merchant Name", alias = "Merchant", default)]
    pub merchant: String,
}

/// Year-month grouping key derived from a transaction date. Never persisted;
/// recomputed each run. Serializes as `YYYY-MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthBucket {
    pub year: i32,
    pub month: u32,
}

impl MonthBucket {
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Zero-padded month component, e.g. `"01"`.
    pub fn month_str(&self) -> String {
        format!("{:02}", self.month)
    }

    pub fn year_str(&self) -> String {
        format!("{:04}", self.year)
    }
}

impl fmt::Display for MonthBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl Serialize for MonthBucket {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for MonthBucket {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        let (year, month) = s
            .split_once('-')
            .ok_or_else(|| serde::de::Error::custom(format!("invalid month bucket: {}", s)))?;
        Ok(Self {
            year: year.parse().map_err(serde::de::Error::custom)?,
            month: month.parse().map_err(serde::de::Error::custom)?,
        })
    }
}

/// A normalized transaction as sent downstream: relevant fields only, date as
/// an ISO string for JSON encoding, month bucket precomputed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub amount: f64,

    /// ISO `YYYY-MM-DD`.
    pub date: String,

    pub category: String,

    #[serde(default)]
    pub mode: String,

    #[serde(default)]
    pub merchant: String,

    #[serde(rename = "month_year")]
    pub bucket: MonthBucket,
}

/// The four recommendation categories the pipeline serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductCategory {
    Coupons,
    Loans,
    CreditCards,
    Savings,
}

impl ProductCategory {
    pub const ALL: [ProductCategory; 4] = [
        ProductCategory::Coupons,
        ProductCategory::Loans,
        ProductCategory::CreditCards,
        ProductCategory::Savings,
    ];

    /// Key under `recommendations` in the final report.
    pub fn report_key(self) -> &'static str {
        match self {
            ProductCategory::Coupons => "coupons",
            ProductCategory::Loans => "loans",
            ProductCategory::CreditCards => "credit_cards",
            ProductCategory::Savings => "high_yield_savings",
        }
    }

    /// Field name used for the single-field placeholder object when a
    /// recommended identifier is absent from the catalog.
    pub fn placeholder_key(self) -> &'static str {
        match self {
            ProductCategory::Coupons => "Coupon_id",
            ProductCategory::Loans => "Loan_id",
            ProductCategory::CreditCards => "Card_id",
            ProductCategory::Savings => "Savings_id",
        }
    }

    /// Human label used in prompts and log lines.
    pub fn label(self) -> &'static str {
        match self {
            ProductCategory::Coupons => "coupon",
            ProductCategory::Loans => "loan",
            ProductCategory::CreditCards => "credit card",
            ProductCategory::Savings => "high-yield savings account",
        }
    }
}

impl fmt::Display for ProductCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.report_key())
    }
}

fn default_fee() -> String {
    "$0".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coupon {
    pub coupon_id: String,
    pub merchant_name: String,
    #[serde(default)]
    pub category: String,
    pub discount_percentage: String,
    #[serde(default)]
    pub expiry_date: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Loan {
    pub loan_id: String,
    pub bank_name: String,
    #[serde(default)]
    pub loan_type: String,
    pub interest_rate_range: String,
    #[serde(default)]
    pub minimum_amount: String,
    #[serde(default)]
    pub maximum_amount: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreditCard {
    pub card_id: String,
    #[serde(default)]
    pub card_name: String,
    pub issuer: String,
    #[serde(default)]
    pub rewards_rate: String,
    #[serde(default)]
    pub welcome_bonus: String,
    #[serde(default = "default_fee")]
    pub annual_fee: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavingsAccount {
    pub id: String,
    pub bank_name: String,
    #[serde(default)]
    pub account_name: String,
    pub apy: String,
    #[serde(default = "default_fee")]
    pub minimum_balance: String,
}

/// A catalog entry from any of the four product tables. The source tables
/// name their identifier columns inconsistently (`coupon_id`, `loan_id`,
/// `card_id`, `id`); this union normalizes access behind [`Product::identifier`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Product {
    Coupon(Coupon),
    Loan(Loan),
    CreditCard(CreditCard),
    Savings(SavingsAccount),
}

impl Product {
    pub fn category(&self) -> ProductCategory {
        match self {
            Product::Coupon(_) => ProductCategory::Coupons,
            Product::Loan(_) => ProductCategory::Loans,
            Product::CreditCard(_) => ProductCategory::CreditCards,
            Product::Savings(_) => ProductCategory::Savings,
        }
    }

    pub fn identifier(&self) -> &str {
        match self {
            Product::Coupon(c) => &c.coupon_id,
            Product::Loan(l) => &l.loan_id,
            Product::CreditCard(c) => &c.card_id,
            Product::Savings(s) => &s.id,
        }
    }

    /// Short marketing-relevant summary of the entry, used as context for
    /// email subject generation.
    pub fn key_feature(&self) -> String {
        match self {
            Product::Coupon(c) => {
                format!("{} off at {}", c.discount_percentage, c.merchant_name)
            }
            Product::Loan(l) => format!("{} APR from {}", l.interest_rate_range, l.bank_name),
            Product::CreditCard(c) => {
                if !c.welcome_bonus.is_empty() {
                    c.welcome_bonus.clone()
                } else {
                    c.rewards_rate.clone()
                }
            }
            Product::Savings(s) => format!("{} APY at {}", s.apy, s.bank_name),
        }
    }
}

/// The four reference datasets the recommendation requesters select from.
#[derive(Debug, Clone, Default)]
pub struct ProductCatalog {
    pub coupons: Vec<Coupon>,
    pub loans: Vec<Loan>,
    pub credit_cards: Vec<CreditCard>,
    pub savings: Vec<SavingsAccount>,
}

impl ProductCatalog {
    pub fn products(&self, category: ProductCategory) -> Vec<Product> {
        match category {
            ProductCategory::Coupons => {
                self.coupons.iter().cloned().map(Product::Coupon).collect()
            }
            ProductCategory::Loans => self.loans.iter().cloned().map(Product::Loan).collect(),
            ProductCategory::CreditCards => self
                .credit_cards
                .iter()
                .cloned()
                .map(Product::CreditCard)
                .collect(),
            ProductCategory::Savings => {
                self.savings.iter().cloned().map(Product::Savings).collect()
            }
        }
    }

    pub fn find(&self, category: ProductCategory, identifier: &str) -> Option<Product> {
        self.products(category)
            .into_iter()
            .find(|p| p.identifier() == identifier)
    }
}

/// A row of the card-ownership table (`user_card.csv`). Cards a user already
/// holds are excluded from the credit-card requester's catalog slice.
#[derive(Debug, Clone, Deserialize)]
pub struct UserCard {
    #[serde(rename = "User_id", alias = "User Id")]
    pub user_id: String,
    #[serde(rename = "Card_id", alias = "Card Id")]
    pub card_id: String,
}

/// Advisory shape the recommendation requesters ask the model to return.
/// The service does not enforce it; the caller decodes and falls back to
/// category defaults when decoding fails.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RecommendationResponse {
    #[schemars(
        description = "Product identifiers from the provided catalog, ordered highest-confidence first. At most 3 entries."
    )]
    pub recommendations: Vec<String>,

    #[schemars(
        description = "Marketing email subject line for the top recommendation. Aim for 60 characters or fewer."
    )]
    #[serde(default)]
    pub email_subject: String,
}

impl RecommendationResponse {
    pub fn schema_as_json() -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&schemars::schema_for!(RecommendationResponse))
    }
}

/// One month's spending summary. Doubles as the advisory response shape for
/// the summarizer call; `month` and `year` stay strings to match the feed's
/// JSON contract (`"01"`, `"2023"`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct MonthlySummary {
    #[schemars(description = "Zero-padded month, e.g. \"01\"")]
    pub month: String,

    #[schemars(description = "Four-digit year, e.g. \"2023\"")]
    pub year: String,

    #[schemars(description = "Short narrative of spending patterns, addressed to the user")]
    pub ai_summary: String,

    #[schemars(
        description = "Exactly two short behavioral tags describing the month's dominant spending pattern"
    )]
    #[serde(default)]
    pub tags: Vec<String>,

    #[schemars(
        description = "Dollar totals per major category plus `<category>_%` percentage-of-income pairs, `total_income`, `total_spending` and `total_spending_%`"
    )]
    #[serde(default)]
    pub categories_expenses: BTreeMap<String, serde_json::Value>,
}

impl MonthlySummary {
    pub fn schema_as_json() -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&schemars::schema_for!(MonthlySummary))
    }
}

/// The five synthesized email subject lines. Each field defaults
/// independently: a response missing one key keeps the other four.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct EmailSubjects {
    #[serde(default = "defaults::spending_summary_subject")]
    #[schemars(description = "Subject for the monthly spending summary email")]
    pub spending_summary_email: String,

    #[serde(default = "defaults::coupons_subject")]
    #[schemars(description = "Subject for the coupon recommendation email")]
    pub coupons_email: String,

    #[serde(default = "defaults::loans_subject")]
    #[schemars(description = "Subject for the loan recommendation email")]
    pub loans_email: String,

    #[serde(default = "defaults::credit_cards_subject")]
    #[schemars(description = "Subject for the credit card recommendation email")]
    pub credit_cards_email: String,

    #[serde(default = "defaults::savings_subject")]
    #[schemars(description = "Subject for the savings account recommendation email")]
    pub savings_email: String,
}

impl Default for EmailSubjects {
    fn default() -> Self {
        Self {
            spending_summary_email: defaults::spending_summary_subject(),
            coupons_email: defaults::coupons_subject(),
            loans_email: defaults::loans_subject(),
            credit_cards_email: defaults::credit_cards_subject(),
            savings_email: defaults::savings_subject(),
        }
    }
}

impl EmailSubjects {
    pub fn schema_as_json() -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&schemars::schema_for!(EmailSubjects))
    }
}

/// Outcome of one category requester run: up to three ranked identifiers and
/// a subject line, either model-produced or the category defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct RecommendationResult {
    pub category: ProductCategory,
    pub recommendations: Vec<String>,
    pub email_subject: String,
}

/// Recommendation lists per category. Entries are bare identifier strings or,
/// when the assembler resolves against a catalog, full product records (with
/// placeholder objects for identifiers the catalog does not know).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryRecommendations {
    pub coupons: Vec<serde_json::Value>,
    pub loans: Vec<serde_json::Value>,
    pub credit_cards: Vec<serde_json::Value>,
    pub high_yield_savings: Vec<serde_json::Value>,
}

/// The assembled per-user report, written as `output_<user_id>.json` and/or
/// uploaded to the key-value store. Immutable once built; each run overwrites
/// the prior snapshot for the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalReport {
    pub userinfo: UserInfo,
    pub tags: Vec<String>,
    pub recommendations: CategoryRecommendations,
    pub monthly_spend_analysis_data: Vec<MonthlySummary>,
    pub email_notifications: EmailSubjects,
}
