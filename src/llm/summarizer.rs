//! Monthly summarization: one service call per month bucket, chronological,
//! with a degraded summary synthesized whenever the response cannot be
//! decoded. Degraded summaries are still appended, never dropped.

use std::collections::BTreeMap;

use log::{info, warn};

use crate::error::Result;
use crate::llm::generate::TextGenerator;
use crate::llm::parsing::decode_response;
use crate::llm::prompts::MONTHLY_SUMMARY_SYSTEM_PROMPT;
use crate::schema::{MonthBucket, MonthlySummary, Transaction, UserInfo};

/// Assembles the summarizer instruction for one month: the user record plus
/// the month's full, unfiltered transaction set.
pub fn build_summary_context(user: &UserInfo, transactions: &[Transaction]) -> Result<String> {
    Ok(format!(
        "User Information: {}\n\
         Transaction Data: {}\n\n\
         Please analyze the user's financial behavior for this month.",
        serde_json::to_string_pretty(user)?,
        serde_json::to_string_pretty(transactions)?,
    ))
}

/// Minimal summary standing in for an undecodable response: the bucket's own
/// year/month split, the raw text carried verbatim as the narrative, and an
/// empty breakdown.
pub fn degraded_summary(bucket: MonthBucket, raw_text: &str) -> MonthlySummary {
    MonthlySummary {
        month: bucket.month_str(),
        year: bucket.year_str(),
        ai_summary: raw_text.to_string(),
        tags: Vec::new(),
        categories_expenses: BTreeMap::new(),
    }
}

/// Decodes one summarizer response, or synthesizes the degraded summary.
pub fn parse_summary_response(bucket: MonthBucket, response: &str) -> MonthlySummary {
    match decode_response::<MonthlySummary>(response) {
        Ok(mut summary) => {
            summary.tags.truncate(2);
            summary
        }
        Err(e) => {
            warn!("Summary for {} did not decode, keeping raw text: {}", bucket, e);
            degraded_summary(bucket, response)
        }
    }
}

/// Summarizes a single month bucket with one service call.
pub async fn summarize_month(
    generator: &dyn TextGenerator,
    user: &UserInfo,
    bucket: MonthBucket,
    transactions: &[Transaction],
) -> MonthlySummary {
    let context = match build_summary_context(user, transactions) {
        Ok(context) => context,
        Err(e) => {
            warn!("Could not serialize summary context for {}: {}", bucket, e);
            return degraded_summary(bucket, &e.to_string());
        }
    };

    match generator
        .generate(MONTHLY_SUMMARY_SYSTEM_PROMPT, &context)
        .await
    {
        Ok(response) => parse_summary_response(bucket, &response),
        Err(e) => {
            warn!("Summary call for {} failed: {}", bucket, e);
            degraded_summary(bucket, &e.to_string())
        }
    }
}

/// Summarizes every month bucket in chronological order. Every bucket yields
/// exactly one entry in the returned list.
pub async fn summarize_months(
    generator: &dyn TextGenerator,
    user: &UserInfo,
    grouped: &BTreeMap<MonthBucket, Vec<Transaction>>,
) -> Vec<MonthlySummary> {
    let mut summaries = Vec::with_capacity(grouped.len());
    for (bucket, transactions) in grouped {
        info!(
            "Summarizing {} ({} transactions) for user {}",
            bucket,
            transactions.len(),
            user.user_id
        );
        summaries.push(summarize_month(generator, user, *bucket, transactions).await);
    }
    summaries
}
