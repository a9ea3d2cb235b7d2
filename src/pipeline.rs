//! Per-user orchestration. Control flow is linear per user — preprocess,
//! requesters, summarizer, synthesizer, assembler — except that the four
//! mutually-independent category requesters are issued concurrently, each
//! behind its own deadline so one category's failure or stall never blocks
//! another's. No state survives across users.

use std::time::Duration;

use futures::future::join4;
use log::{info, warn};
use tokio::time::timeout;

use crate::assembler::build_final_report;
use crate::llm::generate::TextGenerator;
use crate::llm::notifier::generate_email_subjects;
use crate::llm::requester::{default_result, request_recommendations, RecommendationRequest};
use crate::llm::summarizer::summarize_months;
use crate::preprocess::{group_by_month, normalize_transactions};
use crate::schema::{
    FinalReport, Product, ProductCatalog, ProductCategory, RawTransaction, RecommendationResult,
    Transaction, UserInfo,
};

pub struct RecommendationPipeline<'a> {
    generator: &'a dyn TextGenerator,
    request_timeout: Duration,
    resolve_products: bool,
}

impl<'a> RecommendationPipeline<'a> {
    pub fn new(generator: &'a dyn TextGenerator, request_timeout: Duration) -> Self {
        Self {
            generator,
            request_timeout,
            resolve_products: false,
        }
    }

    /// Resolve recommended identifiers to full catalog records in the final
    /// report instead of carrying bare identifiers.
    pub fn with_resolved_products(mut self) -> Self {
        self.resolve_products = true;
        self
    }

    /// Runs the whole pipeline for one user and returns the assembled
    /// report. Degrades internally at every external boundary; the only
    /// way to get no report is to not call this.
    pub async fn run_user(
        &self,
        user: &UserInfo,
        raw_rows: &[RawTransaction],
        catalog: &ProductCatalog,
        owned_cards: &[String],
    ) -> FinalReport {
        info!("Processing user {}", user.user_id);

        let outcome = normalize_transactions(raw_rows);
        let transactions = outcome.transactions;

        let results = self
            .request_all_categories(user, &transactions, catalog, owned_cards)
            .await;
        info!("Got the recommendations for user {}", user.user_id);

        let grouped = group_by_month(&transactions);
        let summaries = summarize_months(self.generator, user, &grouped).await;

        let subjects =
            generate_email_subjects(self.generator, user, &results, &summaries, catalog).await;

        build_final_report(
            user,
            &results,
            &summaries,
            subjects,
            self.resolve_products.then_some(catalog),
        )
    }

    /// Issues the four category requests concurrently and joins the results
    /// in fixed category order.
    async fn request_all_categories(
        &self,
        user: &UserInfo,
        transactions: &[Transaction],
        catalog: &ProductCatalog,
        owned_cards: &[String],
    ) -> Vec<RecommendationResult> {
        let request_for = |category: ProductCategory| {
            let products: Vec<Product> = match category {
                // cards the user already holds are excluded from the payload
                ProductCategory::CreditCards => catalog
                    .products(category)
                    .into_iter()
                    .filter(|p| !owned_cards.iter().any(|owned| owned == p.identifier()))
                    .collect(),
                _ => catalog.products(category),
            };
            RecommendationRequest {
                category,
                user,
                transactions,
                products,
            }
        };

        let (coupons, loans, credit_cards, savings) = join4(
            self.request_with_deadline(request_for(ProductCategory::Coupons)),
            self.request_with_deadline(request_for(ProductCategory::Loans)),
            self.request_with_deadline(request_for(ProductCategory::CreditCards)),
            self.request_with_deadline(request_for(ProductCategory::Savings)),
        )
        .await;

        vec![coupons, loans, credit_cards, savings]
    }

    async fn request_with_deadline(
        &self,
        request: RecommendationRequest<'_>,
    ) -> RecommendationResult {
        match timeout(
            self.request_timeout,
            request_recommendations(self.generator, &request),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => {
                warn!(
                    "{} recommendation call timed out after {:?}, using defaults",
                    request.category.label(),
                    self.request_timeout
                );
                default_result(request.category)
            }
        }
    }
}
