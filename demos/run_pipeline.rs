use dotenv::dotenv;
use finance_recommender::*;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    let config = PipelineConfig::from_env()?;

    let client = GeminiClient::new(config.api_key.clone(), config.model.clone());
    let store = LocalTableStore::new(&config.data_root);
    let loader = DataLoader::new(&store, &config.data_bucket);

    println!("Loading data from {}...", config.data_bucket);
    let catalog = loader.load_catalog()?;
    let user_ids = loader.user_ids()?;
    println!(
        "Data loaded successfully: {} users, {} coupons, {} loans, {} cards, {} savings accounts",
        user_ids.len(),
        catalog.coupons.len(),
        catalog.loans.len(),
        catalog.credit_cards.len(),
        catalog.savings.len()
    );

    let reports = FileReportStore::new(&config.output_dir);
    let pipeline = RecommendationPipeline::new(&client, config.request_timeout);

    for user_id in user_ids {
        let user = match loader.find_user(&user_id) {
            Ok(user) => user,
            Err(e) => {
                eprintln!("Skipping user {}: {}", user_id, e);
                continue;
            }
        };

        let rows = loader.load_user_transactions(&user_id);
        let owned = loader.load_user_cards(&user_id);

        let report = pipeline.run_user(&user, &rows, &catalog, &owned).await;

        match reports.put_report(&user_id, &report) {
            Ok(()) => println!("Output saved for user {}", user_id),
            Err(e) => eprintln!("Failed to save output for user {}: {}", user_id, e),
        }
    }

    Ok(())
}
