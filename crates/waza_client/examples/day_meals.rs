use waza_client::{CompositeQuery, WazaApiClient, config::Config, http_client::ReqwestWazaClient};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cfg = Config::from_env()?;
    let client = ReqwestWazaClient::from_config(&cfg);

    let warrior_id = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("WAZA_WARRIOR_ID").ok());
    let Some(warrior_id) = warrior_id else {
        eprintln!("usage: cargo run -p waza_client --example day_meals -- <warrior_id>");
        eprintln!("or set WAZA_WARRIOR_ID");
        return Ok(());
    };

    let today = chrono::Utc::now().date_naive();
    let meals = client.fetch_saved_meals(&warrior_id, today).await?;
    match CompositeQuery::from_meals(&meals) {
        Some(q) => println!("{} meal(s), nutrient query: {}", meals.len(), q),
        None => println!("nothing logged today"),
    }
    Ok(())
}
