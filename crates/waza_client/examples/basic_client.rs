use waza_client::{WazaApiClient, config::Config, http_client::ReqwestWazaClient};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Example: expects WAZA_API_TOKEN and NUTRITION_* credentials in env
    let cfg = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("config error: {}", e);
            return Ok(());
        }
    };
    let client = ReqwestWazaClient::from_config(&cfg);

    let user_id = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "demo-user".to_string());
    let profile = client.get_warrior_profile(&user_id).await?;
    println!(
        "Warrior: {} ({}) goal {} kcal",
        profile.name, profile.warrior_id, profile.caloric_goal
    );
    Ok(())
}
