use banana_http::BananaClient;
use serde_json::json;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let api_key = std::env::var("BANANA_API_KEY")?;
    let model_key = std::env::var("BANANA_MODEL_KEY")?;
    let client = BananaClient::from_env();

    let call_id = client
        .start(&api_key, &model_key, &json!({ "prompt": "A banana on the moon" }))
        .await?;
    println!("started {call_id}");

    loop {
        let status = client.check(&api_key, &call_id).await?;
        println!("check: {:?}", status.message());
        if status.is_success() {
            println!("{}", serde_json::to_string_pretty(&status.into_inner())?);
            return Ok(());
        }
    }
}
