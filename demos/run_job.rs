use banana_http::{BananaClient, ClientOptions};
use serde_json::json;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let api_key = std::env::var("BANANA_API_KEY")?;
    let model_key = std::env::var("BANANA_MODEL_KEY")?;

    let client = BananaClient::from_env().with_options(ClientOptions {
        retry_timeout_ms: 120_000,
        ..ClientOptions::default()
    });

    let result = client
        .run(
            &api_key,
            &model_key,
            &json!({ "prompt": "Hello I am a [MASK] model." }),
        )
        .await?;

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}
