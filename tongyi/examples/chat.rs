//! Plain and tool-using chat against DashScope.
//!
//! Run with:
//! ```bash
//! DASHSCOPE_API_KEY=your-key cargo run --example chat
//! ```

use serde::Deserialize;
use tongyi::prelude::*;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Deserialize)]
struct WeatherArgs {
    city: String,
}

fn weather_tool() -> ToolDefinition {
    ToolDefinition::typed("get_weather", |_ctx: &ToolContext, args: WeatherArgs| {
        Ok(format!("{}: 22°C, sunny", args.city))
    })
    .with_description("Get the current weather for a city")
    .with_schema(SchemaBuilder::new().string("city", "City name", true).build())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let provider = ProviderConfig::from_env().build();
    let ctx = RequestContext::new();

    let request = ModelRequest::new(QWEN_PLUS)
        .with_message(Message::system("You are a concise assistant."))
        .with_message(Message::user("What are the three primary colors?"));
    let response = provider.generate(&ctx, &request, ModelOptions::new().temperature(0.7)).await?;
    println!("Answer: {}\n", response.text());

    let request = ModelRequest::new(QWEN_PLUS)
        .with_message(Message::user("What's the weather like in Hangzhou?"))
        .with_tool(weather_tool());
    let mut pipe = provider.new_stream(&ctx, &request, ModelOptions::new().max_iterations(2))?;
    while pipe.next().await {
        if let Some(message) = pipe.current().and_then(ModelResponse::first) {
            match message.status {
                Status::Incomplete => print!("{}", message.text()),
                Status::Completed => {
                    for call in &message.tool_calls {
                        println!("\n[tool {}] {} -> {}", call.name, call.arguments, call.result);
                    }
                }
            }
        }
    }
    println!();
    if let Some(err) = pipe.error() {
        anyhow::bail!("stream failed: {err}");
    }

    Ok(())
}
