use std::sync::Arc;

use conductor::{
    HttpTransport, OpenAiClient, Pipeline, ToolRegistry, ToolServerConfig,
    model::OpenAiConfig,
};
use tracing::{Level, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .init();

    info!("Starting pipeline demo...");

    let servers = vec![
        ToolServerConfig::new("weather", "http://localhost:18001/rpc"),
        ToolServerConfig::new("finance", "http://localhost:18002/rpc"),
        ToolServerConfig::new("utility", "http://localhost:18003/rpc"),
    ];
    let transport = Arc::new(HttpTransport::new()?);
    let registry = Arc::new(ToolRegistry::new(servers, transport));
    registry.initialize().await;

    let model = Arc::new(OpenAiClient::new(OpenAiConfig::default())?);
    let pipeline = Pipeline::new(model, registry);

    let query = "What's the weather in Tokyo, and how much is 100 USD in EUR?";
    info!("Query: {query}");

    let output = pipeline.run(query).await?;

    info!("Plan ({} tasks): {}", output.plan.tasks.len(), output.plan.reasoning);
    for execution in &output.executions {
        info!(
            "  {} -> success={} tool_calls={}",
            execution.task_id,
            execution.success,
            execution.tool_calls.len()
        );
    }
    info!(
        "Verification: correct={} confidence={:.0}",
        output.report.overall_correct, output.report.confidence
    );
    println!("\n{}", output.answer.final_answer);

    Ok(())
}
