use gridflow_engine::{run_cascade, run_population, CellCoord, ChainTemplate, EngineConfig, GridEngine};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("gridflow=info")),
        )
        .init();

    let config = EngineConfig::from_env()?;
    let row_height = config.row_height;
    let viewport_height = 20.0 * row_height;
    let mut engine = GridEngine::with_template(config, ChainTemplate::new("1"))?;

    // Scroll halfway down while the seeding pass is still running
    let target = f64::from(engine.config().total_rows / 2) * row_height;
    let mut scrolled = false;
    run_population(&mut engine, |engine, batch| {
        if !scrolled && batch.start > 0 {
            engine.set_viewport(target, viewport_height);
            scrolled = true;
        }
    })
    .await;

    // Propagate the edit down the whole chain without blocking other tasks
    let batches = run_cascade(&mut engine, CellCoord::new(0, 0), "5", |_| {}).await?;
    tracing::info!(batches, "edited A1");

    engine.set_viewport(target, viewport_height);
    println!("{}", serde_json::to_string_pretty(&engine.read_visible())?);

    Ok(())
}
