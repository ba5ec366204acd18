use fpa_copilot::{FpaConfig, FpaSnapshot, MetricsEngine};
use std::fs;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let engine = MetricsEngine::new(FpaConfig::from_env());
    let snapshot = FpaSnapshot::build(&engine)?;

    let markdown = snapshot.to_markdown();
    fs::write("fpa_snapshot.md", &markdown)?;
    fs::write("fpa_snapshot.json", snapshot.to_json()?)?;

    println!("{}", markdown);
    println!("Saved fpa_snapshot.md and fpa_snapshot.json");
    Ok(())
}
