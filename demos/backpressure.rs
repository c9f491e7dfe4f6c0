//! Backpressure example: a bounded backlog rejects overflow submissions
//!
//! Run with: cargo run --example backpressure

use gatepool::{BoundedExecutor, ExecutorError};
use std::error::Error;
use std::time::Duration;
use tokio::time::sleep;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    println!("🚰 Backpressure Example");
    println!("=======================");

    let executor = BoundedExecutor::builder()
        .with_label("ingest")
        .with_max_concurrency(1)
        .with_backlog_limit(4)
        .build()?;

    println!("\n📝 Flooding the executor with slow tasks...");
    let mut accepted = 0usize;
    let mut rejected = 0usize;

    for i in 0..16 {
        let outcome = executor.submit(async move {
            sleep(Duration::from_millis(20)).await;
            println!("   task {i:2} done");
        });
        match outcome {
            Ok(()) => accepted += 1,
            Err(ExecutorError::BacklogFull { limit }) => {
                rejected += 1;
                println!("   task {i:2} rejected (backlog limit {limit})");
                // Let the lane drain a little before continuing the flood
                sleep(Duration::from_millis(30)).await;
            }
            Err(err) => return Err(err.into()),
        }
    }

    executor.shutdown().await;

    let stats = executor.stats();
    println!("\n📊 Results:");
    println!("   Accepted: {accepted}");
    println!("   Rejected: {rejected}");
    println!("   Completed: {}", stats.completed);

    Ok(())
}
