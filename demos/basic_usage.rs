//! Basic usage example for the bounded executor
//!
//! Run with: cargo run --example basic_usage

use gatepool::{BoundedExecutor, PoolMode};
use std::error::Error;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};
use tokio::time::sleep;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    println!("🚦 Bounded Executor Example");
    println!("===========================");

    let executor = BoundedExecutor::builder()
        .with_label("demo")
        .with_max_concurrency(3)
        .with_pool_mode(PoolMode::Parallel)
        .build()?;

    println!("\n📝 Submitting 20 tasks (at most 3 run at once)...");
    let running = Arc::new(AtomicUsize::new(0));
    let start = Instant::now();

    for i in 0..20 {
        let running = running.clone();
        executor.submit(async move {
            let now = running.fetch_add(1, Ordering::SeqCst) + 1;
            println!("   task {i:2} started ({now} running)");
            sleep(Duration::from_millis(50)).await;
            running.fetch_sub(1, Ordering::SeqCst);
        })?;
    }

    // A direct run bypasses the admission queue entirely
    executor
        .execute(async {
            println!("   direct task ran without queueing");
        })
        .await?;

    executor.shutdown().await;

    let stats = executor.stats();
    println!("\n📊 Execution Stats:");
    println!("   Submitted: {}", stats.submitted);
    println!("   Completed: {}", stats.completed);
    println!("   Direct runs: {}", stats.direct_runs);
    println!("   Peak concurrency: {}", stats.peak_executing);
    println!("   Elapsed: {:.2}s", start.elapsed().as_secs_f64());

    println!("\n🎉 Example completed!");
    Ok(())
}
