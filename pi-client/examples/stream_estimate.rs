//! Watch an estimate converge against a running `pi-server`.
//!
//! Prints a line for every snapshot the consumer publishes, then runs the
//! same request through the batch path for comparison.
//!
//! Environment:
//! - `PI_SERVER_URL` (default `http://localhost:3000`)
//! - `PI_FRAMING` (`sse` or `ndjson`, default `sse`)
//! - `PI_N` (default `10000`)
//!
//! Run with: `RUST_LOG=debug cargo run --example stream_estimate -p pi-client`

use pi_client::{EstimateClient, EstimateWorker, StreamConsumer, estimate_batch};
use pi_protocol::Framing;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let base_url =
        std::env::var("PI_SERVER_URL").unwrap_or_else(|_| "http://localhost:3000".into());
    let framing: Framing = match std::env::var("PI_FRAMING") {
        Ok(raw) => raw.parse()?,
        Err(_) => Framing::default(),
    };
    let n: i64 = match std::env::var("PI_N") {
        Ok(raw) => raw.parse()?,
        Err(_) => 10_000,
    };

    let client = EstimateClient::new(base_url).framing(framing);
    println!("Requesting {n} points from {}", client.estimate_url(n.max(0) as u64));

    let mut consumer = StreamConsumer::new(client.clone());
    let mut updates = consumer.subscribe();
    consumer.request(n).await;

    while updates.changed().await.is_ok() {
        let snap = updates.borrow_and_update().clone();
        println!(
            "{:?}: {}/{} points, {} inside, pi ~= {:.6}",
            snap.phase, snap.points_seen, snap.total_requested, snap.points_inside, snap.estimate
        );
        if let Some(error) = &snap.error {
            println!("error: {error}");
        }
        if !snap.is_loading {
            break;
        }
    }
    consumer.wait().await;

    if n > 0 {
        let worker = EstimateWorker::spawn();
        let batch = estimate_batch(&client, n as u64, &worker).await?;
        println!("Batch estimate: {batch:.6}");
    }

    Ok(())
}
