//! Sol Forensics - terminal front end
//!
//! Submits one address to the analysis backend, waits for the job and
//! prints the wallet summary and entity labels.
//!
//! Usage:
//!   sol_forensics <ADDRESS> [--json]

use sol_forensics::{
    AnalysisClient, ForensicsConfig, GraphView, HttpBackend, Route, Session, SessionView,
    WalletSummary,
};

use eyre::{eyre, Result};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    let mut args = std::env::args().skip(1);
    // shells and pasted input often carry stray whitespace
    let address = args
        .next()
        .map(|a| a.trim().to_string())
        .ok_or_else(|| eyre!("usage: sol_forensics <ADDRESS> [--json]"))?;
    let as_json = args.any(|a| a == "--json");

    let config = ForensicsConfig::from_env()?;
    let backend = HttpBackend::new(&config)?;
    let client = Arc::new(AnalysisClient::new(backend, config));
    let session = Session::new(client.clone());

    session.navigate(Route::WalletAnalysis);
    let state = tokio::select! {
        state = session.submit(&address) => state,
        _ = tokio::signal::ctrl_c() => {
            println!("\n🛑 Cancelled");
            return Ok(());
        }
    };

    let result = match state.view() {
        SessionView::Ready(result) => result,
        SessionView::Error(message) => return Err(eyre!(message)),
        other => return Err(eyre!("analysis ended without a result: {:?}", other)),
    };

    let summary = WalletSummary::from_report(&result.wallet_analysis);
    let graph = GraphView::of(&result);

    if as_json {
        let out = serde_json::json!({
            "summary": summary,
            "entity_labels": graph.entity_labels(),
            "protocols": graph.protocols(),
            "focal_address": graph.focal_address(),
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!("\n📊 Wallet Analysis: {}", summary.wallet_address);
    println!("   Active Period:         {}", summary.active_period_days);
    println!("   Avg. Tx/Day:           {}", summary.avg_tx_per_day);
    println!("   Sender/Receiver Ratio: {}", summary.sender_to_receiver_ratio);
    println!("   Net Flow:              {}", summary.net_flow);
    println!("   First Transaction:     {}", summary.first_transaction);
    println!("   Last Transaction:      {}", summary.last_transaction);
    println!("   Total Transactions:    {}", summary.num_transactions);
    println!("   Total Received:        {}", summary.total_received);
    println!("   Total Sent:            {}", summary.total_sent);

    if !summary.funding.is_empty() {
        println!("\n💰 Funding Sources");
        for row in &summary.funding {
            println!(
                "   {:<24} senders {:>4}  receivers {:>4}  in {}  out {}",
                row.entity_label, row.unique_senders, row.unique_receivers, row.received, row.sent
            );
        }
    }

    println!("\n🏷️ Entity Labels");
    for row in graph.entity_labels() {
        println!("   {}  {:<28} {:?}", row.address, row.label, row.category);
    }

    if let Some(focal) = graph.focal_address() {
        let (inflow, outflow) = graph.flow_totals(focal);
        println!(
            "\n🎯 Most connected: {} ({} transfers, in {:.4} / out {:.4})",
            focal,
            graph.edges_touching(focal).len(),
            inflow,
            outflow
        );
    }

    let stats = client.telemetry().get_stats();
    println!("\n   Poll requests: {}", stats.poll_requests);

    Ok(())
}
