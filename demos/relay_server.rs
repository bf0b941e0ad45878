//! Relay demo
//!
//! Run with: cargo run --example relay_server [AGENT_ADDR ...]
//!
//! Connects to each capture agent given on the command line, records one
//! pcap file per agent under ./captures/, and re-broadcasts the aggregate
//! stream on 127.0.0.1:4040. Attach a viewer with e.g.:
//!
//!   nc 127.0.0.1 4040 > live.pcap
//!   wireshark -k -i TCP@127.0.0.1:4040
//!
//! Poll source stats as JSON:
//!
//!   nc 127.0.0.1 4041

use pcap_relay::{CaptureSession, RelayConfig, SourceInfo};

#[tokio::main]
async fn main() -> pcap_relay::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let agents: Vec<String> = std::env::args().skip(1).collect();
    if agents.is_empty() {
        eprintln!("usage: relay_server AGENT_ADDR [AGENT_ADDR ...]");
        std::process::exit(1);
    }

    std::fs::create_dir_all("captures")?;

    let config = RelayConfig::with_addr("127.0.0.1:4040".parse().unwrap());
    let mut session = CaptureSession::start(config).await?;
    session.serve_stats("127.0.0.1:4041".parse().unwrap()).await?;

    for (i, addr) in agents.iter().enumerate() {
        let name = format!("agent-{i}");
        let info = SourceInfo::new(&name, "default", format!("captures/{name}.pcap"));
        if let Err(e) = session.add_source(addr, info).await {
            tracing::error!(agent = %addr, error = %e, "Skipping source");
        }
    }

    println!("Relaying on 127.0.0.1:4040 (stats on :4041), Ctrl-C to stop");
    session
        .run_until(async {
            tokio::signal::ctrl_c().await.ok();
        })
        .await;

    Ok(())
}
