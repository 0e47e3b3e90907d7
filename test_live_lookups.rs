use phishscan::config::NetworkConfig;
use phishscan::lookup::{LiveLookups, NetworkLookups};
use phishscan::normalizer::normalize;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    println!("Testing LIVE network lookups (not mock data)...");

    let config = NetworkConfig::default();
    let lookups = LiveLookups::new(&config)?;

    let test_urls = vec![
        "https://www.google.com",
        "https://github.com",
        "https://www.paypal.com",
        "https://customscharge-tracking-delivery.com/",
    ];

    for raw in test_urls {
        let url = normalize(raw);
        println!("\n=== Testing {} (host: {}, domain: {}) ===", raw, url.host, url.registrable_domain);

        match lookups.resolve(&url.host).await {
            Ok(addresses) => println!("✅ DNS: {addresses:?}"),
            Err(e) => println!("❌ DNS: {e}"),
        }

        match lookups.registration(&url.registrable_domain).await {
            Ok(reg) => println!(
                "✅ WHOIS: created {}, expires {} ({} days)",
                reg.created.date_naive(),
                reg.expires.date_naive(),
                reg.span_days()
            ),
            Err(e) => println!("❌ WHOIS: {e}"),
        }

        match lookups.fetch_page(&url.url).await {
            Ok(body) => println!("✅ HTTP: {} bytes", body.len()),
            Err(e) => println!("❌ HTTP: {e}"),
        }

        match lookups.probe_port(&url.host, config.probe_port).await {
            Ok(()) => println!("✅ Port {} open", config.probe_port),
            Err(e) => println!("❌ Port {}: {e}", config.probe_port),
        }
    }

    println!("\n=== Live lookup test complete ===");
    Ok(())
}
