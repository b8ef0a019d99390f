//! Host Commands Example
//!
//! CL and Qshell commands, a data queue round trip, and reading values out
//! of a raw response.
//!
//! Run with: cargo run --example host_commands -- https://my-ibmi:3030

use ibmirest_rs::{Client, ConnectionConfig, ErrorKind};
use serde_json::json;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let url = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "https://localhost:3030".to_string());

    let mut config = ConnectionConfig::new(url);
    config.user = "DEVUSER".to_string();
    config.password = "password".to_string();
    config.use_http_credentials = true;
    // Test systems usually run with a self-signed certificate
    config.allow_invalid_cert = true;
    config.timeout_ms = 30_000;

    let mut client = Client::new(config)?;

    println!("📤 CL command");
    match client.execute_command("CRTLIB LIB(DEMOLIB)").await {
        Ok(()) => println!("   Library created"),
        Err(e) if e.kind() == ErrorKind::Remote => println!("   Rejected: {}", e),
        Err(e) => return Err(e.into()),
    }

    println!("🐚 Qshell command");
    client.execute_qsh("ls /home").await?;
    println!("   {}", client.last_json_response());

    println!("📬 Data queue");
    client.execute_command("CRTDTAQ DTAQ(DEMOLIB/ORDERS) MAXLEN(256)").await.ok();
    client.send_data_queue("DEMOLIB", "ORDERS", "ORDER 42").await?;
    match client.pop_data_queue("DEMOLIB", "ORDERS").await? {
        Some(value) => println!("   Received: {}", value),
        None => println!("   Queue was empty"),
    }

    println!("🔎 Raw call");
    let text = client
        .execute_endpoint("sql", &json!({"query": "SELECT COUNT(*) AS N FROM QIWS.QCUSTCDT"}))
        .await?;
    let count: i64 = client.get_json_value(&text, "[0].N");
    println!("   {} customers", count);

    Ok(())
}
