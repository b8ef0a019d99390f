//! Simple Query Example
//!
//! Runs a select against the IBM i microservice and prints the result set
//! in each export format.
//!
//! Run with: cargo run --example simple_query -- http://my-ibmi:3030

use ibmirest_rs::{Client, CsvOptions};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let url = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "http://localhost:3030".to_string());

    println!("Simple ibmirest Query Example\n");

    let mut client = Client::connect(url)?;
    client.set_user_info("DEVUSER", "password", true);

    let table = client
        .execute_query("SELECT CUSNUM, LSTNAM, BALDUE FROM QIWS.QCUSTCDT")
        .await?;
    println!("✅ {} rows, columns: {:?}\n", table.row_count(), table.column_names());

    println!("CSV:\n{}", client.table_to_csv(&CsvOptions::default())?);
    println!("XML:\n{}", client.table_to_xml("CUSTOMER", false)?);
    println!("JSON:\n{}\n", client.table_to_json(true)?);

    for row in client.table_to_list(true)? {
        println!("   {:?}", row);
    }

    // A failed query leaves its reason behind
    if client.execute_query("SELECT * FROM NO.SUCHTABLE").await.is_err() {
        println!("\n❌ {}", client.last_error().unwrap_or_default());
        println!("   HTTP status: {}", client.last_http_status());
    }

    Ok(())
}
