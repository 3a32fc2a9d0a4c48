use std::fs::File;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let output_file = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "/tmp/test_customers.csv".to_string());

    let mut writer = csv::Writer::from_writer(File::create(&output_file)?);

    println!("🔧 Generating test spreadsheet: {}\n", output_file);

    writer.write_record(["customer_id", "name", "email", "city"])?;

    // Exact duplicates
    println!("Adding exact duplicates...");
    for _ in 0..3 {
        writer.write_record(["1001", "Ada Lovelace", "ada@example.com", "London"])?;
    }

    // Same number written differently (caught on column 1)
    println!("Adding numeric variations...");
    writer.write_record(["1002", "Alan Turing", "alan@example.com", "Manchester"])?;
    writer.write_record(["1002.0", "Alan Turing", "alan@example.com", "Manchester"])?;
    writer.write_record([" 1002 ", "A. Turing", "alan@example.com", "Wilmslow"])?;

    // Case variations (caught with --case-insensitive on column 3)
    println!("Adding case variations...");
    writer.write_record(["1003", "Grace Hopper", "grace@example.com", "New York"])?;
    writer.write_record(["1004", "Grace Hopper", "GRACE@example.com", "New York"])?;
    writer.write_record(["1005", "Grace Hopper", "Grace@Example.com", "Arlington"])?;

    // Missing key values compare equal to each other
    println!("Adding rows with empty cells...");
    writer.write_record(["1006", "Edsger Dijkstra", "", "Austin"])?;
    writer.write_record(["1007", "Barbara Liskov", "", "Boston"])?;

    // Completely unique
    println!("Adding unique rows...");
    writer.write_record(["1008", "Donald Knuth", "knuth@example.com", "Stanford"])?;
    writer.write_record(["1009", "Margaret Hamilton", "margaret@example.com", "Boston"])?;
    writer.write_record(["1010", "Ken Thompson", "ken@example.com", "Murray Hill"])?;
    writer.write_record(["1011", "Frances Allen", "fran@example.com", "Peru"])?;

    writer.flush()?;

    println!("\n✓ Generated test spreadsheet with 15 data rows");
    println!("  - Exact duplicates: 2");
    println!("  - Numeric variations of one id: 2");
    println!("  - Case variations of one email: 2");
    println!("\nRun deduplication with:");
    println!("  cargo run --example dedupe_file {} 1", output_file);
    println!("  cargo run --example dedupe_file {} 3 --case-insensitive", output_file);
    println!("  cargo run --bin sheetdedup -- dedup {} --key 2,4", output_file);

    Ok(())
}
