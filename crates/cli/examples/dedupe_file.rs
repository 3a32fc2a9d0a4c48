use sheetdedup_core::{deduplicate, KeySpec, NormalizeOptions};
use sheetdedup_formats::{open_dataset, write_results, OutputLayout};
use std::path::PathBuf;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("🔍 sheetdedup\n");

    let mut args = std::env::args().skip(1);
    let input_file = PathBuf::from(
        args.next()
            .unwrap_or_else(|| "/tmp/test_customers.csv".to_string()),
    );
    let key_spec: KeySpec = args.next().unwrap_or_else(|| "1".to_string()).parse()?;
    let options = if args.any(|arg| arg == "--case-insensitive") {
        NormalizeOptions::case_insensitive()
    } else {
        NormalizeOptions::default()
    };

    println!("Input: {}", input_file.display());
    println!("Key columns: {}", key_spec);
    println!("Case sensitive: {}\n", options.case_sensitive);

    println!("📖 Reading rows...");
    let dataset = open_dataset(&input_file)?;
    let shape = dataset.shape();
    println!("✓ Read {} rows x {} columns\n", shape.rows, shape.columns);

    println!("🔨 Classifying rows...");
    let result = deduplicate(dataset, &key_spec, &options)?;

    let duplicates = result
        .has_duplicates()
        .then_some(result.duplicate_rows.as_slice());
    let layout = OutputLayout::default();
    let written = write_results(
        &input_file,
        &layout,
        result.total_cols,
        &result.unique_rows,
        duplicates,
    )?;

    println!("\n💾 Wrote unique rows to {}", written.unique.display());
    match &written.duplicates {
        Some(path) => println!("💾 Wrote duplicate rows to {}", path.display()),
        None => println!("No duplicates: no duplicate file written"),
    }

    let data_rows = result.verdicts.len();
    println!("\n📊 Summary:");
    println!("  Total rows (with header): {}", result.total_rows);
    println!("  Unique rows: {}", result.unique_row_count());
    println!("  Duplicate rows: {}", result.duplicate_row_count());
    if data_rows > 0 {
        println!(
            "  Duplicate rate: {:.2}%",
            result.duplicate_row_count() as f64 / data_rows as f64 * 100.0
        );
    }

    Ok(())
}
