//! Resumable scan demo
//!
//! Processes a CSV file in fixed-size slices, the way a long-running job
//! would pause and pick up again from the last line it finished.
//!
//! Run with `RUST_LOG=csvstream=debug` to see the reader's log events.

use csvstream::{Parser, ParserOptions};
use std::error::Error;
use std::io::Write;
use tracing_subscriber::EnvFilter;

const TOTAL_ROWS: u64 = 25;
const SLICE: u64 = 10;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let path = std::env::temp_dir().join("csvstream_resume_scan.csv");
    {
        let mut file = std::fs::File::create(&path)?;
        writeln!(file, "id,name,amount")?;
        for i in 0..TOTAL_ROWS {
            writeln!(file, "{},\"Customer, {}\",{}", i, i, i * 7)?;
        }
    }

    println!("=== Resumable CSV scan ===\n");

    // Preview: header skipped, at most 3 records delivered
    let options = ParserOptions::builder()
        .skip_first_line(true)
        .to_line(3)
        .resolve()?;
    let parser = Parser::open(&path, options)?;
    while let Some(record) = parser.advance().await?.into_record() {
        println!("Preview: {:?}", record);
    }

    // Line 0 is the header, so data starts at line 1
    let mut next_line: u64 = 1;
    let mut slice_no = 1;
    loop {
        let options = ParserOptions::builder()
            .from_line(next_line as i64)
            .resolve()?;
        let parser = Parser::open(&path, options)?;

        // to_line counts post-skip records but must not be below from_line,
        // so the slice length is enforced here rather than by a bound.
        let mut sum = 0u64;
        while parser.current_line() < SLICE {
            match parser.advance().await?.into_record() {
                Some(record) => sum += record[2].parse::<u64>()?,
                None => break,
            }
        }

        let processed = parser.current_line();
        println!(
            "Slice {}: lines {}..{} -> {} records, amount sum {}",
            slice_no,
            next_line,
            next_line + processed,
            processed,
            sum
        );

        if processed < SLICE {
            break;
        }
        next_line += processed;
        slice_no += 1;
    }

    std::fs::remove_file(&path).ok();
    Ok(())
}
