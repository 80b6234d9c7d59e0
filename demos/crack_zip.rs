//! ZIP password search example
//!
//! This example demonstrates the core functionality of pwsearch:
//! - Inspecting a target archive
//! - Loading a search configuration (optional JSON file)
//! - Subscribing to search events
//! - Cancelling the search with Ctrl+C
//!
//! Usage: `cargo run --example crack_zip -- <archive.zip> [config.json]`

use pwsearch::search::format_count;
use pwsearch::{Event, SearchConfig, ZipOracle, cancel_on_signal, run_search};
use std::path::PathBuf;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() {
    // Initialize tracing for logging (optional)
    // Uncomment if you add tracing-subscriber to your dependencies:
    // tracing_subscriber::fmt::init();

    let code = match run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e}");
            e.exit_code()
        }
    };
    std::process::exit(code);
}

async fn run() -> pwsearch::Result<i32> {
    let mut args = std::env::args().skip(1);
    let Some(archive) = args.next().map(PathBuf::from) else {
        eprintln!("usage: crack_zip <archive.zip> [config.json]");
        return Ok(4);
    };
    let config = match args.next() {
        Some(path) => SearchConfig::from_json_file(std::path::Path::new(&path))?,
        None => SearchConfig::default(),
    };

    let oracle = ZipOracle::open(&archive).await?;
    let info = oracle.info();
    println!("Entries:   {}", info.entry_count);
    println!("Encrypted: {}", if info.is_encrypted { "yes" } else { "no" });
    println!("Files:     {}", info.sample_names.join(", "));

    // Subscribe to events
    let (events, mut rx) = broadcast::channel::<Event>(1024);
    let printer = tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(Event::StageStarted { stage, total }) => {
                    println!("\n[{}] {} candidates", stage, format_count(total));
                }
                Ok(Event::LengthStarted {
                    length,
                    combinations,
                    ..
                }) => {
                    println!(
                        "  -> {} characters ({} combinations)",
                        length,
                        format_count(combinations)
                    );
                }
                Ok(Event::Progress(p)) => {
                    print!("\r  {:>5.1}% {}        ", p.percent, p.label);
                }
                Ok(Event::SessionFinished { .. }) => break,
                Ok(_) => {}
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    });

    let cancel = CancellationToken::new();
    tokio::spawn(cancel_on_signal(cancel.clone()));

    let result = run_search(&config, &oracle, &cancel, &events).await?;
    drop(events);
    printer.await.ok();
    println!();

    let secs = result.elapsed.as_secs_f64();
    match result.password() {
        Some(password) => println!("Password found: [ {password} ] ({secs:.2}s)"),
        None => match &result.outcome {
            pwsearch::StageResult::Cancelled => println!("Stopped by user."),
            pwsearch::StageResult::OracleError(e) => println!("Search aborted: {e}"),
            _ => println!("Password not found in the configured search space ({secs:.2}s)."),
        },
    }
    println!("Attempts: {}", format_count(result.attempts));

    Ok(result.exit_code())
}
