use clap::Parser;

use gomarket_cart::cli::{render_json, render_table, run, Cli};
use gomarket_cart::logging::init_tracing;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let report = run(&cli).await?;
    if let Some(note) = &report.note {
        eprintln!("{}", note);
    }

    if cli.json {
        println!("{}", render_json(&report.cart)?);
    } else {
        print!("{}", render_table(&report.cart));
    }
    Ok(())
}
