use anyhow::Result;

use pocket_ledger::{logging, Config};

fn main() -> Result<()> {
    let config = Config::from_env();
    logging::init(&config)?;

    tracing::info!(
        version = pocket_ledger::VERSION,
        db = %config.db_path.display(),
        locale = %config.locale,
        "starting"
    );

    if let Err(err) = run(config) {
        tracing::error!("{err:#}");
        return Err(err);
    }

    Ok(())
}

#[cfg(feature = "tui")]
fn run(config: Config) -> Result<()> {
    use pocket_ledger::{App, SqliteLedger};

    println!("🖥️  Opening {}...", config.db_path.display());

    // Creates the file and table on first run
    let ledger = SqliteLedger::open(&config.db_path)?;
    let mut app = App::new(ledger, config.locale)?;
    tracing::info!(count = app.transactions.len(), "transactions loaded");

    pocket_ledger::ui::run_ui(&mut app)?;

    tracing::info!("window closed");
    println!("✅ Balance: {}", app.formatted_balance());
    Ok(())
}

#[cfg(not(feature = "tui"))]
fn run(_config: Config) -> Result<()> {
    eprintln!("❌ Window not available!");
    eprintln!("   Rebuild with: cargo build --features tui");
    std::process::exit(1);
}
