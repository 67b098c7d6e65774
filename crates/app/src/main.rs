use anyhow::Context;

use minibank_app::{AppConfig, Bank, activity, console, seed};

fn main() -> anyhow::Result<()> {
    minibank_observability::init();

    let config = AppConfig::from_env();
    tracing::info!(
        min_opening_deposit = %config.ledger.min_opening_deposit,
        max_number_attempts = config.ledger.max_number_attempts,
        seed_demo = config.seed_demo,
        "starting minibank"
    );

    let bank = Bank::new(config.ledger);
    let _activity = activity::spawn_activity_log(bank.subscribe());

    if config.seed_demo {
        seed::seed_demo_accounts(&bank).context("failed to seed demo accounts")?;
    }

    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    console::run(&bank, stdin.lock(), stdout.lock()).context("console i/o failed")?;

    Ok(())
}
