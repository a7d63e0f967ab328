use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use super::{open_database, surface};
use crate::budget::{self, Verdict};
use crate::config::Config;
use crate::db::{self, Database, LedgerStore};
use crate::ledger;
use crate::report::{self, format_amount, Period};

pub(crate) fn as_cli(args: &[String], user_id: i64, cfg: &Config) -> Result<()> {
    let Some((command, rest)) = args.split_first() else {
        print_usage();
        return Ok(());
    };
    match command.as_str() {
        "add" | "a" => cli_add(rest, user_id, cfg),
        "budget" | "b" => cli_set_budget(rest, user_id, cfg),
        "list" | "ls" => cli_list(rest, user_id, cfg),
        "budgets" => cli_budgets(rest, user_id, cfg),
        "check" | "c" => cli_check(user_id, cfg),
        "report" | "r" => cli_report(rest, user_id, cfg),
        "export" => cli_export(rest, user_id, cfg),
        "backup" => cli_backup(cfg),
        "backups" => cli_backups(cfg),
        "restore" => cli_restore(rest, cfg),
        "--help" | "-h" | "help" => {
            print_usage();
            Ok(())
        }
        "--version" | "-V" | "version" => {
            println!("budgetledger {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        other => {
            print_usage();
            anyhow::bail!("Unknown command: {other}");
        }
    }
}

fn print_usage() {
    println!("budgetledger - local personal finance ledger");
    println!();
    println!("Usage: budgetledger [--user <id>] [command]");
    println!();
    println!("Commands:");
    println!("  (none)                              Open the dashboard");
    println!("  add <Income|Expense> <category> <amount>");
    println!("    --date <YYYY-MM-DD>               Record on a past date (default: now)");
    println!("  budget <category> <amount>          Set the budget for a category");
    println!("  list [category]                     List transactions");
    println!("  budgets [category]                  List budget rows");
    println!("  check                               Compare spending with budgets");
    println!("  report [YYYY-MM|YYYY]               Print a financial report");
    println!("  export [path]                       Export transactions to CSV");
    println!("    --period <YYYY-MM|YYYY>           Only export this period");
    println!("  backup                              Snapshot the database");
    println!("  backups                             List snapshots");
    println!("  restore <file> --yes                Replace the database with a snapshot");
    println!("  --user, -u <id>                     Ledger owner (default: 1)");
    println!("  --help, -h                          Show this help");
    println!("  --version, -V                       Show version");
}

/// Value following `--name`, if present.
fn flag_value<'a>(args: &'a [String], name: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == name)
        .map(|w| w[1].as_str())
}

/// Arguments that are neither flags nor the values of `value_flags`.
fn positionals<'a>(args: &'a [String], value_flags: &[&str]) -> Vec<&'a str> {
    let mut out = Vec::new();
    let mut skip_next = false;
    for arg in args {
        if skip_next {
            skip_next = false;
            continue;
        }
        if value_flags.contains(&arg.as_str()) {
            skip_next = true;
        } else if !arg.starts_with("--") {
            out.push(arg.as_str());
        }
    }
    out
}

fn parse_amount(s: &str) -> Result<Decimal> {
    Decimal::from_str(s.trim().replace(',', "").as_str())
        .with_context(|| format!("Invalid amount: {s}"))
}

fn cli_add(args: &[String], user_id: i64, cfg: &Config) -> Result<()> {
    let pos = positionals(args, &["--date"]);
    let [kind, category, amount] = pos.as_slice() else {
        anyhow::bail!(
            "Usage: budgetledger add <Income|Expense> <category> <amount> [--date YYYY-MM-DD]"
        );
    };
    let amount = parse_amount(amount)?;

    let timestamp = match flag_value(args, "--date") {
        Some(date) => NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .with_context(|| format!("Invalid date (expected YYYY-MM-DD): {date}"))?
            .and_hms_opt(12, 0, 0)
            .ok_or_else(|| anyhow::anyhow!("Invalid date: {date}"))?
            .and_utc(),
        None => Utc::now(),
    };

    let mut db = open_database(cfg)?;
    let txn = ledger::add_transaction_at(&mut db, user_id, category, amount, kind, timestamp)
        .map_err(surface)?;
    tracing::info!(
        user_id,
        id = txn.id,
        kind = %txn.kind,
        category = %txn.category,
        amount = %txn.amount,
        "transaction added"
    );
    println!(
        "Added {} #{}: {} {}",
        txn.kind,
        txn.id.unwrap_or(0),
        txn.category,
        format_amount(txn.amount)
    );

    // Surface an overspend as soon as it happens
    if txn.is_expense() {
        if let Some(notice) = overspend_notice(&db, user_id, &txn.category) {
            println!("{notice}");
        }
    }
    Ok(())
}

/// Message to show after an expense is recorded. The transaction is already
/// saved, so a failed check becomes a warning rather than an error.
fn overspend_notice<S: LedgerStore>(store: &S, user_id: i64, category: &str) -> Option<String> {
    match budget::check_category(store, user_id, category) {
        Ok(status) if status.verdict == Verdict::BudgetExceeded => status.message,
        Ok(_) => None,
        Err(e) => {
            tracing::warn!(user_id, category, error = %e, "budget check after add failed");
            Some(format!("Warning: transaction saved, but the budget check failed: {e}"))
        }
    }
}

fn cli_set_budget(args: &[String], user_id: i64, cfg: &Config) -> Result<()> {
    let pos = positionals(args, &[]);
    let [category, amount] = pos.as_slice() else {
        anyhow::bail!("Usage: budgetledger budget <category> <amount>");
    };
    let amount = parse_amount(amount)?;

    let mut db = open_database(cfg)?;
    let budget = ledger::set_budget(&mut db, user_id, category, amount).map_err(surface)?;
    tracing::info!(
        user_id,
        id = budget.id,
        category = %budget.category,
        amount = %budget.amount,
        "budget set"
    );
    println!(
        "Budget set for {}: {}",
        budget.category,
        format_amount(budget.amount)
    );
    Ok(())
}

fn cli_list(args: &[String], user_id: i64, cfg: &Config) -> Result<()> {
    let category = positionals(args, &[]).first().copied();
    let db = open_database(cfg)?;
    let txns = ledger::list_transactions(&db, user_id, category).map_err(surface)?;
    if txns.is_empty() {
        println!("No transactions found.");
        return Ok(());
    }

    println!(
        "{:<6} {:<21} {:<8} {:<20} {:>14}",
        "ID", "Timestamp", "Type", "Category", "Amount"
    );
    println!("{}", "─".repeat(73));
    for txn in &txns {
        println!(
            "{:<6} {:<21} {:<8} {:<20} {:>14}",
            txn.id.unwrap_or(0),
            db::format_timestamp(&txn.timestamp),
            txn.kind,
            txn.category,
            format_amount(txn.amount),
        );
    }
    Ok(())
}

fn cli_budgets(args: &[String], user_id: i64, cfg: &Config) -> Result<()> {
    let category = positionals(args, &[]).first().copied();
    let db = open_database(cfg)?;
    let budgets = ledger::list_budgets(&db, user_id, category).map_err(surface)?;
    if budgets.is_empty() {
        println!("No budgets set.");
        return Ok(());
    }

    println!("{:<6} {:<20} {:>14}", "ID", "Category", "Amount");
    println!("{}", "─".repeat(42));
    for b in &budgets {
        let effective = budget::effective_budget(&budgets, &b.category).map(|e| e.id) == Some(b.id);
        println!(
            "{:<6} {:<20} {:>14}{}",
            b.id.unwrap_or(0),
            b.category,
            format_amount(b.amount),
            if effective { "" } else { "  (superseded)" },
        );
    }
    Ok(())
}

fn cli_check(user_id: i64, cfg: &Config) -> Result<()> {
    let db = open_database(cfg)?;
    let check = budget::check_budget(&db, user_id).map_err(surface)?;
    tracing::info!(
        user_id,
        categories = check.statuses.len(),
        exceeded = check.exceeded().count(),
        "budget check"
    );

    if !check.has_budgets() {
        println!("No budgets set. Use `budgetledger budget <category> <amount>` first.");
    }
    for status in &check.statuses {
        match &status.message {
            Some(msg) => println!("{msg}"),
            None => println!(
                "   No budget for {}: spent {}",
                status.category,
                format_amount(status.expense_total)
            ),
        }
    }
    if check.has_budgets() && check.all_within() {
        println!("All budgets are within limits.");
    }
    Ok(())
}

fn cli_report(args: &[String], user_id: i64, cfg: &Config) -> Result<()> {
    let period = positionals(args, &[])
        .first()
        .map(|p| Period::parse(p))
        .transpose()
        .map_err(surface)?;
    let db = open_database(cfg)?;
    let doc = match period {
        Some(_) => report::generate_report_for(&db, user_id, period),
        None => report::generate_report(&db, user_id),
    }
    .map_err(surface)?;
    tracing::info!(user_id, period = ?period, "report generated");
    print!("{doc}");
    Ok(())
}

fn cli_export(args: &[String], user_id: i64, cfg: &Config) -> Result<()> {
    let period = flag_value(args, "--period")
        .map(Period::parse)
        .transpose()
        .map_err(surface)?;

    let output_path = positionals(args, &["--period"])
        .first()
        .map(|p| PathBuf::from(shellexpand(p)))
        .unwrap_or_else(|| {
            let suffix = period.map_or_else(|| "all".to_string(), |p| p.to_string());
            cfg.data_dir
                .join(format!("budgetledger-export-{user_id}-{suffix}.csv"))
        });

    let db = open_database(cfg)?;
    let file = std::fs::File::create(&output_path)
        .with_context(|| format!("Failed to create {}", output_path.display()))?;
    let count = report::export_csv(&db, user_id, period, file).map_err(surface)?;
    tracing::info!(user_id, count, path = %output_path.display(), "ledger exported");
    println!("Exported {count} transactions to {}", output_path.display());
    Ok(())
}

fn cli_backup(cfg: &Config) -> Result<()> {
    let db = open_database(cfg)?;
    let name = format!(
        "{}{}.db",
        db::BACKUP_PREFIX,
        chrono::Local::now().format("%Y%m%d_%H%M%S")
    );
    let target = cfg.backup_dir.join(name);
    db.backup_to(&target).map_err(surface)?;
    tracing::info!(path = %target.display(), "database backed up");
    println!("Backup completed: {}", target.display());
    Ok(())
}

fn cli_backups(cfg: &Config) -> Result<()> {
    let backups = db::list_backups(&cfg.backup_dir).map_err(surface)?;
    if backups.is_empty() {
        println!("No backup files found in {}", cfg.backup_dir.display());
        return Ok(());
    }
    for (i, path) in backups.iter().enumerate() {
        println!("{:>3}. {}", i + 1, path.display());
    }
    Ok(())
}

fn cli_restore(args: &[String], cfg: &Config) -> Result<()> {
    let pos = positionals(args, &[]);
    let Some(choice) = pos.first() else {
        anyhow::bail!("Usage: budgetledger restore <file|number> --yes");
    };
    let backup = resolve_backup(choice, &cfg.backup_dir)?;

    if !args.iter().any(|a| a == "--yes") {
        anyhow::bail!(
            "Restoring {} overwrites the current data. Re-run with --yes to confirm.",
            backup.display()
        );
    }

    db::restore_from(&backup, &cfg.db_path).map_err(surface)?;
    Database::open(&cfg.db_path).map_err(surface)?;
    tracing::info!(from = %backup.display(), "database restored");
    println!("Data restored from {}", backup.display());
    Ok(())
}

/// A backup named by path, or by its 1-based number in `backups` output.
fn resolve_backup(choice: &str, backup_dir: &Path) -> Result<PathBuf> {
    if let Ok(n) = choice.parse::<usize>() {
        let backups = db::list_backups(backup_dir).map_err(surface)?;
        return n
            .checked_sub(1)
            .and_then(|i| backups.get(i).cloned())
            .ok_or_else(|| anyhow::anyhow!("No backup number {n}"));
    }
    let path = PathBuf::from(shellexpand(choice));
    if !path.exists() {
        anyhow::bail!("Backup not found: {}", path.display());
    }
    Ok(path)
}

pub(crate) fn shellexpand(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
        format!("{home}/{rest}")
    } else {
        path.to_string()
    }
}
