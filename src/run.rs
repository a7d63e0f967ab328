mod cli;
mod tui;

use anyhow::{Context, Result};

use crate::config::Config;
use crate::db::Database;
use crate::error::LedgerError;

/// Ledger owner when `--user` is not given.
pub(crate) const DEFAULT_USER: i64 = 1;

/// Route the command line: no command opens the dashboard, anything else is a CLI command.
pub(crate) fn dispatch(args: &[String], cfg: &Config) -> Result<()> {
    let (user_id, rest) = split_user_flag(args.get(1..).unwrap_or_default())?;
    if rest.is_empty() {
        let db = open_database(cfg)?;
        return tui::as_tui(&db, user_id);
    }
    cli::as_cli(&rest, user_id, cfg)
}

pub(crate) fn open_database(cfg: &Config) -> Result<Database> {
    Database::open(&cfg.db_path).map_err(|e| {
        surface(e).context(format!("Failed to open database: {}", cfg.db_path.display()))
    })
}

/// Pull `--user <id>` out of the argument list wherever it appears.
pub(crate) fn split_user_flag(args: &[String]) -> Result<(i64, Vec<String>)> {
    let mut user_id = DEFAULT_USER;
    let mut rest = Vec::with_capacity(args.len());
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if arg == "--user" || arg == "-u" {
            let value = iter
                .next()
                .ok_or_else(|| anyhow::anyhow!("--user needs a numeric id"))?;
            user_id = value
                .parse()
                .with_context(|| format!("Invalid user id: {value}"))?;
        } else {
            rest.push(arg.clone());
        }
    }
    Ok((user_id, rest))
}

/// Convert a core error for display, adding recovery advice to storage failures.
pub(crate) fn surface(err: LedgerError) -> anyhow::Error {
    match err {
        LedgerError::Storage(_) => anyhow::Error::new(err).context(
            "The ledger database could not be used; restore a backup or remove the file to reinitialise it",
        ),
        LedgerError::Validation(_) => anyhow::Error::new(err),
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    fn strings(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_split_user_flag_default() {
        let (user, rest) = split_user_flag(&strings(&["check"])).unwrap();
        assert_eq!(user, DEFAULT_USER);
        assert_eq!(rest, strings(&["check"]));
    }

    #[test]
    fn test_split_user_flag_anywhere() {
        let (user, rest) =
            split_user_flag(&strings(&["add", "--user", "7", "Expense", "Food", "5"])).unwrap();
        assert_eq!(user, 7);
        assert_eq!(rest, strings(&["add", "Expense", "Food", "5"]));

        let (user, rest) = split_user_flag(&strings(&["-u", "3"])).unwrap();
        assert_eq!(user, 3);
        assert!(rest.is_empty());
    }

    #[test]
    fn test_split_user_flag_errors() {
        assert!(split_user_flag(&strings(&["check", "--user"])).is_err());
        assert!(split_user_flag(&strings(&["--user", "abc"])).is_err());
    }

    #[test]
    fn test_surface_adds_advice_to_storage_errors() {
        let err = surface(LedgerError::Storage(
            crate::error::StorageError::Unavailable("gone".into()),
        ));
        assert!(format!("{err:#}").contains("restore a backup"));

        let err = surface(LedgerError::Validation("bad".into()));
        assert_eq!(format!("{err:#}"), "Validation error: bad");
    }
}
