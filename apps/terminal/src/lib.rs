//! # Till Terminal Library
//!
//! Core library for the `till` point-of-sale terminal.
//! This is the main entry point that loads configuration, opens the stores
//! and runs the command loop.
//!
//! ## Module Organization
//! ```text
//! till_terminal/
//! ├── lib.rs          ◄─── You are here (startup & command loop)
//! ├── config.rs       ◄─── AppConfig (TOML + environment)
//! ├── state/
//! │   ├── mod.rs      ◄─── State type exports
//! │   ├── register.rs ◄─── Cart bound to the stores
//! │   └── returns.rs  ◄─── Returns session bound to the stores
//! ├── commands/
//! │   ├── mod.rs      ◄─── Command parsing
//! │   ├── product.rs  ◄─── Inventory views
//! │   ├── cart.rs     ◄─── Cart manipulation
//! │   ├── sale.rs     ◄─── Commit and receipts
//! │   └── returns.rs  ◄─── Return staging and finalize
//! └── error.rs        ◄─── API error type for commands
//! ```
//!
//! ## Protocol
//! One command per input line, one JSON document per output line:
//! ```text
//! till> add 1 2
//! {"lines":[...],"totals":{"lineCount":1,"totalQuantity":2,"total":2000},...}
//! till> add 99 1
//! {"error":{"code":"NOT_FOUND","message":"Product not found: 99"}}
//! ```

pub mod commands;
pub mod config;
pub mod error;
pub mod state;

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use chrono::{Local, NaiveDateTime};
use serde::Serialize;
use serde_json::{json, Value};
use till_store::Store;
use tracing::{debug, info};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use commands::Command;
use config::AppConfig;
use error::ApiError;
use state::{Register, ReturnsDesk};

/// What the loop should do after a command.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Reply(Value),
    Quit,
}

/// One terminal session: configuration, the stores and both desks.
pub struct Terminal {
    config: AppConfig,
    store: Store,
    register: Register,
    returns: ReturnsDesk,
    clock: fn() -> NaiveDateTime,
}

fn local_now() -> NaiveDateTime {
    Local::now().naive_local()
}

impl Terminal {
    /// Opens the stores named by `config`.
    pub fn open(config: AppConfig) -> Result<Self, ApiError> {
        let store = Store::open(config.store_config())?;
        Ok(Terminal {
            register: Register::new(store.clone()),
            returns: ReturnsDesk::new(store.clone()),
            store,
            config,
            clock: local_now,
        })
    }

    /// Replaces the clock used to stamp sales and returns.
    pub fn with_clock(mut self, clock: fn() -> NaiveDateTime) -> Self {
        self.clock = clock;
        self
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Parses and runs one input line.
    pub fn execute(&mut self, line: &str) -> Result<Outcome, ApiError> {
        let command = Command::parse(line)?;
        debug!(?command, "Executing");
        if command == Command::Quit {
            return Ok(Outcome::Quit);
        }
        self.dispatch(command).map(Outcome::Reply)
    }

    fn dispatch(&mut self, command: Command) -> Result<Value, ApiError> {
        let now = self.clock;
        match command {
            Command::Add {
                sku,
                quantity,
                discount_percent,
            } => reply(commands::cart::add_to_cart(
                &mut self.register,
                &sku,
                quantity,
                discount_percent,
            )?),
            Command::Edit { sku, quantity } => {
                reply(commands::cart::edit_cart_line(&mut self.register, &sku, quantity)?)
            }
            Command::Remove { sku } => reply(commands::cart::remove_from_cart(&mut self.register, &sku)?),
            Command::Undo => reply(commands::cart::undo(&mut self.register)?),
            Command::Cart => reply(commands::cart::get_cart(&self.register)),
            Command::Abandon => reply(commands::cart::abandon_cart(&mut self.register)),
            Command::Commit => reply(commands::sale::commit_sale(
                &mut self.register,
                &self.config,
                now(),
            )?),
            Command::Inventory => reply(commands::product::list_inventory(&self.store, &self.config)?),
            Command::Product { sku } => {
                reply(commands::product::get_product(&self.store, &self.config, &sku)?)
            }
            Command::Receipt { sale_id } => {
                reply(commands::sale::get_receipt(&self.store, &self.config, sale_id)?)
            }
            Command::ReturnLoad { sale_id } => {
                reply(commands::returns::load_receipt(&mut self.returns, sale_id)?)
            }
            Command::ReturnStage { query, quantity } => reply(commands::returns::stage_return_line(
                &mut self.returns,
                &query,
                quantity,
            )?),
            Command::ReturnUnstage { query, quantity } => reply(
                commands::returns::unstage_return_line(&mut self.returns, &query, quantity)?,
            ),
            Command::ReturnSummary => reply(commands::returns::return_summary(&self.returns)?),
            Command::ReturnFinalize => reply(commands::returns::finalize_return(
                &mut self.returns,
                &self.config,
                now(),
            )?),
            Command::ReturnCancel => reply(json!({
                "cancelledSaleId": commands::returns::cancel_return(&mut self.returns)
            })),
            Command::Help => reply(
                commands::HELP
                    .iter()
                    .map(|(usage, about)| json!({ "command": usage, "description": about }))
                    .collect::<Vec<_>>(),
            ),
            Command::Quit => Ok(Value::Null),
        }
    }
}

fn reply<T: Serialize>(value: T) -> Result<Value, ApiError> {
    serde_json::to_value(value).map_err(|e| ApiError::internal(e.to_string()))
}

/// Renders a command result as one output line.
pub fn render(result: &Result<Value, ApiError>) -> String {
    match result {
        Ok(value) => value.to_string(),
        Err(err) => json!({ "error": err }).to_string(),
    }
}

/// Runs the terminal.
///
/// ## Startup Sequence
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │                       Terminal Startup                                  │
/// │                                                                         │
/// │  1. Initialize Logging ───────────────────────────────────────────────► │
/// │     • tracing-subscriber with env filter, to stderr                     │
/// │     • Default: info,till=debug, can be overridden with RUST_LOG         │
/// │                                                                         │
/// │  2. Load Configuration ───────────────────────────────────────────────► │
/// │     • --config <path>, else the platform config dir                     │
/// │     • TILL_* environment variables override the file                    │
/// │                                                                         │
/// │  3. Open Stores ──────────────────────────────────────────────────────► │
/// │     • Create the data directory if needed                               │
/// │     • Files are created on first write                                  │
/// │                                                                         │
/// │  4. Command Loop ─────────────────────────────────────────────────────► │
/// │     • One command per line on stdin, one JSON line on stdout            │
/// │     • Errors are reported and the loop continues                        │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let config = AppConfig::load_or_default(config_path_arg(std::env::args().skip(1)));
    info!(store = %config.store.name, data_dir = %config.data_dir().display(), "Starting Till");

    let mut terminal = Terminal::open(config)?;
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    writeln!(stdout, "{} POS. Type 'help' for commands.", terminal.config().store.name)?;
    write!(stdout, "till> ")?;
    stdout.flush()?;

    for line in stdin.lock().lines() {
        let line = line?;
        if !line.trim().is_empty() {
            match terminal.execute(&line) {
                Ok(Outcome::Quit) => break,
                Ok(Outcome::Reply(value)) => writeln!(stdout, "{}", render(&Ok(value)))?,
                Err(err) => writeln!(stdout, "{}", render(&Err(err)))?,
            }
        }
        write!(stdout, "till> ")?;
        stdout.flush()?;
    }

    info!("Till stopped");
    Ok(())
}

fn config_path_arg(mut args: impl Iterator<Item = String>) -> Option<PathBuf> {
    while let Some(arg) = args.next() {
        if arg == "--config" {
            return args.next().map(PathBuf::from);
        }
        if let Some(path) = arg.strip_prefix("--config=") {
            return Some(PathBuf::from(path));
        }
    }
    None
}

/// Initializes the tracing subscriber for structured logging.
///
/// Logs go to stderr so stdout stays one JSON document per line.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=till_store=trace` - Show trace for the store crate only
/// - Default: `info,till=debug`
fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    log_subscriber(filter).init();
}

/// Filter used when `RUST_LOG` is unset or unparseable.
const DEFAULT_LOG_FILTER: &str = "info,till=debug";

fn log_subscriber(filter: EnvFilter) -> impl tracing::Subscriber + Send + Sync {
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::fs;
    use tempfile::TempDir;

    fn fixed_now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 6, 5)
            .and_then(|d| d.and_hms_opt(9, 15, 0))
            .unwrap()
    }

    fn terminal(dir: &TempDir) -> Terminal {
        fs::write(
            dir.path().join("products.json"),
            r#"{
  "1": {"category": "Hand Tools", "name": "Hammer", "price": 10.0, "stock": 50,
        "nextShipment": "none", "nextShipmentQty": 0},
  "2": {"category": "Measuring", "name": "Tape Measure", "price": 7.99, "stock": 4,
        "next_ship": "2025-07-01", "next_ship_qty": 20}
}"#,
        )
        .unwrap();
        let mut config = AppConfig::default();
        config.data.dir = Some(dir.path().to_path_buf());
        Terminal::open(config).unwrap().with_clock(fixed_now)
    }

    fn ok(terminal: &mut Terminal, line: &str) -> Value {
        match terminal.execute(line) {
            Ok(Outcome::Reply(value)) => value,
            other => panic!("{} -> {:?}", line, other),
        }
    }

    fn err_code(terminal: &mut Terminal, line: &str) -> String {
        let err = terminal.execute(line).unwrap_err();
        json!(err)["code"].as_str().unwrap().to_string()
    }

    #[test]
    fn test_sale_session() {
        let dir = TempDir::new().unwrap();
        let mut t = terminal(&dir);

        ok(&mut t, "add 1 3");
        let cart = ok(&mut t, "add 1 2");
        assert_eq!(cart["lines"].as_array().unwrap().len(), 1);
        assert_eq!(cart["lines"][0]["quantity"], 5);

        ok(&mut t, "undo");
        let sale = ok(&mut t, "commit");
        assert_eq!(sale["saleId"], 1);
        assert_eq!(sale["totalCents"], 3000);

        let product = ok(&mut t, "product 1");
        assert_eq!(product["stock"], 47);

        let receipt = ok(&mut t, "receipt 1");
        assert_eq!(receipt["timestamp"], "2025-06-05 09:15:00");
        assert_eq!(err_code(&mut t, "commit"), "EMPTY_CART");
    }

    #[test]
    fn test_return_session() {
        let dir = TempDir::new().unwrap();
        let mut t = terminal(&dir);
        ok(&mut t, "add 2 2");
        ok(&mut t, "commit");

        ok(&mut t, "return-load 1");
        ok(&mut t, "return-stage tape measure 2");
        let done = ok(&mut t, "return-finalize");
        assert_eq!(done["refundCents"], 1598);

        assert_eq!(ok(&mut t, "product 2")["stock"], 4);
        assert_eq!(err_code(&mut t, "return-load 1"), "ALREADY_LOCKED");
        assert_eq!(err_code(&mut t, "return-summary"), "NO_RECEIPT");
        assert_eq!(ok(&mut t, "receipt 1")["returned"], true);
    }

    #[test]
    fn test_errors_keep_session_alive() {
        let dir = TempDir::new().unwrap();
        let mut t = terminal(&dir);

        assert_eq!(err_code(&mut t, "add 9 1"), "NOT_FOUND");
        assert_eq!(err_code(&mut t, "add 2 5"), "INSUFFICIENT_STOCK");
        assert_eq!(err_code(&mut t, "sell 1"), "UNKNOWN_COMMAND");
        assert_eq!(err_code(&mut t, "undo"), "NOTHING_TO_UNDO");
        assert_eq!(ok(&mut t, "inventory").as_array().unwrap().len(), 2);
        assert_eq!(t.execute("quit").unwrap(), Outcome::Quit);
    }

    #[test]
    fn test_malformed_store_record_is_validation_error() {
        let dir = TempDir::new().unwrap();
        let mut t = terminal(&dir);
        fs::write(
            dir.path().join("products.json"),
            r#"{"1": {"category": "Hand Tools", "name": "Hammer", "price": 10.0, "stock": -3}}"#,
        )
        .unwrap();

        let err = t.execute("add 1 1").unwrap_err();
        assert_eq!(json!(err)["code"], "VALIDATION_ERROR");
        assert!(err.message.contains("products.json"));
        assert!(err.message.contains("'1'"));
    }

    #[test]
    fn test_render() {
        let err = ApiError::from(till_core::CoreError::EmptyReturn);
        assert_eq!(
            render(&Err(err)),
            r#"{"error":{"code":"EMPTY_RETURN","message":"No items staged for return"}}"#
        );
        assert_eq!(render(&Ok(json!({"a": 1}))), r#"{"a":1}"#);
    }

    #[test]
    fn test_default_log_filter() {
        use tracing::Level;

        let subscriber = log_subscriber(EnvFilter::new(DEFAULT_LOG_FILTER));
        tracing::subscriber::with_default(subscriber, || {
            assert!(tracing::enabled!(target: "some_dep", Level::INFO));
            assert!(!tracing::enabled!(target: "some_dep", Level::DEBUG));
            assert!(!tracing::enabled!(target: "some_dep", Level::TRACE));
            assert!(tracing::enabled!(target: "till_store::batch", Level::DEBUG));
            assert!(!tracing::enabled!(target: "till_store::batch", Level::TRACE));
        });
    }

    #[test]
    fn test_config_path_arg() {
        let args = |v: &[&str]| v.iter().map(|s| s.to_string()).collect::<Vec<_>>().into_iter();
        assert_eq!(
            config_path_arg(args(&["--config", "/etc/till.toml"])),
            Some(PathBuf::from("/etc/till.toml"))
        );
        assert_eq!(
            config_path_arg(args(&["--config=till.toml"])),
            Some(PathBuf::from("till.toml"))
        );
        assert_eq!(config_path_arg(args(&[])), None);
    }
}
