//! # Procura CLI Library
//!
//! Startup, dispatch and printing for the `procura` binary. The command
//! functions themselves live in [`commands`] and know nothing about
//! argument parsing or the terminal.
//!
//! ## Module Organization
//! ```text
//! procura_cli/
//! ├── lib.rs          ◄─── You are here (startup, dispatch, printing)
//! ├── cli.rs          ◄─── clap definitions and value parsers
//! ├── output.rs       ◄─── Text tables and detail views
//! ├── state/
//! │   ├── mod.rs      ◄─── State type exports
//! │   ├── config.rs   ◄─── procura.toml + PROCURA_* overrides
//! │   ├── db.rs       ◄─── Database handle + active register
//! │   └── session.rs  ◄─── Administrator login (Argon2, session file)
//! ├── commands/       ◄─── One function per action
//! └── error.rs        ◄─── ApiError and exit codes
//! ```
//!
//! ## Startup Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. Initialize logging (stderr, RUST_LOG)                               │
//! │  2. Load AppConfig: defaults → procura.toml → PROCURA_* variables       │
//! │  3. Commands without storage (words, login, config, ...) run here       │
//! │  4. Open the SQLite pool, run migrations                                │
//! │  5. Resolve the register: --register → `register` setting → contracts   │
//! │  6. Mutations and documents: SessionStore::require()                    │
//! │  7. Run the command; print text or JSON                                 │
//! │  8. Errors: "error [CODE]: message", exit code by ErrorCode             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod cli;
pub mod commands;
pub mod error;
pub mod output;
pub mod state;

use std::io::{self, Write};
use std::process::ExitCode;

use anyhow::Context;
use chrono::{Local, NaiveDate};
use clap::CommandFactory;
use serde::Serialize;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use procura_core::{
    Amount, ContractFilter, ContractorInput, NewBatch, Register, ValidationError, GOODS_CATEGORY,
};
use procura_db::Database;
use procura_docs::{
    BidReceiptRequest, BondRequest, ObligationRequest, PioContract, PioMemoRequest, StrikeRequest,
};

use cli::{
    Cli, Commands, ContractCommands, ContractorCommands, DocArgs, DocCommands, ExportCommands,
    ImportCommands, SettingsCommands,
};
use commands::contract::{ChecklistQuery, ContractEdit, Presence};
use commands::{auth, contract, contractor, document, settings, transfer, utility};
use error::ApiError;
use state::{AppConfig, DbState, SessionStore};

/// Initializes the tracing subscriber, writing to stderr so stdout stays
/// clean for `--json`.
///
/// ## Log Levels
/// - Default: warnings only
/// - `RUST_LOG=procura_cli=info` - one line per change made
/// - `RUST_LOG=debug` - every command and query
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

/// Runs a parsed command line and maps the outcome to an exit code.
pub async fn run(cli: Cli) -> ExitCode {
    let json = cli.json;
    match execute(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let api = err.downcast_ref::<ApiError>().cloned();
            let code = api.as_ref().map(|e| e.code.exit_code()).unwrap_or(1);
            match api {
                Some(api) if json => {
                    let text = serde_json::to_string_pretty(&api).unwrap_or_else(|_| api.message.clone());
                    eprintln!("{}", text);
                }
                Some(api) => eprintln!("error [{}]: {}", code_name(&api), api.message),
                None => eprintln!("error: {:#}", err),
            }
            ExitCode::from(u8::try_from(code).unwrap_or(1))
        }
    }
}

fn code_name(err: &ApiError) -> String {
    serde_json::to_value(err.code)
        .ok()
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_else(|| format!("{:?}", err.code))
}

/// Prints `value` as JSON or through `text`.
fn emit<T: Serialize>(json: bool, value: &T, text: impl FnOnce(&T) -> String) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        println!("{}", text(value));
    }
    Ok(())
}

fn read_password() -> anyhow::Result<String> {
    eprint!("Password: ");
    io::stderr().flush()?;
    let mut line = String::new();
    io::stdin()
        .read_line(&mut line)
        .context("reading password from stdin")?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

async fn open_database(config: &AppConfig, register: Option<Register>) -> anyhow::Result<DbState> {
    if let Some(parent) = config.database.path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
    }
    let db = Database::new(config.db_config())
        .await
        .map_err(ApiError::from)?;
    let state = DbState::resolve(db, register).await.map_err(ApiError::from)?;
    debug!(path = %config.database.path.display(), register = %state.register(), "Database ready");
    Ok(state)
}

async fn execute(cli: Cli) -> anyhow::Result<()> {
    let config = AppConfig::load(cli.config.as_deref()).map_err(ApiError::from)?;
    let store = SessionStore::new(config.auth.clone());
    let json = cli.json;

    // Commands that need no database
    let command = match cli.command {
        Some(Commands::Login { username, password }) => {
            let username = username.unwrap_or_else(|| config.auth.username.clone());
            let password = match password {
                Some(p) => p,
                None => read_password()?,
            };
            let session = auth::login(&store, &username, &password)?;
            return emit(json, &session, |s| {
                format!("Logged in as {} until {}", s.username, s.expires_at.with_timezone(&Local).format("%Y-%m-%d %H:%M"))
            });
        }
        Some(Commands::Logout) => {
            let ended = auth::logout(&store)?;
            return emit(json, &ended, |ended| {
                if *ended { "Logged out" } else { "No active session" }.to_string()
            });
        }
        Some(Commands::Whoami) => {
            let me = auth::whoami(&store)?;
            return emit(json, &me, |me| match &me.session {
                Some(s) => format!("{} (session expires {})", s.username, s.expires_at.with_timezone(&Local).format("%Y-%m-%d %H:%M")),
                None => "Not logged in".to_string(),
            });
        }
        Some(Commands::HashPassword { password }) => {
            let password = match password {
                Some(p) => p,
                None => read_password()?,
            };
            let hash = auth::hash(&password)?;
            return emit(json, &hash, |h| h.clone());
        }
        Some(Commands::Words { amount }) => {
            let result = utility::amount_words(&amount);
            return emit(json, &result, |r| match &r.warning {
                Some(w) => format!("{}\n{}\nwarning: {}", r.words, r.formatted, w),
                None => format!("{}\n{}", r.words, r.formatted),
            });
        }
        Some(Commands::Format { amount }) => {
            let formatted = utility::format_amount(&amount);
            return emit(json, &formatted, |f| f.clone());
        }
        Some(Commands::Config) => {
            if json {
                let mut shown = config.clone();
                if shown.auth.password_hash.is_some() {
                    shown.auth.password_hash = Some("<set>".to_string());
                }
                return emit(true, &shown, |_| String::new());
            }
            println!("{}", settings::show_config(&config)?);
            return Ok(());
        }
        other => other,
    };

    let db = open_database(&config, cli.register).await?;

    match command {
        None => {
            if settings::show_dashboard(&db).await? {
                let summary = contract::dashboard(&db, None).await?;
                emit(json, &summary, output::dashboard)
            } else {
                Cli::command().print_help()?;
                Ok(())
            }
        }
        Some(Commands::Contract(cmd)) => contract_command(&db, &store, cmd, json).await,
        Some(Commands::Contractor(cmd)) => contractor_command(&db, &store, cmd, json).await,
        Some(Commands::Import(cmd)) => import_command(&db, &store, cmd, json).await,
        Some(Commands::Export(cmd)) => export_command(&db, cmd, json).await,
        Some(Commands::Doc(args)) => doc_command(&db, &store, config, args, json).await,
        Some(Commands::Settings(cmd)) => settings_command(&db, &store, cmd, json).await,
        // Handled above
        Some(_) => Ok(()),
    }
}

// =============================================================================
// Contracts
// =============================================================================

async fn contract_command(
    db: &DbState,
    store: &SessionStore,
    cmd: ContractCommands,
    json: bool,
) -> anyhow::Result<()> {
    match cmd {
        ContractCommands::Create {
            batch,
            year,
            posting,
            pre_bid,
            bidding,
            contracts,
        } => {
            let session = store.require()?;
            let batch = NewBatch {
                batch,
                year: year.unwrap_or_else(contract::current_year),
                posting,
                pre_bid,
                bidding,
                contracts,
            };
            let created = contract::create_batch(db, &session, batch).await?;
            emit(json, &created, |c| output::contract_list(c))
        }
        ContractCommands::Show { contract_id } => {
            let found = contract::get_contract(db, &contract_id).await?;
            emit(json, &found, output::contract_details)
        }
        ContractCommands::List { year, status } => {
            let list = contract::list_contracts(db, ContractFilter { year, status }).await?;
            emit(json, &list, |c| output::contract_list(c))
        }
        ContractCommands::Search { query, year, limit } => {
            let found = contract::search_contracts(db, &query, year.as_deref(), limit).await?;
            emit(json, &found, |c| output::contract_list(c))
        }
        ContractCommands::Update {
            contract_id,
            new_id,
            batch,
            year,
            posting,
            pre_bid,
            bidding,
            project_name,
            milestones,
            clear,
        } => {
            let session = store.require()?;
            let edit = ContractEdit {
                contract_id: new_id,
                batch,
                year,
                posting,
                pre_bid,
                bidding,
                project_name,
                milestones: milestones.into(),
                clear,
            };
            let updated = contract::update_contract(db, &session, &contract_id, edit).await?;
            emit(json, &updated, output::contract_details)
        }
        ContractCommands::BulkUpdate {
            contract_ids,
            milestones,
        } => {
            let session = store.require()?;
            let update: procura_core::MilestoneUpdate = milestones.into();
            if update.is_empty() {
                return Err(ApiError::validation("No milestone fields given").into());
            }
            let count = contract::bulk_update(db, &session, &contract_ids, update).await?;
            emit(json, &count, |n| format!("Updated {} contract(s)", n))
        }
        ContractCommands::Status {
            contract_id,
            status,
        } => {
            let session = store.require()?;
            let updated = contract::set_status(db, &session, &contract_id, status).await?;
            emit(json, &updated, |c| format!("{} is now {}", c.contract_id, c.status))
        }
        ContractCommands::Delete { contract_id } => {
            let session = store.require()?;
            contract::delete_contract(db, &session, &contract_id).await?;
            emit(json, &contract_id, |id| format!("Deleted {}", id))
        }
        ContractCommands::Dashboard { year } => {
            let summary = contract::dashboard(db, year.as_deref()).await?;
            emit(json, &summary, output::dashboard)
        }
        ContractCommands::Checklist {
            folder,
            year,
            status,
            present,
            missing,
            desc,
        } => {
            let presence = match (present, missing) {
                (true, _) => Presence::Present,
                (_, true) => Presence::Missing,
                _ => Presence::All,
            };
            let query = ChecklistQuery {
                year,
                status,
                presence,
                descending: desc,
            };
            let entries = contract::checklist(db, &folder, query).await?;
            emit(json, &entries, |e| output::checklist(e))
        }
    }
}

// =============================================================================
// Contractors
// =============================================================================

async fn contractor_command(
    db: &DbState,
    store: &SessionStore,
    cmd: ContractorCommands,
    json: bool,
) -> anyhow::Result<()> {
    match cmd {
        ContractorCommands::Add {
            name,
            address,
            details,
        } => {
            let session = store.require()?;
            let input = ContractorInput {
                name,
                address,
                email: details.email,
                amo: details.amo,
                designation: details.designation,
                tin: details.tin,
            };
            let added = contractor::add_contractor(db, &session, input).await?;
            emit(json, &added, output::contractor_details)
        }
        ContractorCommands::Show { name } => {
            let found = contractor::get_contractor(db, &name).await?;
            emit(json, &found, output::contractor_details)
        }
        ContractorCommands::List => {
            let list = contractor::list_contractors(db).await?;
            emit(json, &list, |c| output::contractor_list(c))
        }
        ContractorCommands::Search { query, limit } => {
            let found = contractor::search_contractors(db, &query, limit).await?;
            emit(json, &found, |c| output::contractor_list(c))
        }
        ContractorCommands::Update {
            name,
            rename,
            address,
            details,
        } => {
            let session = store.require()?;
            // Empty fields keep the stored value
            let changes = ContractorInput {
                name: rename.unwrap_or_default(),
                address: address.unwrap_or_default(),
                email: details.email,
                amo: details.amo,
                designation: details.designation,
                tin: details.tin,
            };
            let updated = contractor::update_contractor(db, &session, &name, changes).await?;
            emit(json, &updated, output::contractor_details)
        }
        ContractorCommands::Delete { name } => {
            let session = store.require()?;
            contractor::delete_contractor(db, &session, &name).await?;
            emit(json, &name, |n| format!("Deleted {}", n))
        }
    }
}

// =============================================================================
// Import / Export
// =============================================================================

async fn import_command(
    db: &DbState,
    store: &SessionStore,
    cmd: ImportCommands,
    json: bool,
) -> anyhow::Result<()> {
    let session = store.require()?;
    let report = match cmd {
        ImportCommands::Contracts { file } => transfer::import_contracts(db, &session, &file).await?,
        ImportCommands::Contractors { file } => {
            transfer::import_contractors(db, &session, &file).await?
        }
    };
    emit(json, &report, output::import_report)
}

async fn export_command(db: &DbState, cmd: ExportCommands, json: bool) -> anyhow::Result<()> {
    let (count, file) = match cmd {
        ExportCommands::Contracts { file, year, status } => {
            let count = transfer::export_contracts(db, &file, ContractFilter { year, status }).await?;
            (count, file)
        }
        ExportCommands::Contractors { file } => (transfer::export_contractors(db, &file).await?, file),
    };
    info!(count, file = %file.display(), "Export finished");
    emit(json, &count, |n| format!("Exported {} row(s) to {}", n, file.display()))
}

// =============================================================================
// Documents
// =============================================================================

fn required<T>(value: Option<T>, field: &str) -> Result<T, ApiError> {
    value.ok_or_else(|| ValidationError::required(field).into())
}

async fn doc_command(
    db: &DbState,
    store: &SessionStore,
    mut config: AppConfig,
    args: DocArgs,
    json: bool,
) -> anyhow::Result<()> {
    let session = store.require()?;
    if let Some(out) = args.out {
        config.documents.output_dir = out;
    }
    if let Some(templates) = args.templates {
        config.documents.template_dir = templates;
    }

    let written = match args.kind {
        DocCommands::Strike {
            contract_id,
            name,
            budget,
            date,
            category,
            bidders,
        } => {
            let known = document::prefill(db, &contract_id, None).await?;
            let category = category.unwrap_or_else(|| match db.register() {
                Register::Goods => GOODS_CATEGORY.to_string(),
                Register::Contracts => "Infrastructure".to_string(),
            });
            let req = StrikeRequest {
                contract_name: name.or_else(|| known.project_name()).unwrap_or_default(),
                budget: required(budget.or_else(|| known.amount()), "budget")?,
                date: date.unwrap_or_else(today),
                category,
                bidders,
                contract_id,
            };
            document::generate_strike(&config, &session, &req)?
        }
        DocCommands::BidReceipt {
            contract_id,
            project_name,
            location,
            date,
            representative,
            designation,
            contractor,
            address,
        } => {
            let known = document::prefill(db, &contract_id, contractor.as_deref()).await?;
            let req = BidReceiptRequest {
                project_name: project_name.or_else(|| known.project_name()).unwrap_or_default(),
                location,
                date: date.unwrap_or_else(today),
                representative: representative.or_else(|| known.representative()).unwrap_or_default(),
                representative_designation: designation
                    .or_else(|| known.representative_designation())
                    .unwrap_or_default(),
                contractor: contractor.or_else(|| known.contractor_name()).unwrap_or_default(),
                address: address.or_else(|| known.contractor_address()).unwrap_or_default(),
                contract_id,
            };
            document::generate_bid_receipt(&config, &session, &req)?
        }
        DocCommands::PioMemo {
            cert_type,
            memo_date,
            start_date,
            end_date,
            cert_date,
            contracts,
        } => {
            let mut listed = Vec::with_capacity(contracts.len());
            for (contract_id, name) in contracts {
                let project_name = match name {
                    Some(name) => name,
                    None => db
                        .contracts()
                        .get_by_contract_id(&contract_id)
                        .await
                        .map_err(ApiError::from)?
                        .map(|c| c.project_name)
                        .unwrap_or_default(),
                };
                listed.push(PioContract {
                    contract_id,
                    project_name,
                });
            }
            let req = PioMemoRequest {
                cert_type,
                memo_date,
                start_date,
                end_date,
                cert_date,
                contracts: listed,
            };
            document::generate_pio_memo(&config, &session, &req)?
        }
        DocCommands::Bond {
            contract_id,
            bond_type,
            insurance_company,
            date_validated,
            amount,
            contractor,
            project_no,
            project_name,
            the_who,
            designation,
        } => {
            let known = document::prefill(db, &contract_id, contractor.as_deref()).await?;
            let parsed = match &amount {
                Some(text) => Amount::parse(text)?,
                None => required(known.amount(), "amount")?,
            };
            let req = BondRequest {
                insurance_company,
                date_validated: date_validated.unwrap_or_else(today),
                amount: parsed,
                amount_text: amount,
                contractor: contractor.or_else(|| known.contractor_name()).unwrap_or_default(),
                project_no,
                project_name: project_name.or_else(|| known.project_name()).unwrap_or_default(),
                the_who,
                designation,
                bond_type,
                contract_id,
            };
            document::generate_bond(&config, &session, &req)?
        }
        DocCommands::Oblig {
            contract_id,
            fund,
            date,
            amount,
            contractor,
            address,
            tin,
            pmis,
            name,
            labor,
            material,
            equipment,
            saro,
            source_of_fund,
            uacs,
            year,
            end_user,
            designation,
            end_user_title,
        } => {
            let known = document::prefill(db, &contract_id, contractor.as_deref()).await?;
            let req = ObligationRequest {
                fund,
                date: date.unwrap_or_else(today),
                amount: required(amount.or_else(|| known.amount()), "amount")?,
                contractor: contractor.or_else(|| known.contractor_name()).unwrap_or_default(),
                contractor_address: address.or_else(|| known.contractor_address()).unwrap_or_default(),
                contractor_tin: tin.or_else(|| known.contractor_tin()).unwrap_or_default(),
                pmis,
                contract_name: name.or_else(|| known.project_name()).unwrap_or_default(),
                labor,
                material,
                equipment,
                saro,
                source_of_fund,
                uacs,
                year: year
                    .or_else(|| known.year())
                    .unwrap_or_else(contract::current_year),
                end_user,
                designation,
                end_user_title,
                contract_id,
            };
            document::generate_obligation(&config, &session, &req)?
        }
    };

    emit(json, &written, |w| output::written(w))
}

// =============================================================================
// Settings
// =============================================================================

async fn settings_command(
    db: &DbState,
    store: &SessionStore,
    cmd: SettingsCommands,
    json: bool,
) -> anyhow::Result<()> {
    match cmd {
        SettingsCommands::Get { key } => {
            let value = settings::get_setting(db, &key).await?;
            emit(json, &value, |v| v.clone().unwrap_or_else(|| "(unset)".to_string()))
        }
        SettingsCommands::Set { key, value } => {
            let session = store.require()?;
            let stored = settings::set_setting(db, &session, &key, &value).await?;
            emit(json, &stored, |v| format!("{} = {}", key, v))
        }
        SettingsCommands::Reset { key } => {
            let session = store.require()?;
            let existed = settings::reset_setting(db, &session, &key).await?;
            emit(json, &existed, |e| {
                if *e {
                    format!("{} reset to default", key)
                } else {
                    format!("{} was not set", key)
                }
            })
        }
        SettingsCommands::List => {
            let all = settings::list_settings(db).await?;
            emit(json, &all, |all| {
                if all.is_empty() {
                    return "No settings stored.".to_string();
                }
                all.iter()
                    .map(|(k, v)| format!("{} = {}", k, v))
                    .collect::<Vec<_>>()
                    .join("\n")
            })
        }
    }
}
