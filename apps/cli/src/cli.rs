//! # Command Line
//!
//! clap definitions for the `procura` binary. Flag values are parsed into
//! domain types here (dates, amounts, statuses, bidders) so the handlers in
//! [`crate::commands`] only ever see typed input.
//!
//! ```text
//! procura [--config FILE] [--register contracts|goods] [--json] <COMMAND>
//!
//!   login | logout | whoami | hash-password
//!   contract    create | show | list | search | update | bulk-update
//!               status | delete | dashboard | checklist
//!   contractor  add | show | list | search | update | delete
//!   import      contracts | contractors
//!   export      contracts | contractors
//!   doc         strike | bid-receipt | pio-memo | bond | oblig
//!   words | format
//!   settings    get | set | reset | list
//!   config
//! ```

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use procura_core::dates::parse_flexible;
use procura_core::{Amount, Bidder, ContractStatus, MilestoneUpdate, NewContract, Register};

#[derive(Debug, Parser)]
#[command(
    name = "procura",
    version,
    about = "Procurement contract tracker and document generator",
    long_about = "Procura tracks government procurement contracts from posting to \
                  notice to proceed, keeps a contractor directory and fills the \
                  office's Word templates (three-strike memos, bid receipts, PIO \
                  memos, bond certifications, obligation requests)."
)]
pub struct Cli {
    /// Configuration file (default: the platform config directory)
    #[arg(long, global = true, env = "PROCURA_CONFIG")]
    pub config: Option<PathBuf>,

    /// Contract register to work on (default: the `register` setting)
    #[arg(short, long, global = true, value_parser = parse_register)]
    pub register: Option<Register>,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Start an administrator session
    Login {
        /// Administrator username (default: auth.username)
        username: Option<String>,
        /// Password (read from stdin when omitted)
        #[arg(long, env = "PROCURA_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// End the administrator session
    Logout,

    /// Show the active session
    Whoami,

    /// Print an Argon2 hash for auth.password_hash
    HashPassword {
        /// Password (read from stdin when omitted)
        #[arg(long, env = "PROCURA_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Contract register commands
    #[command(subcommand)]
    Contract(ContractCommands),

    /// Contractor directory commands
    #[command(subcommand)]
    Contractor(ContractorCommands),

    /// Import records from CSV
    #[command(subcommand)]
    Import(ImportCommands),

    /// Export records to CSV
    #[command(subcommand)]
    Export(ExportCommands),

    /// Generate documents from templates
    Doc(DocArgs),

    /// Spell out a peso amount
    Words {
        /// Amount, e.g. 1234.50
        amount: String,
    },

    /// Group an amount with commas
    Format {
        amount: String,
    },

    /// Stored preferences
    #[command(subcommand)]
    Settings(SettingsCommands),

    /// Show the effective configuration
    Config,
}

// =============================================================================
// Contracts
// =============================================================================

#[derive(Debug, Subcommand)]
pub enum ContractCommands {
    /// Add a batch of contracts sharing the posting dates
    Create {
        /// Batch number
        #[arg(long)]
        batch: String,
        /// Year (default: current year)
        #[arg(long)]
        year: Option<String>,
        #[arg(long, value_parser = parse_date)]
        posting: NaiveDate,
        #[arg(long, value_parser = parse_date)]
        pre_bid: NaiveDate,
        #[arg(long, value_parser = parse_date)]
        bidding: NaiveDate,
        /// Contract as "ID=Project name" (repeatable)
        #[arg(long = "contract", value_parser = parse_new_contract, required = true)]
        contracts: Vec<NewContract>,
    },

    /// Show one contract
    Show {
        contract_id: String,
    },

    /// List contracts
    List {
        #[arg(long)]
        year: Option<String>,
        #[arg(long, value_parser = parse_status)]
        status: Option<ContractStatus>,
    },

    /// Search contract IDs, project names and contractors
    Search {
        query: String,
        #[arg(long)]
        year: Option<String>,
        #[arg(short, long)]
        limit: Option<u32>,
    },

    /// Edit one contract
    Update {
        contract_id: String,
        /// New contract ID
        #[arg(long)]
        new_id: Option<String>,
        #[arg(long)]
        batch: Option<String>,
        #[arg(long)]
        year: Option<String>,
        #[arg(long, value_parser = parse_date)]
        posting: Option<NaiveDate>,
        #[arg(long, value_parser = parse_date)]
        pre_bid: Option<NaiveDate>,
        #[arg(long, value_parser = parse_date)]
        bidding: Option<NaiveDate>,
        #[arg(long)]
        project_name: Option<String>,
        #[command(flatten)]
        milestones: MilestoneArgs,
        /// Blank out a milestone field (repeatable), e.g. --clear ntp
        #[arg(long)]
        clear: Vec<String>,
    },

    /// Apply the same milestones to several contracts
    BulkUpdate {
        #[arg(required = true)]
        contract_ids: Vec<String>,
        #[command(flatten)]
        milestones: MilestoneArgs,
    },

    /// Set a contract's status (e.g. cancelled)
    Status {
        contract_id: String,
        #[arg(value_parser = parse_status)]
        status: ContractStatus,
    },

    /// Delete a contract
    Delete {
        contract_id: String,
    },

    /// Counts and recent contracts per status
    Dashboard {
        /// Year (default: current year)
        #[arg(long)]
        year: Option<String>,
    },

    /// Check which contracts have a file in a folder
    Checklist {
        folder: PathBuf,
        #[arg(long)]
        year: Option<String>,
        #[arg(long, value_parser = parse_status)]
        status: Option<ContractStatus>,
        /// Only contracts with a matching file
        #[arg(long, conflicts_with = "missing")]
        present: bool,
        /// Only contracts without a matching file
        #[arg(long)]
        missing: bool,
        /// Sort by contract ID descending
        #[arg(long)]
        desc: bool,
    },
}

/// Milestone flags shared by `update` and `bulk-update`.
#[derive(Debug, Clone, Default, Args)]
pub struct MilestoneArgs {
    /// Contract amount
    #[arg(long, value_parser = parse_amount)]
    pub amount: Option<Amount>,
    /// Winning contractor
    #[arg(long)]
    pub contractor: Option<String>,
    #[arg(long, value_parser = parse_date)]
    pub bid_eval_start: Option<NaiveDate>,
    #[arg(long, value_parser = parse_date)]
    pub bid_eval_end: Option<NaiveDate>,
    #[arg(long, value_parser = parse_date)]
    pub post_qual_start: Option<NaiveDate>,
    #[arg(long, value_parser = parse_date)]
    pub post_qual_end: Option<NaiveDate>,
    /// BAC resolution date
    #[arg(long, value_parser = parse_date)]
    pub reso: Option<NaiveDate>,
    /// Notice of award date
    #[arg(long, value_parser = parse_date)]
    pub noa: Option<NaiveDate>,
    /// Notice to proceed date
    #[arg(long, value_parser = parse_date)]
    pub ntp: Option<NaiveDate>,
    #[arg(long, value_parser = parse_date)]
    pub ntp_received: Option<NaiveDate>,
    #[arg(long, value_parser = parse_date)]
    pub contract_date: Option<NaiveDate>,
}

impl From<MilestoneArgs> for MilestoneUpdate {
    fn from(args: MilestoneArgs) -> Self {
        MilestoneUpdate {
            contract_amount: args.amount,
            contractor: args.contractor,
            bid_eval_start: args.bid_eval_start,
            bid_eval_end: args.bid_eval_end,
            post_qual_start: args.post_qual_start,
            post_qual_end: args.post_qual_end,
            reso: args.reso,
            noa: args.noa,
            ntp: args.ntp,
            ntp_received: args.ntp_received,
            contract_date: args.contract_date,
        }
    }
}

// =============================================================================
// Contractors
// =============================================================================

#[derive(Debug, Subcommand)]
pub enum ContractorCommands {
    /// Add a contractor
    Add {
        name: String,
        #[arg(long)]
        address: String,
        #[command(flatten)]
        details: ContractorArgs,
    },

    /// Show a contractor by name or ID
    Show {
        name: String,
    },

    /// List every contractor
    List,

    /// Search names and addresses
    Search {
        query: String,
        #[arg(short, long)]
        limit: Option<u32>,
    },

    /// Change a contractor's details
    Update {
        name: String,
        /// New name
        #[arg(long)]
        rename: Option<String>,
        #[arg(long)]
        address: Option<String>,
        #[command(flatten)]
        details: ContractorArgs,
    },

    /// Delete a contractor
    Delete {
        name: String,
    },
}

/// Optional contractor fields.
#[derive(Debug, Clone, Default, Args)]
pub struct ContractorArgs {
    #[arg(long)]
    pub email: Option<String>,
    /// Authorized managing officer
    #[arg(long)]
    pub amo: Option<String>,
    #[arg(long)]
    pub designation: Option<String>,
    #[arg(long)]
    pub tin: Option<String>,
}

// =============================================================================
// Import / Export
// =============================================================================

#[derive(Debug, Subcommand)]
pub enum ImportCommands {
    /// Import contracts into the current register
    Contracts { file: PathBuf },
    /// Import contractors (rows are matched by email)
    Contractors { file: PathBuf },
}

#[derive(Debug, Subcommand)]
pub enum ExportCommands {
    /// Export contracts from the current register
    Contracts {
        file: PathBuf,
        #[arg(long)]
        year: Option<String>,
        #[arg(long, value_parser = parse_status)]
        status: Option<ContractStatus>,
    },
    /// Export the contractor directory
    Contractors { file: PathBuf },
}

// =============================================================================
// Documents
// =============================================================================

#[derive(Debug, Args)]
pub struct DocArgs {
    /// Output directory (default: documents.output_dir)
    #[arg(long, global = true)]
    pub out: Option<PathBuf>,

    /// Template directory (default: documents.template_dir)
    #[arg(long, global = true)]
    pub templates: Option<PathBuf>,

    #[command(subcommand)]
    pub kind: DocCommands,
}

#[derive(Debug, Subcommand)]
pub enum DocCommands {
    /// Three-strike memo, transmittal and per-bidder forms
    Strike {
        #[arg(long = "contract")]
        contract_id: String,
        /// Contract name (default: the stored project name)
        #[arg(long)]
        name: Option<String>,
        /// Approved budget (default: the stored contract amount)
        #[arg(long, value_parser = parse_amount)]
        budget: Option<Amount>,
        /// Memo date (default: today)
        #[arg(long, value_parser = parse_date)]
        date: Option<NaiveDate>,
        /// Infrastructure, "Goods and Services" or Consultancy
        #[arg(long)]
        category: Option<String>,
        /// Bidder as "name|address|tel no|PhilGEPS reg" (repeatable)
        #[arg(long = "bidder", value_parser = parse_bidder, required = true)]
        bidders: Vec<Bidder>,
    },

    /// Bid receipt for one bidder
    BidReceipt {
        #[arg(long = "contract")]
        contract_id: String,
        #[arg(long)]
        project_name: Option<String>,
        #[arg(long)]
        location: String,
        #[arg(long, value_parser = parse_date)]
        date: Option<NaiveDate>,
        #[arg(long)]
        representative: Option<String>,
        #[arg(long)]
        designation: Option<String>,
        #[arg(long)]
        contractor: Option<String>,
        #[arg(long)]
        address: Option<String>,
    },

    /// Posting memo and certificate for the public information office
    PioMemo {
        #[arg(long)]
        cert_type: String,
        #[arg(long, value_parser = parse_date)]
        memo_date: NaiveDate,
        #[arg(long, value_parser = parse_date)]
        start_date: NaiveDate,
        #[arg(long, value_parser = parse_date)]
        end_date: NaiveDate,
        #[arg(long, value_parser = parse_date)]
        cert_date: NaiveDate,
        /// Contract as "ID" or "ID=Project name" (repeatable)
        #[arg(long = "contract", value_parser = parse_pio_contract, required = true)]
        contracts: Vec<(String, Option<String>)>,
    },

    /// Bond certification
    Bond {
        #[arg(long = "contract")]
        contract_id: String,
        #[arg(long)]
        bond_type: String,
        #[arg(long)]
        insurance_company: String,
        #[arg(long, value_parser = parse_date)]
        date_validated: Option<NaiveDate>,
        /// Bond amount as it should be spelled out (default: the stored
        /// contract amount)
        #[arg(long, value_parser = parse_amount_text)]
        amount: Option<String>,
        #[arg(long)]
        contractor: Option<String>,
        #[arg(long, default_value = "")]
        project_no: String,
        #[arg(long)]
        project_name: Option<String>,
        /// Person the certification is addressed to
        #[arg(long = "to", default_value = "")]
        the_who: String,
        #[arg(long, default_value = "")]
        designation: String,
    },

    /// Obligation request with labor / material / equipment split
    Oblig {
        #[arg(long = "contract")]
        contract_id: String,
        #[arg(long)]
        fund: String,
        #[arg(long, value_parser = parse_date)]
        date: Option<NaiveDate>,
        #[arg(long, value_parser = parse_amount)]
        amount: Option<Amount>,
        #[arg(long)]
        contractor: Option<String>,
        #[arg(long)]
        address: Option<String>,
        #[arg(long)]
        tin: Option<String>,
        #[arg(long, default_value = "")]
        pmis: String,
        /// Contract name (default: the stored project name)
        #[arg(long)]
        name: Option<String>,
        #[arg(long, default_value_t = 0)]
        labor: u64,
        #[arg(long, default_value_t = 0)]
        material: u64,
        #[arg(long, default_value_t = 0)]
        equipment: u64,
        #[arg(long, default_value = "")]
        saro: String,
        #[arg(long, default_value = "")]
        source_of_fund: String,
        #[arg(long, default_value = "")]
        uacs: String,
        #[arg(long)]
        year: Option<String>,
        #[arg(long, default_value = "")]
        end_user: String,
        #[arg(long, default_value = "")]
        designation: String,
        #[arg(long, default_value = "")]
        end_user_title: String,
    },
}

// =============================================================================
// Settings
// =============================================================================

#[derive(Debug, Subcommand)]
pub enum SettingsCommands {
    Get { key: String },
    Set { key: String, value: String },
    /// Remove a stored value so the default applies
    Reset { key: String },
    List,
}

// =============================================================================
// Value Parsers
// =============================================================================

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    parse_flexible(s).map_err(|e| e.to_string())
}

fn parse_amount(s: &str) -> Result<Amount, String> {
    Amount::parse(s).map_err(|e| e.to_string())
}

/// Checks the amount but keeps the text, so a typed `.00` survives.
fn parse_amount_text(s: &str) -> Result<String, String> {
    parse_amount(s).map(|_| s.trim().to_string())
}

fn parse_register(s: &str) -> Result<Register, String> {
    s.parse().map_err(|e: procura_core::ValidationError| e.to_string())
}

fn parse_status(s: &str) -> Result<ContractStatus, String> {
    s.parse().map_err(|e: procura_core::ValidationError| e.to_string())
}

/// `ID=Project name`
fn parse_new_contract(s: &str) -> Result<NewContract, String> {
    let (id, name) = s
        .split_once('=')
        .ok_or_else(|| format!("expected ID=Project name, got '{}'", s))?;
    Ok(NewContract {
        contract_id: id.trim().to_string(),
        project_name: name.trim().to_string(),
    })
}

/// `ID` or `ID=Project name`
fn parse_pio_contract(s: &str) -> Result<(String, Option<String>), String> {
    let (id, name) = match s.split_once('=') {
        Some((id, name)) => (id, Some(name.trim().to_string())),
        None => (s, None),
    };
    if id.trim().is_empty() {
        return Err("contract ID is empty".to_string());
    }
    Ok((id.trim().to_string(), name))
}

/// `name|address|tel no|PhilGEPS reg`; trailing fields may be left off.
fn parse_bidder(s: &str) -> Result<Bidder, String> {
    let mut fields = s.split('|').map(str::trim);
    let name = fields.next().unwrap_or_default();
    if name.is_empty() {
        return Err("bidder name is empty".to_string());
    }
    let mut next = || fields.next().unwrap_or_default().to_string();
    Ok(Bidder {
        name: name.to_string(),
        address: next(),
        tel_no: next(),
        phil_reg: next(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_create_batch() {
        let cli = Cli::try_parse_from([
            "procura",
            "contract",
            "create",
            "--batch",
            "3",
            "--posting",
            "2024-03-04",
            "--pre-bid",
            "03/11/2024",
            "--bidding",
            "March 18, 2024",
            "--contract",
            "24ID0001=Road Repair",
            "--contract",
            "24ID0002=Bridge Widening",
        ])
        .unwrap();

        match cli.command {
            Some(Commands::Contract(ContractCommands::Create {
                pre_bid, contracts, ..
            })) => {
                assert_eq!(pre_bid, NaiveDate::from_ymd_opt(2024, 3, 11).unwrap());
                assert_eq!(contracts.len(), 2);
                assert_eq!(contracts[1].project_name, "Bridge Widening");
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_global_flags() {
        let cli = Cli::try_parse_from(["procura", "contract", "list", "--register", "goods", "--json"])
            .unwrap();
        assert_eq!(cli.register, Some(Register::Goods));
        assert!(cli.json);

        assert!(Cli::try_parse_from(["procura", "--register", "services", "contract", "list"]).is_err());
    }

    #[test]
    fn test_bulk_update_milestones() {
        let cli = Cli::try_parse_from([
            "procura",
            "contract",
            "bulk-update",
            "24ID0001",
            "24ID0002",
            "--noa",
            "2024-04-01",
            "--amount",
            "1,250,000.50",
        ])
        .unwrap();

        let Some(Commands::Contract(ContractCommands::BulkUpdate {
            contract_ids,
            milestones,
        })) = cli.command
        else {
            panic!("expected bulk-update");
        };
        assert_eq!(contract_ids, vec!["24ID0001", "24ID0002"]);
        let update = MilestoneUpdate::from(milestones);
        assert_eq!(update.contract_amount, Some(Amount::from_centavos(125_000_050)));
        assert_eq!(update.implied_status(), Some(ContractStatus::Awarded));
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(Cli::try_parse_from(["procura", "contract", "status", "24ID0001", "done"]).is_err());
        assert!(Cli::try_parse_from([
            "procura", "contract", "update", "24ID0001", "--noa", "not a date"
        ])
        .is_err());
        assert!(Cli::try_parse_from([
            "procura", "contract", "checklist", "/tmp", "--present", "--missing"
        ])
        .is_err());
    }

    #[test]
    fn test_bond_amount_keeps_typed_text() {
        let cli = Cli::try_parse_from([
            "procura",
            "doc",
            "bond",
            "--contract",
            "24ID0001",
            "--bond-type",
            "PERFORMANCE BOND",
            "--insurance-company",
            "Bohol Surety",
            "--amount",
            " 1500000.00 ",
        ])
        .unwrap();

        let Some(Commands::Doc(DocArgs {
            kind: DocCommands::Bond { amount, .. },
            ..
        })) = cli.command
        else {
            panic!("expected doc bond");
        };
        assert_eq!(amount.as_deref(), Some("1500000.00"));

        assert!(Cli::try_parse_from([
            "procura", "doc", "bond", "--contract", "24ID0001", "--bond-type", "PERFORMANCE BOND",
            "--insurance-company", "X", "--amount", "lots"
        ])
        .is_err());
    }

    #[test]
    fn test_parse_bidder() {
        let bidder = parse_bidder("ACME | Tagbilaran City | 411-0000 | PG-1").unwrap();
        assert_eq!(bidder.name, "ACME");
        assert_eq!(bidder.phil_reg, "PG-1");

        let short = parse_bidder("Beta Corp").unwrap();
        assert_eq!(short.address, "");
        assert!(parse_bidder(" | addr").is_err());
    }

    #[test]
    fn test_parse_pio_contract() {
        assert_eq!(
            parse_pio_contract("24ID0001=Road Repair").unwrap(),
            ("24ID0001".to_string(), Some("Road Repair".to_string()))
        );
        assert_eq!(parse_pio_contract("24ID0002").unwrap(), ("24ID0002".to_string(), None));
    }
}
