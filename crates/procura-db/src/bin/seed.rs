//! # Seed Data Generator
//!
//! Populates a development database with sample contracts and contractors.
//!
//! ## Usage
//! ```bash
//! # 6 batches of 8 contracts (default)
//! cargo run -p procura-db --bin seed
//!
//! # More batches, into the goods register
//! cargo run -p procura-db --bin seed -- --batches 12 --register goods
//!
//! # Specify database path
//! cargo run -p procura-db --bin seed -- --db ./data/procura.db
//! ```
//!
//! ## Generated Data
//! - Contractors drawn from a fixed list of Bohol firms
//! - Batches posted two weeks apart, every date moved onto a working day
//! - Older batches carry resolution, NOA and NTP dates so the dashboard
//!   shows every status

use chrono::{Datelike, Duration, NaiveDate};
use std::env;

use procura_core::dates::working_day_check;
use procura_core::{Amount, ContractorInput, MilestoneUpdate, NewBatch, NewContract, Register};
use procura_db::{Database, DbConfig};

const CONTRACTORS: &[(&str, &str)] = &[
    ("Tagbilaran Builders Corp.", "CPG Avenue, Tagbilaran City, Bohol"),
    ("Loboc River Construction", "Poblacion, Loboc, Bohol"),
    ("Chocolate Hills Engineering", "Carmen, Bohol"),
    ("Panglao Coastal Works", "Tawala, Panglao, Bohol"),
    ("Jagna Port Development Inc.", "Pagina, Jagna, Bohol"),
    ("Ubay Agro-Industrial Supply", "Poblacion, Ubay, Bohol"),
];

const PROJECTS: &[&str] = &[
    "Construction of Multi-Purpose Building",
    "Rehabilitation of Provincial Road",
    "Concreting of Farm-to-Market Road",
    "Construction of Drainage System",
    "Improvement of Public Market",
    "Construction of Flood Control Structure",
    "Repair of School Building",
    "Installation of Solar Street Lights",
];

/// Moves a date forward to the next working day.
fn next_working_day(mut date: NaiveDate) -> NaiveDate {
    while !working_day_check(date).is_working() {
        date += Duration::days(1);
    }
    date
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut batches: usize = 6;
    let mut db_path = String::from("./procura_dev.db");
    let mut register = Register::Contracts;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--batches" | "-b" => {
                if i + 1 < args.len() {
                    batches = args[i + 1].parse().unwrap_or(6);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--register" | "-r" => {
                if i + 1 < args.len() {
                    register = args[i + 1].parse()?;
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Procura Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -b, --batches <N>      Number of batches to create (default: 6)");
                println!("  -d, --db <PATH>        Database file path (default: ./procura_dev.db)");
                println!("  -r, --register <NAME>  contracts | goods (default: contracts)");
                println!("  -h, --help             Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Procura Seed Data Generator");
    println!("==============================");
    println!("Database: {}", db_path);
    println!("Register: {}", register);
    println!("Batches:  {}", batches);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let repo = db.contracts(register);
    let existing = repo.search("", None, 1).await?;
    if !existing.is_empty() {
        println!("⚠ The {} register already has contracts", register);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    for (name, address) in CONTRACTORS {
        db.contractors()
            .upsert_by_email(&ContractorInput {
                name: name.to_string(),
                address: address.to_string(),
                ..Default::default()
            })
            .await?;
    }
    println!("✓ {} contractors", CONTRACTORS.len());

    let start = std::time::Instant::now();
    let first_posting = NaiveDate::from_ymd_opt(2024, 1, 8).ok_or("invalid start date")?;
    let prefix = if register == Register::Goods { "G" } else { "ID" };
    let mut created = 0usize;

    for b in 0..batches {
        let posting = next_working_day(first_posting + Duration::weeks(2 * b as i64));
        let pre_bid = next_working_day(posting + Duration::days(7));
        let bidding = next_working_day(posting + Duration::days(21));
        let yy = posting.year() % 100;

        let batch = NewBatch {
            batch: (b + 1).to_string(),
            year: posting.year().to_string(),
            posting,
            pre_bid,
            bidding,
            contracts: PROJECTS
                .iter()
                .enumerate()
                .map(|(p, project)| NewContract {
                    contract_id: format!("{yy:02}{prefix}{:04}", b * PROJECTS.len() + p + 1),
                    project_name: format!("{} - Batch {}", project, b + 1),
                })
                .collect(),
        };

        let contracts = repo.insert_batch(&batch).await?;
        created += contracts.len();

        // The oldest batches progress furthest
        let age = batches - b;
        for (n, contract) in contracts.iter().enumerate() {
            let (name, _) = CONTRACTORS[(b + n) % CONTRACTORS.len()];
            let mut update = MilestoneUpdate {
                reso: Some(next_working_day(bidding + Duration::days(10))),
                contractor: Some(name.to_string()),
                contract_amount: Some(Amount::from_centavos(
                    (1_250_000 + (n as i64 * 337_150) + (b as i64 * 91_010)) * 100 + 50,
                )),
                ..Default::default()
            };
            if age >= 3 {
                update.noa = Some(next_working_day(bidding + Duration::days(17)));
            }
            if age >= 4 && n % 2 == 0 {
                update.ntp = Some(next_working_day(bidding + Duration::days(30)));
            }
            if age >= 2 {
                repo.update_milestones(&[contract.contract_id.clone()], &update)
                    .await?;
            }
        }

        println!("  Batch {} posted {}: {} contracts", b + 1, posting, contracts.len());
    }

    println!();
    println!("✓ Generated {} contracts in {:?}", created, start.elapsed());

    let summary = repo.dashboard("2024", 10).await?;
    println!(
        "  2024: {} posted, {} awarded, {} proceed",
        summary.posted, summary.awarded, summary.proceed
    );

    println!();
    println!("✓ Seed complete!");

    Ok(())
}
