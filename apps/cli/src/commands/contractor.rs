//! # Contractor Commands
//!
//! The contractor directory: the firms whose name, address, TIN and
//! managing officer end up on bond certificates and obligation requests.

use tracing::{debug, info};

use procura_core::{Contractor, ContractorInput};

use crate::error::ApiError;
use crate::state::{DbState, Session};

const SEARCH_DEFAULT_LIMIT: u32 = 20;
const SEARCH_MAX_LIMIT: u32 = 100;

/// Adds a contractor.
pub async fn add_contractor(
    db: &DbState,
    session: &Session,
    input: ContractorInput,
) -> Result<Contractor, ApiError> {
    debug!(user = %session.username, name = %input.name, "add_contractor command");
    let contractor = db.contractors().insert(&input).await?;
    info!(id = %contractor.id, name = %contractor.name, "Contractor added");
    Ok(contractor)
}

/// Gets a contractor by exact name, falling back to its UUID.
pub async fn get_contractor(db: &DbState, name_or_id: &str) -> Result<Contractor, ApiError> {
    debug!(key = %name_or_id, "get_contractor command");
    let repo = db.contractors();
    if let Some(found) = repo.get_by_name(name_or_id.trim()).await? {
        return Ok(found);
    }
    repo.get_by_id(name_or_id.trim())
        .await?
        .ok_or_else(|| ApiError::not_found("Contractor", name_or_id))
}

/// Lists every contractor by name.
pub async fn list_contractors(db: &DbState) -> Result<Vec<Contractor>, ApiError> {
    debug!("list_contractors command");
    Ok(db.contractors().list().await?)
}

/// Searches contractor names and addresses.
pub async fn search_contractors(
    db: &DbState,
    query: &str,
    limit: Option<u32>,
) -> Result<Vec<Contractor>, ApiError> {
    let limit = limit.unwrap_or(SEARCH_DEFAULT_LIMIT).min(SEARCH_MAX_LIMIT);
    debug!(query = %query, limit = %limit, "search_contractors command");
    Ok(db.contractors().search(query, limit).await?)
}

/// Overlays the non-empty fields of `changes` on a stored contractor.
pub async fn update_contractor(
    db: &DbState,
    session: &Session,
    name_or_id: &str,
    changes: ContractorInput,
) -> Result<Contractor, ApiError> {
    debug!(user = %session.username, key = %name_or_id, "update_contractor command");
    let existing = get_contractor(db, name_or_id).await?;

    let current = ContractorInput {
        name: existing.name,
        address: existing.address,
        email: existing.email,
        amo: existing.amo,
        designation: existing.designation,
        tin: existing.tin,
    };
    let updated = db
        .contractors()
        .update(&existing.id, &current.merge(changes))
        .await?;

    info!(id = %updated.id, "Contractor updated");
    Ok(updated)
}

/// Deletes a contractor.
pub async fn delete_contractor(db: &DbState, session: &Session, name_or_id: &str) -> Result<(), ApiError> {
    debug!(user = %session.username, key = %name_or_id, "delete_contractor command");
    let existing = get_contractor(db, name_or_id).await?;
    db.contractors().delete(&existing.id).await?;
    info!(name = %existing.name, "Contractor deleted");
    Ok(())
}
