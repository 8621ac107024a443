//! One-shot maintenance operations over an existing store.

use serde_json::json;
use tracing::{error, info};

use barvault_common::{BarStore, Contract, Metadata, Symbol};

use crate::broker::{MarketData, ProbeOrder};
use crate::errors::ServiceError;

/// Outcome of a metadata refresh batch.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct RefreshReport {
    pub updated: Vec<String>,
    pub skipped: Vec<String>,
}

/// Pull contract details from the market-data connection and update metadata
/// in the store.
///
/// When `keys` is `None`, every key in the store is refreshed. A key whose
/// stored metadata is missing or cannot be turned back into a contract is
/// logged and skipped; one bad key never blocks the rest of the batch.
/// Broker and storage failures are not masked.
pub async fn update_details(
    broker: &dyn MarketData,
    store: &dyn BarStore,
    keys: Option<&[String]>,
) -> Result<RefreshReport, ServiceError> {
    let keys: Vec<String> = match keys {
        Some(keys) => keys.to_vec(),
        None => store.keys().await?,
    };

    let mut report = RefreshReport::default();
    let mut contracts: Vec<(String, Contract)> = Vec::new();
    for key in keys {
        let meta = match store.read_metadata(&Symbol::from(key.clone())).await? {
            Some(meta) => meta,
            None => {
                error!("Metadata missing for {}", key);
                report.skipped.push(key);
                continue;
            }
        };
        match meta.contract() {
            Ok(contract) => contracts.push((key, contract)),
            Err(e) => {
                error!("Cannot reconstruct contract for {}: {}", key, e);
                report.skipped.push(key);
            }
        }
    }

    let mut qualified: Vec<Contract> = contracts.iter().map(|(_, c)| c.clone()).collect();
    broker.qualify_contracts(&mut qualified).await?;

    let order = ProbeOrder::default();
    for ((key, _), contract) in contracts.into_iter().zip(qualified) {
        let details = broker.contract_details(&contract).await?;
        let estimate = broker.what_if_order(&contract, &order).await?;

        let mut fields = Metadata::new();
        fields.insert("name", json!(details.long_name));
        fields.insert("min_tick", json!(details.min_tick));
        fields.insert("commission", json!(estimate.commission));
        store
            .write_metadata(&Symbol::from(key.clone()), fields)
            .await?;
        report.updated.push(key);
    }

    info!(
        "Refreshed details for {} keys, skipped {}",
        report.updated.len(),
        report.skipped.len()
    );
    Ok(report)
}
