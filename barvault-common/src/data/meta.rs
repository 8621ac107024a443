//! Metadata records attached to stored datasets.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::data::contract::{Contract, Symbol};
use crate::data::errors::{DataError, DataResult};

/// Descriptive attributes attached to a stored dataset.
///
/// For contract symbols this carries every non-default descriptor field, the
/// re-parseable `repr` string, the security-type tag and a structured copy of
/// the contract itself; raw string symbols carry no metadata. Caller-supplied
/// fields are merged on top, caller wins on collision.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Metadata {
    fields: BTreeMap<String, Value>,
}

impl Metadata {
    pub fn new() -> Self {
        Self::default()
    }

    /// Base metadata derived from a symbol. Empty for raw string keys.
    pub fn for_symbol(symbol: &Symbol) -> Self {
        let mut meta = Self::new();
        if let Some(c) = symbol.contract() {
            meta.insert("symbol", Value::String(c.symbol.clone()));
            meta.insert("localSymbol", Value::String(c.local_symbol.clone()));
            meta.insert("secType", Value::String(c.sec_type.to_string()));
            if !c.exchange.is_empty() {
                meta.insert("exchange", Value::String(c.exchange.clone()));
            }
            if !c.currency.is_empty() {
                meta.insert("currency", Value::String(c.currency.clone()));
            }
            if let Some(date) = &c.last_trade_date {
                meta.insert("lastTradeDate", Value::String(date.clone()));
            }
            if let Some(mult) = &c.multiplier {
                meta.insert("multiplier", Value::String(mult.clone()));
            }
            meta.insert("repr", Value::String(c.to_repr()));
            // Structured copy, so reconstruction is a parse rather than
            // evaluation of the repr string.
            meta.insert(
                "contract",
                serde_json::to_value(c).unwrap_or(Value::Null),
            );
        }
        meta
    }

    pub fn insert(&mut self, key: &str, value: Value) {
        self.fields.insert(key.to_string(), value);
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Merge `other` on top of this record; fields in `other` win.
    pub fn merge(&mut self, other: Metadata) {
        self.fields.extend(other.fields);
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// The stored `repr` string, when present.
    pub fn repr(&self) -> Option<&str> {
        self.fields.get("repr").and_then(Value::as_str)
    }

    /// Reconstruct the instrument descriptor this record was derived from.
    ///
    /// Prefers the structured `contract` field and falls back to parsing the
    /// `repr` string. A record carrying neither is malformed.
    pub fn contract(&self) -> DataResult<Contract> {
        if let Some(value) = self.fields.get("contract") {
            if !value.is_null() {
                if let Ok(contract) = serde_json::from_value(value.clone()) {
                    return Ok(contract);
                }
            }
        }
        match self.repr() {
            Some(repr) => Contract::parse_repr(repr),
            None => Err(DataError::MalformedRecord(
                "metadata has no contract or repr field".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn raw_symbols_carry_no_metadata() {
        let meta = Metadata::for_symbol(&Symbol::from("ESM6_FUT"));
        assert!(meta.is_empty());
    }

    #[test]
    fn contract_metadata_has_repr_and_sec_type() {
        let mut contract = Contract::future("ES", "ESM6", "20260618");
        contract.exchange = "CME".to_string();
        let meta = Metadata::for_symbol(&Symbol::from(contract.clone()));

        assert_eq!(meta.get("secType"), Some(&json!("FUT")));
        assert_eq!(meta.get("exchange"), Some(&json!("CME")));
        assert!(meta.get("currency").is_none());
        assert_eq!(meta.repr(), Some(contract.to_repr().as_str()));
        assert_eq!(meta.contract().unwrap(), contract);
    }

    #[test]
    fn caller_fields_win_on_merge() {
        let mut meta = Metadata::for_symbol(&Symbol::from(Contract::stock("AAPL")));
        let mut overrides = Metadata::new();
        overrides.insert("secType", json!("OVERRIDDEN"));
        overrides.insert("note", json!("backfill"));
        meta.merge(overrides);

        assert_eq!(meta.get("secType"), Some(&json!("OVERRIDDEN")));
        assert_eq!(meta.get("note"), Some(&json!("backfill")));
    }

    #[test]
    fn contract_falls_back_to_repr_parse() {
        let contract = Contract::cont_future("NQ", "CME");
        let mut meta = Metadata::new();
        meta.insert("repr", json!(contract.to_repr()));
        assert_eq!(meta.contract().unwrap(), contract);
    }

    #[test]
    fn contract_on_empty_record_is_malformed() {
        let meta = Metadata::new();
        assert!(matches!(
            meta.contract(),
            Err(DataError::MalformedRecord(_))
        ));
    }
}
