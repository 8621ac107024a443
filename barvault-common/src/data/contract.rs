//! Instrument descriptors and the canonical key codec.
//!
//! A stored dataset is addressed by a canonical string key. Keys are either
//! taken verbatim from the caller (`Symbol::Raw`) or derived from a
//! structured [`Contract`] as `"{local_symbol}_{sec_type}"`. The derivation
//! uses only descriptor fields, so the same contract always maps to the same
//! key across process restarts.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::data::errors::{DataError, DataResult};

/// Security type tags, matching the broker wire names.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SecType {
    #[default]
    Stk,
    Fut,
    ContFut,
    Opt,
    Fop,
    Cash,
    Ind,
    Cmdty,
    Bag,
}

impl SecType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SecType::Stk => "STK",
            SecType::Fut => "FUT",
            SecType::ContFut => "CONTFUT",
            SecType::Opt => "OPT",
            SecType::Fop => "FOP",
            SecType::Cash => "CASH",
            SecType::Ind => "IND",
            SecType::Cmdty => "CMDTY",
            SecType::Bag => "BAG",
        }
    }
}

impl fmt::Display for SecType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SecType {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "STK" => Ok(SecType::Stk),
            "FUT" => Ok(SecType::Fut),
            "CONTFUT" => Ok(SecType::ContFut),
            "OPT" => Ok(SecType::Opt),
            "FOP" => Ok(SecType::Fop),
            "CASH" => Ok(SecType::Cash),
            "IND" => Ok(SecType::Ind),
            "CMDTY" => Ok(SecType::Cmdty),
            "BAG" => Ok(SecType::Bag),
            other => Err(DataError::Parse(format!("unknown security type: {other}"))),
        }
    }
}

/// Structured identifier for a tradable instrument.
///
/// Immutable from the store's perspective; the store only derives keys and
/// metadata from it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contract {
    pub symbol: String,
    pub local_symbol: String,
    pub sec_type: SecType,
    #[serde(default)]
    pub exchange: String,
    #[serde(default)]
    pub currency: String,
    /// Last trade date or contract month for derivatives, broker format
    /// (`YYYYMM` or `YYYYMMDD`).
    #[serde(default)]
    pub last_trade_date: Option<String>,
    #[serde(default)]
    pub multiplier: Option<String>,
}

impl Contract {
    pub fn new(local_symbol: &str, sec_type: SecType) -> Self {
        Self {
            symbol: local_symbol.to_string(),
            local_symbol: local_symbol.to_string(),
            sec_type,
            ..Self::default()
        }
    }

    pub fn stock(symbol: &str) -> Self {
        Self::new(symbol, SecType::Stk)
    }

    pub fn future(symbol: &str, local_symbol: &str, last_trade_date: &str) -> Self {
        Self {
            symbol: symbol.to_string(),
            local_symbol: local_symbol.to_string(),
            sec_type: SecType::Fut,
            last_trade_date: Some(last_trade_date.to_string()),
            ..Self::default()
        }
    }

    pub fn cont_future(symbol: &str, exchange: &str) -> Self {
        Self {
            symbol: symbol.to_string(),
            local_symbol: symbol.to_string(),
            sec_type: SecType::ContFut,
            exchange: exchange.to_string(),
            ..Self::default()
        }
    }

    /// Canonical key for this contract: `"{local_symbol}_{sec_type}"`.
    pub fn key(&self) -> String {
        format!("{}_{}", self.local_symbol, self.sec_type)
    }

    /// Compact human-readable rendering, e.g.
    /// `Contract(secType=FUT, symbol=ES, localSymbol=ESM6, lastTradeDate=20260618)`.
    ///
    /// Re-parseable via [`Contract::parse_repr`]; empty fields are omitted.
    pub fn to_repr(&self) -> String {
        let mut fields = vec![format!("secType={}", self.sec_type)];
        if !self.symbol.is_empty() {
            fields.push(format!("symbol={}", self.symbol));
        }
        if !self.local_symbol.is_empty() {
            fields.push(format!("localSymbol={}", self.local_symbol));
        }
        if !self.exchange.is_empty() {
            fields.push(format!("exchange={}", self.exchange));
        }
        if !self.currency.is_empty() {
            fields.push(format!("currency={}", self.currency));
        }
        if let Some(date) = &self.last_trade_date {
            fields.push(format!("lastTradeDate={date}"));
        }
        if let Some(mult) = &self.multiplier {
            fields.push(format!("multiplier={mult}"));
        }
        format!("Contract({})", fields.join(", "))
    }

    /// Reconstruct a contract from its `repr` string.
    ///
    /// This is a deterministic parse of the rendering produced by
    /// [`Contract::to_repr`], not code evaluation.
    pub fn parse_repr(repr: &str) -> DataResult<Self> {
        let body = repr
            .strip_prefix("Contract(")
            .and_then(|rest| rest.strip_suffix(')'))
            .ok_or_else(|| DataError::Parse(format!("not a contract repr: {repr}")))?;

        let mut contract = Contract::default();
        for field in body.split(", ").filter(|f| !f.is_empty()) {
            let (name, value) = field
                .split_once('=')
                .ok_or_else(|| DataError::Parse(format!("malformed repr field: {field}")))?;
            match name {
                "secType" => contract.sec_type = value.parse()?,
                "symbol" => contract.symbol = value.to_string(),
                "localSymbol" => contract.local_symbol = value.to_string(),
                "exchange" => contract.exchange = value.to_string(),
                "currency" => contract.currency = value.to_string(),
                "lastTradeDate" => contract.last_trade_date = Some(value.to_string()),
                "multiplier" => contract.multiplier = Some(value.to_string()),
                other => {
                    return Err(DataError::Parse(format!("unknown repr field: {other}")));
                }
            }
        }
        Ok(contract)
    }
}

/// A store key as supplied by the caller: either a raw string used verbatim
/// or a structured contract the key is derived from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Symbol {
    Raw(String),
    Contract(Contract),
}

impl Symbol {
    /// The canonical key this symbol addresses.
    pub fn key(&self) -> String {
        match self {
            Symbol::Raw(s) => s.clone(),
            Symbol::Contract(c) => c.key(),
        }
    }

    pub fn contract(&self) -> Option<&Contract> {
        match self {
            Symbol::Raw(_) => None,
            Symbol::Contract(c) => Some(c),
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key())
    }
}

impl From<&str> for Symbol {
    fn from(s: &str) -> Self {
        Symbol::Raw(s.to_string())
    }
}

impl From<String> for Symbol {
    fn from(s: String) -> Self {
        Symbol::Raw(s)
    }
}

impl From<Contract> for Symbol {
    fn from(c: Contract) -> Self {
        Symbol::Contract(c)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_uses_local_symbol_and_sec_type_only() {
        let mut a = Contract::future("ES", "ESM6", "20260618");
        let mut b = Contract::future("ES", "ESM6", "20260618");
        a.exchange = "CME".to_string();
        b.exchange = "GLOBEX".to_string();
        b.currency = "USD".to_string();
        assert_eq!(a.key(), b.key());
        assert_eq!(a.key(), "ESM6_FUT");
    }

    #[test]
    fn raw_symbol_is_passthrough() {
        let sym = Symbol::from("NQZ5_FUT");
        assert_eq!(sym.key(), "NQZ5_FUT");
    }

    #[test]
    fn repr_round_trips() {
        let mut contract = Contract::future("ES", "ESM6", "20260618");
        contract.exchange = "CME".to_string();
        contract.currency = "USD".to_string();
        contract.multiplier = Some("50".to_string());

        let parsed = Contract::parse_repr(&contract.to_repr()).unwrap();
        assert_eq!(parsed, contract);
        assert_eq!(parsed.key(), contract.key());
    }

    #[test]
    fn repr_omits_empty_fields() {
        let contract = Contract::stock("AAPL");
        let repr = contract.to_repr();
        assert!(!repr.contains("exchange"));
        assert!(!repr.contains("lastTradeDate"));
        assert_eq!(Contract::parse_repr(&repr).unwrap(), contract);
    }

    #[test]
    fn repr_parse_rejects_garbage() {
        assert!(Contract::parse_repr("ESM6_FUT").is_err());
        assert!(Contract::parse_repr("Contract(secType=???)").is_err());
        assert!(Contract::parse_repr("Contract(bogus=1)").is_err());
    }

    #[test]
    fn sec_type_tags_round_trip() {
        for tag in ["STK", "FUT", "CONTFUT", "OPT", "CASH"] {
            let parsed: SecType = tag.parse().unwrap();
            assert_eq!(parsed.to_string(), tag);
        }
    }
}
