//! Top movers ranking for the ticker.

use rustc_hash::FxHashSet;
use serde::Serialize;

use crate::{models::ScreenerPair, utils::normalize_address};

/// Symbol fragments that keep a token off the ticker.
const BLOCKED_SYMBOLS: [&str; 2] = ["SCAM", "rebass"];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Mover {
    pub address: String,
    pub symbol: String,
    pub name: String,
    pub pair_address: String,
    pub price_usd: Option<f64>,
    pub price_change_24h: f64,
}

impl From<&ScreenerPair> for Mover {
    fn from(pair: &ScreenerPair) -> Self {
        Self {
            address: pair.base_token.address.clone(),
            symbol: pair.base_token.symbol.clone(),
            name: pair.base_token.name.clone(),
            pair_address: pair.pair_address.clone(),
            price_usd: pair.price_usd_value(),
            price_change_24h: pair.price_change_24h(),
        }
    }
}

/// Rule that slots a token ahead of the rest. Matching is case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pin {
    Symbol(String),
    Name(String),
    Address(String),
}

impl Pin {
    pub fn matches(&self, mover: &Mover) -> bool {
        match self {
            Pin::Symbol(symbol) => mover.symbol.eq_ignore_ascii_case(symbol),
            Pin::Name(name) => mover.name.eq_ignore_ascii_case(name),
            Pin::Address(address) => mover.address.eq_ignore_ascii_case(address),
        }
    }
}

fn is_blocked(symbol: &str) -> bool {
    BLOCKED_SYMBOLS.iter().any(|blocked| symbol.contains(blocked))
}

/// One entry per base token, pinned tokens first in pin order, then the
/// remaining pairs in input order. Blocked symbols are dropped.
pub fn rank_movers(pairs: &[ScreenerPair], pins: &[Pin]) -> Vec<Mover> {
    let movers: Vec<Mover> = pairs.iter().map(Mover::from).collect();

    let pinned = pins
        .iter()
        .flat_map(|pin| movers.iter().filter(move |mover| pin.matches(mover)));

    let mut seen: FxHashSet<String> = FxHashSet::default();
    pinned
        .chain(movers.iter())
        .filter(|mover| seen.insert(normalize_address(&mover.address)))
        .filter(|mover| !is_blocked(&mover.symbol))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ScreenerToken, ScreenerWindows};

    fn pair(address: &str, symbol: &str, name: &str, change: f64) -> ScreenerPair {
        ScreenerPair {
            pair_address: format!("{}-pair", address),
            base_token: ScreenerToken {
                address: address.to_string(),
                name: name.to_string(),
                symbol: symbol.to_string(),
            },
            price_usd: Some("0.5".to_string()),
            price_change: Some(ScreenerWindows {
                h24: Some(change),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    #[test]
    fn test_pins_first_then_unique_by_base_token() {
        let pairs = vec![
            pair("0xa", "AAA", "Alpha", 10.0),
            pair("0xb", "WCI", "Wci", 3.0),
            pair("0xA", "AAA", "Alpha", 99.0),
            pair("0xc", "KIBA", "Kiba Inu", -2.0),
            pair("0xd", "NOTASCAM", "Scam", 50.0),
            pair("0xe", "rebassed", "Rebase", 5.0),
        ];
        let pins = vec![
            Pin::Symbol("kiba".to_string()),
            Pin::Symbol("wci".to_string()),
            Pin::Address("0xD".to_string()),
        ];

        let ranked = rank_movers(&pairs, &pins);
        let symbols: Vec<&str> = ranked.iter().map(|m| m.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["KIBA", "WCI", "AAA"]);
        assert_eq!(ranked[2].price_change_24h, 10.0);
        assert_eq!(ranked[0].price_usd, Some(0.5));
    }

    #[test]
    fn test_no_pins_keeps_input_order() {
        let pairs = vec![pair("0x1", "ONE", "One", 1.0), pair("0x2", "TWO", "Two", 2.0)];
        let ranked = rank_movers(&pairs, &[]);
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].address, "0x1");
        assert!(rank_movers(&[], &[Pin::Name("kiba inu".to_string())]).is_empty());
    }
}
