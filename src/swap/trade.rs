//! Trade as handed over by the routing SDK.

use anyhow::{bail, Result};
use num_bigint::BigInt;
use num_traits::Signed;
use serde::Serialize;

use crate::chains::ChainProfile;

use super::fraction::{Fraction, Percent};

/// Label of the native currency when the chain is unknown.
const DEFAULT_NATIVE_LABEL: &str = "ETH";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    pub address: String,
    pub symbol: String,
    pub decimals: u8,
}

impl Token {
    pub fn new(address: impl Into<String>, symbol: impl Into<String>, decimals: u8) -> Self {
        Self {
            address: address.into(),
            symbol: symbol.into(),
            decimals,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Currency {
    /// ETH / BNB
    Native,
    Token(Token),
}

impl Currency {
    pub fn decimals(&self) -> u8 {
        match self {
            Currency::Native => 18,
            Currency::Token(token) => token.decimals,
        }
    }

    /// Display symbol; native currencies take the chain's label.
    pub fn symbol(&self, chain: Option<&ChainProfile>) -> String {
        match self {
            Currency::Native => chain
                .map(|c| c.reference.label())
                .unwrap_or(DEFAULT_NATIVE_LABEL)
                .to_string(),
            Currency::Token(token) => token.symbol.clone(),
        }
    }

    /// Symbol of the token actually traded (WETH for ETH).
    pub fn wrapped_symbol(&self, chain: Option<&ChainProfile>) -> String {
        match self {
            Currency::Native => chain
                .map(|c| c.reference.wrapped_symbol())
                .unwrap_or("WETH")
                .to_string(),
            Currency::Token(token) => token.symbol.clone(),
        }
    }
}

/// Raw (smallest unit) amount of a currency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrencyAmount {
    pub currency: Currency,
    pub raw: BigInt,
}

impl CurrencyAmount {
    pub fn from_raw(currency: Currency, raw: impl Into<BigInt>) -> Self {
        Self {
            currency,
            raw: raw.into(),
        }
    }

    /// Decimal-adjusted value.
    pub fn to_fraction(&self) -> Fraction {
        let scale = num_traits::pow(BigInt::from(10u8), self.currency.decimals() as usize);
        Fraction::new(self.raw.clone(), scale).unwrap_or_else(|_| Fraction::from_integer(0))
    }

    pub fn to_significant(&self, digits: u32) -> String {
        self.to_fraction().to_significant(digits)
    }

    pub fn to_fixed(&self, decimals: u32) -> String {
        self.to_fraction().to_fixed(decimals)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TradeType {
    ExactInput,
    ExactOutput,
}

/// A routed trade: amounts, token path and the raw (fee-inclusive) price impact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trade {
    pub trade_type: TradeType,
    pub input_amount: CurrencyAmount,
    pub output_amount: CurrencyAmount,
    /// Tokens visited, input first
    pub path: Vec<Token>,
    pub price_impact: Percent,
}

impl Trade {
    pub fn new(
        trade_type: TradeType,
        input_amount: CurrencyAmount,
        output_amount: CurrencyAmount,
        path: Vec<Token>,
        price_impact: Percent,
    ) -> Result<Self> {
        if path.len() < 2 {
            bail!("A trade route needs at least two tokens, got {}", path.len());
        }
        if input_amount.raw.is_negative() || output_amount.raw.is_negative() {
            bail!("Trade amounts must not be negative");
        }
        Ok(Self {
            trade_type,
            input_amount,
            output_amount,
            path,
            price_impact,
        })
    }

    /// Number of pairs traversed.
    pub fn hops(&self) -> usize {
        self.path.len().saturating_sub(1)
    }

    /// Least output accepted under `slippage`. Exact-output trades return
    /// the output unchanged.
    pub fn minimum_amount_out(&self, slippage: &Percent) -> CurrencyAmount {
        match self.trade_type {
            TradeType::ExactOutput => self.output_amount.clone(),
            TradeType::ExactInput => {
                let adjusted = Fraction::one()
                    .add(slippage.fraction())
                    .invert()
                    .map(|inverse| {
                        inverse
                            .multiply(&Fraction::from_integer(self.output_amount.raw.clone()))
                            .quotient()
                    })
                    .unwrap_or_else(|| self.output_amount.raw.clone());
                CurrencyAmount::from_raw(self.output_amount.currency.clone(), adjusted)
            },
        }
    }

    /// Most input spent under `slippage`. Exact-input trades return the
    /// input unchanged.
    pub fn maximum_amount_in(&self, slippage: &Percent) -> CurrencyAmount {
        match self.trade_type {
            TradeType::ExactInput => self.input_amount.clone(),
            TradeType::ExactOutput => {
                let adjusted = Fraction::one()
                    .add(slippage.fraction())
                    .multiply(&Fraction::from_integer(self.input_amount.raw.clone()))
                    .quotient();
                CurrencyAmount::from_raw(self.input_amount.currency.clone(), adjusted)
            },
        }
    }

    /// Route rendered as `A > B > C`.
    pub fn route(&self) -> String {
        self.path
            .iter()
            .map(|token| token.symbol.as_str())
            .collect::<Vec<_>>()
            .join(" > ")
    }
}
