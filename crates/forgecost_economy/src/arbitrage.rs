//! # Arbitrage Scanner
//!
//! Buy on one exchange at its ask, sell on another at its bid. Every ordered
//! pair of distinct exchanges is checked; pairs whose margin does not clear
//! a flat threshold (standing in for transfer costs) are dropped.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::catalog::MarketQuote;

/// Default minimum margin, in percent of the buy price.
pub const DEFAULT_MIN_PROFIT_PCT: f64 = 5.0;

/// Scanner thresholds.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArbitrageConfig {
    /// Opportunities must beat this margin (strictly).
    pub min_profit_pct: f64,
    /// Minimum supply on the buy side. 0 disables the filter.
    pub min_supply: f64,
    /// Minimum demand on the sell side. 0 disables the filter.
    pub min_demand: f64,
}

impl Default for ArbitrageConfig {
    fn default() -> Self {
        Self {
            min_profit_pct: DEFAULT_MIN_PROFIT_PCT,
            min_supply: 0.0,
            min_demand: 0.0,
        }
    }
}

/// A profitable buy/sell exchange pair.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ArbitrageOpportunity {
    /// Material.
    pub ticker: String,
    /// Exchange bought on.
    pub buy_exchange: String,
    /// Exchange sold on.
    pub sell_exchange: String,
    /// Ask on the buy exchange.
    pub buy_price: f64,
    /// Bid on the sell exchange.
    pub sell_price: f64,
    /// Profit per unit.
    pub profit: f64,
    /// Profit in percent of the buy price.
    pub profit_pct: f64,
    /// Units on offer at the buy exchange.
    pub available_supply: f64,
    /// Units wanted at the sell exchange.
    pub available_demand: f64,
}

/// Ranks the arbitrage opportunities for `ticker`, best margin first.
///
/// Exchanges without sellers (ask 0) cannot be bought on and exchanges
/// without buyers (bid 0) cannot be sold on. Equal margins keep exchange
/// code order.
#[must_use]
pub fn find_arbitrage(
    ticker: &str,
    quotes: &BTreeMap<String, MarketQuote>,
    config: &ArbitrageConfig,
) -> Vec<ArbitrageOpportunity> {
    let mut opportunities = Vec::new();

    for (buy_exchange, buy) in quotes {
        if buy.ask <= 0.0 || buy.supply < config.min_supply {
            continue;
        }
        for (sell_exchange, sell) in quotes {
            if sell_exchange == buy_exchange || sell.bid <= 0.0 || sell.demand < config.min_demand {
                continue;
            }

            let profit = sell.bid - buy.ask;
            let profit_pct = profit * 100.0 / buy.ask;
            if profit_pct <= config.min_profit_pct {
                continue;
            }

            opportunities.push(ArbitrageOpportunity {
                ticker: ticker.to_string(),
                buy_exchange: buy_exchange.clone(),
                sell_exchange: sell_exchange.clone(),
                buy_price: buy.ask,
                sell_price: sell.bid,
                profit,
                profit_pct,
                available_supply: buy.supply,
                available_demand: sell.demand,
            });
        }
    }

    opportunities.sort_by(|a, b| b.profit_pct.total_cmp(&a.profit_pct));
    tracing::debug!(ticker, found = opportunities.len(), "arbitrage scan");
    opportunities
}
