//! # Market Outlook
//!
//! Coarse indicators for one material on one exchange, combining the order
//! book depth with the profitability of producing it there.
//!
//! [`Bottleneck::classify`] looks at the order book alone and names the
//! supply problem, if any, together with how much it is worth chasing.

use serde::{Deserialize, Serialize};

use crate::catalog::MarketQuote;

/// Saturation reported when nothing is on offer.
const UNKNOWN_SATURATION: f64 = 50.0;

/// Floor applied to supply and demand before taking their ratio.
const DEPTH_FLOOR: f64 = 0.1;

/// Categories whose shortages score higher.
const STRATEGIC_CATEGORIES: [&str; 3] = ["electronic systems", "ship engines", "medical equipment"];

/// Exposure of a production decision to market conditions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    /// Deep, unsaturated and profitable.
    Low,
    /// Somewhat saturated or thin.
    Medium,
    /// Saturated, illiquid or losing money.
    High,
}

/// Whether producing the material is worth it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Viability {
    /// Profitable, traded, and in demand.
    #[serde(rename = "Highly Viable")]
    HighlyViable,
    /// Profitable with some market activity.
    Viable,
    /// Profitable on paper, no market activity.
    Marginal,
    /// Not profitable at either price.
    #[serde(rename = "Not Viable")]
    NotViable,
}

/// Market indicators for one evaluation.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MarketOutlook {
    /// `demand / supply` (0 when nothing is offered).
    pub liquidity_ratio: f64,
    /// Oversupply indicator, 0..=100.
    pub saturation: f64,
    /// Combined attractiveness, 0..=100.
    pub investment_score: u8,
    /// Risk classification.
    pub risk: RiskLevel,
    /// Viability classification.
    pub viability: Viability,
}

impl MarketOutlook {
    /// Assesses a quote given the producer's profit per unit.
    ///
    /// `roi_pct` and `profit_ask` are for selling at ask, `profit_bid` for
    /// selling at bid, both with inputs bought at ask.
    #[must_use]
    pub fn assess(quote: &MarketQuote, roi_pct: f64, profit_ask: f64, profit_bid: f64) -> Self {
        let liquidity_ratio = liquidity_ratio(quote);
        let saturation = saturation(quote);
        Self {
            liquidity_ratio,
            saturation,
            investment_score: investment_score(roi_pct, liquidity_ratio, saturation),
            risk: risk_level(saturation, liquidity_ratio, profit_ask),
            viability: viability(quote, profit_ask, profit_bid),
        }
    }
}

/// Supply problem seen in an order book.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BottleneckKind {
    /// Almost nothing offered against real demand.
    #[serde(rename = "Critical Shortage")]
    CriticalShortage,
    /// Thin supply, demand over ten times higher.
    #[serde(rename = "High Demand")]
    HighDemand,
    /// Demand over three times supply.
    #[serde(rename = "Supply Shortage")]
    SupplyShortage,
    /// Deep supply, nobody buying.
    #[serde(rename = "Market Saturated")]
    MarketSaturated,
    /// High-tier material with little on offer.
    #[serde(rename = "Production Limited")]
    ProductionLimited,
    /// None of the above.
    #[serde(rename = "Market Stable")]
    Stable,
}

/// Bottleneck classification for one material on one exchange.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bottleneck {
    /// What kind of problem.
    pub kind: BottleneckKind,
    /// How bad it is, 0..=10.
    pub severity: u8,
    /// How attractive supplying it would be, 0..=100.
    pub opportunity_score: u8,
}

impl Bottleneck {
    /// Classifies the order book of a material of the given tier and category.
    ///
    /// The first matching rule wins, checked from the most acute shortage
    /// down to a high-tier production limit. Strategic categories get a
    /// bonus on any non-zero score.
    #[must_use]
    pub fn classify(quote: &MarketQuote, tier: u8, category: &str) -> Self {
        let supply = quote.supply.max(DEPTH_FLOOR);
        let demand = quote.demand.max(DEPTH_FLOOR);
        let ratio = demand / supply;

        let (kind, severity, opportunity_score) = if supply <= 5.0 && demand >= 50.0 {
            (BottleneckKind::CriticalShortage, 10, 100)
        } else if supply <= 10.0 && ratio > 10.0 {
            let severity = capped_severity(ratio * 0.8, 10);
            (BottleneckKind::HighDemand, severity, severity * 10)
        } else if ratio > 3.0 {
            let severity = capped_severity(ratio * 0.5, 8);
            (BottleneckKind::SupplyShortage, severity, severity * 8)
        } else if supply > 1000.0 && demand <= 5.0 {
            (BottleneckKind::MarketSaturated, 1, 5)
        } else if tier >= 4 && supply <= 50.0 {
            (
                BottleneckKind::ProductionLimited,
                tier.saturating_add(3).min(10),
                tier.saturating_mul(15).min(100),
            )
        } else {
            (BottleneckKind::Stable, 0, 0)
        };

        let mut bottleneck = Self {
            kind,
            severity,
            opportunity_score,
        };
        let strategic = STRATEGIC_CATEGORIES
            .iter()
            .any(|strategic| strategic.eq_ignore_ascii_case(category));
        if strategic && bottleneck.opportunity_score > 0 {
            bottleneck.opportunity_score = (bottleneck.opportunity_score + 20).min(100);
            if bottleneck.severity > 0 {
                bottleneck.severity = (bottleneck.severity + 2).min(10);
            }
        }
        bottleneck
    }
}

/// Whole part of `value`, at most `cap`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn capped_severity(value: f64, cap: u8) -> u8 {
    value.clamp(0.0, f64::from(cap)).floor() as u8
}

/// Demand relative to supply.
#[must_use]
pub fn liquidity_ratio(quote: &MarketQuote) -> f64 {
    if quote.supply > 0.0 {
        quote.demand / quote.supply
    } else {
        0.0
    }
}

/// How oversupplied the market is, 0..=100.
///
/// High supply relative to demand raises it; recent trading relative to
/// supply lowers it.
#[must_use]
pub fn saturation(quote: &MarketQuote) -> f64 {
    if quote.supply <= 0.0 {
        return UNKNOWN_SATURATION;
    }
    let supply_demand = quote.supply / quote.demand.max(1.0);
    let trading_factor = 1.0 - (quote.traded_volume / quote.supply.max(1.0)).min(1.0);
    (supply_demand * trading_factor * 50.0).min(100.0)
}

/// Points for return (40), liquidity (30) and lack of saturation (30).
#[must_use]
pub fn investment_score(roi_pct: f64, liquidity_ratio: f64, saturation: f64) -> u8 {
    let roi_points = if roi_pct > 20.0 {
        40
    } else if roi_pct > 10.0 {
        30
    } else if roi_pct > 0.0 {
        20
    } else {
        0
    };

    let liquidity_points = if liquidity_ratio > 10.0 {
        30
    } else if liquidity_ratio > 5.0 {
        20
    } else if liquidity_ratio > 1.0 {
        10
    } else {
        0
    };

    let saturation_points = if saturation < 20.0 {
        30
    } else if saturation < 40.0 {
        20
    } else if saturation < 60.0 {
        10
    } else {
        0
    };

    roi_points + liquidity_points + saturation_points
}

/// Classifies risk from saturation, liquidity and unit profit.
#[must_use]
pub fn risk_level(saturation: f64, liquidity_ratio: f64, profit: f64) -> RiskLevel {
    if saturation > 70.0 || liquidity_ratio < 1.0 || profit < 0.0 {
        RiskLevel::High
    } else if saturation > 40.0 || liquidity_ratio < 5.0 {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    }
}

/// Classifies viability from profit and market activity.
#[must_use]
pub fn viability(quote: &MarketQuote, profit_ask: f64, profit_bid: f64) -> Viability {
    let profitable = profit_ask > 0.0 || profit_bid > 0.0;
    let has_volume = quote.traded_volume > 0.0;
    let has_demand = quote.demand > quote.supply * 0.1;

    match (profitable, has_volume, has_demand) {
        (false, _, _) => Viability::NotViable,
        (true, true, true) => Viability::HighlyViable,
        (true, true, false) | (true, false, true) => Viability::Viable,
        (true, false, false) => Viability::Marginal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_liquidity_ratio() {
        let quote = MarketQuote::new(10.0, 9.0).with_depth(200.0, 1000.0);
        assert!((liquidity_ratio(&quote) - 5.0).abs() < 1e-9);
        assert!(liquidity_ratio(&MarketQuote::new(1.0, 1.0)).abs() < f64::EPSILON);
    }

    #[test]
    fn test_saturation() {
        // Nothing offered
        assert!((saturation(&MarketQuote::new(1.0, 1.0)) - 50.0).abs() < 1e-9);

        // Supply twice demand, a quarter traded: 2 * 0.75 * 50 = 75
        let quote = MarketQuote::new(1.0, 1.0)
            .with_depth(400.0, 200.0)
            .with_traded_volume(100.0);
        assert!((saturation(&quote) - 75.0).abs() < 1e-9);

        // Heavily oversupplied caps at 100
        let glut = MarketQuote::new(1.0, 1.0).with_depth(10_000.0, 1.0);
        assert!((saturation(&glut) - 100.0).abs() < 1e-9);

        // Everything traded
        let cleared = MarketQuote::new(1.0, 1.0)
            .with_depth(100.0, 10.0)
            .with_traded_volume(500.0);
        assert!(saturation(&cleared).abs() < 1e-9);
    }

    #[test]
    fn test_investment_score_bands() {
        assert_eq!(investment_score(25.0, 11.0, 10.0), 100);
        assert_eq!(investment_score(15.0, 6.0, 30.0), 70);
        assert_eq!(investment_score(5.0, 2.0, 50.0), 40);
        assert_eq!(investment_score(-5.0, 0.5, 80.0), 0);
        // Band edges are exclusive
        assert_eq!(investment_score(20.0, 10.0, 20.0), 30 + 20 + 20);
    }

    #[test]
    fn test_risk_level() {
        assert_eq!(risk_level(10.0, 8.0, 5.0), RiskLevel::Low);
        assert_eq!(risk_level(50.0, 8.0, 5.0), RiskLevel::Medium);
        assert_eq!(risk_level(10.0, 3.0, 5.0), RiskLevel::Medium);
        assert_eq!(risk_level(80.0, 8.0, 5.0), RiskLevel::High);
        assert_eq!(risk_level(10.0, 0.5, 5.0), RiskLevel::High);
        assert_eq!(risk_level(10.0, 8.0, -0.1), RiskLevel::High);
    }

    #[test]
    fn test_viability() {
        let active = MarketQuote::new(10.0, 9.0)
            .with_depth(100.0, 50.0)
            .with_traded_volume(20.0);
        assert_eq!(viability(&active, 1.0, -1.0), Viability::HighlyViable);
        assert_eq!(viability(&active, -1.0, -1.0), Viability::NotViable);

        let untraded = MarketQuote::new(10.0, 9.0).with_depth(100.0, 50.0);
        assert_eq!(viability(&untraded, 1.0, 1.0), Viability::Viable);

        let dead = MarketQuote::new(10.0, 9.0).with_depth(100.0, 5.0);
        assert_eq!(viability(&dead, 0.0, 2.0), Viability::Marginal);
    }

    #[test]
    fn test_assess_combines_indicators() {
        let quote = MarketQuote::new(50.0, 45.0)
            .with_depth(100.0, 1200.0)
            .with_traded_volume(80.0);
        let outlook = MarketOutlook::assess(&quote, 25.0, 10.0, 5.0);
        assert!((outlook.liquidity_ratio - 12.0).abs() < 1e-9);
        assert_eq!(outlook.investment_score, 100);
        assert_eq!(outlook.risk, RiskLevel::Low);
        assert_eq!(outlook.viability, Viability::HighlyViable);
    }

    #[test]
    fn test_bottleneck_rules_in_order() {
        // 3 offered against 80 wanted
        let critical = MarketQuote::new(1.0, 1.0).with_depth(3.0, 80.0);
        let bottleneck = Bottleneck::classify(&critical, 1, "metals");
        assert_eq!(bottleneck.kind, BottleneckKind::CriticalShortage);
        assert_eq!((bottleneck.severity, bottleneck.opportunity_score), (10, 100));

        // Ratio 12.5: severity floor(10.0) = 10
        let hot = MarketQuote::new(1.0, 1.0).with_depth(8.0, 100.0).with_traded_volume(5.0);
        let bottleneck = Bottleneck::classify(&hot, 1, "metals");
        assert_eq!(bottleneck.kind, BottleneckKind::HighDemand);
        assert_eq!((bottleneck.severity, bottleneck.opportunity_score), (10, 100));

        // Ratio 9: severity floor(4.5) = 4, score 32
        let short = MarketQuote::new(1.0, 1.0).with_depth(100.0, 900.0);
        let bottleneck = Bottleneck::classify(&short, 1, "metals");
        assert_eq!(bottleneck.kind, BottleneckKind::SupplyShortage);
        assert_eq!((bottleneck.severity, bottleneck.opportunity_score), (4, 32));

        let glut = MarketQuote::new(1.0, 1.0).with_depth(5000.0, 2.0);
        assert_eq!(Bottleneck::classify(&glut, 1, "metals").kind, BottleneckKind::MarketSaturated);

        let scarce = MarketQuote::new(1.0, 1.0).with_depth(40.0, 60.0);
        let bottleneck = Bottleneck::classify(&scarce, 5, "metals");
        assert_eq!(bottleneck.kind, BottleneckKind::ProductionLimited);
        assert_eq!((bottleneck.severity, bottleneck.opportunity_score), (8, 75));
        assert_eq!(Bottleneck::classify(&scarce, 3, "metals").kind, BottleneckKind::Stable);
    }

    #[test]
    fn test_empty_book_is_stable() {
        let bottleneck = Bottleneck::classify(&MarketQuote::new(10.0, 9.0), 0, "gases");
        assert_eq!(bottleneck.kind, BottleneckKind::Stable);
        assert_eq!((bottleneck.severity, bottleneck.opportunity_score), (0, 0));
    }

    #[test]
    fn test_strategic_category_bonus() {
        let short = MarketQuote::new(1.0, 1.0).with_depth(100.0, 900.0);
        let bottleneck = Bottleneck::classify(&short, 1, "Ship Engines");
        assert_eq!((bottleneck.severity, bottleneck.opportunity_score), (6, 52));

        // Nothing to boost
        let calm = MarketQuote::new(1.0, 1.0).with_depth(100.0, 100.0);
        let bottleneck = Bottleneck::classify(&calm, 1, "ship engines");
        assert_eq!((bottleneck.severity, bottleneck.opportunity_score), (0, 0));
    }
}
