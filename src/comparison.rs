//! Side-by-side evaluation of several deals.
//!
//! Every deal is run through the same engine entry point with the same
//! overrides, then ranked cheapest first by total cost.

use std::cmp::Ordering;

use anyhow::Context;
use chrono::NaiveDate;
use log::debug;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::deal::{DealOverrides, VehicleDeal};
use crate::metrics::{compute_metrics, CarCalculations};
use crate::repository::DealRepository;
use crate::{CarFinanceResult, Money};

/// One deal's position in a comparison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DealComparison {
    /// 1 is the cheapest by total cost.
    pub rank: usize,
    pub deal_id: String,
    pub label: String,
    /// Total cost above the cheapest deal; zero for rank 1.
    pub cost_above_best: Money,
    pub metrics: CarCalculations,
}

/// Headline figures across a comparison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonSummary {
    pub lowest_total_cost: String,
    pub lowest_monthly_payment: String,
    pub largest_discount: String,
    /// Difference in total cost between the most and least expensive deal.
    pub total_cost_spread: Money,
}

impl ComparisonSummary {
    pub fn from_comparisons(comparisons: &[DealComparison]) -> Option<Self> {
        let cheapest = comparisons.iter().min_by_key(|c| c.metrics.total_cost)?;
        let priciest = first_max_by_key(comparisons, |c| c.metrics.total_cost)?;
        let lowest_payment = comparisons.iter().min_by_key(|c| c.metrics.monthly_payment)?;
        let best_discount = first_max_by_key(comparisons, |c| c.metrics.discount)?;

        Some(ComparisonSummary {
            lowest_total_cost: cheapest.deal_id.clone(),
            lowest_monthly_payment: lowest_payment.deal_id.clone(),
            largest_discount: best_discount.deal_id.clone(),
            total_cost_spread: priciest.metrics.total_cost - cheapest.metrics.total_cost,
        })
    }
}

/// Like `max_by_key`, but ties go to the earliest item, matching `min_by_key`.
fn first_max_by_key<F>(comparisons: &[DealComparison], key: F) -> Option<&DealComparison>
where
    F: Fn(&DealComparison) -> Money,
{
    comparisons
        .iter()
        .max_by(|a, b| key(a).cmp(&key(b)).then(Ordering::Greater))
}

/// Computes metrics for each deal under `overrides` and ranks them by total
/// cost. Deals with equal cost keep their input order.
pub fn compare_deals(
    deals: &[VehicleDeal],
    overrides: &DealOverrides,
    as_of: NaiveDate,
) -> CarFinanceResult<Vec<DealComparison>> {
    let evaluated = deals
        .iter()
        .map(|deal| -> CarFinanceResult<_> {
            let metrics = compute_metrics(&deal.with_overrides(overrides), as_of)?;
            Ok((deal, metrics))
        })
        .collect::<CarFinanceResult<Vec<_>>>()?;

    Ok(rank(evaluated))
}

/// Loads every stored deal and compares them.
pub fn compare_stored_deals(
    repo: &dyn DealRepository,
    overrides: &DealOverrides,
    as_of: NaiveDate,
) -> anyhow::Result<Vec<DealComparison>> {
    let deals = repo.list().context("loading deals for comparison")?;

    let evaluated = deals
        .iter()
        .map(|deal| -> anyhow::Result<_> {
            let metrics = compute_metrics(&deal.with_overrides(overrides), as_of)
                .with_context(|| format!("computing metrics for deal '{}'", deal.id))?;
            Ok((deal, metrics))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    Ok(rank(evaluated))
}

fn rank(mut evaluated: Vec<(&VehicleDeal, CarCalculations)>) -> Vec<DealComparison> {
    evaluated.sort_by_key(|(_, metrics)| metrics.total_cost);

    let best = evaluated
        .first()
        .map(|(_, m)| m.total_cost)
        .unwrap_or(Decimal::ZERO);

    debug!("compared {} deals, best total cost {best}", evaluated.len());

    evaluated
        .into_iter()
        .enumerate()
        .map(|(i, (deal, metrics))| DealComparison {
            rank: i + 1,
            deal_id: deal.id.clone(),
            label: deal.label(),
            cost_above_best: metrics.total_cost - best,
            metrics,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::InMemoryDealRepository;
    use rust_decimal_macros::dec;

    fn as_of() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 20).unwrap()
    }

    fn deal(id: &str, price: Money, apr: Decimal, term: u32) -> VehicleDeal {
        VehicleDeal {
            id: id.to_string(),
            listed_price: dec!(30000),
            negotiated_price: price,
            apr,
            term_length: term,
            down_payment: dec!(2000),
            ..Default::default()
        }
    }

    fn lineup() -> Vec<VehicleDeal> {
        vec![
            deal("pricey", dec!(29500), dec!(0.07), 84),
            deal("cheap", dec!(27000), dec!(0.039), 60),
            deal("middle", dec!(28000), dec!(0.049), 60),
        ]
    }

    #[test]
    fn test_ranked_by_total_cost() {
        let ranked = compare_deals(&lineup(), &DealOverrides::default(), as_of()).unwrap();

        let ids: Vec<&str> = ranked.iter().map(|c| c.deal_id.as_str()).collect();
        assert_eq!(ids, vec!["cheap", "middle", "pricey"]);
        assert_eq!(ranked[0].rank, 1);
        assert_eq!(ranked[2].rank, 3);
        assert_eq!(ranked[0].cost_above_best, Decimal::ZERO);
        assert!(ranked[1].cost_above_best > Decimal::ZERO);
        assert!(ranked[2].cost_above_best > ranked[1].cost_above_best);
    }

    #[test]
    fn test_ties_keep_input_order() {
        let deals = vec![
            deal("first", dec!(25000), dec!(0.05), 60),
            deal("second", dec!(25000), dec!(0.05), 60),
        ];
        let ranked = compare_deals(&deals, &DealOverrides::default(), as_of()).unwrap();
        assert_eq!(ranked[0].deal_id, "first");
        assert_eq!(ranked[1].deal_id, "second");
    }

    #[test]
    fn test_overrides_apply_to_every_deal() {
        let overrides = DealOverrides {
            apr: Some(Decimal::ZERO),
            term_length: Some(48),
            ..Default::default()
        };
        let ranked = compare_deals(&lineup(), &overrides, as_of()).unwrap();

        assert!(ranked.iter().all(|c| c.metrics.total_interest.is_zero()));
        assert!(ranked.iter().all(|c| c.metrics.payment_schedule.len() == 48));
        // Interest-free, cost follows price
        assert_eq!(ranked[0].deal_id, "cheap");
        assert_eq!(ranked[2].cost_above_best, dec!(2500));
    }

    #[test]
    fn test_summary() {
        let ranked = compare_deals(&lineup(), &DealOverrides::default(), as_of()).unwrap();
        let summary = ComparisonSummary::from_comparisons(&ranked).unwrap();

        assert_eq!(summary.lowest_total_cost, "cheap");
        assert_eq!(summary.largest_discount, "cheap");
        // The 84-month term spreads payments thinnest
        assert_eq!(summary.lowest_monthly_payment, "pricey");
        assert_eq!(summary.total_cost_spread, ranked[2].cost_above_best);
    }

    #[test]
    fn test_summary_ties_go_to_first_deal() {
        let deals = vec![
            deal("early", dec!(25000), dec!(0.05), 60),
            deal("late", dec!(25000), dec!(0.05), 60),
        ];
        let ranked = compare_deals(&deals, &DealOverrides::default(), as_of()).unwrap();
        let summary = ComparisonSummary::from_comparisons(&ranked).unwrap();

        assert_eq!(summary.lowest_total_cost, "early");
        assert_eq!(summary.lowest_monthly_payment, "early");
        assert_eq!(summary.largest_discount, "early");
        assert_eq!(summary.total_cost_spread, Decimal::ZERO);
    }

    #[test]
    fn test_empty_comparison() {
        let ranked = compare_deals(&[], &DealOverrides::default(), as_of()).unwrap();
        assert!(ranked.is_empty());
        assert!(ComparisonSummary::from_comparisons(&ranked).is_none());
    }

    #[test]
    fn test_compare_stored_deals() {
        let repo = InMemoryDealRepository::with_deals(lineup()).unwrap();
        let ranked = compare_stored_deals(&repo, &DealOverrides::default(), as_of()).unwrap();
        assert_eq!(ranked.len(), 3);
        assert_eq!(ranked[0].deal_id, "cheap");
    }

    #[test]
    fn test_compare_stored_deals_names_bad_deal() {
        let repo = InMemoryDealRepository::with_deals(lineup()).unwrap();
        repo.save(deal("broken", dec!(20000), dec!(0.05), 0)).unwrap();

        let err = compare_stored_deals(&repo, &DealOverrides::default(), as_of()).unwrap_err();
        assert_eq!(err.to_string(), "computing metrics for deal 'broken'");
    }
}
