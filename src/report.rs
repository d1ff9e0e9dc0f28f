//! Weight, cost, and waste figures derived from optimized solutions.
//!
//! All weights are in kilograms, lengths in meters, and diameters in millimeters.

use crate::config::{ReportConfig, MAX_WASTE_PRECISION, STEEL_WEIGHT_DIVISOR};
use crate::Solution;
use fnv::FnvHashMap;
use std::collections::BTreeMap;
use std::fmt;

#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};

/// Weight in kg of one meter of rebar with the given diameter in mm.
pub fn weight_per_meter(diameter: u32) -> f64 {
    f64::from(diameter).powi(2) / STEEL_WEIGHT_DIVISOR
}

/// Cost of `weight` kg of steel at `price_per_ton`, or 0 without a price.
fn cost(weight: f64, price_per_ton: Option<f64>) -> f64 {
    price_per_ton.map_or(0.0, |price| weight / 1000.0 * price)
}

/// Figures for one diameter of a schedule.
#[cfg_attr(feature = "serialize", derive(Deserialize, Serialize))]
#[cfg_attr(feature = "serialize", serde(rename_all = "camelCase"))]
#[derive(Clone, Debug, PartialEq)]
pub struct DiameterSummary {
    /// Bar diameter.
    pub diameter: u32,

    /// Number of stock bars used.
    pub bars_used: usize,

    /// Total length of the required cut pieces.
    pub required_length: f64,

    /// Total length of the stock bars used.
    pub used_length: f64,

    /// Total offcut length.
    pub waste_length: f64,

    /// Weight of the required cut pieces.
    pub required_weight: f64,

    /// Weight of the stock bars used.
    pub used_weight: f64,

    /// Weight of the offcut.
    pub waste_weight: f64,

    /// Offcut as a percentage of the stock length used. 0 when no bars are used.
    pub waste_percent: f64,

    /// Cost of the stock bars used. 0 when no price is set.
    pub cost: f64,
}

impl DiameterSummary {
    /// Summarize `solution` for bars of `diameter`.
    pub fn new(diameter: u32, solution: &Solution, price_per_ton: Option<f64>) -> Self {
        let wpm = weight_per_meter(diameter);
        let required_length = solution.used_length();
        let used_length = solution.stock_length();
        let used_weight = used_length * wpm;

        let waste_percent = if used_length > 0.0 {
            solution.waste / used_length * 100.0
        } else {
            0.0
        };

        Self {
            diameter,
            bars_used: solution.bars.len(),
            required_length,
            used_length,
            waste_length: solution.waste,
            required_weight: required_length * wpm,
            used_weight,
            waste_weight: solution.waste * wpm,
            waste_percent,
            cost: cost(used_weight, price_per_ton),
        }
    }
}

/// Bars of one diameter that share the same (rounded) offcut length.
#[cfg_attr(feature = "serialize", derive(Deserialize, Serialize))]
#[cfg_attr(feature = "serialize", serde(rename_all = "camelCase"))]
#[derive(Clone, Debug, PartialEq)]
pub struct WasteEntry {
    /// Bar diameter.
    pub diameter: u32,

    /// Offcut length per bar, rounded to the report's waste precision.
    pub waste_length: f64,

    /// Number of bars with this offcut.
    pub count: usize,

    /// Combined weight of the offcut of these bars.
    pub total_waste_weight: f64,
}

/// Group the bars of every solution by diameter and rounded offcut length. Bars without
/// offcut are left out. Entries are ordered by diameter, then offcut length. `precision` is
/// capped at [`MAX_WASTE_PRECISION`].
pub fn waste_breakdown(results: &BTreeMap<u32, Solution>, precision: u32) -> Vec<WasteEntry> {
    let scale = 10f64.powi(precision.min(MAX_WASTE_PRECISION) as i32);
    let mut groups: FnvHashMap<(u32, i64), (usize, f64)> = Default::default();

    for (&diameter, solution) in results {
        let wpm = weight_per_meter(diameter);
        for bar in &solution.bars {
            let waste = bar.waste();
            let key = (waste * scale).round() as i64;
            if key <= 0 {
                continue;
            }

            let group = groups.entry((diameter, key)).or_insert((0, 0.0));
            group.0 += 1;
            group.1 += waste * wpm;
        }
    }

    let mut entries: Vec<WasteEntry> = groups
        .into_iter()
        .map(|((diameter, key), (count, total_waste_weight))| WasteEntry {
            diameter,
            waste_length: key as f64 / scale,
            count,
            total_waste_weight,
        })
        .collect();
    entries.sort_by(|a, b| {
        a.diameter
            .cmp(&b.diameter)
            .then(a.waste_length.total_cmp(&b.waste_length))
    });

    entries
}

/// Stock bars to buy for one diameter.
#[cfg_attr(feature = "serialize", derive(Deserialize, Serialize))]
#[cfg_attr(feature = "serialize", serde(rename_all = "camelCase"))]
#[derive(Clone, Debug, PartialEq)]
pub struct PurchaseLine {
    /// Bar diameter.
    pub diameter: u32,

    /// Length of each stock bar. 0 when no bars are needed.
    pub stock_length: f64,

    /// Number of stock bars.
    pub bars: usize,

    /// Weight of the stock bars.
    pub weight: f64,

    /// Cost of the stock bars. 0 when no price is set.
    pub cost: f64,
}

/// Stock bars to buy for a whole schedule.
#[cfg_attr(feature = "serialize", derive(Deserialize, Serialize))]
#[cfg_attr(feature = "serialize", serde(rename_all = "camelCase"))]
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PurchaseSummary {
    /// One line per diameter.
    pub lines: Vec<PurchaseLine>,

    /// Stock bars over all diameters.
    pub total_bars: usize,

    /// Stock weight over all diameters.
    pub total_weight: f64,

    /// Cost over all diameters.
    pub total_cost: f64,
}

impl PurchaseSummary {
    /// Build the purchase summary from per-diameter summaries.
    pub fn new(summaries: &[DiameterSummary], results: &BTreeMap<u32, Solution>) -> Self {
        let lines: Vec<PurchaseLine> = summaries
            .iter()
            .map(|summary| PurchaseLine {
                diameter: summary.diameter,
                stock_length: results
                    .get(&summary.diameter)
                    .and_then(|solution| solution.bars.first())
                    .map_or(0.0, |bar| bar.length),
                bars: summary.bars_used,
                weight: summary.used_weight,
                cost: summary.cost,
            })
            .collect();

        Self {
            total_bars: lines.iter().map(|line| line.bars).sum(),
            total_weight: lines.iter().map(|line| line.weight).sum(),
            total_cost: lines.iter().map(|line| line.cost).sum(),
            lines,
        }
    }
}

/// Everything reported for an optimized schedule.
#[cfg_attr(feature = "serialize", derive(Deserialize, Serialize))]
#[cfg_attr(feature = "serialize", serde(rename_all = "camelCase"))]
#[derive(Clone, Debug, PartialEq)]
pub struct Report {
    /// One summary per diameter, ordered by diameter.
    pub summaries: Vec<DiameterSummary>,

    /// Bars grouped by offcut length.
    pub waste_breakdown: Vec<WasteEntry>,

    /// Stock bars to buy.
    pub purchase: PurchaseSummary,
}

impl Report {
    /// Build a report from per-diameter solutions.
    pub fn build(results: &BTreeMap<u32, Solution>, config: &ReportConfig) -> Self {
        let summaries: Vec<DiameterSummary> = results
            .iter()
            .map(|(&diameter, solution)| {
                DiameterSummary::new(diameter, solution, config.price_per_ton)
            })
            .collect();

        Self {
            waste_breakdown: waste_breakdown(results, config.waste_precision),
            purchase: PurchaseSummary::new(&summaries, results),
            summaries,
        }
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Summary")?;
        writeln!(
            f,
            "{:>8} {:>6} {:>14} {:>12} {:>12} {:>8} {:>12}",
            "Diameter", "Bars", "Required (kg)", "Used (kg)", "Waste (kg)", "Waste %", "Cost"
        )?;
        for s in &self.summaries {
            writeln!(
                f,
                "{:>8} {:>6} {:>14.2} {:>12.2} {:>12.2} {:>8.2} {:>12.2}",
                s.diameter,
                s.bars_used,
                s.required_weight,
                s.used_weight,
                s.waste_weight,
                s.waste_percent,
                s.cost
            )?;
        }

        writeln!(f)?;
        writeln!(f, "Waste breakdown")?;
        writeln!(
            f,
            "{:>8} {:>12} {:>6} {:>12}",
            "Diameter", "Waste (m)", "Count", "Waste (kg)"
        )?;
        for w in &self.waste_breakdown {
            writeln!(
                f,
                "{:>8} {:>12} {:>6} {:>12.2}",
                w.diameter, w.waste_length, w.count, w.total_waste_weight
            )?;
        }

        writeln!(f)?;
        writeln!(f, "Purchase")?;
        writeln!(
            f,
            "{:>8} {:>10} {:>6} {:>12} {:>12}",
            "Diameter", "Stock (m)", "Bars", "Weight (kg)", "Cost"
        )?;
        for line in &self.purchase.lines {
            writeln!(
                f,
                "{:>8} {:>10} {:>6} {:>12.2} {:>12.2}",
                line.diameter, line.stock_length, line.bars, line.weight, line.cost
            )?;
        }
        write!(
            f,
            "{:>8} {:>10} {:>6} {:>12.2} {:>12.2}",
            "Total", "", self.purchase.total_bars, self.purchase.total_weight, self.purchase.total_cost
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ResultBar, ResultCutPiece};

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn bar(lengths: &[f64]) -> ResultBar {
        let mut start = 0.0;
        let cut_pieces = lengths
            .iter()
            .map(|&length| {
                let cut_piece = ResultCutPiece {
                    external_id: None,
                    length,
                    start,
                    end: start + length,
                };
                start += length;
                cut_piece
            })
            .collect();

        ResultBar {
            length: 12.0,
            cut_pieces,
        }
    }

    fn solution(bars: Vec<ResultBar>) -> Solution {
        let waste = bars.iter().map(ResultBar::waste).sum();
        Solution {
            bars,
            waste,
            trials_run: 1,
            stopped_early: false,
            seed: 0,
        }
    }

    #[test]
    fn weight_per_meter_of_common_diameters() {
        assert!(approx_eq(weight_per_meter(18), 2.0));
        assert!(approx_eq(weight_per_meter(9), 0.5));
        assert!(approx_eq(weight_per_meter(16), 256.0 / 162.0));
    }

    #[test]
    fn diameter_summary() {
        let solution = solution(vec![bar(&[5.0, 5.0]), bar(&[5.0, 5.0])]);
        let summary = DiameterSummary::new(18, &solution, Some(500.0));

        assert_eq!(summary.bars_used, 2);
        assert!(approx_eq(summary.required_length, 20.0));
        assert!(approx_eq(summary.used_length, 24.0));
        assert!(approx_eq(summary.waste_length, 4.0));
        assert!(approx_eq(summary.required_weight, 40.0));
        assert!(approx_eq(summary.used_weight, 48.0));
        assert!(approx_eq(summary.waste_weight, 8.0));
        assert!(approx_eq(summary.waste_percent, 100.0 / 6.0));
        assert!(approx_eq(summary.cost, 24.0));
    }

    #[test]
    fn diameter_summary_without_bars_or_price() {
        let summary = DiameterSummary::new(12, &solution(Vec::new()), None);

        assert_eq!(summary.bars_used, 0);
        assert_eq!(summary.waste_percent, 0.0);
        assert_eq!(summary.cost, 0.0);
    }

    #[test]
    fn waste_grouped_by_diameter_and_length() {
        let mut results = BTreeMap::new();
        results.insert(
            18,
            solution(vec![
                bar(&[10.0]),
                bar(&[6.5, 3.5]),
                bar(&[12.0]),
                bar(&[8.5]),
            ]),
        );
        results.insert(9, solution(vec![bar(&[11.0])]));

        let entries = waste_breakdown(&results, 2);

        assert_eq!(
            entries,
            vec![
                WasteEntry {
                    diameter: 9,
                    waste_length: 1.0,
                    count: 1,
                    total_waste_weight: 0.5,
                },
                WasteEntry {
                    diameter: 18,
                    waste_length: 2.0,
                    count: 2,
                    total_waste_weight: 8.0,
                },
                WasteEntry {
                    diameter: 18,
                    waste_length: 3.5,
                    count: 1,
                    total_waste_weight: 7.0,
                },
            ]
        );
    }

    #[test]
    fn waste_rounding_merges_close_lengths() {
        let mut results = BTreeMap::new();
        results.insert(18, solution(vec![bar(&[9.996]), bar(&[10.004])]));

        let entries = waste_breakdown(&results, 2);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].waste_length, 2.0);
        assert_eq!(entries[0].count, 2);
    }

    #[test]
    fn large_waste_precision_keeps_lengths_apart() {
        let mut results = BTreeMap::new();
        results.insert(18, solution(vec![bar(&[1.0]), bar(&[2.0])]));

        for precision in [2, MAX_WASTE_PRECISION, 19, u32::MAX] {
            let entries = waste_breakdown(&results, precision);
            let lengths: Vec<f64> = entries.iter().map(|e| e.waste_length).collect();
            assert_eq!(lengths, vec![10.0, 11.0], "precision {precision}");
            assert!(entries.iter().all(|e| e.count == 1));
        }
    }

    #[test]
    fn report_and_purchase_totals() {
        let mut results = BTreeMap::new();
        results.insert(18, solution(vec![bar(&[5.0, 5.0]), bar(&[5.0, 5.0])]));
        results.insert(9, solution(vec![bar(&[12.0])]));

        let report = Report::build(&results, &ReportConfig::default().with_price_per_ton(1000.0));

        assert_eq!(report.summaries.len(), 2);
        assert_eq!(report.summaries[0].diameter, 9);
        assert_eq!(report.purchase.total_bars, 3);
        assert!(approx_eq(report.purchase.total_weight, 48.0 + 6.0));
        assert!(approx_eq(report.purchase.total_cost, 54.0));
        assert_eq!(report.purchase.lines[1].stock_length, 12.0);

        let text = report.to_string();
        assert!(text.contains("Waste breakdown"));
        assert!(text.contains("Total"));
    }
}
