//! Optimizing every diameter of a schedule.

use crate::basic::BasicBin;
use crate::{expand_cut_piece, CutPiece, CutPieceWithId, Error, Optimizer, Result, Solution};
use std::collections::BTreeMap;
use tracing::info;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Required cut pieces grouped by bar diameter in millimeters.
pub type Schedule = BTreeMap<u32, Vec<CutPiece>>;

/// Optimize each diameter in `schedule` independently, using the settings of `optimizer`
/// (stock length, trials, seed, cut width, time limit, and cancel token).
///
/// The cut pieces come from `schedule`; any cut pieces already added to `optimizer` are not
/// used. With the `parallel` feature, diameters are optimized concurrently.
pub fn optimize_schedule(
    optimizer: &Optimizer,
    schedule: &Schedule,
) -> Result<BTreeMap<u32, Solution>> {
    info!(diameters = schedule.len(), "optimizing schedule");

    #[cfg(not(feature = "parallel"))]
    let iter = schedule.iter();
    #[cfg(feature = "parallel")]
    let iter = schedule.par_iter();

    iter.map(|(&diameter, cut_pieces)| {
        optimize_diameter(optimizer, diameter, cut_pieces).map(|solution| (diameter, solution))
    })
    .collect()
}

fn optimize_diameter(
    optimizer: &Optimizer,
    diameter: u32,
    cut_pieces: &[CutPiece],
) -> Result<Solution> {
    let mut expanded: Vec<CutPieceWithId> = Vec::new();
    for cut_piece in cut_pieces {
        expand_cut_piece(&mut expanded, cut_piece);
    }

    let span = tracing::info_span!("diameter", diameter);
    let _enter = span.enter();

    optimizer
        .optimize_cut_pieces::<BasicBin, _>(&expanded, &|_| {})
        .map_err(|source| Error::Diameter {
            diameter,
            source: Box::new(source),
        })
}
