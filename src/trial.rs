//! A single randomized first-fit-decreasing pass, and the rule that picks the best pass.

use super::*;

use std::ops::Range;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// One candidate packing produced by one randomized pass.
#[derive(Clone, Debug)]
pub(crate) struct Trial<B> {
    pub(crate) index: usize,
    pub(crate) waste: f64,
    pub(crate) bins: Vec<B>,
}

impl<B> Trial<B>
where
    B: Bin,
{
    /// Pack `cut_pieces` into bins of `stock_length`.
    ///
    /// The pieces are shuffled and then sorted longest first. The sort is stable, so pieces of
    /// equal length keep the random relative order from the shuffle, which is what makes
    /// trials differ from each other.
    pub(crate) fn run<R>(
        index: usize,
        cut_pieces: &[CutPieceWithId],
        stock_length: f64,
        cut_width: f64,
        rng: &mut R,
    ) -> Trial<B>
    where
        R: Rng + ?Sized,
    {
        let mut order: Vec<&CutPieceWithId> = cut_pieces.iter().collect();
        order.shuffle(rng);
        order.sort_by(|a, b| b.length.total_cmp(&a.length));

        let mut bins: Vec<B> = Vec::new();
        for cut_piece in order {
            if bins.iter_mut().any(|bin| bin.insert_cut_piece(cut_piece)) {
                continue;
            }

            let mut bin = B::new(stock_length, cut_width);
            // Pieces longer than the stock are rejected before any trial runs, so a fresh bin
            // always takes the piece.
            let inserted = bin.insert_cut_piece(cut_piece);
            debug_assert!(inserted, "cut piece {} doesn't fit an empty bin", cut_piece.id);
            bins.push(bin);
        }

        debug_assert_eq!(
            bins.iter().map(|bin| bin.cut_pieces().len()).sum::<usize>(),
            cut_pieces.len()
        );

        let waste = bins.iter().map(Bin::waste).sum();

        Trial { index, waste, bins }
    }

    /// Whether this trial should replace `best`: strictly less waste, or the same waste with
    /// strictly fewer bars.
    pub(crate) fn improves_on(&self, best: &Trial<B>) -> bool {
        self.waste < best.waste || (self.waste == best.waste && self.bins.len() < best.bins.len())
    }

    /// Pick the better of two trials. Full ties go to the lower trial index, so the result
    /// doesn't depend on the order trials were evaluated in.
    pub(crate) fn better(a: Trial<B>, b: Trial<B>) -> Trial<B> {
        let (first, second) = if a.index <= b.index { (a, b) } else { (b, a) };
        if second.improves_on(&first) {
            second
        } else {
            first
        }
    }
}

/// Derive the RNG seed of one trial from the run's base seed.
///
/// Each trial gets its own stream so trials can be evaluated in any order (or in parallel)
/// and the first `k` trials of a run are the same no matter how many trials follow.
pub(crate) fn trial_seed(seed: u64, index: usize) -> u64 {
    // SplitMix64 finalizer.
    let mut z = seed.wrapping_add((index as u64).wrapping_add(1).wrapping_mul(0x9E37_79B9_7F4A_7C15));
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

fn run_seeded<B>(
    index: usize,
    cut_pieces: &[CutPieceWithId],
    stock_length: f64,
    cut_width: f64,
    seed: u64,
) -> Trial<B>
where
    B: Bin,
{
    let mut rng: StdRng = SeedableRng::seed_from_u64(trial_seed(seed, index));
    Trial::run(index, cut_pieces, stock_length, cut_width, &mut rng)
}

/// Run the trials in `indices` and return the best one, or `None` for an empty range.
#[cfg(not(feature = "parallel"))]
pub(crate) fn best_of<B>(
    indices: Range<usize>,
    cut_pieces: &[CutPieceWithId],
    stock_length: f64,
    cut_width: f64,
    seed: u64,
) -> Option<Trial<B>>
where
    B: Bin + Send,
{
    indices
        .map(|index| run_seeded(index, cut_pieces, stock_length, cut_width, seed))
        .reduce(Trial::better)
}

/// Run the trials in `indices` and return the best one, or `None` for an empty range.
#[cfg(feature = "parallel")]
pub(crate) fn best_of<B>(
    indices: Range<usize>,
    cut_pieces: &[CutPieceWithId],
    stock_length: f64,
    cut_width: f64,
    seed: u64,
) -> Option<Trial<B>>
where
    B: Bin + Send,
{
    indices
        .into_par_iter()
        .map(|index| run_seeded(index, cut_pieces, stock_length, cut_width, seed))
        .reduce_with(Trial::better)
}
