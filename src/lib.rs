//! rebar-cut-optimizer is an optimizer library that figures out how to cut required rebar
//! lengths from fixed-length stock bars with as few bars and as little offcut as possible.
//! It runs many randomized first-fit-decreasing passes and keeps the best packing.
//!
//! ```
//! use rebar_cut_optimizer::*;
//!
//! let solution = Optimizer::new()
//!     .set_stock_length(12.0)
//!     .add_cut_piece(CutPiece {
//!         quantity: 4,
//!         external_id: Some(1),
//!         length: 5.0,
//!     })
//!     .set_random_seed(1)
//!     .optimize(|_| {})
//!     .unwrap();
//!
//! assert_eq!(solution.bars.len(), 2);
//! assert_eq!(solution.waste, 4.0);
//! ```

#![deny(missing_docs)]

mod basic;
pub mod batch;
pub mod config;
mod error;
pub mod input;
pub mod report;
mod trial;


pub use batch::{optimize_schedule, Schedule};
pub use error::{Error, Result};
pub use input::{parse_cut_list, parse_schedule};
pub use report::Report;

use basic::BasicBin;
use config::{DEFAULT_STOCK_LENGTH, DEFAULT_TRIALS, LENGTH_EPSILON, TRIAL_CHUNK_SIZE};
use fnv::FnvHashSet;
use rand::prelude::*;
use std::cmp;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, Level};
use trial::Trial;

#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};

/// A length of rebar that needs to be cut from a stock bar.
#[cfg_attr(feature = "serialize", derive(Deserialize, Serialize))]
#[cfg_attr(feature = "serialize", serde(rename_all = "camelCase"))]
#[derive(Clone, Debug, PartialEq)]
pub struct CutPiece {
    /// Quantity of this cut piece.
    pub quantity: usize,

    /// ID to be used by the caller to match up result cut pieces
    /// with the original cut piece. This ID has no meaning to the
    /// optimizer so it can be set to `None` if not needed.
    pub external_id: Option<usize>,

    /// Length of this cut piece.
    pub length: f64,
}

#[derive(Clone, Debug)]
pub(crate) struct CutPieceWithId {
    pub(crate) id: usize,
    pub(crate) external_id: Option<usize>,
    pub(crate) length: f64,
}

#[derive(Clone, Debug)]
pub(crate) struct UsedCutPiece {
    pub(crate) external_id: Option<usize>,
    pub(crate) length: f64,
    pub(crate) start: f64,
    pub(crate) end: f64,
}

impl From<&UsedCutPiece> for ResultCutPiece {
    fn from(used_cut_piece: &UsedCutPiece) -> Self {
        Self {
            external_id: used_cut_piece.external_id,
            length: used_cut_piece.length,
            start: used_cut_piece.start,
            end: used_cut_piece.end,
        }
    }
}

/// A cut piece that has been placed in a solution by the optimizer.
#[cfg_attr(feature = "serialize", derive(Deserialize, Serialize))]
#[cfg_attr(feature = "serialize", serde(rename_all = "camelCase"))]
#[derive(Clone, Debug, PartialEq)]
pub struct ResultCutPiece {
    /// ID that matches the one on the cut piece that was passed to the optimizer.
    pub external_id: Option<usize>,

    /// Length of the cut piece, exactly as it was passed to the optimizer.
    pub length: f64,

    /// Start location of this cut piece within the stock bar.
    pub start: f64,

    /// End location of this cut piece within the stock bar.
    pub end: f64,
}

/// Stock bar that was used by the optimizer to get one or more cut pieces.
#[cfg_attr(feature = "serialize", derive(Deserialize, Serialize))]
#[cfg_attr(feature = "serialize", serde(rename_all = "camelCase"))]
#[derive(Clone, Debug, PartialEq)]
pub struct ResultBar {
    /// Length of this stock bar.
    pub length: f64,

    /// Cut pieces to cut from this stock bar, in the order they were placed.
    pub cut_pieces: Vec<ResultCutPiece>,
}

impl ResultBar {
    /// Total length of the cut pieces in this bar.
    pub fn used_length(&self) -> f64 {
        self.cut_pieces.iter().map(|p| p.length).sum()
    }

    /// Length of this bar that isn't part of any cut piece, including any cut width.
    pub fn waste(&self) -> f64 {
        self.length - self.used_length()
    }
}

/// Represents a bin used for bin-packing.
trait Bin {
    /// Creates a new empty `Bin`.
    fn new(length: f64, cut_width: f64) -> Self;

    /// Length of this `Bin` not covered by cut pieces.
    fn waste(&self) -> f64;

    /// Returns an iterator over the `UsedCutPiece`s in this `Bin`.
    fn cut_pieces(&self) -> std::slice::Iter<'_, UsedCutPiece>;

    /// Inserts the `CutPieceWithId` into this `Bin`. Returns whether the insert succeeded.
    fn insert_cut_piece(&mut self, cut_piece: &CutPieceWithId) -> bool;
}

/// The best packing found by the optimizer.
#[cfg_attr(feature = "serialize", derive(Deserialize, Serialize))]
#[cfg_attr(feature = "serialize", serde(rename_all = "camelCase"))]
#[derive(Clone, Debug, PartialEq)]
pub struct Solution {
    /// The stock bars used, each containing its cut pieces.
    pub bars: Vec<ResultBar>,

    /// Total offcut over all bars. Always equal to the sum of [`ResultBar::waste`].
    pub waste: f64,

    /// Number of randomized passes that were run.
    pub trials_run: usize,

    /// Whether the search was stopped by the cancel token or time limit before
    /// running every trial.
    pub stopped_early: bool,

    /// Base random seed the run used. Passing it to [`Optimizer::set_random_seed`]
    /// reproduces this solution.
    pub seed: u64,
}

impl Solution {
    fn empty(seed: u64) -> Self {
        Self {
            bars: Vec::new(),
            waste: 0.0,
            trials_run: 0,
            stopped_early: false,
            seed,
        }
    }

    /// Total length of all cut pieces in the solution.
    pub fn used_length(&self) -> f64 {
        self.bars.iter().map(ResultBar::used_length).sum()
    }

    /// Total length of all stock bars in the solution.
    pub fn stock_length(&self) -> f64 {
        self.bars.iter().map(|bar| bar.length).sum()
    }

    /// Number of cut pieces placed in the solution.
    pub fn cut_piece_count(&self) -> usize {
        self.bars.iter().map(|bar| bar.cut_pieces.len()).sum()
    }
}

/// Optimizer for cutting rebar pieces from stock bars of one fixed length.
#[derive(Clone, Debug)]
pub struct Optimizer {
    stock_length: f64,
    cut_pieces: Vec<CutPieceWithId>,
    cut_width: f64,
    trials: usize,
    random_seed: Option<u64>,
    time_limit: Option<Duration>,
    cancel_token: Option<Arc<AtomicBool>>,
}

impl Default for Optimizer {
    fn default() -> Self {
        Self {
            stock_length: DEFAULT_STOCK_LENGTH,
            cut_pieces: Default::default(),
            cut_width: Default::default(),
            trials: DEFAULT_TRIALS,
            random_seed: None,
            time_limit: None,
            cancel_token: None,
        }
    }
}

impl Optimizer {
    /// Create a new optimizer.
    pub fn new() -> Self {
        Default::default()
    }

    /// Set the length of the stock bars that cut pieces are cut from.
    pub fn set_stock_length(&mut self, stock_length: f64) -> &mut Self {
        self.stock_length = stock_length;
        self
    }

    /// Add a desired cut piece that you need cut from a stock bar.
    pub fn add_cut_piece(&mut self, cut_piece: CutPiece) -> &mut Self {
        expand_cut_piece(&mut self.cut_pieces, &cut_piece);
        self
    }

    /// Add desired cut pieces that you need cut from a stock bar.
    pub fn add_cut_pieces<I>(&mut self, cut_pieces: I) -> &mut Self
    where
        I: IntoIterator<Item = CutPiece>,
    {
        cut_pieces.into_iter().for_each(|cp| {
            self.add_cut_piece(cp);
        });
        self
    }

    /// Add one cut piece per length. Each gets its position in `lengths` as its external ID.
    pub fn add_lengths(&mut self, lengths: &[f64]) -> &mut Self {
        for (i, &length) in lengths.iter().enumerate() {
            self.add_cut_piece(CutPiece {
                quantity: 1,
                external_id: Some(i),
                length,
            });
        }
        self
    }

    /// Set the width of the cut to use between cut pieces. This could
    /// represent blade or shear loss. Defaults to 0.
    pub fn set_cut_width(&mut self, cut_width: f64) -> &mut Self {
        self.cut_width = cut_width;
        self
    }

    /// Set the number of randomized passes to run. More passes search more orderings of
    /// equal-length pieces. Defaults to [`DEFAULT_TRIALS`].
    pub fn set_trials(&mut self, trials: usize) -> &mut Self {
        self.trials = trials;
        self
    }

    /// Set the random seed used by the optimizer. Using the same random seed
    /// will give you the same result for the same input. Without a seed every
    /// run draws a fresh one.
    pub fn set_random_seed(&mut self, seed: u64) -> &mut Self {
        self.random_seed = Some(seed);
        self
    }

    /// Stop searching once this much time has passed and return the best packing found so far.
    pub fn set_time_limit(&mut self, time_limit: Duration) -> &mut Self {
        self.time_limit = Some(time_limit);
        self
    }

    /// Stop searching as soon as `token` is set to `true` and return the best packing
    /// found so far.
    pub fn set_cancel_token(&mut self, token: Arc<AtomicBool>) -> &mut Self {
        self.cancel_token = Some(token);
        self
    }

    /// Perform optimization. `progress_callback` is called with the fraction of trials
    /// completed, from 0.0 to 1.0.
    pub fn optimize<F>(&self, progress_callback: F) -> Result<Solution>
    where
        F: Fn(f64),
    {
        self.optimize_cut_pieces::<BasicBin, _>(&self.cut_pieces, &progress_callback)
    }

    pub(crate) fn optimize_cut_pieces<B, F>(
        &self,
        cut_pieces: &[CutPieceWithId],
        progress_callback: &F,
    ) -> Result<Solution>
    where
        B: Bin + Send + Into<ResultBar>,
        F: Fn(f64),
    {
        self.validate(cut_pieces)?;

        let seed = self.random_seed.unwrap_or_else(rand::random);

        // If there are no cut pieces, there's nothing to optimize.
        if cut_pieces.is_empty() {
            return Ok(Solution::empty(seed));
        }

        if tracing::enabled!(Level::DEBUG) {
            let length_set: FnvHashSet<u64> =
                cut_pieces.iter().map(|p| p.length.to_bits()).collect();
            debug!(
                seed,
                cut_pieces = cut_pieces.len(),
                unique_lengths = length_set.len(),
                stock_length = self.stock_length,
                trials = self.trials,
                "starting optimization"
            );
        }

        let started = Instant::now();
        let mut best: Option<Trial<B>> = None;
        let mut completed = 0;
        let mut stopped_early = false;

        while completed < self.trials {
            if completed > 0 && self.should_stop(started) {
                stopped_early = true;
                info!(completed, trials = self.trials, "optimization stopped early");
                break;
            }

            let end = cmp::min(completed + TRIAL_CHUNK_SIZE, self.trials);
            let chunk_best = trial::best_of::<B>(
                completed..end,
                cut_pieces,
                self.stock_length,
                self.cut_width,
                seed,
            );

            best = match (best, chunk_best) {
                (Some(best), Some(candidate)) if candidate.improves_on(&best) => {
                    debug!(
                        trial = candidate.index,
                        waste = candidate.waste,
                        bars = candidate.bins.len(),
                        "improved packing"
                    );
                    Some(candidate)
                }
                (Some(best), _) => Some(best),
                (None, candidate) => candidate,
            };

            completed = end;
            progress_callback(completed as f64 / self.trials as f64);
        }

        let best = best.ok_or(Error::InvalidTrialCount)?;
        let bars: Vec<ResultBar> = best.bins.into_iter().map(Into::into).collect();
        let waste: f64 = bars.iter().map(ResultBar::waste).sum();

        info!(
            bars = bars.len(),
            waste,
            trials_run = completed,
            "optimization finished"
        );

        Ok(Solution {
            bars,
            waste,
            trials_run: completed,
            stopped_early,
            seed,
        })
    }

    /// Reject settings and cut pieces that can't produce a valid packing. Checks run in a
    /// fixed order so the same input always gives the same error.
    fn validate(&self, cut_pieces: &[CutPieceWithId]) -> Result<()> {
        if !(self.stock_length.is_finite() && self.stock_length > 0.0) {
            return Err(Error::InvalidStockLength(self.stock_length));
        }
        if !(self.cut_width.is_finite() && self.cut_width >= 0.0) {
            return Err(Error::InvalidCutWidth(self.cut_width));
        }
        if self.trials == 0 {
            return Err(Error::InvalidTrialCount);
        }

        for cut_piece in cut_pieces {
            if !(cut_piece.length.is_finite() && cut_piece.length > 0.0) {
                return Err(Error::InvalidPieceLength {
                    external_id: cut_piece.external_id,
                    length: cut_piece.length,
                });
            }
            if cut_piece.length > self.stock_length + LENGTH_EPSILON {
                return Err(Error::OversizedPiece {
                    external_id: cut_piece.external_id,
                    length: cut_piece.length,
                    stock_length: self.stock_length,
                });
            }
        }

        Ok(())
    }

    fn should_stop(&self, started: Instant) -> bool {
        let cancelled = self
            .cancel_token
            .as_ref()
            .is_some_and(|token| token.load(Ordering::Relaxed));
        let timed_out = self
            .time_limit
            .is_some_and(|limit| started.elapsed() >= limit);

        cancelled || timed_out
    }
}

/// Expand a cut piece into one `CutPieceWithId` per unit of quantity.
pub(crate) fn expand_cut_piece(cut_pieces: &mut Vec<CutPieceWithId>, cut_piece: &CutPiece) {
    for _ in 0..cut_piece.quantity {
        cut_pieces.push(CutPieceWithId {
            id: cut_pieces.len(),
            external_id: cut_piece.external_id,
            length: cut_piece.length,
        });
    }
}

/// Optimize `lengths` with the default settings and `trials` randomized passes.
///
/// Each length is one cut piece whose external ID is its position in `lengths`.
pub fn optimize(lengths: &[f64], stock_length: f64, trials: usize) -> Result<Solution> {
    Optimizer::new()
        .set_stock_length(stock_length)
        .add_lengths(lengths)
        .set_trials(trials)
        .optimize(|_| {})
}
