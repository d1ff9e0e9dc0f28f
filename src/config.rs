//! Default settings and constants.

/// Length of a standard stock bar, in meters.
pub const DEFAULT_STOCK_LENGTH: f64 = 12.0;

/// Number of randomized first-fit passes the optimizer runs by default.
pub const DEFAULT_TRIALS: usize = 3000;

/// Bar diameters, in millimeters, that are commonly scheduled.
pub const STANDARD_DIAMETERS: &[u32] = &[10, 12, 14, 16, 18, 20, 22, 25];

/// Tolerance used when checking whether a piece fits in a bar, so that lengths such as
/// `3.5 + 2.8 + 5.7` are not rejected because of floating-point rounding.
pub const LENGTH_EPSILON: f64 = 1e-9;

/// Trials run between checks of cancellation, time limit, and progress reporting.
pub const TRIAL_CHUNK_SIZE: usize = 64;

/// Steel weight divisor: `d² / 162` gives kg per meter for a diameter `d` in mm.
pub const STEEL_WEIGHT_DIVISOR: f64 = 162.0;

/// Decimal places used to group bars by waste length in the waste breakdown.
pub const DEFAULT_WASTE_PRECISION: u32 = 2;

/// Largest waste precision. Waste lengths scaled by `10^precision` must stay well inside `i64`.
pub const MAX_WASTE_PRECISION: u32 = 9;

/// Largest quantity accepted for one line of a cut list or schedule.
pub const MAX_QUANTITY: usize = 100_000;

/// Settings for building a [`Report`](crate::report::Report).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReportConfig {
    /// Steel price per metric ton. `None` leaves all costs at zero.
    pub price_per_ton: Option<f64>,

    /// Decimal places used to group bars by waste length.
    pub waste_precision: u32,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            price_per_ton: None,
            waste_precision: DEFAULT_WASTE_PRECISION,
        }
    }
}

impl ReportConfig {
    /// Set the steel price per metric ton.
    pub fn with_price_per_ton(mut self, price: f64) -> Self {
        self.price_per_ton = Some(price);
        self
    }

    /// Set the number of decimal places used to group waste lengths, at most
    /// [`MAX_WASTE_PRECISION`].
    pub fn with_waste_precision(mut self, precision: u32) -> Self {
        self.waste_precision = precision.min(MAX_WASTE_PRECISION);
        self
    }
}
