//! Reading cut lists and schedules from text.
//!
//! A cut list has one `length,quantity` pair per line:
//!
//! ```text
//! # length,quantity
//! 3.5,10
//! 2.8,15
//! ```
//!
//! A schedule adds the bar diameter in millimeters as the first field:
//!
//! ```text
//! # diameter,length,quantity
//! 12,3.5,10
//! 16,2.8,15
//! ```
//!
//! Blank lines and lines starting with `#` are skipped. Every cut piece gets its 1-based line
//! number as its external ID, so placed pieces can be traced back to the input.

use crate::config::MAX_QUANTITY;
use crate::{CutPiece, Error, Result, Schedule};

/// Parse a cut list of `length,quantity` lines.
pub fn parse_cut_list(text: &str) -> Result<Vec<CutPiece>> {
    let mut cut_pieces = Vec::new();

    for (line, fields) in records(text) {
        match fields.as_slice() {
            [length, quantity] => cut_pieces.push(CutPiece {
                quantity: parse_quantity(line, quantity)?,
                external_id: Some(line),
                length: parse_length(line, length)?,
            }),
            _ => return Err(field_count_error(line, "length,quantity", fields.len())),
        }
    }

    Ok(cut_pieces)
}

/// Parse a schedule of `diameter,length,quantity` lines, grouping cut pieces by diameter.
pub fn parse_schedule(text: &str) -> Result<Schedule> {
    let mut schedule = Schedule::new();

    for (line, fields) in records(text) {
        match fields.as_slice() {
            [diameter, length, quantity] => {
                let diameter = parse_diameter(line, diameter)?;
                let cut_piece = CutPiece {
                    quantity: parse_quantity(line, quantity)?,
                    external_id: Some(line),
                    length: parse_length(line, length)?,
                };
                schedule.entry(diameter).or_default().push(cut_piece);
            }
            _ => {
                return Err(field_count_error(
                    line,
                    "diameter,length,quantity",
                    fields.len(),
                ))
            }
        }
    }

    Ok(schedule)
}

/// Non-empty, non-comment lines with their 1-based line numbers, split on commas.
fn records(text: &str) -> impl Iterator<Item = (usize, Vec<&str>)> {
    text.lines().enumerate().filter_map(|(i, line)| {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            None
        } else {
            Some((i + 1, line.split(',').map(str::trim).collect()))
        }
    })
}

fn field_count_error(line: usize, expected: &str, found: usize) -> Error {
    Error::Parse {
        line,
        message: format!("expected `{expected}`, found {found} field(s)"),
    }
}

fn parse_length(line: usize, value: &str) -> Result<f64> {
    let length: f64 = value.parse().map_err(|_| Error::Parse {
        line,
        message: format!("invalid length '{value}'"),
    })?;

    if length.is_finite() && length > 0.0 {
        Ok(length)
    } else {
        Err(Error::Parse {
            line,
            message: format!("length must be greater than zero, got '{value}'"),
        })
    }
}

fn parse_quantity(line: usize, value: &str) -> Result<usize> {
    let quantity: usize = value.parse().map_err(|_| Error::Parse {
        line,
        message: format!("invalid quantity '{value}'"),
    })?;

    if quantity <= MAX_QUANTITY {
        Ok(quantity)
    } else {
        Err(Error::Parse {
            line,
            message: format!("quantity {quantity} exceeds the limit of {MAX_QUANTITY}"),
        })
    }
}

fn parse_diameter(line: usize, value: &str) -> Result<u32> {
    match value.parse::<u32>() {
        Ok(diameter) if diameter > 0 => Ok(diameter),
        _ => Err(Error::Parse {
            line,
            message: format!("invalid diameter '{value}'"),
        }),
    }
}
