use super::*;

use crate::config::LENGTH_EPSILON;
use smallvec::SmallVec;

#[derive(Clone, Debug)]
pub(crate) struct BasicBin {
    length: f64,
    cut_width: f64,
    cut_pieces: SmallVec<[UsedCutPiece; 8]>,
}

impl Bin for BasicBin {
    fn new(length: f64, cut_width: f64) -> Self {
        BasicBin {
            length,
            cut_width,
            cut_pieces: Default::default(),
        }
    }

    fn waste(&self) -> f64 {
        self.length - self.cut_pieces.iter().map(|p| p.length).sum::<f64>()
    }

    fn cut_pieces(&self) -> std::slice::Iter<'_, UsedCutPiece> {
        self.cut_pieces.iter()
    }

    fn insert_cut_piece(&mut self, cut_piece: &CutPieceWithId) -> bool {
        self.insert_cut_piece(cut_piece)
    }
}

impl BasicBin {
    /// Insert cut piece in bin if it fits. Returns `true` if inserted.
    fn insert_cut_piece(&mut self, cut_piece: &CutPieceWithId) -> bool {
        if let Some(insertion_point) = self.insertion_point(cut_piece.length) {
            let start = insertion_point;
            let end = start + cut_piece.length;
            let used_piece = UsedCutPiece {
                external_id: cut_piece.external_id,
                length: cut_piece.length,
                start,
                end,
            };

            self.cut_pieces.push(used_piece);

            true
        } else {
            false
        }
    }

    /// Where the next piece should be inserted if it fits.
    fn insertion_point(&self, cut_length: f64) -> Option<f64> {
        let insertion_point = match self.cut_pieces.last() {
            Some(last) => last.end + self.cut_width,
            None => 0.0,
        };

        if insertion_point + cut_length <= self.length + LENGTH_EPSILON {
            Some(insertion_point)
        } else {
            None
        }
    }
}

impl From<BasicBin> for ResultBar {
    fn from(bin: BasicBin) -> Self {
        Self {
            length: bin.length,
            cut_pieces: bin.cut_pieces.iter().map(Into::into).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn piece(id: usize, length: f64) -> CutPieceWithId {
        CutPieceWithId {
            id,
            external_id: None,
            length,
        }
    }

    #[test]
    fn insert_until_full() {
        let mut bin = BasicBin::new(12.0, 0.0);

        assert!(bin.insert_cut_piece(&piece(0, 5.0)));
        assert!(bin.insert_cut_piece(&piece(1, 5.0)));
        assert!(!bin.insert_cut_piece(&piece(2, 5.0)));
        assert!(bin.insert_cut_piece(&piece(3, 2.0)));
        assert!(!bin.insert_cut_piece(&piece(4, 0.5)));

        assert_eq!(bin.cut_pieces().len(), 3);
        assert_eq!(bin.waste(), 0.0);
    }

    #[test]
    fn cut_pieces_are_laid_end_to_end() {
        let mut bin = BasicBin::new(12.0, 0.0);
        bin.insert_cut_piece(&piece(0, 4.0));
        bin.insert_cut_piece(&piece(1, 3.0));

        let pieces: Vec<(f64, f64)> = bin.cut_pieces().map(|p| (p.start, p.end)).collect();
        assert_eq!(pieces, vec![(0.0, 4.0), (4.0, 7.0)]);
        assert_eq!(bin.waste(), 5.0);
    }

    #[test]
    fn cut_width_is_only_between_pieces() {
        let mut bin = BasicBin::new(12.0, 0.5);

        // A single piece may use the whole bar.
        assert!(bin.insert_cut_piece(&piece(0, 12.0)));

        let mut bin = BasicBin::new(12.0, 0.5);
        assert!(bin.insert_cut_piece(&piece(0, 6.0)));
        assert!(!bin.insert_cut_piece(&piece(1, 6.0)));
        assert!(bin.insert_cut_piece(&piece(2, 5.5)));

        let second = bin.cut_pieces().nth(1).unwrap();
        assert_eq!(second.start, 6.5);
        assert_eq!(second.end, 12.0);

        // Kerf is counted as waste since it isn't part of any piece.
        assert_eq!(bin.waste(), 0.5);
    }

    #[test]
    fn decimal_lengths_that_fill_the_bar_fit() {
        let mut bin = BasicBin::new(12.0, 0.0);

        assert!(bin.insert_cut_piece(&piece(0, 3.5)));
        assert!(bin.insert_cut_piece(&piece(1, 2.8)));
        assert!(bin.insert_cut_piece(&piece(2, 5.7)));
        assert!(bin.waste().abs() < LENGTH_EPSILON);
    }

    #[test]
    fn bin_into_result_bar() {
        let mut bin = BasicBin::new(12.0, 0.0);
        bin.insert_cut_piece(&CutPieceWithId {
            id: 0,
            external_id: Some(7),
            length: 4.5,
        });

        let result: ResultBar = bin.into();
        assert_eq!(result.length, 12.0);
        assert_eq!(
            result.cut_pieces,
            vec![ResultCutPiece {
                external_id: Some(7),
                length: 4.5,
                start: 0.0,
                end: 4.5,
            }]
        );
        assert_eq!(result.waste(), 7.5);
    }
}
