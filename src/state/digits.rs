use rand::Rng;
use rand::seq::SliceRandom;
use thiserror::Error;

/// Number of digits assigned to each board axis.
pub const DIGIT_COUNT: usize = 10;

/// A permutation of the digits 0-9 assigned to one axis of a board.
///
/// Values of this type are only constructed through [`Digits::shuffled`] or a
/// validated [`TryFrom`], so every digit is guaranteed to appear exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Digits([u8; DIGIT_COUNT]);

/// Error raised when a stored digit list is not a permutation of 0-9.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("digit list is not a permutation of 0-9: {0:?}")]
pub struct InvalidDigits(pub Vec<u8>);

impl Digits {
    /// Draw a fresh uniformly-random permutation from the provided RNG.
    pub fn shuffled<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut digits: [u8; DIGIT_COUNT] = std::array::from_fn(|i| i as u8);
        digits.shuffle(rng);
        Self(digits)
    }

    /// Grid position of a digit along this axis.
    ///
    /// `digit` is reduced modulo 10 first, so any cumulative score can be
    /// passed directly.
    pub fn position_of(&self, digit: u8) -> usize {
        let wanted = digit % 10;
        self.0
            .iter()
            .position(|d| *d == wanted)
            .expect("Digits holds every digit 0-9 exactly once")
    }

    /// Digits in axis order.
    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }
}

impl TryFrom<Vec<u8>> for Digits {
    type Error = InvalidDigits;

    fn try_from(values: Vec<u8>) -> Result<Self, Self::Error> {
        if values.len() != DIGIT_COUNT {
            return Err(InvalidDigits(values));
        }

        let mut seen = [false; DIGIT_COUNT];
        for value in &values {
            let Some(slot) = seen.get_mut(*value as usize) else {
                return Err(InvalidDigits(values));
            };
            if *slot {
                return Err(InvalidDigits(values));
            }
            *slot = true;
        }

        let mut digits = [0u8; DIGIT_COUNT];
        digits.copy_from_slice(&values);
        Ok(Self(digits))
    }
}

impl From<Digits> for Vec<u8> {
    fn from(digits: Digits) -> Self {
        digits.0.to_vec()
    }
}

/// The revealed pair of axis permutations for a pool.
///
/// Rows carry the home side's digits, columns the away side's. A pool either
/// has both axes assigned or neither.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxisNumbers {
    /// Digits along the row axis (home side of the score).
    pub rows: Digits,
    /// Digits along the column axis (away side of the score).
    pub cols: Digits,
}

impl AxisNumbers {
    /// Draw two independent random permutations, one per axis.
    pub fn drawn<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            rows: Digits::shuffled(rng),
            cols: Digits::shuffled(rng),
        }
    }
}

/// Resolve the winning cell for a cumulative score pair.
///
/// The winning digit on each axis is the last digit of that side's cumulative
/// score; the cell index is where the two digits meet on the grid
/// (`row_position * 10 + col_position`). Pure and total for any score pair.
pub fn winning_cell(row_score: u32, col_score: u32, numbers: &AxisNumbers) -> usize {
    let row = numbers.rows.position_of((row_score % 10) as u8);
    let col = numbers.cols.position_of((col_score % 10) as u8);
    row * 10 + col
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed(values: [u8; 10]) -> Digits {
        Digits::try_from(values.to_vec()).unwrap()
    }

    #[test]
    fn shuffled_is_a_permutation() {
        let mut rng = rand::rng();
        for _ in 0..50 {
            let digits = Digits::shuffled(&mut rng);
            let mut sorted: Vec<u8> = digits.as_slice().to_vec();
            sorted.sort_unstable();
            assert_eq!(sorted, (0..10).collect::<Vec<u8>>());
        }
    }

    #[test]
    fn try_from_rejects_duplicates_and_bad_lengths() {
        assert!(Digits::try_from(vec![0, 1, 2, 3, 4, 5, 6, 7, 8, 8]).is_err());
        assert!(Digits::try_from(vec![0, 1, 2]).is_err());
        assert!(Digits::try_from(vec![0, 1, 2, 3, 4, 5, 6, 7, 8, 10]).is_err());
        assert!(Digits::try_from((0..10).collect::<Vec<u8>>()).is_ok());
    }

    #[test]
    fn position_reduces_scores_modulo_ten() {
        let digits = fixed([3, 7, 1, 9, 0, 5, 8, 2, 6, 4]);
        assert_eq!(digits.position_of(7), 1);
        assert_eq!(digits.position_of(17), 1);
        assert_eq!(digits.position_of(107), 1);
    }

    #[test]
    fn winning_cell_matches_hand_computed_example() {
        let numbers = AxisNumbers {
            rows: fixed([3, 7, 1, 9, 0, 5, 8, 2, 6, 4]),
            cols: fixed([6, 2, 8, 0, 4, 9, 1, 5, 3, 7]),
        };

        // Row score 17 -> digit 7 at row position 1; col score 3 -> digit 3
        // at col position 8.
        assert_eq!(winning_cell(17, 3, &numbers), 18);
    }

    #[test]
    fn winning_cell_depends_only_on_last_digits() {
        let mut rng = rand::rng();
        let numbers = AxisNumbers::drawn(&mut rng);

        for k in 0u32..5 {
            assert_eq!(
                winning_cell(7, 14, &numbers),
                winning_cell(7 + 10 * k, 14 + 10 * k, &numbers)
            );
        }
    }

    #[test]
    fn winning_cell_is_always_in_range() {
        let mut rng = rand::rng();
        let numbers = AxisNumbers::drawn(&mut rng);

        for row in 0..30u32 {
            for col in 0..30u32 {
                assert!(winning_cell(row, col, &numbers) < 100);
            }
        }
    }
}
