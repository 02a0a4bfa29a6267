use std::{
    fmt,
    iter::Sum,
    ops::{Add, AddAssign},
};

/// Money amount represented as **integer minor units** (cents).
///
/// Expense amounts are currency-agnostic; the engine only needs exact
/// addition and a stable textual form, so floating point is never used.
///
/// # Examples
///
/// ```rust
/// use engine::MoneyCents;
///
/// let amount = MoneyCents::new(12_50);
/// assert_eq!(amount.cents(), 1250);
/// assert_eq!(amount.to_string(), "12.50");
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct MoneyCents(i64);

impl MoneyCents {
    pub const ZERO: MoneyCents = MoneyCents(0);

    /// Creates a new amount from integer cents.
    #[must_use]
    pub const fn new(cents: i64) -> Self {
        Self(cents)
    }

    /// Returns the raw value in cents.
    #[must_use]
    pub const fn cents(self) -> i64 {
        self.0
    }

    /// Returns `true` if the amount is positive.
    #[must_use]
    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    /// Checked addition (returns `None` on overflow).
    #[must_use]
    pub fn checked_add(self, rhs: MoneyCents) -> Option<MoneyCents> {
        self.0.checked_add(rhs.0).map(MoneyCents)
    }

    /// Mean of `count` amounts summing to `self`, rounded half away from zero
    /// to the nearest cent.
    ///
    /// An empty set averages to zero.
    #[must_use]
    pub fn average(self, count: u64) -> MoneyCents {
        if count == 0 {
            return MoneyCents::ZERO;
        }
        let total = i128::from(self.0);
        let count = i128::from(count);
        let half = count / 2;
        let rounded = if total >= 0 {
            (total + half) / count
        } else {
            (total - half) / count
        };
        // |rounded| <= |total|, so it always fits back into i64.
        MoneyCents(rounded as i64)
    }
}

impl fmt::Display for MoneyCents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let units = abs / 100;
        let cents = abs % 100;
        write!(f, "{sign}{units}.{cents:02}")
    }
}

impl From<i64> for MoneyCents {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl From<MoneyCents> for i64 {
    fn from(value: MoneyCents) -> Self {
        value.0
    }
}

impl Add for MoneyCents {
    type Output = MoneyCents;

    fn add(self, rhs: MoneyCents) -> Self::Output {
        MoneyCents(self.0 + rhs.0)
    }
}

impl AddAssign for MoneyCents {
    fn add_assign(&mut self, rhs: MoneyCents) {
        self.0 += rhs.0;
    }
}

impl Sum for MoneyCents {
    fn sum<I: Iterator<Item = MoneyCents>>(iter: I) -> Self {
        iter.fold(MoneyCents::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a MoneyCents> for MoneyCents {
    fn sum<I: Iterator<Item = &'a MoneyCents>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_formats_minor_units() {
        assert_eq!(MoneyCents::new(0).to_string(), "0.00");
        assert_eq!(MoneyCents::new(1).to_string(), "0.01");
        assert_eq!(MoneyCents::new(10).to_string(), "0.10");
        assert_eq!(MoneyCents::new(1050).to_string(), "10.50");
        assert_eq!(MoneyCents::new(-1050).to_string(), "-10.50");
    }

    #[test]
    fn average_of_nothing_is_zero() {
        assert_eq!(MoneyCents::new(0).average(0), MoneyCents::ZERO);
        assert_eq!(MoneyCents::new(1234).average(0), MoneyCents::ZERO);
    }

    #[test]
    fn average_rounds_half_away_from_zero() {
        assert_eq!(MoneyCents::new(2000).average(2), MoneyCents::new(1000));
        assert_eq!(MoneyCents::new(1000).average(3), MoneyCents::new(333));
        assert_eq!(MoneyCents::new(5).average(2), MoneyCents::new(3));
        assert_eq!(MoneyCents::new(-5).average(2), MoneyCents::new(-3));
    }

    #[test]
    fn sum_and_checked_add() {
        let total: MoneyCents = [MoneyCents::new(1250), MoneyCents::new(750)].iter().sum();
        assert_eq!(total, MoneyCents::new(2000));
        assert!(MoneyCents::new(i64::MAX).checked_add(MoneyCents::new(1)).is_none());
    }
}
