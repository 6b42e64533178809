use std::{iter::Sum, ops::Add};

use super::Base;

/// Per-sample read counts at a single site.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct BaseCounts {
    /// Count of `A`.
    pub a: usize,
    /// Count of `C`.
    pub c: usize,
    /// Count of `G`.
    pub g: usize,
    /// Count of `T`.
    pub t: usize,
    /// Count of unknown or ambiguous bases.
    pub n: usize,
    /// Count of deletions.
    pub d: usize,
}

impl BaseCounts {
    /// Returns the count of a base.
    pub fn get(&self, base: Base) -> usize {
        match base {
            Base::A => self.a,
            Base::C => self.c,
            Base::G => self.g,
            Base::T => self.t,
            Base::N => self.n,
        }
    }

    /// Returns a mutable reference to the count of a base.
    pub fn get_mut(&mut self, base: Base) -> &mut usize {
        match base {
            Base::A => &mut self.a,
            Base::C => &mut self.c,
            Base::G => &mut self.g,
            Base::T => &mut self.t,
            Base::N => &mut self.n,
        }
    }

    /// Returns the sum of the `A`, `C`, `G`, and `T` counts.
    pub fn coverage(&self) -> usize {
        self.a + self.c + self.g + self.t
    }

    pub(crate) fn most_frequent_except(&self, excluded: Base) -> Base {
        Base::ACGT
            .into_iter()
            .filter(|&base| base != excluded)
            .fold(None, |best: Option<Base>, base| match best {
                Some(best) if self.get(best) >= self.get(base) => Some(best),
                _ => Some(base),
            })
            .unwrap_or(Base::N)
    }
}

impl Add for BaseCounts {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self {
            a: self.a + rhs.a,
            c: self.c + rhs.c,
            g: self.g + rhs.g,
            t: self.t + rhs.t,
            n: self.n + rhs.n,
            d: self.d + rhs.d,
        }
    }
}

impl Sum for BaseCounts {
    fn sum<I>(iter: I) -> Self
    where
        I: Iterator<Item = Self>,
    {
        iter.fold(Self::default(), Add::add)
    }
}
