//! Mixed-radix numbers.
//!
//! A state space of several independent discrete variables, each with its
//! own cardinality, maps one-to-one onto `0..product` by treating the
//! variables as digits of a number whose positional bases differ. The first
//! digit is the most significant.

use std::iter::FusedIterator;

use crate::error::{Error, Result};

/// Codec between digit tuples and flat state indices.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MixedRadix {
    bases: Vec<u64>,
    states: u64,
}

impl MixedRadix {
    /// Create a codec for the given per-digit bases.
    ///
    /// Every base must be at least 1 and the product must fit in a `u64`.
    pub fn new(bases: impl IntoIterator<Item = u64>) -> Result<Self> {
        let bases: Vec<u64> = bases.into_iter().collect();
        if let Some(position) = bases.iter().position(|&base| base == 0) {
            return Err(Error::Domain(format!("base at position {position} is zero")));
        }
        let states = bases
            .iter()
            .try_fold(1u64, |acc, &base| acc.checked_mul(base))
            .ok_or_else(|| Error::Domain(format!("state count of {bases:?} overflows")))?;
        Ok(Self { bases, states })
    }

    pub fn bases(&self) -> &[u64] {
        &self.bases
    }

    /// Number of distinct digit tuples.
    pub fn states(&self) -> u64 {
        self.states
    }

    /// Number of digits.
    pub fn len(&self) -> usize {
        self.bases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bases.is_empty()
    }

    /// Flat index of a digit tuple.
    pub fn encode(&self, digits: &[u64]) -> Result<u64> {
        if digits.len() != self.bases.len() {
            return Err(Error::Domain(format!(
                "expected {} digits, got {}",
                self.bases.len(),
                digits.len()
            )));
        }
        digits
            .iter()
            .zip(&self.bases)
            .enumerate()
            .try_fold(0u64, |acc, (position, (&digit, &base))| {
                if digit >= base {
                    return Err(Error::Domain(format!(
                        "digit {digit} at position {position} is out of range for base {base}"
                    )));
                }
                // acc < product of the bases so far, so this cannot overflow `states`.
                Ok(acc * base + digit)
            })
    }

    /// Digit tuple of a flat index.
    pub fn decode(&self, index: u64) -> Result<Vec<u64>> {
        if index >= self.states {
            return Err(Error::Domain(format!(
                "index {index} is out of range for {} states",
                self.states
            )));
        }
        let mut digits = vec![0; self.bases.len()];
        let mut rest = index;
        for (digit, &base) in digits.iter_mut().zip(&self.bases).rev() {
            *digit = rest % base;
            rest /= base;
        }
        Ok(digits)
    }

    /// All digit tuples in index order.
    pub fn iter(&self) -> Combinations<'_> {
        Combinations {
            bases: &self.bases,
            next: (self.states > 0).then(|| vec![0; self.bases.len()]),
            remaining: self.states,
        }
    }
}

impl<'a> IntoIterator for &'a MixedRadix {
    type Item = Vec<u64>;
    type IntoIter = Combinations<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Odometer over every digit tuple of a [`MixedRadix`].
#[derive(Debug, Clone)]
pub struct Combinations<'a> {
    bases: &'a [u64],
    next: Option<Vec<u64>>,
    remaining: u64,
}

impl Iterator for Combinations<'_> {
    type Item = Vec<u64>;

    fn next(&mut self) -> Option<Vec<u64>> {
        let current = self.next.take()?;
        self.remaining -= 1;
        if self.remaining > 0 {
            let mut following = current.clone();
            for (digit, &base) in following.iter_mut().zip(self.bases).rev() {
                *digit += 1;
                if *digit < base {
                    break;
                }
                *digit = 0;
            }
            self.next = Some(following);
        }
        Some(current)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match usize::try_from(self.remaining) {
            Ok(n) => (n, Some(n)),
            Err(_) => (usize::MAX, None),
        }
    }
}

impl ExactSizeIterator for Combinations<'_> {}

impl FusedIterator for Combinations<'_> {}

/// Positional system of a [`convert_basis`] operand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Radix {
    /// Every digit shares one base; the width is whatever the value needs.
    Uniform(u64),
    /// Fixed width, one base per digit.
    Mixed(Vec<u64>),
}

/// Value handed to [`convert_basis`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Numeral {
    /// A plain integer. Valid only with a uniform source radix of 10.
    Value(u64),
    /// Digits, most significant first.
    Digits(Vec<u64>),
}

impl From<u64> for Numeral {
    fn from(value: u64) -> Self {
        Numeral::Value(value)
    }
}

impl From<Vec<u64>> for Numeral {
    fn from(digits: Vec<u64>) -> Self {
        Numeral::Digits(digits)
    }
}

impl From<&[u64]> for Numeral {
    fn from(digits: &[u64]) -> Self {
        Numeral::Digits(digits.to_vec())
    }
}

impl<const N: usize> From<[u64; N]> for Numeral {
    fn from(digits: [u64; N]) -> Self {
        Numeral::Digits(digits.to_vec())
    }
}

impl From<u64> for Radix {
    fn from(base: u64) -> Self {
        Radix::Uniform(base)
    }
}

impl From<Vec<u64>> for Radix {
    fn from(bases: Vec<u64>) -> Self {
        Radix::Mixed(bases)
    }
}

impl<const N: usize> From<[u64; N]> for Radix {
    fn from(bases: [u64; N]) -> Self {
        Radix::Mixed(bases.to_vec())
    }
}

/// Re-express `value`, written in `from`, as digits in `to`.
///
/// A uniform target yields the shortest digit list (`[0]` for zero); a mixed
/// target yields exactly one digit per base and fails if the value does not
/// fit.
///
/// ```
/// use linsim_core::radix::convert_basis;
///
/// assert_eq!(convert_basis(10.into(), 2.into(), 5.into()).unwrap(), vec![1, 0, 1]);
/// assert_eq!(convert_basis(6.into(), 10.into(), [2, 4].into()).unwrap(), vec![1, 6]);
/// assert_eq!(convert_basis([4, 3, 2].into(), 10.into(), [2, 0, 0].into()).unwrap(), vec![1, 2]);
/// ```
pub fn convert_basis(from: Radix, to: Radix, value: Numeral) -> Result<Vec<u64>> {
    let number = to_integer(&from, value)?;
    from_integer(&to, number)
}

fn to_integer(from: &Radix, value: Numeral) -> Result<u64> {
    match (from, value) {
        (Radix::Uniform(10), Numeral::Value(n)) => Ok(n),
        (_, Numeral::Value(n)) => Err(Error::Domain(format!(
            "plain value {n} needs a base-10 source, give digits instead"
        ))),
        (Radix::Uniform(base), Numeral::Digits(digits)) => {
            check_uniform(*base)?;
            digits.iter().enumerate().try_fold(0u64, |acc, (position, &digit)| {
                if digit >= *base {
                    return Err(Error::Domain(format!(
                        "digit {digit} at position {position} is out of range for base {base}"
                    )));
                }
                acc.checked_mul(*base)
                    .and_then(|shifted| shifted.checked_add(digit))
                    .ok_or_else(|| Error::Domain(format!("{digits:?} in base {base} overflows")))
            })
        }
        (Radix::Mixed(bases), Numeral::Digits(digits)) => {
            MixedRadix::new(bases.iter().copied())?.encode(&digits)
        }
    }
}

fn from_integer(to: &Radix, mut number: u64) -> Result<Vec<u64>> {
    match to {
        Radix::Uniform(base) => {
            check_uniform(*base)?;
            let mut digits = Vec::new();
            loop {
                digits.push(number % base);
                number /= base;
                if number == 0 {
                    break;
                }
            }
            digits.reverse();
            Ok(digits)
        }
        Radix::Mixed(bases) => {
            let codec = MixedRadix::new(bases.iter().copied())?;
            if number >= codec.states() {
                return Err(Error::Domain(format!(
                    "{number} does not fit in {} digits of {bases:?}",
                    bases.len()
                )));
            }
            codec.decode(number)
        }
    }
}

fn check_uniform(base: u64) -> Result<()> {
    if base < 2 {
        return Err(Error::Domain(format!("uniform base must be at least 2, got {base}")));
    }
    Ok(())
}
