use serde::{Deserialize, Serialize};
use std::fmt;

pub const RED_NUMBERS: [u8; 18] = [
    1, 3, 5, 7, 9, 12, 14, 16, 18, 19, 21, 23, 25, 27, 30, 32, 34, 36,
];
pub const BLACK_NUMBERS: [u8; 18] = [
    2, 4, 6, 8, 10, 11, 13, 15, 17, 20, 22, 24, 26, 28, 29, 31, 33, 35,
];

/// Highest pocket on a single-zero wheel.
pub const MAX_NUMBER: u8 = 36;

/// A single roulette outcome in 0..=36.
///
/// Only the value is stored; colour, parity, dozen and column are derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct RouletteNumber(u8);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Color {
    Red,
    Black,
    Green,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Parity {
    Even,
    Odd,
}

/// 1-12, 13-24, 25-36.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Dozen {
    First,
    Second,
    Third,
}

/// Layout column ("linha"): ((n - 1) mod 3) + 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Column {
    First,
    Second,
    Third,
}

impl RouletteNumber {
    pub const ZERO: RouletteNumber = RouletteNumber(0);

    pub fn new(value: u8) -> Option<Self> {
        (value <= MAX_NUMBER).then_some(Self(value))
    }

    /// Accept any integer, rejecting negatives and anything above 36.
    pub fn from_i64(value: i64) -> Option<Self> {
        u8::try_from(value).ok().and_then(Self::new)
    }

    pub fn value(self) -> u8 {
        self.0
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub fn color(self) -> Color {
        if self.0 == 0 {
            Color::Green
        } else if RED_NUMBERS.contains(&self.0) {
            Color::Red
        } else {
            Color::Black
        }
    }

    /// Zero has no parity.
    pub fn parity(self) -> Option<Parity> {
        match self.0 {
            0 => None,
            n if n % 2 == 0 => Some(Parity::Even),
            _ => Some(Parity::Odd),
        }
    }

    pub fn dozen(self) -> Option<Dozen> {
        match self.0 {
            0 => None,
            1..=12 => Some(Dozen::First),
            13..=24 => Some(Dozen::Second),
            _ => Some(Dozen::Third),
        }
    }

    pub fn column(self) -> Option<Column> {
        if self.0 == 0 {
            return None;
        }
        match (self.0 - 1) % 3 {
            0 => Some(Column::First),
            1 => Some(Column::Second),
            _ => Some(Column::Third),
        }
    }

    /// Every pocket on the wheel, ascending.
    pub fn all() -> impl Iterator<Item = RouletteNumber> {
        (0..=MAX_NUMBER).map(RouletteNumber)
    }
}

impl TryFrom<u8> for RouletteNumber {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value).ok_or_else(|| format!("roulette number out of range: {value}"))
    }
}

impl From<RouletteNumber> for u8 {
    fn from(n: RouletteNumber) -> u8 {
        n.0
    }
}

impl fmt::Display for RouletteNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Dozen {
    pub fn index(self) -> usize {
        match self {
            Dozen::First => 0,
            Dozen::Second => 1,
            Dozen::Third => 2,
        }
    }
}

impl Column {
    pub fn index(self) -> usize {
        match self {
            Column::First => 0,
            Column::Second => 1,
            Column::Third => 2,
        }
    }
}

/// Build a sequence from raw integers, dropping anything outside the wheel.
pub fn numbers(values: &[i64]) -> Vec<RouletteNumber> {
    values.iter().copied().filter_map(RouletteNumber::from_i64).collect()
}
