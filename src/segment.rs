//! Class code composition and customer segment classification

use std::fmt;

/// The three dimension scores in fixed order: recency, frequency, monetary.
///
/// Renders as a 3-character code of digits 1-4, e.g. "111" or "432".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassCode {
    pub recency: u8,
    pub frequency: u8,
    pub monetary: u8,
}

impl ClassCode {
    pub fn new(recency: u8, frequency: u8, monetary: u8) -> Self {
        ClassCode {
            recency,
            frequency,
            monetary,
        }
    }

    /// The code digits in recency, frequency, monetary order.
    pub fn digits(&self) -> [u8; 3] {
        [self.recency, self.frequency, self.monetary]
    }
}

impl fmt::Display for ClassCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.recency, self.frequency, self.monetary)
    }
}

/// Named customer segment derived from a [`ClassCode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment {
    BestCustomer,
    AlmostLost,
    LostCustomer,
    LostCheapCustomer,
    LoyalCustomer,
    BigSpender,
    NoClassification,
}

impl Segment {
    /// Classify a code into a segment.
    ///
    /// Arm order is the rule precedence: the four exact-code cohorts win over
    /// the digit-position rules, so "111" is a best customer rather than a
    /// loyal one, and "444" a lost-cheap customer rather than unclassified.
    pub fn classify(code: &ClassCode) -> Segment {
        match code.digits() {
            [1, 1, 1] => Segment::BestCustomer,
            [3, 1, 1] => Segment::AlmostLost,
            [4, 1, 1] => Segment::LostCustomer,
            [4, 4, 4] => Segment::LostCheapCustomer,
            [_, 1, _] => Segment::LoyalCustomer,
            [_, _, 1] => Segment::BigSpender,
            _ => Segment::NoClassification,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Segment::BestCustomer => "BEST_CUSTOMER",
            Segment::AlmostLost => "ALMOST_LOST",
            Segment::LostCustomer => "LOST_CUSTOMER",
            Segment::LostCheapCustomer => "LOST_CHEAP_CUSTOMER",
            Segment::LoyalCustomer => "LOYAL_CUSTOMER",
            Segment::BigSpender => "BIG_SPENDER",
            Segment::NoClassification => "NO_CLASSIFICATION",
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
