//! Typed applicant record, as accepted from clients.

use serde::Deserialize;

/// Applicant gender as sent by clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    /// Male → 1, Female → 0.
    #[inline]
    pub fn indicator(self) -> f64 {
        match self {
            Gender::Male => 1.0,
            Gender::Female => 0.0,
        }
    }
}

/// Yes/No answer for asset ownership questions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
pub enum Ownership {
    Yes,
    No,
}

impl Ownership {
    /// Yes → 1, No → 0.
    #[inline]
    pub fn indicator(self) -> f64 {
        match self {
            Ownership::Yes => 1.0,
            Ownership::No => 0.0,
        }
    }
}

/// One applicant, validated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawRecord {
    pub num_children: u32,
    pub gender: Gender,
    /// Finite and non-negative.
    pub income: f64,
    pub own_car: Ownership,
    pub own_housing: Ownership,
}
