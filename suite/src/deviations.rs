//! Known deviations of the service from the behavior the suite's authors
//! expected.
//!
//! Each entry keeps two statuses side by side: the one the scenario asserted,
//! and the one observed on the live service when the deviation was recorded.
//! Neither is treated as the contract. `verify` accepts either and reports
//! which one the service produced this time.

use crate::error::SuiteError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KnownDeviation {
    pub name: &'static str,
    /// Status the scenario's author asserted.
    pub asserted: u16,
    /// Status observed on the live service, if it was ever recorded.
    pub recorded: Option<u16>,
    pub note: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The service answered as the author asserted.
    MatchesAsserted,
    /// The recorded deviation was reproduced.
    MatchesRecorded,
    /// Nothing was recorded for this deviation; this is what came back.
    Unrecorded(u16),
}

impl KnownDeviation {
    pub fn verify(&self, status: u16) -> Result<Outcome, SuiteError> {
        let outcome = if self.recorded == Some(status) {
            Outcome::MatchesRecorded
        } else if status == self.asserted {
            Outcome::MatchesAsserted
        } else if self.recorded.is_none() {
            Outcome::Unrecorded(status)
        } else {
            return Err(SuiteError::Deviation {
                name: self.name,
                status,
                asserted: self.asserted,
                recorded: self.recorded,
            });
        };

        match outcome {
            Outcome::MatchesAsserted => {
                tracing::info!(deviation = self.name, status, "service answered as asserted")
            }
            Outcome::MatchesRecorded | Outcome::Unrecorded(_) => tracing::warn!(
                deviation = self.name,
                status,
                asserted = self.asserted,
                note = self.note,
                "known deviation reproduced"
            ),
        }
        Ok(outcome)
    }
}

pub const OVERSIZED_AGE: KnownDeviation = KnownDeviation {
    name: "add_new_pet with age 2000",
    asserted: 403,
    recorded: Some(200),
    note: "service accepts an implausible age",
};

pub const NEGATIVE_AGE: KnownDeviation = KnownDeviation {
    name: "add_new_pet with age -2",
    asserted: 403,
    recorded: Some(200),
    note: "service accepts a negative age",
};

pub const TEXT_PHOTO: KnownDeviation = KnownDeviation {
    name: "add_new_pet with a .txt photo",
    asserted: 415,
    recorded: None,
    note: "expected an unsupported media type refusal; the live answer was never captured",
};

pub const MARKUP_IN_ANIMAL_TYPE: KnownDeviation = KnownDeviation {
    name: "add_new_pet with markup in animal_type",
    asserted: 403,
    recorded: Some(200),
    note: "service accepts special characters in animal_type",
};

pub const EMPTY_FIELDS: KnownDeviation = KnownDeviation {
    name: "add_new_pet_simple with every field empty",
    asserted: 200,
    recorded: Some(200),
    note: "service creates a pet with empty name, animal_type and age",
};

pub const ALL: [KnownDeviation; 5] = [
    OVERSIZED_AGE,
    NEGATIVE_AGE,
    TEXT_PHOTO,
    MARKUP_IN_ANIMAL_TYPE,
    EMPTY_FIELDS,
];
