use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Gender {
    #[serde(rename = "Male")]
    Male,
    #[serde(rename = "Female")]
    Female,
}

impl Gender {
    pub fn label(&self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The seven fixed violation categories staff can log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ViolationType {
    #[serde(rename = "No Hat")]
    NoHat,
    #[serde(rename = "Improper Shoes")]
    ImproperShoes,
    #[serde(rename = "No Tie")]
    NoTie,
    #[serde(rename = "Long Hair (Boys)")]
    LongHair,
    #[serde(rename = "Improper Socks")]
    ImproperSocks,
    #[serde(rename = "Incomplete Badge/Attributes")]
    IncompleteBadge,
    #[serde(rename = "Other")]
    Other,
}

pub const ALL_VIOLATION_TYPES: [ViolationType; 7] = [
    ViolationType::NoHat,
    ViolationType::ImproperShoes,
    ViolationType::NoTie,
    ViolationType::LongHair,
    ViolationType::ImproperSocks,
    ViolationType::IncompleteBadge,
    ViolationType::Other,
];

impl ViolationType {
    pub fn label(&self) -> &'static str {
        match self {
            ViolationType::NoHat => "No Hat",
            ViolationType::ImproperShoes => "Improper Shoes",
            ViolationType::NoTie => "No Tie",
            ViolationType::LongHair => "Long Hair (Boys)",
            ViolationType::ImproperSocks => "Improper Socks",
            ViolationType::IncompleteBadge => "Incomplete Badge/Attributes",
            ViolationType::Other => "Other",
        }
    }

    /// Stable one-based code used for shell entry.
    pub fn code(&self) -> usize {
        ALL_VIOLATION_TYPES
            .iter()
            .position(|v| v == self)
            .map(|i| i + 1)
            .unwrap_or(0)
    }

    pub fn from_code(code: usize) -> Option<ViolationType> {
        if code == 0 {
            return None;
        }
        ALL_VIOLATION_TYPES.get(code - 1).copied()
    }
}

impl fmt::Display for ViolationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Student {
    pub name: String,
    pub gender: Gender,
}

/// One logged disciplinary incident. `id` is assigned by the store at
/// creation and never changes afterwards.
#[derive(Debug, Clone, Serialize)]
pub struct ViolationRecord {
    pub id: String,
    pub student_name: String,
    pub student_class: String,
    pub gender: Gender,
    pub date: NaiveDate,
    pub violations: Vec<ViolationType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Everything a record carries except its id; the store fills that in.
#[derive(Debug, Clone)]
pub struct RecordDraft {
    pub student_name: String,
    pub student_class: String,
    pub gender: Gender,
    pub date: NaiveDate,
    pub violations: Vec<ViolationType>,
    pub notes: Option<String>,
}

/// One slice of the top-offenders chart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartBucket {
    pub name: String,
    pub value: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn violation_codes_round_trip() {
        for violation in ALL_VIOLATION_TYPES {
            assert_eq!(ViolationType::from_code(violation.code()), Some(violation));
        }
        assert_eq!(ViolationType::from_code(0), None);
        assert_eq!(ViolationType::from_code(8), None);
    }

    #[test]
    fn labels_are_distinct() {
        for (i, a) in ALL_VIOLATION_TYPES.iter().enumerate() {
            for b in &ALL_VIOLATION_TYPES[i + 1..] {
                assert_ne!(a.label(), b.label());
            }
        }
    }
}
