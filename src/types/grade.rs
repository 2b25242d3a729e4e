//! Grade ladder for the school billing engine
//!
//! Grades form a fixed ordered ladder: baby class, pre-primary 1 and 2,
//! then grade 1 through grade 9. Promotion moves a student one step up
//! the ladder; grade 9 is terminal. Unrecognized grade strings are
//! rejected at the parse boundary rather than silently skipped.

use super::error::BillingError;
use std::fmt;
use std::str::FromStr;

/// School grade tier, ordered from baby class to grade 9
///
/// The derived `Ord` follows declaration order, so comparisons and
/// sorting agree with the promotion ladder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Grade {
    /// Baby class (pre-school entry tier)
    Baby,
    /// Pre-primary 1
    Pp1,
    /// Pre-primary 2
    Pp2,
    Grade1,
    Grade2,
    Grade3,
    Grade4,
    Grade5,
    Grade6,
    Grade7,
    Grade8,
    /// Terminal tier: students in grade 9 are never promoted further
    Grade9,
}

impl Grade {
    /// The next tier up the ladder, or `None` for the terminal grade 9
    pub fn successor(self) -> Option<Grade> {
        match self {
            Grade::Baby => Some(Grade::Pp1),
            Grade::Pp1 => Some(Grade::Pp2),
            Grade::Pp2 => Some(Grade::Grade1),
            Grade::Grade1 => Some(Grade::Grade2),
            Grade::Grade2 => Some(Grade::Grade3),
            Grade::Grade3 => Some(Grade::Grade4),
            Grade::Grade4 => Some(Grade::Grade5),
            Grade::Grade5 => Some(Grade::Grade6),
            Grade::Grade6 => Some(Grade::Grade7),
            Grade::Grade7 => Some(Grade::Grade8),
            Grade::Grade8 => Some(Grade::Grade9),
            Grade::Grade9 => None,
        }
    }

    /// Short form used in CSV files and display output
    ///
    /// Numeric grades print as bare numbers (`"1"` .. `"9"`), the
    /// pre-primary tiers as `"baby"`, `"pp1"` and `"pp2"`.
    pub fn as_str(self) -> &'static str {
        match self {
            Grade::Baby => "baby",
            Grade::Pp1 => "pp1",
            Grade::Pp2 => "pp2",
            Grade::Grade1 => "1",
            Grade::Grade2 => "2",
            Grade::Grade3 => "3",
            Grade::Grade4 => "4",
            Grade::Grade5 => "5",
            Grade::Grade6 => "6",
            Grade::Grade7 => "7",
            Grade::Grade8 => "8",
            Grade::Grade9 => "9",
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Grade {
    type Err = BillingError;

    /// Parse the short form, case-insensitively
    ///
    /// # Errors
    ///
    /// Returns `BillingError::UnknownGrade` for any string outside the
    /// ladder, including out-of-range numbers like `"10"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "baby" => Ok(Grade::Baby),
            "pp1" => Ok(Grade::Pp1),
            "pp2" => Ok(Grade::Pp2),
            "1" => Ok(Grade::Grade1),
            "2" => Ok(Grade::Grade2),
            "3" => Ok(Grade::Grade3),
            "4" => Ok(Grade::Grade4),
            "5" => Ok(Grade::Grade5),
            "6" => Ok(Grade::Grade6),
            "7" => Ok(Grade::Grade7),
            "8" => Ok(Grade::Grade8),
            "9" => Ok(Grade::Grade9),
            other => Err(BillingError::unknown_grade(other)),
        }
    }
}
