//! Exam catalog — the static two-level table behind the cascading selection.
//!
//! Each family carries its display label, the canonical value used in the
//! prompt, and its ordered sub-categories in one record, so the two can never
//! disagree on keys.

use serde::{Serialize, Serializer};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("Unknown exam: '{0}'")]
    UnknownExam(String),

    #[error("Sub-category '{sub_category}' does not belong to exam '{exam}'")]
    SubCategoryMismatch { exam: String, sub_category: String },
}

/// One exam family. `value` never leaves the server; it only appears in prompts.
#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct ExamFamily {
    pub label: &'static str,
    #[serde(skip)]
    pub value: &'static str,
    pub sub_categories: &'static [&'static str],
}

impl ExamFamily {
    pub fn first_sub_category(&self) -> &'static str {
        self.sub_categories[0]
    }
}

static EXAM_FAMILIES: [ExamFamily; 7] = [
    ExamFamily {
        label: "MBA Roles (for B-School aspirants)",
        value: "MBA Entrance Exams",
        sub_categories: &[
            "CAT Aspirant",
            "MAH-MBA/MMS-CET Aspirant",
            "XAT Aspirant",
            "CMAT Aspirant",
            "MAT Aspirant",
            "GMAT Aspirant",
        ],
    },
    ExamFamily {
        label: "Engineering Roles",
        value: "Engineering & Science",
        sub_categories: &["JEE Aspirant", "GATE Aspirant"],
    },
    ExamFamily {
        label: "Banking/Government/SSC Roles",
        value: "Government/Bank/SSC Exams",
        sub_categories: &[
            "Bank PO/Clerk Aspirant",
            "SSC CGL Aspirant",
            "Campus Recruitment Training (CRT) Aspirant",
        ],
    },
    ExamFamily {
        label: "Law & Management UG Roles",
        value: "Law and IPM",
        sub_categories: &["CLAT Aspirant", "IPM (IIM) Aspirant"],
    },
    ExamFamily {
        label: "Medical",
        value: "Medical",
        sub_categories: &["NEET Aspirant"],
    },
    ExamFamily {
        label: "International Exam Roles",
        value: "International Exams",
        sub_categories: &["GRE Aspirant", "GMAT Aspirant"],
    },
    ExamFamily {
        label: "Foundation Level (High School)",
        value: "Foundation/School Level",
        sub_categories: &["IIT Foundation Aspirant"],
    },
];

/// All exam families in display order.
pub fn exam_families() -> &'static [ExamFamily] {
    &EXAM_FAMILIES
}

pub fn exam_labels() -> Vec<&'static str> {
    EXAM_FAMILIES.iter().map(|f| f.label).collect()
}

pub fn find_family(label: &str) -> Option<&'static ExamFamily> {
    EXAM_FAMILIES.iter().find(|f| f.label == label)
}

/// The ordered sub-categories registered for an exam family.
pub fn sub_categories_for(label: &str) -> Option<&'static [&'static str]> {
    find_family(label).map(|f| f.sub_categories)
}

/// A consistent (exam family, sub-category) pair.
///
/// Only constructible through the checked constructors below, so the
/// sub-category always belongs to the family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategorySelection {
    family: &'static ExamFamily,
    sub_category: &'static str,
}

impl CategorySelection {
    pub fn new(exam: &str, sub_category: &str) -> Result<Self, CatalogError> {
        let family = find_family(exam).ok_or_else(|| CatalogError::UnknownExam(exam.to_string()))?;
        Self::within(family, sub_category)
    }

    /// The family's first sub-category.
    pub fn first_of(family: &'static ExamFamily) -> Self {
        Self {
            family,
            sub_category: family.first_sub_category(),
        }
    }

    fn within(family: &'static ExamFamily, sub_category: &str) -> Result<Self, CatalogError> {
        let sub_category = family
            .sub_categories
            .iter()
            .copied()
            .find(|s| *s == sub_category)
            .ok_or_else(|| CatalogError::SubCategoryMismatch {
                exam: family.label.to_string(),
                sub_category: sub_category.to_string(),
            })?;
        Ok(Self {
            family,
            sub_category,
        })
    }

    /// Applies a user change to the selection.
    ///
    /// Switching family resets the sub-category to the new family's first entry
    /// unless an explicit sub-category is given. Keeping the family without a
    /// sub-category leaves the current one in place.
    pub fn reselect(&self, exam: &str, sub_category: Option<&str>) -> Result<Self, CatalogError> {
        if let Some(sub_category) = sub_category {
            return Self::new(exam, sub_category);
        }
        let family = find_family(exam).ok_or_else(|| CatalogError::UnknownExam(exam.to_string()))?;
        if family == self.family {
            Ok(*self)
        } else {
            Ok(Self::first_of(family))
        }
    }

    pub fn family(&self) -> &'static ExamFamily {
        self.family
    }

    pub fn exam_label(&self) -> &'static str {
        self.family.label
    }

    pub fn exam_value(&self) -> &'static str {
        self.family.value
    }

    pub fn sub_category(&self) -> &'static str {
        self.sub_category
    }
}

impl Default for CategorySelection {
    /// First family, first sub-category.
    fn default() -> Self {
        Self::first_of(&EXAM_FAMILIES[0])
    }
}

impl Serialize for CategorySelection {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Labels {
            exam: &'static str,
            sub_category: &'static str,
        }
        Labels {
            exam: self.exam_label(),
            sub_category: self.sub_category,
        }
        .serialize(serializer)
    }
}
