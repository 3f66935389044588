//! # Domain models for student registrations
//!
//! Defines the records returned by a [`crate::RegistrationStore`] and the payload sent
//! to it. Every type here is `Serialize + Deserialize` so it can cross the
//! server/client boundary via Dioxus server functions.
//!
//! ## Types
//!
//! | Type | Represents |
//! |------|-----------|
//! | [`Registration`] | A stored row of `student_registrations`. `id`, `created_at` and `updated_at` are assigned by the store. |
//! | [`NewRegistration`] | The normalized insert payload: the seven user-editable fields, already trimmed, with the email lowercased. |
//! | [`YearOfStudy`] | The fixed set of years offered by the form. Serialized as its display label (`"1st Year"`). |
//! | [`TechLevel`] | A coarse classification of the free-text tech knowledge field, used for badge styling. |

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;
use crate::Field;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid")
});

/// Check an address against the simplified `local@domain.tld` shape.
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// A registration as stored.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    pub id: Uuid,
    pub name: String,
    pub mobile: String,
    pub email: String,
    pub college: String,
    pub course: String,
    pub year: YearOfStudy,
    pub tech_knowledge: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Registration {
    /// Build a stored record from an insert payload and store-assigned metadata.
    pub fn from_new(new: NewRegistration, id: Uuid, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            name: new.name,
            mobile: new.mobile,
            email: new.email,
            college: new.college,
            course: new.course,
            year: new.year,
            tech_knowledge: new.tech_knowledge,
            created_at,
            updated_at: Some(created_at),
        }
    }

    pub fn tech_level(&self) -> TechLevel {
        TechLevel::classify(&self.tech_knowledge)
    }
}

/// Insert payload. Constructed by [`crate::Draft::validate`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewRegistration {
    pub name: String,
    pub mobile: String,
    pub email: String,
    pub college: String,
    pub course: String,
    pub year: YearOfStudy,
    pub tech_knowledge: String,
}

impl NewRegistration {
    /// Re-check a payload that arrived from an untrusted client.
    ///
    /// A payload built by [`crate::Draft::validate`] always passes.
    pub fn check(&self) -> Result<(), ValidationError> {
        let fields = [
            (Field::Name, &self.name),
            (Field::Mobile, &self.mobile),
            (Field::Email, &self.email),
            (Field::College, &self.college),
            (Field::Course, &self.course),
            (Field::TechKnowledge, &self.tech_knowledge),
        ];

        let missing: Vec<Field> = fields
            .iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(field, _)| *field)
            .collect();
        if !missing.is_empty() {
            return Err(ValidationError::MissingFields(missing));
        }

        let padded: Vec<Field> = fields
            .iter()
            .filter(|(_, value)| value.trim() != value.as_str())
            .map(|(field, _)| *field)
            .collect();
        if !padded.is_empty() {
            return Err(ValidationError::Untrimmed(padded));
        }
        if !is_valid_email(&self.email) || self.email != self.email.to_lowercase() {
            return Err(ValidationError::BadEmail);
        }
        Ok(())
    }
}

/// Year of study offered by the registration form.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum YearOfStudy {
    #[serde(rename = "1st Year")]
    First,
    #[serde(rename = "2nd Year")]
    Second,
    #[serde(rename = "3rd Year")]
    Third,
    #[serde(rename = "4th Year")]
    Fourth,
    #[serde(rename = "Graduate")]
    Graduate,
    #[serde(rename = "Post Graduate")]
    PostGraduate,
}

impl YearOfStudy {
    /// All years, in the order the form lists them.
    pub const ALL: [YearOfStudy; 6] = [
        YearOfStudy::First,
        YearOfStudy::Second,
        YearOfStudy::Third,
        YearOfStudy::Fourth,
        YearOfStudy::Graduate,
        YearOfStudy::PostGraduate,
    ];

    pub fn label(self) -> &'static str {
        match self {
            YearOfStudy::First => "1st Year",
            YearOfStudy::Second => "2nd Year",
            YearOfStudy::Third => "3rd Year",
            YearOfStudy::Fourth => "4th Year",
            YearOfStudy::Graduate => "Graduate",
            YearOfStudy::PostGraduate => "Post Graduate",
        }
    }
}

impl fmt::Display for YearOfStudy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for YearOfStudy {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        YearOfStudy::ALL
            .into_iter()
            .find(|year| year.label() == s)
            .ok_or_else(|| ValidationError::UnknownYear(s.to_string()))
    }
}

/// Coarse reading of the free-text tech knowledge field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TechLevel {
    Beginner,
    Intermediate,
    Advanced,
    Expert,
    Other,
}

impl TechLevel {
    /// Case-insensitive, whole-value match. Anything unrecognised is `Other`.
    pub fn classify(text: &str) -> Self {
        match text.trim().to_lowercase().as_str() {
            "beginner" => TechLevel::Beginner,
            "intermediate" => TechLevel::Intermediate,
            "advanced" => TechLevel::Advanced,
            "expert" => TechLevel::Expert,
            _ => TechLevel::Other,
        }
    }

    /// CSS modifier used by the dashboard badge.
    pub fn badge_class(self) -> &'static str {
        match self {
            TechLevel::Beginner => "badge badge--beginner",
            TechLevel::Intermediate => "badge badge--intermediate",
            TechLevel::Advanced => "badge badge--advanced",
            TechLevel::Expert => "badge badge--expert",
            TechLevel::Other => "badge",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload() -> NewRegistration {
        NewRegistration {
            name: "Ana".into(),
            mobile: "555".into(),
            email: "a@x.com".into(),
            college: "MIT".into(),
            course: "CS".into(),
            year: YearOfStudy::First,
            tech_knowledge: "none".into(),
        }
    }

    #[test]
    fn test_email_shape() {
        assert!(is_valid_email("a@x.com"));
        assert!(is_valid_email("first.last@sub.domain.org"));
        assert!(!is_valid_email("a@x"));
        assert!(!is_valid_email("a x@y.com"));
        assert!(!is_valid_email("@x.com"));
        assert!(!is_valid_email("a@@x.com"));
        assert!(!is_valid_email("a@x."));
        assert!(!is_valid_email(""));
    }

    #[test]
    fn test_year_labels_parse_back() {
        for year in YearOfStudy::ALL {
            assert_eq!(year.label().parse::<YearOfStudy>().unwrap(), year);
        }
        assert_eq!(
            "5th Year".parse::<YearOfStudy>(),
            Err(ValidationError::UnknownYear("5th Year".into()))
        );
    }

    #[test]
    fn test_year_serializes_as_label() {
        let json = serde_json::to_string(&YearOfStudy::PostGraduate).unwrap();
        assert_eq!(json, "\"Post Graduate\"");
    }

    #[test]
    fn test_check_rejects_blank_and_uppercase() {
        assert!(payload().check().is_ok());

        let mut blank = payload();
        blank.college = "  ".into();
        assert_eq!(
            blank.check(),
            Err(ValidationError::MissingFields(vec![Field::College]))
        );

        let mut upper = payload();
        upper.email = "A@X.com".into();
        assert_eq!(upper.check(), Err(ValidationError::BadEmail));
    }

    #[test]
    fn test_check_rejects_padded_values() {
        let mut padded = payload();
        padded.name = " Ana ".into();
        padded.tech_knowledge = "none\n".into();
        assert_eq!(
            padded.check(),
            Err(ValidationError::Untrimmed(vec![
                Field::Name,
                Field::TechKnowledge
            ]))
        );

        let mut email = payload();
        email.email = "a@x.com ".into();
        assert_eq!(
            email.check(),
            Err(ValidationError::Untrimmed(vec![Field::Email]))
        );

        // inner whitespace is part of the value
        let mut inner = payload();
        inner.tech_knowledge = "Rust\nSQL".into();
        assert!(inner.check().is_ok());
    }

    #[test]
    fn test_tech_level_classify() {
        assert_eq!(TechLevel::classify("Beginner"), TechLevel::Beginner);
        assert_eq!(TechLevel::classify(" EXPERT "), TechLevel::Expert);
        assert_eq!(TechLevel::classify("some rust"), TechLevel::Other);
    }
}
