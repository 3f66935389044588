//! # Registration draft: the form state before submission
//!
//! A [`Draft`] holds the seven user-editable fields as raw text, exactly as typed.
//! Alongside the text it tracks the *completion set*: the fields whose trimmed value
//! is currently non-empty. The form uses it to show progress; it is updated on every
//! [`Draft::set`] and never computed lazily, so the UI can read it cheaply.
//!
//! [`Draft::validate`] is the local pre-filter run before any store call. It checks,
//! in order:
//!
//! 1. every field is non-empty after trimming ([`ValidationError::MissingFields`]),
//! 2. the email matches `^[^\s@]+@[^\s@]+\.[^\s@]+$` ([`ValidationError::BadEmail`]),
//! 3. the year is one of the offered labels ([`ValidationError::UnknownYear`]),
//!
//! and produces the normalized [`NewRegistration`] (fields trimmed, email lowercased).

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::models::{is_valid_email, NewRegistration, YearOfStudy};

/// One of the seven user-editable fields.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Field {
    Name,
    Mobile,
    Email,
    College,
    Course,
    Year,
    TechKnowledge,
}

impl Field {
    pub const ALL: [Field; 7] = [
        Field::Name,
        Field::Mobile,
        Field::Email,
        Field::College,
        Field::Course,
        Field::Year,
        Field::TechKnowledge,
    ];

    /// Label shown next to the input.
    pub fn label(self) -> &'static str {
        match self {
            Field::Name => "Full Name",
            Field::Mobile => "Mobile Number",
            Field::Email => "Email Address",
            Field::College => "College / University",
            Field::Course => "Course",
            Field::Year => "Year of Study",
            Field::TechKnowledge => "Tech Knowledge",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// In-progress form state.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Draft {
    name: String,
    mobile: String,
    email: String,
    college: String,
    course: String,
    year: String,
    tech_knowledge: String,
    completed: BTreeSet<Field>,
}

impl Draft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Name => &self.name,
            Field::Mobile => &self.mobile,
            Field::Email => &self.email,
            Field::College => &self.college,
            Field::Course => &self.course,
            Field::Year => &self.year,
            Field::TechKnowledge => &self.tech_knowledge,
        }
    }

    /// Replace a field's text and update the completion set.
    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        let value = value.into();
        if value.trim().is_empty() {
            self.completed.remove(&field);
        } else {
            self.completed.insert(field);
        }
        *self.slot(field) = value;
    }

    /// Builder-style [`Draft::set`].
    pub fn with(mut self, field: Field, value: impl Into<String>) -> Self {
        self.set(field, value);
        self
    }

    /// Fields whose trimmed value is non-empty.
    pub fn completed(&self) -> &BTreeSet<Field> {
        &self.completed
    }

    pub fn is_empty(&self) -> bool {
        Field::ALL.iter().all(|f| self.get(*f).is_empty()) && self.completed.is_empty()
    }

    /// Reset every field to empty and clear the completion set.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Validate and normalize into an insert payload.
    pub fn validate(&self) -> Result<NewRegistration, ValidationError> {
        let missing: Vec<Field> = Field::ALL
            .into_iter()
            .filter(|f| self.get(*f).trim().is_empty())
            .collect();
        if !missing.is_empty() {
            return Err(ValidationError::MissingFields(missing));
        }

        let email = self.email.trim();
        if !is_valid_email(email) {
            return Err(ValidationError::BadEmail);
        }

        let year: YearOfStudy = self.year.trim().parse()?;

        Ok(NewRegistration {
            name: self.name.trim().to_string(),
            mobile: self.mobile.trim().to_string(),
            email: email.to_lowercase(),
            college: self.college.trim().to_string(),
            course: self.course.trim().to_string(),
            year,
            tech_knowledge: self.tech_knowledge.trim().to_string(),
        })
    }

    fn slot(&mut self, field: Field) -> &mut String {
        match field {
            Field::Name => &mut self.name,
            Field::Mobile => &mut self.mobile,
            Field::Email => &mut self.email,
            Field::College => &mut self.college,
            Field::Course => &mut self.course,
            Field::Year => &mut self.year,
            Field::TechKnowledge => &mut self.tech_knowledge,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ana() -> Draft {
        Draft::new()
            .with(Field::Name, "Ana")
            .with(Field::Mobile, "555")
            .with(Field::Email, "A@X.com")
            .with(Field::College, "MIT")
            .with(Field::Course, "CS")
            .with(Field::Year, "1st Year")
            .with(Field::TechKnowledge, "none")
    }

    #[test]
    fn test_completion_set_tracks_trimmed_values() {
        let mut draft = Draft::new();
        assert!(draft.completed().is_empty());

        draft.set(Field::Name, "Ana");
        assert!(draft.completed().contains(&Field::Name));

        draft.set(Field::Name, "   ");
        assert!(!draft.completed().contains(&Field::Name));
        assert_eq!(draft.get(Field::Name), "   ");
    }

    #[test]
    fn test_validate_normalizes() {
        let draft = ana()
            .with(Field::Name, "  Ana  ")
            .with(Field::Email, " A@X.com ");
        let new = draft.validate().unwrap();
        assert_eq!(new.name, "Ana");
        assert_eq!(new.email, "a@x.com");
        assert_eq!(new.year, YearOfStudy::First);
        assert_eq!(new.tech_knowledge, "none");
    }

    #[test]
    fn test_validate_reports_every_missing_field() {
        let draft = ana().with(Field::Mobile, "").with(Field::Course, " \t");
        assert_eq!(
            draft.validate(),
            Err(ValidationError::MissingFields(vec![Field::Mobile, Field::Course]))
        );

        assert_eq!(
            Draft::new().validate(),
            Err(ValidationError::MissingFields(Field::ALL.to_vec()))
        );
    }

    #[test]
    fn test_validate_rejects_bad_email_before_year() {
        let draft = ana().with(Field::Email, "not-an-email").with(Field::Year, "???");
        assert_eq!(draft.validate(), Err(ValidationError::BadEmail));
    }

    #[test]
    fn test_validate_rejects_unknown_year() {
        let draft = ana().with(Field::Year, "Sophomore");
        assert_eq!(
            draft.validate(),
            Err(ValidationError::UnknownYear("Sophomore".into()))
        );
    }

    #[test]
    fn test_clear() {
        let mut draft = ana();
        assert!(!draft.is_empty());
        draft.clear();
        assert!(draft.is_empty());
        assert!(draft.completed().is_empty());
    }
}
