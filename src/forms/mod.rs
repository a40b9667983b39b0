//! Form binding between typed records and editable fields
//!
//! A form holds one record which is the single source of truth for every
//! input. Required fields are checked with `validator` when the form is
//! submitted; no format checks happen client side.

use std::collections::HashSet;

use thiserror::Error;
use validator::Validate;

/// Kind of input a field is rendered as
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Email,
    Password,
    Tel,
    Date,
    /// Yes/No select bound to a bool
    Toggle,
}

/// Static description of one form field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub required: bool,
}

impl FieldSpec {
    pub const fn required(name: &'static str, label: &'static str, kind: FieldKind) -> Self {
        Self { name, label, kind, required: true }
    }

    pub const fn optional(name: &'static str, label: &'static str, kind: FieldKind) -> Self {
        Self { name, label, kind, required: false }
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum FormError {
    #[error("Form is not ready for submission")]
    NotReady,

    #[error("Required fields are empty: {}", .0.join(", "))]
    MissingRequired(Vec<String>),

    #[error("Unknown field: {0}")]
    UnknownField(String),

    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },
}

/// A record that can be edited through a [`Form`]
pub trait FormRecord: Validate + Clone + Default {
    fn fields() -> &'static [FieldSpec];

    /// Current value of a field as shown in its input
    fn value(&self, name: &str) -> Option<String>;

    fn set_value(&mut self, name: &str, value: &str) -> Result<(), FormError>;

    fn field(name: &str) -> Option<&'static FieldSpec> {
        Self::fields().iter().find(|f| f.name == name)
    }
}

/// Parse the value of a Yes/No select
pub fn parse_toggle(field: &str, value: &str) -> Result<bool, FormError> {
    match value.trim().to_lowercase().as_str() {
        "true" | "yes" | "y" => Ok(true),
        "false" | "no" | "n" => Ok(false),
        _ => Err(FormError::InvalidValue {
            field: field.to_string(),
            value: value.to_string(),
        }),
    }
}

/// Empty input clears an optional field
pub fn optional_text(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormState {
    /// Waiting for the record to edit; inputs are inert
    Loading,
    Ready,
    Submitting,
}

#[derive(Debug, Clone)]
pub struct Form<R: FormRecord> {
    record: R,
    state: FormState,
}

impl<R: FormRecord> Form<R> {
    /// Form for a new record, interactive immediately
    pub fn new() -> Self {
        Self::with_record(R::default())
    }

    pub fn with_record(record: R) -> Self {
        Self {
            record,
            state: FormState::Ready,
        }
    }

    /// Form for an existing record which still has to be fetched
    pub fn loading() -> Self {
        Self {
            record: R::default(),
            state: FormState::Loading,
        }
    }

    /// Fill the form from a fetched record and make it interactive
    pub fn populate(&mut self, record: R) {
        self.record = record;
        self.state = FormState::Ready;
    }

    pub fn state(&self) -> FormState {
        self.state
    }

    pub fn record(&self) -> &R {
        &self.record
    }

    pub fn value(&self, name: &str) -> Option<String> {
        self.record.value(name)
    }

    pub fn set(&mut self, name: &str, value: &str) -> Result<(), FormError> {
        if self.state != FormState::Ready {
            return Err(FormError::NotReady);
        }
        if R::field(name).is_none() {
            return Err(FormError::UnknownField(name.to_string()));
        }
        self.record.set_value(name, value)
    }

    /// Required fields that are currently empty, in field order
    pub fn missing_required(&self) -> Vec<String> {
        let failed: HashSet<String> = match self.record.validate() {
            Ok(()) => HashSet::new(),
            Err(errors) => errors
                .field_errors()
                .keys()
                .map(|k| k.to_string())
                .collect(),
        };

        R::fields()
            .iter()
            .filter(|f| failed.contains(f.name))
            .map(|f| f.name.to_string())
            .collect()
    }

    /// Produce the draft to send. The form stays in `Submitting` until
    /// [`Form::finish_submit`] is called.
    pub fn begin_submit(&mut self) -> Result<R, FormError> {
        if self.state != FormState::Ready {
            return Err(FormError::NotReady);
        }

        let missing = self.missing_required();
        if !missing.is_empty() {
            return Err(FormError::MissingRequired(missing));
        }

        self.state = FormState::Submitting;
        Ok(self.record.clone())
    }

    pub fn finish_submit(&mut self) {
        if self.state == FormState::Submitting {
            self.state = FormState::Ready;
        }
    }
}

impl<R: FormRecord> Default for Form<R> {
    fn default() -> Self {
        Self::new()
    }
}
