use std::fmt;

use shared::domain::{
    Physician, PhysicianId, RecordStatus, Resource, Specialty, SpecialtyId, SpecialtyLink,
};
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldRule {
    Required,
    /// Counts characters. Empty text passes; that is `Required`'s job.
    MinLength(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldValue<'a> {
    Text(&'a str),
    Choice(Option<i64>),
    Status(RecordStatus),
}

impl FieldRule {
    pub fn check(self, value: FieldValue<'_>) -> bool {
        match (self, value) {
            (Self::Required, FieldValue::Text(text)) => !text.is_empty(),
            (Self::Required, FieldValue::Choice(choice)) => choice.is_some(),
            (Self::Required, FieldValue::Status(_)) => true,
            (Self::MinLength(min), FieldValue::Text(text)) => {
                text.is_empty() || text.chars().count() >= min
            }
            (Self::MinLength(_), _) => true,
        }
    }
}

impl fmt::Display for FieldRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Required => f.write_str("is required"),
            Self::MinLength(min) => write!(f, "must be at least {min} characters"),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Field<'a> {
    pub name: &'static str,
    pub value: FieldValue<'a>,
    pub rules: &'static [FieldRule],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldViolation {
    pub field: &'static str,
    pub rule: FieldRule,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    violations: Vec<FieldViolation>,
}

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn violations(&self) -> &[FieldViolation] {
        &self.violations
    }

    pub fn has(&self, field: &str) -> bool {
        self.violations.iter().any(|v| v.field == field)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, violation) in self.violations.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{} {}", violation.field, violation.rule)?;
        }
        Ok(())
    }
}

/// Field set and DTO mapping for one editable entity.
pub trait EntityForm: Default + Clone + fmt::Debug + Send + Sync + 'static {
    type Record: Resource;
    /// Records the form resolves references against at save time.
    type Lookup: Resource;

    const CREATE_TITLE: &'static str;
    const EDIT_TITLE: &'static str;
    const DELETE_PROMPT: &'static str;
    /// Shown when the server rejects a save; names the unique field most
    /// likely at fault.
    const SAVE_FAILURE: &'static str;

    /// Populates from a record, falling back to defaults for absent values.
    fn from_record(record: &Self::Record) -> Self;

    fn fields(&self) -> Vec<Field<'_>>;

    fn build_dto(
        &self,
        edit_id: Option<<Self::Record as Resource>::Id>,
        lookup: &[Self::Lookup],
    ) -> Self::Record;
}

/// Current values of an [`EntityForm`] plus its rule evaluation.
#[derive(Debug, Clone, Default)]
pub struct FormModel<F: EntityForm> {
    values: F,
}

impl<F: EntityForm> FormModel<F> {
    pub fn values(&self) -> &F {
        &self.values
    }

    pub fn values_mut(&mut self) -> &mut F {
        &mut self.values
    }

    pub fn reset(&mut self) {
        self.values = F::default();
    }

    pub fn patch(&mut self, record: &F::Record) {
        self.values = F::from_record(record);
    }

    pub fn validate(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::default();
        for field in self.values.fields() {
            for rule in field.rules {
                if !rule.check(field.value) {
                    errors.violations.push(FieldViolation {
                        field: field.name,
                        rule: *rule,
                    });
                }
            }
        }
        errors
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }
}

const NAME_RULES: &[FieldRule] = &[FieldRule::Required, FieldRule::MinLength(3)];
const LICENSE_RULES: &[FieldRule] = &[FieldRule::Required, FieldRule::MinLength(1)];
const REQUIRED: &[FieldRule] = &[FieldRule::Required];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpecialtyForm {
    pub name: String,
    pub status: RecordStatus,
}

impl EntityForm for SpecialtyForm {
    type Record = Specialty;
    type Lookup = Specialty;

    const CREATE_TITLE: &'static str = "New Specialty";
    const EDIT_TITLE: &'static str = "Edit Specialty";
    const DELETE_PROMPT: &'static str = "Delete specialty?";
    const SAVE_FAILURE: &'static str =
        "Error saving the specialty. Check the unique fields (name).";

    fn from_record(record: &Specialty) -> Self {
        Self {
            name: record.name.clone(),
            status: record.status,
        }
    }

    fn fields(&self) -> Vec<Field<'_>> {
        vec![
            Field {
                name: "name",
                value: FieldValue::Text(&self.name),
                rules: NAME_RULES,
            },
            Field {
                name: "status",
                value: FieldValue::Status(self.status),
                rules: REQUIRED,
            },
        ]
    }

    fn build_dto(&self, edit_id: Option<SpecialtyId>, _lookup: &[Specialty]) -> Specialty {
        Specialty {
            id: edit_id,
            name: self.name.clone(),
            status: self.status,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PhysicianForm {
    pub first_name: String,
    pub last_name: String,
    pub license_code: String,
    pub specialty_id: Option<SpecialtyId>,
    pub status: RecordStatus,
}

impl EntityForm for PhysicianForm {
    type Record = Physician;
    type Lookup = Specialty;

    const CREATE_TITLE: &'static str = "New Physician";
    const EDIT_TITLE: &'static str = "Edit Physician";
    const DELETE_PROMPT: &'static str = "Delete physician?";
    const SAVE_FAILURE: &'static str =
        "Error saving the physician. Check the unique fields (license code).";

    fn from_record(record: &Physician) -> Self {
        Self {
            first_name: record.first_name.clone(),
            last_name: record.last_name.clone(),
            license_code: record.license_code.clone(),
            specialty_id: record.specialty_id(),
            status: record.status,
        }
    }

    fn fields(&self) -> Vec<Field<'_>> {
        vec![
            Field {
                name: "first_name",
                value: FieldValue::Text(&self.first_name),
                rules: NAME_RULES,
            },
            Field {
                name: "last_name",
                value: FieldValue::Text(&self.last_name),
                rules: NAME_RULES,
            },
            Field {
                name: "license_code",
                value: FieldValue::Text(&self.license_code),
                rules: LICENSE_RULES,
            },
            Field {
                name: "specialty_id",
                value: FieldValue::Choice(self.specialty_id.map(|id| id.0)),
                rules: REQUIRED,
            },
            Field {
                name: "status",
                value: FieldValue::Status(self.status),
                rules: REQUIRED,
            },
        ]
    }

    fn build_dto(&self, edit_id: Option<PhysicianId>, lookup: &[Specialty]) -> Physician {
        let specialty = self.specialty_id.map(|id| {
            match lookup.iter().find(|specialty| specialty.id == Some(id)) {
                Some(found) => SpecialtyLink::Record(found.clone()),
                None => {
                    warn!(specialty_id = %id, "specialty not in loaded list; submitting bare reference");
                    SpecialtyLink::Reference { id }
                }
            }
        });

        Physician {
            id: edit_id,
            license_code: self.license_code.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            specialty,
            status: self.status,
        }
    }
}

#[cfg(test)]
#[path = "tests/form_tests.rs"]
mod tests;
