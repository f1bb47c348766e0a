use std::{fmt, str::FromStr};

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_newtype!(SpecialtyId);
id_newtype!(PhysicianId);

/// A record type exposed as a REST collection.
pub trait Resource: Clone + fmt::Debug + Serialize + DeserializeOwned + Send + Sync + 'static {
    type Id: Copy + Eq + fmt::Debug + fmt::Display + Send + Sync + 'static;

    /// Singular, human readable name used in prompts and logs.
    const NAME: &'static str;
    const DEFAULT_PATH: &'static str;

    /// Server-assigned identifier; `None` until the record is persisted.
    fn id(&self) -> Option<Self::Id>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecordStatus {
    #[default]
    Active,
    Inactive,
}

impl RecordStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "ACTIVE",
            Self::Inactive => "INACTIVE",
        }
    }
}

impl fmt::Display for RecordStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("unknown status '{0}': expected ACTIVE or INACTIVE")]
pub struct ParseStatusError(String);

impl FromStr for RecordStatus {
    type Err = ParseStatusError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        if raw.trim().eq_ignore_ascii_case("active") {
            Ok(Self::Active)
        } else if raw.trim().eq_ignore_ascii_case("inactive") {
            Ok(Self::Inactive)
        } else {
            Err(ParseStatusError(raw.to_string()))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Specialty {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<SpecialtyId>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub status: RecordStatus,
}

impl Resource for Specialty {
    type Id = SpecialtyId;

    const NAME: &'static str = "specialty";
    const DEFAULT_PATH: &'static str = "/api/v1/specialties";

    fn id(&self) -> Option<SpecialtyId> {
        self.id
    }
}

/// The specialty a physician points at.
///
/// Responses normally embed the full specialty record. When the client cannot
/// resolve the selected id against its loaded specialties it still submits the
/// bare reference and leaves validity to the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SpecialtyLink {
    Record(Specialty),
    Reference { id: SpecialtyId },
}

impl SpecialtyLink {
    pub fn id(&self) -> Option<SpecialtyId> {
        match self {
            Self::Record(specialty) => specialty.id,
            Self::Reference { id } => Some(*id),
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Record(specialty) => Some(specialty.name.as_str()),
            Self::Reference { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Physician {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<PhysicianId>,
    #[serde(default)]
    pub license_code: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specialty: Option<SpecialtyLink>,
    #[serde(default)]
    pub status: RecordStatus,
}

impl Physician {
    pub fn specialty_id(&self) -> Option<SpecialtyId> {
        self.specialty.as_ref().and_then(SpecialtyLink::id)
    }
}

impl Resource for Physician {
    type Id = PhysicianId;

    const NAME: &'static str = "physician";
    const DEFAULT_PATH: &'static str = "/api/v1/physicians";

    fn id(&self) -> Option<PhysicianId> {
        self.id
    }
}
