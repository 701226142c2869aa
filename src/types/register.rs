//! Person/place register and person biographies.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A register entry: free-form fields plus optional `normdata`.
pub type RegisterEntry = Map<String, Value>;

/// `registerData` section of `register_geo.json`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegisterData {
    /// Places.
    #[serde(rename = "Orte", default)]
    pub places: Vec<RegisterEntry>,
    /// People.
    #[serde(rename = "Personen", default)]
    pub people: Vec<RegisterEntry>,
}

/// Top level of `register_geo.json`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterFile {
    /// Register content, absent in an empty export.
    #[serde(default)]
    pub register_data: Option<RegisterData>,
}

/// Short biography for a register person.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonBio {
    /// Register label the biography belongs to.
    pub label: String,
    /// Biography text.
    pub bio: String,
}

/// Top level of the person biography file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonBiosFile {
    /// All biographies.
    #[serde(default)]
    pub bios: Vec<PersonBio>,
}
