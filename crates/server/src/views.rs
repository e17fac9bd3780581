//! View models handed to the presentation layer, plus the form payload the
//! student forms post back.

use std::{fmt, str::FromStr};

use models::student::Student;
use serde::{de, Deserialize, Deserializer, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct IndexView {
    pub students: Vec<Student>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SearchView {
    pub query: String,
    pub students: Vec<Student>,
}

/// Backs both the create and the edit form.
#[derive(Debug, Serialize, Deserialize)]
pub struct StudentFormView {
    pub student: Student,
    pub error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SearchForm {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
pub struct EditQuery {
    /// Message from a rejected edit
    pub error: Option<String>,
}

/// Student fields as posted by an HTML form. Blank optional fields are absent.
#[derive(Debug, Default, Deserialize)]
pub struct StudentForm {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub id: Option<i32>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub age: Option<i32>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub address: Option<String>,
}

impl From<StudentForm> for Student {
    fn from(f: StudentForm) -> Self {
        Student { id: f.id, name: f.name, email: f.email, age: f.age, address: f.address }
    }
}

fn empty_string_as_none<'de, D, T>(de: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: fmt::Display,
{
    let opt = Option::<String>::deserialize(de)?;
    match opt.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => s.parse::<T>().map(Some).map_err(de::Error::custom),
    }
}

/// Whitespace-only text reads as absent; anything else is kept as typed.
fn blank_as_none<'de, D>(de: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(de)?;
    Ok(opt.filter(|s| !s.trim().is_empty()))
}
