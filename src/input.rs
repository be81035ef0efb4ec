//! Common routines for handling input data.
use crate::error::CalcError;
use anyhow::{Context, Result, ensure};
use itertools::Itertools;
use serde::de::{Deserialize, DeserializeOwned, Deserializer};
use std::fmt::{self, Display};
use std::fs;
use std::path::Path;
use strum::IntoEnumIterator;

/// Read a series of type `T`s from a CSV file.
///
/// # Arguments
///
/// * `file_path` - Path to the CSV file
pub fn read_vec_from_csv<T: DeserializeOwned>(file_path: &Path) -> Result<Vec<T>> {
    let mut reader = csv::Reader::from_path(file_path).with_context(|| input_err_msg(file_path))?;

    let vec: Vec<T> = reader
        .deserialize()
        .try_collect()
        .with_context(|| input_err_msg(file_path))?;

    ensure!(
        !vec.is_empty(),
        "CSV file {} cannot be empty",
        file_path.display()
    );

    Ok(vec)
}

/// Parse a TOML file at the specified path.
///
/// # Arguments
///
/// * `file_path` - Path to the TOML file
///
/// # Returns
///
/// * The deserialised TOML data or an error if the file could not be read or parsed.
pub fn read_toml<T: DeserializeOwned>(file_path: &Path) -> Result<T> {
    let toml_str = fs::read_to_string(file_path).with_context(|| input_err_msg(file_path))?;
    let toml_data = toml::from_str(&toml_str).with_context(|| input_err_msg(file_path))?;
    Ok(toml_data)
}

/// Read an f64, checking that it is between 0 and 1
pub fn deserialise_proportion<'de, D, T>(deserialiser: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: From<f64>,
{
    let value: f64 = Deserialize::deserialize(deserialiser)?;
    if !(0.0..=1.0).contains(&value) {
        return Err(serde::de::Error::custom("Value must be between 0 and 1"));
    }

    Ok(T::from(value))
}

/// Read an optional f64, checking that it is between 0 and 1 if present
pub fn deserialise_proportion_opt<'de, D, T>(deserialiser: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: From<f64>,
{
    let value: Option<f64> = Deserialize::deserialize(deserialiser)?;
    match value {
        Some(value) if !(0.0..=1.0).contains(&value) => {
            Err(serde::de::Error::custom("Value must be between 0 and 1"))
        }
        value => Ok(value.map(T::from)),
    }
}

/// Format an error message to include the file path.
pub fn input_err_msg<P: AsRef<Path>>(file_path: P) -> String {
    format!("Error reading {}", file_path.as_ref().display())
}

/// Parse the label of an enumerated category (e.g. a building type) into its variant.
///
/// # Arguments
///
/// * `label` - The label supplied by the user (e.g. "residential")
/// * `kind` - A description of the category, used in error messages (e.g. "building type")
///
/// # Returns
///
/// The matching variant or [`CalcError::InvalidInput`] listing the accepted labels.
pub fn parse_label<T>(label: &str, kind: &str) -> Result<T, CalcError>
where
    T: IntoEnumIterator + Display,
{
    T::iter()
        .find(|variant| variant.to_string() == label)
        .ok_or_else(|| {
            CalcError::InvalidInput(format!(
                "Unknown {kind} '{label}' (expected one of: {})",
                Labels::<T>::new()
            ))
        })
}

/// Wraps an enum so that its labels can be listed in a human-readable way
pub struct Labels<T>(std::marker::PhantomData<T>);

impl<T: IntoEnumIterator + Display> Labels<T> {
    /// Create a new listing for the enum type `T`
    pub fn new() -> Self {
        Self(std::marker::PhantomData)
    }
}

impl<T: IntoEnumIterator + Display> Default for Labels<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: IntoEnumIterator + Display> Display for Labels<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", T::iter().join(", "))
    }
}
