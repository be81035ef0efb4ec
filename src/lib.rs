//! Sizing and techno-economic appraisal of solar water heating systems for buildings in Kenya.
//!
//! The calculation chain runs from a building's daily hot water demand ([`building`]) through the
//! collector area and tank size ([`sizing`]) to costs and returns ([`economics`]) and avoided CO₂
//! emissions ([`emissions`]). [`analysis`] ties these together for a single request.
#![warn(missing_docs)]
use std::path::PathBuf;

pub mod analysis;
pub mod building;
pub mod cli;
pub mod economics;
pub mod emissions;
pub mod error;
pub mod finance;
pub mod input;
pub mod log;
pub mod output;
pub mod parameters;
pub mod settings;
pub mod site;
pub mod sizing;
pub mod units;

#[cfg(test)]
mod fixture;

/// Get the config folder for the program.
///
/// Falls back to the current directory if the platform has no config folder.
pub fn get_swh_config_dir() -> PathBuf {
    let Some(mut config_dir) = dirs::config_dir() else {
        return PathBuf::from(".");
    };
    config_dir.push("swh");

    config_dir
}
