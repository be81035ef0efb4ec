//! Fixtures and helpers for tests
use crate::analysis::{AnalysisRequest, SiteSource};
use crate::building::{BuildingProfile, BuildingType};
use crate::sizing::SiteConditions;
use crate::units::{Dimensionless, Irradiance};
use rstest::fixture;
use std::fs;
use std::path::{Path, PathBuf};

/// Assert that an error with the given message occurs
macro_rules! assert_error {
    ($result:expr, $msg:expr) => {
        assert_eq!(
            $result.unwrap_err().chain().next().unwrap().to_string(),
            $msg
        );
    };
}
pub(crate) use assert_error;

/// Write `contents` to a file called `file_name` in `dir` and return its path
pub fn write_file(dir: &Path, file_name: &str, contents: &str) -> PathBuf {
    let file_path = dir.join(file_name);
    fs::write(&file_path, contents).unwrap();
    file_path
}

#[fixture]
pub fn building() -> BuildingProfile {
    BuildingProfile::new(BuildingType::Residential, 4.0, 60.0, Dimensionless(1.0))
}

#[fixture]
pub fn site() -> SiteConditions {
    SiteConditions {
        irradiance: Irradiance(5.5),
        ambient_temp: 20.0,
    }
}

#[fixture]
pub fn request(building: BuildingProfile, site: SiteConditions) -> AnalysisRequest {
    AnalysisRequest {
        building,
        site: SiteSource::Inline(site),
        system: Default::default(),
        economics: Default::default(),
        emissions: Default::default(),
    }
}
