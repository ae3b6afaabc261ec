//! Column names of the OWID COVID-19 dataset used by the pipeline.

pub const DATE: &str = "date";
pub const LOCATION: &str = "location";
pub const ISO_CODE: &str = "iso_code";
pub const TOTAL_CASES: &str = "total_cases";
pub const TOTAL_DEATHS: &str = "total_deaths";
pub const NEW_CASES: &str = "new_cases";
pub const NEW_DEATHS: &str = "new_deaths";
pub const TOTAL_VACCINATIONS: &str = "total_vaccinations";
pub const PEOPLE_VACCINATED_PER_HUNDRED: &str = "people_vaccinated_per_hundred";

/// Added by the EDA step.
pub const DEATH_RATE: &str = "death_rate";

/// Read as Float64 regardless of what the first rows look like.
pub const NUMERIC: [&str; 6] = [
    TOTAL_CASES,
    TOTAL_DEATHS,
    NEW_CASES,
    NEW_DEATHS,
    TOTAL_VACCINATIONS,
    PEOPLE_VACCINATED_PER_HUNDRED,
];

/// Rows missing any of these are unrecoverable.
pub const CRITICAL: [&str; 4] = [DATE, LOCATION, TOTAL_CASES, TOTAL_DEATHS];

/// Gaps in these are filled per location along the date axis.
pub const INTERPOLATED: [&str; 3] = [NEW_CASES, NEW_DEATHS, TOTAL_VACCINATIONS];
