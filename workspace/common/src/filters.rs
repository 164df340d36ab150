use serde::{Deserialize, Serialize};
use validator::Validate;

/// The user's active filter combination.
///
/// Every dimension is independently optional; `None` means the dimension does
/// not constrain the query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct FilterState {
    pub year: Option<i32>,
    #[validate(range(min = 1, max = 12))]
    pub month: Option<u32>,
    /// Two-letter state abbreviation (e.g. "SP").
    #[validate(length(equal = 2))]
    pub state_code: Option<String>,
    pub vaccine_name: Option<String>,
    pub manufacturer: Option<String>,
}

impl FilterState {
    pub fn with_year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }

    pub fn with_month(mut self, month: u32) -> Self {
        self.month = Some(month);
        self
    }

    pub fn with_state(mut self, state_code: impl Into<String>) -> Self {
        self.state_code = Some(state_code.into().trim().to_string());
        self
    }

    pub fn with_vaccine(mut self, vaccine_name: impl Into<String>) -> Self {
        self.vaccine_name = Some(vaccine_name.into());
        self
    }

    pub fn with_manufacturer(mut self, manufacturer: impl Into<String>) -> Self {
        self.manufacturer = Some(manufacturer.into());
        self
    }

    /// Vaccine name with surrounding whitespace removed, `None` when blank.
    pub fn vaccine(&self) -> Option<&str> {
        non_blank(self.vaccine_name.as_deref())
    }

    /// State code with surrounding whitespace removed, `None` when blank.
    pub fn state(&self) -> Option<&str> {
        non_blank(self.state_code.as_deref())
    }

    /// True when no dimension that drives the forecast view is selected.
    pub fn is_unfiltered(&self) -> bool {
        self.year.is_none() && self.month.is_none() && self.state().is_none() && self.vaccine().is_none()
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
