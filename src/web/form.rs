//! The city form: bound value, validation errors and display state.

use serde::Deserialize;

use crate::models::CityQuery;
use crate::models::city::MAX_CITY_LENGTH;

pub const HELP_TEXT: &str = "Enter the city name in English.";
pub const PLACEHOLDER: &str = "In the city...";

/// Raw `application/x-www-form-urlencoded` body of `POST /`
#[derive(Debug, Default, Deserialize)]
pub struct CityInput {
    #[serde(default)]
    pub city: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CityForm {
    pub value: String,
    pub errors: Vec<String>,
    /// Input is locked once a valid city has been submitted
    pub disabled: bool,
}

impl CityForm {
    /// Empty, editable form
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds submitted input and validates it.
    ///
    /// Returns the form to render and, when valid, the parsed query.
    #[must_use]
    pub fn bind(input: &CityInput) -> (Self, Option<CityQuery>) {
        match CityQuery::parse(&input.city) {
            Ok(city) => (
                Self {
                    value: city.as_str().to_string(),
                    errors: Vec::new(),
                    disabled: true,
                },
                Some(city),
            ),
            Err(e) => (
                Self {
                    value: input.city.clone(),
                    errors: vec![e.user_message()],
                    disabled: false,
                },
                None,
            ),
        }
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    #[must_use]
    pub fn max_length(&self) -> usize {
        MAX_CITY_LENGTH
    }
}
