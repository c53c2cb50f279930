use crate::fixtures::Fixture;
use crate::utils::error::{EdgeError, Result};
use crate::utils::validation::{validate_non_empty_string, Validate};
use std::env;

/// Which fixture the Lambda binary serves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixtureRuntimeConfig {
    pub handler: String,
}

impl FixtureRuntimeConfig {
    /// `FIXTURE_HANDLER` wins over the `_HANDLER` value Lambda sets.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let handler = lookup("FIXTURE_HANDLER")
            .or_else(|| lookup("_HANDLER"))
            .ok_or_else(|| EdgeError::MissingConfigError {
                field: "_HANDLER".to_string(),
            })?;
        Ok(Self { handler })
    }

    pub fn fixture(&self) -> Result<Fixture> {
        Fixture::resolve(&self.handler).ok_or_else(|| EdgeError::InvalidConfigValueError {
            field: "handler".to_string(),
            value: self.handler.clone(),
            reason: format!(
                "Unknown fixture. Available: {}",
                Fixture::names().collect::<Vec<_>>().join(", ")
            ),
        })
    }
}

impl Validate for FixtureRuntimeConfig {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("handler", &self.handler)?;
        self.fixture()?;
        Ok(())
    }
}
