use std::borrow::Cow;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::environment::{self, Environment, Variable};

/// A value that is either written into the configuration directly or read from
/// an environment variable when the runtime configuration is built.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(untagged)]
pub enum Secret {
    Plain(String),
    FromEnvironment { variable: Variable },
}

impl Secret {
    pub fn from_environment(variable: &str) -> Self {
        Secret::FromEnvironment {
            variable: variable.into(),
        }
    }

    pub fn resolve(&self, environment: impl Environment) -> Result<Cow<'_, str>, environment::Error> {
        match self {
            Secret::Plain(value) => Ok(Cow::Borrowed(value)),
            Secret::FromEnvironment { variable } => Ok(Cow::Owned(environment.read(variable)?)),
        }
    }
}

impl From<String> for Secret {
    fn from(value: String) -> Self {
        Secret::Plain(value)
    }
}

impl From<&str> for Secret {
    fn from(value: &str) -> Self {
        Self::from(value.to_string())
    }
}
