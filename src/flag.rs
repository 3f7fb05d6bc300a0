use std::{fmt, sync::Arc};

use crate::{rt, ConfigError};

type SwitchFn = dyn Fn() + Send + Sync;
type ValueFn = dyn Fn(&str) + Send + Sync;

#[derive(Clone)]
pub(crate) enum Action {
    Switch(Arc<SwitchFn>),
    Value(Arc<ValueFn>),
    Version(String),
}

/// A raw flag: its action runs on every match and nothing is stored in the
/// parsed [`Options`](crate::Options).
#[derive(Clone)]
pub struct Flag {
    spellings: Vec<String>,
    description: Option<String>,
    action: Action,
}

impl Flag {
    /// Spellings are `-s`, `--long`, or with a placeholder `--long VALUE`,
    /// `--long=VALUE`, `-s VALUE`.
    pub fn new<I, S>(spellings: I) -> Flag
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Flag {
            spellings: spellings.into_iter().map(Into::into).collect(),
            description: None,
            action: Action::Switch(Arc::new(|| ())),
        }
    }

    pub(crate) fn version(version: String) -> Flag {
        Flag { action: Action::Version(version), ..Flag::new(["-v", "--version"]) }
            .description("show version and exit")
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Runs `action` whenever the flag is matched. A value, if the spelling
    /// asks for one, is consumed and dropped.
    pub fn on<F>(mut self, action: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.action = Action::Switch(Arc::new(action));
        self
    }

    /// The flag takes a value, `action` receives it verbatim.
    pub fn on_value<F>(mut self, action: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.action = Action::Value(Arc::new(action));
        self
    }

    pub fn spellings(&self) -> &[String] {
        &self.spellings
    }

    pub fn get_description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub(crate) fn action(&self) -> &Action {
        &self.action
    }

    /// A placeholder on any spelling makes the flag take a value.
    pub(crate) fn spec(&self) -> Result<rt::Spec, ConfigError> {
        let mut spec = rt::Spec::new(matches!(self.action, Action::Value(_)));
        for spelling in &self.spellings {
            let bare = match spelling.split_once(|c: char| c == '=' || c == ' ') {
                Some((bare, placeholder)) => {
                    if placeholder.trim().is_empty() {
                        return Err(ConfigError::InvalidSpelling(spelling.clone()));
                    }
                    spec.takes_value = true;
                    bare
                }
                None => spelling.as_str(),
            };
            spec.push_spelling(bare)?;
        }
        if spec.long.is_empty() && spec.short.is_empty() {
            return Err(ConfigError::InvalidSpelling(String::new()));
        }
        Ok(spec)
    }
}

impl fmt::Debug for Flag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let action = match self.action {
            Action::Switch(_) => "switch",
            Action::Value(_) => "value",
            Action::Version(_) => "version",
        };
        f.debug_struct("Flag")
            .field("spellings", &self.spellings)
            .field("description", &self.description)
            .field("action", &action)
            .finish()
    }
}
