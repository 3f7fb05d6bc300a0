use crate::{rt, value::Type, ConfigError, Error, Result, Value};

/// Attributes shared by positional arguments and named options.
#[derive(Debug, Clone)]
pub struct Parameter {
    pub name: String,
    pub ty: Type,
    pub description: Option<String>,
    pub default: Option<Value>,
    pub required: bool,
}

impl Parameter {
    fn new(name: impl Into<String>) -> Parameter {
        Parameter {
            name: name.into(),
            ty: Type::String,
            description: None,
            default: None,
            required: false,
        }
    }
}

/// Label, coercion and validation of a declared parameter.
pub trait Param {
    fn parameter(&self) -> &Parameter;

    /// Display name used in help and error messages.
    fn label(&self) -> String;

    fn name(&self) -> &str {
        &self.parameter().name
    }

    /// Fails if the parameter is required and `value` is absent.
    fn validate<'a>(&self, value: Option<&'a Value>) -> Result<Option<&'a Value>> {
        if self.parameter().required && value.is_none() {
            return Err(Error::Validation { label: self.label() });
        }
        Ok(value)
    }

    /// Converts a raw token into the declared type.
    fn coerce(&self, raw: &str) -> Result<Value> {
        self.parameter()
            .ty
            .coerce(raw)
            .map_err(|source| Error::Coercion { label: self.label(), source })
    }
}

macro_rules! parameter_setters {
    ($ty:ident) => {
        impl $ty {
            pub fn ty(mut self, ty: Type) -> Self {
                self.param.ty = ty;
                self
            }

            /// Same as [`Self::ty`], but takes a type name such as `"integer"`.
            pub fn type_name(self, name: &str) -> Result<Self, ConfigError> {
                Ok(self.ty(name.parse()?))
            }

            pub fn description(mut self, description: impl Into<String>) -> Self {
                self.param.description = Some(description.into());
                self
            }

            pub fn default(mut self, default: impl Into<Value>) -> Self {
                self.param.default = Some(default.into());
                self
            }

            pub fn required(mut self, required: bool) -> Self {
                self.param.required = required;
                self
            }
        }

        impl Param for $ty {
            fn parameter(&self) -> &Parameter {
                &self.param
            }

            fn label(&self) -> String {
                self.display_label()
            }
        }
    };
}

/// A positional parameter.
#[derive(Debug, Clone)]
pub struct Argument {
    param: Parameter,
}

impl Argument {
    pub fn new(name: impl Into<String>) -> Argument {
        Argument { param: Parameter::new(name) }
    }

    fn display_label(&self) -> String {
        self.param.name.replace('-', "_").to_uppercase()
    }
}

parameter_setters!(Argument);

/// A named option, matched by `--name` or one of its aliases.
#[derive(Debug, Clone)]
pub struct Opt {
    param: Parameter,
    aliases: Vec<String>,
}

impl Opt {
    pub fn new(name: impl Into<String>) -> Opt {
        Opt { param: Parameter::new(name), aliases: Vec::new() }
    }

    /// Adds an alternative spelling, `-v` or `--verb`.
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    /// The primary spelling without dashes: `foo_bar` => `foo-bar`.
    pub fn long_name(&self) -> String {
        self.param.name.replace('_', "-")
    }

    /// Placeholder shown after value taking spellings.
    pub fn value_name(&self) -> String {
        self.param.name.replace('-', "_").to_uppercase()
    }

    fn display_label(&self) -> String {
        if self.param.ty.is_boolean() {
            format!("--[no-]{}", self.long_name())
        } else {
            format!("--{}", self.long_name())
        }
    }

    /// Spellings the tokenizer should match for this option.
    pub(crate) fn spec(&self) -> Result<rt::Spec, ConfigError> {
        let mut spec = rt::Spec::new(!self.param.ty.is_boolean());
        spec.negatable = self.param.ty.is_boolean();
        spec.push_long(&self.long_name())?;
        for alias in &self.aliases {
            spec.push_spelling(alias)?;
        }
        Ok(spec)
    }
}

parameter_setters!(Opt);
