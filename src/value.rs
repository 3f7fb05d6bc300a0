use std::{
    fmt,
    path::{Component, Path, PathBuf},
    str::FromStr,
    sync::Arc,
};

use crate::ConfigError;

/// Error type returned by user supplied coercions.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

type CoerceFn = dyn Fn(&str) -> Result<Value, BoxError> + Send + Sync;

/// A coerced parameter value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Boolean(bool),
    Integer(i64),
    Float(f64),
    Array(Vec<String>),
    Path(PathBuf),
}

impl Value {
    /// Everything except `false` is truthy.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Boolean(false))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(it) => Some(it),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(it) => Some(*it),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(it) => Some(*it),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(it) => Some(*it),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[String]> {
        match self {
            Value::Array(it) => Some(it),
            _ => None,
        }
    }

    pub fn as_path(&self) -> Option<&Path> {
        match self {
            Value::Path(it) => Some(it),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(it: &str) -> Self {
        Value::String(it.to_string())
    }
}

impl From<String> for Value {
    fn from(it: String) -> Self {
        Value::String(it)
    }
}

impl From<bool> for Value {
    fn from(it: bool) -> Self {
        Value::Boolean(it)
    }
}

impl From<i64> for Value {
    fn from(it: i64) -> Self {
        Value::Integer(it)
    }
}

impl From<i32> for Value {
    fn from(it: i32) -> Self {
        Value::Integer(it.into())
    }
}

impl From<f64> for Value {
    fn from(it: f64) -> Self {
        Value::Float(it)
    }
}

impl From<Vec<String>> for Value {
    fn from(it: Vec<String>) -> Self {
        Value::Array(it)
    }
}

impl From<PathBuf> for Value {
    fn from(it: PathBuf) -> Self {
        Value::Path(it)
    }
}

/// Renders the value the way it is shown in `[default: ...]` annotations.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(it) => write!(f, "{it:?}"),
            Value::Boolean(it) => write!(f, "{it}"),
            Value::Integer(it) => write!(f, "{it}"),
            Value::Float(it) => write!(f, "{it:?}"),
            Value::Array(it) => write!(f, "{it:?}"),
            Value::Path(it) => write!(f, "{:?}", it.display().to_string()),
        }
    }
}

/// A user supplied conversion from the raw token.
#[derive(Clone)]
pub struct Coercion(Arc<CoerceFn>);

impl Coercion {
    pub fn call(&self, raw: &str) -> Result<Value, BoxError> {
        (self.0)(raw)
    }
}

impl fmt::Debug for Coercion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Coercion(..)")
    }
}

/// The declared type of a parameter.
#[derive(Debug, Clone, Default)]
pub enum Type {
    #[default]
    String,
    Boolean,
    Integer,
    Float,
    /// Comma separated list.
    Array,
    /// Path resolved against the current directory. A leading `~` is replaced
    /// by `$HOME` when it is set.
    Pathname,
    Custom(Coercion),
}

impl Type {
    pub fn custom<F>(f: F) -> Type
    where
        F: Fn(&str) -> Result<Value, BoxError> + Send + Sync + 'static,
    {
        Type::Custom(Coercion(Arc::new(f)))
    }

    pub fn is_boolean(&self) -> bool {
        matches!(self, Type::Boolean)
    }

    /// Converts `raw` according to the type.
    ///
    /// Errors are returned bare, callers attach the parameter label.
    pub(crate) fn coerce(&self, raw: &str) -> Result<Value, BoxError> {
        let value = match self {
            Type::String => Value::String(raw.to_string()),
            Type::Boolean => match raw {
                "true" | "yes" | "on" | "1" => Value::Boolean(true),
                "false" | "no" | "off" | "0" => Value::Boolean(false),
                _ => Value::String(raw.to_string()),
            },
            Type::Integer => Value::Integer(raw.parse::<i64>()?),
            Type::Float => {
                let float = raw.parse::<f64>()?;
                if !float.is_finite() {
                    return Err(format!("not a finite number: {raw:?}").into());
                }
                Value::Float(float)
            }
            Type::Array => Value::Array(split_array(raw)),
            Type::Pathname => Value::Path(absolute(Path::new(raw))?),
            Type::Custom(coercion) => coercion.call(raw)?,
        };
        Ok(value)
    }
}

impl FromStr for Type {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Type, ConfigError> {
        let ty = match s {
            "string" => Type::String,
            "boolean" => Type::Boolean,
            "integer" => Type::Integer,
            "float" => Type::Float,
            "array" => Type::Array,
            "pathname" => Type::Pathname,
            _ => return Err(ConfigError::UnknownType(s.to_string())),
        };
        Ok(ty)
    }
}

// Trailing empty elements are dropped, inner ones are kept: "a,,b," => ["a", "", "b"].
fn split_array(raw: &str) -> Vec<String> {
    let mut res = raw.split(',').map(String::from).collect::<Vec<_>>();
    while res.last().map_or(false, |it| it.is_empty()) {
        res.pop();
    }
    res
}

fn absolute(path: &Path) -> std::io::Result<PathBuf> {
    let home = std::env::var_os("HOME").filter(|it| !it.is_empty());
    let path = match (path.strip_prefix("~"), home) {
        (Ok(rest), Some(home)) => PathBuf::from(home).join(rest),
        _ => path.to_path_buf(),
    };
    let joined = std::env::current_dir()?.join(path);
    let mut res = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::CurDir => (),
            Component::ParentDir => {
                res.pop();
            }
            it => res.push(it),
        }
    }
    Ok(res)
}
