//! A getopt style tokenizer.
//!
//! Recognizes `--name value`, `--name=value`, `--no-name`, unique prefixes of
//! long names, `-x value`, `-xvalue` and clusters of short switches. Everything
//! else is handed back as residual tokens.
use thiserror::Error;

use crate::ConfigError;

/// Rejection of the token list.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenizeError {
    #[error("invalid option: {0}")]
    InvalidOption(String),
    #[error("missing argument: {0}")]
    MissingArgument(String),
    #[error("needless argument: {0}")]
    NeedlessArgument(String),
    #[error("ambiguous option: {flag} ({})", candidates.join(", "))]
    Ambiguous { flag: String, candidates: Vec<String> },
}

macro_rules! bail {
    ($variant:ident, $($tt:tt)*) => {
        return Err(TokenizeError::$variant(format!($($tt)*)).into())
    };
}

/// How options and positional tokens may be interleaved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Stop at the first positional token.
    Order,
    /// Match options anywhere before `--`.
    Permute,
}

/// What a matched spelling carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Matched {
    Switch(bool),
    Value(String),
}

/// Spellings of a single flag.
#[derive(Debug, Clone, Default)]
pub struct Spec {
    pub long: Vec<String>,
    pub short: Vec<char>,
    /// The first long spelling also matches as `--no-<long>`.
    pub negatable: bool,
    pub takes_value: bool,
}

impl Spec {
    pub fn new(takes_value: bool) -> Spec {
        Spec { takes_value, ..Spec::default() }
    }

    pub fn push_long(&mut self, name: &str) -> Result<(), ConfigError> {
        let valid = !name.is_empty()
            && !name.starts_with('-')
            && !name.contains(|c: char| c == '=' || c.is_whitespace());
        if !valid {
            return Err(ConfigError::InvalidSpelling(format!("--{name}")));
        }
        self.long.push(name.to_string());
        Ok(())
    }

    /// Accepts `--long` or `-s`.
    pub fn push_spelling(&mut self, spelling: &str) -> Result<(), ConfigError> {
        if let Some(long) = spelling.strip_prefix("--") {
            return self.push_long(long);
        }
        let mut chars = spelling.chars();
        match (chars.next(), chars.next(), chars.next()) {
            (Some('-'), Some(c), None) if c != '-' && !c.is_whitespace() => {
                self.short.push(c);
                Ok(())
            }
            _ => Err(ConfigError::InvalidSpelling(spelling.to_string())),
        }
    }

    fn longs(&self) -> impl Iterator<Item = (String, bool)> + '_ {
        let negated =
            self.long.first().filter(|_| self.negatable).map(|it| (format!("no-{it}"), true));
        self.long.iter().map(|it| (it.clone(), false)).chain(negated)
    }
}

pub struct Tokenizer<T> {
    specs: Vec<(Spec, T)>,
}

impl<T> Default for Tokenizer<T> {
    fn default() -> Self {
        Tokenizer { specs: Vec::new() }
    }
}

impl<T> Tokenizer<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, spec: Spec, target: T) -> Result<(), ConfigError> {
        for (long, _) in spec.longs() {
            if self.find_exact_long(&long).is_some() {
                return Err(ConfigError::DuplicateFlag(format!("--{long}")));
            }
        }
        for &short in &spec.short {
            if self.find_short(short).is_some() {
                return Err(ConfigError::DuplicateFlag(format!("-{short}")));
            }
        }
        self.specs.push((spec, target));
        Ok(())
    }

    pub fn is_registered(&self, spelling: &str) -> bool {
        match spelling.strip_prefix("--") {
            Some(long) => self.find_exact_long(long).is_some(),
            None => {
                let mut chars = spelling.chars().skip(1);
                match (chars.next(), chars.next()) {
                    (Some(c), None) => self.find_short(c).is_some(),
                    _ => false,
                }
            }
        }
    }

    /// Feeds matches to `on_match` and returns the residual tokens in their
    /// original relative order.
    pub fn run<E, F>(
        &self,
        args: Vec<String>,
        mode: Mode,
        mut on_match: F,
    ) -> Result<Vec<String>, E>
    where
        E: From<TokenizeError>,
        F: FnMut(&T, &str, Matched) -> Result<(), E>,
    {
        let mut rargs = args;
        rargs.reverse();
        let mut residual = Vec::new();

        while let Some(arg) = rargs.pop() {
            if arg == "--" {
                residual.extend(rargs.drain(..).rev());
                break;
            }
            if let Some(body) = arg.strip_prefix("--") {
                self.long(body, &mut rargs, &mut on_match)?;
                continue;
            }
            if let Some(body) = arg.strip_prefix('-').filter(|it| !it.is_empty()) {
                self.short(body, &mut rargs, &mut on_match)?;
                continue;
            }
            residual.push(arg);
            if mode == Mode::Order {
                residual.extend(rargs.drain(..).rev());
                break;
            }
        }

        Ok(residual)
    }

    fn long<E, F>(&self, body: &str, rargs: &mut Vec<String>, on_match: &mut F) -> Result<(), E>
    where
        E: From<TokenizeError>,
        F: FnMut(&T, &str, Matched) -> Result<(), E>,
    {
        let (name, inline) = match body.split_once('=') {
            Some((name, value)) => (name, Some(value)),
            None => (body, None),
        };
        let flag = format!("--{name}");
        let (idx, negated) = self.find_long(name)?;
        let (spec, target) = &self.specs[idx];

        if spec.takes_value {
            let value = match inline {
                Some(it) => it.to_string(),
                None => match rargs.pop() {
                    Some(it) => it,
                    None => bail!(MissingArgument, "{flag}"),
                },
            };
            on_match(target, &flag, Matched::Value(value))
        } else {
            if inline.is_some() {
                bail!(NeedlessArgument, "--{body}");
            }
            on_match(target, &flag, Matched::Switch(!negated))
        }
    }

    fn short<E, F>(&self, body: &str, rargs: &mut Vec<String>, on_match: &mut F) -> Result<(), E>
    where
        E: From<TokenizeError>,
        F: FnMut(&T, &str, Matched) -> Result<(), E>,
    {
        for (i, c) in body.char_indices() {
            let flag = format!("-{c}");
            let idx = match self.find_short(c) {
                Some(it) => it,
                None => bail!(InvalidOption, "{flag}"),
            };
            let (spec, target) = &self.specs[idx];
            if !spec.takes_value {
                on_match(target, &flag, Matched::Switch(true))?;
                continue;
            }

            let rest = &body[i + c.len_utf8()..];
            let value = if !rest.is_empty() {
                rest.to_string()
            } else {
                match rargs.pop() {
                    Some(it) => it,
                    None => bail!(MissingArgument, "{flag}"),
                }
            };
            return on_match(target, &flag, Matched::Value(value));
        }
        Ok(())
    }

    fn find_exact_long(&self, name: &str) -> Option<(usize, bool)> {
        self.specs.iter().enumerate().find_map(|(idx, (spec, _))| {
            spec.longs().find(|(long, _)| long == name).map(|(_, negated)| (idx, negated))
        })
    }

    fn find_long(&self, name: &str) -> Result<(usize, bool), TokenizeError> {
        if name.is_empty() {
            return Err(TokenizeError::InvalidOption("--".to_string()));
        }
        if let Some(it) = self.find_exact_long(name) {
            return Ok(it);
        }

        let mut found: Vec<(usize, bool, String)> = Vec::new();
        for (idx, (spec, _)) in self.specs.iter().enumerate() {
            for (long, negated) in spec.longs() {
                let seen = found.iter().any(|it| (it.0, it.1) == (idx, negated));
                if long.starts_with(name) && !seen {
                    found.push((idx, negated, long));
                }
            }
        }
        match found.len() {
            0 => Err(TokenizeError::InvalidOption(format!("--{name}"))),
            1 => Ok((found[0].0, found[0].1)),
            _ => Err(TokenizeError::Ambiguous {
                flag: format!("--{name}"),
                candidates: found.into_iter().map(|(_, _, long)| format!("--{long}")).collect(),
            }),
        }
    }

    fn find_short(&self, c: char) -> Option<usize> {
        self.specs.iter().position(|(spec, _)| spec.short.contains(&c))
    }
}
