use std::io::IsTerminal;

use indexmap::IndexMap;
use tracing::{debug, trace};

use crate::{
    flag::{Action, Flag},
    help::{Help, HelpConfig},
    options::UNUSED_ARGUMENTS,
    param::{Argument, Opt, Param},
    rt::{self, Matched, Mode, Tokenizer},
    ConfigError, Error, Options, Result, Value,
};

/// How strictly options must precede positional tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Strategy {
    /// Options are matched up to the first positional token, the rest is kept
    /// in order.
    Order,
    /// Options are matched anywhere before `--`.
    Permute,
    /// `Permute`, or `Order` when the parser was built POSIXly correct.
    #[default]
    Unrestricted,
}

#[derive(Debug, Clone, Copy)]
enum Target {
    Opt(usize),
    Flag(usize),
    Help,
}

/// Mutable declaration set, turned into a [`Parser`] by [`ParserBuilder::build`].
#[derive(Debug, Clone)]
pub struct ParserBuilder {
    usage: String,
    description: Option<String>,
    examples: Vec<String>,
    arguments: Vec<Argument>,
    options: Vec<Opt>,
    flags: Vec<Flag>,
    help: HelpConfig,
    posixly_correct: bool,
}

impl Default for ParserBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ParserBuilder {
    /// Resolves the process wide defaults: usage is the invocation name, help
    /// is colored when stdout is a terminal, and `POSIXLY_CORRECT` selects
    /// ordered parsing for [`Strategy::Unrestricted`].
    pub fn new() -> ParserBuilder {
        let usage = std::env::args_os()
            .next()
            .map(|it| match std::path::Path::new(&it).file_name() {
                Some(name) => name.to_string_lossy().into_owned(),
                None => it.to_string_lossy().into_owned(),
            })
            .unwrap_or_else(|| "program".to_string());
        ParserBuilder {
            usage,
            description: None,
            examples: Vec::new(),
            arguments: Vec::new(),
            options: Vec::new(),
            flags: Vec::new(),
            help: HelpConfig { color: std::io::stdout().is_terminal(), ..HelpConfig::default() },
            posixly_correct: std::env::var_os("POSIXLY_CORRECT").is_some(),
        }
    }

    pub fn usage(&mut self, usage: impl Into<String>) -> &mut Self {
        self.usage = usage.into();
        self
    }

    pub fn description(&mut self, description: impl Into<String>) -> &mut Self {
        self.description = Some(description.into());
        self
    }

    pub fn example(&mut self, example: impl Into<String>) -> &mut Self {
        self.examples.push(example.into());
        self
    }

    pub fn argument(&mut self, argument: Argument) -> &mut Self {
        self.arguments.push(argument);
        self
    }

    pub fn option(&mut self, option: Opt) -> &mut Self {
        self.options.push(option);
        self
    }

    pub fn flag(&mut self, flag: Flag) -> &mut Self {
        self.flags.push(flag);
        self
    }

    /// Adds a `-v, --version` flag which makes parsing fail with
    /// [`Error::Version`].
    pub fn version(&mut self, version: impl Into<String>) -> &mut Self {
        self.flag(Flag::version(version.into()))
    }

    pub fn column(&mut self, column: usize) -> &mut Self {
        self.help.column = column;
        self
    }

    pub fn color(&mut self, color: bool) -> &mut Self {
        self.help.color = color;
        self
    }

    pub fn posixly_correct(&mut self, yes: bool) -> &mut Self {
        self.posixly_correct = yes;
        self
    }

    pub fn build(self) -> Result<Parser, ConfigError> {
        let mut names: Vec<&str> = Vec::new();
        let params = self.arguments.iter().map(|it| it as &dyn Param);
        for param in params.chain(self.options.iter().map(|it| it as &dyn Param)) {
            let name = param.name();
            if name == UNUSED_ARGUMENTS {
                return Err(ConfigError::ReservedName(name.to_string()));
            }
            if names.contains(&name) {
                return Err(ConfigError::DuplicateName(name.to_string()));
            }
            names.push(name);
        }

        let mut tokenizer = Tokenizer::new();
        for (idx, opt) in self.options.iter().enumerate() {
            tokenizer.register(opt.spec()?, Target::Opt(idx))?;
        }
        for (idx, flag) in self.flags.iter().enumerate() {
            tokenizer.register(flag.spec()?, Target::Flag(idx))?;
        }

        let help_flag: Vec<String> = ["-h", "--help"]
            .iter()
            .filter(|it| !tokenizer.is_registered(it))
            .map(|it| it.to_string())
            .collect();
        if !help_flag.is_empty() {
            let mut spec = rt::Spec::new(false);
            for spelling in &help_flag {
                spec.push_spelling(spelling)?;
            }
            tokenizer.register(spec, Target::Help)?;
        }

        Ok(Parser {
            usage: self.usage,
            description: self.description,
            examples: self.examples,
            arguments: self.arguments,
            options: self.options,
            flags: self.flags,
            help_flag,
            help: self.help,
            posixly_correct: self.posixly_correct,
            tokenizer,
        })
    }
}

/// A frozen declaration set, parses any number of token lists.
pub struct Parser {
    usage: String,
    description: Option<String>,
    examples: Vec<String>,
    arguments: Vec<Argument>,
    options: Vec<Opt>,
    flags: Vec<Flag>,
    help_flag: Vec<String>,
    help: HelpConfig,
    posixly_correct: bool,
    tokenizer: Tokenizer<Target>,
}

impl Parser {
    pub fn builder() -> ParserBuilder {
        ParserBuilder::new()
    }

    /// Declares a parser through `configure`.
    pub fn build<F>(configure: F) -> Result<Parser, ConfigError>
    where
        F: FnOnce(&mut ParserBuilder),
    {
        let mut builder = ParserBuilder::new();
        configure(&mut builder);
        builder.build()
    }

    pub fn usage(&self) -> &str {
        &self.usage
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn examples(&self) -> &[String] {
        &self.examples
    }

    pub fn arguments(&self) -> &[Argument] {
        &self.arguments
    }

    pub fn options(&self) -> &[Opt] {
        &self.options
    }

    pub fn flags(&self) -> &[Flag] {
        &self.flags
    }

    /// Spellings of the built-in help flag, empty if the caller claimed both.
    pub fn help_flag(&self) -> &[String] {
        &self.help_flag
    }

    /// Arguments first, then options.
    pub fn parameters(&self) -> Vec<&dyn Param> {
        let arguments = self.arguments.iter().map(|it| it as &dyn Param);
        arguments.chain(self.options.iter().map(|it| it as &dyn Param)).collect()
    }

    pub fn help(&self) -> Help<'_> {
        Help::new(self, self.help.clone())
    }

    /// Declared defaults, plus an empty [`UNUSED_ARGUMENTS`] bucket.
    pub fn default_values(&self) -> IndexMap<String, Option<Value>> {
        let mut values = IndexMap::new();
        for param in self.parameters() {
            values.insert(param.name().to_string(), param.parameter().default.clone());
        }
        values.insert(UNUSED_ARGUMENTS.to_string(), Some(Value::Array(Vec::new())));
        values
    }

    pub fn parse<I, S>(&self, argv: I) -> Result<Options>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.parse_with(argv, Strategy::default())
    }

    pub fn parse_with<I, S>(&self, argv: I, strategy: Strategy) -> Result<Options>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let args = argv.into_iter().map(Into::into).collect::<Vec<String>>();
        let mode = match strategy {
            Strategy::Order => Mode::Order,
            Strategy::Permute => Mode::Permute,
            Strategy::Unrestricted if self.posixly_correct => Mode::Order,
            Strategy::Unrestricted => Mode::Permute,
        };
        debug!(tokens = args.len(), ?mode, "parsing arguments");

        let mut values = self.default_values();
        let residual = self.tokenizer.run(args, mode, |target, flag, matched| {
            self.on_match(&mut values, *target, flag, matched)
        })?;
        debug!(residual = residual.len(), "options matched");

        self.populate_arguments(&mut values, residual)?;
        self.validate(&values)?;
        debug!(values = values.len(), "parse finished");
        Ok(Options::new(values))
    }

    /// Fails with the first required parameter that has no value.
    pub fn validate(&self, values: &IndexMap<String, Option<Value>>) -> Result<()> {
        for param in self.parameters() {
            param.validate(values.get(param.name()).and_then(Option::as_ref))?;
        }
        Ok(())
    }

    fn on_match(
        &self,
        values: &mut IndexMap<String, Option<Value>>,
        target: Target,
        flag: &str,
        matched: Matched,
    ) -> Result<()> {
        match target {
            Target::Opt(idx) => {
                let opt = &self.options[idx];
                trace!(flag, name = opt.name(), "matched option");
                let value = match matched {
                    Matched::Switch(it) => Value::Boolean(it),
                    Matched::Value(raw) => opt.coerce(&raw)?,
                };
                values.insert(opt.name().to_string(), Some(value));
            }
            Target::Flag(idx) => {
                trace!(flag, "matched flag");
                match (self.flags[idx].action(), matched) {
                    (Action::Switch(action), _) => action(),
                    (Action::Value(action), Matched::Value(raw)) => action(&raw),
                    (Action::Value(_), Matched::Switch(_)) => (),
                    (Action::Version(version), _) => return Err(Error::Version(version.clone())),
                }
            }
            Target::Help => return Err(Error::Help(self.help().to_string())),
        }
        Ok(())
    }

    fn populate_arguments(
        &self,
        values: &mut IndexMap<String, Option<Value>>,
        residual: Vec<String>,
    ) -> Result<()> {
        let mut residual = residual.into_iter();
        for (arg, token) in self.arguments.iter().zip(residual.by_ref()) {
            trace!(name = arg.name(), token = token.as_str(), "matched argument");
            values.insert(arg.name().to_string(), Some(arg.coerce(&token)?));
        }
        if let Some(Some(Value::Array(unused))) = values.get_mut(UNUSED_ARGUMENTS) {
            unused.extend(residual);
        }
        Ok(())
    }
}
