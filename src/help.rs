use std::fmt;

use ansi_term::Style;

use crate::{param::Param, Flag, Opt, Parser, Value};

/// Layout of the rendered help.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HelpConfig {
    /// Width of the left column, shared by all sections.
    pub column: usize,
    /// Bold headers and dimmed annotations.
    pub color: bool,
}

impl Default for HelpConfig {
    fn default() -> Self {
        HelpConfig { column: 30, color: false }
    }
}

/// Help page of a [`Parser`], rendered through `Display`.
///
/// Sections come in a fixed order: description, `USAGE`, `EXAMPLES`,
/// `ARGUMENTS`, `OPTIONS`, `FLAGS`. Sections without entries are skipped.
pub struct Help<'a> {
    parser: &'a Parser,
    config: HelpConfig,
}

impl<'a> Help<'a> {
    pub fn new(parser: &'a Parser, config: HelpConfig) -> Help<'a> {
        Help { parser, config }
    }

    pub fn column(mut self, column: usize) -> Self {
        self.config.column = column;
        self
    }

    pub fn color(mut self, color: bool) -> Self {
        self.config.color = color;
        self
    }

    /// One `  <name>  <annotations>` line.
    pub fn entry(
        &self,
        name: &str,
        desc: Option<&str>,
        required: bool,
        default: Option<&Value>,
    ) -> String {
        let mut annotations = Vec::new();
        if let Some(desc) = desc {
            annotations.push(desc.to_string());
        }
        if required {
            annotations.push("(required)".to_string());
        }
        if let Some(default) = default.filter(|it| it.is_truthy()) {
            annotations.push(format!("[default: {default}]"));
        }

        let column = self.config.column;
        let mut out = format!("  {name:<column$}");
        if annotations.is_empty() {
            return out.trim_end().to_string();
        }
        if name.chars().count() >= column {
            out.push(' ');
        }
        out.push_str(&self.dim(&annotations.join(" ")));
        out
    }

    fn section(&self, out: &mut Vec<String>, title: &str, entries: Vec<String>) {
        if entries.is_empty() {
            return;
        }
        out.push(String::new());
        out.push(self.bold(title));
        out.extend(entries);
    }

    fn option(&self, opt: &Opt) -> String {
        let boolean = opt.parameter().ty.is_boolean();
        let value_name = opt.value_name();
        let spelled = |spelling: &str| {
            if boolean {
                spelling.to_string()
            } else if spelling.starts_with("--") {
                format!("{spelling}={value_name}")
            } else {
                format!("{spelling} {value_name}")
            }
        };

        let mut label = vec![spelled(opt.label().as_str())];
        label.extend(opt.aliases().iter().map(|it| spelled(it.as_str())));
        let param = opt.parameter();
        let desc = param.description.as_deref();
        self.entry(&label.join(", "), desc, param.required, param.default.as_ref())
    }

    fn flag(&self, flag: &Flag) -> String {
        self.entry(&flag.spellings().join(", "), flag.get_description(), false, None)
    }

    fn bold(&self, text: &str) -> String {
        if self.config.color {
            Style::new().bold().paint(text).to_string()
        } else {
            text.to_string()
        }
    }

    fn dim(&self, text: &str) -> String {
        if self.config.color {
            Style::new().dimmed().paint(text).to_string()
        } else {
            text.to_string()
        }
    }
}

impl fmt::Display for Help<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parser = self.parser;
        let mut out = Vec::new();

        if let Some(description) = parser.description() {
            out.push(description.to_string());
            out.push(String::new());
        }

        out.push(self.bold("USAGE"));
        out.push(format!("  {}", parser.usage()));

        let examples = parser.examples().iter().map(|it| format!("  {it}")).collect();
        self.section(&mut out, "EXAMPLES", examples);

        let arguments = parser
            .arguments()
            .iter()
            .map(|arg| {
                let param = arg.parameter();
                let desc = param.description.as_deref();
                self.entry(&arg.label(), desc, param.required, param.default.as_ref())
            })
            .collect();
        self.section(&mut out, "ARGUMENTS", arguments);

        let options = parser.options().iter().map(|it| self.option(it)).collect();
        self.section(&mut out, "OPTIONS", options);

        let mut flags = parser.flags().iter().map(|it| self.flag(it)).collect::<Vec<_>>();
        if !parser.help_flag().is_empty() {
            let spellings = parser.help_flag().join(", ");
            flags.push(self.entry(&spellings, Some("show this help and exit"), false, None));
        }
        self.section(&mut out, "FLAGS", flags);

        for line in out {
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}
