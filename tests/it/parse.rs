use std::{
    error::Error as _,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
};

use argdecl::{
    Argument, ConfigError, Error, Flag, Opt, Parser, Strategy, TokenizeError, Type, Value,
};
use expect_test::expect;

use crate::{check, check_with};

fn parser(configure: impl FnOnce(&mut argdecl::ParserBuilder)) -> Parser {
    Parser::build(|p| {
        p.usage("test").color(false).posixly_correct(false);
        configure(p);
    })
    .unwrap()
}

#[test]
fn typed_options() {
    let p = parser(|p| {
        p.option(Opt::new("value"));
    });
    check(
        &p,
        "--value foo",
        expect![[r#"
            value = "foo"
            unused_arguments = []"#]],
    );
    check(
        &p,
        "--value=foo",
        expect![[r#"
            value = "foo"
            unused_arguments = []"#]],
    );

    let p = parser(|p| {
        p.option(Opt::new("value").ty(Type::Integer));
    });
    check(
        &p,
        "--value 1",
        expect![[r#"
            value = 1
            unused_arguments = []"#]],
    );
    check(&p, "--value lol", expect!["`--value` received an invalid value"]);

    let p = parser(|p| {
        p.option(Opt::new("value").ty(Type::Float));
    });
    check(
        &p,
        "--value 1.1",
        expect![[r#"
            value = 1.1
            unused_arguments = []"#]],
    );

    let p = parser(|p| {
        p.option(Opt::new("value").ty(Type::Array));
    });
    check(
        &p,
        "--value one,two",
        expect![[r#"
            value = ["one", "two"]
            unused_arguments = []"#]],
    );
}

#[test]
fn boolean_negation() {
    let p = parser(|p| {
        p.option(Opt::new("value").ty(Type::Boolean));
    });
    check(
        &p,
        "--value",
        expect![[r#"
            value = true
            unused_arguments = []"#]],
    );
    check(
        &p,
        "--no-value",
        expect![[r#"
            value = false
            unused_arguments = []"#]],
    );
    check(&p, "--value=yes", expect!["needless argument: --value=yes"]);
}

#[cfg(unix)]
#[test]
fn pathname_option() {
    let p = parser(|p| {
        p.option(Opt::new("value").ty(Type::Pathname));
    });
    let options = p.parse(["--value", "/"]).unwrap();
    let value = options.fetch("value").unwrap();
    assert_eq!(value.as_path(), Some(std::path::Path::new("/")));
}

#[test]
fn custom_coercion() {
    let p = parser(|p| {
        p.option(
            Opt::new("value").ty(Type::custom(|raw| Ok(Value::from(format!("custom {raw}"))))),
        );
        p.option(Opt::new("port").ty(Type::custom(|raw| {
            let port = raw.parse::<u16>()?;
            Ok(Value::Integer(port.into()))
        })));
    });
    check(
        &p,
        "--value foo --port 80",
        expect![[r#"
            value = "custom foo"
            port = 80
            unused_arguments = []"#]],
    );

    let err = p.parse(["--port", "70000"]).unwrap_err();
    assert_eq!(err.to_string(), "`--port` received an invalid value");
    let source = err.source().unwrap();
    assert_eq!(source.to_string(), "number too large to fit in target type");
}

#[test]
fn coercion_error_keeps_the_label() {
    let p = parser(|p| {
        p.option(Opt::new("value").ty(Type::Integer));
        p.argument(Argument::new("count").ty(Type::Integer));
    });

    let err = p.parse(["--value", ""]).unwrap_err();
    assert!(matches!(&err, Error::Coercion { label, .. } if label == "--value"));
    assert_eq!(err.to_string(), "`--value` received an invalid value");

    check(&p, "ten", expect!["`COUNT` received an invalid value"]);
}

#[test]
fn positional_arguments() {
    let p = parser(|p| {
        p.argument(Argument::new("foo")).argument(Argument::new("bar"));
    });
    check(
        &p,
        "foo",
        expect![[r#"
            foo = "foo"
            bar = nil
            unused_arguments = []"#]],
    );
    check(
        &p,
        "a b c d",
        expect![[r#"
            foo = "a"
            bar = "b"
            unused_arguments = ["c", "d"]"#]],
    );
}

#[test]
fn boolean_arguments_keep_unknown_words() {
    let p = parser(|p| {
        p.argument(Argument::new("flag").ty(Type::Boolean));
    });
    check(
        &p,
        "maybe",
        expect![[r#"
            flag = "maybe"
            unused_arguments = []"#]],
    );
    check(
        &p,
        "off",
        expect![[r#"
            flag = false
            unused_arguments = []"#]],
    );
}

#[test]
fn aliases() {
    let p = parser(|p| {
        p.option(Opt::new("value").alias("-v").alias("--val"));
        p.option(Opt::new("quiet").ty(Type::Boolean).alias("-q"));
    });
    check(
        &p,
        "-v foo",
        expect![[r#"
            value = "foo"
            quiet = nil
            unused_arguments = []"#]],
    );
    check(
        &p,
        "-qvfoo",
        expect![[r#"
            value = "foo"
            quiet = true
            unused_arguments = []"#]],
    );
    check(
        &p,
        "--val=bar",
        expect![[r#"
            value = "bar"
            quiet = nil
            unused_arguments = []"#]],
    );
}

#[test]
fn defaults() {
    let p = parser(|p| {
        p.argument(Argument::new("input").default("-"));
        p.option(Opt::new("value").default("foo"));
        p.option(Opt::new("jobs").ty(Type::Integer).default(4));
        p.option(Opt::new("color").ty(Type::Boolean).default(true));
    });
    check(
        &p,
        "",
        expect![[r#"
            input = "-"
            value = "foo"
            jobs = 4
            color = true
            unused_arguments = []"#]],
    );
    check(
        &p,
        "--no-color in.txt --jobs 8",
        expect![[r#"
            input = "in.txt"
            value = "foo"
            jobs = 8
            color = false
            unused_arguments = []"#]],
    );

    let options = p.parse(Vec::<String>::new()).unwrap();
    assert_eq!(options.into_map(), p.default_values());
}

#[test]
fn required_parameters() {
    let p = parser(|p| {
        p.argument(Argument::new("value").required(true));
    });
    check(&p, "", expect!["`VALUE` is a required parameter"]);

    let p = parser(|p| {
        p.option(Opt::new("value").required(true));
    });
    check(&p, "", expect!["`--value` is a required parameter"]);

    let p = parser(|p| {
        p.option(Opt::new("value").required(true).default("x"));
    });
    check(
        &p,
        "",
        expect![[r#"
            value = "x"
            unused_arguments = []"#]],
    );

    let p = parser(|p| {
        p.argument(Argument::new("first").required(true));
        p.option(Opt::new("second").required(true));
    });
    let err = p.parse(Vec::<String>::new()).unwrap_err();
    assert!(matches!(err, Error::Validation { label } if label == "FIRST"));
}

#[test]
fn keeps_unused_arguments_in_order() {
    let p = parser(|p| {
        p.argument(Argument::new("foo"));
    });
    check_with(
        &p,
        "foo bar -f buzz",
        Strategy::Order,
        expect![[r#"
            foo = "foo"
            unused_arguments = ["bar", "-f", "buzz"]"#]],
    );
    check(&p, "foo bar -f buzz", expect!["invalid option: -f"]);
}

#[test]
fn strategies() {
    let p = parser(|p| {
        p.argument(Argument::new("cmd"));
        p.option(Opt::new("verbose").ty(Type::Boolean));
    });
    check_with(
        &p,
        "run --verbose",
        Strategy::Permute,
        expect![[r#"
            cmd = "run"
            verbose = true
            unused_arguments = []"#]],
    );
    check_with(
        &p,
        "run --verbose",
        Strategy::Order,
        expect![[r#"
            cmd = "run"
            verbose = nil
            unused_arguments = ["--verbose"]"#]],
    );
    check(
        &p,
        "--verbose -- --no-verbose",
        expect![[r#"
            cmd = "--no-verbose"
            verbose = true
            unused_arguments = []"#]],
    );

    let posix = Parser::build(|p| {
        p.posixly_correct(true).argument(Argument::new("cmd"));
        p.option(Opt::new("verbose").ty(Type::Boolean));
    })
    .unwrap();
    check(
        &posix,
        "run --verbose",
        expect![[r#"
            cmd = "run"
            verbose = nil
            unused_arguments = ["--verbose"]"#]],
    );
}

#[test]
fn tokenizer_errors_are_wrapped() {
    let p = parser(|p| {
        p.option(Opt::new("value"));
        p.option(Opt::new("verbose").ty(Type::Boolean));
    });

    let err = p.parse(["--nope"]).unwrap_err();
    assert_eq!(err.to_string(), "invalid option: --nope");
    assert!(matches!(err, Error::Parse(TokenizeError::InvalidOption(_))));

    let err = p.parse(["--value"]).unwrap_err();
    assert_eq!(err.to_string(), "missing argument: --value");
    let source = err.source().unwrap();
    assert_eq!(
        source.downcast_ref::<TokenizeError>(),
        Some(&TokenizeError::MissingArgument("--value".to_string()))
    );

    check(&p, "--v x", expect!["ambiguous option: --v (--value, --verbose)"]);
    check(
        &p,
        "--va x",
        expect![[r#"
            value = "x"
            verbose = nil
            unused_arguments = []"#]],
    );
}

#[test]
fn raw_flags() {
    let count = Arc::new(AtomicUsize::new(0));
    let seen = Arc::new(Mutex::new(Vec::new()));

    let p = parser(|p| {
        let count = Arc::clone(&count);
        let seen = Arc::clone(&seen);
        p.flag(Flag::new(["-d", "--debug"]).on(move || {
            count.fetch_add(1, Ordering::SeqCst);
        }))
        .flag(Flag::new(["--define NAME"]).on_value(move |value| {
            seen.lock().unwrap().push(value.to_string());
        }));
    });

    check(&p, "-dd --define A --define=B --debug", expect!["unused_arguments = []"]);
    assert_eq!(count.load(Ordering::SeqCst), 3);
    assert_eq!(*seen.lock().unwrap(), vec!["A", "B"]);
}

#[test]
fn raw_flag_placeholder_consumes_a_value() {
    let hits = Arc::new(AtomicUsize::new(0));
    let p = parser(|p| {
        let hits = Arc::clone(&hits);
        p.argument(Argument::new("input")).flag(Flag::new(["-o", "--out FILE"]).on(move || {
            hits.fetch_add(1, Ordering::SeqCst);
        }));
    });

    check(
        &p,
        "--out x.txt in.txt -o y.txt",
        expect![[r#"
            input = "in.txt"
            unused_arguments = []"#]],
    );
    assert_eq!(hits.load(Ordering::SeqCst), 2);
    check(&p, "in.txt --out", expect!["missing argument: --out"]);
}

#[test]
fn version_flag() {
    let p = parser(|p| {
        p.version("1.2.3").option(Opt::new("value").required(true));
    });
    let err = p.parse(["--version"]).unwrap_err();
    assert!(err.is_version());
    assert_eq!(err.to_string(), "1.2.3");
    assert!(!err.is_help());
}

#[test]
fn parses_are_independent() {
    let p = parser(|p| {
        p.argument(Argument::new("input"));
        p.option(Opt::new("value").default("foo"));
    });

    let argv = vec!["a".to_string(), "--value".to_string(), "bar".to_string(), "b".to_string()];
    let first = p.parse(&argv).unwrap();
    assert_eq!(argv.len(), 4);
    assert_eq!(first.unused_arguments(), ["b".to_string()]);

    let second = p.parse(Vec::<String>::new()).unwrap();
    assert_eq!(second.get("value"), Some(&Value::from("foo")));
    assert_eq!(second.get("input"), None);
    assert!(second.unused_arguments().is_empty());
    assert_eq!(first.get("value"), Some(&Value::from("bar")));
}

#[test]
fn parse_from_many_threads() {
    let p = parser(|p| {
        p.option(Opt::new("n").ty(Type::Integer));
    });
    std::thread::scope(|s| {
        for i in 0..4_i64 {
            let p = &p;
            s.spawn(move || {
                let options = p.parse(["--n".to_string(), i.to_string()]).unwrap();
                assert_eq!(options.fetch("n").unwrap(), &Value::Integer(i));
            });
        }
    });
}

#[test]
fn result_accessors() {
    let p = parser(|p| {
        p.option(Opt::new("value"));
        p.option(Opt::new("quiet").ty(Type::Boolean));
    });
    let options = p.parse(["--value", "x", "--no-quiet"]).unwrap();

    assert_eq!(options.value("value").unwrap(), Some(&Value::from("x")));
    assert!(options.query("value").unwrap());
    assert!(!options.query("quiet").unwrap());
    assert!(matches!(
        options.value("other"),
        Err(Error::UnknownParameter(name)) if name == "other"
    ));
    assert!(matches!(options.query("other"), Err(Error::UnknownParameter(_))));
    assert!(matches!(options.fetch("other"), Err(Error::KeyNotFound(_))));
    assert_eq!(options.fetch_or("other", 1), Value::Integer(1));
    assert_eq!(
        options.fetch_or_else("other", |key| Value::from(key.len() as i64)),
        Value::Integer(5)
    );
}

#[test]
fn declaration_mistakes() {
    let err = Parser::build(|p| {
        p.argument(Argument::new("value")).option(Opt::new("value"));
    })
    .err();
    assert_eq!(err, Some(ConfigError::DuplicateName("value".to_string())));

    let err = Parser::build(|p| {
        p.argument(Argument::new("unused_arguments"));
    })
    .err();
    assert_eq!(err, Some(ConfigError::ReservedName("unused_arguments".to_string())));

    let err = Parser::build(|p| {
        p.version("1.0").option(Opt::new("verbose").alias("-v"));
    })
    .err();
    assert_eq!(err, Some(ConfigError::DuplicateFlag("-v".to_string())));

    let err = Parser::build(|p| {
        p.option(Opt::new("value").alias("value"));
    })
    .err();
    assert_eq!(err, Some(ConfigError::InvalidSpelling("value".to_string())));

    assert_eq!(
        Opt::new("value").type_name("date").err().map(|it| it.to_string()),
        Some("invalid type: `date`".to_string())
    );
}

#[test]
fn one_shot_parse() {
    let options = argdecl::parse(["--name", "ferris", "extra"], |p| {
        p.option(Opt::new("name").required(true));
    })
    .unwrap();
    assert_eq!(options.get("name").and_then(Value::as_str), Some("ferris"));
    assert_eq!(options.unused_arguments(), ["extra".to_string()]);
}
