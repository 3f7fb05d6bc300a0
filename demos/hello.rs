use argdecl::{Argument, Opt, Parser, Type};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let parser = Parser::build(|p| {
        p.usage("hello [NAME] [OPTIONS]")
            .description("Prints a greeting.")
            .example("$ hello ferris --emoji")
            .version(env!("CARGO_PKG_VERSION"))
            .argument(Argument::new("name").description("who to greet").default("world"))
            .option(Opt::new("emoji").ty(Type::Boolean).alias("-e").description("end with a heart"))
            .option(Opt::new("times").ty(Type::Integer).alias("-n").default(1));
    });
    let parser = match parser {
        Ok(it) => it,
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(2)
        }
    };

    match parser.parse(std::env::args().skip(1)) {
        Ok(flags) => {
            let bang = if flags.is_truthy("emoji") { "❣️" } else { "!" };
            let name = flags.get("name").and_then(|it| it.as_str()).unwrap_or("world");
            let times = flags.get("times").and_then(|it| it.as_integer()).unwrap_or(1);
            for _ in 0..times {
                println!("Hello {name}{bang}");
            }
        }
        Err(err) if err.is_help() => print!("{err}"),
        Err(err) if err.is_version() => println!("hello {err}"),
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1)
        }
    }
}
