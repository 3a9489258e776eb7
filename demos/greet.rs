//! A small greeting program.
//!
//! ```text
//! $ cargo run --example greet
//! $ cargo run --example greet -- default index --name Yorick
//! $ cargo run --example greet -- test
//! $ cargo run --example greet -- --help
//! ```

use std::io::Write;
use std::process;

use shebang::cli::output;
use shebang::util::logging::setup_logging;
use shebang::{
    exitcode, Actions, Command, CommandDescriptor, CommandRegistry, Context, Dispatcher, Flow,
    OptionConfig, Settings, ShebangResult, ValueType,
};

#[derive(Default)]
struct Greet;

impl Greet {
    fn index(&mut self, ctx: &mut Context<'_>) -> ShebangResult<Flow> {
        let name = ctx.option("n").map(|v| v.to_string()).unwrap_or_default();
        writeln!(ctx.out(), "Your name is {name}")?;
        if ctx.option("force").and_then(|v| v.as_bool()) == Some(true) {
            writeln!(ctx.out(), "(forced)")?;
        }
        Ok(Flow::Continue)
    }

    fn test(&mut self, ctx: &mut Context<'_>) -> ShebangResult<Flow> {
        writeln!(ctx.out(), "This is a test method")?;
        Ok(Flow::Continue)
    }

    fn version(&mut self, ctx: &mut Context<'_>) -> ShebangResult<Flow> {
        writeln!(ctx.out(), "{}", env!("CARGO_PKG_VERSION"))?;
        Ok(Flow::Exit(exitcode::OK))
    }
}

impl Command for Greet {
    fn actions() -> Actions<Self> {
        Actions::new()
            .action("index", Self::index)
            .action("test", Self::test)
            .action("version", Self::version)
    }
}

fn build() -> ShebangResult<Dispatcher> {
    let mut registry = CommandRegistry::new();
    registry.register(
        CommandDescriptor::new("default")
            .banner("Runs an example command.")
            .usage("$ greet [OPTIONS]")
            .o('h', "help", "Shows this help message", OptionConfig::new().method("help"))
            .o(
                'v',
                "version",
                "Shows the current version",
                OptionConfig::new().method("version"),
            )
            .o('f', "force", "Forces the command to run", OptionConfig::new())
            .o(
                'n',
                "name",
                "A person's name",
                OptionConfig::new()
                    .value_type(ValueType::String)
                    .required(true)
                    .default_value("Shebang"),
            ),
        Greet::default,
    )?;

    Ok(Dispatcher::new(registry, Settings::load(None)?))
}

fn main() {
    setup_logging(0);

    let result = build().and_then(|dispatcher| dispatcher.run_from_env());
    match result {
        Ok(flow) => process::exit(flow.exit_code()),
        Err(e) => {
            output::error(&e);
            process::exit(e.exit_code());
        }
    }
}
