use std::{fs, process};

use clap::Parser;
use rulexpr::{
    config::{CompilerConfig, VmConfig},
    error::EvalError,
    interpreter::{
        Compiler,
        binding::{TableHost, UnitTable},
        bytecode::Program,
        value::Value,
        vm::Context,
    },
};
use tracing_subscriber::EnvFilter;

/// rulexpr compiles and evaluates design-rule style expressions such as
/// `clearance >= 10mil && net == 'GND'`.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Tells rulexpr to read the expression from a file instead.
    #[arg(short, long)]
    file: bool,

    /// Defines a variable, e.g. `--var width=2.5` or `--var "net='GND'"`.
    /// Use `object.field=value` for field references.
    #[arg(long = "var", value_name = "NAME=VALUE", value_parser = parse_variable)]
    vars: Vec<(String, Value)>,

    /// Adds a unit suffix with its factor, e.g. `--unit cm=10`. The length
    /// units mm, mil and in are always available.
    #[arg(long = "unit", value_name = "NAME=FACTOR", value_parser = parse_unit)]
    units: Vec<(String, f64)>,

    /// Decimal separator accepted in numeric literals besides `.`.
    #[arg(long, default_value_t = '.')]
    decimal_separator: char,

    /// Operand stack capacity of the virtual machine.
    #[arg(long, default_value_t = rulexpr::config::DEFAULT_STACK_SIZE)]
    stack_size: usize,

    /// Prints the compiled program before running it.
    #[arg(long)]
    dump: bool,

    /// Increases log output; repeat for more detail.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    contents: String,
}

fn main() {
    let args = Args::parse();
    setup_logging(args.verbose);

    let source = if args.file {
        fs::read_to_string(&args.contents).unwrap_or_else(|_| {
            eprintln!("Failed to read the input file '{}'. Perhaps this file does not exist?",
                      &args.contents);
            process::exit(1);
        })
    } else {
        args.contents.clone()
    };

    match run(&args, source.trim_end()) {
        Ok(value) => println!("{value}"),
        Err(err) => {
            let status = err.status();
            eprintln!("{} at offset {}: {}", status.stage, status.offset, status.message);
            process::exit(1);
        },
    }
}

fn run(args: &Args, source: &str) -> Result<Value, EvalError> {
    let host = build_host(args);
    let config = CompilerConfig::new().with_decimal_separator(args.decimal_separator);
    let program: Program = Compiler::new(&host).with_config(config).compile(source)?;

    if args.dump {
        print!("{program}");
    }

    let mut ctx = Context::with_config(VmConfig { stack_size: args.stack_size,
                                                  ..VmConfig::default() });
    program.run_in(&mut ctx)
}

fn build_host(args: &Args) -> TableHost {
    let mut host = TableHost::new().with_units(UnitTable::lengths());
    for (name, factor) in &args.units {
        host.units_mut().insert(name.clone(), *factor);
    }
    for (name, value) in &args.vars {
        match name.split_once('.') {
            Some((object, field)) => host = host.with_field(object, field, value.clone()),
            None => host.set_variable(name, value.clone()),
        }
    }
    host
}

/// Parses `name=value`; the value is a number or a quoted string.
fn parse_variable(arg: &str) -> Result<(String, Value), String> {
    let (name, value) = arg.split_once('=')
                           .ok_or_else(|| format!("expected NAME=VALUE, got '{arg}'"))?;
    let value = value.trim();
    let value = if let Ok(n) = value.parse::<f64>() {
        Value::Numeric(n)
    } else if let Some(text) = value.strip_prefix('\'').and_then(|v| v.strip_suffix('\'')) {
        Value::from(text)
    } else {
        Value::from(value)
    };
    Ok((name.trim().to_string(), value))
}

/// Parses `name=factor`.
fn parse_unit(arg: &str) -> Result<(String, f64), String> {
    let (name, factor) = arg.split_once('=')
                            .ok_or_else(|| format!("expected NAME=FACTOR, got '{arg}'"))?;
    let factor = factor.trim()
                       .parse()
                       .map_err(|e| format!("invalid factor for unit '{name}': {e}"))?;
    Ok((name.trim().to_string(), factor))
}

fn setup_logging(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt().with_env_filter(filter)
                             .with_target(false)
                             .with_writer(std::io::stderr)
                             .init();
}
