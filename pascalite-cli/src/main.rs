//! Entrypoint for CLI
use std::{env, error::Error, fs, time::Instant};

use log::{debug, error, info};
use pascalite::{constants::Word, lex::Lexer, prelude::*, IMPL_VERSION};
use serde::Deserialize;

static USAGE: &str = r#"
usage: pascalite [--conf FILE.yaml] CMD FILE [INPUTS...]

commands:
    lex     Print the tokens of the target source file
    build   Compile the target source file and print the MEPA listing
    run     Compile and execute the target source file, reading INPUTS

examples:
    pascalite lex factorial.pas
    pascalite build factorial.pas
    pascalite run factorial.pas 5
    pascalite --conf pascalite.yaml run factorial.pas 5
"#;

/// Contents of the `--conf` file. Every field is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Conf {
    compile: CompileConf,
    vm: MepaConf,
}

fn load_conf(filepath: Option<&str>) -> PascalResult<Conf> {
    match filepath {
        Some(filepath) => {
            let text = fs::read_to_string(filepath)?;
            serde_yaml::from_str(&text)
                .map_err(|err| PascalError::Conf(format!("{filepath}: {err}")))
        }
        None => Ok(Conf::default()),
    }
}

fn read_source(filepath: &str) -> PascalResult<String> {
    let file_bytes = fs::read(filepath)?;
    let source_code = String::from_utf8(file_bytes)?;
    Ok(source_code)
}

fn run_lexer(filepath: &str, conf: &Conf) -> PascalResult<()> {
    let source_code = read_source(filepath)?;
    let lexer = Lexer::with_ident_limit(source_code.as_str(), conf.compile.max_ident_len);

    let mut listing = String::new();
    pascalite::lex::write_tokens(lexer, &mut listing)?;
    print!("{listing}");

    Ok(())
}

/// Compile, logging every diagnostic.
fn build(filepath: &str, conf: &CompileConf) -> PascalResult<Code> {
    info!("compiling {filepath}");

    let source_code = read_source(filepath)?;
    let compilation = compile(source_code.as_str(), conf);

    for diagnostic in &compilation.diagnostics {
        error!("{filepath}:{diagnostic}");
    }
    info!(
        "{} instruction(s), {} variable(s)",
        compilation.code.len(),
        compilation.var_count()
    );
    debug!("variables:\n{}", compilation.symbols);

    compilation.into_result()
}

fn run_build(filepath: &str, conf: &Conf) -> PascalResult<()> {
    let code = build(filepath, &conf.compile)?;
    for (addr, instr) in code.iter().enumerate() {
        println!("{addr:4}  {instr}");
    }
    Ok(())
}

fn run_program(filepath: &str, inputs: Vec<Word>, conf: &Conf) -> PascalResult<()> {
    conf.compile.check_runnable()?;
    let code = build(filepath, &conf.compile)?;

    let mut vm = MepaVm::new(conf.vm.clone());
    vm.load_code(&code);
    vm.push_input(inputs);

    let start = Instant::now();
    let result = vm.execute();
    let end = Instant::now();

    for value in vm.output() {
        println!("{value}");
    }
    info!(
        "time taken: {}ms",
        end.duration_since(start).as_nanos() as f64 / 1000000.0
    ); // to millis

    result?;

    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    simple_logger::SimpleLogger::new().env().init()?;

    let args = match parse_args() {
        Some(args) => args,
        None => {
            print_usage();
            // FreeBSD EX_USAGE (64)
            std::process::exit(64)
        }
    };

    let conf = load_conf(args.conf.as_deref())?;

    match args.cmd {
        Cmd::Lex { filepath } => run_lexer(&filepath, &conf)?,
        Cmd::Build { filepath } => run_build(&filepath, &conf)?,
        Cmd::Run { filepath, inputs } => run_program(&filepath, inputs, &conf)?,
    }

    Ok(())
}

fn parse_args() -> Option<Args> {
    let mut args = env::args().skip(1).peekable();

    let conf = if args.peek().map(String::as_str) == Some("--conf") {
        args.next();
        Some(consume_arg(&mut args)?)
    } else {
        None
    };

    let cmd = match consume_arg(&mut args)?.as_str() {
        "lex" => Cmd::Lex {
            filepath: consume_arg(&mut args)?,
        },
        "build" => Cmd::Build {
            filepath: consume_arg(&mut args)?,
        },
        "run" => Cmd::Run {
            filepath: consume_arg(&mut args)?,
            inputs: args.map(|arg| arg.parse::<Word>().ok()).collect::<Option<Vec<_>>>()?,
        },
        _ => return None,
    };

    Some(Args { conf, cmd })
}

/// Consumes the next argument. `None` makes the caller print the usage text.
fn consume_arg(args: &mut impl Iterator<Item = String>) -> Option<String> {
    args.next()
}

fn print_usage() {
    println!("PascalLite v{IMPL_VERSION}");
    println!("{USAGE}");
}

struct Args {
    /// Path of the YAML configuration file.
    conf: Option<String>,
    cmd: Cmd,
}

enum Cmd {
    /// Print tokens
    Lex { filepath: String },
    /// Print MEPA listing
    Build { filepath: String },
    /// Compile and execute
    Run { filepath: String, inputs: Vec<Word> },
}
