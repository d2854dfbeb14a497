use clap::{Parser, Subcommand, ValueEnum};
use color_eyre::eyre::Result;
use std::fs::read_to_string;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[clap(name = "pyrite", version)]
pub struct CLArgs {
    #[clap(subcommand)]
    pub routine: PyriteCommand,
}

#[derive(Debug, Subcommand)]
pub enum PyriteCommand {
    /// Print the token stream of a script.
    Tokenize {
        path: PathBuf,
        #[clap(long = "format", value_enum, default_value = "basic")]
        format: TokenFormat,
    },
    /// Execute a script.
    Run { path: PathBuf },
}

#[derive(Debug, Clone, ValueEnum)]
pub enum TokenFormat {
    Debug,
    Basic,
}

fn main() -> ExitCode {
    pyrite_main().expect("Encountered an error!")
}

fn pyrite_main() -> Result<ExitCode> {
    color_eyre::install().expect("Can't fail at first call!");
    let args = CLArgs::parse();
    match args.routine {
        PyriteCommand::Tokenize { path, format } => {
            let src = read_to_string(&path)?;
            let name = path.display().to_string();
            if !tokenize(&src, &name, &format) {
                return Ok(ExitCode::from(65));
            }
            Ok(ExitCode::SUCCESS)
        }
        PyriteCommand::Run { path } => {
            let src = read_to_string(&path)?;
            let name = path.display().to_string();
            Ok(run(&src, &name))
        }
    }
}

fn tokenize(src: &str, name: &str, format: &TokenFormat) -> bool {
    use pyrite::lexer::formatter::{
        BasicFormatter, DebugFormatter, ErrorReporter, TokenFormatter,
    };
    use pyrite::lexer::{Lexer, Token};

    let formatter: Box<dyn TokenFormatter> = match format {
        TokenFormat::Debug => Box::new(DebugFormatter),
        TokenFormat::Basic => Box::new(BasicFormatter),
    };
    let mut lexer = match Lexer::new(src) {
        Ok(lexer) => lexer,
        Err(error) => {
            let reporter = ErrorReporter::new(src, name);
            eprintln!("{}", reporter.report(error.line, &error.to_string()));
            return false;
        }
    };
    loop {
        let token = lexer.current_token();
        eprintln!("{}", formatter.format(token));
        if matches!(token, Token::Eof) {
            break;
        }
        lexer.next_token();
    }
    true
}

fn run(src: &str, name: &str) -> ExitCode {
    use pyrite::interpreter::context::StdioContext;
    use pyrite::interpreter::TreeWalkInterpreter;
    use pyrite::lexer::formatter::ErrorReporter;
    use pyrite::parser::Parser;

    let program = match Parser::new(src).and_then(|parser| parser.parse()) {
        Ok(program) => program,
        Err(error) => {
            let reporter = ErrorReporter::new(src, name);
            eprintln!("{}", reporter.report(error.line, &error.kind.to_string()));
            return ExitCode::from(65);
        }
    };
    match TreeWalkInterpreter::new(StdioContext).run(&program) {
        Ok(_) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("Runtime error: {error}");
            ExitCode::from(70)
        }
    }
}
