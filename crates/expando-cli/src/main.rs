use clap::{Parser, Subcommand, ValueEnum};
use expando_codegen::{SyntaxType, TextInput, UserConfig};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "expando")]
#[command(about = "Expand markup and stylesheet abbreviations")]
#[command(version)]
struct Cli {
    /// Log resolution steps to stderr
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Expand an abbreviation and print the result
    Expand {
        abbreviation: String,
        #[command(flatten)]
        target: Target,
        /// Text to wrap; repeat for one line per repeated element
        #[arg(long)]
        text: Vec<String>,
        /// JSON file with expansion options
        #[arg(long)]
        options: Option<String>,
    },

    /// Check an abbreviation for syntax errors without expanding it
    Check {
        abbreviation: String,
        #[command(flatten)]
        target: Target,
    },
}

#[derive(clap::Args)]
struct Target {
    /// Output syntax: html, xhtml, jsx, haml, pug, slim, css, scss, stylus...
    #[arg(long)]
    syntax: Option<String>,
    /// Abbreviation type; inferred from the syntax when omitted
    #[arg(long = "type", value_enum)]
    kind: Option<Kind>,
}

#[derive(Clone, Copy, ValueEnum)]
enum Kind {
    Markup,
    Stylesheet,
}

impl Target {
    fn apply(self, config: &mut UserConfig) {
        if let Some(syntax) = self.syntax {
            config.syntax = Some(syntax);
        }
        if let Some(kind) = self.kind {
            config.kind = Some(match kind {
                Kind::Markup => SyntaxType::Markup,
                Kind::Stylesheet => SyntaxType::Stylesheet,
            });
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Expand {
            abbreviation,
            target,
            text,
            options,
        } => cmd_expand(&abbreviation, target, text, options.as_deref()),
        Command::Check {
            abbreviation,
            target,
        } => cmd_check(&abbreviation, target),
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn read_options(path: &str) -> UserConfig {
    let source = match std::fs::read_to_string(path) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("Error reading {path}: {e}");
            std::process::exit(1);
        }
    };
    match serde_json::from_str(&source) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid options in {path}: {e}");
            std::process::exit(1);
        }
    }
}

fn cmd_expand(abbreviation: &str, target: Target, text: Vec<String>, options: Option<&str>) {
    let mut config = options.map(read_options).unwrap_or_default();
    target.apply(&mut config);
    match text.len() {
        0 => {}
        1 => config.text = text.into_iter().next().map(TextInput::Single),
        _ => config.text = Some(TextInput::Lines(text)),
    }
    tracing::debug!(abbreviation, syntax = ?config.syntax, "expanding");

    match expando_codegen::expand(abbreviation, &config) {
        Ok(output) => println!("{output}"),
        Err(e) => {
            eprintln!("Error: {e}\n{}", e.ruler());
            std::process::exit(1);
        }
    }
}

fn cmd_check(abbreviation: &str, target: Target) {
    let mut user = UserConfig::default();
    target.apply(&mut user);
    let config = expando_codegen::resolve_config(&user);

    let result = if config.is_markup() {
        expando_codegen::parse_markup(abbreviation, &config).map(|_| ())
    } else {
        expando_codegen::parse_stylesheet(abbreviation, &config).map(|_| ())
    };

    if let Err(e) = result {
        eprintln!("Error: {e}\n{}", e.ruler());
        std::process::exit(1);
    }
    println!("OK");
}
