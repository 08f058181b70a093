use clap::{Args, Parser as ClapParser, Subcommand};
use serde::Deserialize;
use std::path::Path;
use tdf_json::JsonConfig;
use tdf_parser::{Document, ParseError, Parser, ParserConfig};
use tracing_subscriber::EnvFilter;

#[derive(ClapParser)]
#[command(name = "tdf")]
#[command(about = "Check TDF files and convert them to JSON")]
#[command(version)]
struct Cli {
    /// JSON file with `parser` and `json` option overrides
    #[arg(long, global = true)]
    config: Option<String>,

    /// Log parser activity to stderr (repeat for more detail)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Check a .tdf file for errors without producing output
    Check {
        /// Input .tdf file
        path: String,

        #[command(flatten)]
        parser: ParserArgs,
    },

    /// Convert a .tdf file to a JSON object
    Json {
        /// Input .tdf file
        path: String,

        #[command(flatten)]
        parser: ParserArgs,

        /// Key sections as `Name` instead of `[Name]`
        #[arg(long)]
        bare_section_names: bool,

        /// Print on one line
        #[arg(long)]
        compact: bool,
    },

    /// Print the parsed `{ fields, sections }` tree as JSON
    Tree {
        /// Input .tdf file
        path: String,

        #[command(flatten)]
        parser: ParserArgs,

        /// Print on one line
        #[arg(long)]
        compact: bool,
    },
}

#[derive(Args, Debug, Default)]
struct ParserArgs {
    /// Accept fields outside any section
    #[arg(long)]
    allow_root_fields: bool,

    /// Keep whitespace around field values
    #[arg(long)]
    no_trim: bool,

    /// Let a repeated section or field name replace the earlier one
    #[arg(long)]
    allow_overrides: bool,
}

impl ParserArgs {
    /// Flags only ever switch an option away from its default.
    fn apply(&self, mut config: ParserConfig) -> ParserConfig {
        if self.allow_root_fields {
            config.allow_root_fields = true;
        }
        if self.no_trim {
            config.auto_trim_value_string = false;
        }
        if self.allow_overrides {
            config.allow_name_overrides = true;
        }
        config
    }
}

/// Contents of the `--config` file. Both parts are optional and partial.
#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
struct ConfigFile {
    parser: ParserConfig,
    json: JsonConfig,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let file = match &cli.config {
        Some(path) => load_config(path),
        None => ConfigFile::default(),
    };

    match cli.command {
        Command::Check { path, parser } => cmd_check(&path, parser.apply(file.parser)),
        Command::Json {
            path,
            parser,
            bare_section_names,
            compact,
        } => {
            let mut json = file.json;
            if bare_section_names {
                json.use_brackets_on_section_names = false;
            }
            cmd_json(&path, parser.apply(file.parser), json, compact)
        }
        Command::Tree {
            path,
            parser,
            compact,
        } => cmd_tree(&path, parser.apply(file.parser), compact),
    }
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn load_config(path: &str) -> ConfigFile {
    let text = read_source(path);
    match parse_config(&text) {
        Ok(config) => {
            tracing::debug!(?config, "loaded config from {path}");
            config
        }
        Err(e) => {
            eprintln!("Error in config {path}: {e}");
            std::process::exit(1);
        }
    }
}

fn parse_config(text: &str) -> Result<ConfigFile, serde_json::Error> {
    serde_json::from_str(text)
}

fn read_source(path: &str) -> String {
    let p = Path::new(path);
    if !p.exists() {
        eprintln!("Error: file not found: {path}");
        std::process::exit(1);
    }
    match std::fs::read_to_string(p) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("Error reading {path}: {e}");
            std::process::exit(1);
        }
    }
}

/// `path:row:col: reason`, the shape editors and terminals link to.
fn format_parse_error(path: &str, err: &ParseError) -> String {
    format!("{path}:{}:{}: {}", err.row, err.col, err.reason())
}

fn parse_file(path: &str, config: ParserConfig) -> Document {
    let source = read_source(path);
    match Parser::parse(&source, &config) {
        Ok(doc) => doc,
        Err(e) => {
            eprintln!("{}", format_parse_error(path, &e));
            std::process::exit(1);
        }
    }
}

fn print_json<T: serde::Serialize>(value: &T, compact: bool) {
    let rendered = if compact {
        serde_json::to_string(value)
    } else {
        serde_json::to_string_pretty(value)
    };
    match rendered {
        Ok(text) => println!("{text}"),
        Err(e) => {
            eprintln!("Error writing JSON: {e}");
            std::process::exit(1);
        }
    }
}

fn cmd_check(path: &str, config: ParserConfig) {
    let doc = parse_file(path, config);
    tracing::debug!(sections = doc.allocated_sections(), "check passed");
    eprintln!("OK: {path}");
}

fn cmd_json(path: &str, parser: ParserConfig, json: JsonConfig, compact: bool) {
    let doc = parse_file(path, parser);
    let object = match tdf_json::document_to_object(&doc, &json) {
        Ok(object) => object,
        Err(e) => {
            eprintln!("{path}: {e}");
            std::process::exit(1);
        }
    };
    print_json(&object, compact);
}

fn cmd_tree(path: &str, parser: ParserConfig, compact: bool) {
    let doc = parse_file(path, parser);
    print_json(&doc, compact);
}
