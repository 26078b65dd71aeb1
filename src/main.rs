use std::{
    io::{self, Write},
    path::PathBuf,
    process::ExitCode,
};

use clap::{Args, Parser as ClapParser, Subcommand};
use cfgcmd::{
    Error, Kind, Options, OutputFormat, ParseOptions,
    cli::{self, ValueSource, WriteOptions, io::is_stdin},
    config::DEFAULT_MAX_DEPTH,
    error::exit,
};

#[derive(ClapParser)]
#[command(name = "cfgcmd")]
#[command(about = "cfgcmd - query and edit JSON/YAML configuration documents from the shell")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the values selected by each PATH[|command...]
    Get {
        #[command(flatten)]
        common: CommonArgs,

        /// Paths with optional command chains, e.g. '.servers|each|.name'
        requests: Vec<String>,
    },

    /// Replace or insert the value at PATH
    Set {
        #[command(flatten)]
        common: CommonArgs,

        #[command(flatten)]
        edit: EditArgs,

        /// Required kind of the new value (int, float, string, bool, time, ...)
        #[arg(short = 't', long = "type", value_name = "KIND")]
        kind: Option<String>,

        path: Option<String>,

        /// New value; read from --input or stdin when omitted
        value: Option<String>,
    },

    /// Merge a value into the node at PATH
    Merge {
        #[command(flatten)]
        common: CommonArgs,

        #[command(flatten)]
        edit: EditArgs,

        path: Option<String>,

        /// Value to merge; read from --input or stdin when omitted
        value: Option<String>,
    },

    /// Remove the nodes at each PATH
    Remove {
        #[command(flatten)]
        common: CommonArgs,

        #[command(flatten)]
        edit: EditArgs,

        paths: Vec<String>,
    },

    /// Print a structural listing of the document
    Dump {
        #[command(flatten)]
        common: CommonArgs,
    },
}

#[derive(Args)]
#[group(required = false, multiple = false)]
struct FormatArgs {
    /// Output compact JSON
    #[arg(short = 'c', long = "cjson")]
    cjson: bool,

    /// Output pretty JSON
    #[arg(short = 'j', long)]
    json: bool,

    /// Output canonical config text
    #[arg(short = 'u', long = "ucl")]
    config: bool,

    /// Output YAML
    #[arg(short = 'y', long)]
    yaml: bool,

    /// Output MessagePack
    #[arg(short = 'm', long)]
    msgpack: bool,
}

impl FormatArgs {
    fn selected(&self) -> Option<OutputFormat> {
        [
            (self.cjson, OutputFormat::JsonCompact),
            (self.json, OutputFormat::Json),
            (self.config, OutputFormat::Config),
            (self.yaml, OutputFormat::Yaml),
            (self.msgpack, OutputFormat::Msgpack),
        ]
        .into_iter()
        .find_map(|(on, format)| on.then_some(format))
    }
}

#[derive(Args)]
struct CommonArgs {
    #[command(flatten)]
    format: FormatArgs,

    /// Debug verbosity, e.g. -d or --debug=2 (RUST_LOG overrides)
    #[arg(
        short = 'd',
        long,
        value_name = "LEVEL",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "1"
    )]
    debug: Option<u8>,

    /// Path delimiter
    #[arg(short = 'D', long, default_value_t = '.')]
    delimiter: char,

    /// Let recurse print _length and _keys fields
    #[arg(short = 'e', long)]
    expand: bool,

    /// Document to read; '-' or omitted reads stdin
    #[arg(short = 'f', long, value_name = "FILE")]
    file: Option<PathBuf>,

    /// Lowercase all keys while parsing
    #[arg(short = 'I', long)]
    foldcase: bool,

    /// Prefix values with their path
    #[arg(short = 'k', long)]
    keys: bool,

    /// Print paths with '_' so they work as shell variable names
    #[arg(short = 'l', long)]
    shellvars: bool,

    /// Separate values with spaces instead of newlines
    #[arg(short = 'N', long)]
    nonewline: bool,

    /// Print strings without quotes
    #[arg(short = 'q', long)]
    noquotes: bool,

    /// Maximum nesting depth accepted
    #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
    max_depth: usize,
}

impl CommonArgs {
    fn options(&self) -> Options {
        let mut options = Options::default()
            .with_delimiter(self.delimiter)
            .with_format(self.format.selected().unwrap_or_default());
        if self.shellvars {
            options = options.with_shellvars();
        }
        options.show_keys = self.keys;
        options.raw = self.noquotes;
        options.nonewline = self.nonewline;
        options.expand = self.expand;
        options.max_depth = self.max_depth;
        options
    }

    fn parse_options(&self) -> ParseOptions {
        ParseOptions {
            lowercase_keys: self.foldcase,
            max_depth: self.max_depth,
            ..ParseOptions::default()
        }
    }

    fn document_on_stdin(&self) -> bool {
        is_stdin(self.file.as_deref())
    }

    /// Read the document, refusing to wait on an interactive terminal.
    fn load(&self) -> Result<cfgcmd::Document, Error> {
        if self.document_on_stdin() && atty::is(atty::Stream::Stdin) {
            return Err(Error::NoInput);
        }
        cli::io::load_document(self.file.as_deref(), &self.parse_options())
    }
}

#[derive(Args)]
struct EditArgs {
    /// Read the new value from FILE ('-' for stdin)
    #[arg(short = 'i', long, value_name = "FILE")]
    input: Option<PathBuf>,

    /// Print the result instead of writing the file
    #[arg(short = 'n', long)]
    noop: bool,

    /// Write the result to FILE instead of the input file
    #[arg(short = 'o', long, value_name = "FILE")]
    output: Option<PathBuf>,
}

impl EditArgs {
    fn write_options(&self, common: &CommonArgs) -> WriteOptions {
        WriteOptions {
            document: common.file.clone(),
            output: self.output.clone(),
            format: common.format.selected(),
            noop: self.noop,
        }
    }
}

impl Commands {
    fn common(&self) -> &CommonArgs {
        match self {
            Commands::Get { common, .. }
            | Commands::Set { common, .. }
            | Commands::Merge { common, .. }
            | Commands::Remove { common, .. }
            | Commands::Dump { common } => common,
        }
    }
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return ExitCode::from(if e.use_stderr() {
                exit::USAGE
            } else {
                exit::SUCCESS
            });
        }
    };

    init_logging(cli.command.common().debug);

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(e.exit_code())
        }
    }
}

fn init_logging(debug: Option<u8>) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let level = match debug.unwrap_or(0) {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(io::stderr).without_time())
        .init();
}

fn run(command: Commands) -> Result<(), Error> {
    match command {
        Commands::Get { common, requests } => {
            let doc = common.load()?;
            cli::execute_get(&doc, &requests, &common.options(), io::stdout().lock())
        }
        Commands::Set {
            common,
            edit,
            kind,
            path,
            value,
        } => {
            let path = path.ok_or_else(|| Error::MissingArgument("path".to_string()))?;
            let kind = kind
                .map(|name| Kind::from_name(&name).ok_or(Error::UnknownType(name)))
                .transpose()?;
            let mut doc = common.load()?;
            let text = ValueSource::select(edit.input.clone(), value).read(common.document_on_stdin())?;
            let parse = common.parse_options();
            cli::execute_set(&mut doc, &path, &text, kind, &parse, common.delimiter)?;
            cli::write_back(&doc, &edit.write_options(&common), io::stdout().lock())
        }
        Commands::Merge {
            common,
            edit,
            path,
            value,
        } => {
            let path = path.ok_or_else(|| Error::MissingArgument("path".to_string()))?;
            let mut doc = common.load()?;
            let text = ValueSource::select(edit.input.clone(), value).read(common.document_on_stdin())?;
            let parse = common.parse_options();
            cli::execute_merge(&mut doc, &path, &text, &parse, common.delimiter)?;
            cli::write_back(&doc, &edit.write_options(&common), io::stdout().lock())
        }
        Commands::Remove {
            common,
            edit,
            paths,
        } => {
            let mut doc = common.load()?;
            let report = cli::execute_remove(&mut doc, &paths, common.delimiter)?;
            for (path, e) in &report.failures {
                eprintln!("Error: {}: {}", path, e);
            }
            cli::write_back(&doc, &edit.write_options(&common), io::stdout().lock())?;
            report.into_result()
        }
        Commands::Dump { common } => {
            let doc = common.load()?;
            let mut out = io::stdout().lock();
            cli::execute_dump(&doc, &mut out)?;
            out.flush().map_err(Error::stdout)
        }
    }
}
