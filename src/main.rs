use std::{
    error::Error as StdError,
    fs,
    io::{BufWriter, Write, stdout},
    path::{Path, PathBuf},
    process::ExitCode,
};

use anstream::stderr;
use anstyle::{AnsiColor, Color, Style};
use ariadne::Source;
use clap::{ArgAction, CommandFactory, Parser, Subcommand, ValueHint};
use clap_complete::{Generator, Shell};
use servidl::{
    Error, GeneratorConfig, IdlGenerator, MetadataResolver, ResolvedMetadata, SourceResolver,
    error::ResultExt,
};
use tracing::debug;
use tracing_subscriber::{EnvFilter, prelude::*};

/// A tool for generating canonical IDL from service descriptions
#[derive(Parser, Debug)]
#[command(version)]
struct Args {
    /// Log more details to standard error, may be repeated
    ///
    /// RUST_LOG takes precedence when it is set.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check if a description file is syntactically and semantically well-formed
    ///
    /// Will exit with exit code 0 if it is and with exit code 1 if it isn't.
    Check {
        /// The path to the description file
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
    },
    /// Print the names of the services declared in a description file
    Services {
        /// The path to the description file
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
    },
    /// Generate the IDL of a service
    ///
    /// The IDL is written to standard output unless an output file is given.
    /// Nothing is written if generation fails.
    Generate {
        /// The path to the description file
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        /// The service to generate, required if the file declares more than one
        #[arg(long)]
        service: Option<String>,
        /// Render the service under another name
        #[arg(short = 's', long)]
        name: Option<String>,
        /// The service the generated service extends
        #[arg(short = 'e', long)]
        extends: Option<String>,
        /// Add an include line, may be repeated
        #[arg(short = 'i', long)]
        include: Vec<String>,
        /// Add a namespace for a language, may be repeated
        #[arg(short = 'n', long, num_args = 2, value_names = ["LANG", "NAMESPACE"])]
        namespace: Vec<String>,
        /// The file to write the IDL to
        #[arg(short = 'o', long, value_hint = ValueHint::FilePath)]
        output: Option<PathBuf>,
    },
    /// Generate a tab-completion script for your shell
    Completions {
        /// The shell to target
        shell: Shell,
    },
}

mod exit_codes {
    pub const MALFORMED_FILE: u8 = 1;
    pub const _USAGE: u8 = 2; // Used by clap
    pub const IO: u8 = 3;
    pub const GENERATION: u8 = 4;
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    match args.command {
        Command::Check { file } => match load_file(&file) {
            Ok(_) => ExitCode::SUCCESS,
            Err(code) => code,
        },
        Command::Services { file } => match load_file(&file) {
            Ok(resolved) => handle_result({
                let mut out = stdout().lock();

                resolved
                    .services
                    .iter()
                    .try_for_each(|service| writeln!(out, "{}", service.name()))
                    .and_then(|()| out.flush())
                    .with_stdout()
            }),
            Err(code) => code,
        },
        Command::Generate {
            file,
            service,
            name,
            extends,
            include,
            namespace,
            output,
        } => match load_file(&file) {
            Ok(resolved) => {
                let mut config = GeneratorConfig::new();
                if let Some(name) = name {
                    config = config.set_name(name);
                }
                if let Some(extends) = extends {
                    config = config.set_extends(extends);
                }
                for include in include {
                    config = config.add_include(include);
                }
                for pair in namespace.chunks_exact(2) {
                    config = config.add_namespace(&pair[0], &pair[1]);
                }

                handle_result(generate(
                    &resolved,
                    service.as_deref(),
                    config,
                    output.as_deref(),
                ))
            }
            Err(code) => code,
        },
        Command::Completions { shell } => handle_result({
            let mut command = Args::command();
            command.set_bin_name(command.get_name().to_string());
            command.build();

            let mut file = stdout().lock();

            shell
                .try_generate(&command, &mut file)
                .and_then(|()| file.flush())
                .with_stdout()
        }),
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(filter);

    let _ = tracing_subscriber::registry().with(fmt_layer).try_init();
}

fn generate(
    resolved: &ResolvedMetadata,
    service: Option<&str>,
    config: GeneratorConfig,
    output: Option<&Path>,
) -> Result<(), Error> {
    let service = resolved.service(service)?;
    let generator = IdlGenerator::new(&resolved.catalog, service, config);

    // Rendered up front so a failure leaves no partial file behind.
    let idl = generator.generate_to_string()?;

    match output {
        Some(path) => fs::write(path, idl).with_path(path),
        None => {
            let mut out = stdout().lock();
            out.write_all(idl.as_bytes())
                .and_then(|()| out.flush())
                .with_stdout()
        }
    }
}

fn print_error<E: StdError + ?Sized>(error: &E) {
    const STYLE: Style = Style::new().fg_color(Some(Color::Ansi(AnsiColor::Red)));

    let mut stream = BufWriter::new(stderr().lock());
    let _ = writeln!(stream, "{STYLE}Error:{STYLE:#} {error}");

    let mut source = error.source();
    while let Some(cause) = source {
        let _ = writeln!(stream, "  {STYLE}Caused by:{STYLE:#} {cause}");
        source = cause.source();
    }
}

fn handle_result(result: Result<(), Error>) -> ExitCode {
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            print_error(&error);

            match error {
                Error::Io { .. } => ExitCode::from(exit_codes::IO),
                _ => ExitCode::from(exit_codes::GENERATION),
            }
        }
    }
}

/// Loads and resolves the file, printing any diagnostics
fn load_file(file: &Path) -> Result<ResolvedMetadata, ExitCode> {
    let filename = file.to_string_lossy();
    let src = fs::read_to_string(file)
        .with_path(file)
        .inspect_err(|error| print_error(error))
        .map_err(|_| ExitCode::from(exit_codes::IO))?;

    let mut resolver = SourceResolver::new(&src, &filename);
    let resolved = resolver.resolve();

    let reports = resolver.reports();
    if reports.has_any() {
        let mut stream = BufWriter::new(stderr().lock());
        let mut cache = (filename.as_ref(), Source::from(src.as_str()));

        for report in reports {
            report
                .write(&mut cache, &mut stream)
                // If writing the report failed, then printing the error will probably fail too, but might as well try
                .inspect_err(|error| print_error(error))
                .map_err(|_| ExitCode::from(exit_codes::IO))?;
        }
    }

    resolved.map_err(|error| {
        debug!(%error, "rejected description file");
        ExitCode::from(exit_codes::MALFORMED_FILE)
    })
}
