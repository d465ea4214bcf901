mod config;
mod test_runner;

use std::path::{Path, PathBuf};
use std::process;

use clap::{ArgAction, Parser, Subcommand};
use codespan_reporting::files::SimpleFiles;
use codespan_reporting::term;
use codespan_reporting::term::termcolor::{ColorChoice, StandardStream};
use serde::{Deserialize, Serialize};

use validator::{AnnotationSink, Annotations, Page, Settings, Status};
use wrapper_tags::attributes::{RawTag, normalize};
use wrapper_tags::block::Block;
use wrapper_tags::source::Loader;
use wrapper_tags::tag::TagToken;

const SUBCOMMANDS: &[&str] = &["check", "normalize", "test", "help"];

#[derive(Parser)]
#[command(name = "wrapper-tags", version, about = "Wrapper tags pairing validator")]
struct Cli {
    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// More log output (-v debug, -vv trace). RUST_LOG takes precedence.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Settings file (TOML). Defaults apply when absent.
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Validate a block sequence and print its indentation
    Check(CheckArgs),

    /// Clean the tag definitions of a group element
    Normalize(NormalizeArgs),

    /// Run .test.toml fixture files
    Test(TestArgs),
}

#[derive(clap::Args)]
struct CheckArgs {
    /// Fixture file with the blocks of one scope
    file: String,

    /// First row of the page to show
    #[arg(long, default_value_t = 0)]
    offset: usize,

    /// Rows per page (all rows when omitted)
    #[arg(long)]
    page_size: Option<usize>,
}

#[derive(clap::Args)]
struct NormalizeArgs {
    /// TOML file with [[tags]] definitions
    file: String,
}

#[derive(clap::Args)]
struct TestArgs {
    /// Path to a .test.toml file or a directory containing them
    path: String,

    /// Run only tests in these categories (subfolder names). Repeatable.
    #[arg(short, long)]
    category: Vec<String>,

    /// List available categories and exit
    #[arg(long)]
    list_categories: bool,
}

fn main() {
    // `wrapper-tags blocks.toml` is short for `wrapper-tags check blocks.toml`.
    let mut args: Vec<String> = std::env::args().collect();
    if let Some(pos) = first_positional(&args) {
        if !SUBCOMMANDS.contains(&args[pos].as_str()) {
            args.insert(pos, "check".to_string());
        }
    }

    let cli = Cli::parse_from(&args);
    init_logging(cli.verbose);

    let settings = match config::load_settings(cli.settings.as_deref()) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("error: {}", e);
            process::exit(1);
        }
    };

    let exit_code = match cli.command {
        Command::Check(args) => do_check(args, &settings, cli.no_color),
        Command::Normalize(args) => do_normalize(args, &settings),
        Command::Test(args) => {
            let path = Path::new(&args.path);
            if args.list_categories {
                test_runner::list_categories(path);
                0
            } else {
                test_runner::run_tests(path, &settings, cli.no_color, &args.category)
            }
        }
    };
    process::exit(exit_code);
}

/// Index of the first argument that is neither a flag nor the value of `--settings`.
fn first_positional(args: &[String]) -> Option<usize> {
    let mut skip_next = false;
    for (i, arg) in args.iter().enumerate().skip(1) {
        if skip_next {
            skip_next = false;
            continue;
        }
        if arg == "--settings" {
            skip_next = true;
        } else if !arg.starts_with('-') {
            return Some(i);
        }
    }
    None
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn color_choice(no_color: bool) -> ColorChoice {
    if no_color {
        ColorChoice::Never
    } else {
        ColorChoice::Auto
    }
}

/// Prints the rows of the list view as the annotations arrive.
struct ConsoleSink<'a> {
    blocks: &'a [Block],
    status: Option<Status>,
}

impl AnnotationSink for ConsoleSink<'_> {
    fn status(&mut self, status: Option<&Status>) {
        self.status = status.cloned();
    }

    fn annotations(&mut self, annotations: &Annotations) {
        if let Some(leading) = &annotations.leading {
            println!("first row: {}", leading.css_class());
        }
        for (id, indent) in &annotations.rows {
            let Some(block) = self.blocks.iter().find(|b| b.id == *id) else {
                continue;
            };
            let headline = block.preview();
            let headline = headline.lines().next().unwrap_or_default();
            let hidden = if block.visible { "" } else { " (hidden)" };
            println!(
                "{:>6}  {:<16} {:<60} {}{}",
                id,
                block.element,
                indent.css_class(),
                headline,
                hidden
            );
        }
    }
}

fn do_check(args: CheckArgs, settings: &Settings, no_color: bool) -> i32 {
    let source = match std::fs::read_to_string(&args.file) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: cannot read '{}': {}", args.file, e);
            return 1;
        }
    };

    let mut files = SimpleFiles::new();
    let file_id = files.add(args.file.clone(), source.clone());
    let writer = StandardStream::stderr(color_choice(no_color));
    let term_config = term::Config::default();

    let settings = match config::for_fixture(settings, &source) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("error: {}: {}", args.file, e);
            return 1;
        }
    };

    let loader = Loader::new(&source, file_id).with_registry(settings.registry());
    let fixture = match loader.load() {
        Ok(fixture) => fixture,
        Err(errors) => {
            for error in &errors {
                let diagnostic = error.to_diagnostic();
                let _ = term::emit_to_write_style(&mut writer.lock(), &term_config, &files, &diagnostic);
            }
            return 1;
        }
    };

    let page = (args.offset > 0 || args.page_size.is_some())
        .then(|| Page::new(args.offset, args.page_size.unwrap_or(0)));

    let mut sink = ConsoleSink {
        blocks: fixture.blocks(),
        status: None,
    };
    let scope = fixture.sequence.scope.clone();
    let report = match validator::check_scope(&fixture, &scope, &settings, page, &mut sink) {
        Ok(report) => report,
        Err(never) => match never {},
    };

    match sink.status {
        Some(Status::Ok) => {
            eprintln!("ok: {}", Status::Ok);
            0
        }
        Some(Status::Fault(fault)) => {
            let diagnostic = fault.to_diagnostic(file_id, |id| fixture.span_of(id));
            let _ = term::emit_to_write_style(&mut writer.lock(), &term_config, &files, &diagnostic);
            1
        }
        None => {
            if settings.hide_validation_status {
                log::info!("status hidden ({})", report.validation.status);
            }
            0
        }
    }
}

#[derive(Deserialize)]
struct RawTagFile {
    #[serde(default)]
    tags: Vec<RawTag>,
}

#[derive(Serialize)]
struct TagFile {
    tags: Vec<TagToken>,
}

fn do_normalize(args: NormalizeArgs, settings: &Settings) -> i32 {
    let source = match std::fs::read_to_string(&args.file) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: cannot read '{}': {}", args.file, e);
            return 1;
        }
    };

    let raw: RawTagFile = match toml::from_str(&source) {
        Ok(raw) => raw,
        Err(e) => {
            eprintln!("error: {}: {}", args.file, e);
            return 1;
        }
    };

    let tags = match normalize(raw.tags) {
        Ok(tags) => tags,
        Err(e) => {
            eprintln!("error: {}", e);
            return 1;
        }
    };
    if let Err(e) = settings.vocabulary().check(&tags) {
        eprintln!("error: {}", e);
        return 1;
    }

    match toml::to_string_pretty(&TagFile { tags }) {
        Ok(out) => {
            print!("{}", out);
            0
        }
        Err(e) => {
            eprintln!("error: {}", e);
            1
        }
    }
}
