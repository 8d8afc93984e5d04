// Command-line interface for cms-md
//
// This binary converts CMS content between the rich editor tree and Markdown, and lets
// you look at the trees in between.
//
// The core capabilities use the cms-babel crate; settings come from cms-config, layered from
// the built-in defaults, ./cms-md.toml and the file given with --config.
//
// Converting:
//
// The conversion needs a to and from pair. The from can be auto-detected from the file extension,
// while being overwrittable by an explicit --from flag.
// Usage:
//  cms-md <input> --to <format> [--from <format>] [--output <file>]          - Convert between formats (default)
//  cms-md convert <input> --to <format> [--from <format>] [--output <file>]  - Same as above (explicit)
//  cms-md inspect <path> [<transform>]      - Execute a transform (defaults to "mdast-treeviz")
//  cms-md check-config <path>               - Validate a CMS configuration file
//  cms-md --list-transforms                 - List available transforms
//
// Extra Parameters:
//
// Format-specific parameters can be passed using --extra-<parameter-name> <value>.
// The CLI layer strips the "extra-" prefix; known settings override the configuration, the rest
// is passed to the target format, which rejects options it does not know.
// Example:
//  cms-md post.md --to html --extra-unsafe-html false
//
// Logging:
//
// Diagnostics are written to stderr through tracing. The filter is read from CMS_MD_LOG
// (e.g. CMS_MD_LOG=debug) and defaults to "warn".

use cms_cli::transforms::{self, TransformOptions};

use clap::{Arg, ArgAction, Command, ValueHint};
use cms_babel::FormatRegistry;
use cms_config::cms::{check_config_file, CheckError};
use cms_config::{CmsMdConfig, Loader};
use std::collections::HashMap;
use std::fs;
use tracing::debug;
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "CMS_MD_LOG";

/// Parse extra-* arguments from command line args
/// Returns (cleaned_args_without_extras, extra_params_map)
///
/// Supports both:
/// - `--extra-<key> <value>` (explicit value)
/// - `--extra-<key>` (boolean flag, defaults to "true")
/// - `--extras-<key>` (alias for `--extra-<key>`)
fn parse_extra_args(args: &[String]) -> (Vec<String>, HashMap<String, String>) {
    let mut cleaned_args = Vec::new();
    let mut extra_params = HashMap::new();
    let mut i = 0;

    while i < args.len() {
        let arg = &args[i];

        let key_opt = arg
            .strip_prefix("--extra-")
            .or_else(|| arg.strip_prefix("--extras-"));

        if let Some(key) = key_opt {
            // A following non-flag argument is the value
            let has_value = args.get(i + 1).is_some_and(|next| !next.starts_with('-'));

            if has_value {
                extra_params.insert(key.to_string(), args[i + 1].clone());
                i += 2;
            } else {
                extra_params.insert(key.to_string(), "true".to_string());
                i += 1;
            }
            continue;
        }

        cleaned_args.push(arg.clone());
        i += 1;
    }

    (cleaned_args, extra_params)
}

fn build_cli() -> Command {
    Command::new("cms-md")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Convert and inspect CMS content between the rich editor tree and Markdown")
        .long_about(
            "cms-md is a command-line tool for the content of a git-backed CMS.\n\n\
            Commands:\n  \
            - convert:      Transform between document formats (markdown, json, mdast, html, treeviz)\n  \
            - inspect:      View the trees a document goes through (rich tree, schema, document AST)\n  \
            - check-config: Validate a CMS configuration file\n\n\
            Extra Parameters:\n  \
            Use --extra-<name> [value] to pass format-specific options.\n  \
            Boolean flags can omit the value (defaults to 'true').\n\n\
            Examples:\n  \
            cms-md post.md --to json                   # Markdown to rich tree JSON (stdout)\n  \
            cms-md tree.json --to markdown -o post.md  # Rich tree JSON to Markdown file\n  \
            cms-md post.md --to html                   # Preview HTML\n  \
            cms-md inspect post.md                     # Document AST tree visualization\n  \
            cms-md check-config admin/config.yml       # Validate the CMS configuration"
        )
        .arg_required_else_help(true)
        .subcommand_required(false)
        .arg(
            Arg::new("list-transforms")
                .long("list-transforms")
                .help("List available transforms")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("PATH")
                .help("Path to a cms-md.toml configuration file")
                .value_hint(ValueHint::FilePath)
                .global(true),
        )
        .subcommand(
            Command::new("inspect")
                .about("Inspect the trees behind a document")
                .long_about(
                    "View a document at different stages of the conversion.\n\n\
                    Transforms:\n  \
                    - rich-json:          Imported rich tree, before normalization\n  \
                    - schema-violations:  Schema violations of the imported rich tree\n  \
                    - normalized-json:    Rich tree after normalization\n  \
                    - mdast-json:         Document AST as JSON\n  \
                    - mdast-treeviz:      Document AST as tree visualization (default)\n\n\
                    Extra Parameters:\n  \
                    --extra-show-data        List node payloads in the tree visualization\n  \
                    --extra-void-code-block  Keep code block values in block data\n\n\
                    Examples:\n  \
                    cms-md inspect post.md                        # Tree visualization (default)\n  \
                    cms-md inspect tree.json schema-violations    # Check a stored rich tree\n  \
                    cms-md inspect post.md --extra-show-data      # Include node payloads"
                )
                .arg(
                    Arg::new("path")
                        .help("Path to a Markdown, rich JSON or document AST file")
                        .required(true)
                        .index(1)
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("transform")
                        .help("Transform to apply. Defaults to 'mdast-treeviz'")
                        .required(false)
                        .value_parser(clap::builder::PossibleValuesParser::new(
                            transforms::AVAILABLE_TRANSFORMS,
                        ))
                        .index(2)
                        .value_hint(ValueHint::Other),
                )
                .arg(
                    Arg::new("from")
                        .long("from")
                        .help("Source format (auto-detected from file extension if not specified)")
                        .value_hint(ValueHint::Other),
                ),
        )
        .subcommand(
            Command::new("convert")
                .about("Convert between document formats (default command)")
                .long_about(
                    "Convert documents between different formats.\n\n\
                    Supported formats:\n  \
                    - markdown: CommonMark Markdown (.md)\n  \
                    - json:     Rich editor tree (.json)\n  \
                    - mdast:    Document AST as JSON (.mdast)\n  \
                    - html:     Preview HTML (.html, output only)\n  \
                    - treeviz:  Document AST tree visualization (output only)\n\n\
                    The source format is auto-detected from the file extension.\n\
                    Output goes to stdout by default, or use -o to specify a file.\n\n\
                    Examples:\n  \
                    cms-md convert post.md --to json              # Markdown to rich tree\n  \
                    cms-md convert tree.json --to markdown        # Rich tree to Markdown\n  \
                    cms-md post.md --to html -o preview.html      # 'convert' is optional"
                )
                .arg(
                    Arg::new("input")
                        .help("Input file path")
                        .required(true)
                        .index(1)
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("from")
                        .long("from")
                        .help("Source format (auto-detected from file extension if not specified)")
                        .value_hint(ValueHint::Other),
                )
                .arg(
                    Arg::new("to")
                        .long("to")
                        .help("Target format (required)")
                        .long_help(
                            "Target format to convert to.\n\n\
                            Available formats: markdown, json, mdast, html, treeviz\n\
                            Use the format name, not the file extension."
                        )
                        .required(true)
                        .value_hint(ValueHint::Other),
                )
                .arg(
                    Arg::new("output")
                        .long("output")
                        .short('o')
                        .help("Output file path (defaults to stdout)")
                        .value_hint(ValueHint::FilePath),
                ),
        )
        .subcommand(
            Command::new("check-config")
                .about("Validate a CMS configuration file (YAML, TOML or JSON)")
                .long_about(
                    "Loads a CMS configuration file and checks its backend, media and\n\
                    collection settings. Every problem is reported on its own line.\n\n\
                    Examples:\n  \
                    cms-md check-config admin/config.yml"
                )
                .arg(
                    Arg::new("path")
                        .help("Path to the CMS configuration file")
                        .required(true)
                        .index(1)
                        .value_hint(ValueHint::FilePath),
                ),
        )
}

fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    init_logging();

    // Try to parse args. If no subcommand is provided, inject "convert"
    let args: Vec<String> = std::env::args().collect();

    // Parse extra-* arguments before clap processing
    let (cleaned_args, mut extra_params) = parse_extra_args(&args);

    let cli = build_cli();
    let matches = match cli.clone().try_get_matches_from(&cleaned_args) {
        Ok(m) => m,
        Err(e) => {
            // A leading file argument means the convert subcommand was left out
            if cleaned_args.len() > 1
                && !cleaned_args[1].starts_with('-')
                && !["inspect", "convert", "check-config", "help"].contains(&cleaned_args[1].as_str())
            {
                let mut new_args = vec![cleaned_args[0].clone(), "convert".to_string()];
                new_args.extend_from_slice(&cleaned_args[1..]);

                match cli.try_get_matches_from(&new_args) {
                    Ok(m) => m,
                    Err(e2) => e2.exit(),
                }
            } else {
                e.exit();
            }
        }
    };

    if matches.get_flag("list-transforms") {
        handle_list_transforms_command();
        return;
    }

    let mut config = load_cli_config(matches.get_one::<String>("config").map(|s| s.as_str()));
    apply_config_overrides(&mut config, &mut extra_params);

    match matches.subcommand() {
        Some(("inspect", sub_matches)) => {
            let Some(path) = sub_matches.get_one::<String>("path") else {
                exit_with("path is required");
            };
            let transform = sub_matches
                .get_one::<String>("transform")
                .map(|s| s.as_str())
                .unwrap_or(transforms::DEFAULT_TRANSFORM);
            let from = resolve_from(sub_matches.get_one::<String>("from"), path);
            handle_inspect_command(path, &from, transform, &config);
        }
        Some(("convert", sub_matches)) => {
            let (Some(input), Some(to)) = (
                sub_matches.get_one::<String>("input"),
                sub_matches.get_one::<String>("to"),
            ) else {
                exit_with("input and --to are required");
            };
            let from = resolve_from(sub_matches.get_one::<String>("from"), input);
            let output = sub_matches.get_one::<String>("output").map(|s| s.as_str());
            handle_convert_command(input, &from, to, output, &extra_params, &config);
        }
        Some(("check-config", sub_matches)) => {
            let Some(path) = sub_matches.get_one::<String>("path") else {
                exit_with("path is required");
            };
            handle_check_config_command(path);
        }
        _ => {
            exit_with("Unknown subcommand. Use --help for usage information.");
        }
    }
}

fn exit_with(message: &str) -> ! {
    eprintln!("Error: {message}");
    std::process::exit(1);
}

/// Explicit --from, or the format detected from the file extension.
fn resolve_from(from_arg: Option<&String>, input: &str) -> String {
    if let Some(from) = from_arg {
        return from.to_string();
    }
    match FormatRegistry::default().detect_format_from_filename(input) {
        Some(detected) => detected,
        None => {
            eprintln!("Error: Could not detect format from filename '{input}'");
            eprintln!("Please specify --from explicitly");
            std::process::exit(1);
        }
    }
}

/// Handle the inspect command
fn handle_inspect_command(path: &str, from: &str, transform: &str, config: &CmsMdConfig) {
    let source = fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("Error reading file '{path}': {e}");
        std::process::exit(1);
    });

    let options = transform_options(config);
    debug!(path, from, transform, "inspecting");
    let output = transforms::execute_transform(&source, from, transform, &options)
        .unwrap_or_else(|e| {
            eprintln!("Execution error: {e}");
            std::process::exit(1);
        });

    print!("{output}");
}

/// Handle the convert command
fn handle_convert_command(
    input: &str,
    from: &str,
    to: &str,
    output: Option<&str>,
    extra_params: &HashMap<String, String>,
    config: &CmsMdConfig,
) {
    let registry = config.format_registry().unwrap_or_else(|e| {
        eprintln!("Configuration error: {e}");
        std::process::exit(1);
    });

    // Validate formats exist
    if let Err(e) = registry.get(from) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
    if let Err(e) = registry.get(to) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }

    let source = fs::read_to_string(input).unwrap_or_else(|e| {
        eprintln!("Error reading file '{input}': {e}");
        std::process::exit(1);
    });

    let doc = registry.parse(&source, from).unwrap_or_else(|e| {
        eprintln!("Parse error: {e}");
        std::process::exit(1);
    });

    // Remaining --extra-* parameters go to the target format
    let result = registry
        .serialize_with_options(&doc, to, extra_params)
        .unwrap_or_else(|e| {
            eprintln!("Serialization error: {e}");
            std::process::exit(1);
        });

    match output {
        Some(path) => {
            fs::write(path, result).unwrap_or_else(|e| {
                eprintln!("Error writing file '{path}': {e}");
                std::process::exit(1);
            });
        }
        None => print!("{result}"),
    }
}

/// Handle the check-config command
fn handle_check_config_command(path: &str) {
    match check_config_file(path) {
        Ok(()) => println!("{path}: configuration is valid"),
        Err(CheckError::Invalid(invalid)) => {
            for message in &invalid.messages {
                eprintln!("{path}: {message}");
            }
            std::process::exit(1);
        }
        Err(err) => {
            eprintln!("Error: {err}");
            std::process::exit(1);
        }
    }
}

/// Handle the list-transforms command
fn handle_list_transforms_command() {
    println!("Available transforms:\n");
    println!("Stages:");
    println!("  rich        - Rich tree as imported (markdown, json or mdast source)");
    println!("  schema      - Schema check of the imported rich tree");
    println!("  normalized  - Rich tree after schema normalization");
    println!("  mdast       - Document AST the normalized tree serializes to\n");

    println!("Formats:");
    println!("  json        - JSON output");
    println!("  violations  - One schema violation per line");
    println!("  treeviz     - Tree visualization (document AST only)\n");

    println!("Available transform combinations:");
    for transform_name in transforms::AVAILABLE_TRANSFORMS {
        println!("  {transform_name}");
    }

    println!("\nConversion formats:");
    let registry = FormatRegistry::default();
    let mut formats = registry.list_formats();
    formats.sort();
    for format_name in formats {
        println!("  {format_name}");
    }
}

fn load_cli_config(explicit_path: Option<&str>) -> CmsMdConfig {
    let loader = Loader::new().with_optional_file("cms-md.toml");
    let loader = if let Some(path) = explicit_path {
        loader.with_file(path)
    } else {
        loader
    };

    loader.build().unwrap_or_else(|err| {
        eprintln!("Failed to load configuration: {err}");
        std::process::exit(1);
    })
}

/// Moves the --extra-* parameters that name settings into the configuration.
fn apply_config_overrides(config: &mut CmsMdConfig, extra_params: &mut HashMap<String, String>) {
    if let Some(raw) = extra_params.remove("void-code-block") {
        config.markdown.void_code_block = parse_bool_arg("void-code-block", &raw);
    }
    if let Some(raw) = take_override(extra_params, &["bullet-char", "bullet"]) {
        let mut chars = raw.chars();
        match (chars.next(), chars.next()) {
            (Some(bullet), None) => config.markdown.bullet_char = bullet,
            _ => exit_with(&format!("Invalid bullet '{raw}' for --extra-bullet-char")),
        }
    }
    if let Some(raw) = take_override(extra_params, &["unsafe-html", "unsafe"]) {
        config.preview.unsafe_html = parse_bool_arg("unsafe-html", &raw);
    }
    if let Some(raw) = take_override(extra_params, &["show-data", "data"]) {
        config.inspect.treeviz.show_data = parse_bool_arg("show-data", &raw);
    }
}

fn transform_options(config: &CmsMdConfig) -> TransformOptions {
    let components = config.component_registry().unwrap_or_else(|e| {
        eprintln!("Configuration error: {e}");
        std::process::exit(1);
    });
    TransformOptions {
        void_code_block: config.markdown.void_code_block,
        show_data: config.inspect.treeviz.show_data,
        components,
    }
}

fn take_override(map: &mut HashMap<String, String>, keys: &[&str]) -> Option<String> {
    for key in keys {
        if let Some(value) = map.remove(*key) {
            return Some(value);
        }
    }
    None
}

fn parse_bool_arg(flag: &str, raw: &str) -> bool {
    match raw.to_lowercase().as_str() {
        "true" | "1" | "yes" | "y" => true,
        "false" | "0" | "no" | "n" => false,
        other => {
            eprintln!("Invalid boolean value '{other}' for --extra-{flag}");
            std::process::exit(1);
        }
    }
}
