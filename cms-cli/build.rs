use clap::{Arg, ArgAction, Command, ValueHint};
use clap_complete::{generate_to, shells::*};
use std::env;
use std::io::Error;

// Mirror of the transforms from src/transforms.rs
// We need to duplicate this here since build scripts can't access src/ modules
const AVAILABLE_TRANSFORMS: &[&str] = &[
    "rich-json",
    "normalized-json",
    "schema-violations",
    "mdast-json",
    "mdast-treeviz",
];

const FORMATS: &[&str] = &["markdown", "json", "mdast", "html", "treeviz"];

fn main() -> Result<(), Error> {
    let outdir = match env::var_os("OUT_DIR") {
        None => return Ok(()),
        Some(outdir) => outdir,
    };

    let mut cmd = Command::new("cms-md")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Convert and inspect CMS content between the rich editor tree and Markdown")
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .value_hint(ValueHint::FilePath)
                .global(true),
        )
        .arg(
            Arg::new("list-transforms")
                .long("list-transforms")
                .help("List available transforms")
                .action(ArgAction::SetTrue),
        )
        .subcommand(
            Command::new("inspect")
                .arg(
                    Arg::new("path")
                        .help("Path to a Markdown, rich JSON or document AST file")
                        .required(true)
                        .index(1)
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("transform")
                        .help("Transform to apply")
                        .value_parser(clap::builder::PossibleValuesParser::new(
                            AVAILABLE_TRANSFORMS,
                        ))
                        .index(2)
                        .value_hint(ValueHint::Other),
                ),
        )
        .subcommand(
            Command::new("convert")
                .arg(
                    Arg::new("input")
                        .required(true)
                        .index(1)
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("from")
                        .long("from")
                        .value_parser(clap::builder::PossibleValuesParser::new(FORMATS)),
                )
                .arg(
                    Arg::new("to")
                        .long("to")
                        .value_parser(clap::builder::PossibleValuesParser::new(FORMATS)),
                )
                .arg(
                    Arg::new("output")
                        .long("output")
                        .short('o')
                        .value_hint(ValueHint::FilePath),
                ),
        )
        .subcommand(
            Command::new("check-config").arg(
                Arg::new("path")
                    .required(true)
                    .index(1)
                    .value_hint(ValueHint::FilePath),
            ),
        );

    // Generate completions for bash
    generate_to(Bash, &mut cmd, "cms-md", &outdir)?;

    // Generate completions for zsh
    generate_to(Zsh, &mut cmd, "cms-md", &outdir)?;

    // Generate completions for fish
    generate_to(Fish, &mut cmd, "cms-md", &outdir)?;

    println!("cargo:warning=Shell completions generated in {outdir:?}");

    Ok(())
}
