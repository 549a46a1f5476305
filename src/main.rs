//! Command-line interface for marcnorm.
//!
//! Repairs and cleans internationalisation issues in MARC21 records:
//!
//! ```text
//! marcnorm --input records.mrc --modes mrc mrk --cyrillic True
//! ```
//!
//! Flags override the configuration document key-by-key; `--options`
//! replaces the packaged default document in full.

use anyhow::Context;
use clap::{Arg, ArgAction, Command};
use marcnorm::config::{self, BaseConfig, Overrides};
use marcnorm::{emit, pipeline};
use std::path::PathBuf;

fn main() {
    if let Err(e) = run() {
        eprintln!("marcnorm: {e:#}");
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let matches = Command::new("marcnorm")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Repair and clean internationalisation issues in MARC21 records")
        .arg(
            Arg::new("input")
                .long("input")
                .short('i')
                .required(true)
                .value_parser(clap::value_parser!(PathBuf))
                .help("MARC file to be normalised and cleaned (MARC-8 or UTF-8 encoded)"),
        )
        .arg(
            Arg::new("options")
                .long("options")
                .short('o')
                .value_parser(clap::value_parser!(PathBuf))
                .help("Custom configuration file, replacing the packaged default"),
        )
        .arg(
            Arg::new("exlibris_voyager_smp")
                .long("exlibris_voyager_smp")
                .short('e')
                .num_args(1..)
                .help("Space separated lowercase ISO 15924 codes of SMP scripts to repair"),
        )
        .arg(
            Arg::new("normalisation")
                .long("normalisation")
                .short('n')
                .value_parser(["NFC", "NFD", "NFM21"])
                .help("Unicode normalisation form to apply"),
        )
        .arg(
            Arg::new("cyrillic")
                .long("cyrillic")
                .short('c')
                .value_parser(["True", "False"])
                .help("Fold half-mark diacritics to the double diacritic"),
        )
        .arg(
            Arg::new("thailao")
                .long("thailao")
                .short('t')
                .value_parser(["1997", "2011", "None"])
                .help("Thai/Lao romanisation interpretation; None turns it off"),
        )
        .arg(
            Arg::new("fields")
                .long("fields")
                .short('f')
                .num_args(1..)
                .help("Field tags to process and clean"),
        )
        .arg(
            Arg::new("script_fields")
                .long("script_fields")
                .short('s')
                .num_args(1..)
                .help("Field tags where native script strings occur"),
        )
        .arg(
            Arg::new("modes")
                .long("modes")
                .short('m')
                .num_args(1..)
                .help("Output formats: mrc, mrk, marcxml, rdf (default: mrc)"),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .action(ArgAction::SetTrue)
                .help("Print the resolved settings before processing"),
        )
        .get_matches();

    let input: &PathBuf = matches.get_one("input").expect("input is required");
    let verbose = matches.get_flag("verbose");

    let modes: Vec<String> = matches
        .get_many::<String>("modes")
        .map_or_else(|| vec!["mrc".to_string()], |v| v.cloned().collect());

    let overrides = Overrides {
        normalisation: matches.get_one::<String>("normalisation").cloned(),
        cyrillic: matches.get_one::<String>("cyrillic").cloned(),
        thai_lao: matches.get_one::<String>("thailao").cloned(),
        fields: matches
            .get_many::<String>("fields")
            .map(|v| v.cloned().collect()),
        native_fields: matches
            .get_many::<String>("script_fields")
            .map(|v| v.cloned().collect()),
        repair_scripts: matches
            .get_many::<String>("exlibris_voyager_smp")
            .map_or_else(Vec::new, |v| v.map(|s| s.to_lowercase()).collect()),
    };

    let base = match matches.get_one::<PathBuf>("options") {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("cannot read configuration file {}", path.display()))?;
            BaseConfig::from_json(&json)?
        },
        None => BaseConfig::from_json(config::DEFAULT_CONFIG)?,
    };

    let settings = config::resolve(&base, &overrides)?;

    if verbose {
        println!("Settings:");
        println!("Normalisation form: {}", settings.normalization);
        println!("Cyrillic corrections: {}", settings.cyrillic);
        println!("Thai/Lao corrections: {}", settings.thai_lao);
        println!(
            "Required fields: {:?}",
            settings.target_fields.iter().collect::<Vec<_>>()
        );
        println!(
            "Native script fields: {:?}",
            settings.native_fields.iter().collect::<Vec<_>>()
        );
    }

    let records = pipeline::process_file(input, &settings, verbose)?;
    emit::emit_all(&records, &modes, input)?;

    Ok(())
}
