//! `rsm` command-line interface
//!
//! Builds a scenario model from flags or a configuration file and prints
//! listings, single scenarios, extractions and index lookups.

#![warn(missing_docs)]

use anyhow::{bail, Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use rsm_core::ScenarioEntry;
use rsm_model::{ModelConfig, ScenarioModel};
use rsm_strategy::MAX_SAMPLES;
use std::fmt::Write as _;
use std::path::PathBuf;

/// Build the command definition
#[must_use]
pub fn build_cli() -> Command {
    Command::new("rsm")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Robust scenario model: enumerate, inspect and extract uncertainty scenarios")
        .subcommand_required(true)
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("Model configuration file (.toml or .json)"),
        )
        .arg(
            Arg::new("model")
                .long("model")
                .short('m')
                .global(true)
                .help("Policy name or alias (nominal, worst_case, random, importance)"),
        )
        .arg(
            Arg::new("phases")
                .long("phases")
                .global(true)
                .value_parser(value_parser!(usize))
                .help("Number of CT phases in the anatomy"),
        )
        .arg(
            Arg::new("seed")
                .long("seed")
                .global(true)
                .value_parser(value_parser!(u64))
                .help("Random seed for reproducible sampling"),
        )
        .arg(
            Arg::new("samples")
                .long("samples")
                .global(true)
                .value_parser(value_parser!(u64).range(1..=MAX_SAMPLES as u64))
                .help("Samples per CT phase for random sampling"),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Enable debug logging"),
        )
        .subcommand(
            Command::new("list")
                .about("List all scenarios")
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Output as JSON"),
                ),
        )
        .subcommand(
            Command::new("show")
                .about("Show one scenario")
                .arg(scenario_arg()),
        )
        .subcommand(
            Command::new("extract")
                .about("Extract one scenario as a standalone model")
                .arg(scenario_arg())
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Output as JSON"),
                ),
        )
        .subcommand(
            Command::new("lookup")
                .about("Find the scenario at a 0-based (ct, shift, range) subscript")
                .arg(index_arg("ct", "CT phase index"))
                .arg(index_arg("shift", "Shift scenario index"))
                .arg(index_arg("range", "Range scenario index")),
        )
}

fn scenario_arg() -> Arg {
    Arg::new("scenario")
        .long("scenario")
        .short('n')
        .required(true)
        .value_parser(value_parser!(usize))
        .help("1-based scenario number")
}

fn index_arg(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name)
        .long(name)
        .default_value("0")
        .value_parser(value_parser!(usize))
        .help(help)
}

/// Check whether `-v` was given
#[must_use]
pub fn verbose(matches: &ArgMatches) -> bool {
    matches.get_flag("verbose")
}

/// Assemble the model configuration from `--config` and flag overrides
///
/// # Errors
/// Fails if the configuration file cannot be loaded
pub fn model_config(matches: &ArgMatches) -> Result<ModelConfig> {
    let mut config = match matches.get_one::<PathBuf>("config") {
        Some(path) => ModelConfig::from_path(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => ModelConfig::default(),
    };

    if let Some(model) = matches.get_one::<String>("model") {
        config.model.clone_from(model);
    }
    if let Some(phases) = matches.get_one::<usize>("phases") {
        config.available_ct_phases = *phases;
    }
    if let Some(seed) = matches.get_one::<u64>("seed") {
        config.random.seed = Some(*seed);
    }
    if let Some(samples) = matches.get_one::<u64>("samples") {
        config.random.samples = usize::try_from(*samples)?;
    }
    Ok(config)
}

/// Execute the selected subcommand and return its output
///
/// # Errors
/// Fails on configuration, enumeration or lookup errors
pub fn run(matches: &ArgMatches) -> Result<String> {
    let config = model_config(matches)?;
    let model = config.build().context("building scenario model")?;
    tracing::debug!(model = %config.model, scenarios = model.total_scenarios(), "model ready");

    match matches.subcommand() {
        Some(("list", args)) => {
            if args.get_flag("json") {
                Ok(serde_json::to_string_pretty(&model)?)
            } else {
                Ok(model.list_scenarios())
            }
        }
        Some(("show", args)) => {
            let number = *args.get_one::<usize>("scenario").context("missing --scenario")?;
            let entry = model.scenario(number)?;
            let subscript = model.index_space().subscript_of(number)?;
            Ok(format!(
                "Scenario {number} of {} at subscript {subscript}\n{}",
                model.total_scenarios(),
                describe(entry)
            ))
        }
        Some(("extract", args)) => {
            let number = *args.get_one::<usize>("scenario").context("missing --scenario")?;
            let single = model.extract_single_scenario(number)?;
            if args.get_flag("json") {
                return Ok(serde_json::to_string_pretty(&single)?);
            }
            let mask: Vec<u8> = single.scenario_mask().iter().map(|m| u8::from(*m)).collect();
            let mut out = single.list_scenarios();
            writeln!(out, "mask: {mask:?}")?;
            Ok(out)
        }
        Some(("lookup", args)) => {
            let get = |name: &str| args.get_one::<usize>(name).copied().unwrap_or(0);
            let (ct, shift, range) = (get("ct"), get("shift"), get("range"));
            let linear = model.subscript_to_scenario_index(ct, shift, range)?;
            let number = model.scenario_number(linear)?;
            let entry = model.scenario(number)?;
            Ok(format!(
                "Linear index {linear} is scenario {number}\n{}",
                describe(entry)
            ))
        }
        Some((other, _)) => bail!("unknown subcommand `{other}`"),
        None => bail!("no subcommand given"),
    }
}

fn describe(entry: &ScenarioEntry) -> String {
    let [x, y, z] = entry.iso_shift;
    format!(
        "  CT phase:    {}\n  Shift (mm):  [{x:.3}, {y:.3}, {z:.3}]\n  Range abs:   {:.3} mm\n  Range rel:   {:.3} %\n  Probability: {:.6}\n  Weight:      {:.6}",
        entry.ct_phase,
        entry.abs_range_shift,
        entry.rel_range_shift,
        entry.probability,
        entry.weight
    )
}

/// Build a model straight from command-line style arguments
///
/// # Errors
/// Same as [`run`]
pub fn model_from_args<I, T>(args: I) -> Result<ScenarioModel>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let matches = build_cli().try_get_matches_from(args)?;
    Ok(model_config(&matches)?.build()?)
}
