use std::path::PathBuf;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use colored::Colorize;
use log::LevelFilter;
use serde_json::json;
use pulldown::{
    DecimationPhase, DeinterlacePlan, FieldRate, FrameRate, IndexedSource, NormalizeOptions,
    NormalizedSequence, RateMode,
};

const CLI_AFTER_HELP: &str = "Examples:\n  pulldown-cli inspect episode.d2v --json\n  pulldown-cli normalize episode.d2v --mode floor --offsets 0,1,3,4\n  pulldown-cli decimate 30 --cycle 5 --offsets 0,1,3,4 --inverse\n  pulldown-cli completions zsh > _pulldown-cli";

#[derive(Debug, Parser)]
#[command(
    name = "pulldown-cli",
    version,
    about = "Detect telecine cadence and normalize VFR MPEG picture indexes",
    after_help = CLI_AFTER_HELP
)]
struct Cli {
    #[command(flatten)]
    global: GlobalOptions,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Parser, Clone, Default)]
struct GlobalOptions {
    /// Show debug logging output.
    #[arg(long, global = true)]
    verbose: bool,

    /// Log level (off, error, warn, info, debug, trace). RUST_LOG takes precedence.
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Override the index frame rate (e.g. 30000/1001 or 25).
    #[arg(long, global = true)]
    fps: Option<String>,

    /// Keep fully progressive sources at their indexed rate.
    #[arg(long, global = true)]
    no_settle: bool,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print cadence and composition of an index.
    #[command(
        about = "Inspect an index",
        visible_alias = "info",
        after_help = "Examples:\n  pulldown-cli inspect episode.d2v\n  pulldown-cli inspect flags.json --fps 30000/1001 --json"
    )]
    Inspect {
        /// Index path (.d2v or .json).
        input: PathBuf,

        /// Output as machine-readable JSON.
        #[arg(long)]
        json: bool,
    },

    /// Validate an index and print a report.
    #[command(about = "Validate an index")]
    Validate {
        /// Index path (.d2v or .json).
        input: PathBuf,

        #[arg(long)]
        json: bool,
    },

    /// Normalize an index to a constant frame rate.
    #[command(
        about = "Normalize to a constant frame rate",
        after_help = "Examples:\n  pulldown-cli normalize episode.d2v --mode ceil\n  pulldown-cli normalize episode.d2v --mode floor --cycle 5 --offsets 0,1,2,3 --per-group --tags"
    )]
    Normalize {
        /// Index path (.d2v or .json).
        input: PathBuf,
        /// Rate policy: variable | ceil | floor.
        #[arg(long, default_value = "variable")]
        mode: String,
        /// Pulldown cycle for floor (defaults to the detected cycle).
        #[arg(long)]
        cycle: Option<usize>,
        /// Comma-separated cycle positions to keep for floor.
        #[arg(long)]
        offsets: Option<String>,
        /// Restart the decimation cycle at every group change.
        #[arg(long)]
        per_group: bool,
        /// Include per-frame tags in the output.
        #[arg(long)]
        tags: bool,
        /// Include a deinterlace plan at this rate factor (1 or 2).
        #[arg(long)]
        plan: Option<f64>,
        #[arg(long)]
        json: bool,
    },

    /// Select frames 0..count by cycle and offsets.
    #[command(about = "Decimate a frame range")]
    Decimate {
        /// Number of frames.
        count: usize,
        #[arg(long)]
        cycle: usize,
        /// Comma-separated cycle positions to keep.
        #[arg(long)]
        offsets: String,
        /// Print the dropped frames instead of the kept ones.
        #[arg(long)]
        inverse: bool,
    },

    /// Generate shell completion scripts.
    #[command(about = "Generate shell completions")]
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn parse_offsets(value: &str) -> Result<Vec<usize>, Box<dyn std::error::Error>> {
    value
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<usize>()
                .map_err(|_| Box::<dyn std::error::Error>::from(format!("invalid offset {part:?}")))
        })
        .collect()
}

fn parse_log_level(value: &str) -> Option<LevelFilter> {
    match value.to_ascii_lowercase().as_str() {
        "off" | "quiet" => Some(LevelFilter::Off),
        "error" => Some(LevelFilter::Error),
        "warn" | "warning" => Some(LevelFilter::Warn),
        "info" => Some(LevelFilter::Info),
        "debug" => Some(LevelFilter::Debug),
        "trace" => Some(LevelFilter::Trace),
        _ => None,
    }
}

fn init_logging(global: &GlobalOptions) -> Result<(), Box<dyn std::error::Error>> {
    let level = match &global.log_level {
        Some(level) => {
            parse_log_level(level).ok_or(format!("unsupported --log-level: {level}"))?
        }
        None if global.verbose => LevelFilter::Debug,
        None => LevelFilter::Warn,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
    Ok(())
}

fn base_options(global: &GlobalOptions) -> Result<NormalizeOptions, Box<dyn std::error::Error>> {
    let mut options = NormalizeOptions::new().with_settle_progressive(!global.no_settle);
    if let Some(fps) = &global.fps {
        options = options.with_frame_rate(fps.parse::<FrameRate>()?);
    }
    Ok(options)
}

fn print_sequence(
    sequence: &NormalizedSequence,
    include_tags: bool,
    plan: Option<FieldRate>,
    as_json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let tags = sequence.tag();
    if as_json {
        let mut payload = json!({
            "state": sequence.state(),
            "frames": sequence.len(),
            "frame_rate": sequence.frame_rate().to_string(),
            "cadence": sequence.cadence(),
            "ops": sequence.ops(),
            "vob_indexes": tags.vob_map.to_string(),
        });
        if include_tags {
            payload["tags"] = serde_json::to_value(&tags.tags)?;
        }
        if let Some(field_rate) = plan {
            payload["plan"] = serde_json::to_value(DeinterlacePlan::build(&tags.tags, field_rate))?;
        }
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    println!("State: {:?}", sequence.state());
    println!(
        "Frames: {} @ {} ({:.3} fps)",
        sequence.len(),
        sequence.frame_rate(),
        sequence.frame_rate().as_f64()
    );
    println!("Cadence: {}", sequence.cadence());
    println!("Operations: {}", sequence.ops().len());
    println!("Group ranges: {}", tags.vob_map);
    if include_tags {
        for tag in &tags.tags {
            let order = match tag.field_order {
                None => "progressive".to_string(),
                Some(order) => format!("{order:?}"),
            };
            println!(
                "{:>7} <- {:>7}  vob {:>3} cell {:>3}  {order}",
                tag.frame, tag.index, tag.group_id, tag.cell_id
            );
        }
    }
    if let Some(field_rate) = plan {
        let plan = DeinterlacePlan::build(&tags.tags, field_rate);
        println!(
            "Deinterlace: {} of {} source frames, {} output frames",
            plan.deinterlaced_sources(),
            sequence.len(),
            plan.actions.len()
        );
    }
    Ok(())
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(&cli.global)?;

    match cli.command {
        Commands::Inspect { input, json } => {
            let source = IndexedSource::open_with_options(&input, &base_options(&cli.global)?)?;
            let analysis = source.analysis();
            if json {
                let payload = json!({
                    "pictures": analysis.total_pictures,
                    "progressive": analysis.progressive_pictures,
                    "interlaced": analysis.interlaced_pictures,
                    "pulldown": analysis.pulldown_pictures,
                    "progressive_percentage": analysis.progressive_percentage,
                    "vfr": analysis.is_variable_frame_rate,
                    "cadence": source.cadence(),
                    "frame_rate": source.initial().frame_rate().to_string(),
                    "standard": source.standard(),
                    "settled": source.is_settled(),
                });
                println!("{}", serde_json::to_string_pretty(&payload)?);
            } else {
                println!(
                    "Progressive: {:05.2}% ({})",
                    analysis.progressive_percentage, analysis.progressive_pictures
                );
                println!(
                    "Interlaced:  {:05.2}% ({})",
                    100.0 - analysis.progressive_percentage,
                    analysis.interlaced_pictures
                );
                println!("Pulldown: {}", source.cadence());
                println!("VFR: {}", analysis.is_variable_frame_rate);
                println!(
                    "Frame rate: {} ({})",
                    source.initial().frame_rate(),
                    source.standard()
                );
                if source.is_settled() {
                    println!(
                        "{} {}",
                        "note:".cyan().bold(),
                        "fully progressive source was settled at the film rate"
                    );
                }
            }
        }
        Commands::Validate { input, json } => {
            let source = IndexedSource::open_with_options(&input, &base_options(&cli.global)?)?;
            let report = source.validate();
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print!("{report}");
            }
            if !report.is_valid() {
                return Err("validation failed".into());
            }
        }
        Commands::Normalize {
            input,
            mode,
            cycle,
            offsets,
            per_group,
            tags,
            plan,
            json,
        } => {
            let mode: RateMode = mode.parse()?;
            let mut options = base_options(&cli.global)?.with_mode(mode);
            if let Some(cycle) = cycle {
                options = options.with_cycle(cycle);
            }
            if let Some(offsets) = offsets {
                options = options.with_offsets(parse_offsets(&offsets)?);
            }
            if per_group {
                options = options.with_decimation_phase(DecimationPhase::PerGroup);
            }
            let plan = plan.map(FieldRate::from_factor).transpose()?;

            let source = IndexedSource::open_with_options(&input, &options)?;
            if source.is_settled() && mode != RateMode::Variable {
                eprintln!(
                    "{} {}",
                    "warning:".yellow().bold(),
                    "source was already settled at load; --mode has no effect".yellow()
                );
            }
            let sequence = source.normalize(&options)?;
            print_sequence(&sequence, tags, plan, json)?;
            if !json {
                println!(
                    "{} {}",
                    "success:".green().bold(),
                    format!(
                        "{} pictures -> {} frames",
                        source.store().len(),
                        sequence.len()
                    )
                    .green()
                );
            }
        }
        Commands::Decimate {
            count,
            cycle,
            offsets,
            inverse,
        } => {
            let frames: Vec<usize> = (0..count).collect();
            let selected = pulldown::select(&frames, cycle, &parse_offsets(&offsets)?, inverse)?;
            let listed: Vec<String> = selected.iter().map(usize::to_string).collect();
            println!("{}", listed.join(" "));
        }
        Commands::Completions { shell } => {
            let mut command = Cli::command();
            clap_complete::generate(shell, &mut command, "pulldown-cli", &mut std::io::stdout());
        }
    }

    Ok(())
}

fn main() {
    if let Err(error) = run() {
        eprintln!("{} {error}", "error:".red().bold());
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::{Cli, parse_log_level, parse_offsets};

    #[test]
    fn command_name_matches_binary() {
        let command = Cli::command();
        assert_eq!(command.get_name(), "pulldown-cli");
        command.debug_assert();
    }

    #[test]
    fn parse_offsets_lists() {
        assert_eq!(parse_offsets("0,1,3,4").unwrap(), vec![0, 1, 3, 4]);
        assert_eq!(parse_offsets(" 2 , 7 ").unwrap(), vec![2, 7]);
        assert!(parse_offsets("").unwrap().is_empty());
        assert!(parse_offsets("1,x").is_err());
    }

    #[test]
    fn parse_log_level_aliases() {
        assert!(parse_log_level("warn").is_some());
        assert!(parse_log_level("WARNING").is_some());
        assert!(parse_log_level("quiet").is_some());
        assert!(parse_log_level("debug").is_some());
        assert!(parse_log_level("loud").is_none());
    }
}
