use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::{debug, info};

use std::fs::File;
use std::io::{self, BufReader, BufWriter};

use tiergrid::json_array_encoder::JsonArrayEncoder;
use tiergrid::label_encoder::LabelEncoder;
use tiergrid::logging;
use tiergrid::output_type::OutputType;
use tiergrid::text_encoder::TextEncoder;
use tiergrid::{LabelManager, SliceOpts, Tier, TierKey, Tolerance};

fn main() -> Result<()> {
    logging::init();
    let params = Params::parse();

    let file = File::open(&params.input)
        .with_context(|| format!("failed to open '{}'", params.input))?;
    let lm = LabelManager::from_json_reader(BufReader::new(file))
        .with_context(|| format!("failed to load label manager from '{}'", params.input))?;
    info!(input = %params.input, tiers = lm.len(), "loaded label manager");

    let stdout = io::stdout();
    let writer = BufWriter::new(stdout.lock());

    let mut encoder: Box<dyn LabelEncoder> = match params.output_type {
        OutputType::Json => Box::new(JsonArrayEncoder::new(writer)),
        OutputType::Text => Box::new(TextEncoder::new(writer)),
    };

    run(&lm, &params.command, &mut *encoder)?;
    encoder.close()?;
    Ok(())
}

#[derive(Parser, Debug)]
#[command(name = "tiergrid")]
#[command(about = "Query time-aligned annotation tiers")]
struct Params {
    /// Label manager in tiergrid's JSON representation.
    #[arg(short = 'i', long = "input")]
    input: String,

    #[arg(
        short = 'o',
        long = "output-type",
        value_enum,
        default_value_t = OutputType::Text
    )]
    output_type: OutputType,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Every label, optionally limited to one tier.
    Dump {
        /// Tier index or name.
        #[arg(short = 't', long = "tier")]
        tier: Option<String>,
    },

    /// The label at a time in one tier.
    LabelAt {
        #[arg(short = 't', long = "tier")]
        tier: String,

        #[arg(allow_negative_numbers = true)]
        time: f64,
    },

    /// One label per tier at a time.
    LabelsAt {
        #[arg(allow_negative_numbers = true)]
        time: f64,
    },

    /// Labels overlapping a time range.
    Slice {
        #[arg(short = 't', long = "tier")]
        tier: String,

        #[arg(allow_negative_numbers = true)]
        t1: f64,

        #[arg(allow_negative_numbers = true)]
        t2: f64,

        #[command(flatten)]
        slice: SliceArgs,
    },

    /// Labels whose text matches a regular expression.
    Search {
        #[arg(short = 't', long = "tier")]
        tier: String,

        pattern: String,

        /// Restrict the search to labels overlapping `FROM..TO`.
        #[arg(
            long = "range",
            num_args = 2,
            value_names = ["FROM", "TO"],
            allow_negative_numbers = true
        )]
        range: Option<Vec<f64>>,

        #[command(flatten)]
        slice: SliceArgs,
    },
}

#[derive(Args, Debug)]
struct SliceArgs {
    /// Drop a label that starts before the range.
    #[arg(long = "lstrip", default_value_t = false)]
    lstrip: bool,

    /// Drop a label that ends after the range.
    #[arg(long = "rstrip", default_value_t = false)]
    rstrip: bool,

    /// Drop a label that only touches the start of the range.
    #[arg(long = "exclude-left", default_value_t = false)]
    exclude_left: bool,

    /// Drop a label that only touches the end of the range.
    #[arg(long = "exclude-right", default_value_t = false)]
    exclude_right: bool,

    /// Boundary tolerance in seconds.
    #[arg(long = "tol", default_value_t = 0.0)]
    tol: f64,

    /// Extra tolerance at the start of the range (may be negative).
    #[arg(long = "ltol", default_value_t = 0.0, allow_negative_numbers = true)]
    ltol: f64,

    /// Extra tolerance at the end of the range (may be negative).
    #[arg(long = "rtol", default_value_t = 0.0, allow_negative_numbers = true)]
    rtol: f64,
}

impl From<&SliceArgs> for SliceOpts {
    fn from(args: &SliceArgs) -> Self {
        SliceOpts {
            lstrip: args.lstrip,
            rstrip: args.rstrip,
            lincl: !args.exclude_left,
            rincl: !args.exclude_right,
            tolerance: Tolerance {
                tol: args.tol,
                ltol: args.ltol,
                rtol: args.rtol,
            },
        }
    }
}

// Integers select by position, anything else by name.
fn tier_key(raw: &str) -> TierKey<'_> {
    raw.parse::<usize>()
        .map(TierKey::Index)
        .unwrap_or(TierKey::Name(raw))
}

fn lookup<'m>(lm: &'m LabelManager, raw: &str) -> Result<&'m Tier> {
    lm.tier(tier_key(raw))
        .with_context(|| format!("no tier '{raw}'"))
}

fn run(lm: &LabelManager, command: &Command, encoder: &mut dyn LabelEncoder) -> Result<()> {
    match command {
        Command::Dump { tier } => {
            let tiers = match tier {
                Some(raw) => vec![lookup(lm, raw)?],
                None => lm.iter().collect(),
            };
            for tier in tiers {
                for label in tier {
                    encoder.write_label(tier.name(), label)?;
                }
            }
        }
        Command::LabelAt { tier, time } => {
            let tier = lookup(lm, tier)?;
            encoder.write_label(tier.name(), tier.label_at(*time)?)?;
        }
        Command::LabelsAt { time } => {
            let labels = lm.labels_at(*time)?;
            for (tier, label) in lm.iter().zip(labels) {
                encoder.write_label(tier.name(), label)?;
            }
        }
        Command::Slice {
            tier,
            t1,
            t2,
            slice,
        } => {
            let tier = lookup(lm, tier)?;
            let hits = tier.tslice(*t1, *t2, &slice.into())?;
            debug!(count = hits.len(), t1, t2, "time slice");
            for label in hits {
                encoder.write_label(tier.name(), label)?;
            }
        }
        Command::Search {
            tier,
            pattern,
            range,
            slice,
        } => {
            let tier = lookup(lm, tier)?;
            let hits = match range.as_deref() {
                Some(&[from, to]) => tier.search_within(pattern, from, to, &slice.into())?,
                _ => tier.search(pattern)?,
            };
            debug!(count = hits.len(), %pattern, "search");
            for label in hits {
                encoder.write_label(tier.name(), label)?;
            }
        }
    }
    Ok(())
}
