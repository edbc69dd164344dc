use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use serde::Serialize;
use tracing::info;

use territori::resolver::TerritoryResolver;

#[derive(Parser)]
#[command(name = "standardize")]
#[command(about = "Standardize Italian territory labels in a CSV file")]
struct Args {
    /// Input CSV file
    input: PathBuf,

    /// Name of the column holding the raw territory labels
    #[arg(short, long, default_value = "territory")]
    column: String,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Emit JSON lines instead of CSV
    #[arg(long)]
    json: bool,

    /// Log a per-level summary after processing
    #[arg(long)]
    report: bool,
}

#[derive(Serialize)]
struct ResolvedRow<'a> {
    label: &'a str,
    level: &'static str,
    province_std: Option<&'a str>,
    region_std: Option<&'a str>,
    macro_std: Option<&'a str>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let resolver = TerritoryResolver::builtin().context("reference data failed validation")?;

    let mut reader = csv::Reader::from_path(&args.input)
        .with_context(|| format!("cannot open {}", args.input.display()))?;
    let headers = reader.headers()?.clone();
    let Some(label_idx) = headers.iter().position(|h| h == args.column) else {
        bail!("column '{}' not found in {}", args.column, args.input.display());
    };

    let sink: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(File::create(path)?),
        None => Box::new(io::stdout()),
    };

    let mut level_counts: BTreeMap<&'static str, usize> = BTreeMap::new();
    let mut rows = 0usize;

    if args.json {
        let mut sink = sink;
        for record in reader.records() {
            let record = record?;
            let label = record.get(label_idx).unwrap_or("");
            let identity = resolver.resolve(label);
            *level_counts.entry(identity.level.as_str()).or_default() += 1;
            rows += 1;
            let row = ResolvedRow {
                label,
                level: identity.level.as_str(),
                province_std: identity.province.as_deref(),
                region_std: identity.region.as_deref(),
                macro_std: identity.macro_area.as_deref(),
            };
            serde_json::to_writer(&mut sink, &row)?;
            sink.write_all(b"\n")?;
        }
    } else {
        let mut writer = csv::Writer::from_writer(sink);
        let mut header = headers.clone();
        for extra in ["level", "province_std", "region_std", "macro_std"] {
            header.push_field(extra);
        }
        writer.write_record(&header)?;

        for record in reader.records() {
            let record = record?;
            let label = record.get(label_idx).unwrap_or("");
            let identity = resolver.resolve(label);
            *level_counts.entry(identity.level.as_str()).or_default() += 1;
            rows += 1;

            let mut out = record.clone();
            out.push_field(identity.level.as_str());
            out.push_field(identity.province.as_deref().unwrap_or(""));
            out.push_field(identity.region.as_deref().unwrap_or(""));
            out.push_field(identity.macro_area.as_deref().unwrap_or(""));
            writer.write_record(&out)?;
        }
        writer.flush()?;
    }

    if args.report {
        info!(rows, "standardization complete");
        for (level, count) in &level_counts {
            info!(level, count, "resolved");
        }
        let unknown = level_counts.get("unknown").copied().unwrap_or(0);
        if rows > 0 {
            info!(
                unknown_rate = format!("{:.1}%", 100.0 * unknown as f64 / rows as f64).as_str(),
                "unknown share"
            );
        }
    }

    Ok(())
}
