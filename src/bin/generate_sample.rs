//! Writes a synthetic beneficiary table so the pipeline can run offline.
//!
//! The layout follows the public-use beneficiary summary file: demographic
//! codes, eleven chronic-condition flags (1 = yes, 2 = no) and yearly
//! payment amounts that grow with the number of conditions.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use clap::{Parser, ValueEnum};
use parquet::arrow::ArrowWriter;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use rusty_stats::config::load_config;

const FLAGS: [(&str, f64); 11] = [
    ("SP_ALZHDMTA", 0.19),
    ("SP_CHF", 0.28),
    ("SP_CHRNKIDN", 0.17),
    ("SP_CNCR", 0.07),
    ("SP_COPD", 0.13),
    ("SP_DEPRESSN", 0.21),
    ("SP_DIABETES", 0.38),
    ("SP_ISCHMCHT", 0.42),
    ("SP_OSTEOPRS", 0.17),
    ("SP_RA_OA", 0.15),
    ("SP_STRKETIA", 0.04),
];

/// (column, base amount per year)
const PAYMENTS: [(&str, f64); 9] = [
    ("MEDREIMB_IP", 2400.0),
    ("BENRES_IP", 280.0),
    ("PPPYMT_IP", 150.0),
    ("MEDREIMB_OP", 700.0),
    ("BENRES_OP", 210.0),
    ("PPPYMT_OP", 40.0),
    ("MEDREIMB_CAR", 800.0),
    ("BENRES_CAR", 240.0),
    ("PPPYMT_CAR", 10.0),
];

const RACES: [i64; 4] = [1, 2, 3, 5];

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Format {
    Csv,
    Parquet,
}

#[derive(Debug, Parser)]
#[command(about = "Generate a synthetic beneficiary dataset")]
struct Args {
    /// Configuration file (default: ./rusty-stats.toml when present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output file (default: the configured dataset path)
    #[arg(long)]
    output: Option<PathBuf>,

    #[arg(long, default_value_t = 1000)]
    rows: usize,

    #[arg(long, default_value_t = 42)]
    seed: u64,

    #[arg(long, value_enum, default_value_t = Format::Csv)]
    format: Format,
}

/// Column-oriented sample table.
struct Sample {
    ids: Vec<String>,
    birth_dates: Vec<i64>,
    sex: Vec<i64>,
    race: Vec<i64>,
    esrd: Vec<String>,
    state: Vec<i64>,
    flags: Vec<Vec<i64>>,
    payments: Vec<Vec<f64>>,
}

fn generate(rows: usize, rng: &mut StdRng) -> Sample {
    let mut sample = Sample {
        ids: Vec::with_capacity(rows),
        birth_dates: Vec::with_capacity(rows),
        sex: Vec::with_capacity(rows),
        race: Vec::with_capacity(rows),
        esrd: Vec::with_capacity(rows),
        state: Vec::with_capacity(rows),
        flags: vec![Vec::with_capacity(rows); FLAGS.len()],
        payments: vec![Vec::with_capacity(rows); PAYMENTS.len()],
    };

    for i in 0..rows {
        let year = rng.gen_range(1909..1984);
        let month = rng.gen_range(1..=12);
        let day = rng.gen_range(1..=28);
        // older members carry more conditions
        let age_factor = (2008 - year) as f64 / 70.0;

        sample.ids.push(format!("{:016X}", rng.gen::<u64>() ^ i as u64));
        sample.birth_dates.push(year * 10_000 + month * 100 + day);
        sample.sex.push(rng.gen_range(1..=2));
        sample.race.push(RACES[rng.gen_range(0..RACES.len())]);
        sample
            .esrd
            .push(if rng.gen_bool(0.07) { "Y" } else { "0" }.to_string());
        sample.state.push(rng.gen_range(1..=54));

        let mut conditions = 0;
        for (col, (_, prevalence)) in sample.flags.iter_mut().zip(FLAGS) {
            let active = rng.gen_bool((prevalence * age_factor).clamp(0.0, 0.95));
            conditions += usize::from(active);
            col.push(if active { 1 } else { 2 });
        }

        for (col, (_, base)) in sample.payments.iter_mut().zip(PAYMENTS) {
            let amount = if rng.gen_bool(0.6) {
                0.0
            } else {
                (base * (1.0 + conditions as f64) * rng.gen_range(0.2..1.8) / 10.0).round() * 10.0
            };
            col.push(amount);
        }
    }
    sample
}

fn headers() -> Vec<&'static str> {
    let mut headers = vec![
        "DESYNPUF_ID",
        "BENE_BIRTH_DT",
        "BENE_SEX_IDENT_CD",
        "BENE_RACE_CD",
        "BENE_ESRD_IND",
        "SP_STATE_CODE",
    ];
    headers.extend(FLAGS.iter().map(|(name, _)| *name));
    headers.extend(PAYMENTS.iter().map(|(name, _)| *name));
    headers
}

fn write_csv(sample: &Sample, path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).context("creating CSV output")?;
    writer.write_record(headers())?;

    for row in 0..sample.ids.len() {
        let mut record = vec![
            sample.ids[row].clone(),
            sample.birth_dates[row].to_string(),
            sample.sex[row].to_string(),
            sample.race[row].to_string(),
            sample.esrd[row].clone(),
            sample.state[row].to_string(),
        ];
        record.extend(sample.flags.iter().map(|col| col[row].to_string()));
        record.extend(sample.payments.iter().map(|col| col[row].to_string()));
        writer.write_record(&record)?;
    }
    writer.flush().context("flushing CSV output")?;
    Ok(())
}

fn write_parquet(sample: &Sample, path: &Path) -> Result<()> {
    let mut fields = vec![
        Field::new("DESYNPUF_ID", DataType::Utf8, false),
        Field::new("BENE_BIRTH_DT", DataType::Int64, false),
        Field::new("BENE_SEX_IDENT_CD", DataType::Int64, false),
        Field::new("BENE_RACE_CD", DataType::Int64, false),
        Field::new("BENE_ESRD_IND", DataType::Utf8, false),
        Field::new("SP_STATE_CODE", DataType::Int64, false),
    ];
    fields.extend(
        FLAGS
            .iter()
            .map(|(name, _)| Field::new(*name, DataType::Int64, false)),
    );
    fields.extend(
        PAYMENTS
            .iter()
            .map(|(name, _)| Field::new(*name, DataType::Float64, false)),
    );
    let schema = Arc::new(Schema::new(fields));

    let mut columns: Vec<ArrayRef> = vec![
        Arc::new(StringArray::from(sample.ids.clone())),
        Arc::new(Int64Array::from(sample.birth_dates.clone())),
        Arc::new(Int64Array::from(sample.sex.clone())),
        Arc::new(Int64Array::from(sample.race.clone())),
        Arc::new(StringArray::from(sample.esrd.clone())),
        Arc::new(Int64Array::from(sample.state.clone())),
    ];
    columns.extend(
        sample
            .flags
            .iter()
            .map(|col| Arc::new(Int64Array::from(col.clone())) as ArrayRef),
    );
    columns.extend(
        sample
            .payments
            .iter()
            .map(|col| Arc::new(Float64Array::from(col.clone())) as ArrayRef),
    );

    let batch = RecordBatch::try_new(schema.clone(), columns).context("building record batch")?;
    let file = std::fs::File::create(path).context("creating parquet output")?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing parquet batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

fn run(args: Args) -> Result<()> {
    let config = load_config(args.config.as_deref()).context("loading configuration")?;
    let output = args.output.unwrap_or_else(|| {
        let path = config.dataset_path();
        match args.format {
            Format::Csv => path,
            Format::Parquet => path.with_extension("parquet"),
        }
    });
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }

    let mut rng = StdRng::seed_from_u64(args.seed);
    let sample = generate(args.rows, &mut rng);

    match args.format {
        Format::Csv => write_csv(&sample, &output)?,
        Format::Parquet => write_parquet(&sample, &output)?,
    }

    log::info!(
        "Wrote {} beneficiaries ({} condition flags) to {}",
        args.rows,
        FLAGS.len(),
        output.display()
    );
    Ok(())
}

fn main() -> ExitCode {
    rusty_stats::init_logging();

    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}
