mod harness;
mod increment;
mod metrics;
mod report;

use crate::harness::config::{BenchConfig, ConfigOverrides, Preset};
use crate::harness::{run_on_worker, Variant};
use crate::metrics::MetricsExporter;
use crate::report::{write_stats, ReportHeader};
use clap::Parser;
use env_logger::Env;
use log::info;
use std::io::{self, Write};
use std::path::PathBuf;
use strum::IntoEnumIterator;

#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
	#[arg(
		short,
		long,
		default_value_t = Preset::Growing,
		help = "Harness preset: growing, per-op or fixed"
	)]
	preset: Preset,
	#[arg(short, long, help = "TOML file overriding iterations, bound or stack_size")]
	config: Option<PathBuf>,
	#[arg(short, long, help = "Trials per variant")]
	iterations: Option<u32>,
	#[arg(short, long, help = "Base number of increments per trial")]
	bound: Option<u32>,
	#[arg(long, help = "Stack size of the benchmark thread in MiB")]
	stack_size_mib: Option<usize>,
	#[arg(
		short,
		long,
		help = "Only run this variant. Can be repeated. Example: sp-recursive"
	)]
	variant: Vec<Variant>,
	#[arg(short, long, help = "Directory to export the raw and aggregated samples to")]
	out: Option<PathBuf>,
}

impl Args {
	fn bench_config(&self) -> anyhow::Result<BenchConfig> {
		let mut config = self.preset.config();

		if let Some(path) = &self.config {
			info!("Reading config from {path:?}");
			config = config.with_overrides(&ConfigOverrides::read_config(path)?);
		}

		config = config.with_overrides(&ConfigOverrides {
			iterations: self.iterations,
			bound: self.bound,
			stack_size: self.stack_size_mib.map(|mib| mib * 1024 * 1024),
		});

		Ok(config)
	}

	fn variants(&self) -> Vec<Variant> {
		if self.variant.is_empty() {
			return Variant::iter().collect();
		}
		Variant::iter().filter(|v| self.variant.contains(v)).collect()
	}
}

fn main() -> anyhow::Result<()> {
	env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

	let args = Args::parse();
	let config = args.bench_config()?;
	let exporter = args.out.as_ref().map(MetricsExporter::new);

	info!("Starting pointer benchmark with preset {}", args.preset);
	info!("Using config: {config:?}");

	let ops = config.per_op.then_some(config.bound);
	run_on_worker(&config, args.variants(), |variant, results| {
		let header = ReportHeader {
			label: &variant.label(),
			depth: config.bound,
			repetitions: config.iterations,
		};
		let mut stdout = io::stdout().lock();
		write_stats(&mut stdout, &header, &results, ops)?;
		stdout.flush()?;

		if let Some(exporter) = &exporter {
			exporter.save_measurement(&variant.to_string(), &results)?;
		}
		Ok(())
	})?;

	info!("Finished pointer benchmark");
	Ok(())
}
