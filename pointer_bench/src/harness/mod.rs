pub mod config;

use crate::harness::config::BenchConfig;
use crate::increment::{
	raw_iterative_increment, raw_recursive_increment, sp_iterative_increment,
	sp_recursive_increment,
};
use crate::metrics::ResultSet;
use common::metrics::TrialSample;
use log::{info, warn};
use std::cell::Cell;
use std::panic;
use std::rc::Rc;
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};
use strum_macros::{Display, EnumIter, EnumString};

/// Ownership strategy crossed with access pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
#[strum(serialize_all = "kebab-case")]
pub enum Variant {
	RawIterative,
	RawRecursive,
	SpIterative,
	SpRecursive,
}

impl Variant {
	/// Label used in the printed report.
	pub fn label(self) -> &'static str {
		match self {
			Variant::RawIterative => "Raw iterative",
			Variant::RawRecursive => "Raw recursive",
			Variant::SpIterative => "SP iterative",
			Variant::SpRecursive => "SP recursive",
		}
	}

	/// Heuristic size of one recursive frame in an unoptimized build, used
	/// only to warn about stacks that look too small. Not measured.
	fn approx_frame_bytes(self) -> usize {
		match self {
			Variant::RawRecursive => 128,
			// the Rc handle and its drop glue live in every frame
			Variant::SpRecursive => 256,
			Variant::RawIterative | Variant::SpIterative => 0,
		}
	}
}

/// Runs every trial of `variant` and returns the samples in trial order.
///
/// Panics if a trial leaves the counter anywhere but its bound.
pub fn run_variant(config: &BenchConfig, variant: Variant) -> ResultSet {
	info!("Running {variant} with {} trials", config.iterations);

	let mut results = ResultSet::with_capacity(config.iterations as usize);
	for trial in 0..config.iterations {
		let initial = config.initial_value(trial);
		let bound = config.trial_bound(trial);

		let elapsed = match variant {
			Variant::RawIterative => raw_iterative_trial(initial, bound),
			Variant::RawRecursive => raw_recursive_trial(initial, bound),
			Variant::SpIterative => sp_iterative_trial(initial, bound),
			Variant::SpRecursive => sp_recursive_trial(initial, bound),
		};

		results.push(TrialSample::new(trial, initial, bound, elapsed));
	}

	info!("Finished {variant}");
	results
}

// The raw trials leak their counter on purpose: the exclusive path never
// frees, the shared path reclaims when the last `Rc` drops.
fn raw_counter(initial: u32) -> &'static mut u32 {
	Box::leak(Box::new(initial))
}

/// Aborts the run when a trial left the counter anywhere but its bound.
fn check_bound(variant: Variant, actual: u32, initial: u32, bound: u32) {
	assert_eq!(
		actual,
		bound.max(initial),
		"{} counter missed its bound (started at {initial})",
		variant.label()
	);
}

fn raw_iterative_trial(initial: u32, bound: u32) -> Duration {
	let counter = raw_counter(initial);

	let start = Instant::now();
	for _ in initial..bound {
		raw_iterative_increment(counter);
	}
	let elapsed = start.elapsed();

	check_bound(Variant::RawIterative, *counter, initial, bound);
	elapsed
}

fn raw_recursive_trial(initial: u32, bound: u32) -> Duration {
	let counter = raw_counter(initial);

	let start = Instant::now();
	raw_recursive_increment(counter, bound);
	let elapsed = start.elapsed();

	check_bound(Variant::RawRecursive, *counter, initial, bound);
	elapsed
}

fn sp_iterative_trial(initial: u32, bound: u32) -> Duration {
	let counter = Rc::new(Cell::new(initial));

	let start = Instant::now();
	for _ in initial..bound {
		sp_iterative_increment(Rc::clone(&counter));
	}
	let elapsed = start.elapsed();

	check_bound(Variant::SpIterative, counter.get(), initial, bound);
	elapsed
}

fn sp_recursive_trial(initial: u32, bound: u32) -> Duration {
	let counter = Rc::new(Cell::new(initial));

	let start = Instant::now();
	sp_recursive_increment(Rc::clone(&counter), bound);
	let elapsed = start.elapsed();

	check_bound(Variant::SpRecursive, counter.get(), initial, bound);
	elapsed
}

/// Runs `variants` one after another on a worker thread sized by
/// `config.stack_size`, handing each finished result set to `on_result`.
///
/// A panic on the worker (a failed bound check) is re-raised on the caller.
pub fn run_on_worker(
	config: &BenchConfig,
	variants: Vec<Variant>,
	on_result: impl FnMut(Variant, ResultSet) -> anyhow::Result<()>,
) -> anyhow::Result<()> {
	run_on_worker_with(config, variants, run_variant, on_result)
}

fn stack_looks_too_small(config: &BenchConfig, variants: &[Variant]) -> bool {
	let frame_bytes = variants
		.iter()
		.map(|v| v.approx_frame_bytes())
		.max()
		.unwrap_or(0);
	(config.max_depth() as usize).saturating_mul(frame_bytes) > config.stack_size
}

fn run_on_worker_with(
	config: &BenchConfig,
	variants: Vec<Variant>,
	run: fn(&BenchConfig, Variant) -> ResultSet,
	mut on_result: impl FnMut(Variant, ResultSet) -> anyhow::Result<()>,
) -> anyhow::Result<()> {
	config.validate()?;

	if stack_looks_too_small(config, &variants) {
		warn!(
			"Recursion depth {} may not fit in a {} byte stack",
			config.max_depth(),
			config.stack_size
		);
	}

	let (tx, rx) = mpsc::channel();
	let worker_config = config.clone();
	let handle = thread::Builder::new()
		.name("bench-worker".to_string())
		.stack_size(config.stack_size)
		.spawn(move || {
			for variant in variants {
				let results = run(&worker_config, variant);
				if tx.send((variant, results)).is_err() {
					break;
				}
			}
		})?;

	let mut outcome = Ok(());
	for (variant, results) in rx.iter() {
		if let Err(error) = on_result(variant, results) {
			outcome = Err(error);
			break;
		}
	}
	drop(rx);

	if let Err(payload) = handle.join() {
		panic::resume_unwind(payload);
	}

	outcome
}
