use crate::metrics::ResultSet;
use std::fmt;
use std::io::{self, Write};

/// Min, max and mean of one result set, in nanoseconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Summary {
	pub min: u64,
	pub max: u64,
	pub mean: f64,
}

impl Summary {
	/// Returns `None` for an empty result set.
	pub fn from_results(results: &ResultSet) -> Option<Self> {
		if results.is_empty() {
			return None;
		}
		let min = results.elapsed_ns().min()?;
		let max = results.elapsed_ns().max()?;
		let sum: f64 = results.elapsed_ns().map(|ns| ns as f64).sum();

		Some(Self {
			min,
			max,
			mean: sum / results.len() as f64,
		})
	}

	/// The same figures divided by `ops`, i.e. nanoseconds per increment.
	/// `None` when there were no increments to divide by.
	pub fn per_op(&self, ops: u32) -> Option<PerOp> {
		if ops == 0 {
			return None;
		}
		let ops = f64::from(ops);
		Some(PerOp {
			min: self.min as f64 / ops,
			max: self.max as f64 / ops,
			mean: self.mean / ops,
		})
	}
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerOp {
	pub min: f64,
	pub max: f64,
	pub mean: f64,
}

/// Header lines printed above a variant's statistics.
pub struct ReportHeader<'a> {
	pub label: &'a dyn fmt::Display,
	pub depth: u32,
	pub repetitions: u32,
}

/// Writes one variant's block. `ops` switches on the per-increment suffix.
pub fn write_stats(
	out: &mut impl Write,
	header: &ReportHeader<'_>,
	results: &ResultSet,
	ops: Option<u32>,
) -> io::Result<()> {
	let label = header.label;
	writeln!(out, "{label} depth: {}", header.depth)?;
	writeln!(out, "{label} test repetitions: {}", header.repetitions)?;
	writeln!(out, "{label} results (in nanoseconds):")?;

	let Some(summary) = Summary::from_results(results) else {
		writeln!(out, "\tno samples")?;
		writeln!(out)?;
		return Ok(());
	};

	match ops.and_then(|ops| summary.per_op(ops)) {
		Some(per_op) => {
			writeln!(out, "\tMin: {} ({} ns per op)", summary.min, per_op.min)?;
			writeln!(out, "\tMax: {} ({} ns per op)", summary.max, per_op.max)?;
			writeln!(out, "\tAverage: {} ({} ns per op)", summary.mean, per_op.mean)?;
		}
		None => {
			writeln!(out, "\tMin: {}", summary.min)?;
			writeln!(out, "\tMax: {}", summary.max)?;
			writeln!(out, "\tAverage: {}", summary.mean)?;
		}
	}
	writeln!(out)?;

	Ok(())
}
