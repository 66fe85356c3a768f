use crate::report::Summary;
use common::metrics::TrialSample;
use csv::WriterBuilder;
use log::{debug, info, warn};
use std::path::{Path, PathBuf};

/// The samples of one variant, in trial order.
#[derive(Debug, Default, Clone)]
pub struct ResultSet {
	samples: Vec<TrialSample>,
}

impl ResultSet {
	pub fn with_capacity(trials: usize) -> Self {
		Self {
			samples: Vec::with_capacity(trials),
		}
	}

	pub fn push(&mut self, sample: TrialSample) {
		debug_assert_eq!(sample.trial as usize, self.samples.len());
		self.samples.push(sample);
	}

	pub fn len(&self) -> usize {
		self.samples.len()
	}

	pub fn is_empty(&self) -> bool {
		self.samples.is_empty()
	}

	pub fn samples(&self) -> &[TrialSample] {
		&self.samples
	}

	pub fn elapsed_ns(&self) -> impl Iterator<Item = u64> + '_ {
		self.samples.iter().map(|s| s.elapsed_ns)
	}
}

impl FromIterator<TrialSample> for ResultSet {
	fn from_iter<I: IntoIterator<Item = TrialSample>>(iter: I) -> Self {
		Self {
			samples: iter.into_iter().collect(),
		}
	}
}

/// Writes result sets to `<out_path>/<name>/` as `;`-separated CSV files.
pub struct MetricsExporter {
	out_path: PathBuf,
}

impl MetricsExporter {
	pub fn new(out_path: impl AsRef<Path>) -> Self {
		Self {
			out_path: out_path.as_ref().to_path_buf(),
		}
	}

	pub fn save_measurement(&self, name: &str, results: &ResultSet) -> anyhow::Result<PathBuf> {
		info!("Saving measurement: {}", name);

		let path = self.out_path.join(name);
		std::fs::create_dir_all(&path)?;
		self.export_latency_metrics(results, &path)?;

		Ok(path)
	}

	fn export_latency_metrics(&self, results: &ResultSet, path: &Path) -> anyhow::Result<()> {
		debug!("Exporting {} raw latency samples", results.len());
		let mut writer = WriterBuilder::new()
			.delimiter(b';')
			.from_path(path.join("latency_metrics.csv"))?;
		for sample in results.samples() {
			writer.serialize(sample)?;
		}
		writer.flush()?;

		debug!("Exporting aggregated latency metrics");
		let mut writer = WriterBuilder::new()
			.delimiter(b';')
			.from_path(path.join("latency_metrics_aggregated.csv"))?;
		writer.write_record(["mean", "q1", "median", "q3", "std_dev", "min", "max"])?;

		match Spread::from_results(results) {
			Some(spread) => writer.write_record(&[
				spread.summary.mean.to_string(),
				spread.q1.to_string(),
				spread.median.to_string(),
				spread.q3.to_string(),
				spread.std_dev.to_string(),
				spread.summary.min.to_string(),
				spread.summary.max.to_string(),
			])?,
			None => warn!("No samples to aggregate in {path:?}"),
		}
		writer.flush()?;

		Ok(())
	}
}

/// The report's min/max/mean plus the quartiles and deviation only the
/// CSV export carries.
struct Spread {
	summary: Summary,
	q1: f64,
	median: f64,
	q3: f64,
	std_dev: f64,
}

impl Spread {
	fn from_results(results: &ResultSet) -> Option<Self> {
		let summary = Summary::from_results(results)?;
		let values: Vec<f64> = results.elapsed_ns().map(|ns| ns as f64).collect();
		let (q1, median, q3) =
			stats::quartiles(values.iter().copied()).unwrap_or((f64::NAN, f64::NAN, f64::NAN));
		let std_dev = stats::OnlineStats::from_slice(&values).stddev();

		Some(Self {
			summary,
			q1,
			median,
			q3,
			std_dev,
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::time::Duration;

	fn result_set(elapsed: &[u64]) -> ResultSet {
		elapsed
			.iter()
			.enumerate()
			.map(|(i, ns)| {
				TrialSample::new(i as u32, 0, 10 + i as u32, Duration::from_nanos(*ns))
			})
			.collect()
	}

	#[test]
	fn result_set_keeps_trial_order() {
		let mut results = ResultSet::with_capacity(3);
		assert!(results.is_empty());
		for (i, ns) in [30, 10, 20].into_iter().enumerate() {
			results.push(TrialSample::new(i as u32, 0, 1, Duration::from_nanos(ns)));
		}
		assert_eq!(results.len(), 3);
		assert_eq!(results.elapsed_ns().collect::<Vec<_>>(), vec![30, 10, 20]);
	}

	#[test]
	fn aggregated_stats_match_samples() {
		let spread = Spread::from_results(&result_set(&[50, 20, 80, 40])).unwrap();
		assert_eq!(spread.summary.min, 20);
		assert_eq!(spread.summary.max, 80);
		assert_eq!(spread.summary.mean, 47.5);
		assert!(spread.std_dev > 0.0);
		assert!(spread.q1 <= spread.median && spread.median <= spread.q3);
	}

	#[test]
	fn save_measurement_writes_both_files() {
		let dir = tempfile::tempdir().unwrap();
		let exporter = MetricsExporter::new(dir.path());

		let path = exporter
			.save_measurement("raw-iterative", &result_set(&[50, 20, 80, 40]))
			.unwrap();
		assert_eq!(path, dir.path().join("raw-iterative"));

		let raw = std::fs::read_to_string(path.join("latency_metrics.csv")).unwrap();
		let mut lines = raw.lines();
		assert_eq!(lines.next(), Some("trial;bound;increments;elapsed_ns"));
		assert_eq!(lines.next(), Some("0;10;10;50"));
		assert_eq!(raw.lines().count(), 5);

		let aggregated =
			std::fs::read_to_string(path.join("latency_metrics_aggregated.csv")).unwrap();
		let mut lines = aggregated.lines();
		assert_eq!(lines.next(), Some("mean;q1;median;q3;std_dev;min;max"));
		let row: Vec<&str> = lines.next().unwrap().split(';').collect();
		assert_eq!(row[0], "47.5");
		assert_eq!(row[5], "20");
		assert_eq!(row[6], "80");
	}

	#[test]
	fn empty_result_set_exports_headers_only() {
		let dir = tempfile::tempdir().unwrap();
		let exporter = MetricsExporter::new(dir.path());

		let path = exporter
			.save_measurement("sp-recursive", &ResultSet::default())
			.unwrap();

		let aggregated =
			std::fs::read_to_string(path.join("latency_metrics_aggregated.csv")).unwrap();
		assert_eq!(aggregated, "mean;q1;median;q3;std_dev;min;max\n");
		assert!(Spread::from_results(&ResultSet::default()).is_none());
	}
}
