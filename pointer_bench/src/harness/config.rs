use serde::Deserialize;
use std::path::Path;
use strum_macros::{Display, EnumIter, EnumString};

/// Trials per variant in the full-length presets.
pub const ITERATIONS: u32 = 16384;
/// Trials per variant in the short fixed-bound preset.
pub const FIXED_ITERATIONS: u32 = 1024;
/// Base number of increments per trial.
pub const BOUND: u32 = 8192;
/// Stack given to the worker thread. Caps the deepest recursion a run can reach.
pub const DEFAULT_STACK_SIZE: usize = 64 * 1024 * 1024;

/// How the per-trial bound evolves over the trials of one variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Workload {
	/// Every trial counts up to `bound`.
	Fixed,
	/// Trial `i` counts up to `bound + i`, so no two trials are identical.
	Growing,
}

/// Where the counter starts in each trial.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitialValue {
	Zero,
	TrialIndex,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, EnumIter)]
#[strum(serialize_all = "kebab-case")]
pub enum Preset {
	/// Counter starts at `i` and counts to `bound + i`. Absolute timings.
	Growing,
	/// Counter starts at zero and counts to `bound + i`. Per-op timings.
	PerOp,
	/// Counter starts at zero and counts to `bound`. Per-op timings.
	Fixed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BenchConfig {
	pub iterations: u32,
	pub bound: u32,
	pub workload: Workload,
	pub initial: InitialValue,
	pub per_op: bool,
	pub stack_size: usize,
}

/// Optional overrides read from a TOML file.
#[derive(Debug, Default, Deserialize, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ConfigOverrides {
	pub iterations: Option<u32>,
	pub bound: Option<u32>,
	pub stack_size: Option<usize>,
}

impl ConfigOverrides {
	pub fn read_config(path: impl AsRef<Path>) -> anyhow::Result<Self> {
		let config = std::fs::read_to_string(path)?;
		let config: ConfigOverrides = toml::from_str(&config)?;
		Ok(config)
	}
}

impl Preset {
	pub fn config(self) -> BenchConfig {
		match self {
			Preset::Growing => BenchConfig {
				iterations: ITERATIONS,
				bound: BOUND,
				workload: Workload::Growing,
				initial: InitialValue::TrialIndex,
				per_op: false,
				stack_size: DEFAULT_STACK_SIZE,
			},
			Preset::PerOp => BenchConfig {
				iterations: ITERATIONS,
				bound: BOUND,
				workload: Workload::Growing,
				initial: InitialValue::Zero,
				per_op: true,
				stack_size: DEFAULT_STACK_SIZE,
			},
			Preset::Fixed => BenchConfig {
				iterations: FIXED_ITERATIONS,
				bound: BOUND,
				workload: Workload::Fixed,
				initial: InitialValue::Zero,
				per_op: true,
				stack_size: DEFAULT_STACK_SIZE,
			},
		}
	}
}

impl Default for BenchConfig {
	fn default() -> Self {
		Preset::Growing.config()
	}
}

impl BenchConfig {
	pub fn with_overrides(mut self, overrides: &ConfigOverrides) -> Self {
		if let Some(iterations) = overrides.iterations {
			self.iterations = iterations;
		}
		if let Some(bound) = overrides.bound {
			self.bound = bound;
		}
		if let Some(stack_size) = overrides.stack_size {
			self.stack_size = stack_size;
		}
		self
	}

	/// Counter value at the start of trial `trial`.
	pub fn initial_value(&self, trial: u32) -> u32 {
		match self.initial {
			InitialValue::Zero => 0,
			InitialValue::TrialIndex => trial,
		}
	}

	/// Value the counter must hold at the end of trial `trial`.
	pub fn trial_bound(&self, trial: u32) -> u32 {
		match self.workload {
			Workload::Fixed => self.bound,
			Workload::Growing => self.bound + trial,
		}
	}

	/// Deepest recursion any trial of this configuration asks for.
	pub fn max_depth(&self) -> u32 {
		(0..self.iterations)
			.map(|trial| {
				self.trial_bound(trial)
					.saturating_sub(self.initial_value(trial))
			})
			.max()
			.unwrap_or(0)
	}

	pub fn validate(&self) -> anyhow::Result<()> {
		if self.iterations == 0 {
			return Err(anyhow::anyhow!("iterations must be at least 1"));
		}
		if self.per_op && self.bound == 0 {
			return Err(anyhow::anyhow!("per-op reporting needs a bound of at least 1"));
		}
		if self.workload == Workload::Growing && self.bound.checked_add(self.iterations - 1).is_none()
		{
			return Err(anyhow::anyhow!(
				"bound {} + {} trials overflows the counter",
				self.bound,
				self.iterations
			));
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::str::FromStr;
	use strum::IntoEnumIterator;

	#[test]
	fn default_is_the_growing_preset() {
		let config = BenchConfig::default();
		assert_eq!(config.iterations, 16384);
		assert_eq!(config.bound, 8192);
		assert_eq!(config.workload, Workload::Growing);
		assert_eq!(config.initial, InitialValue::TrialIndex);
		assert!(!config.per_op);
	}

	#[test]
	fn preset_names_round_trip() {
		for preset in Preset::iter() {
			assert_eq!(Preset::from_str(&preset.to_string()).unwrap(), preset);
		}
		assert_eq!(Preset::from_str("per-op").unwrap(), Preset::PerOp);
		assert!(Preset::from_str("turbo").is_err());
	}

	#[test]
	fn growing_workload_strictly_increases() {
		let config = Preset::PerOp.config();
		for trial in 1..config.iterations {
			assert!(config.trial_bound(trial) > config.trial_bound(trial - 1));
		}
		assert_eq!(config.trial_bound(3), 8195);
	}

	#[test]
	fn fixed_workload_is_constant() {
		let config = Preset::Fixed.config();
		assert_eq!(config.trial_bound(0), 8192);
		assert_eq!(config.trial_bound(1023), 8192);
		assert_eq!(config.initial_value(1023), 0);
	}

	#[test]
	fn max_depth_per_preset() {
		assert_eq!(Preset::Growing.config().max_depth(), 8192);
		assert_eq!(Preset::PerOp.config().max_depth(), 8192 + 16383);
		assert_eq!(Preset::Fixed.config().max_depth(), 8192);
	}

	#[test]
	fn overrides_replace_only_given_fields() {
		let overrides: ConfigOverrides = toml::from_str("iterations = 4\n").unwrap();
		let config = Preset::Fixed.config().with_overrides(&overrides);
		assert_eq!(config.iterations, 4);
		assert_eq!(config.bound, 8192);
		assert_eq!(config.stack_size, DEFAULT_STACK_SIZE);
	}

	#[test]
	fn unknown_config_keys_are_rejected() {
		assert!(toml::from_str::<ConfigOverrides>("depth = 4\n").is_err());
	}

	#[test]
	fn read_config_from_file() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("bench.toml");
		std::fs::write(&path, "bound = 16\nstack_size = 1048576\n").unwrap();

		let overrides = ConfigOverrides::read_config(&path).unwrap();
		assert_eq!(overrides.bound, Some(16));
		assert_eq!(overrides.stack_size, Some(1048576));
		assert_eq!(overrides.iterations, None);
	}

	#[test]
	fn validate_rejects_overflow_and_empty_runs() {
		let mut config = Preset::Growing.config();
		config.iterations = 0;
		assert!(config.validate().is_err());

		config.iterations = 2;
		config.bound = u32::MAX;
		assert!(config.validate().is_err());

		config.bound = u32::MAX - 1;
		assert!(config.validate().is_ok());
	}

	#[test]
	fn validate_rejects_zero_bound_for_per_op_reports() {
		let mut config = Preset::Fixed.config();
		config.bound = 0;
		assert!(config.validate().is_err());

		let mut config = Preset::Growing.config();
		config.bound = 0;
		assert!(config.validate().is_ok());
	}
}
