use serde::{Deserialize, Serialize};
use std::time::Duration;

/// One timed trial: how long it took and how much work it did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialSample {
	pub trial: u32,
	/// Value the counter had to reach.
	pub bound: u32,
	/// Increments performed to get there.
	pub increments: u32,
	pub elapsed_ns: u64,
}

impl TrialSample {
	pub fn new(trial: u32, initial: u32, bound: u32, elapsed: Duration) -> Self {
		Self {
			trial,
			bound,
			increments: bound.saturating_sub(initial),
			elapsed_ns: u64::try_from(elapsed.as_nanos()).unwrap_or(u64::MAX),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn elapsed_is_stored_in_nanoseconds() {
		let sample = TrialSample::new(3, 0, 8195, Duration::from_micros(12));
		assert_eq!(sample.elapsed_ns, 12_000);
		assert_eq!(sample.increments, 8195);
		assert_eq!(sample.trial, 3);
	}

	#[test]
	fn increments_count_from_the_initial_value() {
		let sample = TrialSample::new(3, 3, 8195, Duration::ZERO);
		assert_eq!(sample.bound, 8195);
		assert_eq!(sample.increments, 8192);

		let sample = TrialSample::new(9, 9, 5, Duration::ZERO);
		assert_eq!(sample.increments, 0);
	}
}
