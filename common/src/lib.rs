use std::hint::black_box;

pub mod metrics;

/// Makes the optimizer assume `val` is read here, so writes to it and the
/// calls producing them cannot be elided or reordered past this point.
#[inline(always)]
pub fn do_not_optimize_read<T: ?Sized>(val: &T) {
	black_box(pass_through(val));
}

#[inline(always)]
fn pass_through<T: ?Sized>(val: &T) -> &T {
	val
}
