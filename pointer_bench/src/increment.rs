//! The four measured operations: iterative and recursive increments through
//! an exclusive borrow and through a reference-counted handle.
//!
//! Every function here is `#[inline(never)]` so that each increment really is
//! a call. The shared variants take their `Rc` by value: cloning it at the call
//! site and dropping it on return is the ref-count traffic being measured.

use common::do_not_optimize_read;
use std::cell::Cell;
use std::rc::Rc;

/// Counter handle used by the shared-ownership variants.
pub type SharedCounter = Rc<Cell<u32>>;

#[inline(never)]
pub fn raw_iterative_increment(out: &mut u32) {
	*out += 1;
}

#[inline(never)]
pub fn sp_iterative_increment(out: SharedCounter) {
	out.set(out.get() + 1);
}

/// Increments `out` until it reaches `bound`, one call frame per increment.
#[inline(never)]
pub fn raw_recursive_increment(out: &mut u32, bound: u32) {
	if *out >= bound {
		return;
	}
	*out += 1;
	raw_recursive_increment(out, bound);
	// keeps the self call out of tail position
	do_not_optimize_read(&*out);
}

/// Increments `out` until it reaches `bound`. Each level owns one extra
/// strong reference, so the count peaks at `bound - initial + 1` above the
/// caller's before unwinding back down.
#[inline(never)]
pub fn sp_recursive_increment(out: SharedCounter, bound: u32) {
	if out.get() >= bound {
		return;
	}
	out.set(out.get() + 1);
	sp_recursive_increment(Rc::clone(&out), bound);
}
