//! Probe ordering for the frame search.

/// Visit order for `len` slots: repeated halvings, so early probes spread
/// across the whole range instead of crawling forward from the front.
pub fn bisect_order(len: usize) -> Vec<usize> {
	let mut taken = vec![false; len];
	let mut order = Vec::with_capacity(len);
	let mut divisions = 2;
	let mut step = len / divisions;
	let mut idx = 0;
	while order.len() < len {
		if !taken[idx] {
			taken[idx] = true;
			order.push(idx);
		}
		idx += step;
		if idx >= len {
			divisions *= 2;
			step = len / divisions;
			idx = step;
		}
	}
	order
}

/// Move the pending slots whose timestamps fall inside `window` ahead of
/// the rest. Slots before `after` have been visited and stay put. Relative
/// order is preserved on both sides of the split.
pub fn prefer_window(order: &mut Vec<usize>, after: usize, start: f64, interval: f64, window: (f64, f64)) {
	let (lo, hi) = if window.0 <= window.1 {
		window
	} else {
		(window.1, window.0)
	};
	if after >= order.len() {
		return;
	}

	let mut inside = Vec::new();
	let mut outside = Vec::new();
	for &slot in &order[after..] {
		let at = start + slot as f64 * interval;
		if at >= lo && at <= hi {
			inside.push(slot);
		} else {
			outside.push(slot);
		}
	}
	if inside.is_empty() {
		return;
	}

	log::info!("Narrowing search to {lo:.3}-{hi:.3}");
	order.truncate(after);
	order.append(&mut inside);
	order.append(&mut outside);
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn visits_every_slot_once() {
		for len in [0, 1, 2, 3, 5, 48, 100] {
			let mut order = bisect_order(len);
			assert_eq!(order.len(), len);
			order.sort();
			let expected: Vec<usize> = (0..len).collect();
			assert_eq!(order, expected, "len {len}");
		}
	}

	#[test]
	fn early_probes_spread_out() {
		let order = bisect_order(100);
		assert_eq!(&order[..4], &[0, 50, 25, 75]);
	}

	#[test]
	fn window_slots_move_ahead() {
		let mut order = bisect_order(10);
		assert_eq!(order, vec![0, 5, 2, 4, 6, 8, 1, 3, 7, 9]);

		prefer_window(&mut order, 0, 0.0, 1.0, (2.0, 4.0));
		assert_eq!(order, vec![2, 4, 3, 0, 5, 6, 8, 1, 7, 9]);
	}

	#[test]
	fn visited_prefix_stays_put() {
		let mut order = bisect_order(10);
		prefer_window(&mut order, 2, 0.0, 1.0, (8.0, 9.0));
		assert_eq!(&order[..2], &[0, 5]);
		assert_eq!(&order[2..4], &[8, 9]);

		let mut sorted = order.clone();
		sorted.sort();
		let expected: Vec<usize> = (0..10).collect();
		assert_eq!(sorted, expected);
	}

	#[test]
	fn reversed_bounds_are_sorted() {
		let mut a = bisect_order(10);
		let mut b = a.clone();
		prefer_window(&mut a, 0, 0.0, 1.0, (2.0, 4.0));
		prefer_window(&mut b, 0, 0.0, 1.0, (4.0, 2.0));
		assert_eq!(a, b);
	}

	#[test]
	fn empty_window_changes_nothing() {
		let mut order = bisect_order(10);
		let before = order.clone();
		prefer_window(&mut order, 0, 0.0, 1.0, (100.0, 200.0));
		assert_eq!(order, before);
	}
}
