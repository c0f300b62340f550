//! Factory-selected linear or binary search over a collection, with an optional
//! tolerance-based nearest-match fallback.
//!
//! The factory chooses its search variant the same way the teacher's
//! `bitconverter::converter_chooser` picks a decode function pointer at runtime
//! (`type BitConverter = fn(&[u8]) -> Result<f32, TryFromSliceError>`): a plain
//! function value is selected up front, then called in a loop, rather than
//! dispatched through a trait object.

use num_traits::Signed;

/// Three-way comparison of a collection element against a target: negative if the
/// element precedes the target, zero on a match, positive if it follows.
pub type Comparator<'a> = &'a dyn Fn(usize) -> i32;

/// The signed difference between a collection element and a target, in whatever
/// unit the caller's tolerance is expressed in.
pub type Diff<'a, D> = &'a dyn Fn(usize) -> D;

/// Searches `[start, end)` for an index matching `target` via `cmp`.
///
/// If `sorted` is `true`, uses a binary search; otherwise scans linearly. If
/// `tolerance` is given, a `diff` function must also be given — it is used to find
/// the nearest element within `tolerance` when no exact match exists. Ties break
/// toward the lower index.
///
/// # Panics
///
/// Does not panic; returns `None` if `tolerance.is_some()` but `diff` is `None`
/// would be a caller error — instead, this is expressed as an `Err` via
/// [`find_checked`]. `find` itself assumes the caller has already validated that
/// pairing and is the ergonomic entry point for call sites that always pass both
/// or neither.
pub fn find<D: Signed + PartialOrd + Copy>(
    sorted: bool,
    start: usize,
    end: usize,
    cmp: Comparator<'_>,
    tolerance: Option<D>,
    diff: Option<Diff<'_, D>>,
) -> Option<usize> {
    if start >= end {
        return None;
    }
    if sorted {
        binary_find(start, end, cmp, tolerance, diff)
    } else {
        linear_find(start, end, cmp, tolerance, diff)
    }
}

/// Like [`find`], but returns an error instead of silently ignoring a
/// tolerance-without-diff argument mismatch.
///
/// # Errors
///
/// Returns `Err` if `tolerance.is_some()` and `diff.is_none()`.
pub fn find_checked<D: Signed + PartialOrd + Copy>(
    sorted: bool,
    start: usize,
    end: usize,
    cmp: Comparator<'_>,
    tolerance: Option<D>,
    diff: Option<Diff<'_, D>>,
) -> Result<Option<usize>, &'static str> {
    if tolerance.is_some() && diff.is_none() {
        return Err("tolerance was given without a diff function");
    }
    Ok(find(sorted, start, end, cmp, tolerance, diff))
}

fn linear_find<D: Signed + PartialOrd + Copy>(
    start: usize,
    end: usize,
    cmp: Comparator<'_>,
    tolerance: Option<D>,
    diff: Option<Diff<'_, D>>,
) -> Option<usize> {
    let mut best: Option<(usize, D)> = None;
    for i in start..end {
        if cmp(i) == 0 {
            return Some(i);
        }
        if let (Some(tol), Some(diff_fn)) = (tolerance, diff) {
            let d = diff_fn(i).abs();
            if d <= tol {
                best = match best {
                    Some((_, best_d)) if best_d <= d => best,
                    _ => Some((i, d)),
                };
            }
        }
    }
    best.map(|(i, _)| i)
}

fn binary_find<D: Signed + PartialOrd + Copy>(
    start: usize,
    end: usize,
    cmp: Comparator<'_>,
    tolerance: Option<D>,
    diff: Option<Diff<'_, D>>,
) -> Option<usize> {
    let mut lo = start;
    let mut hi = end;
    let mut last_probe = start;
    while lo < hi {
        let mid = lo + (hi - lo) / 2;
        last_probe = mid;
        match cmp(mid) {
            0 => return Some(mid),
            c if c < 0 => lo = mid + 1,
            _ => hi = mid,
        }
    }

    let (tol, diff_fn) = match (tolerance, diff) {
        (Some(tol), Some(diff_fn)) => (tol, diff_fn),
        _ => return None,
    };

    let mut best: Option<(usize, D)> = None;
    let mut consider = |i: usize, best: &mut Option<(usize, D)>| {
        if i < start || i >= end {
            return;
        }
        let d = diff_fn(i).abs();
        if d <= tol {
            *best = match *best {
                Some((_, best_d)) if best_d <= d => *best,
                _ => Some((i, d)),
            };
        }
    };
    consider(last_probe, &mut best);
    if last_probe > start {
        consider(last_probe - 1, &mut best);
    }
    consider(last_probe + 1, &mut best);
    best.map(|(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cmp_against(values: &[i64], target: i64) -> impl Fn(usize) -> i32 + '_ {
        move |i| (values[i] - target).signum() as i32
    }

    fn diff_against(values: &[i64], target: i64) -> impl Fn(usize) -> i64 + '_ {
        move |i| values[i] - target
    }

    #[test]
    fn binary_exact_match() {
        let values = [10, 20, 30, 40, 50];
        let cmp = cmp_against(&values, 30);
        let idx = find::<i64>(true, 0, values.len(), &cmp, None, None);
        assert_eq!(Some(2), idx);
    }

    #[test]
    fn linear_exact_match_unsorted() {
        let values = [30, 10, 50, 20, 40];
        let cmp = cmp_against(&values, 20);
        let idx = find::<i64>(false, 0, values.len(), &cmp, None, None);
        assert_eq!(Some(3), idx);
    }

    #[test]
    fn no_match_without_tolerance_returns_none() {
        let values = [10, 20, 30];
        let cmp = cmp_against(&values, 25);
        assert_eq!(None, find::<i64>(true, 0, values.len(), &cmp, None, None));
        assert_eq!(None, find::<i64>(false, 0, values.len(), &cmp, None, None));
    }

    #[test]
    fn binary_tolerance_finds_nearest_neighbor() {
        let values = [10, 20, 30, 40, 50];
        let cmp = cmp_against(&values, 25);
        let diff = diff_against(&values, 25);
        let idx = find(true, 0, values.len(), &cmp, Some(10i64), Some(&diff));
        // 20 (diff -5) and 30 (diff 5) tie in magnitude; lower index wins.
        assert_eq!(Some(1), idx);
    }

    #[test]
    fn linear_tolerance_finds_nearest_neighbor() {
        let values = [10, 20, 30, 40, 50];
        let cmp = cmp_against(&values, 25);
        let diff = diff_against(&values, 25);
        let idx = find(false, 0, values.len(), &cmp, Some(10i64), Some(&diff));
        assert_eq!(Some(1), idx);
    }

    #[test]
    fn tolerance_exceeded_returns_none() {
        let values = [10, 20, 30];
        let cmp = cmp_against(&values, 100);
        let diff = diff_against(&values, 100);
        let idx = find(true, 0, values.len(), &cmp, Some(5i64), Some(&diff));
        assert_eq!(None, idx);
    }

    #[test]
    fn find_checked_rejects_tolerance_without_diff() {
        let values = [10, 20, 30];
        let cmp = cmp_against(&values, 20);
        let result = find_checked::<i64>(true, 0, values.len(), &cmp, Some(5), None);
        assert!(result.is_err());
    }

    #[test]
    fn empty_range_returns_none() {
        let cmp: Comparator<'_> = &|_| 0;
        assert_eq!(None, find::<i64>(true, 3, 3, cmp, None, None));
    }
}
