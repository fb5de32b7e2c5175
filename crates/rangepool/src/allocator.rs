//! Stateless selection of the next free item.
//!
//! The search continues from the namespace's latest cursor before wrapping
//! around to `min`, so freshly freed low values are not handed out again until
//! the cursor has passed `max`. Everything here is pure: no I/O, no state.

use std::collections::BTreeSet;

use crate::error::{Error, Result};

/// Validate range bounds.
pub fn validate_range(min: u64, max: u64) -> Result<()> {
    if min >= max {
        return Err(Error::execution_failed(format!(
            "min ({min}) must be lower than max ({max})"
        )));
    }
    Ok(())
}

/// Validate the arguments of a batch allocation.
pub fn validate_batch(count: usize, min: u64, max: u64) -> Result<()> {
    if count == 0 {
        return Err(Error::execution_failed("count must be greater than zero"));
    }
    validate_range(min, max)
}

fn validate_latest(min: u64, max: u64, latest: Option<u64>) -> Result<()> {
    if let Some(latest) = latest {
        if latest < min {
            return Err(Error::execution_failed(format!(
                "latest ({latest}) must not be lower than min ({min})"
            )));
        }
        if latest > max {
            return Err(Error::execution_failed(format!(
                "latest ({latest}) must not be greater than max ({max})"
            )));
        }
    }
    Ok(())
}

/// Number of values in `[min, max]` not in `used`.
///
/// Saturates at `u64::MAX` for the full `u64` range; an empty range
/// (`min > max`) has no free values.
pub fn free_count(used: &BTreeSet<u64>, min: u64, max: u64) -> u64 {
    if min > max {
        return 0;
    }
    let width = (max - min).saturating_add(1);
    let in_use = u64::try_from(used.range(min..=max).count()).unwrap_or(u64::MAX);
    width.saturating_sub(in_use)
}

/// Pick the next item to allocate.
///
/// `used` holds the items already allocated in the namespace. `latest` is the
/// namespace cursor, `None` when nothing was ever allocated.
///
/// Phase one scans `latest + 1 ..= max`, phase two scans `min ..= max`; the
/// first value not in `used` wins.
///
/// # Errors
/// - `ExecutionFailed` if `min >= max` or `latest` lies outside `[min, max]`
/// - `CapacityReached` if no value in `[min, max]` is free
pub fn next_item(used: &BTreeSet<u64>, min: u64, max: u64, latest: Option<u64>) -> Result<u64> {
    validate_range(min, max)?;
    validate_latest(min, max, latest)?;

    let continued = latest
        .and_then(|latest| latest.checked_add(1))
        .and_then(|start| first_free(used, start, max));

    continued
        .or_else(|| first_free(used, min, max))
        .ok_or(Error::CapacityReached { min, max })
}

/// Allocate `count` items in one batch.
///
/// Each chosen item is folded into `used` before the next pick, so a batch
/// never repeats a value. `latest` stays the cursor read before the batch.
/// Nothing is returned unless the whole batch fits; a batch larger than the
/// free values fails with `CapacityReached` before `used` is touched.
pub fn allocate(
    used: &mut BTreeSet<u64>,
    count: usize,
    min: u64,
    max: u64,
    latest: Option<u64>,
) -> Result<Vec<u64>> {
    validate_batch(count, min, max)?;
    validate_latest(min, max, latest)?;

    let free = free_count(used, min, max);
    let fits = u64::try_from(count).is_ok_and(|count| count <= free);
    if !fits {
        return Err(Error::CapacityReached { min, max });
    }

    let mut items = Vec::new();
    for _ in 0..count {
        let item = next_item(used, min, max, latest)?;
        used.insert(item);
        items.push(item);
    }
    Ok(items)
}

/// Lowest value in `lo ..= hi` that is not in `used`.
///
/// Walks only the used values inside the window, so the cost depends on how
/// crowded the window is rather than on its width.
fn first_free(used: &BTreeSet<u64>, lo: u64, hi: u64) -> Option<u64> {
    if lo > hi {
        return None;
    }

    let mut candidate = lo;
    for &item in used.range(lo..=hi) {
        if item != candidate {
            return Some(candidate);
        }
        if candidate == hi {
            return None;
        }
        candidate += 1;
    }
    Some(candidate)
}
