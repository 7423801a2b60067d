//! Progress batches for chunked work.
//!
//! Baseline generation walks its (slot, band) work items one batch at a time
//! so progress can be reported between batches while each batch still fans
//! out across the rayon pool.

/// Splits `items` into at most `batch_count` contiguous batches whose sizes
/// differ by at most one, larger batches first. Each batch comes with the
/// number of items finished once it completes.
///
/// # Example
/// ```
/// # use anchorleg::parallel::progress_batches;
/// let work: Vec<(u32, u8)> = (1..=3).flat_map(|slot| (0..7).map(move |band| (slot, band))).collect();
/// let done: Vec<usize> = progress_batches(&work, 4).map(|(_, done)| done).collect();
/// assert_eq!(done, vec![6, 11, 16, 21]);
/// ```
pub fn progress_batches<'a, T>(
    items: &'a [T],
    batch_count: usize,
) -> impl Iterator<Item = (&'a [T], usize)> + 'a {
    let batches = batch_count.min(items.len());
    let (size, larger) = match batches {
        0 => (0, 0),
        n => (items.len() / n, items.len() % n),
    };
    (0..batches).scan(0usize, move |start, index| {
        let end = *start + size + usize::from(index < larger);
        let batch = &items[*start..end];
        *start = end;
        Some((batch, end))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ResultBand;

    fn slate_work(slots: u32) -> Vec<(u32, ResultBand)> {
        (1..=slots)
            .flat_map(|slot| ResultBand::ALL.into_iter().map(move |band| (slot, band)))
            .collect()
    }

    #[test]
    fn standard_slate_splits_into_near_equal_batches() {
        let work = slate_work(10);
        let batches: Vec<(&[(u32, ResultBand)], usize)> = progress_batches(&work, 20).collect();

        assert_eq!(batches.len(), 20);
        let sizes: Vec<usize> = batches.iter().map(|(batch, _)| batch.len()).collect();
        assert_eq!(sizes.iter().filter(|size| **size == 4).count(), 10);
        assert_eq!(sizes.iter().filter(|size| **size == 3).count(), 10);
        assert!(sizes.windows(2).all(|pair| pair[0] >= pair[1]));
        assert_eq!(batches.last().map(|(_, done)| *done), Some(70));
    }

    #[test]
    fn every_work_item_is_visited_once_in_order() {
        let work = slate_work(3);
        let visited: Vec<(u32, ResultBand)> = progress_batches(&work, 20)
            .flat_map(|(batch, _)| batch.iter().copied())
            .collect();
        assert_eq!(visited, work);
    }

    #[test]
    fn done_counts_rise_to_the_total() {
        let work = slate_work(2);
        let done: Vec<usize> = progress_batches(&work, 5).map(|(_, done)| done).collect();
        assert_eq!(done, vec![3, 6, 9, 12, 14]);
    }

    #[test]
    fn empty_slate_or_zero_batches_yield_nothing() {
        assert_eq!(progress_batches(&slate_work(0), 20).count(), 0);
        assert_eq!(progress_batches(&slate_work(4), 0).count(), 0);
    }
}
