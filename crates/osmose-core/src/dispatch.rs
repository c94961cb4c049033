//! Partition of cells into worker batches of similar school counts.

/// Assign every cell to one of `n_batches` batches and return the batch index
/// of each cell.
///
/// Cells are accumulated in order until a batch reaches its share of the
/// remaining schools; a cell that would overshoot joins the batch only if that
/// lands closer to the share. When that contiguous split leaves batches further
/// apart than the largest cell, cells are instead handed out largest first to
/// the least loaded batch.
pub fn partition(counts: &[usize], n_batches: usize) -> Vec<usize> {
    let n_batches = n_batches.max(1);
    if counts.is_empty() {
        return Vec::new();
    }
    let contiguous = contiguous_partition(counts, n_batches);
    let largest = counts.iter().copied().max().unwrap_or(0);
    if spread(counts, &contiguous, n_batches) <= largest {
        contiguous
    } else {
        least_loaded_partition(counts, n_batches)
    }
}

/// Total school count of each batch.
pub fn batch_loads(counts: &[usize], assignment: &[usize], n_batches: usize) -> Vec<usize> {
    let mut loads = vec![0; n_batches.max(1)];
    for (&count, &batch) in counts.iter().zip(assignment) {
        loads[batch] += count;
    }
    loads
}

fn spread(counts: &[usize], assignment: &[usize], n_batches: usize) -> usize {
    let loads = batch_loads(counts, assignment, n_batches);
    let max = loads.iter().copied().max().unwrap_or(0);
    let min = loads.iter().copied().min().unwrap_or(0);
    max - min
}

fn contiguous_partition(counts: &[usize], n_batches: usize) -> Vec<usize> {
    let mut assignment = Vec::with_capacity(counts.len());
    let mut remaining: usize = counts.iter().sum();
    let mut batch = 0;
    let mut load = 0usize;
    let mut cells_in_batch = 0usize;
    for &count in counts {
        let batches_left = n_batches - batch;
        if batches_left > 1 && cells_in_batch > 0 {
            let target = remaining as f64 / batches_left as f64;
            let with = (load + count) as f64;
            if with > target && (with - target) > (target - load as f64) {
                // Closer to the target without this cell: close the batch.
                remaining -= load;
                batch += 1;
                load = 0;
                cells_in_batch = 0;
            }
        }
        assignment.push(batch);
        load += count;
        cells_in_batch += 1;
        let batches_left = n_batches - batch;
        if batches_left > 1 {
            let target = remaining as f64 / batches_left as f64;
            if load as f64 >= target {
                remaining -= load;
                batch += 1;
                load = 0;
                cells_in_batch = 0;
            }
        }
    }
    assignment
}

fn least_loaded_partition(counts: &[usize], n_batches: usize) -> Vec<usize> {
    let mut order: Vec<usize> = (0..counts.len()).collect();
    order.sort_by(|&a, &b| counts[b].cmp(&counts[a]).then(a.cmp(&b)));
    let mut loads = vec![0usize; n_batches];
    let mut assignment = vec![0; counts.len()];
    for cell in order {
        let batch = loads
            .iter()
            .enumerate()
            .min_by_key(|&(idx, &load)| (load, idx))
            .map(|(idx, _)| idx)
            .unwrap_or(0);
        loads[batch] += counts[cell];
        assignment[cell] = batch;
    }
    assignment
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn even_cells_split_evenly() {
        let counts = vec![5; 8];
        let assignment = partition(&counts, 4);
        assert_eq!(batch_loads(&counts, &assignment, 4), vec![10, 10, 10, 10]);
        // Contiguous split keeps neighbouring cells together.
        assert_eq!(assignment, vec![0, 0, 1, 1, 2, 2, 3, 3]);
    }

    #[test]
    fn single_batch_takes_everything() {
        let counts = vec![3, 0, 9, 1];
        assert_eq!(partition(&counts, 1), vec![0, 0, 0, 0]);
        assert_eq!(partition(&counts, 0), vec![0, 0, 0, 0]);
    }

    #[test]
    fn more_batches_than_cells_leaves_some_empty() {
        let counts = vec![4, 6];
        let assignment = partition(&counts, 5);
        let loads = batch_loads(&counts, &assignment, 5);
        assert_eq!(loads.iter().sum::<usize>(), 10);
        assert!(loads.iter().max().unwrap() - loads.iter().min().unwrap() <= 6);
    }

    #[test]
    fn skewed_layout_falls_back_to_least_loaded() {
        let counts = vec![1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 20, 20];
        let assignment = partition(&counts, 3);
        let loads = batch_loads(&counts, &assignment, 3);
        let spread = loads.iter().max().unwrap() - loads.iter().min().unwrap();
        assert!(spread <= 20);
        assert_eq!(loads.iter().sum::<usize>(), 50);
    }

    proptest! {
        #[test]
        fn batch_spread_is_bounded_by_largest_cell(
            counts in prop::collection::vec(0usize..60, 1..80),
            n_batches in 1usize..12,
        ) {
            let assignment = partition(&counts, n_batches);
            prop_assert_eq!(assignment.len(), counts.len());
            prop_assert!(assignment.iter().all(|&b| b < n_batches));
            let loads = batch_loads(&counts, &assignment, n_batches);
            prop_assert_eq!(loads.iter().sum::<usize>(), counts.iter().sum::<usize>());
            let largest = *counts.iter().max().unwrap();
            let spread = loads.iter().max().unwrap() - loads.iter().min().unwrap();
            prop_assert!(spread <= largest);
        }
    }
}
