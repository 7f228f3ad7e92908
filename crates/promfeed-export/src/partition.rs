//! Splitting the merged offer list into output documents.

use std::fmt;

use crate::error::ExportError;

/// How merged offers are spread over output artifacts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartitionPolicy {
    /// `ceil(N / C)` contiguous chunks of at most `C` offers. An empty input
    /// yields a single empty chunk.
    ChunkSize(usize),
    /// Exactly `K` slots of `floor(N / K)` offers; the remainder goes to the
    /// last slot, which may therefore exceed the others.
    FixedSlots(usize),
}

impl fmt::Display for PartitionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ChunkSize(c) => write!(f, "chunk-size({c})"),
            Self::FixedSlots(k) => write!(f, "fixed-slots({k})"),
        }
    }
}

/// Splits `items` into contiguous, order-preserving slices.
///
/// Concatenating the returned slices always reproduces `items`.
///
/// # Errors
///
/// Returns [`ExportError::InvalidPolicy`] when the chunk size or slot count
/// is zero.
pub fn partition<'a, T>(
    items: &'a [T],
    policy: &PartitionPolicy,
) -> Result<Vec<&'a [T]>, ExportError> {
    match *policy {
        PartitionPolicy::ChunkSize(0) => Err(ExportError::InvalidPolicy(
            "chunk size must be greater than zero".to_string(),
        )),
        PartitionPolicy::FixedSlots(0) => Err(ExportError::InvalidPolicy(
            "slot count must be greater than zero".to_string(),
        )),
        PartitionPolicy::ChunkSize(_) if items.is_empty() => Ok(vec![items]),
        PartitionPolicy::ChunkSize(size) => Ok(items.chunks(size).collect()),
        PartitionPolicy::FixedSlots(slots) => {
            let base = items.len() / slots;
            let mut out = Vec::with_capacity(slots);
            for slot in 0..slots {
                let start = slot * base;
                let end = if slot + 1 == slots {
                    items.len()
                } else {
                    start + base
                };
                out.push(&items[start..end]);
            }
            Ok(out)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sizes<T>(parts: &[&[T]]) -> Vec<usize> {
        parts.iter().map(|p| p.len()).collect()
    }

    #[test]
    fn chunk_size_caps_each_chunk() {
        let items: Vec<u32> = (0..45_000).collect();
        let parts = partition(&items, &PartitionPolicy::ChunkSize(20_000)).unwrap();
        assert_eq!(sizes(&parts), vec![20_000, 20_000, 5_000]);
    }

    #[test]
    fn fixed_slots_put_remainder_in_last_slot() {
        let items: Vec<u32> = (0..45_001).collect();
        let parts = partition(&items, &PartitionPolicy::FixedSlots(2)).unwrap();
        assert_eq!(sizes(&parts), vec![22_500, 22_501]);
    }

    #[test]
    fn partitions_concatenate_to_input() {
        let items: Vec<u32> = (0..17).collect();
        for policy in [
            PartitionPolicy::ChunkSize(5),
            PartitionPolicy::FixedSlots(3),
            PartitionPolicy::FixedSlots(20),
        ] {
            let parts = partition(&items, &policy).unwrap();
            let joined: Vec<u32> = parts.concat();
            assert_eq!(joined, items, "policy {policy}");
        }
    }

    #[test]
    fn more_slots_than_items_leaves_leading_slots_empty() {
        let items = [1, 2, 3];
        let parts = partition(&items, &PartitionPolicy::FixedSlots(5)).unwrap();
        assert_eq!(sizes(&parts), vec![0, 0, 0, 0, 3]);
    }

    #[test]
    fn empty_input_yields_one_empty_chunk() {
        let items: [u32; 0] = [];
        let parts = partition(&items, &PartitionPolicy::ChunkSize(10)).unwrap();
        assert_eq!(sizes(&parts), vec![0]);
    }

    #[test]
    fn empty_input_with_fixed_slots_yields_empty_slots() {
        let items: [u32; 0] = [];
        let parts = partition(&items, &PartitionPolicy::FixedSlots(2)).unwrap();
        assert_eq!(sizes(&parts), vec![0, 0]);
    }

    #[test]
    fn zero_sizes_are_rejected() {
        let items = [1, 2];
        assert!(matches!(
            partition(&items, &PartitionPolicy::ChunkSize(0)),
            Err(ExportError::InvalidPolicy(_))
        ));
        assert!(matches!(
            partition(&items, &PartitionPolicy::FixedSlots(0)),
            Err(ExportError::InvalidPolicy(_))
        ));
    }
}
