// ============================================================
// Layer 4 — Batch Padder
// ============================================================
// Sequences in a batch have different lengths, tensors do not.
// Each row is padded on the RIGHT up to the longest row:
//
//   lengths [3, 1, 2], pad = 3
//
//   [ 7  8  9 ]        [ 7  8  9 ]
//   [ 5 ]         →    [ 5  3  3 ]
//   [ 4  6 ]           [ 4  6  3 ]
//
// Row i is untouched before position lengths[i] and holds
// only the padding index from there on.
//
// The companion extra-zeros buffer gives every example of a
// copy-mode batch room for the largest OOV list in the batch;
// shorter lists simply leave their trailing slots at zero.

/// A right-padded batch of index sequences.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaddedBatch {
    /// `batch_size` rows of exactly `max_length` entries each
    pub rows:       Vec<Vec<usize>>,
    /// True length of every row
    pub lengths:    Vec<usize>,
    /// `max(lengths)`, 0 for an empty batch
    pub max_length: usize,
}

impl PaddedBatch {
    pub fn batch_size(&self) -> usize {
        self.rows.len()
    }

    /// Row-major flattening, converted for Burn's Int tensors
    pub fn flat_i32(&self) -> Vec<i32> {
        self.rows
            .iter()
            .flat_map(|row| row.iter().map(|&x| x as i32))
            .collect()
    }

    pub fn lengths_i32(&self) -> Vec<i32> {
        self.lengths.iter().map(|&l| l as i32).collect()
    }
}

/// Right-pad `idx[i]` to the batch maximum of `length` with `padding_idx`.
///
/// Only the first `length[i]` entries of row i are kept.
pub fn pad_sequence(idx: &[Vec<usize>], length: &[usize], padding_idx: usize) -> PaddedBatch {
    let max_length = length.iter().copied().max().unwrap_or(0);

    let rows = idx
        .iter()
        .zip(length)
        .map(|(sent_idx, &sent_length)| {
            let mut row = Vec::with_capacity(max_length);
            row.extend(sent_idx.iter().copied().take(sent_length));
            row.resize(max_length, padding_idx);
            row
        })
        .collect();

    PaddedBatch {
        rows,
        lengths: length.to_vec(),
        max_length,
    }
}

/// Shape `(batch_size, max_oov_count)` of the extra-vocabulary buffer
pub fn extra_zeros_shape(oovs: &[Vec<String>]) -> [usize; 2] {
    let max_oovs_num = oovs.iter().map(Vec::len).max().unwrap_or(0);
    [oovs.len(), max_oovs_num]
}

/// Zero-filled extra-vocabulary scores, one row per example
pub fn get_extra_zeros(oovs: &[Vec<String>]) -> Vec<Vec<f32>> {
    let [batch_size, max_oovs_num] = extra_zeros_shape(oovs);
    vec![vec![0.0; max_oovs_num]; batch_size]
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    #[test]
    fn test_pads_to_longest_row() {
        let idx = vec![vec![7, 8, 9], vec![5], vec![4, 6]];
        let padded = pad_sequence(&idx, &[3, 1, 2], 3);
        assert_eq!(padded.max_length, 3);
        assert_eq!(padded.rows, vec![vec![7, 8, 9], vec![5, 3, 3], vec![4, 6, 3]]);
        assert_eq!(padded.lengths, vec![3, 1, 2]);
        assert_eq!(padded.flat_i32(), vec![7, 8, 9, 5, 3, 3, 4, 6, 3]);
    }

    #[test]
    fn test_padding_invariant_on_random_batches() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            let batch_size = rng.gen_range(1..8);
            let idx: Vec<Vec<usize>> = (0..batch_size)
                .map(|_| {
                    let len = rng.gen_range(0..12);
                    (0..len).map(|_| rng.gen_range(4..100)).collect()
                })
                .collect();
            let lengths: Vec<usize> = idx.iter().map(Vec::len).collect();
            let padded = pad_sequence(&idx, &lengths, 3);

            assert_eq!(padded.max_length, *lengths.iter().max().unwrap());
            for (i, row) in padded.rows.iter().enumerate() {
                assert_eq!(row.len(), padded.max_length);
                for j in 0..padded.max_length {
                    if j < lengths[i] {
                        assert_eq!(row[j], idx[i][j]);
                    } else {
                        assert_eq!(row[j], 3);
                    }
                }
            }
        }
    }

    #[test]
    fn test_length_shorter_than_row_truncates() {
        let padded = pad_sequence(&[vec![1, 2, 3], vec![4]], &[2, 1], 0);
        assert_eq!(padded.rows, vec![vec![1, 2], vec![4, 0]]);
    }

    #[test]
    fn test_empty_batch() {
        let padded = pad_sequence(&[], &[], 3);
        assert_eq!(padded.batch_size(), 0);
        assert_eq!(padded.max_length, 0);
    }

    #[test]
    fn test_extra_zeros_sized_by_largest_oov_list() {
        let oovs = vec![
            vec!["fox".to_string()],
            vec![],
            vec!["owl".to_string(), "hen".to_string(), "elk".to_string()],
        ];
        assert_eq!(extra_zeros_shape(&oovs), [3, 3]);
        let zeros = get_extra_zeros(&oovs);
        assert_eq!(zeros.len(), 3);
        assert!(zeros.iter().all(|r| r.len() == 3 && r.iter().all(|&v| v == 0.0)));
    }

    #[test]
    fn test_extra_zeros_without_oovs() {
        let oovs = vec![vec![], vec![]];
        assert_eq!(extra_zeros_shape(&oovs), [2, 0]);
    }
}
