// ============================================================
// Layer 4 — Seq2Seq Batcher
// ============================================================
// Implements Burn's Batcher trait to turn a Vec<IndexedExample>
// into tensors the model can consume.
//
// Every variable-length field goes through the Batch Padder
// first, then is flattened and reshaped:
//
//   rows [[7 8 9] [5 3 3]] → [7 8 9 5 3 3] → Tensor [2, 3]
//
// Output per batch:
//   source_idx          [batch, max_source_len]   Int
//   source_length       [batch]                   Int
//   input_target_idx    [batch, max_target_len]   Int
//   output_target_idx   [batch, max_target_len]   Int
//   target_length       [batch]                   Int
//   copy (generation mode only):
//     extended_source_idx [batch, max_source_len] Int
//     extra_zeros         [batch, max_oovs]       Float, all zero
//     oovs                per-example OOV token lists
//
// Reference: Burn Book §4 (Batcher)

use burn::{
    data::dataloader::{batcher::Batcher, DataLoader},
    prelude::*,
};
use std::sync::Arc;

use crate::data::padding::{extra_zeros_shape, pad_sequence, PaddedBatch};
use crate::domain::{example::IndexedExample, special_tokens::SpecialToken, traits::BatchSource};

// ─── Seq2SeqBatch ─────────────────────────────────────────────────────────────
/// Copy-mode tensors of a batch.
#[derive(Debug, Clone)]
pub struct CopyBatch<B: Backend> {
    pub extended_source_idx: Tensor<B, 2, Int>,
    pub extra_zeros:         Tensor<B, 2>,
    pub oovs:                Vec<Vec<String>>,
}

/// A padded batch of indexed examples.
#[derive(Debug, Clone)]
pub struct Seq2SeqBatch<B: Backend> {
    pub source_idx:        Tensor<B, 2, Int>,
    pub source_length:     Tensor<B, 1, Int>,
    pub input_target_idx:  Tensor<B, 2, Int>,
    pub output_target_idx: Tensor<B, 2, Int>,
    pub target_length:     Tensor<B, 1, Int>,
    pub copy:              Option<CopyBatch<B>>,
}

impl<B: Backend> Seq2SeqBatch<B> {
    pub fn batch_size(&self) -> usize {
        self.source_length.dims()[0]
    }
}

// ─── Seq2SeqBatcher ───────────────────────────────────────────────────────────
#[derive(Clone, Debug)]
pub struct Seq2SeqBatcher<B: Backend> {
    /// The device to create tensors on
    pub device: B::Device,
    /// Index written into padding positions
    pub padding_idx: usize,
}

impl<B: Backend> Seq2SeqBatcher<B> {
    /// Batcher padding with the vocabulary's `<pad>` index
    pub fn new(device: B::Device) -> Self {
        Self { device, padding_idx: SpecialToken::Pad.index() }
    }

    fn int_grid(&self, padded: &PaddedBatch) -> Tensor<B, 2, Int> {
        Tensor::<B, 1, Int>::from_ints(padded.flat_i32().as_slice(), &self.device)
            .reshape([padded.batch_size(), padded.max_length])
    }

    fn int_vector(&self, values: &[i32]) -> Tensor<B, 1, Int> {
        Tensor::<B, 1, Int>::from_ints(values, &self.device)
    }
}

impl<B: Backend> Batcher<IndexedExample, Seq2SeqBatch<B>> for Seq2SeqBatcher<B> {
    fn batch(&self, items: Vec<IndexedExample>) -> Seq2SeqBatch<B> {
        let source_lengths: Vec<usize> = items.iter().map(|e| e.source_length).collect();
        let target_lengths: Vec<usize> = items.iter().map(|e| e.target_length).collect();

        // ── Pad every variable-length field ─────────────────────────────────
        let source_rows: Vec<Vec<usize>> = items.iter().map(|e| e.source_idx.clone()).collect();
        let input_rows: Vec<Vec<usize>> = items.iter().map(|e| e.input_target_idx.clone()).collect();
        let output_rows: Vec<Vec<usize>> = items.iter().map(|e| e.output_target_idx.clone()).collect();

        let source = pad_sequence(&source_rows, &source_lengths, self.padding_idx);
        let input_target = pad_sequence(&input_rows, &target_lengths, self.padding_idx);
        let output_target = pad_sequence(&output_rows, &target_lengths, self.padding_idx);

        // ── Copy-mode extension ──────────────────────────────────────────────
        // A batch is in copy mode when its examples carry OOV extensions.
        let copy = if items.iter().all(IndexedExample::is_gen) && !items.is_empty() {
            let extended_rows: Vec<Vec<usize>> = items
                .iter()
                .filter_map(|e| e.extension.as_ref())
                .map(|x| x.extended_source_idx.clone())
                .collect();
            let oovs: Vec<Vec<String>> = items.iter().map(|e| e.oovs().to_vec()).collect();
            let extended = pad_sequence(&extended_rows, &source_lengths, self.padding_idx);

            Some(CopyBatch {
                extended_source_idx: self.int_grid(&extended),
                extra_zeros:         Tensor::<B, 2>::zeros(extra_zeros_shape(&oovs), &self.device),
                oovs,
            })
        } else {
            None
        };

        Seq2SeqBatch {
            source_idx:        self.int_grid(&source),
            source_length:     self.int_vector(&source.lengths_i32()),
            input_target_idx:  self.int_grid(&input_target),
            output_target_idx: self.int_grid(&output_target),
            target_length:     self.int_vector(&input_target.lengths_i32()),
            copy,
        }
    }
}

// ─── BatchedLoader ────────────────────────────────────────────────────────────
/// A Burn DataLoader plus the batch size it was built with, so the
/// trainer can walk it once per epoch and knows how many batches
/// an epoch has.
pub struct BatchedLoader<O> {
    loader:     Arc<dyn DataLoader<O>>,
    batch_size: usize,
}

impl<O> BatchedLoader<O> {
    pub fn new(loader: Arc<dyn DataLoader<O>>, batch_size: usize) -> Self {
        Self { loader, batch_size: batch_size.max(1) }
    }

    pub fn num_items(&self) -> usize {
        self.loader.num_items()
    }
}

impl<O: 'static> BatchSource for BatchedLoader<O> {
    type Batch = O;

    fn batches(&self) -> Box<dyn Iterator<Item = O> + '_> {
        Box::new(self.loader.iter())
    }

    fn num_batches(&self) -> Option<usize> {
        Some(self.num_items().div_ceil(self.batch_size))
    }
}
