use burn::data::dataset::Dataset;

use crate::domain::example::IndexedExample;

/// An indexed split, served to Burn's DataLoader one example at a time.
#[derive(Debug, Clone, Default)]
pub struct Seq2SeqDataset {
    examples: Vec<IndexedExample>,
}

impl Seq2SeqDataset {
    pub fn new(examples: Vec<IndexedExample>) -> Self { Self { examples } }

    pub fn examples(&self) -> &[IndexedExample] { &self.examples }

    /// True if the examples carry copy-mode OOV extensions
    pub fn is_gen(&self) -> bool {
        self.examples.first().map_or(false, IndexedExample::is_gen)
    }
}

impl Dataset<IndexedExample> for Seq2SeqDataset {
    fn get(&self, index: usize) -> Option<IndexedExample> {
        self.examples.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.examples.len()
    }
}
