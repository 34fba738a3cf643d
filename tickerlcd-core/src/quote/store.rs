//! Fixed-size quote store
//!
//! Holds one record per configured symbol. The number of records is a
//! const generic, so the store never grows or shrinks; index 0 is the first
//! configured symbol and index order is display order.

use core::ops::Index;

use super::parser::QuoteUpdate;
use super::record::QuoteRecord;
use crate::config::{ConfigError, SymbolConfig};

/// Ordered, fixed-size collection of quote records
#[derive(Debug, Clone, PartialEq)]
pub struct QuoteStore<const N: usize> {
    records: [QuoteRecord; N],
}

impl<const N: usize> QuoteStore<N> {
    const NOT_EMPTY: () = assert!(N > 0, "a quote store needs at least one symbol");

    /// Build the store from the configured symbols
    pub fn new(symbols: &[SymbolConfig<'_>; N]) -> Result<Self, ConfigError> {
        #[allow(clippy::let_unit_value)]
        let () = Self::NOT_EMPTY;

        let mut records: [QuoteRecord; N] = core::array::from_fn(|_| QuoteRecord::empty());
        for (slot, config) in records.iter_mut().zip(symbols.iter()) {
            *slot = QuoteRecord::new(config)?;
        }
        Ok(Self { records })
    }

    /// Number of records (the configured symbol count)
    pub const fn len(&self) -> usize {
        N
    }

    /// Always false; a store holds at least one record
    pub const fn is_empty(&self) -> bool {
        N == 0
    }

    pub fn get(&self, index: usize) -> Option<&QuoteRecord> {
        self.records.get(index)
    }

    /// Apply a parsed update to the record at `index`
    ///
    /// Returns false if the index is out of range.
    pub fn apply(&mut self, index: usize, update: &QuoteUpdate) -> bool {
        match self.records.get_mut(index) {
            Some(record) => {
                record.apply(update);
                true
            }
            None => false,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &QuoteRecord> {
        self.records.iter()
    }

    pub fn records(&self) -> &[QuoteRecord] {
        &self.records
    }
}

impl<const N: usize> Index<usize> for QuoteStore<N> {
    type Output = QuoteRecord;

    fn index(&self, index: usize) -> &QuoteRecord {
        &self.records[index]
    }
}
