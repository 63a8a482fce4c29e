//! Utility types and functions for the crate.

mod ord_items;
mod rand_indices;
mod sized_heap;

pub(crate) use ord_items::MinItem;
pub(crate) use rand_indices::random_unique_indices;
pub(crate) use sized_heap::SizedHeap;
