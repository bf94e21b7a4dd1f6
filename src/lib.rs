//! # Skipjack - an ordered key-value skip list
//! What it says. It skips, and it counts what it skips.
//!
//! Every forward link records the number of elements it jumps over, which turns the list into an
//! order-statistics index: besides the usual insert, lookup and delete, it can report the rank of
//! a key or fetch the entry at a given position.
//!
//! ```
//! use skipjack::SkipList;
//!
//! let mut skiplist = SkipList::new();
//! skiplist.set("ec".to_string(), 3);
//! skiplist.set("dc".to_string(), 2);
//! skiplist.set("ac".to_string(), 1);
//!
//! assert_eq!(skiplist.keys().collect::<Vec<_>>(), ["ac", "dc", "ec"]);
//! assert_eq!(skiplist.rank("dc"), Some(1));
//! ```

pub mod skiplist;
// Re-export the SkipList struct and show at the top level of docs
#[doc(inline)]
pub use crate::skiplist::{NodeRef, SkipList};

mod config;
#[doc(inline)]
pub use crate::config::{SkipListOptions, DEFAULT_PROBABILITY, MAX_LEVEL};

mod error;
#[doc(inline)]
pub use crate::error::SkipListError;

mod level_generator;
#[doc(inline)]
pub use crate::level_generator::{GeometricLevelGenerator, LevelGenerator};
