//! Node id generation

use std::sync::atomic::{AtomicU64, Ordering};

use uuid::Uuid;

use crate::data::NodeKind;

/// Source of fresh node ids
///
/// Ids only need to be unique for the life of the process. The kind prefix
/// is a debugging aid and never used to classify a node.
pub trait IdGenerator: Send + Sync {
    fn next_id(&self, kind: NodeKind) -> String;
}

/// Random v4 UUIDs, e.g. `r-6f1c...`
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidIdGenerator;

impl IdGenerator for UuidIdGenerator {
    fn next_id(&self, kind: NodeKind) -> String {
        format!("{}{}", kind.id_prefix(), Uuid::new_v4())
    }
}

/// Counter-based ids (`r-1`, `g-2`, ...) for reproducible trees
#[derive(Debug, Default)]
pub struct SequentialIdGenerator {
    last: AtomicU64,
}

impl SequentialIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// The first id handed out will use `start + 1`
    pub fn starting_after(start: u64) -> Self {
        Self {
            last: AtomicU64::new(start),
        }
    }
}

impl IdGenerator for SequentialIdGenerator {
    fn next_id(&self, kind: NodeKind) -> String {
        let n = self.last.fetch_add(1, Ordering::Relaxed) + 1;
        format!("{}{}", kind.id_prefix(), n)
    }
}

/// Mint ids from `ids` until one is not `taken`
///
/// Guards against input that already holds ids shaped like generated ones,
/// such as `r-2` next to a [`SequentialIdGenerator`].
pub fn next_free_id(
    ids: &dyn IdGenerator,
    kind: NodeKind,
    taken: impl Fn(&str) -> bool,
) -> String {
    loop {
        let id = ids.next_id(kind);
        if !taken(&id) {
            return id;
        }
        tracing::trace!(id, "Minted id already in use, skipping");
    }
}
