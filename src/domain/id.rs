use std::sync::{LazyLock, Mutex};

use uuid::{ContextV7, Timestamp, Uuid};

// ContextV7 keeps its counter in a Cell, so the shared static needs the
// mutex even though contention here is negligible.
static CONTEXT: LazyLock<Mutex<ContextV7>> = LazyLock::new(|| Mutex::new(ContextV7::new()));

/// Mint a UUIDv7 whose string form sorts by creation time.
///
/// Message identifiers double as pagination cursors, so ids minted by one
/// process must compare consistently with creation order even within a single
/// millisecond. `ContextV7` adds the monotonic counter bits that plain
/// `Uuid::now_v7` does not guarantee.
pub(crate) fn sortable_uuid() -> Uuid {
    let context = CONTEXT.lock().unwrap_or_else(|e| e.into_inner());
    Uuid::new_v7(Timestamp::now(&*context))
}
