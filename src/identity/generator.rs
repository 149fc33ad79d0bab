//! Identifier generation.
//!
//! Every identifier is a short prefix followed by 16 random bytes rendered as
//! 32 lowercase hex digits, e.g. `session_3f2a...`. When the OS random source
//! is unavailable the suffix degrades to `<unix nanos>_<counter>_<noise>`,
//! which is still unique within one process.

use rand::rngs::OsRng;
use rand::RngCore;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

const SESSION_PREFIX: &str = "session";
const CORRELATION_PREFIX: &str = "corr";
const TRACE_PREFIX: &str = "trace";
const SPAN_PREFIX: &str = "span";

/// Monotonic discriminator for the fallback path.
static FALLBACK_SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Identifier for one client instantiation.
pub fn new_session_id() -> String {
    generate(SESSION_PREFIX)
}

/// Identifier for one logical interaction chain.
pub fn new_correlation_id() -> String {
    generate(CORRELATION_PREFIX)
}

/// Identifier grouping the spans of one traced operation.
pub fn new_trace_id() -> String {
    generate(TRACE_PREFIX)
}

/// Identifier for a single span.
pub fn new_span_id() -> String {
    generate(SPAN_PREFIX)
}

fn generate(prefix: &str) -> String {
    match secure_suffix() {
        Some(suffix) => format!("{}_{}", prefix, suffix),
        None => {
            tracing::debug!(prefix, "OS random source unavailable, using fallback identifier");
            fallback_id(prefix)
        }
    }
}

fn secure_suffix() -> Option<String> {
    let mut bytes = [0u8; 16];
    OsRng.try_fill_bytes(&mut bytes).ok()?;
    Some(Uuid::from_bytes(bytes).simple().to_string())
}

/// Timestamp-derived identifier used when no secure source is available.
pub(crate) fn fallback_id(prefix: &str) -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let sequence = FALLBACK_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    format!("{}_{}_{}_{:08x}", prefix, nanos, sequence, fastrand::u32(..))
}
