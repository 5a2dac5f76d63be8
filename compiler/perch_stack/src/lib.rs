//! Stack growth for recursive grammar evaluation.
//!
//! Evaluating a grammar recurses once per operator node and once per
//! non-terminal call, so the native stack depth follows the nesting of the
//! grammar and the length of the longest run of tokens matched through
//! recursive rules (`List => [Item] List | []` recurses once per item).
//! Wrapping each non-terminal call in [`ensure_sufficient_stack`] moves that
//! limit from the thread's fixed stack to available memory.
//!
//! # Platform Support
//!
//! - **Native targets**: grows the stack on demand through `stacker`.
//! - **WASM targets**: calls straight through.
//!
//! # Configuration
//!
//! - **Red zone**: 128 KiB. Growth happens when less than this remains.
//! - **Segment size**: 1 MiB per growth.

/// Remaining stack below which a new segment is allocated.
const RED_ZONE: usize = 128 * 1024;

/// Size of each newly allocated stack segment.
const SEGMENT_SIZE: usize = 1024 * 1024;

/// Run `f`, first growing the stack if less than the red zone remains.
///
/// ```text
/// fn call_rule(&self, ctx: &mut ParseContext, id: OpId) -> ParseOutcome<T> {
///     ensure_sufficient_stack(|| self.eval(ctx, id))
/// }
/// ```
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, SEGMENT_SIZE, f)
}

/// WASM manages its own stack; call `f` directly.
#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}
