//! Stack growth guard for the runtime's recursive walks.
//!
//! Identifier resolution descends one scope per segment and follows import
//! chains; flattening and deep-copying lists descends one level per nested
//! list. Scripts control both depths, so every such walk runs through
//! [`ensure_sufficient_stack`].
//!
//! On native targets the `stacker` crate switches to a freshly allocated
//! segment when the remaining stack drops below [`RED_ZONE`]. On WASM the
//! closure is called directly.

/// Remaining stack below which a new segment is allocated (128KB).
pub const RED_ZONE: usize = 128 * 1024;

/// Size of each newly allocated stack segment (2MB).
pub const SEGMENT_SIZE: usize = 2 * 1024 * 1024;

/// Run `f`, first growing the stack if less than [`RED_ZONE`] remains.
///
/// ```text
/// fn lookup(&self, segments: &[String]) -> Option<Obj> {
///     ensure_sufficient_stack(|| {
///         let (head, rest) = segments.split_first()?;
///         self.member(head)?.as_scope().ok()?.lookup(rest)
///     })
/// }
/// ```
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, SEGMENT_SIZE, f)
}

/// WASM manages its own stack.
#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}
