//! Stack headroom for deep expression recursion.

/// Run `f`, growing the host stack first when the red zone is near.
///
/// Expression evaluation recurses on the tree shape, so a deeply
/// nested source expression would otherwise overflow the thread stack.
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    /// Remaining stack space that triggers a grow (100 KiB).
    const RED_ZONE: usize = 100 * 1024;

    /// Size of each new stack segment (1 MiB).
    const STACK_PER_RECURSION: usize = 1024 * 1024;

    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}

/// wasm manages its own stack; call through directly.
#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}
