//! Internal compiler errors.

use std::fmt;

/// Abort on a broken compiler invariant.
///
/// Used for conditions that indicate a bug in the compiler or one of its
/// collaborators (the resolver, the reflection loader), never for bad user
/// input. The message is logged before unwinding so it survives even when the
/// driver swallows the panic payload.
#[cold]
#[track_caller]
pub fn internal_error(message: impl fmt::Display) -> ! {
    tracing::error!(%message, "internal compiler error");
    panic!("internal compiler error: {message}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[should_panic(expected = "internal compiler error: broken invariant")]
    fn panics_with_prefix() {
        internal_error("broken invariant");
    }
}
