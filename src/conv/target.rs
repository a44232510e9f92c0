/// Marker trait for byte-oriented buffers with incremental append operations
///
/// `Target` plays the role of [`std::io::Write`] for encoders, except that
/// every `push_XXX` method is infallible and total. The returned `usize` is
/// the number of bytes appended, used by [`Encode::write_to`] to report the
/// encoded width of a value.
///
/// [`Encode::write_to`]: crate::conv::Encode::write_to
pub trait Target {
    /// Hints that at least `extra` more bytes are about to be written.
    ///
    /// For implementors with a notion of capacity this should reserve room;
    /// for all others it may be a no-op.
    fn anticipate(&mut self, extra: usize);

    /// Returns a fresh object of the `Self` type with an initially empty buffer.
    fn create() -> Self;

    /// Appends a single byte, returning `1`.
    fn push_one(&mut self, b: u8) -> usize;

    /// Appends the bytes of a known-length array, returning `N`.
    ///
    /// Must be indistinguishable from pushing each element with [`Target::push_one`].
    fn push_many<const N: usize>(&mut self, arr: [u8; N]) -> usize;

    /// Appends the bytes of an arbitrary-length slice, returning its length.
    fn push_all(&mut self, buf: &[u8]) -> usize;

    /// Marks the end of the byte-run belonging to one logical value.
    ///
    /// Implementors may record the boundary for debugging, but must not alter
    /// the buffer contents.
    #[inline(always)]
    fn resolve(&mut self) {}

    /// Performs [`Target::resolve`] and returns `0`, for use at the tail of
    /// additive `write_to` expressions.
    #[inline]
    fn resolve_zero(&mut self) -> usize {
        self.resolve();
        0
    }
}

#[macro_export]
macro_rules! resolve_zero {
    ( $buf:expr ) => {{
        $crate::conv::target::Target::resolve($buf);
        0
    }};
}

/// Alias for `std::io::Sink`, used to count the number of bytes required to
/// serialize a value without performing any memory operations.
pub type ByteCounter = std::io::Sink;

impl Target for ByteCounter {
    #[inline(always)]
    fn anticipate(&mut self, _: usize) {}

    #[inline]
    fn create() -> Self {
        std::io::sink()
    }

    #[inline(always)]
    fn push_one(&mut self, _: u8) -> usize {
        1
    }

    #[inline(always)]
    fn push_many<const N: usize>(&mut self, _: [u8; N]) -> usize {
        N
    }

    #[inline(always)]
    fn push_all(&mut self, buf: &[u8]) -> usize {
        buf.len()
    }
}

impl Target for Vec<u8> {
    #[inline]
    fn anticipate(&mut self, extra: usize) {
        self.reserve(extra)
    }

    #[inline]
    #[must_use]
    fn create() -> Self {
        Self::new()
    }

    #[inline]
    fn push_one(&mut self, b: u8) -> usize {
        self.push(b);
        1
    }

    #[inline]
    fn push_many<const N: usize>(&mut self, arr: [u8; N]) -> usize {
        self.extend_from_slice(&arr);
        N
    }

    #[inline]
    fn push_all(&mut self, buf: &[u8]) -> usize {
        self.extend_from_slice(buf);
        buf.len()
    }
}
