//! Typed, resizable byte container used to hand payload bytes in and out of
//! the façade.
//!
//! Two shapes, matching the spec's three operations (wrap, set-length/copy-in,
//! read pointer-and-length): a borrowed, zero-copy [`Blob::Wrapped`] view
//! over caller-owned bytes, and an owned, resizable [`Blob::Owned`] buffer
//! the engine fills on load. A [`BlobTag`] travels with the data but is
//! never inspected by the engine — it exists purely so a consumer on the
//! other end of a load can reject a mismatched decoding.

extern crate alloc;
use alloc::vec::Vec;

/// A type tag traveling alongside blob bytes. The engine stores and returns
/// it verbatim; it never branches on the value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlobTag {
    /// No particular interpretation; the default for raw bytes.
    #[default]
    Opaque,
    /// A packed vector of IEEE-754 floats.
    FloatVector,
    /// An application-defined tag, for callers that need more than two
    /// kinds.
    Custom(u32),
}

/// A typed, resizable byte container.
#[derive(Debug)]
pub enum Blob<'a> {
    /// A non-owning, zero-copy view over caller-owned bytes.
    Wrapped {
        /// Type tag traveling with the view.
        tag: BlobTag,
        /// The viewed bytes.
        data: &'a [u8],
    },
    /// An owned, resizable buffer.
    Owned {
        /// Type tag traveling with the buffer.
        tag: BlobTag,
        /// The buffer's bytes.
        data: Vec<u8>,
    },
}

impl<'a> Blob<'a> {
    /// Wraps an external, caller-owned region as a zero-copy view.
    pub fn wrap(tag: BlobTag, data: &'a [u8]) -> Self {
        Blob::Wrapped { tag, data }
    }

    /// Creates an empty, owned buffer with the given tag.
    pub fn owned(tag: BlobTag) -> Self {
        Blob::Owned {
            tag,
            data: Vec::new(),
        }
    }

    /// The type tag traveling with this blob.
    pub fn tag(&self) -> BlobTag {
        match self {
            Blob::Wrapped { tag, .. } => *tag,
            Blob::Owned { tag, .. } => *tag,
        }
    }

    /// The current bytes, borrowed.
    pub fn as_slice(&self) -> &[u8] {
        match self {
            Blob::Wrapped { data, .. } => data,
            Blob::Owned { data, .. } => data.as_slice(),
        }
    }

    /// Current length in bytes.
    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    /// Whether this blob is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sets this blob's contents to `src`, reallocating if it is (or
    /// becomes) an owned buffer. A wrapped blob is converted to owned: the
    /// engine only calls this on output buffers, which are always owned in
    /// practice, but the conversion keeps the API total.
    pub fn copy_from(&mut self, src: &[u8]) {
        match self {
            Blob::Owned { data, .. } => {
                data.clear();
                data.extend_from_slice(src);
            }
            Blob::Wrapped { tag, .. } => {
                let mut data = Vec::with_capacity(src.len());
                data.extend_from_slice(src);
                *self = Blob::Owned { tag: *tag, data };
            }
        }
    }

    /// Truncates or zero-extends the live length without touching the
    /// backing allocation's capacity, for owned buffers. No-op on wrapped
    /// views (the caller owns that region).
    pub fn set_len(&mut self, len: usize) {
        if let Blob::Owned { data, .. } = self {
            data.resize(len, 0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_is_zero_copy_view() {
        let src = [1u8, 2, 3];
        let blob = Blob::wrap(BlobTag::Opaque, &src);
        assert_eq!(blob.as_slice(), &[1, 2, 3]);
        assert_eq!(blob.tag(), BlobTag::Opaque);
    }

    #[test]
    fn owned_starts_empty() {
        let blob = Blob::owned(BlobTag::FloatVector);
        assert!(blob.is_empty());
    }

    #[test]
    fn copy_from_replaces_owned_contents() {
        let mut blob = Blob::owned(BlobTag::Opaque);
        blob.copy_from(b"hello");
        assert_eq!(blob.as_slice(), b"hello");
        blob.copy_from(b"hi");
        assert_eq!(blob.as_slice(), b"hi");
    }

    #[test]
    fn copy_from_converts_wrapped_to_owned() {
        let src = [9u8, 9, 9];
        let mut blob = Blob::wrap(BlobTag::Custom(7), &src);
        blob.copy_from(b"ab");
        assert_eq!(blob.as_slice(), b"ab");
        assert_eq!(blob.tag(), BlobTag::Custom(7));
    }

    #[test]
    fn set_len_resizes_owned_buffer() {
        let mut blob = Blob::owned(BlobTag::Opaque);
        blob.copy_from(b"abcdef");
        blob.set_len(3);
        assert_eq!(blob.as_slice(), b"abc");
    }
}
