//! The capability-erased cache facade.
//!
//! An in-process [`Engine`] and an RPC client both "are a cache" from a
//! caller's point of view, but nothing in this crate should force a choice
//! between them at compile time — a consumer library wants to accept either.
//! [`CacheFacade`] is the trait both satisfy; [`AnyFacade`] is a tagged sum
//! over the two implementations this crate and its sibling know about, for
//! callers that want a concrete, `Sized`, non-generic handle rather than a
//! `dyn CacheFacade`.

extern crate alloc;
use alloc::vec::Vec;

use crate::buffer::Blob;
use crate::engine::Engine;
use crate::fingerprint::fingerprint64;

/// Operations a cache implementation must expose, independent of whether it
/// is in-process ([`Engine`]) or reached over the wire (`bytecache_rpc::Client`).
///
/// String-keyed convenience methods ([`store_keyed`](CacheFacade::store_keyed),
/// [`load_keyed`](CacheFacade::load_keyed)) are provided in terms of the
/// numeric-key primitives via [`fingerprint64`]; implementors only need to
/// provide the four numeric-key operations.
pub trait CacheFacade {
    /// See [`Engine::store`].
    fn store(&self, key: u64, detail: u64, a: &[u8], b: &[u8]) -> bool;

    /// See [`Engine::delete`].
    fn delete(&self, key: u64) -> bool {
        self.store(key, 0, &[], &[])
    }

    /// See [`Engine::load`].
    fn load(&self, key: u64, detail: u64) -> Option<Vec<u8>>;

    /// Splits a load across two destination buffers. Fails (returns
    /// `false`) without touching the engine if `out_a` is absent but `out_b`
    /// is present — an ill-formed request, matching the source's
    /// `buffer2 != NULL && buffer1 == NULL` check.
    fn load_split(
        &self,
        key: u64,
        detail: u64,
        prefix_size: usize,
        out_a: Option<&mut Blob<'_>>,
        out_b: Option<&mut Blob<'_>>,
    ) -> bool;

    /// Stores under the fingerprint of a string key.
    fn store_keyed(&self, key: &str, detail: u64, a: &[u8], b: &[u8]) -> bool {
        self.store(fingerprint64(key.as_bytes()), detail, a, b)
    }

    /// Loads under the fingerprint of a string key.
    fn load_keyed(&self, key: &str, detail: u64) -> Option<Vec<u8>> {
        self.load(fingerprint64(key.as_bytes()), detail)
    }
}

impl<S> CacheFacade for Engine<S>
where
    S: core::hash::BuildHasher,
{
    fn store(&self, key: u64, detail: u64, a: &[u8], b: &[u8]) -> bool {
        Engine::store(self, key, detail, a, b)
    }

    fn delete(&self, key: u64) -> bool {
        Engine::delete(self, key)
    }

    fn load(&self, key: u64, detail: u64) -> Option<Vec<u8>> {
        Engine::load(self, key, detail)
    }

    fn load_split(
        &self,
        key: u64,
        detail: u64,
        prefix_size: usize,
        out_a: Option<&mut Blob<'_>>,
        out_b: Option<&mut Blob<'_>>,
    ) -> bool {
        let want_b = out_b.is_some();
        let Some(out_a) = out_a else {
            // No destination for the mandatory prefix: ill-formed regardless
            // of whether a remainder buffer was supplied. Never reaches the
            // data lock, so it's counted here rather than inside Engine.
            self.record_ill_formed_rejection();
            return false;
        };
        match Engine::load_split(self, key, detail, prefix_size, want_b) {
            Some(result) => {
                out_a.copy_from(&result.prefix);
                if let Some(out_b) = out_b {
                    out_b.copy_from(&result.remainder);
                }
                true
            }
            None => false,
        }
    }
}

/// A tagged sum over the cache implementations this crate family knows
/// about: an in-process [`Engine`], or a handle to a remote one reached over
/// `bytecache-rpc`. Consumers that want a concrete, non-generic type (rather
/// than a type parameter or a `dyn CacheFacade`) can hold this instead.
///
/// The RPC variant is a `Box<dyn CacheFacade + Send + Sync>` rather than a
/// direct dependency on `bytecache_rpc::Client`, since this crate (`no_std`)
/// cannot depend on that crate (`std`, networked) without inverting the
/// dependency graph.
pub enum AnyFacade {
    /// An in-process engine with the default hasher.
    Local(Engine),
    /// Any other facade implementation, type-erased. `bytecache-rpc`'s
    /// `Client` is the implementation this crate ships with.
    Remote(alloc::boxed::Box<dyn CacheFacade + Send + Sync>),
}

impl core::fmt::Debug for AnyFacade {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            AnyFacade::Local(engine) => f.debug_tuple("Local").field(engine).finish(),
            AnyFacade::Remote(_) => f.debug_tuple("Remote").finish(),
        }
    }
}

impl CacheFacade for AnyFacade {
    fn store(&self, key: u64, detail: u64, a: &[u8], b: &[u8]) -> bool {
        match self {
            AnyFacade::Local(engine) => engine.store(key, detail, a, b),
            AnyFacade::Remote(facade) => facade.store(key, detail, a, b),
        }
    }

    fn delete(&self, key: u64) -> bool {
        match self {
            AnyFacade::Local(engine) => engine.delete(key),
            AnyFacade::Remote(facade) => facade.delete(key),
        }
    }

    fn load(&self, key: u64, detail: u64) -> Option<Vec<u8>> {
        match self {
            AnyFacade::Local(engine) => engine.load(key, detail),
            AnyFacade::Remote(facade) => facade.load(key, detail),
        }
    }

    fn load_split(
        &self,
        key: u64,
        detail: u64,
        prefix_size: usize,
        out_a: Option<&mut Blob<'_>>,
        out_b: Option<&mut Blob<'_>>,
    ) -> bool {
        match self {
            AnyFacade::Local(engine) => {
                CacheFacade::load_split(engine, key, detail, prefix_size, out_a, out_b)
            }
            AnyFacade::Remote(facade) => {
                facade.load_split(key, detail, prefix_size, out_a, out_b)
            }
        }
    }
}
