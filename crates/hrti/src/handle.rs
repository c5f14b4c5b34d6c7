// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Opaque, federation-scoped handles.
//!
//! Every handle is a `u64` wrapped in [`Handle<K>`], where `K` is a zero-sized
//! marker that keeps, say, an [`AttributeHandle`] from being passed where an
//! [`ObjectInstanceHandle`] is expected. Handles are comparable, hashable and
//! have a fixed 8-byte big-endian encoding.
//!
//! ```
//! use hrti::{AttributeHandle, FederateHandle};
//!
//! let federate = FederateHandle::new(7);
//! let bytes = federate.encode();
//! assert_eq!(FederateHandle::decode(&bytes).unwrap(), federate);
//!
//! // Distinct kinds do not mix:
//! // let wrong: AttributeHandle = federate; // does not compile
//! let _ = AttributeHandle::new(7);
//! ```

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::error::RtiError;

/// Marker trait naming a handle family.
pub trait HandleKind: 'static {
    /// Name used in `Debug`/`Display` output and decode errors.
    const NAME: &'static str;
}

macro_rules! handle_kinds {
    ($($(#[$doc:meta])* $kind:ident => $alias:ident, $set:ident, $name:literal;)*) => {
        $(
            #[doc = concat!("Marker for [`", stringify!($alias), "`].")]
            #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
            pub enum $kind {}

            impl HandleKind for $kind {
                const NAME: &'static str = $name;
            }

            $(#[$doc])*
            pub type $alias = Handle<$kind>;

            #[doc = concat!("Ordered set of [`", stringify!($alias), "`] values.")]
            pub type $set = BTreeSet<$alias>;
        )*
    };
}

handle_kinds! {
    /// Identifies a joined federate. Allocated at join, never reused.
    FederateKind => FederateHandle, FederateHandleSet, "FederateHandle";
    /// Identifies an object class of the federation object model.
    ObjectClassKind => ObjectClassHandle, ObjectClassHandleSet, "ObjectClassHandle";
    /// Identifies an attribute of an object class.
    AttributeKind => AttributeHandle, AttributeHandleSet, "AttributeHandle";
    /// Identifies an interaction class of the federation object model.
    InteractionClassKind => InteractionClassHandle, InteractionClassHandleSet, "InteractionClassHandle";
    /// Identifies a parameter of an interaction class.
    ParameterKind => ParameterHandle, ParameterHandleSet, "ParameterHandle";
    /// Identifies a registered object instance.
    ObjectInstanceKind => ObjectInstanceHandle, ObjectInstanceHandleSet, "ObjectInstanceHandle";
    /// Identifies a routing-space dimension.
    DimensionKind => DimensionHandle, DimensionHandleSet, "DimensionHandle";
    /// Identifies a region created by a federate.
    RegionKind => RegionHandle, RegionHandleSet, "RegionHandle";
    /// Identifies a timestamp-ordered message its sender may retract.
    MessageRetractionKind => MessageRetractionHandle, MessageRetractionHandleSet, "MessageRetractionHandle";
}

/// Typed opaque handle.
pub struct Handle<K: HandleKind> {
    value: u64,
    _kind: PhantomData<fn() -> K>,
}

impl<K: HandleKind> Handle<K> {
    /// Size of the encoded representation in bytes.
    pub const ENCODED_LENGTH: usize = 8;

    /// Wrap a raw value.
    pub const fn new(value: u64) -> Self {
        Self {
            value,
            _kind: PhantomData,
        }
    }

    /// Raw value.
    pub const fn value(&self) -> u64 {
        self.value
    }

    /// Encode to the 8-byte big-endian wire form.
    pub fn encode(&self) -> Vec<u8> {
        self.value.to_be_bytes().to_vec()
    }

    /// Encode into a caller buffer, returning the number of bytes written.
    pub fn encode_into(&self, buffer: &mut [u8]) -> Result<usize, RtiError> {
        let dst = buffer
            .get_mut(..Self::ENCODED_LENGTH)
            .ok_or_else(|| RtiError::CouldNotDecode(format!("{} buffer too small", K::NAME)))?;
        dst.copy_from_slice(&self.value.to_be_bytes());
        Ok(Self::ENCODED_LENGTH)
    }

    /// Decode from the wire form produced by [`Handle::encode`].
    pub fn decode(bytes: &[u8]) -> Result<Self, RtiError> {
        let raw: [u8; 8] = bytes.try_into().map_err(|_| {
            RtiError::CouldNotDecode(format!(
                "{} expects {} bytes, got {}",
                K::NAME,
                Self::ENCODED_LENGTH,
                bytes.len()
            ))
        })?;
        Ok(Self::new(u64::from_be_bytes(raw)))
    }
}

impl<K: HandleKind> Clone for Handle<K> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K: HandleKind> Copy for Handle<K> {}

impl<K: HandleKind> PartialEq for Handle<K> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl<K: HandleKind> Eq for Handle<K> {}

impl<K: HandleKind> PartialOrd for Handle<K> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<K: HandleKind> Ord for Handle<K> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.value.cmp(&other.value)
    }
}

impl<K: HandleKind> Hash for Handle<K> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.value.hash(state);
    }
}

impl<K: HandleKind> fmt::Debug for Handle<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", K::NAME, self.value)
    }
}

impl<K: HandleKind> fmt::Display for Handle<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

impl<K: HandleKind> Serialize for Handle<K> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(self.value)
    }
}

struct HandleVisitor<K>(PhantomData<fn() -> K>);

impl<K: HandleKind> de::Visitor<'_> for HandleVisitor<K> {
    type Value = Handle<K>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "a {} as an unsigned integer", K::NAME)
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        Ok(Handle::new(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        u64::try_from(v)
            .map(Handle::new)
            .map_err(|_| E::invalid_value(de::Unexpected::Signed(v), &self))
    }

    // JSON map keys arrive as strings.
    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        v.parse::<u64>()
            .map(Handle::new)
            .map_err(|_| E::invalid_value(de::Unexpected::Str(v), &self))
    }
}

impl<'de, K: HandleKind> Deserialize<'de> for Handle<K> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(HandleVisitor(PhantomData))
    }
}

/// Monotonic allocator for one handle family. Value 0 is never handed out.
#[derive(Debug, Clone)]
pub struct HandleAllocator<K: HandleKind> {
    next: u64,
    _kind: PhantomData<fn() -> K>,
}

impl<K: HandleKind> Default for HandleAllocator<K> {
    fn default() -> Self {
        Self {
            next: 1,
            _kind: PhantomData,
        }
    }
}

impl<K: HandleKind> HandleAllocator<K> {
    /// Hand out the next handle.
    pub fn allocate(&mut self) -> Handle<K> {
        let handle = Handle::new(self.next);
        self.next += 1;
        handle
    }

    /// Whether `handle` has been handed out by this allocator.
    pub fn issued(&self, handle: Handle<K>) -> bool {
        handle.value() != 0 && handle.value() < self.next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_decode_every_kind() {
        fn check<K: HandleKind>(value: u64) {
            let handle = Handle::<K>::new(value);
            assert_eq!(Handle::<K>::decode(&handle.encode()).unwrap(), handle);
        }
        check::<FederateKind>(1);
        check::<ObjectClassKind>(2);
        check::<AttributeKind>(3);
        check::<InteractionClassKind>(u64::MAX);
        check::<ParameterKind>(0);
        check::<ObjectInstanceKind>(42);
        check::<DimensionKind>(9);
        check::<RegionKind>(1 << 40);
        check::<MessageRetractionKind>(17);
    }

    #[test]
    fn test_decode_wrong_length() {
        let err = FederateHandle::decode(&[1, 2, 3]).unwrap_err();
        assert!(matches!(err, RtiError::CouldNotDecode(_)));
    }

    #[test]
    fn test_encode_into_small_buffer() {
        let mut buf = [0u8; 4];
        assert!(RegionHandle::new(1).encode_into(&mut buf).is_err());

        let mut buf = [0u8; 12];
        assert_eq!(RegionHandle::new(1).encode_into(&mut buf).unwrap(), 8);
        assert_eq!(RegionHandle::decode(&buf[..8]).unwrap(), RegionHandle::new(1));
    }

    #[test]
    fn test_allocator_skips_zero() {
        let mut alloc = HandleAllocator::<ObjectInstanceKind>::default();
        assert_eq!(alloc.allocate().value(), 1);
        assert_eq!(alloc.allocate().value(), 2);
        assert!(alloc.issued(ObjectInstanceHandle::new(2)));
        assert!(!alloc.issued(ObjectInstanceHandle::new(0)));
        assert!(!alloc.issued(ObjectInstanceHandle::new(3)));
    }

    #[test]
    fn test_json_map_keys() {
        let mut map = std::collections::BTreeMap::new();
        map.insert(AttributeHandle::new(4), 1u8);
        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(json, r#"{"4":1}"#);
        let back: std::collections::BTreeMap<AttributeHandle, u8> =
            serde_json::from_str(&json).unwrap();
        assert_eq!(back, map);
        assert!(serde_json::from_str::<FederateHandle>("-1").is_err());
    }

    #[test]
    fn test_debug_names_kind() {
        assert_eq!(format!("{:?}", AttributeHandle::new(5)), "AttributeHandle(5)");
        assert_eq!(AttributeHandle::new(5).to_string(), "5");
    }
}
