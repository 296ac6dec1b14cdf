//! Class handle.
//!
//! Every type reference in a compilation (declared class, use-site
//! parameterization, array wrapper, placeholder, synthesized common type) is a
//! record in the [`ClassGraph`](crate::ClassGraph) arena addressed by a
//! `ClassId`. The well-known classes occupy fixed low indices so hot checks
//! (`is_primitive`, `== OBJECT`) never touch the arena.

use std::fmt;

/// A 32-bit index into the class graph.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
#[repr(transparent)]
pub struct ClassId(u32);

impl ClassId {
    // === Top and bottom (0-1) ===

    /// `java.lang.Object`, the universal top type.
    pub const OBJECT: Self = Self(0);
    /// `void`.
    pub const VOID: Self = Self(1);

    // === Primitives (2-9) ===

    pub const BOOLEAN: Self = Self(2);
    pub const CHAR: Self = Self(3);
    pub const BYTE: Self = Self(4);
    pub const SHORT: Self = Self(5);
    pub const INT: Self = Self(6);
    pub const LONG: Self = Self(7);
    pub const FLOAT: Self = Self(8);
    pub const DOUBLE: Self = Self(9);

    // === Wrappers (10-17) ===

    pub const BOOLEAN_WRAPPER: Self = Self(10);
    pub const CHARACTER: Self = Self(11);
    pub const BYTE_WRAPPER: Self = Self(12);
    pub const SHORT_WRAPPER: Self = Self(13);
    pub const INTEGER: Self = Self(14);
    pub const LONG_WRAPPER: Self = Self(15);
    pub const FLOAT_WRAPPER: Self = Self(16);
    pub const DOUBLE_WRAPPER: Self = Self(17);

    // === Library classes (18-25) ===

    pub const NUMBER: Self = Self(18);
    pub const BIG_INTEGER: Self = Self(19);
    pub const BIG_DECIMAL: Self = Self(20);
    pub const STRING: Self = Self(21);
    pub const CHAR_SEQUENCE: Self = Self(22);
    /// `java.lang.Comparable<T>`.
    pub const COMPARABLE: Self = Self(23);
    pub const SERIALIZABLE: Self = Self(24);
    pub const CLONEABLE: Self = Self(25);

    /// The `?` base node carried by wildcard generics descriptors.
    pub const WILDCARD: Self = Self(26);

    /// Number of pre-allocated well-known classes.
    pub const WELL_KNOWN_COUNT: u32 = 27;

    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    #[inline]
    pub(crate) const fn index(self) -> usize {
        self.0 as usize
    }

    /// `void` or one of the eight primitive types.
    #[inline]
    pub const fn is_primitive(self) -> bool {
        self.0 >= Self::VOID.0 && self.0 <= Self::DOUBLE.0
    }

    /// One of the fixed bootstrap classes.
    #[inline]
    pub const fn is_well_known(self) -> bool {
        self.0 < Self::WELL_KNOWN_COUNT
    }
}

impl fmt::Debug for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::OBJECT => write!(f, "ClassId::OBJECT"),
            Self::VOID => write!(f, "ClassId::VOID"),
            Self::INT => write!(f, "ClassId::INT"),
            Self::INTEGER => write!(f, "ClassId::INTEGER"),
            Self::STRING => write!(f, "ClassId::STRING"),
            Self::WILDCARD => write!(f, "ClassId::WILDCARD"),
            _ => write!(f, "ClassId({})", self.0),
        }
    }
}
