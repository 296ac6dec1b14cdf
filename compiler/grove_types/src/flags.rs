//! Class and member modifiers.
//!
//! Bit values follow the JVM access flags so reflected classes can hand their
//! raw modifiers straight through.

use bitflags::bitflags;

bitflags! {
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    #[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
    pub struct Modifiers: u32 {
        const PUBLIC = 0x0001;
        const PRIVATE = 0x0002;
        const PROTECTED = 0x0004;
        const STATIC = 0x0008;
        const FINAL = 0x0010;
        const SYNCHRONIZED = 0x0020;
        const VOLATILE = 0x0040;
        /// Also `ACC_BRIDGE` on methods.
        const TRANSIENT = 0x0080;
        const NATIVE = 0x0100;
        const INTERFACE = 0x0200;
        const ABSTRACT = 0x0400;
        const SYNTHETIC = 0x1000;
        /// Annotation definition (`@interface`).
        const ANNOTATION = 0x2000;
        const ENUM = 0x4000;
    }
}

impl Modifiers {
    /// Visibility bits only.
    pub fn visibility(self) -> Modifiers {
        self & (Modifiers::PUBLIC | Modifiers::PRIVATE | Modifiers::PROTECTED)
    }

    pub fn is_interface(self) -> bool {
        self.contains(Modifiers::INTERFACE)
    }

    pub fn is_static(self) -> bool {
        self.contains(Modifiers::STATIC)
    }

    pub fn is_abstract(self) -> bool {
        self.contains(Modifiers::ABSTRACT)
    }
}
