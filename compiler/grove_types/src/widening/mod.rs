//! Numeric widening and the lowest upper bound of two types.
//!
//! The category predicates classify primitive types only; wrapper classes
//! are unwrapped by [`ClassGraph::arithmetic_category`] before testing. The
//! lattice half lives in [`lub`].

mod lub;

use crate::{ClassGraph, ClassId};

/// Result category of a binary arithmetic operation, narrowest first.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum NumericCategory {
    /// `byte`, `char`, `short`, `int`.
    Int,
    /// Int plus `long`.
    Long,
    /// Long plus `BigInteger`.
    BigInt,
    /// BigInt plus `BigDecimal`.
    BigDec,
    /// `float`, `double`.
    Floating,
    /// BigDec plus `float` and `double`.
    Double,
    /// BigDec plus anything extending `Number`.
    Number,
}

impl NumericCategory {
    /// Every category in the order `arithmetic_category` tries them.
    pub const ALL: [NumericCategory; 7] = [
        NumericCategory::Int,
        NumericCategory::Long,
        NumericCategory::BigInt,
        NumericCategory::BigDec,
        NumericCategory::Floating,
        NumericCategory::Double,
        NumericCategory::Number,
    ];
}

/// Primitive precedence in LUB computation; lower wins.
pub(crate) fn primitive_precedence(id: ClassId) -> Option<u8> {
    match id {
        ClassId::DOUBLE => Some(0),
        ClassId::FLOAT => Some(1),
        ClassId::LONG => Some(2),
        ClassId::INT => Some(3),
        ClassId::SHORT => Some(4),
        ClassId::BYTE => Some(5),
        _ => None,
    }
}

impl ClassGraph {
    pub fn is_int_category(&self, id: ClassId) -> bool {
        matches!(
            self.terminal(id),
            ClassId::BYTE | ClassId::CHAR | ClassId::SHORT | ClassId::INT
        )
    }

    pub fn is_long_category(&self, id: ClassId) -> bool {
        self.terminal(id) == ClassId::LONG || self.is_int_category(id)
    }

    pub fn is_big_int_category(&self, id: ClassId) -> bool {
        self.terminal(id) == ClassId::BIG_INTEGER || self.is_long_category(id)
    }

    pub fn is_big_dec_category(&self, id: ClassId) -> bool {
        self.terminal(id) == ClassId::BIG_DECIMAL || self.is_big_int_category(id)
    }

    pub fn is_floating_category(&self, id: ClassId) -> bool {
        matches!(self.terminal(id), ClassId::FLOAT | ClassId::DOUBLE)
    }

    pub fn is_double_category(&self, id: ClassId) -> bool {
        self.is_floating_category(id) || self.is_big_dec_category(id)
    }

    pub fn is_number_category(&self, id: ClassId) -> bool {
        self.is_big_dec_category(id) || self.is_derived_from(id, ClassId::NUMBER)
    }

    pub fn in_category(&self, id: ClassId, category: NumericCategory) -> bool {
        match category {
            NumericCategory::Int => self.is_int_category(id),
            NumericCategory::Long => self.is_long_category(id),
            NumericCategory::BigInt => self.is_big_int_category(id),
            NumericCategory::BigDec => self.is_big_dec_category(id),
            NumericCategory::Floating => self.is_floating_category(id),
            NumericCategory::Double => self.is_double_category(id),
            NumericCategory::Number => self.is_number_category(id),
        }
    }

    /// Narrowest category both operands belong to, after unwrapping
    /// wrapper classes. `None` for non-numeric operands.
    ///
    /// `int + long` is [`NumericCategory::Long`]; `int + float` is
    /// [`NumericCategory::Double`].
    pub fn arithmetic_category(&self, a: ClassId, b: ClassId) -> Option<NumericCategory> {
        let (a, b) = (self.unwrapper(a), self.unwrapper(b));
        NumericCategory::ALL
            .into_iter()
            .find(|&category| self.in_category(a, category) && self.in_category(b, category))
    }
}
