//! Fixed-width bit sets
//!
//! [`PropertyBits`] packs boolean flags into a single unsigned integer and
//! addresses them by bit position. Two widths are provided: [`Bits8`] (the
//! entity property set) and [`Bits16`] for callers that need more room.
//!
//! Out-of-range positions are a programming error. Debug builds panic through
//! `debug_assert!`; release builds mask the position into range so the
//! operation stays well-defined. Use the `try_*` variants when the position
//! comes from untrusted input.

use std::fmt;
use std::hash::Hash;
use std::ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign, BitXor, BitXorAssign, Not};
use thiserror::Error;

/// Errors raised by checked bit access
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyError {
    /// Bit position is not below the set width
    #[error("bit position {position} out of range for {width}-bit set")]
    OutOfRange {
        /// Requested position
        position: usize,
        /// Width of the bit set
        width: usize,
    },
}

mod sealed {
    pub trait Sealed {}
}

/// Unsigned integer usable as backing storage for [`PropertyBits`]
pub trait BitStorage: Copy + Eq + Hash + Default + fmt::Debug + sealed::Sealed {
    /// Number of addressable bits
    const WIDTH: usize;

    /// Widen to `u32`
    fn to_u32(self) -> u32;

    /// Narrow from `u32`, discarding bits above `WIDTH`
    fn from_u32(bits: u32) -> Self;
}

macro_rules! impl_bit_storage {
    ($($ty:ty),*) => {
        $(
            impl sealed::Sealed for $ty {}

            impl BitStorage for $ty {
                const WIDTH: usize = <$ty>::BITS as usize;

                fn to_u32(self) -> u32 {
                    u32::from(self)
                }

                #[allow(clippy::cast_possible_truncation)]
                fn from_u32(bits: u32) -> Self {
                    (bits & u32::from(<$ty>::MAX)) as $ty
                }
            }
        )*
    };
}

impl_bit_storage!(u8, u16);

/// Fixed-width set of boolean flags addressed by position
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PropertyBits<S: BitStorage = u8> {
    bits: S,
}

/// Eight-bit property set
pub type Bits8 = PropertyBits<u8>;

/// Sixteen-bit property set
pub type Bits16 = PropertyBits<u16>;

impl<S: BitStorage> PropertyBits<S> {
    /// Number of addressable positions
    pub const WIDTH: usize = S::WIDTH;

    /// Create a set with every bit cleared
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a set from raw storage
    pub fn from_bits(bits: S) -> Self {
        Self { bits }
    }

    /// Raw storage value
    pub fn bits(self) -> S {
        self.bits
    }

    /// Width of this set in bits
    pub fn width(self) -> usize {
        S::WIDTH
    }

    fn mask(position: usize) -> u32 {
        debug_assert!(
            position < S::WIDTH,
            "bit position {position} out of range for {}-bit set",
            S::WIDTH
        );
        1 << (position % S::WIDTH)
    }

    fn check(position: usize) -> Result<(), PropertyError> {
        if position < S::WIDTH {
            Ok(())
        } else {
            Err(PropertyError::OutOfRange { position, width: S::WIDTH })
        }
    }

    /// Read the bit at `position`
    pub fn get(&self, position: usize) -> bool {
        self.bits.to_u32() & Self::mask(position) != 0
    }

    /// Write the bit at `position`
    pub fn set(&mut self, position: usize, value: bool) {
        let mask = Self::mask(position);
        let bits = self.bits.to_u32();
        self.bits = S::from_u32(if value { bits | mask } else { bits & !mask });
    }

    /// Set the bit at `position`
    pub fn toggle(&mut self, position: usize) {
        self.set(position, true);
    }

    /// Clear the bit at `position`
    pub fn untoggle(&mut self, position: usize) {
        self.set(position, false);
    }

    /// Invert the bit at `position`
    pub fn flip(&mut self, position: usize) {
        self.bits = S::from_u32(self.bits.to_u32() ^ Self::mask(position));
    }

    /// Every bit inverted
    #[must_use]
    pub fn inverse(self) -> Self {
        Self { bits: S::from_u32(!self.bits.to_u32()) }
    }

    /// Checked [`get`](Self::get)
    pub fn try_get(&self, position: usize) -> Result<bool, PropertyError> {
        Self::check(position)?;
        Ok(self.get(position))
    }

    /// Checked [`set`](Self::set)
    pub fn try_set(&mut self, position: usize, value: bool) -> Result<(), PropertyError> {
        Self::check(position)?;
        self.set(position, value);
        Ok(())
    }

    /// Number of set bits
    pub fn count_ones(self) -> u32 {
        self.bits.to_u32().count_ones()
    }

    /// Whether no bit is set
    pub fn is_empty(self) -> bool {
        self.bits.to_u32() == 0
    }
}

impl<S: BitStorage> From<S> for PropertyBits<S> {
    fn from(bits: S) -> Self {
        Self::from_bits(bits)
    }
}

impl<S: BitStorage> fmt::Debug for PropertyBits<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PropertyBits({:0width$b})", self.bits.to_u32(), width = S::WIDTH)
    }
}

macro_rules! impl_bit_op {
    ($op:ident, $method:ident, $assign:ident, $assign_method:ident, $tok:tt) => {
        impl<S: BitStorage> $op for PropertyBits<S> {
            type Output = Self;

            fn $method(self, rhs: Self) -> Self {
                Self { bits: S::from_u32(self.bits.to_u32() $tok rhs.bits.to_u32()) }
            }
        }

        impl<S: BitStorage> $assign for PropertyBits<S> {
            fn $assign_method(&mut self, rhs: Self) {
                *self = *self $tok rhs;
            }
        }
    };
}

impl_bit_op!(BitAnd, bitand, BitAndAssign, bitand_assign, &);
impl_bit_op!(BitOr, bitor, BitOrAssign, bitor_assign, |);
impl_bit_op!(BitXor, bitxor, BitXorAssign, bitxor_assign, ^);

impl<S: BitStorage> Not for PropertyBits<S> {
    type Output = Self;

    fn not(self) -> Self {
        self.inverse()
    }
}
