//! Strongly typed, zero-cost identifier wrappers.
//!
//! All IDs are `Copy + Ord + Hash` so they can be used as map keys and sorted
//! collection elements without ceremony.  Centers and classes are small dense
//! sets, so their inner integer doubles as a `Vec` index via `.index()`.

use std::fmt;

/// Generate a typed ID wrapper around a primitive integer.
macro_rules! typed_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident($inner:ty);) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        $vis struct $name(pub $inner);

        impl $name {
            /// Cast to `usize` for direct use as a `Vec` index.
            #[inline(always)]
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl From<$name> for usize {
            #[inline(always)]
            fn from(id: $name) -> usize {
                id.0 as usize
            }
        }

        impl TryFrom<usize> for $name {
            type Error = std::num::TryFromIntError;
            fn try_from(n: usize) -> Result<$name, Self::Error> {
                <$inner>::try_from(n).map($name)
            }
        }
    };
}

typed_id! {
    /// Per-run job sequence number.  Allocated by the driver, starting at 0
    /// for every fresh run.
    pub struct JobId(u64);
}

typed_id! {
    /// Index of a service center in `NetworkConfig::centers`.
    pub struct CenterId(u16);
}

typed_id! {
    /// Position of a job class in the ordered class sequence.
    pub struct ClassId(u8);
}

typed_id! {
    /// Identifier of an independent random stream.
    pub struct StreamId(u32);
}

impl ClassId {
    /// The first class every job is born into.
    pub const FIRST: ClassId = ClassId(0);

    /// The class that follows `self` in the sequence.  The caller checks the
    /// result against the configured class count.
    #[inline]
    pub fn next(self) -> ClassId {
        ClassId(self.0.saturating_add(1))
    }
}
