//! Strongly typed, zero-cost identifier wrappers.
//!
//! All IDs are `Copy + Ord + Hash` so they can key maps and sorted
//! collections without ceremony.  Domains are opaque integers — the host
//! integration owns the side table mapping them to real-world identifiers
//! (world names, dimension keys, …); nothing in the search core ever
//! dereferences one.

use std::fmt;

/// Generate a typed ID wrapper around a primitive integer.
macro_rules! typed_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident($inner:ty);) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        $vis struct $name(pub $inner);

        impl $name {
            /// Sentinel meaning "no valid ID".
            pub const INVALID: $name = $name(<$inner>::MAX);

            /// Cast to `usize` for direct use as a side-table index.
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
    };
}

typed_id! {
    /// An independently addressed 3-D coordinate space (one world).
    ///
    /// Cells in different domains are never adjacent; the only way between
    /// domains is a link.
    pub struct DomainId(u32);
}

typed_id! {
    /// Handle for one submitted search session.  Allocated monotonically by
    /// the dispatcher; never reused within a process lifetime.
    pub struct SessionId(u64);
}

typed_id! {
    /// Handle for a task registered with the host scheduler binding.
    pub struct TaskId(u64);
}
