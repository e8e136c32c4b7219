//! Stable arena indices.
//!
//! Indices are only meaningful for the [`Graph`](crate::Graph) that produced them.

use std::fmt;

macro_rules! arena_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub(crate) u32);

        impl $name {
            pub(crate) fn new(index: usize) -> Self {
                Self(index as u32)
            }

            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "{}"), self.0)
            }
        }
    };
}

arena_id!(
    /// A module, foreign module or block.
    NamespaceId,
    "ns"
);
arena_id!(
    /// A value: function, parameter or temporary.
    ValueId,
    "v"
);
arena_id!(
    /// An identified type or a function-signature type.
    TypeId,
    "ty"
);
arena_id!(
    /// A [`NamedUsage`](crate::NamedUsage) edge.
    UsageId,
    "use"
);
arena_id!(
    /// A [`TypedUsage`](crate::TypedUsage) edge.
    TypedUsageId,
    "tyuse"
);
