use lasso::{Spur, ThreadedRodeo};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::LazyLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Global string interner for entity IDs.
static INTERNER: LazyLock<ThreadedRodeo> = LazyLock::new(ThreadedRodeo::default);

/// Millisecond timestamp taken once per process. Fresh IDs embed it so that
/// IDs minted by different editor sessions do not collide.
static SESSION_STAMP: LazyLock<u128> = LazyLock::new(|| {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default()
});

static COUNTER: AtomicU64 = AtomicU64::new(1);

fn fresh_key(prefix: &str) -> String {
    let n = COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("{prefix}-{}-{n}", *SESSION_STAMP)
}

macro_rules! interned_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash)]
        pub struct $name(Spur);

        impl $name {
            /// Intern a string as an ID, or return the existing one.
            pub fn intern(s: &str) -> Self {
                Self(INTERNER.get_or_intern(s))
            }

            /// Resolve back to a string slice.
            pub fn as_str(&self) -> &str {
                INTERNER.resolve(&self.0)
            }

            /// Mint a new session-unique ID (`<prefix>-<stamp>-<n>`).
            pub fn fresh() -> Self {
                Self::intern(&fresh_key($prefix))
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "#{}", self.as_str())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                Ok(Self::intern(&s))
            }
        }
    };
}

interned_id!(
    /// Identifier of a hexagon on the canvas. 4 bytes, `Copy`, O(1) `Eq`/`Hash`.
    HexId,
    "h"
);

interned_id!(
    /// Identifier of a connection between two hexagons.
    EdgeId,
    "c"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_roundtrip() {
        let a = HexId::intern("0b7f-hex");
        let b = HexId::intern("0b7f-hex");
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "0b7f-hex");
    }

    #[test]
    fn fresh_ids_are_unique_and_prefixed() {
        let a = HexId::fresh();
        let b = HexId::fresh();
        assert_ne!(a, b);
        assert!(a.as_str().starts_with("h-"));
        assert!(EdgeId::fresh().as_str().starts_with("c-"));
    }

    #[test]
    fn hex_and_edge_ids_share_strings_not_types() {
        let h = HexId::intern("same");
        let e = EdgeId::intern("same");
        assert_eq!(h.as_str(), e.as_str());
    }
}
