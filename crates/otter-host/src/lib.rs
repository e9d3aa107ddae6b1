//! # Otter Host
//!
//! Host-value access layer for the Otter runtime: the seam where script code
//! reads and writes properties of values owned by the Rust host.
//!
//! ## Components
//!
//! - **Coercion** ([`coerce`]): total conversions of any value to a primitive,
//!   with a caller-supplied default for anything that does not fit.
//! - **Property access** ([`access`]): `keys` / `get` / `set` over mappings,
//!   lists, fixed arrays, script objects, parsed documents and typed records,
//!   dispatched by [`Kind`] in a fixed precedence order.
//! - **Context stack** ([`context`]): per-thread stack of the script
//!   invocations currently running.
//!
//! ## Design Principles
//!
//! - **Forgiving**: no access ever fails loudly. Missing keys, bad indices,
//!   type mismatches and busy handles all read as absent (`None`) and write
//!   as no-ops. `try_get` / `try_set` report the reason when it matters.
//! - **Reference semantics**: every property-bearing value is a shared
//!   handle; a value returned by `get` aliases the host's storage.
//! - **Descriptors, not reflection**: `#[derive(ScriptRecord)]` builds each
//!   record type's field table once.
//!
//! ## Example
//!
//! ```ignore
//! use otter_host::{ScriptRecord, Value, get, set};
//!
//! #[derive(ScriptRecord)]
//! struct Point {
//!     #[script]
//!     x: i32,
//!     #[script(name = "y")]
//!     vertical: i32,
//! }
//!
//! let point = Value::record(Point { x: 1, vertical: 2 });
//! set(Some(&point), Some("x"), Some(Value::Int32(10)));
//! assert_eq!(get(Some(&point), Some("x")), Some(Value::Int32(10)));
//! assert_eq!(point.property_keys(), Some(vec!["x".into(), "y".into()]));
//! ```

#![warn(clippy::all)]
#![warn(missing_docs)]

pub mod access;
pub mod array;
pub mod coerce;
pub mod context;
#[cfg(feature = "document")]
pub mod document;
pub mod error;
pub mod kind;
pub mod object;
pub mod record;
pub mod value;

pub use access::{get, keys, length, set, try_get, try_keys, try_set};
pub use array::{ElementType, FixedArray};
pub use coerce::Coerce;
pub use context::{ContextGuard, ExecutionContext};
#[cfg(feature = "document")]
pub use document::Document;
pub use error::{AccessError, AccessResult};
pub use kind::Kind;
pub use object::ScriptObject;
pub use record::{FieldValue, RecordHandle, RecordType, ScriptRecord};
pub use value::{List, Mapping, Shared, Value, shared};

/// Derive macro for [`ScriptRecord`](record::ScriptRecord).
pub use otter_macros::ScriptRecord;
