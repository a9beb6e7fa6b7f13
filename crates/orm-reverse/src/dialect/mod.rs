//! Type registry: native catalog types to logical types and back.
//!
//! Each backend contributes two immutable tables, one per direction, so the
//! parsers and the platforms never map between vendors directly:
//!
//! ```text
//! catalog type  --ToLogical-->  LogicalType  --FromLogical-->  DDL type
//!  "int identity"                 INTEGER                        "INT"
//!  "AUTOINC2"                     SMALLINT                       "SMALLINT"
//! ```

mod canonical;
mod typemap;

pub use canonical::{native_storage_class, FromLogical, ToLogical};
pub use typemap::{pervasive_type_key, MssqlTypes, PervasiveTypes};
