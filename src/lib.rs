//! This crate generates stable, hash derived "intermediary" names from
//! proguard style mapping files.
//!
//! Every class, field and method of a mapping is given a name like
//! `class_1a2b3c4d` that only depends on its original name (and, for members,
//! the original owner name and JVM descriptor). Tools can reference symbols by
//! these names across versions without depending on upstream naming choices.
//!
//! The main use case is to transcode a whole directory of versions using the
//! [`BatchRunner`], but single files can be transcoded with a [`Transcoder`]
//! and the individual building blocks are available as well.
//!
//! # Examples
//!
//! ```
//! use intermediary::{generate, tiny, NameKind, Transcoder};
//!
//! let mapping = "\
//! com.example.Foo -> a:
//!     int bar(java.lang.String) -> b
//! ";
//! let transcoded = Transcoder::new("1.0").transcode(mapping);
//!
//! let mut out = Vec::new();
//! tiny::write_document(&transcoded.document, &mut out).unwrap();
//!
//! let expected = format!(
//!     "v1\tofficial\tintermediary\nCLASS\ta\t{}\n\tMETHOD\ta\t(Ljava/lang/String;)I\tb\t{}\n",
//!     generate(NameKind::Class, &["com.example.Foo"]),
//!     generate(NameKind::Method, &["com.example.Foo", "bar", "(Ljava/lang/String;)I"]),
//! );
//! assert_eq!(String::from_utf8(out).unwrap(), expected);
//! ```

#![warn(missing_docs)]

mod batch;
mod config;
mod descriptor;
mod diagnostics;
mod error;
mod mapping;
mod naming;
pub mod tiny;
mod transcoder;

pub use batch::{
    run_version, temporary_path, write_atomic, BatchReport, BatchRunner, VersionOutcome,
    VersionReport,
};
pub use config::{
    BatchConfig, VersionJob, DEFAULT_INPUT_NAME, DEFAULT_OUTPUT_DIR, DEFAULT_OUTPUT_NAME,
    DEFAULT_VERSIONS_DIR,
};
pub use descriptor::{assemble_method, resolve_type};
pub use diagnostics::{Diagnostic, Reason};
pub use error::{VersionError, VersionErrorKind};
pub use mapping::{MappingLine, MappingLineIter, MappingSource, NumberedLine};
pub use naming::{generate, NameGenerator, NameKind, Sha1Names, UnknownNameKind, HASH_LEN};
pub use transcoder::{
    step, ClassMapping, FieldMapping, MappingDocument, MemberMapping, MethodMapping, OwnerState,
    Transcoded, Transcoder, Transition,
};

#[cfg(feature = "uuid")]
use uuid::Uuid;

/// Calculates the UUID of a mapping file.
///
/// This is a v5 UUID of the raw file contents, in a namespace derived from
/// the crate name.
#[cfg(feature = "uuid")]
pub fn mapping_uuid(mapping: &[u8]) -> Uuid {
    lazy_static::lazy_static! {
        static ref NAMESPACE: Uuid =
            Uuid::new_v5(&Uuid::NAMESPACE_OID, env!("CARGO_PKG_NAME").as_bytes());
    }
    Uuid::new_v5(&NAMESPACE, mapping)
}
