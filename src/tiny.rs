//! Serialization of a [`MappingDocument`] into tab separated tiny rows.
//!
//! ```text
//! v1	official	intermediary
//! CLASS	a	class_0f2e4a1b
//! 	FIELD	a	I	a	field_7c1d22e0
//! 	METHOD	a	(Ljava/lang/String;)I	b	method_93ab0c5d
//! ```

use std::fmt;
use std::io::{self, Write};

use crate::transcoder::{ClassMapping, MappingDocument, MemberMapping};

/// The first line of every generated file.
pub const HEADER: &str = "v1\tofficial\tintermediary";

/// A single output row.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Row<'d> {
    /// `CLASS\t<obfuscated>\t<generated>`
    Class {
        /// Obfuscated name of the class.
        obfuscated: &'d str,
        /// Generated name of the class.
        generated: &'d str,
    },
    /// `\tFIELD\t<owner>\t<descriptor>\t<obfuscated>\t<generated>`
    Field {
        /// Obfuscated name of the owning class.
        owner: &'d str,
        /// Type descriptor of the field.
        descriptor: &'d str,
        /// Obfuscated name of the field.
        obfuscated: &'d str,
        /// Generated name of the field.
        generated: &'d str,
    },
    /// `\tMETHOD\t<owner>\t<descriptor>\t<obfuscated>\t<generated>`
    Method {
        /// Obfuscated name of the owning class.
        owner: &'d str,
        /// Method descriptor.
        descriptor: &'d str,
        /// Obfuscated name of the method.
        obfuscated: &'d str,
        /// Generated name of the method.
        generated: &'d str,
    },
}

impl<'d> Row<'d> {
    fn member(owner: &'d ClassMapping, member: &'d MemberMapping) -> Self {
        match member {
            MemberMapping::Field(field) => Row::Field {
                owner: &owner.obfuscated_name,
                descriptor: &field.descriptor,
                obfuscated: &field.obfuscated_name,
                generated: &field.generated_name,
            },
            MemberMapping::Method(method) => Row::Method {
                owner: &owner.obfuscated_name,
                descriptor: &method.descriptor,
                obfuscated: &method.obfuscated_name,
                generated: &method.generated_name,
            },
        }
    }
}

impl fmt::Display for Row<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Row::Class {
                obfuscated,
                generated,
            } => write!(f, "CLASS\t{}\t{}", obfuscated, generated),
            Row::Field {
                owner,
                descriptor,
                obfuscated,
                generated,
            } => write!(
                f,
                "\tFIELD\t{}\t{}\t{}\t{}",
                owner, descriptor, obfuscated, generated
            ),
            Row::Method {
                owner,
                descriptor,
                obfuscated,
                generated,
            } => write!(
                f,
                "\tMETHOD\t{}\t{}\t{}\t{}",
                owner, descriptor, obfuscated, generated
            ),
        }
    }
}

/// Iterates over all rows of a document, in input order.
pub fn rows(document: &MappingDocument) -> impl Iterator<Item = Row<'_>> {
    document.classes.iter().flat_map(|class| {
        let head = Row::Class {
            obfuscated: &class.obfuscated_name,
            generated: &class.generated_name,
        };
        std::iter::once(head).chain(
            class
                .members
                .iter()
                .map(move |member| Row::member(class, member)),
        )
    })
}

/// Writes the header and all rows of `document`.
///
/// Returns the number of rows written, not counting the header.
pub fn write_document<W: Write>(document: &MappingDocument, mut writer: W) -> io::Result<usize> {
    writeln!(writer, "{}", HEADER)?;
    let mut count = 0;
    for row in rows(document) {
        writeln!(writer, "{}", row)?;
        count += 1;
    }
    writer.flush()?;
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcoder::Transcoder;

    #[test]
    fn test_row_format() {
        let class = Row::Class {
            obfuscated: "a",
            generated: "class_00000000",
        };
        assert_eq!(class.to_string(), "CLASS\ta\tclass_00000000");

        let field = Row::Field {
            owner: "a",
            descriptor: "I",
            obfuscated: "b",
            generated: "field_00000000",
        };
        assert_eq!(field.to_string(), "\tFIELD\ta\tI\tb\tfield_00000000");

        let method = Row::Method {
            owner: "a",
            descriptor: "()V",
            obfuscated: "c",
            generated: "method_00000000",
        };
        assert_eq!(method.to_string(), "\tMETHOD\ta\t()V\tc\tmethod_00000000");
    }

    #[test]
    fn test_write_document() {
        let transcoded = Transcoder::new("test").transcode(
            "\
a.A -> a:
    int x -> a
b.B -> b:
    void y() -> a
",
        );

        let mut out = Vec::new();
        let count = write_document(&transcoded.document, &mut out).unwrap();
        assert_eq!(count, 4);

        let out = String::from_utf8(out).unwrap();
        let lines: Vec<_> = out.lines().collect();
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[0], HEADER);
        assert!(lines[1].starts_with("CLASS\ta\tclass_"));
        assert!(lines[2].starts_with("\tFIELD\ta\tI\ta\tfield_"));
        assert!(lines[3].starts_with("CLASS\tb\tclass_"));
        assert!(lines[4].starts_with("\tMETHOD\tb\t()V\ta\tmethod_"));
        assert!(out.ends_with('\n'));
    }

    #[test]
    fn test_write_empty_document() {
        let mut out = Vec::new();
        let count = write_document(&MappingDocument::default(), &mut out).unwrap();
        assert_eq!(count, 0);
        assert_eq!(out, format!("{}\n", HEADER).into_bytes());
    }
}
