//! Turns a mapping file into a [`MappingDocument`] of intermediary names.
//!
//! The work is done one line at a time by [`step`], which takes the current
//! [`OwnerState`] and hands back the next one. [`Transcoder`] drives it over a
//! whole file and collects the [`Diagnostic`]s for every dropped line.

use log::{debug, warn};

use crate::descriptor::{assemble_method, resolve_type};
use crate::diagnostics::{Diagnostic, Reason};
use crate::mapping::{MappingLine, MappingSource};
use crate::naming::{NameGenerator, NameKind, Sha1Names};

/// A field with its generated intermediary name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldMapping {
    /// Original name of the field.
    pub source_name: String,
    /// The JVM type descriptor of the field.
    pub descriptor: String,
    /// Obfuscated name of the field.
    pub obfuscated_name: String,
    /// The generated `field_` name.
    pub generated_name: String,
}

/// A method with its generated intermediary name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MethodMapping {
    /// Original name of the method.
    pub source_name: String,
    /// The JVM method descriptor.
    pub descriptor: String,
    /// Obfuscated name of the method.
    pub obfuscated_name: String,
    /// The generated `method_` name.
    pub generated_name: String,
}

/// A member of a [`ClassMapping`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MemberMapping {
    /// A field.
    Field(FieldMapping),
    /// A method.
    Method(MethodMapping),
}

impl MemberMapping {
    /// Obfuscated name of the member.
    pub fn obfuscated_name(&self) -> &str {
        match self {
            MemberMapping::Field(field) => &field.obfuscated_name,
            MemberMapping::Method(method) => &method.obfuscated_name,
        }
    }

    /// The generated name of the member.
    pub fn generated_name(&self) -> &str {
        match self {
            MemberMapping::Field(field) => &field.generated_name,
            MemberMapping::Method(method) => &method.generated_name,
        }
    }
}

/// A class and all of its members, in the order they were declared.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClassMapping {
    /// Original name of the class.
    pub source_name: String,
    /// Obfuscated name of the class.
    pub obfuscated_name: String,
    /// The generated `class_` name, depends only on `source_name`.
    pub generated_name: String,
    /// Fields and methods, interleaved in input order.
    pub members: Vec<MemberMapping>,
}

impl ClassMapping {
    fn new(original: &str, obfuscated: &str, names: &impl NameGenerator) -> Self {
        Self {
            source_name: original.to_owned(),
            obfuscated_name: obfuscated.to_owned(),
            generated_name: names.generate(NameKind::Class, &[original]),
            members: Vec::new(),
        }
    }

    fn add_field(
        &mut self,
        ty: &str,
        original: &str,
        obfuscated: &str,
        names: &impl NameGenerator,
    ) {
        let descriptor = resolve_type(ty);
        let generated_name = names.generate(
            NameKind::Field,
            &[self.source_name.as_str(), original, descriptor.as_str()],
        );

        self.members.push(MemberMapping::Field(FieldMapping {
            source_name: original.to_owned(),
            descriptor,
            obfuscated_name: obfuscated.to_owned(),
            generated_name,
        }));
    }

    fn add_method(
        &mut self,
        ty: &str,
        original: &str,
        arguments: &str,
        obfuscated: &str,
        names: &impl NameGenerator,
    ) {
        let descriptor = assemble_method(ty, arguments);
        let generated_name = names.generate(
            NameKind::Method,
            &[self.source_name.as_str(), original, descriptor.as_str()],
        );

        self.members.push(MemberMapping::Method(MethodMapping {
            source_name: original.to_owned(),
            descriptor,
            obfuscated_name: obfuscated.to_owned(),
            generated_name,
        }));
    }
}

/// All classes of one mapping file.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MappingDocument {
    /// The version label.
    pub version: String,
    /// Classes in input order.
    pub classes: Vec<ClassMapping>,
}

impl MappingDocument {
    /// Number of members across all classes.
    pub fn member_count(&self) -> usize {
        self.classes.iter().map(|class| class.members.len()).sum()
    }
}

/// The class that member lines are currently attached to.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum OwnerState {
    /// No valid class declaration is in effect.
    #[default]
    NoOwner,
    /// Members are attached to this class.
    HasOwner(ClassMapping),
}

impl OwnerState {
    /// Ends the current class, if any.
    pub fn finish(self) -> Option<ClassMapping> {
        match self {
            OwnerState::NoOwner => None,
            OwnerState::HasOwner(class) => Some(class),
        }
    }
}

/// The outcome of feeding one line to [`step`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transition {
    /// The state for the next line.
    pub state: OwnerState,
    /// A class that was superseded by this line and is now complete.
    pub finished: Option<ClassMapping>,
    /// Set if the line was dropped.
    pub dropped: Option<Reason>,
}

/// Advances the owner state machine by one classified line.
///
/// Blank and comment lines leave the state alone. Any class line, valid or
/// not, ends the current owner; members of an invalid class are never
/// attached to an earlier one.
pub fn step(state: OwnerState, line: &MappingLine, names: &impl NameGenerator) -> Transition {
    match (state, line) {
        (state, MappingLine::Blank | MappingLine::Comment(_)) => Transition {
            state,
            finished: None,
            dropped: None,
        },
        (state, MappingLine::Class { original, obfuscated }) => Transition {
            state: OwnerState::HasOwner(ClassMapping::new(original, obfuscated, names)),
            finished: state.finish(),
            dropped: None,
        },
        (state, MappingLine::Unrecognized(Reason::MalformedClass)) => Transition {
            state: OwnerState::NoOwner,
            finished: state.finish(),
            dropped: Some(Reason::MalformedClass),
        },
        (OwnerState::NoOwner, _) => Transition {
            state: OwnerState::NoOwner,
            finished: None,
            dropped: Some(Reason::MemberOutsideClass),
        },
        (OwnerState::HasOwner(class), MappingLine::Unrecognized(reason)) => Transition {
            state: OwnerState::HasOwner(class),
            finished: None,
            dropped: Some(*reason),
        },
        (
            OwnerState::HasOwner(mut class),
            MappingLine::Field {
                ty,
                original,
                obfuscated,
            },
        ) => {
            class.add_field(ty, original, obfuscated, names);
            Transition {
                state: OwnerState::HasOwner(class),
                finished: None,
                dropped: None,
            }
        }
        (
            OwnerState::HasOwner(mut class),
            MappingLine::Method {
                ty,
                original,
                arguments,
                obfuscated,
            },
        ) => {
            class.add_method(ty, original, arguments, obfuscated, names);
            Transition {
                state: OwnerState::HasOwner(class),
                finished: None,
                dropped: None,
            }
        }
    }
}

/// The result of transcoding one mapping file.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Transcoded {
    /// The generated intermediary mappings.
    pub document: MappingDocument,
    /// Every line that was dropped, in input order.
    pub diagnostics: Vec<Diagnostic>,
}

/// Transcodes mapping files of a single version.
///
/// # Examples
///
/// ```
/// use intermediary::{generate, NameKind, Transcoder};
///
/// let transcoded = Transcoder::new("1.0").transcode(
///     "com.example.Foo -> a:\n    int bar(java.lang.String) -> b\n",
/// );
///
/// let class = &transcoded.document.classes[0];
/// assert_eq!(class.generated_name, generate(NameKind::Class, &["com.example.Foo"]));
/// assert_eq!(class.members.len(), 1);
/// assert!(transcoded.diagnostics.is_empty());
/// ```
#[derive(Clone, Debug)]
pub struct Transcoder<G = Sha1Names> {
    version: String,
    names: G,
}

impl Transcoder {
    /// Creates a transcoder using the default SHA-1 based names.
    pub fn new(version: impl Into<String>) -> Self {
        Self::with_generator(version, Sha1Names)
    }
}

impl<G: NameGenerator> Transcoder<G> {
    /// Creates a transcoder with a custom [`NameGenerator`].
    pub fn with_generator(version: impl Into<String>, names: G) -> Self {
        Self {
            version: version.into(),
            names,
        }
    }

    /// The version label used in diagnostics.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Transcodes the full text of a mapping file.
    ///
    /// Malformed lines never abort the run, they are logged and reported in
    /// [`Transcoded::diagnostics`].
    pub fn transcode(&self, source: &str) -> Transcoded {
        let mut classes = Vec::new();
        let mut diagnostics = Vec::new();
        let mut state = OwnerState::NoOwner;

        for line in MappingSource::new(source).iter() {
            let transition = step(state, &line.line, &self.names);
            state = transition.state;
            classes.extend(transition.finished);

            if let Some(reason) = transition.dropped {
                warn!(
                    "[{}] skipping line {}: {}: {}",
                    self.version, line.number, reason, line.raw
                );
                diagnostics.push(Diagnostic {
                    version: self.version.clone(),
                    line_number: line.number,
                    raw: line.raw.to_owned(),
                    reason,
                });
            }
        }
        classes.extend(state.finish());

        let document = MappingDocument {
            version: self.version.clone(),
            classes,
        };
        debug!(
            "[{}] transcoded {} classes, {} members, skipped {} lines",
            self.version,
            document.classes.len(),
            document.member_count(),
            diagnostics.len()
        );

        Transcoded {
            document,
            diagnostics,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::naming::generate;
    use std::cell::RefCell;

    #[derive(Default)]
    struct RecordingNames {
        calls: RefCell<Vec<(NameKind, Vec<String>)>>,
    }

    impl NameGenerator for RecordingNames {
        fn generate(&self, kind: NameKind, parts: &[&str]) -> String {
            self.calls
                .borrow_mut()
                .push((kind, parts.iter().map(|part| part.to_string()).collect()));
            format!("{}_{}", kind, self.calls.borrow().len())
        }
    }

    fn class_line() -> MappingLine<'static> {
        MappingLine::Class {
            original: "com.example.Foo",
            obfuscated: "a",
        }
    }

    #[test]
    fn step_ignores_blank_lines() {
        let transition = step(OwnerState::NoOwner, &MappingLine::Blank, &Sha1Names);
        assert_eq!(transition.state, OwnerState::NoOwner);
        assert_eq!(transition.dropped, None);

        let owner = step(OwnerState::NoOwner, &class_line(), &Sha1Names).state;
        let transition = step(owner.clone(), &MappingLine::Comment("# hi"), &Sha1Names);
        assert_eq!(transition.state, owner);
        assert_eq!(transition.finished, None);
    }

    #[test]
    fn step_class_starts_owner() {
        let transition = step(OwnerState::NoOwner, &class_line(), &Sha1Names);
        let OwnerState::HasOwner(class) = transition.state else {
            panic!("expected an owner");
        };
        assert_eq!(class.source_name, "com.example.Foo");
        assert_eq!(class.obfuscated_name, "a");
        assert_eq!(class.generated_name, generate(NameKind::Class, &["com.example.Foo"]));
        assert_eq!(transition.finished, None);
    }

    #[test]
    fn step_class_finishes_previous_owner() {
        let owner = step(OwnerState::NoOwner, &class_line(), &Sha1Names).state;
        let next = MappingLine::Class {
            original: "com.example.Bar",
            obfuscated: "b",
        };
        let transition = step(owner, &next, &Sha1Names);
        assert_eq!(transition.finished.unwrap().source_name, "com.example.Foo");
    }

    #[test]
    fn step_malformed_class_clears_owner() {
        let owner = step(OwnerState::NoOwner, &class_line(), &Sha1Names).state;
        let transition = step(
            owner,
            &MappingLine::Unrecognized(Reason::MalformedClass),
            &Sha1Names,
        );
        assert_eq!(transition.state, OwnerState::NoOwner);
        assert_eq!(transition.dropped, Some(Reason::MalformedClass));
        assert!(transition.finished.is_some());
    }

    #[test]
    fn step_member_without_owner_is_dropped() {
        let field = MappingLine::Field {
            ty: "int",
            original: "count",
            obfuscated: "a",
        };
        let transition = step(OwnerState::NoOwner, &field, &Sha1Names);
        assert_eq!(transition.state, OwnerState::NoOwner);
        assert_eq!(transition.dropped, Some(Reason::MemberOutsideClass));

        let transition = step(
            OwnerState::NoOwner,
            &MappingLine::Unrecognized(Reason::MalformedMethod),
            &Sha1Names,
        );
        assert_eq!(transition.dropped, Some(Reason::MemberOutsideClass));
    }

    #[test]
    fn step_malformed_member_keeps_owner() {
        let owner = step(OwnerState::NoOwner, &class_line(), &Sha1Names).state;
        let transition = step(
            owner.clone(),
            &MappingLine::Unrecognized(Reason::MalformedField),
            &Sha1Names,
        );
        assert_eq!(transition.state, owner);
        assert_eq!(transition.dropped, Some(Reason::MalformedField));
    }

    #[test]
    fn step_passes_identity_to_generator() {
        let names = RecordingNames::default();
        let owner = step(OwnerState::NoOwner, &class_line(), &names).state;
        let owner = step(
            owner,
            &MappingLine::Field {
                ty: "java.lang.String[]",
                original: "names",
                obfuscated: "a",
            },
            &names,
        )
        .state;
        step(
            owner,
            &MappingLine::Method {
                ty: "void",
                original: "run",
                arguments: "int, long",
                obfuscated: "b",
            },
            &names,
        );

        let calls = names.calls.into_inner();
        assert_eq!(
            calls,
            vec![
                (NameKind::Class, vec!["com.example.Foo".to_string()]),
                (
                    NameKind::Field,
                    vec![
                        "com.example.Foo".to_string(),
                        "names".to_string(),
                        "[Ljava/lang/String;".to_string()
                    ]
                ),
                (
                    NameKind::Method,
                    vec![
                        "com.example.Foo".to_string(),
                        "run".to_string(),
                        "(IJ)V".to_string()
                    ]
                ),
            ]
        );
    }

    #[test]
    fn transcode_end_to_end() {
        let transcoded = Transcoder::new("1.0")
            .transcode("com.example.Foo -> a:\n    int bar(java.lang.String) -> b\n");

        assert_eq!(
            transcoded.document.classes,
            vec![ClassMapping {
                source_name: "com.example.Foo".into(),
                obfuscated_name: "a".into(),
                generated_name: generate(NameKind::Class, &["com.example.Foo"]),
                members: vec![MemberMapping::Method(MethodMapping {
                    source_name: "bar".into(),
                    descriptor: "(Ljava/lang/String;)I".into(),
                    obfuscated_name: "b".into(),
                    generated_name: generate(
                        NameKind::Method,
                        &["com.example.Foo", "bar", "(Ljava/lang/String;)I"]
                    ),
                })],
            }]
        );
    }

    #[test]
    fn transcode_never_attaches_to_stale_owner() {
        let source = "\
com.example.Foo -> a:
    int count -> a
com.example.Broken -> b
    int lost -> a
    void alsoLost() -> b
com.example.Bar -> c:
    int kept -> a
";
        let transcoded = Transcoder::new("test").transcode(source);
        let classes = &transcoded.document.classes;

        assert_eq!(classes.len(), 2);
        assert_eq!(classes[0].members.len(), 1);
        assert_eq!(classes[1].source_name, "com.example.Bar");
        assert_eq!(classes[1].members.len(), 1);

        let dropped: Vec<_> = transcoded
            .diagnostics
            .iter()
            .map(|d| (d.line_number, d.reason))
            .collect();
        assert_eq!(
            dropped,
            vec![
                (3, Reason::MalformedClass),
                (4, Reason::MemberOutsideClass),
                (5, Reason::MemberOutsideClass),
            ]
        );
        assert_eq!(transcoded.diagnostics[0].raw, "com.example.Broken -> b");
        assert_eq!(transcoded.diagnostics[0].version, "test");
    }

    #[test]
    fn transcode_keeps_member_order() {
        let source = "\
# compiler: R8

a.B -> a:
    int x -> a
    1:1:void y() -> b
    long z -> c
";
        let transcoded = Transcoder::new("test").transcode(source);
        let obfuscated: Vec<_> = transcoded.document.classes[0]
            .members
            .iter()
            .map(MemberMapping::obfuscated_name)
            .collect();
        assert_eq!(obfuscated, vec!["a", "b", "c"]);
        assert_eq!(transcoded.document.member_count(), 3);
        assert!(transcoded.diagnostics.is_empty());
    }
}
