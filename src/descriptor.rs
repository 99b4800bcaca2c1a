//! Conversion of Java source types into JVM descriptors.
//!
//! Mapping files spell types the way they appear in source code, e.g.
//! `java.util.Map$Entry[]` or `java.util.List<java.lang.String>`. The
//! generated intermediary names are keyed on the bytecode descriptor instead,
//! so every type is normalized through [`resolve_type`] first.

fn java_base_type(ty: &str) -> Option<char> {
    match ty {
        "void" => Some('V'),
        "boolean" => Some('Z'),
        "byte" => Some('B'),
        "char" => Some('C'),
        "short" => Some('S'),
        "int" => Some('I'),
        "float" => Some('F'),
        "long" => Some('J'),
        "double" => Some('D'),
        _ => None,
    }
}

/// Removes all generic arguments from a type, innermost pair first.
///
/// A dangling `<` without a matching `>` truncates the type at that point.
fn strip_generics(ty: &str) -> String {
    let mut ty = ty.to_owned();
    loop {
        let Some(close) = ty.find('>') else {
            break;
        };
        match ty[..close].rfind('<') {
            Some(open) => ty.replace_range(open..=close, ""),
            // stray `>` with nothing to pair it with
            None => ty.replace_range(close..=close, ""),
        }
    }
    if let Some(open) = ty.find('<') {
        ty.truncate(open);
    }
    ty
}

fn is_class_segment(segment: &str) -> bool {
    segment.starts_with(|c: char| c.is_uppercase())
}

/// Converts a dotted class path into its internal `a/b/C$D` form.
fn class_path_to_internal(path: &str) -> String {
    let mut segments: Vec<String> = path.split('.').map(str::to_owned).collect();

    // walk from the right so that `A.B.C` collapses into `A$B$C`
    let mut idx = segments.len().saturating_sub(1);
    while idx > 0 {
        if is_class_segment(&segments[idx]) && is_class_segment(&segments[idx - 1]) {
            let inner = segments.remove(idx);
            segments[idx - 1].push('$');
            segments[idx - 1].push_str(&inner);
        }
        idx -= 1;
    }

    segments.join("/")
}

/// Resolves a Java source type into its JVM type descriptor.
///
/// This never fails: anything that is not a primitive keyword is treated as
/// a reference type.
///
/// # Examples
///
/// ```
/// use intermediary::resolve_type;
///
/// assert_eq!(resolve_type("int"), "I");
/// assert_eq!(resolve_type("java.lang.String[][]"), "[[Ljava/lang/String;");
/// assert_eq!(resolve_type("java.util.Map.Entry"), "Ljava/util/Map$Entry;");
/// assert_eq!(resolve_type("java.util.List<java.lang.String>"), "Ljava/util/List;");
/// ```
pub fn resolve_type(ty: &str) -> String {
    let mut ty = strip_generics(ty.trim());
    if let Some(base) = ty.strip_suffix("...") {
        ty = format!("{}[]", base);
    }

    let mut dimensions = 0;
    let mut base = ty.trim();
    while let Some(element) = base.strip_suffix("[]") {
        dimensions += 1;
        base = element.trim_end();
    }

    let mut descriptor = String::with_capacity(base.len() + dimensions + 2);
    for _ in 0..dimensions {
        descriptor.push('[');
    }

    match java_base_type(base) {
        Some(code) => descriptor.push(code),
        None => {
            descriptor.push('L');
            descriptor.push_str(&class_path_to_internal(base));
            descriptor.push(';');
        }
    }
    descriptor
}

/// Splits an argument list on the commas that are not nested in generics.
fn split_arguments(arguments: &str) -> Vec<&str> {
    let mut args = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;

    for (idx, c) in arguments.char_indices() {
        match c {
            '<' => depth += 1,
            '>' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                args.push(&arguments[start..idx]);
                start = idx + 1;
            }
            _ => {}
        }
    }
    args.push(&arguments[start..]);

    args.into_iter()
        .map(str::trim)
        .filter(|arg| !arg.is_empty())
        .collect()
}

/// Builds a JVM method descriptor out of a source return type and a comma
/// separated source argument list.
///
/// # Examples
///
/// ```
/// use intermediary::assemble_method;
///
/// assert_eq!(
///     assemble_method("void", "int, java.lang.String"),
///     "(ILjava/lang/String;)V"
/// );
/// assert_eq!(assemble_method("boolean", ""), "()Z");
/// ```
pub fn assemble_method(return_type: &str, arguments: &str) -> String {
    let mut descriptor = String::from("(");
    for arg in split_arguments(arguments) {
        descriptor.push_str(&resolve_type(arg));
    }
    descriptor.push(')');
    descriptor.push_str(&resolve_type(return_type));
    descriptor
}
