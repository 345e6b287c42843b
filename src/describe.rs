//! Human-readable descriptions of changes
//!
//! Renders change records as short statements:
//!
//! ```text
//! user.name = "bob"
//! delete user.email
//! user.tags.push("new")
//! user.tags.splice(1, 2, "x")
//! ```
//!
//! Sequence changes are rendered from splices, so the structural walk that
//! produced the records stays outside this crate.

use compact_str::CompactString;
use smallvec::SmallVec;

use crate::splice::Splice;

// =============================================================================
// Paths
// =============================================================================

/// One step into a nested structure
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    /// Named field or map key
    Key(CompactString),
    /// Sequence position
    Index(usize),
}

impl From<&str> for PathSegment {
    fn from(key: &str) -> Self {
        Self::Key(CompactString::from(key))
    }
}

impl From<String> for PathSegment {
    fn from(key: String) -> Self {
        Self::Key(CompactString::from(key))
    }
}

impl From<usize> for PathSegment {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

/// Path from the root of a structure to a changed value
pub type Path = SmallVec<[PathSegment; 8]>;

/// Build a [`Path`] from mixed keys and indices
#[macro_export]
macro_rules! path {
    ($($segment:expr),* $(,)?) => {
        $crate::describe::Path::from_iter([$($crate::describe::PathSegment::from($segment)),*])
    };
}

/// Check if `key` can be written as a bare identifier
fn is_token(key: &str) -> bool {
    let mut chars = key.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn push_segment(segment: &PathSegment, first: bool, output: &mut String) {
    match segment {
        PathSegment::Key(key) if is_token(key) => {
            if !first {
                output.push('.');
            }
            output.push_str(key);
        }
        PathSegment::Key(key) => {
            output.push('[');
            output.push_str(key);
            output.push(']');
        }
        PathSegment::Index(index) => {
            output.push('[');
            output.push_str(&index.to_string());
            output.push(']');
        }
    }
}

/// Render a path, with `prefix` as its first key when non-empty
///
/// Identifier keys are joined with `.`; other keys and indices are bracketed.
pub fn path_string(path: &[PathSegment], prefix: &str) -> String {
    let mut output = String::new();
    let mut first = true;

    if !prefix.is_empty() {
        push_segment(&PathSegment::from(prefix), true, &mut output);
        first = false;
    }
    for segment in path {
        push_segment(segment, first, &mut output);
        first = false;
    }
    output
}

// =============================================================================
// DescribeConfig
// =============================================================================

/// Class name used for objects whose type has no name
pub const ANONYMOUS_CLASS: &str = "(anonymous class)";

/// Override for object class names
///
/// Receives the object's class name (`None` when anonymous). Returning `None`
/// falls back to the default rendering.
pub type ClassNameFn = fn(Option<&str>) -> Option<CompactString>;

/// Configuration for change descriptions
#[derive(Debug, Clone, Default)]
pub struct DescribeConfig {
    /// Name prepended to every path (e.g. the variable holding the root)
    pub prefix: CompactString,
    /// Optional override for the `<Name>` shown for objects
    pub class_name: Option<ClassNameFn>,
}

impl DescribeConfig {
    /// Create a config with the given path prefix
    pub fn new(prefix: impl Into<CompactString>) -> Self {
        Self {
            prefix: prefix.into(),
            class_name: None,
        }
    }

    /// Set the path prefix
    pub fn with_prefix(mut self, prefix: impl Into<CompactString>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Set the class name override
    pub fn with_class_name(mut self, class_name: ClassNameFn) -> Self {
        self.class_name = Some(class_name);
        self
    }

    /// Resolve the displayed name of an object's class
    pub fn class_label(&self, class: Option<&str>) -> CompactString {
        self.class_name
            .and_then(|name_of| name_of(class))
            .unwrap_or_else(|| CompactString::from(class.unwrap_or(ANONYMOUS_CLASS)))
    }
}

// =============================================================================
// Values
// =============================================================================

/// Rendering of a value inside a statement
pub trait ValueDisplay {
    /// Append the rendered value to `output`
    fn fmt_value(&self, output: &mut String, config: &DescribeConfig);

    /// Render the value into a new string
    fn value_string(&self, config: &DescribeConfig) -> String {
        let mut output = String::new();
        self.fmt_value(&mut output, config);
        output
    }
}

/// Render an object as `<Name>`, honouring the config's class name override
///
/// Types that are objects rather than plain values implement
/// [`ValueDisplay`] by calling this with their class name.
pub fn fmt_object(class: Option<&str>, output: &mut String, config: &DescribeConfig) {
    output.push('<');
    output.push_str(&config.class_label(class));
    output.push('>');
}

/// Append `text` as a JSON string literal
fn push_json_string(text: &str, output: &mut String) {
    output.push('"');
    for c in text.chars() {
        match c {
            '"' => output.push_str("\\\""),
            '\\' => output.push_str("\\\\"),
            '\n' => output.push_str("\\n"),
            '\r' => output.push_str("\\r"),
            '\t' => output.push_str("\\t"),
            '\u{8}' => output.push_str("\\b"),
            '\u{c}' => output.push_str("\\f"),
            c if c < '\u{20}' => output.push_str(&format!("\\u{:04x}", c as u32)),
            c => output.push(c),
        }
    }
    output.push('"');
}

impl<T: ValueDisplay + ?Sized> ValueDisplay for &T {
    fn fmt_value(&self, output: &mut String, config: &DescribeConfig) {
        (**self).fmt_value(output, config);
    }
}

impl ValueDisplay for str {
    fn fmt_value(&self, output: &mut String, _config: &DescribeConfig) {
        push_json_string(self, output);
    }
}

impl ValueDisplay for String {
    fn fmt_value(&self, output: &mut String, config: &DescribeConfig) {
        self.as_str().fmt_value(output, config);
    }
}

impl ValueDisplay for CompactString {
    fn fmt_value(&self, output: &mut String, config: &DescribeConfig) {
        self.as_str().fmt_value(output, config);
    }
}

impl<T: ValueDisplay> ValueDisplay for Option<T> {
    fn fmt_value(&self, output: &mut String, config: &DescribeConfig) {
        match self {
            Some(value) => value.fmt_value(output, config),
            None => output.push_str("null"),
        }
    }
}

impl<T> ValueDisplay for [T] {
    fn fmt_value(&self, output: &mut String, config: &DescribeConfig) {
        fmt_object(Some("Array"), output, config);
    }
}

impl<T> ValueDisplay for Vec<T> {
    fn fmt_value(&self, output: &mut String, config: &DescribeConfig) {
        self.as_slice().fmt_value(output, config);
    }
}

macro_rules! display_values {
    ($($ty:ty),* $(,)?) => {
        $(
            impl ValueDisplay for $ty {
                fn fmt_value(&self, output: &mut String, _config: &DescribeConfig) {
                    output.push_str(&self.to_string());
                }
            }
        )*
    };
}

display_values!(bool, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

impl ValueDisplay for char {
    fn fmt_value(&self, output: &mut String, _config: &DescribeConfig) {
        push_json_string(self.encode_utf8(&mut [0; 4]), output);
    }
}

// Infinities read `Infinity`, and negative zero reads `0`
macro_rules! display_floats {
    ($($ty:ty),* $(,)?) => {
        $(
            impl ValueDisplay for $ty {
                fn fmt_value(&self, output: &mut String, _config: &DescribeConfig) {
                    if self.is_infinite() {
                        output.push_str(if *self > 0.0 { "Infinity" } else { "-Infinity" });
                    } else if *self == 0.0 {
                        output.push('0');
                    } else {
                        output.push_str(&self.to_string());
                    }
                }
            }
        )*
    };
}

display_floats!(f32, f64);

// =============================================================================
// Changes
// =============================================================================

/// Kind of a change record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    /// Existing value replaced
    Edit,
    /// Value added where there was none
    New,
    /// Value removed
    Delete,
    /// Sequence edited in place
    ArraySplice,
}

/// A change at a path, as produced by a structural diff
#[derive(Debug, Clone, PartialEq)]
pub enum Change<V> {
    /// Existing value replaced by `value`
    Edit { path: Path, value: V },
    /// New `value` added
    New { path: Path, value: V },
    /// Value removed
    Delete { path: Path },
    /// Sequence of length `len_before` edited by `splices`
    ArraySplice {
        path: Path,
        len_before: usize,
        splices: Vec<Splice<V>>,
    },
}

impl<V> Change<V> {
    /// Kind of this change
    pub fn kind(&self) -> ChangeKind {
        match self {
            Change::Edit { .. } => ChangeKind::Edit,
            Change::New { .. } => ChangeKind::New,
            Change::Delete { .. } => ChangeKind::Delete,
            Change::ArraySplice { .. } => ChangeKind::ArraySplice,
        }
    }

    /// Path of the changed value
    pub fn path(&self) -> &[PathSegment] {
        match self {
            Change::Edit { path, .. }
            | Change::New { path, .. }
            | Change::Delete { path }
            | Change::ArraySplice { path, .. } => path,
        }
    }
}

/// Render one change as a statement
pub fn describe_change<V: ValueDisplay>(change: &Change<V>, config: &DescribeConfig) -> String {
    match change {
        Change::Edit { path, value } | Change::New { path, value } => {
            let mut output = path_string(path, &config.prefix);
            output.push_str(" = ");
            value.fmt_value(&mut output, config);
            output
        }
        Change::Delete { path } => {
            let mut output = String::from("delete ");
            output.push_str(&path_string(path, &config.prefix));
            output
        }
        Change::ArraySplice { path, len_before, splices } => {
            describe_splices(path, splices, *len_before, config)
        }
    }
}

/// Render a list of changes, joined with `"; "`
pub fn describe_changes<V: ValueDisplay>(changes: &[Change<V>], config: &DescribeConfig) -> String {
    changes
        .iter()
        .map(|change| describe_change(change, config))
        .collect::<Vec<_>>()
        .join("; ")
}

// =============================================================================
// Splices
// =============================================================================

fn push_call<V: ValueDisplay>(
    path: &[PathSegment],
    method: &str,
    numbers: &[usize],
    values: &[V],
    config: &DescribeConfig,
    output: &mut String,
) {
    let mut method_path = Path::from(path);
    method_path.push(PathSegment::from(method));
    output.push_str(&path_string(&method_path, &config.prefix));
    output.push('(');

    let args = numbers
        .iter()
        .map(|number| number.to_string())
        .chain(values.iter().map(|value| value.value_string(config)));
    for (i, arg) in args.enumerate() {
        if i > 0 {
            output.push_str(", ");
        }
        output.push_str(&arg);
    }
    output.push(')');
}

/// Render one splice applied to a sequence of length `len`
///
/// Appends become `push`, dropping the last element `pop`, dropping the first
/// `shift`, prepending `unshift`; anything else is a `splice` call.
pub fn describe_splice<V: ValueDisplay>(
    path: &[PathSegment],
    splice: &Splice<V>,
    len: usize,
    config: &DescribeConfig,
) -> String {
    let mut output = String::new();
    let Splice { at, remove, add } = splice;
    let (at, remove) = (*at, *remove);

    let none: &[V] = &[];
    match (remove, add.is_empty()) {
        (0, false) if at == len => push_call(path, "push", &[], add, config, &mut output),
        (1, true) if at + 1 == len => push_call(path, "pop", &[], none, config, &mut output),
        (1, true) if at == 0 => push_call(path, "shift", &[], none, config, &mut output),
        (0, false) if at == 0 => push_call(path, "unshift", &[], add, config, &mut output),
        _ => push_call(path, "splice", &[at, remove], add, config, &mut output),
    }
    output
}

/// Render a splice list applied in order to a sequence of length `len_before`
pub fn describe_splices<V: ValueDisplay>(
    path: &[PathSegment],
    splices: &[Splice<V>],
    len_before: usize,
    config: &DescribeConfig,
) -> String {
    let mut len = len_before;
    splices
        .iter()
        .map(|splice| {
            let statement = describe_splice(path, splice, len, config);
            len = (len + splice.add.len()).saturating_sub(splice.remove);
            statement
        })
        .collect::<Vec<_>>()
        .join("; ")
}

// =============================================================================
// Tests
// =============================================================================
