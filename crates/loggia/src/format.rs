//! crates/loggia/src/format.rs
//! Format-pattern scanner, validator, directive table, and record rendering.

use std::collections::BTreeMap;

use crate::error::FormatError;
use crate::record::Record;

/// Pattern applied when a logger is built or `set_format(None)` is called.
pub const DEFAULT_PATTERN: &str = "%(asctime)s | %(name)s | %(levelname)s | %(message)s";

/// Placeholder value substituted when a directive cannot be resolved.
pub const SENTINEL: &str = "-----";

/// Prefix marking a field as an auto-capture variable reference.
pub const CAPTURE_MARKER: char = '*';

/// Built-in record fields addressable from a format pattern.
///
/// Three of them collide with reserved engine field names and are rewritten
/// to internal names in the compiled pattern: `module` becomes `mod`,
/// `filename` becomes `fl_name`, `funcName` becomes `func`. Those three are
/// also the only built-ins that depend on the individual call, so they enter
/// the directive table with sentinel defaults.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Builtin {
    Asctime,
    Created,
    Name,
    Levelname,
    Msecs,
    Levelno,
    Lineno,
    ProcessName,
    Process,
    ThreadName,
    Thread,
    RelativeCreated,
    Pathname,
    Module,
    Filename,
    FuncName,
    Message,
}

impl Builtin {
    const ALL: [Self; 17] = [
        Self::Asctime,
        Self::Created,
        Self::Name,
        Self::Levelname,
        Self::Msecs,
        Self::Levelno,
        Self::Lineno,
        Self::ProcessName,
        Self::Process,
        Self::ThreadName,
        Self::Thread,
        Self::RelativeCreated,
        Self::Pathname,
        Self::Module,
        Self::Filename,
        Self::FuncName,
        Self::Message,
    ];

    /// The name accepted in user-supplied patterns.
    const fn public_name(self) -> &'static str {
        match self {
            Self::Asctime => "asctime",
            Self::Created => "created",
            Self::Name => "name",
            Self::Levelname => "levelname",
            Self::Msecs => "msecs",
            Self::Levelno => "levelno",
            Self::Lineno => "lineno",
            Self::ProcessName => "processName",
            Self::Process => "process",
            Self::ThreadName => "threadName",
            Self::Thread => "thread",
            Self::RelativeCreated => "relativeCreated",
            Self::Pathname => "pathname",
            Self::Module => "module",
            Self::Filename => "filename",
            Self::FuncName => "funcName",
            Self::Message => "message",
        }
    }

    /// The name written into the compiled pattern.
    const fn internal_name(self) -> &'static str {
        match self {
            Self::Module => "mod",
            Self::Filename => "fl_name",
            Self::FuncName => "func",
            other => other.public_name(),
        }
    }

    /// Whether the field's value depends on the individual call and therefore
    /// enters the directive table with a sentinel default.
    const fn call_dependent(self) -> bool {
        matches!(self, Self::Module | Self::Filename | Self::FuncName)
    }

    fn from_public(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|builtin| builtin.public_name() == name)
    }

    fn accepted_names() -> String {
        Self::ALL
            .into_iter()
            .map(Self::public_name)
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn value(self, record: &Record) -> String {
        match self {
            Self::Asctime => record.timestamp.format("%Y-%m-%d %H:%M:%S,%3f").to_string(),
            Self::Created => format!("{:.6}", record.created),
            Self::Name => record.name.clone(),
            Self::Levelname => record.level.name().to_owned(),
            Self::Msecs => format!("{:.3}", record.msecs()),
            Self::Levelno => record.level.rank().to_string(),
            Self::Lineno => record.lineno.to_string(),
            Self::ProcessName => record.process_name.clone(),
            Self::Process => record.process.to_string(),
            Self::ThreadName => record.thread_name.clone(),
            Self::Thread => record.thread_id.clone(),
            Self::RelativeCreated => format!("{:.3}", record.relative_created),
            Self::Pathname => record.pathname.clone(),
            Self::Message => record.message.clone(),
            Self::Module | Self::Filename | Self::FuncName => record
                .extra
                .get(self.internal_name())
                .cloned()
                .unwrap_or_else(|| SENTINEL.to_owned()),
        }
    }
}

/// Width/alignment metadata attached to a placeholder.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
struct Pad {
    left: bool,
    width: usize,
}

#[derive(Clone, Debug, Eq, PartialEq)]
enum FieldKey {
    Builtin(Builtin),
    /// Capture variable name without the marker prefix.
    Capture(String),
}

#[derive(Clone, Debug, Eq, PartialEq)]
enum Segment {
    Literal(String),
    Field {
        key: FieldKey,
        pad: Option<Pad>,
        /// Alignment/width text exactly as written, for pattern rewriting.
        pad_text: String,
    },
}

/// A placeholder recognized purely syntactically, before classification.
struct RawField {
    name: String,
    pad: Option<Pad>,
    pad_text: String,
}

enum RawSegment {
    Literal(String),
    Field(RawField),
}

/// A validated format pattern plus its directive table.
///
/// Compilation happens once per `set_format` call; rendering happens on every
/// emitted record. The instance is immutable; the facade replaces it
/// wholesale on reformat.
///
/// # Examples
///
/// ```
/// use loggia::CompiledFormat;
///
/// let compiled = CompiledFormat::compile(Some("%(levelname)-8s %(*request_id)s %(message)s"))?;
/// assert_eq!(compiled.pattern(), "%(levelname)-8s %(*request_id)s %(message)s");
/// assert_eq!(compiled.directives().get("*request_id").map(String::as_str), Some("-----"));
/// # Ok::<(), loggia::FormatError>(())
/// ```
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CompiledFormat {
    pattern: String,
    segments: Vec<Segment>,
    directives: BTreeMap<String, String>,
}

impl CompiledFormat {
    /// Compiles a pattern into a renderable format.
    ///
    /// `None` selects [`DEFAULT_PATTERN`]. `Some("")` is valid and means
    /// "emit the raw message with no decoration". Any other pattern must obey
    /// the placeholder grammar: `%(` name `)` optional alignment/width `s`,
    /// where name is a built-in field or a `*`-prefixed variable name.
    ///
    /// Compiling is pure and deterministic; no I/O happens here.
    pub fn compile(pattern: Option<&str>) -> Result<Self, FormatError> {
        let pattern = pattern.unwrap_or(DEFAULT_PATTERN);
        if pattern.is_empty() {
            return Ok(Self {
                pattern: String::new(),
                segments: Vec::new(),
                directives: BTreeMap::new(),
            });
        }
        if pattern.trim().is_empty() {
            return Err(FormatError::BlankPattern);
        }

        let raw_segments = scan(pattern);
        let recognized = raw_segments
            .iter()
            .filter(|segment| matches!(segment, RawSegment::Field(_)))
            .count();
        let percents = pattern.matches('%').count();
        if recognized == 0 || percents != recognized {
            return Err(FormatError::MalformedEscaping);
        }

        let mut segments = Vec::with_capacity(raw_segments.len());
        let mut directives = BTreeMap::new();
        let mut rewritten = String::with_capacity(pattern.len());
        for raw in raw_segments {
            match raw {
                RawSegment::Literal(text) => {
                    rewritten.push_str(&text);
                    segments.push(Segment::Literal(text));
                }
                RawSegment::Field(field) => {
                    let key = classify(&field.name)?;
                    let written_name = match &key {
                        FieldKey::Builtin(builtin) => {
                            if builtin.call_dependent() {
                                directives.insert(
                                    builtin.internal_name().to_owned(),
                                    SENTINEL.to_owned(),
                                );
                            }
                            builtin.internal_name().to_owned()
                        }
                        FieldKey::Capture(name) => {
                            let key_name = format!("{CAPTURE_MARKER}{name}");
                            directives.insert(key_name.clone(), SENTINEL.to_owned());
                            key_name
                        }
                    };
                    rewritten.push_str("%(");
                    rewritten.push_str(&written_name);
                    rewritten.push(')');
                    rewritten.push_str(&field.pad_text);
                    rewritten.push('s');
                    segments.push(Segment::Field {
                        key,
                        pad: field.pad,
                        pad_text: field.pad_text,
                    });
                }
            }
        }

        Ok(Self {
            pattern: rewritten,
            segments,
            directives,
        })
    }

    /// Returns the rewritten, engine-ready pattern.
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Returns the directive table: every capture key plus the call-dependent
    /// built-ins' internal names, each mapped to its sentinel default.
    #[must_use]
    pub fn directives(&self) -> &BTreeMap<String, String> {
        &self.directives
    }

    /// Renders a record according to the compiled pattern.
    ///
    /// An empty pattern yields the raw message. Directive values come from
    /// [`Record::extra`]; a key missing there degrades to the sentinel rather
    /// than failing.
    #[must_use]
    pub fn render(&self, record: &Record) -> String {
        if self.pattern.is_empty() {
            return record.message.clone();
        }
        let mut out = String::with_capacity(self.pattern.len() + record.message.len());
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Field { key, pad, .. } => {
                    let value = match key {
                        FieldKey::Builtin(builtin) => builtin.value(record),
                        FieldKey::Capture(name) => {
                            let key_name = format!("{CAPTURE_MARKER}{name}");
                            record
                                .extra
                                .get(&key_name)
                                .cloned()
                                .unwrap_or_else(|| SENTINEL.to_owned())
                        }
                    };
                    push_padded(&mut out, &value, *pad);
                }
            }
        }
        out
    }
}

impl Default for CompiledFormat {
    /// The default format is the compiled [`DEFAULT_PATTERN`].
    fn default() -> Self {
        Self::compile(None).expect("the built-in default pattern always compiles")
    }
}

fn push_padded(out: &mut String, value: &str, pad: Option<Pad>) {
    match pad {
        None => out.push_str(value),
        Some(Pad { left, width }) => {
            let len = value.chars().count();
            if len >= width {
                out.push_str(value);
            } else if left {
                out.push_str(value);
                out.extend(std::iter::repeat(' ').take(width - len));
            } else {
                out.extend(std::iter::repeat(' ').take(width - len));
                out.push_str(value);
            }
        }
    }
}

fn classify(name: &str) -> Result<FieldKey, FormatError> {
    if let Some(ident) = name.strip_prefix(CAPTURE_MARKER) {
        if is_identifier(ident) {
            Ok(FieldKey::Capture(ident.to_owned()))
        } else {
            Err(FormatError::InvalidCaptureName(ident.to_owned()))
        }
    } else if let Some(builtin) = Builtin::from_public(name) {
        Ok(FieldKey::Builtin(builtin))
    } else {
        Err(FormatError::UnknownField {
            name: name.to_owned(),
            accepted: Builtin::accepted_names(),
        })
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|first| first.is_ascii_alphabetic() || first == '_')
        && chars.all(|ch| ch.is_ascii_alphanumeric() || ch == '_')
}

/// Splits a pattern into literal runs and syntactically recognized fields.
///
/// Classification (capture validity, built-in membership) happens later so
/// the `%`-count check can run against purely syntactic recognition, the same
/// way the validation is layered in the original grammar.
fn scan(pattern: &str) -> Vec<RawSegment> {
    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut remainder = pattern;
    while !remainder.is_empty() {
        if remainder.starts_with("%(") {
            if let Some((field, consumed)) = parse_field(remainder) {
                if !literal.is_empty() {
                    segments.push(RawSegment::Literal(std::mem::take(&mut literal)));
                }
                segments.push(RawSegment::Field(field));
                remainder = &remainder[consumed..];
                continue;
            }
        }
        let Some(ch) = remainder.chars().next() else {
            break;
        };
        literal.push(ch);
        remainder = &remainder[ch.len_utf8()..];
    }
    if !literal.is_empty() {
        segments.push(RawSegment::Literal(literal));
    }
    segments
}

/// Attempts to parse one placeholder at the start of `input` (which begins
/// with `%(`). Returns the field and the number of bytes consumed, or `None`
/// when the text does not form a placeholder.
fn parse_field(input: &str) -> Option<(RawField, usize)> {
    let body = &input[2..];
    let close = body.find(')')?;
    let name = &body[..close];
    let bare = name.strip_prefix(CAPTURE_MARKER).unwrap_or(name);
    if bare.is_empty()
        || !bare
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || ch == '_')
    {
        return None;
    }

    let after_name = &body[close + 1..];
    let mut rest = after_name;
    let mut left = false;
    let mut signed = false;
    if let Some(stripped) = rest.strip_prefix('-') {
        left = true;
        signed = true;
        rest = stripped;
    } else if let Some(stripped) = rest.strip_prefix('+') {
        signed = true;
        rest = stripped;
    }
    let digits_len = rest
        .find(|ch: char| !ch.is_ascii_digit())
        .unwrap_or(rest.len());
    let digits = &rest[..digits_len];
    rest = &rest[digits_len..];
    if signed && digits.is_empty() {
        return None;
    }
    if !rest.starts_with('s') {
        return None;
    }

    let pad = if digits.is_empty() {
        None
    } else {
        Some(Pad {
            left,
            width: digits.parse().ok()?,
        })
    };
    let pad_text_len = after_name.len() - rest.len();
    let pad_text = after_name[..pad_text_len].to_owned();
    // "%(" + name + ")" + pad + "s"
    let consumed = 2 + close + 1 + pad_text_len + 1;
    Some((
        RawField {
            name: name.to_owned(),
            pad,
            pad_text,
        },
        consumed,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::levels::Level;
    use crate::record::{CallSite, Record};

    fn record(message: &str) -> Record {
        Record::new(
            "app",
            Level::Info,
            message.to_owned(),
            CallSite {
                path: "src/main.rs",
                line: 42,
            },
            BTreeMap::new(),
        )
    }

    #[test]
    fn default_pattern_compiles_without_directives_beyond_builtins() {
        let compiled = CompiledFormat::compile(None).expect("default compiles");
        assert_eq!(compiled.pattern(), DEFAULT_PATTERN);
        assert!(compiled.directives().is_empty());
    }

    #[test]
    fn empty_pattern_is_valid_and_undecorated() {
        let compiled = CompiledFormat::compile(Some("")).expect("empty compiles");
        assert_eq!(compiled.pattern(), "");
        assert!(compiled.directives().is_empty());
        assert_eq!(compiled.render(&record("bare message")), "bare message");
    }

    #[test]
    fn whitespace_only_pattern_is_rejected() {
        assert_eq!(
            CompiledFormat::compile(Some("   \t ")),
            Err(FormatError::BlankPattern)
        );
    }

    #[test]
    fn pattern_without_placeholders_is_rejected() {
        assert_eq!(
            CompiledFormat::compile(Some("no placeholders here")),
            Err(FormatError::MalformedEscaping)
        );
    }

    #[test]
    fn stray_percent_is_rejected() {
        assert_eq!(
            CompiledFormat::compile(Some("100% %(message)s")),
            Err(FormatError::MalformedEscaping)
        );
    }

    #[test]
    fn missing_type_marker_is_rejected() {
        assert_eq!(
            CompiledFormat::compile(Some("%(message)")),
            Err(FormatError::MalformedEscaping)
        );
    }

    #[test]
    fn non_identifier_capture_is_rejected() {
        assert_eq!(
            CompiledFormat::compile(Some("%(*1bad)s")),
            Err(FormatError::InvalidCaptureName("1bad".into()))
        );
    }

    #[test]
    fn unknown_bare_field_is_rejected() {
        match CompiledFormat::compile(Some("%(bogus)s")) {
            Err(FormatError::UnknownField { name, accepted }) => {
                assert_eq!(name, "bogus");
                assert!(accepted.contains("asctime"));
                assert!(accepted.contains("funcName"));
            }
            other => panic!("expected UnknownField, got {other:?}"),
        }
    }

    #[test]
    fn internal_names_replace_reserved_builtins() {
        let compiled =
            CompiledFormat::compile(Some("%(module)s %(filename)s %(funcName)s %(message)s"))
                .expect("compiles");
        assert_eq!(compiled.pattern(), "%(mod)s %(fl_name)s %(func)s %(message)s");
        let keys: Vec<_> = compiled.directives().keys().cloned().collect();
        assert_eq!(keys, ["fl_name", "func", "mod"]);
        for default in compiled.directives().values() {
            assert_eq!(default, SENTINEL);
        }
    }

    #[test]
    fn capture_directives_keep_the_marker() {
        let compiled =
            CompiledFormat::compile(Some("%(name)s | %(*foo)-8s | %(*var_1)s")).expect("compiles");
        assert_eq!(compiled.pattern(), "%(name)s | %(*foo)-8s | %(*var_1)s");
        let keys: Vec<_> = compiled.directives().keys().cloned().collect();
        assert_eq!(keys, ["*foo", "*var_1"]);
    }

    #[test]
    fn underscore_leading_capture_is_accepted() {
        let compiled = CompiledFormat::compile(Some("%(*_foo)10s")).expect("compiles");
        assert!(compiled.directives().contains_key("*_foo"));
    }

    #[test]
    fn render_substitutes_builtin_fields() {
        let compiled = CompiledFormat::compile(Some("%(name)s | %(levelname)s | %(message)s"))
            .expect("compiles");
        assert_eq!(compiled.render(&record("hello")), "app | INFO | hello");
    }

    #[test]
    fn render_pads_left_and_right() {
        let compiled =
            CompiledFormat::compile(Some("[%(levelname)-8s][%(levelname)8s]")).expect("compiles");
        assert_eq!(compiled.render(&record("x")), "[INFO    ][    INFO]");
    }

    #[test]
    fn render_does_not_truncate_overlong_values() {
        let compiled = CompiledFormat::compile(Some("%(levelname)2s")).expect("compiles");
        assert_eq!(compiled.render(&record("x")), "INFO");
    }

    #[test]
    fn plus_sign_width_right_aligns() {
        let compiled = CompiledFormat::compile(Some("%(levelname)+6s")).expect("compiles");
        assert_eq!(compiled.render(&record("x")), "  INFO");
    }

    #[test]
    fn sign_without_digits_is_rejected() {
        assert_eq!(
            CompiledFormat::compile(Some("%(levelname)-s")),
            Err(FormatError::MalformedEscaping)
        );
    }

    #[test]
    fn render_uses_sentinel_for_unresolved_directives() {
        let compiled =
            CompiledFormat::compile(Some("%(*missing)s %(module)s %(funcName)s")).expect("compiles");
        assert_eq!(compiled.render(&record("x")), "----- ----- -----");
    }

    #[test]
    fn render_reads_resolved_extra_values() {
        let compiled = CompiledFormat::compile(Some("%(*foo)s | %(mod_dummy_not)s"));
        assert!(compiled.is_err());

        let compiled = CompiledFormat::compile(Some("%(*foo)s | %(module)s")).expect("compiles");
        let mut rec = record("x");
        rec.extra.insert("*foo".to_owned(), "resolved".to_owned());
        rec.extra.insert("mod".to_owned(), "main".to_owned());
        assert_eq!(compiled.render(&rec), "resolved | main");
    }

    #[test]
    fn render_keeps_lineno_and_pathname() {
        let compiled =
            CompiledFormat::compile(Some("%(pathname)s:%(lineno)s %(levelno)s")).expect("compiles");
        assert_eq!(compiled.render(&record("x")), "src/main.rs:42 20");
    }

    #[test]
    fn asctime_uses_comma_millisecond_form() {
        let compiled = CompiledFormat::compile(Some("%(asctime)s")).expect("compiles");
        let rendered = compiled.render(&record("x"));
        // YYYY-MM-DD HH:MM:SS,mmm
        assert_eq!(rendered.len(), 23);
        assert_eq!(&rendered[19..20], ",");
    }

    #[test]
    fn compiling_is_deterministic() {
        let first = CompiledFormat::compile(Some("%(name)s %(*a)s")).expect("compiles");
        let second = CompiledFormat::compile(Some("%(name)s %(*a)s")).expect("compiles");
        assert_eq!(first.pattern(), second.pattern());
        assert_eq!(first.directives(), second.directives());
    }

    #[test]
    fn default_impl_matches_compile_none() {
        let via_default = CompiledFormat::default();
        let via_none = CompiledFormat::compile(None).expect("compiles");
        assert_eq!(via_default.pattern(), via_none.pattern());
    }
}
