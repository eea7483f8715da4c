//! Diagnostic infrastructure for error reporting
//!
//! Structured error reporting with source code context over
//! codespan-reporting. Declaration-time errors carry E1xxx codes, call-site
//! errors E2xxx, syntax errors E0xxx.

use codespan_reporting::diagnostic::{Diagnostic as CsDiagnostic, Label, Severity};
use codespan_reporting::files::{Files, SimpleFiles};
use codespan_reporting::term;
use codespan_reporting::term::termcolor::WriteColor;
use serde::{Deserialize, Serialize};
use siv_parser::{LexError, ParseError, Span};

use crate::error::CheckError;

/// Error code for a diagnostic
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorCode(pub &'static str);

impl ErrorCode {
    /// The code as text.
    pub fn as_str(&self) -> &str {
        self.0
    }
}

/// A diagnostic message with source code context
pub struct Diagnostic {
    /// The underlying codespan diagnostic
    inner: CsDiagnostic<usize>,
    /// Error code (e.g., "E2001")
    code: Option<ErrorCode>,
}

impl Diagnostic {
    /// Create a new diagnostic
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Diagnostic {
            inner: CsDiagnostic::new(severity).with_message(message),
            code: None,
        }
    }

    /// Create an error diagnostic
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }

    /// Create a warning diagnostic
    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message)
    }

    /// Set the error code
    pub fn with_code(mut self, code: ErrorCode) -> Self {
        self.code = Some(code.clone());
        self.inner = self.inner.with_code(code.0);
        self
    }

    /// Add a primary label (main error location)
    pub fn with_primary_label(
        mut self,
        file_id: usize,
        span: Span,
        message: impl Into<String>,
    ) -> Self {
        let label = Label::primary(file_id, span.start as usize..span.end as usize)
            .with_message(message);
        self.inner.labels.push(label);
        self
    }

    /// Add a secondary label (related location)
    pub fn with_secondary_label(
        mut self,
        file_id: usize,
        span: Span,
        message: impl Into<String>,
    ) -> Self {
        let label = Label::secondary(file_id, span.start as usize..span.end as usize)
            .with_message(message);
        self.inner.labels.push(label);
        self
    }

    /// Add a note (additional context)
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.inner.notes.push(note.into());
        self
    }

    /// Add a help suggestion
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.inner.notes.push(format!("help: {}", help.into()));
        self
    }

    /// Create diagnostic from a CheckError
    pub fn from_check_error(error: &CheckError, file_id: usize) -> Self {
        use CheckError::*;

        match error {
            UnknownConstraintIdentifier { name, span } => {
                Diagnostic::error(format!("Cannot find `{}` in this constraint", name))
                    .with_code(error_code(error))
                    .with_primary_label(file_id, *span, "not a parameter or a const")
                    .with_note("a constraint may reference the function's own parameters and previously declared consts")
            }

            NonBooleanConstraint { found, span } => {
                Diagnostic::error(format!("Constraint must be `bool`, this one is `{}`", found))
                    .with_code(error_code(error))
                    .with_primary_label(file_id, *span, format!("has type `{}`", found))
            }

            CallInConstraint { span } => {
                Diagnostic::error("Calls are not allowed inside constraints")
                    .with_code(error_code(error))
                    .with_primary_label(file_id, *span, "call in constraint")
            }

            Redeclaration { name, span, previous } => {
                Diagnostic::error(format!("`{}` is already declared", name))
                    .with_code(error_code(error))
                    .with_primary_label(file_id, *span, "redeclared here")
                    .with_secondary_label(file_id, *previous, "first declaration here")
            }

            NonConstantInit { name, span } => {
                Diagnostic::error(format!(
                    "Initializer of `const {}` is not a constant expression",
                    name
                ))
                .with_code(error_code(error))
                .with_primary_label(file_id, *span, "not constant")
            }

            ConstEval { message, span } => {
                Diagnostic::error(format!("Constant evaluation failed: {}", message))
                    .with_code(error_code(error))
                    .with_primary_label(file_id, *span, "fails to evaluate")
            }

            InvalidOperands { op, lhs, rhs, span } => {
                Diagnostic::error(format!(
                    "Operator `{}` cannot be applied to `{}` and `{}`",
                    op, lhs, rhs
                ))
                .with_code(error_code(error))
                .with_primary_label(file_id, *span, "invalid operation")
            }

            InvalidOperand { op, operand, span } => {
                Diagnostic::error(format!(
                    "Operator `{}` cannot be applied to `{}`",
                    op, operand
                ))
                .with_code(error_code(error))
                .with_primary_label(file_id, *span, "invalid operation")
            }

            UnknownIdentifier { name, span } => {
                Diagnostic::error(format!("Cannot find name `{}`", name))
                    .with_code(error_code(error))
                    .with_primary_label(file_id, *span, "not found in this scope")
            }

            UnknownFunction { name, span } => {
                Diagnostic::error(format!("Cannot find function `{}`", name))
                    .with_code(error_code(error))
                    .with_primary_label(file_id, *span, "no prototype with this name")
            }

            NoViableOverload { name, span, notes } => {
                let mut diag =
                    Diagnostic::error(format!("No viable overload of `{}` for this call", name))
                        .with_code(error_code(error))
                        .with_primary_label(file_id, *span, "no candidate survives");
                for note in notes {
                    diag = diag.with_note(note);
                }
                diag
            }

            AmbiguousCall { name, span, candidates } => {
                let mut diag = Diagnostic::error(format!("Call to `{}` is ambiguous", name))
                    .with_code(error_code(error))
                    .with_primary_label(file_id, *span, "more than one best candidate");
                for candidate in candidates {
                    diag = diag.with_note(format!("candidate: {}", candidate));
                }
                diag
            }

            DeniedCandidate { name, span, decl_span, message } => {
                let mut diag =
                    Diagnostic::error(format!("Call selects a denied overload of `{}`", name))
                        .with_code(error_code(error))
                        .with_primary_label(file_id, *span, "resolves to a `deny` prototype")
                        .with_secondary_label(file_id, *decl_span, "denied overload declared here");
                if let Some(text) = message {
                    diag = diag.with_note(text);
                }
                diag
            }

            TypeMismatch { expected, actual, span } => {
                Diagnostic::error(format!(
                    "Type `{}` is not assignable to `{}`",
                    actual, expected
                ))
                .with_code(error_code(error))
                .with_primary_label(
                    file_id,
                    *span,
                    format!("expected `{}`, found `{}`", expected, actual),
                )
            }
        }
    }

    /// Create diagnostic from a ParseError
    pub fn from_parse_error(error: &ParseError, file_id: usize) -> Self {
        Diagnostic::error(error.message.clone())
            .with_code(ErrorCode("E0002"))
            .with_primary_label(file_id, error.span, "syntax error")
    }

    /// Create diagnostic from a LexError
    pub fn from_lex_error(error: &LexError, file_id: usize) -> Self {
        Diagnostic::error(error.to_string())
            .with_code(ErrorCode("E0001"))
            .with_primary_label(file_id, error.span(), "unrecognized input")
    }

    /// Emit the diagnostic to the given stream
    pub fn emit(
        &self,
        writer: &mut dyn WriteColor,
        files: &SimpleFiles<String, String>,
    ) -> Result<(), codespan_reporting::files::Error> {
        let config = term::Config::default();
        term::emit(writer, &config, files, &self.inner)
    }

    /// Get the underlying codespan diagnostic (for testing/custom rendering)
    pub fn inner(&self) -> &CsDiagnostic<usize> {
        &self.inner
    }

    /// Convert to JSON representation for tooling integration
    pub fn to_json(&self, files: &SimpleFiles<String, String>) -> Result<String, serde_json::Error> {
        let json_diag = JsonDiagnostic::from_diagnostic(self, files);
        serde_json::to_string_pretty(&json_diag)
    }
}

/// JSON representation of a diagnostic
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonDiagnostic {
    /// Error code (e.g., "E2001")
    pub code: Option<String>,
    /// Severity level
    pub severity: String,
    /// Main error message
    pub message: String,
    /// Source locations with labels
    pub labels: Vec<JsonLabel>,
    /// Additional notes and help
    pub notes: Vec<String>,
}

/// JSON representation of a diagnostic label
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonLabel {
    /// File path
    pub file: String,
    /// Start line (1-indexed)
    pub start_line: usize,
    /// Start column (1-indexed)
    pub start_column: usize,
    /// Label message
    pub message: Option<String>,
    /// Label style (primary or secondary)
    pub style: String,
}

impl JsonDiagnostic {
    /// Convert a Diagnostic to JSON representation
    pub fn from_diagnostic(diag: &Diagnostic, files: &SimpleFiles<String, String>) -> Self {
        let severity = match diag.inner.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Note => "note",
            Severity::Help => "help",
            Severity::Bug => "bug",
        };

        let labels = diag
            .inner
            .labels
            .iter()
            .filter_map(|label| {
                let file_id = label.file_id;
                let file_name = files.get(file_id).ok()?.name().to_string();
                let location = files.get(file_id).ok()?.location((), label.range.start).ok()?;

                Some(JsonLabel {
                    file: file_name,
                    start_line: location.line_number,
                    start_column: location.column_number,
                    message: Some(label.message.clone()),
                    style: match label.style {
                        codespan_reporting::diagnostic::LabelStyle::Primary => "primary",
                        codespan_reporting::diagnostic::LabelStyle::Secondary => "secondary",
                    }
                    .to_string(),
                })
            })
            .collect();

        JsonDiagnostic {
            code: diag.code.as_ref().map(|c| c.0.to_string()),
            severity: severity.to_string(),
            message: diag.inner.message.clone(),
            labels,
            notes: diag.inner.notes.clone(),
        }
    }
}

/// Get error code for a CheckError
pub fn error_code(error: &CheckError) -> ErrorCode {
    use CheckError::*;

    match error {
        UnknownConstraintIdentifier { .. } => ErrorCode("E1001"),
        NonBooleanConstraint { .. } => ErrorCode("E1002"),
        CallInConstraint { .. } => ErrorCode("E1003"),
        Redeclaration { .. } => ErrorCode("E1004"),
        NonConstantInit { .. } => ErrorCode("E1005"),
        ConstEval { .. } => ErrorCode("E1006"),
        InvalidOperands { .. } => ErrorCode("E1007"),
        InvalidOperand { .. } => ErrorCode("E1008"),
        UnknownIdentifier { .. } => ErrorCode("E2001"),
        UnknownFunction { .. } => ErrorCode("E2002"),
        NoViableOverload { .. } => ErrorCode("E2003"),
        AmbiguousCall { .. } => ErrorCode("E2004"),
        DeniedCandidate { .. } => ErrorCode("E2005"),
        TypeMismatch { .. } => ErrorCode("E2006"),
    }
}

/// Helper to create a SimpleFiles instance from source code
pub fn create_files(path: impl Into<String>, source: impl Into<String>) -> SimpleFiles<String, String> {
    let mut files = SimpleFiles::new();
    files.add(path.into(), source.into());
    files
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(start: u32, end: u32) -> Span {
        Span::new(start as usize, end as usize, 1, start + 1)
    }

    #[test]
    fn check_errors_get_stable_codes() {
        let err = CheckError::DeniedCandidate {
            name: "isdigit".into(),
            span: span(0, 7),
            decl_span: span(10, 17),
            message: Some("out of range".into()),
        };
        assert_eq!(error_code(&err).as_str(), "E2005");

        let diag = Diagnostic::from_check_error(&err, 0);
        assert_eq!(diag.inner().code.as_deref(), Some("E2005"));
        assert_eq!(diag.inner().labels.len(), 2);
        assert!(diag.inner().notes.iter().any(|n| n == "out of range"));
    }

    #[test]
    fn json_rendering_carries_locations() {
        let files = create_files("demo.siv", "pow(1.0, n);");
        let err = CheckError::UnknownFunction {
            name: "pow".into(),
            span: span(0, 3),
        };
        let diag = Diagnostic::from_check_error(&err, 0);
        let json = diag.to_json(&files).expect("json failed");
        assert!(json.contains("\"E2002\""));
        assert!(json.contains("demo.siv"));
    }
}
