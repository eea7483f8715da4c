//! `siv resolve` — Explain overload resolution for every call site.

use crate::output::StyledOutput;
use siv_checker::diagnostic::create_files;
use siv_checker::resolve::CallOutcome;
use siv_checker::{analyze, Diagnostic, SyntaxErrors, Verdict};
use termcolor::{ColorChoice, StandardStream};

pub fn execute(file: String, json: bool, choice: ColorChoice) -> anyhow::Result<()> {
    let source = std::fs::read_to_string(&file)
        .map_err(|e| anyhow::anyhow!("failed to read {}: {}", file, e))?;
    let sources = create_files(file.clone(), source.clone());
    let mut stderr = StandardStream::stderr(choice);

    let analysis = match analyze(&source) {
        Ok(analysis) => analysis,
        Err(syntax) => {
            let diagnostics: Vec<Diagnostic> = match &syntax {
                SyntaxErrors::Lex(errors) => errors
                    .iter()
                    .map(|e| Diagnostic::from_lex_error(e, 0))
                    .collect(),
                SyntaxErrors::Parse(errors) => errors
                    .iter()
                    .map(|e| Diagnostic::from_parse_error(e, 0))
                    .collect(),
            };
            for diag in &diagnostics {
                diag.emit(&mut stderr, &sources)?;
            }
            std::process::exit(1);
        }
    };

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&analysis.result.resolutions)?
        );
    } else {
        let mut out = StyledOutput::new(choice);
        for resolution in &analysis.result.resolutions {
            out.bold(&format!(
                "{} at {}:{}:{}\n",
                resolution.callee, file, resolution.line, resolution.column
            ));
            for (i, arg) in resolution.arguments.iter().enumerate() {
                out.plain(&format!("  arg {}: {} ({})\n", i, arg.ty, arg.constness));
            }
            for candidate in &resolution.candidates {
                match candidate.verdict {
                    Verdict::Viable => out.success("  viable    "),
                    Verdict::Discarded => out.warning("  discarded "),
                }
                out.plain(&candidate.signature);
                if let Some(detail) = &candidate.detail {
                    out.info(&format!("  [{}]", detail));
                }
                out.newline();
            }
            match resolution.outcome {
                CallOutcome::Selected => {
                    out.plain("  selected: ");
                    if let Some(selected) = &resolution.selected {
                        out.success(selected);
                    }
                    out.newline();
                }
                CallOutcome::Denied => {
                    out.error("  denied");
                    if let Some(selected) = &resolution.selected {
                        out.plain(&format!(": {}", selected));
                    }
                    out.newline();
                }
                CallOutcome::NoViableOverload => {
                    out.error("  no viable overload\n");
                }
                CallOutcome::Ambiguous => {
                    out.error("  ambiguous\n");
                }
            }
            out.newline();
        }
        out.flush();
    }

    // Diagnostics go to stderr in both modes so --json output stays parseable.
    for error in &analysis.result.errors {
        Diagnostic::from_check_error(error, 0).emit(&mut stderr, &sources)?;
    }
    if !analysis.result.is_ok() {
        std::process::exit(1);
    }
    Ok(())
}
