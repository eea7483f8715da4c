//! `siv check` — Validate declarations and resolve every call site.

use crate::commands::files::collect_siv_files;
use crate::output::StyledOutput;
use siv_checker::diagnostic::create_files;
use siv_checker::{analyze, Diagnostic, SyntaxErrors};
use termcolor::{ColorChoice, StandardStream};

pub fn execute(paths: Vec<String>, choice: ColorChoice) -> anyhow::Result<()> {
    let files = collect_siv_files(&paths)?;
    if files.is_empty() {
        anyhow::bail!("no .siv files found in {:?}", paths);
    }

    let mut out = StyledOutput::new(choice);
    let mut stderr = StandardStream::stderr(choice);
    let mut total_errors = 0usize;
    let mut total_calls = 0usize;

    for path in &files {
        let display = path.display().to_string();
        let source = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read {}: {}", display, e))?;
        let sources = create_files(display.clone(), source.clone());

        let diagnostics = match analyze(&source) {
            Ok(analysis) => {
                total_calls += analysis.result.resolutions.len();
                analysis
                    .result
                    .errors
                    .iter()
                    .map(|e| Diagnostic::from_check_error(e, 0))
                    .collect::<Vec<_>>()
            }
            Err(SyntaxErrors::Lex(errors)) => errors
                .iter()
                .map(|e| Diagnostic::from_lex_error(e, 0))
                .collect(),
            Err(SyntaxErrors::Parse(errors)) => errors
                .iter()
                .map(|e| Diagnostic::from_parse_error(e, 0))
                .collect(),
        };

        for diag in &diagnostics {
            diag.emit(&mut stderr, &sources)?;
        }
        total_errors += diagnostics.len();
    }

    if total_errors == 0 {
        out.success("ok");
        out.plain(&format!(
            ": {} file(s), {} call site(s) resolved\n",
            files.len(),
            total_calls
        ));
        out.flush();
        Ok(())
    } else {
        out.error("error");
        out.plain(&format!(": {} problem(s) found\n", total_errors));
        out.flush();
        std::process::exit(1);
    }
}
