//! CLI driver for the proof checker.
//!
//! Reads three debug text streams (whitespace/newline-separated decimal
//! words, first word a redundant length prefix — the real byte-stream
//! producer is out of scope, see SPEC_FULL.md §1) and drives [`verify`].

use std::fs;
use std::process::ExitCode;

use matching_logic_checker::decoder::Word;
use matching_logic_checker::error::StreamParseError;
use matching_logic_checker::verifier::{verify_with_config, VerifierConfig, DEFAULT_MAX_WORDS};
use matching_logic_checker::VerifyOutcome;

fn parse_flag(args: &[String], key: &str) -> Option<String> {
    let mut it = args.iter();
    while let Some(a) = it.next() {
        if a == key {
            return it.next().cloned();
        }
    }
    None
}

/// Parse a debug text stream: every whitespace-separated token on every line
/// must be a valid `i64`.
fn parse_stream(path: &str) -> Result<Vec<Word>, StreamParseError> {
    let text = fs::read_to_string(path)?;
    let mut words = Vec::new();
    for (line_no, line) in text.lines().enumerate() {
        for token in line.split_whitespace() {
            let word = token
                .parse::<Word>()
                .map_err(|_| StreamParseError::NotAnInteger {
                    token: token.to_string(),
                    line: line_no + 1,
                })?;
            words.push(word);
        }
    }
    Ok(words)
}

fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = std::env::args().collect();

    let gamma_path = parse_flag(&args, "--gamma").unwrap_or_else(|| "gamma.txt".to_string());
    let claim_path = parse_flag(&args, "--claim").unwrap_or_else(|| "claim.txt".to_string());
    let proof_path = parse_flag(&args, "--proof").unwrap_or_else(|| "proof.txt".to_string());
    let max_words: Option<usize> = match parse_flag(&args, "--max-words") {
        Some(v) => Some(
            v.parse()
                .map_err(|_| anyhow::anyhow!("--max-words must be a non-negative integer"))?,
        ),
        None => Some(DEFAULT_MAX_WORDS),
    };
    let json = args.iter().any(|a| a == "--json");

    eprintln!("Reading streams: gamma={gamma_path}, claim={claim_path}, proof={proof_path}");

    let gamma =
        parse_stream(&gamma_path).map_err(|e| anyhow::anyhow!("parsing {gamma_path}: {e}"))?;
    let claim =
        parse_stream(&claim_path).map_err(|e| anyhow::anyhow!("parsing {claim_path}: {e}"))?;
    let proof =
        parse_stream(&proof_path).map_err(|e| anyhow::anyhow!("parsing {proof_path}: {e}"))?;

    let config = VerifierConfig { max_words };
    let outcome = verify_with_config(&gamma, &claim, &proof, &config);

    if json {
        let report = match &outcome {
            Ok(o) => serde_json::json!({ "outcome": o }),
            Err(e) => serde_json::json!({ "error": e.to_string() }),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    }

    match outcome {
        Ok(VerifyOutcome::AllClaimsProved) => {
            if !json {
                println!("Verifier result: ok (all claims proved)");
            }
            Ok(ExitCode::SUCCESS)
        }
        Ok(VerifyOutcome::ClaimsRemaining(n)) => {
            if !json {
                println!("Verifier result: rejected ({n} claim(s) left unproved)");
            }
            Ok(ExitCode::FAILURE)
        }
        Err(e) => {
            if !json {
                eprintln!("Verifier result: rejected (fatal error: {e})");
            }
            Ok(ExitCode::FAILURE)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn parses_a_well_formed_stream() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "3").unwrap();
        writeln!(file, "4 0 30").unwrap();
        file.flush().unwrap();

        let words = parse_stream(file.path().to_str().unwrap()).unwrap();
        assert_eq!(words, vec![3, 4, 0, 30]);
    }

    #[test]
    fn rejects_a_non_integer_token() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "3").unwrap();
        writeln!(file, "4 nope 30").unwrap();
        file.flush().unwrap();

        let err = parse_stream(file.path().to_str().unwrap()).unwrap_err();
        assert!(matches!(
            err,
            StreamParseError::NotAnInteger { line: 2, .. }
        ));
    }

    #[test]
    fn budget_guard_rejects_oversized_streams() {
        use matching_logic_checker::error::VerifierError;

        let words = vec![1, 2, 3];
        let small = VerifierConfig { max_words: Some(2) };
        let exact = VerifierConfig { max_words: Some(3) };
        let unbounded = VerifierConfig { max_words: None };

        let err = verify_with_config(&words, &[], &[], &small).unwrap_err();
        assert!(matches!(err, VerifierError::StreamTooLong { max: 2 }));
        assert!(verify_with_config(&words, &[], &[], &exact).is_ok());
        assert!(verify_with_config(&words, &[], &[], &unbounded).is_ok());
    }
}
