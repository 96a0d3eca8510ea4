use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use libtest_mimic::{Arguments, Failed, Trial};
use serde::Deserialize;
use gec_eval_rs::{EvalConfig, EvaluatorBuilder};

const SUITE_NAME: &str = "m2_reference_counts_match";

#[derive(Debug, Deserialize)]
struct ReferenceCase {
    id: String,
    hypothesis: String,
    reference: String,
    expected: ExpectedCounts,
}

#[derive(Debug, Deserialize)]
struct ExpectedCounts {
    true_positive: u64,
    false_positive: u64,
    false_negative: u64,
}

fn main() {
    let args = Arguments::from_args();
    let repo_root = PathBuf::from(env!("CARGO_MANIFEST_DIR"));

    let cases = match load_cases(&repo_root.join("test-data/m2_cases.json")) {
        Ok(cases) => cases,
        Err(err) => {
            run_setup_failure(&args, err);
            return;
        }
    };
    if cases.is_empty() {
        run_setup_failure(&args, "No cases found in test-data/m2_cases.json.".to_string());
        return;
    }

    let tests = cases
        .into_iter()
        .map(|case| {
            Trial::test(format!("{SUITE_NAME}::{}", case.id), move || {
                run_case(&case).map_err(Failed::from)
            })
        })
        .collect();

    libtest_mimic::run(&args, tests).exit();
}

fn run_setup_failure(args: &Arguments, message: String) {
    let test = Trial::test(format!("{SUITE_NAME}::setup"), move || {
        Err(Failed::from(message))
    });
    libtest_mimic::run(args, vec![test]).exit();
}

fn run_case(case: &ReferenceCase) -> Result<(), String> {
    let evaluator = EvaluatorBuilder::new(EvalConfig::default())
        .build()
        .map_err(|err| format!("{}: failed to build evaluator: {err}", case.id))?;
    let report = evaluator
        .evaluate_m2(&[case.hypothesis.clone()], &[case.reference.clone()])
        .map_err(|err| format!("{}: evaluate_m2() failed: {err}", case.id))?;

    if let Some(skipped) = report.skipped.first() {
        return Err(format!(
            "{}: record skipped ({:?}): {}",
            case.id, skipped.side, skipped.message
        ));
    }
    let overall = report
        .overall()
        .ok_or_else(|| format!("{}: report has no overall row", case.id))?;
    let observed = (
        overall.true_positive,
        overall.false_positive,
        overall.false_negative,
    );
    let expected = (
        case.expected.true_positive,
        case.expected.false_positive,
        case.expected.false_negative,
    );
    if observed != expected {
        return Err(format!(
            "{}: (tp, fp, fn) mismatch (expected {expected:?}, got {observed:?})",
            case.id
        ));
    }
    Ok(())
}

fn load_cases(path: &Path) -> Result<Vec<ReferenceCase>, String> {
    if !path.exists() {
        return Err(format!(
            "Missing M2 fixture JSON at '{}'.",
            path.display()
        ));
    }
    let file = File::open(path)
        .map_err(|err| format!("Failed to open fixture '{}': {err}", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .map_err(|err| format!("Failed to parse fixture '{}': {err}", path.display()))
}
