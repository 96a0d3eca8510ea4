use gec_eval_rs::config::{Coarsening, DetectionMode, SelectionPolicy};
use gec_eval_rs::{evaluation_report, EvalConfig, EvalError, EvaluatorBuilder, Report};

const SOURCES: [&str; 5] = [
    "冬阴功是泰国最著名的菜之一，它虽然不是很豪华，但它的味确实让人上瘾，做也不难、不复。",
    "首先，我们得准备：大虾六到九只、盐一茶匙、已搾好的柠檬汁三汤匙、泰国柠檬叶三叶、柠檬香草一根、鱼酱两汤匙、辣椒6粒，纯净水4量杯、香菜半量杯和草菇10个。",
    "这样，你就会尝到泰国人死爱的味道。",
    "另外，冬阴功对外国人的喜爱不断地增加。",
    "这部电影不仅是国内，在国外也很有名。",
];

const REFERENCES: [&[&str]; 5] = [
    &["冬阴功是泰国最著名的菜之一，虽然它不是很豪华，但它的味确实让人上瘾，做法也不难、不复杂。"],
    &["首先，我们得准备:大虾六到九只、盐一茶匙、已榨好的柠檬汁三汤匙、泰国柠檬叶三叶、柠檬香草一根、鱼酱两汤匙、辣椒六粒，纯净水四量杯、香菜半量杯和草菇十个。"],
    &["这样，你就会尝到泰国人爱死的味道。"],
    &["另外，外国人对冬阴功的喜爱不断地增加。"],
    &[
        "这部电影不仅是在国内，在国外也很有名。",
        "这部电影不仅在国内，在国外也很有名。",
    ],
];

const HYPOTHESES: [&str; 5] = [
    "冬阴功是泰国最著名的菜之一，它虽然不是很豪华，但它味道确实让人上瘾，做法也不难、不复杂。",
    "首先，我们得准备：大虾六到九只、盐一茶匙、已搾好的柠檬汁三汤匙、泰国柠檬叶三叶、柠檬香草一根、鱼酱两汤匙、辣椒6粒，纯净水4量杯、香菜半量杯和草菇10个。",
    "这样，你就会尝到泰国人死爱的味道。",
    "另外，冬阴功对外国人的喜爱也不断地增加。",
    "这部电影不仅是在国内，在国外也很有名。",
];

fn strings(texts: &[&str]) -> Vec<String> {
    texts.iter().map(|s| s.to_string()).collect()
}

fn counts(report: &Report) -> (u64, u64, u64) {
    let overall = report.overall().expect("overall row");
    (
        overall.true_positive,
        overall.false_positive,
        overall.false_negative,
    )
}

fn evaluate_one(source: &str, references: &[&str], hypothesis: &str, config: EvalConfig) -> Report {
    evaluation_report(
        &strings(&[source]),
        &[strings(references)],
        &strings(&[hypothesis]),
        config,
    )
    .expect("evaluation succeeds")
}

#[test]
fn unchanged_hypothesis_misses_the_reference_deletion() {
    let report = evaluate_one(
        "冬阴功也是泰国最著名的菜之一",
        &["冬阴功是泰国最著名的菜之一"],
        "冬阴功也是泰国最著名的菜之一",
        EvalConfig::default(),
    );
    assert_eq!(counts(&report), (0, 0, 1));
    assert_eq!(report.overall().unwrap().f(0.5), Some(0.0));
}

#[test]
fn hypothesis_equal_to_reference_scores_one_for_every_beta() {
    let mut config = EvalConfig::default();
    config.compare.betas = vec![0.5, 1.0, 2.0];
    let report = evaluate_one(SOURCES[1], REFERENCES[1], REFERENCES[1][0], config);
    let overall = report.overall().unwrap();
    assert_eq!(counts(&report), (5, 0, 0));
    assert_eq!(overall.precision, 1.0);
    assert_eq!(overall.recall, 1.0);
    for beta in [0.5, 1.0, 2.0] {
        assert_eq!(overall.f(beta), Some(1.0));
    }
}

#[test]
fn selection_prefers_the_exactly_matched_reference() {
    let report = evaluate_one(
        "你好吗我很好",
        &["你好吗，我很好。", "你好吗？我很好。"],
        "你好吗？我很好。",
        EvalConfig::default(),
    );
    assert_eq!(counts(&report), (2, 0, 0));
    assert_eq!(report.overall().unwrap().f(0.5), Some(1.0));
}

#[test]
fn word_order_reference_counts_as_a_single_miss() {
    let mut config = EvalConfig::default();
    config.compare.categories = true;
    let report = evaluate_one(SOURCES[2], REFERENCES[2], HYPOTHESES[2], config);
    assert_eq!(counts(&report), (0, 0, 1));
    assert_eq!(report.category("W").unwrap().false_negative, 1);
}

#[test]
fn untouched_sentence_leaves_every_reference_edit_missed() {
    let report = evaluate_one(SOURCES[1], REFERENCES[1], HYPOTHESES[1], EvalConfig::default());
    assert_eq!(counts(&report), (0, 0, 5));
}

#[test]
fn second_reference_is_ignored_when_first_matches() {
    let report = evaluate_one(SOURCES[4], REFERENCES[4], HYPOTHESES[4], EvalConfig::default());
    assert_eq!(counts(&report), (1, 0, 0));
}

#[test]
fn readme_corpus_report() {
    let mut config = EvalConfig::default();
    config.compare.betas = vec![0.5, 1.0];
    config.compare.categories = true;
    let references: Vec<Vec<String>> = REFERENCES.iter().map(|r| strings(r)).collect();
    let report =
        evaluation_report(&strings(&SOURCES), &references, &strings(&HYPOTHESES), config)
            .expect("evaluation succeeds");

    assert_eq!(report.sentence_count, 5);
    assert!(report.skipped.is_empty());
    // Per sentence: (2, 1, 1), (0, 0, 5), (0, 0, 1), (0, 1, 1), (1, 0, 0).
    assert_eq!(counts(&report), (3, 2, 8));
    let overall = report.overall().unwrap();
    assert!((overall.precision - 0.6).abs() < 1e-9);
    assert!((overall.recall - 3.0 / 11.0).abs() < 1e-9);
    let f05 = overall.f(0.5).unwrap();
    let f1 = overall.f(1.0).unwrap();
    assert!(f05 > f1 && f1 > 0.0 && f05 < 1.0);

    // Category rows partition the overall counts.
    let category_tp: u64 = report
        .metrics
        .iter()
        .filter(|(name, _)| name.as_str() != "overall")
        .map(|(_, row)| row.true_positive)
        .sum();
    assert_eq!(category_tp, overall.true_positive);

    let json = serde_json::to_value(&report).unwrap();
    assert!(json["metrics"]["overall"]["f0.5"].is_number());
    assert!(json["metrics"]["overall"]["f1"].is_number());
}

#[test]
fn m2_round_trip_through_the_evaluator() {
    let evaluator = EvaluatorBuilder::new(EvalConfig::default()).build().unwrap();
    let references: Vec<Vec<String>> = REFERENCES.iter().map(|r| strings(r)).collect();
    let hypotheses: Vec<Vec<String>> = HYPOTHESES.iter().map(|h| vec![h.to_string()]).collect();
    let reference_m2 = evaluator
        .convert_multi_to_m2(&strings(&SOURCES), &references)
        .unwrap();
    let hypothesis_m2 = evaluator
        .convert_multi_to_m2(&strings(&SOURCES), &hypotheses)
        .unwrap();

    assert!(hypothesis_m2[2].ends_with("A -1 -1|||noop|||-NONE-|||REQUIRED|||-NONE-|||0"));
    assert!(reference_m2[4].lines().any(|l| l.ends_with("|||1")));

    let from_m2 = evaluator.evaluate_m2(&hypothesis_m2, &reference_m2).unwrap();
    let direct = evaluator
        .evaluate(&strings(&SOURCES), &references, &strings(&HYPOTHESES))
        .unwrap();
    assert_eq!(from_m2, direct);
}

#[test]
fn span_detection_ignores_the_correction_text() {
    let source = "他是学生";
    let mut config = EvalConfig::default();
    let strict = evaluate_one(source, &["他是老师"], "他是老板", config.clone());
    assert_eq!(counts(&strict), (0, 1, 1));

    config.compare.detection = DetectionMode::Span;
    let lenient = evaluate_one(source, &["他是老师"], "他是老板", config);
    assert_eq!(counts(&lenient), (1, 0, 0));
}

#[test]
fn coarsened_categories_share_a_row() {
    let mut config = EvalConfig::default();
    config.compare.categories = true;
    config.compare.coarsening = Coarsening::Operation;
    let report = evaluate_one("我爱你", &["我很爱你。"], "我很爱你。", config);
    assert_eq!(report.category("M").unwrap().true_positive, 2);
}

#[test]
fn cumulative_selection_scores_the_corpus() {
    let mut config = EvalConfig::default();
    config.compare.selection = SelectionPolicy::Cumulative;
    let references: Vec<Vec<String>> = REFERENCES.iter().map(|r| strings(r)).collect();
    let report =
        evaluation_report(&strings(&SOURCES), &references, &strings(&HYPOTHESES), config)
            .unwrap();
    assert_eq!(report.sentence_count, 5);
    assert!(report.overall().unwrap().true_positive >= 3);
}

#[test]
fn mismatched_streams_fail_fast() {
    let result = evaluation_report(
        &strings(&SOURCES),
        &[strings(REFERENCES[0])],
        &strings(&HYPOTHESES),
        EvalConfig::default(),
    );
    assert!(matches!(result, Err(EvalError::Validation { .. })));
}
