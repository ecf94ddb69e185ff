//! Translation failures in the middle of a document.

mod common;

use common::{tagged_memory, to_strings, workflow};
use discograph::{load_artifact, GraphConfig, Memory, OracleError, ScriptedOracle};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tempfile::tempdir;

fn failing_unit_two() -> ScriptedOracle {
    ScriptedOracle::new()
        .with_translator(|source| {
            if source == "U2." {
                Err(OracleError::InvocationFailed("generation refused".into()))
            } else {
                Ok(source.to_lowercase())
            }
        })
        .with_extractor(|source, target| Ok(tagged_memory(source, target)))
        .with_edges(|earlier, later| Ok(earlier == "U1." && later == "U3."))
}

#[tokio::test]
async fn failed_unit_is_omitted_and_successors_use_real_predecessors() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("doc.json");
    let sentences = to_strings(&["U0.", "U1.", "U2.", "U3.", "U4."]);

    let oracle = Arc::new(failing_unit_two());
    let wf = workflow(oracle.clone(), GraphConfig::default());
    let outcome = wf.run(sentences, &out, None).await.unwrap();

    assert_eq!(outcome.target_sentences.len(), 4);
    assert_eq!(outcome.target_sentences, to_strings(&["u0.", "u1.", "u3.", "u4."]));
    assert_eq!(outcome.target_document, "u0. u1. u3. u4.");
    assert_eq!(outcome.report.failed_units, vec![2]);
    assert!(!outcome.report.incomplete);

    // the artifact is the only place the memories survive
    let raw: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
    let units: Vec<discograph::DiscourseUnit> =
        serde_json::from_value(raw["discourses"].clone()).unwrap();

    assert_eq!(units[0].incident_memory, Memory::placeholder());
    assert_eq!(units[1].incident_memory.context_summary, "sum U0.");
    assert_eq!(units[2].incident_memory.context_summary, "sum U1.");

    assert!(units[2].target_text.is_none());
    assert!(units[2].local_memory.is_empty());

    // unit 3 depends on units 1 and 2; only unit 1 contributed anything
    let incident = &units[3].incident_memory;
    assert_eq!(
        incident.entity_mapping,
        BTreeMap::from([("U1.".to_string(), "u1.".to_string())])
    );
    assert_eq!(incident.context_summary, "sum U1.");
    assert_eq!(incident.discourse_connective, "", "last predecessor (unit 2) had none");

    assert_eq!(units[4].incident_memory, tagged_memory("U3.", "u3."));
}

#[tokio::test]
async fn generation_requests_carry_encoded_incident_memory() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("doc.json");
    let sentences = to_strings(&["U0.", "U1.", "U2.", "U3.", "U4."]);

    let oracle = Arc::new(failing_unit_two());
    let wf = workflow(oracle.clone(), GraphConfig::default());
    wf.run(sentences, &out, None).await.unwrap();

    let requests = oracle.recorded_requests();
    assert_eq!(requests.len(), 5);
    assert_eq!(requests[0].memory, "Context summary:[(none)]");
    assert_eq!(
        requests[3].memory,
        r#"Entity mappings:{"U1.":"u1."} | Context summary:[sum U1.]"#
    );
}

#[tokio::test]
async fn every_translation_failing_still_writes_artifact() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("doc.json");
    let oracle = Arc::new(
        ScriptedOracle::new()
            .with_translator(|_| Err(OracleError::Unavailable("connection refused".into()))),
    );
    let wf = workflow(oracle, GraphConfig::default());

    let outcome = wf
        .run(to_strings(&["A.", "B.", "C."]), &out, None)
        .await
        .unwrap();

    assert!(outcome.target_sentences.is_empty());
    assert_eq!(outcome.target_document, "");
    assert_eq!(outcome.report.failed_units, vec![0, 1, 2]);
    let loaded = load_artifact(&out, false).unwrap();
    assert_eq!(loaded.graph.len(), 3);
    assert!(loaded.target_sentences.is_empty());
}

#[tokio::test]
async fn failing_classifiers_degrade_to_safe_defaults() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("doc.json");
    let oracle = Arc::new(
        ScriptedOracle::new()
            .with_segmenter(|_, _| Err(OracleError::Parse("not json".into())))
            .with_edges(|_, _| Err(OracleError::Timeout(Duration::from_secs(5))))
            .with_extractor(|_, _| Err(OracleError::InvocationFailed("500".into()))),
    );
    let wf = workflow(oracle, GraphConfig::default());

    let outcome = wf
        .run(to_strings(&["A.", "B.", "C.", "D."]), &out, None)
        .await
        .unwrap();

    assert_eq!(outcome.report.unit_count, 4);
    assert_eq!(outcome.report.edge_count, 3);
    assert_eq!(outcome.target_document, "A. B. C. D.");
    let loaded = load_artifact(&out, false).unwrap();
    assert!(loaded.graph.units.iter().all(|u| u.is_translated()));
}
