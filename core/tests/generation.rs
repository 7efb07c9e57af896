use endpoint_schemas_core::generator::{DESTINATION_QUESTION_KEY, ROOT_QUESTION_KEY};
use endpoint_schemas_core::{
    generate, run, AnswerMap, AppError, EndpointSchemasMap, GenerationConfig, HttpMethod,
};
use pretty_assertions::assert_eq;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

fn fixtures() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/example-functions")
}

#[test]
fn test_single_endpoint_scenario() {
    let project = tempdir().unwrap();
    let endpoint = project.path().join("functions/endpoint1");
    fs::create_dir_all(&endpoint).unwrap();
    fs::copy(
        fixtures().join("endpoint1/endpoint.yaml"),
        endpoint.join("endpoint.yaml"),
    )
    .unwrap();

    let input = AnswerMap::new()
        .with(ROOT_QUESTION_KEY, "functions")
        .with(DESTINATION_QUESTION_KEY, "client");
    let report = run(&input, &GenerationConfig::new(project.path()))
        .unwrap()
        .unwrap();

    let code = fs::read_to_string(&report.output_path).unwrap();
    assert!(code.contains("'endpoint1': Endpoint1_EndpointSchemas"));
    assert!(code.contains("'endpoint1::POST':"));
    assert!(code.contains("bundle_id: z.number(),"));
    assert!(code.contains("products: z.array(z.number()),"));
}

#[test]
fn test_every_declared_method_is_emitted() {
    let out = tempdir().unwrap();
    let mut config = GenerationConfig::new(out.path());
    config.manifest = true;

    let report = generate(&fixtures(), out.path(), &config).unwrap();
    let keys: Vec<String> = report.keys.iter().map(ToString::to_string).collect();
    assert_eq!(
        keys,
        vec!["endpoint1::POST", "refund-order::GET", "refund-order::PUT"]
    );

    let code = fs::read_to_string(&report.output_path).unwrap();
    for key in &keys {
        assert!(code.contains(&format!("'{}':", key)), "missing {}", key);
    }
    assert!(code.contains("'refund-order': RefundOrder_EndpointSchemas"));
    assert!(code.contains("z.literal('refunded')"));
    assert!(code.contains("z.enum(['duplicate', 'fraud', 'requested']).nullish()"));

    let manifest = fs::read_to_string(report.manifest_path.unwrap()).unwrap();
    let map = EndpointSchemasMap::from_json(&manifest).unwrap();
    assert_eq!(map.len(), 3);
    let (key, io) = map.lookup("refund-order::PUT").unwrap();
    assert_eq!(key.method, HttpMethod::Put);
    assert!(io.request.accepts(&serde_json::json!({"order_id": "o-1"})));
    assert!(!io.request.accepts(&serde_json::json!({"order_id": "o-1", "reason": "bored"})));
}

#[test]
fn test_emitted_module_matches_golden_file() {
    let out = tempdir().unwrap();
    let report = generate(&fixtures(), out.path(), &GenerationConfig::new(out.path())).unwrap();

    let code = fs::read_to_string(&report.output_path).unwrap();
    let golden = include_str!("fixtures/golden/EndpointMap.ts");
    assert_eq!(code, golden);
}

#[test]
fn test_regeneration_is_byte_identical() {
    let out = tempdir().unwrap();
    let config = GenerationConfig::new(out.path());

    let first = generate(&fixtures(), out.path(), &config).unwrap();
    let before = fs::read(&first.output_path).unwrap();
    let second = generate(&fixtures(), out.path(), &config).unwrap();
    let after = fs::read(&second.output_path).unwrap();

    assert_eq!(first, second);
    assert!(before == after, "regenerated client differs");
}

#[test]
fn test_incomplete_definition_aborts_generation() {
    let project = tempdir().unwrap();
    let endpoint = project.path().join("broken");
    fs::create_dir_all(&endpoint).unwrap();
    fs::write(endpoint.join("endpoint.yaml"), "GET:\n  response: string\n").unwrap();

    let out = project.path().join("out");
    let err = generate(project.path(), &out, &GenerationConfig::new(project.path())).unwrap_err();
    assert!(matches!(err, AppError::Definition { .. }));
    assert!(err.to_string().contains("GET is missing a request schema"));
    assert!(!out.exists());
}
