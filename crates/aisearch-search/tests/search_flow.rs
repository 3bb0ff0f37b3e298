use aisearch_core::{Embedder, Error, Result, Settings};
use aisearch_search::{AiSearchOperator, MultiVectorParams, SearchHit, SearchMode};
use httpmock::prelude::*;
use serde_json::json;

const PATH: &str = "/indexes/vectest/docs/search";

struct FixedEmbedder;

impl Embedder for FixedEmbedder {
    fn dim(&self) -> usize { 2 }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|_| vec![0.5, 0.25]).collect())
    }
}

fn operator(search_endpoint: &str) -> AiSearchOperator {
    let settings = Settings {
        search_service_endpoint: search_endpoint.to_string(),
        search_index: "vectest".to_string(),
        search_admin_key: Some("admin".to_string()),
        search_api_version: "2024-07-01".to_string(),
        openai_endpoint: "http://unused.invalid".to_string(),
        openai_key: Some("openai".to_string()),
        openai_embedding_deployment: "embed".to_string(),
        openai_embedding_model: None,
        openai_embedding_dimensions: 2,
        openai_api_version: "2024-02-01".to_string(),
        request_timeout_secs: 5,
        use_fake_embeddings: false,
    };
    AiSearchOperator::with_embedder(&settings, Box::new(FixedEmbedder)).unwrap()
}

fn hit(title: &str, score: f64) -> serde_json::Value {
    json!({"@search.score": score, "title": title, "content": "c", "category": "k"})
}

#[test]
fn hybrid_sends_documented_body_and_yields_hits_in_order() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST)
            .path(PATH)
            .query_param("api-version", "2024-07-01")
            .header("api-key", "admin")
            .json_body(json!({
                "search": "cats",
                "vectorQueries": [{"kind": "text", "text": "cats", "k": 5, "fields": "contentVector", "weight": 0.5}],
                "select": "title,content,category",
                "top": 5
            }));
        then.status(200).json_body(json!({"value": [hit("first", 0.03), hit("second", 0.02)]}));
    });
    let hits: Vec<SearchHit> = operator(&server.base_url())
        .hybrid_search("cats", 5, 0.5)
        .unwrap()
        .collect::<Result<_>>()
        .unwrap();
    mock.assert();
    let titles: Vec<_> = hits.iter().map(|h| h.title.as_deref().unwrap_or("")).collect();
    assert_eq!(titles, vec!["first", "second"]);
}

#[test]
fn nothing_is_sent_until_results_are_consumed() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST).path(PATH);
        then.status(200).json_body(json!({"value": [hit("only", 1.0)]}));
    });
    let mut results = operator(&server.base_url()).knn_exact_search("cats", 3).unwrap();
    assert!(!results.started());
    mock.assert_hits(0);

    let first = results.next().expect("one hit").unwrap();
    assert_eq!(first.title.as_deref(), Some("only"));
    assert!(results.next().is_none());
    mock.assert_hits(1);
}

#[test]
fn follows_next_page_parameters() {
    let server = MockServer::start();
    let first = server.mock(|when, then| {
        when.method(POST).path(PATH).json_body_partial(r#"{"search": "cats", "top": 2}"#);
        then.status(200).json_body(json!({
            "value": [hit("a", 0.9), hit("b", 0.8)],
            "@search.nextPageParameters": {"search": "cats", "skip": 2, "top": 1}
        }));
    });
    let second = server.mock(|when, then| {
        when.method(POST).path(PATH).json_body_partial(r#"{"skip": 2}"#);
        then.status(200).json_body(json!({"value": [hit("c", 0.7)]}));
    });
    let titles: Vec<String> = operator(&server.base_url())
        .hybrid_search("cats", 2, 0.5)
        .unwrap()
        .map(|h| h.unwrap().title.unwrap_or_default())
        .collect();
    first.assert_hits(1);
    second.assert_hits(1);
    assert_eq!(titles, vec!["a", "b", "c"]);
}

#[test]
fn semantic_hybrid_exposes_answers_and_captions() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST)
            .path(PATH)
            .json_body_partial(r#"{"queryType": "semantic", "semanticConfiguration": "my-semantic-config", "answers": "extractive"}"#);
        then.status(200).json_body(json!({
            "@search.answers": [{"key": "1", "text": "Cats purr.", "highlights": "<em>Cats</em> purr.", "score": 0.9}],
            "value": [{
                "@search.score": 0.03,
                "@search.rerankerScore": 2.5,
                "@search.captions": [{"text": "Cats purr.", "highlights": null}],
                "title": "Cats", "content": "Cats purr.", "category": "pets"
            }]
        }));
    });
    let mut results = operator(&server.base_url()).semantic_hybrid_search("cats", 3).unwrap();
    let answers = results.answers().unwrap().to_vec();
    assert_eq!(answers.len(), 1);
    assert_eq!(answers[0].display_text(), "<em>Cats</em> purr.");

    let hits: Vec<SearchHit> = results.collect::<Result<_>>().unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].reranker_score, Some(2.5));
    assert_eq!(hits[0].captions()[0].display_text(), "Cats purr.");
}

#[test]
fn vector_mode_embeds_query_locally() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST).path(PATH).json_body(json!({
            "vectorQueries": [{"kind": "vector", "vector": [0.5, 0.25], "k": 3, "fields": "contentVector"}],
            "select": "title,content,category",
            "filter": "category eq 'pets'"
        }));
        then.status(200).json_body(json!({"value": []}));
    });
    let mode = SearchMode::Vector { top_k: 3, filter: Some("category eq 'pets'".to_string()) };
    let hits: Vec<SearchHit> = operator(&server.base_url()).search(&mode, "cats").unwrap().collect::<Result<_>>().unwrap();
    mock.assert();
    assert!(hits.is_empty());
}

#[test]
fn multi_vector_sends_one_query_per_field() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST).path(PATH).json_body(json!({
            "vectorQueries": [
                {"kind": "text", "text": "cats", "k": 3, "fields": "titleVector", "weight": 2.0},
                {"kind": "text", "text": "cats", "k": 3, "fields": "contentVector", "weight": 0.5}
            ],
            "select": "title,content,category"
        }));
        then.status(200).json_body(json!({"value": [hit("x", 1.0)]}));
    });
    let count = operator(&server.base_url())
        .multi_vector_search("cats", &MultiVectorParams::default())
        .unwrap()
        .count();
    mock.assert();
    assert_eq!(count, 1);
}

#[test]
fn service_error_surfaces_on_first_pull_and_ends_stream() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path(PATH);
        then.status(400).body(r#"{"error":{"message":"Unknown field 'contentVector'"}}"#);
    });
    let mut results = operator(&server.base_url()).cross_vector_search("cats", 3).unwrap();
    match results.next() {
        Some(Err(Error::Service { status, body })) => {
            assert_eq!(status, 400);
            assert!(body.contains("Unknown field"));
        }
        other => panic!("unexpected: {other:?}"),
    }
    assert!(results.next().is_none());
}
