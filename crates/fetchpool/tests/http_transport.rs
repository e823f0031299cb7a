use fetchpool::{ErrorKind, HttpTransport, Pool, PoolConfig, Transport, TransportRequest};
use reqwest::{Method, Url, header::HeaderMap};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_json, header, method, path},
};

#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq)]
struct Character {
    id: u32,
    name: String,
    status: String,
}

fn rick() -> Character {
    Character {
        id: 1,
        name: "Rick Sanchez".into(),
        status: "Alive".into(),
    }
}

#[tokio::test]
async fn get_decodes_server_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/character/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(rick()))
        .expect(1)
        .mount(&server)
        .await;

    let pool = Pool::new(PoolConfig::new(2)).await.unwrap();
    let mut target = Character::default();
    let fetched = pool
        .get(&format!("{}/api/character/1", server.uri()), &mut target)
        .await
        .unwrap();

    assert_eq!(fetched.status_code, 200);
    assert_eq!(*fetched.data, rick());

    pool.shutdown().await;
}

#[tokio::test]
async fn post_sends_json_payload() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/character"))
        .and(header("content-type", "application/json"))
        .and(body_json(rick()))
        .respond_with(ResponseTemplate::new(201).set_body_json(rick()))
        .expect(1)
        .mount(&server)
        .await;

    let pool = Pool::new(PoolConfig::new(1)).await.unwrap();
    let mut target = Character::default();
    let fetched = pool
        .submit(
            "POST",
            &format!("{}/api/character", server.uri()),
            Some(rick()),
            &mut target,
        )
        .await
        .unwrap();

    assert_eq!(fetched.status_code, 201);
    assert_eq!(fetched.data.name, "Rick Sanchez");

    pool.shutdown().await;
}

#[tokio::test]
async fn server_error_with_body_is_not_a_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/character/0"))
        .respond_with(ResponseTemplate::new(500).set_body_json(Character::default()))
        .mount(&server)
        .await;

    let pool = Pool::new(PoolConfig::new(1)).await.unwrap();
    let mut target = rick();
    let fetched = pool
        .get(&format!("{}/api/character/0", server.uri()), &mut target)
        .await
        .unwrap();

    assert_eq!(fetched.status_code, 500);
    assert_eq!(*fetched.data, Character::default());

    pool.shutdown().await;
}

#[tokio::test]
async fn empty_response_body_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/character/2"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let pool = Pool::new(PoolConfig::new(1)).await.unwrap();
    let mut target = rick();
    let err = pool
        .get(&format!("{}/api/character/2", server.uri()), &mut target)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::EmptyBody);
    assert_eq!(target, rick());

    pool.shutdown().await;
}

#[tokio::test]
async fn slow_server_times_out_as_network_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(rick())
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let config = PoolConfig::new(1).with_request_timeout(Duration::from_millis(100));
    let pool = Pool::new(config).await.unwrap();
    let mut target = Character::default();
    let err = pool
        .get(&format!("{}/slow", server.uri()), &mut target)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Network);
    assert!(err.to_string().contains("timed out"), "{err}");
    assert_eq!(target, Character::default());

    pool.shutdown().await;
}

#[tokio::test]
async fn unreachable_host_is_a_network_error() {
    let transport = HttpTransport::new(Duration::from_secs(2)).unwrap();
    let request = TransportRequest {
        method: Method::GET,
        url: Url::parse("http://127.0.0.1:9/unreachable").unwrap(),
        headers: HeaderMap::new(),
        body: None,
    };

    let err = transport.execute(request).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Network);
}

#[tokio::test]
async fn transport_returns_raw_status_and_headers() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/character/3"))
        .respond_with(
            ResponseTemplate::new(202)
                .insert_header("x-request-id", "abc123")
                .set_body_string("{}"),
        )
        .mount(&server)
        .await;

    let transport = HttpTransport::new(Duration::from_secs(2)).unwrap();
    assert_eq!(transport.timeout(), Duration::from_secs(2));

    let response = transport
        .execute(TransportRequest {
            method: Method::DELETE,
            url: Url::parse(&format!("{}/api/character/3", server.uri())).unwrap(),
            headers: HeaderMap::new(),
            body: None,
        })
        .await
        .unwrap();

    assert_eq!(response.status_code, 202);
    assert_eq!(response.headers.get("x-request-id").unwrap(), "abc123");
    assert_eq!(&response.body[..], b"{}");
}
