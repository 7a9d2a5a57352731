mod common;

use base64::{engine::general_purpose, Engine as _};
use common::*;
use eocanvas_rust_sdk::prelude::*;
use rsa::pkcs8::DecodePrivateKey;
use rsa::{Oaep, RsaPrivateKey};
use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PUBLIC_KEY_PEM: &str = include_str!("data/test_public_key.pem");
const PRIVATE_KEY_PEM: &str = include_str!("data/test_private_key.pem");

fn decrypt(data: &str) -> Value {
    let private_key = RsaPrivateKey::from_pkcs8_pem(PRIVATE_KEY_PEM).unwrap();
    let ciphertext = general_purpose::STANDARD.decode(data).unwrap();
    let plaintext = private_key
        .decrypt(Oaep::new::<sha1::Sha1>(), &ciphertext)
        .unwrap();
    serde_json::from_slice(&plaintext).unwrap()
}

async fn mount_public_key(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/api/keys/cert/public"))
        .respond_with(ResponseTemplate::new(200).set_body_string(PUBLIC_KEY_PEM))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_create_key_encrypts_config() {
    let server = MockServer::start().await;
    mount_token(&server).await;
    mount_public_key(&server).await;
    Mock::given(method("POST"))
        .and(path("/api/keys"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let api = api(&server);
    let config = S3KeyConfig::new(
        "secret",
        "access",
        "bucket",
        "https://s3.example.com",
        "eu-1",
    )
    .unwrap();
    let key = Key::with_config(&api, "mybucket", config)
        .description("output bucket")
        .expire_seconds(600)
        .create()
        .await
        .unwrap();
    assert_eq!(key.name, "mybucket");

    let requests = server.received_requests().await.unwrap();
    let create = requests
        .iter()
        .find(|r| r.method.as_str() == "POST" && r.url.path() == "/api/keys")
        .unwrap();
    let body: Value = create.body_json().unwrap();
    let entry = &body["mybucket"];

    assert_eq!(entry["type"], "S3");
    assert_eq!(entry["expire"], 600);
    assert_eq!(entry["public"], false);
    assert_eq!(entry["description"], "output bucket");
    assert_eq!(
        decrypt(entry["data"].as_str().unwrap()),
        json!({
            "secret_key": "secret",
            "access_key": "access",
            "bucket": "bucket",
            "endpoint": "https://s3.example.com",
            "region": "eu-1",
        })
    );
}

#[tokio::test]
async fn test_create_key_without_config_makes_no_request() {
    let server = MockServer::start().await;
    mount_token(&server).await;

    let err = Key::new(&api(&server), "empty").create().await.unwrap_err();
    assert!(matches!(err, SdkError::Validation(_)));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_list_and_delete_keys() {
    let server = MockServer::start().await;
    mount_token(&server).await;
    Mock::given(method("GET"))
        .and(path("/api/keys"))
        .respond_with(json_response(json!([
            {"name": "eodata", "type": "S3", "owner": "someone", "public": true},
            {"name": "dav", "type": "WEBDAV", "expireSeconds": 60},
        ])))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/keys/dav"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let keys = api(&server).get_keys().await.unwrap();
    assert_eq!(keys.len(), 2);
    assert_eq!(keys[0].type_(), Some(KeyType::S3));
    assert!(keys[0].public);
    assert_eq!(keys[1].type_(), Some(KeyType::WebDav));
    assert_eq!(keys[1].expire_seconds, 60);

    keys[1].delete().await.unwrap();
}

#[tokio::test]
async fn test_public_key_is_fetched() {
    let server = MockServer::start().await;
    mount_token(&server).await;
    mount_public_key(&server).await;

    let pem = api(&server).get_public_key().await.unwrap();
    assert_eq!(pem, PUBLIC_KEY_PEM.as_bytes());
}
