//! Shared fixtures: a mock catalog service and a low-cost sealed bundle

#![allow(dead_code)]

use std::collections::HashSet;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use lms_common::vault::{SealedBundle, UnsealedPayload};
use lms_space::services::CatalogEndpoints;
use serde_json::{json, Value};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

pub const CLIENT_ID: &str = "lab-client";
pub const CLIENT_SECRET: &str = "lab-secret";
pub const TOKEN: &str = "test-access-token";
pub const PASSWORD: &str = "c#1-test";

/// Catalog id for fixture track `n`
pub fn track_id(n: usize) -> String {
    format!("{:0>22}", format!("T{}", n))
}

pub fn track_uri(n: usize) -> String {
    format!("spotify:track:{}", track_id(n))
}

fn seed_of(id: &str) -> u64 {
    id.trim_start_matches('0')
        .trim_start_matches('T')
        .parse()
        .unwrap_or(0)
}

/// Deterministic, well-spread feature values for a track id
pub fn features_json(id: &str) -> Value {
    let seed = seed_of(id);
    let f = |salt: u64| ((seed * (7919 + salt * 104_729) + salt * 31) % 1000) as f64 / 1000.0;
    json!({
        "id": id,
        "danceability": f(1),
        "energy": f(2),
        "key": (seed % 12) as f64,
        "loudness": -30.0 * f(3),
        "mode": (seed % 2) as f64,
        "speechiness": f(4),
        "acousticness": f(5),
        "instrumentalness": f(6),
        "liveness": f(7),
        "valence": f(8),
        "tempo": 60.0 + 120.0 * f(9),
        "duration_ms": 120_000.0 + 180_000.0 * f(10),
        "time_signature": 3.0 + (seed % 2) as f64,
        "type": "audio_features"
    })
}

pub fn track_json(id: &str) -> Value {
    let seed = seed_of(id);
    json!({
        "id": id,
        "name": format!("Song {}", seed),
        "artists": [{"name": format!("Artist {}", seed % 4)}],
        "album": {
            "name": format!("Album {}", seed % 5),
            "images": [
                {"url": format!("https://img.test/{}/64", seed), "width": 64, "height": 64},
                {"url": format!("https://img.test/{}/640", seed), "width": 640, "height": 640}
            ]
        }
    })
}

/// Which bulk endpoint a responder serves
#[derive(Clone, Copy)]
pub enum Bulk {
    Tracks,
    Features,
}

/// Answers bulk lookups from the `ids` query, `null` for unknown ids
pub struct CatalogResponder {
    pub kind: Bulk,
    pub unknown: HashSet<String>,
}

impl Respond for CatalogResponder {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let ids: Vec<String> = request
            .url
            .query_pairs()
            .find(|(k, _)| k == "ids")
            .map(|(_, v)| v.split(',').map(str::to_string).collect())
            .unwrap_or_default();

        let entries: Vec<Value> = ids
            .iter()
            .map(|id| {
                if self.unknown.contains(id) {
                    Value::Null
                } else {
                    match self.kind {
                        Bulk::Tracks => track_json(id),
                        Bulk::Features => features_json(id),
                    }
                }
            })
            .collect();

        let body = match self.kind {
            Bulk::Tracks => json!({ "tracks": entries }),
            Bulk::Features => json!({ "audio_features": entries }),
        };
        ResponseTemplate::new(200).set_body_json(body)
    }
}

pub fn basic_auth_value() -> String {
    format!("Basic {}", STANDARD.encode(format!("{}:{}", CLIENT_ID, CLIENT_SECRET)))
}

/// Mount the token endpoint for the fixture credentials
pub async fn mount_token(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/api/token"))
        .and(header("authorization", basic_auth_value().as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": TOKEN,
            "token_type": "Bearer",
            "expires_in": 3600
        })))
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "invalid_client"
        })))
        .with_priority(10)
        .mount(server)
        .await;
}

/// Mount both bulk endpoints
pub async fn mount_bulk(server: &MockServer, unknown: &[String]) {
    let unknown: HashSet<String> = unknown.iter().cloned().collect();
    Mock::given(method("GET"))
        .and(path("/v1/tracks"))
        .and(header("authorization", format!("Bearer {}", TOKEN).as_str()))
        .respond_with(CatalogResponder {
            kind: Bulk::Tracks,
            unknown: unknown.clone(),
        })
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/audio-features"))
        .and(header("authorization", format!("Bearer {}", TOKEN).as_str()))
        .respond_with(CatalogResponder {
            kind: Bulk::Features,
            unknown,
        })
        .mount(server)
        .await;
}

/// Fully mocked catalog
pub async fn mock_catalog() -> MockServer {
    let server = MockServer::start().await;
    mount_token(&server).await;
    mount_bulk(&server, &[]).await;
    server
}

pub fn endpoints(server: &MockServer, batch_size: usize) -> CatalogEndpoints {
    CatalogEndpoints {
        accounts_url: server.uri(),
        api_url: server.uri(),
        batch_size,
        timeout_secs: 5,
    }
}

/// Dataset of `n` tracks spread over three labs
pub fn dataset(n: usize) -> String {
    let labs = ["Cai Lab", "Shuman Lab", "Dong Lab"];
    let mut text = String::from("lab,member,uri\n");
    for i in 0..n {
        text.push_str(&format!("{},member{},{}\n", labs[i % labs.len()], i, track_uri(i)));
    }
    text
}

/// Bundle sealed with few KDF iterations so tests stay fast
pub fn test_bundle(dataset: &str) -> SealedBundle {
    let payload = UnsealedPayload {
        service_id: CLIENT_ID.to_string(),
        service_secret: CLIENT_SECRET.to_string(),
        dataset: dataset.to_string(),
    };
    SealedBundle::seal(PASSWORD, &[7u8; 16], 100, &payload)
}
