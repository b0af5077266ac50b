mod common;

use omrgrade::{server, Config};
use reqwest::multipart::{Form, Part};
use tokio::net::TcpListener;

async fn spawn_server() -> String {
    spawn_server_with(Config::default()).await
}

async fn spawn_server_with(config: Config) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        server::serve_on(listener, &config).await.unwrap();
    });
    format!("http://{}", addr)
}

fn file(name: &str, bytes: Vec<u8>) -> Part {
    Part::bytes(bytes)
        .file_name(name.to_string())
        .mime_str("image/png")
        .unwrap()
}

fn grading_form() -> Form {
    Form::new()
        .part("answer_key", file("key.png", common::key_png()))
        .part(
            "students",
            file("alice.png", common::sheet_png(&[&[0], &[1], &[2], &[3]])),
        )
        .part(
            "students",
            file("bob.png", common::sheet_png(&[&[0], &[2], &[], &[1, 3]])),
        )
}

#[tokio::test]
async fn test_health_and_index() {
    let base = spawn_server().await;
    let client = reqwest::Client::new();

    let health = client.get(format!("{}/health", base)).send().await.unwrap();
    assert_eq!(health.status(), 200);
    assert_eq!(health.text().await.unwrap(), "ok");

    let index = client.get(&base).send().await.unwrap();
    assert_eq!(index.status(), 200);
    let body = index.text().await.unwrap();
    assert!(body.contains("name=\"answer_key\""));
    assert!(body.contains("Start Comparison"));
}

#[tokio::test]
async fn test_grade_returns_json_report() {
    let base = spawn_server().await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/api/grade", base))
        .multipart(grading_form())
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let report: serde_json::Value = response.json().await.unwrap();
    assert_eq!(report["key_questions"], 4);

    let results = report["results"].as_array().unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0]["student"], "Student 1");
    assert_eq!(results[0]["source"], "alice.png");
    assert_eq!(results[0]["correct"], 4);
    assert_eq!(results[0]["status"], "pass");

    assert_eq!(results[1]["correct"], 1);
    assert_eq!(results[1]["wrong"], 2);
    assert_eq!(results[1]["blank"], 1);
    assert_eq!(results[1]["accuracy"], 25.0);
    assert_eq!(results[1]["status"], "fail");
}

#[tokio::test]
async fn test_grade_csv_download() {
    let base = spawn_server().await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/api/grade?format=csv", base))
        .multipart(grading_form())
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let disposition = response
        .headers()
        .get("content-disposition")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(disposition.contains("omr_results.csv"));

    let body = response.text().await.unwrap();
    let lines: Vec<&str> = body.lines().collect();
    assert_eq!(
        lines[0],
        "Student,Total Qs,Correct,Wrong,Blank,Score,Accuracy (%),Status"
    );
    assert_eq!(lines[1], "Student 1,4,4,0,0,4.0,100.0,Pass");
    assert_eq!(lines[2], "Student 2,4,1,2,1,1.0,25.0,Fail");
}

#[tokio::test]
async fn test_grade_without_key_is_bad_request() {
    let base = spawn_server().await;
    let client = reqwest::Client::new();

    let form = Form::new().part("students", file("s.png", common::key_png()));
    let response = client
        .post(format!("{}/api/grade", base))
        .multipart(form)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 400);
    let body: serde_json::Value = response.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("answer key"));
}

#[tokio::test]
async fn test_grade_without_students_is_bad_request() {
    let base = spawn_server().await;
    let client = reqwest::Client::new();

    let form = Form::new().part("answer_key", file("key.png", common::key_png()));
    let response = client
        .post(format!("{}/api/grade", base))
        .multipart(form)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn test_blank_key_is_unprocessable() {
    let base = spawn_server().await;
    let client = reqwest::Client::new();

    let form = Form::new()
        .part("answer_key", file("key.png", common::blank_png()))
        .part("students", file("s.png", common::key_png()));
    let response = client
        .post(format!("{}/api/grade", base))
        .multipart(form)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 422);
}

#[tokio::test]
async fn test_all_students_unreadable_is_unprocessable() {
    let base = spawn_server().await;
    let client = reqwest::Client::new();

    let form = Form::new()
        .part("answer_key", file("key.png", common::key_png()))
        .part("students", file("junk.png", b"not an image".to_vec()))
        .part("students", file("blank.png", common::blank_png()));
    let response = client
        .post(format!("{}/api/grade", base))
        .multipart(form)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 422);
    let body: serde_json::Value = response.json().await.unwrap();
    let skipped = body["skipped"].as_array().unwrap();
    assert_eq!(skipped.len(), 2);
    assert_eq!(skipped[0]["reason"], "decode failed");
}

#[tokio::test]
async fn test_detect_reports_marks() {
    let base = spawn_server().await;
    let client = reqwest::Client::new();

    let form = Form::new().part("sheet", file("s.png", common::sheet_png(&[&[4], &[]])));
    let response = client
        .post(format!("{}/api/detect", base))
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["source"], "s.png");
    assert_eq!(body["questions"].as_array().unwrap().len(), 2);
    assert_eq!(body["sheet"]["1"]["choices"], "E");
    assert!(body["sheet"].get("2").is_none());
}

#[tokio::test]
async fn test_non_multipart_body_gets_json_error() {
    let base = spawn_server().await;
    let client = reqwest::Client::new();

    for route in ["/api/grade", "/api/detect"] {
        let response = client
            .post(format!("{}{}", base, route))
            .json(&serde_json::json!({ "answer_key": "key.png" }))
            .send()
            .await
            .unwrap();

        assert_eq!(response.status(), 400);
        let content_type = response
            .headers()
            .get("content-type")
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        assert!(content_type.starts_with("application/json"));

        let body: serde_json::Value = response.json().await.unwrap();
        assert!(body["error"]
            .as_str()
            .unwrap()
            .contains("Expected a multipart upload"));
    }
}

#[tokio::test]
async fn test_oversized_upload_is_rejected() {
    let mut config = Config::default();
    config.server.max_upload_mb = 1;
    let base = spawn_server_with(config).await;
    let client = reqwest::Client::new();

    let form = Form::new()
        .part("answer_key", file("key.png", vec![0u8; 2 * 1024 * 1024]))
        .part("students", file("s.png", common::key_png()));
    let response = client
        .post(format!("{}/api/grade", base))
        .multipart(form)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 413);
    let body: serde_json::Value = response.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("size limit"));
}

#[tokio::test]
async fn test_upload_within_limit_is_graded() {
    let mut config = Config::default();
    config.server.max_upload_mb = 1;
    let base = spawn_server_with(config).await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/api/grade", base))
        .multipart(grading_form())
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
}
