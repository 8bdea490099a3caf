// tests/progress_tests.rs

mod common;

use common::{register_user, spawn_app};
use serde_json::{Value, json};

#[derive(Clone)]
struct Session {
    client: reqwest::Client,
    address: String,
    token: String,
}

impl Session {
    async fn new() -> Self {
        let address = spawn_app().await;
        let client = reqwest::Client::new();
        let token = register_user(&client, &address).await;
        Self {
            client,
            address,
            token,
        }
    }

    async fn post(&self, path: &str, body: Value) -> (u16, Value) {
        let response = self
            .client
            .post(format!("{}{}", self.address, path))
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await
            .expect("Request failed");
        let status = response.status().as_u16();
        (status, response.json().await.unwrap_or(Value::Null))
    }

    async fn get(&self, path: &str) -> (u16, Value) {
        let response = self
            .client
            .get(format!("{}{}", self.address, path))
            .bearer_auth(&self.token)
            .send()
            .await
            .expect("Request failed");
        let status = response.status().as_u16();
        (status, response.json().await.unwrap_or(Value::Null))
    }

    async fn start(&self, module_id: &str) -> (u16, Value) {
        self.post("/api/progress/start", json!({ "moduleId": module_id }))
            .await
    }

    async fn answer(&self, module_id: &str, index: u32, correct: bool) -> (u16, Value) {
        self.post(
            "/api/progress/answer",
            json!({
                "moduleId": module_id,
                "questionIndex": index,
                "isCorrect": correct,
                "timeSpent": 30
            }),
        )
        .await
    }
}

#[tokio::test]
async fn module_catalog_is_public() {
    let address = spawn_app().await;
    let modules: Vec<Value> = reqwest::get(format!("{}/api/modules", address))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(modules.len(), 8);
    assert_eq!(modules[0]["id"], "math");
    assert_eq!(modules[0]["totalQuestions"], 10);
}

#[tokio::test]
async fn start_then_resume_module() {
    let session = Session::new().await;

    let (status, first) = session.start("math").await;
    assert_eq!(status, 200);
    assert_eq!(first["message"], "Module started.");
    assert_eq!(first["progress"]["status"], "in_progress");
    assert_eq!(first["progress"]["totalQuestions"], 10);

    session.answer("math", 0, true).await;

    let (status, second) = session.start("math").await;
    assert_eq!(status, 200);
    assert_eq!(second["message"], "Module resumed.");
    assert_eq!(second["progress"]["questionsAnswered"], 1);
    assert_eq!(second["progress"]["startedAt"], first["progress"]["startedAt"]);
}

#[tokio::test]
async fn invalid_inputs_are_client_errors() {
    let session = Session::new().await;

    let (status, _) = session.start("alchemy").await;
    assert_eq!(status, 400);

    let (status, _) = session.post("/api/progress/start", json!({})).await;
    assert_eq!(status, 400);

    let (status, _) = session.answer("math", 0, true).await;
    assert_eq!(status, 400, "answering before starting must fail");

    session.start("math").await;
    let (status, _) = session
        .post(
            "/api/progress/answer",
            json!({ "moduleId": "math", "questionIndex": 0 }),
        )
        .await;
    assert_eq!(status, 400, "missing isCorrect must fail");
}

#[tokio::test]
async fn oversized_time_spent_is_rejected_and_not_stored() {
    let session = Session::new().await;
    session.start("math").await;

    let (status, _) = session
        .post(
            "/api/progress/answer",
            json!({
                "moduleId": "math",
                "questionIndex": 0,
                "isCorrect": true,
                "timeSpent": 9_223_372_036_854_775_808u64
            }),
        )
        .await;
    assert_eq!(status, 400);

    let (status, progress) = session.get("/api/progress/modules/math").await;
    assert_eq!(status, 200);
    assert_eq!(progress["questionsAnswered"], 0);

    let (status, report) = session.get("/api/progress/detailed").await;
    assert_eq!(status, 200);
    assert_eq!(report["globalStats"]["totalTimeSpent"], 0);
}

#[tokio::test]
async fn completing_a_module_updates_legacy_mirror() {
    let session = Session::new().await;
    session.start("math").await;

    let mut last = Value::Null;
    for i in 0..10 {
        let (status, body) = session.answer("math", i, i < 7).await;
        assert_eq!(status, 200);
        assert_eq!(body["isModuleCompleted"], i == 9);
        last = body;
    }

    assert_eq!(last["progress"]["status"], "completed");
    assert_eq!(last["progress"]["finalScore"], 70);

    let (status, simple) = session.get("/api/progress").await;
    assert_eq!(status, 200);
    assert_eq!(simple["completedModules"], json!(["math"]));
    assert_eq!(simple["completedModulesWithScore"][0]["moduleId"], "math");
    assert_eq!(simple["completedModulesWithScore"][0]["score"], 70);
    assert_eq!(simple["currentQuestion"], 0);

    let (status, _) = session.answer("math", 10, true).await;
    assert_eq!(status, 409, "completed modules accept no more answers");
}

#[tokio::test]
async fn duplicate_answer_is_rejected() {
    let session = Session::new().await;
    session.start("physics").await;

    let (status, _) = session.answer("physics", 3, true).await;
    assert_eq!(status, 200);

    let (status, body) = session.answer("physics", 3, false).await;
    assert_eq!(status, 409);
    assert!(body["error"].is_string());

    let (status, progress) = session.get("/api/progress/modules/physics").await;
    assert_eq!(status, 200);
    assert_eq!(progress["questionsAnswered"], 1);
    assert_eq!(progress["correctAnswers"], 1);
}

#[tokio::test]
async fn reset_deletes_attempt_and_mirror() {
    let session = Session::new().await;

    // Resetting something never started is fine.
    let (status, _) = session
        .post("/api/progress/reset", json!({ "moduleId": "history" }))
        .await;
    assert_eq!(status, 200);

    session.start("history").await;
    for i in 0..10 {
        session.answer("history", i, true).await;
    }

    let (status, _) = session
        .post("/api/progress/reset", json!({ "moduleId": "history" }))
        .await;
    assert_eq!(status, 200);

    let (status, _) = session.get("/api/progress/modules/history").await;
    assert_eq!(status, 404);

    let (_, simple) = session.get("/api/progress").await;
    assert_eq!(simple["completedModules"], json!([]));
    assert_eq!(simple["completedModulesWithScore"], json!([]));

    let (_, restarted) = session.start("history").await;
    assert_eq!(restarted["message"], "Module started.");
}

#[tokio::test]
async fn detailed_progress_includes_stats_and_recommendations() {
    let session = Session::new().await;

    session.start("math").await;
    for i in 0..10 {
        session.answer("math", i, i < 6).await;
    }
    session.start("physics").await;
    for i in 0..8 {
        session.answer("physics", i, true).await;
    }

    let (status, report) = session.get("/api/progress/detailed").await;
    assert_eq!(status, 200);

    let global = &report["globalStats"];
    assert_eq!(global["totalAvailableModules"], 8);
    assert_eq!(global["completedModulesCount"], 1);
    assert_eq!(global["modulesInProgressCount"], 1);
    assert_eq!(global["averageScore"], 60);
    assert_eq!(global["bestScore"], 60);
    assert_eq!(global["totalQuestionsAnswered"], 18);
    assert_eq!(global["globalAccuracy"], 78); // 14 / 18
    assert_eq!(global["totalTimeSpent"], 9); // 18 * 30s

    assert_eq!(report["modulesInProgress"][0]["moduleId"], "physics");
    assert_eq!(report["modulesInProgress"][0]["progressPercentage"], 80);
    assert_eq!(report["subjectAnalysis"][0]["name"], "Mathématiques");

    let recommendations = report["recommendations"].as_array().unwrap();
    let find = |kind: &str| recommendations.iter().find(|r| r["type"] == kind);

    let completion = find("completion").expect("completion recommendation");
    assert_eq!(completion["priority"], "high");
    assert_eq!(completion["modules"], json!(["physics"]));

    let improvement = find("improvement").expect("improvement recommendation");
    assert_eq!(improvement["priority"], "medium");
    assert_eq!(improvement["modules"], json!(["math"]));

    let exploration = find("exploration").expect("exploration recommendation");
    assert_eq!(exploration["modules"], json!(["chemistry", "biology"]));
}

#[tokio::test]
async fn dashboard_for_new_user_is_all_zero() {
    let session = Session::new().await;

    let (status, dashboard) = session.get("/api/progress/dashboard").await;

    assert_eq!(status, 200);
    assert_eq!(dashboard["globalProgress"], 0);
    assert_eq!(dashboard["totalModules"], 0);
    assert_eq!(dashboard["averageScore"], 0);
    assert_eq!(dashboard["totalAvailableModules"], 8);
    assert_eq!(dashboard["recentActivity"]["lastModuleCompleted"], Value::Null);
    assert_eq!(dashboard["recentActivity"]["totalSessions"], 0);

    let (_, report) = session.get("/api/progress/detailed").await;
    assert_eq!(report["globalStats"]["globalAccuracy"], 0);
    assert_eq!(report["globalStats"]["bestScore"], 0);
}

#[tokio::test]
async fn concurrent_answers_are_not_lost() {
    let session = Session::new().await;
    session.start("biology").await;

    let handles: Vec<_> = (0..5)
        .map(|i| {
            let session = session.clone();
            tokio::spawn(async move { session.answer("biology", i, true).await })
        })
        .collect();
    for handle in handles {
        let (status, _) = handle.await.unwrap();
        assert_eq!(status, 200);
    }

    let (_, progress) = session.get("/api/progress/modules/biology").await;
    assert_eq!(progress["questionsAnswered"], 5);
}
