use astra_chat::{ChatSession, Exchange, FAILURE_MESSAGE};
use mockito::Matcher;
use serde_json::json;

#[tokio::test]
async fn test_answer_streams_into_one_message() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/ask")
        .match_body(Matcher::Json(json!({ "query": "What is WebGPU?" })))
        .with_status(200)
        .with_header("content-type", "text/plain; charset=utf-8")
        .with_body("WebGPU is a browser graphics API.")
        .create_async()
        .await;

    let mut session = ChatSession::new(server.url()).unwrap();
    let mut seen = String::new();

    let exchange = session
        .ask("What is WebGPU?", |fragment| seen.push_str(fragment))
        .await;

    assert_eq!(exchange, Exchange::Completed);
    assert_eq!(seen, "WebGPU is a browser graphics API.");

    let messages = session.transcript().messages();
    assert_eq!(messages.len(), 2);
    assert!(messages[0].is_user);
    assert_eq!(messages[1].text, "WebGPU is a browser graphics API.");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_rejected_request_adds_one_failure_message() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/ask")
        .with_status(400)
        .with_body(r#"{"error":"Invalid Query!"}"#)
        .create_async()
        .await;

    let mut session = ChatSession::new(format!("{}/", server.url())).unwrap();

    let exchange = session.ask("hi", |_| {}).await;

    assert_eq!(exchange, Exchange::Failed);
    let messages = session.transcript().messages();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[1].text, FAILURE_MESSAGE);
    assert!(!messages[1].is_user);
}

#[tokio::test]
async fn test_unreachable_server_adds_one_failure_message() {
    // Bind then drop to get a port with nothing listening
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let mut session = ChatSession::new(url).unwrap();

    assert_eq!(session.ask("hi", |_| {}).await, Exchange::Failed);
    assert_eq!(session.transcript().messages().len(), 2);
    assert_eq!(session.transcript().last().unwrap().text, FAILURE_MESSAGE);
}

#[tokio::test]
async fn test_questions_accumulate_in_order() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/ask")
        .with_status(200)
        .with_body("ok")
        .expect(2)
        .create_async()
        .await;

    let mut session = ChatSession::new(server.url()).unwrap();
    session.ask("one", |_| {}).await;
    session.ask("two", |_| {}).await;

    let texts: Vec<&str> = session
        .transcript()
        .messages()
        .iter()
        .map(|m| m.text.as_str())
        .collect();
    assert_eq!(texts, vec!["one", "ok", "two", "ok"]);
}
