//! API integration tests
//!
//! These run against a live server with a scratch database:
//! `cargo run` in one terminal, then `cargo test -- --ignored`.

use reqwest::Client;
use serde_json::{json, Value};

const BASE_URL: &str = "http://localhost:8080";

/// Helper to get an authenticated token
async fn get_auth_token(client: &Client) -> String {
    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "username": "admin",
            "password": "admin123"
        }))
        .send()
        .await
        .expect("Failed to send login request");

    let body: Value = response.json().await.expect("Failed to parse login response");
    body["token"].as_str().expect("No token in response").to_string()
}

/// Create a category and return its id
async fn create_category(client: &Client, token: &str, name: &str) -> i64 {
    let response = client
        .post(format!("{}/category/add", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({ "name": name }))
        .send()
        .await
        .expect("Failed to create category");
    assert!(response.status().is_success());

    let response = client
        .get(format!("{}/category/list", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to list categories");
    let body: Value = response.json().await.expect("Failed to parse response");
    body["data"]
        .as_array()
        .expect("No category list")
        .iter()
        .find(|c| c["name"] == name)
        .and_then(|c| c["id"].as_i64())
        .expect("Created category not found")
}

/// Create a publisher and return its id
async fn create_publisher(client: &Client, token: &str, name: &str) -> i64 {
    let response = client
        .post(format!("{}/publisher/add", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({ "name": name }))
        .send()
        .await
        .expect("Failed to create publisher");
    assert!(response.status().is_success());

    let response = client
        .get(format!("{}/publisher/list", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to list publishers");
    let body: Value = response.json().await.expect("Failed to parse response");
    body["data"]
        .as_array()
        .expect("No publisher list")
        .iter()
        .find(|p| p["name"] == name)
        .and_then(|p| p["id"].as_i64())
        .expect("Created publisher not found")
}

/// Create a book with the given copy count and return its id
async fn create_book(client: &Client, token: &str, name: &str, total_copies: i64) -> i64 {
    let suffix = name.replace(' ', "-");
    let category_id = create_category(client, token, &format!("cat-{}", suffix)).await;
    let publisher_id = create_publisher(client, token, &format!("pub-{}", suffix)).await;

    let response = client
        .post(format!("{}/book/add", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "name": name,
            "author": "Test Author",
            "publishDate": "2020-01-01",
            "price": "19.90",
            "categoryId": category_id,
            "publisherId": publisher_id,
            "totalCopies": total_copies
        }))
        .send()
        .await
        .expect("Failed to create book");
    assert!(response.status().is_success(), "book/add failed");

    let response = client
        .get(format!("{}/book/querypage?name={}", BASE_URL, name))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to query books");
    let body: Value = response.json().await.expect("Failed to parse response");
    body["data"]["rows"]
        .as_array()
        .expect("No book rows")
        .iter()
        .find(|b| b["name"] == name)
        .and_then(|b| b["id"].as_i64())
        .expect("Created book not found")
}

/// Create a patron and return its id
async fn create_patron(client: &Client, token: &str, name: &str, card: &str) -> i64 {
    let response = client
        .post(format!("{}/user/add", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "name": name,
            "cardNumber": card
        }))
        .send()
        .await
        .expect("Failed to create patron");
    assert!(response.status().is_success(), "user/add failed");

    let response = client
        .get(format!("{}/user/querypage?cardNumber={}", BASE_URL, card))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to query patrons");
    let body: Value = response.json().await.expect("Failed to parse response");
    body["data"]["rows"]
        .as_array()
        .expect("No patron rows")
        .iter()
        .find(|u| u["cardNumber"] == card)
        .and_then(|u| u["id"].as_i64())
        .expect("Created patron not found")
}

/// Borrow a book for a patron; returns the raw response
async fn borrow(client: &Client, token: &str, book_id: i64, user_input: &str) -> reqwest::Response {
    client
        .post(format!("{}/borrow/borrow", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "bookId": book_id,
            "userInput": user_input
        }))
        .send()
        .await
        .expect("Failed to send borrow request")
}

/// The patron's latest borrow record id for a book
async fn latest_record_id(client: &Client, token: &str, user_name: &str) -> i64 {
    let response = client
        .get(format!("{}/borrow/querypage?userName={}", BASE_URL, user_name))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to query borrow records");
    let body: Value = response.json().await.expect("Failed to parse response");
    body["data"]["rows"]
        .as_array()
        .expect("No record rows")
        .first()
        .and_then(|r| r["id"].as_i64())
        .expect("No borrow record found")
}

fn unique(prefix: &str) -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    format!("{}-{}", prefix, nanos)
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn test_health_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/health", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_login() {
    let client = Client::new();

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "username": "admin",
            "password": "admin123"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["token"].is_string());
    assert_eq!(body["tokenType"], "Bearer");
}

#[tokio::test]
#[ignore]
async fn test_login_invalid_credentials() {
    let client = Client::new();

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "username": "admin",
            "password": "wrong"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_unauthorized_access() {
    let client = Client::new();

    let response = client
        .get(format!("{}/book/querypage", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_borrow_return_flow() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let book_name = unique("Borrowable Book");
    let book_id = create_book(&client, &token, &book_name, 2).await;
    let patron_name = unique("Flow Patron");
    let card = unique("CARD");
    let patron_id = create_patron(&client, &token, &patron_name, &card).await;

    // Borrow by numeric patron id
    let response = borrow(&client, &token, book_id, &patron_id.to_string()).await;
    assert!(response.status().is_success(), "borrow should succeed");

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["code"], true);

    // The ledger shows one open record for this patron
    let record_id = latest_record_id(&client, &token, &patron_name).await;

    // Return it
    let response = client
        .post(format!("{}/borrow/return?id={}", BASE_URL, record_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send return request");
    assert!(response.status().is_success(), "return should succeed");

    // A second return of the same record is rejected
    let response = client
        .post(format!("{}/borrow/return?id={}", BASE_URL, record_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send return request");
    assert_eq!(response.status(), 400);
}

#[tokio::test]
#[ignore]
async fn test_borrow_by_card_number() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let book_id = create_book(&client, &token, &unique("Card Book"), 1).await;
    let card = unique("LIB");
    create_patron(&client, &token, &unique("Card Patron"), &card).await;

    let response = borrow(&client, &token, book_id, &card).await;
    assert!(response.status().is_success(), "borrow by card should succeed");
}

#[tokio::test]
#[ignore]
async fn test_duplicate_borrow_rejected() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let book_id = create_book(&client, &token, &unique("Popular Book"), 3).await;
    let card = unique("DUP");
    let patron_id = create_patron(&client, &token, &unique("Dup Patron"), &card).await;

    let response = borrow(&client, &token, book_id, &patron_id.to_string()).await;
    assert!(response.status().is_success());

    // Same patron, same title, still unreturned
    let response = borrow(&client, &token, book_id, &patron_id.to_string()).await;
    assert_eq!(response.status(), 400);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["code"], false);
}

#[tokio::test]
#[ignore]
async fn test_borrow_limit_enforced() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let card = unique("LIM");
    let patron_id = create_patron(&client, &token, &unique("Limit Patron"), &card).await;

    // Five distinct titles succeed
    for i in 0..5 {
        let book_id = create_book(&client, &token, &unique(&format!("Limit Book {}", i)), 1).await;
        let response = borrow(&client, &token, book_id, &patron_id.to_string()).await;
        assert!(response.status().is_success(), "borrow {} should succeed", i);
    }

    // The sixth is rejected
    let book_id = create_book(&client, &token, &unique("Limit Book 5"), 1).await;
    let response = borrow(&client, &token, book_id, &patron_id.to_string()).await;
    assert_eq!(response.status(), 400);
}

#[tokio::test]
#[ignore]
async fn test_renew_once_only() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let book_id = create_book(&client, &token, &unique("Renewable Book"), 1).await;
    let patron_name = unique("Renew Patron");
    let card = unique("REN");
    let patron_id = create_patron(&client, &token, &patron_name, &card).await;

    let response = borrow(&client, &token, book_id, &patron_id.to_string()).await;
    assert!(response.status().is_success());

    let record_id = latest_record_id(&client, &token, &patron_name).await;

    // First renewal succeeds
    let response = client
        .post(format!("{}/borrow/renew?id={}", BASE_URL, record_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send renew request");
    assert!(response.status().is_success(), "first renewal should succeed");

    // Second renewal is rejected
    let response = client
        .post(format!("{}/borrow/renew?id={}", BASE_URL, record_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send renew request");
    assert_eq!(response.status(), 400);
}

#[tokio::test]
#[ignore]
async fn test_concurrent_borrows_of_last_copy() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let book_id = create_book(&client, &token, &unique("Scarce Book"), 1).await;

    let mut patron_ids = Vec::new();
    for i in 0..4 {
        let card = unique(&format!("CC{}", i));
        let id = create_patron(&client, &token, &unique(&format!("Racer {}", i)), &card).await;
        patron_ids.push(id);
    }

    let mut handles = Vec::new();
    for patron_id in patron_ids {
        let client = client.clone();
        let token = token.clone();
        handles.push(tokio::spawn(async move {
            borrow(&client, &token, book_id, &patron_id.to_string())
                .await
                .status()
                .is_success()
        }));
    }

    let mut successes = 0;
    for handle in handles {
        if handle.await.expect("borrow task panicked") {
            successes += 1;
        }
    }

    // Exactly one concurrent borrow wins the last copy
    assert_eq!(successes, 1);
}

#[tokio::test]
#[ignore]
async fn test_concurrent_duplicate_borrows_of_same_title() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    // Two free copies, so stock alone would let both through
    let book_id = create_book(&client, &token, &unique("Twin Copy Book"), 2).await;
    let card = unique("TW");
    let patron_id = create_patron(&client, &token, &unique("Twin Patron"), &card).await;

    let first = {
        let client = client.clone();
        let token = token.clone();
        tokio::spawn(async move {
            borrow(&client, &token, book_id, &patron_id.to_string())
                .await
                .status()
                .is_success()
        })
    };
    let second = {
        let client = client.clone();
        let token = token.clone();
        tokio::spawn(async move {
            borrow(&client, &token, book_id, &patron_id.to_string())
                .await
                .status()
                .is_success()
        })
    };

    let (first, second) = (
        first.await.expect("borrow task panicked"),
        second.await.expect("borrow task panicked"),
    );

    // One open record per patron and title, no matter the interleaving
    assert!(first ^ second, "exactly one duplicate borrow should succeed");
}

#[tokio::test]
#[ignore]
async fn test_withdraw_and_delete_blocked_while_borrowed() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let book_name = unique("Guarded Book");
    let book_id = create_book(&client, &token, &book_name, 1).await;
    let patron_name = unique("Guard Patron");
    let card = unique("GRD");
    let patron_id = create_patron(&client, &token, &patron_name, &card).await;

    let response = borrow(&client, &token, book_id, &patron_id.to_string()).await;
    assert!(response.status().is_success());

    // Withdrawing the title is refused while the copy is out
    let response = client
        .post(format!("{}/book/changestatus", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({ "id": book_id, "status": 2 }))
        .send()
        .await
        .expect("Failed to send changestatus request");
    assert_eq!(response.status(), 400);

    // So is deleting it
    let response = client
        .delete(format!("{}/book/delete?id={}", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send delete request");
    assert_eq!(response.status(), 400);

    // After the return both succeed
    let record_id = latest_record_id(&client, &token, &patron_name).await;
    let response = client
        .post(format!("{}/borrow/return?id={}", BASE_URL, record_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send return request");
    assert!(response.status().is_success());

    let response = client
        .delete(format!("{}/book/delete?id={}", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send delete request");
    assert!(response.status().is_success());
}

#[tokio::test]
#[ignore]
async fn test_delete_patron_with_returned_history_rejected() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let book_id = create_book(&client, &token, &unique("History Book"), 1).await;
    let patron_name = unique("History Patron");
    let card = unique("HIS");
    let patron_id = create_patron(&client, &token, &patron_name, &card).await;

    let response = borrow(&client, &token, book_id, &patron_id.to_string()).await;
    assert!(response.status().is_success());

    let record_id = latest_record_id(&client, &token, &patron_name).await;
    let response = client
        .post(format!("{}/borrow/return?id={}", BASE_URL, record_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send return request");
    assert!(response.status().is_success());

    // The ledger keeps the closed record, so the patron cannot be deleted
    let response = client
        .delete(format!("{}/user/delete?id={}", BASE_URL, patron_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send delete request");
    assert_eq!(response.status(), 400);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["code"], false);
}

#[tokio::test]
#[ignore]
async fn test_report_summary() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let response = client
        .get(format!("{}/report/summary", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["code"], true);
    assert!(body["data"]["totalBooks"].is_number());
    assert!(body["data"]["availableBooks"].is_number());
    assert!(body["data"]["borrowedBooks"].is_number());
}

#[tokio::test]
#[ignore]
async fn test_available_books_listing() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let book_name = unique("Available Book");
    create_book(&client, &token, &book_name, 2).await;

    let response = client
        .get(format!("{}/book/available?keyword={}", BASE_URL, book_name))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    let rows = body["data"]["rows"].as_array().expect("No rows");
    assert!(rows.iter().any(|b| b["name"] == book_name));
}
