//! Sign-in, registration, guest cart merge and expired tokens.

use emporium_integration_tests::{SHOPPER_EMAIL, TestApp, location};

#[tokio::test]
async fn test_wrong_password_shows_toast() {
    let app = TestApp::spawn().await;

    let response = app
        .post_form(
            "/auth/login",
            &[("email", SHOPPER_EMAIL), ("password", "wrong password")],
        )
        .await;
    assert_eq!(location(&response), "/auth/login");

    let page = app.page("/auth/login").await;
    assert!(page.contains("Invalid email or password"));
}

#[tokio::test]
async fn test_login_returns_to_requested_page() {
    let app = TestApp::spawn().await;

    let response = app.get("/account/orders").await;
    assert_eq!(location(&response), "/auth/login?next=%2Faccount%2Forders");

    let response = app.login(SHOPPER_EMAIL).await;
    assert_eq!(location(&response), "/account/orders");

    let page = app.page("/account/orders").await;
    assert!(page.contains("Welcome, Sam"));
    assert!(page.contains("You have not placed any orders yet"));
}

#[tokio::test]
async fn test_guest_cart_merges_on_login() {
    let app = TestApp::spawn().await;
    app.add_to_cart("p1", 2).await;
    app.add_to_cart("p2", 1).await;

    app.login(SHOPPER_EMAIL).await;

    assert_eq!(
        app.backend.cart_of(SHOPPER_EMAIL),
        vec![("p1".to_string(), 2), ("p2".to_string(), 1)]
    );
    let page = app.page("/cart").await;
    assert!(page.contains("Brass Lamp"));
    assert!(page.contains("Oak Desk"));
}

#[tokio::test]
async fn test_unconfirmed_merge_keeps_only_backend_lines() {
    let app = TestApp::spawn().await;
    app.add_to_cart("p1", 2).await;

    app.backend
        .fail_next_write(axum::http::StatusCode::INTERNAL_SERVER_ERROR);
    app.backend
        .fail_cart_read_after(1, axum::http::StatusCode::SERVICE_UNAVAILABLE);
    let response = app.login(SHOPPER_EMAIL).await;
    assert_eq!(response.status(), 303);

    assert!(app.backend.cart_of(SHOPPER_EMAIL).is_empty());
    assert_eq!(
        app.page("/cart/count").await.trim(),
        r#"<span class="badge" id="cart-count">0</span>"#
    );
}

#[tokio::test]
async fn test_register_then_logout() {
    let app = TestApp::spawn().await;

    let response = app
        .post_form(
            "/auth/register",
            &[
                ("user_name", "Noor"),
                ("email", "noor@emporium.test"),
                ("password", "long enough password"),
                ("password_confirm", "long enough password"),
            ],
        )
        .await;
    assert_eq!(location(&response), "/");
    assert!(app.page("/account").await.contains("Hello, Noor"));

    let response = app.post_form("/auth/logout", &[]).await;
    assert_eq!(location(&response), "/");

    let response = app.get("/account").await;
    assert_eq!(response.status(), 303);
}

#[tokio::test]
async fn test_register_rejects_mismatched_passwords() {
    let app = TestApp::spawn().await;

    app.post_form(
        "/auth/register",
        &[
            ("user_name", "Noor"),
            ("email", "noor@emporium.test"),
            ("password", "long enough password"),
            ("password_confirm", "something else"),
        ],
    )
    .await;

    assert!(app.page("/auth/register").await.contains("Passwords do not match"));
}

#[tokio::test]
async fn test_expired_token_signs_user_out() {
    let app = TestApp::spawn().await;
    app.login(SHOPPER_EMAIL).await;
    app.backend.revoke_tokens();

    let response = app.get("/account").await;
    assert_eq!(response.status(), 303);
    assert_eq!(location(&response), "/auth/login");

    let page = app.page("/auth/login").await;
    assert!(page.contains("Your session expired, please sign in again"));
    assert!(page.contains(r#"href="/auth/register""#));
    assert!(!page.contains("Sign out"));
}

#[tokio::test]
async fn test_login_is_rate_limited() {
    let app = TestApp::spawn().await;

    for _ in 0..5 {
        let response = app
            .post_form(
                "/auth/login",
                &[("email", SHOPPER_EMAIL), ("password", "wrong password")],
            )
            .await;
        assert_eq!(response.status(), 303);
    }

    let response = app
        .post_form(
            "/auth/login",
            &[("email", SHOPPER_EMAIL), ("password", "wrong password")],
        )
        .await;
    assert_eq!(response.status(), 429);
}
