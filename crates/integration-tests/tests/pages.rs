//! Page rendering, health checks and response headers.

use emporium_integration_tests::{TestApp, location};

#[tokio::test]
async fn test_health_endpoints() {
    let app = TestApp::spawn().await;

    let response = app.get("/health").await;
    assert_eq!(response.status(), 200);
    assert_eq!(response.text().await.expect("body"), "ok");

    assert_eq!(app.get("/health/ready").await.status(), 200);
}

#[tokio::test]
async fn test_home_lists_top_rated_first() {
    let app = TestApp::spawn().await;

    let page = app.page("/").await;
    let desk = page.find("Oak Desk").expect("desk listed");
    let lamp = page.find("Brass Lamp").expect("lamp listed");
    assert!(desk < lamp);
    assert!(page.contains("Shop by category"));
}

#[tokio::test]
async fn test_listing_filters_and_sorts() {
    let app = TestApp::spawn().await;

    let page = app.page("/products?q=lamp").await;
    assert!(page.contains("Brass Lamp"));
    assert!(!page.contains("Oak Desk"));

    let page = app.page("/products?sort=price_asc").await;
    let lantern = page.find("Paper Lantern").expect("lantern listed");
    let desk = page.find("Oak Desk").expect("desk listed");
    assert!(lantern < desk);

    let page = app.page("/categories/c2").await;
    assert!(page.contains("Oak Desk"));
    assert!(!page.contains("Brass Lamp"));
}

#[tokio::test]
async fn test_product_page_shows_sale_price() {
    let app = TestApp::spawn().await;

    let page = app.page("/products/p2").await;
    assert!(page.contains("$199.00"));
    assert!(page.contains("<s>$250.00</s>"));
    assert!(page.contains("No reviews yet"));

    assert_eq!(app.get("/products/missing").await.status(), 404);
}

#[tokio::test]
async fn test_locale_switch_renders_right_to_left() {
    let app = TestApp::spawn().await;

    let response = app.post_form("/locale", &[("locale", "ar")]).await;
    assert_eq!(location(&response), "/");

    let page = app.page("/").await;
    assert!(page.contains(r#"<html lang="ar" dir="rtl">"#));
}

#[tokio::test]
async fn test_security_headers_and_request_id() {
    let app = TestApp::spawn().await;

    let response = app.get("/").await;
    let headers = response.headers();
    assert_eq!(
        headers.get("x-content-type-options").map(|v| v.as_bytes()),
        Some(&b"nosniff"[..])
    );
    assert!(headers.contains_key("content-security-policy"));
    assert!(headers.contains_key("x-request-id"));

    let response = app
        .client
        .get(format!("{}/health", app.url))
        .header("x-request-id", "trace-abc.123")
        .send()
        .await
        .expect("GET request");
    assert_eq!(
        response.headers().get("x-request-id").map(|v| v.as_bytes()),
        Some(&b"trace-abc.123"[..])
    );
}
