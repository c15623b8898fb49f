//! Routing, access control and response headers, driven in process.

#![allow(clippy::unwrap_used)]

use agrotrack_integration_tests::{body_text, get, post_form, test_app};
use axum::http::{StatusCode, header};
use tower::ServiceExt;

#[tokio::test]
async fn test_public_pages_render() {
    for path in ["/welcome", "/faq", "/shop", "/product/kit1", "/cart", "/buy", "/login", "/signup"] {
        let response = test_app().oneshot(get(path, None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK, "{path}");
    }
}

#[tokio::test]
async fn test_root_and_unknown_paths_go_to_welcome() {
    for path in ["/", "/no-existe"] {
        let response = test_app().oneshot(get(path, None)).await.unwrap();
        assert!(response.status().is_redirection(), "{path}");
        assert_eq!(response.headers()[header::LOCATION], "/welcome");
    }
}

#[tokio::test]
async fn test_herd_pages_require_sign_in() {
    for path in ["/home", "/registrodevacas", "/mapa", "/monitoreo", "/enfermedades", "/reportes"] {
        let response = test_app().oneshot(get(path, None)).await.unwrap();
        assert!(response.status().is_redirection(), "{path}");
        assert_eq!(response.headers()[header::LOCATION], "/login");
    }
}

#[tokio::test]
async fn test_htmx_fragment_without_session_asks_for_redirect() {
    let mut request = get("/monitoreo/tree?animal=1", None);
    request
        .headers_mut()
        .insert("HX-Request", "true".parse().unwrap());

    let response = test_app().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(response.headers()["HX-Redirect"], "/login");
}

#[tokio::test]
async fn test_unknown_product_page_is_not_found() {
    let response = test_app()
        .oneshot(get("/product/vaca-voladora", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(body_text(response).await.contains("Producto no encontrado"));
}

#[tokio::test]
async fn test_contact_only_service_links_to_buy() {
    let response = test_app()
        .oneshot(get("/product/service1", None))
        .await
        .unwrap();
    let page = body_text(response).await;

    assert!(page.contains("Contactar por Servicio"));
    assert!(!page.contains("hx-post=\"/cart/add\""));
}

#[tokio::test]
async fn test_checkout_requires_name_and_address() {
    let response = test_app()
        .oneshot(post_form("/buy", "name=&address=&message=hola", None))
        .await
        .unwrap();
    let page = body_text(response).await;

    assert!(page.contains("es obligatorio"));
    assert!(!page.contains("Gracias por tu compra"));
    assert!(page.contains("hola"));
}

#[tokio::test]
async fn test_login_with_malformed_email_shows_error_without_backend() {
    let response = test_app()
        .oneshot(post_form("/login", "email=sin-arroba&password=x", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("sin-arroba"));
}

#[tokio::test]
async fn test_security_headers_on_pages() {
    let response = test_app().oneshot(get("/welcome", None)).await.unwrap();
    let headers = response.headers();

    assert_eq!(headers[header::X_FRAME_OPTIONS], "DENY");
    assert_eq!(headers[header::X_CONTENT_TYPE_OPTIONS], "nosniff");
    let csp = headers[header::CONTENT_SECURITY_POLICY].to_str().unwrap();
    assert!(csp.contains("script-src 'self' https://unpkg.com"));
}
