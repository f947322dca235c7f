use reqwest::{StatusCode, header, redirect::Policy};
use so_portal::{AppConfig, AppState, RoleAccessTable, create_router};
use tokio::net::TcpListener;

#[derive(Debug)]
pub struct TestApp {
    pub address: String,
}

async fn spawn_app() -> TestApp {
    let state = AppState::new(AppConfig::default(), RoleAccessTable::builtin());
    let router = create_router(state);

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    TestApp { address }
}

fn client() -> reqwest::Client {
    // Redirects are asserted on, not followed.
    reqwest::Client::builder()
        .redirect(Policy::none())
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_health_check() {
    let app = spawn_app().await;
    let response = client()
        .get(format!("{}/api/health", app.address))
        .send()
        .await
        .expect("req fail");
    assert!(response.status().is_success());
}

#[tokio::test]
async fn test_sign_in_lifecycle() {
    let app = spawn_app().await;
    let client = client();

    // 1. Anonymous visitor is sent to sign-in.
    let resp = client
        .get(format!("{}/manage-users", app.address))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(resp.headers()[header::LOCATION], "/signin");

    // 2. Callback establishes the session.
    let resp = client
        .get(format!(
            "{}/auth/callback?code=c0de&state=s7ate&client_info=aW5mbw",
            app.address
        ))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(
        resp.headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .any(|c| c.to_str().unwrap().starts_with("so_auth=true"))
    );

    // 3. Signed in without a role: home only.
    let resp = client
        .get(format!("{}/manage-users", app.address))
        .header(header::COOKIE, "so_auth=true")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(resp.headers()[header::LOCATION], "/");

    // 4. Role recorded, page reachable.
    let resp = client
        .put(format!("{}/api/session/role", app.address))
        .header(header::COOKIE, "so_auth=true")
        .json(&serde_json::json!({ "role": "Org Admin" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = client
        .get(format!("{}/manage-users", app.address))
        .header(header::COOKIE, "so_auth=true; so_user_role=Org%20Admin")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    // 5. Logout sends the user back to sign-in.
    let resp = client
        .get(format!("{}/logout", app.address))
        .header(header::COOKIE, "so_auth=true; so_user_role=Org%20Admin")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(resp.headers()[header::LOCATION], "/signin");
}
