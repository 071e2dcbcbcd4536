use axum::http::StatusCode;

mod common;
use common::*;

#[tokio::test]
async fn signup_signin_flow() {
    let db = setup_test_db().await;
    let mut server = setup_server(&db).await;

    Flow::new()
        .step(
            signup_action("teacher_tom", "s3cret-pass")
                .assert_cookie("SID", |cookie| {
                    assert!(!cookie.value().is_empty());
                })
                .assert_body(|body| {
                    assert!(body.contains("teacher_tom"));
                    // the password hash never leaves the server
                    assert!(!body.contains("password_hash"));
                }),
        )
        .step(Action::new("verify_session", "GET", "/api/v1/account/verify"))
        .step(
            Action::new("verify_without_cookie", "GET", "/api/v1/account/verify")
                .with_clear_cookies(true)
                .with_expect(StatusCode::UNAUTHORIZED),
        )
        .step(signin_action("teacher_tom", "s3cret-pass").assert_cookie("SID", |cookie| {
            assert!(!cookie.value().is_empty());
        }))
        .step(Action::new("verify_after_signin", "GET", "/api/v1/account/verify"))
        .run(&mut server, db)
        .await;
}

#[tokio::test]
async fn signup_rejects_taken_username() {
    let db = setup_test_db().await;
    let mut server = setup_server(&db).await;

    Flow::new()
        .step(signup_action("teacher_tom", "s3cret-pass"))
        .step(
            signup_action("teacher_tom", "another-pass")
                .with_expect(StatusCode::CONFLICT)
                .assert_body(|body| {
                    assert!(body.contains("already exists"));
                }),
        )
        .run(&mut server, db)
        .await;
}

#[tokio::test]
async fn signin_rejects_bad_password() {
    let db = setup_test_db().await;
    let mut server = setup_server(&db).await;

    Flow::new()
        .step(signup_action("teacher_tom", "s3cret-pass"))
        .step(
            signin_action("teacher_tom", "wrong-pass")
                .with_clear_cookies(true)
                .with_expect(StatusCode::UNAUTHORIZED),
        )
        .step(
            signin_action("no_such_user", "s3cret-pass").with_expect(StatusCode::UNAUTHORIZED),
        )
        .run(&mut server, db)
        .await;
}
