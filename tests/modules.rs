use axum::http::StatusCode;
use serde_json::json;

mod common;
use common::*;

fn course_modules_path(ctx: &FlowContext) -> String {
    format!(
        "/api/v1/courses/{}/modules",
        ctx.get("course")["id"].as_str().unwrap()
    )
}

#[tokio::test]
async fn reorder_applies_full_batch_atomically() {
    let db = setup_test_db().await;
    let mut server = setup_server(&db).await;

    let reorder_body = |ctx: &FlowContext| {
        json!({
            "modules": [
                { "id": ctx.get("mod_c")["id"], "order_index": 0 },
                { "id": ctx.get("mod_a")["id"], "order_index": 1 },
                { "id": ctx.get("mod_b")["id"], "order_index": 2 },
            ]
        })
    };

    Flow::new()
        .step(signup_action("teacher_tom", "s3cret-pass"))
        .step(create_course_action("Rust in Depth", "course"))
        .step(create_module_action("course", "Alpha Module", 0, "mod_a"))
        .step(create_module_action("course", "Bravo Module", 1, "mod_b"))
        .step(create_module_action("course", "Charlie Module", 2, "mod_c"))
        .step(
            Action::new("reorder_modules", "PATCH", "/api/v1/modules/reorder")
                .with_dyn_body(reorder_body)
                .assert_body(|body| {
                    assert!(body.contains(r#""success":true"#));
                    assert_appears_before(body, "Charlie Module", "Alpha Module");
                    assert_appears_before(body, "Alpha Module", "Bravo Module");
                }),
        )
        .step(
            Action::new("list_after_reorder", "GET", "/")
                .with_dyn_path(course_modules_path)
                .assert_body(|body| {
                    assert_appears_before(body, "Charlie Module", "Alpha Module");
                    assert_appears_before(body, "Alpha Module", "Bravo Module");
                }),
        )
        // applying the same batch again is a no-op, not an error
        .step(
            Action::new("reorder_again", "PATCH", "/api/v1/modules/reorder")
                .with_dyn_body(reorder_body)
                .assert_body(|body| {
                    assert_appears_before(body, "Charlie Module", "Alpha Module");
                    assert_appears_before(body, "Alpha Module", "Bravo Module");
                }),
        )
        .run(&mut server, db)
        .await;
}

#[tokio::test]
async fn reorder_returns_lessons_with_their_content() {
    let db = setup_test_db().await;
    let mut server = setup_server(&db).await;

    Flow::new()
        .step(signup_action("teacher_tom", "s3cret-pass"))
        .step(create_course_action("Rust in Depth", "course"))
        .step(create_module_action("course", "Alpha Module", 0, "mod_a"))
        .step(create_module_action("course", "Bravo Module", 1, "mod_b"))
        .step(
            Action::new("create_lesson_with_content", "POST", "/api/v1/lessons/")
                .with_dyn_body(|ctx| {
                    json!({
                        "module_id": ctx.get("mod_a")["id"],
                        "title": "Seeded Lesson",
                        "description": "",
                        "content": { "blocks": ["nested-content-marker"] },
                    })
                })
                .with_expect(StatusCode::CREATED),
        )
        // a reorder response must carry the whole refreshed tree, content
        // included, so clients re-render without extra lesson fetches
        .step(
            Action::new("reorder_modules", "PATCH", "/api/v1/modules/reorder")
                .with_dyn_body(|ctx| {
                    json!({
                        "modules": [
                            { "id": ctx.get("mod_b")["id"], "order_index": 0 },
                            { "id": ctx.get("mod_a")["id"], "order_index": 1 },
                        ]
                    })
                })
                .assert_body(|body| {
                    assert!(body.contains("Seeded Lesson"));
                    assert!(body.contains("nested-content-marker"));
                }),
        )
        .step(
            Action::new("listing_carries_content", "GET", "/")
                .with_dyn_path(course_modules_path)
                .assert_body(|body| {
                    assert!(body.contains("nested-content-marker"));
                }),
        )
        .run(&mut server, db)
        .await;
}

#[tokio::test]
async fn reorder_rejects_duplicate_positions_and_keeps_state() {
    let db = setup_test_db().await;
    let mut server = setup_server(&db).await;

    Flow::new()
        .step(signup_action("teacher_tom", "s3cret-pass"))
        .step(create_course_action("Rust in Depth", "course"))
        .step(create_module_action("course", "Alpha Module", 0, "mod_a"))
        .step(create_module_action("course", "Bravo Module", 1, "mod_b"))
        .step(create_module_action("course", "Charlie Module", 2, "mod_c"))
        .step(
            Action::new("reorder_duplicate", "PATCH", "/api/v1/modules/reorder")
                .with_dyn_body(|ctx| {
                    json!({
                        "modules": [
                            { "id": ctx.get("mod_a")["id"], "order_index": 1 },
                            { "id": ctx.get("mod_b")["id"], "order_index": 1 },
                            { "id": ctx.get("mod_c")["id"], "order_index": 2 },
                        ]
                    })
                })
                .with_expect(StatusCode::BAD_REQUEST)
                .assert_body(|body| {
                    assert!(body.contains("duplicate position"));
                }),
        )
        .step(
            Action::new("list_unchanged", "GET", "/")
                .with_dyn_path(course_modules_path)
                .assert_body(|body| {
                    assert_appears_before(body, "Alpha Module", "Bravo Module");
                    assert_appears_before(body, "Bravo Module", "Charlie Module");
                }),
        )
        .run(&mut server, db)
        .await;
}

#[tokio::test]
async fn reorder_rejects_partial_batch() {
    let db = setup_test_db().await;
    let mut server = setup_server(&db).await;

    Flow::new()
        .step(signup_action("teacher_tom", "s3cret-pass"))
        .step(create_course_action("Rust in Depth", "course"))
        .step(create_module_action("course", "Alpha Module", 0, "mod_a"))
        .step(create_module_action("course", "Bravo Module", 1, "mod_b"))
        .step(create_module_action("course", "Charlie Module", 2, "mod_c"))
        .step(
            Action::new("reorder_partial", "PATCH", "/api/v1/modules/reorder")
                .with_dyn_body(|ctx| {
                    json!({
                        "modules": [
                            { "id": ctx.get("mod_a")["id"], "order_index": 1 },
                            { "id": ctx.get("mod_b")["id"], "order_index": 0 },
                        ]
                    })
                })
                .with_expect(StatusCode::BAD_REQUEST)
                .assert_body(|body| {
                    assert!(body.contains("sibling set"));
                }),
        )
        .run(&mut server, db)
        .await;
}

#[tokio::test]
async fn reorder_rejects_module_from_another_course() {
    let db = setup_test_db().await;
    let mut server = setup_server(&db).await;

    Flow::new()
        .step(signup_action("teacher_tom", "s3cret-pass"))
        .step(create_course_action("Rust in Depth", "course"))
        .step(create_module_action("course", "Alpha Module", 0, "mod_a"))
        .step(create_module_action("course", "Bravo Module", 1, "mod_b"))
        .step(create_course_action("Go in Depth", "other_course"))
        .step(create_module_action("other_course", "Foreign Module", 0, "mod_x"))
        .step(
            Action::new("reorder_cross_course", "PATCH", "/api/v1/modules/reorder")
                .with_dyn_body(|ctx| {
                    json!({
                        "modules": [
                            { "id": ctx.get("mod_a")["id"], "order_index": 0 },
                            { "id": ctx.get("mod_b")["id"], "order_index": 1 },
                            { "id": ctx.get("mod_x")["id"], "order_index": 2 },
                        ]
                    })
                })
                .with_expect(StatusCode::BAD_REQUEST)
                .assert_body(|body| {
                    assert!(body.contains("sibling set"));
                }),
        )
        .run(&mut server, db)
        .await;
}

#[tokio::test]
async fn reorder_rejects_empty_and_negative_batches() {
    let db = setup_test_db().await;
    let mut server = setup_server(&db).await;

    Flow::new()
        .step(signup_action("teacher_tom", "s3cret-pass"))
        .step(create_course_action("Rust in Depth", "course"))
        .step(create_module_action("course", "Alpha Module", 0, "mod_a"))
        .step(
            Action::new("reorder_empty", "PATCH", "/api/v1/modules/reorder")
                .with_body(json!({ "modules": [] }))
                .with_expect(StatusCode::BAD_REQUEST)
                .assert_body(|body| {
                    assert!(body.contains("empty batch"));
                }),
        )
        .step(
            Action::new("reorder_negative", "PATCH", "/api/v1/modules/reorder")
                .with_dyn_body(|ctx| {
                    json!({
                        "modules": [
                            { "id": ctx.get("mod_a")["id"], "order_index": -1 },
                        ]
                    })
                })
                .with_expect(StatusCode::BAD_REQUEST)
                .assert_body(|body| {
                    assert!(body.contains("non-negative"));
                }),
        )
        .run(&mut server, db)
        .await;
}

#[tokio::test]
async fn module_mutations_require_ownership() {
    let db = setup_test_db().await;
    let mut server = setup_server(&db).await;

    Flow::new()
        .step(signup_action("owner_olly", "s3cret-pass"))
        .step(create_course_action("Locked Course", "course"))
        .step(create_module_action("course", "Alpha Module", 0, "mod_a"))
        .step(signup_action("stranger_steve", "s3cret-pass").with_clear_cookies(true))
        .step(
            Action::new("foreign_module_create", "POST", "/api/v1/modules/")
                .with_dyn_body(|ctx| {
                    json!({
                        "course_id": ctx.get("course")["id"],
                        "title": "Injected Module",
                        "description": "",
                    })
                })
                .with_expect(StatusCode::FORBIDDEN),
        )
        .step(
            Action::new("foreign_reorder", "PATCH", "/api/v1/modules/reorder")
                .with_dyn_body(|ctx| {
                    json!({
                        "modules": [
                            { "id": ctx.get("mod_a")["id"], "order_index": 0 },
                        ]
                    })
                })
                .with_expect(StatusCode::FORBIDDEN),
        )
        .run(&mut server, db)
        .await;
}

#[tokio::test]
async fn module_create_appends_to_the_end_when_position_omitted() {
    let db = setup_test_db().await;
    let mut server = setup_server(&db).await;

    Flow::new()
        .step(signup_action("teacher_tom", "s3cret-pass"))
        .step(create_course_action("Rust in Depth", "course"))
        .step(create_module_action("course", "Alpha Module", 0, "mod_a"))
        .step(create_module_action("course", "Bravo Module", 1, "mod_b"))
        .step(
            Action::new("create_without_position", "POST", "/api/v1/modules/")
                .with_dyn_body(|ctx| {
                    json!({
                        "course_id": ctx.get("course")["id"],
                        "title": "Tail Module",
                        "description": "",
                    })
                })
                .with_expect(StatusCode::CREATED)
                .assert_body(|body| {
                    assert!(body.contains(r#""order_index":2"#));
                }),
        )
        .run(&mut server, db)
        .await;
}
