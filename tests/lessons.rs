use axum::http::StatusCode;
use serde_json::json;

mod common;
use common::*;

fn lesson_path(key: &'static str) -> impl Fn(&FlowContext) -> String {
    move |ctx| {
        format!(
            "/api/v1/lessons/{}",
            ctx.get(key)["id"].as_str().unwrap()
        )
    }
}

#[tokio::test]
async fn lesson_create_writes_content_in_the_same_transaction() {
    let db = setup_test_db().await;
    let mut server = setup_server(&db).await;

    Flow::new()
        .step(signup_action("teacher_tom", "s3cret-pass"))
        .step(create_course_action("Rust in Depth", "course"))
        .step(create_module_action("course", "Basics", 0, "module"))
        .step(
            Action::new("create_lesson_with_content", "POST", "/api/v1/lessons/")
                .with_dyn_body(|ctx| {
                    json!({
                        "module_id": ctx.get("module")["id"],
                        "title": "Hello Borrowck",
                        "description": "",
                        "content": { "blocks": ["welcome-aboard-v1"] },
                    })
                })
                .with_expect(StatusCode::CREATED)
                .with_save_as("lesson")
                .assert_body(|body| {
                    assert!(body.contains("welcome-aboard-v1"));
                }),
        )
        .step(
            Action::new("get_lesson", "GET", "/")
                .with_dyn_path(lesson_path("lesson"))
                .assert_body(|body| {
                    assert!(body.contains("Hello Borrowck"));
                    assert!(body.contains("welcome-aboard-v1"));
                }),
        )
        .run(&mut server, db)
        .await;
}

#[tokio::test]
async fn lesson_update_replaces_the_single_content_record() {
    let db = setup_test_db().await;
    let mut server = setup_server(&db).await;

    Flow::new()
        .step(signup_action("teacher_tom", "s3cret-pass"))
        .step(create_course_action("Rust in Depth", "course"))
        .step(create_module_action("course", "Basics", 0, "module"))
        .step(
            Action::new("create_lesson", "POST", "/api/v1/lessons/")
                .with_dyn_body(|ctx| {
                    json!({
                        "module_id": ctx.get("module")["id"],
                        "title": "Hello Borrowck",
                        "description": "",
                        "content": { "blocks": ["welcome-aboard-v1"] },
                    })
                })
                .with_expect(StatusCode::CREATED)
                .with_save_as("lesson"),
        )
        .step(
            Action::new("replace_content", "PATCH", "/")
                .with_dyn_path(lesson_path("lesson"))
                .with_body(json!({
                    "title": "Hello Borrowck, Revised",
                    "description": "",
                    "content": { "blocks": ["welcome-aboard-v2"] },
                }))
                .assert_body(|body| {
                    assert!(body.contains("welcome-aboard-v2"));
                    assert!(!body.contains("welcome-aboard-v1"));
                }),
        )
        // the old document is gone, not shadowed by a second row
        .step(
            Action::new("get_after_replace", "GET", "/")
                .with_dyn_path(lesson_path("lesson"))
                .assert_body(|body| {
                    assert!(body.contains("welcome-aboard-v2"));
                    assert!(!body.contains("welcome-aboard-v1"));
                }),
        )
        .run(&mut server, db)
        .await;
}

#[tokio::test]
async fn lesson_update_without_content_leaves_document_untouched() {
    let db = setup_test_db().await;
    let mut server = setup_server(&db).await;

    Flow::new()
        .step(signup_action("teacher_tom", "s3cret-pass"))
        .step(create_course_action("Rust in Depth", "course"))
        .step(create_module_action("course", "Basics", 0, "module"))
        .step(
            Action::new("create_lesson", "POST", "/api/v1/lessons/")
                .with_dyn_body(|ctx| {
                    json!({
                        "module_id": ctx.get("module")["id"],
                        "title": "Hello Borrowck",
                        "description": "",
                        "content": { "blocks": ["welcome-aboard-v1"] },
                    })
                })
                .with_expect(StatusCode::CREATED)
                .with_save_as("lesson"),
        )
        .step(
            Action::new("rename_only", "PATCH", "/")
                .with_dyn_path(lesson_path("lesson"))
                .with_body(json!({
                    "title": "Renamed Lesson",
                    "description": "scalar-only update",
                }))
                .assert_body(|body| {
                    assert!(body.contains("Renamed Lesson"));
                    assert!(body.contains("welcome-aboard-v1"));
                }),
        )
        .run(&mut server, db)
        .await;
}

#[tokio::test]
async fn lessons_reorder_within_a_module() {
    let db = setup_test_db().await;
    let mut server = setup_server(&db).await;

    Flow::new()
        .step(signup_action("teacher_tom", "s3cret-pass"))
        .step(create_course_action("Rust in Depth", "course"))
        .step(create_module_action("course", "Basics", 0, "module"))
        .step(create_lesson_action("module", "First Lesson", 0, "les_a"))
        .step(create_lesson_action("module", "Second Lesson", 1, "les_b"))
        .step(create_lesson_action("module", "Third Lesson", 2, "les_c"))
        .step(
            Action::new("reorder_lessons", "PATCH", "/api/v1/lessons/reorder")
                .with_dyn_body(|ctx| {
                    json!({
                        "lessons": [
                            { "id": ctx.get("les_c")["id"], "order_index": 0 },
                            { "id": ctx.get("les_a")["id"], "order_index": 1 },
                            { "id": ctx.get("les_b")["id"], "order_index": 2 },
                        ]
                    })
                })
                .assert_body(|body| {
                    assert!(body.contains(r#""success":true"#));
                    assert_appears_before(body, "Third Lesson", "First Lesson");
                    assert_appears_before(body, "First Lesson", "Second Lesson");
                }),
        )
        .step(
            Action::new("nested_listing_reflects_order", "GET", "/")
                .with_dyn_path(|ctx| {
                    format!(
                        "/api/v1/courses/{}/modules",
                        ctx.get("course")["id"].as_str().unwrap()
                    )
                })
                .assert_body(|body| {
                    assert_appears_before(body, "Third Lesson", "First Lesson");
                    assert_appears_before(body, "First Lesson", "Second Lesson");
                }),
        )
        .run(&mut server, db)
        .await;
}

#[tokio::test]
async fn lessons_reorder_rejects_lesson_from_another_module() {
    let db = setup_test_db().await;
    let mut server = setup_server(&db).await;

    Flow::new()
        .step(signup_action("teacher_tom", "s3cret-pass"))
        .step(create_course_action("Rust in Depth", "course"))
        .step(create_module_action("course", "Basics", 0, "module"))
        .step(create_module_action("course", "Advanced", 1, "other_module"))
        .step(create_lesson_action("module", "First Lesson", 0, "les_a"))
        .step(create_lesson_action("module", "Second Lesson", 1, "les_b"))
        .step(create_lesson_action("other_module", "Foreign Lesson", 0, "les_x"))
        // both modules belong to the same course and instructor, yet lessons
        // only ever reorder against the siblings of their own module
        .step(
            Action::new("reorder_cross_module", "PATCH", "/api/v1/lessons/reorder")
                .with_dyn_body(|ctx| {
                    json!({
                        "lessons": [
                            { "id": ctx.get("les_a")["id"], "order_index": 0 },
                            { "id": ctx.get("les_b")["id"], "order_index": 1 },
                            { "id": ctx.get("les_x")["id"], "order_index": 2 },
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
async fn lesson_delete_takes_content_with_it() {
    let db = setup_test_db().await;
    let mut server = setup_server(&db).await;

    Flow::new()
        .step(signup_action("teacher_tom", "s3cret-pass"))
        .step(create_course_action("Rust in Depth", "course"))
        .step(create_module_action("course", "Basics", 0, "module"))
        .step(
            Action::new("create_lesson", "POST", "/api/v1/lessons/")
                .with_dyn_body(|ctx| {
                    json!({
                        "module_id": ctx.get("module")["id"],
                        "title": "Doomed Lesson",
                        "description": "",
                        "content": { "blocks": ["short-lived"] },
                    })
                })
                .with_expect(StatusCode::CREATED)
                .with_save_as("lesson"),
        )
        .step(
            Action::new("delete_lesson", "DELETE", "/").with_dyn_path(lesson_path("lesson")),
        )
        .step(
            Action::new("get_deleted_lesson", "GET", "/")
                .with_dyn_path(lesson_path("lesson"))
                .with_expect(StatusCode::NOT_FOUND),
        )
        .run(&mut server, db)
        .await;
}
