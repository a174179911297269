/// Task endpoint tests

mod common;

use axum::http::StatusCode;
use common::{TestContext, TestUser};
use serde_json::{json, Value};
use tasklane_shared::store::Store;

async fn create_task(ctx: &TestContext, user: &TestUser, project_id: i64, body: Value) -> Value {
    let (status, task) = ctx
        .post(&format!("/v1/projects/{}/tasks", project_id), &user.token, body)
        .await;
    assert_eq!(status, StatusCode::OK, "create task failed: {}", task);
    task
}

#[tokio::test]
async fn test_create_and_list_tasks() {
    let ctx = TestContext::new();
    let alice = ctx.register("Alice").await;
    let id = ctx.create_project(&alice, "Chores").await;

    let first = create_task(&ctx, &alice, id, json!({"body": "Dishes"})).await;
    let second = create_task(
        &ctx,
        &alice,
        id,
        json!({
            "body": "Laundry",
            "note": "Whites only",
            "notification_date": "2024-05-01T10:00:00Z",
            "is_completed": true
        }),
    )
    .await;

    assert_eq!(first["creator_id"], alice.id);
    assert_eq!(second["note"], "Whites only");
    assert_eq!(second["is_completed"], false);

    let (status, listing) = ctx
        .get(&format!("/v1/projects/{}/tasks", id), &alice.token)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listing["quantity"], 2);
    assert_eq!(listing["results"][0]["id"], first["id"]);
    assert_eq!(listing["results"][1]["id"], second["id"]);

    let project = ctx.store.find_project(id).await.unwrap().unwrap();
    assert_eq!(
        project.tasks_order,
        vec![first["id"].as_i64().unwrap(), second["id"].as_i64().unwrap()]
    );
}

#[tokio::test]
async fn test_outsiders_cannot_see_tasks() {
    let ctx = TestContext::new();
    let alice = ctx.register("Alice").await;
    let eve = ctx.register("Eve").await;
    let id = ctx.create_project(&alice, "Private").await;
    let task = create_task(&ctx, &alice, id, json!({"body": "Secret"})).await;

    let (status, _) = ctx
        .get(&format!("/v1/projects/{}/tasks", id), &eve.token)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = ctx
        .post(
            &format!("/v1/projects/{}/tasks", id),
            &eve.token,
            json!({"body": "Sneaky"}),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = ctx
        .put(
            &format!("/v1/tasks/{}", task["id"]),
            &eve.token,
            json!({"body": "Changed"}),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Task not found.");
}

#[tokio::test]
async fn test_completion_is_recorded() {
    let ctx = TestContext::new();
    let alice = ctx.register("Alice").await;
    let bob = ctx.register("Bob").await;
    let id = ctx.create_project(&alice, "Chores").await;
    ctx.add_collaborator(id, &bob).await;

    let task = create_task(&ctx, &alice, id, json!({"body": "Dishes"})).await;
    let uri = format!("/v1/tasks/{}", task["id"]);

    let (status, done) = ctx.put(&uri, &bob.token, json!({"is_completed": true})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(done["is_completed"], true);
    assert_eq!(done["completed_by_user_id"], bob.id);
    assert!(done["completion_date"].is_string());
    assert_eq!(done["body"], "Dishes");

    let (_, reopened) = ctx.put(&uri, &alice.token, json!({"is_completed": false})).await;
    assert_eq!(reopened["is_completed"], false);
    assert!(reopened["completed_by_user_id"].is_null());
    assert!(reopened["completion_date"].is_null());
}

#[tokio::test]
async fn test_update_clears_nullable_fields() {
    let ctx = TestContext::new();
    let alice = ctx.register("Alice").await;
    let id = ctx.create_project(&alice, "Chores").await;
    let task = create_task(&ctx, &alice, id, json!({"body": "Dishes", "note": "Soon"})).await;

    let (status, updated) = ctx
        .put(&format!("/v1/tasks/{}", task["id"]), &alice.token, json!({"note": null}))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert!(updated["note"].is_null());
    assert_eq!(updated["body"], "Dishes");
}

#[tokio::test]
async fn test_assignee_must_participate() {
    let ctx = TestContext::new();
    let alice = ctx.register("Alice").await;
    let bob = ctx.register("Bob").await;
    let eve = ctx.register("Eve").await;
    let id = ctx.create_project(&alice, "Chores").await;
    ctx.add_collaborator(id, &bob).await;

    let task = create_task(
        &ctx,
        &alice,
        id,
        json!({"body": "Dishes", "assigned_to_user_id": bob.id}),
    )
    .await;
    assert_eq!(task["assigned_to_user_id"], bob.id);

    let (status, body) = ctx
        .put(
            &format!("/v1/tasks/{}", task["id"]),
            &alice.token,
            json!({"assigned_to_user_id": eve.id}),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["details"][0]["field"], "assigned_to_user_id");
}

#[tokio::test]
async fn test_delete_rules() {
    let ctx = TestContext::new();
    let alice = ctx.register("Alice").await;
    let bob = ctx.register("Bob").await;
    let carol = ctx.register("Carol").await;
    let id = ctx.create_project(&alice, "Chores").await;
    ctx.add_collaborator(id, &bob).await;
    ctx.add_collaborator(id, &carol).await;

    let bobs = create_task(&ctx, &bob, id, json!({"body": "Bob's"})).await;
    let alices = create_task(&ctx, &alice, id, json!({"body": "Alice's"})).await;

    // Another collaborator may not delete
    let (status, body) = ctx
        .delete(&format!("/v1/tasks/{}", bobs["id"]), &carol.token, None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(
        body["message"],
        "You should be creator of the task or owner of the project."
    );

    // The owner may delete anyone's task
    let (status, _) = ctx
        .delete(&format!("/v1/tasks/{}", bobs["id"]), &alice.token, None)
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = ctx
        .delete(&format!("/v1/tasks/{}", alices["id"]), &bob.token, None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (_, listing) = ctx
        .get(&format!("/v1/projects/{}/tasks", id), &alice.token)
        .await;
    assert_eq!(listing["quantity"], 1);

    let project = ctx.store.find_project(id).await.unwrap().unwrap();
    assert_eq!(project.tasks_order, vec![alices["id"].as_i64().unwrap()]);

    // Gone for good
    let (status, _) = ctx
        .delete(&format!("/v1/tasks/{}", bobs["id"]), &alice.token, None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_tasks_of_deleted_project_are_hidden() {
    let ctx = TestContext::new();
    let alice = ctx.register("Alice").await;
    let id = ctx.create_project(&alice, "Chores").await;
    let task = create_task(&ctx, &alice, id, json!({"body": "Dishes"})).await;

    ctx.delete(&format!("/v1/projects/{}", id), &alice.token, None)
        .await;

    let (status, _) = ctx
        .get(&format!("/v1/projects/{}/tasks", id), &alice.token)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = ctx
        .put(&format!("/v1/tasks/{}", task["id"]), &alice.token, json!({"body": "x"}))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_task_validation() {
    let ctx = TestContext::new();
    let alice = ctx.register("Alice").await;
    let id = ctx.create_project(&alice, "Chores").await;

    let (status, body) = ctx
        .post(
            &format!("/v1/projects/{}/tasks", id),
            &alice.token,
            json!({"body": "", "notification_date": "next week"}),
        )
        .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["details"][0]["field"], "notification_date");
}
