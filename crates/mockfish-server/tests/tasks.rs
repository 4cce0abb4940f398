#![allow(clippy::panic, clippy::unwrap_used, clippy::expect_used)]

mod common;

use axum::http::StatusCode;

use common::{app, get, post, wait_for_task_state};

const SYSTEM_RESET: &str = "/redfish/v1/Systems/1/Actions/ComputerSystem.Reset";
const MANAGER_RESET: &str = "/redfish/v1/Managers/1/Actions/Manager.Reset";

#[tokio::test]
async fn reset_runs_as_a_task() {
    let (app, _) = app();
    let resp = post(&app, SYSTEM_RESET, None).await;
    assert_eq!(resp.status, StatusCode::ACCEPTED);

    let location = resp.header("location").to_string();
    assert!(location.starts_with("/redfish/v1/TaskService/Tasks/"));
    assert_eq!(resp.body["@odata.id"], location);

    let task = wait_for_task_state(&app, &location, "Completed").await;
    assert_eq!(task["PercentComplete"], 100);
    assert_eq!(task["TaskStatus"], "OK");
    assert!(task["EndTime"].is_string());
    assert_eq!(
        task["Messages"][0]["Message"],
        "Computer system 1 reset (On) completed successfully"
    );
    assert_eq!(task["Payload"]["TargetUri"], SYSTEM_RESET);
    assert_eq!(task["Payload"]["HttpOperation"], "POST");
}

#[tokio::test]
async fn reset_type_is_carried_through() {
    let (app, _) = app();
    let resp = post(&app, SYSTEM_RESET, Some(r#"{"ResetType":"ForceRestart"}"#)).await;
    assert_eq!(resp.status, StatusCode::ACCEPTED);
    let task = wait_for_task_state(&app, resp.header("location"), "Completed").await;
    assert_eq!(
        task["Messages"][0]["Message"],
        "Computer system 1 reset (ForceRestart) completed successfully"
    );
}

#[tokio::test]
async fn invalid_reset_type_creates_no_task() {
    let (app, state) = app();
    let resp = post(&app, SYSTEM_RESET, Some(r#"{"ResetType":"Explode"}"#)).await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.body["error"]["code"], "Base.1.0.InvalidParameter");
    assert!(
        resp.body["error"]["message"]
            .as_str()
            .unwrap()
            .contains("Explode")
    );

    let resp = post(&app, SYSTEM_RESET, Some(r#"{"ResetType":7}"#)).await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);

    let resp = post(&app, SYSTEM_RESET, Some("{oops")).await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.body["error"]["code"], "Base.1.0.MalformedRequestBody");

    assert!(state.tasks.list().await.is_empty());
}

#[tokio::test]
async fn unknown_action_or_resource() {
    let (app, _) = app();
    let resp = post(&app, "/redfish/v1/Systems/1/Actions/ComputerSystem.Explode", None).await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.body["error"]["code"], "Base.1.0.ActionNotSupported");

    let resp = post(&app, "/redfish/v1/Chassis/1/Actions/Chassis.Reset", None).await;
    assert_eq!(resp.body["error"]["code"], "Base.1.0.ActionNotSupported");

    let resp = post(&app, "/redfish/v1/Systems/9/Actions/ComputerSystem.Reset", None).await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn action_info_describes_parameters() {
    let (app, _) = app();
    let resp = get(&app, SYSTEM_RESET).await;
    assert_eq!(resp.status, StatusCode::OK);
    let param = &resp.body["Parameters"][0];
    assert_eq!(param["Name"], "ResetType");
    assert!(
        param["AllowableValues"]
            .as_array()
            .unwrap()
            .iter()
            .any(|v| v == "ForceRestart")
    );

    let system = get(&app, "/redfish/v1/Systems/1").await;
    assert_eq!(
        system.body["Actions"]["#ComputerSystem.Reset"]["target"],
        SYSTEM_RESET
    );
}

#[tokio::test]
async fn manager_reset() {
    let (app, _) = app();
    let resp = post(&app, MANAGER_RESET, None).await;
    assert_eq!(resp.status, StatusCode::ACCEPTED);
    let task = wait_for_task_state(&app, resp.header("location"), "Completed").await;
    assert_eq!(
        task["Messages"][0]["Message"],
        "Manager 1 reset (GracefulRestart) completed successfully"
    );

    let resp = post(&app, MANAGER_RESET, Some(r#"{"ResetType":"On"}"#)).await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn client_created_task() {
    let (app, _) = app();
    let resp = post(&app, "/redfish/v1/TaskService/Tasks", Some(r#"{"Note":"x"}"#)).await;
    assert_eq!(resp.status, StatusCode::CREATED);
    let location = resp.header("location").to_string();
    assert_eq!(resp.body["@odata.id"], location);
    assert_eq!(resp.body["TaskState"], "New");

    wait_for_task_state(&app, &location, "Completed").await;

    let resp = get(&app, "/redfish/v1/TaskService/Tasks").await;
    assert_eq!(resp.body["Members@odata.count"], 1);
}

#[tokio::test]
async fn task_deletion() {
    let (app, _) = app();
    let resp = post(&app, SYSTEM_RESET, None).await;
    let location = resp.header("location").to_string();

    let resp = common::send(
        &app,
        axum::http::Method::DELETE,
        &location,
        &[("authorization", &common::admin())],
        None,
    )
    .await;
    assert_eq!(resp.status, StatusCode::NO_CONTENT);

    let resp = get(&app, &location).await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);

    let resp = common::send(
        &app,
        axum::http::Method::DELETE,
        &location,
        &[("authorization", &common::admin())],
        None,
    )
    .await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn task_service_document() {
    let (app, _) = app();
    let resp = get(&app, "/redfish/v1/TaskService").await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body["Tasks"]["@odata.id"], "/redfish/v1/TaskService/Tasks");
}
