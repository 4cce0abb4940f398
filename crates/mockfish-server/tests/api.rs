#![allow(clippy::panic, clippy::unwrap_used, clippy::expect_used)]

mod common;

use axum::http::{Method, StatusCode};

use common::{admin, app, get, send};

#[tokio::test]
async fn public_entry_points_need_no_credentials() {
    let (app, _) = app();
    for uri in [
        "/health",
        "/redfish",
        "/redfish/v1",
        "/redfish/v1/",
        "/redfish/v1/odata",
        "/redfish/v1/SessionService",
    ] {
        let resp = send(&app, Method::GET, uri, &[], None).await;
        assert_eq!(resp.status, StatusCode::OK, "{uri}");
    }

    let resp = send(&app, Method::GET, "/redfish", &[], None).await;
    assert_eq!(resp.body["v1"], "/redfish/v1/");
}

#[tokio::test]
async fn metadata_is_xml() {
    let (app, _) = app();
    let resp = send(&app, Method::GET, "/redfish/v1/$metadata", &[], None).await;
    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.header("content-type").starts_with("application/xml"));
    assert!(resp.body.as_str().unwrap().contains("<edmx:Edmx"));
}

#[tokio::test]
async fn envelope_headers_on_every_response() {
    let (app, _) = app();
    for resp in [
        send(&app, Method::GET, "/redfish/v1/", &[], None).await,
        send(&app, Method::GET, "/redfish/v1/Systems", &[], None).await,
        get(&app, "/redfish/v1/Nope").await,
    ] {
        assert_eq!(resp.header("odata-version"), "4.0");
        assert_eq!(resp.header("cache-control"), "no-cache");
        assert_eq!(
            resp.header("link"),
            "</redfish/v1/$metadata>; rel=describedby"
        );
    }
}

#[tokio::test]
async fn protected_paths_require_credentials() {
    let (app, _) = app();
    let resp = send(&app, Method::GET, "/redfish/v1/Systems", &[], None).await;
    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        resp.header("www-authenticate"),
        r#"Basic realm="Redfish Service""#
    );
    assert_eq!(resp.body["error"]["code"], "Base.1.0.AuthenticationRequired");

    let wrong = common::basic("admin", "nope");
    let resp = send(
        &app,
        Method::GET,
        "/redfish/v1/Systems",
        &[("authorization", &wrong)],
        None,
    )
    .await;
    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);

    let resp = get(&app, "/redfish/v1/Systems").await;
    assert_eq!(resp.status, StatusCode::OK);
}

#[tokio::test]
async fn unknown_path_is_not_found() {
    let (app, _) = app();
    let resp = get(&app, "/redfish/v1/NoSuchService").await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
    assert_eq!(resp.body["error"]["code"], "Base.1.0.ResourceNotFound");

    let resp = get(&app, "/redfish/v1/Systems/42").await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unsupported_verb_names_the_method() {
    let (app, _) = app();
    let auth = admin();
    let resp = send(
        &app,
        Method::PATCH,
        "/redfish/v1/Systems/1",
        &[("authorization", &auth)],
        Some("{}"),
    )
    .await;
    assert_eq!(resp.status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(resp.header("allow"), "GET, HEAD");
    assert_eq!(resp.body["error"]["code"], "Base.1.0.MethodNotAllowed");
    assert!(
        resp.body["error"]["message"]
            .as_str()
            .unwrap()
            .contains("PATCH")
    );
}

#[tokio::test]
async fn head_mirrors_get_without_body() {
    let (app, _) = app();
    let auth = admin();
    let resp = send(
        &app,
        Method::HEAD,
        "/redfish/v1/Systems/1",
        &[("authorization", &auth)],
        None,
    )
    .await;
    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.headers.contains_key("etag"));
    assert!(resp.body.is_null());
}

#[tokio::test]
async fn etag_round_trip_yields_not_modified() {
    let (app, _) = app();
    let auth = admin();
    let first = get(&app, "/redfish/v1/Systems/1").await;
    assert_eq!(first.status, StatusCode::OK);
    let etag = first.header("etag").to_string();
    assert!(etag.starts_with('"') && etag.ends_with('"'));

    let again = get(&app, "/redfish/v1/Systems/1").await;
    assert_eq!(again.header("etag"), etag);

    let resp = send(
        &app,
        Method::GET,
        "/redfish/v1/Systems/1",
        &[("authorization", &auth), ("if-none-match", &etag)],
        None,
    )
    .await;
    assert_eq!(resp.status, StatusCode::NOT_MODIFIED);
    assert!(resp.body.is_null());
    assert_eq!(resp.header("etag"), etag);

    let weak = format!("\"other\", W/{etag}");
    let resp = send(
        &app,
        Method::GET,
        "/redfish/v1/Systems/1",
        &[("authorization", &auth), ("if-none-match", &weak)],
        None,
    )
    .await;
    assert_eq!(resp.status, StatusCode::NOT_MODIFIED);

    let resp = send(
        &app,
        Method::GET,
        "/redfish/v1/Systems/1",
        &[("authorization", &auth), ("if-none-match", "\"stale\"")],
        None,
    )
    .await;
    assert_eq!(resp.status, StatusCode::OK);
}

#[tokio::test]
async fn invalid_paging_is_rejected() {
    let (app, _) = app();
    for uri in [
        "/redfish/v1/Systems?$top=abc",
        "/redfish/v1/Systems?$top=-1",
        "/redfish/v1/Systems?$skip=",
        "/redfish/v1/Systems?$skip=1.5",
    ] {
        let resp = get(&app, uri).await;
        assert_eq!(resp.status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(resp.body["error"]["code"], "Base.1.0.QueryParameterError");
    }
}

#[tokio::test]
async fn paging_and_filtering() {
    let (app, _) = app();
    let resp = get(&app, "/redfish/v1/Systems?$top=0").await;
    assert_eq!(resp.body["Members"].as_array().unwrap().len(), 0);
    assert_eq!(resp.body["Members@odata.count"], 0);

    let resp = get(&app, "/redfish/v1/Systems?$skip=5").await;
    assert_eq!(resp.body["Members@odata.count"], 0);

    let resp = get(&app, "/redfish/v1/Systems?$filter=PowerState%20eq%20'On'").await;
    assert_eq!(resp.body["Members@odata.count"], 1);

    let resp = get(&app, "/redfish/v1/Systems?$filter=PowerState%20eq%20'Off'").await;
    assert_eq!(resp.body["Members@odata.count"], 0);

    let resp = get(&app, "/redfish/v1/AccountService/Roles?$top=2").await;
    assert_eq!(resp.body["Members"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn select_and_expand() {
    let (app, _) = app();
    let resp = get(&app, "/redfish/v1/Systems/1?$select=PowerState").await;
    assert_eq!(resp.body["PowerState"], "On");
    assert_eq!(resp.body["@odata.id"], "/redfish/v1/Systems/1");
    assert!(resp.body.get("BiosVersion").is_none());

    let resp = get(&app, "/redfish/v1/Systems/1?$select=Bogus").await;
    assert!(resp.body.get("BiosVersion").is_some());

    let resp = get(&app, "/redfish/v1/Systems/1?$expand=Chassis").await;
    let chassis = &resp.body["Links"]["Chassis"][0];
    assert_eq!(chassis["@odata.id"], "/redfish/v1/Chassis/1");
    assert!(chassis["ChassisType"].is_string());
}

#[tokio::test]
async fn accounts_roles_and_registries() {
    let (app, _) = app();
    let resp = get(&app, "/redfish/v1/AccountService/Accounts").await;
    assert_eq!(resp.body["Members@odata.count"], 2);

    let resp = get(&app, "/redfish/v1/AccountService/Accounts/operator").await;
    assert_eq!(resp.body["RoleId"], "Operator");
    assert!(resp.body.get("Password").is_none());

    let resp = get(&app, "/redfish/v1/AccountService/Accounts/nobody").await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);

    let resp = get(&app, "/redfish/v1/AccountService/Roles/ReadOnly").await;
    assert_eq!(resp.body["RoleId"], "ReadOnly");

    let resp = get(&app, "/redfish/v1/Registries/Base.1.0.0").await;
    assert_eq!(resp.status, StatusCode::OK);
    let resp = get(&app, "/redfish/v1/Registries/Base.1.0.0.json").await;
    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.body["Messages"].is_object());
}

#[tokio::test]
async fn oem_custom_action_echoes_request() {
    let (app, _) = app();
    let resp = common::post(
        &app,
        "/redfish/v1/Oem/Contoso/CustomAction",
        Some(r#"{"Action":"Blink","Parameters":{"Times":3}}"#),
    )
    .await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body["Action"], "Blink");
    assert_eq!(resp.body["Status"], "Success");
    assert_eq!(resp.body["Parameters"]["Times"], 3);
    assert!(resp.body["Timestamp"].is_string());

    let resp = get(&app, "/redfish/v1/Oem/Contoso/CustomAction").await;
    assert_eq!(resp.status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(resp.header("allow"), "POST");
}
