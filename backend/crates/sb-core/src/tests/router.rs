use crate::{HandlerArgs, HandlerResponse, Router};

use googletest::assert_that;
use googletest::prelude::{anything, eq, err, none, ok, some};
use http::{Method, StatusCode};

fn ok_handler(_args: HandlerArgs) -> HandlerResponse {
    HandlerResponse::text(StatusCode::OK, "ok")
}

#[test]
fn given_new_router_when_inspected_then_empty() {
    let router = Router::new();

    assert_that!(router.is_empty(), eq(true));
    assert_that!(router.routes().len(), eq(0));
}

#[test]
fn given_route_when_registered_then_introspection_lists_it() {
    // Given
    let mut router = Router::new();

    // When
    let result = router.register_route("/health", "GET", ok_handler);

    // Then
    assert_that!(result, ok(anything()));
    let routes = router.routes();
    assert_that!(routes.len(), eq(1));
    assert_that!(routes[0].path.as_str(), eq("/health"));
    assert_that!(routes[0].method, eq(&Method::GET));
}

#[test]
fn given_lowercase_method_when_registered_then_normalized() {
    let mut router = Router::new();

    router.register_route("/items", "post", ok_handler).unwrap();

    assert_that!(router.find("/items", &Method::POST), some(anything()));
}

#[test]
fn given_same_path_and_method_when_registered_twice_then_rejected() {
    // Given
    let mut router = Router::new();
    router.register_route("/health", "GET", ok_handler).unwrap();

    // When
    let result = router.register_route("/health", "get", ok_handler);

    // Then
    assert_that!(result, err(anything()));
    assert_that!(router.len(), eq(1));
}

#[test]
fn given_same_path_different_methods_when_registered_then_both_kept() {
    let mut router = Router::new();

    router.register_route("/items", "GET", ok_handler).unwrap();
    router.register_route("/items", "DELETE", ok_handler).unwrap();

    assert_that!(router.len(), eq(2));
}

#[test]
fn given_unsupported_method_when_registered_then_rejected() {
    let mut router = Router::new();

    let result = router.register_route("/items", "FETCH", ok_handler);

    assert_that!(result, err(anything()));
    assert_that!(router.is_empty(), eq(true));
}

#[test]
fn given_relative_path_when_registered_then_rejected() {
    let mut router = Router::new();

    let result = router.register_route("health", "GET", ok_handler);

    assert_that!(result, err(anything()));
}

#[test]
fn given_routes_in_any_order_when_introspected_then_sorted_by_path() {
    // Given
    let mut router = Router::new();
    router.register_route("/zeta", "GET", ok_handler).unwrap();
    router.register_route("/alpha", "GET", ok_handler).unwrap();

    // When
    let paths: Vec<String> = router.routes().into_iter().map(|r| r.path).collect();

    // Then
    assert_that!(paths, eq(&vec!["/alpha".to_string(), "/zeta".to_string()]));
}

#[test]
fn given_route_with_user_data_when_called_then_handler_sees_it() {
    // Given
    let mut router = Router::new();
    router
        .register_route_with_data(
            "/greet",
            "GET",
            |args: HandlerArgs| {
                let name = args.user_data::<String>().cloned().unwrap_or_default();
                HandlerResponse::text(StatusCode::OK, format!("hello {name}"))
            },
            "serverbox".to_string(),
        )
        .unwrap();

    // When
    let route = router.find("/greet", &Method::GET).unwrap();
    let response = route.call(HandlerArgs::new(Method::GET, "/greet"));

    // Then
    assert_that!(response.status, eq(StatusCode::OK));
    assert_that!(&response.body[..], eq(&b"hello serverbox"[..]));
}

#[test]
fn given_unregistered_path_when_find_then_none() {
    let mut router = Router::new();
    router.register_route("/health", "GET", ok_handler).unwrap();

    assert_that!(router.find("/health", &Method::POST), none());
    assert_that!(router.find("/missing", &Method::GET), none());
}

#[test]
fn given_path_with_two_methods_when_methods_for_then_both_listed() {
    let mut router = Router::new();
    router.register_route("/items", "GET", ok_handler).unwrap();
    router.register_route("/items", "PUT", ok_handler).unwrap();

    let methods = router.methods_for("/items");

    assert_that!(methods.len(), eq(2));
    assert_that!(router.methods_for("/other").is_empty(), eq(true));
}
