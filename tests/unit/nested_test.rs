use serde_json::json;
use upsql::nested::NestedAccessor;

#[test]
fn simple_access() {
    let doc = json!({"a": 1});
    assert_eq!(NestedAccessor::new(&doc).get("a").unwrap(), &json!(1));
}

#[test]
fn nested_access() {
    let doc = json!({"a": {"b": {"c": 1}}});
    assert_eq!(NestedAccessor::new(&doc).get("a.b.c").unwrap(), &json!(1));
}

#[test]
fn intermediate_objects_are_returned() {
    let doc = json!({"a": {"b": {"c": 1}}});
    assert_eq!(NestedAccessor::new(&doc).get("a.b").unwrap(), &json!({"c": 1}));
}

#[test]
fn bad_path_names_the_full_path() {
    let doc = json!({"a": {"b": {"c": 1}}});
    let err = NestedAccessor::new(&doc).get("a.x.c").unwrap_err();
    assert_eq!(err.path, "a.x.c");
    assert!(err.to_string().contains("missing a.x.c"), "Got: {}", err);
}

#[test]
fn descending_into_a_scalar_fails() {
    let doc = json!({"a": {"b": 5}});
    let err = NestedAccessor::new(&doc).get("a.b.c").unwrap_err();
    assert_eq!(err.path, "a.b.c");
}

#[test]
fn non_object_root_fails() {
    let doc = json!([{"a": 1}]);
    assert!(NestedAccessor::new(&doc).get("a").is_err());
}
