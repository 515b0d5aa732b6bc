//! Integration tests for loading and assembling whole OpenAPI documents

use openapi_normalizer_common::{NormalizerError, OpenApiVersion};
use openapi_normalizer_parser::openapi::{OpenApiParser, RefOr};
use openapi_normalizer_parser::resolver::scan;
use openapi_normalizer_parser::{load_api, load_api_from_value, load_spec};
use serde_json::{json, Value};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

#[test]
fn test_parse_petstore() {
    let api = load_api(fixture("petstore.yaml")).unwrap();

    assert_eq!(api.openapi, OpenApiVersion::V3_0_2);
    assert_eq!(api.info.title, "Swagger Petstore");
    assert_eq!(api.info.extensions.get("x-audience"), Some(&json!("internal")));
    assert_eq!(api.paths.len(), 2);

    let list = api.paths["/pets"].get.as_ref().unwrap();
    assert_eq!(list.operation_id.as_deref(), Some("listPets"));

    // Parameter reference replaced by the component
    let limit = list.parameters.as_ref().unwrap()[0]
        .as_item()
        .expect("parameter is inlined");
    assert_eq!(limit.name, "limit");

    // Response reference replaced by the component
    let default = list.responses["default"]
        .as_item()
        .expect("response is inlined");
    assert_eq!(default.description, "unexpected error");

    let create = api.paths["/pets"].post.as_ref().unwrap();
    let body = create.request_body.as_ref().unwrap().as_item().unwrap();
    assert_eq!(body.required, Some(true));
}

#[test]
fn test_paths_hold_no_foreign_references() {
    let api = load_api(fixture("petstore.yaml")).unwrap();
    let document = api.to_clean_value(true).unwrap();

    let references = scan(&document).unwrap();
    assert_eq!(references, vec!["#/components/schemas/Category"]);
}

#[test]
fn test_nested_references_are_inlined() {
    let api = load_api(fixture("petstore.yaml")).unwrap();
    let document = api.to_clean_value(false).unwrap();

    let schema = &document["paths"]["/pets"]["get"]["responses"]["200"]["content"]
        ["application/json"]["schema"];
    assert_eq!(schema["type"], "array");
    assert_eq!(
        schema["items"]["allOf"][0]["properties"]["name"]["type"],
        "string"
    );
    assert_eq!(
        document["paths"]["/pets"]["get"]["responses"]["200"]["headers"]["x-next"]["schema"]
            ["type"],
        "string"
    );
}

#[test]
fn test_clean_output_omits_components_and_unset_fields() {
    let api = load_api(fixture("inventory.json")).unwrap();

    let document = api.to_clean_value(false).unwrap();
    assert!(document.get("components").is_none());
    assert_eq!(document["paths"]["/inventory"]["get"]["operationId"], "searchInventory");

    let response = &document["paths"]["/inventory"]["get"]["responses"]["200"];
    assert!(response.get("headers").is_none());
    assert!(response.get("links").is_none());

    let with_components = api.to_clean_value(true).unwrap();
    assert!(with_components["components"]["schemas"]["Manufacturer"].is_object());
}

#[test]
fn test_clean_json_is_reproducible() {
    let first = load_api(fixture("petstore.yaml"))
        .unwrap()
        .to_clean_json(true)
        .unwrap();
    let second = load_api(fixture("petstore.yaml"))
        .unwrap()
        .to_clean_json(true)
        .unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_raw_api_is_kept() {
    let raw = load_spec(fixture("inventory.json")).unwrap();
    let api = load_api_from_value(raw.clone()).unwrap();
    assert_eq!(api.raw_api(), &raw);

    let items = &api.raw_api()["paths"]["/inventory"]["get"]["responses"]["200"]["content"]
        ["application/json"]["schema"]["items"];
    assert_eq!(items["$ref"], "#/components/schemas/InventoryItem");
}

#[test]
fn test_missing_path_target_is_reported() {
    let raw = json!({
        "openapi": "3.0.1",
        "info": {"title": "Test API", "version": "1.0.0"},
        "paths": {
            "/pets": {
                "get": {
                    "responses": {
                        "200": {"$ref": "#/components/responses/Missing"}
                    }
                }
            }
        }
    });

    let err = load_api_from_value(raw).unwrap_err();
    assert!(matches!(err, NormalizerError::ReferenceNotFound(r) if r == "#/components/responses/Missing"));
}

#[test]
fn test_reference_into_wrong_category_is_rejected() {
    let raw = json!({
        "openapi": "3.0.1",
        "info": {"title": "Test API", "version": "1.0.0"},
        "paths": {
            "/pets": {
                "get": {
                    "responses": {
                        "200": {"$ref": "#/components/schemas/Pet"}
                    }
                }
            }
        },
        "components": {
            "schemas": {"Pet": {"type": "object"}}
        }
    });

    let err = load_api_from_value(raw).unwrap_err();
    assert!(matches!(err, NormalizerError::Validation { .. }), "{err}");
}

#[test]
fn test_invalid_status_code_is_rejected() {
    let raw = json!({
        "openapi": "3.0.3",
        "info": {"title": "Test API", "version": "1.0.0"},
        "paths": {
            "/pets": {"get": {"responses": {"700": {"description": "nope"}}}}
        }
    });

    let err = load_api_from_value(raw).unwrap_err();
    assert!(matches!(err, NormalizerError::Validation { .. }), "{err}");
}

#[test]
fn test_root_extensions() {
    let mut raw = json!({
        "openapi": "3.0.3",
        "info": {"title": "Test API", "version": "1.0.0"},
        "paths": {},
        "x-generator": "hand"
    });
    let api = load_api_from_value(raw.clone()).unwrap();
    assert_eq!(api.to_clean_value(false).unwrap()["x-generator"], "hand");

    raw["generator"] = Value::from("hand");
    assert!(matches!(
        load_api_from_value(raw),
        Err(NormalizerError::Validation { .. })
    ));
}

#[test]
fn test_callbacks_resolve_inside_operations() {
    let raw = json!({
        "openapi": "3.0.3",
        "info": {"title": "Webhooks", "version": "1.0.0"},
        "paths": {
            "/subscribe": {
                "post": {
                    "responses": {"201": {"description": "subscribed"}},
                    "callbacks": {
                        "onEvent": {"$ref": "#/components/callbacks/Event"}
                    }
                }
            }
        },
        "components": {
            "schemas": {
                "Event": {"type": "object", "properties": {"id": {"type": "string"}}}
            },
            "callbacks": {
                "Event": {
                    "{$request.body#/callbackUrl}": {
                        "post": {
                            "requestBody": {
                                "content": {
                                    "application/json": {
                                        "schema": {"$ref": "#/components/schemas/Event"}
                                    }
                                }
                            },
                            "responses": {"200": {"description": "received"}}
                        }
                    }
                }
            }
        }
    });

    let api = load_api_from_value(raw).unwrap();
    let operation = api.paths["/subscribe"].post.as_ref().unwrap();
    let callback = operation.callbacks.as_ref().unwrap()["onEvent"]
        .as_item()
        .expect("callback is inlined");
    let document = serde_json::to_value(callback).unwrap();
    assert_eq!(
        document["{$request.body#/callbackUrl}"]["post"]["requestBody"]["content"]
            ["application/json"]["schema"]["properties"]["id"]["type"],
        "string"
    );
}

#[test]
fn test_load_from_temporary_files() {
    let dir = TempDir::new().unwrap();

    let json_path = dir.path().join("api.json");
    fs::write(
        &json_path,
        r#"{"openapi": "3.0.0", "info": {"title": "From JSON", "version": "1"}, "paths": {}}"#,
    )
    .unwrap();
    assert_eq!(load_api(&json_path).unwrap().info.title, "From JSON");

    let yaml_path = dir.path().join("api.yml");
    fs::write(
        &yaml_path,
        "openapi: 3.0.0\ninfo:\n  title: From YAML\n  version: '1'\npaths: {}\n",
    )
    .unwrap();
    assert_eq!(load_api(&yaml_path).unwrap().info.title, "From YAML");

    let empty_path = dir.path().join("empty.yaml");
    fs::write(&empty_path, "").unwrap();
    assert!(matches!(
        load_api(&empty_path),
        Err(NormalizerError::Parse(m)) if m == "Api specification looks empty"
    ));

    assert!(matches!(
        load_api(dir.path().join("missing.yaml")),
        Err(NormalizerError::Io(_))
    ));
}

#[test]
fn test_version_override_accepts_undeclared_documents() {
    let parser = OpenApiParser::from_value(json!({
        "info": {"title": "Legacy", "version": "1"},
        "paths": {}
    }));
    assert!(parser.parse().is_err());

    let api = parser.with_version(OpenApiVersion::V3_0_0).parse().unwrap();
    assert_eq!(api.openapi, OpenApiVersion::V3_0_0);
}

#[test]
fn test_self_referencing_component_in_paths() {
    let raw = json!({
        "openapi": "3.0.2",
        "info": {"title": "Tree", "version": "1"},
        "paths": {
            "/tree": {
                "get": {
                    "responses": {
                        "200": {
                            "description": "the tree",
                            "content": {"application/json": {"schema": {"$ref": "#/components/schemas/Node"}}}
                        }
                    }
                }
            }
        },
        "components": {
            "schemas": {
                "Node": {
                    "type": "object",
                    "properties": {
                        "children": {"type": "array", "items": {"$ref": "#/components/schemas/Node"}}
                    }
                }
            }
        }
    });

    let api = load_api_from_value(raw).unwrap();
    let response = api.paths["/tree"].get.as_ref().unwrap().responses["200"]
        .as_item()
        .unwrap();
    let schema = response.content.as_ref().unwrap()["application/json"]
        .schema
        .as_ref()
        .unwrap();
    // Self-referencing components stay pointers wherever they are used
    assert_eq!(schema.as_reference(), Some("#/components/schemas/Node"));

    let components = api.components.as_ref().unwrap();
    let RefOr::Item(node) = &components.schemas.as_ref().unwrap()["Node"] else {
        panic!("expected the Node schema body");
    };
    let children = node.properties.as_ref().unwrap()["children"].as_item().unwrap();
    assert_eq!(
        children.items.as_deref().and_then(RefOr::as_reference),
        Some("#/components/schemas/Node")
    );
}

#[test]
fn test_external_reference_in_paths_is_rejected() {
    let raw = json!({
        "openapi": "3.0.2",
        "info": {"title": "Test API", "version": "1.0.0"},
        "paths": {
            "/pets": {
                "get": {
                    "responses": {
                        "200": {
                            "description": "ok",
                            "content": {"application/json": {"schema": {"$ref": "other.yaml#/components/schemas/Pet"}}}
                        }
                    }
                }
            }
        }
    });

    let err = load_api_from_value(raw).unwrap_err();
    assert!(matches!(err, NormalizerError::UnsupportedReferenceTarget(r) if r == "other.yaml#/components/schemas/Pet"));
}

#[test]
fn test_empty_sections_are_skipped() {
    let api = OpenApiParser::from_yaml(
        "openapi: 3.0.2\ninfo: {title: t, version: '1'}\npaths: {}\ncomponents:\n  schemas:\n",
    )
    .unwrap()
    .parse()
    .unwrap();
    assert!(api.components.unwrap().schemas.is_none());

    let api = OpenApiParser::from_yaml(
        "openapi: 3.0.2\ninfo: {title: t, version: '1'}\npaths: {}\ncomponents:\n",
    )
    .unwrap()
    .parse()
    .unwrap();
    assert!(api.components.is_none());
}
