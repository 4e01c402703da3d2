use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use swagger_from_routes::{
    handler::HttpMethod,
    manifest::Application,
    parser::{ManifestParser, ParsedManifest},
    scanner::ManifestScanner,
    serializer::{serialize_json, serialize_yaml},
    Error, SwaggerDocument,
};
use tempfile::TempDir;

/// Helper function to create a temporary manifest directory
fn create_test_project(files: Vec<(&str, &str)>) -> TempDir {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");

    for (path, content) in files {
        let file_path = temp_dir.path().join(path);
        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directories");
        }
        std::fs::write(&file_path, content).expect("Failed to write test file");
    }

    temp_dir
}

fn load_project(temp_dir: &TempDir) -> Vec<ParsedManifest> {
    let scan_result = ManifestScanner::new(temp_dir.path().to_path_buf())
        .scan()
        .expect("Failed to scan directory");
    ManifestParser::parse_files(&scan_result.manifest_files)
        .into_iter()
        .collect::<anyhow::Result<Vec<_>>>()
        .expect("Failed to parse manifests")
}

fn cigars_document() -> SwaggerDocument {
    let temp_dir = create_test_project(vec![("urls.yaml", include_str!("fixtures/cigars.yaml"))]);
    let manifests = load_project(&temp_dir);
    Application::from_manifests(&manifests)
        .expect("Failed to resolve manifests")
        .generate()
        .expect("Failed to generate document")
}

fn to_json(doc: &SwaggerDocument) -> Value {
    serde_json::from_str(&serialize_json(doc).unwrap()).unwrap()
}

#[test]
fn test_cigars_end_to_end_paths() {
    let doc = cigars_document();

    let paths: Vec<&str> = doc.paths.keys().map(String::as_str).collect();
    assert_eq!(
        paths,
        vec![
            "/api/cigars/",
            "/api/cigars/recent/",
            "/api/cigars/{pk}/",
            "/api/cigars/{pk}/set_price/",
            "/api/manufacturers/",
            "/api/manufacturers/{pk}/",
            "/api/custom/",
        ]
    );
}

#[test]
fn test_cigars_document_header() {
    let value = to_json(&cigars_document());

    assert_eq!(value["swagger"], "2.0");
    assert_eq!(value["info"]["title"], "Cigar Example API");
    assert_eq!(value["info"]["version"], "2.1");
    assert_eq!(value["info"]["contact"]["email"], "api@example.com");
    assert_eq!(value["basePath"], "/");
    assert_eq!(value["schemes"], json!(["https"]));
    assert!(value.get("host").is_none());
}

#[test]
fn test_cigars_methods_per_path() {
    let doc = cigars_document();
    let methods = |path: &str| -> Vec<HttpMethod> { doc.paths[path].keys().copied().collect() };

    assert_eq!(methods("/api/cigars/"), vec![HttpMethod::Get, HttpMethod::Post]);
    assert_eq!(
        methods("/api/cigars/{pk}/"),
        vec![HttpMethod::Get, HttpMethod::Put, HttpMethod::Patch, HttpMethod::Delete]
    );
    assert_eq!(methods("/api/cigars/{pk}/set_price/"), vec![HttpMethod::Post]);
    assert_eq!(methods("/api/cigars/recent/"), vec![HttpMethod::Get]);
    assert_eq!(methods("/api/manufacturers/"), vec![HttpMethod::Get]);
    assert_eq!(
        methods("/api/custom/"),
        vec![HttpMethod::Get, HttpMethod::Post, HttpMethod::Options]
    );
}

#[test]
fn test_cigars_list_operations() {
    let value = to_json(&cigars_document());
    let list = &value["paths"]["/api/cigars/"];

    assert_eq!(list["get"]["summary"], "Cigar List");
    assert_eq!(list["get"]["description"], "Cigar resource.");
    assert_eq!(list["get"]["tags"], json!(["cigars"]));
    assert_eq!(list["get"]["parameters"], json!([]));
    assert_eq!(
        list["get"]["responses"],
        json!({
            "200": {"description": "OK", "schema": {"$ref": "#/definitions/CigarSerializerRead"}},
            "404": {"description": "Not Found"}
        })
    );

    assert_eq!(
        list["post"]["parameters"],
        json!([{
            "in": "body",
            "name": "body",
            "required": true,
            "type": "object",
            "schema": {"$ref": "#/definitions/CigarSerializerWrite"}
        }])
    );
    assert_eq!(
        list["post"]["responses"]["201"]["schema"]["$ref"],
        "#/definitions/CigarSerializerRead"
    );
    assert!(list["post"]["responses"]["400"].get("schema").is_none());
}

#[test]
fn test_cigars_detail_and_custom_action() {
    let value = to_json(&cigars_document());

    let detail = &value["paths"]["/api/cigars/{pk}/"];
    assert_eq!(detail["get"]["summary"], "Cigar Instance");
    assert_eq!(
        detail["delete"]["parameters"],
        json!([{"in": "path", "name": "pk", "required": true, "type": "string"}])
    );
    assert_eq!(
        detail["delete"]["responses"],
        json!({"204": {"description": "No Content"}, "404": {"description": "Not Found"}})
    );

    let set_price = &value["paths"]["/api/cigars/{pk}/set_price/"]["post"];
    assert_eq!(set_price["summary"], "Cigar Set Price");
    assert_eq!(set_price["description"], "Set the price of a cigar.");
    let params: Vec<&str> = set_price["parameters"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["in"].as_str().unwrap())
        .collect();
    assert_eq!(params, vec!["path", "body"]);
}

#[test]
fn test_cigars_tags_follow_top_level_resource() {
    let doc = cigars_document();

    for (path, item) in &doc.paths {
        let expected = path.trim_matches('/').split('/').nth(1).unwrap().to_string();
        for operation in item.values() {
            assert_eq!(operation.tags, vec![expected.clone()], "tags of {}", path);
        }
    }
}

#[test]
fn test_cigars_overrides_replace_fields() {
    let value = to_json(&cigars_document());
    let custom = &value["paths"]["/api/custom/"];

    assert_eq!(custom["get"]["summary"], "My Custom");
    assert_eq!(custom["get"]["description"], "A custom view.");
    assert_eq!(custom["post"]["summary"], "Register a cigar");
    assert_eq!(custom["post"]["description"], "A custom view.");
    assert_eq!(custom["post"]["responses"], json!({"201": {"description": "Registered"}}));
    assert_eq!(custom["post"]["parameters"][0]["in"], "body");
}

#[test]
fn test_cigars_definitions() {
    let value = to_json(&cigars_document());
    let definitions = value["definitions"].as_object().unwrap();

    let keys: Vec<&String> = definitions.keys().collect();
    assert_eq!(
        keys,
        vec!["CigarSerializerRead", "CigarSerializerWrite", "ManufacturerSerializerRead"]
    );

    let read = &definitions["CigarSerializerRead"];
    assert_eq!(read["title"], "CigarSerializer");
    assert_eq!(read["description"], "A cigar.");
    assert_eq!(read["type"], "object");
    let read_fields: Vec<&String> = read["properties"].as_object().unwrap().keys().collect();
    assert_eq!(read_fields, vec!["id", "name", "colour", "gauge", "length"]);

    let write_fields: Vec<&String> = definitions["CigarSerializerWrite"]["properties"]
        .as_object()
        .unwrap()
        .keys()
        .collect();
    assert_eq!(write_fields, vec!["name", "colour", "gauge", "length", "price"]);

    let props = &read["properties"];
    assert_eq!(
        props["name"],
        json!({"description": "Cigar name", "type": "string", "maxLength": 25, "required": true})
    );
    assert_eq!(
        props["colour"],
        json!({"type": "string", "default": "b", "required": true, "enum": ["r", "b"]})
    );
    assert_eq!(
        props["gauge"],
        json!({"type": "integer", "minimum": 10, "maximum": 100, "required": true})
    );
    assert_eq!(props["length"], json!({"type": "number", "required": false}));
    assert_eq!(
        definitions["CigarSerializerWrite"]["properties"]["price"],
        json!({"type": "number", "required": true})
    );
}

#[test]
fn test_every_reference_resolves() {
    let value = to_json(&cigars_document());
    let definitions = value["definitions"].as_object().unwrap();

    fn collect_refs<'a>(value: &'a Value, refs: &mut Vec<&'a str>) {
        match value {
            Value::Object(map) => {
                if let Some(Value::String(reference)) = map.get("$ref") {
                    refs.push(reference);
                }
                map.values().for_each(|v| collect_refs(v, refs));
            }
            Value::Array(items) => items.iter().for_each(|v| collect_refs(v, refs)),
            _ => {}
        }
    }

    let mut refs = Vec::new();
    collect_refs(&value["paths"], &mut refs);
    assert!(!refs.is_empty());
    for reference in refs {
        let key = reference.strip_prefix("#/definitions/").unwrap();
        assert!(definitions.contains_key(key), "dangling {}", reference);
    }
}

#[test]
fn test_generation_is_deterministic() {
    let first = serialize_yaml(&cigars_document()).unwrap();
    let second = serialize_yaml(&cigars_document()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_multi_file_project() {
    let temp_dir = create_test_project(vec![
        ("settings.yaml", include_str!("fixtures/multi/settings.yaml")),
        ("store/serializers.json", include_str!("fixtures/multi/serializers.json")),
        ("store/urls.yaml", include_str!("fixtures/multi/urls.yaml")),
        ("target/stale.yaml", "views: ["),
    ]);

    let manifests = load_project(&temp_dir);
    assert_eq!(manifests.len(), 3);

    let doc = Application::from_manifests(&manifests).unwrap().generate().unwrap();
    let value = to_json(&doc);

    assert_eq!(value["info"]["title"], "Store API");
    assert_eq!(value["host"], "store.example.com");
    assert_eq!(value["produces"], json!(["application/json"]));

    let paths: Vec<&str> = doc.paths.keys().map(String::as_str).collect();
    assert_eq!(
        paths,
        vec!["/store/v1/orders/", "/store/v1/orders/{order_id}/", "/store/health/"]
    );

    let detail = &value["paths"]["/store/v1/orders/{order_id}/"]["put"];
    assert_eq!(detail["tags"], json!(["v1"]));
    assert_eq!(detail["parameters"][0]["name"], "order_id");
    assert_eq!(value["paths"]["/store/health/"]["get"]["tags"], json!(["health"]));

    let order = &value["definitions"]["OrderSerializerRead"]["properties"];
    assert_eq!(order["email"], json!({"type": "string", "format": "email", "required": true}));
    assert_eq!(order["placed"]["format"], "date-time");
    assert_eq!(order["notes"]["required"], false);
}

#[test]
fn test_duplicate_serializer_across_files() {
    let temp_dir = create_test_project(vec![
        ("a.yaml", "serializers:\n  OrderSerializer: {}\n"),
        ("b.yaml", "serializers:\n  OrderSerializer: {}\n"),
    ]);

    let err = Application::from_manifests(&load_project(&temp_dir)).unwrap_err();
    assert!(matches!(err, Error::DuplicateDefinition { kind: "serializer", .. }));
}

#[test]
fn test_invalid_override_fails_whole_document() {
    let manifest = r#"
views:
  PingView:
    kind: api_view
    overrides:
      get:
        schemes: [gopher]
urlpatterns:
  - {regex: ^ping/$, view: PingView}
"#;
    let temp_dir = create_test_project(vec![("urls.yaml", manifest)]);
    let app = Application::from_manifests(&load_project(&temp_dir)).unwrap();

    match app.generate() {
        Err(Error::Validation { location, .. }) => {
            assert_eq!(location, "paths./ping/.get.schemes");
        }
        other => panic!("expected a validation error, got {:?}", other),
    }
}

#[test]
fn test_empty_route_table() {
    let temp_dir = create_test_project(vec![("urls.yaml", "urlpatterns: []\n")]);
    let doc = Application::from_manifests(&load_project(&temp_dir))
        .unwrap()
        .generate()
        .unwrap();

    assert!(doc.paths.is_empty());
    assert!(doc.definitions.is_empty());
    assert_eq!(doc.info.title, "Generated API");
}
