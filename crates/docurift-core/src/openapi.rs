//! The OpenAPI assembler: walks the endpoint registry and produces a full
//! OpenAPI 3.0 document.
//!
//! Path-prefix skipping, resource-name singularization, and automatic
//! description/tag generation are adapted from the same free functions the
//! teacher crate uses to describe operations recorded from test calls —
//! the path shapes involved (`/api/users/{id}`) are the same either way.

use std::sync::LazyLock;

use indexmap::IndexMap;
use regex::Regex;
use utoipa::openapi::path::{Parameter, ParameterBuilder, ParameterIn};
use utoipa::openapi::{
    Components, ComponentsBuilder, Content, HeaderBuilder, Info, InfoBuilder, ObjectBuilder,
    OpenApi, OpenApiBuilder, Operation, OperationBuilder, PathItem, Paths, RequestBody,
    RequestBodyBuilder, Required, ResponseBuilder, Responses, ResponsesBuilder, Schema, Type,
};

use crate::endpoint::{Endpoint, Registry};
use crate::error::DocuRiftError;
use crate::schema_store::SchemaStoreSnapshot;
use crate::synthesize::synthesize;
use crate::value::{JsonValue, ValueKind};

/// Matches a literal `{id}` or `{uuid}` path placeholder produced by
/// [`crate::url::normalize`].
static PLACEHOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{(id|uuid)\}").expect("a valid regex"));

/// Common API path prefixes skipped when generating operation metadata.
const SKIP_PATH_PREFIXES: &[&str] = &[
    "api", "v1", "v2", "v3", "rest", "service", "public", "internal",
];

const CANONICAL_QUERY_DESCRIPTIONS: &[(&str, &str)] = &[
    ("page", "The page number to retrieve"),
    ("page_size", "The number of items per page"),
    ("sort_by", "The field to sort results by"),
    ("order", "The sort order, e.g. asc or desc"),
    ("search", "A free-text search term"),
];

/// Assemble the full OpenAPI document from every endpoint currently in
/// `registry`.
pub async fn assemble(registry: &Registry) -> OpenApi {
    let mut paths_builder = Paths::builder();
    for endpoint in registry.endpoints().await {
        let (path, item) = build_path_item(&endpoint).await;
        paths_builder = paths_builder.path(path, item);
    }

    let info = build_info();
    let components = build_components();

    OpenApiBuilder::new()
        .info(info)
        .paths(paths_builder.build())
        .components(Some(components))
        .build()
}

/// Assemble the document and render it as the exact JSON shape §6 contracts
/// for `GET /api/openapi.json`.
///
/// `utoipa`'s own [`OpenApi`] always serializes its `openapi` field as the
/// latest OAS version it knows about; the spec calls for the literal string
/// `"3.0.0"` regardless, so that field is overwritten after serialization
/// rather than relied upon from the builder.
pub async fn assemble_document(registry: &Registry) -> Result<serde_json::Value, DocuRiftError> {
    let mut document =
        serde_json::to_value(assemble(registry).await).map_err(DocuRiftError::OpenApiSerialize)?;
    if let Some(object) = document.as_object_mut() {
        object.insert("openapi".to_owned(), serde_json::Value::String("3.0.0".to_owned()));
    }
    Ok(document)
}

fn build_info() -> Info {
    InfoBuilder::new()
        .title("API Documentation")
        .version("1.0.0")
        .build()
}

fn build_components() -> Components {
    ComponentsBuilder::new().build()
}

async fn build_path_item(endpoint: &Endpoint) -> (String, PathItem) {
    let operation = build_operation(endpoint).await;
    let mut item = PathItem::default();
    match endpoint.method.as_str() {
        "GET" => item.get = Some(operation),
        "POST" => item.post = Some(operation),
        "PUT" => item.put = Some(operation),
        "DELETE" => item.delete = Some(operation),
        "PATCH" => item.patch = Some(operation),
        "HEAD" => item.head = Some(operation),
        "OPTIONS" => item.options = Some(operation),
        _ => {}
    }
    (endpoint.url.clone(), item)
}

async fn build_operation(endpoint: &Endpoint) -> Operation {
    let mut parameters: Vec<Parameter> = path_parameters(&endpoint.url);
    parameters.extend(query_parameters(&endpoint.url_parameters.snapshot().await));
    parameters.extend(header_parameters(&endpoint.request_headers.snapshot().await));

    let description = generate_description(&endpoint.method, &endpoint.url);
    let tags = generate_tags(&endpoint.url);

    let mut builder = OperationBuilder::new()
        .parameters(Some(parameters))
        .description(description)
        .tags(tags);

    let payload_snapshot = endpoint.request_payload.snapshot().await;
    if !payload_snapshot.is_empty() {
        builder = builder.request_body(Some(build_request_body(&payload_snapshot)));
    }

    builder = builder.responses(build_responses(endpoint).await);

    builder.build()
}

fn build_request_body(payload: &SchemaStoreSnapshot) -> RequestBody {
    let schema = synthesize(payload);
    let content = Content::builder().schema(Some(schema)).build();
    RequestBodyBuilder::new()
        .content("application/json", content)
        .required(Some(Required::True))
        .build()
}

async fn build_responses(endpoint: &Endpoint) -> Responses {
    let mut builder = ResponsesBuilder::new();
    let statuses: Vec<u16> = endpoint
        .response_statuses
        .read()
        .await
        .keys()
        .copied()
        .collect();

    for status in statuses {
        let slot = endpoint.get_or_create_response_slot(status).await;
        let payload_snapshot = slot.payload.snapshot().await;
        let headers_snapshot = slot.headers.snapshot().await;

        let mut response_builder =
            ResponseBuilder::new().description(format!("Status {status}"));

        if !payload_snapshot.is_empty() {
            let schema = synthesize(&payload_snapshot);
            let content = Content::builder().schema(Some(schema)).build();
            response_builder = response_builder.content("application/json", content);
        }

        for path in headers_snapshot.examples.keys() {
            let schema = utoipa::openapi::RefOr::T(Schema::Object(
                ObjectBuilder::new().schema_type(Type::String).build(),
            ));
            let header = HeaderBuilder::new().schema(schema).build();
            response_builder = response_builder.header(path.clone(), header);
        }

        builder = builder.response(status.to_string(), response_builder.build());
    }

    builder.build()
}

fn path_parameters(path: &str) -> Vec<Parameter> {
    PLACEHOLDER_RE
        .captures_iter(path)
        .map(|captures| {
            let kind = &captures[1];
            let (name, schema) = if kind == "id" {
                ("id", ObjectBuilder::new().schema_type(Type::Integer))
            } else {
                ("uuid", ObjectBuilder::new().schema_type(Type::String))
            };
            ParameterBuilder::new()
                .name(name)
                .parameter_in(ParameterIn::Path)
                .required(Required::True)
                .schema(Some(utoipa::openapi::RefOr::T(Schema::Object(
                    schema.build(),
                ))))
                .build()
        })
        .collect()
}

fn query_parameters(store: &SchemaStoreSnapshot) -> Vec<Parameter> {
    store
        .examples
        .iter()
        .map(|(name, examples)| {
            let schema_type = examples.first().map_or(Type::String, |value| match value.kind() {
                ValueKind::Bool => Type::Boolean,
                ValueKind::Number => Type::Number,
                _ => Type::String,
            });
            let required = store.optional.get(name) == Some(&false);
            let description = CANONICAL_QUERY_DESCRIPTIONS
                .iter()
                .find(|(key, _)| key == name)
                .map(|(_, description)| (*description).to_owned())
                .unwrap_or_else(|| format!("The {name} query parameter"));

            ParameterBuilder::new()
                .name(name.clone())
                .parameter_in(ParameterIn::Query)
                .required(if required {
                    Required::True
                } else {
                    Required::False
                })
                .description(Some(description))
                .schema(Some(utoipa::openapi::RefOr::T(Schema::Object(
                    ObjectBuilder::new().schema_type(schema_type).build(),
                ))))
                .build()
        })
        .collect()
}

fn header_parameters(store: &SchemaStoreSnapshot) -> Vec<Parameter> {
    store
        .examples
        .keys()
        .map(|name| {
            let required = store.optional.get(name) == Some(&false);
            ParameterBuilder::new()
                .name(name.clone())
                .parameter_in(ParameterIn::Header)
                .required(if required {
                    Required::True
                } else {
                    Required::False
                })
                .schema(Some(utoipa::openapi::RefOr::T(Schema::Object(
                    ObjectBuilder::new().schema_type(Type::String).build(),
                ))))
                .build()
        })
        .collect()
}

fn generate_description(method: &str, path: &str) -> Option<String> {
    let path = path.trim_start_matches('/');
    let segments: Vec<&str> = path.split('/').collect();
    if segments.is_empty() || (segments.len() == 1 && segments[0].is_empty()) {
        return None;
    }

    let start_index = segments
        .iter()
        .take_while(|segment| SKIP_PATH_PREFIXES.contains(segment))
        .count();
    if start_index >= segments.len() {
        return None;
    }

    let resource = if segments.len() == start_index + 1 {
        segments[start_index]
    } else {
        let last_segment = segments.last()?;
        if last_segment.starts_with('{') && last_segment.ends_with('}') {
            segments[segments.len() - 2]
        } else {
            last_segment
        }
    };

    let has_id = segments
        .iter()
        .any(|segment| segment.starts_with('{') && segment.ends_with('}'));

    let action = match method {
        "GET" => {
            if has_id {
                format!("Retrieve {} by ID", singularize(resource))
            } else {
                format!("Retrieve {resource}")
            }
        }
        "POST" => format!("Create {}", singularize(resource)),
        "PUT" => {
            if has_id {
                format!("Update {} by ID", singularize(resource))
            } else {
                format!("Update {resource}")
            }
        }
        "PATCH" => {
            if has_id {
                format!("Partially update {} by ID", singularize(resource))
            } else {
                format!("Partially update {resource}")
            }
        }
        "DELETE" => {
            if has_id {
                format!("Delete {} by ID", singularize(resource))
            } else {
                format!("Delete {resource}")
            }
        }
        _ => return None,
    };
    Some(action)
}

fn generate_tags(path: &str) -> Option<Vec<String>> {
    let path = path.trim_start_matches('/');
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    if segments.is_empty() {
        return None;
    }

    let start_index = segments
        .iter()
        .take_while(|segment| SKIP_PATH_PREFIXES.contains(segment))
        .count();
    if start_index >= segments.len() {
        return None;
    }

    let mut tags = vec![segments[start_index].to_owned()];
    if segments.len() > start_index + 1 {
        let last_segment = segments[segments.len() - 1];
        if !last_segment.starts_with('{') && segments.len() == start_index + 2 {
            tags.push(last_segment.to_owned());
        }
    }
    Some(tags)
}

/// Singularize an English resource name, using `cruet` with manual
/// overrides for irregular plurals it does not handle.
fn singularize(word: &str) -> String {
    match word {
        "children" => return "child".to_owned(),
        "people" => return "person".to_owned(),
        "data" => return "datum".to_owned(),
        "feet" => return "foot".to_owned(),
        "teeth" => return "tooth".to_owned(),
        "geese" => return "goose".to_owned(),
        "men" => return "man".to_owned(),
        "women" => return "woman".to_owned(),
        _ => {}
    }

    use cruet::Inflector;
    let result = word.to_singular();
    if result.is_empty() && !word.is_empty() {
        word.to_owned()
    } else {
        result
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::redaction::RedactionList;

    #[test]
    fn generate_description_for_collection_get() {
        assert_eq!(
            generate_description("GET", "/api/users"),
            Some("Retrieve users".to_owned())
        );
    }

    #[test]
    fn generate_description_for_single_resource_get() {
        assert_eq!(
            generate_description("GET", "/api/users/{id}"),
            Some("Retrieve user by ID".to_owned())
        );
    }

    #[test]
    fn generate_tags_skips_api_prefix() {
        assert_eq!(generate_tags("/api/users/{id}"), Some(vec!["users".to_owned()]));
    }

    #[test]
    fn singularize_handles_irregular_plurals() {
        assert_eq!(singularize("children"), "child");
        assert_eq!(singularize("users"), "user");
    }

    #[test]
    fn path_parameters_recognizes_id_and_uuid_placeholders() {
        let params = path_parameters("/api/users/{id}/posts/{uuid}");
        assert_eq!(params.len(), 2);
        assert_eq!(params[0].name, "id");
        assert_eq!(params[1].name, "uuid");
    }

    #[tokio::test]
    async fn assemble_produces_a_path_entry_per_endpoint() {
        let registry = Registry::new();
        let redaction = Arc::new(RedactionList::default());
        let endpoint = registry.get_or_create("GET", "/api/users/{id}", &redaction, 10).await;
        endpoint
            .request_payload
            .add_value("name", JsonValue::String("n".into()))
            .await;
        let document = assemble(&registry).await;
        assert!(document.paths.paths.contains_key("/api/users/{id}"));
    }

    #[tokio::test]
    async fn assemble_document_reports_openapi_3_0_0() {
        let registry = Registry::new();
        let document = assemble_document(&registry).await.expect("should assemble");
        assert_eq!(document["openapi"], "3.0.0");
        assert_eq!(document["info"]["title"], "API Documentation");
        assert_eq!(document["info"]["version"], "1.0.0");
    }
}
