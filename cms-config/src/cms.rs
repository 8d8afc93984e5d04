//! CMS configuration loading and validation
//!
//! The CMS reads one configuration file (YAML, TOML or JSON) declaring its
//! backend, where media lives and the content collections. The file is loaded
//! with the `config` crate into a JSON value and checked by
//! [`validate_config`], which reports every problem it finds, one per line.
//!
//! Paths in messages use dots for keys and brackets for indices, e.g.
//! `collections[0].fields[1].name is required`. Problems with the document
//! itself are reported against `config`. Unknown keys are allowed.

use config::{Config, ConfigError, File, FileFormat};
use serde_json::{Map, Value};
use std::path::Path;
use thiserror::Error;

/// Field names accepted as a folder collection's identifier by default.
pub const IDENTIFIER_FIELDS: &[&str] = &["title", "path"];

const ROOT: &str = "config";

/// Every problem found in a CMS configuration, in document order.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", .messages.join("\n"))]
pub struct ConfigValidationError {
    pub messages: Vec<String>,
}

#[derive(Debug, Error)]
pub enum CheckError {
    #[error("Failed to load CMS config: {0}")]
    Load(#[from] ConfigError),

    #[error(transparent)]
    Invalid(#[from] ConfigValidationError),
}

/// Load a CMS configuration file; the format follows the file extension.
pub fn load_cms_config(path: impl AsRef<Path>) -> Result<Value, ConfigError> {
    Config::builder()
        .add_source(File::from(path.as_ref()).required(true))
        .build()?
        .try_deserialize()
}

/// Load a CMS configuration held in memory.
pub fn parse_cms_config(source: &str, format: FileFormat) -> Result<Value, ConfigError> {
    Config::builder()
        .add_source(File::from_str(source, format))
        .build()?
        .try_deserialize()
}

/// Load and validate a CMS configuration file.
pub fn check_config_file(path: impl AsRef<Path>) -> Result<(), CheckError> {
    let config = load_cms_config(path)?;
    validate_config(&config)?;
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    String,
    Object,
    Array,
    Boolean,
}

impl Kind {
    fn accepts(self, value: &Value) -> bool {
        match self {
            Kind::String => value.is_string(),
            Kind::Object => value.is_object(),
            Kind::Array => value.is_array(),
            Kind::Boolean => value.is_boolean(),
        }
    }

    fn describe(self) -> &'static str {
        match self {
            Kind::String => "a string",
            Kind::Object => "an object",
            Kind::Array => "an array",
            Kind::Boolean => "a boolean",
        }
    }
}

fn key_path(parent: &str, key: &str) -> String {
    if parent == ROOT {
        key.to_string()
    } else {
        format!("{parent}.{key}")
    }
}

/// `'a'`, `'a' or 'b'`, `'a', 'b' or 'c'`.
fn subjects(keys: &[&str], conjunction: &str) -> String {
    let quoted: Vec<String> = keys.iter().map(|k| format!("'{k}'")).collect();
    match quoted.split_last() {
        Some((last, [])) => last.clone(),
        Some((last, rest)) => format!("{} {conjunction} {last}", rest.join(", ")),
        None => String::new(),
    }
}

#[derive(Default)]
struct Validator {
    messages: Vec<String>,
}

impl Validator {
    fn report(&mut self, message: String) {
        self.messages.push(message);
    }

    fn check_kind<'v>(&mut self, path: &str, value: &'v Value, kind: Kind) -> Option<&'v Value> {
        if kind.accepts(value) {
            Some(value)
        } else {
            self.report(format!("{path} must be {}", kind.describe()));
            None
        }
    }

    fn required<'v>(
        &mut self,
        object: &'v Map<String, Value>,
        parent: &str,
        key: &str,
        kind: Kind,
    ) -> Option<&'v Value> {
        let path = key_path(parent, key);
        match object.get(key) {
            Some(value) => self.check_kind(&path, value, kind),
            None => {
                self.report(format!("{path} is required"));
                None
            }
        }
    }

    fn optional<'v>(
        &mut self,
        object: &'v Map<String, Value>,
        parent: &str,
        key: &str,
        kind: Kind,
    ) -> Option<&'v Value> {
        let value = object.get(key)?;
        self.check_kind(&key_path(parent, key), value, kind)
    }

    fn non_empty<'v>(&mut self, path: &str, items: &'v [Value]) -> Option<&'v [Value]> {
        if items.is_empty() {
            self.report(format!("{path} cannot be empty"));
            None
        } else {
            Some(items)
        }
    }

    /// Exactly one of `keys` must be present.
    fn exactly_one(&mut self, object: &Map<String, Value>, path: &str, keys: [&str; 2]) {
        let present: Vec<&str> = keys.into_iter().filter(|k| object.contains_key(*k)).collect();
        match present.len() {
            0 => self.report(format!("{path} must have {} defined", subjects(&keys, "or"))),
            1 => {}
            _ => self.report(format!(
                "{path} cannot have both {} defined",
                subjects(&keys, "and")
            )),
        }
    }

    fn root(&mut self, config: &Value) {
        let Some(config) = config.as_object() else {
            self.report(format!("{ROOT} must be an object"));
            return;
        };

        if let Some(Value::Object(backend)) = self.required(config, ROOT, "backend", Kind::Object) {
            self.required(backend, "backend", "name", Kind::String);
        }

        self.optional(config, ROOT, "media_folder", Kind::String);
        if let Some(Value::Object(library)) =
            self.optional(config, ROOT, "media_library", Kind::Object)
        {
            self.required(library, "media_library", "name", Kind::String);
        }
        if !config.contains_key("media_folder") && !config.contains_key("media_library") {
            self.report(format!(
                "{ROOT} must have {} defined",
                subjects(&["media_folder", "media_library"], "or")
            ));
        }

        if let Some(Value::Array(collections)) =
            self.required(config, ROOT, "collections", Kind::Array)
        {
            if let Some(collections) = self.non_empty("collections", collections) {
                for (i, collection) in collections.iter().enumerate() {
                    self.collection(&format!("collections[{i}]"), collection);
                }
            }
        }
    }

    fn collection(&mut self, path: &str, collection: &Value) {
        let Some(Value::Object(collection)) = self.check_kind(path, collection, Kind::Object) else {
            return;
        };

        self.required(collection, path, "name", Kind::String);
        self.required(collection, path, "label", Kind::String);
        let folder = self.optional(collection, path, "folder", Kind::String);
        self.optional(collection, path, "file", Kind::String);
        self.exactly_one(collection, path, ["folder", "file"]);

        let fields_path = key_path(path, "fields");
        let Some(Value::Array(fields)) = self.required(collection, path, "fields", Kind::Array) else {
            return;
        };
        let Some(fields) = self.non_empty(&fields_path, fields) else {
            return;
        };
        let mut names = Vec::new();
        for (i, field) in fields.iter().enumerate() {
            if let Some(name) = self.field(&format!("{fields_path}[{i}]"), field) {
                names.push(name);
            }
        }

        if folder.is_some() && collection.get("file").is_none() {
            let custom = collection.get("identifier_field").and_then(Value::as_str);
            let identifiers: Vec<&str> = match custom {
                Some(custom) => vec![custom],
                None => IDENTIFIER_FIELDS.to_vec(),
            };
            if !names.iter().any(|name| identifiers.contains(name)) {
                self.report(format!(
                    "{fields_path} must have {} defined",
                    subjects(&identifiers, "or")
                ));
            }
        }
    }

    /// Validates a field and returns its name when it has a usable one.
    fn field<'v>(&mut self, path: &str, field: &'v Value) -> Option<&'v str> {
        let Some(Value::Object(field)) = self.check_kind(path, field, Kind::Object) else {
            return None;
        };
        let name = self
            .required(field, path, "name", Kind::String)
            .and_then(Value::as_str);
        self.optional(field, path, "label", Kind::String);
        self.optional(field, path, "widget", Kind::String);
        self.optional(field, path, "required", Kind::Boolean);
        name
    }
}

/// Check a CMS configuration, collecting every problem.
pub fn validate_config(config: &Value) -> Result<(), ConfigValidationError> {
    let mut validator = Validator::default();
    validator.root(config);
    if validator.messages.is_empty() {
        Ok(())
    } else {
        Err(ConfigValidationError {
            messages: validator.messages,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid() -> Value {
        json!({
            "backend": { "name": "git-gateway" },
            "media_folder": "static/img",
            "collections": [{
                "name": "posts",
                "label": "Posts",
                "folder": "content/posts",
                "fields": [{ "name": "title" }],
            }],
        })
    }

    fn with(key: &str, value: Value) -> Value {
        let mut config = valid();
        config[key] = value;
        config
    }

    fn without(key: &str) -> Value {
        let mut config = valid();
        if let Value::Object(map) = &mut config {
            map.remove(key);
        }
        config
    }

    fn collection(value: Value) -> Value {
        with("collections", json!([value]))
    }

    fn message(config: &Value) -> String {
        validate_config(config).unwrap_err().to_string()
    }

    #[test]
    fn accepts_valid_config() {
        assert_eq!(validate_config(&valid()), Ok(()));
    }

    #[test]
    fn ignores_unknown_keys() {
        let mut config = with("foo", json!({ "bar": "baz" }));
        config["backend"]["branch"] = json!("main");
        assert_eq!(validate_config(&config), Ok(()));
    }

    #[test]
    fn reports_backend_problems() {
        assert_eq!(message(&without("backend")), "backend is required");
        assert_eq!(message(&with("backend", json!({}))), "backend.name is required");
        assert_eq!(
            message(&with("backend", json!({ "name": {} }))),
            "backend.name must be a string"
        );
    }

    #[test]
    fn reports_media_problems() {
        assert_eq!(
            message(&without("media_folder")),
            "config must have 'media_folder' or 'media_library' defined"
        );
        assert_eq!(message(&with("media_folder", json!({}))), "media_folder must be a string");

        let mut library = without("media_folder");
        library["media_library"] = json!("bar");
        assert_eq!(message(&library), "media_library must be an object");
        library["media_library"] = json!({});
        assert_eq!(message(&library), "media_library.name is required");
        library["media_library"] = json!({ "name": "uploadcare" });
        assert_eq!(validate_config(&library), Ok(()));
    }

    #[test]
    fn reports_collection_list_problems() {
        assert_eq!(message(&without("collections")), "collections is required");
        assert_eq!(message(&with("collections", json!({}))), "collections must be an array");
        assert_eq!(message(&with("collections", json!([]))), "collections cannot be empty");
        assert_eq!(
            message(&with("collections", json!([null]))),
            "collections[0] must be an object"
        );
    }

    #[test]
    fn reports_collection_problems() {
        assert_eq!(
            message(&collection(json!({ "label": "Foo", "file": "bar", "fields": [{ "name": "title" }] }))),
            "collections[0].name is required"
        );
        assert_eq!(
            message(&collection(json!({ "name": "foo", "label": "Foo", "fields": [{ "name": "title" }] }))),
            "collections[0] must have 'folder' or 'file' defined"
        );
        assert_eq!(
            message(&collection(json!({
                "name": "foo", "label": "Foo", "folder": "bar", "file": "baz",
                "fields": [{ "name": "title" }],
            }))),
            "collections[0] cannot have both 'folder' and 'file' defined"
        );
        assert_eq!(
            message(&collection(json!({ "name": "foo", "label": "Foo", "file": {}, "fields": [{ "name": "title" }] }))),
            "collections[0].file must be a string"
        );
        assert_eq!(
            message(&collection(json!({ "name": "foo", "label": "Foo", "file": "bar", "fields": [] }))),
            "collections[0].fields cannot be empty"
        );
    }

    #[test]
    fn reports_field_problems() {
        let fields = |fields: Value| {
            collection(json!({ "name": "foo", "label": "Foo", "file": "bar", "fields": fields }))
        };
        assert_eq!(
            message(&fields(json!([null]))),
            "collections[0].fields[0] must be an object"
        );
        assert_eq!(
            message(&fields(json!([{ "label": "Title" }]))),
            "collections[0].fields[0].name is required"
        );
        for (key, kind) in [("label", "a string"), ("widget", "a string"), ("required", "a boolean")] {
            let mut field = json!({ "name": "title" });
            field[key] = json!({});
            assert_eq!(
                message(&fields(json!([field]))),
                format!("collections[0].fields[0].{key} must be {kind}")
            );
        }
    }

    #[test]
    fn folder_collections_need_an_identifier() {
        let folder = |extra: Value| {
            let mut c = json!({ "name": "foo", "label": "Foo", "folder": "bar", "fields": [{ "name": "body" }] });
            if let (Value::Object(c), Value::Object(extra)) = (&mut c, extra) {
                c.extend(extra);
            }
            collection(c)
        };
        assert_eq!(
            message(&folder(json!({}))),
            "collections[0].fields must have 'title' or 'path' defined"
        );
        assert_eq!(
            validate_config(&folder(json!({ "identifier_field": "body" }))),
            Ok(())
        );
    }

    #[test]
    fn collects_every_problem_in_order() {
        let config = json!({
            "collections": [{ "name": "foo", "folder": "bar", "fields": [{ "name": "title" }] }],
        });
        assert_eq!(
            validate_config(&config).unwrap_err().messages,
            vec![
                "backend is required",
                "config must have 'media_folder' or 'media_library' defined",
                "collections[0].label is required",
            ]
        );
    }

    #[test]
    fn loads_yaml_and_json() {
        let yaml = "backend:\n  name: github\nmedia_folder: img\ncollections:\n  - name: pages\n    label: Pages\n    file: pages/about.md\n    fields:\n      - name: title\n";
        let config = parse_cms_config(yaml, FileFormat::Yaml).unwrap();
        assert_eq!(validate_config(&config), Ok(()));

        let json = r#"{ "backend": { "name": "github" }, "collections": [] }"#;
        let config = parse_cms_config(json, FileFormat::Json).unwrap();
        assert_eq!(
            message(&config),
            "config must have 'media_folder' or 'media_library' defined\ncollections cannot be empty"
        );
    }
}
