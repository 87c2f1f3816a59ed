//! End-to-end generation over a small petstore document, exercising the
//! public API the way an embedding renderer would.

use oas3_gogen::{Generator, GeneratorConfig};

const PETSTORE: &str = r##"{
  "openapi": "3.1.0",
  "info": {
    "title": "Petstore",
    "version": "1.0.0"
  },
  "paths": {
    "/pets": {
      "get": {
        "operationId": "listPets",
        "parameters": [
          {
            "name": "limit",
            "in": "query",
            "schema": { "type": "integer", "format": "int32", "maximum": 100 }
          }
        ],
        "responses": {
          "200": {
            "description": "A paged array of pets",
            "content": {
              "application/json": {
                "schema": { "type": "array", "items": { "$ref": "#/components/schemas/Pet" } }
              }
            }
          },
          "default": {
            "description": "unexpected error",
            "content": {
              "application/json": {
                "schema": { "$ref": "#/components/schemas/Error" }
              }
            }
          }
        }
      },
      "post": {
        "operationId": "createPet",
        "requestBody": {
          "content": {
            "application/json": {
              "schema": { "$ref": "#/components/schemas/Pet" }
            }
          }
        },
        "responses": {
          "201": {
            "description": "created",
            "content": {
              "application/json": {
                "schema": { "$ref": "#/components/schemas/Pet" }
              }
            }
          }
        }
      }
    },
    "/pets/{petId}": {
      "get": {
        "operationId": "getPet",
        "parameters": [
          {
            "name": "petId",
            "in": "path",
            "required": true,
            "schema": { "type": "string" }
          }
        ],
        "responses": {
          "200": {
            "description": "a pet",
            "content": {
              "application/json": {
                "schema": { "$ref": "#/components/schemas/Pet" }
              }
            }
          },
          "404": {
            "description": "not found",
            "content": {
              "application/json": {
                "schema": { "$ref": "#/components/schemas/Error" }
              }
            }
          }
        }
      }
    }
  },
  "components": {
    "schemas": {
      "Pet": {
        "type": "object",
        "required": ["id", "name"],
        "properties": {
          "id": { "type": "integer", "format": "int64" },
          "name": { "type": "string", "minLength": 1 },
          "status": { "type": "string", "enum": ["available", "pending", "sold"] },
          "tags": { "type": "array", "items": { "$ref": "#/components/schemas/Tag" } }
        }
      },
      "Tag": {
        "type": "object",
        "properties": {
          "name": { "type": "string" }
        }
      },
      "Error": {
        "type": "object",
        "required": ["code", "message"],
        "properties": {
          "code": { "type": "integer", "format": "int32" },
          "message": { "type": "string" }
        }
      }
    }
  }
}"##;

fn parse() -> oas3::Spec {
  oas3::from_json(PETSTORE).expect("petstore document should parse")
}

#[test]
fn test_petstore_generates_all_groups() {
  let spec = parse();
  let (output, stats) = Generator::new(GeneratorConfig::default())
    .generate(&spec)
    .expect("generation should succeed");

  let schema_names: Vec<_> = output.schema_types.iter().map(|def| def.name.as_str()).collect();
  assert!(schema_names.contains(&"Pet"));
  assert!(schema_names.contains(&"Tag"));
  assert!(schema_names.contains(&"Error"));
  // The inline status enum is hoisted next to its owner.
  assert!(schema_names.contains(&"PetStatus"));

  assert_eq!(output.operations.len(), 3);
  assert_eq!(stats.operations_converted, 3);
  assert_eq!(stats.cycles_detected, 0);

  let list_pets = output
    .operations
    .iter()
    .find(|op| op.operation_id == "listPets")
    .expect("listPets should convert");
  assert_eq!(list_pets.method, "GET");
  assert_eq!(list_pets.params_type.as_deref(), Some("ListPetsParams"));
  // The array-of-Pet payload gets its own named response type.
  assert_eq!(
    list_pets.responses.get("200").map(String::as_str),
    Some("ListPetsResponse200")
  );
  assert_eq!(list_pets.responses.get("default").map(String::as_str), Some("Error"));

  let create_pet = output
    .operations
    .iter()
    .find(|op| op.operation_id == "createPet")
    .expect("createPet should convert");
  assert_eq!(create_pet.request_body_type.as_deref(), Some("Pet"));
}

#[test]
fn test_petstore_error_responses_mark_error_types() {
  let spec = parse();
  let (output, _) = Generator::new(GeneratorConfig::default())
    .generate(&spec)
    .expect("generation should succeed");

  // Both the 404 and the default response resolve to the Error component.
  assert_eq!(output.error_types, vec!["Error".to_string()]);
}

#[test]
fn test_petstore_pet_struct_shape() {
  let spec = parse();
  let (output, _) = Generator::new(GeneratorConfig::default())
    .generate(&spec)
    .expect("generation should succeed");

  let pet = output
    .schema_types
    .iter()
    .find(|def| def.name == "Pet")
    .expect("Pet should be generated");

  let field = |name: &str| {
    pet
      .schema
      .properties
      .iter()
      .find(|p| p.json_name == name)
      .unwrap_or_else(|| panic!("Pet should have a '{name}' property"))
  };

  assert_eq!(field("id").schema.type_decl(), "int64");
  assert!(field("id").constraints.required);
  assert_eq!(
    field("name").constraints.tokens,
    vec!["required".to_string(), "min=1".to_string()]
  );
  assert_eq!(field("status").schema.type_decl(), "PetStatus");
  assert_eq!(field("tags").schema.type_decl(), "[]Tag");
  assert!(!field("tags").uses_pointer(), "slices are already nillable");
}

#[test]
fn test_petstore_output_serializes_to_json() {
  let spec = parse();
  let (output, stats) = Generator::new(GeneratorConfig::default())
    .generate(&spec)
    .expect("generation should succeed");

  let payload = serde_json::to_value(&output).expect("output should serialize");
  assert!(payload["schema_types"].is_array());
  let report = serde_json::to_value(&stats).expect("stats should serialize");
  assert_eq!(report["operations_converted"], 3);
}

#[test]
fn test_petstore_generation_is_repeatable() {
  let spec = parse();
  let generator = Generator::new(GeneratorConfig::default());
  let (first, _) = generator.generate(&spec).expect("first run");
  let (second, _) = generator.generate(&spec).expect("second run");
  assert_eq!(first, second);
}
