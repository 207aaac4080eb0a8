//! Predicate resolution over the fixture schemas.

use crate::load_schema;

#[test]
fn test_every_declared_field_has_a_predicate() {
    for fixture in ["blog.yaml", "starwars.yaml"] {
        let schema = load_schema(fixture);
        for def in schema.declared_types() {
            for field in &def.fields {
                assert!(
                    schema.predicates().resolve(&def.name, &field.name).is_some(),
                    "{}.{} has no predicate in {}",
                    def.name,
                    field.name,
                    fixture
                );
            }
        }
    }
}

#[test]
fn test_interface_fields_resolve_uniformly() {
    let schema = load_schema("starwars.yaml");
    let predicates = schema.predicates();

    for field in ["name", "appearsIn", "id"] {
        let via_interface = predicates.resolve("Character", field);
        assert_eq!(predicates.resolve("Human", field), via_interface);
        assert_eq!(predicates.resolve("Droid", field), via_interface);
    }
    assert_eq!(
        predicates.resolve("Human", "appearsIn"),
        Some("performance.character.appearsIn")
    );
}

#[test]
fn test_renames() {
    let schema = load_schema("starwars.yaml");
    let predicates = schema.predicates();

    // Field-level rename wins over the type-level one
    assert_eq!(predicates.resolve("Human", "totalCredits"), Some("credits"));
    assert_eq!(
        predicates.resolve("Character", "name"),
        Some("performance.character.name")
    );
    // Type-level rename prefixes the object's own fields only
    assert_eq!(
        predicates.resolve("Human", "starships"),
        Some("performance.human.starships")
    );
    assert_eq!(predicates.resolve("Droid", "primaryFunction"), Some("Droid.primaryFunction"));
    assert_eq!(predicates.resolve("Starship", "name"), Some("star.ship.name"));
    assert_eq!(predicates.resolve("Starship", "id"), Some("uid"));
}

#[test]
fn test_payload_types_share_their_base_mapping() {
    let schema = load_schema("starwars.yaml");
    let predicates = schema.predicates();

    for payload in ["AddHumanPayload", "UpdateHumanPayload", "DeleteHumanPayload"] {
        assert!(predicates.shares_mapping(payload, "Human"), "{}", payload);
        assert_eq!(predicates.resolve(payload, "totalCredits"), Some("credits"));
    }
    assert!(predicates.shares_mapping("UpdateCharacterPayload", "Character"));
    assert!(!predicates.shares_mapping("Human", "Droid"));
}
