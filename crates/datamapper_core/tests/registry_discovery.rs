mod common;

use common::{
    user, AddressConverter, AltUserConverter, UserConverter, UserDto, UserRow,
    UserSummaryConverter, UserSummaryRow,
};
use datamapper_core::{
    ConverterCatalog, ConverterDefinition, ConverterSource, DataMapper, MappingError,
};

fn catalog() -> ConverterCatalog {
    ConverterCatalog::new()
        .with("app.users", |_| UserConverter)
        .expect("valid scope")
        .with("app.address", |_| AddressConverter)
        .expect("valid scope")
        .with("application", |_| UserSummaryConverter)
        .expect("valid scope")
}

#[test]
fn manual_registration_wins_over_discovery() {
    let mapper = DataMapper::new();
    mapper.register(|_| AltUserConverter).expect("manual");

    let report = mapper
        .register_from_discovery("app", &catalog())
        .expect("discovery");
    assert_eq!(report.scope, "app");
    assert_eq!(
        report.registered,
        [std::any::type_name::<AddressConverter>()]
    );
    assert_eq!(report.skipped, [std::any::type_name::<UserConverter>()]);
    assert_eq!(mapper.converter_count(), 2);

    let row = mapper
        .map_to::<UserRow>(Some(&user(Some("ada"), None)))
        .expect("map")
        .expect("present");
    assert_eq!(row.name, "ADA");
}

#[test]
fn discovery_respects_scope_segments() {
    let mapper = DataMapper::new();
    let report = mapper
        .register_from_discovery("app", &catalog())
        .expect("discovery");
    assert_eq!(report.registered.len(), 2);
    assert!(report.skipped.is_empty());
    assert!(mapper.resolve::<UserDto, UserSummaryRow>().is_none());
}

#[test]
fn invalid_scope_is_rejected() {
    let mapper = DataMapper::new();
    let err = mapper
        .register_from_discovery("App Users", &catalog())
        .expect_err("malformed scope");
    assert_eq!(err, MappingError::InvalidScope("App Users".to_string()));
    assert_eq!(mapper.converter_count(), 0);
}

#[test]
fn duplicate_pair_in_one_batch_registers_nothing() {
    let mut catalog = ConverterCatalog::new();
    catalog
        .add("app.users", ConverterDefinition::new(|_| UserConverter))
        .expect("valid scope");
    catalog
        .add("app.users", ConverterDefinition::new(|_| AltUserConverter))
        .expect("valid scope");
    catalog
        .add("app.address", ConverterDefinition::new(|_| AddressConverter))
        .expect("valid scope");

    let mapper = DataMapper::new();
    let err = mapper
        .register_from_discovery("app", &catalog)
        .expect_err("two converters for one pair");
    assert!(matches!(err, MappingError::DuplicateConverter { .. }));
    assert_eq!(mapper.converter_count(), 0);
}

#[test]
fn manual_duplicate_is_rejected() {
    let mapper = DataMapper::new();
    mapper.register(|_| UserConverter).expect("first");
    let err = mapper
        .register(|_| AltUserConverter)
        .expect_err("pair already taken");
    match err {
        MappingError::DuplicateConverter {
            transfer_type,
            storage_type,
        } => {
            assert!(transfer_type.ends_with("UserDto"));
            assert!(storage_type.ends_with("UserRow"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(mapper.converter_count(), 1);
}

#[test]
fn override_replaces_in_place() {
    let mapper = DataMapper::new();
    assert_eq!(mapper.register_override(|_| UserConverter), None);
    mapper.register(|_| AddressConverter).expect("address");

    let replaced = mapper.register_override(|_| AltUserConverter);
    assert_eq!(replaced, Some(std::any::type_name::<UserConverter>()));
    assert_eq!(mapper.converter_count(), 2);

    let snapshot = mapper.registry_snapshot();
    assert_eq!(snapshot[0].converter, "alt_user_converter");
    assert_eq!(snapshot[0].source, ConverterSource::Override);

    let resolved = mapper
        .resolve::<UserDto, UserRow>()
        .expect("pair registered");
    assert_eq!(resolved.name(), "alt_user_converter");
}

#[test]
fn snapshot_serializes_for_diagnostics() {
    let mapper = DataMapper::new();
    mapper.register(|_| UserConverter).expect("manual");
    mapper
        .register_from_discovery("app.address", &catalog())
        .expect("discovery");

    let json = serde_json::to_value(mapper.registry_snapshot()).expect("serialize");
    let rows = json.as_array().expect("array");
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["source"], "manual");
    assert_eq!(rows[1]["source"], "discovered");
    assert!(rows[1]["storage_type"]
        .as_str()
        .expect("string")
        .ends_with("AddressRow"));
}
