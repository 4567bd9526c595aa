use axlekit_core::{AxleType, Catalog, Demand, Error, InputError, MachineParameters};

#[test]
fn test_catalog_serializes_as_list() {
    let catalog = Catalog::new(vec![AxleType::new("A", 709, 50), AxleType::new("B", 431, 40)]);

    let json = serde_json::to_value(&catalog).unwrap();
    assert!(json.is_array());
    assert_eq!(json[1]["name"], "B");
    assert_eq!(json[1]["unit_length"], 431);

    let back: Catalog = serde_json::from_value(json).unwrap();
    assert_eq!(back, catalog);
}

#[test]
fn test_validation_errors_convert() {
    let params = MachineParameters::new(500, 5);
    let catalog = Catalog::new(vec![AxleType::new("A", 496, 1)]);

    let err: Error = catalog.validate_against(&params).unwrap_err().into();
    assert!(err.is_input_error());
    assert!(err.to_string().contains("A"));
}

#[test]
fn test_piece_exactly_filling_bar_is_valid() {
    let params = MachineParameters::new(500, 5);
    let catalog = Catalog::new(vec![AxleType::new("A", 495, 2)]);
    assert!(catalog.validate_against(&params).is_ok());
}

#[test]
fn test_blank_name_rejected() {
    let catalog = Catalog::new(vec![AxleType::new("A", 10, 1), AxleType::new("  ", 10, 1)]);
    assert_eq!(catalog.validate(), Err(InputError::EmptyName { index: 1 }));
}

#[test]
fn test_demand_follows_catalog_order() {
    let catalog: Catalog = vec![
        AxleType::new("C", 100, 2),
        AxleType::new("A", 100, 0),
        AxleType::new("B", 100, 1),
    ]
    .into_iter()
    .collect();

    let demand = catalog.demand();
    assert_eq!(demand, Demand::new(vec![2, 0, 1]));
    assert_eq!(demand.to_multiset(), vec![0, 0, 2]);
    assert!(demand.ensure_len(catalog.len()).is_ok());
}
