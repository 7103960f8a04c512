use pack_engine::*;

#[test]
fn test_default_options() {
    let options = PackingOptions::default();
    assert_eq!(options.packing_factor, PackingFactor::Balanced);
    assert!(options.allow_rotation);
    assert!((options.initial_max_width_fraction - 0.4).abs() < f64::EPSILON);
    assert!(options.validate().is_ok());
}

#[test]
fn test_validation_width_fraction() {
    let mut options = PackingOptions::default();

    options.initial_max_width_fraction = 1.0;
    assert!(options.validate().is_ok());

    options.initial_max_width_fraction = 0.1;
    assert!(options.validate().is_ok());

    options.initial_max_width_fraction = 0.0;
    assert!(options.validate().is_err());

    options.initial_max_width_fraction = 1.01;
    match options.validate() {
        Err(PackError::InvalidInput(msg)) => assert!(msg.contains("fraction")),
        other => panic!("Expected InvalidInput error, got {other:?}"),
    }
}

#[test]
fn test_packing_factor_ordering() {
    assert!(PackingFactor::Draft < PackingFactor::Balanced);
    assert!(PackingFactor::Balanced < PackingFactor::Best);
    assert_eq!(PackingFactor::Best.name(), "Best");
}

#[test]
fn test_container_page_dimensions() {
    let container = ContainerSpec::new(100.0, 200.0).with_margin(Margin {
        top: 1.0,
        right: 2.0,
        bottom: 3.0,
        left: 4.0,
    });
    assert_eq!(container.page_width(), 106.0);
    assert_eq!(container.page_height(), 204.0);
    assert_eq!(container.content_area(), 20000.0);
}

#[test]
fn test_error_kinds() {
    assert_eq!(PackError::Cancelled.kind(), ErrorKind::Cancelled);
    assert_eq!(PackError::Busy.kind(), ErrorKind::Busy);

    let failure = PackFailure::from(&PackError::InvalidInput("Duplicate box id x".into()));
    assert_eq!(failure.error_kind, ErrorKind::InvalidInput);
    assert!(failure.message.contains("Duplicate box id x"));
}

#[cfg(feature = "serde")]
#[tokio::test]
async fn test_save_and_load_options() {
    use tempfile::NamedTempFile;

    let options = PackingOptions {
        packing_factor: PackingFactor::Best,
        allow_rotation: false,
        initial_max_width_fraction: 0.25,
    };

    let temp_file = NamedTempFile::new().unwrap();
    let path = temp_file.path();

    options.save(path).await.unwrap();
    let loaded = PackingOptions::load(path).await.unwrap();

    assert_eq!(loaded, options);
}

#[cfg(feature = "serde")]
#[test]
fn test_request_wire_format() {
    let json = r#"{
        "boxes": [
            {"id": "A", "width": 60, "height": 40},
            {"id": "B", "width": 60, "height": 40, "asset": "b.png"}
        ],
        "container": {
            "contentWidth": 100,
            "contentHeight": 100,
            "margin": {"top": 0, "right": 0, "bottom": 0, "left": 0},
            "padding": 0
        },
        "options": {"packingFactor": "Draft"}
    }"#;

    let request: PackRequest = serde_json::from_str(json).unwrap();
    assert_eq!(request.boxes.len(), 2);
    assert_eq!(request.boxes[1].asset.as_deref(), Some("b.png"));
    assert_eq!(request.container.content_width, 100.0);
    assert_eq!(request.options.packing_factor, PackingFactor::Draft);
    assert!(request.options.allow_rotation);

    let layout = pack(&request.boxes, &request.container, &request.options).unwrap();
    let value = serde_json::to_value(&layout).unwrap();
    assert_eq!(value["pages"][0][1]["boxId"], "B");
    assert_eq!(value["pages"][0][1]["y"], 40.0);
    assert_eq!(value["pages"][0][1]["rotated"], false);
    assert!(value["unplaceable"].as_array().unwrap().is_empty());
}

#[cfg(feature = "serde")]
#[tokio::test]
async fn test_save_and_load_request() {
    use tempfile::NamedTempFile;

    let request = PackRequest::new(
        vec![PackBox::new("a", 10.0, 20.0).with_asset("a.jpg")],
        ContainerSpec::default(),
        PackingOptions::default(),
    );

    let temp_file = NamedTempFile::new().unwrap();
    request.save(temp_file.path()).await.unwrap();
    let loaded = PackRequest::load(temp_file.path()).await.unwrap();
    assert_eq!(loaded, request);
}

#[cfg(feature = "serde")]
#[tokio::test]
async fn test_load_malformed_request() {
    use tempfile::NamedTempFile;

    let temp_file = NamedTempFile::new().unwrap();
    std::fs::write(temp_file.path(), b"{ not json").unwrap();

    match PackRequest::load(temp_file.path()).await {
        Err(PackError::Config(msg)) => assert!(msg.contains("Failed to parse request")),
        other => panic!("Expected Config error, got {other:?}"),
    }
}
