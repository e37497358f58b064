use pretty_assertions::assert_eq;
use scesim_model::{
    ExpressionIdentifier, FactIdentifier, FactMapping, FactMappingType, Scenario,
    ScenarioSimulationModel, Simulation, SimulationDescriptor, SimulationType, CURRENT_VERSION,
};
use scesim_persistence::{PersistenceError, XmlPersistence};

const V1_0: &str = include_str!("resources/scesim-1-0.scesim");
const V1_1: &str = include_str!("resources/scesim-1-1.scesim");
const V1_2: &str = include_str!("resources/scesim-1-2.scesim");
const RULE: &str = include_str!("resources/scesim-rule.scesim");
const DMN: &str = include_str!("resources/scesim-dmn.scesim");

fn persistence() -> &'static XmlPersistence {
    XmlPersistence::instance()
}

#[test]
fn migrate_from_1_0_renames_expected() {
    let migrated = persistence().migrate_if_necessary(V1_0).unwrap();

    assert!(!migrated.contains("version=\"1.0\""));
    assert!(!migrated.contains("EXPECTED"));
    assert!(migrated.contains("<type>EXPECT</type>"));
    assert_eq!(persistence().extract_version(&migrated), CURRENT_VERSION);
}

#[test]
fn migrate_from_1_1_adds_session_and_type() {
    let migrated = persistence().migrate_if_necessary(V1_1).unwrap();

    assert!(migrated.contains("<dmoSession></dmoSession>"));
    assert!(migrated.contains("<type>RULE</type>"));
}

#[test]
fn migrate_from_1_2_roots_every_fact_mapping() {
    let model = persistence().unmarshal_with(V1_2, false).unwrap();
    let mappings = model.simulation().descriptor().fact_mappings();

    assert_eq!(mappings.len(), 3);
    for mapping in mappings {
        assert!(!mapping.expression_elements().is_empty());
    }
    assert_eq!(mappings[0].expression_elements()[0].step, "Integer");
    assert_eq!(mappings[1].expression_path(), "age");
    assert_eq!(mappings[2].expression_elements()[0].step, "LoanApproval");
}

#[test]
fn migrated_1_0_document_validates() {
    let model = persistence().unmarshal(V1_0).unwrap();
    let simulation = model.simulation();

    assert_eq!(model.version(), CURRENT_VERSION);
    assert_eq!(simulation.descriptor().simulation_type(), SimulationType::Rule);
    assert_eq!(simulation.descriptor().dmo_session(), Some(""));
    assert_eq!(simulation.len(), 2);

    let first = simulation.scenario_by_index(0).unwrap();
    assert_eq!(first.description(), "Adult applicant is approved");
    assert_eq!(first.expects().count(), 1);
    assert!(first
        .expects()
        .all(|v| v.expression_identifier().kind == FactMappingType::Expect));
}

#[test]
fn unsupported_version_message() {
    let xml = r#"<ScenarioSimulationModel version="9999999999.99999999999"></ScenarioSimulationModel>"#;
    let err = persistence().migrate_if_necessary(xml).unwrap_err();

    assert!(err.is_illegal_argument());
    assert_eq!(
        err.to_string(),
        "Version 9999999999.99999999999 of the file is not supported. Current version is 1.3"
    );
}

#[test]
fn unmarshal_surfaces_unsupported_version() {
    let xml = r#"<ScenarioSimulationModel version="0.5"><simulation/></ScenarioSimulationModel>"#;
    let err = persistence().unmarshal(xml).unwrap_err();
    assert!(matches!(err, PersistenceError::UnsupportedVersion { ref version, .. } if version == "0.5"));
}

#[test]
fn current_version_is_untouched() {
    assert_eq!(persistence().migrate_if_necessary(RULE).unwrap(), RULE);
}

#[test]
fn extract_version_first_attribute() {
    let xml = r#"<ScenarioSimulationModel version="1.0" version="1.1">"#;
    assert_eq!(persistence().extract_version(xml), "1.0");
}

#[test]
fn unmarshal_rule() {
    let model = persistence().unmarshal(RULE).unwrap();
    let descriptor = model.simulation().descriptor();

    assert_eq!(descriptor.simulation_type(), SimulationType::Rule);
    assert_eq!(descriptor.dmo_session(), Some("loanSession"));
    assert_eq!(descriptor.dmn_file_path(), None);
    assert_eq!(model.imports().imports().len(), 2);

    let again = persistence()
        .unmarshal(&persistence().marshal(&model).unwrap())
        .unwrap();
    assert_eq!(again, model);
}

#[test]
fn unmarshal_dmn() {
    let model = persistence().unmarshal(DMN).unwrap();
    let descriptor = model.simulation().descriptor();

    assert_eq!(descriptor.simulation_type(), SimulationType::Dmn);
    assert_eq!(
        descriptor.dmn_file_path(),
        Some("src/main/resources/com/acme/loan/eligibility.dmn")
    );
    assert_eq!(descriptor.dmo_session(), None);

    let again = persistence()
        .unmarshal(&persistence().marshal(&model).unwrap())
        .unwrap();
    assert_eq!(again.simulation().descriptor(), descriptor);
}

#[test]
fn marshal_writes_tag_names_only() {
    let model = persistence().unmarshal(RULE).unwrap();
    let xml = persistence().marshal(&model).unwrap();

    assert!(xml.starts_with("<ScenarioSimulationModel version=\"1.3\">"));
    assert!(xml.contains("<FactMapping>"));
    assert!(xml.contains("<ExpressionElement>"));
    assert!(!xml.contains("scesim_model"));
    assert!(!xml.contains("::"));
}

#[test]
fn invalid_document_reports_validation() {
    let broken = RULE.replace(
        "<dmoSession>loanSession</dmoSession>\n      <type>RULE</type>",
        "<type>DMN</type>",
    );
    let err = persistence().unmarshal(&broken).unwrap_err();
    assert!(matches!(err, PersistenceError::Validation(_)));

    assert!(persistence().unmarshal_with(&broken, false).is_ok());
}

#[test]
fn roundtrip_keeps_padded_text() {
    let person = FactIdentifier::new("Person", "com.acme.Person");
    let name = ExpressionIdentifier::new("1|1", FactMappingType::Given);

    let mut simulation = Simulation::with_descriptor(SimulationDescriptor::rule("  ks  "));
    simulation
        .descriptor_mut()
        .add_fact_mapping(FactMapping::new(person.clone(), name.clone()).with_step("name"));
    let mut scenario = Scenario::with_description("  padded <&> desc ");
    scenario.add_or_update_value(person, name, "  Mr Smith ");
    simulation.push_scenario(scenario);
    let model = ScenarioSimulationModel::with_simulation(simulation);

    for indent in [0, 2] {
        let codec = XmlPersistence::new().with_indent(indent);
        let back = codec.unmarshal(&codec.marshal(&model).unwrap()).unwrap();

        assert_eq!(back.simulation().descriptor().dmo_session(), Some("  ks  "));
        assert_eq!(back, model);
    }
}

#[test]
fn unmarshal_keeps_whitespace_written_by_hand() {
    let padded = RULE.replace(
        "<dmoSession>loanSession</dmoSession>",
        "<dmoSession>\tloanSession\n</dmoSession>",
    );
    let model = persistence().unmarshal(&padded).unwrap();

    assert_eq!(
        model.simulation().descriptor().dmo_session(),
        Some("\tloanSession\n")
    );
}

#[test]
fn extract_version_skips_prefixed_attributes() {
    let xml = r#"<ScenarioSimulationModel data-version="0.1" version="1.2">"#;
    assert_eq!(persistence().extract_version(xml), "1.2");

    let only_prefixed = r#"<ScenarioSimulationModel data-version="0.1">"#;
    assert!(matches!(
        persistence().try_extract_version(only_prefixed),
        Err(PersistenceError::MissingVersion)
    ));
}
