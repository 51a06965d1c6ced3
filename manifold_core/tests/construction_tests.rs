//! Graph construction: identifier, endpoint, bound, and kind validation.

use manifold_core::{
    AnalyteSet, Attr, ChannelShape, ChannelSpec, ChipDims, NodeKind, NodeSpec, Phase, Schematic,
    SchematicError,
};
use rstest::rstest;

fn schematic() -> Schematic {
    Schematic::new(ChipDims::default())
}

#[test]
fn duplicate_identifier_is_rejected() {
    let mut sch = schematic();
    sch.add_port("inlet", NodeKind::Input, NodeSpec::new()).unwrap();
    let err = sch
        .add_port("inlet", NodeKind::Output, NodeSpec::new())
        .unwrap_err();
    assert_eq!(
        err,
        SchematicError::DuplicateIdentifier("inlet".to_string())
    );
}

#[test]
fn channel_requires_existing_endpoints() {
    let mut sch = schematic();
    sch.add_port("inlet", NodeKind::Input, NodeSpec::new()).unwrap();
    let err = sch
        .add_channel("inlet", "outlet", ChannelShape::Rectangle, ChannelSpec::new())
        .unwrap_err();
    assert_eq!(err, SchematicError::UnknownEndpoint("outlet".to_string()));
    let err = sch
        .add_channel("ghost", "inlet", ChannelShape::Rectangle, ChannelSpec::new())
        .unwrap_err();
    assert_eq!(err, SchematicError::UnknownEndpoint("ghost".to_string()));
}

#[test]
fn duplicate_channel_is_rejected() {
    let mut sch = schematic();
    sch.add_port("a", NodeKind::Input, NodeSpec::new()).unwrap();
    sch.add_port("b", NodeKind::Output, NodeSpec::new()).unwrap();
    sch.add_channel("a", "b", ChannelShape::Rectangle, ChannelSpec::new())
        .unwrap();
    let err = sch
        .add_channel("a", "b", ChannelShape::Rectangle, ChannelSpec::new())
        .unwrap_err();
    assert_eq!(
        err,
        SchematicError::DuplicateChannel {
            from: "a".to_string(),
            to: "b".to_string(),
        }
    );
    // the reverse direction is a different channel
    sch.add_channel("b", "a", ChannelShape::Rectangle, ChannelSpec::new())
        .unwrap();
}

#[rstest]
#[case::pressure(NodeSpec::new().min_pressure(-1.0), "min_pressure")]
#[case::flow(NodeSpec::new().min_flow_rate(-0.5), "min_flow_rate")]
#[case::viscosity(NodeSpec::new().min_viscosity(-2.0), "min_viscosity")]
#[case::density(NodeSpec::new().density(-999.0), "density")]
#[case::position(NodeSpec::new().at(-1.0, 2.0), "x")]
fn negative_node_bounds_are_rejected(#[case] spec: NodeSpec, #[case] attribute: &str) {
    let mut sch = schematic();
    let err = sch.add_port("inlet", NodeKind::Input, spec).unwrap_err();
    match err {
        SchematicError::InvalidBound { attribute: got, .. } => assert_eq!(got, attribute),
        other => panic!("expected InvalidBound, got {other:?}"),
    }
}

#[rstest]
#[case::length(ChannelSpec::new().min_length(-1.0), "min_length")]
#[case::width(ChannelSpec::new().min_width(-0.1), "min_width")]
#[case::height(ChannelSpec::new().min_height(-0.1), "min_height")]
#[case::resolution(ChannelSpec::new().max_width(-0.1), "max_width")]
#[case::depth(ChannelSpec::new().max_height(-0.1), "max_height")]
fn negative_channel_bounds_are_rejected(#[case] spec: ChannelSpec, #[case] attribute: &str) {
    let mut sch = schematic();
    sch.add_port("a", NodeKind::Input, NodeSpec::new()).unwrap();
    sch.add_port("b", NodeKind::Output, NodeSpec::new()).unwrap();
    let err = sch
        .add_channel("a", "b", ChannelShape::Rectangle, spec)
        .unwrap_err();
    match err {
        SchematicError::InvalidBound { attribute: got, .. } => assert_eq!(got, attribute),
        other => panic!("expected InvalidBound, got {other:?}"),
    }
}

#[test]
fn zero_is_a_valid_fixed_value() {
    // unset and fixed-at-zero are distinct states; zero must be accepted
    let mut sch = schematic();
    let id = sch
        .add_port("inlet", NodeKind::Input, NodeSpec::new().min_flow_rate(0.0))
        .unwrap();
    assert_eq!(sch.node(id).flow_rate().fixed, Some(0.0));
    let free = sch
        .add_port("outlet", NodeKind::Output, NodeSpec::new())
        .unwrap();
    assert_eq!(sch.node(free).flow_rate().fixed, None);
}

#[rstest]
#[case(NodeKind::Plain)]
#[case(NodeKind::TJunction)]
#[case(NodeKind::EpCross)]
fn junction_kinds_are_not_ports(#[case] kind: NodeKind) {
    let mut sch = schematic();
    let err = sch.add_port("inlet", kind, NodeSpec::new()).unwrap_err();
    assert!(matches!(err, SchematicError::InvalidKind(_)));
}

#[rstest]
#[case(NodeKind::Input)]
#[case(NodeKind::Output)]
fn port_kinds_are_not_junctions(#[case] kind: NodeKind) {
    let mut sch = schematic();
    let err = sch.add_node("junction", kind, NodeSpec::new()).unwrap_err();
    assert!(matches!(err, SchematicError::InvalidKind(_)));
}

#[test]
fn fluid_fills_unset_attributes() {
    let mut sch = schematic();
    let id = sch
        .add_port("inlet", NodeKind::Input, NodeSpec::new().fluid("water"))
        .unwrap();
    let node = sch.node(id);
    assert_eq!(node.density().fixed, Some(999.87));
    assert_eq!(node.viscosity().fixed, Some(0.001));
    assert!(node.analytes().is_none());
}

#[test]
fn explicit_attributes_win_over_fluid() {
    let mut sch = schematic();
    let id = sch
        .add_port(
            "inlet",
            NodeKind::Input,
            NodeSpec::new().fluid("water").density(1200.0),
        )
        .unwrap();
    assert_eq!(sch.node(id).density().fixed, Some(1200.0));
    assert_eq!(sch.node(id).viscosity().fixed, Some(0.001));
}

#[test]
fn sample_fluid_carries_analytes() {
    let mut sch = schematic();
    let id = sch
        .add_port(
            "inlet",
            NodeKind::Input,
            NodeSpec::new().fluid("ep_cross_test_sample"),
        )
        .unwrap();
    assert_eq!(sch.node(id).analytes().unwrap().len(), 4);
}

#[test]
fn unknown_fluid_is_rejected() {
    let mut sch = schematic();
    let err = sch
        .add_port("inlet", NodeKind::Input, NodeSpec::new().fluid("mercury"))
        .unwrap_err();
    assert_eq!(err, SchematicError::UnknownFluid("mercury".to_string()));
}

#[test]
fn variables_are_minted_once_per_pair() {
    let mut sch = schematic();
    sch.add_port("a", NodeKind::Input, NodeSpec::new()).unwrap();
    sch.add_port("b", NodeKind::Output, NodeSpec::new()).unwrap();
    sch.add_channel("a", "b", ChannelShape::Rectangle, ChannelSpec::new())
        .unwrap();

    let first = sch.node_variable("a", &Attr::Pressure).unwrap();
    let second = sch.node_variable("a", &Attr::Pressure).unwrap();
    assert_eq!(first, second);
    assert_eq!(sch.registry().name(first), "a_pressure");

    let width = sch.channel_variable("a", "b", &Attr::Width).unwrap();
    assert_eq!(sch.registry().name(width), "a_b_width");

    // a failed add must not leak variables
    let before = sch.registry().len();
    assert!(sch.add_port("a", NodeKind::Input, NodeSpec::new()).is_err());
    assert_eq!(sch.registry().len(), before);
}

#[test]
fn analyte_spec_attaches_to_node() {
    let analytes =
        AnalyteSet::new(vec![0.1, 0.2], vec![0.3, 0.4], vec![0.05, 0.06], vec![1.0, -1.0])
            .unwrap();
    let mut sch = schematic();
    let id = sch
        .add_port(
            "sample",
            NodeKind::Input,
            NodeSpec::new().analytes(analytes.clone()),
        )
        .unwrap();
    assert_eq!(sch.node(id).analytes(), Some(&analytes));
}

#[test]
fn phase_tags_are_stored_on_channels() {
    let mut sch = schematic();
    sch.add_port("a", NodeKind::Input, NodeSpec::new()).unwrap();
    sch.add_port("b", NodeKind::Output, NodeSpec::new()).unwrap();
    let id = sch
        .add_channel(
            "a",
            "b",
            ChannelShape::Rectangle,
            ChannelSpec::new().phase(Phase::Continuous),
        )
        .unwrap();
    assert_eq!(sch.channel(id).phase(), Phase::Continuous);
    assert_eq!(sch.channel_between("a", "b"), Some(id));
    assert_eq!(sch.channel_between("b", "a"), None);
}
