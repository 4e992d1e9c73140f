//! End-to-end exercise of the analysis core: fault tree construction,
//! cut-set enumeration, common-cause detection, argumentation text and a
//! small GSN argument built from the results.

use safecase::{
    analyze_common_causes, build_argumentation, calculate_cut_sets, AnalysisError, CutSetSummary,
    FaultTree, GateType, GsnGraph, GsnNodeType, GsnRelation, GuidanceTables, NodeType,
};

#[test]
fn top_event_cut_sets_through_argumentation() {
    // TOP EVENT (AND) over child A (OR of a1, a2) and leaf b1
    let mut tree = FaultTree::new();
    let top = tree.add_node("Loss of lateral control", NodeType::TopEvent);
    tree.node_mut(top).unwrap().quant_value = Some(2.8);
    tree.node_mut(top).unwrap().severity = Some(3.0);
    tree.node_mut(top).unwrap().controllability = Some(2.0);

    let a = tree.add_node("Steering path", NodeType::Gate);
    tree.node_mut(a).unwrap().gate_type = Some(GateType::Or);
    let a1 = tree.add_node("Rack motor stall", NodeType::BasicEvent);
    tree.node_mut(a1).unwrap().description = "Steering rack motor stalls under load".into();
    let a2 = tree.add_node("Torque sensor drift", NodeType::BasicEvent);
    let b1 = tree.add_node("Driver monitoring inactive", NodeType::BasicEvent);

    tree.add_child(top, a).unwrap();
    tree.add_child(top, b1).unwrap();
    tree.add_child(a, a1).unwrap();
    tree.add_child(a, a2).unwrap();

    let cuts = calculate_cut_sets(&tree, top);
    assert_eq!(cuts.len(), 2);
    assert_eq!(cuts[0], [a1, b1].into_iter().collect());
    assert_eq!(cuts[1], [a2, b1].into_iter().collect());

    let summary = CutSetSummary::for_event(&tree, top);
    assert_eq!(summary.total(), 2);
    assert_eq!(summary.max_order(), 2);
    assert!(summary.single_points.is_empty());

    // no shared branches, so no common cause
    assert_eq!(analyze_common_causes(&tree, top), "None found.");

    let text = build_argumentation(&tree, top, &GuidanceTables::default());
    assert!(text.contains("discrete: 3"));
    assert!(text.contains("Severity: 3.0, Controllability: 2.0"));
    assert!(text.contains("Rack motor stall"));
    assert!(text.contains("Driver monitoring inactive"));
    // the steering keyword in a1's description pulls an extra recommendation
    assert!(text.contains("[steering]"));
}

#[test]
fn shared_subtree_is_a_common_cause_and_survives_save_load() {
    let mut tree = FaultTree::new();
    let top = tree.add_node("Top", NodeType::TopEvent);
    let left = tree.add_node("Left channel", NodeType::Gate);
    let right = tree.add_node("Right channel", NodeType::Gate);
    let supply = tree.add_node("Shared supply fault", NodeType::BasicEvent);
    tree.add_child(top, left).unwrap();
    tree.add_child(top, right).unwrap();
    tree.add_child(left, supply).unwrap();
    tree.add_child(right, supply).unwrap();

    let body = analyze_common_causes(&tree, top);
    assert!(body.contains("Shared supply fault"));
    assert!(body.contains("2 occurrences"));

    // both AND'd channels reduce to the same single condition
    let cuts = calculate_cut_sets(&tree, top);
    assert_eq!(cuts, vec![[supply].into_iter().collect()]);

    let json = serde_json::to_string(&tree).unwrap();
    let loaded: FaultTree = serde_json::from_str(&json).unwrap();
    assert_eq!(analyze_common_causes(&loaded, top), body);
}

#[test]
fn gsn_argument_enforces_rules_and_resolves_modules() {
    let mut gsn = GsnGraph::new("Lateral Control Safety Argument");
    gsn.add_node("M1", "Lateral Control Module", GsnNodeType::Module);
    gsn.add_node("G1", "Lateral control is acceptably safe", GsnNodeType::Goal);
    gsn.add_node("S1", "Argument over identified cut sets", GsnNodeType::Strategy);
    gsn.add_node("Sn1", "Cut-set analysis report", GsnNodeType::Solution);
    gsn.add_node("C1", "Operation limited to highway ODD", GsnNodeType::Context);
    gsn.add_node("A1", "Sensors calibrated per schedule", GsnNodeType::Assumption);

    gsn.add_child("M1", "G1", GsnRelation::Solved).unwrap();
    gsn.add_child("G1", "S1", GsnRelation::Solved).unwrap();
    gsn.add_child("S1", "Sn1", GsnRelation::Solved).unwrap();
    gsn.add_child("G1", "C1", GsnRelation::Context).unwrap();
    gsn.add_child("G1", "A1", GsnRelation::Context).unwrap();

    // structural rules hold at the call site
    assert!(matches!(
        gsn.add_child("G1", "C1", GsnRelation::Solved),
        Err(AnalysisError::InvalidRelationship(_))
    ));
    assert!(matches!(
        gsn.add_child("A1", "Sn1", GsnRelation::Solved),
        Err(AnalysisError::InvalidRelationship(_))
    ));

    // a clone moved elsewhere still resolves its module via the original
    let clone = gsn.clone_node("Sn1", "Sn1-away").unwrap();
    assert_eq!(
        gsn.module_name(&clone).as_deref(),
        Some("Lateral Control Module")
    );

    // round-trip through the legacy record shape keeps one context edge
    let records = gsn.to_records();
    let reloaded = GsnGraph::load_legacy(&gsn.title, &records);
    let goal = reloaded.node("G1").unwrap();
    assert_eq!(
        goal.context_children,
        vec!["C1".to_string(), "A1".to_string()]
    );
    assert_eq!(
        goal.children.iter().filter(|c| c.as_str() == "C1").count(),
        1
    );
}
