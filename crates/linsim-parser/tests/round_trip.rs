//! End-to-end tests: parse netlist text, serialize it, parse it again.

use std::io::Write;

use linsim_core::{Element, ElementMux};
use linsim_parser::{parse, parse_file, parse_lines};

const NETLIST: &str = "\
.model sw sw0
.subckt blah 1 2 3
r1 1 2 1e10
c1 1 3 1e-4
.ends blah
C1 0 T1 1mF
R1 T1 N001 1k
G1 N001 0 T1 0 1 table=(0 0,0.1 1m)
.ic 0 15s 0 1m uic V(T1)=10V
.end";

fn expected_lines() -> Vec<String> {
    std::iter::once("* Netlist: test".to_string())
        .chain(NETLIST.to_lowercase().lines().map(str::to_string))
        .collect()
}

/// Serializing a parsed netlist reproduces the normalized input.
#[test]
fn test_netlist_display_matches_input() {
    let netlist = parse("test", NETLIST).expect("parse should succeed");

    assert!(netlist.directive("subckt").is_empty());
    assert_eq!(netlist.to_string(), expected_lines().join("\n"));
}

/// The definition is the full text minus its `.ic` line.
#[test]
fn test_netlist_definition_omits_ic() {
    let netlist = parse("test", NETLIST).unwrap();
    let mut expected = expected_lines();
    expected.remove(9);
    assert_eq!(netlist.definition(), expected.join("\n"));
}

/// Parsing separate lines, including the header comment, gives the same netlist.
#[test]
fn test_parse_lines_matches_text() {
    let lines = expected_lines();
    let from_lines = parse_lines("test", &lines, &ElementMux::default()).unwrap();
    let from_text = parse("test", NETLIST).unwrap();
    assert_eq!(from_lines, from_text);
}

/// Display output parses back to an equal netlist.
#[test]
fn test_reparse_display() {
    let netlist = parse("test", NETLIST).unwrap();
    let again = parse("test", &netlist.to_string()).unwrap();
    assert_eq!(again, netlist);
    assert_eq!(again.to_string(), netlist.to_string());
}

/// Reading from a file gives the same result as parsing the text.
#[test]
fn test_parse_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(NETLIST.as_bytes()).unwrap();
    file.flush().unwrap();

    let netlist = parse_file("test", file.path()).expect("file parse should succeed");
    assert_eq!(netlist.to_string(), expected_lines().join("\n"));
}

#[test]
fn test_parse_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = parse_file("test", dir.path().join("missing.net")).unwrap_err();
    assert!(matches!(err, linsim_parser::Error::Io(_)));
}

/// Element and directive parameters survive the trip.
#[test]
fn test_parameters_preserved() {
    let netlist = parse("test", NETLIST).unwrap();
    let g1: &Element = netlist.block().element("g1").unwrap();
    assert_eq!(g1.value(), "t1 0 1");
    assert_eq!(g1.param("table"), Some("(0 0,0.1 1m)"));

    let ic = netlist.initial_conditions();
    assert_eq!(ic.get("v(t1)").map(String::as_str), Some("10v"));
}

/// Edits made through the model show up in the serialized text.
#[test]
fn test_edit_then_serialize() {
    let mut netlist = parse("test", NETLIST).unwrap();
    let root = netlist.block_mut();
    root.remove("g1").unwrap();
    root.add(Element::new("r2", ["n001", "0"], "2k")).unwrap();

    let text = netlist.to_string();
    assert!(!text.contains("g1 "));
    assert!(text.contains("r1 t1 n001 1k\nr2 n001 0 2k\n.ic"));
}
