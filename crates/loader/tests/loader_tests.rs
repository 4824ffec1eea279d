//! Integration tests for the IPPcode22 loader.
//!
//! Tests cover:
//! - Whole programs (load, then execute on the VM)
//! - Structural errors (root, language, order, opcode, arguments)
//! - Malformed XML
//! - Argument decoding as seen by the VM

use ipp_common::{Argument, FrameKind, Opcode, Value, VarRef};
use ipp_loader::xml::XmlError;
use ipp_loader::{load, LoadError};
use ipp_vm::VM;

// ---- Test helpers ----

/// Wrap instruction elements in a `<program>` document.
fn document(body: &str) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <program language=\"IPPcode22\">\n{body}\n</program>\n"
    )
}

/// Load, run with `input` lines, return (exit code, stdout).
fn run_source(body: &str, input: &[&str]) -> (i32, String) {
    let program = load(&document(body)).unwrap();
    let mut out = Vec::new();
    let lines: Vec<String> = input.iter().map(|s| s.to_string()).collect();
    let code = VM::new(&program)
        .with_input(lines.into_iter())
        .with_output(&mut out)
        .with_diagnostics(Vec::new())
        .execute()
        .unwrap_or_else(|e| e.exit_code());
    (code, String::from_utf8(out).unwrap())
}

fn load_code(body: &str) -> i32 {
    match load(&document(body)) {
        Ok(_) => 0,
        Err(e) => e.exit_code(),
    }
}

// ---- Whole programs ----

#[test]
fn hello_world() {
    let (code, out) = run_source(
        r#"<instruction order="1" opcode="WRITE">
             <arg1 type="string">Hello,\032world!\010</arg1>
           </instruction>"#,
        &[],
    );
    assert_eq!(code, 0);
    assert_eq!(out, "Hello, world!\n");
}

#[test]
fn factorial_with_call() {
    let body = r#"
        <instruction order="1" opcode="DEFVAR"><arg1 type="var">GF@n</arg1></instruction>
        <instruction order="2" opcode="READ"><arg1 type="var">GF@n</arg1><arg2 type="type">int</arg2></instruction>
        <instruction order="3" opcode="DEFVAR"><arg1 type="var">GF@acc</arg1></instruction>
        <instruction order="4" opcode="MOVE"><arg1 type="var">GF@acc</arg1><arg2 type="int">1</arg2></instruction>
        <instruction order="5" opcode="CALL"><arg1 type="label">fact</arg1></instruction>
        <instruction order="6" opcode="WRITE"><arg1 type="var">GF@acc</arg1></instruction>
        <instruction order="7" opcode="EXIT"><arg1 type="int">0</arg1></instruction>

        <instruction order="10" opcode="LABEL"><arg1 type="label">fact</arg1></instruction>
        <instruction order="11" opcode="JUMPIFEQ"><arg1 type="label">done</arg1><arg2 type="var">GF@n</arg2><arg3 type="int">0</arg3></instruction>
        <instruction order="12" opcode="MUL"><arg1 type="var">GF@acc</arg1><arg2 type="var">GF@acc</arg2><arg3 type="var">GF@n</arg3></instruction>
        <instruction order="13" opcode="SUB"><arg1 type="var">GF@n</arg1><arg2 type="var">GF@n</arg2><arg3 type="int">1</arg3></instruction>
        <instruction order="14" opcode="CALL"><arg1 type="label">fact</arg1></instruction>
        <instruction order="15" opcode="LABEL"><arg1 type="label">done</arg1></instruction>
        <instruction order="16" opcode="RETURN"/>
    "#;
    assert_eq!(run_source(body, &["5"]), (0, "120".to_string()));
    assert_eq!(run_source(body, &["0"]), (0, "1".to_string()));
}

#[test]
fn local_frames_and_stack_ops() {
    let body = r#"
        <instruction order="1" opcode="CREATEFRAME"/>
        <instruction order="2" opcode="DEFVAR"><arg1 type="var">TF@x</arg1></instruction>
        <instruction order="3" opcode="PUSHFRAME"/>
        <instruction order="4" opcode="PUSHS"><arg1 type="float">0x1p+1</arg1></instruction>
        <instruction order="5" opcode="PUSHS"><arg1 type="float">0x1.8p+0</arg1></instruction>
        <instruction order="6" opcode="MULS"/>
        <instruction order="7" opcode="POPS"><arg1 type="var">LF@x</arg1></instruction>
        <instruction order="8" opcode="WRITE"><arg1 type="var">LF@x</arg1></instruction>
        <instruction order="9" opcode="POPFRAME"/>
        <instruction order="10" opcode="TYPE"><arg1 type="var">TF@x</arg1><arg2 type="var">TF@x</arg2></instruction>
        <instruction order="11" opcode="WRITE"><arg1 type="var">TF@x</arg1></instruction>
    "#;
    assert_eq!(run_source(body, &[]), (0, "0x1.8p+1float".to_string()));
}

#[test]
fn document_order_is_not_execution_order() {
    let body = r#"
        <instruction order="30" opcode="WRITE"><arg1 type="string">c</arg1></instruction>
        <instruction order="10" opcode="WRITE"><arg1 type="string">a</arg1></instruction>
        <instruction order="20" opcode="WRITE"><arg1 type="string">b</arg1></instruction>
    "#;
    assert_eq!(run_source(body, &[]), (0, "abc".to_string()));
}

#[test]
fn arguments_in_any_element_order() {
    let program = load(&document(
        r#"<instruction order="1" opcode="ADD">
             <arg3 type="int">2</arg3>
             <arg1 type="var">GF@r</arg1>
             <arg2 type="int">1</arg2>
           </instruction>"#,
    ))
    .unwrap();
    let instr = program.get(1).unwrap();
    assert_eq!(instr.opcode, Opcode::Add);
    assert_eq!(
        instr.get(1),
        Some(&Argument::Var(VarRef::new(FrameKind::Global, "r")))
    );
    assert_eq!(instr.get(3), Some(&Argument::Const(Value::Int(2))));
}

#[test]
fn entities_and_escapes_in_strings() {
    let (_, out) = run_source(
        r#"<instruction order="1" opcode="WRITE"><arg1 type="string">&lt;a&amp;b&gt;\035</arg1></instruction>"#,
        &[],
    );
    assert_eq!(out, "<a&b>#");
}

#[test]
fn large_generated_program() {
    let count = 20_000;
    let mut body = String::new();
    body.push_str(r#"<instruction order="1" opcode="DEFVAR"><arg1 type="var">GF@n</arg1></instruction>"#);
    body.push_str(r#"<instruction order="2" opcode="MOVE"><arg1 type="var">GF@n</arg1><arg2 type="int">0</arg2></instruction>"#);
    for order in 3..count {
        body.push_str(&format!(
            "\n<instruction order=\"{order}\" opcode=\"ADD\">\n  \
             <arg1 type=\"var\">GF@n</arg1><arg2 type=\"var\">GF@n</arg2><arg3 type=\"int\">1</arg3>\n\
             </instruction>"
        ));
    }
    body.push_str(&format!(
        r#"<instruction order="{count}" opcode="WRITE"><arg1 type="var">GF@n</arg1></instruction>"#
    ));

    let program = load(&document(&body)).unwrap();
    assert_eq!(program.len(), count as usize);
    assert_eq!(program.max_order(), count);
    assert_eq!(run_source(&body, &[]), (0, (count - 3).to_string()));
}

// ---- Structural errors ----

#[test]
fn wrong_root_element() {
    let err = load(r#"<prog language="IPPcode22"/>"#).unwrap_err();
    assert!(matches!(err, LoadError::WrongRoot { .. }));
    assert_eq!(err.exit_code(), 32);
}

#[test]
fn wrong_or_missing_language() {
    assert_eq!(load(r#"<program language="IPPcode21"/>"#).unwrap_err().exit_code(), 32);
    assert_eq!(load("<program/>").unwrap_err().exit_code(), 32);
}

#[test]
fn unexpected_child_of_program() {
    assert_eq!(load_code(r#"<instr order="1" opcode="BREAK"/>"#), 32);
}

#[test]
fn missing_order_or_opcode() {
    assert_eq!(load_code(r#"<instruction opcode="BREAK"/>"#), 32);
    assert_eq!(load_code(r#"<instruction order="1"/>"#), 32);
}

#[test]
fn invalid_orders() {
    assert_eq!(load_code(r#"<instruction order="0" opcode="BREAK"/>"#), 32);
    assert_eq!(load_code(r#"<instruction order="-2" opcode="BREAK"/>"#), 32);
    assert_eq!(load_code(r#"<instruction order="one" opcode="BREAK"/>"#), 32);
}

#[test]
fn duplicate_order() {
    let err = load(&document(
        r#"<instruction order="3" opcode="BREAK"/>
           <instruction order="3" opcode="CREATEFRAME"/>"#,
    ))
    .unwrap_err();
    assert!(matches!(err, LoadError::Program(_)));
    assert_eq!(err.exit_code(), 32);
}

#[test]
fn unknown_opcode() {
    assert_eq!(load_code(r#"<instruction order="1" opcode="JUMPIFLT"/>"#), 32);
}

#[test]
fn opcode_is_case_insensitive() {
    assert_eq!(load_code(r#"<instruction order="1" opcode="createFrame"/>"#), 0);
}

#[test]
fn bad_argument_elements() {
    assert_eq!(
        load_code(r#"<instruction order="1" opcode="WRITE"><arg4 type="int">1</arg4></instruction>"#),
        32
    );
    assert_eq!(
        load_code(
            r#"<instruction order="1" opcode="WRITE"><arg1 type="int">1</arg1><arg1 type="int">2</arg1></instruction>"#
        ),
        32
    );
    assert_eq!(
        load_code(r#"<instruction order="1" opcode="WRITE"><arg1>1</arg1></instruction>"#),
        32
    );
}

#[test]
fn argument_gap() {
    assert_eq!(
        load_code(r#"<instruction order="1" opcode="WRITE"><arg2 type="int">1</arg2></instruction>"#),
        32
    );
}

#[test]
fn undecodable_values() {
    for arg in [
        r#"<arg1 type="int">1.5</arg1>"#,
        r#"<arg1 type="var">GF</arg1>"#,
        r#"<arg1 type="float">0xZp1</arg1>"#,
        r#"<arg1 type="string">a\12</arg1>"#,
        r#"<arg1 type="colour">red</arg1>"#,
    ] {
        let body = format!(r#"<instruction order="1" opcode="WRITE">{arg}</instruction>"#);
        assert_eq!(load_code(&body), 32, "{arg}");
    }
}

#[test]
fn duplicate_label_is_semantic() {
    let err = load(&document(
        r#"<instruction order="1" opcode="LABEL"><arg1 type="label">x</arg1></instruction>
           <instruction order="2" opcode="LABEL"><arg1 type="label">x</arg1></instruction>"#,
    ))
    .unwrap_err();
    assert_eq!(err.exit_code(), 52);
}

// ---- Malformed XML ----

#[test]
fn deep_nesting_is_malformed() {
    let src = format!("<program language=\"IPPcode22\">{}", "<a>".repeat(200_000));
    let err = load(&src).unwrap_err();
    assert!(matches!(err, LoadError::Xml(XmlError::TooDeep { .. })));
    assert_eq!(err.exit_code(), 31);
}

#[test]
fn malformed_xml_is_31() {
    for src in [
        "",
        "<program language=\"IPPcode22\">",
        "<program language=\"IPPcode22\"></prog>",
        "<program language=IPPcode22/>",
        "plain text",
    ] {
        let err = load(src).unwrap_err();
        assert!(matches!(err, LoadError::Xml(_)), "{src:?}");
        assert_eq!(err.exit_code(), 31);
    }
}
