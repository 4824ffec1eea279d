//! Converts the XML element tree into instructions and admits them.

use ipp_common::escape::decode_escapes;
use ipp_common::hexfloat::parse_hex;
use ipp_common::{Argument, Instruction, Opcode, Program, TypeTag, Value, VarRef};

use crate::error::LoadError;
use crate::xml::Element;

const LANGUAGE: &str = "IPPcode22";

/// Build a program from the `<program>` root element.
///
/// Instructions are admitted in document order; the program store
/// enforces order uniqueness, argument contiguity and label uniqueness.
pub(crate) fn build_program(root: &Element) -> Result<Program, LoadError> {
    if root.name != "program" {
        return Err(LoadError::WrongRoot {
            line: root.line,
            found: root.name.clone(),
        });
    }
    match root.attribute("language") {
        Some(language) if language.trim().eq_ignore_ascii_case(LANGUAGE) => {}
        other => {
            return Err(LoadError::WrongLanguage {
                line: root.line,
                found: other.unwrap_or_default().to_string(),
            })
        }
    }

    let mut program = Program::new();
    for child in &root.children {
        program.admit(parse_instruction(child)?)?;
    }
    Ok(program)
}

fn required<'e>(element: &'e Element, attribute: &'static str) -> Result<&'e str, LoadError> {
    element
        .attribute(attribute)
        .ok_or_else(|| LoadError::MissingAttribute {
            line: element.line,
            element: element.name.clone(),
            attribute,
        })
}

fn parse_instruction(element: &Element) -> Result<Instruction, LoadError> {
    if element.name != "instruction" {
        return Err(LoadError::UnexpectedElement {
            line: element.line,
            parent: "program",
            found: element.name.clone(),
        });
    }

    let order_text = required(element, "order")?;
    let order = order_text
        .trim()
        .parse::<i64>()
        .ok()
        .filter(|&order| order > 0)
        .ok_or_else(|| LoadError::InvalidOrder {
            line: element.line,
            value: order_text.to_string(),
        })?;

    let mnemonic = required(element, "opcode")?;
    let opcode = Opcode::from_mnemonic(mnemonic).ok_or_else(|| LoadError::UnknownOpcode {
        line: element.line,
        opcode: mnemonic.to_string(),
    })?;

    let mut instr = Instruction::new(order, opcode);
    for arg in &element.children {
        let position = match arg.name.as_str() {
            "arg1" => 1,
            "arg2" => 2,
            "arg3" => 3,
            _ => {
                return Err(LoadError::UnexpectedElement {
                    line: arg.line,
                    parent: "instruction",
                    found: arg.name.clone(),
                })
            }
        };
        if instr.get(position).is_some() {
            return Err(LoadError::DuplicateArgument {
                line: arg.line,
                name: arg.name.clone(),
            });
        }
        let kind = required(arg, "type")?;
        instr = instr.with_arg(position, decode_argument(kind, &arg.text, arg.line)?);
    }
    Ok(instr)
}

/// Decode an argument's text according to its `type` attribute.
fn decode_argument(kind: &str, text: &str, line: usize) -> Result<Argument, LoadError> {
    let invalid = |kind: &'static str| LoadError::InvalidValue {
        line,
        kind,
        value: text.to_string(),
    };
    let trimmed = text.trim();

    match kind.trim().to_ascii_lowercase().as_str() {
        "var" => VarRef::parse(trimmed)
            .map(Argument::Var)
            .ok_or_else(|| invalid("var")),
        "int" => trimmed
            .parse::<i64>()
            .map(|v| Argument::Const(Value::Int(v)))
            .map_err(|_| invalid("int")),
        "bool" => Ok(Argument::Const(Value::Bool(
            trimmed.eq_ignore_ascii_case("true"),
        ))),
        "nil" => Ok(Argument::Const(Value::Nil)),
        "float" => parse_hex(trimmed)
            .map(|v| Argument::Const(Value::Float(v)))
            .ok_or_else(|| invalid("float")),
        "string" => decode_escapes(text)
            .map(|s| Argument::Const(Value::String(s)))
            .map_err(|_| invalid("string")),
        "label" if !trimmed.is_empty() => Ok(Argument::Label(trimmed.to_string())),
        "label" => Err(invalid("label")),
        "type" => TypeTag::from_name(trimmed)
            .map(Argument::Type)
            .ok_or_else(|| invalid("type")),
        _ => Err(LoadError::UnknownArgumentType {
            line,
            kind: kind.to_string(),
        }),
    }
}
