//! IPPcode22 source loader: XML document to [`Program`].
//!
//! The loader is a mechanical translation: every `<instruction>` becomes
//! one [`Instruction`](ipp_common::Instruction), argument text is decoded
//! once (escapes, hex floats), and the result is admitted into a program
//! store.
//!
//! # Usage
//!
//! ```
//! use ipp_loader::load;
//!
//! let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
//! <program language="IPPcode22">
//!   <instruction order="1" opcode="WRITE">
//!     <arg1 type="string">hello\032world</arg1>
//!   </instruction>
//! </program>"#;
//!
//! let program = load(xml).unwrap();
//! assert_eq!(program.len(), 1);
//! ```

pub mod error;
pub mod xml;

mod parser;

pub use error::LoadError;

use ipp_common::Program;
use tracing::debug;

use crate::xml::XmlError;

/// Load a program from raw source bytes, which must be UTF-8.
pub fn load_bytes(bytes: &[u8]) -> Result<Program, LoadError> {
    match std::str::from_utf8(bytes) {
        Ok(text) => load(text),
        Err(e) => {
            let valid = &bytes[..e.valid_up_to()];
            let line = valid.iter().filter(|&&b| b == b'\n').count() + 1;
            Err(XmlError::InvalidEncoding { line }.into())
        }
    }
}

/// Load a program from its XML source text.
///
/// Returns the first error encountered.
pub fn load(text: &str) -> Result<Program, LoadError> {
    let root = xml::parse_document(text)?;
    let program = parser::build_program(&root)?;
    debug!(
        instructions = program.len(),
        labels = program.label_count(),
        max_order = program.max_order(),
        "program loaded"
    );
    Ok(program)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ipp_common::Opcode;

    #[test]
    fn load_minimal() {
        let program = load(r#"<program language="IPPcode22"/>"#).unwrap();
        assert!(program.is_empty());
    }

    #[test]
    fn load_orders_and_labels() {
        let program = load(
            r#"<program language="ippcode22">
                 <instruction order="10" opcode="label"><arg1 type="label">end</arg1></instruction>
                 <instruction order="2" opcode="CreateFrame"/>
               </program>"#,
        )
        .unwrap();
        assert_eq!(program.len(), 2);
        assert_eq!(program.get(2).map(|i| i.opcode), Some(Opcode::CreateFrame));
        assert_eq!(program.resolve_label("end"), Ok(10));
    }

    #[test]
    fn load_bytes_requires_utf8() {
        let program = load_bytes("<program language=\"IPPcode22\"/>".as_bytes()).unwrap();
        assert!(program.is_empty());

        let err = load_bytes(b"<program language=\"IPPcode22\">\n<a>\xff\xfe</a></program>")
            .unwrap_err();
        assert_eq!(err, LoadError::Xml(XmlError::InvalidEncoding { line: 2 }));
        assert_eq!(err.exit_code(), 31);
    }
}
