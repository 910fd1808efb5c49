use std::fmt::{self, Write};

use crate::storage::{HeaderField, Request, Response, Store};

fn to_utf8(buf: Option<&[u8]>) -> &str {
    match buf {
        Some(buf) => match std::str::from_utf8(buf) {
            Ok(str) => str,
            Err(_) => "[ERROR::UTF8]",
        },
        None => "[ERROR::OUT_OF_BUFFER]",
    }
}

impl Store {
    pub fn debug(&self, buf: &[u8], result: &mut String) -> fmt::Result {
        match self {
            Store::Empty => result.write_str("Store::Empty"),
            Store::Slice(slice) => result.write_fmt(format_args!(
                "Store::Slice {{ start: {}, len: {}, view: {:?} }}",
                slice.start,
                slice.len,
                to_utf8(slice.data(buf))
            )),
        }
    }
}

impl Request {
    /// Render a parse result against its buffer, resolving every slice.
    pub fn debug(&self, fields: &[HeaderField], buf: &[u8]) -> Result<String, fmt::Error> {
        let mut result = String::new();
        result.write_str("Request {\n  method: ")?;
        self.method.debug(buf, &mut result)?;
        result.write_str(",\n  path: ")?;
        self.path.debug(buf, &mut result)?;
        result.write_fmt(format_args!(
            ",\n  minor_version: {:?}",
            self.minor_version
        ))?;
        result.write_str(",\n  fields: [")?;
        debug_fields(&fields[..self.num_fields], buf, &mut result)?;
        result.write_str("],\n}")?;
        Ok(result)
    }
}

impl Response {
    pub fn debug(&self, fields: &[HeaderField], buf: &[u8]) -> Result<String, fmt::Error> {
        let mut result = String::new();
        result.write_fmt(format_args!(
            "Response {{\n  minor_version: {:?}",
            self.minor_version
        ))?;
        result.write_fmt(format_args!(",\n  status: {:?}", self.status))?;
        result.write_str(",\n  reason: ")?;
        self.reason.debug(buf, &mut result)?;
        result.write_str(",\n  fields: [")?;
        debug_fields(&fields[..self.num_fields], buf, &mut result)?;
        result.write_str("],\n}")?;
        Ok(result)
    }
}

fn debug_fields(fields: &[HeaderField], buf: &[u8], result: &mut String) -> fmt::Result {
    for field in fields {
        match field {
            HeaderField::Field { name, value } => result.write_fmt(format_args!(
                "\n    Field {{ name: {:?}, value: {:?} }},",
                to_utf8(name.data(buf)),
                to_utf8(value.data(buf))
            ))?,
            HeaderField::Continuation { value } => result.write_fmt(format_args!(
                "\n    Continuation {{ value: {:?} }},",
                to_utf8(value.data(buf))
            ))?,
        }
    }
    if !fields.is_empty() {
        result.write_str("\n  ")?;
    }
    Ok(())
}
