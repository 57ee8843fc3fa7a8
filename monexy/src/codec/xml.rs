//! Generic recursive array↔XML structural conversion.
//!
//! The gateway's XML dialect maps ordered key/value trees onto elements:
//! a nested value becomes a child element named by its key, an array entry
//! becomes an `item<index>` element (bare numeric names are not valid XML),
//! and scalars become leaf elements with their value string-coerced the way
//! the server expects (`true` → `"1"`, `false` and `null` → `""`). Parsing
//! reverses the mapping, restoring `item0..itemN` runs to positional arrays.

use std::io;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use serde_json::{Map, Value};

use crate::error::ProtocolError;

/// Renders a wire value as an indented XML document with a declaration.
///
/// The top-level value must be a map; each of its keys becomes a root
/// element (in practice there is exactly one, `request` or `response`).
#[must_use]
pub fn to_document(value: &Value) -> String {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    // Writing into an in-memory buffer cannot fail.
    render(&mut writer, value).expect("write to Vec failed");
    String::from_utf8(writer.into_inner()).expect("writer produced invalid UTF-8")
}

fn render(writer: &mut Writer<Vec<u8>>, value: &Value) -> io::Result<()> {
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;
    if let Value::Object(map) = value {
        for (key, child) in map {
            write_value(writer, &element_name(key), child)?;
        }
    }
    Ok(())
}

fn write_value(writer: &mut Writer<Vec<u8>>, name: &str, value: &Value) -> io::Result<()> {
    writer.write_event(Event::Start(BytesStart::new(name)))?;
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                write_value(writer, &element_name(key), child)?;
            }
        }
        Value::Array(items) => {
            for (index, child) in items.iter().enumerate() {
                write_value(writer, &format!("item{index}"), child)?;
            }
        }
        scalar => {
            writer.write_event(Event::Text(BytesText::new(&coerce(scalar))))?;
        }
    }
    writer.write_event(Event::End(BytesEnd::new(name)))
}

/// Element name for a map key: numeric keys are prefixed with `item` to stay
/// valid XML names.
fn element_name(key: &str) -> String {
    if !key.is_empty() && key.bytes().all(|b| b.is_ascii_digit()) {
        format!("item{key}")
    } else {
        key.to_owned()
    }
}

/// PHP-style scalar coercion used by the server's own serializer.
fn coerce(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(true) => "1".to_owned(),
        Value::Bool(false) | Value::Null => String::new(),
        Value::Object(_) | Value::Array(_) => unreachable!("nested values are not scalars"),
    }
}

/// Parses an XML document into a wire value keyed by root element name.
///
/// Leaf elements become strings, elements whose children are exactly
/// `item0..itemN` in order become arrays, and everything else becomes an
/// ordered map. Repeated sibling names other than `item<N>` keep the last
/// occurrence; the gateway never emits them.
///
/// # Errors
///
/// Returns [`ProtocolError::MalformedResponse`] if the input is not
/// well-formed XML or contains no root element.
pub fn from_document(input: &str) -> Result<Value, ProtocolError> {
    let mut reader = Reader::from_str(input);
    reader.config_mut().trim_text(true);

    let mut roots = Map::new();
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                let value = parse_element(&mut reader)?;
                roots.insert(name, value);
            }
            Ok(Event::Empty(e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                roots.insert(name, Value::String(String::new()));
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => return Err(ProtocolError::malformed(format!("invalid XML: {e}"))),
        }
    }

    if roots.is_empty() {
        return Err(ProtocolError::malformed("document has no root element"));
    }
    Ok(Value::Object(roots))
}

/// Parses the contents of an already-opened element up to its end tag.
fn parse_element(reader: &mut Reader<&[u8]>) -> Result<Value, ProtocolError> {
    let mut children = Map::new();
    let mut text = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                let value = parse_element(reader)?;
                children.insert(name, value);
            }
            Ok(Event::Empty(e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                children.insert(name, Value::String(String::new()));
            }
            Ok(Event::Text(t)) => {
                let chunk = t
                    .unescape()
                    .map_err(|e| ProtocolError::malformed(format!("invalid XML text: {e}")))?;
                text.push_str(&chunk);
            }
            Ok(Event::CData(t)) => {
                text.push_str(&String::from_utf8_lossy(&t.into_inner()));
            }
            Ok(Event::End(_)) => break,
            Ok(Event::Eof) => {
                return Err(ProtocolError::malformed("unexpected end of XML document"));
            }
            Ok(_) => {}
            Err(e) => return Err(ProtocolError::malformed(format!("invalid XML: {e}"))),
        }
    }

    if children.is_empty() {
        Ok(Value::String(text))
    } else {
        Ok(collapse(children))
    }
}

/// Restores a map whose keys are exactly `item0..itemN` in order to an array.
fn collapse(children: Map<String, Value>) -> Value {
    let positional = children
        .keys()
        .enumerate()
        .all(|(index, key)| *key == format!("item{index}"));
    if positional {
        Value::Array(children.into_iter().map(|(_, v)| v).collect())
    } else {
        Value::Object(children)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn balance_request_document_shape() {
        let value = json!({
            "request": {
                "apiName": "testAPI",
                "requestNumber": "123456789",
                "body": { "method": "balance" },
                "sign": "abc"
            }
        });
        let doc = to_document(&value);
        assert!(doc.starts_with("<?xml version=\"1.0\" encoding=\"utf-8\"?>"));
        assert!(doc.contains("<request>"));
        assert!(doc.contains("</request>"));
        assert!(doc.contains("<method>balance</method>"));
        // Indented output: children sit on their own, deeper-indented lines.
        assert!(doc.contains("\n  <body>"));
        assert!(doc.contains("\n    <method>"));
    }

    #[test]
    fn round_trips_nested_maps() {
        let value = json!({
            "request": {
                "apiName": "testAPI",
                "body": { "method": "balance", "card": "12345" }
            }
        });
        let parsed = from_document(&to_document(&value)).unwrap();
        assert_eq!(parsed, value);
    }

    #[test]
    fn arrays_become_item_elements_and_back() {
        let value = json!({
            "request": {
                "body": { "cards": ["111", "222", "333"] }
            }
        });
        let doc = to_document(&value);
        assert!(doc.contains("<item0>111</item0>"));
        assert!(doc.contains("<item2>333</item2>"));
        let parsed = from_document(&doc).unwrap();
        assert_eq!(parsed, value);
    }

    #[test]
    fn numeric_map_keys_get_item_prefix() {
        let value = json!({ "request": { "0": { "a": "x" } } });
        let doc = to_document(&value);
        assert!(doc.contains("<item0>"));
    }

    #[test]
    fn item_run_with_gap_stays_a_map() {
        let doc = "<r><item0>a</item0><item2>b</item2></r>";
        let parsed = from_document(doc).unwrap();
        assert_eq!(parsed, json!({ "r": { "item0": "a", "item2": "b" } }));
    }

    #[test]
    fn scalars_are_string_coerced() {
        let value = json!({
            "request": { "body": { "amount": 10.5, "test": true, "off": false, "gone": null } }
        });
        let doc = to_document(&value);
        assert!(doc.contains("<amount>10.5</amount>"));
        assert!(doc.contains("<test>1</test>"));
        assert!(doc.contains("<off></off>") || doc.contains("<off/>") || doc.contains("<off>"));
        let parsed = from_document(&doc).unwrap();
        assert_eq!(parsed["request"]["body"]["amount"], json!("10.5"));
        assert_eq!(parsed["request"]["body"]["test"], json!("1"));
        assert_eq!(parsed["request"]["body"]["off"], json!(""));
    }

    #[test]
    fn text_is_escaped_and_unescaped() {
        let value = json!({ "request": { "desc": "a<b&c>\"d\"" } });
        let parsed = from_document(&to_document(&value)).unwrap();
        assert_eq!(parsed, value);
    }

    #[test]
    fn non_xml_is_malformed() {
        let err = from_document("{\"not\": \"xml\"}").unwrap_err();
        assert!(matches!(err, ProtocolError::MalformedResponse(_)));
    }

    #[test]
    fn mismatched_tags_are_malformed() {
        let err = from_document("<a><b></a></b>").unwrap_err();
        assert!(matches!(err, ProtocolError::MalformedResponse(_)));
    }

    #[test]
    fn empty_document_is_malformed() {
        let err = from_document("<?xml version=\"1.0\"?>").unwrap_err();
        assert!(matches!(err, ProtocolError::MalformedResponse(_)));
    }
}
