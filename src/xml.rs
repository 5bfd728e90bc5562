//! XML to JSON conversion.
//!
//! Follows the xmltodict layout: the document becomes `{root: value}`,
//! attributes are keys prefixed with `@`, repeated child elements collapse
//! into arrays, character data goes under `#text` (or is the whole value of a
//! plain text element) and empty elements become `null`. Qualified names keep
//! their prefixes and key order follows the document.

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use serde_json::{Map, Value};

use crate::error::{Result, ToolError};

pub const DEFAULT_XML_INPUT: &str = "data/xmlmetadata.xml";
pub const DEFAULT_JSON_OUTPUT: &str = "data/jsonmetadata.json";

const ATTRIBUTE_PREFIX: &str = "@";
const TEXT_KEY: &str = "#text";

struct Frame {
    name: String,
    fields: Map<String, Value>,
    text: String,
    has_children: bool,
}

impl Frame {
    fn open(start: &BytesStart<'_>) -> Result<Self> {
        let name = utf8(start.name().as_ref())?.to_string();
        let mut fields = Map::new();
        for attribute in start.attributes() {
            let attribute = attribute.map_err(xml_error)?;
            let key = format!("{}{}", ATTRIBUTE_PREFIX, utf8(attribute.key.as_ref())?);
            let value = attribute.unescape_value().map_err(xml_error)?;
            fields.insert(key, Value::String(value.into_owned()));
        }
        Ok(Self {
            name,
            fields,
            text: String::new(),
            has_children: false,
        })
    }

    fn close(self) -> (String, Value) {
        let text = self.text.trim();
        let value = if self.fields.is_empty() && !self.has_children {
            if text.is_empty() {
                Value::Null
            } else {
                Value::String(text.to_string())
            }
        } else {
            let mut fields = self.fields;
            if !text.is_empty() {
                fields.insert(TEXT_KEY.to_string(), Value::String(text.to_string()));
            }
            Value::Object(fields)
        };
        (self.name, value)
    }

    fn add_child(&mut self, name: String, value: Value) {
        self.has_children = true;
        match self.fields.get_mut(&name) {
            Some(Value::Array(items)) => items.push(value),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, value]);
            }
            None => {
                self.fields.insert(name, value);
            }
        }
    }
}

/// Parse an XML document into its JSON mirror
pub fn xml_to_json(xml: &str) -> Result<Value> {
    let mut reader = Reader::from_str(xml);
    let mut stack: Vec<Frame> = Vec::new();
    let mut root: Option<(String, Value)> = None;

    loop {
        let event = reader.read_event().map_err(|e| {
            ToolError::parse("XML", format!("{} at position {}", e, reader.buffer_position()))
        })?;
        match event {
            Event::Start(start) => {
                ensure_single_root(&root, &stack)?;
                stack.push(Frame::open(&start)?);
            }
            Event::Empty(start) => {
                ensure_single_root(&root, &stack)?;
                let frame = Frame::open(&start)?;
                finish(frame, &mut stack, &mut root);
            }
            Event::End(_) => {
                let frame = stack
                    .pop()
                    .ok_or_else(|| ToolError::parse("XML", "closing tag without matching opening tag"))?;
                finish(frame, &mut stack, &mut root);
            }
            Event::Text(text) => {
                let text = text.unescape().map_err(xml_error)?;
                append_text(&mut stack, &text)?;
            }
            Event::CData(cdata) => {
                let text = utf8(&cdata)?.to_string();
                append_text(&mut stack, &text)?;
            }
            Event::Eof => break,
            // declarations, comments, processing instructions, doctype
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(ToolError::parse("XML", format!("unclosed element <{}>", open.name)));
    }
    let (name, value) = root.ok_or_else(|| ToolError::parse("XML", "document has no root element"))?;

    let mut document = Map::new();
    document.insert(name, value);
    Ok(Value::Object(document))
}

fn finish(frame: Frame, stack: &mut [Frame], root: &mut Option<(String, Value)>) {
    let (name, value) = frame.close();
    match stack.last_mut() {
        Some(parent) => parent.add_child(name, value),
        None => *root = Some((name, value)),
    }
}

fn ensure_single_root(root: &Option<(String, Value)>, stack: &[Frame]) -> Result<()> {
    if stack.is_empty() && root.is_some() {
        return Err(ToolError::parse("XML", "more than one root element"));
    }
    Ok(())
}

fn append_text(stack: &mut [Frame], text: &str) -> Result<()> {
    match stack.last_mut() {
        Some(frame) => frame.text.push_str(text),
        None if text.trim().is_empty() => {}
        None => return Err(ToolError::parse("XML", "text outside the root element")),
    }
    Ok(())
}

fn utf8(bytes: &[u8]) -> Result<&str> {
    std::str::from_utf8(bytes).map_err(|e| ToolError::parse("XML", e))
}

fn xml_error(e: impl std::fmt::Display) -> ToolError {
    ToolError::parse("XML", e)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_attributes_children_and_text() {
        let xml = r#"<?xml version="1.0" encoding="utf-8"?>
<edmx:Edmx Version="4.0" xmlns:edmx="http://docs.oasis-open.org/odata/ns/edmx">
  <edmx:DataServices>
    <Schema Namespace="Microsoft.Dynamics.CRM">
      <EntityType Name="task">
        <Key><PropertyRef Name="activityid"/></Key>
        <Property Name="subject" Type="Edm.String"/>
        <Property Name="statecode" Type="Edm.Int32"/>
      </EntityType>
      <Annotation>Activity &amp; more</Annotation>
      <Empty/>
    </Schema>
  </edmx:DataServices>
</edmx:Edmx>"#;

        let value = xml_to_json(xml).unwrap();

        assert_eq!(
            value,
            json!({
                "edmx:Edmx": {
                    "@Version": "4.0",
                    "@xmlns:edmx": "http://docs.oasis-open.org/odata/ns/edmx",
                    "edmx:DataServices": {
                        "Schema": {
                            "@Namespace": "Microsoft.Dynamics.CRM",
                            "EntityType": {
                                "@Name": "task",
                                "Key": {"PropertyRef": {"@Name": "activityid"}},
                                "Property": [
                                    {"@Name": "subject", "@Type": "Edm.String"},
                                    {"@Name": "statecode", "@Type": "Edm.Int32"}
                                ]
                            },
                            "Annotation": "Activity & more",
                            "Empty": null
                        }
                    }
                }
            })
        );
    }

    #[test]
    fn test_keys_follow_document_order() {
        let value = xml_to_json(r#"<r z="1"><b/><a/></r>"#).unwrap();
        let keys: Vec<&String> = value["r"].as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["@z", "b", "a"]);
    }

    #[test]
    fn test_text_next_to_attributes() {
        let value = xml_to_json(r#"<label lang="fa">  <![CDATA[وظیفه]]>  </label>"#).unwrap();
        assert_eq!(value, json!({"label": {"@lang": "fa", "#text": "وظیفه"}}));
    }

    #[test]
    fn test_malformed_xml_is_parse_error() {
        for xml in ["<a><b></a>", "<a>", "", "<a/><b/>", "text<a/>"] {
            let err = xml_to_json(xml).unwrap_err();
            assert!(matches!(err, ToolError::Parse { .. }), "accepted {:?}", xml);
        }
    }
}
