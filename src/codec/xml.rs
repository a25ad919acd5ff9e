//! XML bridge
//!
//! Converts between the JSON object model and a small XML element tree, and
//! between that tree and text via `quick-xml`. Element names are matched by
//! local name on input; prefixes are only written on output.

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use serde_json::{Map, Value};

use super::schema::{Namespace, Schema};
use super::WireElement;
use crate::support::errors::CodecError;

/// One XML element. `name` is qualified (`prefix:local`) when built for
/// output and local when parsed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlNode {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<XmlNode>,
    pub text: String,
}

impl XmlNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_child(mut self, child: XmlNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((key.into(), value.into()));
        self
    }

    pub fn local_name(&self) -> &str {
        self.name.rsplit(':').next().unwrap_or(&self.name)
    }

    pub fn child(&self, local: &str) -> Option<&XmlNode> {
        self.children.iter().find(|c| c.local_name() == local)
    }
}

fn xml_err(e: impl std::fmt::Display) -> CodecError {
    CodecError::Xml(e.to_string())
}

// ── Text <-> tree ──────────────────────────────────────────────

pub fn parse_document(input: &str) -> Result<XmlNode, CodecError> {
    let mut reader = Reader::from_str(input);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<XmlNode> = Vec::new();
    let mut root: Option<XmlNode> = None;

    loop {
        match reader.read_event().map_err(xml_err)? {
            Event::Start(e) => stack.push(start_node(&e)?),
            Event::Empty(e) => {
                let node = start_node(&e)?;
                attach(&mut stack, &mut root, node)?;
            }
            Event::End(_) => {
                let node = stack
                    .pop()
                    .ok_or_else(|| CodecError::Xml("unbalanced end tag".into()))?;
                attach(&mut stack, &mut root, node)?;
            }
            Event::Text(t) => {
                let text = t.unescape().map_err(xml_err)?;
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&text);
                }
            }
            Event::CData(c) => {
                let text = std::str::from_utf8(c.as_ref()).map_err(xml_err)?.to_string();
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&text);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !stack.is_empty() {
        return Err(CodecError::Xml("unexpected end of document".into()));
    }
    root.ok_or_else(|| CodecError::Xml("document has no root element".into()))
}

fn start_node(e: &BytesStart<'_>) -> Result<XmlNode, CodecError> {
    let name = std::str::from_utf8(e.local_name().as_ref())
        .map_err(xml_err)?
        .to_string();
    let mut node = XmlNode::new(name);

    for attr in e.attributes() {
        let attr = attr.map_err(xml_err)?;
        let key = std::str::from_utf8(attr.key.as_ref()).map_err(xml_err)?;
        if key == "xmlns" || key.starts_with("xmlns:") {
            continue;
        }
        let local = std::str::from_utf8(attr.key.local_name().as_ref())
            .map_err(xml_err)?
            .to_string();
        let value = attr.unescape_value().map_err(xml_err)?.into_owned();
        node.attributes.push((local, value));
    }
    Ok(node)
}

fn attach(
    stack: &mut [XmlNode],
    root: &mut Option<XmlNode>,
    node: XmlNode,
) -> Result<(), CodecError> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(node),
        None if root.is_none() => *root = Some(node),
        None => return Err(CodecError::Xml("more than one root element".into())),
    }
    Ok(())
}

pub fn write_document(node: &XmlNode) -> Result<String, CodecError> {
    let mut writer = Writer::new(Vec::new());
    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
        .map_err(xml_err)?;
    write_node(&mut writer, node)?;
    String::from_utf8(writer.into_inner()).map_err(xml_err)
}

fn write_node(writer: &mut Writer<Vec<u8>>, node: &XmlNode) -> Result<(), CodecError> {
    let mut start = BytesStart::new(node.name.as_str());
    for (key, value) in &node.attributes {
        start.push_attribute((key.as_str(), value.as_str()));
    }

    if node.children.is_empty() && node.text.is_empty() {
        return writer.write_event(Event::Empty(start)).map_err(xml_err);
    }

    writer.write_event(Event::Start(start)).map_err(xml_err)?;
    if !node.text.is_empty() {
        writer
            .write_event(Event::Text(BytesText::new(&node.text)))
            .map_err(xml_err)?;
    }
    for child in &node.children {
        write_node(writer, child)?;
    }
    writer
        .write_event(Event::End(BytesEnd::new(node.name.as_str())))
        .map_err(xml_err)
}

// ── Model <-> tree ─────────────────────────────────────────────

/// Render a message element in the namespace of its root.
pub fn element_to_node(element: &WireElement, schema: &Schema) -> XmlNode {
    let ns = schema.root_namespace(&element.name);
    let mut out = Vec::new();
    value_to_nodes(&element.name, &element.body, ns, schema, &mut out);
    out.pop()
        .unwrap_or_else(|| XmlNode::new(qualified(ns, &element.name)))
}

fn qualified(ns: Namespace, name: &str) -> String {
    format!("{}:{}", ns.prefix(), name)
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn value_to_nodes(key: &str, value: &Value, ns: Namespace, schema: &Schema, out: &mut Vec<XmlNode>) {
    let ns = if schema.is_common(key) {
        Namespace::CommonTypes
    } else {
        ns
    };
    let Some(name) = schema.xml_name(ns, key) else {
        return;
    };

    match value {
        Value::Null => {}
        Value::Array(items) => match schema.list_item(key) {
            Some(item) => {
                let mut wrapper = XmlNode::new(qualified(ns, name));
                for v in items {
                    value_to_nodes(item, v, ns, schema, &mut wrapper.children);
                }
                out.push(wrapper);
            }
            None => {
                for v in items {
                    value_to_nodes(key, v, ns, schema, out);
                }
            }
        },
        Value::Object(map) => {
            let mut node = XmlNode::new(qualified(ns, name));
            if let Some(attributes) = schema.attributes_of(key) {
                for (k, v) in map {
                    if attributes.contains(&k.as_str()) {
                        if let Some(text) = scalar_text(v).filter(|t| !t.is_empty()) {
                            node.attributes.push((k.clone(), text));
                        }
                    } else if k == "value" {
                        node.text = scalar_text(v).unwrap_or_default();
                    }
                }
            } else {
                let child_ns = if schema.has_common_children(key) {
                    Namespace::CommonTypes
                } else {
                    ns
                };
                for (k, v) in map {
                    value_to_nodes(k, v, child_ns, schema, &mut node.children);
                }
            }
            out.push(node);
        }
        scalar => {
            let mut node = XmlNode::new(qualified(ns, name));
            node.text = scalar_text(scalar).unwrap_or_default();
            out.push(node);
        }
    }
}

/// Read a message root into the object model.
pub fn node_to_element(node: &XmlNode, schema: &Schema) -> WireElement {
    WireElement {
        name: node.local_name().to_string(),
        body: node_to_value(node, schema),
    }
}

fn node_to_value(node: &XmlNode, schema: &Schema) -> Value {
    let local = node.local_name();
    let key = schema.model_name(local);

    if let Some(attributes) = schema.attributes_of(local) {
        let mut map = Map::new();
        for (k, v) in &node.attributes {
            if attributes.contains(&k.as_str()) {
                map.insert(k.clone(), Value::String(v.clone()));
            }
        }
        map.insert("value".into(), Value::String(node.text.trim().to_string()));
        return Value::Object(map);
    }

    if node.children.is_empty() {
        return Value::String(node.text.trim().to_string());
    }

    if schema.list_item(key).is_some() {
        return Value::Array(
            node.children
                .iter()
                .map(|c| node_to_value(c, schema))
                .collect(),
        );
    }

    let mut map = Map::new();
    for child in &node.children {
        let local = child.local_name();
        let child_key = schema.model_name(local).to_string();
        let value = node_to_value(child, schema);
        if occurrences(node, local) > 1 {
            match map
                .entry(child_key)
                .or_insert_with(|| Value::Array(Vec::new()))
            {
                Value::Array(items) => items.push(value),
                other => *other = value,
            }
        } else {
            map.insert(child_key, value);
        }
    }
    Value::Object(map)
}

fn occurrences(parent: &XmlNode, local: &str) -> usize {
    parent
        .children
        .iter()
        .filter(|c| c.local_name() == local)
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::version::OicpVersion;
    use serde_json::json;

    fn schema() -> Schema {
        Schema::new(OicpVersion::V2_2)
    }

    #[test]
    fn wrappers_attributes_and_prefixes() {
        let element = WireElement {
            name: "eRoamingPushEvseData".into(),
            body: json!({
                "ActionType": "fullLoad",
                "OperatorEvseData": {
                    "OperatorID": "DE*GEF",
                    "EvseDataRecord": [{
                        "EvseID": "DE*GEF*E1",
                        "ChargingStationNames": [{"lang": "de", "value": "Rathaus"}],
                        "Address": {"Country": "DEU", "City": "Jena", "Street": "Markt"},
                        "Plugs": ["Type 2 Outlet", "Type F Schuko"]
                    }]
                }
            }),
        };

        let node = element_to_node(&element, &schema());
        assert_eq!(node.name, "EVSEData:eRoamingPushEvseData");

        let xml = write_document(&node).unwrap();
        assert!(xml.contains("<EVSEData:EvseId>DE*GEF*E1</EVSEData:EvseId>"));
        assert!(xml.contains(r#"<CommonTypes:InfoText lang="de">Rathaus</CommonTypes:InfoText>"#));
        assert!(xml.contains("<CommonTypes:City>Jena</CommonTypes:City>"));
        assert!(xml.contains("<EVSEData:Plugs><EVSEData:Plug>Type 2 Outlet</EVSEData:Plug>"));

        let parsed = node_to_element(&parse_document(&xml).unwrap(), &schema());
        assert_eq!(parsed.name, "eRoamingPushEvseData");
        let record = &parsed.body["OperatorEvseData"]["EvseDataRecord"];
        assert_eq!(record["EvseID"], "DE*GEF*E1");
        assert_eq!(record["Plugs"], json!(["Type 2 Outlet", "Type F Schuko"]));
        assert_eq!(record["ChargingStationNames"], json!([{"lang": "de", "value": "Rathaus"}]));
    }

    #[test]
    fn repeated_elements_become_arrays() {
        let xml = "<a:Root xmlns:a=\"urn:x\"><a:Item>1</a:Item><a:Item>2</a:Item><a:Item>3</a:Item><a:Other/></a:Root>";
        let element = node_to_element(&parse_document(xml).unwrap(), &schema());
        assert_eq!(element.body, json!({"Item": ["1", "2", "3"], "Other": ""}));
    }

    #[test]
    fn malformed_documents_are_errors() {
        for xml in ["", "<a>", "<a></b>", "<a/><b/>", "not xml at all"] {
            assert!(parse_document(xml).is_err(), "accepted {:?}", xml);
        }
    }
}
