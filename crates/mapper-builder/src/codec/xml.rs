use std::sync::Arc;

use indexmap::IndexMap;
use quick_xml::{
  Reader, Writer,
  events::{BytesEnd, BytesStart, BytesText, Event},
};

use super::{parse_scalar, scalar_text};
use crate::{
  attribute::AttributeDef,
  error::{Error, Result},
  instance::Instance,
  schema::ObjectType,
  types::TypeRef,
  value::Value,
};

/// Element tree read from an XML document.
#[derive(Debug, Default)]
struct XmlNode {
  name: String,
  text: String,
  children: Vec<XmlNode>,
}

impl XmlNode {
  fn named(name: String) -> Self {
    Self {
      name,
      ..Default::default()
    }
  }
}

impl Instance {
  /// XML form of the instance, rooted at the type's XML root name. Every set
  /// attribute becomes a child element; collections repeat the element, so an
  /// empty collection writes nothing. Opaque values are written as JSON text.
  pub fn to_xml(&self) -> Result<String> {
    let mut writer = Writer::new(Vec::new());
    write_object(&mut writer, self.ty.xml_root(), self)?;
    finish(writer)
  }

  pub fn to_xml_pretty(&self) -> Result<String> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    write_object(&mut writer, self.ty.xml_root(), self)?;
    finish(writer)
  }

  /// Reads an instance from XML. The root element's name is not checked;
  /// child elements that are not attribute names are skipped.
  pub fn from_xml(ty: &Arc<ObjectType>, xml: &str) -> Result<Self> {
    let root = parse_tree(xml)?;
    from_node(ty, &root)
  }
}

fn finish(writer: Writer<Vec<u8>>) -> Result<String> {
  String::from_utf8(writer.into_inner()).map_err(|err| Error::invalid_value("xml", err.to_string()))
}

fn write_object(writer: &mut Writer<Vec<u8>>, name: &str, instance: &Instance) -> Result<()> {
  writer.write_event(Event::Start(BytesStart::new(name)))?;
  for (attr, child) in instance.iter() {
    write_element(writer, attr.name(), child)?;
  }
  writer.write_event(Event::End(BytesEnd::new(name)))?;
  Ok(())
}

fn write_element(writer: &mut Writer<Vec<u8>>, name: &str, value: &Value) -> Result<()> {
  match value {
    Value::List(items) => {
      for item in items {
        write_element(writer, name, item)?;
      }
    }
    Value::Object(instance) => write_object(writer, name, instance)?,
    scalar => {
      let text = scalar_text(scalar).unwrap_or_default();
      if text.is_empty() {
        writer.write_event(Event::Empty(BytesStart::new(name)))?;
      } else {
        writer.write_event(Event::Start(BytesStart::new(name)))?;
        writer.write_event(Event::Text(BytesText::new(&text)))?;
        writer.write_event(Event::End(BytesEnd::new(name)))?;
      }
    }
  }
  Ok(())
}

fn parse_tree(xml: &str) -> Result<XmlNode> {
  // Text is kept untrimmed; whitespace between child elements only lands in
  // object nodes, which never read their text.
  let mut reader = Reader::from_str(xml);

  let mut stack: Vec<XmlNode> = Vec::new();
  let mut root = None;

  loop {
    match reader.read_event()? {
      Event::Start(e) => {
        stack.push(XmlNode::named(String::from_utf8_lossy(e.local_name().as_ref()).into_owned()));
      }
      Event::Empty(e) => {
        let node = XmlNode::named(String::from_utf8_lossy(e.local_name().as_ref()).into_owned());
        attach(&mut stack, &mut root, node);
      }
      Event::Text(e) => {
        if let Some(top) = stack.last_mut() {
          let text = e.unescape().map_err(|err| Error::invalid_value(&top.name, err.to_string()))?;
          top.text.push_str(&text);
        }
      }
      Event::CData(e) => {
        if let Some(top) = stack.last_mut() {
          top.text.push_str(&String::from_utf8_lossy(&e));
        }
      }
      Event::End(_) => {
        if let Some(node) = stack.pop() {
          attach(&mut stack, &mut root, node);
        }
      }
      Event::Eof => break,
      _ => {}
    }
  }

  root.ok_or_else(|| Error::invalid_value("xml", "document has no root element"))
}

fn attach(stack: &mut [XmlNode], root: &mut Option<XmlNode>, node: XmlNode) {
  match stack.last_mut() {
    Some(parent) => parent.children.push(node),
    None => {
      if root.is_none() {
        *root = Some(node);
      }
    }
  }
}

fn from_node(ty: &Arc<ObjectType>, node: &XmlNode) -> Result<Instance> {
  let mut instance = Instance::new(ty);
  let mut collections: IndexMap<&str, Vec<Value>> = IndexMap::new();

  for child in &node.children {
    let Some(attr) = ty.find(&child.name).filter(|attr| attr.name() == child.name) else {
      continue;
    };

    let value = node_value(attr, child)?;
    if attr.is_collection() {
      collections.entry(attr.name()).or_default().push(value);
    } else {
      instance.set(attr.name(), value)?;
    }
  }

  for (name, items) in collections {
    instance.set(name, Value::List(items))?;
  }
  Ok(instance)
}

fn node_value(attr: &AttributeDef, node: &XmlNode) -> Result<Value> {
  match attr.type_ref() {
    TypeRef::Object(child_ty) => from_node(child_ty, node).map(Value::Object),
    TypeRef::Primitive(kind) => parse_scalar(*kind, &node.text).ok_or_else(|| {
      Error::invalid_value(
        attr.name(),
        format!("'{}' is not a valid {kind}", node.text),
      )
    }),
  }
}
