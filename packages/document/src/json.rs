//! # JSON Format
//!
//! The exchanged form of a document is a JSON object keyed by block id:
//!
//! ```json
//! {
//!   "root": { "type": "EmailLayout", "data": { "childrenIds": ["b1"] } },
//!   "b1":   { "type": "Container", "data": { "props": { "childrenIds": [] } } }
//! }
//! ```
//!
//! Children lists live inside `data` as `childrenIds` (or `columns: [{
//! childrenIds }]` for columns containers), either directly or under
//! `data.props`. The importer strips them out of the opaque data, records
//! where they were found, and the exporter writes them back to the same
//! place, so `export(import(json))` reproduces the input shape.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::{Block, BlockId, BlockKind, ChildrenPlacement, Document, ImportError, Slots, ROOT_ID};

const CHILDREN_FIELD: &str = "childrenIds";
const COLUMNS_FIELD: &str = "columns";
const PROPS_FIELD: &str = "props";

/// Parse a document from JSON text
pub fn from_json_str(source: &str) -> Result<Document, ImportError> {
    let value: Value = serde_json::from_str(source)?;
    from_json_value(value)
}

/// Parse a document from an already-decoded JSON value
pub fn from_json_value(value: Value) -> Result<Document, ImportError> {
    let Value::Object(entries) = value else {
        return Err(ImportError::NotAnObject);
    };

    if !entries.contains_key(ROOT_ID) {
        return Err(ImportError::MissingRoot);
    }

    let mut blocks = Vec::with_capacity(entries.len());
    for (id, entry) in entries {
        let block = block_from_json(&id, entry)?;
        blocks.push((id, block));
    }

    let document = Document::from_blocks(blocks)?;
    tracing::debug!(blocks = document.len(), "Imported document");
    Ok(document)
}

/// Serialize a document to its JSON value
pub fn to_json_value(document: &Document) -> Value {
    let entries: Map<String, Value> = document
        .iter()
        .map(|(id, block)| (id.clone(), block_to_json(block)))
        .collect();
    Value::Object(entries)
}

/// Serialize a document to pretty-printed JSON text
pub fn to_json_string(document: &Document) -> String {
    // Serializing a `Value` cannot fail
    serde_json::to_string_pretty(&to_json_value(document)).unwrap_or_default()
}

/// Decode one `{ type, data }` entry
pub fn block_from_json(id: &str, entry: Value) -> Result<Block, ImportError> {
    let Value::Object(mut entry) = entry else {
        return Err(ImportError::invalid(id, "entry must be an object"));
    };

    let kind = match entry.remove("type") {
        Some(Value::String(kind)) => kind
            .parse::<BlockKind>()
            .map_err(|kind| ImportError::UnknownKind {
                id: id.to_string(),
                kind,
            })?,
        Some(_) => return Err(ImportError::invalid(id, "\"type\" must be a string")),
        None => return Err(ImportError::invalid(id, "missing \"type\"")),
    };

    let mut data = match entry.remove("data") {
        Some(Value::Object(data)) => data,
        Some(Value::Null) | None => Map::new(),
        Some(_) => return Err(ImportError::invalid(id, "\"data\" must be an object")),
    };

    let (slots, placement) = take_slots(id, kind, &mut data)?;

    Ok(Block {
        kind,
        data,
        slots,
        placement,
    })
}

/// Encode one block as `{ type, data }`
pub fn block_to_json(block: &Block) -> Value {
    let mut data = block.data.clone();

    let children = match &block.slots {
        Slots::Leaf => None,
        Slots::List(ids) => Some((CHILDREN_FIELD, ids_to_json(ids))),
        Slots::Columns(columns) => Some((
            COLUMNS_FIELD,
            Value::Array(
                columns
                    .iter()
                    .map(|ids| {
                        let mut column = Map::new();
                        column.insert(CHILDREN_FIELD.to_string(), ids_to_json(ids));
                        Value::Object(column)
                    })
                    .collect(),
            ),
        )),
    };

    if let Some((field, value)) = children {
        match block.placement {
            ChildrenPlacement::Data => {
                data.insert(field.to_string(), value);
            }
            ChildrenPlacement::Props => match data.get_mut(PROPS_FIELD) {
                Some(Value::Object(props)) => {
                    props.insert(field.to_string(), value);
                }
                // A non-object `props` is kept; the children go on `data`
                Some(_) => {
                    data.insert(field.to_string(), value);
                }
                None => {
                    let mut props = Map::new();
                    props.insert(field.to_string(), value);
                    data.insert(PROPS_FIELD.to_string(), Value::Object(props));
                }
            },
        }
    }

    let mut entry = Map::new();
    entry.insert("type".to_string(), Value::String(block.kind.to_string()));
    entry.insert("data".to_string(), Value::Object(data));
    Value::Object(entry)
}

/// Pull the children fields out of `data`, first directly, then from
/// `data.props`.
///
/// A `props` object left empty once the children are taken out is dropped,
/// since the exporter recreates it. Children found directly on `data` next
/// to a non-object `props` count as props-placed for kinds that default to
/// it, matching what the exporter writes for them.
fn take_slots(
    id: &str,
    kind: BlockKind,
    data: &mut Map<String, Value>,
) -> Result<(Slots, ChildrenPlacement), ImportError> {
    if let Some(found) = take_children_fields(id, data)? {
        let props_is_value = data.get(PROPS_FIELD).map_or(false, |props| !props.is_object());
        let placement = if props_is_value && kind.default_placement() == ChildrenPlacement::Props {
            ChildrenPlacement::Props
        } else {
            ChildrenPlacement::Data
        };
        return check_shape(id, kind, found, placement);
    }

    if let Some(Value::Object(props)) = data.get_mut(PROPS_FIELD) {
        if let Some(found) = take_children_fields(id, props)? {
            if props.is_empty() {
                data.remove(PROPS_FIELD);
            }
            return check_shape(id, kind, found, ChildrenPlacement::Props);
        }
    }

    let slots = kind.default_slots();
    let placement = kind.default_placement();
    if !slots.is_leaf() && placement == ChildrenPlacement::Props && is_empty_object(data.get(PROPS_FIELD)) {
        data.remove(PROPS_FIELD);
    }
    Ok((slots, placement))
}

fn is_empty_object(value: Option<&Value>) -> bool {
    matches!(value, Some(Value::Object(object)) if object.is_empty())
}

fn check_shape(
    id: &str,
    kind: BlockKind,
    slots: Slots,
    placement: ChildrenPlacement,
) -> Result<(Slots, ChildrenPlacement), ImportError> {
    if !kind.accepts_shape(&slots) {
        return Err(ImportError::invalid(
            id,
            format!("children fields do not fit kind {kind}"),
        ));
    }
    Ok((slots, placement))
}

fn take_children_fields(
    id: &str,
    object: &mut Map<String, Value>,
) -> Result<Option<Slots>, ImportError> {
    let list = object.remove(CHILDREN_FIELD);
    let columns = object.remove(COLUMNS_FIELD);

    match (list, columns) {
        (Some(_), Some(_)) => Err(ImportError::invalid(
            id,
            "both \"childrenIds\" and \"columns\" are present",
        )),
        (Some(list), None) => Ok(Some(Slots::List(ids_from_json(id, list)?))),
        (None, Some(Value::Array(columns))) => {
            let columns = columns
                .into_iter()
                .map(|column| match column {
                    Value::Object(mut column) => match column.remove(CHILDREN_FIELD) {
                        Some(ids) => ids_from_json(id, ids),
                        None => Ok(Vec::new()),
                    },
                    _ => Err(ImportError::invalid(id, "each column must be an object")),
                })
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Some(Slots::Columns(columns)))
        }
        (None, Some(_)) => Err(ImportError::invalid(id, "\"columns\" must be an array")),
        (None, None) => Ok(None),
    }
}

fn ids_from_json(id: &str, value: Value) -> Result<Vec<BlockId>, ImportError> {
    let Value::Array(items) = value else {
        return Err(ImportError::invalid(id, "\"childrenIds\" must be an array"));
    };

    items
        .into_iter()
        .map(|item| match item {
            Value::String(child) => Ok(child),
            _ => Err(ImportError::invalid(id, "child ids must be strings")),
        })
        .collect()
}

fn ids_to_json(ids: &[BlockId]) -> Value {
    Value::Array(ids.iter().cloned().map(Value::String).collect())
}

impl Serialize for Block {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        block_to_json(self).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Block {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        block_from_json("<inline>", value).map_err(D::Error::custom)
    }
}

impl Serialize for Document {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        to_json_value(self).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Document {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        from_json_value(value).map_err(D::Error::custom)
    }
}
