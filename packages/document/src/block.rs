//! # Blocks
//!
//! A block is one editable content unit of an email template. Its identity
//! is the key it is stored under in the [`Document`](crate::Document); the
//! record itself carries the kind, the kind-specific `data` (opaque to the
//! core) and, for container kinds, the ordered children lists ("slots").

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Block identifier
pub type BlockId = String;

/// Number of columns a freshly created `ColumnsContainer` gets
pub const DEFAULT_COLUMNS: usize = 3;

/// Known block kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BlockKind {
    EmailLayout,
    Container,
    ColumnsContainer,
    Text,
    Heading,
    Button,
    Image,
    Avatar,
    Divider,
    Spacer,
    Html,
}

impl BlockKind {
    pub const ALL: [BlockKind; 11] = [
        BlockKind::EmailLayout,
        BlockKind::Container,
        BlockKind::ColumnsContainer,
        BlockKind::Text,
        BlockKind::Heading,
        BlockKind::Button,
        BlockKind::Image,
        BlockKind::Avatar,
        BlockKind::Divider,
        BlockKind::Spacer,
        BlockKind::Html,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BlockKind::EmailLayout => "EmailLayout",
            BlockKind::Container => "Container",
            BlockKind::ColumnsContainer => "ColumnsContainer",
            BlockKind::Text => "Text",
            BlockKind::Heading => "Heading",
            BlockKind::Button => "Button",
            BlockKind::Image => "Image",
            BlockKind::Avatar => "Avatar",
            BlockKind::Divider => "Divider",
            BlockKind::Spacer => "Spacer",
            BlockKind::Html => "Html",
        }
    }

    /// Whether blocks of this kind hold children lists
    pub fn is_container(&self) -> bool {
        matches!(
            self,
            BlockKind::EmailLayout | BlockKind::Container | BlockKind::ColumnsContainer
        )
    }

    /// Empty slots with the shape this kind requires
    pub fn default_slots(&self) -> Slots {
        match self {
            BlockKind::EmailLayout | BlockKind::Container => Slots::List(Vec::new()),
            BlockKind::ColumnsContainer => Slots::Columns(vec![Vec::new(); DEFAULT_COLUMNS]),
            _ => Slots::Leaf,
        }
    }

    /// Where the JSON format keeps this kind's children by default
    pub fn default_placement(&self) -> ChildrenPlacement {
        match self {
            BlockKind::Container | BlockKind::ColumnsContainer => ChildrenPlacement::Props,
            _ => ChildrenPlacement::Data,
        }
    }

    /// Whether `slots` has a shape this kind may carry
    pub fn accepts_shape(&self, slots: &Slots) -> bool {
        match (self, slots) {
            (BlockKind::EmailLayout | BlockKind::Container, Slots::List(_)) => true,
            (BlockKind::ColumnsContainer, Slots::Columns(columns)) => !columns.is_empty(),
            (kind, Slots::Leaf) => !kind.is_container(),
            _ => false,
        }
    }

    /// Kinds a container of this kind takes by default.
    ///
    /// The layout and plain containers take everything except the layout
    /// itself; columns additionally refuse nested columns.
    pub fn default_accepts(&self) -> Vec<BlockKind> {
        match self {
            BlockKind::EmailLayout | BlockKind::Container => BlockKind::ALL
                .into_iter()
                .filter(|k| *k != BlockKind::EmailLayout)
                .collect(),
            BlockKind::ColumnsContainer => BlockKind::ALL
                .into_iter()
                .filter(|k| !matches!(k, BlockKind::EmailLayout | BlockKind::ColumnsContainer))
                .collect(),
            _ => Vec::new(),
        }
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BlockKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BlockKind::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| s.to_string())
    }
}

/// Ordered children lists of a block
#[derive(Debug, Clone, PartialEq)]
pub enum Slots {
    /// No children (leaf kinds)
    Leaf,
    /// One ordered list
    List(Vec<BlockId>),
    /// One ordered list per column
    Columns(Vec<Vec<BlockId>>),
}

impl Slots {
    /// Number of children lists
    pub fn count(&self) -> usize {
        match self {
            Slots::Leaf => 0,
            Slots::List(_) => 1,
            Slots::Columns(columns) => columns.len(),
        }
    }

    pub fn slot(&self, index: usize) -> Option<&[BlockId]> {
        match self {
            Slots::Leaf => None,
            Slots::List(ids) => (index == 0).then_some(ids.as_slice()),
            Slots::Columns(columns) => columns.get(index).map(Vec::as_slice),
        }
    }

    pub fn slot_mut(&mut self, index: usize) -> Option<&mut Vec<BlockId>> {
        match self {
            Slots::Leaf => None,
            Slots::List(ids) => (index == 0).then_some(ids),
            Slots::Columns(columns) => columns.get_mut(index),
        }
    }

    /// Iterate `(slot index, children)` pairs
    pub fn iter(&self) -> impl Iterator<Item = (usize, &[BlockId])> + '_ {
        (0..self.count()).filter_map(move |i| self.slot(i).map(|ids| (i, ids)))
    }

    /// All child ids across every slot, in slot order
    pub fn child_ids(&self) -> impl Iterator<Item = &BlockId> + '_ {
        self.iter().flat_map(|(_, ids)| ids.iter())
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, Slots::Leaf)
    }
}

/// Where the JSON format keeps a container's children lists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChildrenPlacement {
    /// Directly on `data` (`data.childrenIds`, `data.columns`)
    Data,
    /// Nested under `data.props`
    Props,
}

/// One block record
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub kind: BlockKind,

    /// Kind-specific attributes with the children fields stripped out
    pub data: Map<String, Value>,

    pub slots: Slots,

    pub placement: ChildrenPlacement,
}

impl Block {
    /// Create an empty block of `kind` with the default slot shape
    pub fn new(kind: BlockKind) -> Self {
        Self {
            kind,
            data: Map::new(),
            slots: kind.default_slots(),
            placement: kind.default_placement(),
        }
    }

    /// Replace the opaque data
    pub fn with_data(mut self, data: Map<String, Value>) -> Self {
        self.data = data;
        self
    }

    /// Replace the single children list of a list container
    pub fn with_children<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<BlockId>,
    {
        self.slots = Slots::List(ids.into_iter().map(Into::into).collect());
        self
    }

    /// Replace the columns of a columns container
    pub fn with_columns<I, C, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: IntoIterator<Item = S>,
        S: Into<BlockId>,
    {
        self.slots = Slots::Columns(
            columns
                .into_iter()
                .map(|c| c.into_iter().map(Into::into).collect())
                .collect(),
        );
        self
    }

    pub fn with_placement(mut self, placement: ChildrenPlacement) -> Self {
        self.placement = placement;
        self
    }

    pub fn is_leaf(&self) -> bool {
        self.slots.is_leaf()
    }

    /// Children of slot `index`
    pub fn children(&self, index: usize) -> Option<&[BlockId]> {
        self.slots.slot(index)
    }
}

/// One ordered children list: a container block plus a slot index
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerRef {
    pub block_id: BlockId,
    #[serde(default)]
    pub slot: usize,
}

impl ContainerRef {
    /// The single list of a list container
    pub fn new(block_id: impl Into<BlockId>) -> Self {
        Self {
            block_id: block_id.into(),
            slot: 0,
        }
    }

    /// Column `slot` of a columns container
    pub fn column(block_id: impl Into<BlockId>, slot: usize) -> Self {
        Self {
            block_id: block_id.into(),
            slot,
        }
    }
}

impl fmt::Display for ContainerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.block_id, self.slot)
    }
}
