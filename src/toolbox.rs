//! The palette blocks are dragged from, in the editor's JSON shape.

use crate::colour::colour_from_string;
use crate::host::BlockState;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

const CATEGORY_TOOLBOX: &str = "categoryToolbox";

fn category_toolbox() -> String {
    CATEGORY_TOOLBOX.to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Toolbox {
    #[serde(default = "category_toolbox")]
    pub kind: String,
    #[serde(default)]
    pub contents: Vec<ToolboxItem>,
}

/// One entry of a toolbox or category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ToolboxItem {
    Category(ToolboxCategory),
    #[serde(rename = "sep")]
    Separator,
    /// A block and the state it is placed with.
    Block(BlockState),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolboxCategory {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub colour: Option<String>,
    #[serde(default)]
    pub contents: Vec<ToolboxItem>,
}

impl ToolboxCategory {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    pub fn with_colour(mut self, colour: &str) -> Self {
        self.colour = Some(colour.to_string());
        self
    }

    /// Block types listed directly in this category.
    pub fn block_types(&self) -> impl Iterator<Item = &str> {
        self.contents.iter().filter_map(|item| match item {
            ToolboxItem::Block(state) => Some(state.block_type.as_str()),
            _ => None,
        })
    }
}

impl Default for Toolbox {
    fn default() -> Self {
        Self::new()
    }
}

impl Toolbox {
    pub fn new() -> Self {
        Self {
            kind: category_toolbox(),
            contents: Vec::new(),
        }
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn push(&mut self, item: ToolboxItem) {
        self.contents.push(item);
    }

    pub fn categories(&self) -> impl Iterator<Item = &ToolboxCategory> {
        self.contents.iter().filter_map(|item| match item {
            ToolboxItem::Category(category) => Some(category),
            _ => None,
        })
    }

    pub fn category(&self, name: &str) -> Option<&ToolboxCategory> {
        self.categories().find(|category| category.name == name)
    }

    pub fn category_mut(&mut self, name: &str) -> Option<&mut ToolboxCategory> {
        self.contents.iter_mut().find_map(|item| match item {
            ToolboxItem::Category(category) if category.name == name => Some(category),
            _ => None,
        })
    }

    /// Appends `entry` to every top-level category named in `categories`.
    /// Categories that do not exist yet are added at the end, coloured from
    /// their name.
    pub fn add_block(&mut self, entry: ToolboxItem, categories: &[String]) {
        for name in categories.iter().unique() {
            match self.category_mut(name) {
                Some(category) => category.contents.push(entry.clone()),
                None => {
                    let colour = colour_from_string(name);
                    log::debug!("Created toolbox category '{}' ({})", name, colour);
                    let mut category = ToolboxCategory::new(name).with_colour(&colour);
                    category.contents.push(entry.clone());
                    self.push(ToolboxItem::Category(category));
                }
            }
        }
    }
}
