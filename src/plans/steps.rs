use crate::host::Block;
use crate::plans::BlockPlanData;
use std::fmt::Debug;

const DEFAULT_COLOUR: u16 = 255;

/// An initialization step a block plan runs on every new block before laying
/// it out.
pub trait BlockPlanStep: Debug + Send + Sync {
    fn initialize_block(&self, block: &mut Block);
}

/// Sets the block's hue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetColourStep {
    colour: u16,
}

impl SetColourStep {
    pub fn new(data: &BlockPlanData) -> Self {
        Self {
            colour: data.colour.unwrap_or(DEFAULT_COLOUR),
        }
    }
}

impl BlockPlanStep for SetColourStep {
    fn initialize_block(&self, block: &mut Block) {
        block.set_colour(self.colour);
    }
}

/// The steps every block plan starts with.
pub fn default_steps(data: &BlockPlanData) -> Vec<Box<dyn BlockPlanStep>> {
    vec![Box::new(SetColourStep::new(data))]
}
