use crate::error::HostError;
use crate::host::{Block, BlockId, BlockState, Host, InputKind};
use serde_json::Value;

/// Which connection of the parent a child hangs from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Socket {
    Input,
    Next,
}

/// Owns block instances and the connections between them.
#[derive(Debug, Default)]
pub struct Workspace {
    blocks: Vec<Option<Block>>,
}

impl Workspace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Instantiates a block of the given type by running its definition.
    pub fn new_block(&mut self, host: &Host, type_name: &str) -> Result<BlockId, HostError> {
        let definition = host.definition(type_name)?;
        let id = BlockId(self.blocks.len());
        let mut block = Block::new(id, type_name);
        definition.init(&mut block, &host.classes)?;
        log::debug!("Created block {} of type '{}'", id, type_name);
        self.blocks.push(Some(block));
        Ok(id)
    }

    pub fn get(&self, id: BlockId) -> Option<&Block> {
        self.blocks.get(id.0).and_then(Option::as_ref)
    }

    pub fn block(&self, id: BlockId) -> Result<&Block, HostError> {
        self.get(id).ok_or(HostError::NoSuchBlock(id.0))
    }

    pub fn block_mut(&mut self, id: BlockId) -> Result<&mut Block, HostError> {
        self.blocks
            .get_mut(id.0)
            .and_then(Option::as_mut)
            .ok_or(HostError::NoSuchBlock(id.0))
    }

    /// Blocks with no parent, in creation order.
    pub fn top_blocks(&self) -> Vec<BlockId> {
        self.blocks
            .iter()
            .flatten()
            .filter(|b| b.parent.is_none())
            .map(|b| b.id)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.blocks.iter().flatten().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Plugs `child` into the named input of `parent`.
    ///
    /// Value inputs take the child's output connection, statement inputs its
    /// previous connection. Whatever occupied the input before is unplugged
    /// and becomes a top-level block.
    pub fn connect(
        &mut self,
        parent: BlockId,
        input_name: &str,
        child: BlockId,
    ) -> Result<(), HostError> {
        let parent_block = self.block(parent)?;
        let child_block = self.block(child)?;
        let input_id =
            parent_block
                .get_input(input_name)
                .ok_or_else(|| HostError::NoSuchInput {
                    block_type: parent_block.type_name.clone(),
                    input: input_name.to_string(),
                })?;
        let input = parent_block.input(input_id);

        let connection_error = |message: &str| HostError::ConnectionError {
            parent_type: parent_block.type_name.clone(),
            child_type: child_block.type_name.clone(),
            message: message.to_string(),
        };

        let socket = input
            .connection
            .as_ref()
            .ok_or_else(|| connection_error(&format!("input '{}' has no connection", input_name)))?;
        let plug = match input.kind {
            InputKind::Statement => child_block.previous.as_ref(),
            _ => child_block.output.as_ref(),
        }
        .ok_or_else(|| connection_error("child block has no matching connection"))?;

        if !socket.is_compatible(plug) {
            return Err(connection_error(&format!(
                "types {:?} are not accepted by input '{}' ({:?})",
                plug.check, input_name, socket.check
            )));
        }
        if parent == child || self.is_ancestor(child, parent) {
            return Err(connection_error("connection would create a cycle"));
        }

        let previous_occupant = input.target_block();
        if let Some(occupant) = previous_occupant {
            self.disconnect(occupant)?;
        }
        self.disconnect(child)?;

        let is_statement = {
            let parent_block = self.block_mut(parent)?;
            let input = parent_block.input_mut(input_id);
            if let Some(connection) = &mut input.connection {
                connection.target = Some(child);
            }
            input.kind == InputKind::Statement
        };

        let child_block = self.block_mut(child)?;
        child_block.parent = Some(parent);
        let plug = if is_statement {
            child_block.previous.as_mut()
        } else {
            child_block.output.as_mut()
        };
        if let Some(plug) = plug {
            plug.target = Some(parent);
        }
        Ok(())
    }

    /// Chains `next` below the statement block `previous`.
    pub fn connect_next(&mut self, previous: BlockId, next: BlockId) -> Result<(), HostError> {
        let previous_block = self.block(previous)?;
        let next_block = self.block(next)?;
        let connection_error = |message: &str| HostError::ConnectionError {
            parent_type: previous_block.type_name.clone(),
            child_type: next_block.type_name.clone(),
            message: message.to_string(),
        };

        let socket = previous_block
            .next
            .as_ref()
            .ok_or_else(|| connection_error("block has no next connection"))?;
        let plug = next_block
            .previous
            .as_ref()
            .ok_or_else(|| connection_error("block has no previous connection"))?;
        if !socket.is_compatible(plug) {
            return Err(connection_error("statement types are incompatible"));
        }
        if previous == next || self.is_ancestor(next, previous) {
            return Err(connection_error("connection would create a cycle"));
        }

        if let Some(occupant) = socket.target {
            self.disconnect(occupant)?;
        }
        self.disconnect(next)?;

        if let Some(socket) = &mut self.block_mut(previous)?.next {
            socket.target = Some(next);
        }
        let next_block = self.block_mut(next)?;
        next_block.parent = Some(previous);
        if let Some(plug) = &mut next_block.previous {
            plug.target = Some(previous);
        }
        Ok(())
    }

    /// Unplugs a block from its parent, leaving it top-level.
    pub fn disconnect(&mut self, child: BlockId) -> Result<(), HostError> {
        let Some(parent) = self.block(child)?.parent else {
            return Ok(());
        };
        let socket = self.socket_of(parent, child)?;

        let parent_block = self.block_mut(parent)?;
        match socket {
            Some(Socket::Next) => {
                if let Some(next) = &mut parent_block.next {
                    next.target = None;
                }
            }
            Some(Socket::Input) => {
                let ids = parent_block.all_input_ids();
                for id in ids {
                    if let Some(connection) = &mut parent_block.input_mut(id).connection {
                        if connection.target == Some(child) {
                            connection.target = None;
                        }
                    }
                }
            }
            None => {}
        }

        let child_block = self.block_mut(child)?;
        child_block.parent = None;
        for plug in [&mut child_block.output, &mut child_block.previous]
            .into_iter()
            .flatten()
        {
            plug.target = None;
        }
        Ok(())
    }

    /// Removes a block and everything connected below it.
    pub fn dispose(&mut self, id: BlockId) -> Result<(), HostError> {
        self.disconnect(id)?;
        let mut pending = vec![id];
        while let Some(current) = pending.pop() {
            let block = self.block(current)?;
            pending.extend(block.all_input_ids().into_iter().filter_map(|input| {
                block.input(input).target_block()
            }));
            pending.extend(block.next.as_ref().and_then(|n| n.target));
            self.blocks[current.0] = None;
        }
        Ok(())
    }

    /// Sets a visible field's value and lets the block definition react to it.
    pub fn set_field_value(
        &mut self,
        host: &Host,
        id: BlockId,
        field_name: &str,
        value: Value,
    ) -> Result<(), HostError> {
        let block = self.block_mut(id)?;
        let field_id = block
            .get_field(field_name)
            .ok_or_else(|| HostError::NoSuchField {
                block_type: block.type_name.clone(),
                field: field_name.to_string(),
            })?;
        block.field_mut(field_id).set_value(value)?;

        let definition = host.definition(&block.type_name)?;
        definition.on_field_changed(block, field_name)?;
        Ok(())
    }

    /// Instantiates a block tree from a block state.
    ///
    /// Fields are applied before inputs so that a field selecting a variant
    /// exposes that variant's inputs first. An input given both a block and a
    /// shadow receives the block.
    pub fn append_state(&mut self, host: &Host, state: &BlockState) -> Result<BlockId, HostError> {
        self.append_state_as(host, state, false)
    }

    fn append_state_as(
        &mut self,
        host: &Host,
        state: &BlockState,
        shadow: bool,
    ) -> Result<BlockId, HostError> {
        let id = self.new_block(host, &state.block_type)?;
        match self.apply_state(host, id, state, shadow) {
            Ok(()) => Ok(id),
            Err(e) => {
                self.discard(id);
                Err(e)
            }
        }
    }

    fn apply_state(
        &mut self,
        host: &Host,
        id: BlockId,
        state: &BlockState,
        shadow: bool,
    ) -> Result<(), HostError> {
        self.block_mut(id)?.is_shadow = shadow;

        for (name, value) in &state.fields {
            self.set_field_value(host, id, name, value.clone())?;
        }

        for (name, connection) in &state.inputs {
            let child = match (&connection.block, &connection.shadow) {
                (Some(block), _) => self.append_state_as(host, block, false)?,
                (None, Some(shadow)) => self.append_state_as(host, shadow, true)?,
                (None, None) => continue,
            };
            if let Err(e) = self.connect(id, name, child) {
                self.discard(child);
                return Err(e);
            }
        }

        if let Some(next_state) = state.next.as_ref().and_then(|next| next.block.as_ref()) {
            let next_id = self.append_state_as(host, next_state, false)?;
            if let Err(e) = self.connect_next(id, next_id) {
                self.discard(next_id);
                return Err(e);
            }
        }
        Ok(())
    }

    /// Disposes a partially built tree after a failed `append_state`.
    fn discard(&mut self, id: BlockId) {
        if let Err(e) = self.dispose(id) {
            log::warn!("Failed to discard block {}: {}", id, e);
        }
    }

    fn socket_of(&self, parent: BlockId, child: BlockId) -> Result<Option<Socket>, HostError> {
        let parent_block = self.block(parent)?;
        if parent_block.next.as_ref().and_then(|n| n.target) == Some(child) {
            return Ok(Some(Socket::Next));
        }
        let in_input = parent_block
            .all_input_ids()
            .into_iter()
            .any(|id| parent_block.input(id).target_block() == Some(child));
        Ok(in_input.then_some(Socket::Input))
    }

    fn is_ancestor(&self, candidate: BlockId, of: BlockId) -> bool {
        let mut current = self.get(of).and_then(|b| b.parent);
        while let Some(id) = current {
            if id == candidate {
                return true;
            }
            current = self.get(id).and_then(|b| b.parent);
        }
        false
    }
}
