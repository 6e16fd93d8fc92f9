use jsdbg_bridge_core::types::{CallFrame, Scope};

/// Arena of values addressed by small integer ids.
///
/// Ids start at 1 so that 0 can mean "no handle". `reset` drops every entry
/// and moves the id base past everything issued so far, so an id handed out
/// before a reset never resolves again.
#[derive(Debug)]
pub struct HandleTable<T> {
    base: i64,
    entries: Vec<T>,
}

impl<T> Default for HandleTable<T> {
    fn default() -> Self {
        Self {
            base: 0,
            entries: Vec::new(),
        }
    }
}

impl<T> HandleTable<T> {
    #[cfg(test)]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, value: T) -> i64 {
        self.entries.push(value);
        self.base + self.entries.len() as i64
    }

    pub fn get(&self, id: i64) -> Option<&T> {
        let index = id.checked_sub(self.base + 1)?;
        usize::try_from(index).ok().and_then(|i| self.entries.get(i))
    }

    pub fn reset(&mut self) {
        self.base += self.entries.len() as i64;
        self.entries.clear();
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// What a frame id stands for until the next pause.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameHandle {
    pub call_frame_id: String,
    pub function_name: Option<String>,
    pub url: String,
    pub line: u32,
    pub column: u32,
    pub scope_chain: Vec<Scope>,
}

impl From<&CallFrame> for FrameHandle {
    fn from(frame: &CallFrame) -> Self {
        Self {
            call_frame_id: frame.call_frame_id.clone(),
            function_name: frame.function_name.clone(),
            url: frame.url.clone(),
            line: frame.location.line_number,
            column: frame.location.column_number,
            scope_chain: frame.scope_chain.clone(),
        }
    }
}

pub type FrameTable = HandleTable<FrameHandle>;

/// Variable reference id to remote object id.
pub type VariableTable = HandleTable<String>;
