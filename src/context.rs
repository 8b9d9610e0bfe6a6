//! Cursor state threaded through line processing

use crate::graph::FunctionId;
use crate::registry::FileId;

/// Which vector the next cost line feeds
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CostTarget {
    /// The current function's self cost
    #[default]
    OwnCost,
    /// The most recently opened call of the current function
    CallCost,
}

/// Mutable parse cursor
#[derive(Debug, Clone, Default)]
pub struct ParseContext {
    /// Last `fl=` token
    pub current_file: Option<FileId>,
    /// Last `cfl=`/`cfi=` token
    pub called_file: Option<FileId>,
    pub current_function: Option<FunctionId>,
    pub target: CostTarget,
    /// A call was opened and still waits for its `cfn=`
    pub call_awaiting_callee: bool,
    /// A `cfl=`/`cfi=` was seen since the last `fn=`
    pub explicit_calls: bool,
}

impl ParseContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enter_file(&mut self, file: FileId) {
        self.current_file = Some(file);
    }

    /// Select `function`; following cost lines are self cost
    pub fn enter_function(&mut self, function: FunctionId) {
        self.current_function = Some(function);
        self.target = CostTarget::OwnCost;
        self.call_awaiting_callee = false;
        self.explicit_calls = false;
    }

    /// A `cfl=` appended a call record to the current function
    pub fn open_call(&mut self, called_file: FileId) {
        self.called_file = Some(called_file);
        self.explicit_calls = true;
        self.target = CostTarget::CallCost;
        self.call_awaiting_callee = true;
    }

    /// A `cfn=` with no `cfl=` in its block appended a call record
    ///
    /// `called_file` is left alone; the callee lives in the caller's file.
    pub fn open_implicit_call(&mut self) {
        self.target = CostTarget::CallCost;
        self.call_awaiting_callee = true;
    }

    /// File a `cfn=` in the current block resolves against
    pub fn callee_file(&self) -> Option<FileId> {
        if self.explicit_calls {
            self.called_file
        } else {
            self.current_file
        }
    }

    pub fn bind_callee(&mut self) {
        self.call_awaiting_callee = false;
    }
}
