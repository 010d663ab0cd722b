//! Emit context: fresh-name allocation, options, and transform state.

use rustc_hash::FxHashSet;

/// Formatting options for rendered output.
#[derive(Debug, Clone)]
pub struct EmitOptions {
    /// Indent string per nesting level in the generated source.
    pub indent: String,
}

impl Default for EmitOptions {
    fn default() -> Self {
        Self {
            indent: "    ".to_string(),
        }
    }
}

/// The capability boundary passed to every compile call.
///
/// Provides exactly what generation needs from the outside: a fresh,
/// globally-unique identifier each time one is requested, and the emit
/// options. Also carries the generator's own transform state (the stack
/// of enclosing function continuation parameters used to lower `return`).
#[derive(Debug, Default)]
pub struct EmitContext {
    pub options: EmitOptions,
    name_counter: u32,
    reserved: FxHashSet<String>,
    generated: FxHashSet<String>,
    // Innermost entry wins: None marks a plain (untransformed) function
    // scope, Some(name) the continuation parameter of a transformed one.
    return_conts: Vec<Option<String>>,
}

impl EmitContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Context that will never allocate any of `idents` as a generated
    /// name. Callers that know the source file's identifiers pass them
    /// here to rule out collisions.
    pub fn with_reserved<I, S>(idents: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            reserved: idents.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Allocate a fresh identifier: `_a`, `_b`, ..., `_z`, `_0`, `_1`,
    /// ... skipping anything reserved or already handed out.
    pub fn fresh_name(&mut self) -> String {
        loop {
            let counter = self.name_counter;
            let name = if counter < 26 {
                format!("_{}", (b'a' + counter as u8) as char)
            } else {
                format!("_{}", counter - 26)
            };
            self.name_counter += 1;

            if !self.reserved.contains(&name) && !self.generated.contains(&name) {
                self.generated.insert(name.clone());
                return name;
            }
            // Name collides, try next
        }
    }

    pub(crate) fn enter_function(&mut self, continuation: Option<String>) {
        self.return_conts.push(continuation);
    }

    pub(crate) fn exit_function(&mut self) {
        self.return_conts.pop();
    }

    /// Continuation parameter of the innermost enclosing function, if
    /// that function was CPS-transformed.
    pub(crate) fn return_continuation(&self) -> Option<&str> {
        match self.return_conts.last() {
            Some(Some(name)) => Some(name.as_str()),
            _ => None,
        }
    }
}
