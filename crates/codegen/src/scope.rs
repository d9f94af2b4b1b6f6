//! Lexically nested scopes used during lowering.
//!
//! The three scope kinds form a closed family, modeled as a tagged
//! variant with a parent reference. Scopes live on the stack frames of
//! the lowering calls that open them and never outlive them.

use std::collections::HashMap;

use imp_common::ProtoId;

/// An abstract identity for a not-yet-emitted bytecode offset.
///
/// Labels are minted monotonically by the code generator and resolved to
/// byte addresses when emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Label(pub(crate) u32);

/// What a name resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Binding {
    /// A user-defined function; its entry address is the label.
    Func { entry: Label },
    /// A host primitive.
    Proto { id: ProtoId },
    /// A formal parameter of the enclosing function, 0-based in
    /// declaration order.
    Arg { index: u32 },
    /// A local variable; `depth` is the stack-depth counter snapshot
    /// taken at the moment of declaration.
    Local { depth: u32 },
}

/// The outermost scope: function and prototype names of the module.
#[derive(Debug, Default)]
pub struct GlobalScope {
    pub(crate) funcs: HashMap<String, Label>,
    pub(crate) protos: HashMap<String, ProtoId>,
}

/// A link in the scope chain.
#[derive(Debug)]
pub enum Scope<'a> {
    Global(&'a GlobalScope),
    /// Wraps the global scope with the argument names of a function.
    Func {
        parent: &'a Scope<'a>,
        args: HashMap<String, u32>,
    },
    /// Wraps an enclosing scope with the locals of one block.
    Block {
        parent: &'a Scope<'a>,
        locals: HashMap<String, u32>,
    },
}

impl<'a> Scope<'a> {
    /// Open a block scope under `parent`.
    pub fn block(parent: &'a Scope<'a>) -> Self {
        Scope::Block {
            parent,
            locals: HashMap::new(),
        }
    }

    /// Resolve a name, consulting the innermost scope first and
    /// delegating to the parent on miss.
    pub fn lookup(&self, name: &str) -> Option<Binding> {
        match self {
            Scope::Global(global) => {
                if let Some(&entry) = global.funcs.get(name) {
                    return Some(Binding::Func { entry });
                }
                if let Some(&id) = global.protos.get(name) {
                    return Some(Binding::Proto { id });
                }
                None
            }
            Scope::Func { parent, args } => match args.get(name) {
                Some(&index) => Some(Binding::Arg { index }),
                None => parent.lookup(name),
            },
            Scope::Block { parent, locals } => match locals.get(name) {
                Some(&depth) => Some(Binding::Local { depth }),
                None => parent.lookup(name),
            },
        }
    }

    /// Bind a local at its declaration depth. Locals can only be
    /// declared inside a block.
    pub fn bind_local(&mut self, name: String, depth: u32) {
        match self {
            Scope::Block { locals, .. } => {
                locals.insert(name, depth);
            }
            _ => panic!("local '{name}' declared outside of a block"),
        }
    }

    /// Number of locals declared directly in this block (not its
    /// children).
    pub fn local_count(&self) -> usize {
        match self {
            Scope::Block { locals, .. } => locals.len(),
            _ => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn global_with(funcs: &[(&str, u32)], protos: &[(&str, u32)]) -> GlobalScope {
        GlobalScope {
            funcs: funcs
                .iter()
                .map(|&(n, l)| (n.to_string(), Label(l)))
                .collect(),
            protos: protos
                .iter()
                .map(|&(n, i)| (n.to_string(), ProtoId(i)))
                .collect(),
        }
    }

    #[test]
    fn global_resolves_funcs_and_protos() {
        let global = global_with(&[("fact", 1)], &[("print_int", 0)]);
        let scope = Scope::Global(&global);

        assert_eq!(
            scope.lookup("fact"),
            Some(Binding::Func { entry: Label(1) })
        );
        assert_eq!(
            scope.lookup("print_int"),
            Some(Binding::Proto { id: ProtoId(0) })
        );
        assert_eq!(scope.lookup("missing"), None);
    }

    #[test]
    fn func_scope_resolves_args_then_parent() {
        let global = global_with(&[("fact", 1)], &[]);
        let global_scope = Scope::Global(&global);
        let scope = Scope::Func {
            parent: &global_scope,
            args: [("n".to_string(), 0)].into_iter().collect(),
        };

        assert_eq!(scope.lookup("n"), Some(Binding::Arg { index: 0 }));
        assert_eq!(
            scope.lookup("fact"),
            Some(Binding::Func { entry: Label(1) })
        );
    }

    #[test]
    fn block_scope_shadows_parent() {
        let global = global_with(&[], &[]);
        let global_scope = Scope::Global(&global);
        let func_scope = Scope::Func {
            parent: &global_scope,
            args: [("n".to_string(), 0)].into_iter().collect(),
        };
        let mut block = Scope::block(&func_scope);
        block.bind_local("n".to_string(), 2);

        // The innermost binding wins.
        assert_eq!(block.lookup("n"), Some(Binding::Local { depth: 2 }));
    }

    #[test]
    fn nested_blocks_delegate() {
        let global = global_with(&[], &[]);
        let global_scope = Scope::Global(&global);
        let mut outer = Scope::block(&global_scope);
        outer.bind_local("x".to_string(), 1);
        let inner = Scope::block(&outer);

        assert_eq!(inner.lookup("x"), Some(Binding::Local { depth: 1 }));
        assert_eq!(inner.local_count(), 0);
        assert_eq!(outer.local_count(), 1);
    }

    #[test]
    #[should_panic(expected = "declared outside of a block")]
    fn bind_local_outside_block_panics() {
        let global = global_with(&[], &[]);
        let mut scope = Scope::Global(&global);
        scope.bind_local("x".to_string(), 0);
    }
}
