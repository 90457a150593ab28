//! Generic-Argument Resolution
//!
//! Finds the concrete type arguments a subtype binds onto a generic ancestor:
//!
//! ```text
//! class Container<T>
//! class Box<T> extends Container<T>
//! class StringBox extends Box<string>
//!
//! type_arguments(Container, StringBox) == [Some(string)]
//! ```
//!
//! The walk searches depth-first from the child along superclass links, then
//! interface links, until it reaches the ancestor. Every parameterized link
//! on the path found records `parameter -> argument`. The ancestor's
//! arguments (or its own parameters when it was reached through a raw link)
//! are then followed through the recorded bindings until they stop being
//! variables.

use rustc_hash::{FxHashMap, FxHashSet};

use super::Reflector;
use crate::error::{ReflectError, ReflectResult};
use crate::types::{GenericRef, TypeId, TypeVar};

/// A type argument reduced to a concrete type
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ResolvedType {
    /// A registered type (generic types reduce to their raw type)
    Type(TypeId),
    /// Array of a resolved component
    Array(Box<ResolvedType>),
}

impl ResolvedType {
    /// The type id, for non-array results
    pub fn as_type(&self) -> Option<TypeId> {
        match self {
            ResolvedType::Type(ty) => Some(*ty),
            ResolvedType::Array(_) => None,
        }
    }
}

type Bindings = FxHashMap<TypeVar, GenericRef>;

struct AncestorSearch {
    base: TypeId,
    /// Links from the child down to the current type
    path: Vec<GenericRef>,
    /// Types from which `base` is known to be unreachable
    dead_ends: FxHashSet<TypeId>,
    truncated: bool,
}

impl Reflector {
    /// Concrete type arguments `child` binds to the parameters of `base`,
    /// in `base`'s parameter order. Parameters left unbound (for example
    /// through a raw superclass) come back as `None`.
    pub fn type_arguments(&self, base: TypeId, child: TypeId) -> ReflectResult<Vec<Option<ResolvedType>>> {
        let not_found = || ReflectError::AncestorNotFound {
            descendant: self.types.type_name(child),
            ancestor: self.types.type_name(base),
        };
        let limit = self.config.max_inheritance_depth().min(self.types.type_count());

        let mut search = AncestorSearch {
            base,
            path: Vec::new(),
            dead_ends: FxHashSet::default(),
            truncated: false,
        };
        if !self.find_ancestor(&mut search, GenericRef::Raw(child), limit) {
            return Err(not_found());
        }

        let mut bindings = Bindings::default();
        for link in &search.path {
            if let GenericRef::Parameterized { raw, args } = link {
                for (var, arg) in self.types.type_parameters(*raw).into_iter().zip(args) {
                    bindings.insert(var, arg.clone());
                }
            }
        }

        let candidates = match search.path.pop() {
            Some(GenericRef::Parameterized { args, .. }) => args,
            _ => self
                .types
                .type_parameters(base)
                .into_iter()
                .map(GenericRef::Var)
                .collect(),
        };
        Ok(candidates
            .iter()
            .map(|candidate| resolve_candidate(candidate, &bindings))
            .collect())
    }

    fn find_ancestor(&self, search: &mut AncestorSearch, link: GenericRef, remaining: usize) -> bool {
        let Some(raw) = link.raw_type() else {
            return false;
        };
        search.path.push(link);
        if raw == search.base {
            return true;
        }

        if !search.dead_ends.contains(&raw) {
            let outer_truncated = std::mem::replace(&mut search.truncated, false);
            let parents = self
                .types
                .generic_superclass(raw)
                .into_iter()
                .chain(self.types.generic_interfaces(raw));
            for parent in parents {
                if remaining == 0 {
                    search.truncated = true;
                    break;
                }
                if self.find_ancestor(search, parent.clone(), remaining - 1) {
                    return true;
                }
            }
            // Only a search that was not cut short proves the ancestor unreachable
            if !search.truncated {
                search.dead_ends.insert(raw);
            }
            search.truncated |= outer_truncated;
        }

        search.path.pop();
        false
    }

    /// Raw type of a generic reference. Arrays map to their registered array
    /// type; type variables have none.
    pub fn raw_type_of(&self, reference: &GenericRef) -> Option<TypeId> {
        match reference {
            GenericRef::Raw(ty) => Some(*ty),
            GenericRef::Parameterized { raw, .. } => Some(*raw),
            GenericRef::Array(component) => {
                let component = self.raw_type_of(component)?;
                self.types.array_type_of(component)
            }
            GenericRef::Var(_) => None,
        }
    }
}

fn resolve_candidate(candidate: &GenericRef, bindings: &Bindings) -> Option<ResolvedType> {
    let mut current = candidate;
    let mut hops = 0;
    while let GenericRef::Var(var) = current {
        // Every hop consumes a distinct binding unless the bindings loop
        if hops > bindings.len() {
            return None;
        }
        current = bindings.get(var)?;
        hops += 1;
    }

    match current {
        GenericRef::Raw(ty) => Some(ResolvedType::Type(*ty)),
        GenericRef::Parameterized { raw, .. } => Some(ResolvedType::Type(*raw)),
        GenericRef::Array(component) => {
            resolve_candidate(component, bindings).map(|c| ResolvedType::Array(Box::new(c)))
        }
        GenericRef::Var(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::builtin;

    #[test]
    fn test_resolve_candidate_follows_chain() {
        let a = TypeVar { owner: TypeId(10), index: 0 };
        let b = TypeVar { owner: TypeId(11), index: 0 };
        let mut bindings = Bindings::default();
        bindings.insert(a, GenericRef::Var(b));
        bindings.insert(b, GenericRef::Raw(builtin::STRING));

        assert_eq!(
            resolve_candidate(&GenericRef::Var(a), &bindings),
            Some(ResolvedType::Type(builtin::STRING))
        );
        assert_eq!(
            resolve_candidate(&GenericRef::Array(Box::new(GenericRef::Var(a))), &bindings),
            Some(ResolvedType::Array(Box::new(ResolvedType::Type(builtin::STRING))))
        );
    }

    #[test]
    fn test_resolve_candidate_unbound_and_cyclic() {
        let a = TypeVar { owner: TypeId(10), index: 0 };
        let b = TypeVar { owner: TypeId(11), index: 0 };
        assert_eq!(resolve_candidate(&GenericRef::Var(a), &Bindings::default()), None);

        let mut cyclic = Bindings::default();
        cyclic.insert(a, GenericRef::Var(b));
        cyclic.insert(b, GenericRef::Var(a));
        assert_eq!(resolve_candidate(&GenericRef::Var(a), &cyclic), None);
    }

    #[test]
    fn test_as_type() {
        assert_eq!(ResolvedType::Type(builtin::INT).as_type(), Some(builtin::INT));
        assert_eq!(ResolvedType::Array(Box::new(ResolvedType::Type(builtin::INT))).as_type(), None);
    }
}
