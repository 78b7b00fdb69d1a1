//! Operation chains.
//!
//! A chain is the record of everything composed on top of a remote source:
//! filters, skips and opaque local operators. Chains are immutable; pushing an
//! operation returns a new chain whose newest node points at the previous
//! one, so a base chain can be extended in several directions at once.
//!
//! Operations carry the closures needed to replay them locally over
//! type-erased [`Element`]s, along with the [`ElementType`] they consume and
//! produce.

use crate::error::{QueryError, QueryResult};
use crate::eval::Record;
use crate::ir::Predicate;
use std::any::{Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// A type-erased item flowing through local replay
pub type Element = Box<dyn Any + Send>;

type LocalFilter = Arc<dyn Fn(&Element) -> QueryResult<bool> + Send + Sync>;
type LocalApply = Arc<dyn Fn(Vec<Element>) -> QueryResult<Vec<Element>> + Send + Sync>;

// ============================================================================
// Element types
// ============================================================================

/// Runtime tag for the element type an operation consumes or produces
#[derive(Clone, Copy)]
pub struct ElementType {
    id: TypeId,
    name: &'static str,
}

impl ElementType {
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for ElementType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ElementType {}

impl Hash for ElementType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Unbox an element, reporting a malformed chain on type mismatch
pub(crate) fn downcast_element<T: 'static>(element: Element) -> QueryResult<T> {
    element.downcast::<T>().map(|boxed| *boxed).map_err(|_| {
        QueryError::MalformedChain(format!(
            "expected element of type {}",
            std::any::type_name::<T>()
        ))
    })
}

// ============================================================================
// Operations
// ============================================================================

/// A filter over records of one element type
#[derive(Clone)]
pub struct FilterOp {
    predicate: Predicate,
    element: ElementType,
    test: LocalFilter,
}

impl FilterOp {
    pub fn predicate(&self) -> &Predicate {
        &self.predicate
    }

    pub fn element(&self) -> ElementType {
        self.element
    }
}

/// Drop the first `count` elements
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SkipOp {
    count: usize,
    element: ElementType,
}

impl SkipOp {
    pub fn count(&self) -> usize {
        self.count
    }

    pub fn element(&self) -> ElementType {
        self.element
    }
}

/// Host operator the engine cannot push down (projection, ordering, ...)
#[derive(Clone)]
pub struct OpaqueOp {
    label: String,
    input: ElementType,
    output: ElementType,
    apply: LocalApply,
}

impl OpaqueOp {
    pub fn label(&self) -> &str {
        &self.label
    }
}

/// One composed operation
#[derive(Clone)]
pub enum Operation {
    Filter(FilterOp),
    Skip(SkipOp),
    Opaque(OpaqueOp),
}

impl Operation {
    /// Filter records of type `T` by a predicate
    pub fn filter<T: Record + Send>(predicate: Predicate) -> Self {
        let local = predicate.clone();
        let test: LocalFilter = Arc::new(move |element: &Element| {
            (**element)
                .downcast_ref::<T>()
                .map(|record| local.matches(record))
                .ok_or_else(|| {
                    QueryError::MalformedChain(format!(
                        "filter expected element of type {}",
                        std::any::type_name::<T>()
                    ))
                })
        });

        Self::Filter(FilterOp {
            predicate,
            element: ElementType::of::<T>(),
            test,
        })
    }

    /// Skip `count` elements of type `T`
    pub fn skip<T: 'static>(count: usize) -> Self {
        Self::Skip(SkipOp {
            count,
            element: ElementType::of::<T>(),
        })
    }

    /// Wrap a host operator from a `Vec<T>` to a `Vec<U>`
    pub fn opaque<T, U, F>(label: impl Into<String>, apply: F) -> Self
    where
        T: Send + 'static,
        U: Send + 'static,
        F: Fn(Vec<T>) -> Vec<U> + Send + Sync + 'static,
    {
        let apply: LocalApply = Arc::new(move |elements: Vec<Element>| {
            let typed = elements
                .into_iter()
                .map(downcast_element::<T>)
                .collect::<QueryResult<Vec<T>>>()?;
            Ok(apply(typed)
                .into_iter()
                .map(|item| Box::new(item) as Element)
                .collect())
        });

        Self::Opaque(OpaqueOp {
            label: label.into(),
            input: ElementType::of::<T>(),
            output: ElementType::of::<U>(),
            apply,
        })
    }

    /// Element type consumed
    pub fn input(&self) -> ElementType {
        match self {
            Self::Filter(filter) => filter.element,
            Self::Skip(skip) => skip.element,
            Self::Opaque(opaque) => opaque.input,
        }
    }

    /// Element type produced
    pub fn output(&self) -> ElementType {
        match self {
            Self::Filter(filter) => filter.element,
            Self::Skip(skip) => skip.element,
            Self::Opaque(opaque) => opaque.output,
        }
    }

    /// Apply the operation in memory
    pub fn apply_local(&self, elements: Vec<Element>) -> QueryResult<Vec<Element>> {
        match self {
            Self::Filter(filter) => {
                let mut kept = Vec::with_capacity(elements.len());
                for element in elements {
                    if (filter.test)(&element)? {
                        kept.push(element);
                    }
                }
                Ok(kept)
            }
            Self::Skip(skip) => Ok(elements.into_iter().skip(skip.count).collect()),
            Self::Opaque(opaque) => (opaque.apply)(elements),
        }
    }
}

impl fmt::Debug for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Filter(filter) => f
                .debug_struct("Filter")
                .field("predicate", &filter.predicate)
                .field("element", &filter.element)
                .finish(),
            Self::Skip(skip) => f
                .debug_struct("Skip")
                .field("count", &skip.count)
                .field("element", &skip.element)
                .finish(),
            Self::Opaque(opaque) => f
                .debug_struct("Opaque")
                .field("label", &opaque.label)
                .field("input", &opaque.input)
                .field("output", &opaque.output)
                .finish(),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Filter(_) => f.write_str("filter"),
            Self::Skip(skip) => write!(f, "skip({})", skip.count),
            Self::Opaque(opaque) => write!(f, "opaque({})", opaque.label),
        }
    }
}

// ============================================================================
// Chains
// ============================================================================

struct ChainNode {
    operation: Operation,
    previous: Option<Arc<ChainNode>>,
}

/// Immutable sequence of operations over a remote source
#[derive(Clone)]
pub struct OperationChain {
    source: ElementType,
    head: Option<Arc<ChainNode>>,
    len: usize,
}

impl OperationChain {
    /// Empty chain over a source of `source` elements
    pub fn new(source: ElementType) -> Self {
        Self {
            source,
            head: None,
            len: 0,
        }
    }

    /// Empty chain over a source of `T`
    pub fn over<T: 'static>() -> Self {
        Self::new(ElementType::of::<T>())
    }

    pub fn source(&self) -> ElementType {
        self.source
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// New chain with `operation` composed on top; `self` is unchanged
    pub fn push(&self, operation: Operation) -> Self {
        Self {
            source: self.source,
            head: Some(Arc::new(ChainNode {
                operation,
                previous: self.head.clone(),
            })),
            len: self.len + 1,
        }
    }

    /// Most recently composed operation
    pub fn outermost(&self) -> Option<&Operation> {
        self.head.as_deref().map(|node| &node.operation)
    }

    /// Element type the chain yields
    pub fn element_type(&self) -> ElementType {
        self.outermost().map_or(self.source, Operation::output)
    }

    /// Operations from the most recently composed toward the source
    pub fn iter_outer_first(&self) -> OuterFirst<'_> {
        OuterFirst {
            next: self.head.as_deref(),
        }
    }

    /// Operations in application order (source first)
    pub fn operations(&self) -> Vec<Operation> {
        let mut operations: Vec<Operation> = self.iter_outer_first().cloned().collect();
        operations.reverse();
        operations
    }

    /// Check each operation consumes what its predecessor produces
    pub fn validate(&self) -> QueryResult<()> {
        let mut expected = self.source;
        for (index, operation) in self.operations().iter().enumerate() {
            if operation.input() != expected {
                return Err(QueryError::MalformedChain(format!(
                    "operation {} ({}) consumes {} but receives {}",
                    index,
                    operation,
                    operation.input(),
                    expected
                )));
            }
            expected = operation.output();
        }
        Ok(())
    }
}

impl fmt::Debug for OperationChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OperationChain")
            .field("source", &self.source)
            .field("operations", &self.operations())
            .finish()
    }
}

/// Iterator over a chain, newest operation first
pub struct OuterFirst<'a> {
    next: Option<&'a ChainNode>,
}

impl<'a> Iterator for OuterFirst<'a> {
    type Item = &'a Operation;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.next?;
        self.next = node.previous.as_deref();
        Some(&node.operation)
    }
}
