//! Owned syntax nodes for call-expression rewriting.
//!
//! The mago parser hands out arena-allocated, immutable trees.  Rewrite
//! rules instead work on this small owned model: a call is lowered out of
//! the arena (see [`crate::parser::calls`]), passed to a rule by value, and
//! the rule hands back either the untouched call or its replacement.  The
//! host then prints the replacement over the original byte range.
//!
//! Every node lowered from source remembers its original text in `source`,
//! so sub-expressions the rule merely relocates print byte-for-byte.  Nodes
//! a rule synthesizes have no source and are printed structurally.

/// A half-open byte range `[start, end)` into the file content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TextRange {
    pub start: u32,
    pub end: u32,
}

impl TextRange {
    pub fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }
}

/// How a call was written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallKind {
    /// `$receiver->method(...)`
    Method,
    /// `Class::method(...)`, `self::method(...)`, `static::method(...)`
    StaticMethod,
}

/// An instance or static method call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallExpr {
    pub kind: CallKind,
    /// The method name as written (e.g. "assertTrue").
    pub name: String,
    pub arguments: Vec<Argument>,
    /// `$this->assertTrue(...)` used as a value rather than invoked.
    pub is_first_class_callable: bool,
    /// Byte range covering the method name through the closing `)` of the
    /// argument list.  The receiver and operator are outside this range.
    pub range: TextRange,
}

impl CallExpr {
    /// Build a call with no source position, mostly useful in tests and
    /// for rules that synthesize calls.
    pub fn new(kind: CallKind, name: impl Into<String>, arguments: Vec<Argument>) -> Self {
        Self {
            kind,
            name: name.into(),
            arguments,
            is_first_class_callable: false,
            range: TextRange::default(),
        }
    }

    /// Whether the call's target is `name`, ignoring ASCII case as PHP does.
    pub fn is_name(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }
}

/// A single call argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Argument {
    /// Parameter name for named arguments (`message: 'x'`).
    pub name: Option<String>,
    /// Spread argument (`...$args`).
    pub unpack: bool,
    pub value: Expr,
    /// The argument's full original text, including any name or `...`.
    pub source: Option<String>,
}

impl Argument {
    /// A positional, unnamed argument with no source text of its own.
    pub fn positional(value: Expr) -> Self {
        Self {
            name: None,
            unpack: false,
            value,
            source: None,
        }
    }
}

/// An expression node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expr {
    pub kind: ExprKind,
    /// Original source text, when the node was lowered from a file.
    pub source: Option<String>,
}

/// The expression shapes rewrite rules care about.  Everything else is
/// [`ExprKind::Other`] and only ever travels as opaque source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExprKind {
    /// `isset($a, $b, ...)`
    Isset(Vec<Expr>),
    /// `$object->property`
    PropertyFetch(PropertyFetch),
    /// `$array[index]`
    ArrayDimFetch(ArrayDimFetch),
    /// A direct variable, name including `$`.
    Variable(String),
    /// A string literal with its decoded value.
    String(String),
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyFetch {
    pub object: Box<Expr>,
    pub property: PropertyName,
}

/// The member selector of a property fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyName {
    /// `$obj->name`
    Identifier(String),
    /// `$obj->$name` or `$obj->{expr}`; not knowable without running code.
    Dynamic,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArrayDimFetch {
    pub array: Box<Expr>,
    pub index: Box<Expr>,
}

impl Expr {
    /// Attach original source text to a node kind.
    pub fn with_source(kind: ExprKind, source: impl Into<String>) -> Self {
        Self {
            kind,
            source: Some(source.into()),
        }
    }

    pub fn variable(name: impl Into<String>) -> Self {
        Self {
            kind: ExprKind::Variable(name.into()),
            source: None,
        }
    }

    /// A new string literal that does not exist in the source yet.
    pub fn string(value: impl Into<String>) -> Self {
        Self {
            kind: ExprKind::String(value.into()),
            source: None,
        }
    }

    /// An opaque expression known only by its text.
    pub fn other(source: impl Into<String>) -> Self {
        Self::with_source(ExprKind::Other, source)
    }

    pub fn isset(values: Vec<Expr>) -> Self {
        Self {
            kind: ExprKind::Isset(values),
            source: None,
        }
    }

    pub fn property_fetch(object: Expr, property: PropertyName) -> Self {
        Self {
            kind: ExprKind::PropertyFetch(PropertyFetch {
                object: Box::new(object),
                property,
            }),
            source: None,
        }
    }

    pub fn array_dim_fetch(array: Expr, index: Expr) -> Self {
        Self {
            kind: ExprKind::ArrayDimFetch(ArrayDimFetch {
                array: Box::new(array),
                index: Box::new(index),
            }),
            source: None,
        }
    }
}
