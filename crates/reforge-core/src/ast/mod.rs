// Syntax tree model shared by the frontend, the rules and the engine.
// Nodes live in an arena owned by `SyntaxTree`; children are referenced by
// `NodeId` and parents are looked up through a side index, never owned.

pub mod fragment;
pub mod printer;

pub use fragment::{Fragment, FragmentBuilder, IdAllocator};
pub use printer::ToSource;

use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};

use serde::{Deserialize, Serialize};

static NEXT_GENERATION: AtomicU32 = AtomicU32::new(1);

/// A generation stamp no tree built earlier in this process carries.
pub fn next_generation() -> u32 {
    NEXT_GENERATION.fetch_add(1, Ordering::Relaxed)
}

/// Identity of a node: the generation of the tree that owns it plus its
/// arena index. Ids of one tree never name a node of another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId {
    generation: u32,
    index: u32,
}

impl NodeId {
    pub fn new(generation: u32, index: u32) -> Self {
        Self { generation, index }
    }

    pub fn generation(self) -> u32 {
        self.generation
    }

    pub fn index(self) -> usize {
        self.index as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}.{}", self.generation, self.index)
    }
}

/// Half-open byte range into the document a tree was parsed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TextRange {
    pub start: usize,
    pub end: usize,
}

impl TextRange {
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end, "inverted range {start}..{end}");
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Whether `other` lies entirely inside this range.
    pub fn contains_range(&self, other: TextRange) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    pub fn cover(self, other: TextRange) -> TextRange {
        TextRange::new(self.start.min(other.start), self.end.max(other.end))
    }
}

impl fmt::Display for TextRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// Where the text of a node comes from when a document is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Origin {
    /// Node of a parsed tree, located at this range of its document.
    Source(TextRange),
    /// Detached deep copy of a parsed node; rendered verbatim from the range.
    Copied(TextRange),
    /// Constructed by a rule; rendered by the pretty printer.
    Synthetic,
}

impl Origin {
    pub fn range(&self) -> Option<TextRange> {
        match self {
            Origin::Source(range) | Origin::Copied(range) => Some(*range),
            Origin::Synthetic => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LiteralKind {
    Boolean,
    Null,
    Integer,
    Floating,
    String,
    Char,
}

/// A literal keeps its raw token so copies and re-renders are lossless.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Literal {
    pub kind: LiteralKind,
    pub raw: String,
}

impl Literal {
    pub fn new(kind: LiteralKind, raw: impl Into<String>) -> Self {
        Self { kind, raw: raw.into() }
    }

    pub fn boolean(value: bool) -> Self {
        Self::new(LiteralKind::Boolean, if value { "true" } else { "false" })
    }

    pub fn null() -> Self {
        Self::new(LiteralKind::Null, "null")
    }

    pub fn integer(value: i64) -> Self {
        Self::new(LiteralKind::Integer, value.to_string())
    }

    pub fn as_boolean(&self) -> Option<bool> {
        match (self.kind, self.raw.as_str()) {
            (LiteralKind::Boolean, "true") => Some(true),
            (LiteralKind::Boolean, "false") => Some(false),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InfixOperator {
    ConditionalOr,
    ConditionalAnd,
    BitOr,
    BitXor,
    BitAnd,
    Equals,
    NotEquals,
    Less,
    Greater,
    LessEquals,
    GreaterEquals,
    LeftShift,
    RightShift,
    UnsignedRightShift,
    Plus,
    Minus,
    Times,
    Divide,
    Remainder,
}

impl InfixOperator {
    pub fn from_token(token: &str) -> Option<Self> {
        use InfixOperator::*;
        let op = match token {
            "||" => ConditionalOr,
            "&&" => ConditionalAnd,
            "|" => BitOr,
            "^" => BitXor,
            "&" => BitAnd,
            "==" => Equals,
            "!=" => NotEquals,
            "<" => Less,
            ">" => Greater,
            "<=" => LessEquals,
            ">=" => GreaterEquals,
            "<<" => LeftShift,
            ">>" => RightShift,
            ">>>" => UnsignedRightShift,
            "+" => Plus,
            "-" => Minus,
            "*" => Times,
            "/" => Divide,
            "%" => Remainder,
            _ => return None,
        };
        Some(op)
    }

    pub fn token(self) -> &'static str {
        use InfixOperator::*;
        match self {
            ConditionalOr => "||",
            ConditionalAnd => "&&",
            BitOr => "|",
            BitXor => "^",
            BitAnd => "&",
            Equals => "==",
            NotEquals => "!=",
            Less => "<",
            Greater => ">",
            LessEquals => "<=",
            GreaterEquals => ">=",
            LeftShift => "<<",
            RightShift => ">>",
            UnsignedRightShift => ">>>",
            Plus => "+",
            Minus => "-",
            Times => "*",
            Divide => "/",
            Remainder => "%",
        }
    }

    pub fn precedence(self) -> u8 {
        use InfixOperator::*;
        match self {
            ConditionalOr => precedence::CONDITIONAL_OR,
            ConditionalAnd => precedence::CONDITIONAL_AND,
            BitOr => precedence::BIT_OR,
            BitXor => precedence::BIT_XOR,
            BitAnd => precedence::BIT_AND,
            Equals | NotEquals => precedence::EQUALITY,
            Less | Greater | LessEquals | GreaterEquals => precedence::RELATIONAL,
            LeftShift | RightShift | UnsignedRightShift => precedence::SHIFT,
            Plus | Minus => precedence::ADDITIVE,
            Times | Divide | Remainder => precedence::MULTIPLICATIVE,
        }
    }
}

/// Binding strength of expression forms, loosest first.
pub mod precedence {
    pub const ASSIGNMENT: u8 = 1;
    pub const CONDITIONAL: u8 = 2;
    pub const CONDITIONAL_OR: u8 = 3;
    pub const CONDITIONAL_AND: u8 = 4;
    pub const BIT_OR: u8 = 5;
    pub const BIT_XOR: u8 = 6;
    pub const BIT_AND: u8 = 7;
    pub const EQUALITY: u8 = 8;
    pub const RELATIONAL: u8 = 9;
    pub const SHIFT: u8 = 10;
    pub const ADDITIVE: u8 = 11;
    pub const MULTIPLICATIVE: u8 = 12;
    pub const UNARY: u8 = 13;
    pub const POSTFIX: u8 = 14;
    pub const PRIMARY: u8 = 15;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PrefixOperator {
    Not,
    Minus,
    Plus,
    Complement,
    Increment,
    Decrement,
}

impl PrefixOperator {
    pub fn from_token(token: &str) -> Option<Self> {
        let op = match token {
            "!" => PrefixOperator::Not,
            "-" => PrefixOperator::Minus,
            "+" => PrefixOperator::Plus,
            "~" => PrefixOperator::Complement,
            "++" => PrefixOperator::Increment,
            "--" => PrefixOperator::Decrement,
            _ => return None,
        };
        Some(op)
    }

    pub fn token(self) -> &'static str {
        match self {
            PrefixOperator::Not => "!",
            PrefixOperator::Minus => "-",
            PrefixOperator::Plus => "+",
            PrefixOperator::Complement => "~",
            PrefixOperator::Increment => "++",
            PrefixOperator::Decrement => "--",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PostfixOperator {
    Increment,
    Decrement,
}

impl PostfixOperator {
    pub fn token(self) -> &'static str {
        match self {
            PostfixOperator::Increment => "++",
            PostfixOperator::Decrement => "--",
        }
    }
}

/// Formal parameter of a method declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub ty: String,
    pub name: String,
}

/// Kind tag of a node, used as the dispatch key for rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SyntaxKind {
    Unit,
    Import,
    ClassDecl,
    MethodDecl,
    Block,
    If,
    While,
    DoWhile,
    For,
    ForEach,
    Try,
    Catch,
    ExpressionStatement,
    LocalVariable,
    Return,
    Throw,
    Break,
    Continue,
    Empty,
    MethodCall,
    FieldAccess,
    ArrayAccess,
    Infix,
    Prefix,
    Postfix,
    Parenthesized,
    InstanceOf,
    Cast,
    Conditional,
    Assignment,
    New,
    Literal,
    Name,
    This,
}

/// Node payload: the kind tag plus its typed child slots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NodeKind {
    Unit {
        package: Option<String>,
        imports: Vec<NodeId>,
        items: Vec<NodeId>,
    },
    Import {
        path: String,
        is_static: bool,
        on_demand: bool,
    },
    ClassDecl {
        modifiers: Vec<String>,
        name: String,
        members: Vec<NodeId>,
    },
    MethodDecl {
        modifiers: Vec<String>,
        return_type: String,
        name: String,
        parameters: Vec<Parameter>,
        body: Option<NodeId>,
    },
    Block {
        statements: Vec<NodeId>,
    },
    If {
        condition: NodeId,
        then_branch: NodeId,
        else_branch: Option<NodeId>,
    },
    While {
        condition: NodeId,
        body: NodeId,
    },
    DoWhile {
        body: NodeId,
        condition: NodeId,
    },
    For {
        init: Vec<NodeId>,
        condition: Option<NodeId>,
        update: Vec<NodeId>,
        body: NodeId,
    },
    ForEach {
        ty: String,
        name: String,
        iterable: NodeId,
        body: NodeId,
    },
    Try {
        body: NodeId,
        catches: Vec<NodeId>,
        finally: Option<NodeId>,
    },
    Catch {
        ty: String,
        name: String,
        body: NodeId,
    },
    ExpressionStatement {
        expression: NodeId,
    },
    /// Local variable or field declaration with a single declarator.
    LocalVariable {
        modifiers: Vec<String>,
        ty: String,
        name: String,
        initializer: Option<NodeId>,
    },
    Return {
        value: Option<NodeId>,
    },
    Throw {
        value: NodeId,
    },
    Break {
        label: Option<String>,
    },
    Continue {
        label: Option<String>,
    },
    Empty,
    MethodCall {
        receiver: Option<NodeId>,
        name: String,
        arguments: Vec<NodeId>,
    },
    FieldAccess {
        receiver: NodeId,
        name: String,
    },
    ArrayAccess {
        array: NodeId,
        index: NodeId,
    },
    Infix {
        operator: InfixOperator,
        left: NodeId,
        right: NodeId,
    },
    Prefix {
        operator: PrefixOperator,
        operand: NodeId,
    },
    Postfix {
        operator: PostfixOperator,
        operand: NodeId,
    },
    Parenthesized {
        expression: NodeId,
    },
    InstanceOf {
        operand: NodeId,
        ty: String,
    },
    Cast {
        ty: String,
        operand: NodeId,
    },
    Conditional {
        condition: NodeId,
        then_value: NodeId,
        else_value: NodeId,
    },
    Assignment {
        operator: String,
        target: NodeId,
        value: NodeId,
    },
    New {
        ty: String,
        arguments: Vec<NodeId>,
    },
    Literal(Literal),
    Name(String),
    This,
}

/// Position of a child inside its parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Slot {
    Imports(usize),
    Items(usize),
    Members(usize),
    Statements(usize),
    Init(usize),
    Update(usize),
    Catches(usize),
    Arguments(usize),
    Body,
    Condition,
    Then,
    Else,
    Iterable,
    Finally,
    Expression,
    Initializer,
    Value,
    Receiver,
    Array,
    Index,
    Left,
    Right,
    Operand,
    ThenValue,
    ElseValue,
    Target,
}

impl Slot {
    /// Index inside a list slot, `None` for single-child slots.
    pub fn list_index(self) -> Option<usize> {
        match self {
            Slot::Imports(i)
            | Slot::Items(i)
            | Slot::Members(i)
            | Slot::Statements(i)
            | Slot::Init(i)
            | Slot::Update(i)
            | Slot::Catches(i)
            | Slot::Arguments(i) => Some(i),
            _ => None,
        }
    }

    /// Statement lists: members can be removed or inserted freely.
    pub fn is_statement_list(self) -> bool {
        matches!(self, Slot::Items(_) | Slot::Members(_) | Slot::Statements(_))
    }
}

impl NodeKind {
    pub fn syntax_kind(&self) -> SyntaxKind {
        match self {
            NodeKind::Unit { .. } => SyntaxKind::Unit,
            NodeKind::Import { .. } => SyntaxKind::Import,
            NodeKind::ClassDecl { .. } => SyntaxKind::ClassDecl,
            NodeKind::MethodDecl { .. } => SyntaxKind::MethodDecl,
            NodeKind::Block { .. } => SyntaxKind::Block,
            NodeKind::If { .. } => SyntaxKind::If,
            NodeKind::While { .. } => SyntaxKind::While,
            NodeKind::DoWhile { .. } => SyntaxKind::DoWhile,
            NodeKind::For { .. } => SyntaxKind::For,
            NodeKind::ForEach { .. } => SyntaxKind::ForEach,
            NodeKind::Try { .. } => SyntaxKind::Try,
            NodeKind::Catch { .. } => SyntaxKind::Catch,
            NodeKind::ExpressionStatement { .. } => SyntaxKind::ExpressionStatement,
            NodeKind::LocalVariable { .. } => SyntaxKind::LocalVariable,
            NodeKind::Return { .. } => SyntaxKind::Return,
            NodeKind::Throw { .. } => SyntaxKind::Throw,
            NodeKind::Break { .. } => SyntaxKind::Break,
            NodeKind::Continue { .. } => SyntaxKind::Continue,
            NodeKind::Empty => SyntaxKind::Empty,
            NodeKind::MethodCall { .. } => SyntaxKind::MethodCall,
            NodeKind::FieldAccess { .. } => SyntaxKind::FieldAccess,
            NodeKind::ArrayAccess { .. } => SyntaxKind::ArrayAccess,
            NodeKind::Infix { .. } => SyntaxKind::Infix,
            NodeKind::Prefix { .. } => SyntaxKind::Prefix,
            NodeKind::Postfix { .. } => SyntaxKind::Postfix,
            NodeKind::Parenthesized { .. } => SyntaxKind::Parenthesized,
            NodeKind::InstanceOf { .. } => SyntaxKind::InstanceOf,
            NodeKind::Cast { .. } => SyntaxKind::Cast,
            NodeKind::Conditional { .. } => SyntaxKind::Conditional,
            NodeKind::Assignment { .. } => SyntaxKind::Assignment,
            NodeKind::New { .. } => SyntaxKind::New,
            NodeKind::Literal(_) => SyntaxKind::Literal,
            NodeKind::Name(_) => SyntaxKind::Name,
            NodeKind::This => SyntaxKind::This,
        }
    }

    /// Occupied child slots, in source order.
    pub fn slots(&self) -> Vec<(Slot, NodeId)> {
        fn list(out: &mut Vec<(Slot, NodeId)>, ids: &[NodeId], slot: fn(usize) -> Slot) {
            out.extend(ids.iter().enumerate().map(|(i, id)| (slot(i), *id)));
        }

        let mut out = Vec::new();
        match self {
            NodeKind::Unit { imports, items, .. } => {
                list(&mut out, imports, Slot::Imports);
                list(&mut out, items, Slot::Items);
            }
            NodeKind::ClassDecl { members, .. } => list(&mut out, members, Slot::Members),
            NodeKind::MethodDecl { body, .. } => out.extend(body.map(|b| (Slot::Body, b))),
            NodeKind::Block { statements } => list(&mut out, statements, Slot::Statements),
            NodeKind::If {
                condition,
                then_branch,
                else_branch,
            } => {
                out.push((Slot::Condition, *condition));
                out.push((Slot::Then, *then_branch));
                out.extend(else_branch.map(|e| (Slot::Else, e)));
            }
            NodeKind::While { condition, body } => {
                out.push((Slot::Condition, *condition));
                out.push((Slot::Body, *body));
            }
            NodeKind::DoWhile { body, condition } => {
                out.push((Slot::Body, *body));
                out.push((Slot::Condition, *condition));
            }
            NodeKind::For {
                init,
                condition,
                update,
                body,
            } => {
                list(&mut out, init, Slot::Init);
                out.extend(condition.map(|c| (Slot::Condition, c)));
                list(&mut out, update, Slot::Update);
                out.push((Slot::Body, *body));
            }
            NodeKind::ForEach { iterable, body, .. } => {
                out.push((Slot::Iterable, *iterable));
                out.push((Slot::Body, *body));
            }
            NodeKind::Try {
                body,
                catches,
                finally,
            } => {
                out.push((Slot::Body, *body));
                list(&mut out, catches, Slot::Catches);
                out.extend(finally.map(|f| (Slot::Finally, f)));
            }
            NodeKind::Catch { body, .. } => out.push((Slot::Body, *body)),
            NodeKind::ExpressionStatement { expression } => {
                out.push((Slot::Expression, *expression))
            }
            NodeKind::LocalVariable { initializer, .. } => {
                out.extend(initializer.map(|i| (Slot::Initializer, i)))
            }
            NodeKind::Return { value } => out.extend(value.map(|v| (Slot::Value, v))),
            NodeKind::Throw { value } => out.push((Slot::Value, *value)),
            NodeKind::MethodCall {
                receiver,
                arguments,
                ..
            } => {
                out.extend(receiver.map(|r| (Slot::Receiver, r)));
                list(&mut out, arguments, Slot::Arguments);
            }
            NodeKind::FieldAccess { receiver, .. } => out.push((Slot::Receiver, *receiver)),
            NodeKind::ArrayAccess { array, index } => {
                out.push((Slot::Array, *array));
                out.push((Slot::Index, *index));
            }
            NodeKind::Infix { left, right, .. } => {
                out.push((Slot::Left, *left));
                out.push((Slot::Right, *right));
            }
            NodeKind::Prefix { operand, .. }
            | NodeKind::Postfix { operand, .. }
            | NodeKind::Cast { operand, .. }
            | NodeKind::InstanceOf { operand, .. } => out.push((Slot::Operand, *operand)),
            NodeKind::Parenthesized { expression } => out.push((Slot::Expression, *expression)),
            NodeKind::Conditional {
                condition,
                then_value,
                else_value,
            } => {
                out.push((Slot::Condition, *condition));
                out.push((Slot::ThenValue, *then_value));
                out.push((Slot::ElseValue, *else_value));
            }
            NodeKind::Assignment { target, value, .. } => {
                out.push((Slot::Target, *target));
                out.push((Slot::Value, *value));
            }
            NodeKind::New { arguments, .. } => list(&mut out, arguments, Slot::Arguments),
            NodeKind::Import { .. }
            | NodeKind::Break { .. }
            | NodeKind::Continue { .. }
            | NodeKind::Empty
            | NodeKind::Literal(_)
            | NodeKind::Name(_)
            | NodeKind::This => {}
        }
        out
    }

    pub fn children(&self) -> Vec<NodeId> {
        self.slots().into_iter().map(|(_, id)| id).collect()
    }

    /// Rebuilds this kind with every child id passed through `f`.
    pub fn map_children(&self, mut f: impl FnMut(NodeId) -> NodeId) -> NodeKind {
        let mut kind = self.clone();
        kind.for_each_child_mut(&mut |id| *id = f(*id));
        kind
    }

    fn for_each_child_mut(&mut self, f: &mut dyn FnMut(&mut NodeId)) {
        match self {
            NodeKind::Unit { imports, items, .. } => {
                imports.iter_mut().for_each(&mut *f);
                items.iter_mut().for_each(f);
            }
            NodeKind::ClassDecl { members, .. } => members.iter_mut().for_each(f),
            NodeKind::MethodDecl { body, .. } => body.iter_mut().for_each(f),
            NodeKind::Block { statements } => statements.iter_mut().for_each(f),
            NodeKind::If {
                condition,
                then_branch,
                else_branch,
            } => {
                f(condition);
                f(then_branch);
                else_branch.iter_mut().for_each(f);
            }
            NodeKind::While { condition, body } | NodeKind::DoWhile { body, condition } => {
                f(condition);
                f(body);
            }
            NodeKind::For {
                init,
                condition,
                update,
                body,
            } => {
                init.iter_mut().for_each(&mut *f);
                condition.iter_mut().for_each(&mut *f);
                update.iter_mut().for_each(&mut *f);
                f(body);
            }
            NodeKind::ForEach { iterable, body, .. } => {
                f(iterable);
                f(body);
            }
            NodeKind::Try {
                body,
                catches,
                finally,
            } => {
                f(body);
                catches.iter_mut().for_each(&mut *f);
                finally.iter_mut().for_each(f);
            }
            NodeKind::Catch { body, .. } => f(body),
            NodeKind::ExpressionStatement { expression } => f(expression),
            NodeKind::LocalVariable { initializer, .. } => initializer.iter_mut().for_each(f),
            NodeKind::Return { value } => value.iter_mut().for_each(f),
            NodeKind::Throw { value } => f(value),
            NodeKind::MethodCall {
                receiver,
                arguments,
                ..
            } => {
                receiver.iter_mut().for_each(&mut *f);
                arguments.iter_mut().for_each(f);
            }
            NodeKind::FieldAccess { receiver, .. } => f(receiver),
            NodeKind::ArrayAccess { array, index } => {
                f(array);
                f(index);
            }
            NodeKind::Infix { left, right, .. } => {
                f(left);
                f(right);
            }
            NodeKind::Prefix { operand, .. }
            | NodeKind::Postfix { operand, .. }
            | NodeKind::Cast { operand, .. }
            | NodeKind::InstanceOf { operand, .. } => f(operand),
            NodeKind::Parenthesized { expression } => f(expression),
            NodeKind::Conditional {
                condition,
                then_value,
                else_value,
            } => {
                f(condition);
                f(then_value);
                f(else_value);
            }
            NodeKind::Assignment { target, value, .. } => {
                f(target);
                f(value);
            }
            NodeKind::New { arguments, .. } => arguments.iter_mut().for_each(f),
            NodeKind::Import { .. }
            | NodeKind::Break { .. }
            | NodeKind::Continue { .. }
            | NodeKind::Empty
            | NodeKind::Literal(_)
            | NodeKind::Name(_)
            | NodeKind::This => {}
        }
    }

    pub fn is_statement(&self) -> bool {
        matches!(
            self.syntax_kind(),
            SyntaxKind::Block
                | SyntaxKind::If
                | SyntaxKind::While
                | SyntaxKind::DoWhile
                | SyntaxKind::For
                | SyntaxKind::ForEach
                | SyntaxKind::Try
                | SyntaxKind::ExpressionStatement
                | SyntaxKind::LocalVariable
                | SyntaxKind::Return
                | SyntaxKind::Throw
                | SyntaxKind::Break
                | SyntaxKind::Continue
                | SyntaxKind::Empty
        )
    }

    /// Binding strength when this node is used as an expression.
    pub fn precedence(&self) -> u8 {
        match self {
            NodeKind::Assignment { .. } => precedence::ASSIGNMENT,
            NodeKind::Conditional { .. } => precedence::CONDITIONAL,
            NodeKind::Infix { operator, .. } => operator.precedence(),
            NodeKind::InstanceOf { .. } => precedence::RELATIONAL,
            NodeKind::Prefix { .. } | NodeKind::Cast { .. } => precedence::UNARY,
            NodeKind::Postfix { .. } => precedence::POSTFIX,
            _ => precedence::PRIMARY,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub kind: NodeKind,
    pub origin: Origin,
}

/// Parsed document: the arena of nodes plus the text they were parsed from.
///
/// The tree is immutable once built. Rules read it through [`NodeRef`] and
/// stage their changes in an edit batch; a new tree is obtained by parsing
/// the rendered text.
#[derive(Debug, Clone)]
pub struct SyntaxTree {
    source: String,
    generation: u32,
    nodes: Vec<Node>,
    parents: Vec<Option<NodeId>>,
    root: NodeId,
}

impl SyntaxTree {
    /// Builds a tree from an arena where `nodes[i]` has index `i` and every
    /// node carries the generation of `root`.
    pub fn from_nodes(source: impl Into<String>, nodes: Vec<Node>, root: NodeId) -> Self {
        let generation = root.generation();
        let mut parents = vec![None; nodes.len()];
        for (index, node) in nodes.iter().enumerate() {
            debug_assert_eq!(node.id.index(), index, "arena out of order");
            debug_assert_eq!(node.id.generation(), generation, "mixed generations");
            for child in node.kind.children() {
                debug_assert!(parents[child.index()].is_none(), "{child} has two parents");
                parents[child.index()] = Some(node.id);
            }
        }
        Self {
            source: source.into(),
            generation,
            nodes,
            parents,
            root,
        }
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn root(&self) -> NodeRef<'_> {
        self.node(self.root)
    }

    pub fn root_id(&self) -> NodeId {
        self.root
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Whether `id` names a node of this tree; ids kept from an earlier
    /// tree never do.
    pub fn contains(&self, id: NodeId) -> bool {
        id.generation() == self.generation && id.index() < self.nodes.len()
    }

    /// Cursor on a node known to belong to this tree.
    pub fn node(&self, id: NodeId) -> NodeRef<'_> {
        debug_assert!(self.contains(id), "{id} is not part of this tree");
        NodeRef { tree: self, id }
    }

    /// Cursor on a node, or `None` for ids this tree does not own.
    pub fn get(&self, id: NodeId) -> Option<NodeRef<'_>> {
        self.contains(id).then_some(NodeRef { tree: self, id })
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.index()].kind
    }

    pub fn range(&self, id: NodeId) -> TextRange {
        match self.nodes[id.index()].origin {
            Origin::Source(range) | Origin::Copied(range) => range,
            Origin::Synthetic => TextRange::new(0, 0),
        }
    }

    pub fn text(&self, id: NodeId) -> &str {
        let range = self.range(id);
        &self.source[range.start..range.end]
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        if !self.contains(id) {
            return None;
        }
        self.parents.get(id.index()).copied().flatten()
    }

    /// Strict ancestors of `id`, nearest first.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), move |current| self.parent(*current))
    }

    /// Whether `ancestor` strictly encloses `id`.
    pub fn is_ancestor(&self, ancestor: NodeId, id: NodeId) -> bool {
        self.ancestors(id).any(|a| a == ancestor)
    }

    /// The slot `id` occupies in its parent.
    pub fn slot_of(&self, id: NodeId) -> Option<Slot> {
        let parent = self.parent(id)?;
        self.kind(parent)
            .slots()
            .into_iter()
            .find_map(|(slot, child)| (child == id).then_some(slot))
    }

    /// Pre-order walk of the subtree rooted at `id`.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            out.push(current);
            let children = self.kind(current).children();
            stack.extend(children.into_iter().rev());
        }
        out
    }

    /// Deep-clones a subtree into a detached fragment with fresh identities.
    pub fn copy(&self, id: NodeId, ids: &mut IdAllocator) -> Fragment {
        let mut builder = FragmentBuilder::new(self, ids);
        let root = builder.copy(id);
        builder.finish(root)
    }

    /// Structural equality of two subtrees, ignoring identities and ranges.
    pub fn subtree_matches(&self, a: NodeId, b: NodeId) -> bool {
        let (ka, kb) = (self.kind(a), self.kind(b));
        if ka.syntax_kind() != kb.syntax_kind() {
            return false;
        }
        let (ca, cb) = (ka.children(), kb.children());
        if ca.len() != cb.len() {
            return false;
        }
        let placeholder = NodeId::new(0, 0);
        if ka.map_children(|_| placeholder) != kb.map_children(|_| placeholder) {
            return false;
        }
        ca.into_iter()
            .zip(cb)
            .all(|(x, y)| self.subtree_matches(x, y))
    }
}

/// Borrowed cursor on one node of a [`SyntaxTree`].
#[derive(Clone, Copy)]
pub struct NodeRef<'t> {
    tree: &'t SyntaxTree,
    id: NodeId,
}

impl<'t> NodeRef<'t> {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn tree(&self) -> &'t SyntaxTree {
        self.tree
    }

    pub fn kind(&self) -> &'t NodeKind {
        self.tree.kind(self.id)
    }

    pub fn syntax_kind(&self) -> SyntaxKind {
        self.kind().syntax_kind()
    }

    pub fn range(&self) -> TextRange {
        self.tree.range(self.id)
    }

    pub fn text(&self) -> &'t str {
        self.tree.text(self.id)
    }

    pub fn parent(&self) -> Option<NodeRef<'t>> {
        self.tree.parent(self.id).map(|p| self.tree.node(p))
    }

    pub fn slot(&self) -> Option<Slot> {
        self.tree.slot_of(self.id)
    }

    pub fn children(&self) -> Vec<NodeRef<'t>> {
        self.kind()
            .children()
            .into_iter()
            .map(|c| self.tree.node(c))
            .collect()
    }

    /// Jump to another node of the same tree.
    pub fn at(&self, id: NodeId) -> NodeRef<'t> {
        self.tree.node(id)
    }

    /// Zero-based position among the parent's children.
    pub fn sibling_index(&self) -> Option<usize> {
        let parent = self.tree.parent(self.id)?;
        self.tree
            .kind(parent)
            .children()
            .iter()
            .position(|c| *c == self.id)
    }

    pub fn is(&self, kind: SyntaxKind) -> bool {
        self.syntax_kind() == kind
    }

    /// The node itself with any enclosing parentheses peeled off.
    pub fn without_parentheses(&self) -> NodeRef<'t> {
        let mut current = *self;
        while let NodeKind::Parenthesized { expression } = current.kind() {
            current = current.at(*expression);
        }
        current
    }

    /// Statements of a block, or the statement itself when it is not one.
    pub fn as_statement_list(&self) -> Vec<NodeRef<'t>> {
        match self.kind() {
            NodeKind::Block { statements } => statements.iter().map(|s| self.at(*s)).collect(),
            _ => vec![*self],
        }
    }

    pub fn as_literal(&self) -> Option<&'t Literal> {
        match self.kind() {
            NodeKind::Literal(literal) => Some(literal),
            _ => None,
        }
    }

    pub fn is_null_literal(&self) -> bool {
        matches!(self.as_literal(), Some(l) if l.kind == LiteralKind::Null)
    }

    pub fn as_boolean_literal(&self) -> Option<bool> {
        self.as_literal().and_then(Literal::as_boolean)
    }

    /// Nearest ancestor that is not a block.
    pub fn parent_ignoring_blocks(&self) -> Option<NodeRef<'t>> {
        let mut parent = self.parent()?;
        while parent.is(SyntaxKind::Block) {
            parent = parent.parent()?;
        }
        Some(parent)
    }
}

impl fmt::Debug for NodeRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}{} `{}`", self.syntax_kind(), self.id, self.text())
    }
}

impl PartialEq for NodeRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.tree, other.tree) && self.id == other.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::{java::JavaFrontend, Frontend};

    fn parse(source: &str) -> SyntaxTree {
        JavaFrontend::new().parse(source).expect("parse")
    }

    fn find(tree: &SyntaxTree, kind: SyntaxKind) -> NodeId {
        tree.descendants(tree.root_id())
            .into_iter()
            .find(|id| tree.kind(*id).syntax_kind() == kind)
            .expect("node of requested kind")
    }

    #[test]
    fn test_parent_links_match_children() {
        let tree = parse("if (a) { b(); } else { c(); }");
        for id in tree.descendants(tree.root_id()) {
            for child in tree.kind(id).children() {
                assert_eq!(tree.parent(child), Some(id));
            }
        }
        assert_eq!(tree.parent(tree.root_id()), None);
    }

    #[test]
    fn test_child_ranges_nest_inside_parent() {
        let tree = parse("while (x > 1) { x = x - 1; foo(x, \"s\"); }");
        for id in tree.descendants(tree.root_id()) {
            let parent_range = tree.range(id);
            let mut previous_end = parent_range.start;
            for child in tree.kind(id).children() {
                let range = tree.range(child);
                assert!(parent_range.contains_range(range), "{child} escapes {id}");
                assert!(range.start >= previous_end, "{child} overlaps a sibling");
                previous_end = range.end;
            }
        }
    }

    #[test]
    fn test_missing_else_is_absent_not_empty() {
        let tree = parse("if (a) ; if (b) ; else ;");
        let ifs: Vec<_> = tree
            .descendants(tree.root_id())
            .into_iter()
            .filter(|id| tree.kind(*id).syntax_kind() == SyntaxKind::If)
            .collect();
        let NodeKind::If { else_branch, .. } = tree.kind(ifs[0]) else {
            panic!("expected if");
        };
        assert!(else_branch.is_none());
        let NodeKind::If { else_branch, .. } = tree.kind(ifs[1]) else {
            panic!("expected if");
        };
        let else_branch = else_branch.expect("else present");
        assert_eq!(tree.kind(else_branch).syntax_kind(), SyntaxKind::Empty);
    }

    #[test]
    fn test_slot_of_reports_position() {
        let tree = parse("foo(a, b);");
        let call = find(&tree, SyntaxKind::MethodCall);
        let NodeKind::MethodCall { arguments, .. } = tree.kind(call) else {
            panic!("expected call");
        };
        assert_eq!(tree.slot_of(arguments[1]), Some(Slot::Arguments(1)));
        assert_eq!(tree.node(arguments[1]).sibling_index(), Some(1));
    }

    #[test]
    fn test_copy_assigns_fresh_ids_and_keeps_content() {
        let tree = parse("x = a.compareTo(b);");
        let call = find(&tree, SyntaxKind::MethodCall);
        let mut ids = IdAllocator::after(&tree);
        let fragment = tree.copy(call, &mut ids);
        assert!(fragment.node_ids().all(|id| !tree.contains(id)));
        let root = fragment.root_node();
        assert!(matches!(&root.kind, NodeKind::MethodCall { name, .. } if name == "compareTo"));
        assert_eq!(root.origin, Origin::Copied(tree.range(call)));
        assert_eq!(fragment.to_source(tree.source()), "a.compareTo(b)");
    }

    #[test]
    fn test_subtree_matches_ignores_identity() {
        let tree = parse("f(a.b, a.b, a.c);");
        let call = find(&tree, SyntaxKind::MethodCall);
        let NodeKind::MethodCall { arguments, .. } = tree.kind(call) else {
            panic!("expected call");
        };
        assert!(tree.subtree_matches(arguments[0], arguments[1]));
        assert!(!tree.subtree_matches(arguments[0], arguments[2]));
    }
}
