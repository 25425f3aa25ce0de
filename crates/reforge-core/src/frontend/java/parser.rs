//! Recursive-descent parser for the Java subset.
//!
//! ```text
//! unit       = [ "package" qname ";" ] { import } { item } ;
//! import     = "import" [ "static" ] qname [ "." "*" ] ";" ;
//! item       = class | member | statement ;
//! statement  = block | ";" | if | while | do | for | try | return | throw
//!            | break | continue | local ";" | expression ";" ;
//! expression = assignment ;
//! assignment = conditional [ assign_op assignment ] ;
//! conditional= binary [ "?" expression ":" conditional ] ;
//! binary     = unary { infix_op unary | "instanceof" type } ;   (precedence climbing)
//! unary      = prefix_op unary | "(" type ")" unary | postfix ;
//! postfix    = primary { "." name [ arguments ] | "[" expression "]" | "++" | "--" } ;
//! primary    = literal | "this" | "new" type arguments | name [ arguments ]
//!            | "(" expression ")" ;
//! ```
//!
//! Nodes are pushed into the arena as they complete, so children always
//! precede their parent and every range nests inside its parent's.

use super::lexer::{tokenize, Token, TokenKind};
use crate::ast::{
    next_generation, precedence, InfixOperator, Literal, LiteralKind, Node, NodeId, NodeKind, Origin, Parameter,
    PostfixOperator, PrefixOperator, SyntaxTree, TextRange,
};
use crate::frontend::ParseError;

const PRIMITIVES: &[&str] = &[
    "boolean", "byte", "short", "char", "int", "long", "float", "double", "void",
];

const MODIFIERS: &[&str] = &[
    "public",
    "protected",
    "private",
    "static",
    "final",
    "abstract",
    "synchronized",
    "native",
    "transient",
    "volatile",
    "strictfp",
    "default",
];

const RESERVED: &[&str] = &[
    "if",
    "else",
    "while",
    "do",
    "for",
    "try",
    "catch",
    "finally",
    "return",
    "throw",
    "break",
    "continue",
    "class",
    "interface",
    "enum",
    "import",
    "package",
    "instanceof",
    "new",
    "switch",
    "case",
];

const ASSIGNMENT_OPERATORS: &[&str] = &[
    "=", "+=", "-=", "*=", "/=", "%=", "&=", "|=", "^=", "<<=", ">>=", ">>>=",
];

type ParseResult<T> = Result<T, ParseError>;

/// Parses a whole document into a tree rooted at a `Unit` node.
pub fn parse(source: &str) -> ParseResult<SyntaxTree> {
    let tokens = tokenize(source)?;
    let mut parser = Parser {
        source,
        tokens,
        pos: 0,
        generation: next_generation(),
        nodes: Vec::new(),
    };
    let root = parser.unit()?;
    Ok(SyntaxTree::from_nodes(source, parser.nodes, root))
}

struct Parser<'s> {
    source: &'s str,
    tokens: Vec<Token<'s>>,
    pos: usize,
    generation: u32,
    nodes: Vec<Node>,
}

impl<'s> Parser<'s> {
    // ---- token cursor ----------------------------------------------------

    fn peek(&self) -> Option<Token<'s>> {
        self.tokens.get(self.pos).copied()
    }

    fn token_is(&self, index: usize, text: &str) -> bool {
        self.tokens.get(index).is_some_and(|t| t.is(text))
    }

    fn at(&self, text: &str) -> bool {
        self.token_is(self.pos, text)
    }

    fn is_name(&self, index: usize) -> bool {
        self.tokens
            .get(index)
            .is_some_and(|t| t.kind == TokenKind::Identifier && !RESERVED.contains(&t.text))
    }

    fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn bump(&mut self) -> ParseResult<Token<'s>> {
        let token = self
            .peek()
            .ok_or_else(|| ParseError::at(self.source, self.source.len(), "unexpected end of input"))?;
        self.pos += 1;
        Ok(token)
    }

    fn eat(&mut self, text: &str) -> bool {
        if self.at(text) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, text: &str) -> ParseResult<Token<'s>> {
        if self.at(text) {
            self.bump()
        } else {
            Err(self.unexpected(&format!("`{text}`")))
        }
    }

    fn unexpected(&self, expected: &str) -> ParseError {
        match self.peek() {
            Some(token) => ParseError::at(
                self.source,
                token.start,
                format!("expected {expected}, found `{}`", token.text),
            ),
            None => ParseError::at(
                self.source,
                self.source.len(),
                format!("expected {expected}, found end of input"),
            ),
        }
    }

    fn start(&self) -> usize {
        self.peek().map(|t| t.start).unwrap_or(self.source.len())
    }

    fn prev_end(&self) -> usize {
        self.pos
            .checked_sub(1)
            .and_then(|i| self.tokens.get(i))
            .map(|t| t.end)
            .unwrap_or(0)
    }

    fn push(&mut self, kind: NodeKind, start: usize, end: usize) -> NodeId {
        let id = NodeId::new(self.generation, self.nodes.len() as u32);
        self.nodes.push(Node {
            id,
            kind,
            origin: Origin::Source(TextRange::new(start, end)),
        });
        id
    }

    fn finish(&mut self, kind: NodeKind, start: usize) -> NodeId {
        let end = self.prev_end().max(start);
        self.push(kind, start, end)
    }

    fn identifier(&mut self) -> ParseResult<&'s str> {
        if self.is_name(self.pos) {
            Ok(self.bump()?.text)
        } else {
            Err(self.unexpected("an identifier"))
        }
    }

    fn qualified_name(&mut self) -> ParseResult<String> {
        let mut name = self.identifier()?.to_string();
        while self.at(".") && self.is_name(self.pos + 1) {
            self.pos += 1;
            name.push('.');
            name.push_str(self.identifier()?);
        }
        Ok(name)
    }

    /// Skips a balanced `open ... close` group starting at the cursor.
    fn skip_balanced(&mut self, open: &str, close: &str) -> ParseResult<()> {
        self.expect(open)?;
        let mut depth = 1usize;
        while depth > 0 {
            let token = self.bump()?;
            if token.is(open) {
                depth += 1;
            } else if token.is(close) {
                depth -= 1;
            }
        }
        Ok(())
    }

    // ---- types -----------------------------------------------------------

    /// Index one past a type starting at `index`, if one starts there.
    fn scan_type(&self, index: usize) -> Option<usize> {
        if !self.is_name(index) {
            return None;
        }
        let mut i = index + 1;
        loop {
            if self.token_is(i, "<") {
                i = self.scan_type_arguments(i)?;
            }
            if self.token_is(i, ".") && self.is_name(i + 1) {
                i += 2;
                continue;
            }
            break;
        }
        while self.token_is(i, "[") && self.token_is(i + 1, "]") {
            i += 2;
        }
        Some(i)
    }

    fn scan_type_arguments(&self, index: usize) -> Option<usize> {
        let mut depth: i32 = 0;
        let mut i = index;
        loop {
            let token = self.tokens.get(i)?;
            match token.text {
                "<" => depth += 1,
                ">" => depth -= 1,
                ">>" => depth -= 2,
                ">>>" => depth -= 3,
                "," | "." | "?" | "[" | "]" | "&" => {}
                _ if token.kind == TokenKind::Identifier => {}
                _ => return None,
            }
            i += 1;
            if depth == 0 {
                return Some(i);
            }
            if depth < 0 {
                return None;
            }
        }
    }

    fn type_text(&mut self) -> ParseResult<String> {
        let end = self
            .scan_type(self.pos)
            .ok_or_else(|| self.unexpected("a type"))?;
        let start = self.tokens[self.pos].start;
        let stop = self.tokens[end - 1].end;
        self.pos = end;
        Ok(self.source[start..stop].to_string())
    }

    // ---- declarations ----------------------------------------------------

    fn unit(&mut self) -> ParseResult<NodeId> {
        let mut package = None;
        if self.eat("package") {
            package = Some(self.qualified_name()?);
            self.expect(";")?;
        }

        let mut imports = Vec::new();
        while self.at("import") {
            let start = self.start();
            self.bump()?;
            let is_static = self.eat("static");
            let mut path = self.identifier()?.to_string();
            let mut on_demand = false;
            while self.eat(".") {
                if self.eat("*") {
                    on_demand = true;
                    break;
                }
                path.push('.');
                path.push_str(self.identifier()?);
            }
            self.expect(";")?;
            imports.push(self.finish(
                NodeKind::Import {
                    path,
                    is_static,
                    on_demand,
                },
                start,
            ));
        }

        let mut items = Vec::new();
        while !self.at_end() {
            items.push(self.item()?);
        }

        Ok(self.push(
            NodeKind::Unit {
                package,
                imports,
                items,
            },
            0,
            self.source.len(),
        ))
    }

    fn item(&mut self) -> ParseResult<NodeId> {
        if self.looks_like_class() {
            self.class_decl()
        } else if self.looks_like_member() {
            self.member()
        } else {
            self.statement()
        }
    }

    /// Index after any annotations and modifiers at the cursor.
    fn skip_modifiers_from(&self, index: usize) -> usize {
        let mut i = index;
        loop {
            if self.token_is(i, "@") && !self.token_is(i + 1, "interface") {
                i += 1;
                while self.is_name(i) {
                    i += 1;
                    if !self.token_is(i, ".") {
                        break;
                    }
                    i += 1;
                }
                if self.token_is(i, "(") {
                    let mut depth = 0usize;
                    while let Some(token) = self.tokens.get(i) {
                        i += 1;
                        if token.is("(") {
                            depth += 1;
                        } else if token.is(")") {
                            depth -= 1;
                            if depth == 0 {
                                break;
                            }
                        }
                    }
                }
            } else if self
                .tokens
                .get(i)
                .is_some_and(|t| t.kind == TokenKind::Identifier && MODIFIERS.contains(&t.text))
            {
                i += 1;
            } else {
                return i;
            }
        }
    }

    fn looks_like_class(&self) -> bool {
        let i = self.skip_modifiers_from(self.pos);
        self.token_is(i, "class") || self.token_is(i, "interface")
    }

    fn looks_like_member(&self) -> bool {
        let i = self.skip_modifiers_from(self.pos);
        if i > self.pos {
            return true;
        }
        match self.scan_type(i) {
            Some(end) => self.is_name(end) && self.token_is(end + 1, "("),
            None => false,
        }
    }

    fn modifiers(&mut self) -> ParseResult<Vec<String>> {
        let mut modifiers = Vec::new();
        loop {
            let start = self.start();
            if self.at("@") && !self.token_is(self.pos + 1, "interface") {
                self.bump()?;
                self.qualified_name()?;
                if self.at("(") {
                    self.skip_balanced("(", ")")?;
                }
                modifiers.push(self.source[start..self.prev_end()].to_string());
            } else if self
                .peek()
                .is_some_and(|t| t.kind == TokenKind::Identifier && MODIFIERS.contains(&t.text))
            {
                modifiers.push(self.bump()?.text.to_string());
            } else {
                return Ok(modifiers);
            }
        }
    }

    fn class_decl(&mut self) -> ParseResult<NodeId> {
        let start = self.start();
        let modifiers = self.modifiers()?;
        if !self.eat("class") {
            self.expect("interface")?;
        }
        let name = self.identifier()?.to_string();
        while !self.at("{") {
            if self.at_end() {
                return Err(self.unexpected("`{`"));
            }
            self.bump()?;
        }
        self.expect("{")?;
        let mut members = Vec::new();
        while !self.at("}") {
            if self.at_end() {
                return Err(self.unexpected("`}`"));
            }
            members.push(self.member()?);
        }
        self.expect("}")?;
        Ok(self.finish(
            NodeKind::ClassDecl {
                modifiers,
                name,
                members,
            },
            start,
        ))
    }

    fn member(&mut self) -> ParseResult<NodeId> {
        let start = self.start();
        if self.at(";") {
            self.bump()?;
            return Ok(self.finish(NodeKind::Empty, start));
        }
        if self.looks_like_class() {
            return self.class_decl();
        }
        let mut modifiers = self.modifiers()?;
        if self.at("{") {
            return self.block();
        }
        if self.at("<") {
            let generics = self.start();
            self.skip_balanced("<", ">")?;
            modifiers.push(self.source[generics..self.prev_end()].to_string());
        }

        let (return_type, name) = if self.is_name(self.pos) && self.token_is(self.pos + 1, "(") {
            (String::new(), self.identifier()?.to_string())
        } else {
            let ty = self.type_text()?;
            (ty, self.identifier()?.to_string())
        };

        if !self.at("(") {
            return self.finish_local_variable(start, modifiers, return_type, name, true);
        }

        self.expect("(")?;
        let mut parameters = Vec::new();
        while !self.at(")") {
            self.modifiers()?;
            let mut ty = self.type_text()?;
            if self.eat("...") {
                ty.push_str("...");
            }
            let name = self.identifier()?.to_string();
            parameters.push(Parameter { ty, name });
            if !self.eat(",") {
                break;
            }
        }
        self.expect(")")?;
        while self.at("[") {
            self.expect("[")?;
            self.expect("]")?;
        }
        if self.eat("throws") {
            loop {
                self.type_text()?;
                if !self.eat(",") {
                    break;
                }
            }
        }
        let body = if self.eat(";") {
            None
        } else {
            Some(self.block()?)
        };
        Ok(self.finish(
            NodeKind::MethodDecl {
                modifiers,
                return_type,
                name,
                parameters,
                body,
            },
            start,
        ))
    }

    // ---- statements ------------------------------------------------------

    fn statement(&mut self) -> ParseResult<NodeId> {
        let start = self.start();
        let Some(token) = self.peek() else {
            return Err(self.unexpected("a statement"));
        };
        if !matches!(token.kind, TokenKind::Identifier | TokenKind::Punct) {
            return self.expression_statement(start);
        }
        match token.text {
            "{" => self.block(),
            ";" => {
                self.bump()?;
                Ok(self.finish(NodeKind::Empty, start))
            }
            "if" => {
                self.bump()?;
                let condition = self.parenthesized_condition()?;
                let then_branch = self.statement()?;
                let else_branch = if self.eat("else") {
                    Some(self.statement()?)
                } else {
                    None
                };
                Ok(self.finish(
                    NodeKind::If {
                        condition,
                        then_branch,
                        else_branch,
                    },
                    start,
                ))
            }
            "while" => {
                self.bump()?;
                let condition = self.parenthesized_condition()?;
                let body = self.statement()?;
                Ok(self.finish(NodeKind::While { condition, body }, start))
            }
            "do" => {
                self.bump()?;
                let body = self.statement()?;
                self.expect("while")?;
                let condition = self.parenthesized_condition()?;
                self.expect(";")?;
                Ok(self.finish(NodeKind::DoWhile { body, condition }, start))
            }
            "for" => self.for_statement(start),
            "try" => self.try_statement(start),
            "return" => {
                self.bump()?;
                let value = if self.at(";") {
                    None
                } else {
                    Some(self.expression()?)
                };
                self.expect(";")?;
                Ok(self.finish(NodeKind::Return { value }, start))
            }
            "throw" => {
                self.bump()?;
                let value = self.expression()?;
                self.expect(";")?;
                Ok(self.finish(NodeKind::Throw { value }, start))
            }
            "break" | "continue" => {
                let keyword = self.bump()?;
                let label = if self.is_name(self.pos) {
                    Some(self.identifier()?.to_string())
                } else {
                    None
                };
                self.expect(";")?;
                let kind = if keyword.is("break") {
                    NodeKind::Break { label }
                } else {
                    NodeKind::Continue { label }
                };
                Ok(self.finish(kind, start))
            }
            "switch" | "synchronized" | "assert" | "class" | "interface" | "enum" => {
                Err(ParseError::at(
                    self.source,
                    token.start,
                    format!("`{}` statements are not supported", token.text),
                ))
            }
            _ if self.looks_like_local_variable() => {
                let local = self.local_variable(start, true)?;
                Ok(local)
            }
            _ => self.expression_statement(start),
        }
    }

    fn expression_statement(&mut self, start: usize) -> ParseResult<NodeId> {
        let expression = self.expression()?;
        self.expect(";")?;
        Ok(self.finish(NodeKind::ExpressionStatement { expression }, start))
    }

    fn parenthesized_condition(&mut self) -> ParseResult<NodeId> {
        self.expect("(")?;
        let condition = self.expression()?;
        self.expect(")")?;
        Ok(condition)
    }

    fn block(&mut self) -> ParseResult<NodeId> {
        let start = self.start();
        self.expect("{")?;
        let mut statements = Vec::new();
        while !self.at("}") {
            if self.at_end() {
                return Err(self.unexpected("`}`"));
            }
            statements.push(self.statement()?);
        }
        self.expect("}")?;
        Ok(self.finish(NodeKind::Block { statements }, start))
    }

    fn looks_like_local_variable(&self) -> bool {
        if self.at("final") || self.at("@") {
            return true;
        }
        match self.scan_type(self.pos) {
            Some(end) => {
                self.is_name(end)
                    && ["=", ";", ",", ":"]
                        .iter()
                        .any(|t| self.token_is(end + 1, t))
            }
            None => false,
        }
    }

    fn local_variable(&mut self, start: usize, terminated: bool) -> ParseResult<NodeId> {
        let modifiers = self.modifiers()?;
        let ty = self.type_text()?;
        let name = self.identifier()?.to_string();
        self.finish_local_variable(start, modifiers, ty, name, terminated)
    }

    fn finish_local_variable(
        &mut self,
        start: usize,
        modifiers: Vec<String>,
        ty: String,
        name: String,
        terminated: bool,
    ) -> ParseResult<NodeId> {
        if self.at(",") {
            return Err(self.unexpected("a single declarator"));
        }
        let initializer = if self.eat("=") {
            Some(self.expression()?)
        } else {
            None
        };
        if terminated {
            self.expect(";")?;
        }
        Ok(self.finish(
            NodeKind::LocalVariable {
                modifiers,
                ty,
                name,
                initializer,
            },
            start,
        ))
    }

    fn for_statement(&mut self, start: usize) -> ParseResult<NodeId> {
        self.expect("for")?;
        self.expect("(")?;

        let checkpoint = self.pos;
        let after_modifiers = self.skip_modifiers_from(self.pos);
        if let Some(end) = self.scan_type(after_modifiers) {
            if self.is_name(end) && self.token_is(end + 1, ":") {
                self.modifiers()?;
                let ty = self.type_text()?;
                let name = self.identifier()?.to_string();
                self.expect(":")?;
                let iterable = self.expression()?;
                self.expect(")")?;
                let body = self.statement()?;
                return Ok(self.finish(
                    NodeKind::ForEach {
                        ty,
                        name,
                        iterable,
                        body,
                    },
                    start,
                ));
            }
        }
        self.pos = checkpoint;

        let mut init = Vec::new();
        if !self.at(";") {
            if self.looks_like_local_variable() {
                let local_start = self.start();
                init.push(self.local_variable(local_start, false)?);
            } else {
                init = self.expression_list()?;
            }
        }
        self.expect(";")?;
        let condition = if self.at(";") {
            None
        } else {
            Some(self.expression()?)
        };
        self.expect(";")?;
        let update = if self.at(")") {
            Vec::new()
        } else {
            self.expression_list()?
        };
        self.expect(")")?;
        let body = self.statement()?;
        Ok(self.finish(
            NodeKind::For {
                init,
                condition,
                update,
                body,
            },
            start,
        ))
    }

    fn expression_list(&mut self) -> ParseResult<Vec<NodeId>> {
        let mut expressions = vec![self.expression()?];
        while self.eat(",") {
            expressions.push(self.expression()?);
        }
        Ok(expressions)
    }

    fn try_statement(&mut self, start: usize) -> ParseResult<NodeId> {
        self.expect("try")?;
        if self.at("(") {
            return Err(self.unexpected("`{` (try-with-resources is not supported)"));
        }
        let body = self.block()?;
        let mut catches = Vec::new();
        while self.at("catch") {
            let catch_start = self.start();
            self.bump()?;
            self.expect("(")?;
            self.modifiers()?;
            let mut ty = self.type_text()?;
            while self.eat("|") {
                ty.push_str(" | ");
                ty.push_str(&self.type_text()?);
            }
            let name = self.identifier()?.to_string();
            self.expect(")")?;
            let catch_body = self.block()?;
            catches.push(self.finish(
                NodeKind::Catch {
                    ty,
                    name,
                    body: catch_body,
                },
                catch_start,
            ));
        }
        let finally = if self.eat("finally") {
            Some(self.block()?)
        } else {
            None
        };
        Ok(self.finish(
            NodeKind::Try {
                body,
                catches,
                finally,
            },
            start,
        ))
    }

    // ---- expressions -----------------------------------------------------

    fn expression(&mut self) -> ParseResult<NodeId> {
        self.assignment()
    }

    fn assignment(&mut self) -> ParseResult<NodeId> {
        let start = self.start();
        let target = self.conditional()?;
        match self.peek() {
            Some(token)
                if token.kind == TokenKind::Punct && ASSIGNMENT_OPERATORS.contains(&token.text) =>
            {
                self.bump()?;
                let value = self.assignment()?;
                Ok(self.finish(
                    NodeKind::Assignment {
                        operator: token.text.to_string(),
                        target,
                        value,
                    },
                    start,
                ))
            }
            _ => Ok(target),
        }
    }

    fn conditional(&mut self) -> ParseResult<NodeId> {
        let start = self.start();
        let condition = self.binary(precedence::CONDITIONAL_OR)?;
        if !self.eat("?") {
            return Ok(condition);
        }
        let then_value = self.expression()?;
        self.expect(":")?;
        let else_value = self.conditional()?;
        Ok(self.finish(
            NodeKind::Conditional {
                condition,
                then_value,
                else_value,
            },
            start,
        ))
    }

    fn binary(&mut self, min_precedence: u8) -> ParseResult<NodeId> {
        let start = self.start();
        let mut left = self.unary()?;
        while let Some(token) = self.peek() {
            if token.is("instanceof") {
                if precedence::RELATIONAL < min_precedence {
                    break;
                }
                self.bump()?;
                let ty = self.type_text()?;
                left = self.finish(NodeKind::InstanceOf { operand: left, ty }, start);
                continue;
            }
            if token.kind != TokenKind::Punct {
                break;
            }
            let Some(operator) = InfixOperator::from_token(token.text) else {
                break;
            };
            if operator.precedence() < min_precedence {
                break;
            }
            self.bump()?;
            let right = self.binary(operator.precedence() + 1)?;
            left = self.finish(
                NodeKind::Infix {
                    operator,
                    left,
                    right,
                },
                start,
            );
        }
        Ok(left)
    }

    fn unary(&mut self) -> ParseResult<NodeId> {
        let start = self.start();
        if let Some(token) = self.peek() {
            if token.kind == TokenKind::Punct {
                if let Some(operator) = PrefixOperator::from_token(token.text) {
                    self.bump()?;
                    let operand = self.unary()?;
                    return Ok(self.finish(NodeKind::Prefix { operator, operand }, start));
                }
            }
            if token.is("(") && self.is_cast() {
                self.bump()?;
                let ty = self.type_text()?;
                self.expect(")")?;
                let operand = self.unary()?;
                return Ok(self.finish(NodeKind::Cast { ty, operand }, start));
            }
        }
        self.postfix()
    }

    /// `( Type )` followed by something that can only be a cast operand.
    fn is_cast(&self) -> bool {
        let Some(end) = self.scan_type(self.pos + 1) else {
            return false;
        };
        if !self.token_is(end, ")") {
            return false;
        }
        let primitive = self
            .tokens
            .get(self.pos + 1)
            .is_some_and(|t| PRIMITIVES.contains(&t.text));
        let Some(next) = self.tokens.get(end + 1) else {
            return false;
        };
        match next.kind {
            TokenKind::Identifier => !next.is("instanceof"),
            TokenKind::Integer | TokenKind::Floating | TokenKind::String | TokenKind::Char => true,
            TokenKind::Punct => {
                matches!(next.text, "(" | "!" | "~")
                    || (primitive && matches!(next.text, "-" | "+" | "++" | "--"))
            }
        }
    }

    fn postfix(&mut self) -> ParseResult<NodeId> {
        let start = self.start();
        let mut expression = self.primary()?;
        loop {
            if self.eat(".") {
                let name = match self.peek() {
                    Some(token) if token.kind == TokenKind::Identifier => self.bump()?.text,
                    _ => return Err(self.unexpected("a member name")),
                }
                .to_string();
                expression = if self.at("(") {
                    let arguments = self.arguments()?;
                    self.finish(
                        NodeKind::MethodCall {
                            receiver: Some(expression),
                            name,
                            arguments,
                        },
                        start,
                    )
                } else {
                    self.finish(
                        NodeKind::FieldAccess {
                            receiver: expression,
                            name,
                        },
                        start,
                    )
                };
            } else if self.eat("[") {
                let index = self.expression()?;
                self.expect("]")?;
                expression = self.finish(
                    NodeKind::ArrayAccess {
                        array: expression,
                        index,
                    },
                    start,
                );
            } else if self.at("++") || self.at("--") {
                let operator = if self.bump()?.is("++") {
                    PostfixOperator::Increment
                } else {
                    PostfixOperator::Decrement
                };
                expression = self.finish(
                    NodeKind::Postfix {
                        operator,
                        operand: expression,
                    },
                    start,
                );
            } else {
                return Ok(expression);
            }
        }
    }

    fn arguments(&mut self) -> ParseResult<Vec<NodeId>> {
        self.expect("(")?;
        let arguments = if self.at(")") {
            Vec::new()
        } else {
            self.expression_list()?
        };
        self.expect(")")?;
        Ok(arguments)
    }

    fn primary(&mut self) -> ParseResult<NodeId> {
        let start = self.start();
        let Some(token) = self.peek() else {
            return Err(self.unexpected("an expression"));
        };
        let literal = |kind| NodeKind::Literal(Literal::new(kind, token.text));
        let kind = match token.kind {
            TokenKind::Integer => literal(LiteralKind::Integer),
            TokenKind::Floating => literal(LiteralKind::Floating),
            TokenKind::String => literal(LiteralKind::String),
            TokenKind::Char => literal(LiteralKind::Char),
            TokenKind::Identifier => match token.text {
                "true" | "false" => literal(LiteralKind::Boolean),
                "null" => literal(LiteralKind::Null),
                "this" => NodeKind::This,
                "new" => {
                    self.bump()?;
                    let ty = self.type_text()?;
                    let arguments = self.arguments()?;
                    if self.at("{") {
                        return Err(self.unexpected("`;` (anonymous classes are not supported)"));
                    }
                    return Ok(self.finish(NodeKind::New { ty, arguments }, start));
                }
                _ if self.is_name(self.pos) => {
                    self.bump()?;
                    if self.at("(") {
                        let arguments = self.arguments()?;
                        return Ok(self.finish(
                            NodeKind::MethodCall {
                                receiver: None,
                                name: token.text.to_string(),
                                arguments,
                            },
                            start,
                        ));
                    }
                    return Ok(self.finish(NodeKind::Name(token.text.to_string()), start));
                }
                _ => return Err(self.unexpected("an expression")),
            },
            TokenKind::Punct if token.is("(") => {
                self.bump()?;
                let expression = self.expression()?;
                self.expect(")")?;
                return Ok(self.finish(NodeKind::Parenthesized { expression }, start));
            }
            TokenKind::Punct => return Err(self.unexpected("an expression")),
        };
        self.bump()?;
        Ok(self.finish(kind, start))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::SyntaxKind;
    use pretty_assertions::assert_eq;

    fn kinds(tree: &SyntaxTree) -> Vec<SyntaxKind> {
        tree.descendants(tree.root_id())
            .into_iter()
            .map(|id| tree.kind(id).syntax_kind())
            .collect()
    }

    fn first(tree: &SyntaxTree, kind: SyntaxKind) -> NodeId {
        tree.descendants(tree.root_id())
            .into_iter()
            .find(|id| tree.kind(*id).syntax_kind() == kind)
            .unwrap()
    }

    fn expression_text(source: &str) -> (SyntaxTree, NodeId) {
        let tree = parse(source).unwrap();
        let statement = first(&tree, SyntaxKind::ExpressionStatement);
        let NodeKind::ExpressionStatement { expression } = tree.kind(statement) else {
            unreachable!()
        };
        let expression = *expression;
        (tree, expression)
    }

    #[test]
    fn test_if_else_structure() {
        let tree = parse("if (true) { foo(); } else { bar(); }").unwrap();
        assert_eq!(
            kinds(&tree),
            vec![
                SyntaxKind::Unit,
                SyntaxKind::If,
                SyntaxKind::Literal,
                SyntaxKind::Block,
                SyntaxKind::ExpressionStatement,
                SyntaxKind::MethodCall,
                SyntaxKind::Block,
                SyntaxKind::ExpressionStatement,
                SyntaxKind::MethodCall,
            ]
        );
        let if_node = first(&tree, SyntaxKind::If);
        assert_eq!(tree.text(if_node), "if (true) { foo(); } else { bar(); }");
    }

    #[test]
    fn test_precedence_climbing() {
        let (tree, expression) = expression_text("x = a || b && c == d + e * f;");
        let NodeKind::Assignment { value, .. } = tree.kind(expression) else {
            panic!("expected assignment");
        };
        let NodeKind::Infix { operator, right, .. } = tree.kind(*value) else {
            panic!("expected infix");
        };
        assert_eq!(*operator, InfixOperator::ConditionalOr);
        assert_eq!(tree.text(*right), "b && c == d + e * f");
    }

    #[test]
    fn test_left_associative_subtraction() {
        let (tree, expression) = expression_text("a - b - c;");
        let NodeKind::Infix { left, .. } = tree.kind(expression) else {
            panic!("expected infix");
        };
        assert_eq!(tree.text(*left), "a - b");
    }

    #[test]
    fn test_instanceof_binds_tighter_than_and() {
        let (tree, expression) = expression_text("ok = o != null && o instanceof String;");
        let NodeKind::Assignment { value, .. } = tree.kind(expression) else {
            panic!("expected assignment");
        };
        let NodeKind::Infix { right, .. } = tree.kind(*value) else {
            panic!("expected infix");
        };
        assert_eq!(tree.kind(*right).syntax_kind(), SyntaxKind::InstanceOf);
    }

    #[test]
    fn test_cast_versus_parenthesized() {
        let (tree, expression) = expression_text("x = (int) -y + (a) - b;");
        let NodeKind::Assignment { value, .. } = tree.kind(expression) else {
            panic!("expected assignment");
        };
        let NodeKind::Infix { left, .. } = tree.kind(*value) else {
            panic!("expected infix");
        };
        let NodeKind::Infix { left, right, .. } = tree.kind(*left) else {
            panic!("expected infix");
        };
        assert_eq!(tree.kind(*left).syntax_kind(), SyntaxKind::Cast);
        assert_eq!(tree.kind(*right).syntax_kind(), SyntaxKind::Parenthesized);
    }

    #[test]
    fn test_local_variable_with_generic_type() {
        let tree = parse("Map<String, List<Integer>> m = new HashMap<>();").unwrap();
        let local = first(&tree, SyntaxKind::LocalVariable);
        let NodeKind::LocalVariable { ty, name, .. } = tree.kind(local) else {
            unreachable!()
        };
        assert_eq!(ty, "Map<String, List<Integer>>");
        assert_eq!(name, "m");
    }

    #[test]
    fn test_shift_is_not_a_type() {
        let (tree, expression) = expression_text("a < b >> c;");
        assert_eq!(tree.kind(expression).syntax_kind(), SyntaxKind::Infix);
    }

    #[test]
    fn test_loops() {
        let tree = parse(
            "for (int i = 0; i < n; i++) ; for (String s : names) print(s); do x++; while (x < 3);",
        )
        .unwrap();
        let all = kinds(&tree);
        assert!(all.contains(&SyntaxKind::For));
        assert!(all.contains(&SyntaxKind::ForEach));
        assert!(all.contains(&SyntaxKind::DoWhile));
        let for_node = first(&tree, SyntaxKind::For);
        let NodeKind::For { init, update, .. } = tree.kind(for_node) else {
            unreachable!()
        };
        assert_eq!(tree.text(init[0]), "int i = 0");
        assert_eq!(tree.text(update[0]), "i++");
    }

    #[test]
    fn test_try_catch_finally() {
        let tree =
            parse("try { run(); } catch (IOException | RuntimeException e) { log(e); } finally { close(); }")
                .unwrap();
        let catch = first(&tree, SyntaxKind::Catch);
        let NodeKind::Catch { ty, name, .. } = tree.kind(catch) else {
            unreachable!()
        };
        assert_eq!(ty, "IOException | RuntimeException");
        assert_eq!(name, "e");
    }

    #[test]
    fn test_class_with_annotated_method() {
        let source = r#"
package demo;

import static org.testng.Assert.*;
import java.util.List;

public class FooTest {
    private int count = 0;

    @Test(groups = "fast")
    public void checks() throws Exception {
        assertTrue(count == 0);
    }
}
"#;
        let tree = parse(source).unwrap();
        let NodeKind::Unit {
            package, imports, ..
        } = tree.root().kind()
        else {
            unreachable!()
        };
        assert_eq!(package.as_deref(), Some("demo"));
        assert_eq!(imports.len(), 2);
        let method = first(&tree, SyntaxKind::MethodDecl);
        let NodeKind::MethodDecl {
            modifiers,
            return_type,
            name,
            ..
        } = tree.kind(method)
        else {
            unreachable!()
        };
        assert_eq!(modifiers, &vec!["@Test(groups = \"fast\")".to_string(), "public".into()]);
        assert_eq!(return_type, "void");
        assert_eq!(name, "checks");
        let field = first(&tree, SyntaxKind::LocalVariable);
        assert_eq!(tree.text(field), "private int count = 0;");
    }

    #[test]
    fn test_top_level_method_declaration() {
        let tree = parse("void run() { a(); }\nrun();").unwrap();
        let NodeKind::Unit { items, .. } = tree.root().kind() else {
            unreachable!()
        };
        assert_eq!(tree.kind(items[0]).syntax_kind(), SyntaxKind::MethodDecl);
        assert_eq!(tree.kind(items[1]).syntax_kind(), SyntaxKind::ExpressionStatement);
    }

    #[test]
    fn test_qualified_call_chain() {
        let (tree, expression) = expression_text("org.testng.Assert.fail(\"boom\");");
        let NodeKind::MethodCall { receiver, name, .. } = tree.kind(expression) else {
            panic!("expected call");
        };
        assert_eq!(name, "fail");
        assert_eq!(tree.text(receiver.unwrap()), "org.testng.Assert");
    }

    #[test]
    fn test_error_reports_position() {
        let error = parse("foo(;\n").unwrap_err();
        assert_eq!((error.line, error.column), (1, 5));
        assert!(error.message.contains("expected an expression"));
    }

    #[test]
    fn test_missing_semicolon() {
        let error = parse("a = b\nc = d;").unwrap_err();
        assert_eq!(error.line, 2);
    }
}
