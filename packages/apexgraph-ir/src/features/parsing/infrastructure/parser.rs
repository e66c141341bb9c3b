//! Recursive-descent parser: compilation units, type declarations, members
//!
//! Statements live in `statements.rs`, expressions in `expressions.rs`.
//! Every node records the span from its first to its last token.

use super::lexer::{tokenize, Token, TokenKind};
use crate::features::parsing::domain::{AstNode, ParseError};
use crate::shared::constants::{keys, reserved};
use crate::shared::models::{NodeKind, Span};

pub(super) type PResult<T> = Result<T, ParseError>;

const MODIFIERS: &[&str] = &[
    "public",
    "private",
    "protected",
    "global",
    "static",
    "final",
    "abstract",
    "virtual",
    "override",
    "transient",
    "testmethod",
    "webservice",
];

const SHARING_PREFIXES: &[&str] = &["with", "without", "inherited"];

/// Modifiers and annotations collected before a declaration
#[derive(Debug, Default, Clone)]
pub(super) struct Modifiers {
    pub words: Vec<String>,
    pub annotations: Vec<String>,
}

impl Modifiers {
    pub fn has(&self, word: &str) -> bool {
        self.words.iter().any(|w| w == word)
    }

    fn apply(&self, node: &mut AstNode) {
        node.set_prop(keys::MODIFIERS, self.words.clone());
        node.set_prop(keys::IS_STATIC, self.has("static"));
    }
}

pub struct Parser {
    unit: String,
    tokens: Vec<Token>,
    eof: Token,
    pos: usize,
}

impl Parser {
    pub fn new(unit: &str, source: &str) -> PResult<Self> {
        let tokens = tokenize(unit, source)?;
        let eof = tokens.last().cloned().unwrap_or(Token {
            kind: TokenKind::Eof,
            line: 1,
            column: 1,
            end_line: 1,
            end_column: 1,
        });
        Ok(Self {
            unit: unit.to_string(),
            tokens,
            eof,
            pos: 0,
        })
    }

    /// Parse one top-level class, interface, enum or trigger
    pub fn parse_compilation_unit(&mut self) -> PResult<AstNode> {
        let start = self.peek().clone();
        let modifiers = self.parse_modifiers()?;
        let root = if self.check_keyword("trigger") {
            self.parse_trigger(&start)?
        } else {
            self.parse_type_declaration(&start, modifiers)?
        };
        if !self.peek().is_eof() {
            return Err(self.error_here("unexpected input after type declaration"));
        }
        Ok(root)
    }

    // ════════════════════════════════════════════════════════════════
    // Token helpers
    // ════════════════════════════════════════════════════════════════

    pub(super) fn peek(&self) -> &Token {
        self.tokens.get(self.pos).unwrap_or(&self.eof)
    }

    pub(super) fn peek_at(&self, offset: usize) -> &Token {
        self.tokens.get(self.pos + offset).unwrap_or(&self.eof)
    }

    pub(super) fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if !token.is_eof() {
            self.pos += 1;
        }
        token
    }

    pub(super) fn check(&self, p: &str) -> bool {
        self.peek().is_punct(p)
    }

    pub(super) fn check_keyword(&self, kw: &str) -> bool {
        self.peek().is_keyword(kw)
    }

    pub(super) fn eat(&mut self, p: &str) -> bool {
        if self.check(p) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(super) fn eat_keyword(&mut self, kw: &str) -> bool {
        if self.check_keyword(kw) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(super) fn expect(&mut self, p: &str) -> PResult<Token> {
        if self.check(p) {
            Ok(self.advance())
        } else {
            Err(self.error_here(&format!("expected '{}'", p)))
        }
    }

    pub(super) fn expect_keyword(&mut self, kw: &str) -> PResult<Token> {
        if self.check_keyword(kw) {
            Ok(self.advance())
        } else {
            Err(self.error_here(&format!("expected '{}'", kw)))
        }
    }

    pub(super) fn expect_identifier(&mut self) -> PResult<String> {
        match self.peek().identifier() {
            Some(id) => {
                let id = id.to_string();
                self.advance();
                Ok(id)
            }
            None => Err(self.error_here("expected identifier")),
        }
    }

    pub(super) fn error_here(&self, message: &str) -> ParseError {
        let token = self.peek();
        let found = match &token.kind {
            TokenKind::Identifier(id) => format!("'{}'", id),
            TokenKind::Punct(p) => format!("'{}'", p),
            TokenKind::Eof => "end of input".to_string(),
            other => format!("{:?}", other),
        };
        ParseError::new(
            self.unit.clone(),
            token.line,
            token.column,
            format!("{}, found {}", message, found),
        )
    }

    /// Span from `start` to the end of the last consumed token
    pub(super) fn span_from(&self, start: &Token) -> Span {
        let last = self
            .pos
            .checked_sub(1)
            .and_then(|i| self.tokens.get(i))
            .unwrap_or(start);
        Span::new(start.line, start.column, last.end_line, last.end_column)
    }

    /// Run `f`, rewinding the cursor if it fails
    pub(super) fn try_parse<T>(&mut self, f: impl FnOnce(&mut Self) -> PResult<T>) -> Option<T> {
        let saved = self.pos;
        match f(self) {
            Ok(value) => Some(value),
            Err(_) => {
                self.pos = saved;
                None
            }
        }
    }

    // ════════════════════════════════════════════════════════════════
    // Declarations
    // ════════════════════════════════════════════════════════════════

    pub(super) fn parse_modifiers(&mut self) -> PResult<Modifiers> {
        let mut modifiers = Modifiers::default();
        loop {
            if let TokenKind::Annotation(name) = &self.peek().kind {
                modifiers.annotations.push(name.to_lowercase());
                self.advance();
                if self.check("(") {
                    self.skip_balanced("(", ")")?;
                }
                continue;
            }
            if let Some(word) = MODIFIERS.iter().find(|m| self.check_keyword(m)) {
                modifiers.words.push(word.to_string());
                self.advance();
                continue;
            }
            if SHARING_PREFIXES.iter().any(|p| self.check_keyword(p))
                && self.peek_at(1).is_keyword("sharing")
            {
                self.advance();
                self.advance();
                continue;
            }
            return Ok(modifiers);
        }
    }

    fn skip_balanced(&mut self, open: &str, close: &str) -> PResult<()> {
        self.expect(open)?;
        let mut depth = 1usize;
        while depth > 0 {
            if self.peek().is_eof() {
                return Err(self.error_here(&format!("expected '{}'", close)));
            }
            let token = self.advance();
            if token.is_punct(open) {
                depth += 1;
            } else if token.is_punct(close) {
                depth -= 1;
            }
        }
        Ok(())
    }

    fn parse_type_declaration(&mut self, start: &Token, modifiers: Modifiers) -> PResult<AstNode> {
        if self.eat_keyword("class") {
            self.parse_class(start, modifiers)
        } else if self.eat_keyword("interface") {
            self.parse_interface(start, modifiers)
        } else if self.eat_keyword("enum") {
            self.parse_enum(start, modifiers)
        } else {
            Err(self.error_here("expected 'class', 'interface', 'enum' or 'trigger'"))
        }
    }

    fn parse_class(&mut self, start: &Token, modifiers: Modifiers) -> PResult<AstNode> {
        let name = self.expect_identifier()?;
        let mut node =
            AstNode::new(NodeKind::UserClass, Span::zero()).with_prop(keys::NAME, name.clone());
        modifiers.apply(&mut node);
        node.set_prop(keys::IS_ABSTRACT, modifiers.has("abstract"));

        if self.eat_keyword("extends") {
            node.set_prop(keys::SUPER_CLASS_NAME, self.parse_type()?);
        }
        let mut interfaces = Vec::new();
        if self.eat_keyword("implements") {
            loop {
                interfaces.push(self.parse_type()?);
                if !self.eat(",") {
                    break;
                }
            }
        }
        node.set_prop(keys::INTERFACE_NAMES, interfaces);

        self.expect("{")?;
        while !self.check("}") {
            if self.peek().is_eof() {
                return Err(self.error_here("expected '}'"));
            }
            if self.eat(";") {
                continue;
            }
            let member = self.parse_member(&name)?;
            node.children.push(member);
        }
        self.advance();
        node.span = self.span_from(start);
        Ok(node)
    }

    fn parse_interface(&mut self, start: &Token, modifiers: Modifiers) -> PResult<AstNode> {
        let name = self.expect_identifier()?;
        let mut node =
            AstNode::new(NodeKind::UserInterface, Span::zero()).with_prop(keys::NAME, name.clone());
        modifiers.apply(&mut node);

        let mut extended = Vec::new();
        if self.eat_keyword("extends") {
            loop {
                extended.push(self.parse_type()?);
                if !self.eat(",") {
                    break;
                }
            }
        }
        node.set_prop(keys::INTERFACE_NAMES, extended);

        self.expect("{")?;
        while !self.check("}") {
            if self.peek().is_eof() {
                return Err(self.error_here("expected '}'"));
            }
            if self.eat(";") {
                continue;
            }
            let member = self.parse_member(&name)?;
            if member.kind != NodeKind::Method {
                return Err(ParseError::new(
                    self.unit.clone(),
                    member.span.start_line,
                    member.span.start_col,
                    "interfaces may only declare methods",
                ));
            }
            node.children.push(member);
        }
        self.advance();
        node.span = self.span_from(start);
        Ok(node)
    }

    fn parse_enum(&mut self, start: &Token, modifiers: Modifiers) -> PResult<AstNode> {
        let name = self.expect_identifier()?;
        self.expect("{")?;
        let mut values = Vec::new();
        while !self.check("}") {
            values.push(self.expect_identifier()?);
            if !self.eat(",") {
                break;
            }
        }
        self.expect("}")?;
        let mut node = AstNode::new(NodeKind::UserEnum, self.span_from(start))
            .with_prop(keys::NAME, name)
            .with_prop(keys::VALUES, values);
        modifiers.apply(&mut node);
        Ok(node)
    }

    fn parse_trigger(&mut self, start: &Token) -> PResult<AstNode> {
        self.expect_keyword("trigger")?;
        let name = self.expect_identifier()?;
        self.expect_keyword("on")?;
        let target = self.parse_type()?;
        self.expect("(")?;
        let mut usages = Vec::new();
        loop {
            let timing = self.expect_identifier()?;
            let operation = self.expect_identifier()?;
            usages.push(format!("{} {}", timing, operation));
            if !self.eat(",") {
                break;
            }
        }
        self.expect(")")?;
        let body = self.parse_block()?;
        Ok(AstNode::new(NodeKind::UserTrigger, self.span_from(start))
            .with_prop(keys::NAME, name)
            .with_prop(keys::TARGET_NAME, target)
            .with_prop(keys::USAGES, usages)
            .with_child(body))
    }

    // ════════════════════════════════════════════════════════════════
    // Members
    // ════════════════════════════════════════════════════════════════

    fn parse_member(&mut self, class_name: &str) -> PResult<AstNode> {
        let start = self.peek().clone();
        let modifiers = self.parse_modifiers()?;

        let declares_type = ["class", "interface", "enum"]
            .iter()
            .any(|kw| self.check_keyword(kw))
            && self.peek_at(1).identifier().is_some();
        if declares_type {
            return self.parse_type_declaration(&start, modifiers);
        }

        if self.check("{") {
            if !modifiers.has("static") {
                return Err(self.error_here("instance initializer blocks are not supported"));
            }
            let body = self.parse_block()?;
            return Ok(AstNode::new(NodeKind::StaticBlock, self.span_from(&start)).with_child(body));
        }

        let is_constructor = self
            .peek()
            .identifier()
            .is_some_and(|id| id.eq_ignore_ascii_case(class_name))
            && self.peek_at(1).is_punct("(");
        if is_constructor {
            self.advance();
            return self.parse_method_rest(
                &start,
                modifiers,
                reserved::CONSTRUCTOR_NAME.to_string(),
                "void".to_string(),
                true,
            );
        }

        let ty = self.parse_type()?;
        let name = self.expect_identifier()?;
        if self.check("(") {
            self.parse_method_rest(&start, modifiers, name, ty, false)
        } else if self.check("{") {
            self.parse_property_rest(&start, modifiers, name, ty)
        } else {
            self.parse_field_rest(&start, modifiers, name, ty)
        }
    }

    fn parse_method_rest(
        &mut self,
        start: &Token,
        modifiers: Modifiers,
        name: String,
        return_type: String,
        is_constructor: bool,
    ) -> PResult<AstNode> {
        self.expect("(")?;
        let mut params = Vec::new();
        while !self.check(")") {
            let param_start = self.peek().clone();
            self.eat_keyword("final");
            let ty = self.parse_type()?;
            let param_name = self.expect_identifier()?;
            params.push(
                AstNode::new(NodeKind::Parameter, self.span_from(&param_start))
                    .with_prop(keys::NAME, param_name)
                    .with_prop(keys::TYPE, ty),
            );
            if !self.eat(",") {
                break;
            }
        }
        self.expect(")")?;

        let body = if self.check("{") {
            Some(self.parse_block()?)
        } else {
            self.expect(";")?;
            None
        };

        let mut node = AstNode::new(NodeKind::Method, Span::zero())
            .with_prop(keys::NAME, name)
            .with_prop(keys::RETURN_TYPE, return_type)
            .with_prop(keys::ARITY, params.len() as i64)
            .with_prop(keys::IS_CONSTRUCTOR, is_constructor)
            .with_prop(keys::IS_ABSTRACT, body.is_none());
        modifiers.apply(&mut node);
        node.children.extend(params);
        node.children.extend(body);
        node.span = self.span_from(start);
        Ok(node)
    }

    fn parse_property_rest(
        &mut self,
        start: &Token,
        modifiers: Modifiers,
        name: String,
        ty: String,
    ) -> PResult<AstNode> {
        self.expect("{")?;
        let mut node = AstNode::new(NodeKind::PropertyDeclaration, Span::zero())
            .with_prop(keys::NAME, name)
            .with_prop(keys::TYPE, ty);
        modifiers.apply(&mut node);

        let (mut has_getter, mut has_setter) = (false, false);
        while !self.check("}") {
            let accessor_start = self.peek().clone();
            self.parse_modifiers()?;
            let kind = if self.eat_keyword("get") {
                has_getter = true;
                NodeKind::PropertyGetter
            } else if self.eat_keyword("set") {
                has_setter = true;
                NodeKind::PropertySetter
            } else {
                return Err(self.error_here("expected 'get' or 'set'"));
            };
            let body = if self.check("{") {
                Some(self.parse_block()?)
            } else {
                self.expect(";")?;
                None
            };
            let mut accessor = AstNode::new(kind, self.span_from(&accessor_start));
            accessor.children.extend(body);
            node.children.push(accessor);
        }
        self.expect("}")?;
        node.set_prop(keys::HAS_GETTER, has_getter);
        node.set_prop(keys::HAS_SETTER, has_setter);
        node.span = self.span_from(start);
        Ok(node)
    }

    fn parse_field_rest(
        &mut self,
        start: &Token,
        modifiers: Modifiers,
        first_name: String,
        ty: String,
    ) -> PResult<AstNode> {
        let mut node = AstNode::new(NodeKind::FieldDeclarationStatements, Span::zero())
            .with_prop(keys::TYPE, ty.clone());
        modifiers.apply(&mut node);

        let mut name = first_name;
        let mut decl_start = start.clone();
        loop {
            let mut field = AstNode::new(NodeKind::FieldDeclaration, Span::zero())
                .with_prop(keys::NAME, name)
                .with_prop(keys::TYPE, ty.clone());
            if self.eat("=") {
                field.children.push(self.parse_expression()?);
            }
            field.span = self.span_from(&decl_start);
            node.children.push(field);
            if !self.eat(",") {
                break;
            }
            decl_start = self.peek().clone();
            name = self.expect_identifier()?;
        }
        self.expect(";")?;
        node.span = self.span_from(start);
        Ok(node)
    }

    // ════════════════════════════════════════════════════════════════
    // Types
    // ════════════════════════════════════════════════════════════════

    /// `Name(.Name)*(<Type, ...>)?([])*`, returned as written without spaces
    pub(super) fn parse_type(&mut self) -> PResult<String> {
        let mut ty = self.expect_identifier()?;
        while self.check(".") && self.peek_at(1).identifier().is_some() {
            self.advance();
            ty.push('.');
            ty.push_str(&self.expect_identifier()?);
        }
        if self.eat("<") {
            ty.push('<');
            loop {
                ty.push_str(&self.parse_type()?);
                if self.eat(",") {
                    ty.push(',');
                } else {
                    break;
                }
            }
            self.expect(">")?;
            ty.push('>');
        }
        while self.check("[") && self.peek_at(1).is_punct("]") {
            self.advance();
            self.advance();
            ty.push_str("[]");
        }
        Ok(ty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(src: &str) -> AstNode {
        Parser::new("Test", src)
            .and_then(|mut p| p.parse_compilation_unit())
            .unwrap()
    }

    #[test]
    fn test_class_with_members() {
        let root = parse(
            r#"
            public with sharing class Foo extends Base implements Runnable, Comparable {
                private static Integer count = 0, other;
                public String name { get; set; }
                public Foo() { }
                public static void run(String a, List<Integer> b) { }
                static { count = 1; }
                public class Inner { }
            }
            "#,
        );
        assert_eq!(root.kind, NodeKind::UserClass);
        assert_eq!(root.prop_str(keys::NAME), Some("Foo"));
        assert_eq!(root.prop_str(keys::SUPER_CLASS_NAME), Some("Base"));
        assert_eq!(root.prop_list(keys::INTERFACE_NAMES), ["Runnable", "Comparable"]);

        let kinds: Vec<NodeKind> = root.children.iter().map(|c| c.kind).collect();
        assert_eq!(
            kinds,
            vec![
                NodeKind::FieldDeclarationStatements,
                NodeKind::PropertyDeclaration,
                NodeKind::Method,
                NodeKind::Method,
                NodeKind::StaticBlock,
                NodeKind::UserClass,
            ]
        );
        assert_eq!(root.children[0].children.len(), 2);
        assert!(root.children[0].prop_bool(keys::IS_STATIC));
        assert!(root.children[2].prop_bool(keys::IS_CONSTRUCTOR));
        assert_eq!(root.children[2].prop_str(keys::NAME), Some("<init>"));
        let run = &root.children[3];
        assert_eq!(run.prop(keys::ARITY).and_then(|v| v.as_int()), Some(2));
        assert_eq!(run.children[1].prop_str(keys::TYPE), Some("List<Integer>"));
    }

    #[test]
    fn test_trigger_header() {
        let root = parse("trigger T on Account (before insert, after update) { }");
        assert_eq!(root.kind, NodeKind::UserTrigger);
        assert_eq!(root.prop_str(keys::TARGET_NAME), Some("Account"));
        assert_eq!(root.prop_list(keys::USAGES), ["before insert", "after update"]);
        assert_eq!(root.children[0].kind, NodeKind::BlockStatement);
    }

    #[test]
    fn test_interface_and_enum() {
        let root = parse("public interface Shape extends Base { Decimal area(); }");
        assert_eq!(root.kind, NodeKind::UserInterface);
        assert!(root.children[0].prop_bool(keys::IS_ABSTRACT));

        let root = parse("public enum Season { WINTER, SPRING, SUMMER, FALL }");
        assert_eq!(root.prop_list(keys::VALUES).len(), 4);
    }

    #[test]
    fn test_error_reports_location() {
        let err = Parser::new("Broken", "public class Foo {\n  void run( { }\n}")
            .and_then(|mut p| p.parse_compilation_unit())
            .unwrap_err();
        assert_eq!(err.unit, "Broken");
        assert_eq!(err.line, 2);
    }

    #[test]
    fn test_nested_generic_type() {
        let root = parse("class A { Map<String, List<Id>> m; }");
        assert_eq!(root.children[0].prop_str(keys::TYPE), Some("Map<String,List<Id>>"));
    }
}
