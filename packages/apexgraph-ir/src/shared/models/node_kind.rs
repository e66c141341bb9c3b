//! Vertex labels
//!
//! One label per AST node kind the graph materializes. Labels double as the
//! frame names recorded in end-scope annotations.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! node_kinds {
    ($($variant:ident),+ $(,)?) => {
        /// Kind tag of a vertex (and of the AST node it was built from)
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum NodeKind {
            $($variant),+
        }

        impl NodeKind {
            /// Every label, in declaration order
            pub const ALL: &'static [NodeKind] = &[$(NodeKind::$variant),+];

            /// Label string as stored in the graph
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(NodeKind::$variant => stringify!($variant)),+
                }
            }

            /// Parse a label (case-insensitive)
            pub fn parse(label: &str) -> Option<Self> {
                $(
                    if label.eq_ignore_ascii_case(stringify!($variant)) {
                        return Some(NodeKind::$variant);
                    }
                )+
                None
            }
        }
    };
}

node_kinds! {
    // Declarations
    UserClass,
    UserInterface,
    UserEnum,
    UserTrigger,
    Method,
    Parameter,
    FieldDeclarationStatements,
    FieldDeclaration,
    PropertyDeclaration,
    // Statements
    BlockStatement,
    IfElseBlockStatement,
    IfBlockStatement,
    StandardCondition,
    ForLoopStatement,
    ForEachStatement,
    WhileLoopStatement,
    DoLoopStatement,
    SwitchStatement,
    ValueWhenBlock,
    TypeWhenBlock,
    ElseWhenBlock,
    LiteralCase,
    IdentifierCase,
    TryCatchFinallyBlockStatement,
    CatchBlockStatement,
    ReturnStatement,
    ThrowStatement,
    BreakStatement,
    ContinueStatement,
    VariableDeclarationStatements,
    VariableDeclaration,
    ExpressionStatement,
    DmlInsertStatement,
    DmlUpdateStatement,
    DmlUpsertStatement,
    DmlDeleteStatement,
    DmlUndeleteStatement,
    DmlMergeStatement,
    // Expressions
    LiteralExpression,
    VariableExpression,
    ReferenceExpression,
    EmptyReferenceExpression,
    ThisVariableExpression,
    SuperVariableExpression,
    MethodCallExpression,
    ThisMethodCallExpression,
    SuperMethodCallExpression,
    NewObjectExpression,
    NewListLiteralExpression,
    NewSetLiteralExpression,
    NewMapLiteralExpression,
    MapEntryNode,
    BinaryExpression,
    BooleanExpression,
    PrefixExpression,
    PostfixExpression,
    AssignmentExpression,
    TernaryExpression,
    CastExpression,
    InstanceOfExpression,
    ArrayLoadExpression,
    SoqlExpression,
    ClassRefExpression,
    // Front-end only: folded into synthetic methods by the graph builder
    StaticBlock,
    PropertyGetter,
    PropertySetter,
}

impl NodeKind {
    /// Labels that declare a type
    pub fn is_type_declaration(&self) -> bool {
        matches!(
            self,
            NodeKind::UserClass | NodeKind::UserInterface | NodeKind::UserEnum | NodeKind::UserTrigger
        )
    }

    /// Labels that push a scope frame when a path walk reaches them
    pub fn opens_scope(&self) -> bool {
        matches!(
            self,
            NodeKind::BlockStatement
                | NodeKind::IfElseBlockStatement
                | NodeKind::ForLoopStatement
                | NodeKind::ForEachStatement
                | NodeKind::WhileLoopStatement
                | NodeKind::DoLoopStatement
                | NodeKind::SwitchStatement
                | NodeKind::ValueWhenBlock
                | NodeKind::TypeWhenBlock
                | NodeKind::ElseWhenBlock
                | NodeKind::TryCatchFinallyBlockStatement
                | NodeKind::CatchBlockStatement
        )
    }

    pub fn is_loop(&self) -> bool {
        matches!(
            self,
            NodeKind::ForLoopStatement
                | NodeKind::ForEachStatement
                | NodeKind::WhileLoopStatement
                | NodeKind::DoLoopStatement
        )
    }

    pub fn is_when_block(&self) -> bool {
        matches!(
            self,
            NodeKind::ValueWhenBlock | NodeKind::TypeWhenBlock | NodeKind::ElseWhenBlock
        )
    }

    pub fn is_dml(&self) -> bool {
        matches!(
            self,
            NodeKind::DmlInsertStatement
                | NodeKind::DmlUpdateStatement
                | NodeKind::DmlUpsertStatement
                | NodeKind::DmlDeleteStatement
                | NodeKind::DmlUndeleteStatement
                | NodeKind::DmlMergeStatement
        )
    }

    /// Statements after which nothing in the same block can execute
    pub fn is_unconditional_exit(&self) -> bool {
        matches!(
            self,
            NodeKind::ReturnStatement
                | NodeKind::ThrowStatement
                | NodeKind::BreakStatement
                | NodeKind::ContinueStatement
        )
    }

    /// Leaf statements that sit directly on a path
    pub fn is_simple_statement(&self) -> bool {
        self.is_dml()
            || matches!(
                self,
                NodeKind::ReturnStatement
                    | NodeKind::ThrowStatement
                    | NodeKind::BreakStatement
                    | NodeKind::ContinueStatement
                    | NodeKind::VariableDeclarationStatements
                    | NodeKind::ExpressionStatement
            )
    }

    /// Compound statements that own nested blocks
    pub fn is_compound_statement(&self) -> bool {
        matches!(
            self,
            NodeKind::IfElseBlockStatement
                | NodeKind::ForLoopStatement
                | NodeKind::ForEachStatement
                | NodeKind::WhileLoopStatement
                | NodeKind::DoLoopStatement
                | NodeKind::SwitchStatement
                | NodeKind::TryCatchFinallyBlockStatement
        )
    }

    /// Expressions that transfer control to another method
    pub fn is_invocable(&self) -> bool {
        matches!(
            self,
            NodeKind::MethodCallExpression
                | NodeKind::ThisMethodCallExpression
                | NodeKind::SuperMethodCallExpression
                | NodeKind::NewObjectExpression
        )
    }

    pub fn is_expression(&self) -> bool {
        matches!(
            self,
            NodeKind::LiteralExpression
                | NodeKind::VariableExpression
                | NodeKind::ReferenceExpression
                | NodeKind::EmptyReferenceExpression
                | NodeKind::ThisVariableExpression
                | NodeKind::SuperVariableExpression
                | NodeKind::MethodCallExpression
                | NodeKind::ThisMethodCallExpression
                | NodeKind::SuperMethodCallExpression
                | NodeKind::NewObjectExpression
                | NodeKind::NewListLiteralExpression
                | NodeKind::NewSetLiteralExpression
                | NodeKind::NewMapLiteralExpression
                | NodeKind::BinaryExpression
                | NodeKind::BooleanExpression
                | NodeKind::PrefixExpression
                | NodeKind::PostfixExpression
                | NodeKind::AssignmentExpression
                | NodeKind::TernaryExpression
                | NodeKind::CastExpression
                | NodeKind::InstanceOfExpression
                | NodeKind::ArrayLoadExpression
                | NodeKind::SoqlExpression
                | NodeKind::ClassRefExpression
        )
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
