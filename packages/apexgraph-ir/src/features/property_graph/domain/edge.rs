use serde::{Deserialize, Serialize};

/// How control leaves a vertex along one CFG edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CfgEdgeKind {
    Sequential,
    /// Condition evaluated true
    Positive,
    /// Condition evaluated false
    Negative,
    /// Switch discriminant to one when-block
    Case,
}

/// Outcome of a condition vertex on one path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Polarity {
    Positive,
    Negative,
}

impl CfgEdgeKind {
    pub fn polarity(&self) -> Option<Polarity> {
        match self {
            CfgEdgeKind::Positive => Some(Polarity::Positive),
            CfgEdgeKind::Negative => Some(Polarity::Negative),
            _ => None,
        }
    }
}

/// Edge label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EdgeLabel {
    Child,
    CfgPath(CfgEdgeKind),
    ExtensionOf,
    ExtendedBy,
    ImplementationOf,
    ImplementedBy,
}

impl EdgeLabel {
    pub fn is_cfg(&self) -> bool {
        matches!(self, EdgeLabel::CfgPath(_))
    }

    /// Label of the paired reverse edge for inheritance links
    pub fn reverse(&self) -> Option<EdgeLabel> {
        match self {
            EdgeLabel::ExtensionOf => Some(EdgeLabel::ExtendedBy),
            EdgeLabel::ExtendedBy => Some(EdgeLabel::ExtensionOf),
            EdgeLabel::ImplementationOf => Some(EdgeLabel::ImplementedBy),
            EdgeLabel::ImplementedBy => Some(EdgeLabel::ImplementationOf),
            _ => None,
        }
    }
}
