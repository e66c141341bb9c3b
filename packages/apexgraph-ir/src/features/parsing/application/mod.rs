//! Front-end entry points

use tracing::debug;

use super::domain::{CompilationDescriptor, ParseError};
use super::infrastructure::Parser;

/// Parse one Apex source file into a named compilation unit
pub fn parse_compilation_unit(name: &str, source: &str) -> Result<CompilationDescriptor, ParseError> {
    let mut parser = Parser::new(name, source)?;
    let root = parser.parse_compilation_unit()?;
    debug!(unit = name, nodes = root.size(), "parsed compilation unit");
    Ok(CompilationDescriptor::new(name, root))
}

/// Parse several `(name, source)` pairs, stopping at the first failure
pub fn parse_compilation_units<'a, I>(sources: I) -> Result<Vec<CompilationDescriptor>, ParseError>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    sources
        .into_iter()
        .map(|(name, source)| parse_compilation_unit(name, source))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::models::NodeKind;

    #[test]
    fn test_parse_units_keeps_names() {
        let units = parse_compilation_units([
            ("A.cls", "public class A { }"),
            ("T.trigger", "trigger T on Account (before insert) { }"),
        ])
        .unwrap();
        assert_eq!(units.len(), 2);
        assert_eq!(units[0].name, "A.cls");
        assert_eq!(units[1].root.kind, NodeKind::UserTrigger);
    }

    #[test]
    fn test_first_failure_is_reported() {
        let err = parse_compilation_units([("Bad.cls", "public class {")]).unwrap_err();
        assert_eq!(err.unit, "Bad.cls");
    }
}
