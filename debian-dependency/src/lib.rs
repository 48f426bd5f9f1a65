#![deny(missing_docs)]
//! Parser for Debian package relationship fields.
//!
//! This crate parses the value of fields such as `Depends`, `Build-Depends`
//! and `Conflicts` into a [`Dependency`]: a list of comma-separated
//! [`Relation`]s, each a list of `|`-separated [`Possibility`]s. Malformed
//! input is rejected with a [`ParseError`] that says what went wrong and
//! where.
//!
//! # Example
//!
//! ```
//! use debian_dependency::{Operator, ErrorKind};
//!
//! let dep = debian_dependency::parse(
//!     "libc6 (>= 2.34), python3:any | python3-minimal [!hurd-any], ${misc:Depends}",
//! )
//! .unwrap();
//! assert_eq!(dep.relations.len(), 3);
//!
//! let libc = &dep.relations[0].possibilities[0];
//! assert_eq!(libc.name, "libc6");
//! let version = libc.version.as_ref().unwrap();
//! assert_eq!(version.operator, Operator::GreaterThanEqual);
//! assert_eq!(version.number, "2.34");
//!
//! let python = &dep.relations[1];
//! assert_eq!(python.possibilities[0].arch.as_ref().unwrap().cpu, "any");
//! assert!(python.possibilities[1].architectures.as_ref().unwrap().not);
//!
//! assert_eq!(dep.substvars().collect::<Vec<_>>(), vec!["misc:Depends"]);
//!
//! let err = debian_dependency::parse("foo (>= 1.0) (<< 2.0)").unwrap_err();
//! assert_eq!(err.kind(), ErrorKind::DuplicateVersion);
//! assert_eq!(err.offset(), 13);
//! ```

mod error;
mod parse;
pub mod relations;

pub use error::{ErrorKind, ParseError};
pub use relations::{
    Arch, ArchSet, BuildProfile, Dependency, Operator, Possibility, Relation, Version,
};

/// Options controlling which constructs the parser accepts.
///
/// The default accepts everything. Fields of binary packages, as found in a
/// `.deb` or a `Packages` file, never contain substitution variables or
/// build profiles; use [`ParseOptions::binary`] to reject them there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ParseOptions {
    /// Accept `${...}` substitution variables.
    pub allow_substvar: bool,

    /// Accept `<...>` build profile restriction formulas.
    pub allow_profiles: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            allow_substvar: true,
            allow_profiles: true,
        }
    }
}

impl ParseOptions {
    /// Options for fields of built binary packages.
    pub fn binary() -> Self {
        Self {
            allow_substvar: false,
            allow_profiles: false,
        }
    }

    /// Set whether substitution variables are accepted.
    pub fn with_substvars(mut self, allow: bool) -> Self {
        self.allow_substvar = allow;
        self
    }

    /// Set whether build profile restriction formulas are accepted.
    pub fn with_profiles(mut self, allow: bool) -> Self {
        self.allow_profiles = allow;
        self
    }
}

/// Parse a dependency field value.
///
/// ```
/// let dep = debian_dependency::parse("foo, bar | baz").unwrap();
/// assert_eq!(dep.relations[1].possibilities[1].name, "baz");
/// assert!(debian_dependency::parse("foo bar").is_err());
/// ```
pub fn parse(input: &str) -> Result<Dependency, ParseError> {
    Dependency::parse(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let options = ParseOptions::default();
        assert!(options.allow_substvar);
        assert!(options.allow_profiles);
    }

    #[test]
    fn test_option_builders() {
        let options = ParseOptions::default().with_substvars(false);
        assert!(!options.allow_substvar);
        assert!(options.allow_profiles);
        assert_eq!(ParseOptions::binary(), options.with_profiles(false));
    }

    #[test]
    fn test_parse_with() {
        let options = ParseOptions::default().with_profiles(false);
        assert!(Dependency::parse_with("${misc:Depends}", &options).is_ok());
        assert_eq!(
            Dependency::parse_with("foo <!nocheck>", &options)
                .unwrap_err()
                .kind(),
            ErrorKind::ProfilesNotAllowed
        );
    }

    #[test]
    fn test_deterministic() {
        let input = "foo:amd64 (>= 1.0) [amd64 sparc] <!nocheck>, bar | ${baz}";
        assert_eq!(parse(input).unwrap(), parse(input).unwrap());
    }
}
