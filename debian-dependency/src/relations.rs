//! Value tree for parsed dependency fields.
//!
//! A [`Dependency`] is a list of comma-separated [`Relation`]s; each relation
//! is a list of `|`-separated [`Possibility`]s, any one of which satisfies it.
use crate::error::{ErrorKind, ParseError};
use crate::parse;

/// Operator of a version constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Operator {
    /// `>=`
    #[cfg_attr(feature = "serde", serde(rename = ">="))]
    GreaterThanEqual,

    /// `<=`
    #[cfg_attr(feature = "serde", serde(rename = "<="))]
    LessThanEqual,

    /// `>>`
    #[cfg_attr(feature = "serde", serde(rename = ">>"))]
    GreaterThan,

    /// `<<`
    #[cfg_attr(feature = "serde", serde(rename = "<<"))]
    LessThan,

    /// `=`
    #[cfg_attr(feature = "serde", serde(rename = "="))]
    Equal,
}

/// Operator tokens, in match order: two-character tokens before `=`.
pub(crate) const OPERATORS: &[(&str, Operator)] = &[
    (">=", Operator::GreaterThanEqual),
    ("<=", Operator::LessThanEqual),
    (">>", Operator::GreaterThan),
    ("<<", Operator::LessThan),
    ("=", Operator::Equal),
];

impl Operator {
    /// The textual token for this operator.
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::GreaterThanEqual => ">=",
            Operator::LessThanEqual => "<=",
            Operator::GreaterThan => ">>",
            Operator::LessThan => "<<",
            Operator::Equal => "=",
        }
    }

    /// Match the longest operator token at the start of `text`.
    ///
    /// Returns the operator and the number of bytes it occupies.
    pub(crate) fn match_prefix(text: &str) -> Option<(Operator, usize)> {
        OPERATORS
            .iter()
            .find(|(token, _)| text.starts_with(token))
            .map(|(token, op)| (*op, token.len()))
    }
}

impl std::fmt::Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Operator {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OPERATORS
            .iter()
            .find(|(token, _)| *token == s)
            .map(|(_, op)| *op)
            .ok_or_else(|| format!("Invalid version operator: {}", s))
    }
}

/// A version constraint, e.g. `(>= 1.0)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Version {
    /// The comparison operator.
    pub operator: Operator,

    /// The version number, verbatim.
    pub number: String,
}

impl Version {
    /// Parse the version number as a Debian version.
    #[cfg(feature = "debversion")]
    pub fn parsed(
        &self,
    ) -> Result<debversion::Version, <debversion::Version as std::str::FromStr>::Err> {
        self.number.parse()
    }
}

/// An architecture, split into its dash-separated components.
///
/// `amd64` only has a CPU, `linux-any` has an OS and a CPU, and
/// `musl-linux-arm64` has all three. The string is split from the right, so
/// with more than three components everything left of the OS ends up in the
/// ABI: `base-gnu-linux-amd64` has ABI `base-gnu`. No attempt is made to check
/// the names against a list of known architectures.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Arch {
    /// ABI component, if present.
    pub abi: Option<String>,

    /// Operating system component, if present.
    pub os: Option<String>,

    /// CPU component.
    pub cpu: String,
}

impl Arch {
    /// An architecture that has only a CPU component.
    pub fn cpu(cpu: &str) -> Self {
        Self {
            abi: None,
            os: None,
            cpu: cpu.to_string(),
        }
    }

    /// Split a token into components, or `None` if any component is empty.
    pub(crate) fn from_token(token: &str) -> Option<Self> {
        let mut parts = token.rsplitn(3, '-');
        let cpu = parts.next().filter(|s| !s.is_empty())?;
        let os = match parts.next() {
            Some("") => return None,
            other => other,
        };
        let abi = match parts.next() {
            Some("") => return None,
            other => other,
        };
        Some(Self {
            abi: abi.map(str::to_string),
            os: os.map(str::to_string),
            cpu: cpu.to_string(),
        })
    }
}

impl std::fmt::Display for Arch {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        if let Some(abi) = &self.abi {
            write!(f, "{}-", abi)?;
        }
        if let Some(os) = &self.os {
            write!(f, "{}-", os)?;
        }
        f.write_str(&self.cpu)
    }
}

impl std::str::FromStr for Arch {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() || s.contains(|c: char| c.is_whitespace() || parse::is_special(c)) {
            return Err(ParseError::new(ErrorKind::MalformedArchitecture, 0, s.len()));
        }
        Arch::from_token(s)
            .ok_or_else(|| ParseError::new(ErrorKind::MalformedArchitecture, 0, s.len()))
    }
}

/// An architecture restriction list, e.g. `[amd64 sparc]` or `[!hurd-any]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ArchSet {
    /// Whether every entry was negated with `!`.
    pub not: bool,

    /// The listed architectures, in written order. Never empty.
    pub architectures: Vec<Arch>,
}

impl ArchSet {
    /// Iterate over the CPU names of the listed architectures.
    pub fn cpus(&self) -> impl Iterator<Item = &str> + '_ {
        self.architectures.iter().map(|a| a.cpu.as_str())
    }
}

/// A term in a build profile restriction formula.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BuildProfile {
    /// Profile must be active, e.g. `cross`.
    Enabled(String),

    /// Profile must not be active, e.g. `!nocheck`.
    Disabled(String),
}

impl std::fmt::Display for BuildProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            BuildProfile::Enabled(s) => f.write_str(s),
            BuildProfile::Disabled(s) => write!(f, "!{}", s),
        }
    }
}

/// One alternative within a relation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Possibility {
    /// Package name, or the interior of a `${...}` substitution variable.
    pub name: String,

    /// Whether the name was written as `${...}`.
    pub substvar: bool,

    /// Multiarch qualifier, as in `foo:amd64`.
    pub arch: Option<Arch>,

    /// Version constraint, as in `foo (>= 1.0)`.
    pub version: Option<Version>,

    /// Architecture restriction, as in `foo [amd64]`.
    pub architectures: Option<ArchSet>,

    /// Build profile restriction formulas, as in `foo <!nocheck> <cross>`.
    pub profiles: Vec<Vec<BuildProfile>>,
}

impl Possibility {
    /// A possibility with just a package name.
    pub fn simple(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    /// Whether this possibility only applies on some architectures or
    /// under some build profiles.
    pub fn is_restricted(&self) -> bool {
        self.architectures.is_some() || !self.profiles.is_empty()
    }
}

impl std::str::FromStr for Possibility {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse::parse_single_possibility(s, &crate::ParseOptions::default())
    }
}

/// One comma-separated group of alternatives.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Relation {
    /// The alternatives, in written order. Never empty.
    pub possibilities: Vec<Possibility>,
}

impl Relation {
    /// Iterate over the alternatives.
    pub fn iter(&self) -> std::slice::Iter<'_, Possibility> {
        self.possibilities.iter()
    }

    /// Whether this relation offers more than one alternative.
    pub fn is_alternative(&self) -> bool {
        self.possibilities.len() > 1
    }
}

impl From<Possibility> for Relation {
    fn from(possibility: Possibility) -> Self {
        Self {
            possibilities: vec![possibility],
        }
    }
}

impl<'a> IntoIterator for &'a Relation {
    type Item = &'a Possibility;
    type IntoIter = std::slice::Iter<'a, Possibility>;

    fn into_iter(self) -> Self::IntoIter {
        self.possibilities.iter()
    }
}

impl std::str::FromStr for Relation {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse::parse_single_relation(s, &crate::ParseOptions::default())
    }
}

/// A parsed dependency field, such as the value of `Depends`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Dependency {
    /// The relations, in written order. Never empty.
    pub relations: Vec<Relation>,
}

impl Dependency {
    /// Parse a field value, allowing substvars and build profiles.
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        parse::parse(text, &crate::ParseOptions::default())
    }

    /// Parse a field value with the given options.
    pub fn parse_with(text: &str, options: &crate::ParseOptions) -> Result<Self, ParseError> {
        parse::parse(text, options)
    }

    /// Iterate over the relations.
    pub fn iter(&self) -> std::slice::Iter<'_, Relation> {
        self.relations.iter()
    }

    /// Iterate over every alternative of every relation, in order.
    pub fn possibilities(&self) -> impl Iterator<Item = &Possibility> + '_ {
        self.relations.iter().flat_map(|r| r.possibilities.iter())
    }

    /// Names of the substitution variables used, without `${` and `}`.
    pub fn substvars(&self) -> impl Iterator<Item = &str> + '_ {
        self.possibilities()
            .filter(|p| p.substvar)
            .map(|p| p.name.as_str())
    }

    /// Number of relations.
    pub fn len(&self) -> usize {
        self.relations.len()
    }

    /// Always false for a parsed dependency.
    pub fn is_empty(&self) -> bool {
        self.relations.is_empty()
    }
}

impl<'a> IntoIterator for &'a Dependency {
    type Item = &'a Relation;
    type IntoIter = std::slice::Iter<'a, Relation>;

    fn into_iter(self) -> Self::IntoIter {
        self.relations.iter()
    }
}

impl IntoIterator for Dependency {
    type Item = Relation;
    type IntoIter = std::vec::IntoIter<Relation>;

    fn into_iter(self) -> Self::IntoIter {
        self.relations.into_iter()
    }
}

impl std::str::FromStr for Dependency {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Dependency::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operator_match_prefix() {
        assert_eq!(
            Operator::match_prefix(">= 1.0"),
            Some((Operator::GreaterThanEqual, 2))
        );
        assert_eq!(Operator::match_prefix("<<1"), Some((Operator::LessThan, 2)));
        assert_eq!(Operator::match_prefix("= 1"), Some((Operator::Equal, 1)));
        assert_eq!(Operator::match_prefix("> 1"), None);
        assert_eq!(Operator::match_prefix(""), None);
    }

    #[test]
    fn test_operator_from_str() {
        for (token, op) in OPERATORS {
            assert_eq!(token.parse::<Operator>().unwrap(), *op);
            assert_eq!(op.to_string(), *token);
        }
        assert!("<".parse::<Operator>().is_err());
        assert!(">=>".parse::<Operator>().is_err());
    }

    #[test]
    fn test_arch_components() {
        assert_eq!(Arch::from_token("amd64"), Some(Arch::cpu("amd64")));
        assert_eq!(
            Arch::from_token("linux-any"),
            Some(Arch {
                abi: None,
                os: Some("linux".to_string()),
                cpu: "any".to_string(),
            })
        );
        assert_eq!(
            Arch::from_token("musl-linux-arm64"),
            Some(Arch {
                abi: Some("musl".to_string()),
                os: Some("linux".to_string()),
                cpu: "arm64".to_string(),
            })
        );
        assert_eq!(
            Arch::from_token("base-gnu-linux-amd64"),
            Some(Arch {
                abi: Some("base-gnu".to_string()),
                os: Some("linux".to_string()),
                cpu: "amd64".to_string(),
            })
        );
        assert_eq!(Arch::from_token("linux-"), None);
        assert_eq!(Arch::from_token("-amd64"), None);
        assert_eq!(Arch::from_token("a--b"), None);
        assert_eq!(Arch::from_token(""), None);
    }

    #[test]
    fn test_arch_display() {
        let arch: Arch = "gnu-kfreebsd-amd64".parse().unwrap();
        assert_eq!(arch.to_string(), "gnu-kfreebsd-amd64");
        assert_eq!(Arch::cpu("any").to_string(), "any");
    }

    #[test]
    fn test_arch_from_str_rejects_special() {
        let err = "amd64]".parse::<Arch>().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedArchitecture);
        assert!("".parse::<Arch>().is_err());
        assert!("amd 64".parse::<Arch>().is_err());
    }

    #[test]
    fn test_possibility_simple() {
        let p = Possibility::simple("foo");
        assert_eq!(p.name, "foo");
        assert!(!p.substvar);
        assert!(!p.is_restricted());
        assert_eq!(p, "foo".parse::<Possibility>().unwrap());
    }

    #[test]
    fn test_possibility_from_str_rejects_alternatives() {
        let err = "foo | bar".parse::<Possibility>().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TrailingInput);
        assert_eq!(err.offset(), 4);
    }

    #[test]
    fn test_relation_from_str() {
        let relation: Relation = "foo | bar (>= 1)".parse().unwrap();
        assert!(relation.is_alternative());
        assert_eq!(
            relation.iter().map(|p| p.name.as_str()).collect::<Vec<_>>(),
            vec!["foo", "bar"]
        );

        let err = "foo, bar".parse::<Relation>().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TrailingInput);
        assert_eq!(err.offset(), 3);
    }

    #[test]
    fn test_from_str_offsets_skip_clauses() {
        let err = "${a,b}, c".parse::<Relation>().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TrailingInput);
        assert_eq!(err.offset(), 6);

        let err = "foo [a|b] | bar".parse::<Possibility>().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TrailingInput);
        assert_eq!(err.offset(), 10);
    }

    #[test]
    fn test_relation_from_possibility() {
        let relation = Relation::from(Possibility::simple("foo"));
        assert!(!relation.is_alternative());
        assert_eq!(relation, "foo".parse::<Relation>().unwrap());
    }

    #[test]
    fn test_possibilities_and_substvars() {
        let dep = Dependency::parse("${misc:Depends}, foo | bar, ${shlibs:Depends}").unwrap();
        assert_eq!(dep.len(), 3);
        assert!(!dep.is_empty());
        assert_eq!(
            dep.possibilities()
                .map(|p| p.name.as_str())
                .collect::<Vec<_>>(),
            vec!["misc:Depends", "foo", "bar", "shlibs:Depends"]
        );
        assert_eq!(
            dep.substvars().collect::<Vec<_>>(),
            vec!["misc:Depends", "shlibs:Depends"]
        );
    }

    #[test]
    fn test_into_iter() {
        let dep: Dependency = "foo, bar".parse().unwrap();
        let names = (&dep)
            .into_iter()
            .map(|r| r.possibilities[0].name.clone())
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["foo", "bar"]);
        assert_eq!(dep.into_iter().count(), 2);
    }

    #[test]
    fn test_archset_cpus() {
        let p: Possibility = "foo [linux-any hurd-i386]".parse().unwrap();
        let set = p.architectures.unwrap();
        assert_eq!(set.cpus().collect::<Vec<_>>(), vec!["any", "i386"]);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serialize_dependency() {
        let dep: Dependency = "foo (>= 1.0) [!sparc]".parse().unwrap();
        let json = serde_json::to_value(&dep).unwrap();
        assert_eq!(json["relations"][0]["possibilities"][0]["name"], "foo");
        assert_eq!(
            json["relations"][0]["possibilities"][0]["version"]["operator"],
            ">="
        );
        let back: Dependency = serde_json::from_value(json).unwrap();
        assert_eq!(back, dep);
    }

    #[cfg(feature = "debversion")]
    #[test]
    fn test_version_parsed() {
        let p: Possibility = "foo (>= 1:2.3-4)".parse().unwrap();
        let version = p.version.unwrap().parsed().unwrap();
        assert_eq!(version, "1:2.3-4".parse::<debversion::Version>().unwrap());
    }
}
