use http::Method;
use serde::{Deserialize, Deserializer, Serialize, Serializer, de::Visitor};
use std::{fmt, str::FromStr};
use strum::{Display, EnumCount, EnumIter, IntoEnumIterator};

use crate::{ErrorKind, Result};

/// Method identifiers known to the server, in their classic numbering.
///
/// `HEAD` shares the identifier of `GET`, so limiting `GET` limits both.
/// Anything the server does not recognise is [`MethodId::Invalid`], which can
/// never be part of a [`MethodSet`].
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Default,
    Display,
    EnumIter,
    EnumCount,
)]
#[strum(serialize_all = "UPPERCASE")]
pub enum MethodId {
    Get,
    Put,
    Post,
    Delete,
    Connect,
    Options,
    Trace,
    Patch,
    Propfind,
    Proppatch,
    Mkcol,
    Copy,
    Move,
    Lock,
    Unlock,
    #[default]
    Invalid,
}

impl MethodId {
    /// Look up the identifier of a method token as it appears on a request
    /// line. Matching is case-sensitive; unknown tokens yield `Invalid`.
    #[must_use]
    pub fn from_token(token: &str) -> Self {
        match token {
            "GET" | "HEAD" => Self::Get,
            "PUT" => Self::Put,
            "POST" => Self::Post,
            "DELETE" => Self::Delete,
            "CONNECT" => Self::Connect,
            "OPTIONS" => Self::Options,
            "TRACE" => Self::Trace,
            "PATCH" => Self::Patch,
            "PROPFIND" => Self::Propfind,
            "PROPPATCH" => Self::Proppatch,
            "MKCOL" => Self::Mkcol,
            "COPY" => Self::Copy,
            "MOVE" => Self::Move,
            "LOCK" => Self::Lock,
            "UNLOCK" => Self::Unlock,
            _ => Self::Invalid,
        }
    }

    const fn index(self) -> usize {
        self as usize
    }
}

impl From<&Method> for MethodId {
    fn from(method: &Method) -> Self {
        Self::from_token(method.as_str())
    }
}

impl From<Method> for MethodId {
    fn from(method: Method) -> Self {
        Self::from(&method)
    }
}

/// Strict parsing for configuration input: unknown names are an error
/// instead of silently turning into `Invalid`.
impl FromStr for MethodId {
    type Err = ErrorKind;

    fn from_str(name: &str) -> Result<Self> {
        match Self::from_token(name) {
            Self::Invalid => Err(ErrorKind::UnknownMethod(name.to_string())),
            id => Ok(id),
        }
    }
}

/// The set of methods a concurrency cap applies to.
///
/// Stored as one flag per [`MethodId`]. The default set is empty, which
/// makes a cap inert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MethodSet {
    members: [bool; MethodId::COUNT],
}

impl MethodSet {
    /// Creates a new empty [`MethodSet`].
    #[must_use]
    pub const fn new() -> Self {
        Self {
            members: [false; MethodId::COUNT],
        }
    }

    /// Adds a method to the set.
    ///
    /// Returns `true` if the method was not yet present. `Invalid` is never
    /// added.
    pub fn insert(&mut self, id: MethodId) -> bool {
        if id == MethodId::Invalid || self.contains(id) {
            return false;
        }
        self.members[id.index()] = true;
        true
    }

    /// Returns `true` if the cap applies to the given method.
    #[must_use]
    pub const fn contains(&self, id: MethodId) -> bool {
        self.members[id.index()]
    }

    /// Returns `true` if no method is limited.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        !self.members.contains(&true)
    }

    /// Number of methods in the set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.iter().filter(|member| **member).count()
    }

    /// Iterates over the members in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = MethodId> + '_ {
        MethodId::iter().filter(|id| self.contains(*id))
    }
}

impl FromIterator<MethodId> for MethodSet {
    fn from_iter<I: IntoIterator<Item = MethodId>>(iter: I) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

impl Extend<MethodId> for MethodSet {
    fn extend<I: IntoIterator<Item = MethodId>>(&mut self, iter: I) {
        for id in iter {
            self.insert(id);
        }
    }
}

/// Parses a method list the way a `<Limit>` section header spells it, e.g.
/// `GET POST` or `GET, POST`.
impl FromStr for MethodSet {
    type Err = ErrorKind;

    fn from_str(input: &str) -> Result<Self> {
        input
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|name| !name.is_empty())
            .map(MethodId::from_str)
            .collect()
    }
}

impl fmt::Display for MethodSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<_> = self.iter().map(|id| id.to_string()).collect();
        write!(f, "{}", names.join(" "))
    }
}

impl Serialize for MethodSet {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_seq(self.iter().map(|id| id.to_string()))
    }
}

struct MethodSetVisitor;

impl<'de> Visitor<'de> for MethodSetVisitor {
    type Value = MethodSet;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a list of method names or a space-separated string")
    }

    fn visit_str<E>(self, v: &str) -> std::result::Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        MethodSet::from_str(v).map_err(serde::de::Error::custom)
    }

    fn visit_seq<A>(self, mut seq: A) -> std::result::Result<Self::Value, A::Error>
    where
        A: serde::de::SeqAccess<'de>,
    {
        let mut set = MethodSet::new();
        while let Some(name) = seq.next_element::<String>()? {
            let id = MethodId::from_str(&name).map_err(serde::de::Error::custom)?;
            set.insert(id);
        }
        Ok(set)
    }
}

impl<'de> Deserialize<'de> for MethodSet {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(MethodSetVisitor)
    }
}
