//! Tableau symbols.

/// The role a symbol plays in the tableau.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) enum SymbolKind {
    Invalid,
    /// A caller variable (unrestricted in sign)
    External,
    /// Turns an inequality into an equality
    Slack,
    /// Measures the violation of a non-required constraint
    Error,
    /// Marks a required equality
    Dummy,
}

/// A tableau unknown.
///
/// Ids are handed out by one tableau in strictly increasing order and never
/// reused, so ordering by id is ordering by creation. The id is compared
/// first so ordered maps keyed by symbols iterate in that order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct Symbol {
    id: u64,
    kind: SymbolKind,
}

impl Symbol {
    pub(crate) fn new(kind: SymbolKind, id: u64) -> Self {
        Self { id, kind }
    }

    pub(crate) fn invalid() -> Self {
        Self::new(SymbolKind::Invalid, 0)
    }

    pub(crate) fn id(&self) -> u64 {
        self.id
    }

    pub(crate) fn kind(&self) -> SymbolKind {
        self.kind
    }

    pub(crate) fn is_external(&self) -> bool {
        self.kind == SymbolKind::External
    }

    pub(crate) fn is_error(&self) -> bool {
        self.kind == SymbolKind::Error
    }

    pub(crate) fn is_dummy(&self) -> bool {
        self.kind == SymbolKind::Dummy
    }

    /// Slack and error symbols may be chosen as a row subject.
    pub(crate) fn is_pivotable(&self) -> bool {
        matches!(self.kind, SymbolKind::Slack | SymbolKind::Error)
    }
}

impl Default for Symbol {
    fn default() -> Self {
        Self::invalid()
    }
}
